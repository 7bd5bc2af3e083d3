//! Dashboard widgets and the force-graph canvas.

pub mod activity_log;
pub mod cluster_list;
pub mod connection_badge;
pub mod force_graph;
pub mod one_shot;
pub mod stats;
pub mod upload;
