//! Canvas force-graph of files grouped around their cluster centers.

mod camera;
mod component;
mod interaction;
mod layout;
mod pick;
mod render;
mod scene;
mod state;
mod tooltip;
mod types;

pub use component::ForceGraphCanvas;
pub use types::{CLUSTER_COLORS, cluster_color};
