//! Live link to the organiser: reconnecting socket, message contract and the
//! store that reduces it into the current snapshot and activity log.

pub mod connection;
pub mod http;
pub mod message;
pub mod model;
pub mod socket;
pub mod store;

pub use connection::{Connection, ConnectionEvent, ConnectionState};
pub use model::{ClusterId, ClusterSummary, FileNode, GraphSnapshot, LogEntry, LogKind, UNCLUSTERED};
pub use socket::BrowserTransport;
pub use store::{GraphStateStore, StoreChange};
