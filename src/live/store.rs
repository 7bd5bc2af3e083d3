use std::collections::VecDeque;
use std::sync::Arc;

use log::{debug, info};

use super::message::ServerMessage;
use super::model::{GraphSnapshot, LogEntry};

pub const LOG_CAPACITY: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreChange {
	Graph,
	Log,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&GraphStateStore, StoreChange)>;

/// Single writer for the live graph snapshot and the activity log.
///
/// Every `graph_update` swaps in a fresh `Arc<GraphSnapshot>`, so downstream
/// consumers can compare snapshot identity with `Arc::ptr_eq`.
pub struct GraphStateStore {
	snapshot: Arc<GraphSnapshot>,
	revision: u64,
	logs: VecDeque<LogEntry>,
	listeners: Vec<(SubscriptionId, Listener)>,
	next_subscription: u64,
}

impl Default for GraphStateStore {
	fn default() -> Self {
		Self::new()
	}
}

impl GraphStateStore {
	pub fn new() -> Self {
		Self {
			snapshot: Arc::new(GraphSnapshot::default()),
			revision: 0,
			logs: VecDeque::with_capacity(LOG_CAPACITY),
			listeners: Vec::new(),
			next_subscription: 0,
		}
	}

	pub fn snapshot(&self) -> Arc<GraphSnapshot> {
		Arc::clone(&self.snapshot)
	}

	pub fn revision(&self) -> u64 {
		self.revision
	}

	pub fn logs(&self) -> impl ExactSizeIterator<Item = &LogEntry> {
		self.logs.iter()
	}

	pub fn subscribe(&mut self, listener: impl Fn(&GraphStateStore, StoreChange) + 'static) -> SubscriptionId {
		let id = SubscriptionId(self.next_subscription);
		self.next_subscription += 1;
		self.listeners.push((id, Box::new(listener)));
		id
	}

	pub fn unsubscribe(&mut self, id: SubscriptionId) {
		self.listeners.retain(|(sub, _)| *sub != id);
	}

	pub fn reduce(&mut self, message: ServerMessage) {
		let change = match message {
			ServerMessage::GraphUpdate(update) => {
				self.snapshot = Arc::new(update.into());
				self.revision += 1;
				info!(
					"graph snapshot r{}: {} files, {} clusters",
					self.revision,
					self.snapshot.nodes.len(),
					self.snapshot.clusters_by_id.len()
				);
				StoreChange::Graph
			}
			ServerMessage::ActivityLog { logs } => {
				let skip = logs.len().saturating_sub(LOG_CAPACITY);
				self.logs = logs.into_iter().skip(skip).collect();
				StoreChange::Log
			}
			ServerMessage::ActivityLogEntry { entry } => {
				self.logs.push_back(entry);
				while self.logs.len() > LOG_CAPACITY {
					self.logs.pop_front();
				}
				StoreChange::Log
			}
			ServerMessage::Unknown => {
				debug!("ignoring message with unknown type");
				return;
			}
		};
		self.notify(change);
	}

	fn notify(&self, change: StoreChange) {
		for (_, listener) in &self.listeners {
			listener(self, change);
		}
	}
}
