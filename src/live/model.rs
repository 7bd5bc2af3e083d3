use std::collections::BTreeMap;

use serde::Deserialize;

pub type ClusterId = i64;

/// Cluster id given to files the backend has not clustered yet; never a key
/// of [`GraphSnapshot::clusters_by_id`].
pub const UNCLUSTERED: ClusterId = -1;

#[derive(Clone, Debug, PartialEq)]
pub struct FileNode {
	pub id: String,
	pub name: String,
	pub cluster_id: ClusterId,
	pub word_count: u64,
	pub keywords: Vec<String>,
	pub snippet: String,
	pub cluster_name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClusterSummary {
	pub id: ClusterId,
	pub name: String,
	pub file_count: usize,
}

impl ClusterSummary {
	/// Palette slot for this cluster; colors are never taken from the server.
	pub fn color_index(&self) -> ClusterId {
		self.id
	}
}

/// One authoritative picture of the organised files, replaced wholesale on
/// every `graph_update`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphSnapshot {
	pub nodes: Vec<FileNode>,
	pub clusters: Vec<ClusterSummary>,
	pub clusters_by_id: BTreeMap<ClusterId, ClusterSummary>,
	pub total_files: usize,
}

impl GraphSnapshot {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn files_tracked(&self) -> usize {
		self.nodes.len()
	}

	pub fn total_words(&self) -> u64 {
		self.nodes.iter().map(|n| n.word_count).sum()
	}

	pub fn files_in(&self, cluster: ClusterId) -> impl Iterator<Item = &FileNode> {
		self.nodes.iter().filter(move |n| n.cluster_id == cluster)
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
	Success,
	Error,
	#[default]
	#[serde(other)]
	Info,
}

impl LogKind {
	pub fn css_class(self) -> &'static str {
		match self {
			LogKind::Info => "log-info",
			LogKind::Success => "log-success",
			LogKind::Error => "log-error",
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogEntry {
	pub time_str: String,
	pub message: String,
	#[serde(rename = "type")]
	pub kind: LogKind,
	pub icon: Option<String>,
	pub timestamp: Option<f64>,
}
