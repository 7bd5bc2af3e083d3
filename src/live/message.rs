//! Inbound socket contract and its normalisation into [`GraphSnapshot`].

use std::collections::{BTreeMap, HashMap};

use log::debug;
use serde::Deserialize;

use super::model::{ClusterId, ClusterSummary, FileNode, GraphSnapshot, LogEntry, UNCLUSTERED};
use crate::error::DashboardError;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
	GraphUpdate(GraphUpdate),
	ActivityLog {
		#[serde(default)]
		logs: Vec<LogEntry>,
	},
	ActivityLogEntry {
		entry: LogEntry,
	},
	#[serde(other)]
	Unknown,
}

impl ServerMessage {
	pub fn parse(raw: &str) -> Result<Self, DashboardError> {
		Ok(serde_json::from_str(raw)?)
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GraphUpdate {
	pub nodes: Option<Vec<WireFile>>,
	pub files: Option<Vec<WireFile>>,
	pub clusters: Option<Vec<WireCluster>>,
	pub clusters_map: Option<HashMap<String, WireCluster>>,
	pub total_files: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireFile {
	pub id: Option<String>,
	pub path: Option<String>,
	pub name: Option<String>,
	pub cluster: Option<ClusterId>,
	pub cluster_id: Option<ClusterId>,
	pub word_count: Option<u64>,
	pub words: Option<u64>,
	pub keywords: Option<Vec<String>>,
	pub snippet: Option<String>,
	pub cluster_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireCluster {
	pub id: Option<ClusterId>,
	pub name: Option<String>,
	pub file_count: Option<usize>,
}

impl WireFile {
	fn into_node(self) -> Option<FileNode> {
		let id = self.id.or(self.path)?;
		let name = self.name.unwrap_or_else(|| {
			id.rsplit(['/', '\\'])
				.next()
				.unwrap_or(id.as_str())
				.to_string()
		});
		Some(FileNode {
			name,
			// `cluster` wins over `cluster_id` when both are sent.
			cluster_id: self.cluster.or(self.cluster_id).unwrap_or(UNCLUSTERED),
			word_count: self.word_count.or(self.words).unwrap_or(0),
			keywords: self.keywords.unwrap_or_default(),
			snippet: self.snippet.unwrap_or_default(),
			cluster_name: self.cluster_name.unwrap_or_default(),
			id,
		})
	}
}

impl From<GraphUpdate> for GraphSnapshot {
	fn from(update: GraphUpdate) -> Self {
		let files = match (update.files, update.nodes) {
			(Some(files), _) if !files.is_empty() => files,
			(_, Some(nodes)) => nodes,
			_ => Vec::new(),
		};
		let nodes: Vec<FileNode> = files
			.into_iter()
			.filter_map(|f| {
				let node = f.into_node();
				if node.is_none() {
					debug!("graph_update: dropping file without id or path");
				}
				node
			})
			.collect();

		let count_files =
			|id: ClusterId| nodes.iter().filter(|n| n.cluster_id == id).count();
		let summarize = |id: ClusterId, wire: WireCluster| ClusterSummary {
			id,
			name: wire.name.unwrap_or_else(|| format!("Cluster {id}")),
			file_count: wire.file_count.unwrap_or_else(|| count_files(id)),
		};

		let mut clusters_by_id = BTreeMap::new();
		for (key, wire) in update.clusters_map.unwrap_or_default() {
			match key.trim().parse::<ClusterId>() {
				Ok(id) if id != UNCLUSTERED => {
					clusters_by_id.insert(id, summarize(id, wire));
				}
				_ => debug!("graph_update: ignoring cluster key {key:?}"),
			}
		}

		let clusters = match update.clusters {
			Some(list) => list
				.into_iter()
				.filter_map(|wire| wire.id.map(|id| summarize(id, wire)))
				.collect(),
			None => clusters_by_id.values().cloned().collect(),
		};

		Self {
			total_files: update.total_files.unwrap_or(0),
			nodes,
			clusters,
			clusters_by_id,
		}
	}
}
