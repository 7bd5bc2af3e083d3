use crate::live::{ClusterId, UNCLUSTERED};

pub const CLUSTER_COLORS: &[&str] = &[
	"#6366f1", "#f59e42", "#10b981", "#f43f5e", "#3b82f6", "#a855f7", "#eab308", "#14b8a6",
	"#e11d48", "#8b5cf6", "#22d3ee", "#f97316",
];

/// Palette slot for a cluster id; a pure function of the id.
pub fn cluster_color(id: ClusterId) -> &'static str {
	CLUSTER_COLORS[(id.unsigned_abs() % CLUSTER_COLORS.len() as u64) as usize]
}

/// Color of a file disc. Unclustered files share the first palette slot.
pub fn file_color(cluster: ClusterId) -> &'static str {
	if cluster == UNCLUSTERED {
		CLUSTER_COLORS[0]
	} else {
		cluster_color(cluster)
	}
}

/// Identity of a scene node. Files and cluster centers live in disjoint
/// namespaces, so a file literally named `cluster-3` cannot collide.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SceneKey {
	File(String),
	Cluster(ClusterId),
}

impl SceneKey {
	pub fn display_id(&self) -> String {
		match self {
			SceneKey::File(id) => id.clone(),
			SceneKey::Cluster(id) => format!("cluster-{id}"),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
	File {
		word_count: u64,
		keywords: Vec<String>,
		snippet: String,
		cluster_name: String,
	},
	Cluster {
		file_count: usize,
	},
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
	pub key: SceneKey,
	pub label: String,
	pub cluster: ClusterId,
	pub color: &'static str,
	pub kind: NodeKind,
}

impl SceneNode {
	pub fn is_cluster(&self) -> bool {
		matches!(self.kind, NodeKind::Cluster { .. })
	}
}

/// Edge from a file node to its cluster center, as indices into
/// [`Scene::nodes`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneLink {
	pub source: usize,
	pub target: usize,
	pub color: &'static str,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
	pub nodes: Vec<SceneNode>,
	pub links: Vec<SceneLink>,
}

impl Scene {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn index_of(&self, key: &SceneKey) -> Option<usize> {
		self.nodes.iter().position(|n| &n.key == key)
	}
}
