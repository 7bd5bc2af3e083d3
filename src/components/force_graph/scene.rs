use std::collections::BTreeMap;

use super::types::{NodeKind, Scene, SceneKey, SceneLink, SceneNode, cluster_color, file_color};
use crate::live::GraphSnapshot;

/// Derives the renderable scene: one node per file, one center per cluster
/// that at least one file resolves to, and a link from each such file to its
/// center. Files whose cluster is unknown stay unlinked.
pub fn build_scene(snapshot: &GraphSnapshot) -> Scene {
	let mut nodes: Vec<SceneNode> = snapshot
		.nodes
		.iter()
		.map(|file| SceneNode {
			key: SceneKey::File(file.id.clone()),
			label: file.name.clone(),
			cluster: file.cluster_id,
			color: file_color(file.cluster_id),
			kind: NodeKind::File {
				word_count: file.word_count,
				keywords: file.keywords.clone(),
				snippet: file.snippet.clone(),
				cluster_name: file.cluster_name.clone(),
			},
		})
		.collect();

	// cluster id -> index of its center node, in ascending id order
	let mut centers = BTreeMap::new();
	for file in &snapshot.nodes {
		if snapshot.clusters_by_id.contains_key(&file.cluster_id) {
			centers.entry(file.cluster_id).or_insert(usize::MAX);
		}
	}
	for (id, slot) in centers.iter_mut() {
		let summary = &snapshot.clusters_by_id[id];
		*slot = nodes.len();
		nodes.push(SceneNode {
			key: SceneKey::Cluster(*id),
			label: summary.name.clone(),
			cluster: *id,
			color: cluster_color(summary.color_index()),
			kind: NodeKind::Cluster {
				file_count: summary.file_count,
			},
		});
	}

	let links = snapshot
		.nodes
		.iter()
		.enumerate()
		.filter_map(|(source, file)| {
			centers.get(&file.cluster_id).map(|&target| SceneLink {
				source,
				target,
				color: cluster_color(file.cluster_id),
			})
		})
		.collect();

	Scene { nodes, links }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::CLUSTER_COLORS;
	use crate::live::message::ServerMessage;
	use crate::live::{GraphSnapshot, UNCLUSTERED};

	fn snapshot(raw: &str) -> GraphSnapshot {
		match ServerMessage::parse(raw).expect("valid json") {
			ServerMessage::GraphUpdate(update) => update.into(),
			other => panic!("unexpected {other:?}"),
		}
	}

	const FIVE_FILES: &str = r#"{"type":"graph_update",
		"nodes":[
			{"id":"/w/a.txt","name":"a.txt","cluster":0},
			{"id":"/w/b.txt","name":"b.txt","cluster":0},
			{"id":"/w/c.txt","name":"c.txt","cluster":1},
			{"id":"/w/d.txt","name":"d.txt","cluster":1},
			{"id":"/w/e.txt","name":"e.txt","cluster":1}],
		"clusters_map":{"0":{"name":"Recipes","file_count":2},"1":{"name":"Taxes","file_count":3}},
		"total_files":5}"#;

	#[test]
	fn five_files_in_two_clusters() {
		let snap = snapshot(FIVE_FILES);
		let scene = build_scene(&snap);
		let files = scene.nodes.iter().filter(|n| !n.is_cluster()).count();
		let clusters = scene.nodes.iter().filter(|n| n.is_cluster()).count();
		assert_eq!((files, clusters, scene.links.len()), (5, 2, 5));
		assert_eq!(snap.files_tracked(), 5);
	}

	#[test]
	fn every_link_joins_a_file_to_a_cluster() {
		let scene = build_scene(&snapshot(FIVE_FILES));
		for link in &scene.links {
			let (src, tgt) = (&scene.nodes[link.source], &scene.nodes[link.target]);
			assert!(!src.is_cluster());
			assert!(tgt.is_cluster());
			assert_eq!(src.cluster, tgt.cluster);
		}
	}

	#[test]
	fn colors_are_stable_across_rebuilds() {
		let snap = snapshot(FIVE_FILES);
		let (a, b) = (build_scene(&snap), build_scene(&snap));
		assert_eq!(a, b);
		assert_eq!(cluster_color(1), cluster_color(1));
		assert_eq!(cluster_color(-1), cluster_color(1));
		assert_eq!(cluster_color(12), cluster_color(0));
	}

	#[test]
	fn unresolvable_cluster_yields_no_link() {
		let snap = snapshot(
			r#"{"type":"graph_update","nodes":[
				{"id":"x","cluster":7},
				{"id":"y"},
				{"id":"z","cluster":0}],
				"clusters_map":{"0":{"name":"Only"}}}"#,
		);
		let scene = build_scene(&snap);
		assert_eq!(snap.nodes[1].cluster_id, UNCLUSTERED);
		assert_eq!(scene.links.len(), 1);
		assert_eq!(scene.nodes[scene.links[0].source].key, SceneKey::File("z".into()));
		assert_eq!(scene.nodes.len(), 4);
	}

	#[test]
	fn unclustered_files_take_the_first_color() {
		let snap = snapshot(
			r#"{"type":"graph_update","nodes":[{"id":"loose"},{"id":"kept","cluster":1}],
				"clusters_map":{"1":{"name":"One"}}}"#,
		);
		let scene = build_scene(&snap);
		assert_eq!(scene.nodes[0].color, CLUSTER_COLORS[0]);
		assert_eq!(scene.nodes[1].color, cluster_color(1));
		assert_ne!(scene.nodes[0].color, cluster_color(UNCLUSTERED));
	}

	#[test]
	fn unreferenced_clusters_get_no_center() {
		let snap = snapshot(
			r#"{"type":"graph_update","nodes":[{"id":"a","cluster":2}],
				"clusters_map":{"2":{"name":"Used"},"9":{"name":"Empty"}}}"#,
		);
		let scene = build_scene(&snap);
		assert!(scene.index_of(&SceneKey::Cluster(2)).is_some());
		assert!(scene.index_of(&SceneKey::Cluster(9)).is_none());
	}

	#[test]
	fn file_named_like_a_cluster_does_not_collide() {
		let snap = snapshot(
			r#"{"type":"graph_update","nodes":[{"id":"cluster-0","cluster":0}],
				"clusters_map":{"0":{}}}"#,
		);
		let scene = build_scene(&snap);
		assert_eq!(scene.nodes.len(), 2);
		assert_ne!(scene.nodes[0].key, scene.nodes[1].key);
	}

	#[test]
	fn empty_snapshot_gives_empty_scene() {
		assert!(build_scene(&GraphSnapshot::default()).is_empty());
	}
}
