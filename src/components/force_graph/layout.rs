use std::collections::HashMap;
use std::f64::consts::TAU;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::types::{Scene, SceneKey};
use crate::config::LayoutParams;

const FILE_MASS: f32 = 10.0;
const CLUSTER_MASS: f32 = 30.0;
const SPIRAL_STEP: f64 = 20.0;
/// `force_graph` displaces a node by roughly `force * node_speed * dt³` per
/// update, so a tick is a fixed number of fixed-size updates and the alpha
/// schedule scales the forces instead of the step.
const STEP_DT: f32 = 0.05;
const SUBSTEPS: usize = 8;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn is_finite(self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}
}

/// Golden-angle spiral around the origin; seeds nodes with no prior position.
fn spiral_seed(k: usize) -> Point {
	let golden_angle = TAU * (1.0 - 1.0 / 1.618_033_988_75);
	let t = k as f64 + 0.5;
	let r = SPIRAL_STEP * t.sqrt();
	Point::new(r * (t * golden_angle).cos(), r * (t * golden_angle).sin())
}

/// Arms a one-shot "fit camera to everything" once the layout has settled,
/// or once `delay_ms` has elapsed since the layout was built.
#[derive(Clone, Debug)]
pub struct FitGate {
	armed: bool,
	armed_at_ms: f64,
	delay_ms: f64,
}

impl FitGate {
	pub fn new(armed: bool, now_ms: f64, delay_ms: f64) -> Self {
		Self {
			armed,
			armed_at_ms: now_ms,
			delay_ms,
		}
	}

	pub fn poll(&mut self, now_ms: f64, at_rest: bool) -> bool {
		if self.armed && (at_rest || now_ms - self.armed_at_ms >= self.delay_ms) {
			self.armed = false;
			return true;
		}
		false
	}
}

/// Force simulation for one scene: charge repulsion and link springs from
/// `force_graph`, a centering pass, and an alpha schedule that cools the
/// system to rest within `cooldown_ticks`.
pub struct ForceLayout {
	graph: ForceGraph<usize, ()>,
	handles: Vec<DefaultNodeIdx>,
	positions: Vec<Point>,
	pinned: Vec<bool>,
	index: HashMap<SceneKey, usize>,
	alpha: f64,
	ticks: u32,
	params: LayoutParams,
	fit: FitGate,
}

impl ForceLayout {
	/// Builds the simulation. Nodes that already had a position in `previous`
	/// (same [`SceneKey`]) start from it and stay pinned if they were.
	pub fn new(scene: &Scene, params: LayoutParams, previous: Option<&ForceLayout>, now_ms: f64) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: params.charge,
			force_spring: params.spring,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 1.0 - params.velocity_decay,
		});

		let mut handles = Vec::with_capacity(scene.nodes.len());
		let mut positions = Vec::with_capacity(scene.nodes.len());
		let mut pinned = Vec::with_capacity(scene.nodes.len());
		let mut index = HashMap::with_capacity(scene.nodes.len());
		let mut fresh = 0;
		for (i, node) in scene.nodes.iter().enumerate() {
			let carried = previous
				.and_then(|p| p.position_of(&node.key))
				.filter(|p| p.is_finite());
			let is_anchor = carried.is_some() && previous.is_some_and(|p| p.is_pinned(&node.key));
			let seed = carried.unwrap_or_else(|| {
				fresh += 1;
				spiral_seed(i)
			});
			let idx = graph.add_node(NodeData {
				x: seed.x as f32,
				y: seed.y as f32,
				mass: if node.is_cluster() {
					CLUSTER_MASS
				} else {
					FILE_MASS
				},
				is_anchor,
				user_data: i,
			});
			handles.push(idx);
			positions.push(seed);
			pinned.push(is_anchor);
			index.insert(node.key.clone(), i);
		}

		for link in &scene.links {
			if let (Some(&src), Some(&tgt)) = (handles.get(link.source), handles.get(link.target)) {
				graph.add_edge(src, tgt, EdgeData::default());
			}
		}

		let alpha = if handles.is_empty() {
			0.0
		} else if fresh == 0 {
			// same members as before: a gentle reheat is enough
			0.3
		} else {
			1.0
		};

		Self {
			graph,
			handles,
			positions,
			pinned,
			index,
			alpha,
			ticks: 0,
			fit: FitGate::new(!scene.is_empty(), now_ms, params.settle_delay_ms),
			params,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.handles.is_empty()
	}

	pub fn is_running(&self) -> bool {
		!self.is_empty() && self.ticks < self.params.cooldown_ticks && self.alpha >= self.params.alpha_min
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn ticks(&self) -> u32 {
		self.ticks
	}

	pub fn positions(&self) -> &[Point] {
		&self.positions
	}

	pub fn position_of(&self, key: &SceneKey) -> Option<Point> {
		self.index.get(key).map(|&i| self.positions[i])
	}

	pub fn is_pinned(&self, key: &SceneKey) -> bool {
		self.index.get(key).is_some_and(|&i| self.pinned[i])
	}

	/// Advances one cooldown tick. Returns false once the layout is at rest.
	pub fn tick(&mut self) -> bool {
		if !self.is_running() {
			return false;
		}
		let heat = self.alpha as f32;
		self.graph.parameters.force_charge = self.params.charge * heat;
		self.graph.parameters.force_spring = self.params.spring * heat;
		for _ in 0..SUBSTEPS {
			self.graph.update(STEP_DT);
		}
		self.recenter();
		self.sync_positions();
		self.alpha -= self.alpha * self.params.alpha_decay;
		self.ticks += 1;
		true
	}

	/// True until the one-shot fit below has fired.
	pub fn fit_pending(&self) -> bool {
		self.fit.armed
	}

	/// One-shot signal that the camera should now fit the whole scene.
	pub fn take_fit(&mut self, now_ms: f64) -> bool {
		let at_rest = !self.is_running();
		self.fit.poll(now_ms, at_rest)
	}

	/// Pins node `i` at `p` (drag) and keeps the simulation warm.
	pub fn pin(&mut self, i: usize, p: Point) {
		let Some(&handle) = self.handles.get(i) else {
			return;
		};
		self.graph.visit_nodes_mut(|node| {
			if node.index() == handle {
				node.data.x = p.x as f32;
				node.data.y = p.y as f32;
				node.data.is_anchor = true;
			}
		});
		self.positions[i] = p;
		self.pinned[i] = true;
		self.alpha = self.alpha.max(0.3);
		self.ticks = 0;
	}

	fn recenter(&mut self) {
		let (mut sx, mut sy, mut n) = (0.0f64, 0.0f64, 0usize);
		self.graph.visit_nodes(|node| {
			let (x, y) = (node.x() as f64, node.y() as f64);
			if x.is_finite() && y.is_finite() {
				sx += x;
				sy += y;
				n += 1;
			}
		});
		if n == 0 {
			return;
		}
		let (mx, my) = ((sx / n as f64) as f32, (sy / n as f64) as f32);
		self.graph.visit_nodes_mut(|node| {
			if !node.data.is_anchor {
				node.data.x -= mx;
				node.data.y -= my;
			}
		});
	}

	fn sync_positions(&mut self) {
		let positions = &mut self.positions;
		self.graph.visit_nodes(|node| {
			if let Some(slot) = positions.get_mut(node.data.user_data) {
				*slot = Point::new(node.x() as f64, node.y() as f64);
			}
		});
	}

	#[cfg(test)]
	pub fn set_position(&mut self, i: usize, p: Point) {
		self.positions[i] = p;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{NodeKind, SceneLink, SceneNode};

	fn file(i: usize, cluster: i64) -> SceneNode {
		SceneNode {
			key: SceneKey::File(format!("f{i}")),
			label: format!("f{i}"),
			cluster,
			color: "#6366f1",
			kind: NodeKind::File {
				word_count: 0,
				keywords: Vec::new(),
				snippet: String::new(),
				cluster_name: String::new(),
			},
		}
	}

	fn center(id: i64, file_count: usize) -> SceneNode {
		SceneNode {
			key: SceneKey::Cluster(id),
			label: format!("c{id}"),
			cluster: id,
			color: "#6366f1",
			kind: NodeKind::Cluster { file_count },
		}
	}

	fn link(source: usize, target: usize) -> SceneLink {
		SceneLink {
			source,
			target,
			color: "#6366f1",
		}
	}

	/// `files` files all linked to one cluster center, which comes last.
	fn scene(files: usize) -> Scene {
		let mut nodes: Vec<SceneNode> = (0..files).map(|i| file(i, 0)).collect();
		nodes.push(center(0, files));
		let links = (0..files).map(|source| link(source, files)).collect();
		Scene { nodes, links }
	}

	/// Files alternate between clusters 0 and 1; both centers come last.
	fn two_clusters(files: usize) -> Scene {
		let mut nodes: Vec<SceneNode> = (0..files).map(|i| file(i, (i % 2) as i64)).collect();
		nodes.push(center(0, files.div_ceil(2)));
		nodes.push(center(1, files / 2));
		let links = (0..files).map(|source| link(source, files + source % 2)).collect();
		Scene { nodes, links }
	}

	/// One file and one cluster center, with or without the link between them.
	fn pair(linked: bool) -> Scene {
		Scene {
			nodes: vec![file(0, 0), center(0, 1)],
			links: if linked { vec![link(0, 1)] } else { Vec::new() },
		}
	}

	fn distance(a: Point, b: Point) -> f64 {
		(a.x - b.x).hypot(a.y - b.y)
	}

	fn run_to_rest(layout: &mut ForceLayout) {
		while layout.tick() {}
	}

	#[test]
	fn empty_scene_never_simulates() {
		let mut layout = ForceLayout::new(&Scene::default(), LayoutParams::default(), None, 0.0);
		assert!(layout.is_empty());
		assert!(!layout.is_running());
		assert!(!layout.tick());
		assert!(!layout.take_fit(10_000.0));
	}

	#[test]
	fn cools_to_rest_within_cooldown() {
		let params = LayoutParams::default();
		let mut layout = ForceLayout::new(&scene(4), params, None, 0.0);
		let mut ticks = 0;
		while layout.tick() {
			ticks += 1;
			assert!(ticks <= params.cooldown_ticks);
		}
		assert_eq!(layout.ticks(), ticks);
		assert!(!layout.is_running());
		assert!(layout.alpha() < 1.0);
	}

	#[test]
	fn alpha_decays_geometrically() {
		let params = LayoutParams::default();
		let mut layout = ForceLayout::new(&scene(2), params, None, 0.0);
		layout.tick();
		assert!((layout.alpha() - (1.0 - params.alpha_decay)).abs() < 1e-12);
	}

	#[test]
	fn recentering_keeps_the_cloud_around_the_origin() {
		let mut layout = ForceLayout::new(&scene(6), LayoutParams::default(), None, 0.0);
		for _ in 0..10 {
			layout.tick();
		}
		let n = layout.positions().len() as f64;
		let mx: f64 = layout.positions().iter().map(|p| p.x).sum::<f64>() / n;
		let my: f64 = layout.positions().iter().map(|p| p.y).sum::<f64>() / n;
		assert!(mx.abs() < 0.5 && my.abs() < 0.5, "mean ({mx}, {my})");
	}

	#[test]
	fn fit_fires_once_at_rest() {
		let mut layout = ForceLayout::new(&scene(3), LayoutParams::default(), None, 0.0);
		assert!(!layout.take_fit(1.0));
		while layout.tick() {}
		assert!(layout.take_fit(2.0));
		assert!(!layout.take_fit(3.0));
		assert!(!layout.take_fit(1_000_000.0));
	}

	#[test]
	fn fit_fires_after_settle_delay_even_while_running() {
		let params = LayoutParams::default();
		let mut layout = ForceLayout::new(&scene(3), params, None, 1_000.0);
		assert!(layout.is_running());
		assert!(!layout.take_fit(1_000.0 + params.settle_delay_ms - 1.0));
		assert!(layout.take_fit(1_000.0 + params.settle_delay_ms));
		assert!(!layout.take_fit(1_000.0 + 2.0 * params.settle_delay_ms));
	}

	#[test]
	fn surviving_nodes_keep_their_position() {
		let s = scene(3);
		let mut first = ForceLayout::new(&s, LayoutParams::default(), None, 0.0);
		for _ in 0..5 {
			first.tick();
		}
		let key = SceneKey::File("f1".into());
		let before = first.position_of(&key).expect("f1 laid out");
		let second = ForceLayout::new(&s, LayoutParams::default(), Some(&first), 0.0);
		let after = second.position_of(&key).expect("f1 laid out");
		assert!((before.x - after.x).abs() < 1e-3 && (before.y - after.y).abs() < 1e-3);
		assert!(second.alpha() < 1.0);
	}

	#[test]
	fn pin_moves_the_node_and_rewarms() {
		let mut layout = ForceLayout::new(&scene(2), LayoutParams::default(), None, 0.0);
		run_to_rest(&mut layout);
		layout.pin(0, Point::new(42.0, -7.0));
		assert!(layout.is_running());
		assert_eq!(layout.positions()[0], Point::new(42.0, -7.0));
		layout.tick();
		let p = layout.positions()[0];
		assert!((p.x - 42.0).abs() < 1e-3 && (p.y + 7.0).abs() < 1e-3);
	}

	#[test]
	fn files_group_around_their_own_cluster() {
		let files = 20;
		let mut layout = ForceLayout::new(&two_clusters(files), LayoutParams::default(), None, 0.0);
		run_to_rest(&mut layout);
		let p = layout.positions();
		let centers = [p[files], p[files + 1]];
		assert!(distance(centers[0], centers[1]) > 150.0);
		let closer_to_own = (0..files)
			.filter(|&i| {
				let own = distance(p[i], centers[i % 2]);
				let other = distance(p[i], centers[1 - i % 2]);
				own < other
			})
			.count();
		assert!(closer_to_own >= 18, "only {closer_to_own} of {files} near their cluster");
	}

	#[test]
	fn linked_file_settles_where_spring_balances_charge() {
		let params = LayoutParams::default();
		let mut layout = ForceLayout::new(&pair(true), params, None, 0.0);
		run_to_rest(&mut layout);
		let d = distance(layout.positions()[0], layout.positions()[1]);
		// spring * d / 2 == charge * m1 * m2 / d²
		let balance = f64::from(2.0 * params.charge * FILE_MASS * CLUSTER_MASS / params.spring).cbrt();
		assert!((d - balance).abs() < 0.1 * balance, "settled at {d}, balance {balance}");
	}

	#[test]
	fn unlinked_nodes_separate_under_charge() {
		let mut layout = ForceLayout::new(&pair(false), LayoutParams::default(), None, 0.0);
		let seeded = distance(layout.positions()[0], layout.positions()[1]);
		run_to_rest(&mut layout);
		let d = distance(layout.positions()[0], layout.positions()[1]);
		assert!(d > 3.0 * seeded, "seeded {seeded} apart, ended {d}");
	}

	#[test]
	fn linking_a_distant_pair_pulls_it_together() {
		let params = LayoutParams::default();
		let mut apart = ForceLayout::new(&pair(false), params, None, 0.0);
		run_to_rest(&mut apart);
		let seeded = distance(apart.positions()[0], apart.positions()[1]);

		let mut linked = ForceLayout::new(&pair(true), params, Some(&apart), 0.0);
		assert!(linked.alpha() < 1.0);
		run_to_rest(&mut linked);
		let d = distance(linked.positions()[0], linked.positions()[1]);
		assert!(d < 0.5 * seeded, "seeded {seeded} apart, ended {d}");
	}

	#[test]
	fn pinned_nodes_stay_pinned_in_the_next_layout() {
		let params = LayoutParams::default();
		let mut first = ForceLayout::new(&scene(3), params, None, 0.0);
		run_to_rest(&mut first);
		let spot = Point::new(240.0, -90.0);
		first.pin(1, spot);

		let mut second = ForceLayout::new(&scene(4), params, Some(&first), 0.0);
		let key = SceneKey::File("f1".into());
		assert!(second.is_pinned(&key));
		assert!(!second.is_pinned(&SceneKey::File("f0".into())));
		assert!(!second.is_pinned(&SceneKey::File("f3".into())));
		run_to_rest(&mut second);
		let p = second.position_of(&key).expect("f1 laid out");
		assert!(distance(p, spot) < 1e-3, "pinned node drifted to {p:?}");
	}

	#[test]
	fn spiral_seeds_are_distinct() {
		let seeds: Vec<Point> = (0..50).map(spiral_seed).collect();
		for (i, a) in seeds.iter().enumerate() {
			for b in &seeds[i + 1..] {
				assert!((a.x - b.x).hypot(a.y - b.y) > 1.0);
			}
		}
	}
}
