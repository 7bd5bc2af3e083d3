use std::sync::Arc;

use super::camera::{Camera, ViewTransform};
use super::layout::{ForceLayout, Point};
use super::pick::PickBuffer;
use super::render::{self, Frame, Surface};
use super::scene::build_scene;
use super::tooltip::TooltipModel;
use super::types::Scene;
use crate::config::LayoutParams;
use crate::live::GraphSnapshot;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
	Idle,
	Drag {
		node: usize,
		start_x: f64,
		start_y: f64,
		moved: bool,
	},
	Pan {
		start_x: f64,
		start_y: f64,
		origin: ViewTransform,
		moved: bool,
	},
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HoverState {
	pub node: Option<usize>,
	pub pointer: (f64, f64),
}

/// Everything the canvas needs between frames: the scene derived from the
/// latest snapshot, its layout, the camera and the pointer state.
pub struct ForceGraphState {
	pub scene: Scene,
	pub(super) layout: ForceLayout,
	pub camera: Camera,
	pub(super) gesture: Gesture,
	pub hover: HoverState,
	pub(super) pick: PickBuffer,
	pub width: f64,
	pub height: f64,
	pub(super) params: LayoutParams,
	snapshot: Arc<GraphSnapshot>,
	dirty: bool,
}

impl ForceGraphState {
	pub fn new(snapshot: Arc<GraphSnapshot>, params: LayoutParams, width: f64, height: f64, now_ms: f64) -> Self {
		let scene = build_scene(&snapshot);
		let layout = ForceLayout::new(&scene, params, None, now_ms);
		Self {
			scene,
			layout,
			camera: Camera::new(width, height),
			gesture: Gesture::Idle,
			hover: HoverState::default(),
			pick: PickBuffer::new(width, height),
			width,
			height,
			params,
			snapshot,
			dirty: true,
		}
	}

	/// Swaps in a new snapshot. Returns false when it is the one already shown.
	pub fn set_snapshot(&mut self, snapshot: Arc<GraphSnapshot>, now_ms: f64) -> bool {
		if Arc::ptr_eq(&self.snapshot, &snapshot) {
			return false;
		}
		let hovered_key = self
			.hover
			.node
			.and_then(|i| self.scene.nodes.get(i))
			.map(|n| n.key.clone());

		let scene = build_scene(&snapshot);
		self.layout = ForceLayout::new(&scene, self.params, Some(&self.layout), now_ms);
		self.hover.node = hovered_key.and_then(|key| scene.index_of(&key));
		self.scene = scene;
		self.snapshot = snapshot;
		// node indices changed under any gesture in flight
		self.gesture = Gesture::Idle;
		self.pick.clear();
		self.dirty = true;
		true
	}

	pub fn positions(&self) -> &[Point] {
		self.layout.positions()
	}

	pub fn is_empty(&self) -> bool {
		self.scene.is_empty()
	}

	/// Whether another animation frame would change anything on screen.
	pub fn needs_frame(&self) -> bool {
		self.dirty || self.layout.is_running() || self.layout.fit_pending() || self.camera.is_animating()
	}

	pub fn mark_dirty(&mut self) {
		self.dirty = true;
	}

	/// One frame of simulation and camera motion.
	pub fn advance(&mut self, now_ms: f64) {
		if self.layout.tick() {
			self.dirty = true;
		}
		if self.layout.take_fit(now_ms) {
			let all: Vec<usize> = (0..self.scene.nodes.len()).collect();
			self.fit_to(&all, self.params.fit_padding, now_ms);
		}
		if self.camera.is_animating() {
			self.camera.advance(now_ms);
			self.dirty = true;
		}
	}

	/// Animates the camera to frame `nodes` with `padding` screen pixels.
	pub fn fit_to(&mut self, nodes: &[usize], padding: f64, now_ms: f64) {
		let positions = self.layout.positions();
		let points = nodes.iter().filter_map(|&i| positions.get(i).copied());
		if let Some(target) = ViewTransform::fitting(points, self.width, self.height, padding) {
			self.camera.animate_to(target, now_ms, self.params.fit_duration_ms);
			self.dirty = true;
		}
	}

	/// Paints the visible frame and refreshes the pick buffer to match it.
	pub fn paint(&mut self, surface: &impl Surface) {
		let frame = Frame {
			scene: &self.scene,
			positions: self.layout.positions(),
			view: self.camera.view,
			hovered: self.hover.node,
			width: self.width,
			height: self.height,
		};
		render::paint_scene(surface, &frame);
		render::paint_pick(&mut self.pick, &frame);
		self.dirty = false;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.pick.resize(width, height);
		self.dirty = true;
	}

	/// Tooltip for the hovered file node, if any.
	pub fn tooltip(&self) -> Option<TooltipModel> {
		let node = self.scene.nodes.get(self.hover.node?)?;
		let (x, y) = self.hover.pointer;
		TooltipModel::for_node(node, x, y, self.width, self.height)
	}
}

/// Coalesces animation-frame requests: at most one is outstanding.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameGate {
	pending: bool,
}

impl FrameGate {
	/// True if the caller should actually request a frame.
	pub fn try_request(&mut self) -> bool {
		!std::mem::replace(&mut self.pending, true)
	}

	pub fn complete(&mut self) {
		self.pending = false;
	}

	pub fn is_pending(&self) -> bool {
		self.pending
	}
}
