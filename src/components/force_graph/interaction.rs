use super::state::{ForceGraphState, Gesture};
use super::types::NodeKind;

/// Pointer travel (screen px) below which a press-release counts as a click.
const CLICK_SLOP: f64 = 3.0;
const WHEEL_ZOOM_IN: f64 = 1.1;
const WHEEL_ZOOM_OUT: f64 = 0.9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cursor {
	Default,
	Pointer,
	Grabbing,
}

impl Cursor {
	pub fn css(self) -> &'static str {
		match self {
			Cursor::Default => "default",
			Cursor::Pointer => "pointer",
			Cursor::Grabbing => "grabbing",
		}
	}
}

/// Side effects a click asks the host component to carry out.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
	/// Animate the camera onto these scene nodes.
	FitNodes { nodes: Vec<usize>, padding: f64 },
	/// Ask the backend to open this file with the OS default handler.
	OpenFile(String),
}

impl ForceGraphState {
	pub fn cursor(&self) -> Cursor {
		match self.gesture {
			Gesture::Drag { moved: true, .. } | Gesture::Pan { moved: true, .. } => Cursor::Grabbing,
			_ if self.hover.node.is_some() => Cursor::Pointer,
			_ => Cursor::Default,
		}
	}

	/// Starts a node drag when the press lands on a node, a pan otherwise.
	pub fn pointer_down(&mut self, x: f64, y: f64) {
		self.camera.interrupt();
		self.gesture = match self.pick.sample(x, y) {
			Some(node) => Gesture::Drag {
				node,
				start_x: x,
				start_y: y,
				moved: false,
			},
			None => Gesture::Pan {
				start_x: x,
				start_y: y,
				origin: self.camera.view,
				moved: false,
			},
		};
	}

	/// Returns true when the hovered node changed.
	pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
		self.hover.pointer = (x, y);
		match &mut self.gesture {
			Gesture::Drag {
				node,
				start_x,
				start_y,
				moved,
			} => {
				*moved |= (x - *start_x).hypot(y - *start_y) > CLICK_SLOP;
				if *moved {
					let (node, target) = (*node, self.camera.view.screen_to_graph(x, y));
					self.layout.pin(node, target);
					self.mark_dirty();
				}
				false
			}
			Gesture::Pan {
				start_x,
				start_y,
				origin,
				moved,
			} => {
				*moved |= (x - *start_x).hypot(y - *start_y) > CLICK_SLOP;
				self.camera.view.x = origin.x + (x - *start_x);
				self.camera.view.y = origin.y + (y - *start_y);
				self.mark_dirty();
				false
			}
			Gesture::Idle => self.set_hover(self.pick.sample(x, y)),
		}
	}

	/// Ends the gesture; a press-release without travel on a node is a click.
	pub fn pointer_up(&mut self) -> Option<Command> {
		match std::mem::replace(&mut self.gesture, Gesture::Idle) {
			Gesture::Drag { node, moved: false, .. } => self.click(node),
			_ => None,
		}
	}

	/// Returns true when the hovered node changed.
	pub fn pointer_leave(&mut self) -> bool {
		self.gesture = Gesture::Idle;
		self.set_hover(None)
	}

	pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) {
		self.camera.interrupt();
		let factor = if delta_y > 0.0 {
			WHEEL_ZOOM_OUT
		} else {
			WHEEL_ZOOM_IN
		};
		self.camera.view.zoom_at(x, y, factor);
		self.mark_dirty();
	}

	pub fn click(&self, node: usize) -> Option<Command> {
		let target = self.scene.nodes.get(node)?;
		match target.kind {
			NodeKind::Cluster { .. } => Some(Command::FitNodes {
				nodes: self
					.scene
					.nodes
					.iter()
					.enumerate()
					.filter(|(_, n)| n.cluster == target.cluster)
					.map(|(i, _)| i)
					.collect(),
				padding: self.params.cluster_fit_padding,
			}),
			NodeKind::File { .. } => Some(Command::OpenFile(target.key.display_id())),
		}
	}

	fn set_hover(&mut self, node: Option<usize>) -> bool {
		if self.hover.node == node {
			return false;
		}
		self.hover.node = node;
		self.mark_dirty();
		true
	}
}
