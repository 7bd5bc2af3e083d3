use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::camera::ViewTransform;
use super::layout::Point;
use super::pick::PickBuffer;
use super::types::{NodeKind, Scene, SceneNode};

const BACKGROUND: &str = "#1a1a2e";
const FONT_FAMILY: &str = "Inter, system-ui, sans-serif";
pub const CLUSTER_PICK_RADIUS: f64 = 14.0;
pub const FILE_PICK_RADIUS: f64 = 10.0;

/// The subset of a 2D canvas context the renderer draws with.
pub trait Surface {
	fn save(&self);
	fn restore(&self);
	fn apply_view(&self, view: &ViewTransform);
	fn clear(&self, width: f64, height: f64, color: &str);
	fn set_fill(&self, color: &str);
	fn set_stroke(&self, color: &str);
	fn set_line_width(&self, width: f64);
	fn set_line_dash(&self, segments: &[f64]);
	fn begin_path(&self);
	fn move_to(&self, x: f64, y: f64);
	fn line_to(&self, x: f64, y: f64);
	fn quadratic_to(&self, cx: f64, cy: f64, x: f64, y: f64);
	fn circle(&self, x: f64, y: f64, r: f64);
	fn close_path(&self);
	fn fill(&self);
	fn stroke(&self);
	/// Fills the current path with a radial gradient from `r0` to `r1`.
	fn fill_radial(&self, x: f64, y: f64, r0: f64, r1: f64, stops: &[(f32, String)]);
	fn set_font(&self, font: &str);
	fn set_text_align(&self, align: &str);
	fn set_text_baseline(&self, baseline: &str);
	fn measure_text(&self, text: &str) -> f64;
	fn fill_text(&self, text: &str, x: f64, y: f64);
}

impl Surface for CanvasRenderingContext2d {
	fn save(&self) {
		CanvasRenderingContext2d::save(self);
	}

	fn restore(&self) {
		CanvasRenderingContext2d::restore(self);
	}

	fn apply_view(&self, view: &ViewTransform) {
		let _ = self.translate(view.x, view.y);
		let _ = self.scale(view.k, view.k);
	}

	fn clear(&self, width: f64, height: f64, color: &str) {
		self.set_fill_style_str(color);
		self.fill_rect(0.0, 0.0, width, height);
	}

	fn set_fill(&self, color: &str) {
		self.set_fill_style_str(color);
	}

	fn set_stroke(&self, color: &str) {
		self.set_stroke_style_str(color);
	}

	fn set_line_width(&self, width: f64) {
		CanvasRenderingContext2d::set_line_width(self, width);
	}

	fn set_line_dash(&self, segments: &[f64]) {
		let array = js_sys::Array::new();
		for s in segments {
			array.push(&JsValue::from_f64(*s));
		}
		let _ = CanvasRenderingContext2d::set_line_dash(self, &array);
	}

	fn begin_path(&self) {
		CanvasRenderingContext2d::begin_path(self);
	}

	fn move_to(&self, x: f64, y: f64) {
		CanvasRenderingContext2d::move_to(self, x, y);
	}

	fn line_to(&self, x: f64, y: f64) {
		CanvasRenderingContext2d::line_to(self, x, y);
	}

	fn quadratic_to(&self, cx: f64, cy: f64, x: f64, y: f64) {
		self.quadratic_curve_to(cx, cy, x, y);
	}

	fn circle(&self, x: f64, y: f64, r: f64) {
		let _ = self.arc(x, y, r, 0.0, 2.0 * PI);
	}

	fn close_path(&self) {
		CanvasRenderingContext2d::close_path(self);
	}

	fn fill(&self) {
		CanvasRenderingContext2d::fill(self);
	}

	fn stroke(&self) {
		CanvasRenderingContext2d::stroke(self);
	}

	fn fill_radial(&self, x: f64, y: f64, r0: f64, r1: f64, stops: &[(f32, String)]) {
		let Ok(gradient) = self.create_radial_gradient(x, y, r0, x, y, r1) else {
			return;
		};
		for (offset, color) in stops {
			let _ = gradient.add_color_stop(*offset, color);
		}
		#[allow(deprecated)]
		self.set_fill_style(&gradient);
		CanvasRenderingContext2d::fill(self);
	}

	fn set_font(&self, font: &str) {
		CanvasRenderingContext2d::set_font(self, font);
	}

	fn set_text_align(&self, align: &str) {
		CanvasRenderingContext2d::set_text_align(self, align);
	}

	fn set_text_baseline(&self, baseline: &str) {
		CanvasRenderingContext2d::set_text_baseline(self, baseline);
	}

	fn measure_text(&self, text: &str) -> f64 {
		CanvasRenderingContext2d::measure_text(self, text)
			.map(|m| m.width())
			.unwrap_or(0.0)
	}

	fn fill_text(&self, text: &str, x: f64, y: f64) {
		let _ = CanvasRenderingContext2d::fill_text(self, text, x, y);
	}
}

/// Everything one frame needs, borrowed from the graph state.
pub struct Frame<'a> {
	pub scene: &'a Scene,
	pub positions: &'a [Point],
	pub view: ViewTransform,
	pub hovered: Option<usize>,
	pub width: f64,
	pub height: f64,
}

impl Frame<'_> {
	/// Position of node `i`, or None if the layout has not placed it yet.
	fn position(&self, i: usize) -> Option<Point> {
		self.positions.get(i).copied().filter(|p| p.is_finite())
	}
}

pub fn cluster_radius(file_count: usize) -> f64 {
	28.0 + 4.0 * file_count as f64
}

pub fn file_radius(hovered: bool, k: f64) -> f64 {
	let base = if hovered { 6.0 } else { 3.5 };
	base / k.sqrt()
}

/// Visible paint: links first, then nodes, in graph space.
pub fn paint_scene(surface: &impl Surface, frame: &Frame) {
	surface.clear(frame.width, frame.height, BACKGROUND);
	surface.save();
	surface.apply_view(&frame.view);
	draw_links(surface, frame);
	for (i, node) in frame.scene.nodes.iter().enumerate() {
		let Some(p) = frame.position(i) else {
			continue;
		};
		let hovered = frame.hovered == Some(i);
		match &node.kind {
			NodeKind::Cluster { file_count } => {
				draw_cluster(surface, node, p, *file_count, hovered, frame.view.k)
			}
			NodeKind::File { .. } => draw_file(surface, node, p, hovered, frame.view.k),
		}
	}
	surface.restore();
}

/// Pick paint: fixed screen-space discs, one color key per node. The cluster
/// disc is much smaller than its halo so files inside stay pickable.
pub fn paint_pick(pick: &mut PickBuffer, frame: &Frame) {
	pick.clear();
	for (i, node) in frame.scene.nodes.iter().enumerate() {
		let Some(p) = frame.position(i) else {
			continue;
		};
		let s = frame.view.graph_to_screen(p);
		let radius = if node.is_cluster() {
			CLUSTER_PICK_RADIUS
		} else {
			FILE_PICK_RADIUS
		};
		pick.fill_disc(s.x, s.y, radius, i);
	}
}

fn draw_links(surface: &impl Surface, frame: &Frame) {
	surface.set_line_width(0.8);
	for link in &frame.scene.links {
		let (Some(a), Some(b)) = (frame.position(link.source), frame.position(link.target)) else {
			continue;
		};
		surface.begin_path();
		surface.move_to(a.x, a.y);
		surface.line_to(b.x, b.y);
		surface.set_stroke(&format!("{}25", link.color));
		surface.stroke();
	}
}

fn draw_cluster(surface: &impl Surface, node: &SceneNode, p: Point, file_count: usize, hovered: bool, k: f64) {
	let (x, y, color) = (p.x, p.y, node.color);
	let radius = cluster_radius(file_count);

	surface.begin_path();
	surface.circle(x, y, radius);
	surface.fill_radial(
		x,
		y,
		radius * 0.3,
		radius,
		&[
			(0.0, format!("{color}22")),
			(0.7, format!("{color}11")),
			(1.0, format!("{color}00")),
		],
	);

	surface.begin_path();
	surface.circle(x, y, radius);
	surface.set_line_dash(&[4.0, 4.0]);
	surface.set_stroke(&format!("{color}55"));
	surface.set_line_width(1.5);
	surface.stroke();
	surface.set_line_dash(&[]);

	let font_size = (11.0 / k).max(3.0);
	surface.set_font(&format!("600 {font_size}px {FONT_FAMILY}"));
	let text_width = surface.measure_text(&node.label);
	let (pill_w, pill_h) = (text_width + font_size * 1.6, font_size * 1.8);
	let pill_y = y + radius * 0.15;
	rounded_pill(surface, x, pill_y, pill_w, pill_h);
	surface.set_fill(&if hovered {
		color.to_string()
	} else {
		format!("{color}dd")
	});
	surface.fill();

	surface.set_text_align("center");
	surface.set_text_baseline("middle");
	surface.set_fill("#fff");
	surface.fill_text(&node.label, x, pill_y);

	let badge = format!("{file_count} file{}", if file_count == 1 { "" } else { "s" });
	let badge_size = (9.0 / k).max(2.5);
	surface.set_font(&format!("500 {badge_size}px {FONT_FAMILY}"));
	surface.set_fill(&format!("{color}99"));
	surface.fill_text(&badge, x, pill_y + pill_h * 0.9);
}

fn rounded_pill(surface: &impl Surface, cx: f64, cy: f64, w: f64, h: f64) {
	let (left, right, top, bottom) = (cx - w / 2.0, cx + w / 2.0, cy - h / 2.0, cy + h / 2.0);
	let r = h / 2.0;
	surface.begin_path();
	surface.move_to(left + r, top);
	surface.line_to(right - r, top);
	surface.quadratic_to(right, top, right, cy);
	surface.quadratic_to(right, bottom, right - r, bottom);
	surface.line_to(left + r, bottom);
	surface.quadratic_to(left, bottom, left, cy);
	surface.quadratic_to(left, top, left + r, top);
	surface.close_path();
}

fn draw_file(surface: &impl Surface, node: &SceneNode, p: Point, hovered: bool, k: f64) {
	let (x, y, color) = (p.x, p.y, node.color);
	let r = file_radius(hovered, k);

	if hovered {
		surface.begin_path();
		surface.circle(x, y, r * 2.5);
		surface.set_fill(&format!("{color}33"));
		surface.fill();
	}

	surface.begin_path();
	surface.circle(x, y, r);
	surface.set_fill(color);
	surface.fill();
	surface.set_stroke("#fff");
	surface.set_line_width(0.8 / k);
	surface.stroke();

	let font_size = (9.0 / k).max(2.5);
	surface.set_font(&format!("400 {font_size}px {FONT_FAMILY}"));
	surface.set_text_align("center");
	surface.set_text_baseline("top");
	surface.set_fill(if hovered { "#fff" } else { "#cbd5e1" });
	surface.fill_text(&node.label, x, y + r + 2.0 / k);
}
