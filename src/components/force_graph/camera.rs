use super::layout::Point;

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;
/// Fitting a single node (or a tight group) never zooms in further than this.
const MAX_FIT_ZOOM: f64 = 4.0;

pub fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Screen = graph * k + (x, y).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl ViewTransform {
	pub fn centered(width: f64, height: f64) -> Self {
		Self {
			x: width / 2.0,
			y: height / 2.0,
			k: 1.0,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Point {
		Point::new((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	pub fn graph_to_screen(&self, p: Point) -> Point {
		Point::new(p.x * self.k + self.x, p.y * self.k + self.y)
	}

	/// Zooms by `factor` keeping the graph point under (sx, sy) fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}

	/// Transform that frames every finite point inside the viewport with
	/// `padding` screen pixels on each side.
	pub fn fitting(points: impl IntoIterator<Item = Point>, width: f64, height: f64, padding: f64) -> Option<Self> {
		let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
		let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
		for p in points.into_iter().filter(|p| p.is_finite()) {
			min_x = min_x.min(p.x);
			min_y = min_y.min(p.y);
			max_x = max_x.max(p.x);
			max_y = max_y.max(p.y);
		}
		if !min_x.is_finite() {
			return None;
		}
		let avail_w = (width - 2.0 * padding).max(1.0);
		let avail_h = (height - 2.0 * padding).max(1.0);
		let (span_x, span_y) = (max_x - min_x, max_y - min_y);
		let kx = if span_x > 0.0 { avail_w / span_x } else { MAX_FIT_ZOOM };
		let ky = if span_y > 0.0 { avail_h / span_y } else { MAX_FIT_ZOOM };
		let k = kx.min(ky).min(MAX_FIT_ZOOM).clamp(MIN_ZOOM, MAX_ZOOM);
		let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
		Some(Self {
			x: width / 2.0 - cx * k,
			y: height / 2.0 - cy * k,
			k,
		})
	}

	fn lerp(&self, to: &Self, t: f64) -> Self {
		Self {
			x: self.x + (to.x - self.x) * t,
			y: self.y + (to.y - self.y) * t,
			k: self.k + (to.k - self.k) * t,
		}
	}
}

#[derive(Clone, Debug)]
struct Transition {
	from: ViewTransform,
	to: ViewTransform,
	start_ms: f64,
	duration_ms: f64,
}

#[derive(Clone, Debug)]
pub struct Camera {
	pub view: ViewTransform,
	transition: Option<Transition>,
}

impl Camera {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			view: ViewTransform::centered(width, height),
			transition: None,
		}
	}

	pub fn animate_to(&mut self, target: ViewTransform, now_ms: f64, duration_ms: f64) {
		if duration_ms <= 0.0 {
			self.view = target;
			self.transition = None;
			return;
		}
		self.transition = Some(Transition {
			from: self.view,
			to: target,
			start_ms: now_ms,
			duration_ms,
		});
	}

	/// Steps any running transition; true while one is still in flight.
	pub fn advance(&mut self, now_ms: f64) -> bool {
		let Some(tr) = &self.transition else {
			return false;
		};
		let t = ((now_ms - tr.start_ms) / tr.duration_ms).clamp(0.0, 1.0);
		self.view = tr.from.lerp(&tr.to, ease_out_cubic(t));
		if t >= 1.0 {
			self.transition = None;
			return false;
		}
		true
	}

	pub fn is_animating(&self) -> bool {
		self.transition.is_some()
	}

	/// User input wins over a running transition.
	pub fn interrupt(&mut self) {
		self.transition = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn screen_graph_round_trip() {
		let view = ViewTransform { x: 120.0, y: -30.0, k: 2.5 };
		let p = view.screen_to_graph(300.0, 200.0);
		let back = view.graph_to_screen(p);
		assert!(close(back.x, 300.0) && close(back.y, 200.0));
	}

	#[test]
	fn zoom_keeps_anchor_point_fixed_and_clamps() {
		let mut view = ViewTransform::centered(800.0, 600.0);
		let anchor = view.screen_to_graph(100.0, 50.0);
		view.zoom_at(100.0, 50.0, 1.1);
		let after = view.graph_to_screen(anchor);
		assert!(close(after.x, 100.0) && close(after.y, 50.0));
		for _ in 0..100 {
			view.zoom_at(0.0, 0.0, 1.1);
		}
		assert!(close(view.k, MAX_ZOOM));
	}

	#[test]
	fn fitting_frames_all_points_inside_padding() {
		let pts = [Point::new(-100.0, -50.0), Point::new(300.0, 150.0), Point::new(f64::NAN, 0.0)];
		let view = ViewTransform::fitting(pts, 800.0, 600.0, 60.0).expect("has points");
		for p in &pts[..2] {
			let s = view.graph_to_screen(*p);
			assert!(s.x >= 60.0 - 1e-6 && s.x <= 740.0 + 1e-6);
			assert!(s.y >= 60.0 - 1e-6 && s.y <= 540.0 + 1e-6);
		}
	}

	#[test]
	fn fitting_nothing_finite_is_none() {
		assert!(ViewTransform::fitting([Point::new(f64::NAN, 1.0)], 800.0, 600.0, 60.0).is_none());
		assert!(ViewTransform::fitting(std::iter::empty(), 800.0, 600.0, 60.0).is_none());
	}

	#[test]
	fn single_point_fit_centers_without_blowing_up() {
		let view = ViewTransform::fitting([Point::new(10.0, 10.0)], 800.0, 600.0, 60.0).expect("one point");
		assert!(close(view.k, MAX_FIT_ZOOM));
		let s = view.graph_to_screen(Point::new(10.0, 10.0));
		assert!(close(s.x, 400.0) && close(s.y, 300.0));
	}

	#[test]
	fn transition_eases_to_target() {
		let mut cam = Camera::new(800.0, 600.0);
		let target = ViewTransform { x: 0.0, y: 0.0, k: 2.0 };
		cam.animate_to(target, 1_000.0, 400.0);
		assert!(cam.advance(1_200.0));
		assert!(cam.view.k > 1.0 && cam.view.k < 2.0);
		assert!(!cam.advance(1_400.0));
		assert_eq!(cam.view, target);
		assert!(!cam.is_animating());
	}
}
