/// Offscreen hit-test raster in screen pixels. Each node is painted as a disc
/// in its own color key; sampling the pixel under the pointer yields the
/// topmost (last painted) node. Never shown to the user.
#[derive(Clone, Debug, Default)]
pub struct PickBuffer {
	width: usize,
	height: usize,
	keys: Vec<u32>,
}

/// Key 0 is the background; node `i` paints `i + 1`.
pub fn color_key(node: usize) -> u32 {
	u32::try_from(node).map_or(u32::MAX, |n| n.saturating_add(1))
}

impl PickBuffer {
	pub fn new(width: f64, height: f64) -> Self {
		let mut buffer = Self::default();
		buffer.resize(width, height);
		buffer
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width.max(0.0).round() as usize;
		self.height = height.max(0.0).round() as usize;
		self.keys = vec![0; self.width * self.height];
	}

	pub fn clear(&mut self) {
		self.keys.fill(0);
	}

	/// Fills every pixel whose center lies within `radius` of (cx, cy).
	pub fn fill_disc(&mut self, cx: f64, cy: f64, radius: f64, node: usize) {
		if !(cx.is_finite() && cy.is_finite() && radius > 0.0) {
			return;
		}
		let key = color_key(node);
		let r2 = radius * radius;
		let y0 = (cy - radius).floor().max(0.0) as usize;
		let y1 = ((cy + radius).ceil().max(0.0) as usize).min(self.height);
		let x0 = (cx - radius).floor().max(0.0) as usize;
		let x1 = ((cx + radius).ceil().max(0.0) as usize).min(self.width);
		for py in y0..y1 {
			let dy = py as f64 + 0.5 - cy;
			let row = py * self.width;
			for px in x0..x1 {
				let dx = px as f64 + 0.5 - cx;
				if dx * dx + dy * dy <= r2 {
					self.keys[row + px] = key;
				}
			}
		}
	}

	pub fn sample(&self, x: f64, y: f64) -> Option<usize> {
		if !(x.is_finite() && y.is_finite()) || x < 0.0 || y < 0.0 {
			return None;
		}
		let (px, py) = (x as usize, y as usize);
		if px >= self.width || py >= self.height {
			return None;
		}
		self.keys[py * self.width + px]
			.checked_sub(1)
			.map(|k| k as usize)
	}
}
