//! Visual theming for the canvas renderer.
//!
//! Themes only affect drawing. Every theme renders the same simulation.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		let up = |c: u8| (c as f64 + (255.0 - c as f64) * f) as u8;
		Self {
			r: up(self.r),
			g: up(self.g),
			b: up(self.b),
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		let down = |c: u8| (c as f64 * f) as u8;
		Self {
			r: down(self.r),
			g: down(self.g),
			b: down(self.b),
			a: self.a,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}

	/// Parses `#RRGGBB` or `rgb()`/`rgba()` notation. Anything else is gray.
	pub fn parse(css: &str) -> Self {
		let css = css.trim();
		if let Some(hex) = css.strip_prefix('#').filter(|h| h.len() == 6 && h.is_ascii()) {
			let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(128);
			return Color::rgb(channel(0), channel(2), channel(4));
		}
		if css.starts_with("rgb") {
			let nums: Vec<&str> = css
				.trim_start_matches("rgba(")
				.trim_start_matches("rgb(")
				.trim_end_matches(')')
				.split(',')
				.map(str::trim)
				.collect();
			let channel = |i: usize| -> u8 { nums.get(i).and_then(|s| s.parse().ok()).unwrap_or(128) };
			let alpha = nums.get(3).and_then(|s| s.parse::<f64>().ok()).unwrap_or(1.0);
			return Color::rgba(channel(0), channel(1), channel(2), alpha);
		}
		Color::rgb(128, 128, 128)
	}
}

/// A curated color palette for nodes.
#[derive(Clone, Debug)]
pub struct NodePalette {
	pub colors: Vec<Color>,
}

impl NodePalette {
	/// Muted slate blues and teals.
	pub fn slate() -> Self {
		Self {
			colors: vec![
				Color::rgb(94, 129, 172),  // Steel blue
				Color::rgb(129, 161, 193), // Light steel
				Color::rgb(100, 148, 160), // Teal gray
				Color::rgb(136, 160, 175), // Cadet blue
				Color::rgb(108, 142, 173), // Air force blue
				Color::rgb(119, 158, 165), // Desaturated cyan
			],
		}
	}

	/// Saturated categorical colors that read well on white.
	pub fn categorical() -> Self {
		Self {
			colors: vec![
				Color::rgb(25, 118, 210),
				Color::rgb(123, 31, 162),
				Color::rgb(230, 81, 0),
				Color::rgb(46, 125, 50),
				Color::rgb(198, 40, 40),
				Color::rgb(0, 131, 143),
			],
		}
	}

	pub fn get(&self, index: usize) -> Color {
		if self.colors.is_empty() {
			return Color::rgb(128, 128, 128);
		}
		self.colors[index % self.colors.len()]
	}
}

/// Edge visual style.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	pub color: Color,
	/// Line width in screen pixels.
	pub width: f64,
	/// Dash and gap lengths in screen pixels; solid when `None`.
	pub dash: Option<(f64, f64)>,
	pub label_color: Color,
}

/// Node visual style.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Whether nodes have inner gradients
	pub use_gradient: bool,
	/// Border/stroke width in screen pixels (0 = no border)
	pub border_width: f64,
	pub border_color: Color,
	pub label_color: Color,
	/// Ring drawn around the hovered node.
	pub hover_ring: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub name: &'static str,
	pub background: Color,
	pub edge: EdgeStyle,
	pub node: NodeStyle,
	pub palette: NodePalette,
}

impl Theme {
	/// Dark background, muted nodes (default).
	pub fn dark() -> Self {
		Self {
			name: "dark",
			background: Color::rgb(22, 27, 34),
			edge: EdgeStyle {
				color: Color::rgba(140, 160, 180, 0.6),
				width: 1.5,
				dash: None,
				label_color: Color::rgba(200, 210, 220, 0.8),
			},
			node: NodeStyle {
				use_gradient: true,
				border_width: 0.0,
				border_color: Color::rgba(255, 255, 255, 0.0),
				label_color: Color::rgba(255, 255, 255, 0.85),
				hover_ring: Color::rgba(255, 255, 255, 0.8),
			},
			palette: NodePalette::slate(),
		}
	}

	/// White background with outlined, saturated nodes.
	pub fn light() -> Self {
		Self {
			name: "light",
			background: Color::rgb(250, 250, 250),
			edge: EdgeStyle {
				color: Color::rgba(90, 90, 90, 0.7),
				width: 1.0,
				dash: Some((6.0, 3.0)),
				label_color: Color::rgb(60, 60, 60),
			},
			node: NodeStyle {
				use_gradient: false,
				border_width: 1.5,
				border_color: Color::rgb(255, 255, 255),
				label_color: Color::rgb(33, 33, 33),
				hover_ring: Color::rgba(0, 0, 0, 0.6),
			},
			palette: NodePalette::categorical(),
		}
	}

	/// Fill color of a node: its own color, else its palette slot.
	pub fn node_color(&self, explicit: Option<&str>, palette_slot: usize) -> Color {
		explicit
			.map(Color::parse)
			.unwrap_or_else(|| self.palette.get(palette_slot))
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::dark()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_hex_and_functional_colors() {
		assert_eq!(Color::parse("#ff8000"), Color::rgb(255, 128, 0));
		assert_eq!(Color::parse("rgba(1, 2, 3, 0.5)"), Color::rgba(1, 2, 3, 0.5));
		assert_eq!(Color::parse("teal"), Color::rgb(128, 128, 128));
	}

	#[test]
	fn explicit_color_beats_palette() {
		let theme = Theme::light();
		assert_eq!(theme.node_color(Some("#000000"), 3), Color::rgb(0, 0, 0));
		assert_eq!(theme.node_color(None, 7), theme.palette.get(1));
	}
}
