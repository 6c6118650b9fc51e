//! Visual theming for the graph viewer.
//!
//! Provides the node-type palette, the inspection-mode colors and the
//! background/edge/label styles used by the canvas renderer.

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

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Colors handed out to node types, cycled when exhausted.
#[derive(Clone, Debug)]
pub struct NodePalette {
	pub colors: Vec<Color>,
}

impl NodePalette {
	/// Saturated material accents; readable on dark backgrounds (default)
	pub fn material() -> Self {
		Self {
			colors: vec![
				Color::rgb(255, 82, 82),   // Red
				Color::rgb(255, 64, 129),  // Pink
				Color::rgb(224, 64, 251),  // Purple
				Color::rgb(124, 77, 255),  // Deep purple
				Color::rgb(83, 109, 254),  // Indigo
				Color::rgb(68, 138, 255),  // Blue
				Color::rgb(64, 196, 255),  // Light blue
				Color::rgb(24, 255, 255),  // Cyan
				Color::rgb(100, 255, 218), // Teal
				Color::rgb(105, 240, 174), // Green
				Color::rgb(178, 255, 216), // Light green
				Color::rgb(238, 255, 65),  // Lime
				Color::rgb(255, 255, 0),   // Yellow
				Color::rgb(255, 215, 64),  // Amber
				Color::rgb(255, 171, 64),  // Orange
				Color::rgb(255, 110, 64),  // Deep orange
				Color::rgb(255, 138, 101), // Coral
				Color::rgb(255, 128, 171), // Rose
				Color::rgb(179, 136, 255), // Lavender
				Color::rgb(130, 177, 255), // Periwinkle
				Color::rgb(128, 216, 255), // Sky
				Color::rgb(132, 255, 255), // Ice
				Color::rgb(167, 255, 235), // Mint
				Color::rgb(185, 246, 202), // Pale green
				Color::rgb(244, 255, 129), // Pale lime
				Color::rgb(255, 255, 141), // Pale yellow
				Color::rgb(255, 234, 128), // Sand
				Color::rgb(255, 209, 128), // Apricot
				Color::rgb(255, 158, 128), // Salmon
			],
		}
	}

	/// Muted slate blues and teals
	pub fn slate() -> Self {
		Self {
			colors: vec![
				Color::rgb(94, 129, 172),  // Steel blue
				Color::rgb(129, 161, 193), // Light steel
				Color::rgb(100, 148, 160), // Teal gray
				Color::rgb(136, 160, 175), // Cadet blue
				Color::rgb(108, 142, 173), // Air force blue
				Color::rgb(119, 158, 165), // Desaturated cyan
				Color::rgb(143, 163, 180), // Cool gray
				Color::rgb(122, 153, 168), // Dusty blue
			],
		}
	}

	pub fn len(&self) -> usize {
		self.colors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.colors.is_empty()
	}

	/// Color at `index`, wrapping around. An empty palette yields neutral gray.
	pub fn get(&self, index: usize) -> Color {
		match self.colors.len() {
			0 => Color::rgb(128, 128, 128),
			len => self.colors[index % len],
		}
	}
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Primary background color
	pub color: Color,
	/// Secondary color for the radial gradient center
	pub color_secondary: Color,
	pub use_gradient: bool,
	/// Vignette intensity (0.0 = none, 1.0 = strong)
	pub vignette: f64,
}

/// Edge visual style.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	/// Line and arrowhead color when a link is not highlighted.
	pub arrow_color: Color,
}

/// Colors for focus and context inspection.
#[derive(Clone, Debug)]
pub struct FocusPalette {
	pub focused: Color,
	pub neighbor: Color,
	/// Two-hop neighbors in Context mode.
	pub context: Color,
	/// Everything outside the inspected neighborhood.
	pub dimmed: Color,
	pub outgoing: Color,
	pub incoming: Color,
}

/// Label text style.
#[derive(Clone, Debug)]
pub struct LabelStyle {
	pub node_color: Color,
	pub link_color: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub name: &'static str,
	pub background: BackgroundStyle,
	pub edge: EdgeStyle,
	pub focus: FocusPalette,
	pub label: LabelStyle,
	pub palette: NodePalette,
}

impl Theme {
	/// Dark theme with the material palette (default)
	pub fn default_theme() -> Self {
		Self {
			name: "default",
			background: BackgroundStyle {
				color: Color::rgb(17, 17, 17),
				color_secondary: Color::rgb(30, 32, 38),
				use_gradient: true,
				vignette: 0.15,
			},
			edge: EdgeStyle {
				arrow_color: Color::rgba(200, 200, 200, 0.8),
			},
			focus: FocusPalette {
				focused: Color::rgb(255, 235, 59),
				neighbor: Color::rgb(0, 230, 118),
				context: Color::rgba(144, 164, 174, 0.7),
				dimmed: Color::rgba(97, 97, 97, 0.3),
				outgoing: Color::rgb(41, 182, 246),
				incoming: Color::rgb(255, 112, 67),
			},
			label: LabelStyle {
				node_color: Color::rgba(236, 239, 244, 0.9),
				link_color: Color::rgba(200, 200, 200, 0.75),
			},
			palette: NodePalette::material(),
		}
	}

	/// Low-contrast slate theme
	pub fn midnight() -> Self {
		Self {
			name: "midnight",
			background: BackgroundStyle {
				color: Color::rgb(18, 20, 28),
				color_secondary: Color::rgb(25, 28, 38),
				use_gradient: true,
				vignette: 0.2,
			},
			edge: EdgeStyle {
				arrow_color: Color::rgba(100, 120, 150, 0.6),
			},
			focus: FocusPalette {
				focused: Color::rgb(236, 196, 120),
				neighbor: Color::rgb(136, 192, 208),
				context: Color::rgba(110, 125, 150, 0.7),
				dimmed: Color::rgba(70, 76, 90, 0.3),
				outgoing: Color::rgb(129, 161, 193),
				incoming: Color::rgb(191, 97, 106),
			},
			label: LabelStyle {
				node_color: Color::rgba(216, 222, 233, 0.85),
				link_color: Color::rgba(150, 160, 180, 0.7),
			},
			palette: NodePalette::slate(),
		}
	}

	/// Look up a theme by name.
	pub fn named(name: &str) -> Option<Self> {
		match name {
			"default" => Some(Self::default_theme()),
			"midnight" => Some(Self::midnight()),
			_ => None,
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::default_theme()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_css_output() {
		assert_eq!(Color::rgb(255, 82, 82).to_css(), "#ff5252");
		assert_eq!(Color::rgba(200, 200, 200, 0.8).to_css(), "rgba(200, 200, 200, 0.8)");
		assert_eq!(Color::rgb(1, 2, 3).with_alpha(0.5).a, 0.5);
	}

	#[test]
	fn test_palette_wraps() {
		let palette = NodePalette::slate();
		assert_eq!(palette.get(palette.len()), palette.get(0));
	}

	#[test]
	fn test_empty_palette_falls_back_to_gray() {
		let palette = NodePalette { colors: Vec::new() };
		assert_eq!(palette.get(0), Color::rgb(128, 128, 128));
		assert_eq!(palette.get(7), palette.get(0));
	}

	#[test]
	fn test_named_themes() {
		assert_eq!(Theme::named("midnight").map(|t| t.name), Some("midnight"));
		assert!(Theme::named("neon").is_none());
	}
}
