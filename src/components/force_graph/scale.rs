//! Zoom-dependent sizing for canvas elements.
//!
//! Sizes are given either in world units (scale with zoom) or screen pixels
//! (constant on screen). [`ScaledValues`] resolves a [`ScaleConfig`] against
//! the current zoom `k` once per frame; every value it holds is in world
//! space, ready to use after the canvas transform is applied.

/// How a size reacts to zoom.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant world-space size.
	World,
	/// Constant screen-space size.
	Screen,
	/// World-space size whose on-screen size stays within bounds.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// World-space value for `base` at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Opacity as a function of zoom.
#[derive(Clone, Debug)]
pub enum AlphaBehavior {
	Constant,
	/// Zero at `zero_alpha_k`, fully opaque from `full_alpha_k` on.
	Fade { zero_alpha_k: f64, full_alpha_k: f64 },
}

impl AlphaBehavior {
	pub fn apply(&self, k: f64) -> f64 {
		match self {
			AlphaBehavior::Constant => 1.0,
			AlphaBehavior::Fade {
				zero_alpha_k,
				full_alpha_k,
			} => {
				if zero_alpha_k == full_alpha_k {
					return 1.0;
				}
				((k - zero_alpha_k) / (full_alpha_k - zero_alpha_k)).clamp(0.0, 1.0)
			}
		}
	}
}

#[derive(Clone, Debug)]
pub struct ScaleConfig {
	/// Node radius in world units.
	pub node_radius: f64,
	pub node_behavior: ScaleBehavior,
	/// Click target radius in world units.
	pub hit_radius: f64,
	/// Distance from a link within which a click selects it, in screen pixels.
	pub link_hit_px: f64,
	/// Label font size in screen pixels.
	pub label_px: f64,
	/// Link labels fade in with zoom.
	pub link_label_alpha: AlphaBehavior,
	/// Edge width in screen pixels.
	pub edge_px: f64,
	/// Highlighted edge width in screen pixels.
	pub edge_highlight_px: f64,
	pub arrow_size: f64,
	pub arrow_behavior: ScaleBehavior,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node_radius: 5.0,
			node_behavior: ScaleBehavior::Clamped {
				min_screen: 4.0,
				max_screen: f64::INFINITY,
			},
			hit_radius: 10.0,
			link_hit_px: 4.0,
			label_px: 10.0,
			link_label_alpha: AlphaBehavior::Fade {
				zero_alpha_k: 0.5,
				full_alpha_k: 1.0,
			},
			edge_px: 1.0,
			edge_highlight_px: 2.0,
			arrow_size: 5.0,
			arrow_behavior: ScaleBehavior::Clamped {
				min_screen: 3.0,
				max_screen: 16.0,
			},
		}
	}
}

/// A [`ScaleConfig`] resolved for one zoom level.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	pub node_radius: f64,
	pub hit_radius: f64,
	pub link_hit_distance: f64,
	pub label_font: String,
	pub link_label_alpha: f64,
	pub edge_width: f64,
	pub edge_highlight_width: f64,
	pub arrow_size: f64,
	/// World-space size of one screen pixel.
	pub pixel: f64,
}

impl ScaledValues {
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		Self {
			node_radius: config.node_behavior.apply(config.node_radius, k),
			hit_radius: config.node_behavior.apply(config.hit_radius, k),
			link_hit_distance: config.link_hit_px / k,
			label_font: format!("{}px sans-serif", config.label_px / k),
			link_label_alpha: config.link_label_alpha.apply(k),
			edge_width: config.edge_px / k,
			edge_highlight_width: config.edge_highlight_px / k,
			arrow_size: config.arrow_behavior.apply(config.arrow_size, k),
			pixel: 1.0 / k,
		}
	}
}
