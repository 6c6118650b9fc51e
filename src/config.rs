//! Viewer configuration.
//!
//! Every field has a default; a page may override any subset by embedding
//! `<script id="viewer-config" type="application/json">{...}</script>`.

use log::{info, warn};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::HtmlScriptElement;

/// Id of the optional config element.
pub const CONFIG_ELEMENT_ID: &str = "viewer-config";

/// Top-level configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
	pub api: ApiConfig,
	pub filter: FilterConfig,
	pub labels: LabelConfig,
	pub flow: FlowConfig,
	/// Theme name, see [`Theme::named`](crate::Theme::named).
	pub theme: Option<String>,
}

/// Where and how graph documents are fetched.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiConfig {
	pub base_url: String,
	/// Dataset path appended to `base_url`.
	pub endpoint: String,
	/// Per-attempt timeout.
	pub fetch_timeout_ms: u32,
	/// Extra attempts after the first one fails.
	pub retry_count: u32,
	/// Back-off step; attempt `n` waits `n * retry_delay_ms`.
	pub retry_delay_ms: u32,
	/// Id of a script element holding an embedded graph document.
	pub embedded_element_id: String,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			base_url: String::new(),
			endpoint: "/data/sample.json".to_string(),
			fetch_timeout_ms: 10_000,
			retry_count: 3,
			retry_delay_ms: 500,
			embedded_element_id: "graph-data".to_string(),
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterConfig {
	pub persist_state: bool,
	pub storage_key: String,
	pub default_visible: bool,
}

impl Default for FilterConfig {
	fn default() -> Self {
		Self {
			persist_state: true,
			storage_key: "graphFilterState".to_string(),
			default_visible: true,
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabelConfig {
	pub persist_state: bool,
	pub storage_key: String,
	pub default_node_labels_visible: bool,
	pub default_link_labels_visible: bool,
}

impl Default for LabelConfig {
	fn default() -> Self {
		Self {
			persist_state: true,
			storage_key: "graphLabelState".to_string(),
			default_node_labels_visible: true,
			default_link_labels_visible: false,
		}
	}
}

/// Particle flow along links connected to the focused node.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlowConfig {
	/// Particles per connected link.
	pub particle_count: u32,
	/// Fraction of the link travelled per 60 Hz frame.
	pub particle_speed: f64,
	/// Particle diameter in screen pixels.
	pub particle_width: f64,
}

impl Default for FlowConfig {
	fn default() -> Self {
		Self {
			particle_count: 4,
			particle_speed: 0.01,
			particle_width: 2.0,
		}
	}
}

impl ViewerConfig {
	/// Parse a (possibly partial) JSON config.
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(text)
	}

	/// Read overrides from the page, falling back to defaults.
	pub fn from_document(element_id: &str) -> Self {
		let Some(text) = script_text(element_id) else {
			return Self::default();
		};
		match Self::from_json(&text) {
			Ok(config) => {
				info!("graph-lens: loaded config from #{}", element_id);
				config
			}
			Err(e) => {
				warn!("graph-lens: ignoring invalid config in #{}: {}", element_id, e);
				Self::default()
			}
		}
	}
}

/// Text content of a `<script>` element, if the page has one with `id`.
pub(crate) fn script_text(id: &str) -> Option<String> {
	let document = web_sys::window()?.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = ViewerConfig::default();
		assert_eq!(config.api.fetch_timeout_ms, 10_000);
		assert_eq!(config.api.retry_count, 3);
		assert!(config.filter.default_visible);
		assert!(config.labels.default_node_labels_visible);
		assert!(!config.labels.default_link_labels_visible);
		assert!(config.flow.particle_count > 0);
	}

	#[test]
	fn test_partial_override_keeps_other_defaults() {
		let config = ViewerConfig::from_json(
			r#"{
				"api": { "retryCount": 1 },
				"filter": { "defaultVisible": false },
				"theme": "midnight"
			}"#,
		)
		.unwrap();
		assert_eq!(config.api.retry_count, 1);
		assert_eq!(config.api.fetch_timeout_ms, 10_000);
		assert!(!config.filter.default_visible);
		assert_eq!(config.filter.storage_key, "graphFilterState");
		assert_eq!(config.theme.as_deref(), Some("midnight"));
	}
}
