//! Graph document loading: HTTP fetch with timeout and bounded retry, or a
//! document embedded in the page, followed by structural validation.

use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

use gloo_timers::callback::Timeout;
use log::{info, warn};
use serde_json::Value;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Request, RequestInit, RequestMode, Response};

use crate::config::{ApiConfig, script_text};
use crate::graph::Graph;
use crate::storage::js_message;

/// A graph document that breaks the structural contract.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
	#[error("document must be an object with `nodes` and `links` arrays")]
	Shape,
	#[error("node {index} is missing a non-empty `{field}`")]
	NodeField { index: usize, field: &'static str },
	#[error("node {index} has no `insights` array")]
	Insights { index: usize },
	#[error("duplicate node id `{0}`")]
	DuplicateId(String),
	#[error("link {index} is missing a non-empty `{field}`")]
	LinkField { index: usize, field: &'static str },
	#[error("link {index} references unknown node `{id}`")]
	UnknownNode { index: usize, id: String },
}

/// Why a graph could not be loaded.
#[derive(Debug, Error)]
pub enum FetchError {
	#[error("no browser window available")]
	NoWindow,
	#[error("network error: {0}")]
	Network(String),
	#[error("request timed out after {0} ms")]
	Timeout(u32),
	#[error("server responded with HTTP {0}")]
	Status(u16),
	#[error("response is not valid JSON: {0}")]
	Parse(#[from] serde_json::Error),
	#[error("invalid graph document: {0}")]
	Invalid(#[from] ValidationError),
	#[error("embedded graph element `#{0}` not found")]
	MissingEmbedded(String),
	#[error("gave up after {attempts} attempts: {last}")]
	Exhausted { attempts: u32, last: Box<FetchError> },
}

impl FetchError {
	/// Transient failures worth another attempt.
	pub fn is_retryable(&self) -> bool {
		match self {
			FetchError::Network(_) | FetchError::Timeout(_) => true,
			FetchError::Status(code) => *code >= 500,
			_ => false,
		}
	}
}

/// Bounded retry with linear back-off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Extra attempts after the first.
	pub retries: u32,
	pub delay_ms: u32,
}

impl RetryPolicy {
	/// Delay before the attempt following failed attempt `attempt` (1-based),
	/// or `None` when the error is final.
	pub fn next_delay(&self, attempt: u32, error: &FetchError) -> Option<u32> {
		if error.is_retryable() && attempt <= self.retries {
			Some(self.delay_ms.saturating_mul(attempt))
		} else {
			None
		}
	}
}

/// Where the graph document comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataSource {
	/// JSON text of a `<script>` element in the page.
	Embedded(String),
	/// Dataset path fetched relative to the configured base URL.
	Remote(String),
}

impl DataSource {
	/// Prefer an embedded document when the page carries one.
	pub fn detect(config: &ApiConfig) -> Self {
		if script_text(&config.embedded_element_id).is_some() {
			DataSource::Embedded(config.embedded_element_id.clone())
		} else {
			DataSource::Remote(config.endpoint.clone())
		}
	}
}

/// Check the structural contract of a graph document.
pub fn validate_document(doc: &Value) -> Result<(), ValidationError> {
	let (Some(nodes), Some(links)) = (
		doc.get("nodes").and_then(Value::as_array),
		doc.get("links").and_then(Value::as_array),
	) else {
		return Err(ValidationError::Shape);
	};

	let mut ids = HashSet::with_capacity(nodes.len());
	for (index, node) in nodes.iter().enumerate() {
		for field in ["id", "name", "type", "description"] {
			if non_empty_str(node.get(field)).is_none() {
				return Err(ValidationError::NodeField { index, field });
			}
		}
		if !node.get("insights").is_some_and(Value::is_array) {
			return Err(ValidationError::Insights { index });
		}
		let id = non_empty_str(node.get("id")).unwrap_or_default();
		if !ids.insert(id) {
			return Err(ValidationError::DuplicateId(id.to_string()));
		}
	}

	for (index, link) in links.iter().enumerate() {
		for field in ["source", "target"] {
			let Some(id) = endpoint_id(link.get(field)) else {
				return Err(ValidationError::LinkField { index, field });
			};
			if !ids.contains(id) {
				return Err(ValidationError::UnknownNode {
					index,
					id: id.to_string(),
				});
			}
		}
		if non_empty_str(link.get("label")).is_none() {
			return Err(ValidationError::LinkField {
				index,
				field: "label",
			});
		}
	}
	Ok(())
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
	value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// A link endpoint is either an id string or an object with an `id`.
fn endpoint_id(value: Option<&Value>) -> Option<&str> {
	match value? {
		Value::Object(_) => non_empty_str(value?.get("id")),
		other => non_empty_str(Some(other)),
	}
}

/// Parse and validate a graph document. Nothing partial is ever returned.
pub fn parse_graph(text: &str) -> Result<Graph, FetchError> {
	let doc: Value = serde_json::from_str(text)?;
	validate_document(&doc)?;
	Ok(serde_json::from_value(doc)?)
}

/// Run `attempt` until it succeeds, fails for good, or `policy` runs out of
/// retries. `pause` waits out the back-off before each retry.
///
/// Attempts are numbered from 1. Running out of retries on a transient error
/// yields [`FetchError::Exhausted`]; any other error is returned as is.
pub async fn retry<T, A, AF, P, PF>(
	policy: RetryPolicy,
	mut attempt: A,
	mut pause: P,
) -> Result<T, FetchError>
where
	A: FnMut(u32) -> AF,
	AF: Future<Output = Result<T, FetchError>>,
	P: FnMut(u32) -> PF,
	PF: Future<Output = ()>,
{
	let mut attempts = 0;
	loop {
		attempts += 1;
		let error = match attempt(attempts).await {
			Ok(value) => return Ok(value),
			Err(e) => e,
		};
		match policy.next_delay(attempts, &error) {
			Some(delay) => {
				warn!(
					"graph-lens: attempt {} failed ({}), retrying in {} ms",
					attempts, error, delay
				);
				pause(delay).await;
			}
			None if error.is_retryable() => {
				return Err(FetchError::Exhausted {
					attempts,
					last: Box::new(error),
				});
			}
			None => return Err(error),
		}
	}
}

/// Loads graph documents for the viewer.
#[derive(Clone, Debug)]
pub struct GraphDataService {
	config: ApiConfig,
}

impl GraphDataService {
	pub fn new(config: ApiConfig) -> Self {
		Self { config }
	}

	pub fn retry_policy(&self) -> RetryPolicy {
		RetryPolicy {
			retries: self.config.retry_count,
			delay_ms: self.config.retry_delay_ms,
		}
	}

	pub fn url_for(&self, dataset: &str) -> String {
		format!("{}{}", self.config.base_url, dataset)
	}

	/// Load from either source.
	pub async fn load(&self, source: &DataSource) -> Result<Graph, FetchError> {
		match source {
			DataSource::Embedded(element_id) => self.load_embedded(element_id),
			DataSource::Remote(dataset) => self.fetch(dataset).await,
		}
	}

	/// Read the document embedded in `<script id=element_id>`.
	pub fn load_embedded(&self, element_id: &str) -> Result<Graph, FetchError> {
		let text = script_text(element_id)
			.ok_or_else(|| FetchError::MissingEmbedded(element_id.to_string()))?;
		let graph = parse_graph(&text)?;
		info!(
			"graph-lens: loaded {} nodes, {} links from #{}",
			graph.nodes.len(),
			graph.links.len(),
			element_id
		);
		Ok(graph)
	}

	/// Fetch `dataset`, retrying transient failures per the retry policy.
	pub async fn fetch(&self, dataset: &str) -> Result<Graph, FetchError> {
		let url = &self.url_for(dataset);
		let graph = retry(
			self.retry_policy(),
			move |_| async move { parse_graph(&self.fetch_text(url).await?) },
			|delay| gloo_timers::future::sleep(Duration::from_millis(delay.into())),
		)
		.await?;
		info!(
			"graph-lens: fetched {} nodes, {} links from {}",
			graph.nodes.len(),
			graph.links.len(),
			url
		);
		Ok(graph)
	}

	/// One GET with an abort timer; returns the response body.
	async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
		let window = web_sys::window().ok_or(FetchError::NoWindow)?;
		let network = |e: JsValue| FetchError::Network(js_message(&e));

		let controller = AbortController::new().map_err(network)?;
		let opts = RequestInit::new();
		opts.set_method("GET");
		opts.set_mode(RequestMode::Cors);
		opts.set_signal(Some(&controller.signal()));
		let request = Request::new_with_str_and_init(url, &opts).map_err(network)?;

		let timeout_ms = self.config.fetch_timeout_ms;
		let timed_out = Rc::new(Cell::new(false));
		let timer = {
			let timed_out = timed_out.clone();
			Timeout::new(timeout_ms, move || {
				timed_out.set(true);
				controller.abort();
			})
		};

		let result = read_body(&window, &request).await;
		// Dropping the timer cancels it.
		drop(timer);

		result.map_err(|e| match e {
			FetchError::Network(_) if timed_out.get() => FetchError::Timeout(timeout_ms),
			other => other,
		})
	}
}

async fn read_body(window: &web_sys::Window, request: &Request) -> Result<String, FetchError> {
	let network = |e: JsValue| FetchError::Network(js_message(&e));
	let response: Response = JsFuture::from(window.fetch_with_request(request))
		.await
		.map_err(network)?
		.dyn_into()
		.map_err(|_| FetchError::Network("fetch did not return a Response".to_string()))?;
	if !response.ok() {
		return Err(FetchError::Status(response.status()));
	}
	let text = JsFuture::from(response.text().map_err(network)?)
		.await
		.map_err(network)?;
	text.as_string()
		.ok_or_else(|| FetchError::Network("response body is not text".to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use futures::executor::block_on;
	use serde_json::json;
	use std::future::ready;

	type Outcome = Result<&'static str, FetchError>;

	/// Drive `retry` over scripted attempt outcomes; returns the result, the
	/// attempt numbers seen and the pauses taken.
	fn scripted(policy: RetryPolicy, mut script: Vec<Outcome>) -> (Outcome, Vec<u32>, Vec<u32>) {
		script.reverse();
		let mut attempts = Vec::new();
		let mut pauses = Vec::new();
		let result = block_on(retry(
			policy,
			|n| {
				attempts.push(n);
				ready(script.pop().unwrap_or(Ok("unscripted")))
			},
			|ms| {
				pauses.push(ms);
				ready(())
			},
		));
		(result, attempts, pauses)
	}

	const POLICY: RetryPolicy = RetryPolicy {
		retries: 2,
		delay_ms: 100,
	};

	fn sample() -> Value {
		json!({
			"nodes": [
				{
					"id": "node1", "name": "node1", "type": "service",
					"description": "first", "insights": ["i1"]
				},
				{
					"id": "node2", "name": "node2", "type": "identity",
					"description": "second", "insights": [], "some_other_prop": 74
				},
				{
					"id": "node3", "name": "node3", "type": "resource",
					"description": "third", "insights": ["i3"]
				}
			],
			"links": [
				{
					"source": "node2", "target": "node1",
					"label": "belongs to", "some_other_property": 5
				},
				{ "source": { "id": "node1" }, "target": "node3", "label": "consumes" }
			]
		})
	}

	#[test]
	fn test_valid_document_parses() {
		let graph = parse_graph(&sample().to_string()).unwrap();
		assert_eq!(graph.nodes.len(), 3);
		assert_eq!(graph.links.len(), 2);
		assert_eq!(graph.links[0].attributes.get("some_other_property"), Some(&json!(5)));
		assert_eq!(graph.links[1].source.id(), "node1");
	}

	#[test]
	fn test_missing_arrays_fail_shape() {
		assert_eq!(validate_document(&json!({ "nodes": [] })), Err(ValidationError::Shape));
		assert_eq!(validate_document(&json!([1, 2])), Err(ValidationError::Shape));
	}

	#[test]
	fn test_node_field_violations() {
		let mut doc = sample();
		doc["nodes"][1]["description"] = json!("");
		assert_eq!(
			validate_document(&doc),
			Err(ValidationError::NodeField {
				index: 1,
				field: "description"
			})
		);

		let mut doc = sample();
		doc["nodes"][0].as_object_mut().unwrap().remove("insights");
		assert_eq!(validate_document(&doc), Err(ValidationError::Insights { index: 0 }));

		let mut doc = sample();
		doc["nodes"][2]["id"] = json!("node1");
		assert_eq!(validate_document(&doc), Err(ValidationError::DuplicateId("node1".into())));
	}

	#[test]
	fn test_link_violations() {
		let mut doc = sample();
		doc["links"][0]["target"] = json!("ghost");
		assert_eq!(
			validate_document(&doc),
			Err(ValidationError::UnknownNode {
				index: 0,
				id: "ghost".into()
			})
		);

		let mut doc = sample();
		doc["links"][1]["label"] = json!("");
		assert_eq!(
			validate_document(&doc),
			Err(ValidationError::LinkField {
				index: 1,
				field: "label"
			})
		);

		let mut doc = sample();
		doc["links"][1]["source"] = json!({ "name": "no id" });
		assert_eq!(
			validate_document(&doc),
			Err(ValidationError::LinkField {
				index: 1,
				field: "source"
			})
		);
	}

	#[test]
	fn test_parse_errors_are_not_partial() {
		assert!(matches!(parse_graph("{ nope"), Err(FetchError::Parse(_))));
		let mut doc = sample();
		doc["links"][0]["source"] = json!(17);
		assert!(matches!(parse_graph(&doc.to_string()), Err(FetchError::Invalid(_))));
	}

	#[test]
	fn test_retry_policy() {
		let policy = RetryPolicy {
			retries: 2,
			delay_ms: 100,
		};
		let timeout = FetchError::Timeout(10);
		assert_eq!(policy.next_delay(1, &timeout), Some(100));
		assert_eq!(policy.next_delay(2, &FetchError::Status(503)), Some(200));
		assert_eq!(policy.next_delay(3, &timeout), None);
		assert_eq!(policy.next_delay(1, &FetchError::Status(404)), None);
		assert_eq!(
			policy.next_delay(1, &FetchError::Invalid(ValidationError::Shape)),
			None
		);
	}

	#[test]
	fn test_retry_recovers_after_transient_failures() {
		let script = vec![Err(FetchError::Timeout(10)), Err(FetchError::Timeout(10)), Ok("graph")];
		let (result, attempts, pauses) = scripted(POLICY, script);

		assert_eq!(result.unwrap(), "graph");
		assert_eq!(attempts, vec![1, 2, 3]);
		assert_eq!(pauses, vec![100, 200]);
	}

	#[test]
	fn test_retry_gives_up_after_policy_attempts() {
		let script = vec![
			Err(FetchError::Network("offline".into())),
			Err(FetchError::Status(503)),
			Err(FetchError::Timeout(10)),
			Ok("too late"),
		];
		let (result, attempts, pauses) = scripted(POLICY, script);

		match result {
			Err(FetchError::Exhausted { attempts: 3, last }) => {
				assert!(matches!(*last, FetchError::Timeout(10)));
			}
			other => panic!("expected exhausted retries, got {other:?}"),
		}
		assert_eq!(attempts, vec![1, 2, 3]);
		assert_eq!(pauses, vec![100, 200]);
	}

	#[test]
	fn test_retry_fails_fast_on_final_errors() {
		let (result, attempts, pauses) = scripted(POLICY, vec![Err(FetchError::Status(404))]);
		assert!(matches!(result, Err(FetchError::Status(404))));
		assert_eq!(attempts, vec![1]);
		assert!(pauses.is_empty());

		let invalid = vec![Err(FetchError::Invalid(ValidationError::Shape))];
		let (result, attempts, _) = scripted(POLICY, invalid);
		assert!(matches!(result, Err(FetchError::Invalid(ValidationError::Shape))));
		assert_eq!(attempts, vec![1]);
	}

	#[test]
	fn test_retry_without_retries_exhausts_on_first_transient_error() {
		let policy = RetryPolicy {
			retries: 0,
			delay_ms: 100,
		};
		let (result, attempts, pauses) = scripted(policy, vec![Err(FetchError::Timeout(10))]);
		assert!(matches!(result, Err(FetchError::Exhausted { attempts: 1, .. })));
		assert_eq!(attempts, vec![1]);
		assert!(pauses.is_empty());
	}

	#[test]
	fn test_url_for_joins_base() {
		let service = GraphDataService::new(ApiConfig {
			base_url: "http://localhost:8001".into(),
			..ApiConfig::default()
		});
		assert_eq!(service.url_for("/data/sample.json"), "http://localhost:8001/data/sample.json");
	}
}
