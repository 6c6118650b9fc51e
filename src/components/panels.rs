//! Side panels: graph stats, mode indicator, type legend, label toggles,
//! item details and the error banner.
//!
//! Panels render from [`ViewerSignals`]; their inputs write through the
//! [`SharedSession`] and let the stores' listeners propagate the change.

use leptos::prelude::*;

use super::{SharedSession, ViewerSignals};
use crate::focus::FocusMode;
use crate::session::{EdgeSummary, ItemDetails, LinkDetails, NodeDetails};

#[component]
pub fn StatsPanel(signals: ViewerSignals) -> impl IntoView {
	view! {
		<section class="viewer-panel stats-panel">
			{move || {
				let stats = signals.stats.get();
				format!("{} nodes · {} links · {} types", stats.nodes, stats.links, stats.types)
			}}
		</section>
	}
}

#[component]
pub fn ModeIndicator(signals: ViewerSignals) -> impl IntoView {
	let hint = move || match signals.mode.get() {
		FocusMode::None => "Ctrl/Cmd-click: focus · Alt-click: context",
		FocusMode::Focus | FocusMode::Context => "Esc or click the background to exit",
	};
	view! {
		<section
			class="viewer-panel mode-indicator"
			class:active=move || signals.mode.get().is_active()
		>
			<strong>{move || signals.mode.get().label()}</strong>
			<span class="hint">{hint}</span>
		</section>
	}
}

/// Per-type color swatches with visibility checkboxes.
#[component]
pub fn LegendPanel(session: SharedSession, signals: ViewerSignals) -> impl IntoView {
	let set_all = move |visible: bool| {
		session.update(|s| s.filters_mut().set_all_visible(visible));
	};

	let rows = move || {
		signals
			.legend
			.get()
			.into_iter()
			.map(|entry| {
				let node_type = entry.node_type.clone();
				let checked_type = node_type.clone();
				let checked = move || {
					signals
						.filters
						.with(|f| f.get(&checked_type).copied().unwrap_or(true))
				};
				let on_change = move |ev: web_sys::Event| {
					let visible = event_target_checked(&ev);
					session.update(|s| s.filters_mut().set_visible(&node_type, visible));
				};
				view! {
					<li>
						<label>
							<input type="checkbox" prop:checked=checked on:change=on_change />
							<span
								class="swatch"
								style=format!("background-color: {}", entry.color)
							></span>
							{entry.node_type}
						</label>
					</li>
				}
			})
			.collect_view()
	};

	view! {
		<section class="viewer-panel legend-panel">
			<h2>"Node types"</h2>
			<ul>{rows}</ul>
			<div class="legend-actions">
				<button on:click=move |_| set_all(true)>"Show all"</button>
				<button on:click=move |_| set_all(false)>"Hide all"</button>
			</div>
		</section>
	}
}

#[component]
pub fn LabelToggles(session: SharedSession, signals: ViewerSignals) -> impl IntoView {
	let on_nodes = move |ev: web_sys::Event| {
		let visible = event_target_checked(&ev);
		session.update(|s| s.labels_mut().set_node_labels_visible(visible));
	};
	let on_links = move |ev: web_sys::Event| {
		let visible = event_target_checked(&ev);
		session.update(|s| s.labels_mut().set_link_labels_visible(visible));
	};
	view! {
		<section class="viewer-panel label-toggles">
			<label>
				<input
					type="checkbox"
					prop:checked=move || signals.labels.get().node_labels_visible
					on:change=on_nodes
				/>
				"Node labels"
			</label>
			<label>
				<input
					type="checkbox"
					prop:checked=move || signals.labels.get().link_labels_visible
					on:change=on_links
				/>
				"Link labels"
			</label>
		</section>
	}
}

/// Details of the selected node or link.
#[component]
pub fn InfoPanel(signals: ViewerSignals) -> impl IntoView {
	view! {
		<section class="viewer-panel info-panel">
			{move || match signals.details.get() {
				None => {
					view! { <p class="hint">"Click a node or link for details."</p> }.into_any()
				}
				Some(ItemDetails::Node(node)) => node_details(node).into_any(),
				Some(ItemDetails::Link(link)) => link_details(link).into_any(),
			}}
		</section>
	}
}

fn node_details(node: NodeDetails) -> impl IntoView {
	view! {
		<div class="node-details">
			<h2>{node.name}</h2>
			<p class="node-type">{node.node_type}" · "{node.id}</p>
			<p>{node.description}</p>
			<h3>"Insights"</h3>
			<ul>{node.insights.into_iter().map(|i| view! { <li>{i}</li> }).collect_view()}</ul>
			{attribute_table(node.attributes)}
			<h3>"Outgoing"</h3>
			{relationship_list(node.outgoing, "→")}
			<h3>"Incoming"</h3>
			{relationship_list(node.incoming, "←")}
		</div>
	}
}

fn link_details(link: LinkDetails) -> impl IntoView {
	view! {
		<div class="link-details">
			<h2>{link.label}</h2>
			<p>{link.source}" → "{link.target}</p>
			{attribute_table(link.attributes)}
		</div>
	}
}

fn relationship_list(edges: Vec<EdgeSummary>, arrow: &'static str) -> impl IntoView {
	if edges.is_empty() {
		return view! { <p class="hint">"None"</p> }.into_any();
	}
	view! {
		<ul class="relationships">
			{edges
				.into_iter()
				.map(|e| view! { <li>{e.label}" "{arrow}" "{e.other}</li> })
				.collect_view()}
		</ul>
	}
	.into_any()
}

fn attribute_table(rows: Vec<(String, String)>) -> impl IntoView {
	(!rows.is_empty()).then(|| {
		view! {
			<table class="attributes">
				{rows
					.into_iter()
					.map(|(key, value)| view! { <tr><th>{key}</th><td>{value}</td></tr> })
					.collect_view()}
			</table>
		}
	})
}

#[component]
pub fn ErrorBanner(signals: ViewerSignals) -> impl IntoView {
	move || {
		signals.error.get().map(|message| {
			view! {
				<div class="viewer-panel error-banner" role="alert">
					<span>{message}</span>
					<button on:click=move |_| signals.error.set(None)>"Dismiss"</button>
				</div>
			}
		})
	}
}
