//! Leptos component wrapping the force-directed graph canvas.
//!
//! The component creates an HTML canvas element and wires up mouse/wheel event
//! handlers for node dragging, panning, zooming and clicking. An animation
//! loop runs via `requestAnimationFrame`: it rebuilds the simulation when a new
//! graph is installed, refreshes styles when the session is dirty, steps the
//! physics and renders.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::debug;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Event, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent,
	Window,
};

use super::render;
use super::scale::ScaleConfig;
use super::state::{ForceGraphState, Hit};
use super::theme::Theme;
use crate::components::{SharedSession, ViewerSignals};
use crate::config::FlowConfig;
use crate::session::ClickModifiers;

/// Elements inside this selector count as part of the viewer for outside-click detection.
const PANEL_SELECTOR: &str = ".viewer-panel";

/// Canvas-side state plus the revision of the graph it was built from.
struct GraphContext {
	state: ForceGraphState,
	scale: ScaleConfig,
	theme: Theme,
	flow: FlowConfig,
	revision: u64,
}

impl GraphContext {
	/// End the current press. Yields the clicked target only for a click on
	/// a simulation still built from graph `revision`.
	fn release(&mut self, point: Option<(f64, f64)>, revision: u64) -> Option<Hit> {
		self.state.drag.active = false;
		self.state.drag.node_idx = None;
		self.state.pan.active = false;
		let clicked = self.state.press.end();
		if !clicked || self.revision != revision {
			return None;
		}
		let (x, y) = point?;
		Some(self.state.hit_test(x, y, &self.scale))
	}
}

type Listener<T> = Rc<RefCell<Option<Closure<dyn FnMut(T)>>>>;

/// Renders the session's graph on a canvas element.
///
/// The component sizes itself to its parent container by default; set
/// `fullscreen = true` to fill the viewport and resize with the window.
#[component]
pub fn ForceGraphCanvas(
	session: SharedSession,
	signals: ViewerSignals,
	#[prop(default = false)] fullscreen: bool,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<GraphContext>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let keydown_cb: Listener<KeyboardEvent> = Rc::new(RefCell::new(None));
	let outside_cb: Listener<Event> = Rc::new(RefCell::new(None));
	let (context_init, animate_init, resize_cb_init) =
		(context.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			viewport_size(&window)
		} else {
			canvas
				.parent_element()
				.map(|p| (p.client_width() as f64, p.client_height() as f64))
				.unwrap_or((800.0, 600.0))
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			return;
		};

		let Some(initial) = session.read(|s| {
			s.mark_dirty();
			GraphContext {
				state: ForceGraphState::new(s.graph(), w, h),
				scale: ScaleConfig::default(),
				theme: s.theme().clone(),
				flow: s.config().flow.clone(),
				revision: signals.revision.get_untracked(),
			}
		}) else {
			return;
		};
		*context_init.borrow_mut() = Some(initial);

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = viewport_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut c) = *context_resize.borrow_mut() {
					c.state.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		*keydown_cb.borrow_mut() = Some(Closure::new(move |ev: KeyboardEvent| {
			if ev.key() == "Escape" {
				exit_mode(session, signals);
			}
		}));
		if let Some(ref cb) = *keydown_cb.borrow() {
			let _ = window.add_event_listener_with_callback("keydown", cb.as_ref().unchecked_ref());
		}

		let canvas_outside = canvas.clone();
		*outside_cb.borrow_mut() = Some(Closure::new(move |ev: Event| {
			let target = ev.target().and_then(|t| t.dyn_into::<web_sys::Element>().ok());
			let Some(target) = target else {
				return;
			};
			let node: &web_sys::Node = &target;
			let on_canvas = canvas_outside.contains(Some(node));
			let on_panel = target.closest(PANEL_SELECTOR).ok().flatten().is_some();
			if !on_canvas && !on_panel {
				exit_mode(session, signals);
			}
		}));
		if let (Some(document), Some(cb)) = (window.document(), outside_cb.borrow().as_ref()) {
			let _ = document.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref());
		}

		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				let revision = signals.revision.get_untracked();
				if revision != c.revision {
					let (width, height) = (c.state.width, c.state.height);
					if let Some(state) = session.read(|s| {
						s.mark_dirty();
						ForceGraphState::new(s.graph(), width, height)
					}) {
						debug!("graph-lens: rebuilt simulation for revision {}", revision);
						c.state = state;
						c.revision = revision;
					}
				}
				session.read(|s| s.refresh_if_dirty(&mut c.state));
				c.state.tick(0.016);
				render::render(&c.state, &ctx, &c.scale, &c.theme, &c.flow);
			}
			if let (Some(win), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_md.borrow_mut() {
			c.state.press.begin(x, y);
			if let Some((idx, _)) = c.state.node_at_position(x, y, &c.scale) {
				c.state.drag.active = true;
				c.state.drag.node_idx = Some(idx);
				c.state.drag.start_x = x;
				c.state.drag.start_y = y;
				let drag = &mut c.state.drag;
				c.state.graph.visit_nodes(|node| {
					if node.index() == idx {
						drag.node_start_x = node.x();
						drag.node_start_y = node.y();
					}
				});
			} else {
				c.state.pan.active = true;
				c.state.pan.start_x = x;
				c.state.pan.start_y = y;
				c.state.pan.transform_start_x = c.state.transform.x;
				c.state.pan.transform_start_y = c.state.transform.y;
			}
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			c.state.press.track(x, y);
			if c.state.drag.active {
				if let Some(idx) = c.state.drag.node_idx {
					let (dx, dy) = (
						(x - c.state.drag.start_x) / c.state.transform.k,
						(y - c.state.drag.start_y) / c.state.transform.k,
					);
					let (nx, ny) = (
						c.state.drag.node_start_x + dx as f32,
						c.state.drag.node_start_y + dy as f32,
					);
					c.state.graph.visit_nodes_mut(|node| {
						if node.index() == idx {
							node.data.x = nx;
							node.data.y = ny;
							node.data.is_anchor = true;
						}
					});
				}
			} else if c.state.pan.active {
				c.state.transform.x = c.state.pan.transform_start_x + (x - c.state.pan.start_x);
				c.state.transform.y = c.state.pan.transform_start_y + (y - c.state.pan.start_y);
			}
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let point = canvas_point(canvas_ref, &ev);
		let revision = signals.revision.get_untracked();
		let hit = match context_mu.borrow_mut().as_mut() {
			Some(c) => c.release(point, revision),
			None => return,
		};
		if let Some(hit) = hit {
			let modifiers = ClickModifiers {
				primary: ev.ctrl_key() || ev.meta_key(),
				secondary: ev.alt_key(),
			};
			session.update(|s| {
				match hit {
					Hit::Node(index) => s.handle_node_click(index, modifiers),
					Hit::Link(index) => s.handle_link_click(index),
					Hit::Background => s.exit_mode(),
				}
				signals.publish(s);
			});
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.state.drag.active = false;
			c.state.drag.node_idx = None;
			c.state.pan.active = false;
			c.state.press.active = false;
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let new_k = (c.state.transform.k * factor).clamp(0.1, 10.0);
			let ratio = new_k / c.state.transform.k;
			c.state.transform.x = x - (x - c.state.transform.x) * ratio;
			c.state.transform.y = y - (y - c.state.transform.y) * ratio;
			c.state.transform.k = new_k;
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

fn exit_mode(session: SharedSession, signals: ViewerSignals) {
	session.update(|s| {
		if s.mode().is_active() {
			s.exit_mode();
			signals.publish(s);
		}
	});
}

fn viewport_size(window: &Window) -> (f64, f64) {
	let dimension = |v: Result<JsValue, JsValue>, fallback: f64| {
		v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
	};
	(dimension(window.inner_width(), 800.0), dimension(window.inner_height(), 600.0))
}

/// Event position relative to the canvas.
fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((ev.client_x() as f64 - rect.left(), ev.client_y() as f64 - rect.top()))
}
