//! Canvas rendering for the force graph.
//!
//! Draws in passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Edges, arrowheads and flow particles (world space)
//! 3. Link labels, then nodes and node labels
//! 4. Vignette (screen space)
//!
//! Every color, visibility and particle decision comes from the current
//! [`StyleSheet`](crate::style::StyleSheet); nothing here knows about modes.

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::particles::{particle_offsets, point_along};
use super::scale::{ScaleConfig, ScaledValues};
use super::state::{EdgeInfo, ForceGraphState};
use super::theme::Theme;
use crate::config::FlowConfig;
use crate::style::LinkStyle;

/// Renders the complete graph to the canvas.
pub fn render(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
	flow: &FlowConfig,
) {
	let scale = ScaledValues::new(config, state.transform.k);
	let positions = state.positions();

	draw_background(state, ctx, theme);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	for edge in &state.edges {
		let Some(style) = state.link_style(edge.link).filter(|s| s.visible) else {
			continue;
		};
		let (from, to) = (positions[edge.source], positions[edge.target]);
		draw_edge(ctx, &scale, style, from, to);
		if style.particles > 0 {
			draw_particles(ctx, &scale, style, from, to, state.flow_time, flow);
		}
	}

	draw_link_labels(state, ctx, &scale, theme, &positions);
	draw_nodes(state, ctx, &scale, theme);

	ctx.restore();

	if theme.background.vignette > 0.0 {
		draw_vignette(state, ctx, theme);
	}
}

fn draw_background(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let (cx, cy) = (state.width / 2.0, state.height / 2.0);
	let gradient = theme
		.background
		.use_gradient
		.then(|| {
			let radius = state.width.max(state.height) * 0.8;
			ctx.create_radial_gradient(cx, cy, 0.0, cx, cy, radius).ok()
		})
		.flatten();

	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &theme.background.color_secondary.to_css());
			let _ = gradient.add_color_stop(1.0, &theme.background.color.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&theme.background.color.to_css()),
	}
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_vignette(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let (cx, cy) = (state.width / 2.0, state.height / 2.0);
	let Ok(gradient) = ctx.create_radial_gradient(
		cx,
		cy,
		state.width.min(state.height) * 0.3,
		cx,
		cy,
		state.width.max(state.height) * 0.7,
	) else {
		return;
	};
	let _ = gradient.add_color_stop(0.0, "rgba(0, 0, 0, 0)");
	let _ = gradient.add_color_stop(1.0, &format!("rgba(0, 0, 0, {})", theme.background.vignette));
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

/// Unit direction and length of `from` → `to`, or `None` when degenerate.
fn direction(from: (f64, f64), to: (f64, f64)) -> Option<(f64, f64, f64)> {
	let (dx, dy) = (to.0 - from.0, to.1 - from.1);
	let dist = (dx * dx + dy * dy).sqrt();
	(dist > 0.001).then(|| (dx / dist, dy / dist, dist))
}

fn draw_edge(
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	style: &LinkStyle,
	from: (f64, f64),
	to: (f64, f64),
) {
	let Some((ux, uy, _)) = direction(from, to) else {
		return;
	};
	let color = style.color.to_css();
	let width = if style.direction.is_some() {
		scale.edge_highlight_width
	} else {
		scale.edge_width
	};

	let (tip_x, tip_y) = (to.0 - ux * scale.node_radius, to.1 - uy * scale.node_radius);
	let (back_x, back_y) = (tip_x - ux * scale.arrow_size, tip_y - uy * scale.arrow_size);

	ctx.set_stroke_style_str(&color);
	ctx.set_line_width(width);
	ctx.begin_path();
	ctx.move_to(from.0 + ux * scale.node_radius, from.1 + uy * scale.node_radius);
	ctx.line_to(back_x, back_y);
	ctx.stroke();

	let (px, py) = (-uy * scale.arrow_size * 0.5, ux * scale.arrow_size * 0.5);
	ctx.set_fill_style_str(&color);
	ctx.begin_path();
	ctx.move_to(tip_x, tip_y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_particles(
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	style: &LinkStyle,
	from: (f64, f64),
	to: (f64, f64),
	flow_time: f64,
	flow: &FlowConfig,
) {
	let radius = flow.particle_width * 0.5 * scale.pixel;
	ctx.set_fill_style_str(&style.color.to_css());
	for t in particle_offsets(style.particles, flow_time, flow.particle_speed) {
		let (x, y) = point_along(from, to, t);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.fill();
	}
}

fn draw_link_labels(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	positions: &[(f64, f64)],
) {
	if scale.link_label_alpha <= 0.0 {
		return;
	}
	let color = theme.label.link_color;
	ctx.set_fill_style_str(&color.with_alpha(color.a * scale.link_label_alpha).to_css());
	ctx.set_font(&scale.label_font);
	ctx.set_text_align("center");
	for &EdgeInfo { source, target, link } in &state.edges {
		if !state.link_style(link).is_some_and(|s| s.label_visible) {
			continue;
		}
		let Some(label) = state.link_labels.get(link).filter(|l| !l.is_empty()) else {
			continue;
		};
		let (x, y) = point_along(positions[source], positions[target], 0.5);
		let _ = ctx.fill_text(label, x, y - 3.0 * scale.pixel);
	}
	ctx.set_text_align("start");
}

fn draw_nodes(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	ctx.set_font(&scale.label_font);
	state.graph.visit_nodes(|node| {
		let info = &node.data.user_data;
		let Some(style) = state.node_style(info.index).filter(|s| s.visible) else {
			return;
		};
		let (x, y) = (node.x() as f64, node.y() as f64);
		let radius = scale.node_radius * info.size;

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&style.color.to_css());
		ctx.fill();

		if style.label_visible {
			if let Some(name) = state.node_names.get(info.index) {
				ctx.set_fill_style_str(&theme.label.node_color.to_css());
				let _ = ctx.fill_text(name, x + radius + 4.0 * scale.pixel, y + 3.0 * scale.pixel);
			}
		}
	});
}
