use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::types::{Node, Particle};

pub const SELF_RADIUS: f64 = 20.0;
pub const PEER_RADIUS: f64 = 14.0;

const BACKGROUND: &str = "#1a1a2e";
const SELF_COLOR: &str = "#60a5fa";
const CONNECTED_COLOR: &str = "#4ade80";
const OFFLINE_COLOR: &str = "#6b7280";

/// Paint one frame: links, then particles, then nodes, back to front.
///
/// Pure read of the simulation state. Any canvas failure bubbles up so the
/// animation loop can log it and still schedule the next frame.
pub fn draw(
	ctx: &CanvasRenderingContext2d,
	width: f64,
	height: f64,
	nodes: &[Node],
	particles: &[Particle],
) -> Result<(), JsValue> {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, width, height);

	if let Some(origin) = nodes.iter().find(|n| n.is_self) {
		for node in nodes.iter().filter(|n| !n.is_self) {
			draw_link(ctx, origin, node)?;
		}
	}
	for particle in particles {
		draw_particle(ctx, particle)?;
	}
	for node in nodes {
		draw_node(ctx, node)?;
	}
	Ok(())
}

fn draw_link(ctx: &CanvasRenderingContext2d, from: &Node, to: &Node) -> Result<(), JsValue> {
	if to.connected {
		let gradient = ctx.create_linear_gradient(from.x, from.y, to.x, to.y);
		gradient.add_color_stop(0.0, "rgba(96, 165, 250, 0.7)")?;
		gradient.add_color_stop(1.0, "rgba(74, 222, 128, 0.7)")?;
		#[allow(deprecated)]
		ctx.set_stroke_style(&gradient);
		ctx.set_line_width(2.0);
	} else {
		ctx.set_stroke_style_str("rgba(107, 114, 128, 0.5)");
		ctx.set_line_width(1.5);
		ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(6.0),
			&JsValue::from_f64(6.0),
		))?;
	}

	ctx.begin_path();
	ctx.move_to(from.x, from.y);
	ctx.line_to(to.x, to.y);
	ctx.stroke();
	ctx.set_line_dash(&js_sys::Array::new())?;
	Ok(())
}

fn draw_particle(ctx: &CanvasRenderingContext2d, particle: &Particle) -> Result<(), JsValue> {
	let alpha = (1.0 - particle.progress).clamp(0.0, 1.0);
	ctx.set_fill_style_str(&format!("rgba(134, 239, 172, {alpha})"));
	ctx.begin_path();
	ctx.arc(particle.x, particle.y, 3.0, 0.0, 2.0 * PI)?;
	ctx.fill();
	Ok(())
}

fn draw_node(ctx: &CanvasRenderingContext2d, node: &Node) -> Result<(), JsValue> {
	let radius = if node.is_self { SELF_RADIUS } else { PEER_RADIUS };
	let color = if node.is_self {
		SELF_COLOR
	} else if node.connected {
		CONNECTED_COLOR
	} else {
		OFFLINE_COLOR
	};

	let glow = ctx.create_radial_gradient(node.x, node.y, radius * 0.5, node.x, node.y, radius * 2.0)?;
	glow.add_color_stop(0.0, "rgba(255, 255, 255, 0.25)")?;
	glow.add_color_stop(1.0, "rgba(255, 255, 255, 0)")?;
	ctx.begin_path();
	ctx.arc(node.x, node.y, radius * 2.0, 0.0, 2.0 * PI)?;
	#[allow(deprecated)]
	ctx.set_fill_style(&glow);
	ctx.fill();

	ctx.begin_path();
	ctx.arc(node.x, node.y, radius, 0.0, 2.0 * PI)?;
	ctx.set_fill_style_str(color);
	ctx.fill();
	ctx.set_stroke_style_str("rgba(255, 255, 255, 0.8)");
	ctx.set_line_width(2.0);
	ctx.stroke();

	ctx.set_fill_style_str("rgba(255, 255, 255, 0.85)");
	ctx.set_font("12px sans-serif");
	ctx.set_text_align("center");
	ctx.fill_text(&node.label, node.x, node.y + radius + 16.0)?;
	Ok(())
}
