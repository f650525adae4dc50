//! Lane lines, road edges, drivable path and blind-spot overlays.
//!
//! All geometry arrives in view pixels. Gradients run bottom-to-top: stop 0
//! sits on the bottom row of the view, stop 1 on the top row.
//!
//! # Path Fill
//!
//! - Default: three fixed green stops fading out toward the horizon.
//! - Experimental or colored path: one stop per path point, hue from the
//!   planned acceleration (0° braking, 120° accelerating), saturation from its
//!   magnitude, alpha fading out toward the top. With the colored path on,
//!   near-zero acceleration is pinned to full green.

use crate::colors::{FROG_GREEN, Rgba, map_val};
use crate::scene::{DrawOp, Gradient, Layer, Paint, PointF, Scene};
use crate::state::{DisplayState, WorldView};

use super::primitives::fill_polygon;

/// Acceleration band pinned to green in colored-path mode.
const COAST_BAND: f32 = 0.25;

#[inline]
fn hsl(hue_deg: f32, s: f32, l: f32, a: f32) -> Rgba {
    Rgba::from_hsl_f(hue_deg / 360.0, s, l, a)
}

/// Lane line color: white with confidence alpha capped at 0.7.
pub fn lane_line_color(prob: f32, colored: bool) -> Rgba {
    if colored { FROG_GREEN } else { Rgba::from_rgb_f(1.0, 1.0, 1.0, prob.clamp(0.0, 0.7)) }
}

/// Road edge color: red, more opaque the lower the uncertainty.
pub fn road_edge_color(std: f32, colored: bool) -> Rgba {
    if colored { FROG_GREEN } else { Rgba::from_rgb_f(1.0, 0.0, 0.0, (1.0 - std).clamp(0.0, 1.0)) }
}

/// Fill gradient for the drivable path.
pub fn path_gradient(ds: &DisplayState, world: &WorldView, height: f32) -> Gradient {
    let mut g = Gradient::new(height, 0.0);
    if !(ds.experimental_mode || ds.flags.colored_path) {
        g.set_color_at(0.0, hsl(148.0, 0.94, 0.51, 0.4));
        g.set_color_at(0.5, hsl(112.0, 1.0, 0.68, 0.35));
        g.set_color_at(1.0, hsl(112.0, 1.0, 0.68, 0.0));
        return g;
    }

    let track = &world.geometry.track;
    let max_len = (track.len() / 2).min(world.accel.len());
    let mut i = 0;
    while i < max_len {
        let y = track[i].y;
        if !(0.0..=height).contains(&y) {
            i += 1;
            continue;
        }
        let lin_grad_point = (height - y) / height;
        let mut accel = world.accel[i];
        if ds.flags.colored_path && accel.abs() < COAST_BAND {
            accel = 2.0;
        }

        let hue = (60.0 + accel * 35.0).clamp(0.0, 120.0);
        // Whole degrees keep the number of distinct stops down.
        let hue = ((hue * 100.0 + 0.5) as i32 / 100) as f32;
        let saturation = (accel * 1.5).abs().min(1.0);
        let lightness = map_val(saturation, 0.0, 1.0, 0.95, 0.62);
        let alpha = map_val(lin_grad_point, 0.75 / 2.0, 0.75, 0.4, 0.0);
        g.set_color_at(lin_grad_point, hsl(hue, saturation, lightness, alpha));
        // Every other visible point, but never skip the last one.
        i += if i + 2 < max_len { 2 } else { 1 };
    }
    g
}

/// Gradient for the path outline.
pub fn path_edge_gradient(ds: &DisplayState, height: f32) -> Gradient {
    let g = Gradient::new(height, 0.0);
    if ds.experimental_mode {
        g.with_stop(0.0, hsl(25.0, 0.71, 0.50, 1.0))
            .with_stop(0.5, hsl(25.0, 0.71, 0.50, 0.5))
            .with_stop(1.0, hsl(25.0, 0.71, 0.50, 0.1))
    } else if ds.flags.colored_path {
        g.with_stop(0.0, hsl(150.0, 0.75, 0.25, 1.0))
            .with_stop(0.5, hsl(150.0, 0.75, 0.25, 0.5))
            .with_stop(1.0, hsl(150.0, 0.75, 0.25, 0.1))
    } else {
        g.with_stop(0.0, hsl(148.0, 0.94, 0.51, 1.0))
            .with_stop(0.5, hsl(112.0, 1.0, 0.68, 0.5))
            .with_stop(1.0, hsl(112.0, 1.0, 0.68, 0.1))
    }
}

fn blindspot_gradient(height: f32) -> Gradient {
    Gradient::new(height, 0.0)
        .with_stop(0.0, hsl(0.0, 0.75, 0.50, 0.6))
        .with_stop(0.5, hsl(0.0, 0.75, 0.50, 0.4))
        .with_stop(1.0, hsl(0.0, 0.75, 0.50, 0.2))
}

pub fn draw_road(scene: &mut Scene, ds: &DisplayState, world: &WorldView, height: f32) {
    let geo = &world.geometry;
    let colored = ds.flags.colored_path;

    for (line, prob) in geo.lane_lines.iter().zip(geo.lane_line_probs) {
        fill_polygon(scene, Layer::Road, line, Paint::Solid(lane_line_color(prob, colored)));
    }
    for (edge, std) in geo.road_edges.iter().zip(geo.road_edge_stds) {
        fill_polygon(scene, Layer::Road, edge, Paint::Solid(road_edge_color(std, colored)));
    }

    fill_polygon(scene, Layer::Road, &geo.track, Paint::Vertical(path_gradient(ds, world, height)));

    // Track and its outline as one even-odd shape: only the band between them fills.
    let rings: Vec<Vec<PointF>> =
        [&geo.track, &geo.track_edge].into_iter().filter(|r| r.len() >= 3).cloned().collect();
    if !rings.is_empty() {
        scene.push(Layer::Road, DrawOp::Polygon { rings, paint: Paint::Vertical(path_edge_gradient(ds, height)) });
    }

    if ds.blindspot_left {
        fill_polygon(scene, Layer::Road, &geo.left_blindspot, Paint::Vertical(blindspot_gradient(height)));
    }
    if ds.blindspot_right {
        fill_polygon(scene, Layer::Road, &geo.right_blindspot, Paint::Vertical(blindspot_gradient(height)));
    }
}
