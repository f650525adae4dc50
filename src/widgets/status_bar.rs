//! Bottom status bar.
//!
//! A rounded strip hanging half off the bottom edge so only its top corners
//! show.

use crate::colors::black;
use crate::scene::{DrawOp, Layer, Paint, RectF, Scene};

const BAR_H: f32 = 100.0;
const BAR_RADIUS: f32 = 30.0;

pub fn status_bar_rect(width: f32, height: f32) -> RectF {
    RectF::new(-1.0, height - BAR_H / 2.0, width + 2.0, BAR_H)
}

pub fn draw_status_bar(scene: &mut Scene, width: f32, height: f32) {
    scene.push(Layer::StatusBar, DrawOp::RoundedRect {
        rect: status_bar_rect(width, height),
        top_radius: BAR_RADIUS,
        bottom_radius: BAR_RADIUS,
        fill: Some(Paint::Solid(black(166))),
        stroke: None,
    });
}
