//! Compass: rotating inner dial, cardinal labels, degree ring.
//!
//! # Cardinal Buckets
//!
//! Each label is bright while the bearing falls in its bucket and dimmed
//! otherwise. Buckets overlap so intercardinal bearings light two labels:
//!
//! | Label | Bucket |
//! |-------|--------|
//! | N | `[0, 68)` and `[293, 360)` |
//! | E | `[23, 158)` |
//! | S | `[113, 248)` |
//! | W | `[203, 338)` |
//!
//! The degree ring ticks every 15°; labels within 7° of the bearing are bold,
//! measured around the circle so 355° still highlights 0.

use core::fmt::Write;

use heapless::String;

use crate::assets::AssetId;
use crate::colors::{BLACK, WHITE, black, white};
use crate::config::BTN_SIZE;
use crate::layout::compass_center;
use crate::scene::{DrawOp, ImageOp, Layer, PointF, Scene, Stroke, TextAlign, TextOp};

use super::primitives::{draw_text, stroke_circle};

const CIRCLE_SIZE: f32 = 250.0;
const CIRCLE_OFFSET: f32 = CIRCLE_SIZE / 2.0;
const DEGREE_LABEL_OFFSET: f32 = CIRCLE_OFFSET + 25.0;
const INNER_COMPASS: f32 = BTN_SIZE as f32 / 2.0;
const TICK_STEP: usize = 15;

/// `(label, from, to)` in degrees, `to` exclusive.
const CARDINALS: [(&str, f32, f32); 5] =
    [("N", 0.0, 68.0), ("E", 23.0, 158.0), ("S", 113.0, 248.0), ("W", 203.0, 338.0), ("N", 293.0, 360.0)];

/// Whether `label` is lit at `bearing`.
pub fn cardinal_lit(label: &str, bearing: f32) -> bool {
    CARDINALS.iter().any(|&(l, from, to)| l == label && bearing >= from && bearing < to)
}

/// Degree tick closest to `bearing`, wrapping 360 back to 0.
#[inline]
pub fn nearest_tick(bearing: f32) -> usize {
    let step = (bearing.rem_euclid(360.0) / TICK_STEP as f32).round() as usize;
    (step * TICK_STEP) % 360
}

#[inline]
fn on_circle(c: PointF, radius: f32, angle_deg: f32) -> PointF {
    let (s, co) = angle_deg.to_radians().sin_cos();
    PointF::new(radius.mul_add(s, c.x), (-radius).mul_add(co, c.y))
}

pub fn draw_compass(scene: &mut Scene, bearing: f32, rhd: bool, width: f32, height: f32) {
    let c = compass_center(width, height, rhd);
    let ring = Stroke::new(WHITE, 2.0);

    stroke_circle(scene, Layer::Compass, c, CIRCLE_OFFSET, Some(black(100)), ring);
    scene.push(Layer::Compass, DrawOp::Image(ImageOp { rotation_deg: bearing, ..ImageOp::new(AssetId::CompassInner, c) }));

    for &(label, from, to) in &CARDINALS {
        let lit = bearing >= from && bearing < to;
        let color = if lit { WHITE } else { white(51) };
        let (anchor, align) = match label {
            "N" => (PointF::new(c.x, c.y - INNER_COMPASS), TextAlign::TopCenter),
            "S" => (PointF::new(c.x, c.y + INNER_COMPASS), TextAlign::BottomCenter),
            // E and W sit a little inward so all four look evenly spaced.
            "E" => (PointF::new(c.x + INNER_COMPASS - 15.0, c.y), TextAlign::Center),
            _ => (PointF::new(c.x - INNER_COMPASS + 15.0, c.y), TextAlign::Center),
        };
        draw_text(scene, Layer::Compass, label, anchor, 25.0, color, align);
    }

    stroke_circle(scene, Layer::Compass, c, INNER_COMPASS + 5.0, None, ring);
    stroke_circle(scene, Layer::Compass, c, DEGREE_LABEL_OFFSET, None, ring);
    scene.push(Layer::Compass, DrawOp::Annulus { center: c, outer: DEGREE_LABEL_OFFSET, inner: CIRCLE_OFFSET, color: BLACK });

    let bold_tick = nearest_tick(bearing);
    for angle in (0..360).step_by(TICK_STEP) {
        let a = angle as f32;
        let cardinal = angle % 90 == 0;
        let len = if cardinal { 15.0 } else { 10.0 };
        let tick_w = if cardinal { 3.0 } else { 1.0 };
        scene.push(Layer::Compass, DrawOp::Line {
            from: on_circle(c, CIRCLE_OFFSET - len, a),
            to: on_circle(c, CIRCLE_OFFSET, a),
            stroke: Stroke::new(WHITE, tick_w),
        });

        let mut text: String<4> = String::new();
        write!(text, "{angle}").ok();
        let op = TextOp::new(text.as_str(), on_circle(c, CIRCLE_OFFSET + 12.0, a), 8.0, WHITE, TextAlign::Center);
        let op = if angle == bold_tick { op.bold() } else { op };
        scene.push(Layer::Compass, DrawOp::Text(op));
    }
}
