//! Header: gradient, set-speed box with attached limit sign, current speed.
//!
//! # Set-Speed Box
//!
//! | Condition | Width | Extra height | Bottom radius |
//! |-----------|-------|--------------|---------------|
//! | default | 172 | 0 | 32 |
//! | metric or EU sign | 200 | EU: 176 + 12 | EU: 100 |
//! | US sign, 3-digit limit | 223 | 186 + 12 | 32 |
//!
//! The box stays centered on the default box's column whatever its width.
//!
//! # Color Ramp
//!
//! With cruise set and engaged, the "MAX" label and the set speed blend
//! across three stops at `limit + 5`, `limit + 15`, `limit + 25`
//! (green → orange → red). Disengaged turns the label white, override turns it
//! gray, and without cruise both fall back to fixed neutral grays.

use crate::colors::{
    BLACK, MAX_DEFAULT, MAX_INACTIVE, MAX_ORANGE, MAX_OVERRIDE, MAX_RED, RED, Rgba, SET_SPEED_INACTIVE,
    SET_SPEED_ORANGE, SET_SPEED_RED, WHITE, black, interp_color, white,
};
use crate::config::{
    EU_SIGN_SIZE, HEADER_H, SET_SPEED_DEFAULT_H, SET_SPEED_DEFAULT_W, SET_SPEED_US_3DIGIT_W, SET_SPEED_WIDE_W,
    SET_SPEED_X, SET_SPEED_Y, SIGN_MARGIN, SPEED_TEXT_Y, SPEED_UNIT_Y, US_SIGN_HEIGHT,
};
use crate::scene::{DrawOp, Gradient, Layer, Paint, PointF, RectF, Scene, Stroke, TextAlign};
use crate::state::{DisplayState, LimitSign, Status};

use super::primitives::draw_text;

const TOP_RADIUS: f32 = 32.0;
const EU_BOTTOM_RADIUS: f32 = 100.0;

/// Outer box geometry for the current state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SetSpeedBox {
    pub rect: RectF,
    pub top_radius: f32,
    pub bottom_radius: f32,
}

pub fn set_speed_box(ds: &DisplayState) -> SetSpeedBox {
    let limit_digits = ds.speed_limit_text().len();
    let mut w = SET_SPEED_DEFAULT_W;
    let mut h = SET_SPEED_DEFAULT_H;
    if ds.is_metric || ds.limit_sign == LimitSign::Eu {
        w = SET_SPEED_WIDE_W;
    }
    if ds.limit_sign == LimitSign::Us && limit_digits >= 3 {
        w = SET_SPEED_US_3DIGIT_W;
    }
    match ds.limit_sign {
        LimitSign::Us => h += US_SIGN_HEIGHT + SIGN_MARGIN,
        LimitSign::Eu => h += EU_SIGN_SIZE + SIGN_MARGIN,
        LimitSign::None => {}
    }

    let x = SET_SPEED_X + (SET_SPEED_DEFAULT_W - w) / 2;
    SetSpeedBox {
        rect: RectF::new(x as f32, SET_SPEED_Y as f32, w as f32, h as f32),
        top_radius: TOP_RADIUS,
        bottom_radius: if ds.limit_sign == LimitSign::Eu { EU_BOTTOM_RADIUS } else { TOP_RADIUS },
    }
}

/// `(max label color, set speed color)`.
pub fn set_speed_colors(ds: &DisplayState) -> (Rgba, Rgba) {
    if !ds.cruise_set {
        return (MAX_INACTIVE, SET_SPEED_INACTIVE);
    }
    match ds.status {
        Status::Disengaged => (WHITE, WHITE),
        Status::Override => (MAX_OVERRIDE, WHITE),
        Status::Engaged if ds.speed_limit > 0.0 => {
            let l = ds.speed_limit;
            let stops = [l + 5.0, l + 15.0, l + 25.0];
            (
                interp_color(ds.set_speed, &stops, &[MAX_DEFAULT, MAX_ORANGE, MAX_RED]),
                interp_color(ds.set_speed, &stops, &[WHITE, SET_SPEED_ORANGE, SET_SPEED_RED]),
            )
        }
        Status::Engaged => (MAX_DEFAULT, WHITE),
    }
}

/// Top shade behind the header widgets.
pub fn draw_header_gradient(scene: &mut Scene, width: f32) {
    let h = HEADER_H as f32;
    let gradient = Gradient::new(h - h / 2.5, h).with_stop(0.0, black(115)).with_stop(1.0, black(0));
    scene.push(Layer::Header, DrawOp::Fill { rect: RectF::new(0.0, 0.0, width, h), paint: Paint::Vertical(gradient) });
}

pub fn draw_set_speed(scene: &mut Scene, ds: &DisplayState) -> SetSpeedBox {
    let bx = set_speed_box(ds);
    scene.push(Layer::SetSpeed, DrawOp::RoundedRect {
        rect: bx.rect,
        top_radius: bx.top_radius,
        bottom_radius: bx.bottom_radius,
        fill: Some(Paint::Solid(black(166))),
        stroke: Some(Stroke::new(white(75), 6.0)),
    });

    let (max_color, set_color) = set_speed_colors(ds);
    let cx = bx.rect.center().x;
    draw_text(scene, Layer::SetSpeed, "MAX", PointF::new(cx, bx.rect.y + 27.0), 40.0, max_color, TextAlign::TopCenter);
    draw_text(scene, Layer::SetSpeed, &ds.set_speed_text(), PointF::new(cx, bx.rect.y + 77.0), 90.0, set_color, TextAlign::TopCenter);
    bx
}

/// Limit sign attached under the set-speed box.
pub fn draw_speed_limit(scene: &mut Scene, ds: &DisplayState, bx: &SetSpeedBox) {
    let m = SIGN_MARGIN as f32;
    let sign = bx.rect.adjusted(m, SET_SPEED_DEFAULT_H as f32, -m, -m);
    let limit = ds.speed_limit_text();
    let cx = sign.center().x;

    match ds.limit_sign {
        LimitSign::None => {}
        LimitSign::Us => {
            scene.push(Layer::SpeedLimit, DrawOp::RoundedRect {
                rect: sign,
                top_radius: 24.0,
                bottom_radius: 24.0,
                fill: Some(Paint::Solid(WHITE)),
                stroke: None,
            });
            scene.push(Layer::SpeedLimit, DrawOp::RoundedRect {
                rect: sign.adjusted(9.0, 9.0, -9.0, -9.0),
                top_radius: 16.0,
                bottom_radius: 16.0,
                fill: None,
                stroke: Some(Stroke::new(BLACK, 6.0)),
            });
            draw_text(scene, Layer::SpeedLimit, "SPEED", PointF::new(cx, sign.y + 22.0), 28.0, BLACK, TextAlign::TopCenter);
            draw_text(scene, Layer::SpeedLimit, "LIMIT", PointF::new(cx, sign.y + 51.0), 28.0, BLACK, TextAlign::TopCenter);
            draw_text(scene, Layer::SpeedLimit, &limit, PointF::new(cx, sign.y + 85.0), 70.0, BLACK, TextAlign::TopCenter);
        }
        LimitSign::Eu => {
            scene.push(Layer::SpeedLimit, DrawOp::Ellipse { rect: sign, fill: Some(Paint::Solid(WHITE)), stroke: None });
            scene.push(Layer::SpeedLimit, DrawOp::Ellipse {
                rect: sign.adjusted(16.0, 16.0, -16.0, -16.0),
                fill: None,
                stroke: Some(Stroke::new(RED, 20.0)),
            });
            let size = if limit.len() >= 3 { 60.0 } else { 70.0 };
            draw_text(scene, Layer::SpeedLimit, &limit, sign.center(), size, BLACK, TextAlign::Center);
        }
    }
}

/// Current speed and unit, centered on the view.
pub fn draw_current_speed(scene: &mut Scene, ds: &DisplayState, width: f32) {
    let cx = width / 2.0;
    draw_text(scene, Layer::Speed, &ds.speed_text(), PointF::new(cx, SPEED_TEXT_Y as f32), 176.0, WHITE, TextAlign::BottomCenter);
    draw_text(scene, Layer::Speed, ds.unit_label(), PointF::new(cx, SPEED_UNIT_Y as f32), 66.0, white(200), TextAlign::BottomCenter);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engaged(set_speed: f32, limit: f32) -> DisplayState {
        DisplayState {
            cruise_set: true,
            set_speed,
            speed_limit: limit,
            limit_sign: LimitSign::Us,
            status: Status::Engaged,
            ..DisplayState::default()
        }
    }

    // -------------------------------------------------------------------------
    // Box Geometry
    // -------------------------------------------------------------------------

    #[test]
    fn test_default_box() {
        let bx = set_speed_box(&DisplayState::default());
        assert_eq!(bx.rect, RectF::new(60.0, 45.0, 172.0, 204.0));
        assert!((bx.bottom_radius - 32.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_us_three_digit_widens() {
        let ds = DisplayState { speed_limit: 100.0, limit_sign: LimitSign::Us, ..DisplayState::default() };
        let bx = set_speed_box(&ds);
        assert!((bx.rect.w - 223.0).abs() < f32::EPSILON);
        assert!((bx.rect.h - 402.0).abs() < f32::EPSILON);
        assert!((bx.rect.x - 35.0).abs() < f32::EPSILON, "Centered on the default column");
    }

    #[test]
    fn test_eu_sign_rounds_bottom() {
        let ds = DisplayState { speed_limit: 50.0, limit_sign: LimitSign::Eu, ..DisplayState::default() };
        let bx = set_speed_box(&ds);
        assert!((bx.rect.w - 200.0).abs() < f32::EPSILON);
        assert!((bx.rect.h - 392.0).abs() < f32::EPSILON);
        assert!((bx.bottom_radius - 100.0).abs() < f32::EPSILON);
    }

    // -------------------------------------------------------------------------
    // Color Ramp
    // -------------------------------------------------------------------------

    #[test]
    fn test_ramp_green_below_limit_plus_five() {
        let (max, set) = set_speed_colors(&engaged(28.0, 25.0));
        assert_eq!(max, MAX_DEFAULT);
        assert_eq!(set, WHITE);
    }

    #[test]
    fn test_ramp_orange_at_limit_plus_fifteen() {
        let (max, set) = set_speed_colors(&engaged(40.0, 25.0));
        assert_eq!(max, MAX_ORANGE);
        assert_eq!(set, SET_SPEED_ORANGE);
    }

    #[test]
    fn test_ramp_between_stops_blends() {
        let (_, set) = set_speed_colors(&engaged(35.0, 25.0));
        assert_eq!(set.r, 0xff);
        assert!(set.g < 0xff && set.g > 0x95, "Halfway from white toward orange");
    }

    #[test]
    fn test_ramp_red_past_limit_plus_twentyfive() {
        let (max, set) = set_speed_colors(&engaged(60.0, 25.0));
        assert_eq!(max, MAX_RED);
        assert_eq!(set, SET_SPEED_RED);
    }

    #[test]
    fn test_cruise_off_uses_grays() {
        let ds = DisplayState { cruise_set: false, ..engaged(60.0, 25.0) };
        assert_eq!(set_speed_colors(&ds), (MAX_INACTIVE, SET_SPEED_INACTIVE));
    }

    #[test]
    fn test_override_gray_label() {
        let ds = DisplayState { status: Status::Override, ..engaged(60.0, 25.0) };
        assert_eq!(set_speed_colors(&ds).0, MAX_OVERRIDE);
    }

    // -------------------------------------------------------------------------
    // Draw Calls
    // -------------------------------------------------------------------------

    #[test]
    fn test_only_one_sign_drawn() {
        let mut scene = Scene::new(2100, 1020);
        let ds = DisplayState { speed_limit: 50.0, limit_sign: LimitSign::Eu, ..DisplayState::default() };
        let bx = draw_set_speed(&mut scene, &ds);
        draw_speed_limit(&mut scene, &ds, &bx);
        assert!(scene.layer_ops(Layer::SpeedLimit).all(|op| !matches!(op, DrawOp::RoundedRect { .. })));
        assert_eq!(scene.texts(Layer::SpeedLimit).count(), 1);
    }

    #[test]
    fn test_no_sign_no_ops() {
        let mut scene = Scene::new(2100, 1020);
        let ds = DisplayState::default();
        let bx = draw_set_speed(&mut scene, &ds);
        draw_speed_limit(&mut scene, &ds, &bx);
        assert!(!scene.has_layer(Layer::SpeedLimit));
    }
}
