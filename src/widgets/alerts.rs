//! Alert banner.
//!
//! # Size Classes
//!
//! | Size | Height | Margin / radius | Text |
//! |------|--------|-----------------|------|
//! | Small | 271 | 40 / 30 | one line, 74 px |
//! | Mid | 420 | 40 / 30 | 88 px bold headline over 66 px line |
//! | Full | whole view | 0 / 0 | wrapped paragraphs, smaller headline past 15 chars |
//!
//! The banner sits at the bottom of the view it is drawn into. The status
//! color is laid down first, then a black top-to-bottom gradient darkens it.

use crate::alerts::Alert;
use crate::colors::{ALERT_CRITICAL, ALERT_NORMAL, ALERT_USER_PROMPT, Rgba, WHITE, black};
use crate::scene::{DrawOp, Gradient, Layer, Paint, PointF, RectF, Scene, TextAlign, TextOp};
use crate::topics::{AlertSize, AlertStatus};

const SMALL_H: f32 = 271.0;
const MID_H: f32 = 420.0;
const MARGIN: f32 = 40.0;
const RADIUS: f32 = 30.0;

/// Headlines longer than this use the smaller full-screen font tier.
const LONG_TEXT_CHARS: usize = 15;

pub const fn alert_color(status: AlertStatus) -> Rgba {
    match status {
        AlertStatus::Normal => ALERT_NORMAL,
        AlertStatus::UserPrompt => ALERT_USER_PROMPT,
        AlertStatus::Critical => ALERT_CRITICAL,
    }
}

/// Banner rectangle, `None` when the alert is not shown.
pub fn alert_rect(size: AlertSize, width: f32, height: f32) -> Option<RectF> {
    let (h, margin) = match size {
        AlertSize::None => return None,
        AlertSize::Small => (SMALL_H, MARGIN),
        AlertSize::Mid => (MID_H, MARGIN),
        AlertSize::Full => (height, 0.0),
    };
    Some(RectF::new(margin, height - h + margin, width - margin * 2.0, h - margin * 2.0))
}

fn push_text(scene: &mut Scene, op: TextOp) {
    if !op.text.is_empty() {
        scene.push(Layer::Alert, DrawOp::Text(op));
    }
}

pub fn draw_alert(scene: &mut Scene, alert: &Alert, width: f32, height: f32) {
    let Some(r) = alert_rect(alert.size, width, height) else {
        return;
    };
    let radius = if alert.size == AlertSize::Full { 0.0 } else { RADIUS };

    scene.push(Layer::Alert, DrawOp::RoundedRect {
        rect: r,
        top_radius: radius,
        bottom_radius: radius,
        fill: Some(Paint::Solid(alert_color(alert.status))),
        stroke: None,
    });
    let shade = Gradient::new(r.y, r.bottom()).with_stop(0.0, black(13)).with_stop(1.0, black(89));
    scene.push(Layer::Alert, DrawOp::RoundedRect {
        rect: r,
        top_radius: radius,
        bottom_radius: radius,
        fill: Some(Paint::Vertical(shade)),
        stroke: None,
    });

    let c = r.center();
    match alert.size {
        AlertSize::Small => {
            push_text(scene, TextOp::new(alert.text1.as_str(), c, 74.0, WHITE, TextAlign::Center).bold());
        }
        AlertSize::Mid => {
            let top = PointF::new(c.x, c.y - 125.0);
            push_text(scene, TextOp::new(alert.text1.as_str(), top, 88.0, WHITE, TextAlign::TopCenter).bold());
            let bottom = PointF::new(c.x, c.y + 21.0);
            push_text(scene, TextOp::new(alert.text2.as_str(), bottom, 66.0, WHITE, TextAlign::TopCenter));
        }
        AlertSize::Full => {
            let long = alert.text1.chars().count() > LONG_TEXT_CHARS;
            let wrap = r.w - 60.0;
            let (size1, y1) = if long { (132.0, 240.0) } else { (177.0, 270.0) };
            let y2 = r.h - if long { 361.0 } else { 420.0 };
            push_text(
                scene,
                TextOp::new(alert.text1.as_str(), PointF::new(c.x, r.y + y1), size1, WHITE, TextAlign::TopCenter)
                    .bold()
                    .wrapped(wrap),
            );
            push_text(
                scene,
                TextOp::new(alert.text2.as_str(), PointF::new(c.x, r.y + y2), 88.0, WHITE, TextAlign::TopCenter)
                    .wrapped(wrap),
            );
        }
        AlertSize::None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(text1: &str, text2: &str, size: AlertSize, status: AlertStatus) -> Alert {
        Alert::new(text1, text2, "test", size, status)
    }

    #[test]
    fn test_hidden_alert_draws_nothing() {
        let mut scene = Scene::new(2100, 1020);
        draw_alert(&mut scene, &Alert::default(), 2100.0, 1020.0);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_rect_per_size() {
        let small = alert_rect(AlertSize::Small, 2100.0, 1020.0).expect("small");
        assert_eq!(small, RectF::new(40.0, 789.0, 2020.0, 191.0));
        let full = alert_rect(AlertSize::Full, 2100.0, 1020.0).expect("full");
        assert_eq!(full, RectF::new(0.0, 0.0, 2100.0, 1020.0), "Full banner covers the view edge to edge");
    }

    #[test]
    fn test_background_then_shade() {
        let mut scene = Scene::new(2100, 1020);
        draw_alert(&mut scene, &alert("Hi", "", AlertSize::Small, AlertStatus::Critical), 2100.0, 1020.0);
        let ops: Vec<_> = scene.layer_ops(Layer::Alert).collect();
        match (ops[0], ops[1]) {
            (DrawOp::RoundedRect { fill: Some(Paint::Solid(c)), .. }, DrawOp::RoundedRect { fill: Some(Paint::Vertical(g)), .. }) => {
                assert_eq!(*c, ALERT_CRITICAL);
                assert_eq!(g.stops()[0].1.a, 13);
                assert_eq!(g.stops()[1].1.a, 89);
            }
            other => panic!("unexpected ops {other:?}"),
        }
    }

    #[test]
    fn test_mid_draws_two_lines() {
        let mut scene = Scene::new(2100, 1020);
        draw_alert(&mut scene, &alert("Top", "Bottom", AlertSize::Mid, AlertStatus::Normal), 2100.0, 1020.0);
        let texts: Vec<_> = scene.texts(Layer::Alert).collect();
        assert_eq!(texts.len(), 2);
        assert!(texts[0].bold && !texts[1].bold);
        assert!(texts[0].anchor.y < texts[1].anchor.y, "Headline above the second line");
    }

    #[test]
    fn test_full_long_headline_smaller_font() {
        let mut scene = Scene::new(2100, 1020);
        draw_alert(&mut scene, &alert("TAKE CONTROL IMMEDIATELY", "x", AlertSize::Full, AlertStatus::Critical), 2100.0, 1020.0);
        let head = scene.texts(Layer::Alert).next().expect("headline");
        assert!((head.size - 132.0).abs() < f32::EPSILON);
        assert!(head.wrap_width.is_some());

        let mut scene = Scene::new(2100, 1020);
        draw_alert(&mut scene, &alert("Short", "x", AlertSize::Full, AlertStatus::Critical), 2100.0, 1020.0);
        let head = scene.texts(Layer::Alert).next().expect("headline");
        assert!((head.size - 177.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_full_has_square_corners() {
        let mut scene = Scene::new(2100, 1020);
        draw_alert(&mut scene, &alert("A", "", AlertSize::Full, AlertStatus::Normal), 2100.0, 1020.0);
        match scene.layer_ops(Layer::Alert).next() {
            Some(DrawOp::RoundedRect { top_radius, bottom_radius, .. }) => {
                assert!(*top_radius == 0.0 && *bottom_radius == 0.0);
            }
            other => panic!("unexpected op {other:?}"),
        }
    }
}
