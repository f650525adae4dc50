//! Engage button and rotating steering wheel.
//!
//! Both draw the same icon on a round backdrop in the top-right corner. With
//! the rotating-wheel feature on, the icon moves slightly inward and turns
//! with the steering angle; otherwise it is a static button shown only while
//! controls can engage.

use crate::assets::AssetId;
use crate::colors::{Rgba, WHEEL_EXPERIMENTAL_BG, black};
use crate::config::BTN_SIZE;
use crate::layout::{engage_center, rotating_wheel_center};
use crate::scene::{DrawOp, ImageOp, Layer, Paint, PointF, Scene};
use crate::state::DisplayState;

use super::primitives::circle_rect;

/// Icon for the selected wheel; the stock wheel switches to the experimental
/// icon while experimental mode is on.
pub const fn wheel_image(wheel_icon: u8, experimental: bool) -> AssetId {
    match (wheel_icon, experimental) {
        (0, true) => AssetId::Experimental,
        (n, _) => AssetId::Wheel(n),
    }
}

/// Custom wheels keep their icon, so experimental mode is shown by the backdrop.
pub const fn wheel_background(wheel_icon: u8, experimental: bool) -> Rgba {
    if wheel_icon != 0 && experimental { WHEEL_EXPERIMENTAL_BG } else { black(166) }
}

fn draw_wheel(scene: &mut Scene, layer: Layer, ds: &DisplayState, center: PointF, rotation_deg: f32) {
    scene.push(layer, DrawOp::Ellipse {
        rect: circle_rect(center, BTN_SIZE as f32 / 2.0),
        fill: Some(Paint::Solid(wheel_background(ds.wheel_icon, ds.experimental_mode))),
        stroke: None,
    });
    scene.push(layer, DrawOp::Image(ImageOp {
        rotation_deg,
        ..ImageOp::new(wheel_image(ds.wheel_icon, ds.experimental_mode), center)
    }));
}

/// Static engage button; hidden when the rotating wheel replaces it.
pub fn draw_engage_button(scene: &mut Scene, ds: &DisplayState, width: f32) {
    if ds.flags.rotating_wheel || !ds.engage_visible {
        return;
    }
    draw_wheel(scene, Layer::EngageButton, ds, engage_center(width), 0.0);
}

pub fn draw_rotating_wheel(scene: &mut Scene, ds: &DisplayState, width: f32) {
    draw_wheel(scene, Layer::RotatingWheel, ds, rotating_wheel_center(width), -ds.steering_angle_deg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FeatureFlags;

    #[test]
    fn test_stock_wheel_experimental_icon() {
        assert_eq!(wheel_image(0, true), AssetId::Experimental);
        assert_eq!(wheel_image(0, false), AssetId::Wheel(0));
        assert_eq!(wheel_image(3, true), AssetId::Wheel(3), "Custom wheel keeps its icon");
    }

    #[test]
    fn test_custom_wheel_experimental_backdrop() {
        assert_eq!(wheel_background(2, true), WHEEL_EXPERIMENTAL_BG);
        assert_eq!(wheel_background(0, true), black(166));
    }

    #[test]
    fn test_engage_button_needs_engageable() {
        let mut scene = Scene::new(2100, 1020);
        draw_engage_button(&mut scene, &DisplayState::default(), 2100.0);
        assert!(scene.is_empty());

        let ds = DisplayState { engage_visible: true, ..DisplayState::default() };
        draw_engage_button(&mut scene, &ds, 2100.0);
        assert_eq!(scene.images(Layer::EngageButton).count(), 1);
    }

    #[test]
    fn test_rotating_wheel_counter_rotates() {
        let mut scene = Scene::new(2100, 1020);
        let ds = DisplayState {
            steering_angle_deg: 45.0,
            flags: FeatureFlags { rotating_wheel: true, ..FeatureFlags::default() },
            engage_visible: true,
            ..DisplayState::default()
        };
        draw_engage_button(&mut scene, &ds, 2100.0);
        assert!(scene.is_empty(), "Rotating wheel replaces the button");
        draw_rotating_wheel(&mut scene, &ds, 2100.0);
        let img = scene.images(Layer::RotatingWheel).next().expect("wheel");
        assert!((img.rotation_deg + 45.0).abs() < f32::EPSILON);
    }
}
