//! Low-level drawing helpers shared across widgets.
//!
//! # Icon Buttons
//!
//! Round HUD buttons are a [`BTN_SIZE`] disc with a centered image on top.
//! The disc color carries its own alpha; the image opacity is independent, so
//! a fading badge can sit on a fixed backdrop.

use crate::assets::AssetId;
use crate::colors::Rgba;
use crate::config::BTN_SIZE;
use crate::scene::{DrawOp, ImageOp, Layer, Paint, PointF, RectF, Scene, Stroke, TextAlign, TextOp};

/// Bounding box of a circle.
#[inline]
pub fn circle_rect(center: PointF, radius: f32) -> RectF {
    RectF::centered(center, radius * 2.0, radius * 2.0)
}

/// Disc plus centered image; a fully transparent backdrop is skipped.
pub fn draw_icon(scene: &mut Scene, layer: Layer, id: AssetId, center: PointF, bg: Rgba, opacity: f32) {
    if !bg.is_transparent() {
        scene.push(layer, DrawOp::Ellipse {
            rect: circle_rect(center, BTN_SIZE as f32 / 2.0),
            fill: Some(Paint::Solid(bg)),
            stroke: None,
        });
    }
    scene.push(layer, DrawOp::Image(ImageOp { opacity: opacity.clamp(0.0, 1.0), ..ImageOp::new(id, center) }));
}

/// Single run of text.
pub fn draw_text(scene: &mut Scene, layer: Layer, text: &str, anchor: PointF, size: f32, color: Rgba, align: TextAlign) {
    if text.is_empty() || color.is_transparent() {
        return;
    }
    scene.push(layer, DrawOp::Text(TextOp::new(text, anchor, size, color, align)));
}

/// Filled polygon, skipped when it cannot enclose any area.
pub fn fill_polygon(scene: &mut Scene, layer: Layer, points: &[PointF], paint: Paint) {
    if points.len() < 3 {
        return;
    }
    scene.push(layer, DrawOp::Polygon { rings: vec![points.to_vec()], paint });
}

/// Plain stroked circle.
pub fn stroke_circle(scene: &mut Scene, layer: Layer, center: PointF, radius: f32, fill: Option<Rgba>, stroke: Stroke) {
    scene.push(layer, DrawOp::Ellipse { rect: circle_rect(center, radius), fill: fill.map(Paint::Solid), stroke: Some(stroke) });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{TRANSPARENT, black};

    #[test]
    fn test_icon_with_backdrop() {
        let mut scene = Scene::new(100, 100);
        draw_icon(&mut scene, Layer::EngageButton, AssetId::Wheel(0), PointF::new(50.0, 50.0), black(166), 1.0);
        assert_eq!(scene.len(), 2, "Disc then image");
        assert!(matches!(scene.items()[0].op, DrawOp::Ellipse { .. }));
    }

    #[test]
    fn test_icon_transparent_backdrop_skipped() {
        let mut scene = Scene::new(100, 100);
        draw_icon(&mut scene, Layer::Personality, AssetId::Wheel(0), PointF::new(50.0, 50.0), TRANSPARENT, 1.5);
        assert_eq!(scene.len(), 1);
        let img = scene.images(Layer::Personality).next().expect("image pushed");
        assert!((img.opacity - 1.0).abs() < f32::EPSILON, "Opacity clamped");
    }

    #[test]
    fn test_degenerate_polygon_skipped() {
        let mut scene = Scene::new(10, 10);
        fill_polygon(&mut scene, Layer::Road, &[PointF::new(0.0, 0.0), PointF::new(1.0, 1.0)], Paint::Solid(black(255)));
        assert!(scene.is_empty());
    }
}
