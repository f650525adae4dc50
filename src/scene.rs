//! Display list produced by the compositor.
//!
//! A [`Scene`] is an ordered list of [`DrawOp`]s, each tagged with the
//! [`Layer`] that emitted it. The compositor fills it in a fixed order every
//! frame and the rasterizer in [`crate::render`] replays it into pixels.
//! Keeping the two apart lets tests assert on what would be drawn (which
//! image, which color, in which order) without inspecting pixels.
//!
//! Widgets draw in view-local coordinates; [`Scene::set_origin`] shifts
//! everything pushed afterwards into window coordinates.

use std::sync::Arc;

use crate::assets::AssetId;
use crate::camera::CameraFrame;
use crate::colors::{Rgba, TRANSPARENT, lerp_rgba};

// =============================================================================
// Geometry
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointF {
    pub x: f32,
    pub y: f32,
}

impl PointF {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RectF {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl RectF {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Square centered on `c`.
    pub fn centered(c: PointF, w: f32, h: f32) -> Self {
        Self::new(c.x - w / 2.0, c.y - h / 2.0, w, h)
    }

    #[inline]
    pub fn center(&self) -> PointF {
        PointF::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Move the edges: positive `dx1`/`dy1` shrink from the top-left,
    /// negative `dx2`/`dy2` shrink from the bottom-right.
    pub fn adjusted(&self, dx1: f32, dy1: f32, dx2: f32, dy2: f32) -> Self {
        Self::new(self.x + dx1, self.y + dy1, self.w - dx1 + dx2, self.h - dy1 + dy2)
    }

    fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }
}

// =============================================================================
// Paint
// =============================================================================

/// Vertical linear gradient. Position 0 sits at `y0`, position 1 at `y1`;
/// pixels outside the span take the nearest end stop.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    pub y0: f32,
    pub y1: f32,
    stops: Vec<(f32, Rgba)>,
}

impl Gradient {
    pub const fn new(y0: f32, y1: f32) -> Self {
        Self { y0, y1, stops: Vec::new() }
    }

    /// Add a stop at `pos` in `[0, 1]`, replacing an existing stop at the same position.
    pub fn set_color_at(&mut self, pos: f32, color: Rgba) {
        let pos = pos.clamp(0.0, 1.0);
        match self.stops.binary_search_by(|(p, _)| p.total_cmp(&pos)) {
            Ok(i) => self.stops[i].1 = color,
            Err(i) => self.stops.insert(i, (pos, color)),
        }
    }

    /// Builder form of [`Self::set_color_at`].
    #[must_use]
    pub fn with_stop(mut self, pos: f32, color: Rgba) -> Self {
        self.set_color_at(pos, color);
        self
    }

    pub fn stops(&self) -> &[(f32, Rgba)] {
        &self.stops
    }

    /// Color at screen row `y`.
    pub fn color_at(&self, y: f32) -> Rgba {
        let Some(&(first_pos, first)) = self.stops.first() else {
            return TRANSPARENT;
        };
        let span = self.y1 - self.y0;
        let t = if span == 0.0 { 0.0 } else { ((y - self.y0) / span).clamp(0.0, 1.0) };

        if t <= first_pos {
            return first;
        }
        for pair in self.stops.windows(2) {
            let (p0, c0) = pair[0];
            let (p1, c1) = pair[1];
            if t <= p1 {
                let f = if p1 > p0 { (t - p0) / (p1 - p0) } else { 1.0 };
                return lerp_rgba(c0, c1, f);
            }
        }
        self.stops.last().map_or(first, |&(_, c)| c)
    }

    fn offset(mut self, dy: f32) -> Self {
        self.y0 += dy;
        self.y1 += dy;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    Vertical(Gradient),
}

impl Paint {
    pub fn color_at(&self, y: f32) -> Rgba {
        match self {
            Self::Solid(c) => *c,
            Self::Vertical(g) => g.color_at(y),
        }
    }

    fn offset(self, dy: f32) -> Self {
        match self {
            Self::Solid(c) => Self::Solid(c),
            Self::Vertical(g) => Self::Vertical(g.offset(dy)),
        }
    }
}

impl From<Rgba> for Paint {
    fn from(c: Rgba) -> Self {
        Self::Solid(c)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f32,
}

impl Stroke {
    pub const fn new(color: Rgba, width: f32) -> Self {
        Self { color, width }
    }
}

// =============================================================================
// Draw Operations
// =============================================================================

/// How a text anchor point relates to the rendered text box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    /// Anchor is the top-center of the first line.
    TopCenter,
    /// Anchor is the center of the text block.
    Center,
    /// Anchor is the bottom-center of the last line.
    BottomCenter,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextOp {
    pub text: String,
    pub anchor: PointF,
    /// Nominal glyph height in pixels.
    pub size: f32,
    pub color: Rgba,
    pub align: TextAlign,
    /// Wrap at word boundaries when wider than this.
    pub wrap_width: Option<f32>,
    pub bold: bool,
}

impl TextOp {
    pub fn new(text: impl Into<String>, anchor: PointF, size: f32, color: Rgba, align: TextAlign) -> Self {
        Self { text: text.into(), anchor, size, color, align, wrap_width: None, bold: false }
    }

    #[must_use]
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    #[must_use]
    pub fn wrapped(mut self, width: f32) -> Self {
        self.wrap_width = Some(width);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImageOp {
    pub id: AssetId,
    pub center: PointF,
    /// Target size; the sprite's own size when `None`.
    pub size: Option<(u32, u32)>,
    /// Clockwise rotation in degrees.
    pub rotation_deg: f32,
    /// Mirror horizontally.
    pub mirror: bool,
    pub opacity: f32,
}

impl ImageOp {
    pub const fn new(id: AssetId, center: PointF) -> Self {
        Self { id, center, size: None, rotation_deg: 0.0, mirror: false, opacity: 1.0 }
    }
}

#[derive(Clone, Debug)]
pub enum DrawOp {
    /// Newest camera image scaled into `rect`, black when absent.
    Camera { rect: RectF, frame: Option<Arc<CameraFrame>> },
    Fill { rect: RectF, paint: Paint },
    RoundedRect { rect: RectF, top_radius: f32, bottom_radius: f32, fill: Option<Paint>, stroke: Option<Stroke> },
    Ellipse { rect: RectF, fill: Option<Paint>, stroke: Option<Stroke> },
    /// Filled ring between two concentric circles.
    Annulus { center: PointF, outer: f32, inner: f32, color: Rgba },
    /// One or more closed rings filled with the even-odd rule.
    Polygon { rings: Vec<Vec<PointF>>, paint: Paint },
    Polyline { points: Vec<PointF>, stroke: Stroke },
    Line { from: PointF, to: PointF, stroke: Stroke },
    /// Elliptical arc inscribed in `rect`; angles in degrees, counter-clockwise from 3 o'clock.
    Arc { rect: RectF, start_deg: f32, sweep_deg: f32, stroke: Stroke },
    Text(TextOp),
    Image(ImageOp),
}

impl DrawOp {
    /// Shift the operation by `(dx, dy)`.
    #[must_use]
    pub fn translated(self, dx: f32, dy: f32) -> Self {
        let pts = |v: Vec<PointF>| v.into_iter().map(|p| p.offset(dx, dy)).collect::<Vec<_>>();
        match self {
            Self::Camera { rect, frame } => Self::Camera { rect: rect.offset(dx, dy), frame },
            Self::Fill { rect, paint } => Self::Fill { rect: rect.offset(dx, dy), paint: paint.offset(dy) },
            Self::RoundedRect { rect, top_radius, bottom_radius, fill, stroke } => Self::RoundedRect {
                rect: rect.offset(dx, dy),
                top_radius,
                bottom_radius,
                fill: fill.map(|p| p.offset(dy)),
                stroke,
            },
            Self::Ellipse { rect, fill, stroke } => {
                Self::Ellipse { rect: rect.offset(dx, dy), fill: fill.map(|p| p.offset(dy)), stroke }
            }
            Self::Annulus { center, outer, inner, color } => {
                Self::Annulus { center: center.offset(dx, dy), outer, inner, color }
            }
            Self::Polygon { rings, paint } => {
                Self::Polygon { rings: rings.into_iter().map(pts).collect(), paint: paint.offset(dy) }
            }
            Self::Polyline { points, stroke } => Self::Polyline { points: pts(points), stroke },
            Self::Line { from, to, stroke } => Self::Line { from: from.offset(dx, dy), to: to.offset(dx, dy), stroke },
            Self::Arc { rect, start_deg, sweep_deg, stroke } => {
                Self::Arc { rect: rect.offset(dx, dy), start_deg, sweep_deg, stroke }
            }
            Self::Text(mut t) => {
                t.anchor = t.anchor.offset(dx, dy);
                Self::Text(t)
            }
            Self::Image(mut i) => {
                i.center = i.center.offset(dx, dy);
                Self::Image(i)
            }
        }
    }
}

// =============================================================================
// Scene
// =============================================================================

/// Which part of the HUD emitted an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Border,
    Camera,
    ExtraView,
    Road,
    Leads,
    DriverState,
    Header,
    SetSpeed,
    SpeedLimit,
    Speed,
    EngageButton,
    Personality,
    Compass,
    TurnSignals,
    RotatingWheel,
    StatusBar,
    Alert,
}

#[derive(Clone, Debug)]
pub struct SceneItem {
    pub layer: Layer,
    pub op: DrawOp,
}

/// Ordered display list for one frame.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    width: u32,
    height: u32,
    origin: PointF,
    items: Vec<SceneItem>,
}

impl Scene {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height, origin: PointF::new(0.0, 0.0), items: Vec::new() }
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Offset applied to everything pushed from now on.
    pub fn set_origin(&mut self, origin: PointF) {
        self.origin = origin;
    }

    pub fn push(&mut self, layer: Layer, op: DrawOp) {
        let op = if self.origin == PointF::default() { op } else { op.translated(self.origin.x, self.origin.y) };
        self.items.push(SceneItem { layer, op });
    }

    pub fn items(&self) -> &[SceneItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Operations emitted by `layer`, in draw order.
    pub fn layer_ops(&self, layer: Layer) -> impl Iterator<Item = &DrawOp> {
        self.items.iter().filter(move |i| i.layer == layer).map(|i| &i.op)
    }

    pub fn has_layer(&self, layer: Layer) -> bool {
        self.items.iter().any(|i| i.layer == layer)
    }

    /// Layers in first-appearance order.
    pub fn layer_order(&self) -> Vec<Layer> {
        let mut order: Vec<Layer> = Vec::new();
        for item in &self.items {
            if order.last() != Some(&item.layer) && !order.contains(&item.layer) {
                order.push(item.layer);
            }
        }
        order
    }

    /// Images emitted by `layer`.
    pub fn images(&self, layer: Layer) -> impl Iterator<Item = &ImageOp> {
        self.layer_ops(layer).filter_map(|op| match op {
            DrawOp::Image(i) => Some(i),
            _ => None,
        })
    }

    /// Texts emitted by `layer`.
    pub fn texts(&self, layer: Layer) -> impl Iterator<Item = &TextOp> {
        self.layer_ops(layer).filter_map(|op| match op {
            DrawOp::Text(t) => Some(t),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{BLACK, WHITE};

    #[test]
    fn test_gradient_end_stops_pad() {
        let g = Gradient::new(100.0, 0.0).with_stop(0.0, BLACK).with_stop(1.0, WHITE);
        assert_eq!(g.color_at(200.0), BLACK, "Below the start row pads with the first stop");
        assert_eq!(g.color_at(-50.0), WHITE, "Past the end row pads with the last stop");
        let mid = g.color_at(50.0);
        assert!((127..=128).contains(&mid.r));
    }

    #[test]
    fn test_gradient_replaces_same_position() {
        let mut g = Gradient::new(0.0, 10.0);
        g.set_color_at(0.5, BLACK);
        g.set_color_at(0.5, WHITE);
        assert_eq!(g.stops().len(), 1);
        assert_eq!(g.stops()[0].1, WHITE);
    }

    #[test]
    fn test_empty_gradient_is_transparent() {
        assert!(Gradient::new(0.0, 1.0).color_at(0.5).is_transparent());
    }

    #[test]
    fn test_rect_adjusted() {
        let r = RectF::new(60.0, 45.0, 172.0, 402.0).adjusted(12.0, 204.0, -12.0, -12.0);
        assert_eq!(r, RectF::new(72.0, 249.0, 148.0, 186.0));
    }

    #[test]
    fn test_scene_origin_translates() {
        let mut scene = Scene::new(100, 100);
        scene.set_origin(PointF::new(30.0, 30.0));
        scene.push(Layer::Leads, DrawOp::Line {
            from: PointF::new(0.0, 0.0),
            to: PointF::new(1.0, 1.0),
            stroke: Stroke::new(WHITE, 1.0),
        });
        match &scene.items()[0].op {
            DrawOp::Line { from, .. } => assert_eq!(*from, PointF::new(30.0, 30.0)),
            other => panic!("unexpected op {other:?}"),
        }
    }

    #[test]
    fn test_layer_order_first_appearance() {
        let mut scene = Scene::new(10, 10);
        let fill = || DrawOp::Fill { rect: RectF::new(0.0, 0.0, 1.0, 1.0), paint: Paint::Solid(BLACK) };
        scene.push(Layer::Camera, fill());
        scene.push(Layer::Road, fill());
        scene.push(Layer::Road, fill());
        scene.push(Layer::Alert, fill());
        assert_eq!(scene.layer_order(), vec![Layer::Camera, Layer::Road, Layer::Alert]);
    }
}
