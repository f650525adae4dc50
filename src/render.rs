//! Scene rasterizer.
//!
//! Replays a [`Scene`] into a [`FrameBuffer`], operation by operation, with
//! source-over alpha blending. The frame buffer is an `embedded-graphics`
//! [`DrawTarget`], so opaque work (clears, camera backdrops, text masks)
//! goes through the regular primitives; translucent work is blended per pixel.
//!
//! # Coverage Rules
//!
//! | Operation | Rule |
//! |-----------|------|
//! | fills, ellipses, rounded rects | pixel center inside the shape |
//! | polygons | scanline through pixel centers, even-odd |
//! | lines, polylines, arcs | each segment filled as a quad of the stroke width |
//! | text | ProFont glyph mask scaled by an integer factor |
//! | images | inverse-mapped nearest sample, rotation about the center |
//!
//! No anti-aliasing: output is meant for snapshots and the simulator window,
//! where determinism matters more than smooth edges.

use core::convert::Infallible;
use std::path::Path;

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::{BinaryColor, Rgb888};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use image::{ImageFormat, RgbImage};
use tracing::trace;

use crate::assets::AssetCatalog;
use crate::camera::CameraFrame;
use crate::colors::Rgba;
use crate::scene::{DrawOp, ImageOp, Paint, PointF, RectF, Scene, Stroke, TextAlign, TextOp};
use crate::styles::{font_for, text_width};

// =============================================================================
// Frame Buffer
// =============================================================================

/// Opaque RGB pixel buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb888>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, pixels: vec![Rgb888::BLACK; (width as usize) * (height as usize)] }
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb888> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Every pixel with its position, row-major.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel<Rgb888>> + '_ {
        let w = self.width as usize;
        self.pixels.iter().enumerate().map(move |(i, c)| Pixel(Point::new((i % w) as i32, (i / w) as i32), *c))
    }

    /// Source-over blend of `color` onto one pixel.
    #[inline]
    pub fn blend(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = blend_px(self.pixels[i], color);
        }
    }

    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let c = self.pixels[y as usize * self.width as usize + x as usize];
            image::Rgb([c.r(), c.g(), c.b()])
        })
    }

    pub fn save_png(&self, path: &Path) -> Result<(), image::ImageError> {
        self.to_image().save_with_format(path, ImageFormat::Png)
    }

    /// Pixel index range `[lo, hi)` whose centers fall in `[a, b)` along an axis of length `len`.
    fn span(a: f32, b: f32, len: u32) -> (i32, i32) {
        let lo = (a - 0.5).ceil().max(0.0) as i32;
        let hi = ((b - 0.5).ceil() as i32).min(len as i32);
        (lo, hi)
    }

    /// Blend `paint` over every pixel of `bbox` whose center satisfies `inside`.
    fn fill_where(&mut self, bbox: RectF, paint: &Paint, inside: impl Fn(f32, f32) -> bool) {
        let (y0, y1) = Self::span(bbox.y, bbox.bottom(), self.height);
        let (x0, x1) = Self::span(bbox.x, bbox.right(), self.width);
        for y in y0..y1 {
            let cy = y as f32 + 0.5;
            let color = paint.color_at(cy);
            if color.is_transparent() {
                continue;
            }
            for x in x0..x1 {
                if inside(x as f32 + 0.5, cy) {
                    self.blend(x, y, color);
                }
            }
        }
    }

    /// Even-odd scanline fill of one or more closed rings.
    fn fill_rings(&mut self, rings: &[Vec<PointF>], paint: &Paint) {
        let mut pts = rings.iter().flatten();
        let Some(first) = pts.next() else {
            return;
        };
        let (mut min_y, mut max_y) = (first.y, first.y);
        for p in pts {
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }

        let (y0, y1) = Self::span(min_y, max_y, self.height);
        let mut xs: Vec<f32> = Vec::new();
        for y in y0..y1 {
            let cy = y as f32 + 0.5;
            xs.clear();
            for ring in rings.iter().filter(|r| r.len() >= 3) {
                for (i, a) in ring.iter().enumerate() {
                    let b = ring[(i + 1) % ring.len()];
                    if (a.y <= cy) != (b.y <= cy) {
                        xs.push((cy - a.y).mul_add((b.x - a.x) / (b.y - a.y), a.x));
                    }
                }
            }
            if xs.len() < 2 {
                continue;
            }
            xs.sort_by(f32::total_cmp);
            let color = paint.color_at(cy);
            if color.is_transparent() {
                continue;
            }
            for pair in xs.chunks_exact(2) {
                let (x0, x1) = Self::span(pair[0], pair[1], self.width);
                for x in x0..x1 {
                    self.blend(x, y, color);
                }
            }
        }
    }

    /// One straight stroke segment as a filled quad.
    fn stroke_segment(&mut self, from: PointF, to: PointF, stroke: Stroke) {
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let len = dx.hypot(dy);
        if len == 0.0 || stroke.width <= 0.0 {
            return;
        }
        let (nx, ny) = (-dy / len * stroke.width / 2.0, dx / len * stroke.width / 2.0);
        let quad = vec![
            PointF::new(from.x + nx, from.y + ny),
            PointF::new(to.x + nx, to.y + ny),
            PointF::new(to.x - nx, to.y - ny),
            PointF::new(from.x - nx, from.y - ny),
        ];
        self.fill_rings(&[quad], &Paint::Solid(stroke.color));
    }

    fn stroke_polyline(&mut self, points: &[PointF], stroke: Stroke) {
        for pair in points.windows(2) {
            self.stroke_segment(pair[0], pair[1], stroke);
        }
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            if let Some(i) = self.index(p.x, p.y) {
                self.pixels[i] = color;
            }
        }
        Ok(())
    }
}

#[inline]
fn blend_px(dst: Rgb888, src: Rgba) -> Rgb888 {
    let a = u32::from(src.a);
    if a == 0xff {
        return src.to_rgb888();
    }
    let mix = |s: u8, d: u8| ((u32::from(s) * a + u32::from(d) * (255 - a) + 127) / 255) as u8;
    Rgb888::new(mix(src.r, dst.r()), mix(src.g, dst.g()), mix(src.b, dst.b()))
}

// =============================================================================
// Shape Tests
// =============================================================================

fn inside_ellipse(rect: RectF, x: f32, y: f32) -> bool {
    let (rx, ry) = (rect.w / 2.0, rect.h / 2.0);
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let c = rect.center();
    let (nx, ny) = ((x - c.x) / rx, (y - c.y) / ry);
    nx.mul_add(nx, ny * ny) <= 1.0
}

/// Rounded rectangle with separate top and bottom corner radii.
fn inside_rounded(rect: RectF, top: f32, bottom: f32, x: f32, y: f32) -> bool {
    if rect.w <= 0.0 || rect.h <= 0.0 || x < rect.x || x >= rect.right() || y < rect.y || y >= rect.bottom() {
        return false;
    }
    let r = if y < rect.center().y { top } else { bottom };
    let r = r.min(rect.w / 2.0).min(rect.h / 2.0).max(0.0);
    if r == 0.0 {
        return true;
    }
    let cx = x.clamp(rect.x + r, rect.right() - r);
    let cy = y.clamp(rect.y + r, rect.bottom() - r);
    (x - cx).mul_add(x - cx, (y - cy) * (y - cy)) <= r * r
}

fn grow(rect: RectF, by: f32) -> RectF {
    RectF::new(rect.x - by, rect.y - by, rect.w + by * 2.0, rect.h + by * 2.0)
}

/// Points along an elliptical arc, angles counter-clockwise from 3 o'clock.
fn arc_points(rect: RectF, start_deg: f32, sweep_deg: f32) -> Vec<PointF> {
    let c = rect.center();
    let (rx, ry) = (rect.w / 2.0, rect.h / 2.0);
    let steps = (sweep_deg.abs() / 3.0).ceil().max(8.0) as usize;
    (0..=steps)
        .map(|i| {
            let a = (sweep_deg * i as f32 / steps as f32 + start_deg).to_radians();
            PointF::new(rx.mul_add(a.cos(), c.x), (-ry).mul_add(a.sin(), c.y))
        })
        .collect()
}

// =============================================================================
// Text
// =============================================================================

/// 1-bit glyph mask at the font's native resolution.
struct GlyphMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl GlyphMask {
    fn render(text: &str, font: &MonoFont<'_>, bold: bool) -> Self {
        let width = text_width(font, 1, text.chars().count()) + u32::from(bold);
        let height = font.character_size.height;
        let mut mask = Self { width, height, bits: vec![false; (width * height) as usize] };
        let style = MonoTextStyle::new(font, BinaryColor::On);
        Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut mask).ok();
        if bold {
            Text::with_baseline(text, Point::new(1, 0), style, Baseline::Top).draw(&mut mask).ok();
        }
        mask
    }
}

impl OriginDimensions for GlyphMask {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for GlyphMask {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            if color.is_on() && p.x >= 0 && p.y >= 0 && (p.x as u32) < self.width && (p.y as u32) < self.height {
                self.bits[p.y as usize * self.width as usize + p.x as usize] = true;
            }
        }
        Ok(())
    }
}

/// Greedy word wrap; a single word wider than the limit keeps its own line.
fn wrap_lines(text: &str, max_chars: Option<usize>) -> Vec<String> {
    let Some(max_chars) = max_chars else {
        return text.lines().map(str::to_owned).collect();
    };
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if line.is_empty() { word.len() } else { line.len() + 1 + word.len() };
            if needed > max_chars && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines
}

// =============================================================================
// Rasterizer
// =============================================================================

/// Replays scenes using images from one asset catalog.
#[derive(Clone, Copy, Debug)]
pub struct Rasterizer<'a> {
    assets: &'a AssetCatalog,
}

impl<'a> Rasterizer<'a> {
    pub const fn new(assets: &'a AssetCatalog) -> Self {
        Self { assets }
    }

    /// Render `scene` into a new buffer of the scene's size.
    pub fn render_new(&self, scene: &Scene) -> FrameBuffer {
        let mut fb = FrameBuffer::new(scene.width(), scene.height());
        self.render(scene, &mut fb);
        fb
    }

    pub fn render(&self, scene: &Scene, fb: &mut FrameBuffer) {
        for item in scene.items() {
            self.draw_op(&item.op, fb);
        }
    }

    fn draw_op(&self, op: &DrawOp, fb: &mut FrameBuffer) {
        match op {
            DrawOp::Camera { rect, frame } => draw_camera(fb, *rect, frame.as_deref()),
            DrawOp::Fill { rect, paint } => fb.fill_where(*rect, paint, |_, _| true),
            DrawOp::RoundedRect { rect, top_radius, bottom_radius, fill, stroke } => {
                let (rect, top, bottom) = (*rect, *top_radius, *bottom_radius);
                if let Some(paint) = fill {
                    fb.fill_where(rect, paint, |x, y| inside_rounded(rect, top, bottom, x, y));
                }
                if let Some(s) = stroke {
                    let half = s.width / 2.0;
                    let outer = grow(rect, half);
                    let inner = grow(rect, -half);
                    let grown = |r: f32| if r > 0.0 { r + half } else { 0.0 };
                    let shrunk = |r: f32| (r - half).max(0.0);
                    fb.fill_where(outer, &Paint::Solid(s.color), |x, y| {
                        inside_rounded(outer, grown(top), grown(bottom), x, y)
                            && !inside_rounded(inner, shrunk(top), shrunk(bottom), x, y)
                    });
                }
            }
            DrawOp::Ellipse { rect, fill, stroke } => {
                let rect = *rect;
                if let Some(paint) = fill {
                    fb.fill_where(rect, paint, |x, y| inside_ellipse(rect, x, y));
                }
                if let Some(s) = stroke {
                    let outer = grow(rect, s.width / 2.0);
                    let inner = grow(rect, -s.width / 2.0);
                    fb.fill_where(outer, &Paint::Solid(s.color), |x, y| {
                        inside_ellipse(outer, x, y) && !inside_ellipse(inner, x, y)
                    });
                }
            }
            DrawOp::Annulus { center, outer, inner, color } => {
                let (c, ro, ri) = (*center, *outer, *inner);
                let bbox = RectF::centered(c, ro * 2.0, ro * 2.0);
                fb.fill_where(bbox, &Paint::Solid(*color), |x, y| {
                    let d2 = (x - c.x).mul_add(x - c.x, (y - c.y) * (y - c.y));
                    d2 <= ro * ro && d2 >= ri * ri
                });
            }
            DrawOp::Polygon { rings, paint } => fb.fill_rings(rings, paint),
            DrawOp::Polyline { points, stroke } => fb.stroke_polyline(points, *stroke),
            DrawOp::Line { from, to, stroke } => fb.stroke_segment(*from, *to, *stroke),
            DrawOp::Arc { rect, start_deg, sweep_deg, stroke } => {
                fb.stroke_polyline(&arc_points(*rect, *start_deg, *sweep_deg), *stroke);
            }
            DrawOp::Text(t) => draw_text(fb, t),
            DrawOp::Image(img) => self.draw_image(fb, img),
        }
    }

    fn draw_image(&self, fb: &mut FrameBuffer, op: &ImageOp) {
        let Some(sprite) = self.assets.get(op.id) else {
            trace!(id = ?op.id, "image not in catalog, skipped");
            return;
        };
        let (tw, th) = op.size.unwrap_or((sprite.width(), sprite.height()));
        if tw == 0 || th == 0 || op.opacity <= 0.0 {
            return;
        }
        let (hw, hh) = (tw as f32 / 2.0, th as f32 / 2.0);
        let (sin, cos) = op.rotation_deg.to_radians().sin_cos();
        let ext_x = hw.mul_add(cos.abs(), hh * sin.abs());
        let ext_y = hw.mul_add(sin.abs(), hh * cos.abs());
        let bbox = RectF::new(op.center.x - ext_x, op.center.y - ext_y, ext_x * 2.0, ext_y * 2.0);
        let (sw, sh) = (sprite.width() as f32, sprite.height() as f32);

        let (y0, y1) = FrameBuffer::span(bbox.y, bbox.bottom(), fb.height);
        let (x0, x1) = FrameBuffer::span(bbox.x, bbox.right(), fb.width);
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - op.center.x;
                let dy = y as f32 + 0.5 - op.center.y;
                // Undo the clockwise rotation.
                let lx = dx.mul_add(cos, dy * sin);
                let ly = (-dx).mul_add(sin, dy * cos);
                if lx.abs() > hw || ly.abs() > hh {
                    continue;
                }
                let mut u = ((lx + hw) / tw as f32 * sw) as i32;
                let v = ((ly + hh) / th as f32 * sh) as i32;
                if op.mirror {
                    u = sprite.width() as i32 - 1 - u;
                }
                if let Some(px) = sprite.pixel(u, v) {
                    fb.blend(x, y, px.scale_alpha(op.opacity));
                }
            }
        }
    }
}

/// Scale the frame to cover `rect`, cropping the overflow evenly.
fn draw_camera(fb: &mut FrameBuffer, rect: RectF, frame: Option<&CameraFrame>) {
    let area = Rectangle::new(
        Point::new(rect.x.round() as i32, rect.y.round() as i32),
        Size::new(rect.w.round().max(0.0) as u32, rect.h.round().max(0.0) as u32),
    );
    area.into_styled(PrimitiveStyle::with_fill(Rgb888::BLACK)).draw(fb).ok();

    let Some(frame) = frame.filter(|f| f.width > 0 && f.height > 0) else {
        return;
    };
    let scale = (rect.w / frame.width as f32).max(rect.h / frame.height as f32);
    let off_x = (rect.w - frame.width as f32 * scale) / 2.0;
    let off_y = (rect.h - frame.height as f32 * scale) / 2.0;

    let (y0, y1) = FrameBuffer::span(rect.y, rect.bottom(), fb.height);
    let (x0, x1) = FrameBuffer::span(rect.x, rect.right(), fb.width);
    for y in y0..y1 {
        let sy = ((y as f32 + 0.5 - rect.y - off_y) / scale).max(0.0) as u32;
        for x in x0..x1 {
            let sx = ((x as f32 + 0.5 - rect.x - off_x) / scale).max(0.0) as u32;
            if let (Some(c), Some(i)) = (frame.pixel(sx, sy), fb.index(x, y)) {
                fb.pixels[i] = c;
            }
        }
    }
}

fn draw_text(fb: &mut FrameBuffer, op: &TextOp) {
    if op.text.is_empty() || op.color.is_transparent() {
        return;
    }
    let (font, scale) = font_for(op.size);
    let advance = (font.character_size.width + font.character_spacing) * scale;
    let max_chars = op.wrap_width.map(|w| ((w / advance as f32) as usize).max(1));
    let lines = wrap_lines(&op.text, max_chars);

    let line_h = (font.character_size.height * scale) as f32;
    let block_h = line_h * lines.len() as f32;
    let top = match op.align {
        TextAlign::TopCenter => op.anchor.y,
        TextAlign::Center => op.anchor.y - block_h / 2.0,
        TextAlign::BottomCenter => op.anchor.y - block_h,
    };

    for (row, line) in lines.iter().enumerate() {
        let mask = GlyphMask::render(line, font, op.bold);
        let x0 = (op.anchor.x - (mask.width * scale) as f32 / 2.0).round() as i32;
        let y0 = (line_h.mul_add(row as f32, top)).round() as i32;
        let s = scale as i32;
        for my in 0..mask.height as i32 {
            for mx in 0..mask.width as i32 {
                if !mask.bits[(my as u32 * mask.width + mx as u32) as usize] {
                    continue;
                }
                for dy in 0..s {
                    for dx in 0..s {
                        fb.blend(x0 + mx * s + dx, y0 + my * s + dy, op.color);
                    }
                }
            }
        }
    }
}
