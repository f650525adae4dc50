//! Font tiers for HUD text.
//!
//! HUD text is requested by nominal pixel height (40 px "MAX", 176 px
//! speed, ...). The rasterizer renders with ProFont bitmap faces scaled by
//! an integer factor, so every nominal size maps onto a base face plus a
//! scale:
//!
//! | Nominal size | Base face | Scale |
//! |--------------|-----------|-------|
//! | below the 24 pt height | largest face that fits | 1 |
//! | otherwise | `PROFONT_24_POINT` | `round(size / height)` |
//!
//! The faces are `const` references so nothing is built per frame.

use embedded_graphics::mono_font::MonoFont;
use profont::{PROFONT_12_POINT, PROFONT_14_POINT, PROFONT_18_POINT, PROFONT_24_POINT, PROFONT_9_POINT};

/// Base faces from smallest to largest.
pub const FONT_TIERS: [&MonoFont<'static>; 5] =
    [&PROFONT_9_POINT, &PROFONT_12_POINT, &PROFONT_14_POINT, &PROFONT_18_POINT, &PROFONT_24_POINT];

/// Face used for large text before scaling.
pub const LARGE_FONT: &MonoFont<'static> = &PROFONT_24_POINT;

/// Base face and integer scale for text of nominal height `size`.
pub fn font_for(size: f32) -> (&'static MonoFont<'static>, u32) {
    let large_h = LARGE_FONT.character_size.height as f32;
    if size >= large_h {
        return (LARGE_FONT, (size / large_h).round().max(1.0) as u32);
    }
    let face = FONT_TIERS
        .iter()
        .rev()
        .find(|f| f.character_size.height as f32 <= size)
        .copied()
        .unwrap_or(FONT_TIERS[0]);
    (face, 1)
}

/// Horizontal advance of one character at `scale`.
#[inline]
pub fn advance(font: &MonoFont<'_>, scale: u32) -> u32 {
    (font.character_size.width + font.character_spacing) * scale
}

/// Rendered width of `chars` characters at `scale`.
pub fn text_width(font: &MonoFont<'_>, scale: u32, chars: usize) -> u32 {
    if chars == 0 {
        return 0;
    }
    advance(font, scale) * chars as u32 - font.character_spacing * scale
}
