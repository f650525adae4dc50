//! Color model for the HUD.
//!
//! The HUD composites translucent layers over a camera image, so every color
//! carries an alpha channel. [`Rgba`] is the working type; it is flattened to
//! `Rgb888` only when a pixel is blended into the frame buffer.
//!
//! Besides the palette this module holds the two numeric helpers used by the
//! color ramps: [`interp_color`] (piecewise-linear interpolation across color
//! stops, clamped at both ends) and [`map_val`] (clamped linear remap).

use embedded_graphics::pixelcolor::Rgb888;

// =============================================================================
// Rgba
// =============================================================================

/// 8-bit RGBA color.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0xff)
    }

    /// Same color with a different alpha.
    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Build from float components in `[0, 1]`.
    pub fn from_rgb_f(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self::new(unit_to_u8(r), unit_to_u8(g), unit_to_u8(b), unit_to_u8(a))
    }

    /// Build from HSL float components in `[0, 1]` (hue as a fraction of a turn).
    pub fn from_hsl_f(h: f32, s: f32, l: f32, a: f32) -> Self {
        let (r, g, b) = hsl_to_rgb(h, s, l);
        Self::from_rgb_f(r, g, b, a)
    }

    /// Alpha as a `[0, 1]` float.
    #[inline]
    pub fn alpha_f(self) -> f32 {
        f32::from(self.a) / 255.0
    }

    /// Multiply alpha by `factor` (clamped to `[0, 1]`).
    #[inline]
    pub fn scale_alpha(self, factor: f32) -> Self {
        self.with_alpha(unit_to_u8(self.alpha_f() * factor.clamp(0.0, 1.0)))
    }

    #[inline]
    pub const fn to_rgb888(self) -> Rgb888 {
        Rgb888::new(self.r, self.g, self.b)
    }

    #[inline]
    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }
}

/// White with the given alpha.
#[inline]
pub const fn white(a: u8) -> Rgba {
    Rgba::new(0xff, 0xff, 0xff, a)
}

/// Black with the given alpha.
#[inline]
pub const fn black(a: u8) -> Rgba {
    Rgba::new(0, 0, 0, a)
}

#[inline]
fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    if s == 0.0 {
        return (l, l, l);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    let channel = |t: f32| {
        let t = t.rem_euclid(1.0);
        if 6.0 * t < 1.0 {
            (q - p).mul_add(6.0 * t, p)
        } else if 2.0 * t < 1.0 {
            q
        } else if 3.0 * t < 2.0 {
            (q - p).mul_add((2.0 / 3.0 - t) * 6.0, p)
        } else {
            p
        }
    };

    (channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
}

// =============================================================================
// Palette
// =============================================================================

pub const WHITE: Rgba = white(0xff);
pub const BLACK: Rgba = black(0xff);
pub const TRANSPARENT: Rgba = black(0);

/// Pure red used for EU sign rings.
pub const RED: Rgba = Rgba::rgb(0xff, 0, 0);

/// Accent green used for lanes, edges and leads in colored-path mode.
pub const FROG_GREEN: Rgba = Rgba::new(23, 134, 68, 242);

/// Lead chevron fill in the default theme.
pub const LEAD_RED: Rgba = Rgba::rgb(201, 34, 49);

/// Lead chevron glow.
pub const LEAD_GLOW: Rgba = Rgba::rgb(218, 202, 37);

/// Rotating wheel background for a custom wheel in experimental mode.
pub const WHEEL_EXPERIMENTAL_BG: Rgba = Rgba::new(218, 111, 37, 241);

// Status border colors
pub const STATUS_DISENGAGED: Rgba = Rgba::new(0x17, 0x33, 0x49, 0xc8);
pub const STATUS_OVERRIDE: Rgba = Rgba::new(0x91, 0x9b, 0x95, 0xf1);
pub const STATUS_ENGAGED: Rgba = Rgba::new(0x17, 0x86, 0x44, 0xf1);

// Alert backgrounds
pub const ALERT_NORMAL: Rgba = Rgba::new(0x15, 0x15, 0x15, 0xf1);
pub const ALERT_USER_PROMPT: Rgba = Rgba::new(0xda, 0x6f, 0x25, 0xf1);
pub const ALERT_CRITICAL: Rgba = Rgba::new(0xc9, 0x22, 0x31, 0xf1);

// Set-speed label ramps
pub const MAX_DEFAULT: Rgba = Rgba::rgb(0x80, 0xd8, 0xa6);
pub const MAX_OVERRIDE: Rgba = Rgba::rgb(0x91, 0x9b, 0x95);
pub const MAX_ORANGE: Rgba = Rgba::rgb(0xff, 0xe4, 0xbf);
pub const MAX_RED: Rgba = Rgba::rgb(0xff, 0xbf, 0xbf);
pub const MAX_INACTIVE: Rgba = Rgba::rgb(0xa6, 0xa6, 0xa6);
pub const SET_SPEED_ORANGE: Rgba = Rgba::rgb(0xff, 0x95, 0x00);
pub const SET_SPEED_RED: Rgba = Rgba::rgb(0xff, 0x00, 0x00);
pub const SET_SPEED_INACTIVE: Rgba = Rgba::rgb(0x72, 0x72, 0x72);

// =============================================================================
// Interpolation Helpers
// =============================================================================

/// Piecewise-linear interpolation across color stops.
///
/// `xs` must be ascending and the same length as `colors`. Values at or below
/// the first stop return the first color; values past the last stop return
/// the last color.
pub fn interp_color(x: f32, xs: &[f32], colors: &[Rgba]) -> Rgba {
    debug_assert_eq!(xs.len(), colors.len());
    let n = xs.len().min(colors.len());
    if n == 0 {
        return TRANSPARENT;
    }

    let hi = xs[..n].iter().position(|&stop| x <= stop).unwrap_or(n);
    if hi == 0 {
        return colors[0];
    }
    if hi == n {
        return colors[n - 1];
    }

    let lo = hi - 1;
    let t = (x - xs[lo]) / (xs[hi] - xs[lo]);
    lerp_rgba(colors[lo], colors[hi], t)
}

/// Component-wise linear blend of two colors, `t` clamped to `[0, 1]`.
pub fn lerp_rgba(from: Rgba, to: Rgba, t: f32) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (f32::from(b) - f32::from(a)).mul_add(t, f32::from(a)).round() as u8;
    Rgba::new(mix(from.r, to.r), mix(from.g, to.g), mix(from.b, to.b), mix(from.a, to.a))
}

/// Clamp `x` into `[x0, x1]` and map it linearly onto `[y0, y1]`.
pub fn map_val(x: f32, x0: f32, x1: f32, y0: f32, y1: f32) -> f32 {
    let x = x.clamp(x0.min(x1), x0.max(x1));
    let ra = x1 - x0;
    if ra == 0.0 {
        return y0;
    }
    (x - x0) * (y1 - y0) / ra + y0
}

// =============================================================================
// Unit Tests
// =============================================================================
