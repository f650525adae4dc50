//! Lead-vehicle chevron.
//!
//! A yellow glow triangle with a colored chevron on top, anchored at the
//! projected lead position. Size shrinks with distance; the chevron fill
//! fades in as the lead gets close and more so while closing in.

use crate::colors::{FROG_GREEN, LEAD_GLOW, LEAD_RED, Rgba};
use crate::scene::{Layer, Paint, PointF, Scene};
use crate::state::LeadMarker;

use super::primitives::fill_polygon;

/// Triangles for one lead, in view pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Chevron {
    pub glow: [PointF; 3],
    pub body: [PointF; 3],
    pub fill: Rgba,
}

/// Fill alpha from distance and closing speed, 0..=255.
pub fn chevron_alpha(d_rel: f32, v_rel: f32, colored: bool) -> u8 {
    let speed_buff = if colored { 25.0 } else { 10.0 };
    let lead_buff = if colored { 100.0 } else { 40.0 };

    if d_rel >= lead_buff {
        return 0;
    }
    let mut alpha = 255.0 * (1.0 - d_rel / lead_buff);
    if v_rel < 0.0 {
        alpha += 255.0 * (-v_rel / speed_buff);
    }
    alpha.clamp(0.0, 255.0) as u8
}

pub fn chevron(lead: &LeadMarker, colored: bool, width: f32, height: f32) -> Chevron {
    let sz = ((25.0 * 30.0) / (lead.d_rel / 3.0 + 30.0)).clamp(15.0, 30.0) * 2.35;
    let x = lead.anchor.x.clamp(0.0, (width - sz / 2.0).max(0.0));
    let y = lead.anchor.y.min(height - sz * 0.6);

    let g_xo = sz / 5.0;
    let g_yo = sz / 10.0;
    let glow = [
        PointF::new(x + sz * 1.35 + g_xo, y + sz + g_yo),
        PointF::new(x, y - g_yo),
        PointF::new(x - sz * 1.35 - g_xo, y + sz + g_yo),
    ];
    let body = [PointF::new(x + sz * 1.25, y + sz), PointF::new(x, y), PointF::new(x - sz * 1.25, y + sz)];

    let base = if colored { FROG_GREEN } else { LEAD_RED };
    Chevron { glow, body, fill: base.with_alpha(chevron_alpha(lead.d_rel, lead.v_rel, colored)) }
}

pub fn draw_lead(scene: &mut Scene, lead: &LeadMarker, colored: bool, width: f32, height: f32) {
    let c = chevron(lead, colored, width, height);
    fill_polygon(scene, Layer::Leads, &c.glow, Paint::Solid(LEAD_GLOW));
    fill_polygon(scene, Layer::Leads, &c.body, Paint::Solid(c.fill));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(d_rel: f32, v_rel: f32) -> LeadMarker {
        LeadMarker { d_rel, v_rel, anchor: PointF::new(500.0, 400.0) }
    }

    #[test]
    fn test_far_lead_transparent() {
        assert_eq!(chevron_alpha(50.0, -5.0, false), 0);
    }

    #[test]
    fn test_alpha_grows_when_closing() {
        let steady = chevron_alpha(20.0, 0.0, false);
        let closing = chevron_alpha(20.0, -3.0, false);
        assert!(closing > steady, "Approaching lead is more opaque");
        assert_eq!(chevron_alpha(1.0, -20.0, false), 255, "Clamped");
    }

    #[test]
    fn test_size_clamped() {
        let touching = chevron(&lead(0.0, 0.0), false, 2000.0, 1000.0);
        let behind = chevron(&lead(-30.0, 0.0), false, 2000.0, 1000.0);
        let far = chevron(&lead(1000.0, 0.0), false, 2000.0, 1000.0);
        let width = |c: &Chevron| c.body[0].x - c.body[2].x;
        assert!((width(&touching) - 25.0 * 2.35 * 2.5).abs() < 1e-3, "750 / 30 at zero distance");
        assert!((width(&behind) - 30.0 * 2.35 * 2.5).abs() < 1e-3, "Upper clamp");
        assert!((width(&far) - 15.0 * 2.35 * 2.5).abs() < 1e-3, "Lower clamp");
    }

    #[test]
    fn test_anchor_kept_on_screen() {
        let mut l = lead(10.0, 0.0);
        l.anchor = PointF::new(5000.0, 5000.0);
        let c = chevron(&l, false, 2000.0, 1000.0);
        assert!(c.body[1].x < 2000.0);
        assert!(c.body[1].y < 1000.0, "Apex lifted above the bottom edge");
    }
}
