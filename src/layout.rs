//! Screen geometry shared by the compositor and the interaction router.
//!
//! # Window Layout
//!
//! ```text
//! +------------------------------------------------+
//! | border (BDR_S, status color)                   |
//! |  +------------------------------------------+  |
//! |  | [map] [dual cam] [ HUD view            ] |  |
//! |  |   extra views inserted on the left,      |  |
//! |  |   order reversed unless map is on left   |  |
//! |  +------------------------------------------+  |
//! +------------------------------------------------+
//! ```
//!
//! The alert banner spans the whole inner rectangle, on top of every view.
//!
//! # Anchors
//!
//! All anchor functions take the HUD view size and return view-local points.
//! Widgets draw at these points; the interaction router translates them into
//! window coordinates for hit-testing, so drawing and hit regions can never
//! drift apart.

use crate::config::{BDR_S, BTN_SIZE, FOOTER_H};
use crate::scene::{PointF, RectF};

/// Environment toggle for the extra road-camera view.
pub const DUAL_CAMERA_VIEW_ENV: &str = "DUAL_CAMERA_VIEW";

/// Environment toggle for the map-render view.
pub const MAP_RENDER_VIEW_ENV: &str = "MAP_RENDER_VIEW";

// =============================================================================
// Surface Options
// =============================================================================

/// Extra camera views, fixed at construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceOptions {
    pub dual_camera_view: bool,
    pub map_render_view: bool,
}

impl SurfaceOptions {
    /// Presence of each environment variable enables its view.
    pub fn from_env() -> Self {
        Self {
            dual_camera_view: std::env::var_os(DUAL_CAMERA_VIEW_ENV).is_some(),
            map_render_view: std::env::var_os(MAP_RENDER_VIEW_ENV).is_some(),
        }
    }
}

/// What fills one slot of the split layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewKind {
    Hud,
    DualCamera,
    MapRender,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewLayout {
    /// Area inside the status border.
    pub inner: RectF,
    /// Slots from left to right.
    pub views: Vec<(ViewKind, RectF)>,
}

impl ViewLayout {
    /// Split the window into the border, the HUD view and any extra views.
    pub fn split(width: u32, height: u32, options: SurfaceOptions, map_on_left: bool) -> Self {
        let bdr = BDR_S as f32;
        let inner = RectF::new(bdr, bdr, (width as f32 - 2.0 * bdr).max(0.0), (height as f32 - 2.0 * bdr).max(0.0));

        // Insertion order: each extra view goes in front of the list.
        let mut kinds = vec![ViewKind::Hud];
        if options.dual_camera_view {
            kinds.insert(0, ViewKind::DualCamera);
        }
        if options.map_render_view {
            kinds.insert(0, ViewKind::MapRender);
        }
        if !map_on_left {
            kinds.reverse();
        }

        let slot_w = inner.w / kinds.len() as f32;
        let views = kinds
            .into_iter()
            .enumerate()
            .map(|(i, kind)| (kind, RectF::new(inner.x + slot_w * i as f32, inner.y, slot_w, inner.h)))
            .collect();
        Self { inner, views }
    }

    /// The HUD view rectangle in window coordinates.
    pub fn hud(&self) -> RectF {
        self.views.iter().find(|(k, _)| *k == ViewKind::Hud).map_or(self.inner, |(_, r)| *r)
    }
}

// =============================================================================
// Widget Anchors
// =============================================================================

const HALF_BTN: f32 = BTN_SIZE as f32 / 2.0;

/// Horizontal offset of the personality button from its edge, by mute state.
const fn personality_x_offset(mute_dm: bool) -> f32 {
    if mute_dm { 50.0 } else { 250.0 }
}

/// Center of the personality button. Mirrors for right-hand drive and slides
/// toward the edge when the driver icon is muted.
pub fn personality_center(width: f32, height: f32, rhd: bool, mute_dm: bool) -> PointF {
    let inset = (BTN_SIZE - 24) as f32 / 2.0 + (BDR_S * 2) as f32 + personality_x_offset(mute_dm);
    let x = if rhd { width - inset } else { inset };
    PointF::new(x, height - FOOTER_H as f32 / 2.0)
}

/// Center of the driver-state icon.
pub fn driver_icon_center(width: f32, height: f32, rhd: bool) -> PointF {
    let offset = BDR_S as f32 + HALF_BTN;
    PointF::new(if rhd { width - offset } else { offset }, height - offset)
}

/// Center of the compass, on the side opposite the driver icon.
pub fn compass_center(width: f32, height: f32, rhd: bool) -> PointF {
    let inset = HALF_BTN + (BDR_S * 2) as f32 + 10.0;
    let x = if rhd { inset } else { width - inset };
    PointF::new(x, height - 20.0 - FOOTER_H as f32 / 2.0)
}

/// Center of the static engage button, top-right inside the view margin.
pub fn engage_center(width: f32) -> PointF {
    PointF::new(width - BDR_S as f32 - HALF_BTN, BDR_S as f32 + HALF_BTN)
}

/// Center of the rotating wheel.
pub fn rotating_wheel_center(width: f32) -> PointF {
    PointF::new(width - HALF_BTN - (BDR_S * 2) as f32 + 25.0, HALF_BTN + BDR_S as f32 * 1.5 - 20.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_without_extra_views() {
        let layout = ViewLayout::split(2160, 1080, SurfaceOptions::default(), false);
        assert_eq!(layout.views.len(), 1);
        assert_eq!(layout.hud(), RectF::new(30.0, 30.0, 2100.0, 1020.0));
    }

    #[test]
    fn test_split_order_follows_map_side() {
        let opts = SurfaceOptions { dual_camera_view: true, map_render_view: true };
        let left = ViewLayout::split(930, 300, opts, true);
        let kinds: Vec<_> = left.views.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![ViewKind::MapRender, ViewKind::DualCamera, ViewKind::Hud]);

        let right = ViewLayout::split(930, 300, opts, false);
        let kinds: Vec<_> = right.views.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![ViewKind::Hud, ViewKind::DualCamera, ViewKind::MapRender]);
        assert!((right.hud().x - 30.0).abs() < f32::EPSILON, "HUD leftmost when map is on the right");
        assert!((right.hud().w - 290.0).abs() < 1e-3, "Equal thirds");
    }

    #[test]
    fn test_personality_center_mirrors() {
        let lhd = personality_center(2100.0, 1020.0, false, false);
        let rhd = personality_center(2100.0, 1020.0, true, false);
        assert!((lhd.x - 394.0).abs() < f32::EPSILON);
        assert!((rhd.x - (2100.0 - 394.0)).abs() < f32::EPSILON);
        assert!((lhd.y - 880.0).abs() < f32::EPSILON);
        let muted = personality_center(2100.0, 1020.0, false, true);
        assert!((muted.x - 194.0).abs() < f32::EPSILON, "Muted icon frees the corner");
    }

    #[test]
    fn test_compass_opposite_driver_icon() {
        let dm = driver_icon_center(2100.0, 1020.0, false);
        let compass = compass_center(2100.0, 1020.0, false);
        assert!(dm.x < 1050.0 && compass.x > 1050.0);
    }
}
