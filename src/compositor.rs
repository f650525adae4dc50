//! Layout compositor.
//!
//! Builds the [`Scene`] for one frame from the display snapshot, the
//! animation values and the current alert. The draw order is fixed:
//!
//! | # | Layer | Gate |
//! |---|-------|------|
//! | 1 | border fill | always |
//! | 2 | camera views | always (black without a frame) |
//! | 3 | road, leads | world objects visible |
//! | 4 | driver state | head pose present |
//! | 5 | header, set speed, limit sign, speed | always |
//! | 6 | engage button | engageable, rotating wheel off |
//! | 7 | personality badge | button enabled, no signal sweep |
//! | 8 | compass | compass on, no signal sweep |
//! | 9 | turn signals | signal sweep |
//! | 10 | rotating wheel | rotating wheel on |
//! | 11 | status bar | status bar on |
//! | 12 | alert banner | alert visible |
//!
//! Widgets 3–11 draw in HUD-view coordinates; the alert spans the whole
//! area inside the border, over any extra camera views.

use std::sync::Arc;

use crate::alerts::Alert;
use crate::animations::BadgeOpacity;
use crate::camera::CameraFrame;
use crate::colors::Rgba;
use crate::layout::{SurfaceOptions, ViewKind, ViewLayout};
use crate::scene::{DrawOp, Layer, Paint, PointF, RectF, Scene};
use crate::state::DisplayState;
use crate::widgets;

/// Everything one frame is composed from.
#[derive(Clone, Debug)]
pub struct FrameInputs<'a> {
    pub ds: &'a DisplayState,
    pub alert: &'a Alert,
    pub signal_index: usize,
    pub badge: BadgeOpacity,
    /// Current border color; painted opaque.
    pub border: Rgba,
    pub road_frame: Option<Arc<CameraFrame>>,
    /// Frame for the dual-camera view, when shown.
    pub wide_frame: Option<Arc<CameraFrame>>,
    pub map_on_left: bool,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Compositor {
    options: SurfaceOptions,
}

impl Compositor {
    /// `options` are fixed for the compositor's lifetime.
    pub const fn new(options: SurfaceOptions) -> Self {
        Self { options }
    }

    #[inline]
    pub const fn options(&self) -> SurfaceOptions {
        self.options
    }

    pub fn layout(&self, width: u32, height: u32, map_on_left: bool) -> ViewLayout {
        ViewLayout::split(width, height, self.options, map_on_left)
    }

    pub fn compose(&self, width: u32, height: u32, inputs: &FrameInputs<'_>) -> Scene {
        let mut scene = Scene::new(width, height);
        let layout = self.layout(width, height, inputs.map_on_left);

        scene.push(Layer::Border, DrawOp::Fill {
            rect: RectF::new(0.0, 0.0, width as f32, height as f32),
            paint: Paint::Solid(inputs.border.with_alpha(0xff)),
        });

        for (kind, rect) in &layout.views {
            let (layer, frame) = match kind {
                ViewKind::Hud => (Layer::Camera, inputs.road_frame.clone()),
                ViewKind::DualCamera => (Layer::ExtraView, inputs.wide_frame.clone()),
                ViewKind::MapRender => (Layer::ExtraView, None),
            };
            scene.push(layer, DrawOp::Camera { rect: *rect, frame });
        }

        let hud = layout.hud();
        scene.set_origin(PointF::new(hud.x, hud.y));
        Self::draw_hud(&mut scene, inputs, hud.w, hud.h);

        scene.set_origin(PointF::new(layout.inner.x, layout.inner.y));
        widgets::draw_alert(&mut scene, inputs.alert, layout.inner.w, layout.inner.h);
        scene.set_origin(PointF::default());
        scene
    }

    fn draw_hud(scene: &mut Scene, inputs: &FrameInputs<'_>, w: f32, h: f32) {
        let ds = inputs.ds;
        let animating = ds.signal_animating();

        if let Some(world) = &ds.world {
            widgets::draw_road(scene, ds, world, h);
            for lead in &world.leads {
                widgets::draw_lead(scene, lead, ds.flags.colored_path, w, h);
            }
        }
        if let Some(pose) = &ds.driver {
            widgets::draw_driver_state(scene, ds, pose, w, h);
        }

        widgets::draw_header_gradient(scene, w);
        let bx = widgets::draw_set_speed(scene, ds);
        widgets::draw_speed_limit(scene, ds, &bx);
        widgets::draw_current_speed(scene, ds, w);

        widgets::draw_engage_button(scene, ds, w);
        if ds.flags.personality_button && !animating {
            widgets::draw_personality(scene, ds.personality, inputs.badge, ds.rhd, ds.flags.mute_dm, w, h);
        }
        if ds.flags.compass && !animating {
            widgets::draw_compass(scene, ds.bearing_deg, ds.rhd, w, h);
        }
        if animating {
            widgets::draw_signals(scene, ds, inputs.signal_index, w, h);
        }
        if ds.flags.rotating_wheel {
            widgets::draw_rotating_wheel(scene, ds, w);
        }
        if ds.flags.status_bar {
            widgets::draw_status_bar(scene, w, h);
        }
    }
}
