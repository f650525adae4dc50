//! The onroad surface.
//!
//! [`OnroadHud`] owns every piece of per-surface state and is driven from
//! one thread by three kinds of calls:
//!
//! | Call | When | Effect |
//! |------|------|--------|
//! | [`apply`](OnroadHud::apply) | a topic message arrives | stored on the current bus frame |
//! | [`update_state`](OnroadHud::update_state) | bus frame boundary | new [`DisplayState`], alert, border target, stream choice |
//! | [`tick`](OnroadHud::tick) | animation deadline passed | signal index advances, repaint requested |
//! | [`paint`](OnroadHud::paint) | repaint requested | one [`Scene`], frame timing published |
//!
//! Pointer presses go through [`mouse_press`](OnroadHud::mouse_press).

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::alerts::{Alert, AlertPresenter};
use crate::animations::{AnimationClock, AnimationState};
use crate::assets::AssetCatalog;
use crate::camera::{FrameGate, FrameSlot, StreamInputs, StreamKind, StreamSelector};
use crate::compositor::{Compositor, FrameInputs};
use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::interaction::{InteractionRouter, ParentSurface, PressOutcome};
use crate::layout::SurfaceOptions;
use crate::params::{HudSettings, ParamStore};
use crate::profiling::{DebugLog, DebugSink, FrameMonitor, NullSink, UiDebug};
use crate::render::{FrameBuffer, Rasterizer};
use crate::scene::{PointF, Scene};
use crate::state::{DisplayState, StateSync};
use crate::topics::{TopicMessage, Topics};

/// Construction-time options.
#[derive(Clone, Debug)]
pub struct HudConfig {
    pub width: u32,
    pub height: u32,
    pub options: SurfaceOptions,
    /// Hand unconsumed presses to the parent surface.
    pub forward_unhandled: bool,
    /// Streams the camera source can deliver.
    pub streams: Vec<StreamKind>,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            options: SurfaceOptions::default(),
            forward_unhandled: true,
            streams: vec![StreamKind::Road, StreamKind::WideRoad, StreamKind::Driver],
        }
    }
}

pub struct OnroadHud {
    width: u32,
    height: u32,
    has_wide: bool,
    single_stream: bool,

    store: Arc<dyn ParamStore>,
    assets: AssetCatalog,
    topics: Topics,
    sync: StateSync,
    settings: HudSettings,
    ds: DisplayState,

    animations: AnimationState,
    clock: AnimationClock,
    alerts: AlertPresenter,
    router: InteractionRouter,
    compositor: Compositor,

    road_frames: FrameSlot,
    extra_frames: FrameSlot,
    gate: FrameGate,
    selector: StreamSelector,

    monitor: FrameMonitor,
    sink: Box<dyn DebugSink>,
    log: DebugLog,
    repaint: bool,
}

impl OnroadHud {
    pub fn new(config: HudConfig, store: Arc<dyn ParamStore>, assets: AssetCatalog, now: Instant) -> Self {
        let settings = HudSettings::load(store.as_ref());
        info!(
            width = config.width,
            height = config.height,
            dual_camera = config.options.dual_camera_view,
            map_render = config.options.map_render_view,
            assets = assets.len(),
            "onroad surface created"
        );
        Self {
            width: config.width,
            height: config.height,
            has_wide: config.streams.contains(&StreamKind::WideRoad),
            single_stream: config.streams.iter().filter(|s| **s != StreamKind::Driver).count() <= 1,
            store,
            assets,
            topics: Topics::new(),
            sync: StateSync::new(),
            settings,
            ds: DisplayState::default(),
            animations: AnimationState::new(),
            clock: AnimationClock::new(now),
            alerts: AlertPresenter::new(),
            router: InteractionRouter::new(config.forward_unhandled),
            compositor: Compositor::new(config.options),
            road_frames: FrameSlot::new(),
            extra_frames: FrameSlot::new(),
            gate: FrameGate::new(),
            selector: StreamSelector::new(),
            monitor: FrameMonitor::new(),
            sink: Box::new(NullSink),
            log: DebugLog::new(),
            repaint: true,
        }
    }

    /// Publish frame timings to `sink`.
    pub fn with_debug_sink(mut self, sink: Box<dyn DebugSink>) -> Self {
        self.sink = sink;
        self
    }

    // -------------------------------------------------------------------------
    // Inputs
    // -------------------------------------------------------------------------

    pub fn apply(&mut self, msg: TopicMessage) {
        self.topics.apply(msg);
    }

    /// Close the current bus frame: rebuild the display state from the
    /// topics and settings, then open the next bus frame.
    pub fn update_state(&mut self, now: Instant) {
        self.settings = HudSettings::load(self.store.as_ref());

        let dm_active = self.topics.driver_monitoring.value().is_active_mode;
        let dm_fade = self.animations.dm_fade.step(dm_active);
        self.ds = self.sync.sync(&self.topics, &self.settings, dm_fade);

        if self.animations.personality.observe(self.ds.personality, now) {
            self.log_event(&format!("Personality: {}", self.ds.personality.label()));
        }
        self.animations.border.set_target(self.ds.status.color());

        if self.sync.started() {
            let alert = Alert::from_topics(&self.topics, self.sync.started_frame());
            self.show_alert(alert);
        }
        self.router.update_layout(&self.ds);
        self.select_stream();

        self.topics.advance_frame();
        self.repaint = true;
    }

    /// Onroad/offroad transition. Going offroad clears the alert.
    pub fn set_onroad(&mut self, onroad: bool) {
        let frame = self.topics.frame();
        if onroad != self.sync.started() {
            info!(onroad, frame, "drive state changed");
        }
        self.sync.set_started(onroad, frame);
        if !onroad && self.alerts.clear() {
            self.log_event("Alert cleared");
            self.repaint = true;
        }
    }

    /// Consume any due animation ticks. Returns `true` if one fired.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut fired = false;
        while self.clock.poll(now) {
            self.animations.signal.tick();
            fired = true;
        }
        if fired {
            self.repaint = true;
        }
        fired
    }

    /// Route a press at `pos` (window coordinates).
    pub fn mouse_press(&mut self, pos: PointF, now: Instant, parent: Option<&mut dyn ParentSurface>) -> PressOutcome {
        let hud = self.compositor.layout(self.width, self.height, self.settings.map_on_left).hud();
        let outcome = self.router.on_press(pos, hud, self.store.as_ref(), parent);
        if let PressOutcome::PersonalityChanged(p) = outcome {
            // The snapshot picks the new value up from the store on the next update.
            self.animations.personality.observe(p, now);
            self.log_event(&format!("Personality: {}", p.label()));
            self.repaint = true;
        }
        outcome
    }

    fn show_alert(&mut self, alert: Alert) {
        let text = alert.text1.clone();
        if self.alerts.update(alert) {
            self.log_event(&format!("Alert: {text}"));
            self.repaint = true;
        }
    }

    fn select_stream(&mut self) {
        let inputs = StreamInputs {
            v_ego: self.topics.car_state.value().v_ego,
            experimental_mode: self.ds.experimental_mode,
            wide_calibration_valid: self.topics.live_calibration.value().wide_valid,
            has_wide: self.has_wide,
            single_stream: self.single_stream,
            wide_disabled: self.settings.wide_camera_disabled,
        };
        let stream = self.selector.select(inputs);
        if self.road_frames.request_stream(stream) {
            debug!(?stream, "camera stream switched");
        }
    }

    fn log_event(&mut self, msg: &str) {
        debug!(event = msg, "hud event");
        self.log.push(msg);
    }

    // -------------------------------------------------------------------------
    // Paint
    // -------------------------------------------------------------------------

    /// Compose one frame, or `None` while waiting for the first camera frames.
    pub fn paint(&mut self, now: Instant) -> Option<Scene> {
        let road_frame = self.road_frames.take();
        if !self.gate.admit(road_frame.is_some()) {
            debug!(remaining = self.gate.remaining(), "no camera frame, paint skipped");
            return None;
        }
        let started = Instant::now();
        self.animations.border.update();

        let inputs = FrameInputs {
            ds: &self.ds,
            alert: self.alerts.current(),
            signal_index: self.animations.signal.index(),
            badge: self.animations.personality.opacity(now),
            border: self.animations.border.current(),
            road_frame,
            wide_frame: self.extra_frames.take(),
            map_on_left: self.settings.map_on_left,
        };
        let scene = self.compositor.compose(self.width, self.height, &inputs);

        let draw_time = started.elapsed();
        if self.monitor.record(now, draw_time) {
            self.log.push("Slow frame");
        }
        self.sink.publish(UiDebug::from_duration(draw_time));
        self.repaint = self.animations.border.is_transitioning();
        Some(scene)
    }

    /// Rasterize `scene` with the surface's assets.
    pub fn rasterize(&self, scene: &Scene) -> FrameBuffer {
        Rasterizer::new(&self.assets).render_new(scene)
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[inline]
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub const fn needs_repaint(&self) -> bool {
        self.repaint
    }

    /// Next animation deadline.
    #[inline]
    pub const fn deadline(&self) -> Instant {
        self.clock.deadline()
    }

    #[inline]
    pub const fn display_state(&self) -> &DisplayState {
        &self.ds
    }

    #[inline]
    pub const fn alert(&self) -> &Alert {
        self.alerts.current()
    }

    #[inline]
    pub const fn topics(&self) -> &Topics {
        &self.topics
    }

    #[inline]
    pub const fn animations(&self) -> &AnimationState {
        &self.animations
    }

    #[inline]
    pub const fn monitor(&self) -> &FrameMonitor {
        &self.monitor
    }

    #[inline]
    pub const fn debug_log(&self) -> &DebugLog {
        &self.log
    }

    /// Slot the road-camera worker pushes into.
    pub fn road_frames(&self) -> FrameSlot {
        self.road_frames.clone()
    }

    /// Slot feeding the dual-camera view.
    pub fn extra_frames(&self) -> FrameSlot {
        self.extra_frames.clone()
    }

    pub fn requested_stream(&self) -> StreamKind {
        self.road_frames.requested_stream()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraFrame;
    use crate::config::{ANIMATION_PERIOD, CAMERA_SKIP_BUDGET, SIGNAL_TOTAL_FRAMES};
    use crate::params::{MemoryParams, keys};
    use crate::personality::Personality;
    use crate::scene::Layer;
    use crate::topics::{AlertSize, AlertStatus, CarParams, CarState, ControlsState, LiveCalibration};
    use embedded_graphics::pixelcolor::Rgb888;
    use std::time::Duration;

    fn hud_with(store: Arc<MemoryParams>, now: Instant) -> OnroadHud {
        let config = HudConfig { width: 640, height: 320, ..HudConfig::default() };
        let hud = OnroadHud::new(config, store, AssetCatalog::empty(), now);
        hud.road_frames().push(CameraFrame::solid(StreamKind::Road, 1, 4, 2, Rgb888::new(40, 40, 40)));
        hud
    }

    fn hud(now: Instant) -> OnroadHud {
        hud_with(Arc::new(MemoryParams::new()), now)
    }

    fn controls(enabled: bool) -> TopicMessage {
        TopicMessage::ControlsState(ControlsState { enabled, engageable: true, v_cruise: 50.0, ..ControlsState::default() })
    }

    // -------------------------------------------------------------------------
    // State Updates
    // -------------------------------------------------------------------------

    #[test]
    fn test_update_state_builds_snapshot_and_advances_frame() {
        let now = Instant::now();
        let mut hud = hud(now);
        hud.set_onroad(true);
        hud.apply(controls(true));
        hud.apply(TopicMessage::CarState(CarState { v_ego: 10.0, ..CarState::default() }));
        hud.update_state(now);
        assert!(hud.display_state().engaged);
        assert!(hud.display_state().cruise_set);
        assert_eq!(hud.topics().frame(), 1, "Bus frame advances on each update");
        assert!(hud.needs_repaint());
    }

    #[test]
    fn test_alert_shown_only_when_started() {
        let now = Instant::now();
        let mut hud = hud(now);
        hud.apply(TopicMessage::ControlsState(ControlsState {
            alert_text1: "Steer Assist".into(),
            alert_size: AlertSize::Small,
            alert_status: AlertStatus::Normal,
            ..ControlsState::default()
        }));
        hud.update_state(now);
        assert!(!hud.alert().is_visible(), "Offroad surface shows no alert");

        hud.set_onroad(true);
        hud.apply(TopicMessage::ControlsState(ControlsState {
            alert_text1: "Steer Assist".into(),
            alert_size: AlertSize::Small,
            ..ControlsState::default()
        }));
        hud.update_state(now);
        assert_eq!(hud.alert().text1, "Steer Assist");

        hud.set_onroad(false);
        assert!(!hud.alert().is_visible(), "Going offroad clears the alert");
    }

    #[test]
    fn test_personality_change_restarts_badge() {
        let now = Instant::now();
        let store = Arc::new(MemoryParams::new());
        let mut hud = hud_with(Arc::clone(&store), now);
        hud.update_state(now);
        let later = now + Duration::from_secs(10);
        assert!((hud.animations().personality.opacity(later).icon - 1.0).abs() < f32::EPSILON);

        store.put_int(keys::LONGITUDINAL_PERSONALITY, Personality::Relaxed.index()).expect("writable");
        hud.update_state(later);
        assert_eq!(hud.display_state().personality, Personality::Relaxed);
        let badge = hud.animations().personality.opacity(later);
        assert!((badge.text - 1.0).abs() < f32::EPSILON, "Name shown right after the change");
    }

    #[test]
    fn test_stream_switches_to_wide_in_experimental_at_low_speed() {
        let now = Instant::now();
        let mut hud = hud(now);
        hud.set_onroad(true);
        hud.apply(TopicMessage::ControlsState(ControlsState { experimental_mode: true, ..ControlsState::default() }));
        hud.apply(TopicMessage::LiveCalibration(LiveCalibration { valid: true, wide_valid: true }));
        hud.apply(TopicMessage::CarState(CarState { v_ego: 3.0, ..CarState::default() }));
        hud.update_state(now);
        assert_eq!(hud.requested_stream(), StreamKind::WideRoad);
    }

    // -------------------------------------------------------------------------
    // Ticks and Paint
    // -------------------------------------------------------------------------

    #[test]
    fn test_tick_advances_signal_once_per_period() {
        let now = Instant::now();
        let mut hud = hud(now);
        assert!(!hud.tick(now), "Not due yet");
        for i in 1..=SIGNAL_TOTAL_FRAMES + 1 {
            assert!(hud.tick(now + ANIMATION_PERIOD * i as u32));
            assert_eq!(hud.animations().signal.index(), i % SIGNAL_TOTAL_FRAMES);
        }
    }

    #[test]
    fn test_paint_produces_scene_and_clears_repaint() {
        let now = Instant::now();
        let mut hud = hud(now);
        hud.update_state(now);
        let scene = hud.paint(now).expect("camera frame available");
        assert_eq!((scene.width(), scene.height()), (640, 320));
        assert!(scene.has_layer(Layer::Camera));
        assert_eq!(hud.monitor().total_frames, 1);
    }

    #[test]
    fn test_paint_skips_without_frames_then_resumes() {
        let now = Instant::now();
        let mut hud = OnroadHud::new(
            HudConfig { width: 320, height: 160, ..HudConfig::default() },
            Arc::new(MemoryParams::new()),
            AssetCatalog::empty(),
            now,
        );
        for _ in 0..CAMERA_SKIP_BUDGET {
            assert!(hud.paint(now).is_none(), "Waiting for a camera frame");
        }
        assert!(hud.paint(now).is_some(), "Paints black once the budget is spent");
    }

    #[test]
    fn test_held_frame_paints_every_cycle() {
        let now = Instant::now();
        let mut hud = hud(now);
        hud.update_state(now);
        assert!(hud.paint(now).is_some(), "First paint with the pushed frame");

        // Camera slower than the UI: no new frame, but the old one is still held.
        let later = now + ANIMATION_PERIOD;
        assert!(hud.tick(later));
        for i in 0..(CAMERA_SKIP_BUDGET + 2) {
            assert!(hud.paint(later).is_some(), "Repaint {i} uses the held frame");
        }
    }

    #[test]
    fn test_debug_topic_published_per_paint() {
        let now = Instant::now();
        let (tx, rx) = crossbeam_channel::bounded(4);
        let mut hud = hud(now).with_debug_sink(Box::new(tx));
        hud.paint(now);
        assert!(rx.try_recv().is_ok(), "One timing message per painted frame");
    }

    // -------------------------------------------------------------------------
    // Presses
    // -------------------------------------------------------------------------

    #[test]
    fn test_press_on_button_cycles_and_stores() {
        let now = Instant::now();
        let store = Arc::new(MemoryParams::new());
        store.set_bool(keys::PERSONALITIES_UI_WHEEL, true);
        let mut hud = hud_with(Arc::clone(&store), now);
        hud.apply(TopicMessage::CarParams(CarParams { personality_via_ui: true, ..CarParams::default() }));
        hud.update_state(now);

        let hud_rect = hud.compositor.layout(640, 320, false).hud();
        let center = hud.router.button_center(hud_rect);
        let outcome = hud.mouse_press(center, now, None);
        assert_eq!(outcome, PressOutcome::PersonalityChanged(Personality::Standard.next()));
        assert_eq!(store.get_int(keys::LONGITUDINAL_PERSONALITY), Some(Personality::Standard.next().index()));
        assert_eq!(
            hud.display_state().personality,
            Personality::Standard,
            "Press leaves the current snapshot alone"
        );

        hud.update_state(now + Duration::from_millis(50));
        assert_eq!(hud.display_state().personality, Personality::Standard.next(), "Next update reads the store");
        assert!(
            (hud.animations().personality.opacity(now).text - 1.0).abs() < f32::EPSILON,
            "Badge restarted by the press, not again by the update"
        );
    }
}
