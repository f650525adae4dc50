//! State synchronizer: topics in, paint-ready [`DisplayState`] out.
//!
//! [`StateSync::sync`] reads every topic exactly once per state update and
//! builds a fresh [`DisplayState`]. Nothing is carried over from the previous
//! snapshot except two pieces of deliberate memory:
//!
//! - the cluster-speed latch (see below)
//! - the driver head-pose filter, which smooths across samples
//!
//! # Fallbacks
//!
//! | Source stale / missing | Field | Fallback |
//! |------------------------|-------|----------|
//! | controls | set speed | [`SET_SPEED_NA`], cruise not set |
//! | controls | current speed | 0 |
//! | controls | status | disengaged |
//! | navigation | speed limit | 0, no sign |
//! | calibration since start | world geometry | not drawn |
//!
//! # Cluster Speed Latch
//!
//! Older sources leave `v_ego_cluster` at 0. Until a non-zero cluster value
//! has been seen the legacy `v_ego` is shown; once one is seen the cluster
//! field is used for the rest of the session, even if it later reads 0 again.
//! The latch re-arms only when a new drive starts.

use core::fmt::Write;

use heapless::String;

use crate::colors::{Rgba, STATUS_DISENGAGED, STATUS_ENGAGED, STATUS_OVERRIDE};
use crate::config::{KM_TO_MILE, MS_TO_KPH, MS_TO_MPH, SET_SPEED_NA};
use crate::driver::{DriverPoseTracker, FacePose};
use crate::params::HudSettings;
use crate::personality::Personality;
use crate::scene::PointF;
use crate::topics::{AlertSize, ModelGeometry, OpenpilotState, SpeedLimitSign, Topics};

// =============================================================================
// Display Types
// =============================================================================

/// Engagement status, drives the border and the MAX label color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Disengaged,
    Override,
    Engaged,
}

impl Status {
    pub const fn color(self) -> Rgba {
        match self {
            Self::Disengaged => STATUS_DISENGAGED,
            Self::Override => STATUS_OVERRIDE,
            Self::Engaged => STATUS_ENGAGED,
        }
    }
}

/// Which speed-limit sign is attached under the set-speed box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LimitSign {
    #[default]
    None,
    /// US/Canada rectangular sign.
    Us,
    /// EU round sign.
    Eu,
}

/// Feature toggles that gate optional widgets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct FeatureFlags {
    pub compass: bool,
    pub rotating_wheel: bool,
    pub colored_path: bool,
    pub animated_signals: bool,
    pub mute_dm: bool,
    pub status_bar: bool,
    /// Personality button enabled by the user and supported by the car.
    pub personality_button: bool,
}

/// A lead vehicle to mark.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LeadMarker {
    pub d_rel: f32,
    pub v_rel: f32,
    pub anchor: PointF,
}

/// Road geometry and leads, present only when world objects are visible.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorldView {
    pub geometry: ModelGeometry,
    pub accel: Vec<f32>,
    pub leads: heapless::Vec<LeadMarker, 2>,
}

/// Paint-ready snapshot, rebuilt on every state update.
#[derive(Clone, Debug, Default, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct DisplayState {
    /// Current speed in display units.
    pub speed: f32,
    /// Cruise target in display units, [`SET_SPEED_NA`] when controls are stale.
    pub set_speed: f32,
    pub cruise_set: bool,
    /// Posted limit in display units, 0 when unknown.
    pub speed_limit: f32,
    pub limit_sign: LimitSign,
    pub is_metric: bool,

    pub status: Status,
    /// Started and enabled.
    pub engaged: bool,
    /// Engage button visible (engageable or enabled).
    pub engage_visible: bool,
    pub experimental_mode: bool,
    pub longitudinal_control: bool,

    pub dm_active: bool,
    pub dm_fade: f32,
    pub rhd: bool,
    /// An alert banner is up and covers the driver icon.
    pub hide_dm: bool,
    /// Head pose, present when the driver overlay should be drawn.
    pub driver: Option<FacePose>,

    pub turn_signal_left: bool,
    pub turn_signal_right: bool,
    pub blindspot_left: bool,
    pub blindspot_right: bool,

    pub bearing_deg: f32,
    pub steering_angle_deg: f32,
    pub personality: Personality,
    pub wheel_icon: u8,
    pub flags: FeatureFlags,

    pub world: Option<WorldView>,
}

impl DisplayState {
    /// Turn-signal animation is on and a signal is engaged.
    #[inline]
    pub const fn signal_animating(&self) -> bool {
        self.flags.animated_signals && (self.turn_signal_left || self.turn_signal_right)
    }

    pub fn speed_text(&self) -> String<8> {
        let mut s = String::new();
        write!(s, "{}", self.speed.round_ties_even() as i32).ok();
        s
    }

    pub fn set_speed_text(&self) -> String<8> {
        let mut s = String::new();
        if self.cruise_set {
            write!(s, "{}", self.set_speed.round_ties_even() as i32).ok();
        } else {
            s.push('-').ok();
        }
        s
    }

    pub fn speed_limit_text(&self) -> String<8> {
        let mut s = String::new();
        if self.speed_limit > 1.0 {
            write!(s, "{}", self.speed_limit.round_ties_even() as i32).ok();
        } else {
            s.push('-').ok();
        }
        s
    }

    pub const fn unit_label(&self) -> &'static str {
        if self.is_metric { "km/h" } else { "mph" }
    }
}

// =============================================================================
// State Synchronizer
// =============================================================================

/// Minimum separation before a second lead gets its own marker.
const LEAD_TWO_MIN_SEPARATION: f32 = 3.0;

#[derive(Clone, Debug, Default)]
pub struct StateSync {
    v_ego_cluster_seen: bool,
    started: bool,
    started_frame: u64,
    pose: DriverPoseTracker,
    /// `driver_state` sequence number last fed to the pose filter.
    pose_seq: u64,
}

impl StateSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start (or end) of a drive at bus frame `frame`.
    pub fn set_started(&mut self, started: bool, frame: u64) {
        if started && !self.started {
            self.started_frame = frame;
            self.v_ego_cluster_seen = false;
            self.pose = DriverPoseTracker::new();
        }
        self.started = started;
    }

    #[inline]
    pub const fn started(&self) -> bool {
        self.started
    }

    #[inline]
    pub const fn started_frame(&self) -> u64 {
        self.started_frame
    }

    /// Whether the cluster-speed latch has switched to the cluster field.
    #[inline]
    pub const fn cluster_latched(&self) -> bool {
        self.v_ego_cluster_seen
    }

    /// Build the display snapshot for the current bus frame.
    pub fn sync(&mut self, topics: &Topics, settings: &HudSettings, dm_fade: f32) -> DisplayState {
        let frame = topics.frame();
        let cs_alive = topics.controls_state.alive(frame);
        let cs = topics.controls_state.value();
        let car = topics.car_state.value();
        let nav = topics.nav_instruction.value();
        let nav_alive = topics.nav_instruction.alive(frame) && nav.valid;
        let speed_conv = if settings.is_metric { MS_TO_KPH } else { MS_TO_MPH };

        // Set speed
        let v_cruise = if cs.v_cruise_cluster == 0.0 { cs.v_cruise } else { cs.v_cruise_cluster };
        let mut set_speed = if cs_alive { v_cruise } else { SET_SPEED_NA };
        let cruise_set = set_speed > 0.0 && set_speed as i32 != SET_SPEED_NA as i32;
        if cruise_set && !settings.is_metric {
            set_speed *= KM_TO_MILE;
        }

        // Current speed with the one-way cluster latch
        let v_ego = if car.v_ego_cluster == 0.0 && !self.v_ego_cluster_seen {
            car.v_ego
        } else {
            self.v_ego_cluster_seen = true;
            car.v_ego_cluster
        };
        let speed = (if cs_alive { v_ego.max(0.0) } else { 0.0 }) * speed_conv;

        // Speed limit, sign style as declared upstream
        let speed_limit = if nav_alive { nav.speed_limit.max(0.0) * speed_conv } else { 0.0 };
        let limit_sign = match (nav_alive, nav.speed_limit_sign) {
            (false, _) => LimitSign::None,
            (true, SpeedLimitSign::Mutcd) => LimitSign::Us,
            (true, SpeedLimitSign::Vienna) => LimitSign::Eu,
        };

        let status = if !cs_alive {
            Status::Disengaged
        } else if matches!(cs.state, OpenpilotState::PreEnabled | OpenpilotState::Overriding) {
            Status::Override
        } else if cs.enabled {
            Status::Engaged
        } else {
            Status::Disengaged
        };

        let car_params = topics.car_params.value();
        let flags = FeatureFlags {
            compass: settings.compass,
            rotating_wheel: settings.rotating_wheel,
            colored_path: settings.frog_colors,
            animated_signals: settings.frog_signals,
            mute_dm: settings.mute_dm,
            status_bar: settings.show_status_bar,
            personality_button: settings.personalities_ui_wheel && car_params.personality_via_ui,
        };

        let dm = topics.driver_monitoring.value();
        let mut ds = DisplayState {
            speed,
            set_speed,
            cruise_set,
            speed_limit,
            limit_sign,
            is_metric: settings.is_metric,
            status,
            engaged: self.started && cs_alive && cs.enabled,
            engage_visible: cs_alive && (cs.engageable || cs.enabled),
            experimental_mode: cs.experimental_mode,
            longitudinal_control: car_params.openpilot_longitudinal_control,
            dm_active: dm.is_active_mode,
            dm_fade: dm_fade.clamp(0.0, 1.0),
            rhd: dm.is_rhd,
            hide_dm: cs.alert_size != AlertSize::None,
            driver: None,
            turn_signal_left: car.left_blinker,
            turn_signal_right: car.right_blinker,
            blindspot_left: car.left_blindspot,
            blindspot_right: car.right_blindspot,
            bearing_deg: topics.live_location.value().bearing_deg.rem_euclid(360.0),
            steering_angle_deg: car.steering_angle_deg,
            personality: settings.personality,
            wheel_icon: settings.steering_wheel,
            flags,
            world: None,
        };

        ds.driver = self.driver_pose(topics, &ds);
        ds.world = self.world_view(topics, ds.longitudinal_control);
        ds
    }

    fn driver_pose(&mut self, topics: &Topics, ds: &DisplayState) -> Option<FacePose> {
        let fresh = topics.driver_state.rcv_frame() > self.started_frame;
        if ds.hide_dm || !fresh || ds.flags.mute_dm || ds.signal_animating() {
            return None;
        }
        // The filter steps once per sample; the fade is reapplied every frame.
        let topic = &topics.driver_state;
        if topic.seq() != self.pose_seq {
            self.pose_seq = topic.seq();
            let driver = topic.value();
            let orientation = if ds.rhd { driver.right_face_orientation } else { driver.left_face_orientation };
            self.pose.filter(orientation);
        }
        Some(self.pose.project(ds.dm_fade).clone())
    }

    fn world_view(&self, topics: &Topics, longitudinal: bool) -> Option<WorldView> {
        let visible = self.started && topics.live_calibration.rcv_frame() > self.started_frame;
        if !visible {
            return None;
        }

        let mut world = WorldView::default();
        if topics.model.rcv_frame() > self.started_frame {
            world.geometry = topics.model.value().clone();
            world.accel.clone_from(&topics.ui_plan.value().accel);
        }

        let radar_fresh = topics.radar_state.rcv_frame() > self.started_frame;
        if longitudinal && radar_fresh {
            let radar = topics.radar_state.value();
            let anchors = world.geometry.lead_vertices;
            let one = radar.lead_one;
            let two = radar.lead_two;
            if one.status {
                world.leads.push(LeadMarker { d_rel: one.d_rel, v_rel: one.v_rel, anchor: anchors[0] }).ok();
            }
            if two.status && (one.d_rel - two.d_rel).abs() > LEAD_TWO_MIN_SEPARATION {
                world.leads.push(LeadMarker { d_rel: two.d_rel, v_rel: two.v_rel, anchor: anchors[1] }).ok();
            }
        }
        Some(world)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topics::{
        CarParams, CarState, ControlsState, DriverMonitoringState, DriverStateV2, LeadData, LiveCalibration,
        NavInstruction, RadarState, TopicMessage,
    };
    use proptest::prelude::*;

    fn started_sync() -> StateSync {
        let mut sync = StateSync::new();
        sync.set_started(true, 0);
        sync
    }

    fn next_frame(topics: &mut Topics, msgs: Vec<TopicMessage>) {
        topics.advance_frame();
        for m in msgs {
            topics.apply(m);
        }
    }

    fn controls(v_cruise: f32, enabled: bool) -> TopicMessage {
        TopicMessage::ControlsState(ControlsState { v_cruise, enabled, ..ControlsState::default() })
    }

    fn car(v_ego: f32, v_ego_cluster: f32) -> TopicMessage {
        TopicMessage::CarState(CarState { v_ego, v_ego_cluster, ..CarState::default() })
    }

    // -------------------------------------------------------------------------
    // Fallbacks
    // -------------------------------------------------------------------------

    #[test]
    fn test_nothing_received_uses_fallbacks() {
        let mut sync = started_sync();
        let ds = sync.sync(&Topics::new(), &HudSettings::default(), 1.0);
        assert!((ds.set_speed - SET_SPEED_NA).abs() < f32::EPSILON);
        assert!(!ds.cruise_set);
        assert_eq!(ds.speed, 0.0);
        assert_eq!(ds.speed_limit, 0.0);
        assert_eq!(ds.limit_sign, LimitSign::None);
        assert_eq!(ds.status, Status::Disengaged);
        assert!(ds.world.is_none());
        assert!(ds.driver.is_none());
        assert_eq!(ds.set_speed_text().as_str(), "-");
        assert_eq!(ds.speed_limit_text().as_str(), "-");
    }

    #[test]
    fn test_stale_controls_fall_back() {
        let mut sync = started_sync();
        let mut topics = Topics::new();
        next_frame(&mut topics, vec![controls(100.0, true), car(20.0, 0.0)]);
        let settings = HudSettings { is_metric: true, ..HudSettings::default() };
        let ds = sync.sync(&topics, &settings, 1.0);
        assert!(ds.cruise_set);
        assert!((ds.speed - 72.0).abs() < 1e-3);

        for _ in 0..20 {
            topics.advance_frame();
        }
        let ds = sync.sync(&topics, &settings, 1.0);
        assert!(!ds.cruise_set, "Stale controls must not show old cruise target");
        assert_eq!(ds.speed, 0.0);
        assert_eq!(ds.status, Status::Disengaged);
    }

    // -------------------------------------------------------------------------
    // Units
    // -------------------------------------------------------------------------

    #[test]
    fn test_imperial_conversion() {
        let mut sync = started_sync();
        let mut topics = Topics::new();
        next_frame(&mut topics, vec![controls(100.0, true), car(27.8, 0.0)]);
        let ds = sync.sync(&topics, &HudSettings::default(), 1.0);
        assert!((ds.set_speed - 62.1371).abs() < 1e-3, "km/h cruise shown in mph");
        assert!((ds.speed - 27.8 * MS_TO_MPH).abs() < 1e-3);
        assert_eq!(ds.speed_text().as_str(), "62");
        assert_eq!(ds.unit_label(), "mph");
    }

    #[test]
    fn test_cruise_cluster_preferred() {
        let mut sync = started_sync();
        let mut topics = Topics::new();
        next_frame(&mut topics, vec![TopicMessage::ControlsState(ControlsState {
            v_cruise: 100.0,
            v_cruise_cluster: 98.0,
            ..ControlsState::default()
        })]);
        let settings = HudSettings { is_metric: true, ..HudSettings::default() };
        assert!((sync.sync(&topics, &settings, 1.0).set_speed - 98.0).abs() < f32::EPSILON);
    }

    // -------------------------------------------------------------------------
    // Cluster Latch
    // -------------------------------------------------------------------------

    #[test]
    fn test_cluster_latch_is_one_way() {
        let mut sync = started_sync();
        let mut topics = Topics::new();
        let settings = HudSettings { is_metric: true, ..HudSettings::default() };

        next_frame(&mut topics, vec![controls(50.0, true), car(10.0, 0.0)]);
        assert!((sync.sync(&topics, &settings, 1.0).speed - 36.0).abs() < 1e-3, "Legacy field before latch");
        assert!(!sync.cluster_latched());

        next_frame(&mut topics, vec![controls(50.0, true), car(10.0, 11.0)]);
        assert!((sync.sync(&topics, &settings, 1.0).speed - 39.6).abs() < 1e-3);
        assert!(sync.cluster_latched());

        next_frame(&mut topics, vec![controls(50.0, true), car(10.0, 0.0)]);
        assert_eq!(sync.sync(&topics, &settings, 1.0).speed, 0.0, "Latched: transient 0 is shown, no fallback");
    }

    #[test]
    fn test_cluster_latch_rearms_on_new_drive() {
        let mut sync = started_sync();
        let mut topics = Topics::new();
        next_frame(&mut topics, vec![controls(50.0, true), car(10.0, 11.0)]);
        sync.sync(&topics, &HudSettings::default(), 1.0);
        assert!(sync.cluster_latched());
        sync.set_started(false, topics.frame());
        sync.set_started(true, topics.frame());
        assert!(!sync.cluster_latched());
    }

    // -------------------------------------------------------------------------
    // Status & Signs
    // -------------------------------------------------------------------------

    #[test]
    fn test_status_override_and_engaged() {
        let mut sync = started_sync();
        let mut topics = Topics::new();
        next_frame(&mut topics, vec![TopicMessage::ControlsState(ControlsState {
            enabled: true,
            state: OpenpilotState::Overriding,
            ..ControlsState::default()
        })]);
        assert_eq!(sync.sync(&topics, &HudSettings::default(), 1.0).status, Status::Override);

        next_frame(&mut topics, vec![controls(0.0, true)]);
        let ds = sync.sync(&topics, &HudSettings::default(), 1.0);
        assert_eq!(ds.status, Status::Engaged);
        assert!(ds.engaged);
    }

    #[test]
    fn test_sign_follows_upstream_type() {
        let mut sync = started_sync();
        let mut topics = Topics::new();
        next_frame(&mut topics, vec![TopicMessage::NavInstruction(NavInstruction {
            valid: true,
            speed_limit: 25.0,
            speed_limit_sign: SpeedLimitSign::Vienna,
        })]);
        let settings = HudSettings { is_metric: true, ..HudSettings::default() };
        let ds = sync.sync(&topics, &settings, 1.0);
        assert_eq!(ds.limit_sign, LimitSign::Eu);
        assert_eq!(ds.speed_limit_text().as_str(), "90");
    }

    #[test]
    fn test_invalid_nav_hides_sign() {
        let mut sync = started_sync();
        let mut topics = Topics::new();
        next_frame(&mut topics, vec![TopicMessage::NavInstruction(NavInstruction {
            valid: false,
            speed_limit: 25.0,
            speed_limit_sign: SpeedLimitSign::Mutcd,
        })]);
        let ds = sync.sync(&topics, &HudSettings::default(), 1.0);
        assert_eq!(ds.limit_sign, LimitSign::None);
        assert_eq!(ds.speed_limit, 0.0);
    }

    // -------------------------------------------------------------------------
    // World & Driver
    // -------------------------------------------------------------------------

    #[test]
    fn test_world_needs_calibration_after_start() {
        let mut sync = StateSync::new();
        let mut topics = Topics::new();
        next_frame(&mut topics, vec![TopicMessage::LiveCalibration(LiveCalibration::default())]);
        sync.set_started(true, topics.frame());
        assert!(sync.sync(&topics, &HudSettings::default(), 1.0).world.is_none(), "Calibration from before start");

        next_frame(&mut topics, vec![TopicMessage::LiveCalibration(LiveCalibration::default())]);
        assert!(sync.sync(&topics, &HudSettings::default(), 1.0).world.is_some());
    }

    #[test]
    fn test_second_lead_needs_separation() {
        let mut sync = started_sync();
        let mut topics = Topics::new();
        let lead = |d_rel| LeadData { status: true, d_rel, v_rel: 0.0 };
        next_frame(&mut topics, vec![
            TopicMessage::LiveCalibration(LiveCalibration::default()),
            TopicMessage::CarParams(CarParams { openpilot_longitudinal_control: true, personality_via_ui: true }),
            TopicMessage::RadarState(RadarState { lead_one: lead(20.0), lead_two: lead(22.0) }),
        ]);
        let ds = sync.sync(&topics, &HudSettings::default(), 1.0);
        assert_eq!(ds.world.as_ref().map(|w| w.leads.len()), Some(1));

        next_frame(&mut topics, vec![TopicMessage::RadarState(RadarState { lead_one: lead(20.0), lead_two: lead(30.0) })]);
        let ds = sync.sync(&topics, &HudSettings::default(), 1.0);
        assert_eq!(ds.world.as_ref().map(|w| w.leads.len()), Some(2));
    }

    #[test]
    fn test_no_leads_without_longitudinal() {
        let mut sync = started_sync();
        let mut topics = Topics::new();
        next_frame(&mut topics, vec![
            TopicMessage::LiveCalibration(LiveCalibration::default()),
            TopicMessage::RadarState(RadarState {
                lead_one: LeadData { status: true, d_rel: 10.0, v_rel: 0.0 },
                ..RadarState::default()
            }),
        ]);
        let ds = sync.sync(&topics, &HudSettings::default(), 1.0);
        assert!(ds.world.is_some_and(|w| w.leads.is_empty()));
    }

    #[test]
    fn test_driver_pose_gating() {
        let mut sync = started_sync();
        let mut topics = Topics::new();
        next_frame(&mut topics, vec![
            TopicMessage::DriverStateV2(DriverStateV2::default()),
            TopicMessage::DriverMonitoringState(DriverMonitoringState { is_active_mode: true, is_rhd: false }),
        ]);
        assert!(sync.sync(&topics, &HudSettings::default(), 0.0).driver.is_some());

        let muted = HudSettings { mute_dm: true, ..HudSettings::default() };
        assert!(sync.sync(&topics, &muted, 0.0).driver.is_none(), "Muted monitor hides the overlay");

        next_frame(&mut topics, vec![
            TopicMessage::DriverStateV2(DriverStateV2::default()),
            TopicMessage::CarState(CarState { left_blinker: true, ..CarState::default() }),
        ]);
        let signals = HudSettings { frog_signals: true, ..HudSettings::default() };
        assert!(sync.sync(&topics, &signals, 0.0).driver.is_none(), "Signal animation claims the icon");
    }

    #[test]
    fn test_pose_filter_steps_once_per_sample() {
        let mut sync = started_sync();
        let mut topics = Topics::new();
        let looking = DriverStateV2 { left_face_orientation: [0.0, 0.5, 0.0], ..DriverStateV2::default() };
        next_frame(&mut topics, vec![TopicMessage::DriverStateV2(looking.clone())]);
        let first = sync.sync(&topics, &HudSettings::default(), 0.0).driver.expect("pose after a sample");

        // No new message: repeated syncs must not keep pulling the filter.
        next_frame(&mut topics, vec![]);
        let held = sync.sync(&topics, &HudSettings::default(), 0.0).driver.expect("pose held");
        assert_eq!(held, first, "Filter advances only on new driver data");

        next_frame(&mut topics, vec![TopicMessage::DriverStateV2(looking)]);
        let second = sync.sync(&topics, &HudSettings::default(), 0.0).driver.expect("pose after resend");
        assert!(second.sins[1] > first.sins[1], "Second sample moves the filter closer to the target");
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    proptest! {
        #[test]
        fn prop_sync_total_over_topic_liveness(
            cs_age in prop_oneof![Just(None), (0u64..30).prop_map(Some)],
            car_age in prop_oneof![Just(None), (0u64..30).prop_map(Some)],
            nav_age in prop_oneof![Just(None), (0u64..30).prop_map(Some)],
            v_ego in -50.0f32..80.0,
            v_cluster in prop_oneof![Just(0.0f32), -5.0f32..80.0],
            limit in -5.0f32..60.0,
            vienna in any::<bool>(),
            metric in any::<bool>(),
        ) {
            let mut topics = Topics::new();
            for _ in 0..40 {
                topics.advance_frame();
            }
            let now = topics.frame();
            if let Some(age) = cs_age {
                topics.controls_state.publish(ControlsState { v_cruise: 80.0, enabled: true, ..ControlsState::default() }, now - age);
            }
            if let Some(age) = car_age {
                topics.car_state.publish(CarState { v_ego, v_ego_cluster: v_cluster, ..CarState::default() }, now - age);
            }
            let sign = if vienna { SpeedLimitSign::Vienna } else { SpeedLimitSign::Mutcd };
            if let Some(age) = nav_age {
                topics.nav_instruction.publish(NavInstruction { valid: true, speed_limit: limit, speed_limit_sign: sign }, now - age);
            }

            let mut sync = started_sync();
            let settings = HudSettings { is_metric: metric, ..HudSettings::default() };
            let ds = sync.sync(&topics, &settings, 0.5);

            prop_assert!(ds.speed >= 0.0 && ds.speed.is_finite());
            prop_assert!(ds.set_speed >= 0.0 && ds.set_speed.is_finite());
            prop_assert!(ds.speed_limit >= 0.0 && ds.speed_limit.is_finite());
            prop_assert!((0.0..=1.0).contains(&ds.dm_fade));
            if ds.speed_limit > 0.0 {
                prop_assert!(ds.limit_sign != LimitSign::None);
            }
            let expected = match (nav_age.is_some_and(|a| a <= 10), vienna) {
                (false, _) => LimitSign::None,
                (true, false) => LimitSign::Us,
                (true, true) => LimitSign::Eu,
            };
            prop_assert_eq!(ds.limit_sign, expected);
        }
    }
}
