//! Inbound topic feed.
//!
//! The perception/control stack publishes one message stream per topic.
//! [`Topics`] keeps the latest value of each together with the bus frame it
//! arrived on, which is all the HUD needs to answer three questions:
//!
//! | Question | Method |
//! |----------|--------|
//! | What is the newest value? | [`Topic::value`] |
//! | Was it received recently? | [`Topic::alive`] |
//! | Is it newer than some reference frame? | [`Topic::rcv_frame`] |
//!
//! Staleness is a normal state, never an error: a topic that has never been
//! received reads as its `Default` value and `alive() == false`.
//!
//! The message structs mirror only the fields the HUD consumes. Geometry in
//! [`ModelGeometry`] is already projected into view pixels upstream.

use crate::config::TOPIC_MAX_AGE_FRAMES;
use crate::scene::PointF;

// =============================================================================
// Topic Slot
// =============================================================================

/// Latest value of one topic plus its receive bookkeeping.
#[derive(Clone, Debug)]
pub struct Topic<T> {
    value: T,
    rcv_frame: Option<u64>,
    seq: u64,
    max_age: u64,
}

impl<T: Default> Topic<T> {
    /// Empty slot that counts as alive for `max_age` bus frames after a receive.
    pub fn new(max_age: u64) -> Self {
        Self { value: T::default(), rcv_frame: None, seq: 0, max_age }
    }
}

impl<T> Topic<T> {
    /// Store a new value received on bus frame `frame`.
    pub fn publish(&mut self, value: T, frame: u64) {
        self.value = value;
        self.rcv_frame = Some(frame);
        self.seq += 1;
    }

    #[inline]
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// Bus frame of the last receive, 0 when never received.
    #[inline]
    pub fn rcv_frame(&self) -> u64 {
        self.rcv_frame.unwrap_or(0)
    }

    /// Whether anything has ever been received.
    #[inline]
    pub const fn seen(&self) -> bool {
        self.rcv_frame.is_some()
    }

    /// Number of messages received so far. Compare against a stored value
    /// to tell whether anything new arrived since it was taken.
    #[inline]
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    /// Received within the freshness window ending at `frame`.
    pub fn alive(&self, frame: u64) -> bool {
        self.rcv_frame.is_some_and(|rcv| frame.saturating_sub(rcv) <= self.max_age)
    }

    /// Received on exactly `frame`.
    pub fn updated(&self, frame: u64) -> bool {
        self.rcv_frame == Some(frame)
    }
}

// =============================================================================
// Message Schema
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CarState {
    /// Vehicle speed in m/s.
    pub v_ego: f32,
    /// Speed as shown by the car's own cluster, 0 on older sources.
    pub v_ego_cluster: f32,
    pub left_blinker: bool,
    pub right_blinker: bool,
    pub left_blindspot: bool,
    pub right_blindspot: bool,
    pub steering_angle_deg: f32,
}

/// Engagement state machine reported by controls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OpenpilotState {
    #[default]
    Disabled,
    PreEnabled,
    Enabled,
    SoftDisabling,
    Overriding,
}

/// Banner size class of an alert.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AlertSize {
    #[default]
    None,
    Small,
    Mid,
    Full,
}

/// Banner severity of an alert.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AlertStatus {
    #[default]
    Normal,
    UserPrompt,
    Critical,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ControlsState {
    /// Cruise target in km/h.
    pub v_cruise: f32,
    /// Cruise target as the cluster shows it, 0 on older sources.
    pub v_cruise_cluster: f32,
    pub enabled: bool,
    pub engageable: bool,
    pub state: OpenpilotState,
    pub experimental_mode: bool,
    pub alert_text1: String,
    pub alert_text2: String,
    pub alert_type: String,
    pub alert_size: AlertSize,
    pub alert_status: AlertStatus,
}

/// Posted sign style, declared upstream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpeedLimitSign {
    #[default]
    Mutcd,
    Vienna,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NavInstruction {
    pub valid: bool,
    /// Posted limit in m/s.
    pub speed_limit: f32,
    pub speed_limit_sign: SpeedLimitSign,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LeadData {
    pub status: bool,
    /// Distance to the lead in meters.
    pub d_rel: f32,
    /// Relative speed in m/s, negative when closing in.
    pub v_rel: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RadarState {
    pub lead_one: LeadData,
    pub lead_two: LeadData,
}

/// Road geometry in view pixel space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelGeometry {
    pub lane_lines: [Vec<PointF>; 4],
    pub lane_line_probs: [f32; 4],
    pub road_edges: [Vec<PointF>; 2],
    pub road_edge_stds: [f32; 2],
    /// Driving path outline; the first half are right-side points aligned
    /// index-for-index with the planned acceleration series.
    pub track: Vec<PointF>,
    pub track_edge: Vec<PointF>,
    pub left_blindspot: Vec<PointF>,
    pub right_blindspot: Vec<PointF>,
    /// Projected anchor points of lead one and lead two.
    pub lead_vertices: [PointF; 2],
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UiPlan {
    /// Planned acceleration (m/s²) per path point.
    pub accel: Vec<f32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DriverStateV2 {
    /// Pitch, yaw, roll of the left-seat driver's face.
    pub left_face_orientation: [f32; 3],
    pub right_face_orientation: [f32; 3],
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DriverMonitoringState {
    pub is_active_mode: bool,
    pub is_rhd: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LiveCalibration {
    pub valid: bool,
    pub wide_valid: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CarParams {
    pub openpilot_longitudinal_control: bool,
    /// Car supports switching personalities from the UI.
    pub personality_via_ui: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LiveLocation {
    pub bearing_deg: f32,
}

/// One inbound message, tagged by topic.
#[derive(Clone, Debug, PartialEq)]
pub enum TopicMessage {
    CarState(CarState),
    ControlsState(ControlsState),
    NavInstruction(NavInstruction),
    RadarState(RadarState),
    ModelV2(ModelGeometry),
    UiPlan(UiPlan),
    DriverStateV2(DriverStateV2),
    DriverMonitoringState(DriverMonitoringState),
    LiveCalibration(LiveCalibration),
    CarParams(CarParams),
    LiveLocation(LiveLocation),
}

// =============================================================================
// Topic Set
// =============================================================================

/// Every topic the HUD subscribes to, plus the current bus frame.
#[derive(Clone, Debug)]
pub struct Topics {
    frame: u64,
    pub car_state: Topic<CarState>,
    pub controls_state: Topic<ControlsState>,
    pub nav_instruction: Topic<NavInstruction>,
    pub radar_state: Topic<RadarState>,
    pub model: Topic<ModelGeometry>,
    pub ui_plan: Topic<UiPlan>,
    pub driver_state: Topic<DriverStateV2>,
    pub driver_monitoring: Topic<DriverMonitoringState>,
    pub live_calibration: Topic<LiveCalibration>,
    pub car_params: Topic<CarParams>,
    pub live_location: Topic<LiveLocation>,
}

impl Topics {
    pub fn new() -> Self {
        fn slot<T: Default>() -> Topic<T> {
            Topic::new(TOPIC_MAX_AGE_FRAMES)
        }
        Self {
            frame: 0,
            car_state: slot(),
            controls_state: slot(),
            nav_instruction: slot(),
            radar_state: slot(),
            model: slot(),
            ui_plan: slot(),
            driver_state: slot(),
            driver_monitoring: slot(),
            live_calibration: slot(),
            // Published once per drive, never goes stale.
            car_params: Topic::new(u64::MAX),
            live_location: slot(),
        }
    }

    /// Current bus frame.
    #[inline]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Close the current bus frame and open the next one.
    pub fn advance_frame(&mut self) {
        self.frame += 1;
    }

    /// Store a message on the current bus frame.
    pub fn apply(&mut self, msg: TopicMessage) {
        let frame = self.frame;
        match msg {
            TopicMessage::CarState(m) => self.car_state.publish(m, frame),
            TopicMessage::ControlsState(m) => self.controls_state.publish(m, frame),
            TopicMessage::NavInstruction(m) => self.nav_instruction.publish(m, frame),
            TopicMessage::RadarState(m) => self.radar_state.publish(m, frame),
            TopicMessage::ModelV2(m) => self.model.publish(m, frame),
            TopicMessage::UiPlan(m) => self.ui_plan.publish(m, frame),
            TopicMessage::DriverStateV2(m) => self.driver_state.publish(m, frame),
            TopicMessage::DriverMonitoringState(m) => self.driver_monitoring.publish(m, frame),
            TopicMessage::LiveCalibration(m) => self.live_calibration.publish(m, frame),
            TopicMessage::CarParams(m) => self.car_params.publish(m, frame),
            TopicMessage::LiveLocation(m) => self.live_location.publish(m, frame),
        }
    }
}

impl Default for Topics {
    fn default() -> Self {
        Self::new()
    }
}
