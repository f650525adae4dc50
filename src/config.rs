//! Application configuration constants.
//!
//! Layout numbers are expressed in the HUD's native 2160×1080 pixel space
//! and pre-computed as `const` so widgets never recompute them per frame.
//! Timing values are `Duration`s; bus-frame based windows are plain counts
//! because the message bus is clocked at [`UI_FREQ`].

use std::time::Duration;

// =============================================================================
// Display Configuration
// =============================================================================

/// Default window width in pixels.
pub const SCREEN_WIDTH: u32 = 2160;

/// Default window height in pixels.
pub const SCREEN_HEIGHT: u32 = 1080;

/// Bus / UI update rate in Hz. One bus frame every 50 ms.
pub const UI_FREQ: u64 = 20;

// =============================================================================
// Layout Constants
// =============================================================================

/// Border drawn around the camera view in the status color.
pub const BDR_S: i32 = 30;

/// Diameter of round icon buttons.
pub const BTN_SIZE: i32 = 192;

/// Nominal icon image size inside a button.
pub const IMG_SIZE: u32 = 144;

/// Height of the header band (speed, set speed, signs).
pub const HEADER_H: i32 = 420;

/// Height of the footer band (driver icon, personality, compass).
pub const FOOTER_H: i32 = 280;

/// Set-speed box default size (no sign attached).
pub const SET_SPEED_DEFAULT_W: i32 = 172;
pub const SET_SPEED_DEFAULT_H: i32 = 204;

/// Set-speed box width when metric or an EU sign is shown.
pub const SET_SPEED_WIDE_W: i32 = 200;

/// Set-speed box width for a 3-digit US limit.
pub const SET_SPEED_US_3DIGIT_W: i32 = 223;

/// Left edge of the default set-speed box.
pub const SET_SPEED_X: i32 = 60;

/// Top edge of the set-speed box.
pub const SET_SPEED_Y: i32 = 45;

pub const SIGN_MARGIN: i32 = 12;
pub const US_SIGN_HEIGHT: i32 = 186;
pub const EU_SIGN_SIZE: i32 = 176;

/// Baseline of the current speed text.
pub const SPEED_TEXT_Y: i32 = 210;

/// Baseline of the unit text below the speed.
pub const SPEED_UNIT_Y: i32 = 290;

// =============================================================================
// Units
// =============================================================================

pub const KM_TO_MILE: f32 = 0.621_371;
pub const MS_TO_KPH: f32 = 3.6;
pub const MS_TO_MPH: f32 = 2.236_936;

/// Set speed reported when controls are not alive.
pub const SET_SPEED_NA: f32 = 255.0;

// =============================================================================
// Timing Configuration
// =============================================================================

/// Number of frames in the turn-signal animation cycle.
pub const SIGNAL_TOTAL_FRAMES: usize = 8;

/// Per-frame step of the signal clock in milliseconds.
pub const SIGNAL_FRAME_MS: u64 = 11;

/// Animation clock period: 8 × 11 ms = 88 ms.
pub const ANIMATION_PERIOD: Duration = Duration::from_millis(SIGNAL_TOTAL_FRAMES as u64 * SIGNAL_FRAME_MS);

/// How long the personality name stays fully visible after a change.
pub const PERSONALITY_TEXT_DURATION: Duration = Duration::from_millis(3000);

/// Cross-fade window from personality name to icon.
pub const PERSONALITY_FADE_DURATION: Duration = Duration::from_millis(1000);

/// Driver-monitor fade gain; each update moves the fade by `gain * 0.5`.
pub const DM_FADE_GAIN: f32 = 0.2;

/// Paint cycles skipped while no camera frame is available.
pub const CAMERA_SKIP_BUDGET: u8 = 5;

/// Measured frame rate below which a warning is logged.
pub const SLOW_FPS_THRESHOLD: f32 = 15.0;

/// Bus frames after which a topic is no longer considered alive.
pub const TOPIC_MAX_AGE_FRAMES: u64 = 10;

/// Seconds without controls before the unresponsive alert is raised.
pub const CONTROLS_TIMEOUT_SECS: u64 = 5;

/// Grace after start before controls timeouts apply (bus frames).
pub const CONTROLS_STARTUP_FRAMES: u64 = 5 * UI_FREQ;

// =============================================================================
// Interaction
// =============================================================================

/// Hit radius multiplier over the nominal button size.
pub const HIT_RADIUS_FACTOR: f32 = 1.25;
