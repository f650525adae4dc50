//! Frame-rate monitoring, the debug topic and the HUD event log.
//!
//! # Frame Rate
//!
//! The measured rate is smoothed with a first-order low-pass filter
//! (time constant 3 s, sampled at [`UI_FREQ`]), starting from the nominal
//! rate so the first few frames never trip the warning. Below
//! [`SLOW_FPS_THRESHOLD`] a warning is logged; rendering carries on.
//!
//! # Debug Topic
//!
//! Every painted frame publishes a [`UiDebug`] with the wall time spent
//! producing it. Publishing goes through [`DebugSink`] and never blocks.
//!
//! # Event Log
//!
//! [`DebugLog`] keeps the last few notable HUD events (profile change, alert
//! change, slow frame) in a fixed ring buffer for the simulator to print.

use std::time::{Duration, Instant};

use crossbeam_channel::{Sender, TrySendError};
use heapless::{Deque, String};
use tracing::{trace, warn};

use crate::config::{SLOW_FPS_THRESHOLD, UI_FREQ};

// =============================================================================
// FPS Filter
// =============================================================================

const FPS_TIME_CONSTANT: f32 = 3.0;

/// First-order low-pass filter.
#[derive(Clone, Copy, Debug)]
pub struct FirstOrderFilter {
    k: f32,
    x: f32,
}

impl FirstOrderFilter {
    pub fn new(initial: f32, time_constant: f32, dt: f32) -> Self {
        let ratio = dt / time_constant;
        Self { k: ratio / (1.0 + ratio), x: initial }
    }

    pub fn update(&mut self, sample: f32) -> f32 {
        self.x = (1.0 - self.k).mul_add(self.x, self.k * sample);
        self.x
    }

    #[inline]
    pub const fn value(&self) -> f32 {
        self.x
    }
}

/// Smoothed paint rate with a slow-frame warning.
#[derive(Clone, Debug)]
pub struct FrameMonitor {
    fps: FirstOrderFilter,
    last_paint: Option<Instant>,
    /// Frames painted since startup.
    pub total_frames: u64,
    /// Most recent paint duration.
    pub draw_time: Duration,
    pub draw_time_max: Duration,
    /// Frames measured below the threshold.
    pub slow_frames: u64,
}

impl FrameMonitor {
    pub fn new() -> Self {
        Self {
            fps: FirstOrderFilter::new(UI_FREQ as f32, FPS_TIME_CONSTANT, 1.0 / UI_FREQ as f32),
            last_paint: None,
            total_frames: 0,
            draw_time: Duration::ZERO,
            draw_time_max: Duration::ZERO,
            slow_frames: 0,
        }
    }

    /// Record one paint that started at `started` and took `draw_time`.
    /// Returns `true` when the smoothed rate is below the threshold.
    pub fn record(&mut self, started: Instant, draw_time: Duration) -> bool {
        self.total_frames += 1;
        self.draw_time = draw_time;
        self.draw_time_max = self.draw_time_max.max(draw_time);

        let Some(last) = self.last_paint.replace(started) else {
            return false;
        };
        let dt = started.saturating_duration_since(last).as_secs_f32();
        if dt <= 0.0 {
            return false;
        }
        let fps = self.fps.update(1.0 / dt);
        if fps < SLOW_FPS_THRESHOLD {
            self.slow_frames += 1;
            warn!(fps, "slow frame time");
            return true;
        }
        false
    }

    #[inline]
    pub const fn fps(&self) -> f32 {
        self.fps.value()
    }
}

impl Default for FrameMonitor {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Debug Topic
// =============================================================================

/// Per-frame debug message.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UiDebug {
    pub draw_time_millis: f32,
}

impl UiDebug {
    pub fn from_duration(d: Duration) -> Self {
        Self { draw_time_millis: d.as_secs_f32() * 1000.0 }
    }
}

/// Outbound debug topic. Fire-and-forget.
pub trait DebugSink {
    fn publish(&self, msg: UiDebug);
}

impl DebugSink for Sender<UiDebug> {
    fn publish(&self, msg: UiDebug) {
        match self.try_send(msg) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => trace!("debug topic full, dropped frame timing"),
            Err(TrySendError::Disconnected(_)) => trace!("debug topic closed"),
        }
    }
}

/// Sink that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DebugSink for NullSink {
    fn publish(&self, _msg: UiDebug) {}
}

// =============================================================================
// Event Log
// =============================================================================

/// Maximum number of log lines to keep in the ring buffer.
pub const LOG_BUFFER_SIZE: usize = 8;

/// Maximum characters per log line.
pub const LOG_LINE_LENGTH: usize = 64;

/// Ring buffer of recent HUD events. Oldest entries drop out first.
#[derive(Clone, Debug, Default)]
pub struct DebugLog {
    buffer: Deque<String<LOG_LINE_LENGTH>, LOG_BUFFER_SIZE>,
}

impl DebugLog {
    pub const fn new() -> Self {
        Self { buffer: Deque::new() }
    }

    /// Append `msg`, truncated to fit a line.
    pub fn push(&mut self, msg: &str) {
        if self.buffer.is_full() {
            self.buffer.pop_front();
        }
        let mut line: String<LOG_LINE_LENGTH> = String::new();
        for c in msg.chars() {
            if line.push(c).is_err() {
                break;
            }
        }
        self.buffer.push_back(line).ok();
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.buffer.iter().map(heapless::string::StringInner::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
