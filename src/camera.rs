//! Camera frame acquisition.
//!
//! A worker thread polls a [`FrameSource`] and drops each new frame into a
//! [`FrameSlot`]. The paint pass takes whatever is newest under a short lock
//! and never waits for a frame to arrive. The lock is held only to swap an
//! `Arc`, never while painting.
//!
//! # Paint Gating
//!
//! [`FrameGate`] decides whether a paint cycle should run at all:
//!
//! ```text
//! frame held ──▶ paint with the newest frame, budget = 5
//! no frame   ──▶ budget > 0 ? skip, budget -= 1 : paint black
//! ```
//!
//! # Stream Choice
//!
//! [`StreamSelector`] requests the wide camera at low speed with hysteresis
//! (below 10 m/s on, above 15 m/s off), only in experimental mode with a
//! valid wide calibration and when the wide camera is not disabled.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use embedded_graphics::pixelcolor::Rgb888;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config::CAMERA_SKIP_BUDGET;

// =============================================================================
// Frames
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StreamKind {
    #[default]
    Road,
    WideRoad,
    Driver,
}

/// One decoded camera image, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraFrame {
    pub stream: StreamKind,
    pub frame_id: u64,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgb888>,
}

impl CameraFrame {
    /// Frame filled with one color.
    pub fn solid(stream: StreamKind, frame_id: u64, width: u32, height: u32, color: Rgb888) -> Self {
        Self { stream, frame_id, width, height, pixels: vec![color; (width * height) as usize] }
    }

    /// Pixel at `(x, y)`, `None` outside the image.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }
}

/// Producer of decoded frames. Polled from the worker thread.
pub trait FrameSource: Send {
    /// Streams this source can deliver.
    fn available_streams(&self) -> Vec<StreamKind>;

    /// Newest frame of `stream` if one is ready. Must not block.
    fn poll(&mut self, stream: StreamKind) -> Option<CameraFrame>;
}

// =============================================================================
// Frame Slot
// =============================================================================

#[derive(Debug, Default)]
struct SlotInner {
    latest: Option<Arc<CameraFrame>>,
    requested: StreamKind,
}

/// Single-frame handoff between the worker and the paint pass.
#[derive(Clone, Debug, Default)]
pub struct FrameSlot {
    inner: Arc<Mutex<SlotInner>>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held frame.
    pub fn push(&self, frame: CameraFrame) {
        let mut inner = self.inner.lock();
        inner.latest = Some(Arc::new(frame));
    }

    /// Newest frame, if any has arrived. The slot keeps it for later paints.
    pub fn take(&self) -> Option<Arc<CameraFrame>> {
        self.inner.lock().latest.clone()
    }

    /// Ask the worker to switch streams. Returns `true` if the request changed.
    pub fn request_stream(&self, stream: StreamKind) -> bool {
        let mut inner = self.inner.lock();
        if inner.requested == stream {
            return false;
        }
        inner.requested = stream;
        true
    }

    pub fn requested_stream(&self) -> StreamKind {
        self.inner.lock().requested
    }
}

// =============================================================================
// Worker
// =============================================================================

/// Background thread feeding a [`FrameSlot`]. Stops and joins on drop.
#[derive(Debug)]
pub struct CameraWorker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl CameraWorker {
    /// Spawn the worker, polling `source` every `interval`.
    pub fn spawn(mut source: Box<dyn FrameSource>, slot: FrameSlot, interval: Duration) -> std::io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = thread::Builder::new().name("camera".into()).spawn(move || {
            debug!(streams = ?source.available_streams(), "camera worker started");
            while !stop_flag.load(Ordering::Relaxed) {
                let stream = slot.requested_stream();
                if let Some(frame) = source.poll(stream) {
                    trace!(frame_id = frame.frame_id, ?stream, "camera frame");
                    slot.push(frame);
                }
                thread::sleep(interval);
            }
            debug!("camera worker stopped");
        })?;
        Ok(Self { stop, handle: Some(handle) })
    }

    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CameraWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

// =============================================================================
// Paint Gate
// =============================================================================

/// Bounded skipping of paint cycles before the first frame arrives.
#[derive(Clone, Copy, Debug)]
pub struct FrameGate {
    budget: u8,
    remaining: u8,
}

impl FrameGate {
    pub const fn new() -> Self {
        Self::with_budget(CAMERA_SKIP_BUDGET)
    }

    pub const fn with_budget(budget: u8) -> Self {
        Self { budget, remaining: budget }
    }

    /// Whether this paint cycle should run, given whether a frame is held.
    pub fn admit(&mut self, available: bool) -> bool {
        if available {
            self.remaining = self.budget;
            return true;
        }
        if self.remaining > 0 {
            self.remaining -= 1;
            debug!(remaining = self.remaining, "skipping paint, no camera frame");
            return false;
        }
        true
    }

    #[inline]
    pub const fn remaining(&self) -> u8 {
        self.remaining
    }
}

impl Default for FrameGate {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Stream Selection
// =============================================================================

const WIDE_ON_BELOW: f32 = 10.0;
const WIDE_OFF_ABOVE: f32 = 15.0;

/// Inputs for one stream decision.
#[derive(Clone, Copy, Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct StreamInputs {
    pub v_ego: f32,
    pub experimental_mode: bool,
    pub wide_calibration_valid: bool,
    pub has_wide: bool,
    pub single_stream: bool,
    pub wide_disabled: bool,
}

/// Road/wide camera choice with speed hysteresis.
#[derive(Clone, Copy, Debug, Default)]
pub struct StreamSelector {
    wide_by_speed: bool,
}

impl StreamSelector {
    pub const fn new() -> Self {
        Self { wide_by_speed: false }
    }

    pub fn select(&mut self, inputs: StreamInputs) -> StreamKind {
        if inputs.v_ego < WIDE_ON_BELOW || inputs.single_stream {
            self.wide_by_speed = true;
        } else if inputs.v_ego > WIDE_OFF_ABOVE {
            self.wide_by_speed = false;
        }
        let wide = self.wide_by_speed
            && inputs.experimental_mode
            && inputs.wide_calibration_valid
            && inputs.has_wide
            && !inputs.wide_disabled;
        if wide { StreamKind::WideRoad } else { StreamKind::Road }
    }
}
