//! Single-threaded event loop for the onroad surface.
//!
//! Every input reaches the HUD as a [`UiEvent`] on one channel. The loop
//! waits on the channel only until the next animation deadline, so signal
//! ticks keep firing when the bus goes quiet:
//!
//! ```text
//!   ┌──────────── recv_deadline(next tick) ────────────┐
//!   │                                                  │
//!   ▼                                                  │
//! handle event ──► tick if due ──► paint if requested ─┘
//! ```
//!
//! At most one paint happens per iteration. Dropping the loop drops the
//! HUD and its animation clock with it.

use std::time::Instant;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, trace};

use crate::hud::OnroadHud;
use crate::interaction::ParentSurface;
use crate::render::FrameBuffer;
use crate::scene::PointF;
use crate::topics::TopicMessage;

/// Inputs delivered to the UI thread.
#[derive(Clone, Debug, PartialEq)]
pub enum UiEvent {
    Topic(TopicMessage),
    /// All messages of the current bus frame have been delivered.
    FrameBoundary,
    Press(PointF),
    Transition { onroad: bool },
    Quit,
}

/// Receives each painted frame.
pub trait Presenter {
    fn present(&mut self, frame: &FrameBuffer);
}

/// Loop counters, mostly for tests and the simulator summary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub events: u64,
    pub ticks: u64,
    pub paints: u64,
}

pub struct EventLoop<P: Presenter> {
    hud: OnroadHud,
    events: Receiver<UiEvent>,
    presenter: P,
    parent: Option<Box<dyn ParentSurface>>,
    stats: LoopStats,
}

impl<P: Presenter> EventLoop<P> {
    pub fn new(hud: OnroadHud, events: Receiver<UiEvent>, presenter: P) -> Self {
        Self { hud, events, presenter, parent: None, stats: LoopStats::default() }
    }

    /// Forward unconsumed presses to `parent`.
    pub fn with_parent(mut self, parent: Box<dyn ParentSurface>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Run until [`UiEvent::Quit`] or until every sender is gone.
    pub fn run(&mut self) -> LoopStats {
        while self.step() {}
        debug!(stats = ?self.stats, "event loop finished");
        self.stats
    }

    /// One iteration. Returns `false` when the loop should stop.
    pub fn step(&mut self) -> bool {
        let keep_going = match self.events.recv_deadline(self.hud.deadline()) {
            Ok(event) => self.handle(event),
            Err(RecvTimeoutError::Timeout) => true,
            Err(RecvTimeoutError::Disconnected) => false,
        };

        let now = Instant::now();
        if self.hud.tick(now) {
            self.stats.ticks += 1;
        }
        if keep_going && self.hud.needs_repaint() {
            self.paint(now);
        }
        keep_going
    }

    fn handle(&mut self, event: UiEvent) -> bool {
        self.stats.events += 1;
        let now = Instant::now();
        match event {
            UiEvent::Topic(msg) => self.hud.apply(msg),
            UiEvent::FrameBoundary => self.hud.update_state(now),
            UiEvent::Press(pos) => {
                let parent = self.parent.as_deref_mut().map(|p| p as &mut dyn ParentSurface);
                let outcome = self.hud.mouse_press(pos, now, parent);
                trace!(?outcome, x = pos.x, y = pos.y, "press");
            }
            UiEvent::Transition { onroad } => self.hud.set_onroad(onroad),
            UiEvent::Quit => return false,
        }
        true
    }

    fn paint(&mut self, now: Instant) {
        if let Some(scene) = self.hud.paint(now) {
            let frame = self.hud.rasterize(&scene);
            self.presenter.present(&frame);
            self.stats.paints += 1;
        }
    }

    #[inline]
    pub const fn hud(&self) -> &OnroadHud {
        &self.hud
    }

    #[inline]
    pub const fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn into_parts(self) -> (OnroadHud, P) {
        (self.hud, self.presenter)
    }
}
