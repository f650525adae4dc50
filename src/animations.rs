//! Time-driven animation state.
//!
//! Everything here advances with time or with state updates, never with the
//! number of paint calls:
//! - **Signal sweep**: a frame index stepped by a fixed-period clock
//! - **Personality badge**: name/icon cross-fade restarted on profile change
//! - **Driver-monitor fade**: exponential smoothing of the active flag
//! - **Border color**: smooth transition toward the status color
//!
//! # Animation Clock
//!
//! The signal sweep has [`SIGNAL_TOTAL_FRAMES`] frames and the clock fires
//! every [`ANIMATION_PERIOD`] (8 × 11 ms). The clock reports a deadline that
//! the event loop waits on, so ticks keep coming while the bus is silent.
//! A late wake-up fires a single tick and re-anchors to `now`; missed ticks
//! are dropped rather than replayed in a burst.
//!
//! # Personality Fade
//!
//! ```text
//! elapsed:  0 ........ 3000 ........ 4000 ms
//! text:     1 ........ 1 ↘ .......... 0
//! icon:     0 ........ 0 ↗ .......... 1
//! ```

use std::time::{Duration, Instant};

use crate::colors::{Rgba, STATUS_DISENGAGED};
use crate::config::{
    ANIMATION_PERIOD, DM_FADE_GAIN, PERSONALITY_FADE_DURATION, PERSONALITY_TEXT_DURATION, SIGNAL_TOTAL_FRAMES,
};
use crate::personality::Personality;

// =============================================================================
// Signal Sweep
// =============================================================================

/// Frame index of the turn-signal sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SignalAnimation {
    index: usize,
}

impl SignalAnimation {
    pub const fn new() -> Self {
        Self { index: 0 }
    }

    /// Advance one frame, wrapping at [`SIGNAL_TOTAL_FRAMES`].
    #[inline]
    pub const fn tick(&mut self) {
        self.index = (self.index + 1) % SIGNAL_TOTAL_FRAMES;
    }

    #[inline]
    pub const fn index(&self) -> usize {
        self.index
    }
}

/// Fixed-period tick source.
#[derive(Clone, Copy, Debug)]
pub struct AnimationClock {
    period: Duration,
    next: Instant,
}

impl AnimationClock {
    /// Clock whose first tick is one period after `now`.
    pub fn new(now: Instant) -> Self {
        Self::with_period(now, ANIMATION_PERIOD)
    }

    pub fn with_period(now: Instant, period: Duration) -> Self {
        Self { period, next: now + period }
    }

    #[inline]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// When the next tick is due.
    #[inline]
    pub const fn deadline(&self) -> Instant {
        self.next
    }

    /// Consume a due tick. Returns `false` when the deadline has not passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.period;
        if self.next <= now {
            self.next = now + self.period;
        }
        true
    }
}

// =============================================================================
// Personality Badge Fade
// =============================================================================

/// Text/icon opacity pair for the personality badge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BadgeOpacity {
    pub text: f32,
    pub icon: f32,
}

/// Restart-on-change timer for the personality badge.
#[derive(Clone, Copy, Debug, Default)]
pub struct PersonalityFade {
    last: Option<Personality>,
    changed_at: Option<Instant>,
}

impl PersonalityFade {
    pub const fn new() -> Self {
        Self { last: None, changed_at: None }
    }

    /// Record the current profile; restarts the timer when it differs from
    /// the last one seen. The first observation counts as a change.
    pub fn observe(&mut self, profile: Personality, now: Instant) -> bool {
        if self.last == Some(profile) {
            return false;
        }
        self.last = Some(profile);
        self.changed_at = Some(now);
        true
    }

    /// Whether the name is still in its fully-visible phase.
    pub fn showing_text(&self, now: Instant) -> bool {
        self.changed_at.is_some_and(|t| now.saturating_duration_since(t) < PERSONALITY_TEXT_DURATION)
    }

    pub fn opacity(&self, now: Instant) -> BadgeOpacity {
        let Some(changed_at) = self.changed_at else {
            return BadgeOpacity { text: 0.0, icon: 1.0 };
        };
        let elapsed = now.saturating_duration_since(changed_at).as_secs_f32() * 1000.0;
        let text_ms = PERSONALITY_TEXT_DURATION.as_secs_f32() * 1000.0;
        let fade_ms = PERSONALITY_FADE_DURATION.as_secs_f32() * 1000.0;
        let progress = (elapsed - text_ms) / fade_ms;
        BadgeOpacity { text: (1.0 - progress).clamp(0.0, 1.0), icon: progress.clamp(0.0, 1.0) }
    }
}

// =============================================================================
// Driver-monitor Fade
// =============================================================================

/// Smoothed driver-monitor visibility. 0 = fully shown (active), 1 = faded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DmFade {
    value: f32,
}

impl DmFade {
    /// Starts fully faded until monitoring reports active.
    pub const fn new() -> Self {
        Self { value: 1.0 }
    }

    /// One smoothing step toward 0 (active) or 1 (inactive).
    pub fn step(&mut self, active: bool) -> f32 {
        let active = if active { 1.0 } else { 0.0 };
        self.value = DM_FADE_GAIN.mul_add(0.5 - active, self.value).clamp(0.0, 1.0);
        self.value
    }

    #[inline]
    pub const fn value(&self) -> f32 {
        self.value
    }
}

impl Default for DmFade {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Border Color Transition
// =============================================================================

/// Speed of border color interpolation per paint (0.0-1.0).
const COLOR_LERP_SPEED: f32 = 0.15;

/// Per-channel distance below which the color snaps to its target.
const COLOR_SNAP_THRESHOLD: i32 = 2;

/// Smooth transition of the status border toward a target color.
#[derive(Clone, Copy, Debug)]
pub struct BorderTransition {
    current: Rgba,
    target: Rgba,
    transitioning: bool,
}

impl BorderTransition {
    pub const fn new() -> Self {
        Self { current: STATUS_DISENGAGED, target: STATUS_DISENGAGED, transitioning: false }
    }

    /// Set a new target. Returns `true` if a transition was started.
    pub fn set_target(&mut self, target: Rgba) -> bool {
        if self.target == target {
            false
        } else {
            self.target = target;
            self.transitioning = true;
            true
        }
    }

    #[inline]
    pub const fn current(&self) -> Rgba {
        self.current
    }

    #[inline]
    pub const fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    /// Advance one step. Returns `true` if the color changed.
    pub fn update(&mut self) -> bool {
        if !self.transitioning {
            return false;
        }
        if self.current == self.target {
            self.transitioning = false;
            return false;
        }

        let next = step_rgba(self.current, self.target, COLOR_LERP_SPEED);
        if close_enough(next, self.target) {
            self.current = self.target;
            self.transitioning = false;
        } else {
            self.current = next;
        }
        true
    }
}

impl Default for BorderTransition {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-point step toward `to`, at least one unit per non-equal channel so
/// the transition can never stall short of the snap threshold.
fn step_rgba(from: Rgba, to: Rgba, t: f32) -> Rgba {
    let t_fixed = (t * 256.0) as i32;
    let step = |a: u8, b: u8| -> u8 {
        let delta = i32::from(b) - i32::from(a);
        if delta == 0 || t_fixed == 0 {
            return a;
        }
        let mut s = (delta * t_fixed) >> 8;
        if s == 0 {
            s = delta.signum();
        }
        (i32::from(a) + s).clamp(0, 255) as u8
    };
    Rgba::new(step(from.r, to.r), step(from.g, to.g), step(from.b, to.b), step(from.a, to.a))
}

fn close_enough(a: Rgba, b: Rgba) -> bool {
    let d = |x: u8, y: u8| (i32::from(x) - i32::from(y)).abs();
    d(a.r, b.r) <= COLOR_SNAP_THRESHOLD
        && d(a.g, b.g) <= COLOR_SNAP_THRESHOLD
        && d(a.b, b.b) <= COLOR_SNAP_THRESHOLD
        && d(a.a, b.a) <= COLOR_SNAP_THRESHOLD
}

// =============================================================================
// Animation State
// =============================================================================

/// All animation state that persists across frames.
#[derive(Clone, Debug, Default)]
pub struct AnimationState {
    pub signal: SignalAnimation,
    pub personality: PersonalityFade,
    pub dm_fade: DmFade,
    pub border: BorderTransition,
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{STATUS_ENGAGED, STATUS_OVERRIDE};
    use proptest::prelude::*;

    // -------------------------------------------------------------------------
    // Signal Sweep
    // -------------------------------------------------------------------------

    #[test]
    fn test_signal_wraps() {
        let mut s = SignalAnimation::new();
        for _ in 0..SIGNAL_TOTAL_FRAMES {
            s.tick();
        }
        assert_eq!(s.index(), 0, "Full cycle must wrap to 0");
    }

    #[test]
    fn test_clock_not_due_before_period() {
        let t0 = Instant::now();
        let mut clock = AnimationClock::new(t0);
        assert!(!clock.poll(t0));
        assert!(!clock.poll(t0 + Duration::from_millis(87)));
        assert!(clock.poll(t0 + Duration::from_millis(88)));
    }

    #[test]
    fn test_clock_independent_of_poll_frequency() {
        // Polling every millisecond or every period yields the same tick count.
        let t0 = Instant::now();
        let mut fast = AnimationClock::new(t0);
        let mut slow = AnimationClock::new(t0);
        let mut fast_ticks = 0;
        let mut slow_ticks = 0;
        for ms in 0..=880u64 {
            if fast.poll(t0 + Duration::from_millis(ms)) {
                fast_ticks += 1;
            }
            if ms % 88 == 0 && slow.poll(t0 + Duration::from_millis(ms)) {
                slow_ticks += 1;
            }
        }
        assert_eq!(fast_ticks, 10);
        assert_eq!(slow_ticks, 10);
    }

    #[test]
    fn test_clock_late_wakeup_single_tick() {
        let t0 = Instant::now();
        let mut clock = AnimationClock::new(t0);
        let late = t0 + Duration::from_millis(1000);
        assert!(clock.poll(late));
        assert!(!clock.poll(late), "Missed ticks are not replayed");
        assert_eq!(clock.deadline(), late + ANIMATION_PERIOD);
    }

    // -------------------------------------------------------------------------
    // Personality Fade
    // -------------------------------------------------------------------------

    #[test]
    fn test_personality_fade_endpoints() {
        let t0 = Instant::now();
        let mut fade = PersonalityFade::new();
        assert!(fade.observe(Personality::Standard, t0));
        assert_eq!(fade.opacity(t0), BadgeOpacity { text: 1.0, icon: 0.0 });
        assert!(fade.showing_text(t0));

        let done = t0 + PERSONALITY_TEXT_DURATION + PERSONALITY_FADE_DURATION;
        assert_eq!(fade.opacity(done), BadgeOpacity { text: 0.0, icon: 1.0 });
        assert!(!fade.showing_text(done));
    }

    #[test]
    fn test_personality_fade_midpoint() {
        let t0 = Instant::now();
        let mut fade = PersonalityFade::new();
        fade.observe(Personality::Relaxed, t0);
        let o = fade.opacity(t0 + Duration::from_millis(3500));
        assert!((o.text - 0.5).abs() < 1e-3, "text {}", o.text);
        assert!((o.icon - 0.5).abs() < 1e-3, "icon {}", o.icon);
    }

    #[test]
    fn test_personality_same_profile_keeps_timer() {
        let t0 = Instant::now();
        let mut fade = PersonalityFade::new();
        fade.observe(Personality::Standard, t0);
        let later = t0 + Duration::from_secs(10);
        assert!(!fade.observe(Personality::Standard, later));
        assert_eq!(fade.opacity(later).icon, 1.0);
        assert!(fade.observe(Personality::Aggressive, later), "Change restarts the timer");
        assert_eq!(fade.opacity(later).text, 1.0);
    }

    // -------------------------------------------------------------------------
    // Driver-monitor Fade
    // -------------------------------------------------------------------------

    #[test]
    fn test_dm_fade_steps() {
        let mut fade = DmFade::new();
        assert!((fade.step(true) - 0.9).abs() < 1e-6, "Active moves toward 0 by 0.1");
        assert!((fade.step(false) - 1.0).abs() < 1e-6, "Inactive moves toward 1 by 0.1");
        assert!((fade.step(false) - 1.0).abs() < 1e-6, "Clamped at 1");
    }

    // -------------------------------------------------------------------------
    // Border Transition
    // -------------------------------------------------------------------------

    #[test]
    fn test_border_reaches_target() {
        let mut border = BorderTransition::new();
        assert!(border.set_target(STATUS_ENGAGED));
        assert!(!border.set_target(STATUS_ENGAGED), "Same target does not restart");
        let mut steps = 0;
        while border.update() {
            steps += 1;
            assert!(steps < 200, "Transition stalled");
        }
        assert_eq!(border.current(), STATUS_ENGAGED);
        assert!(!border.is_transitioning());
    }

    #[test]
    fn test_step_rgba_minimum_step() {
        let from = Rgba::new(10, 10, 10, 10);
        let to = Rgba::new(11, 9, 10, 10);
        assert_eq!(step_rgba(from, to, COLOR_LERP_SPEED), Rgba::new(11, 9, 10, 10));
    }

    #[test]
    fn test_close_enough() {
        assert!(close_enough(STATUS_OVERRIDE, STATUS_OVERRIDE));
        assert!(!close_enough(STATUS_OVERRIDE, STATUS_ENGAGED));
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    proptest! {
        #[test]
        fn prop_signal_index_in_bounds(ticks in 0usize..10_000) {
            let mut s = SignalAnimation::new();
            for _ in 0..ticks {
                let before = s.index();
                s.tick();
                prop_assert_eq!(s.index(), (before + 1) % SIGNAL_TOTAL_FRAMES);
            }
            prop_assert!(s.index() < SIGNAL_TOTAL_FRAMES);
        }

        #[test]
        fn prop_dm_fade_stays_in_unit_range(flags in proptest::collection::vec(any::<bool>(), 0..200)) {
            let mut fade = DmFade::new();
            for active in flags {
                let before = fade.value();
                let after = fade.step(active);
                prop_assert!((0.0..=1.0).contains(&after));
                if active {
                    prop_assert!(after <= before);
                } else {
                    prop_assert!(after >= before);
                }
            }
        }

        #[test]
        fn prop_badge_opacity_monotonic(a in 0u64..6000, b in 0u64..6000) {
            let t0 = Instant::now();
            let mut fade = PersonalityFade::new();
            fade.observe(Personality::Aggressive, t0);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let o_lo = fade.opacity(t0 + Duration::from_millis(lo));
            let o_hi = fade.opacity(t0 + Duration::from_millis(hi));
            prop_assert!((0.0..=1.0).contains(&o_lo.text) && (0.0..=1.0).contains(&o_lo.icon));
            prop_assert!(o_hi.text <= o_lo.text);
            prop_assert!(o_hi.icon >= o_lo.icon);
        }
    }
}
