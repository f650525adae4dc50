//! Alert presenter.
//!
//! # States
//!
//! ```text
//!            update(a != current)            clear()
//!   Idle ─────────────────────────▶ Small/Mid/Full ─────────▶ Idle
//!     ▲                                  │  ▲
//!     └──────── update(size=None) ───────┘  └── update(a != current)
//! ```
//!
//! The presenter only compares and stores; the banner itself is drawn by
//! [`crate::widgets::draw_alert`]. An update equal to what is on screen
//! reports "no change" so the caller can skip the repaint.
//!
//! # Controls Timeout
//!
//! [`Alert::from_topics`] substitutes local alerts when the controls topic
//! goes quiet after the startup grace period:
//!
//! | Condition | Size | Text |
//! |-----------|------|------|
//! | never received since start | Mid | openpilot Unavailable |
//! | silent > 5 s, enabled, < 15 s | Full, critical | TAKE CONTROL IMMEDIATELY |
//! | silent > 5 s otherwise | Mid | Controls Unresponsive |

use tracing::debug;

use crate::config::{CONTROLS_STARTUP_FRAMES, CONTROLS_TIMEOUT_SECS, UI_FREQ};
use crate::topics::{AlertSize, AlertStatus, Topics};

/// Seconds of silence after the timeout during which an enabled system
/// demands immediate takeover.
const TAKEOVER_WINDOW_SECS: u64 = 10;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Alert {
    pub text1: String,
    pub text2: String,
    pub alert_type: String,
    pub size: AlertSize,
    pub status: AlertStatus,
}

impl Alert {
    pub fn new(text1: &str, text2: &str, alert_type: &str, size: AlertSize, status: AlertStatus) -> Self {
        Self { text1: text1.into(), text2: text2.into(), alert_type: alert_type.into(), size, status }
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.size != AlertSize::None
    }

    /// Alert to show on the current bus frame.
    pub fn from_topics(topics: &Topics, started_frame: u64) -> Self {
        let frame = topics.frame();
        let slot = &topics.controls_state;
        let controls_frame = slot.rcv_frame();

        let mut alert = Self::default();
        // Alerts from a previous drive are never shown.
        if controls_frame >= started_frame {
            let cs = slot.value();
            alert = Self {
                text1: cs.alert_text1.clone(),
                text2: cs.alert_text2.clone(),
                alert_type: cs.alert_type.clone(),
                size: cs.alert_size,
                status: cs.alert_status,
            };
        }

        if slot.updated(frame) || frame.saturating_sub(started_frame) <= CONTROLS_STARTUP_FRAMES {
            return alert;
        }

        if !slot.seen() || controls_frame < started_frame {
            return Self::new(
                "openpilot Unavailable",
                "Waiting for controls to start",
                "controlsWaiting",
                AlertSize::Mid,
                AlertStatus::Normal,
            );
        }

        let missing_secs = frame.saturating_sub(controls_frame) / UI_FREQ;
        if missing_secs > CONTROLS_TIMEOUT_SECS {
            if slot.value().enabled && missing_secs - CONTROLS_TIMEOUT_SECS < TAKEOVER_WINDOW_SECS {
                return Self::new(
                    "TAKE CONTROL IMMEDIATELY",
                    "Controls Unresponsive",
                    "controlsUnresponsive",
                    AlertSize::Full,
                    AlertStatus::Critical,
                );
            }
            return Self::new(
                "Controls Unresponsive",
                "Reboot Device",
                "controlsUnresponsivePermanent",
                AlertSize::Mid,
                AlertStatus::Normal,
            );
        }
        alert
    }
}

#[derive(Clone, Debug, Default)]
pub struct AlertPresenter {
    current: Alert,
}

impl AlertPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the shown alert. Returns `true` if a repaint is needed.
    pub fn update(&mut self, alert: Alert) -> bool {
        if self.current == alert {
            return false;
        }
        debug!(size = ?alert.size, status = ?alert.status, alert_type = %alert.alert_type, "alert changed");
        self.current = alert;
        true
    }

    /// Drop back to idle, e.g. on the transition to offroad.
    pub fn clear(&mut self) -> bool {
        self.update(Alert::default())
    }

    #[inline]
    pub const fn current(&self) -> &Alert {
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topics::{ControlsState, TopicMessage};

    fn controls_alert(text: &str, enabled: bool) -> TopicMessage {
        TopicMessage::ControlsState(ControlsState {
            enabled,
            alert_text1: text.into(),
            alert_size: AlertSize::Small,
            ..ControlsState::default()
        })
    }

    fn advance(topics: &mut Topics, frames: u64) {
        for _ in 0..frames {
            topics.advance_frame();
        }
    }

    // -------------------------------------------------------------------------
    // Presenter
    // -------------------------------------------------------------------------

    #[test]
    fn test_identical_alert_no_repaint() {
        let mut p = AlertPresenter::new();
        let a = Alert::new("Steer", "", "steer", AlertSize::Small, AlertStatus::UserPrompt);
        assert!(p.update(a.clone()), "First alert repaints");
        assert!(!p.update(a), "Same alert must not repaint");
    }

    #[test]
    fn test_changed_text_repaints() {
        let mut p = AlertPresenter::new();
        p.update(Alert::new("A", "", "", AlertSize::Mid, AlertStatus::Normal));
        assert!(p.update(Alert::new("B", "", "", AlertSize::Mid, AlertStatus::Normal)));
    }

    #[test]
    fn test_clear_returns_to_idle() {
        let mut p = AlertPresenter::new();
        assert!(!p.clear(), "Already idle");
        p.update(Alert::new("A", "", "", AlertSize::Full, AlertStatus::Critical));
        assert!(p.clear());
        assert!(!p.current().is_visible());
    }

    // -------------------------------------------------------------------------
    // Derivation
    // -------------------------------------------------------------------------

    #[test]
    fn test_fresh_controls_alert_passes_through() {
        let mut topics = Topics::new();
        advance(&mut topics, 200);
        topics.apply(controls_alert("Hello", true));
        let a = Alert::from_topics(&topics, 0);
        assert_eq!(a.text1, "Hello");
        assert_eq!(a.size, AlertSize::Small);
    }

    #[test]
    fn test_old_drive_alert_ignored() {
        let mut topics = Topics::new();
        topics.advance_frame();
        topics.apply(controls_alert("Stale", true));
        advance(&mut topics, 5);
        assert_eq!(Alert::from_topics(&topics, 3), Alert::default(), "Within startup grace, no alert");
    }

    #[test]
    fn test_waiting_for_controls() {
        let mut topics = Topics::new();
        advance(&mut topics, 10 + CONTROLS_STARTUP_FRAMES + 1);
        let a = Alert::from_topics(&topics, 10);
        assert_eq!(a.alert_type, "controlsWaiting");
        assert_eq!(a.size, AlertSize::Mid);
    }

    #[test]
    fn test_unresponsive_while_enabled_is_critical() {
        let mut topics = Topics::new();
        advance(&mut topics, 150);
        topics.apply(controls_alert("", true));
        advance(&mut topics, 7 * UI_FREQ);
        let a = Alert::from_topics(&topics, 1);
        assert_eq!(a.size, AlertSize::Full);
        assert_eq!(a.status, AlertStatus::Critical);
        assert_eq!(a.text1, "TAKE CONTROL IMMEDIATELY");
    }

    #[test]
    fn test_unresponsive_long_or_disabled_is_mid() {
        let mut topics = Topics::new();
        advance(&mut topics, 150);
        topics.apply(controls_alert("", true));
        advance(&mut topics, 20 * UI_FREQ);
        assert_eq!(Alert::from_topics(&topics, 1).alert_type, "controlsUnresponsivePermanent");

        let mut topics = Topics::new();
        advance(&mut topics, 150);
        topics.apply(controls_alert("", false));
        advance(&mut topics, 7 * UI_FREQ);
        assert_eq!(Alert::from_topics(&topics, 1).alert_type, "controlsUnresponsivePermanent");
    }

    #[test]
    fn test_brief_gap_keeps_controls_alert() {
        let mut topics = Topics::new();
        advance(&mut topics, 150);
        topics.apply(controls_alert("Keep", true));
        advance(&mut topics, 2 * UI_FREQ);
        assert_eq!(Alert::from_topics(&topics, 1).text1, "Keep");
    }
}
