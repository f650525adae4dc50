//! Pointer handling for the onroad surface.
//!
//! The only control on the HUD is the personality button. A press within
//! `BTN_SIZE × 1.25` (Manhattan distance) of its center cycles the profile
//! and writes it back to the store; everything else is optionally handed to
//! the parent surface.
//!
//! The router keeps the layout facts it needs for hit-testing as its own
//! fields, refreshed from each [`DisplayState`], so a press never has to look
//! at anything but the router and the press position.

use tracing::{info, warn};

use crate::config::{BTN_SIZE, HIT_RADIUS_FACTOR};
use crate::layout::personality_center;
use crate::params::{ParamStore, keys};
use crate::personality::Personality;
use crate::scene::{PointF, RectF};
use crate::state::DisplayState;

/// Receives presses the HUD did not consume.
pub trait ParentSurface {
    /// `pos` is in window coordinates.
    fn on_press(&mut self, pos: PointF);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PressOutcome {
    PersonalityChanged(Personality),
    Forwarded,
    Ignored,
}

#[derive(Clone, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct InteractionRouter {
    forward_unhandled: bool,
    right_hand: bool,
    mute_dm: bool,
    button_enabled: bool,
    personality: Personality,
}

impl InteractionRouter {
    /// `forward_unhandled` is fixed for the router's lifetime.
    pub const fn new(forward_unhandled: bool) -> Self {
        Self {
            forward_unhandled,
            right_hand: false,
            mute_dm: false,
            button_enabled: false,
            personality: Personality::Standard,
        }
    }

    /// Refresh layout facts after a state update.
    pub fn update_layout(&mut self, ds: &DisplayState) {
        self.right_hand = ds.rhd;
        self.mute_dm = ds.flags.mute_dm;
        self.button_enabled = ds.flags.personality_button;
        self.personality = ds.personality;
    }

    #[inline]
    pub const fn forwards_unhandled(&self) -> bool {
        self.forward_unhandled
    }

    /// Personality button center in window coordinates.
    pub fn button_center(&self, hud: RectF) -> PointF {
        let c = personality_center(hud.w, hud.h, self.right_hand, self.mute_dm);
        PointF::new(hud.x + c.x, hud.y + c.y)
    }

    /// Whether `pos` (window coordinates) lands on the personality button.
    pub fn hit(&self, pos: PointF, hud: RectF) -> bool {
        let c = self.button_center(hud);
        let dist = (pos.x - c.x).abs() + (pos.y - c.y).abs();
        self.button_enabled && dist <= BTN_SIZE as f32 * HIT_RADIUS_FACTOR
    }

    pub fn on_press(
        &mut self,
        pos: PointF,
        hud: RectF,
        store: &dyn ParamStore,
        parent: Option<&mut dyn ParentSurface>,
    ) -> PressOutcome {
        if self.hit(pos, hud) {
            let next = self.personality.next();
            if let Err(err) = store.put_int(keys::LONGITUDINAL_PERSONALITY, next.index()) {
                warn!(%err, "failed to store driving personality");
            }
            info!(from = self.personality.label(), to = next.label(), "driving personality changed");
            self.personality = next;
            return PressOutcome::PersonalityChanged(next);
        }

        match parent {
            Some(parent) if self.forward_unhandled => {
                parent.on_press(pos);
                PressOutcome::Forwarded
            }
            _ => PressOutcome::Ignored,
        }
    }
}

impl Default for InteractionRouter {
    fn default() -> Self {
        Self::new(true)
    }
}
