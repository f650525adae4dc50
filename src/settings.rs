//! Settings-panel model.
//!
//! Two reusable pieces behind the device settings panel:
//!
//! - [`ParamStepper`]: an increment/decrement control for one integer
//!   setting, configured with its key, range, step and label formatter.
//!   One instance per setting; no per-setting code.
//! - [`ToggleTree`]: which widgets depend on which boolean parent setting.
//!   [`ToggleTree::refresh`] recomputes every dependent's visibility in one
//!   pass instead of each toggle hiding its children from a callback.

use std::collections::BTreeMap;

use tracing::warn;

use crate::params::{ParamError, ParamStore};

// =============================================================================
// Parameter Stepper
// =============================================================================

/// Label formatter for a stepper value.
pub type Formatter = fn(i32) -> String;

#[derive(Clone, Copy, Debug)]
pub struct ParamStepper {
    pub key: &'static str,
    pub min: i32,
    pub max: i32,
    pub step: i32,
    pub format: Formatter,
}

impl ParamStepper {
    /// Current value, clamped; unset or unparsable values read as `min`.
    pub fn value(&self, store: &dyn ParamStore) -> i32 {
        store.get_int(self.key).unwrap_or(self.min).clamp(self.min, self.max)
    }

    pub fn label(&self, store: &dyn ParamStore) -> String {
        (self.format)(self.value(store))
    }

    /// Step up (`increase`) or down, clamp, write back and return the label.
    pub fn adjust(&self, store: &dyn ParamStore, increase: bool) -> Result<String, ParamError> {
        let delta = if increase { self.step } else { -self.step };
        let next = self.value(store).saturating_add(delta).clamp(self.min, self.max);
        store.put_int(self.key, next)?;
        Ok((self.format)(next))
    }
}

fn brightness_label(v: i32) -> String {
    match v {
        0 => "Screen Off".to_string(),
        101 => "Auto".to_string(),
        n => format!("{n}%"),
    }
}

/// Screen brightness: off, 1..=100 percent, or auto.
pub const SCREEN_BRIGHTNESS: ParamStepper =
    ParamStepper { key: "ScreenBrightness", min: 0, max: 101, step: 1, format: brightness_label };

// =============================================================================
// Toggle Dependencies
// =============================================================================

/// Opaque handle of a settings widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WidgetId(pub u32);

#[derive(Clone, Debug, Default)]
pub struct ToggleTree {
    dependents: BTreeMap<&'static str, Vec<WidgetId>>,
    visible: BTreeMap<WidgetId, bool>,
}

impl ToggleTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `child` only while `parent_key` is on.
    pub fn add(&mut self, parent_key: &'static str, child: WidgetId) {
        self.dependents.entry(parent_key).or_default().push(child);
        self.visible.entry(child).or_insert(false);
    }

    pub fn dependents(&self, parent_key: &str) -> &[WidgetId] {
        self.dependents.get(parent_key).map_or(&[], Vec::as_slice)
    }

    /// Recompute visibility from the store. Returns the widgets that changed.
    pub fn refresh(&mut self, store: &dyn ParamStore) -> Vec<WidgetId> {
        let mut changed = Vec::new();
        for (key, children) in &self.dependents {
            let on = store.get_bool(key);
            for child in children {
                let slot = self.visible.entry(*child).or_insert(false);
                if *slot != on {
                    *slot = on;
                    changed.push(*child);
                }
            }
        }
        changed
    }

    /// Flip a parent toggle and refresh its dependents.
    pub fn toggle(&mut self, store: &dyn ParamStore, parent_key: &'static str) -> Vec<WidgetId> {
        let next = !store.get_bool(parent_key);
        if let Err(err) = store.put(parent_key, if next { "1" } else { "0" }) {
            warn!(%err, key = parent_key, "failed to store toggle");
        }
        self.refresh(store)
    }

    pub fn is_visible(&self, child: WidgetId) -> bool {
        self.visible.get(&child).copied().unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{MemoryParams, keys};

    // -------------------------------------------------------------------------
    // Stepper
    // -------------------------------------------------------------------------

    #[test]
    fn test_brightness_labels() {
        let store = MemoryParams::new();
        assert_eq!(SCREEN_BRIGHTNESS.label(&store), "Screen Off", "Unset reads as min");
        store.put_int("ScreenBrightness", 100).expect("writable");
        assert_eq!(SCREEN_BRIGHTNESS.adjust(&store, true).expect("write"), "Auto");
        assert_eq!(SCREEN_BRIGHTNESS.adjust(&store, true).expect("write"), "Auto", "Clamped at max");
        assert_eq!(SCREEN_BRIGHTNESS.adjust(&store, false).expect("write"), "100%");
    }

    #[test]
    fn test_stepper_clamps_at_min() {
        let store = MemoryParams::new();
        assert_eq!(SCREEN_BRIGHTNESS.adjust(&store, false).expect("write"), "Screen Off");
        assert_eq!(store.get_int("ScreenBrightness"), Some(0));
    }

    #[test]
    fn test_stepper_custom_range() {
        let store = MemoryParams::new();
        let stepper = ParamStepper { key: "Offset", min: -10, max: 10, step: 5, format: |v| format!("{v} mph") };
        assert_eq!(stepper.adjust(&store, false).expect("write"), "-10 mph");
        assert_eq!(stepper.adjust(&store, true).expect("write"), "-5 mph");
    }

    #[test]
    fn test_stepper_write_failure_propagates() {
        let store = MemoryParams::read_only(std::collections::HashMap::new());
        assert!(SCREEN_BRIGHTNESS.adjust(&store, true).is_err());
    }

    // -------------------------------------------------------------------------
    // Toggle Tree
    // -------------------------------------------------------------------------

    #[test]
    fn test_children_follow_parent() {
        let store = MemoryParams::new();
        let mut tree = ToggleTree::new();
        tree.add(keys::FIRE_THE_BABYSITTER, WidgetId(1));
        tree.add(keys::FIRE_THE_BABYSITTER, WidgetId(2));
        tree.add(keys::COMPASS, WidgetId(3));

        assert!(tree.refresh(&store).is_empty(), "All start hidden");
        let changed = tree.toggle(&store, keys::FIRE_THE_BABYSITTER);
        assert_eq!(changed, vec![WidgetId(1), WidgetId(2)]);
        assert!(tree.is_visible(WidgetId(1)));
        assert!(!tree.is_visible(WidgetId(3)));

        tree.toggle(&store, keys::FIRE_THE_BABYSITTER);
        assert!(!tree.is_visible(WidgetId(2)));
    }

    #[test]
    fn test_unknown_widget_visible() {
        assert!(ToggleTree::new().is_visible(WidgetId(99)));
        assert!(ToggleTree::new().dependents("Nope").is_empty());
    }
}
