//! Configuration store access.
//!
//! Feature flags and preferences live in an external key-value store. The HUD
//! only needs typed reads plus one write path (advancing the personality), so
//! the store is abstracted behind [`ParamStore`]. Writes are fire-and-forget:
//! callers log a failed write and carry on, and nothing assumes a write is
//! visible before the next read.
//!
//! [`HudSettings`] is the typed snapshot taken on every state update.

use std::collections::HashMap;

use parking_lot::RwLock;
use thiserror::Error;

use crate::personality::Personality;

/// Store keys read by the HUD.
pub mod keys {
    pub const IS_METRIC: &str = "IsMetric";
    pub const COMPASS: &str = "Compass";
    pub const ROTATING_WHEEL: &str = "RotatingWheel";
    pub const FROG_COLORS: &str = "FrogColors";
    pub const FROG_SIGNALS: &str = "FrogSignals";
    pub const FIRE_THE_BABYSITTER: &str = "FireTheBabysitter";
    pub const MUTE_DM: &str = "MuteDM";
    pub const PERSONALITIES_UI_WHEEL: &str = "DrivingPersonalitiesUIWheel";
    pub const LONGITUDINAL_PERSONALITY: &str = "LongitudinalPersonality";
    pub const STEERING_WHEEL: &str = "SteeringWheel";
    pub const SHOW_STATUS_BAR: &str = "ShowStatusBar";
    pub const WIDE_CAMERA_DISABLE: &str = "WideCameraDisable";
    pub const MAP_ON_LEFT: &str = "NavSettingLeftSide";
}

#[derive(Debug, Error)]
pub enum ParamError {
    #[error("parameter store is read-only, dropped write to {0}")]
    ReadOnly(String),
    #[error("invalid parameter file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unsupported value for {key}: {value}")]
    Unsupported { key: String, value: String },
}

// =============================================================================
// Store Trait
// =============================================================================

/// External key-value configuration store.
pub trait ParamStore: Send + Sync {
    /// Raw string value, `None` when unset.
    fn get(&self, key: &str) -> Option<String>;

    /// Store a raw string value.
    fn put(&self, key: &str, value: &str) -> Result<(), ParamError>;

    /// `"1"` / `"true"` read as true, anything else (or unset) as false.
    fn get_bool(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| matches!(v.trim(), "1" | "true"))
    }

    fn get_int(&self, key: &str) -> Option<i32> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }

    fn put_int(&self, key: &str, value: i32) -> Result<(), ParamError> {
        self.put(key, &value.to_string())
    }
}

// =============================================================================
// In-memory Store
// =============================================================================

/// Process-local store, optionally rejecting writes.
#[derive(Debug, Default)]
pub struct MemoryParams {
    values: RwLock<HashMap<String, String>>,
    read_only: bool,
}

impl MemoryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects every write.
    pub fn read_only(values: HashMap<String, String>) -> Self {
        Self { values: RwLock::new(values), read_only: true }
    }

    /// Seed from a flat TOML table: `Compass = true`, `SteeringWheel = 3`, ...
    pub fn from_toml(src: &str) -> Result<Self, ParamError> {
        let table: toml::Table = toml::from_str(src)?;
        let mut values = HashMap::with_capacity(table.len());
        for (key, value) in table {
            let raw = match value {
                toml::Value::Boolean(b) => if b { "1" } else { "0" }.to_string(),
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::String(s) => s,
                other => return Err(ParamError::Unsupported { key, value: other.to_string() }),
            };
            values.insert(key, raw);
        }
        Ok(Self { values: RwLock::new(values), read_only: false })
    }

    /// Convenience setter for seeding flags.
    pub fn set_bool(&self, key: &str, value: bool) {
        self.values.write().insert(key.to_string(), if value { "1" } else { "0" }.to_string());
    }
}

impl ParamStore for MemoryParams {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) -> Result<(), ParamError> {
        if self.read_only {
            return Err(ParamError::ReadOnly(key.to_string()));
        }
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// =============================================================================
// Settings Snapshot
// =============================================================================

/// Typed view of every setting the HUD reads.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct HudSettings {
    pub is_metric: bool,
    pub compass: bool,
    pub rotating_wheel: bool,
    pub frog_colors: bool,
    pub frog_signals: bool,
    /// Driver-monitor icon muted (requires the babysitter override).
    pub mute_dm: bool,
    pub personalities_ui_wheel: bool,
    pub personality: Personality,
    /// Selected wheel icon, `0..WHEEL_VARIANTS`.
    pub steering_wheel: u8,
    pub show_status_bar: bool,
    pub wide_camera_disabled: bool,
    pub map_on_left: bool,
}

impl HudSettings {
    pub fn load(store: &dyn ParamStore) -> Self {
        let wheel = store.get_int(keys::STEERING_WHEEL).unwrap_or(0);
        Self {
            is_metric: store.get_bool(keys::IS_METRIC),
            compass: store.get_bool(keys::COMPASS),
            rotating_wheel: store.get_bool(keys::ROTATING_WHEEL),
            frog_colors: store.get_bool(keys::FROG_COLORS),
            frog_signals: store.get_bool(keys::FROG_SIGNALS),
            mute_dm: store.get_bool(keys::FIRE_THE_BABYSITTER) && store.get_bool(keys::MUTE_DM),
            personalities_ui_wheel: store.get_bool(keys::PERSONALITIES_UI_WHEEL),
            personality: Personality::from_index(
                store.get_int(keys::LONGITUDINAL_PERSONALITY).unwrap_or(Personality::Standard.index()),
            ),
            steering_wheel: wheel.clamp(0, i32::from(crate::assets::WHEEL_VARIANTS) - 1) as u8,
            show_status_bar: store.get(keys::SHOW_STATUS_BAR).is_none() || store.get_bool(keys::SHOW_STATUS_BAR),
            wide_camera_disabled: store.get_bool(keys::WIDE_CAMERA_DISABLE),
            map_on_left: store.get_bool(keys::MAP_ON_LEFT),
        }
    }
}

impl Default for HudSettings {
    fn default() -> Self {
        Self::load(&MemoryParams::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_store() {
        let s = HudSettings::default();
        assert!(!s.is_metric);
        assert!(!s.compass);
        assert!(s.show_status_bar, "Status bar defaults on");
        assert_eq!(s.personality, Personality::Standard);
        assert_eq!(s.steering_wheel, 0);
    }

    #[test]
    fn test_mute_dm_requires_babysitter() {
        let store = MemoryParams::new();
        store.set_bool(keys::MUTE_DM, true);
        assert!(!HudSettings::load(&store).mute_dm, "MuteDM alone has no effect");
        store.set_bool(keys::FIRE_THE_BABYSITTER, true);
        assert!(HudSettings::load(&store).mute_dm);
    }

    #[test]
    fn test_from_toml_types() {
        let store = MemoryParams::from_toml("Compass = true\nSteeringWheel = 3\nLongitudinalPersonality = \"2\"\n")
            .expect("valid toml");
        let s = HudSettings::load(&store);
        assert!(s.compass);
        assert_eq!(s.steering_wheel, 3);
        assert_eq!(s.personality, Personality::Relaxed);
    }

    #[test]
    fn test_from_toml_rejects_tables() {
        let err = MemoryParams::from_toml("[nested]\nx = 1\n").unwrap_err();
        assert!(matches!(err, ParamError::Unsupported { .. }));
    }

    #[test]
    fn test_read_only_store_rejects_put() {
        let store = MemoryParams::read_only(HashMap::new());
        assert!(store.put_int(keys::LONGITUDINAL_PERSONALITY, 1).is_err());
        assert_eq!(store.get_int(keys::LONGITUDINAL_PERSONALITY), None);
    }

    #[test]
    fn test_wheel_index_clamped() {
        let store = MemoryParams::new();
        store.put_int(keys::STEERING_WHEEL, 42).expect("writable");
        assert_eq!(HudSettings::load(&store).steering_wheel, 4);
    }
}
