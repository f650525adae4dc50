// Crate-level lints: pixel math casts between f32/i32/u32 all over the widgets
#![allow(clippy::cast_possible_truncation)] // f32 -> i32 for pixel coordinates
#![allow(clippy::cast_precision_loss)] // u32/i32 -> f32 in layout math
#![allow(clippy::cast_possible_wrap)] // u32 -> i32 within screen ranges
#![allow(clippy::cast_sign_loss)] // clamped f32 -> u8/u32 channels and sizes
#![allow(clippy::struct_excessive_bools)] // DisplayState and feature flags are plain bools

//! Onroad HUD engine.
//!
//! Turns a stream of vehicle/perception topics into composed HUD frames:
//!
//! ```text
//! Topics ──► StateSync ──► DisplayState ──► Compositor ──► Scene ──► Rasterizer ──► FrameBuffer
//!                              ▲                ▲
//!               AnimationClock ┘   AlertPresenter┘
//! ```
//!
//! | Module | Role |
//! |--------|------|
//! | [`topics`] | latest value, freshness and receive frame per inbound topic |
//! | [`state`], [`driver`], [`params`] | per-frame [`state::DisplayState`] derivation |
//! | [`animations`] | signal sweep, badge fade, driver-monitor fade, border color |
//! | [`compositor`], [`widgets`], [`layout`], [`scene`] | fixed draw order into a display list |
//! | [`alerts`] | alert derivation and the equality-gated presenter |
//! | [`interaction`] | personality button hit-testing and write-back |
//! | [`render`], [`styles`], [`assets`] | rasterizing scenes into pixels |
//! | [`camera`] | frame slot, camera worker, paint gate, stream choice |
//! | [`profiling`] | fps filter, debug topic, event log |
//! | [`hud`], [`event_loop`] | the onroad surface and its single-threaded loop |
//! | [`settings`] | settings-panel stepper and toggle dependencies |

pub mod alerts;
pub mod animations;
pub mod assets;
pub mod camera;
pub mod colors;
pub mod compositor;
pub mod config;
pub mod driver;
pub mod event_loop;
pub mod hud;
pub mod interaction;
pub mod layout;
pub mod params;
pub mod personality;
pub mod profiling;
pub mod render;
pub mod scene;
pub mod settings;
pub mod state;
pub mod styles;
pub mod topics;
pub mod widgets;

pub use event_loop::{EventLoop, Presenter, UiEvent};
pub use hud::{HudConfig, OnroadHud};
