// Crate-level lints: the synthetic drive is all float <-> int pixel math
#![allow(clippy::cast_possible_truncation)] // f32 -> u8/u32 for pattern pixels
#![allow(clippy::cast_precision_loss)] // frame counters -> f32 time
#![allow(clippy::cast_sign_loss)] // clamped f32 -> u8 channels

//! Onroad HUD simulator.
//!
//! Drives an [`OnroadHud`] from a synthetic message bus and a test-pattern
//! camera, and writes painted frames as PNG snapshots (or shows them in an
//! SDL window with the `window` feature).
//!
//! # Threads
//!
//! | Thread | Role |
//! |--------|------|
//! | main | [`EventLoop`]: state updates, ticks, paints |
//! | `bus` | publishes one bus frame of topics every `1 / fps` seconds |
//! | `camera` | [`CameraWorker`] pushing test-pattern frames |
//!
//! # Scenario File
//!
//! Optional TOML with a `[params]` table seeding the configuration store and
//! a `[drive]` table shaping the synthetic drive:
//!
//! ```toml
//! [params]
//! IsMetric = true
//! Compass = true
//!
//! [drive]
//! max_speed = 25.0
//! blinker_from = 60
//! blinker_to = 120
//! ```
//!
//! Logging goes to stderr through `RUST_LOG` (default `info`).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use std::{fs, io};

use clap::Parser;
use crossbeam_channel::{Receiver, Sender};
use embedded_graphics::pixelcolor::Rgb888;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use onroad_hud::assets::{AssetCatalog, AssetId, Sprite};
use onroad_hud::camera::{CameraFrame, CameraWorker, FrameSource, StreamKind};
use onroad_hud::colors::{Rgba, WHITE};
use onroad_hud::config::{IMG_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH, UI_FREQ};
use onroad_hud::event_loop::LoopStats;
use onroad_hud::interaction::ParentSurface;
use onroad_hud::layout::{SurfaceOptions, ViewLayout, personality_center};
use onroad_hud::params::{MemoryParams, ParamError, keys};
use onroad_hud::profiling::UiDebug;
use onroad_hud::render::FrameBuffer;
use onroad_hud::scene::PointF;
use onroad_hud::topics::{
    AlertSize, AlertStatus, CarParams, CarState, ControlsState, DriverMonitoringState, DriverStateV2, LeadData,
    LiveCalibration, LiveLocation, ModelGeometry, NavInstruction, OpenpilotState, RadarState, SpeedLimitSign,
    TopicMessage, UiPlan,
};
use onroad_hud::{EventLoop, HudConfig, OnroadHud, Presenter, UiEvent};

#[derive(Parser, Debug)]
#[command(name = "hud-sim", about = "Drive the onroad HUD from a synthetic message bus")]
struct Args {
    /// Bus frames to simulate
    #[arg(long, default_value_t = 200)]
    frames: u64,

    /// Directory for PNG snapshots
    #[arg(long, default_value = "frames")]
    output: PathBuf,

    /// Write every Nth painted frame
    #[arg(long, default_value_t = 20)]
    snapshot_every: u64,

    /// Image asset directory; simple placeholder shapes when omitted
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Scenario TOML with [params] and [drive] tables
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Bus frames per second
    #[arg(long, default_value_t = UI_FREQ as u32)]
    fps: u32,

    #[arg(long, default_value_t = SCREEN_WIDTH)]
    width: u32,

    #[arg(long, default_value_t = SCREEN_HEIGHT)]
    height: u32,

    /// Show frames in an SDL window instead of writing snapshots
    #[cfg(feature = "window")]
    #[arg(long)]
    window: bool,
}

#[derive(Debug, Error)]
enum SimError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("bad scenario file: {0}")]
    Scenario(#[from] toml::de::Error),
    #[error("bad params table: {0}")]
    Params(#[from] ParamError),
    #[error("cannot create {}: {source}", path.display())]
    Output { path: PathBuf, source: io::Error },
    #[error("failed to start {name} thread: {source}")]
    Spawn { name: &'static str, source: io::Error },
}

// =============================================================================
// Scenario
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Scenario {
    params: toml::Table,
    drive: Drive,
}

/// Shape of the synthetic drive. Frame numbers are bus frames.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
struct Drive {
    /// Peak of the speed oscillation, m/s.
    max_speed: f32,
    cruise_kph: f32,
    speed_limit_mps: f32,
    vienna_sign: bool,
    blinker_from: u64,
    blinker_to: u64,
    /// Blind spot occupied from this frame while the blinker is on.
    blindspot_from: u64,
    alert_from: u64,
    alert_to: u64,
    /// Frame at which the personality button is pressed.
    press_at: u64,
    /// Stop publishing controls from this frame on.
    controls_lost_at: Option<u64>,
}

impl Default for Drive {
    fn default() -> Self {
        Self {
            max_speed: 30.0,
            cruise_kph: 100.0,
            speed_limit_mps: 24.6,
            vienna_sign: false,
            blinker_from: 60,
            blinker_to: 100,
            blindspot_from: 80,
            alert_from: 120,
            alert_to: 150,
            press_at: 40,
            controls_lost_at: None,
        }
    }
}

fn load_scenario(path: Option<&Path>) -> Result<Scenario, SimError> {
    let Some(path) = path else {
        return Ok(Scenario::default());
    };
    let src = fs::read_to_string(path).map_err(|source| SimError::Read { path: path.to_path_buf(), source })?;
    Ok(toml::from_str(&src)?)
}

/// Scenario params on top of a demo-friendly default set.
fn params_for(scenario: &Scenario) -> Result<MemoryParams, SimError> {
    let store = MemoryParams::from_toml(&scenario.params.to_string())?;
    for key in [keys::COMPASS, keys::ROTATING_WHEEL, keys::FROG_SIGNALS, keys::PERSONALITIES_UI_WHEEL] {
        if !scenario.params.contains_key(key) {
            store.set_bool(key, true);
        }
    }
    Ok(store)
}

// =============================================================================
// Main
// =============================================================================

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        error!(%err, "simulation failed");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), SimError> {
    let scenario = load_scenario(args.scenario.as_deref())?;
    let store = Arc::new(params_for(&scenario)?);
    let assets = match &args.assets {
        Some(dir) => AssetCatalog::load_dir(dir),
        None => placeholder_assets(),
    };

    let config = HudConfig {
        width: args.width,
        height: args.height,
        options: SurfaceOptions::from_env(),
        ..HudConfig::default()
    };
    let (debug_tx, debug_rx) = crossbeam_channel::bounded::<UiDebug>(1024);
    let hud = OnroadHud::new(config.clone(), store, assets, Instant::now()).with_debug_sink(Box::new(debug_tx));

    let interval = Duration::from_secs_f32(1.0 / args.fps.max(1) as f32);
    let _road_camera = CameraWorker::spawn(Box::new(TestPattern::default()), hud.road_frames(), interval)
        .map_err(|source| SimError::Spawn { name: "camera", source })?;
    let _wide_camera = if config.options.dual_camera_view {
        let slot = hud.extra_frames();
        slot.request_stream(StreamKind::WideRoad);
        Some(
            CameraWorker::spawn(Box::new(TestPattern::default()), slot, interval)
                .map_err(|source| SimError::Spawn { name: "camera", source })?,
        )
    } else {
        None
    };

    let layout = ViewLayout::split(config.width, config.height, config.options, false);
    let hud_rect = layout.hud();
    let c = personality_center(hud_rect.w, hud_rect.h, false, false);
    let bus = BusFeed {
        drive: scenario.drive,
        frames: args.frames,
        interval,
        view: (hud_rect.w, hud_rect.h),
        button: PointF::new(hud_rect.x + c.x, hud_rect.y + c.y),
    };

    let (tx, rx) = crossbeam_channel::unbounded();
    let bus_thread = bus.spawn(tx.clone()).map_err(|source| SimError::Spawn { name: "bus", source })?;

    #[cfg(feature = "window")]
    let (hud, stats) = if args.window {
        drive_loop(hud, rx, window::WindowPresenter::new(config.width, config.height, tx))
    } else {
        drop(tx);
        drive_loop(hud, rx, SnapshotWriter::create(&args.output, args.snapshot_every)?)
    };
    #[cfg(not(feature = "window"))]
    let (hud, stats) = {
        drop(tx);
        drive_loop(hud, rx, SnapshotWriter::create(&args.output, args.snapshot_every)?)
    };

    if bus_thread.join().is_err() {
        warn!("bus thread panicked");
    }
    summarize(&hud, stats, &debug_rx);
    Ok(())
}

fn drive_loop<P: Presenter>(hud: OnroadHud, rx: Receiver<UiEvent>, presenter: P) -> (OnroadHud, LoopStats) {
    let mut ev = EventLoop::new(hud, rx, presenter).with_parent(Box::new(SidePanel));
    let stats = ev.run();
    let (hud, _) = ev.into_parts();
    (hud, stats)
}

fn summarize(hud: &OnroadHud, stats: LoopStats, debug_rx: &Receiver<UiDebug>) {
    let timings: Vec<f32> = debug_rx.try_iter().map(|d| d.draw_time_millis).collect();
    let avg = if timings.is_empty() { 0.0 } else { timings.iter().sum::<f32>() / timings.len() as f32 };
    let monitor = hud.monitor();
    info!(
        events = stats.events,
        ticks = stats.ticks,
        paints = stats.paints,
        fps = monitor.fps(),
        slow_frames = monitor.slow_frames,
        compose_avg_ms = avg,
        compose_max_ms = monitor.draw_time_max.as_secs_f32() * 1000.0,
        "simulation finished"
    );
    for line in hud.debug_log().iter() {
        info!("  {line}");
    }
}

/// Parent surface stand-in: presses outside the button would open the side panel.
struct SidePanel;

impl ParentSurface for SidePanel {
    fn on_press(&mut self, pos: PointF) {
        info!(x = pos.x, y = pos.y, "press forwarded to side panel");
    }
}

// =============================================================================
// Presenters
// =============================================================================

/// Writes every Nth painted frame as a PNG.
struct SnapshotWriter {
    dir: PathBuf,
    every: u64,
    painted: u64,
    written: u64,
    failed: u64,
}

impl SnapshotWriter {
    fn create(dir: &Path, every: u64) -> Result<Self, SimError> {
        fs::create_dir_all(dir).map_err(|source| SimError::Output { path: dir.to_path_buf(), source })?;
        Ok(Self { dir: dir.to_path_buf(), every: every.max(1), painted: 0, written: 0, failed: 0 })
    }
}

impl Presenter for SnapshotWriter {
    fn present(&mut self, frame: &FrameBuffer) {
        self.painted += 1;
        if (self.painted - 1) % self.every != 0 {
            return;
        }
        let path = self.dir.join(format!("frame_{:05}.png", self.painted));
        match frame.save_png(&path) {
            Ok(()) => {
                self.written += 1;
                debug!(path = %path.display(), "snapshot written");
            }
            Err(err) => {
                self.failed += 1;
                warn!(%err, path = %path.display(), "failed to write snapshot");
            }
        }
    }
}

impl Drop for SnapshotWriter {
    fn drop(&mut self) {
        info!(dir = %self.dir.display(), written = self.written, failed = self.failed, "snapshots");
    }
}

#[cfg(feature = "window")]
mod window {
    use crossbeam_channel::Sender;
    use embedded_graphics::pixelcolor::Rgb888;
    use embedded_graphics::prelude::*;
    use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};
    use onroad_hud::render::FrameBuffer;
    use onroad_hud::scene::PointF;
    use onroad_hud::{Presenter, UiEvent};

    /// SDL window; window events go back into the loop as [`UiEvent`]s.
    pub struct WindowPresenter {
        display: SimulatorDisplay<Rgb888>,
        window: Window,
        events: Sender<UiEvent>,
    }

    impl WindowPresenter {
        pub fn new(width: u32, height: u32, events: Sender<UiEvent>) -> Self {
            let display = SimulatorDisplay::new(Size::new(width, height));
            let output_settings = OutputSettingsBuilder::new().scale(1).build();
            let window = Window::new("Onroad HUD Sim", &output_settings);
            Self { display, window, events }
        }
    }

    impl Presenter for WindowPresenter {
        fn present(&mut self, frame: &FrameBuffer) {
            self.display.draw_iter(frame.pixels()).ok();
            self.window.update(&self.display);
            for ev in self.window.events() {
                let sent = match ev {
                    SimulatorEvent::Quit => self.events.send(UiEvent::Quit),
                    SimulatorEvent::MouseButtonDown { point, .. } => {
                        self.events.send(UiEvent::Press(PointF::new(point.x as f32, point.y as f32)))
                    }
                    _ => Ok(()),
                };
                sent.ok();
            }
        }
    }
}

// =============================================================================
// Synthetic Bus
// =============================================================================

struct BusFeed {
    drive: Drive,
    frames: u64,
    interval: Duration,
    /// HUD view size, for projecting road geometry.
    view: (f32, f32),
    /// Personality button center in window coordinates.
    button: PointF,
}

impl BusFeed {
    fn spawn(self, tx: Sender<UiEvent>) -> io::Result<JoinHandle<()>> {
        thread::Builder::new().name("bus".into()).spawn(move || {
            if tx.send(UiEvent::Transition { onroad: true }).is_err() {
                return;
            }
            for f in 0..self.frames {
                let frame_start = Instant::now();
                let mut events: Vec<UiEvent> = self.messages(f).into_iter().map(UiEvent::Topic).collect();
                if f == self.drive.press_at {
                    events.push(UiEvent::Press(self.button));
                }
                events.push(UiEvent::FrameBoundary);
                if events.into_iter().any(|ev| tx.send(ev).is_err()) {
                    debug!(frame = f, "event loop gone, bus stopping");
                    return;
                }
                if let Some(rest) = self.interval.checked_sub(frame_start.elapsed()) {
                    thread::sleep(rest);
                }
            }
            tx.send(UiEvent::Transition { onroad: false }).ok();
            tx.send(UiEvent::Quit).ok();
        })
    }

    /// All topics published on bus frame `f`.
    fn messages(&self, f: u64) -> Vec<TopicMessage> {
        let d = &self.drive;
        let t = f as f32 / UI_FREQ as f32;
        let v_ego = fake_signal(t, 0.0, d.max_speed, 0.15);
        let blinker = (d.blinker_from..d.blinker_to).contains(&f);

        let mut msgs = vec![
            TopicMessage::CarState(CarState {
                v_ego,
                v_ego_cluster: v_ego,
                left_blinker: blinker,
                left_blindspot: blinker && f >= d.blindspot_from,
                steering_angle_deg: fake_signal(t, -45.0, 45.0, 0.4),
                ..CarState::default()
            }),
            TopicMessage::NavInstruction(NavInstruction {
                valid: true,
                speed_limit: d.speed_limit_mps,
                speed_limit_sign: if d.vienna_sign { SpeedLimitSign::Vienna } else { SpeedLimitSign::Mutcd },
            }),
            TopicMessage::RadarState(RadarState {
                lead_one: LeadData {
                    status: true,
                    d_rel: fake_signal(t, 8.0, 60.0, 0.3),
                    v_rel: fake_signal(t + 5.0, -6.0, 3.0, 0.3),
                },
                lead_two: LeadData::default(),
            }),
            TopicMessage::DriverStateV2(DriverStateV2 {
                left_face_orientation: [fake_signal(t, -0.2, 0.2, 0.7), fake_signal(t, -0.4, 0.4, 0.5), 0.0],
                ..DriverStateV2::default()
            }),
            TopicMessage::DriverMonitoringState(DriverMonitoringState {
                is_active_mode: !(60..90).contains(&(f % 200)),
                ..DriverMonitoringState::default()
            }),
            TopicMessage::LiveCalibration(LiveCalibration { valid: true, wide_valid: true }),
            TopicMessage::LiveLocation(LiveLocation { bearing_deg: (t * 12.0) % 360.0 }),
        ];

        let (geometry, accel) = self.geometry(t);
        msgs.push(TopicMessage::ModelV2(geometry));
        msgs.push(TopicMessage::UiPlan(UiPlan { accel }));

        if d.controls_lost_at.is_none_or(|lost| f < lost) {
            let alert = (d.alert_from..d.alert_to).contains(&f);
            msgs.push(TopicMessage::ControlsState(ControlsState {
                v_cruise: d.cruise_kph,
                v_cruise_cluster: d.cruise_kph,
                enabled: f >= 20,
                engageable: true,
                state: if f >= 20 { OpenpilotState::Enabled } else { OpenpilotState::Disabled },
                experimental_mode: f >= 200,
                alert_text1: if alert { "Steering Temporarily Unavailable".into() } else { String::new() },
                alert_type: if alert { "steerTempUnavailable/warning".into() } else { String::new() },
                alert_size: if alert { AlertSize::Small } else { AlertSize::None },
                alert_status: if alert { AlertStatus::UserPrompt } else { AlertStatus::Normal },
                ..ControlsState::default()
            }));
        }
        if f == 0 {
            msgs.push(TopicMessage::CarParams(CarParams {
                openpilot_longitudinal_control: true,
                personality_via_ui: true,
            }));
        }
        msgs
    }

    /// Straight road in simple perspective, with a gentle sway.
    fn geometry(&self, t: f32) -> (ModelGeometry, Vec<f32>) {
        const POINTS: usize = 24;
        let (w, h) = self.view;
        let horizon = h * 0.45;
        let sway = fake_signal(t, -40.0, 40.0, 0.25);
        let project = |lateral: f32, s: f32| {
            let shrink = 1.0 - 0.92 * s;
            PointF::new(w / 2.0 + (lateral + sway * s) * shrink, h - s * (h - horizon))
        };
        let strip = |lateral: f32, half_width: f32| -> Vec<PointF> {
            let along = (0..POINTS).map(|i| i as f32 / (POINTS - 1) as f32);
            let mut pts: Vec<PointF> = along.clone().map(|s| project(lateral + half_width, s)).collect();
            pts.extend(along.rev().map(|s| project(lateral - half_width, s)));
            pts
        };

        let lane = w * 0.28;
        let geometry = ModelGeometry {
            lane_lines: [strip(-1.5 * lane, 6.0), strip(-0.5 * lane, 6.0), strip(0.5 * lane, 6.0), strip(1.5 * lane, 6.0)],
            lane_line_probs: [0.3, 0.9, 0.9, 0.3],
            road_edges: [strip(-1.9 * lane, 8.0), strip(1.9 * lane, 8.0)],
            road_edge_stds: [0.4, 0.6],
            track: strip(0.0, lane * 0.35),
            track_edge: strip(0.0, lane * 0.4),
            left_blindspot: strip(-lane, lane * 0.45),
            right_blindspot: strip(lane, lane * 0.45),
            lead_vertices: [project(0.0, 0.55), project(lane, 0.7)],
        };
        let accel = (0..POINTS).map(|i| fake_signal(t + i as f32 * 0.05, -2.0, 2.0, 0.35)).collect();
        (geometry, accel)
    }
}

/// Smooth oscillation between `min` and `max`.
fn fake_signal(t: f32, min: f32, max: f32, freq: f32) -> f32 {
    let normalized = (t * freq).sin().mul_add(0.5, 0.5);
    min + normalized * (max - min)
}

// =============================================================================
// Test Pattern Camera
// =============================================================================

const PATTERN_W: u32 = 320;
const PATTERN_H: u32 = 160;

/// Sky-over-asphalt frames with a drifting stripe so motion is visible.
#[derive(Debug, Default)]
struct TestPattern {
    frame_id: u64,
}

impl FrameSource for TestPattern {
    fn available_streams(&self) -> Vec<StreamKind> {
        vec![StreamKind::Road, StreamKind::WideRoad]
    }

    fn poll(&mut self, stream: StreamKind) -> Option<CameraFrame> {
        self.frame_id += 1;
        let tint = if stream == StreamKind::WideRoad { 30 } else { 0 };
        let stripe = (self.frame_id * 4 % u64::from(PATTERN_H)) as u32;
        let mut pixels = Vec::with_capacity((PATTERN_W * PATTERN_H) as usize);
        for y in 0..PATTERN_H {
            for _ in 0..PATTERN_W {
                let c = if y < PATTERN_H / 2 {
                    let k = (y * 120 / PATTERN_H) as u8;
                    Rgb888::new(90 + k, 120 + k, 160 + tint)
                } else if y.abs_diff(PATTERN_H / 2 + stripe / 2) < 2 {
                    Rgb888::new(110, 110, 110)
                } else {
                    Rgb888::new(50 + tint, 52, 55)
                };
                pixels.push(c);
            }
        }
        Some(CameraFrame { stream, frame_id: self.frame_id, width: PATTERN_W, height: PATTERN_H, pixels })
    }
}

// =============================================================================
// Placeholder Assets
// =============================================================================

/// Flat shapes standing in for the real artwork.
fn placeholder_assets() -> AssetCatalog {
    let mut catalog = AssetCatalog::empty();
    for id in AssetId::all() {
        let (w, h) = id.load_size().unwrap_or((IMG_SIZE, IMG_SIZE));
        let sprite = match id {
            AssetId::Signal(_) => arrow(w, h, Rgba::rgb(23, 134, 68)),
            AssetId::SignalBlocked => arrow(w, h, Rgba::rgb(201, 34, 49)),
            AssetId::Experimental => disc(w, h, Rgba::rgb(218, 111, 37)),
            _ => disc(w, h, WHITE),
        };
        if let Some(sprite) = sprite {
            catalog.insert(id, sprite);
        }
    }
    catalog
}

fn disc(w: u32, h: u32, color: Rgba) -> Option<Sprite> {
    let r = w.min(h) as f32 / 2.0;
    let pixels = (0..w * h)
        .map(|i| {
            let dx = (i % w) as f32 + 0.5 - w as f32 / 2.0;
            let dy = (i / w) as f32 + 0.5 - h as f32 / 2.0;
            if dx.hypot(dy) <= r { color } else { color.with_alpha(0) }
        })
        .collect();
    Sprite::from_pixels(w, h, pixels)
}

/// Right-pointing chevron filling the sprite.
fn arrow(w: u32, h: u32, color: Rgba) -> Option<Sprite> {
    let pixels = (0..w * h)
        .map(|i| {
            let x = (i % w) as f32 / w as f32;
            let y = ((i / w) as f32 / h as f32 - 0.5).abs() * 2.0;
            let edge = 1.0 - y;
            if x <= edge && x >= edge - 0.35 { color } else { color.with_alpha(0) }
        })
        .collect();
    Sprite::from_pixels(w, h, pixels)
}
