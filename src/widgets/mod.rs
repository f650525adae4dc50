//! HUD widgets.
//!
//! Each submodule draws one visual element into a [`Scene`](crate::scene::Scene)
//! in view-local coordinates:
//!
//! - [`speed`]: header gradient, set-speed box, limit sign, current speed
//! - [`road`]: lane lines, road edges, driving path, blind-spot areas
//! - [`lead`]: lead-vehicle chevrons
//! - [`driver_state`]: driver-monitor face and tracking arcs
//! - [`compass`]: bearing rings, labels and ticks
//! - [`signals`]: turn-signal sweep
//! - [`personality`]: driving-personality badge
//! - [`wheel`]: engage button and rotating wheel
//! - [`status_bar`]: bottom status strip
//! - [`alerts`]: alert banner
//! - [`primitives`]: shared low-level helpers
//!
//! # Architecture
//!
//! Widgets are plain functions of `(scene, state, view size)`. They hold no
//! state of their own; anything time-dependent (animation index, badge
//! opacity, driver pose) is passed in by the compositor. Visibility gating
//! that depends on *other* widgets (compass and badge yielding to the signal
//! sweep) lives in the compositor, not here.

mod alerts;
mod compass;
mod driver_state;
mod lead;
mod personality;
mod primitives;
mod road;
mod signals;
mod speed;
mod status_bar;
mod wheel;

pub use alerts::{alert_color, alert_rect, draw_alert};
pub use compass::{cardinal_lit, draw_compass, nearest_tick};
pub use driver_state::{arc_color, draw_driver_state, projected_outline};
pub use lead::{Chevron, chevron, chevron_alpha, draw_lead};
pub use personality::draw_personality;
pub use primitives::{circle_rect, draw_icon, draw_text, fill_polygon, stroke_circle};
pub use road::{draw_road, lane_line_color, path_edge_gradient, path_gradient, road_edge_color};
pub use signals::{Side, draw_signals, signal_image, signal_origin};
pub use speed::{
    SetSpeedBox,
    draw_current_speed,
    draw_header_gradient,
    draw_set_speed,
    draw_speed_limit,
    set_speed_box,
    set_speed_colors,
};
pub use status_bar::{draw_status_bar, status_bar_rect};
pub use wheel::{draw_engage_button, draw_rotating_wheel, wheel_background, wheel_image};
