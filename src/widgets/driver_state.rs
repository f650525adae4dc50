//! Driver-monitoring icon: face base image, keypoint outline, tracking arcs.

use crate::assets::AssetId;
use crate::colors::{Rgba, black};
use crate::driver::FacePose;
use crate::layout::driver_icon_center;
use crate::scene::{DrawOp, Layer, PointF, RectF, Scene, Stroke};
use crate::state::DisplayState;

use super::primitives::draw_icon;

const ARC_LEN: f32 = 133.0;
const ARC_WIDTH: f32 = 6.7;
const ARC_WIDTH_EXTEND: f32 = 12.0;
const OUTLINE_WIDTH: f32 = 5.2;

/// Arc tint: gray when not engaged, green when engaged; fades with the monitor.
pub fn arc_color(engaged: bool, dm_fade: f32) -> Rgba {
    let e = if engaged { 1.0 } else { 0.0 };
    Rgba::from_rgb_f(0.545 - 0.445 * e, 0.545 + 0.4 * e, 0.545 - 0.285 * e, 0.4 * (1.0 - dm_fade.clamp(0.0, 1.0)))
}

/// Outline in view pixels; depth pulls points outward.
pub fn projected_outline(pose: &FacePose, center: PointF) -> Vec<PointF> {
    pose.kpts
        .iter()
        .map(|&[x, y, z]| {
            let kp = (z - 8.0) / 120.0 + 1.0;
            PointF::new(x.mul_add(kp, center.x), y.mul_add(kp, center.y))
        })
        .collect()
}

pub fn draw_driver_state(scene: &mut Scene, ds: &DisplayState, pose: &FacePose, width: f32, height: f32) {
    let c = driver_icon_center(width, height, ds.rhd);
    let opacity = if ds.dm_active { 0.65 } else { 0.2 };
    draw_icon(scene, Layer::DriverState, AssetId::DriverFace, c, black(70), opacity);

    scene.push(Layer::DriverState, DrawOp::Polyline {
        points: projected_outline(pose, c),
        stroke: Stroke::new(Rgba::from_rgb_f(1.0, 1.0, 1.0, opacity), OUTLINE_WIDTH),
    });

    let color = arc_color(ds.engaged, ds.dm_fade);
    let [sin_pitch, sin_yaw, _] = pose.sins;
    let [diff_pitch, diff_yaw, _] = pose.diffs;

    // Yaw arc: horizontal extent follows the head turn.
    let dx = -sin_yaw * ARC_LEN / 2.0;
    scene.push(Layer::DriverState, DrawOp::Arc {
        rect: RectF::new((c.x + dx).min(c.x), c.y - ARC_LEN / 2.0, dx.abs(), ARC_LEN),
        start_deg: if sin_yaw > 0.0 { 90.0 } else { -90.0 },
        sweep_deg: 180.0,
        stroke: Stroke::new(color, ARC_WIDTH + ARC_WIDTH_EXTEND * (diff_yaw * 5.0).min(1.0)),
    });

    // Pitch arc: vertical extent follows the nod.
    let dy = -sin_pitch * ARC_LEN / 2.0;
    scene.push(Layer::DriverState, DrawOp::Arc {
        rect: RectF::new(c.x - ARC_LEN / 2.0, (c.y + dy).min(c.y), ARC_LEN, dy.abs()),
        start_deg: if sin_pitch > 0.0 { 0.0 } else { 180.0 },
        sweep_deg: 180.0,
        stroke: Stroke::new(color, ARC_WIDTH + ARC_WIDTH_EXTEND * (diff_pitch * 5.0).min(1.0)),
    });
}
