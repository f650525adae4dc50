//! Turn-signal sweep animation.
//!
//! Each engaged side slides a 360×480 image horizontally by 300 px per
//! animation step, the left one mirrored. An occupied blind spot freezes the
//! sweep at its start position and swaps in the dedicated blocked image.

use crate::assets::{AssetId, SIGNAL_HEIGHT, SIGNAL_IMAGES, SIGNAL_WIDTH};
use crate::scene::{DrawOp, ImageOp, Layer, PointF, Scene};
use crate::state::DisplayState;

const STEP_PX: f32 = 300.0;
const EDGE_OVERHANG: f32 = 75.0;
const BASE_Y_OFFSET: f32 = 300.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Image for one side at animation step `index`.
pub fn signal_image(index: usize, blindspot: bool) -> AssetId {
    if blindspot { AssetId::SignalBlocked } else { AssetId::Signal((index % usize::from(SIGNAL_IMAGES)) as u8) }
}

/// Top-left corner of one side's image.
pub fn signal_origin(side: Side, index: usize, blindspot: bool, width: f32, height: f32) -> PointF {
    let step = if blindspot { 0.0 } else { index as f32 };
    let y = (height - SIGNAL_HEIGHT as f32) / 2.0 + BASE_Y_OFFSET;
    let x = match side {
        Side::Left => EDGE_OVERHANG + width - SIGNAL_WIDTH as f32 - STEP_PX * step,
        Side::Right => -EDGE_OVERHANG + STEP_PX * step,
    };
    PointF::new(x, y)
}

pub fn draw_signals(scene: &mut Scene, ds: &DisplayState, index: usize, width: f32, height: f32) {
    let sides = [
        (Side::Left, ds.turn_signal_left, ds.blindspot_left),
        (Side::Right, ds.turn_signal_right, ds.blindspot_right),
    ];
    for (side, active, blindspot) in sides {
        if !active {
            continue;
        }
        let origin = signal_origin(side, index, blindspot, width, height);
        let center = PointF::new(origin.x + SIGNAL_WIDTH as f32 / 2.0, origin.y + SIGNAL_HEIGHT as f32 / 2.0);
        scene.push(Layer::TurnSignals, DrawOp::Image(ImageOp {
            size: Some((SIGNAL_WIDTH, SIGNAL_HEIGHT)),
            mirror: side == Side::Left,
            ..ImageOp::new(signal_image(index, blindspot), center)
        }));
    }
}
