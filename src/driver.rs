//! Driver head-pose tracking for the driver-state overlay.
//!
//! Raw face orientation from the driver camera is noisy, so each axis is
//! low-pass filtered before it drives the overlay. The filtered angles rotate
//! a fixed 3D face outline; the projected points are drawn as a polyline and
//! the per-axis deltas widen the tracking arcs while the head moves.
//!
//! As the driver-monitor fade approaches 1 the rotation shrinks to zero and
//! the outline flattens back to the neutral depth, so a fading icon relaxes
//! into the default face instead of freezing mid-turn.

/// Number of points in the face outline (closed loop, first == last).
pub const FACE_KPTS: usize = 33;

/// Neutral face outline in icon-centered pixels, z is depth.
pub const DEFAULT_FACE_KPTS_3D: [[f32; 3]; FACE_KPTS] = [
    [-5.98, -51.20, 8.00],
    [-17.64, -49.14, 8.00],
    [-23.81, -46.40, 8.00],
    [-29.98, -40.91, 8.00],
    [-32.04, -37.49, 8.00],
    [-34.10, -32.00, 8.00],
    [-36.16, -21.03, 8.00],
    [-36.16, 6.40, 8.00],
    [-35.47, 10.51, 8.00],
    [-32.73, 19.43, 8.00],
    [-29.30, 26.29, 8.00],
    [-24.50, 33.83, 8.00],
    [-19.01, 41.37, 8.00],
    [-14.21, 46.17, 8.00],
    [-12.16, 47.54, 8.00],
    [-4.61, 49.60, 8.00],
    [4.99, 49.60, 8.00],
    [12.53, 47.54, 8.00],
    [14.59, 46.17, 8.00],
    [19.39, 41.37, 8.00],
    [24.87, 33.83, 8.00],
    [29.67, 26.29, 8.00],
    [33.10, 19.43, 8.00],
    [35.84, 10.51, 8.00],
    [36.53, 6.40, 8.00],
    [36.53, -21.03, 8.00],
    [34.47, -32.00, 8.00],
    [32.42, -37.49, 8.00],
    [30.36, -40.91, 8.00],
    [24.19, -46.40, 8.00],
    [18.02, -49.14, 8.00],
    [6.36, -51.20, 8.00],
    [-5.98, -51.20, 8.00],
];

/// Weight of the new sample in the pose low-pass filter.
const POSE_SMOOTHING: f32 = 0.8;

/// Filtered head pose ready for drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct FacePose {
    /// `sin` of the filtered pitch, yaw, roll (scaled by `1 - fade`).
    pub sins: [f32; 3],
    /// Absolute change of each axis in the last update.
    pub diffs: [f32; 3],
    /// Rotated outline; z blended toward the neutral depth by the fade.
    pub kpts: [[f32; 3]; FACE_KPTS],
}

impl Default for FacePose {
    fn default() -> Self {
        Self { sins: [0.0; 3], diffs: [0.0; 3], kpts: DEFAULT_FACE_KPTS_3D }
    }
}

/// Per-axis head-pose filter.
#[derive(Clone, Debug, Default)]
pub struct DriverPoseTracker {
    vals: [f32; 3],
    pose: FacePose,
}

impl DriverPoseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one orientation sample (pitch, yaw, roll in radians) and project.
    pub fn update(&mut self, orientation: [f32; 3], dm_fade: f32) -> &FacePose {
        self.filter(orientation);
        self.project(dm_fade)
    }

    /// Advance the low-pass filter by one sample without reprojecting.
    pub fn filter(&mut self, orientation: [f32; 3]) {
        for i in 0..3 {
            let o = orientation[i];
            // Pitch is scaled asymmetrically: looking down reads weaker than up.
            let gain = match i {
                0 if o < 0.0 => 0.7,
                0 => 0.9,
                _ => 0.4,
            };
            let v_this = gain * o;
            self.pose.diffs[i] = (self.vals[i] - v_this).abs();
            self.vals[i] = POSE_SMOOTHING.mul_add(v_this, (1.0 - POSE_SMOOTHING) * self.vals[i]);
        }
    }

    /// Rotate the face outline by the filtered pose, faded by `dm_fade`.
    pub fn project(&mut self, dm_fade: f32) -> &FacePose {
        let fade = dm_fade.clamp(0.0, 1.0);
        let mut coss = [1.0f32; 3];
        for i in 0..3 {
            let angle = self.vals[i] * (1.0 - fade);
            self.pose.sins[i] = angle.sin();
            coss[i] = angle.cos();
        }

        let [sin_y, sin_x, sin_z] = self.pose.sins;
        let [cos_y, cos_x, cos_z] = coss;
        let r = [
            [cos_x * cos_z, cos_x * sin_z, -sin_x],
            [-sin_y * sin_x * cos_z - cos_y * sin_z, -sin_y * sin_x * sin_z + cos_y * cos_z, -sin_y * cos_x],
            [cos_y * sin_x * cos_z - sin_y * sin_z, cos_y * sin_x * sin_z + sin_y * cos_z, cos_y * cos_x],
        ];

        for (out, p) in self.pose.kpts.iter_mut().zip(DEFAULT_FACE_KPTS_3D.iter()) {
            let rot = |row: [f32; 3]| row[0] * p[0] + row[1] * p[1] + row[2] * p[2];
            let z = rot(r[2]);
            *out = [rot(r[0]), rot(r[1]), z * (1.0 - fade) + 8.0 * fade];
        }

        &self.pose
    }

    #[inline]
    pub const fn pose(&self) -> &FacePose {
        &self.pose
    }
}
