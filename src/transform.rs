//! Coordinate-convention transform between the sensing frame and REP-103.
//!
//! The source convention is the AR camera frame: right-handed, camera
//! facing -Z, X right, Y up. The target convention is forward/left/up.
//! The mapping is a fixed domain constant, not derived:
//!
//! ```text
//! target X = -source Z
//! target Y = -source X
//! target Z =  source Y
//! ```
//!
//! On top of the permutation, emitted orientations carry two calibration
//! constants validated against a reference pose consumer: a 90-degree
//! correction rotation about the normalized (1,1,1) axis, and a sign flip
//! of the quaternion x and y components at emission. Neither is re-derived
//! here; both are pinned by regression tests.

use crate::geometry::{Mat3, Mat4, Quaternion, Vec3};

/// Axis permutation as a rotation matrix (determinant +1).
const AXIS_PERMUTATION: Mat3 = Mat3 {
    m: [[0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
};

/// Map a vector from the source convention to the target convention.
#[inline]
pub fn permute_vec(v: &Vec3) -> Vec3 {
    Vec3::new(-v.z, -v.x, v.y)
}

/// The fixed global correction quaternion: 90 degrees about normalized
/// (1,1,1). Calibration constant; do not re-derive.
pub fn correction_quaternion() -> Quaternion {
    Quaternion::from_axis_angle(Vec3::new(1.0, 1.0, 1.0), std::f64::consts::FRAC_PI_2)
}

/// Camera pose converted to the target convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetPose {
    pub translation: Vec3,
    pub orientation: Quaternion,
}

/// Convert a camera-to-world pose from the source convention.
///
/// The rotation block is conjugated by the axis permutation so an identity
/// pose maps to an identity rotation, then the correction quaternion is
/// applied on the left and the result normalized.
pub fn pose_to_target(pose: &Mat4) -> TargetPose {
    let translation = permute_vec(&pose.translation());

    let permuted = AXIS_PERMUTATION
        .mul(&pose.rotation())
        .mul(&AXIS_PERMUTATION.transpose());
    let q = Quaternion::from_rotation_matrix(&permuted);
    let orientation = correction_quaternion().mul(&q).normalized();

    TargetPose {
        translation,
        orientation,
    }
}

/// Orientation as actually transmitted: x and y components negated.
///
/// Empirically tuned compatibility constant with no derivation; validate
/// against a reference consumer rather than changing it.
#[inline]
pub fn emitted_orientation(q: &Quaternion) -> Quaternion {
    Quaternion::new(q.w, -q.x, -q.y, q.z)
}

/// Finite-difference linear velocity state.
///
/// Process-lifetime, single instance owned by the orchestrator; not reset
/// across reconnects. The first sample always yields zero velocity.
#[derive(Debug, Default)]
pub struct VelocityState {
    last_position: Option<Vec3>,
    last_timestamp: Option<f64>,
}

impl VelocityState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Linear velocity in the target convention from the current
    /// source-convention position and source timestamp.
    ///
    /// Returns zero when there is no prior sample or `dt <= 0` (clock
    /// discontinuity guard); state is updated either way.
    pub fn linear_velocity(&mut self, position: Vec3, t: f64) -> Vec3 {
        let velocity = match (self.last_position, self.last_timestamp) {
            (Some(last_pos), Some(last_t)) => {
                let dt = t - last_t;
                if dt > 0.0 {
                    permute_vec(&position.sub(&last_pos)).scale(1.0 / dt)
                } else {
                    log::debug!("Non-positive dt ({:.6}s), holding zero velocity", dt);
                    Vec3::ZERO
                }
            }
            _ => Vec3::ZERO,
        };

        self.last_position = Some(position);
        self.last_timestamp = Some(t);
        velocity
    }
}

/// Angular rate mapped into the target convention.
///
/// The rate vector arrives out-of-band (not derived from pose deltas) and
/// goes through the same fixed permutation as positions.
#[inline]
pub fn angular_velocity(rate: [f64; 3]) -> Vec3 {
    permute_vec(&Vec3::new(rate[0], rate[1], rate[2]))
}
