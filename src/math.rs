//! Coordinate conversion and quaternion helpers shared by the pose and skeleton paths.

use glam::{DQuat, DVec3, Mat3, Quat, Vec3};
use std::f32::consts::FRAC_1_SQRT_2;
use std::f64::consts::FRAC_1_SQRT_2 as FRAC_1_SQRT_2_F64;

pub const HALF_PI_X: Quat = Quat::from_xyzw(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);
pub const HALF_PI_Y: Quat = Quat::from_xyzw(0.0, FRAC_1_SQRT_2, 0.0, FRAC_1_SQRT_2);
pub const HALF_PI_Z: Quat = Quat::from_xyzw(0.0, 0.0, FRAC_1_SQRT_2, FRAC_1_SQRT_2);
/// -pi/4 about Y.
pub const NEG_QUARTER_PI_Y: Quat = Quat::from_xyzw(0.0, -0.382_683_43, 0.0, 0.923_879_5);

/// Flips the tracker's palm basis into the device's grip basis when the tracker is mounted on
/// the headset.
pub const REVERSE_ROTATION: DQuat =
    DQuat::from_xyzw(0.0, FRAC_1_SQRT_2_F64, -FRAC_1_SQRT_2_F64, 0.0);
pub const HALF_PI_Z_F64: DQuat = DQuat::from_xyzw(0.0, 0.0, FRAC_1_SQRT_2_F64, FRAC_1_SQRT_2_F64);
pub const NEG_HALF_PI_Z_F64: DQuat =
    DQuat::from_xyzw(0.0, 0.0, -FRAC_1_SQRT_2_F64, FRAC_1_SQRT_2_F64);

/// Shortest edge of a triangle the basis reconstruction accepts, in millimeters.
const MIN_BASIS_EDGE: f32 = 1e-3;

/// Headset mounted tracker axes into headset axes, millimeters into meters.
#[inline]
pub fn hmd_tracker_to_meters(v: Vec3) -> DVec3 {
    DVec3::new(-v.x as f64, -v.z as f64, -v.y as f64) * 0.001
}

/// Desk mounted tracker axes already match, only the unit changes.
#[inline]
pub fn desktop_tracker_to_meters(v: Vec3) -> DVec3 {
    v.as_dvec3() * 0.001
}

/// Tracker millimeters into the skeleton's joint frame.
#[inline]
pub fn skeleton_tracker_to_meters(v: Vec3) -> Vec3 {
    Vec3::new(-v.x, -v.y, v.z) * 0.001
}

/// Maps `value` from [min, max] onto [0, 1], clamping outside the range.
/// A reversed range (min > max) yields a decreasing mapping.
#[inline]
pub fn normalize_range(value: f32, min: f32, max: f32) -> f32 {
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

/// Normalizes `q`, substituting identity for degenerate or non-finite input.
#[inline]
pub fn unit_quat(q: Quat) -> Quat {
    let length = q.length();
    if q.is_finite() && length > 1e-6 {
        q / length
    } else {
        Quat::IDENTITY
    }
}

#[inline]
pub fn unit_dquat(q: DQuat) -> DQuat {
    let length = q.length();
    if q.is_finite() && length > 1e-9 {
        q / length
    } else {
        DQuat::IDENTITY
    }
}

/// Rebuilds an orthonormal hand basis from the knuckle joints and the wrist:
/// y runs across the middle and ring knuckles, z from the wrist out towards the fingers,
/// x is the palm normal. Returns None when any spanning edge is too short to normalize.
pub fn hand_basis(
    middle0: Vec3,
    middle1: Vec3,
    ring0: Vec3,
    ring1: Vec3,
    wrist: Vec3,
) -> Option<Mat3> {
    let across = ring0 - middle0;
    if across.length() < MIN_BASIS_EDGE {
        return None;
    }
    let y = across.normalize();
    let towards_wrist = wrist - (middle1 + ring1) * 0.5;
    let x = towards_wrist.cross(y);
    if x.length() < MIN_BASIS_EDGE {
        return None;
    }
    let x = x.normalize();
    Some(Mat3::from_cols(x, y, x.cross(y)))
}

/// One step of a quaternion remap: component swaps and negations re-express a rotation in a
/// differently labelled frame, `Then` appends a fixed rotation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BasisOp {
    SwapXZ,
    SwapXW,
    SwapYZ,
    NegX,
    NegY,
    NegZ,
    NegW,
    Then(Quat),
}

impl BasisOp {
    #[inline]
    pub fn apply(self, q: Quat) -> Quat {
        let (x, y, z, w) = (q.x, q.y, q.z, q.w);
        match self {
            Self::SwapXZ => Quat::from_xyzw(z, y, x, w),
            Self::SwapXW => Quat::from_xyzw(w, y, z, x),
            Self::SwapYZ => Quat::from_xyzw(x, z, y, w),
            Self::NegX => Quat::from_xyzw(-x, y, z, w),
            Self::NegY => Quat::from_xyzw(x, -y, z, w),
            Self::NegZ => Quat::from_xyzw(x, y, -z, w),
            Self::NegW => Quat::from_xyzw(x, y, z, -w),
            Self::Then(rot) => q * rot,
        }
    }
}

pub fn apply_ops(q: Quat, ops: &[BasisOp]) -> Quat {
    ops.iter().fold(q, |q, op| op.apply(q))
}
