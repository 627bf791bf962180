//! Geometry kernel: intrinsic yaw-pitch-roll rotation.
//!
//! The matrix is `Rz(yaw) · Ry(pitch) · Rx(roll)`, applied to the input
//! vector. Inputs must be finite.

use contracts::{Orientation, Vector3};
use nalgebra::{Rotation3, Vector3 as NVector3};

/// Rotation matrix for the given Euler angles (rad)
#[inline]
pub fn rotation_matrix(yaw: f64, pitch: f64, roll: f64) -> Rotation3<f64> {
    // nalgebra applies roll, then pitch, then yaw: Rz · Ry · Rx
    Rotation3::from_euler_angles(roll, pitch, yaw)
}

/// Rotate `point` by yaw/pitch/roll
#[inline]
pub fn rotate(point: Vector3, yaw: f64, pitch: f64, roll: f64) -> Vector3 {
    let rotated = rotation_matrix(yaw, pitch, roll) * NVector3::new(point.x, point.y, point.z);
    Vector3::new(rotated.x, rotated.y, rotated.z)
}

/// Rotate `point` by an [`Orientation`]
#[inline]
pub fn rotate_vector(point: Vector3, orientation: &Orientation) -> Vector3 {
    rotate(point, orientation.yaw, orientation.pitch, orientation.roll)
}
