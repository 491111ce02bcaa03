//! Axis-angle helpers used to move and orient the camera.
//!
//! Axes are expected to be unit length on input; nothing here normalizes them.
//! Angles are radians.

use glam::{DMat3, DQuat, DVec3};

const EPSILON: f64 = 1e-11;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisAngle {
    pub axis: DVec3,
    pub angle: f64,
}

impl Default for AxisAngle {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AxisAngle {
    pub const IDENTITY: Self = Self {
        axis: DVec3::Z,
        angle: 0.0,
    };

    pub const fn new(axis: DVec3, angle: f64) -> Self {
        Self { axis, angle }
    }

    pub fn from_array(r: [f64; 4]) -> Self {
        Self {
            axis: DVec3::new(r[0], r[1], r[2]),
            angle: r[3],
        }
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.axis.x, self.axis.y, self.axis.z, self.angle]
    }

    pub fn is_finite(&self) -> bool {
        self.axis.is_finite() && self.angle.is_finite()
    }
}

#[inline]
pub fn rotate(v: DVec3, m: &DMat3) -> DVec3 {
    *m * v
}

#[inline]
pub fn add(a: DVec3, b: DVec3) -> DVec3 {
    a + b
}

/// Rodrigues' rotation formula.
pub fn axis_angle_to_matrix(r: AxisAngle) -> DMat3 {
    let (s, c) = r.angle.sin_cos();
    let t = 1.0 - c;
    let DVec3 { x, y, z } = r.axis;

    // Columns of the row-major matrix
    // | c+xxt   xyt-zs  xzt+ys |
    // | yxt+zs  c+yyt   yzt-xs |
    // | zxt-ys  zyt+xs  c+zzt  |
    DMat3::from_cols(
        DVec3::new(c + x * x * t, y * x * t + z * s, z * x * t - y * s),
        DVec3::new(x * y * t - z * s, c + y * y * t, z * y * t + x * s),
        DVec3::new(x * z * t + y * s, y * z * t - x * s, c + z * z * t),
    )
}

pub fn axis_angle_to_quaternion(r: AxisAngle) -> DQuat {
    let (s, c) = (r.angle / 2.0).sin_cos();
    DQuat::from_xyzw(r.axis.x * s, r.axis.y * s, r.axis.z * s, c)
}

/// Angles below 1e-11 collapse to the identity rotation about +Z, since the
/// axis would otherwise be divided by a vanishing `sqrt(1 - w^2)`.
pub fn quaternion_to_axis_angle(q: DQuat) -> AxisAngle {
    let w = q.w.clamp(-1.0, 1.0);
    let angle = 2.0 * w.acos();

    if angle.abs() < EPSILON {
        return AxisAngle::IDENTITY;
    }

    let d = (1.0 - w * w).sqrt();
    AxisAngle {
        axis: DVec3::new(q.x / d, q.y / d, q.z / d),
        angle,
    }
}

/// Hamilton product `r1 ⊗ r2`: `r2` is applied first, then `r1`.
pub fn compose_axis_angle(r1: AxisAngle, r2: AxisAngle) -> AxisAngle {
    let q1 = axis_angle_to_quaternion(r1);
    let q2 = axis_angle_to_quaternion(r2);
    quaternion_to_axis_angle(q1 * q2)
}
