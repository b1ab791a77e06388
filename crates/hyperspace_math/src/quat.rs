//! Unit quaternion for pilot orientation
//!
//! Orientations follow the usual right-handed convention: the pilot looks down
//! -Z with +Y up. Composition `a * b` applies `b` first, so `q * rotation`
//! rotates in the pilot's local frame.

use bytemuck::{Pod, Zeroable};
use serde::{Serialize, Deserialize};
use crate::Vec3;

/// Below this `sin²(θ/2)` slerp falls back to normalized lerp
const SLERP_EPSILON: f64 = 1e-12;

/// The three local rotation axes of the pilot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocalAxis {
    /// Pitch (nose up/down)
    X,
    /// Yaw (nose left/right)
    Y,
    /// Roll
    Z,
}

impl LocalAxis {
    /// Unit vector of this axis
    pub fn unit(self) -> Vec3 {
        match self {
            LocalAxis::X => Vec3::X,
            LocalAxis::Y => Vec3::Y,
            LocalAxis::Z => Vec3::Z,
        }
    }
}

/// Quaternion `w + xi + yj + zk`
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    /// Identity rotation
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Create a quaternion from raw components
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians about `axis` (normalized internally)
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Self {
        let axis = axis.normalized();
        let half = angle * 0.5;
        let s = half.sin();
        Self::new(axis.x * s, axis.y * s, axis.z * s, half.cos())
    }

    /// Build from `[x, y, z, w]`
    #[inline]
    pub fn from_array(a: [f64; 4]) -> Self {
        Self::new(a[0], a[1], a[2], a[3])
    }

    /// Components as `[x, y, z, w]`
    #[inline]
    pub fn to_array(self) -> [f64; 4] {
        [self.x, self.y, self.z, self.w]
    }

    /// Four-dimensional dot product
    #[inline]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    #[inline]
    pub fn magnitude_squared(self) -> f64 {
        self.dot(self)
    }

    #[inline]
    pub fn magnitude(self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    /// Normalize to unit magnitude (identity if degenerate)
    pub fn normalize(self) -> Self {
        let mag = self.magnitude();
        if mag > 0.0 && mag.is_finite() {
            let inv = 1.0 / mag;
            Self::new(self.x * inv, self.y * inv, self.z * inv, self.w * inv)
        } else {
            Self::IDENTITY
        }
    }

    /// Conjugate; the inverse rotation for unit quaternions
    pub fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Compose two rotations: result = self * other
    /// The composed rotation applies `other` first, then `self`
    pub fn compose(self, other: Self) -> Self {
        let (ax, ay, az, aw) = (self.x, self.y, self.z, self.w);
        let (bx, by, bz, bw) = (other.x, other.y, other.z, other.w);
        Self::new(
            ax * bw + aw * bx + ay * bz - az * by,
            ay * bw + aw * by + az * bx - ax * bz,
            az * bw + aw * bz + ax * by - ay * bx,
            aw * bw - ax * bx - ay * by - az * bz,
        )
    }

    /// Rotate about one of the local axes (post-multiplication)
    pub fn rotate_local(self, axis: LocalAxis, angle: f64) -> Self {
        self.compose(Self::from_axis_angle(axis.unit(), angle)).normalize()
    }

    /// Rotate a vector: v' = q v q*
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let (qx, qy, qz, qw) = (self.x, self.y, self.z, self.w);

        let tx = 2.0 * (qy * v.z - qz * v.y);
        let ty = 2.0 * (qz * v.x - qx * v.z);
        let tz = 2.0 * (qx * v.y - qy * v.x);

        Vec3::new(
            v.x + qw * tx + qy * tz - qz * ty,
            v.y + qw * ty + qz * tx - qx * tz,
            v.z + qw * tz + qx * ty - qy * tx,
        )
    }

    /// Spherical interpolation along the shortest arc
    ///
    /// `t == 0.0` returns `a` and `t == 1.0` returns `b` bit-for-bit.
    pub fn slerp(a: Self, b: Self, t: f64) -> Self {
        if t <= 0.0 {
            return a;
        }
        if t >= 1.0 {
            return b;
        }

        let mut cos_half = a.dot(b);
        let mut b = b;
        if cos_half < 0.0 {
            b = Self::new(-b.x, -b.y, -b.z, -b.w);
            cos_half = -cos_half;
        }

        if cos_half >= 1.0 {
            return a;
        }

        let sqr_sin_half = 1.0 - cos_half * cos_half;
        if sqr_sin_half <= SLERP_EPSILON {
            let s = 1.0 - t;
            return Self::new(
                s * a.x + t * b.x,
                s * a.y + t * b.y,
                s * a.z + t * b.z,
                s * a.w + t * b.w,
            )
            .normalize();
        }

        let sin_half = sqr_sin_half.sqrt();
        let half_theta = sin_half.atan2(cos_half);
        let ratio_a = ((1.0 - t) * half_theta).sin() / sin_half;
        let ratio_b = (t * half_theta).sin() / sin_half;

        Self::new(
            a.x * ratio_a + b.x * ratio_b,
            a.y * ratio_a + b.y * ratio_b,
            a.z * ratio_a + b.z * ratio_b,
            a.w * ratio_a + b.w * ratio_b,
        )
    }

    /// Angle in radians between two orientations
    pub fn angle_to(self, other: Self) -> f64 {
        let d = self.dot(other).abs().min(1.0);
        2.0 * d.acos()
    }

    /// True if every component is finite
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }
}

impl std::ops::Mul for Quat {
    type Output = Self;
    #[inline]
    fn mul(self, other: Self) -> Self {
        self.compose(other)
    }
}
