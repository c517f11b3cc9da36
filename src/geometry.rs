//! Geometric primitives for the pose pipeline.
//!
//! Minimal 3D types with only the operations the coordinate transform
//! needs: matrix products, quaternion extraction from a rotation matrix,
//! axis-angle construction and the Hamilton product. Row-major storage
//! throughout.

use serde::{Deserialize, Serialize};

/// 3D vector in meters (or meters/second for velocities).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn sub(&self, other: &Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    #[inline]
    pub fn scale(&self, s: f64) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }

    #[inline]
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction. Zero-length input is returned
    /// unchanged rather than producing NaN.
    pub fn normalized(&self) -> Vec3 {
        let n = self.norm();
        if n > 0.0 {
            self.scale(1.0 / n)
        } else {
            *self
        }
    }
}

/// 3x3 matrix, row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3 {
    pub m: [[f64; 3]; 3],
}

impl Mat3 {
    pub const IDENTITY: Mat3 = Mat3 {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    #[inline]
    pub fn from_rows(r0: [f64; 3], r1: [f64; 3], r2: [f64; 3]) -> Self {
        Self { m: [r0, r1, r2] }
    }

    pub fn transpose(&self) -> Mat3 {
        let m = &self.m;
        Mat3::from_rows(
            [m[0][0], m[1][0], m[2][0]],
            [m[0][1], m[1][1], m[2][1]],
            [m[0][2], m[1][2], m[2][2]],
        )
    }

    pub fn mul(&self, other: &Mat3) -> Mat3 {
        let mut out = [[0.0f64; 3]; 3];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = self.m[r][0] * other.m[0][c]
                    + self.m[r][1] * other.m[1][c]
                    + self.m[r][2] * other.m[2][c];
            }
        }
        Mat3 { m: out }
    }

    #[inline]
    pub fn mul_vec(&self, v: &Vec3) -> Vec3 {
        Vec3::new(
            self.m[0][0] * v.x + self.m[0][1] * v.y + self.m[0][2] * v.z,
            self.m[1][0] * v.x + self.m[1][1] * v.y + self.m[1][2] * v.z,
            self.m[2][0] * v.x + self.m[2][1] * v.y + self.m[2][2] * v.z,
        )
    }
}

/// 4x4 homogeneous transform, row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub m: [[f64; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Upper-left 3x3 rotation block.
    pub fn rotation(&self) -> Mat3 {
        Mat3::from_rows(
            [self.m[0][0], self.m[0][1], self.m[0][2]],
            [self.m[1][0], self.m[1][1], self.m[1][2]],
            [self.m[2][0], self.m[2][1], self.m[2][2]],
        )
    }

    /// Translation column.
    #[inline]
    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.m[0][3], self.m[1][3], self.m[2][3])
    }

    /// Build a transform from a rotation block and a translation.
    pub fn from_parts(rotation: Mat3, translation: Vec3) -> Self {
        let r = rotation.m;
        Mat4 {
            m: [
                [r[0][0], r[0][1], r[0][2], translation.x],
                [r[1][0], r[1][1], r[1][2], translation.y],
                [r[2][0], r[2][1], r[2][2], translation.z],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }
}

/// Quaternion in (w, x, y, z) order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[inline]
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Rotation of `angle` radians about `axis`. The axis is normalized
    /// internally.
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Self {
        let a = axis.normalized();
        let half = angle * 0.5;
        let s = half.sin();
        Self::new(half.cos(), a.x * s, a.y * s, a.z * s)
    }

    /// Extract a unit quaternion from a rotation matrix.
    ///
    /// Shepperd's method: branch on the largest of trace and diagonal
    /// entries for numerical stability near 180-degree rotations.
    pub fn from_rotation_matrix(r: &Mat3) -> Self {
        let m = &r.m;
        let trace = m[0][0] + m[1][1] + m[2][2];

        let q = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Quaternion::new(
                0.25 * s,
                (m[2][1] - m[1][2]) / s,
                (m[0][2] - m[2][0]) / s,
                (m[1][0] - m[0][1]) / s,
            )
        } else if m[0][0] > m[1][1] && m[0][0] > m[2][2] {
            let s = (1.0 + m[0][0] - m[1][1] - m[2][2]).sqrt() * 2.0;
            Quaternion::new(
                (m[2][1] - m[1][2]) / s,
                0.25 * s,
                (m[0][1] + m[1][0]) / s,
                (m[0][2] + m[2][0]) / s,
            )
        } else if m[1][1] > m[2][2] {
            let s = (1.0 + m[1][1] - m[0][0] - m[2][2]).sqrt() * 2.0;
            Quaternion::new(
                (m[0][2] - m[2][0]) / s,
                (m[0][1] + m[1][0]) / s,
                0.25 * s,
                (m[1][2] + m[2][1]) / s,
            )
        } else {
            let s = (1.0 + m[2][2] - m[0][0] - m[1][1]).sqrt() * 2.0;
            Quaternion::new(
                (m[1][0] - m[0][1]) / s,
                (m[0][2] + m[2][0]) / s,
                (m[1][2] + m[2][1]) / s,
                0.25 * s,
            )
        };
        q.normalized()
    }

    /// Hamilton product `self * other` (apply `other` first, then `self`).
    pub fn mul(&self, other: &Quaternion) -> Quaternion {
        let (w1, x1, y1, z1) = (self.w, self.x, self.y, self.z);
        let (w2, x2, y2, z2) = (other.w, other.x, other.y, other.z);
        Quaternion::new(
            w1 * w2 - x1 * x2 - y1 * y2 - z1 * z2,
            w1 * x2 + x1 * w2 + y1 * z2 - z1 * y2,
            w1 * y2 - x1 * z2 + y1 * w2 + z1 * x2,
            w1 * z2 + x1 * y2 - y1 * x2 + z1 * w2,
        )
    }

    pub fn normalized(&self) -> Quaternion {
        let n = (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt();
        if n > 0.0 {
            Quaternion::new(self.w / n, self.x / n, self.y / n, self.z / n)
        } else {
            Quaternion::IDENTITY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_mat3_identity_mul() {
        let r = Mat3::from_rows([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]);
        let product = Mat3::IDENTITY.mul(&r);
        assert_eq!(product, r);
    }

    #[test]
    fn test_mat3_transpose_roundtrip() {
        let r = Mat3::from_rows([1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]);
        assert_eq!(r.transpose().transpose(), r);
    }

    #[test]
    fn test_mat4_parts() {
        let t = Vec3::new(1.0, 2.0, 3.0);
        let m = Mat4::from_parts(Mat3::IDENTITY, t);
        assert_eq!(m.translation(), t);
        assert_eq!(m.rotation(), Mat3::IDENTITY);
    }

    #[test]
    fn test_quat_identity_from_matrix() {
        let q = Quaternion::from_rotation_matrix(&Mat3::IDENTITY);
        assert_relative_eq!(q.w, 1.0, epsilon = 1e-12);
        assert_relative_eq!(q.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(q.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(q.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_quat_from_z_rotation() {
        // 90 degrees about Z
        let r = Mat3::from_rows([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        let q = Quaternion::from_rotation_matrix(&r);
        let expected = Quaternion::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), PI / 2.0);
        assert_relative_eq!(q.w, expected.w, epsilon = 1e-12);
        assert_relative_eq!(q.z, expected.z, epsilon = 1e-12);
    }

    #[test]
    fn test_quat_from_matrix_180_degrees() {
        // 180 degrees about X exercises the non-trace branch
        let r = Mat3::from_rows([1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, -1.0]);
        let q = Quaternion::from_rotation_matrix(&r);
        assert_relative_eq!(q.w, 0.0, epsilon = 1e-12);
        assert_relative_eq!(q.x.abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_axis_angle_normalizes_axis() {
        let q = Quaternion::from_axis_angle(Vec3::new(1.0, 1.0, 1.0), PI / 2.0);
        let n = (q.w * q.w + q.x * q.x + q.y * q.y + q.z * q.z).sqrt();
        assert_relative_eq!(n, 1.0, epsilon = 1e-12);
        assert_relative_eq!(q.x, q.y, epsilon = 1e-12);
        assert_relative_eq!(q.y, q.z, epsilon = 1e-12);
    }

    #[test]
    fn test_hamilton_product_identity() {
        let q = Quaternion::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), 0.7);
        let p = Quaternion::IDENTITY.mul(&q);
        assert_relative_eq!(p.w, q.w, epsilon = 1e-12);
        assert_relative_eq!(p.y, q.y, epsilon = 1e-12);
    }

    #[test]
    fn test_hamilton_product_composes_angles() {
        let axis = Vec3::new(0.0, 0.0, 1.0);
        let a = Quaternion::from_axis_angle(axis, 0.3);
        let b = Quaternion::from_axis_angle(axis, 0.5);
        let c = a.mul(&b);
        let expected = Quaternion::from_axis_angle(axis, 0.8);
        assert_relative_eq!(c.w, expected.w, epsilon = 1e-12);
        assert_relative_eq!(c.z, expected.z, epsilon = 1e-12);
    }

    #[test]
    fn test_vec3_normalized_zero() {
        let v = Vec3::ZERO.normalized();
        assert_eq!(v, Vec3::ZERO);
    }
}
