/// Row-major 4x4 transform matrices and OpenGL-style builders
use std::f64::consts::PI;
use std::ops::{Index, Mul};

use crate::error::MatrixError;
use crate::vector::Vector3;

/// Immutable 4x4 matrix stored row-major: entry `(r, c)` lives at `r * 4 + c`.
///
/// The last row carries the perspective terms. Composition always builds a
/// new matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4 {
    pub m: [f64; 16],
}

impl Matrix4 {
    pub const fn new(m: [f64; 16]) -> Self {
        Self { m }
    }

    pub const fn identity() -> Self {
        Self::new([
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Standard matrix product `self * other`.
    pub fn multiply(&self, other: &Matrix4) -> Matrix4 {
        let a = &self.m;
        let b = &other.m;
        let mut r = [0.0; 16];
        for row in 0..4 {
            for col in 0..4 {
                r[row * 4 + col] = a[row * 4] * b[col]
                    + a[row * 4 + 1] * b[4 + col]
                    + a[row * 4 + 2] * b[8 + col]
                    + a[row * 4 + 3] * b[12 + col];
            }
        }
        Matrix4::new(r)
    }

    pub fn transpose(&self) -> Matrix4 {
        let m = &self.m;
        Matrix4::new([
            m[0], m[4], m[8], m[12], //
            m[1], m[5], m[9], m[13], //
            m[2], m[6], m[10], m[14], //
            m[3], m[7], m[11], m[15],
        ])
    }

    /// Inverse via the adjugate, or `Err(Singular)` when the determinant is
    /// exactly zero.
    pub fn try_inverse(&self) -> Result<Matrix4, MatrixError> {
        let m = &self.m;
        let mut r = [0.0; 16];

        r[0] = m[5] * m[10] * m[15] - m[5] * m[14] * m[11] - m[6] * m[9] * m[15]
            + m[6] * m[13] * m[11]
            + m[7] * m[9] * m[14]
            - m[7] * m[13] * m[10];
        r[1] = -m[1] * m[10] * m[15] + m[1] * m[14] * m[11] + m[2] * m[9] * m[15]
            - m[2] * m[13] * m[11]
            - m[3] * m[9] * m[14]
            + m[3] * m[13] * m[10];
        r[2] = m[1] * m[6] * m[15] - m[1] * m[14] * m[7] - m[2] * m[5] * m[15]
            + m[2] * m[13] * m[7]
            + m[3] * m[5] * m[14]
            - m[3] * m[13] * m[6];
        r[3] = -m[1] * m[6] * m[11] + m[1] * m[10] * m[7] + m[2] * m[5] * m[11]
            - m[2] * m[9] * m[7]
            - m[3] * m[5] * m[10]
            + m[3] * m[9] * m[6];

        r[4] = -m[4] * m[10] * m[15] + m[4] * m[14] * m[11] + m[6] * m[8] * m[15]
            - m[6] * m[12] * m[11]
            - m[7] * m[8] * m[14]
            + m[7] * m[12] * m[10];
        r[5] = m[0] * m[10] * m[15] - m[0] * m[14] * m[11] - m[2] * m[8] * m[15]
            + m[2] * m[12] * m[11]
            + m[3] * m[8] * m[14]
            - m[3] * m[12] * m[10];
        r[6] = -m[0] * m[6] * m[15] + m[0] * m[14] * m[7] + m[2] * m[4] * m[15]
            - m[2] * m[12] * m[7]
            - m[3] * m[4] * m[14]
            + m[3] * m[12] * m[6];
        r[7] = m[0] * m[6] * m[11] - m[0] * m[10] * m[7] - m[2] * m[4] * m[11]
            + m[2] * m[8] * m[7]
            + m[3] * m[4] * m[10]
            - m[3] * m[8] * m[6];

        r[8] = m[4] * m[9] * m[15] - m[4] * m[13] * m[11] - m[5] * m[8] * m[15]
            + m[5] * m[12] * m[11]
            + m[7] * m[8] * m[13]
            - m[7] * m[12] * m[9];
        r[9] = -m[0] * m[9] * m[15] + m[0] * m[13] * m[11] + m[1] * m[8] * m[15]
            - m[1] * m[12] * m[11]
            - m[3] * m[8] * m[13]
            + m[3] * m[12] * m[9];
        r[10] = m[0] * m[5] * m[15] - m[0] * m[13] * m[7] - m[1] * m[4] * m[15]
            + m[1] * m[12] * m[7]
            + m[3] * m[4] * m[13]
            - m[3] * m[12] * m[5];
        r[11] = -m[0] * m[5] * m[11] + m[0] * m[9] * m[7] + m[1] * m[4] * m[11]
            - m[1] * m[8] * m[7]
            - m[3] * m[4] * m[9]
            + m[3] * m[8] * m[5];

        r[12] = -m[4] * m[9] * m[14] + m[4] * m[13] * m[10] + m[5] * m[8] * m[14]
            - m[5] * m[12] * m[10]
            - m[6] * m[8] * m[13]
            + m[6] * m[12] * m[9];
        r[13] = m[0] * m[9] * m[14] - m[0] * m[13] * m[10] - m[1] * m[8] * m[14]
            + m[1] * m[12] * m[10]
            + m[2] * m[8] * m[13]
            - m[2] * m[12] * m[9];
        r[14] = -m[0] * m[5] * m[14] + m[0] * m[13] * m[6] + m[1] * m[4] * m[14]
            - m[1] * m[12] * m[6]
            - m[2] * m[4] * m[13]
            + m[2] * m[12] * m[5];
        r[15] = m[0] * m[5] * m[10] - m[0] * m[9] * m[6] - m[1] * m[4] * m[10]
            + m[1] * m[8] * m[6]
            + m[2] * m[4] * m[9]
            - m[2] * m[8] * m[5];

        let det = m[0] * r[0] + m[1] * r[4] + m[2] * r[8] + m[3] * r[12];
        if det == 0.0 {
            return Err(MatrixError::Singular);
        }
        for entry in r.iter_mut() {
            *entry /= det;
        }
        Ok(Matrix4::new(r))
    }

    /// Inverse that falls back to the identity for singular input.
    ///
    /// Use [`Matrix4::try_inverse`] to detect singularity instead.
    pub fn inverse(&self) -> Matrix4 {
        self.try_inverse().unwrap_or_else(|_| {
            log::debug!("singular matrix inverted, falling back to identity");
            Matrix4::identity()
        })
    }

    /// Transforms a point with `w = 1` and applies the perspective divide.
    /// `w' == 0` is not guarded.
    pub fn transform_point(&self, v: Vector3) -> Vector3 {
        let m = &self.m;
        let w = m[12] * v.x + m[13] * v.y + m[14] * v.z + m[15];
        Vector3::new(
            m[0] * v.x + m[1] * v.y + m[2] * v.z + m[3],
            m[4] * v.x + m[5] * v.y + m[6] * v.z + m[7],
            m[8] * v.x + m[9] * v.y + m[10] * v.z + m[11],
        )
        .divide_scalar(w)
    }

    /// Transforms a direction by the upper-left 3x3 block only.
    ///
    /// Normals need the inverse-transpose of the matrix; that is up to the
    /// caller.
    pub fn transform_vector(&self, v: Vector3) -> Vector3 {
        let m = &self.m;
        Vector3::new(
            m[0] * v.x + m[1] * v.y + m[2] * v.z,
            m[4] * v.x + m[5] * v.y + m[6] * v.z,
            m[8] * v.x + m[9] * v.y + m[10] * v.z,
        )
    }

    /// Perspective projection with a vertical field of view in degrees.
    pub fn perspective(fov: f64, aspect: f64, near: f64, far: f64) -> Matrix4 {
        let y = (fov * PI / 360.0).tan() * near;
        let x = y * aspect;
        Matrix4::frustum(-x, x, -y, y, near, far)
    }

    pub fn frustum(l: f64, r: f64, b: f64, t: f64, n: f64, f: f64) -> Matrix4 {
        Matrix4::new([
            2.0 * n / (r - l),
            0.0,
            (r + l) / (r - l),
            0.0,
            0.0,
            2.0 * n / (t - b),
            (t + b) / (t - b),
            0.0,
            0.0,
            0.0,
            -(f + n) / (f - n),
            -2.0 * f * n / (f - n),
            0.0,
            0.0,
            -1.0,
            0.0,
        ])
    }

    pub fn ortho(l: f64, r: f64, b: f64, t: f64, n: f64, f: f64) -> Matrix4 {
        Matrix4::new([
            2.0 / (r - l),
            0.0,
            0.0,
            -(r + l) / (r - l),
            0.0,
            2.0 / (t - b),
            0.0,
            -(t + b) / (t - b),
            0.0,
            0.0,
            -2.0 / (f - n),
            -(f + n) / (f - n),
            0.0,
            0.0,
            0.0,
            1.0,
        ])
    }

    pub fn scale(x: f64, y: f64, z: f64) -> Matrix4 {
        Matrix4::new([
            x, 0.0, 0.0, 0.0, //
            0.0, y, 0.0, 0.0, //
            0.0, 0.0, z, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    pub fn translate(x: f64, y: f64, z: f64) -> Matrix4 {
        Matrix4::new([
            1.0, 0.0, 0.0, x, //
            0.0, 1.0, 0.0, y, //
            0.0, 0.0, 1.0, z, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Rotation of `angle` degrees around the axis `(x, y, z)`.
    ///
    /// A zero angle or a zero axis yields the identity. NaN counts as zero
    /// in both checks, so a NaN angle also yields the identity.
    pub fn rotate(angle: f64, x: f64, y: f64, z: f64) -> Matrix4 {
        let unset = |v: f64| v == 0.0 || v.is_nan();
        if unset(angle) || (unset(x) && unset(y) && unset(z)) {
            return Matrix4::identity();
        }
        let d = Vector3::new(x, y, z).length();
        let (x, y, z) = (x / d, y / d, z / d);
        let a = angle * PI / 180.0;
        let (s, c) = a.sin_cos();
        let t = 1.0 - c;

        Matrix4::new([
            x * x * t + c,
            x * y * t - z * s,
            x * z * t + y * s,
            0.0,
            y * x * t + z * s,
            y * y * t + c,
            y * z * t - x * s,
            0.0,
            z * x * t - y * s,
            z * y * t + x * s,
            z * z * t + c,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
        ])
    }

    /// View matrix looking from `eye` toward `center`.
    ///
    /// `up` parallel to the view direction is not guarded and yields `NaN`.
    pub fn look_at(eye: Vector3, center: Vector3, up: Vector3) -> Matrix4 {
        let f = (eye - center).unit();
        let s = up.cross(f).unit();
        let t = f.cross(s).unit();

        Matrix4::new([
            s.x,
            s.y,
            s.z,
            -s.dot(eye),
            t.x,
            t.y,
            t.z,
            -t.dot(eye),
            f.x,
            f.y,
            f.z,
            -f.dot(eye),
            0.0,
            0.0,
            0.0,
            1.0,
        ])
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;
    fn mul(self, rhs: Matrix4) -> Matrix4 {
        self.multiply(&rhs)
    }
}

impl Index<(usize, usize)> for Matrix4 {
    type Output = f64;
    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.m[row * 4 + col]
    }
}

impl From<nalgebra::Matrix4<f64>> for Matrix4 {
    fn from(n: nalgebra::Matrix4<f64>) -> Self {
        let mut m = [0.0; 16];
        for row in 0..4 {
            for col in 0..4 {
                m[row * 4 + col] = n[(row, col)];
            }
        }
        Matrix4::new(m)
    }
}

impl From<Matrix4> for nalgebra::Matrix4<f64> {
    fn from(m: Matrix4) -> Self {
        nalgebra::Matrix4::from_row_slice(&m.m)
    }
}
