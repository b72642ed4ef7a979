/// Three-component vector value type
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Immutable 3D vector. Every operation returns a new value.
///
/// Degenerate inputs (zero divisors, zero-length normalization) are not
/// intercepted; the IEEE results (`inf`, `NaN`) flow through unchanged so
/// downstream comparisons like `t > 0.0` can filter them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Spherical angles of a direction, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angles {
    pub theta: f64,
    pub phi: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub const fn splat(v: f64) -> Self {
        Self::new(v, v, v)
    }

    pub fn from_array(a: [f64; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn negative(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }

    pub fn add(self, v: Vector3) -> Self {
        Self::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }

    pub fn add_scalar(self, s: f64) -> Self {
        Self::new(self.x + s, self.y + s, self.z + s)
    }

    pub fn subtract(self, v: Vector3) -> Self {
        Self::new(self.x - v.x, self.y - v.y, self.z - v.z)
    }

    pub fn subtract_scalar(self, s: f64) -> Self {
        Self::new(self.x - s, self.y - s, self.z - s)
    }

    pub fn multiply(self, v: Vector3) -> Self {
        Self::new(self.x * v.x, self.y * v.y, self.z * v.z)
    }

    pub fn multiply_scalar(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    pub fn divide(self, v: Vector3) -> Self {
        Self::new(self.x / v.x, self.y / v.y, self.z / v.z)
    }

    pub fn divide_scalar(self, s: f64) -> Self {
        Self::new(self.x / s, self.y / s, self.z / s)
    }

    /// Exact component-wise equality.
    pub fn equals(self, v: Vector3) -> bool {
        self.x == v.x && self.y == v.y && self.z == v.z
    }

    pub fn dot(self, v: Vector3) -> f64 {
        self.x * v.x + self.y * v.y + self.z * v.z
    }

    /// Right-handed cross product.
    pub fn cross(self, v: Vector3) -> Self {
        Self::new(
            self.y * v.z - self.z * v.y,
            self.z * v.x - self.x * v.z,
            self.x * v.y - self.y * v.x,
        )
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit-length copy. A zero vector yields `NaN` components.
    pub fn unit(self) -> Self {
        self.divide_scalar(self.length())
    }

    /// Smallest of the three components.
    pub fn min_component(self) -> f64 {
        nan_min(nan_min(self.x, self.y), self.z)
    }

    /// Largest of the three components.
    pub fn max_component(self) -> f64 {
        nan_max(nan_max(self.x, self.y), self.z)
    }

    /// Component-wise minimum of two vectors.
    pub fn min(a: Vector3, b: Vector3) -> Vector3 {
        Vector3::new(nan_min(a.x, b.x), nan_min(a.y, b.y), nan_min(a.z, b.z))
    }

    /// Component-wise maximum of two vectors.
    pub fn max(a: Vector3, b: Vector3) -> Vector3 {
        Vector3::new(nan_max(a.x, b.x), nan_max(a.y, b.y), nan_max(a.z, b.z))
    }

    pub fn lerp(a: Vector3, b: Vector3, t: f64) -> Vector3 {
        a.add(b.subtract(a).multiply_scalar(t))
    }

    pub fn to_angles(self) -> Angles {
        Angles {
            theta: self.z.atan2(self.x),
            phi: (self.y / self.length()).asin(),
        }
    }

    pub fn from_angles(theta: f64, phi: f64) -> Vector3 {
        Vector3::new(theta.cos() * phi.cos(), phi.sin(), theta.sin() * phi.cos())
    }

    /// Angle between two vectors, in radians.
    pub fn angle_to(self, v: Vector3) -> f64 {
        (self.dot(v) / (self.length() * v.length())).acos()
    }
}

// f64::min/max drop NaN operands; the hit tests rely on NaN winning.
pub(crate) fn nan_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else if a < b {
        a
    } else {
        b
    }
}

pub(crate) fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else if a > b {
        a
    } else {
        b
    }
}

impl Add for Vector3 {
    type Output = Vector3;
    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::add(self, rhs)
    }
}

impl Add<f64> for Vector3 {
    type Output = Vector3;
    fn add(self, rhs: f64) -> Vector3 {
        self.add_scalar(rhs)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;
    fn sub(self, rhs: Vector3) -> Vector3 {
        self.subtract(rhs)
    }
}

impl Sub<f64> for Vector3 {
    type Output = Vector3;
    fn sub(self, rhs: f64) -> Vector3 {
        self.subtract_scalar(rhs)
    }
}

impl Mul for Vector3 {
    type Output = Vector3;
    fn mul(self, rhs: Vector3) -> Vector3 {
        self.multiply(rhs)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;
    fn mul(self, rhs: f64) -> Vector3 {
        self.multiply_scalar(rhs)
    }
}

impl Div for Vector3 {
    type Output = Vector3;
    fn div(self, rhs: Vector3) -> Vector3 {
        self.divide(rhs)
    }
}

impl Div<f64> for Vector3 {
    type Output = Vector3;
    fn div(self, rhs: f64) -> Vector3 {
        self.divide_scalar(rhs)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;
    fn neg(self) -> Vector3 {
        self.negative()
    }
}

impl From<nalgebra::Vector3<f64>> for Vector3 {
    fn from(v: nalgebra::Vector3<f64>) -> Self {
        Vector3::new(v.x, v.y, v.z)
    }
}

impl From<Vector3> for nalgebra::Vector3<f64> {
    fn from(v: Vector3) -> Self {
        nalgebra::Vector3::new(v.x, v.y, v.z)
    }
}

impl From<nalgebra::Point3<f64>> for Vector3 {
    fn from(p: nalgebra::Point3<f64>) -> Self {
        Vector3::new(p.x, p.y, p.z)
    }
}

impl From<Vector3> for nalgebra::Point3<f64> {
    fn from(v: Vector3) -> Self {
        nalgebra::Point3::new(v.x, v.y, v.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_and_scalar_overloads() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Vector3::new(5.0, 7.0, 9.0));
        assert_eq!(a + 1.0, Vector3::new(2.0, 3.0, 4.0));
        assert_eq!(b - a, Vector3::splat(3.0));
        assert_eq!(a * b, Vector3::new(4.0, 10.0, 18.0));
        assert_eq!(a * 2.0, Vector3::new(2.0, 4.0, 6.0));
        assert_eq!(b / Vector3::new(2.0, 5.0, 3.0), Vector3::new(2.0, 1.0, 2.0));
        assert_eq!(-a, Vector3::new(-1.0, -2.0, -3.0));
    }

    #[test]
    fn test_cross_is_right_handed() {
        let x = Vector3::new(1.0, 0.0, 0.0);
        let y = Vector3::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(y), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(y.cross(x), Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_length_and_unit() {
        let v = Vector3::new(3.0, 4.0, 0.0);
        assert_eq!(v.length(), 5.0);
        assert!((v.unit().length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_values_propagate() {
        let u = Vector3::zero().unit();
        assert!(u.x.is_nan() && u.y.is_nan() && u.z.is_nan());

        let d = Vector3::new(1.0, -1.0, 0.0) / 0.0;
        assert_eq!(d.x, f64::INFINITY);
        assert_eq!(d.y, f64::NEG_INFINITY);
        assert!(d.z.is_nan());
    }

    #[test]
    fn test_min_max_forms() {
        let a = Vector3::new(1.0, 5.0, -2.0);
        let b = Vector3::new(0.0, 7.0, 3.0);
        assert_eq!(a.min_component(), -2.0);
        assert_eq!(a.max_component(), 5.0);
        assert_eq!(Vector3::min(a, b), Vector3::new(0.0, 5.0, -2.0));
        assert_eq!(Vector3::max(a, b), Vector3::new(1.0, 7.0, 3.0));
        assert!(Vector3::new(f64::NAN, 0.0, 1.0).max_component().is_nan());
    }

    #[test]
    fn test_lerp() {
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(2.0, 4.0, -8.0);
        assert_eq!(Vector3::lerp(a, b, 0.25), Vector3::new(0.5, 1.0, -2.0));
    }

    #[test]
    fn test_angles_round_trip() {
        let v = Vector3::new(1.0, 1.0, 1.0).unit();
        let angles = v.to_angles();
        let back = Vector3::from_angles(angles.theta, angles.phi);
        assert!((back - v).length() < 1e-12);
        let right = Vector3::new(1.0, 0.0, 0.0).angle_to(Vector3::new(0.0, 0.0, 3.0));
        assert!((right - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_nalgebra_interop() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        let n: nalgebra::Vector3<f64> = v.into();
        assert_eq!(n.cross(&nalgebra::Vector3::x()).z, v.cross(Vector3::new(1.0, 0.0, 0.0)).z);
        assert_eq!(Vector3::from(nalgebra::Point3::new(1.0, 2.0, 3.0)), v);
    }
}
