use core::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub};

use bytemuck::{Pod, Zeroable};

/// 3D vector. `Pod` so it can sit directly inside GPU vertex data.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// 2D shorthand, z = 0.
    pub const fn new2(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Component-wise minimum.
    pub fn min(self, other: Vector) -> Vector {
        Vector::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    /// Component-wise maximum.
    pub fn max(self, other: Vector) -> Vector {
        Vector::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }

    pub fn magnitude(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Heading of the XY projection, in radians.
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }
}

impl Add for Vector {
    type Output = Vector;
    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Vector) {
        *self = *self + rhs;
    }
}

impl Sub for Vector {
    type Output = Vector;
    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vector {
    type Output = Vector;
    fn neg(self) -> Vector {
        Vector::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f32> for Vector {
    type Output = Vector;
    fn mul(self, rhs: f32) -> Vector {
        Vector::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl MulAssign<f32> for Vector {
    fn mul_assign(&mut self, rhs: f32) {
        *self = *self * rhs;
    }
}

impl Div<f32> for Vector {
    type Output = Vector;
    fn div(self, rhs: f32) -> Vector {
        Vector::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

/// 4x4 matrix, laid out to match the shader's `mat4x4<f32>` push constant.
/// Only identity and axis scaling are ever built here.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Matrix(pub [[f32; 4]; 4]);

impl Matrix {
    pub const IDENTITY: Matrix = Matrix::scale(1.0, 1.0, 1.0);

    pub const fn scale(sx: f32, sy: f32, sz: f32) -> Matrix {
        Matrix([
            [sx, 0.0, 0.0, 0.0],
            [0.0, sy, 0.0, 0.0],
            [0.0, 0.0, sz, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-5, "{a} != {b}");
    }

    #[test]
    fn add_sub_neg() {
        let a = Vector::new(1.0, 2.0, 3.0);
        let b = Vector::new(4.0, -1.0, 0.5);
        assert_eq!(a + b, Vector::new(5.0, 1.0, 3.5));
        assert_eq!(a - b, Vector::new(-3.0, 3.0, 2.5));
        assert_eq!(-a, Vector::new(-1.0, -2.0, -3.0));
    }

    #[test]
    fn scalar_mul_div() {
        let v = Vector::new(1.0, -2.0, 4.0);
        assert_eq!(v * 2.0, Vector::new(2.0, -4.0, 8.0));
        assert_eq!(v / 2.0, Vector::new(0.5, -1.0, 2.0));

        let mut w = v;
        w *= 0.5;
        assert_eq!(w, v / 2.0);
    }

    #[test]
    fn component_wise_min_max() {
        let a = Vector::new(1.0, 5.0, -3.0);
        let b = Vector::new(2.0, -5.0, 0.0);
        assert_eq!(a.min(b), Vector::new(1.0, -5.0, -3.0));
        assert_eq!(a.max(b), Vector::new(2.0, 5.0, 0.0));
    }

    #[test]
    fn magnitude_of_pythagorean_triple() {
        assert_close(Vector::new(3.0, 4.0, 0.0).magnitude(), 5.0);
        assert_close(Vector::zero().magnitude(), 0.0);
    }

    #[test]
    fn angle_of_axes() {
        assert_close(Vector::new2(1.0, 0.0).angle(), 0.0);
        assert_close(Vector::new2(0.0, 1.0).angle(), core::f32::consts::FRAC_PI_2);
        assert_close(Vector::new2(-1.0, 0.0).angle(), core::f32::consts::PI);
    }

    #[test]
    fn identity_is_unit_diagonal() {
        let m = Matrix::IDENTITY.0;
        for (i, row) in m.iter().enumerate() {
            for (j, v) in row.iter().enumerate() {
                assert_eq!(*v, if i == j { 1.0 } else { 0.0 });
            }
        }
    }
}
