//! 3x3 matrix used by model conversions.
//!
//! Stored row-major; [`Mat3::transform`] treats its argument as a column
//! vector.

use glam::{DMat3, DVec3};
use std::ops::Mul;

/// A 3x3 color matrix in row-major order.
///
/// # Example
///
/// ```rust
/// use tincture_math::Mat3;
///
/// let m = Mat3::diagonal(2.0, 3.0, 4.0);
/// assert_eq!(m.transform([1.0, 1.0, 1.0]), [2.0, 3.0, 4.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Mat3 {
    /// Rows of the matrix.
    pub m: [[f32; 3]; 3],
}

impl Mat3 {
    /// Identity matrix.
    pub const IDENTITY: Self = Self::diagonal(1.0, 1.0, 1.0);

    /// Creates a matrix from rows.
    #[inline]
    pub const fn from_rows(rows: [[f32; 3]; 3]) -> Self {
        Self { m: rows }
    }

    /// Creates a matrix from columns.
    #[inline]
    pub const fn from_cols(c: [[f32; 3]; 3]) -> Self {
        Self {
            m: [
                [c[0][0], c[1][0], c[2][0]],
                [c[0][1], c[1][1], c[2][1]],
                [c[0][2], c[1][2], c[2][2]],
            ],
        }
    }

    /// Creates a diagonal matrix.
    #[inline]
    pub const fn diagonal(d0: f32, d1: f32, d2: f32) -> Self {
        Self::from_rows([[d0, 0.0, 0.0], [0.0, d1, 0.0], [0.0, 0.0, d2]])
    }

    /// Widens to a column-major `f64` glam matrix.
    pub fn to_dmat3(&self) -> DMat3 {
        let r = |i: usize, j: usize| self.m[i][j] as f64;
        DMat3::from_cols(
            DVec3::new(r(0, 0), r(1, 0), r(2, 0)),
            DVec3::new(r(0, 1), r(1, 1), r(2, 1)),
            DVec3::new(r(0, 2), r(1, 2), r(2, 2)),
        )
    }

    /// Narrows a glam `f64` matrix.
    pub fn from_dmat3(m: DMat3) -> Self {
        let c = m.to_cols_array_2d();
        Self::from_cols([
            [c[0][0] as f32, c[0][1] as f32, c[0][2] as f32],
            [c[1][0] as f32, c[1][1] as f32, c[1][2] as f32],
            [c[2][0] as f32, c[2][1] as f32, c[2][2] as f32],
        ])
    }

    /// Determinant, computed in `f64`.
    #[inline]
    pub fn determinant(&self) -> f64 {
        self.to_dmat3().determinant()
    }

    /// Inverse, or `None` for a singular matrix.
    pub fn inverse(&self) -> Option<Self> {
        let d = self.to_dmat3();
        if d.determinant().abs() < 1e-12 {
            return None;
        }
        Some(Self::from_dmat3(d.inverse()))
    }

    /// Applies the matrix to a column vector.
    #[inline]
    pub fn transform(&self, v: [f32; 3]) -> [f32; 3] {
        let m = &self.m;
        [
            m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
            m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
            m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
        ]
    }

    /// Returns `true` if every element is finite.
    pub fn is_finite(&self) -> bool {
        self.m.iter().flatten().all(|x| x.is_finite())
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat3 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::from_dmat3(self.to_dmat3() * rhs.to_dmat3())
    }
}
