//! SIMD kernels applying color matrices to interleaved pixel rows.
//!
//! Rows are four-lane pixels (`[c0, c1, c2, alpha]`); the alpha lane passes
//! through untouched. Lanes are processed with [`wide::f32x4`].
//!
//! ```rust
//! use tincture_math::{Mat3, simd::transform_x4};
//!
//! let px = transform_x4(&Mat3::diagonal(2.0, 2.0, 2.0), [0.1, 0.2, 0.3, 0.5]);
//! assert_eq!(px[3], 0.5);
//! ```

use crate::Mat3;
use wide::f32x4;

/// Matrix columns padded to four lanes, plus the alpha selector.
#[derive(Debug, Clone, Copy)]
pub struct PackedMat3 {
    cols: [f32x4; 4],
}

impl PackedMat3 {
    /// Packs `m` for repeated application.
    pub fn new(m: &Mat3) -> Self {
        let c = |j: usize| f32x4::from([m.m[0][j], m.m[1][j], m.m[2][j], 0.0]);
        Self {
            cols: [c(0), c(1), c(2), f32x4::from([0.0, 0.0, 0.0, 1.0])],
        }
    }

    /// Applies the matrix to one pixel.
    #[inline]
    pub fn apply(&self, px: [f32; 4]) -> [f32; 4] {
        let v = self.cols[0] * f32x4::splat(px[0])
            + self.cols[1] * f32x4::splat(px[1])
            + self.cols[2] * f32x4::splat(px[2])
            + self.cols[3] * f32x4::splat(px[3]);
        v.to_array()
    }
}

/// Applies `m` to one four-lane pixel.
#[inline]
pub fn transform_x4(m: &Mat3, px: [f32; 4]) -> [f32; 4] {
    PackedMat3::new(m).apply(px)
}

/// Applies `m` to every pixel of an interleaved four-channel row.
///
/// `src` and `dst` must hold the same number of whole pixels.
pub fn batch_transform_x4(m: &Mat3, src: &[f32], dst: &mut [f32]) {
    assert_eq!(src.len(), dst.len());
    assert_eq!(src.len() % 4, 0);
    let packed = PackedMat3::new(m);
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        let out = packed.apply([s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
}

/// Weighted sum of the first three lanes of each pixel.
pub fn batch_dot3_x4(weights: [f32; 3], src: &[f32], dst: &mut [f32]) {
    assert_eq!(src.len(), dst.len() * 4);
    let w = f32x4::from([weights[0], weights[1], weights[2], 0.0]);
    for (s, d) in src.chunks_exact(4).zip(dst.iter_mut()) {
        *d = (f32x4::from([s[0], s[1], s[2], s[3]]) * w).reduce_add();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SRGB;
    use approx::assert_abs_diff_eq;

    #[test]
    fn alpha_passes_through() {
        let m = SRGB.rgb_to_xyz();
        let src = [1.0, 0.5, 0.25, 0.75, 0.0, 0.0, 0.0, 0.0];
        let mut dst = [0.0; 8];
        batch_transform_x4(&m, &src, &mut dst);
        assert_eq!(dst[3], 0.75);
        assert_eq!(&dst[4..], &[0.0; 4]);
        let expected = m.transform([1.0, 0.5, 0.25]);
        for i in 0..3 {
            assert_abs_diff_eq!(dst[i], expected[i], epsilon = 1e-6);
        }
    }

    #[test]
    fn dot3_ignores_alpha() {
        let src = [1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0];
        let mut dst = [0.0; 2];
        batch_dot3_x4([0.25, 0.5, 0.25], &src, &mut dst);
        assert_abs_diff_eq!(dst[0], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(dst[1], 0.5, epsilon = 1e-6);
    }
}
