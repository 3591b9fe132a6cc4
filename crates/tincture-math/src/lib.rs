//! # tincture-math
//!
//! Numeric primitives behind the model-conversion half of the engine.
//!
//! - [`Mat3`] - row-major 3x3 matrix applied to column vectors
//! - [`Primaries`] - RGB chromaticities plus white point, and the
//!   RGB <-> XYZ matrices derived from them
//! - [`simd`] - `wide`-backed kernels that apply a matrix to packed rows
//!
//! # Convention
//!
//! ```text
//! result = matrix * vector
//! ```
//!
//! Matrices are derived in `f64` through [`glam::DMat3`] and stored as `f32`,
//! which keeps RGB -> XYZ -> RGB round trips within a few ULP.
//!
//! # Dependencies
//!
//! - [`glam`] - matrix inversion and products
//! - [`wide`] - portable SIMD lanes for batch application
//!
//! # Used By
//!
//! - `tincture-core` - profiles carry [`Primaries`]
//! - `tincture-convert` - RGB <-> XYZ and luma transformations

#![warn(missing_docs)]

mod mat3;
mod primaries;
pub mod simd;

pub use mat3::Mat3;
pub use primaries::*;
