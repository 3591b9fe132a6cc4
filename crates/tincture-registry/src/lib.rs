//! # tincture-registry
//!
//! The process-wide color space catalog of the tincture pixel engine.
//!
//! [`Registry::global`] is populated on first access with:
//!
//! - models `RGBA`, `GRAYA`, `GRAY`, `CMYKA`, `XYZA` at depths `U8`, `U16`,
//!   `F16`, `F32`, each with every blend mode
//! - depth-scaling conversions between all depths of a model
//! - model conversions at `F32` (and `U16` for RGB to gray and CMYK)
//! - the RGB profiles `sRGB` (the RGBA default), `Rec.2020`, `Display P3`,
//!   `Adobe RGB` and `ProPhoto RGB`
//!
//! Extensions add their own factories, conversions, profiles and composite
//! ops at any time; registrations interleave safely with lookups.
//!
//! ```rust
//! use tincture_core::CompositeParams;
//! use tincture_registry::Registry;
//!
//! let registry = Registry::global();
//! let space = registry.lookup("GRAYA", "U8", None).unwrap();
//! let multiply = registry.composite_op(&space, "multiply").unwrap();
//!
//! let mut dst = [200u8, 255];
//! multiply.composite(CompositeParams::new(&mut dst, 2, &[128, 255], 2, 1, 1));
//! assert_eq!(dst, [100, 255]);
//! ```
//!
//! # Dependencies
//!
//! - `tincture-composite` - op tables for built-in color spaces
//! - `tincture-convert` - conversion factories and path resolution
//! - [`tracing`] - registration logging

#![warn(missing_docs)]

pub mod builtin;
mod cache;
mod registry;

pub use builtin::{ModelSpaceFactory, BUILTIN_DEPTHS};
pub use cache::ConversionCache;
pub use registry::Registry;
