//! # tincture-core
//!
//! Core types of the tincture pixel engine.
//!
//! - [`PixelLayout`] - channel order, kinds, offsets and alpha position
//! - [`ChannelValue`] - per-depth channel math (`u8`, `u16`, `u32`, `f16`,
//!   `f32`, `f64`) including exact integer depth scaling
//! - [`ColorSpace`] / [`ColorSpaceId`] - immutable, registry-deduplicated
//!   `(model, depth, profile)` instances
//! - [`CompositeOp`], [`AlphaMaskApplicator`], [`ColorSpaceFactory`] - the
//!   seams implemented by `tincture-composite` and `tincture-registry`
//! - [`Error`] - the shared error taxonomy
//!
//! ## Crate Structure
//!
//! ```text
//! tincture-math
//!    ^
//!    |
//! tincture-core (this crate)
//!    ^
//!    +-- tincture-dispatch (CPU tier selection)
//!    +-- tincture-composite (blend modes)
//!    +-- tincture-convert (transformations, path resolver)
//!    +-- tincture-registry (process-wide catalog)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod channel;
pub mod colorspace;
pub mod error;
pub mod format;
pub mod layout;
pub mod model;
pub mod op;
pub mod profile;

pub use channel::ChannelValue;
pub use colorspace::*;
pub use error::*;
pub use format::*;
pub use half::f16;
pub use layout::*;
pub use model::ColorModel;
pub use op::*;
pub use profile::*;

/// Prelude module for convenient imports.
///
/// ```
/// use tincture_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::channel::ChannelValue;
    pub use crate::colorspace::{ColorSpace, ColorSpaceFactory, ColorSpaceId, ModelDepth};
    pub use crate::error::{Error, Result};
    pub use crate::format::DataFormat;
    pub use crate::layout::{ChannelFlags, ChannelRole, PixelLayout};
    pub use crate::model::ColorModel;
    pub use crate::op::{AlphaMaskApplicator, CompositeOp, CompositeParams};
    pub use crate::profile::Profile;
}
