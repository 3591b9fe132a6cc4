//! # tincture-convert
//!
//! Pixel buffer conversion between color spaces.
//!
//! - [`ColorTransformation`] converts packed pixels between one ordered pair
//!   of color spaces
//! - [`ConversionFactory`] declares which `(model, depth)` pair it bridges
//!   and with what [`Fidelity`]
//! - [`DepthScalingFactory`] and [`ModelConversionFactory`] are the built-in
//!   edges
//! - [`PathResolver`] finds the best chain of factories and builds a
//!   [`ConversionPath`]
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tincture_convert::{ConversionFactory, DepthScalingFactory};
//! use tincture_core::{model, ColorSpace, DataFormat};
//!
//! let space = |f: DataFormat| {
//!     let layout = Arc::new(model::RGBA.layout(f).unwrap());
//!     Arc::new(ColorSpace::new("RGBA", f.depth_id(), layout, None, Vec::new(), None))
//! };
//! let (u8s, u16s) = (space(DataFormat::U8), space(DataFormat::U16));
//!
//! let widen = DepthScalingFactory::new("RGBA", DataFormat::U8, DataFormat::U16);
//! let t = widen.create_transformation(&u8s, &u16s);
//! let mut out = [0u8; 8];
//! t.transform(&[255, 128, 64, 255], &mut out, 1);
//! assert_eq!(u16::from_ne_bytes([out[2], out[3]]), 32896);
//! ```
//!
//! # Dependencies
//!
//! - `tincture-math` - primaries and matrix kernels
//! - [`tracing`] - path resolution logging

#![warn(missing_docs)]

pub mod depth;
pub mod factory;
pub mod model;
pub mod path;
pub mod resolver;
pub mod transform;

pub use depth::DepthScalingFactory;
pub use factory::{same_slot, ConversionFactory, Fidelity};
pub use model::{builtin_model_factories, ModelConversionFactory, ModelMap};
pub use path::ConversionPath;
pub use resolver::{ColorSpaceProvider, PathCost, PathResolver, Route};
pub use transform::{ColorTransformation, IdentityTransformation};

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Arc;
    use tincture_core::{ColorModel, ColorSpace, DataFormat, ModelDepth, Profile, Result};

    pub fn space(model: &str, depth: &str, profile: Option<&str>) -> Result<Arc<ColorSpace>> {
        let m = ColorModel::by_id(model)
            .ok_or_else(|| tincture_core::Error::unknown_color_space(model, depth, profile))?;
        let format = DataFormat::from_depth_id(depth)
            .ok_or_else(|| tincture_core::Error::unknown_color_space(model, depth, profile))?;
        let profile = profile.map(|p| {
            Arc::new(match tincture_math::Primaries::by_name(p) {
                Some(pr) => Profile::rgb(pr),
                None => Profile::named(p),
            })
        });
        Ok(Arc::new(ColorSpace::new(
            m.id,
            format.depth_id(),
            Arc::new(m.layout(format)?),
            profile,
            Vec::new(),
            None,
        )))
    }

    pub fn at(node: &ModelDepth, profile: Option<&str>) -> Result<Arc<ColorSpace>> {
        space(&node.model, &node.depth, profile)
    }

    /// Depth links between U8, U16 and F32 of every model, plus the model maps.
    pub fn catalog() -> Vec<Arc<dyn ConversionFactory>> {
        let mut out: Vec<Arc<dyn ConversionFactory>> = Vec::new();
        let depths = [DataFormat::U8, DataFormat::U16, DataFormat::F32];
        for m in ["RGBA", "GRAYA", "GRAY", "CMYKA", "XYZA"] {
            for (i, a) in depths.iter().enumerate() {
                for b in &depths[i + 1..] {
                    for f in DepthScalingFactory::pair(m, *a, *b) {
                        out.push(Arc::new(f));
                    }
                }
            }
        }
        for f in builtin_model_factories() {
            out.push(Arc::new(f));
        }
        out
    }
}
