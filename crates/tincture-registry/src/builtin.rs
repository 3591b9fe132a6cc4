//! Color space factories for the built-in models.

use std::sync::Arc;
use tincture_composite::{mask_applicator, standard_ops};
use tincture_core::{ColorModel, ColorSpace, ColorSpaceFactory, DataFormat, PixelLayout, Profile, Result};

/// Depths registered for every built-in model.
pub const BUILTIN_DEPTHS: [DataFormat; 4] = [
    DataFormat::U8,
    DataFormat::U16,
    DataFormat::F16,
    DataFormat::F32,
];

/// Builds color spaces of one built-in model at one depth, with the full
/// blend-mode table and the tier-optimized mask applier.
#[derive(Debug, Clone)]
pub struct ModelSpaceFactory {
    model: ColorModel,
    format: DataFormat,
    layout: Arc<PixelLayout>,
}

impl ModelSpaceFactory {
    /// Factory for `model` at `format`.
    pub fn new(model: ColorModel, format: DataFormat) -> Result<Self> {
        Ok(Self {
            model,
            format,
            layout: Arc::new(model.layout(format)?),
        })
    }

    /// Channel kind.
    pub fn format(&self) -> DataFormat {
        self.format
    }
}

impl ColorSpaceFactory for ModelSpaceFactory {
    fn model_id(&self) -> &str {
        self.model.id
    }

    fn depth_id(&self) -> &str {
        self.format.depth_id()
    }

    fn layout(&self) -> Arc<PixelLayout> {
        self.layout.clone()
    }

    fn default_profile(&self) -> Option<&str> {
        self.model.default_profile
    }

    fn create(&self, profile: Option<Arc<Profile>>) -> ColorSpace {
        ColorSpace::new(
            self.model.id,
            self.format.depth_id(),
            self.layout.clone(),
            profile,
            standard_ops(&self.layout),
            mask_applicator(&self.layout),
        )
    }
}
