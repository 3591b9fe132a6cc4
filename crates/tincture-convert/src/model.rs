//! Conversions between color models at a fixed depth.
//!
//! Pixels are decoded to normalized `f32`, mapped, and re-encoded. RGB and
//! XYZ are related by the 3x3 matrices of the RGB profile's primaries (sRGB
//! when the color space carries none). Alpha is copied through when both
//! models have it, dropped or inserted as fully opaque otherwise.

use crate::{ColorTransformation, ConversionFactory};
use std::marker::PhantomData;
use std::sync::Arc;
use tincture_core::{
    model, precondition, with_channel_type, ChannelValue, ColorSpace, DataFormat, ModelDepth,
    PixelLayout,
};
use tincture_math::simd::PackedMat3;
use tincture_math::{Primaries, SRGB};

/// The per-pixel maps between built-in models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelMap {
    /// RGBA to XYZA through the source primaries.
    RgbToXyz,
    /// XYZA to RGBA through the destination primaries.
    XyzToRgb,
    /// RGBA to GRAYA by luma weights.
    RgbToGray,
    /// GRAYA to RGBA by replication.
    GrayToRgb,
    /// RGBA to CMYKA, naive undercolor removal.
    RgbToCmyk,
    /// CMYKA to RGBA.
    CmykToRgb,
    /// GRAYA to GRAY.
    DropAlpha,
    /// GRAY to GRAYA with opaque alpha.
    AddAlpha,
}

impl ModelMap {
    /// Every map.
    pub const ALL: [ModelMap; 8] = [
        Self::RgbToXyz,
        Self::XyzToRgb,
        Self::RgbToGray,
        Self::GrayToRgb,
        Self::RgbToCmyk,
        Self::CmykToRgb,
        Self::DropAlpha,
        Self::AddAlpha,
    ];

    /// `(source model, destination model)` ids.
    pub fn models(self) -> (&'static str, &'static str) {
        let (a, b) = match self {
            Self::RgbToXyz => (model::RGBA, model::XYZA),
            Self::XyzToRgb => (model::XYZA, model::RGBA),
            Self::RgbToGray => (model::RGBA, model::GRAYA),
            Self::GrayToRgb => (model::GRAYA, model::RGBA),
            Self::RgbToCmyk => (model::RGBA, model::CMYKA),
            Self::CmykToRgb => (model::CMYKA, model::RGBA),
            Self::DropAlpha => (model::GRAYA, model::GRAY),
            Self::AddAlpha => (model::GRAY, model::GRAYA),
        };
        (a.id, b.id)
    }

    fn conserves_color_information(self) -> bool {
        matches!(self, Self::GrayToRgb | Self::AddAlpha)
    }

    fn clamps(self) -> bool {
        matches!(self, Self::RgbToCmyk | Self::CmykToRgb)
    }
}

/// Converts between two built-in models at one depth.
#[derive(Debug, Clone)]
pub struct ModelConversionFactory {
    map: ModelMap,
    format: DataFormat,
    source: ModelDepth,
    destination: ModelDepth,
}

impl ModelConversionFactory {
    /// Factory applying `map` at `format`.
    pub fn new(map: ModelMap, format: DataFormat) -> Self {
        let (from, to) = map.models();
        Self {
            map,
            format,
            source: ModelDepth::new(from, format.depth_id()),
            destination: ModelDepth::new(to, format.depth_id()),
        }
    }

    /// The pixel map.
    pub fn map(&self) -> ModelMap {
        self.map
    }
}

impl ConversionFactory for ModelConversionFactory {
    fn source(&self) -> &ModelDepth {
        &self.source
    }

    fn destination(&self) -> &ModelDepth {
        &self.destination
    }

    fn conserves_color_information(&self) -> bool {
        self.map.conserves_color_information()
    }

    fn conserves_dynamic_range(&self) -> bool {
        !(self.format.is_float() && self.map.clamps())
    }

    fn create_transformation(
        &self,
        src: &Arc<ColorSpace>,
        dst: &Arc<ColorSpace>,
    ) -> Arc<dyn ColorTransformation> {
        precondition!(
            self.can_be_source(src) && self.can_be_destination(dst),
            "{src} -> {dst} does not match {}",
            self.name()
        );
        let kernel = match self.map {
            ModelMap::RgbToXyz => Kernel::Matrix(PackedMat3::new(&primaries_of(src).rgb_to_xyz())),
            ModelMap::XyzToRgb => Kernel::Matrix(PackedMat3::new(&primaries_of(dst).xyz_to_rgb())),
            ModelMap::RgbToGray => Kernel::Luma(primaries_of(src).luma_weights()),
            ModelMap::GrayToRgb => Kernel::Replicate,
            ModelMap::RgbToCmyk => Kernel::ToCmyk,
            ModelMap::CmykToRgb => Kernel::FromCmyk,
            ModelMap::DropAlpha | ModelMap::AddAlpha => Kernel::Alpha,
        };
        with_channel_type!(self.format, T => {
            Arc::new(ModelConversion::<T>::new(src.clone(), dst.clone(), kernel))
                as Arc<dyn ColorTransformation>
        })
    }
}

/// The built-in model conversions: every map at `F32`, plus the RGB to
/// gray and RGB to CMYK pairs at `U16`.
pub fn builtin_model_factories() -> Vec<ModelConversionFactory> {
    let mut out: Vec<_> = ModelMap::ALL
        .into_iter()
        .map(|m| ModelConversionFactory::new(m, DataFormat::F32))
        .collect();
    out.extend(
        [ModelMap::RgbToGray, ModelMap::GrayToRgb, ModelMap::RgbToCmyk, ModelMap::CmykToRgb]
            .into_iter()
            .map(|m| ModelConversionFactory::new(m, DataFormat::U16)),
    );
    out
}

fn primaries_of(cs: &ColorSpace) -> Primaries {
    cs.profile()
        .and_then(|p| p.primaries().copied())
        .unwrap_or(SRGB)
}

#[derive(Debug, Clone, Copy)]
enum Kernel {
    Matrix(PackedMat3),
    Luma([f32; 3]),
    Replicate,
    ToCmyk,
    FromCmyk,
    Alpha,
}

impl Kernel {
    /// Maps color channels; alpha lanes are handled by the caller.
    #[inline]
    fn apply(&self, s: &[f32], d: &mut [f32]) {
        match self {
            Self::Matrix(m) => {
                let out = m.apply([s[0], s[1], s[2], 0.0]);
                d[..3].copy_from_slice(&out[..3]);
            }
            Self::Luma(w) => d[0] = w[0] * s[0] + w[1] * s[1] + w[2] * s[2],
            Self::Replicate => d[..3].fill(s[0]),
            Self::ToCmyk => {
                let [r, g, b] = [s[0], s[1], s[2]].map(|v| v.clamp(0.0, 1.0));
                let k = 1.0 - r.max(g).max(b);
                if k >= 1.0 {
                    d[..4].copy_from_slice(&[0.0, 0.0, 0.0, 1.0]);
                } else {
                    let inv = 1.0 / (1.0 - k);
                    d[0] = (1.0 - r - k) * inv;
                    d[1] = (1.0 - g - k) * inv;
                    d[2] = (1.0 - b - k) * inv;
                    d[3] = k;
                }
            }
            Self::FromCmyk => {
                let [c, m, y, k] = [s[0], s[1], s[2], s[3]].map(|v| v.clamp(0.0, 1.0));
                d[0] = (1.0 - c) * (1.0 - k);
                d[1] = (1.0 - m) * (1.0 - k);
                d[2] = (1.0 - y) * (1.0 - k);
            }
            Self::Alpha => d[0] = s[0],
        }
    }
}

/// Model conversion at channel kind `T`.
pub struct ModelConversion<T> {
    source: Arc<ColorSpace>,
    destination: Arc<ColorSpace>,
    kernel: Kernel,
    src_alpha: Option<usize>,
    dst_alpha: Option<usize>,
    _kind: PhantomData<fn() -> T>,
}

impl<T: ChannelValue> ModelConversion<T> {
    fn new(source: Arc<ColorSpace>, destination: Arc<ColorSpace>, kernel: Kernel) -> Self {
        Self {
            src_alpha: source.layout().alpha_index(),
            dst_alpha: destination.layout().alpha_index(),
            source,
            destination,
            kernel,
            _kind: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for ModelConversion<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConversion")
            .field("source", &self.source.id())
            .field("destination", &self.destination.id())
            .field("kernel", &self.kernel)
            .finish()
    }
}

impl<T: ChannelValue> ColorTransformation for ModelConversion<T> {
    fn source(&self) -> &Arc<ColorSpace> {
        &self.source
    }

    fn destination(&self) -> &Arc<ColorSpace> {
        &self.destination
    }

    fn apply(&self, src: &[u8], dst: &mut [u8], pixel_count: usize) {
        let (sl, dl) = (self.source.layout(), self.destination.layout());
        let (sc, dc) = (sl.channel_count(), dl.channel_count());
        let (sp, dp) = (sl.pixel_size(), dl.pixel_size());
        let width = size_of::<T>();
        let mut s = [0f32; PixelLayout::MAX_CHANNELS];
        let mut d = [0f32; PixelLayout::MAX_CHANNELS];

        for (sx, dx) in src[..sp * pixel_count]
            .chunks_exact(sp)
            .zip(dst.chunks_exact_mut(dp))
        {
            for (i, v) in s[..sc].iter_mut().enumerate() {
                *v = T::read(&sx[i * width..]).to_f32();
            }
            self.kernel.apply(&s[..sc], &mut d[..dc]);
            if let Some(da) = self.dst_alpha {
                d[da] = self.src_alpha.map_or(1.0, |sa| s[sa]);
            }
            for (i, v) in d[..dc].iter().enumerate() {
                T::from_f32(*v).write(&mut dx[i * width..]);
            }
        }
    }
}
