//! Same-model channel depth changes.
//!
//! Integer to integer scaling is exact in unit space: widening 8 to 16 bits
//! multiplies by 257, narrowing divides with rounding, so both extremes and
//! every widened value survive the round trip. Any step involving a float
//! kind goes through normalized `[0, 1]`.

use crate::{ColorTransformation, ConversionFactory};
use std::marker::PhantomData;
use std::sync::Arc;
use tincture_core::{
    precondition, with_channel_type, ChannelValue, ColorSpace, DataFormat, ModelDepth,
};

/// Rescales every channel from one depth of a model to another.
#[derive(Debug, Clone)]
pub struct DepthScalingFactory {
    source: ModelDepth,
    destination: ModelDepth,
    from: DataFormat,
    to: DataFormat,
}

impl DepthScalingFactory {
    /// Factory for `model` from `from` to `to`.
    pub fn new(model: &str, from: DataFormat, to: DataFormat) -> Self {
        Self {
            source: ModelDepth::new(model, from.depth_id()),
            destination: ModelDepth::new(model, to.depth_id()),
            from,
            to,
        }
    }

    /// Both directions between two depths.
    pub fn pair(model: &str, a: DataFormat, b: DataFormat) -> [Self; 2] {
        [Self::new(model, a, b), Self::new(model, b, a)]
    }

    /// Input channel kind.
    pub fn from_format(&self) -> DataFormat {
        self.from
    }

    /// Output channel kind.
    pub fn to_format(&self) -> DataFormat {
        self.to
    }
}

impl ConversionFactory for DepthScalingFactory {
    fn source(&self) -> &ModelDepth {
        &self.source
    }

    fn destination(&self) -> &ModelDepth {
        &self.destination
    }

    fn conserves_color_information(&self) -> bool {
        if self.from.is_float() && self.to.is_integer() {
            return false;
        }
        self.to.precision_bits() >= self.from.precision_bits()
    }

    fn conserves_dynamic_range(&self) -> bool {
        self.from.is_integer()
            || (self.to.is_float() && self.to.bytes_per_channel() >= self.from.bytes_per_channel())
    }

    fn create_transformation(
        &self,
        src: &Arc<ColorSpace>,
        dst: &Arc<ColorSpace>,
    ) -> Arc<dyn ColorTransformation> {
        precondition!(
            src.layout().uniform_format() == Some(self.from)
                && dst.layout().uniform_format() == Some(self.to)
                && src.channel_count() == dst.channel_count(),
            "{src} -> {dst} does not match depth scaling {} -> {}",
            self.from,
            self.to
        );
        with_channel_type!(self.from, S => with_channel_type!(self.to, D => {
            Arc::new(ScaleDepth::<S, D>::new(src.clone(), dst.clone())) as Arc<dyn ColorTransformation>
        }))
    }
}

/// Channel-wise depth conversion from `S` to `D`.
pub struct ScaleDepth<S, D> {
    source: Arc<ColorSpace>,
    destination: Arc<ColorSpace>,
    _kinds: PhantomData<fn(S) -> D>,
}

impl<S: ChannelValue, D: ChannelValue> ScaleDepth<S, D> {
    fn new(source: Arc<ColorSpace>, destination: Arc<ColorSpace>) -> Self {
        Self {
            source,
            destination,
            _kinds: PhantomData,
        }
    }
}

impl<S, D> std::fmt::Debug for ScaleDepth<S, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScaleDepth")
            .field("source", &self.source.id())
            .field("destination", &self.destination.id())
            .finish()
    }
}

impl<S: ChannelValue, D: ChannelValue> ColorTransformation for ScaleDepth<S, D> {
    fn source(&self) -> &Arc<ColorSpace> {
        &self.source
    }

    fn destination(&self) -> &Arc<ColorSpace> {
        &self.destination
    }

    fn apply(&self, src: &[u8], dst: &mut [u8], pixel_count: usize) {
        let values = pixel_count * self.source.channel_count();
        let src = &src[..values * size_of::<S>()];
        for (s, d) in src
            .chunks_exact(size_of::<S>())
            .zip(dst.chunks_exact_mut(size_of::<D>()))
        {
            S::read(s).scale_to::<D>().write(d);
        }
    }
}
