//! The transformation seam and the identity transformation.

use std::fmt;
use std::sync::Arc;
use tincture_core::{precondition, ColorSpace};

/// Converts tightly packed pixels between one ordered pair of color spaces.
///
/// Implementations are stateless after construction and shared across
/// threads. Rows with padding are converted by the caller one row at a time.
pub trait ColorTransformation: Send + Sync + fmt::Debug {
    /// Color space of the input pixels.
    fn source(&self) -> &Arc<ColorSpace>;

    /// Color space of the output pixels.
    fn destination(&self) -> &Arc<ColorSpace>;

    /// Converts `pixel_count` pixels. Buffer lengths are already checked.
    fn apply(&self, src: &[u8], dst: &mut [u8], pixel_count: usize);

    /// Converts `pixel_count` pixels from `src` into `dst`.
    ///
    /// # Panics
    ///
    /// If either buffer holds fewer than `pixel_count` pixels of its layout.
    fn transform(&self, src: &[u8], dst: &mut [u8], pixel_count: usize) {
        check_buffers(self.source(), self.destination(), src, dst, pixel_count);
        if pixel_count > 0 {
            self.apply(src, dst, pixel_count);
        }
    }
}

fn check_buffers(
    from: &ColorSpace,
    to: &ColorSpace,
    src: &[u8],
    dst: &[u8],
    pixel_count: usize,
) {
    let need_src = from.layout().bytes_for(pixel_count);
    let need_dst = to.layout().bytes_for(pixel_count);
    precondition!(
        src.len() >= need_src,
        "source holds {} bytes, {pixel_count} pixels of {from} need {need_src}",
        src.len()
    );
    precondition!(
        dst.len() >= need_dst,
        "destination holds {} bytes, {pixel_count} pixels of {to} need {need_dst}",
        dst.len()
    );
}

/// Byte copy between color spaces sharing a layout.
///
/// Used for same-identity conversions and for reinterpreting pixels under a
/// profile without primaries.
#[derive(Debug, Clone)]
pub struct IdentityTransformation {
    source: Arc<ColorSpace>,
    destination: Arc<ColorSpace>,
}

impl IdentityTransformation {
    /// Pairs two color spaces with identical layouts.
    ///
    /// # Panics
    ///
    /// If the layouts differ.
    pub fn new(source: Arc<ColorSpace>, destination: Arc<ColorSpace>) -> Self {
        precondition!(
            source.layout() == destination.layout(),
            "identity conversion between different layouts ({source} -> {destination})"
        );
        Self { source, destination }
    }
}

impl ColorTransformation for IdentityTransformation {
    fn source(&self) -> &Arc<ColorSpace> {
        &self.source
    }

    fn destination(&self) -> &Arc<ColorSpace> {
        &self.destination
    }

    fn apply(&self, src: &[u8], dst: &mut [u8], pixel_count: usize) {
        let n = self.source.layout().bytes_for(pixel_count);
        dst[..n].copy_from_slice(&src[..n]);
    }
}
