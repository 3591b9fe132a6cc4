//! Alpha mask appliers.
//!
//! Brush engines produce coverage as normalized `f32` masks; these apply one
//! to the alpha channel of a packed pixel run. Vector tiers multiply four
//! alphas per `f32x4`.

use crate::arith::Arith;
use std::marker::PhantomData;
use std::sync::Arc;
use tincture_core::{
    precondition, with_channel_type, AlphaMaskApplicator, PixelLayout,
};
use tincture_dispatch::{OptimizedFactory, Tier};
use wide::f32x4;

/// Mask applier for a uniform layout with alpha.
#[derive(Debug)]
pub struct MaskApplicator<T, A> {
    layout: Arc<PixelLayout>,
    alpha: usize,
    _marker: PhantomData<fn() -> (T, A)>,
}

impl<T: Arith, A: Tier> MaskApplicator<T, A> {
    /// `None` if the layout has no alpha.
    pub fn new(layout: Arc<PixelLayout>) -> Option<Self> {
        let alpha = layout.alpha_index()?;
        Some(Self {
            layout,
            alpha,
            _marker: PhantomData,
        })
    }

    fn check(&self, pixels: &[u8], count: usize) {
        let need = self.layout.bytes_for(count);
        precondition!(
            pixels.len() >= need,
            "pixel run holds {} bytes, {} pixels need {}",
            pixels.len(),
            count,
            need
        );
    }

    /// Sets each alpha to `f(alpha, mask[i])`, evaluated in `f32`.
    fn map_alpha(&self, pixels: &mut [u8], mask: &[f32], invert: bool) {
        self.check(pixels, mask.len());
        let ps = self.layout.pixel_size();
        let off = self.layout.channel(self.alpha).offset;
        let alpha_at = |px: usize| px * ps + off;

        A::run(|| {
            let mut done = 0;
            if A::VECTOR {
                let one = f32x4::splat(1.0);
                for (chunk, m) in mask.chunks_exact(4).enumerate() {
                    let base = chunk * 4;
                    let a: [f32; 4] =
                        std::array::from_fn(|k| T::read(&pixels[alpha_at(base + k)..]).to_f32());
                    let mut vm = f32x4::from([m[0], m[1], m[2], m[3]]);
                    if invert {
                        vm = one - vm;
                    }
                    let out = (f32x4::from(a) * vm).to_array();
                    for (k, v) in out.into_iter().enumerate() {
                        T::from_f32(v).write(&mut pixels[alpha_at(base + k)..]);
                    }
                    done = base + 4;
                }
            }
            for (i, m) in mask.iter().enumerate().skip(done) {
                let at = alpha_at(i);
                let m = if invert { 1.0 - m } else { *m };
                let v = T::read(&pixels[at..]).to_f32() * m;
                T::from_f32(v).write(&mut pixels[at..]);
            }
        });
    }
}

impl<T: Arith, A: Tier> AlphaMaskApplicator for MaskApplicator<T, A> {
    fn apply_normed_float_mask(&self, pixels: &mut [u8], mask: &[f32]) {
        self.map_alpha(pixels, mask, false);
    }

    fn apply_inverse_normed_float_mask(&self, pixels: &mut [u8], mask: &[f32]) {
        self.map_alpha(pixels, mask, true);
    }

    fn fill_inverse_alpha_normed_float_mask_with_color(
        &self,
        pixels: &mut [u8],
        mask: &[f32],
        color: &[u8],
    ) {
        let ps = self.layout.pixel_size();
        precondition!(
            color.len() >= ps,
            "fill color holds {} bytes, pixel needs {}",
            color.len(),
            ps
        );
        self.check(pixels, mask.len());
        for px in pixels.chunks_exact_mut(ps).take(mask.len()) {
            px.copy_from_slice(&color[..ps]);
        }
        let off = self.layout.channel(self.alpha).offset;
        for (i, m) in mask.iter().enumerate() {
            T::from_f32(1.0 - m).write(&mut pixels[i * ps + off..]);
        }
    }
}

/// Builds the mask applier of a layout for a tier.
///
/// Yields `None` without alpha or with mixed channel kinds.
pub struct MaskApplicatorFactory;

impl OptimizedFactory for MaskApplicatorFactory {
    type Param = Arc<PixelLayout>;
    type Output = Option<Arc<dyn AlphaMaskApplicator>>;

    fn create<A: Tier>(layout: Self::Param) -> Self::Output {
        let format = layout.uniform_format()?;
        with_channel_type!(format, T => {
            let m = MaskApplicator::<T, A>::new(layout)?;
            Some(Arc::new(m) as Arc<dyn AlphaMaskApplicator>)
        })
    }
}
