//! Composite ops evaluated in normalized `f64`.
//!
//! Covers the alpha modes and every separable mode. Separable modes use the
//! straight-alpha formula
//!
//! ```text
//! a' = sa + da - sa * da
//! c' = ((1 - sa) * da * d + (1 - da) * sa * s + sa * da * f(s, d)) / a'
//! ```
//!
//! where `sa` already carries mask and opacity.

use crate::rows::composite_rows;
use crate::BlendMode;
use std::marker::PhantomData;
use std::sync::Arc;
use tincture_core::{ChannelValue, CompositeOp, CompositeParams, PixelLayout};

/// A non-optimized blend mode bound to one layout.
#[derive(Debug)]
pub struct GenericOp<T> {
    mode: BlendMode,
    layout: Arc<PixelLayout>,
    _channel: PhantomData<fn() -> T>,
}

impl<T: ChannelValue> GenericOp<T> {
    /// Binds `mode` to `layout`, which must be uniform in `T`.
    pub fn new(mode: BlendMode, layout: Arc<PixelLayout>) -> Self {
        debug_assert_eq!(layout.uniform_format(), Some(T::FORMAT));
        Self {
            mode,
            layout,
            _channel: PhantomData,
        }
    }

    /// The blend mode.
    pub fn mode(&self) -> BlendMode {
        self.mode
    }
}

impl<T: ChannelValue> CompositeOp for GenericOp<T> {
    fn id(&self) -> &str {
        self.mode.id()
    }

    fn composite(&self, params: CompositeParams<'_>) {
        let mode = self.mode;
        let alpha = self.layout.alpha_index();
        let opacity = params.opacity as f64;
        let n = self.layout.channel_count();

        composite_rows::<T>(&self.layout, params, |dst, src, mask| {
            let coverage = mask.map_or(1.0, |m| m as f64 / 255.0) * opacity;
            let sa = alpha.map_or(1.0, |a| src[a].to_f64()) * coverage;
            let da = alpha.map_or(1.0, |a| dst[a].to_f64());
            let colors = (0..n).filter(|&i| Some(i) != alpha);

            match mode {
                BlendMode::Clear => match alpha {
                    Some(a) => dst[a] = T::from_f64(da * (1.0 - coverage)),
                    None => {
                        for i in colors {
                            dst[i] = T::from_f64(dst[i].to_f64() * (1.0 - coverage));
                        }
                    }
                },
                BlendMode::Erase => {
                    if let Some(a) = alpha {
                        dst[a] = T::from_f64(da * (1.0 - sa));
                    }
                }
                BlendMode::DestinationIn => {
                    if let Some(a) = alpha {
                        dst[a] = T::from_f64(da * sa);
                    }
                }
                BlendMode::Behind => {
                    let Some(a) = alpha else { return };
                    if da >= 1.0 {
                        return;
                    }
                    let na = sa + da - sa * da;
                    if na <= 0.0 {
                        return;
                    }
                    for i in colors {
                        let v = (dst[i].to_f64() * da + src[i].to_f64() * sa * (1.0 - da)) / na;
                        dst[i] = T::from_f64(v);
                    }
                    dst[a] = T::from_f64(na);
                }
                BlendMode::DestinationAtop => {
                    let Some(a) = alpha else { return };
                    if sa > 0.0 {
                        for i in colors {
                            let (s, d) = (src[i].to_f64(), dst[i].to_f64());
                            let v = if da > 0.0 { s + (d - s) * da } else { s };
                            dst[i] = T::from_f64(v);
                        }
                    }
                    dst[a] = T::from_f64(sa);
                }
                BlendMode::Greater => {
                    let Some(a) = alpha else { return };
                    let w = 1.0 / (1.0 + (-40.0 * (da - sa)).exp());
                    let na = (da * w + sa * (1.0 - w)).clamp(0.0, 1.0).max(da);
                    if na <= da {
                        return;
                    }
                    if da > 0.0 {
                        let t = 1.0 - (1.0 - na) / (1.0 - da + f64::EPSILON);
                        for i in colors {
                            let dm = dst[i].to_f64() * da;
                            let v = dm + (src[i].to_f64() - dm) * t;
                            dst[i] = T::from_f64(v / na);
                        }
                    } else {
                        for i in colors {
                            dst[i] = src[i];
                        }
                    }
                    dst[a] = T::from_f64(na);
                }
                _ => {
                    let na = sa + da - sa * da;
                    if na <= 0.0 {
                        return;
                    }
                    for i in colors {
                        let (s, d) = (src[i].to_f64(), dst[i].to_f64());
                        let cf = mode.blend(s, d);
                        let v = ((1.0 - sa) * da * d + (1.0 - da) * sa * s + sa * da * cf) / na;
                        dst[i] = T::from_f64(v);
                    }
                    if let Some(a) = alpha {
                        dst[a] = T::from_f64(na);
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use tincture_core::{model, DataFormat};

    fn rgba_f32() -> Arc<PixelLayout> {
        Arc::new(model::RGBA.layout(DataFormat::F32).unwrap())
    }

    fn run(mode: BlendMode, dst: [f32; 4], src: [f32; 4], opacity: f32) -> [f32; 4] {
        let op = GenericOp::<f32>::new(mode, rgba_f32());
        let mut d: Vec<u8> = bytemuck_bytes(&dst);
        let s: Vec<u8> = bytemuck_bytes(&src);
        op.composite(CompositeParams::new(&mut d, 16, &s, 16, 1, 1).with_opacity(opacity));
        let mut out = [0.0f32; 4];
        for (i, o) in out.iter_mut().enumerate() {
            *o = f32::read(&d[i * 4..]);
        }
        out
    }

    fn bytemuck_bytes(px: &[f32; 4]) -> Vec<u8> {
        let mut v = vec![0u8; 16];
        for (i, c) in px.iter().enumerate() {
            c.write(&mut v[i * 4..]);
        }
        v
    }

    #[test]
    fn multiply_opaque() {
        let out = run(BlendMode::Multiply, [0.5, 1.0, 0.2, 1.0], [0.5, 0.5, 0.5, 1.0], 1.0);
        assert_abs_diff_eq!(out[0], 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(out[1], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(out[2], 0.1, epsilon = 1e-6);
        assert_eq!(out[3], 1.0);
    }

    #[test]
    fn separable_over_transparent_is_source() {
        let out = run(BlendMode::Screen, [0.9, 0.9, 0.9, 0.0], [0.1, 0.2, 0.3, 1.0], 1.0);
        assert_abs_diff_eq!(out[0], 0.1, epsilon = 1e-6);
        assert_abs_diff_eq!(out[2], 0.3, epsilon = 1e-6);
        assert_eq!(out[3], 1.0);
    }

    #[test]
    fn half_opacity_mixes() {
        let out = run(BlendMode::Darken, [0.8, 0.8, 0.8, 1.0], [0.2, 0.2, 0.2, 1.0], 0.5);
        assert_abs_diff_eq!(out[0], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn erase_and_destination_in() {
        let out = run(BlendMode::Erase, [0.3, 0.3, 0.3, 1.0], [0.0, 0.0, 0.0, 0.25], 1.0);
        assert_abs_diff_eq!(out[3], 0.75, epsilon = 1e-6);
        assert_eq!(out[0], 0.3);
        let out = run(BlendMode::DestinationIn, [0.3, 0.3, 0.3, 0.5], [0.0, 0.0, 0.0, 0.5], 1.0);
        assert_abs_diff_eq!(out[3], 0.25, epsilon = 1e-6);
    }

    #[test]
    fn behind_keeps_opaque_destination() {
        let out = run(BlendMode::Behind, [0.3, 0.4, 0.5, 1.0], [1.0, 1.0, 1.0, 1.0], 1.0);
        assert_eq!(out, [0.3, 0.4, 0.5, 1.0]);
        let out = run(BlendMode::Behind, [0.0, 0.0, 0.0, 0.0], [1.0, 0.5, 0.0, 1.0], 1.0);
        assert_eq!(out, [1.0, 0.5, 0.0, 1.0]);
    }

    #[test]
    fn clear_fades_alpha() {
        let out = run(BlendMode::Clear, [0.3, 0.3, 0.3, 1.0], [0.0; 4], 0.25);
        assert_abs_diff_eq!(out[3], 0.75, epsilon = 1e-6);
    }

    #[test]
    fn integer_depth_rounds_and_clamps() {
        let layout = Arc::new(model::RGBA.layout(DataFormat::U8).unwrap());
        let op = GenericOp::<u8>::new(BlendMode::Add, layout);
        let mut d = [200u8, 10, 0, 255];
        let s = [100u8, 10, 0, 255];
        op.composite(CompositeParams::new(&mut d, 4, &s, 4, 1, 1));
        assert_eq!(d, [255, 20, 0, 255]);
    }
}
