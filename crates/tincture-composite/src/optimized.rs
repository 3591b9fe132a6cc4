//! Tier-dispatched kernels for the hot blend modes.
//!
//! `over`, `copy` and `alpha_darken` are built per CPU tier through
//! [`OptimizedOpFactory`]. Integer depths use the exact unit-space arithmetic
//! of [`Arith`]; float depths take a `wide` lane path on vector tiers with the
//! same operation order as the scalar path.

use crate::arith::Arith;
use crate::rows::composite_rows;
use crate::BlendMode;
use std::marker::PhantomData;
use std::sync::Arc;
use tincture_core::{with_channel_type, ChannelValue, CompositeOp, CompositeParams, PixelLayout};
use tincture_dispatch::{OptimizedFactory, Tier};
use tracing::trace;

/// Effective source alpha after mask and opacity.
#[inline]
fn applied_alpha<T: Arith>(alpha: T, mask: Option<u8>, opacity: T) -> T {
    let mut a = alpha;
    if let Some(m) = mask {
        a = T::mul(a, m.scale_to::<T>());
    }
    if opacity != T::UNIT {
        a = T::mul(a, opacity);
    }
    a
}

#[inline]
fn copy_colors<T: Copy>(dst: &mut [T], src: &[T], alpha: usize) {
    for (i, (d, s)) in dst.iter_mut().zip(src).enumerate() {
        if i != alpha {
            *d = *s;
        }
    }
}

macro_rules! tiered_op {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $name<T, A> {
            layout: Arc<PixelLayout>,
            _marker: PhantomData<fn() -> (T, A)>,
        }

        impl<T: Arith, A: Tier> $name<T, A> {
            /// Binds the kernel to `layout`, which must be uniform in `T`.
            pub fn new(layout: Arc<PixelLayout>) -> Self {
                debug_assert_eq!(layout.uniform_format(), Some(T::FORMAT));
                Self {
                    layout,
                    _marker: PhantomData,
                }
            }
        }
    };
}

tiered_op!(
    /// Porter-Duff over.
    OverOp
);
tiered_op!(
    /// Replacement weighted by opacity and mask.
    CopyOp
);
tiered_op!(
    /// Alpha darken with full flow: color lerps toward the source while
    /// alpha accumulates up to the opacity.
    AlphaDarkenOp
);

impl<T: Arith, A: Tier> CompositeOp for OverOp<T, A> {
    fn id(&self) -> &str {
        BlendMode::Over.id()
    }

    fn tier(&self) -> &'static str {
        A::TIER.name()
    }

    fn composite(&self, params: CompositeParams<'_>) {
        let opacity = T::from_f32(params.opacity);
        let alpha = self.layout.alpha_index();
        trace!(tier = %A::TIER, rows = params.rows, cols = params.cols, "over");

        A::run(|| {
            composite_rows::<T>(&self.layout, params, |dst, src, mask| {
                let sa = applied_alpha(alpha.map_or(T::UNIT, |a| src[a]), mask, opacity);
                if !(sa > T::ZERO) {
                    return;
                }
                if sa == T::UNIT {
                    dst.copy_from_slice(src);
                    return;
                }
                let Some(a) = alpha else {
                    T::lerp_lanes(dst, src, sa, A::VECTOR);
                    return;
                };

                let da = dst[a];
                let (new_alpha, blend) = if da == T::UNIT {
                    (T::UNIT, sa)
                } else if da == T::ZERO {
                    (sa, T::UNIT)
                } else {
                    let na = T::union(da, sa);
                    (na, T::div(sa, na))
                };

                if blend == T::UNIT {
                    copy_colors(dst, src, a);
                } else {
                    T::lerp_lanes(dst, src, blend, A::VECTOR);
                }
                dst[a] = new_alpha;
            })
        });
    }
}

impl<T: Arith, A: Tier> CompositeOp for CopyOp<T, A> {
    fn id(&self) -> &str {
        BlendMode::Copy.id()
    }

    fn tier(&self) -> &'static str {
        A::TIER.name()
    }

    fn composite(&self, params: CompositeParams<'_>) {
        let opacity = T::from_f32(params.opacity);
        let alpha = self.layout.alpha_index();
        trace!(tier = %A::TIER, rows = params.rows, cols = params.cols, "copy");

        A::run(|| {
            composite_rows::<T>(&self.layout, params, |dst, src, mask| {
                let o = applied_alpha(T::UNIT, mask, opacity);
                if o == T::UNIT {
                    dst.copy_from_slice(src);
                    return;
                }
                if !(o > T::ZERO) {
                    return;
                }
                let Some(a) = alpha else {
                    T::lerp_lanes(dst, src, o, A::VECTOR);
                    return;
                };

                let (da, sa) = (dst[a], src[a]);
                let na = T::lerp(da, sa, o);
                if na > T::ZERO {
                    for i in 0..dst.len() {
                        if i != a {
                            let dm = T::mul(dst[i], da);
                            let sm = T::mul(src[i], sa);
                            dst[i] = T::div(T::lerp(dm, sm, o), na);
                        }
                    }
                }
                dst[a] = na;
            })
        });
    }
}

impl<T: Arith, A: Tier> CompositeOp for AlphaDarkenOp<T, A> {
    fn id(&self) -> &str {
        BlendMode::AlphaDarken.id()
    }

    fn tier(&self) -> &'static str {
        A::TIER.name()
    }

    fn composite(&self, params: CompositeParams<'_>) {
        let opacity = T::from_f32(params.opacity);
        let alpha = self.layout.alpha_index();
        trace!(tier = %A::TIER, rows = params.rows, cols = params.cols, "alpha_darken");

        A::run(|| {
            composite_rows::<T>(&self.layout, params, |dst, src, mask| {
                let Some(a) = alpha else {
                    let t = applied_alpha(T::UNIT, mask, opacity);
                    T::lerp_lanes(dst, src, t, A::VECTOR);
                    return;
                };

                let mask_alpha = applied_alpha(src[a], mask, T::UNIT);
                let sa = T::mul(mask_alpha, opacity);
                let da = dst[a];

                if da != T::ZERO {
                    T::lerp_lanes(dst, src, sa, A::VECTOR);
                } else {
                    copy_colors(dst, src, a);
                }
                dst[a] = if opacity > da {
                    T::lerp(da, opacity, mask_alpha)
                } else {
                    da
                };
            })
        });
    }
}

/// Which optimized kernel to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizedMode {
    /// [`OverOp`].
    Over,
    /// [`CopyOp`].
    Copy,
    /// [`AlphaDarkenOp`].
    AlphaDarken,
}

impl OptimizedMode {
    /// Every optimized mode.
    pub const ALL: [OptimizedMode; 3] = [Self::Over, Self::Copy, Self::AlphaDarken];

    /// The blend mode implemented.
    pub const fn blend_mode(self) -> BlendMode {
        match self {
            Self::Over => BlendMode::Over,
            Self::Copy => BlendMode::Copy,
            Self::AlphaDarken => BlendMode::AlphaDarken,
        }
    }
}

/// Builds optimized composite ops for a tier.
///
/// Yields `None` for layouts with mixed channel kinds.
pub struct OptimizedOpFactory;

impl OptimizedFactory for OptimizedOpFactory {
    type Param = (OptimizedMode, Arc<PixelLayout>);
    type Output = Option<Arc<dyn CompositeOp>>;

    fn create<A: Tier>((mode, layout): Self::Param) -> Self::Output {
        let format = layout.uniform_format()?;
        Some(with_channel_type!(format, T => build::<T, A>(mode, layout)))
    }
}

fn build<T: Arith, A: Tier>(mode: OptimizedMode, layout: Arc<PixelLayout>) -> Arc<dyn CompositeOp> {
    match mode {
        OptimizedMode::Over => Arc::new(OverOp::<T, A>::new(layout)),
        OptimizedMode::Copy => Arc::new(CopyOp::<T, A>::new(layout)),
        OptimizedMode::AlphaDarken => Arc::new(AlphaDarkenOp::<T, A>::new(layout)),
    }
}
