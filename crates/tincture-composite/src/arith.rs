//! Channel arithmetic in unit space.
//!
//! Integer kinds treat `MAX` as 1.0 and round every product and quotient to
//! nearest, so `mul(x, UNIT) == x` and `lerp(a, b, UNIT) == b` hold exactly.
//! Float kinds use plain IEEE arithmetic.

use half::f16;
use tincture_core::ChannelValue;
use wide::f32x4;

/// Unit-space arithmetic on one channel kind.
pub trait Arith: ChannelValue {
    /// `a * b`.
    fn mul(a: Self, b: Self) -> Self;

    /// `a * b * c`.
    fn mul3(a: Self, b: Self, c: Self) -> Self;

    /// `a / b`; integers clamp to `UNIT`, a zero divisor yields `UNIT`
    /// (or `ZERO` when `a` is zero).
    fn div(a: Self, b: Self) -> Self;

    /// `a + (b - a) * t`.
    fn lerp(a: Self, b: Self, t: Self) -> Self;

    /// `1 - a`.
    fn inv(a: Self) -> Self;

    /// Porter-Duff alpha union, `a + b - a * b`.
    fn union(a: Self, b: Self) -> Self;

    /// Lerps every lane of `dst` toward `src` by `t`.
    ///
    /// `vector` selects the explicit-SIMD path where one exists; both paths
    /// give identical results.
    #[inline]
    fn lerp_lanes(dst: &mut [Self], src: &[Self], t: Self, vector: bool) {
        let _ = vector;
        for (d, s) in dst.iter_mut().zip(src) {
            *d = Self::lerp(*d, *s, t);
        }
    }
}

macro_rules! impl_int_arith {
    ($t:ty, $w:ty) => {
        impl Arith for $t {
            #[inline]
            fn mul(a: Self, b: Self) -> Self {
                const MAX: $w = <$t>::MAX as $w;
                ((a as $w * b as $w + MAX / 2) / MAX) as $t
            }

            #[inline]
            fn mul3(a: Self, b: Self, c: Self) -> Self {
                const MAX2: $w = <$t>::MAX as $w * <$t>::MAX as $w;
                ((a as $w * b as $w * c as $w + MAX2 / 2) / MAX2) as $t
            }

            #[inline]
            fn div(a: Self, b: Self) -> Self {
                const MAX: $w = <$t>::MAX as $w;
                if b == 0 {
                    return if a == 0 { 0 } else { <$t>::MAX };
                }
                ((a as $w * MAX + b as $w / 2) / b as $w).min(MAX) as $t
            }

            #[inline]
            fn lerp(a: Self, b: Self, t: Self) -> Self {
                const MAX: $w = <$t>::MAX as $w;
                let d = (b as $w - a as $w) * t as $w;
                let q = if d >= 0 {
                    (d + MAX / 2) / MAX
                } else {
                    (d - MAX / 2) / MAX
                };
                (a as $w + q) as $t
            }

            #[inline]
            fn inv(a: Self) -> Self {
                <$t>::MAX - a
            }

            #[inline]
            fn union(a: Self, b: Self) -> Self {
                (a as $w + b as $w - Self::mul(a, b) as $w) as $t
            }
        }
    };
}

impl_int_arith!(u8, i64);
impl_int_arith!(u16, i64);
impl_int_arith!(u32, i128);

impl Arith for f32 {
    #[inline]
    fn mul(a: Self, b: Self) -> Self {
        a * b
    }

    #[inline]
    fn mul3(a: Self, b: Self, c: Self) -> Self {
        a * b * c
    }

    #[inline]
    fn div(a: Self, b: Self) -> Self {
        if b == 0.0 { 0.0 } else { a / b }
    }

    #[inline]
    fn lerp(a: Self, b: Self, t: Self) -> Self {
        a + (b - a) * t
    }

    #[inline]
    fn inv(a: Self) -> Self {
        1.0 - a
    }

    #[inline]
    fn union(a: Self, b: Self) -> Self {
        a + b - a * b
    }

    #[inline]
    fn lerp_lanes(dst: &mut [Self], src: &[Self], t: Self, vector: bool) {
        let mut done = 0;
        if vector {
            let vt = f32x4::splat(t);
            for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
                let vd = f32x4::from([d[0], d[1], d[2], d[3]]);
                let vs = f32x4::from([s[0], s[1], s[2], s[3]]);
                d.copy_from_slice(&(vd + (vs - vd) * vt).to_array());
                done += 4;
            }
        }
        for (d, s) in dst[done..].iter_mut().zip(&src[done..]) {
            *d = <Self as Arith>::lerp(*d, *s, t);
        }
    }
}

impl Arith for f64 {
    #[inline]
    fn mul(a: Self, b: Self) -> Self {
        a * b
    }

    #[inline]
    fn mul3(a: Self, b: Self, c: Self) -> Self {
        a * b * c
    }

    #[inline]
    fn div(a: Self, b: Self) -> Self {
        if b == 0.0 { 0.0 } else { a / b }
    }

    #[inline]
    fn lerp(a: Self, b: Self, t: Self) -> Self {
        a + (b - a) * t
    }

    #[inline]
    fn inv(a: Self) -> Self {
        1.0 - a
    }

    #[inline]
    fn union(a: Self, b: Self) -> Self {
        a + b - a * b
    }
}

impl Arith for f16 {
    #[inline]
    fn mul(a: Self, b: Self) -> Self {
        f16::from_f32(a.to_f32() * b.to_f32())
    }

    #[inline]
    fn mul3(a: Self, b: Self, c: Self) -> Self {
        f16::from_f32(a.to_f32() * b.to_f32() * c.to_f32())
    }

    #[inline]
    fn div(a: Self, b: Self) -> Self {
        f16::from_f32(<f32 as Arith>::div(a.to_f32(), b.to_f32()))
    }

    #[inline]
    fn lerp(a: Self, b: Self, t: Self) -> Self {
        f16::from_f32(<f32 as Arith>::lerp(a.to_f32(), b.to_f32(), t.to_f32()))
    }

    #[inline]
    fn inv(a: Self) -> Self {
        f16::from_f32(1.0 - a.to_f32())
    }

    #[inline]
    fn union(a: Self, b: Self) -> Self {
        f16::from_f32(<f32 as Arith>::union(a.to_f32(), b.to_f32()))
    }
}
