//! Per-channel value types.
//!
//! [`ChannelValue`] is implemented for the six numeric kinds of
//! [`DataFormat`]. Generic pixel algorithms are written once over
//! `T: ChannelValue` and monomorphized per depth.
//!
//! # Normalization
//!
//! - Integers map `[0, MAX]` onto `[0.0, 1.0]`.
//! - Floats are stored as-is and may leave `[0, 1]` (HDR).
//!
//! # Depth scaling
//!
//! [`ChannelValue::scale_to`] converts between kinds. Integer -> integer uses
//! a rounded rational `v * DMAX / SMAX`, so `u8 -> u16` is exactly `v * 257`
//! and the round trip back is exact:
//!
//! ```rust
//! use tincture_core::ChannelValue;
//!
//! let wide: u16 = 128u8.scale_to();
//! assert_eq!(wide, 32896);
//! assert_eq!(wide.scale_to::<u8>(), 128);
//! ```

use crate::DataFormat;
use half::f16;
use std::fmt::Debug;

/// A single channel value of one of the supported numeric kinds.
pub trait ChannelValue:
    bytemuck::Pod + Default + PartialEq + PartialOrd + Debug + Send + Sync + 'static
{
    /// The runtime tag of this type.
    const FORMAT: DataFormat;
    /// Fully transparent / black.
    const ZERO: Self;
    /// Fully opaque / white.
    const UNIT: Self;

    /// Normalized value as `f32`.
    fn to_f32(self) -> f32;

    /// From a normalized `f32`. Integers clamp to `[0, 1]` and round.
    fn from_f32(v: f32) -> Self;

    /// Normalized value as `f64`.
    fn to_f64(self) -> f64;

    /// From a normalized `f64`. Integers clamp to `[0, 1]` and round.
    fn from_f64(v: f64) -> Self;

    /// Raw integer value (floats: truncated, only meaningful for integers).
    fn int_raw(self) -> u64;

    /// From a raw integer value.
    fn from_int_raw(v: u64) -> Self;

    /// Converts to another channel kind, preserving normalized meaning.
    #[inline]
    fn scale_to<D: ChannelValue>(self) -> D {
        match (Self::FORMAT.int_max(), D::FORMAT.int_max()) {
            (Some(smax), Some(dmax)) => {
                let v = self.int_raw() as u128;
                let (smax, dmax) = (smax as u128, dmax as u128);
                D::from_int_raw(((v * dmax + smax / 2) / smax) as u64)
            }
            _ => D::from_f64(self.to_f64()),
        }
    }

    /// Reads a native-endian value from the start of `bytes`.
    #[inline]
    fn read(bytes: &[u8]) -> Self {
        bytemuck::pod_read_unaligned(&bytes[..size_of::<Self>()])
    }

    /// Writes a native-endian value to the start of `bytes`.
    #[inline]
    fn write(self, bytes: &mut [u8]) {
        bytes[..size_of::<Self>()].copy_from_slice(bytemuck::bytes_of(&self));
    }
}

macro_rules! impl_int_channel {
    ($t:ty, $fmt:ident) => {
        impl ChannelValue for $t {
            const FORMAT: DataFormat = DataFormat::$fmt;
            const ZERO: Self = 0;
            const UNIT: Self = <$t>::MAX;

            #[inline]
            fn to_f32(self) -> f32 {
                (self as f64 / <$t>::MAX as f64) as f32
            }

            #[inline]
            fn from_f32(v: f32) -> Self {
                Self::from_f64(v as f64)
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64 / <$t>::MAX as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                (v.clamp(0.0, 1.0) * <$t>::MAX as f64).round() as $t
            }

            #[inline]
            fn int_raw(self) -> u64 {
                self as u64
            }

            #[inline]
            fn from_int_raw(v: u64) -> Self {
                v.min(<$t>::MAX as u64) as $t
            }
        }
    };
}

impl_int_channel!(u8, U8);
impl_int_channel!(u16, U16);
impl_int_channel!(u32, U32);

impl ChannelValue for f16 {
    const FORMAT: DataFormat = DataFormat::F16;
    const ZERO: Self = f16::ZERO;
    const UNIT: Self = f16::ONE;

    #[inline]
    fn to_f32(self) -> f32 {
        f16::to_f32(self)
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        f16::from_f32(v)
    }

    #[inline]
    fn to_f64(self) -> f64 {
        f16::to_f64(self)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        f16::from_f64(v)
    }

    #[inline]
    fn int_raw(self) -> u64 {
        f16::to_f32(self) as u64
    }

    #[inline]
    fn from_int_raw(v: u64) -> Self {
        f16::from_f64(v as f64)
    }
}

impl ChannelValue for f32 {
    const FORMAT: DataFormat = DataFormat::F32;
    const ZERO: Self = 0.0;
    const UNIT: Self = 1.0;

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        v
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn int_raw(self) -> u64 {
        self as u64
    }

    #[inline]
    fn from_int_raw(v: u64) -> Self {
        v as f32
    }
}

impl ChannelValue for f64 {
    const FORMAT: DataFormat = DataFormat::F64;
    const ZERO: Self = 0.0;
    const UNIT: Self = 1.0;

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        v as f64
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn int_raw(self) -> u64 {
        self as u64
    }

    #[inline]
    fn from_int_raw(v: u64) -> Self {
        v as f64
    }
}

/// Calls `$body` with `$t` bound to the Rust type of a [`DataFormat`].
///
/// ```rust
/// use tincture_core::{with_channel_type, ChannelValue, DataFormat};
///
/// let unit = with_channel_type!(DataFormat::U16, T => T::UNIT.to_f32());
/// assert_eq!(unit, 1.0);
/// ```
#[macro_export]
macro_rules! with_channel_type {
    ($format:expr, $t:ident => $body:expr) => {
        match $format {
            $crate::DataFormat::U8 => {
                type $t = u8;
                $body
            }
            $crate::DataFormat::U16 => {
                type $t = u16;
                $body
            }
            $crate::DataFormat::U32 => {
                type $t = u32;
                $body
            }
            $crate::DataFormat::F16 => {
                type $t = $crate::f16;
                $body
            }
            $crate::DataFormat::F32 => {
                type $t = f32;
                $body
            }
            $crate::DataFormat::F64 => {
                type $t = f64;
                $body
            }
        }
    };
}
