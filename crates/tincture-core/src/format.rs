//! Channel numeric kinds.
//!
//! [`DataFormat`] is the closed set of per-channel representations a pixel
//! layout may use. Its [`depth_id`](DataFormat::depth_id) doubles as the depth
//! component of a color space identity.
//!
//! ```rust
//! use tincture_core::DataFormat;
//!
//! assert_eq!(DataFormat::from_depth_id("U16"), Some(DataFormat::U16));
//! assert_eq!(DataFormat::F16.bytes_per_channel(), 2);
//! assert!(DataFormat::F32.is_float());
//! ```

use std::fmt;

/// Runtime channel data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum DataFormat {
    /// 8-bit unsigned integer, [0, 255].
    U8,
    /// 16-bit unsigned integer, [0, 65535].
    U16,
    /// 32-bit unsigned integer.
    U32,
    /// IEEE half float.
    F16,
    /// IEEE single float.
    #[default]
    F32,
    /// IEEE double float.
    F64,
}

impl DataFormat {
    /// Every format, integers first.
    pub const ALL: [DataFormat; 6] = [
        Self::U8,
        Self::U16,
        Self::U32,
        Self::F16,
        Self::F32,
        Self::F64,
    ];

    /// Size of one channel in bytes.
    #[inline]
    pub const fn bytes_per_channel(&self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 | Self::F16 => 2,
            Self::U32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    /// Storage width in bits.
    #[inline]
    pub const fn bits(&self) -> u32 {
        self.bytes_per_channel() as u32 * 8
    }

    /// Significant bits: the integer width, or the float mantissa plus the
    /// implicit bit. Used to rank depth changes by information loss.
    #[inline]
    pub const fn precision_bits(&self) -> u32 {
        match self {
            Self::U8 => 8,
            Self::U16 => 16,
            Self::U32 => 32,
            Self::F16 => 11,
            Self::F32 => 24,
            Self::F64 => 53,
        }
    }

    /// Whether this is a floating-point format.
    #[inline]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::F16 | Self::F32 | Self::F64)
    }

    /// Whether this is an integer format.
    #[inline]
    pub const fn is_integer(&self) -> bool {
        !self.is_float()
    }

    /// Largest integer value, `None` for floats.
    #[inline]
    pub const fn int_max(&self) -> Option<u64> {
        match self {
            Self::U8 => Some(u8::MAX as u64),
            Self::U16 => Some(u16::MAX as u64),
            Self::U32 => Some(u32::MAX as u64),
            _ => None,
        }
    }

    /// Depth identifier used in color space identities.
    pub const fn depth_id(&self) -> &'static str {
        match self {
            Self::U8 => "U8",
            Self::U16 => "U16",
            Self::U32 => "U32",
            Self::F16 => "F16",
            Self::F32 => "F32",
            Self::F64 => "F64",
        }
    }

    /// Parses a depth identifier.
    ///
    /// Accepts the canonical ids and a few long spellings
    /// (`"8-bit"`, `"16-bit"`, `"half"`, `"float"`).
    pub fn from_depth_id(id: &str) -> Option<Self> {
        let id = id.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.depth_id().eq_ignore_ascii_case(id))
            .or(match id.to_ascii_lowercase().as_str() {
                "8-bit" | "8bit" | "8-bit int" => Some(Self::U8),
                "16-bit" | "16bit" | "16-bit int" => Some(Self::U16),
                "32-bit int" => Some(Self::U32),
                "half" | "16-bit float" => Some(Self::F16),
                "float" | "32-bit float" => Some(Self::F32),
                "double" | "64-bit float" => Some(Self::F64),
                _ => None,
            })
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.depth_id())
    }
}
