//! Pixel layout descriptors and channel write masks.
//!
//! A [`PixelLayout`] describes one pixel of one (model, depth) pairing: the
//! channel order, each channel's role and numeric kind, byte offsets, total
//! size and the alpha position. Layouts are validated on construction and
//! immutable afterwards; color spaces share them through `Arc`.
//!
//! ```rust
//! use tincture_core::{ChannelRole, DataFormat, PixelLayout};
//!
//! let layout = PixelLayout::uniform(
//!     &[("R", ChannelRole::Color), ("G", ChannelRole::Color),
//!       ("B", ChannelRole::Color), ("A", ChannelRole::Alpha)],
//!     DataFormat::U16,
//! ).unwrap();
//! assert_eq!(layout.pixel_size(), 8);
//! assert_eq!(layout.alpha_index(), Some(3));
//! ```

use crate::{DataFormat, Error, Result};
use std::fmt;

/// Semantic role of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelRole {
    /// A color component (primary, ink, luminance...).
    Color,
    /// The alpha (coverage) channel.
    Alpha,
}

/// One channel of a [`PixelLayout`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelInfo {
    /// Short name ("R", "C", "Gray"...).
    pub name: String,
    /// Color component or alpha.
    pub role: ChannelRole,
    /// Numeric kind.
    pub format: DataFormat,
    /// Byte offset within the pixel.
    pub offset: usize,
}

impl ChannelInfo {
    /// Size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.format.bytes_per_channel()
    }
}

/// Immutable description of one pixel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PixelLayout {
    channels: Vec<ChannelInfo>,
    pixel_size: usize,
    alpha: Option<usize>,
    uniform: Option<DataFormat>,
}

impl PixelLayout {
    /// Upper bound on channels; composite kernels keep a pixel on the stack.
    pub const MAX_CHANNELS: usize = 16;

    /// Builds a layout from `(name, role, format)` triples, packed in order.
    ///
    /// Fails with [`Error::InvalidLayout`] on an empty or oversized channel
    /// list, or more than one alpha channel.
    pub fn new<S: AsRef<str>>(channels: &[(S, ChannelRole, DataFormat)]) -> Result<Self> {
        if channels.is_empty() {
            return Err(Error::invalid_layout("a pixel needs at least one channel"));
        }
        if channels.len() > Self::MAX_CHANNELS {
            return Err(Error::invalid_layout(format!(
                "{} channels exceeds the limit of {}",
                channels.len(),
                Self::MAX_CHANNELS
            )));
        }

        let mut infos = Vec::with_capacity(channels.len());
        let mut offset = 0;
        let mut alpha = None;
        for (i, (name, role, format)) in channels.iter().enumerate() {
            if *role == ChannelRole::Alpha {
                if alpha.is_some() {
                    return Err(Error::invalid_layout("more than one alpha channel"));
                }
                alpha = Some(i);
            }
            infos.push(ChannelInfo {
                name: name.as_ref().to_owned(),
                role: *role,
                format: *format,
                offset,
            });
            offset += format.bytes_per_channel();
        }

        let first = infos[0].format;
        let uniform = infos.iter().all(|c| c.format == first).then_some(first);
        Ok(Self {
            channels: infos,
            pixel_size: offset,
            alpha,
            uniform,
        })
    }

    /// Builds a layout where every channel has the same format.
    pub fn uniform<S: AsRef<str>>(channels: &[(S, ChannelRole)], format: DataFormat) -> Result<Self> {
        let triples: Vec<(&str, ChannelRole, DataFormat)> = channels
            .iter()
            .map(|(n, r)| (n.as_ref(), *r, format))
            .collect();
        Self::new(&triples)
    }

    /// All channels in memory order.
    #[inline]
    pub fn channels(&self) -> &[ChannelInfo] {
        &self.channels
    }

    /// Channel `i`.
    #[inline]
    pub fn channel(&self, i: usize) -> &ChannelInfo {
        &self.channels[i]
    }

    /// Number of channels, alpha included.
    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of color channels.
    #[inline]
    pub fn color_channel_count(&self) -> usize {
        self.channels.len() - usize::from(self.alpha.is_some())
    }

    /// Bytes per pixel.
    #[inline]
    pub fn pixel_size(&self) -> usize {
        self.pixel_size
    }

    /// Index of the alpha channel.
    #[inline]
    pub fn alpha_index(&self) -> Option<usize> {
        self.alpha
    }

    /// Whether an alpha channel exists.
    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.alpha.is_some()
    }

    /// The shared format when all channels use one kind.
    #[inline]
    pub fn uniform_format(&self) -> Option<DataFormat> {
        self.uniform
    }

    /// Indices of the color channels, in order.
    pub fn color_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.channels
            .iter()
            .enumerate()
            .filter(|(_, c)| c.role == ChannelRole::Color)
            .map(|(i, _)| i)
    }

    /// Byte length of `count` tightly packed pixels.
    #[inline]
    pub fn bytes_for(&self, count: usize) -> usize {
        self.pixel_size * count
    }

    /// Flags selecting every channel of this layout.
    #[inline]
    pub fn all_channels(&self) -> ChannelFlags {
        ChannelFlags::all_of(self.channel_count())
    }
}

impl fmt::Display for PixelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.channels.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", c.name, c.format)?;
        }
        Ok(())
    }
}

/// Per-channel write mask, bit `i` for channel `i` in layout order.
///
/// The empty set means "every channel". A populated set limits write-back
/// to the channels whose bit is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChannelFlags(u64);

impl ChannelFlags {
    /// Every channel (the empty set).
    pub const ALL: Self = Self(0);

    /// From a raw bitset.
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Bits `0..count` set.
    #[inline]
    pub const fn all_of(count: usize) -> Self {
        if count >= 64 {
            Self(u64::MAX)
        } else {
            Self((1u64 << count) - 1)
        }
    }

    /// Only the listed channels.
    ///
    /// # Panics
    ///
    /// If a channel index is 64 or more.
    pub fn only(channels: &[usize]) -> Self {
        Self(channels.iter().fold(0, |acc, &i| acc | bit(i)))
    }

    /// Raw bits.
    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Adds channel `i`.
    #[inline]
    pub const fn with(self, i: usize) -> Self {
        Self(self.0 | bit(i))
    }

    /// Removes channel `i`. Removing from the empty set is a no-op.
    #[inline]
    pub const fn without(self, i: usize) -> Self {
        Self(self.0 & !bit(i))
    }

    /// Whether the mask is empty.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether channel `i` may be written.
    #[inline]
    pub const fn allows(self, i: usize) -> bool {
        self.0 == 0 || (i < 64 && self.0 & (1u64 << i) != 0)
    }

    /// Whether every one of `count` channels may be written.
    #[inline]
    pub const fn covers_all(self, count: usize) -> bool {
        let all = Self::all_of(count).0;
        self.0 == 0 || self.0 & all == all
    }
}

const fn bit(i: usize) -> u64 {
    assert!(i < 64, "precondition violated: channel index beyond the 64-bit write mask");
    1u64 << i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba(format: DataFormat) -> PixelLayout {
        PixelLayout::uniform(
            &[
                ("R", ChannelRole::Color),
                ("G", ChannelRole::Color),
                ("B", ChannelRole::Color),
                ("A", ChannelRole::Alpha),
            ],
            format,
        )
        .unwrap()
    }

    #[test]
    fn size_is_sum_of_channels() {
        for f in DataFormat::ALL {
            let l = rgba(f);
            assert_eq!(l.pixel_size(), 4 * f.bytes_per_channel());
            assert_eq!(l.channel(2).offset, 2 * f.bytes_per_channel());
            assert_eq!(l.uniform_format(), Some(f));
        }
    }

    #[test]
    fn mixed_formats() {
        let l = PixelLayout::new(&[
            ("Y", ChannelRole::Color, DataFormat::F32),
            ("A", ChannelRole::Alpha, DataFormat::U8),
        ])
        .unwrap();
        assert_eq!(l.pixel_size(), 5);
        assert_eq!(l.uniform_format(), None);
        assert_eq!(l.color_channel_count(), 1);
    }

    #[test]
    fn rejects_two_alphas() {
        let err = PixelLayout::uniform(
            &[("A", ChannelRole::Alpha), ("B", ChannelRole::Alpha)],
            DataFormat::U8,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidLayout(_)));
    }

    #[test]
    fn rejects_empty() {
        let none: [(&str, ChannelRole); 0] = [];
        assert!(PixelLayout::uniform(&none, DataFormat::U8).is_err());
    }

    #[test]
    fn color_indices_skip_alpha() {
        let idx: Vec<usize> = rgba(DataFormat::U8).color_indices().collect();
        assert_eq!(idx, [0, 1, 2]);
    }

    #[test]
    fn flags() {
        assert!(ChannelFlags::ALL.allows(7));
        assert!(ChannelFlags::ALL.covers_all(4));

        let no_alpha = ChannelFlags::all_of(4).without(3);
        assert!(no_alpha.allows(0));
        assert!(!no_alpha.allows(3));
        assert!(!no_alpha.covers_all(4));

        let only_green = ChannelFlags::only(&[1]);
        assert_eq!(only_green.bits(), 0b10);
        assert!(ChannelFlags::all_of(4).covers_all(4));
        assert_eq!(ChannelFlags::all_of(64).bits(), u64::MAX);
    }

    #[test]
    fn flags_top_bit() {
        let top = ChannelFlags::only(&[63]);
        assert_eq!(top.bits(), 1 << 63);
        assert!(top.allows(63));
        assert!(!top.allows(64));
        assert!(top.without(63).is_empty());
    }

    #[test]
    #[should_panic(expected = "precondition violated: channel index")]
    fn only_rejects_wide_index() {
        ChannelFlags::only(&[0, 64]);
    }

    #[test]
    #[should_panic(expected = "precondition violated: channel index")]
    fn with_rejects_wide_index() {
        ChannelFlags::ALL.with(64);
    }

    #[test]
    #[should_panic(expected = "precondition violated: channel index")]
    fn without_rejects_wide_index() {
        ChannelFlags::all_of(4).without(70);
    }
}
