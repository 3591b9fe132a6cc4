//! Built-in color models.
//!
//! A [`ColorModel`] names a set of components in memory order. Pairing it
//! with a [`DataFormat`] yields the [`PixelLayout`] of one color space
//! family.

use crate::{ChannelRole, DataFormat, PixelLayout, Result};

/// A color model: id plus channel names and roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorModel {
    /// Model id used in color space identities.
    pub id: &'static str,
    /// Channels in memory order.
    pub channels: &'static [(&'static str, ChannelRole)],
    /// Profile applied when a lookup names none.
    pub default_profile: Option<&'static str>,
}

/// Red, green, blue, alpha.
pub const RGBA: ColorModel = ColorModel {
    id: "RGBA",
    channels: &[
        ("R", ChannelRole::Color),
        ("G", ChannelRole::Color),
        ("B", ChannelRole::Color),
        ("A", ChannelRole::Alpha),
    ],
    default_profile: Some("sRGB"),
};

/// Gray with alpha.
pub const GRAYA: ColorModel = ColorModel {
    id: "GRAYA",
    channels: &[("Gray", ChannelRole::Color), ("A", ChannelRole::Alpha)],
    default_profile: None,
};

/// Gray without alpha.
pub const GRAY: ColorModel = ColorModel {
    id: "GRAY",
    channels: &[("Gray", ChannelRole::Color)],
    default_profile: None,
};

/// Cyan, magenta, yellow, key, alpha.
pub const CMYKA: ColorModel = ColorModel {
    id: "CMYKA",
    channels: &[
        ("C", ChannelRole::Color),
        ("M", ChannelRole::Color),
        ("Y", ChannelRole::Color),
        ("K", ChannelRole::Color),
        ("A", ChannelRole::Alpha),
    ],
    default_profile: None,
};

/// CIE XYZ with alpha.
pub const XYZA: ColorModel = ColorModel {
    id: "XYZA",
    channels: &[
        ("X", ChannelRole::Color),
        ("Y", ChannelRole::Color),
        ("Z", ChannelRole::Color),
        ("A", ChannelRole::Alpha),
    ],
    default_profile: None,
};

/// Every built-in model.
pub const BUILTIN_MODELS: [ColorModel; 5] = [RGBA, GRAYA, GRAY, CMYKA, XYZA];

impl ColorModel {
    /// Finds a built-in model by id.
    pub fn by_id(id: &str) -> Option<Self> {
        BUILTIN_MODELS.into_iter().find(|m| m.id.eq_ignore_ascii_case(id))
    }

    /// Layout of this model at `format`.
    pub fn layout(&self, format: DataFormat) -> Result<PixelLayout> {
        PixelLayout::uniform(self.channels, format)
    }

    /// Whether the model has an alpha channel.
    pub fn has_alpha(&self) -> bool {
        self.channels.iter().any(|(_, r)| *r == ChannelRole::Alpha)
    }
}
