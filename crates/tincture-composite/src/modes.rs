//! Blend-mode vocabulary and per-channel blend functions.
//!
//! Ids follow the conventional short names used in layered image files
//! ("over", "multiply", "destination-in"...).
//!
//! # Categories
//!
//! - **Optimized**: `over`, `copy`, `alpha_darken` - tier-dispatched kernels
//! - **Alpha**: Porter-Duff style ops that mostly move alpha
//! - **Separable**: a per-channel function `f(src, dst)` combined with the
//!   standard straight-alpha formula
//!
//! ```rust
//! use tincture_composite::BlendMode;
//!
//! let m = BlendMode::from_id("screen").unwrap();
//! assert!(m.is_separable());
//! assert_eq!(m.blend(0.5, 0.5), 0.75);
//! ```

use std::fmt;

macro_rules! blend_modes {
    ($($(#[$doc:meta])* $variant:ident => $id:literal,)+) => {
        /// A blend mode.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum BlendMode {
            $($(#[$doc])* $variant,)+
        }

        impl BlendMode {
            /// Every mode.
            pub const ALL: &'static [BlendMode] = &[$(BlendMode::$variant,)+];

            /// Conventional id.
            pub const fn id(self) -> &'static str {
                match self {
                    $(BlendMode::$variant => $id,)+
                }
            }
        }
    };
}

blend_modes! {
    /// Porter-Duff over.
    Over => "over",
    /// Replace, weighted by opacity and mask.
    Copy => "copy",
    /// Painting accumulation capped at opacity.
    AlphaDarken => "alpha_darken",
    /// Fade destination toward transparent.
    Clear => "clear",
    /// Remove destination alpha where source is opaque.
    Erase => "erase",
    /// Paint underneath the destination.
    Behind => "behind",
    /// Keep destination inside source alpha.
    DestinationIn => "destination-in",
    /// Destination atop source.
    DestinationAtop => "destination-atop",
    /// Raise destination alpha toward source alpha.
    Greater => "greater",
    /// `s * d`.
    Multiply => "multiply",
    /// `s + d - s * d`.
    Screen => "screen",
    /// Hard light with operands swapped.
    Overlay => "overlay",
    /// `min(s, d)`.
    Darken => "darken",
    /// `max(s, d)`.
    Lighten => "lighten",
    /// `s + d`.
    Add => "add",
    /// `d - s`.
    Subtract => "subtract",
    /// `d - (1 - s)`.
    InverseSubtract => "inverse_subtract",
    /// `|d - s|`.
    Diff => "diff",
    /// `s + d - 2 s d`.
    Exclusion => "exclusion",
    /// `d / s`.
    Divide => "divide",
    /// Color dodge.
    Dodge => "dodge",
    /// Color burn.
    Burn => "burn",
    /// Addition.
    LinearDodge => "linear_dodge",
    /// `s + d - 1`.
    LinearBurn => "linear_burn",
    /// Hard light.
    HardLight => "hard_light",
    /// Photoshop soft light.
    SoftLight => "soft_light",
    /// W3C/SVG soft light.
    SoftLightSvg => "soft_light_svg",
    /// `d + 2 s - 1`.
    LinearLight => "linear_light",
    /// Burn below half, dodge above.
    VividLight => "vivid_light",
    /// Darken below half, lighten above.
    PinLight => "pin_light",
    /// Thresholded vivid light.
    HardMix => "hard_mix",
    /// `d + s - 0.5`.
    GrainMerge => "grain_merge",
    /// `d - s + 0.5`.
    GrainExtract => "grain_extract",
    /// `sqrt(s * d)`.
    GeometricMean => "geometric_mean",
    /// Harmonic mean.
    Parallel => "parallel",
    /// `(s + d) / 2`.
    Allanon => "allanon",
    /// `|d - s|`, Krita-style equivalence.
    Equivalence => "equivalence",
    /// `1 - |1 - s - d|`.
    Negation => "negation",
    /// `d ^ (1 / s)`.
    GammaDark => "gamma_dark",
    /// `d ^ s`.
    GammaLight => "gamma_light",
}

impl BlendMode {
    /// Parses an id.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.id() == id)
    }

    /// Whether the mode has a tier-dispatched kernel.
    pub const fn is_optimized(self) -> bool {
        matches!(self, Self::Over | Self::Copy | Self::AlphaDarken)
    }

    /// Whether the mode is a per-channel function.
    pub const fn is_separable(self) -> bool {
        !self.is_optimized()
            && !matches!(
                self,
                Self::Clear
                    | Self::Erase
                    | Self::Behind
                    | Self::DestinationIn
                    | Self::DestinationAtop
                    | Self::Greater
            )
    }

    /// Per-channel blend of normalized `s` (source) and `d` (destination).
    ///
    /// Non-separable modes return `s`.
    pub fn blend(self, s: f64, d: f64) -> f64 {
        match self {
            Self::Multiply => s * d,
            Self::Screen => screen(s, d),
            Self::Overlay => hard_light(d, s),
            Self::Darken => s.min(d),
            Self::Lighten => s.max(d),
            Self::Add | Self::LinearDodge => s + d,
            Self::Subtract => d - s,
            Self::InverseSubtract => d - (1.0 - s),
            Self::Diff | Self::Equivalence => (d - s).abs(),
            Self::Exclusion => s + d - 2.0 * s * d,
            Self::Divide => {
                if s == 0.0 {
                    if d == 0.0 { 0.0 } else { 1.0 }
                } else {
                    d / s
                }
            }
            Self::Dodge => dodge(s, d),
            Self::Burn => burn(s, d),
            Self::LinearBurn => s + d - 1.0,
            Self::HardLight => hard_light(s, d),
            Self::SoftLight => {
                let d0 = d.max(0.0);
                if s > 0.5 {
                    d + (2.0 * s - 1.0) * (d0.sqrt() - d)
                } else {
                    d - (1.0 - 2.0 * s) * d * (1.0 - d)
                }
            }
            Self::SoftLightSvg => {
                if s > 0.5 {
                    let d0 = d.max(0.0);
                    let dd = if d0 <= 0.25 {
                        ((16.0 * d0 - 12.0) * d0 + 4.0) * d0
                    } else {
                        d0.sqrt()
                    };
                    d + (2.0 * s - 1.0) * (dd - d)
                } else {
                    d - (1.0 - 2.0 * s) * d * (1.0 - d)
                }
            }
            Self::LinearLight => d + 2.0 * s - 1.0,
            Self::VividLight => {
                let v = if s < 0.5 {
                    if s == 0.0 {
                        if d >= 1.0 { 1.0 } else { 0.0 }
                    } else {
                        1.0 - (1.0 - d) / (2.0 * s)
                    }
                } else if s >= 1.0 {
                    if d <= 0.0 { 0.0 } else { 1.0 }
                } else {
                    d / (2.0 * (1.0 - s))
                };
                v.clamp(0.0, 1.0)
            }
            Self::PinLight => {
                if s > 0.5 {
                    d.max(2.0 * s - 1.0)
                } else {
                    d.min(2.0 * s)
                }
            }
            Self::HardMix => {
                if d > 0.5 {
                    dodge(s, d)
                } else {
                    burn(s, d)
                }
            }
            Self::GrainMerge => d + s - 0.5,
            Self::GrainExtract => d - s + 0.5,
            Self::GeometricMean => (s * d).max(0.0).sqrt(),
            Self::Parallel => {
                if s <= 0.0 || d <= 0.0 {
                    0.0
                } else {
                    2.0 / (1.0 / s + 1.0 / d)
                }
            }
            Self::Allanon => (s + d) * 0.5,
            Self::Negation => 1.0 - (1.0 - s - d).abs(),
            Self::GammaDark => {
                if s <= 0.0 {
                    0.0
                } else {
                    d.max(0.0).powf(1.0 / s)
                }
            }
            Self::GammaLight => d.max(0.0).powf(s),
            _ => s,
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[inline]
fn screen(s: f64, d: f64) -> f64 {
    s + d - s * d
}

#[inline]
fn hard_light(s: f64, d: f64) -> f64 {
    if s > 0.5 {
        screen(2.0 * s - 1.0, d)
    } else {
        2.0 * s * d
    }
}

#[inline]
fn dodge(s: f64, d: f64) -> f64 {
    if s >= 1.0 {
        if d <= 0.0 { 0.0 } else { 1.0 }
    } else {
        (d / (1.0 - s)).min(1.0)
    }
}

#[inline]
fn burn(s: f64, d: f64) -> f64 {
    if s <= 0.0 {
        if d >= 1.0 { 1.0 } else { 0.0 }
    } else {
        1.0 - ((1.0 - d) / s).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn ids_are_unique_and_parse() {
        for m in BlendMode::ALL {
            assert_eq!(BlendMode::from_id(m.id()), Some(*m));
        }
        let mut ids: Vec<_> = BlendMode::ALL.iter().map(|m| m.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), BlendMode::ALL.len());
        assert_eq!(BlendMode::from_id("dissolve"), None);
    }

    #[test]
    fn categories() {
        assert!(BlendMode::Over.is_optimized());
        assert!(!BlendMode::Erase.is_separable());
        assert!(BlendMode::Multiply.is_separable());
    }

    #[test]
    fn reference_values() {
        assert_abs_diff_eq!(BlendMode::Multiply.blend(0.5, 0.5), 0.25);
        assert_abs_diff_eq!(BlendMode::Overlay.blend(0.5, 0.25), 0.25);
        assert_abs_diff_eq!(BlendMode::Dodge.blend(0.5, 0.25), 0.5);
        assert_abs_diff_eq!(BlendMode::Burn.blend(0.5, 0.75), 0.5);
        assert_abs_diff_eq!(BlendMode::Diff.blend(0.2, 0.7), 0.5);
        assert_abs_diff_eq!(BlendMode::Parallel.blend(0.5, 0.5), 0.5);
        assert_abs_diff_eq!(BlendMode::GrainExtract.blend(0.3, 0.3), 0.5);
        assert_abs_diff_eq!(BlendMode::GammaLight.blend(1.0, 0.25), 0.25);
    }

    #[test]
    fn divide_by_zero_edges() {
        assert_eq!(BlendMode::Divide.blend(0.0, 0.0), 0.0);
        assert_eq!(BlendMode::Divide.blend(0.0, 0.3), 1.0);
        assert_eq!(BlendMode::Dodge.blend(1.0, 0.0), 0.0);
        assert_eq!(BlendMode::Burn.blend(0.0, 1.0), 1.0);
    }
}
