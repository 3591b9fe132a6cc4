//! Color profiles.
//!
//! A profile disambiguates color spaces that share model and depth. It is
//! compared by name only; RGB profiles additionally carry the
//! [`Primaries`] the RGB <-> XYZ conversions use.

use std::fmt;
use tincture_math::{Primaries, BUILTIN_PRIMARIES};

/// An opaque, named color profile.
#[derive(Debug, Clone)]
pub struct Profile {
    name: String,
    model: Option<String>,
    primaries: Option<Primaries>,
}

impl Profile {
    /// A profile with no colorimetric data, valid for any model.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: None,
            primaries: None,
        }
    }

    /// An RGB profile defined by its primaries.
    pub fn rgb(primaries: Primaries) -> Self {
        Self {
            name: primaries.name.to_owned(),
            model: Some("RGBA".to_owned()),
            primaries: Some(primaries),
        }
    }

    /// Restricts the profile to one model.
    pub fn for_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Profile name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Model this profile applies to, `None` for any.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Primaries of an RGB profile.
    pub fn primaries(&self) -> Option<&Primaries> {
        self.primaries.as_ref()
    }

    /// Whether the profile may be attached to `model`.
    pub fn applies_to(&self, model: &str) -> bool {
        self.model.as_deref().is_none_or(|m| m == model)
    }
}

impl PartialEq for Profile {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Profile {}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The built-in RGB profiles.
pub fn builtin_profiles() -> Vec<Profile> {
    BUILTIN_PRIMARIES.iter().copied().map(Profile::rgb).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tincture_math::{REC2020, SRGB};

    #[test]
    fn equality_is_by_name() {
        let a = Profile::rgb(SRGB);
        let b = Profile::named("sRGB");
        assert_eq!(a, b);
        assert_ne!(a, Profile::rgb(REC2020));
    }

    #[test]
    fn model_restriction() {
        let p = Profile::rgb(SRGB);
        assert!(p.applies_to("RGBA"));
        assert!(!p.applies_to("CMYKA"));
        assert!(Profile::named("press").applies_to("CMYKA"));
        assert!(!Profile::named("press").for_model("CMYKA").applies_to("GRAYA"));
    }

    #[test]
    fn builtins_carry_primaries() {
        let all = builtin_profiles();
        assert_eq!(all.len(), 5);
        assert!(all.iter().all(|p| p.primaries().is_some()));
    }
}
