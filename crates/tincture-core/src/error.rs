//! Error types shared by every tincture crate.
//!
//! Recoverable failures (lookup misses, missing conversion routes, unknown
//! blend modes, registration conflicts) are values of [`Error`].
//!
//! Buffer contract violations are not: a caller handing in a buffer that is
//! too short, a stride that makes rows overlap, or an opacity outside
//! `[0, 1]` gets a panic from [`precondition!`](crate::precondition). Such
//! calls would otherwise read or write misinterpreted pixel memory.
//!
//! # Usage
//!
//! ```rust
//! use tincture_core::{Error, Result};
//!
//! fn find(model: &str) -> Result<()> {
//!     Err(Error::unknown_color_space(model, "U8", None))
//! }
//!
//! let err = find("LAB").unwrap_err();
//! assert!(err.is_lookup_miss());
//! assert!(err.to_string().contains("LAB"));
//! ```

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by registry lookups, path resolution and registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No color space is registered for the identity.
    #[error("unknown color space {model}/{depth}{}", profile_suffix(.profile))]
    UnknownColorSpace {
        /// Color model id
        model: String,
        /// Depth id
        depth: String,
        /// Requested profile name
        profile: Option<String>,
    },

    /// A profile name that no registered profile carries.
    #[error("unknown profile: {0}")]
    UnknownProfile(String),

    /// The resolver found no route between two color spaces.
    #[error("no conversion path from {from} to {to}")]
    NoConversionPath {
        /// Source color space
        from: String,
        /// Destination color space
        to: String,
    },

    /// The color space has no composite op with this id.
    #[error("blend mode '{mode}' is not supported by {color_space}")]
    UnsupportedBlendMode {
        /// Requested blend-mode id
        mode: String,
        /// Color space the op was requested for
        color_space: String,
    },

    /// Two registrations claim the same slot.
    #[error("registration conflict: {0}")]
    RegistrationConflict(String),

    /// A pixel layout violates its invariants.
    #[error("invalid pixel layout: {0}")]
    InvalidLayout(String),

    /// Configuration could not be applied.
    #[error("configuration error: {0}")]
    Config(String),
}

fn profile_suffix(profile: &Option<String>) -> String {
    profile.as_deref().map(|p| format!("/{p}")).unwrap_or_default()
}

impl Error {
    /// Creates an [`Error::UnknownColorSpace`] error.
    #[inline]
    pub fn unknown_color_space(
        model: impl Into<String>,
        depth: impl Into<String>,
        profile: Option<&str>,
    ) -> Self {
        Self::UnknownColorSpace {
            model: model.into(),
            depth: depth.into(),
            profile: profile.map(str::to_owned),
        }
    }

    /// Creates an [`Error::NoConversionPath`] error.
    #[inline]
    pub fn no_conversion_path(from: impl ToString, to: impl ToString) -> Self {
        Self::NoConversionPath {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Creates an [`Error::UnsupportedBlendMode`] error.
    #[inline]
    pub fn unsupported_blend_mode(mode: impl Into<String>, color_space: impl ToString) -> Self {
        Self::UnsupportedBlendMode {
            mode: mode.into(),
            color_space: color_space.to_string(),
        }
    }

    /// Creates an [`Error::RegistrationConflict`] error.
    #[inline]
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::RegistrationConflict(msg.into())
    }

    /// Creates an [`Error::InvalidLayout`] error.
    #[inline]
    pub fn invalid_layout(msg: impl Into<String>) -> Self {
        Self::InvalidLayout(msg.into())
    }

    /// Returns `true` for a color space or profile lookup miss.
    #[inline]
    pub fn is_lookup_miss(&self) -> bool {
        matches!(self, Self::UnknownColorSpace { .. } | Self::UnknownProfile(_))
    }

    /// Returns `true` if the resolver found no route.
    #[inline]
    pub fn is_no_path(&self) -> bool {
        matches!(self, Self::NoConversionPath { .. })
    }

    /// Returns `true` for a registration-time failure.
    #[inline]
    pub fn is_registration_error(&self) -> bool {
        matches!(self, Self::RegistrationConflict(_) | Self::InvalidLayout(_))
    }
}

/// Panics with a `precondition violated:` message when `cond` is false.
///
/// Used for the pixel-buffer contract: these are programming errors, never
/// recoverable results.
#[macro_export]
macro_rules! precondition {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            panic!("precondition violated: {}", format_args!($($arg)+));
        }
    };
}
