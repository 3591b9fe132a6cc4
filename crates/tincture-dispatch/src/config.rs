//! Dispatch configuration.
//!
//! Two switches steer tier selection:
//!
//! - `disable_vectorization` forces the scalar tier (a workaround for CPUs
//!   with known vectorization bugs).
//! - `disable_avx` forbids the AVX and AVX2+FMA tiers.
//!
//! Sources, highest priority first: [`configure`](crate::configure) before
//! first use, the `TINCTURE_DISABLE_VECTORIZATION` / `TINCTURE_DISABLE_AVX`
//! environment variables, defaults.

use serde::{Deserialize, Serialize};

/// Environment variable forcing the scalar tier.
pub const ENV_DISABLE_VECTORIZATION: &str = "TINCTURE_DISABLE_VECTORIZATION";

/// Environment variable forbidding AVX tiers.
pub const ENV_DISABLE_AVX: &str = "TINCTURE_DISABLE_AVX";

/// Tier-selection overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Force the scalar tier.
    pub disable_vectorization: bool,
    /// Never select AVX or AVX2+FMA.
    pub disable_avx: bool,
}

impl DispatchConfig {
    /// Scalar-only configuration.
    pub const fn scalar() -> Self {
        Self {
            disable_vectorization: true,
            disable_avx: false,
        }
    }

    /// Reads the environment; unset or unparsable variables keep defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |k: &str| get(k).as_deref().and_then(parse_flag).unwrap_or(false);
        Self {
            disable_vectorization: flag(ENV_DISABLE_VECTORIZATION),
            disable_avx: flag(ENV_DISABLE_AVX),
        }
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
