//! CPU tiers and their marker types.
//!
//! [`CpuTier`] is the runtime value the probe produces. Each tier also has a
//! zero-sized marker implementing [`Tier`]; optimized components are generic
//! over the marker and monomorphized once per tier.
//!
//! [`Tier::run`] executes a closure inside a `#[target_feature]` function for
//! the tier's instruction set, so code inlined into it may use those
//! instructions. It only does so when the CPU reports the features; otherwise
//! the closure runs as plain code.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// SIMD capability tiers, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CpuTier {
    /// Portable scalar code; always available.
    Scalar,
    /// x86 SSE2.
    Sse2,
    /// x86 SSSE3.
    Ssse3,
    /// x86 SSE4.1.
    Sse41,
    /// x86 AVX.
    Avx,
    /// x86 AVX2 with FMA.
    Avx2Fma,
    /// AArch64 NEON.
    Neon,
}

impl CpuTier {
    /// Every tier.
    pub const ALL: [CpuTier; 7] = [
        Self::Scalar,
        Self::Sse2,
        Self::Ssse3,
        Self::Sse41,
        Self::Avx,
        Self::Avx2Fma,
        Self::Neon,
    ];

    /// Short name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Sse2 => "sse2",
            Self::Ssse3 => "ssse3",
            Self::Sse41 => "sse4.1",
            Self::Avx => "avx",
            Self::Avx2Fma => "avx2+fma",
            Self::Neon => "neon",
        }
    }

    /// Selection priority (higher = preferred).
    pub const fn priority(self) -> u32 {
        match self {
            Self::Scalar => 0,
            Self::Sse2 => 10,
            Self::Ssse3 => 20,
            Self::Sse41 => 30,
            Self::Avx => 40,
            Self::Avx2Fma => 50,
            Self::Neon => 40,
        }
    }

    /// Whether the tier uses AVX instructions.
    pub const fn is_avx(self) -> bool {
        matches!(self, Self::Avx | Self::Avx2Fma)
    }

    /// Whether the running CPU supports this tier.
    pub fn is_supported(self) -> bool {
        match self {
            Self::Scalar => true,
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Self::Sse2 => std::is_x86_feature_detected!("sse2"),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Self::Ssse3 => std::is_x86_feature_detected!("ssse3"),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Self::Sse41 => std::is_x86_feature_detected!("sse4.1"),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Self::Avx => std::is_x86_feature_detected!("avx"),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Self::Avx2Fma => {
                std::is_x86_feature_detected!("avx2") && std::is_x86_feature_detected!("fma")
            }
            #[cfg(target_arch = "aarch64")]
            Self::Neon => std::arch::is_aarch64_feature_detected!("neon"),
            #[allow(unreachable_patterns)]
            _ => false,
        }
    }
}

impl fmt::Display for CpuTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CpuTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s || format!("{t:?}").to_ascii_lowercase() == s)
            .ok_or_else(|| format!("unknown CPU tier '{s}'"))
    }
}

/// Compile-time handle of a tier.
pub trait Tier: Copy + Default + Send + Sync + fmt::Debug + 'static {
    /// Runtime value of this tier.
    const TIER: CpuTier;

    /// Whether kernels should take their explicit-SIMD path.
    const VECTOR: bool;

    /// Runs `f` with this tier's target features enabled when supported.
    fn run<R>(f: impl FnOnce() -> R) -> R;
}

/// Scalar fallback; the correctness baseline.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scalar;

impl Tier for Scalar {
    const TIER: CpuTier = CpuTier::Scalar;
    const VECTOR: bool = false;

    #[inline]
    fn run<R>(f: impl FnOnce() -> R) -> R {
        f()
    }
}

macro_rules! x86_tier {
    ($(#[$doc:meta])* $name:ident, $tier:ident, $features:literal, $runner:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        #[target_feature(enable = $features)]
        unsafe fn $runner<R>(f: impl FnOnce() -> R) -> R {
            f()
        }

        impl Tier for $name {
            const TIER: CpuTier = CpuTier::$tier;
            const VECTOR: bool = true;

            #[inline]
            fn run<R>(f: impl FnOnce() -> R) -> R {
                #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
                if CpuTier::$tier.is_supported() {
                    // SAFETY: the CPU reports every feature the runner enables.
                    return unsafe { $runner(f) };
                }
                f()
            }
        }
    };
}

x86_tier!(
    /// SSE2 marker.
    Sse2, Sse2, "sse2", run_sse2
);
x86_tier!(
    /// SSSE3 marker.
    Ssse3, Ssse3, "sse2,ssse3", run_ssse3
);
x86_tier!(
    /// SSE4.1 marker.
    Sse41, Sse41, "sse2,ssse3,sse4.1", run_sse41
);
x86_tier!(
    /// AVX marker.
    Avx, Avx, "sse2,ssse3,sse4.1,avx", run_avx
);
x86_tier!(
    /// AVX2 + FMA marker.
    Avx2Fma, Avx2Fma, "sse2,ssse3,sse4.1,avx,avx2,fma", run_avx2_fma
);

/// NEON marker. NEON is part of the AArch64 baseline.
#[derive(Debug, Clone, Copy, Default)]
pub struct Neon;

impl Tier for Neon {
    const TIER: CpuTier = CpuTier::Neon;
    const VECTOR: bool = true;

    #[inline]
    fn run<R>(f: impl FnOnce() -> R) -> R {
        f()
    }
}
