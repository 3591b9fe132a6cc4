//! CPU probing and tier selection.

use crate::{CpuTier, DispatchConfig};

/// Availability of one tier on this CPU.
#[derive(Debug, Clone, Copy)]
pub struct TierInfo {
    /// The tier.
    pub tier: CpuTier,
    /// Whether the CPU supports it.
    pub available: bool,
    /// Priority for auto-selection (higher = preferred).
    pub priority: u32,
}

/// Probes every tier, highest priority first.
pub fn detect_tiers() -> Vec<TierInfo> {
    let mut tiers: Vec<TierInfo> = CpuTier::ALL
        .into_iter()
        .map(|tier| TierInfo {
            tier,
            available: tier.is_supported(),
            priority: tier.priority(),
        })
        .collect();
    tiers.sort_by(|a, b| b.priority.cmp(&a.priority));
    tiers
}

/// Tiers usable on this CPU, highest priority first. Always ends in scalar.
pub fn available_tiers() -> Vec<CpuTier> {
    detect_tiers()
        .into_iter()
        .filter(|t| t.available)
        .map(|t| t.tier)
        .collect()
}

/// Picks the best supported tier allowed by `config`.
pub fn select_tier(config: &DispatchConfig) -> CpuTier {
    if config.disable_vectorization {
        return CpuTier::Scalar;
    }
    detect_tiers()
        .into_iter()
        .filter(|t| t.available && !(config.disable_avx && t.tier.is_avx()))
        .map(|t| t.tier)
        .next()
        .unwrap_or(CpuTier::Scalar)
}
