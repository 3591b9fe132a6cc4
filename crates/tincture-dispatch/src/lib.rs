//! # tincture-dispatch
//!
//! Multi-architecture dispatcher for performance-sensitive components.
//!
//! On first use the running CPU is probed for the best tier
//! (AVX2+FMA > AVX > SSE4.1 > SSSE3 > SSE2 > scalar on x86, NEON > scalar on
//! AArch64), subject to [`DispatchConfig`]. The choice is memoized for the
//! process lifetime. Components implement [`OptimizedFactory`] and are built
//! with [`create_optimized`].
//!
//! Every tier must produce the same results: bit-exact on integer paths and
//! within a small epsilon on float paths. The scalar tier is always compiled
//! and serves as the reference.
//!
//! # Dependencies
//!
//! - [`serde`] - configuration (de)serialization
//! - [`tracing`] - tier selection logging

#![warn(missing_docs)]

pub mod config;
pub mod detect;
pub mod factory;
pub mod tier;

pub use config::DispatchConfig;
pub use detect::{available_tiers, detect_tiers, select_tier, TierInfo};
pub use factory::{create_optimized, create_optimized_for, OptimizedFactory};
pub use tier::{CpuTier, Tier};

use std::sync::OnceLock;
use tincture_core::{Error, Result};
use tracing::info;

/// The tier together with the configuration it was selected under.
#[derive(Debug, Clone, Copy)]
struct Selection {
    config: DispatchConfig,
    tier: CpuTier,
}

static ACTIVE: OnceLock<Selection> = OnceLock::new();

/// Installs the configuration used for tier selection and selects the tier.
///
/// Must run before the first optimized component is built; afterwards the
/// tier is fixed and this returns [`Error::Config`].
pub fn configure(config: DispatchConfig) -> Result<()> {
    install(&ACTIVE, config)
}

/// The configuration in effect (installed, else from the environment).
pub fn current_config() -> DispatchConfig {
    ACTIVE.get().map_or_else(DispatchConfig::from_env, |s| s.config)
}

/// The process-wide tier, probed once.
pub fn active_tier() -> CpuTier {
    ACTIVE.get_or_init(|| select(DispatchConfig::from_env())).tier
}

fn install(cell: &OnceLock<Selection>, config: DispatchConfig) -> Result<()> {
    let mut installed = false;
    let selection = cell.get_or_init(|| {
        installed = true;
        select(config)
    });
    if !installed {
        return Err(Error::Config(format!("CPU tier already selected ({})", selection.tier)));
    }
    info!(?config, "dispatch configuration installed");
    Ok(())
}

fn select(config: DispatchConfig) -> Selection {
    let tier = select_tier(&config);
    info!(
        %tier,
        disable_vectorization = config.disable_vectorization,
        disable_avx = config.disable_avx,
        "selected CPU dispatch tier"
    );
    Selection { config, tier }
}
