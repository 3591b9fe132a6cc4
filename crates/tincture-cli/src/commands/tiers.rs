//! Tiers command

use anyhow::Result;
use tincture_dispatch::{active_tier, current_config, detect_tiers};

pub fn run() -> Result<()> {
    let active = active_tier();
    let config = current_config();

    println!("Tiers:");
    for info in detect_tiers() {
        let mark = if info.tier == active { "*" } else { " " };
        let state = if info.available { "available" } else { "-" };
        println!("  {mark} {:<10} {:<10} priority {}", info.tier.name(), state, info.priority);
    }
    println!(
        "\nSelected: {active} (disable_vectorization: {}, disable_avx: {})",
        config.disable_vectorization, config.disable_avx
    );
    Ok(())
}
