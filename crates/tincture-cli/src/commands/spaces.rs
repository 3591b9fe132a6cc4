//! Spaces command

use crate::SpacesArgs;
use anyhow::Result;
use tincture_convert::ConversionFactory;
use tincture_registry::Registry;

pub fn run(args: SpacesArgs) -> Result<()> {
    let registry = Registry::global();

    println!("Models:");
    for model in registry.models() {
        let depths = registry.depths(&model);
        let sample = depths
            .first()
            .and_then(|d| registry.lookup(&model, d, None).ok());
        let profile = sample.as_ref().and_then(|cs| cs.profile_name()).unwrap_or("-");
        let channels = sample.as_ref().map(|cs| cs.layout().to_string()).unwrap_or_default();
        println!(
            "  {model:<8} {:<18} default profile: {profile:<6} {channels}",
            depths.join(" ")
        );
    }

    println!("\nProfiles:");
    for profile in registry.profiles() {
        println!("  {:<14} model: {}", profile.name(), profile.model().unwrap_or("any"));
    }

    if args.conversions {
        println!("\nConversions:");
        for f in registry.conversion_factories() {
            println!("  {:<24} {}", f.name(), f.fidelity());
        }
    }
    Ok(())
}
