//! Path command

use super::lookup;
use crate::PathArgs;
use anyhow::Result;
use tincture_registry::Registry;

pub fn run(args: PathArgs) -> Result<()> {
    let src = lookup(&args.from)?;
    let dst = lookup(&args.to)?;
    let path = Registry::global().resolve(&src, &dst)?;

    if path.is_identity() {
        println!("{src} -> {dst}: identity (byte copy)");
        return Ok(());
    }
    println!("{src} -> {dst}: {} ({})", path.cost(), path.cost().fidelity());
    for step in path.steps() {
        println!("  {} -> {}", step.source(), step.destination());
    }
    Ok(())
}
