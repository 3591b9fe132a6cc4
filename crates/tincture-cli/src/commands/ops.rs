//! Ops command

use crate::OpsArgs;
use anyhow::{Context, Result};
use tincture_registry::Registry;

pub fn run(args: OpsArgs) -> Result<()> {
    let registry = Registry::global();
    let space = registry
        .lookup(&args.model, &args.depth, args.profile.as_deref())
        .with_context(|| format!("Failed to look up {}/{}", args.model, args.depth))?;

    println!("{space} ({}, {} bytes/pixel)", space.layout(), space.pixel_size());
    for id in space.composite_op_ids() {
        let op = registry.composite_op(&space, id)?;
        println!("  {id:<20} {}", op.tier());
    }
    Ok(())
}
