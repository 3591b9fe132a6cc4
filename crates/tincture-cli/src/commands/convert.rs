//! Convert command

use super::{decode_pixel, encode_pixel, lookup, parse_list};
use crate::ConvertArgs;
use anyhow::Result;
use tincture_convert::ColorTransformation;
use tincture_registry::Registry;
use tracing::debug;

pub fn run(args: ConvertArgs) -> Result<()> {
    let src = lookup(&args.from)?;
    let dst = lookup(&args.to)?;
    let input = encode_pixel(&src, &parse_list(&args.pixel)?)?;

    let path = Registry::global().resolve(&src, &dst)?;
    debug!(hops = path.hops(), "converting one pixel");
    let mut output = vec![0u8; dst.pixel_size()];
    path.transform(&input, &mut output, 1);

    println!("{src}: {}", decode_pixel(&src, &input).join(", "));
    println!("{dst}: {}", decode_pixel(&dst, &output).join(", "));
    Ok(())
}
