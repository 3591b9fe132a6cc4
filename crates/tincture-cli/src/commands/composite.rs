//! Composite command

use super::lookup;
use crate::CompositeArgs;
use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::time::Instant;
use tincture_core::{ChannelFlags, ColorSpace, CompositeParams};
use tincture_registry::Registry;
use tracing::{debug, info};

pub fn run(args: CompositeArgs) -> Result<()> {
    let space = lookup(&args.space)?;
    let op = Registry::global().composite_op(&space, &args.mode)?;
    let (w, h) = parse_size(&args.size)?;
    if !(0.0..=1.0).contains(&args.opacity) {
        bail!("Opacity must be in [0, 1], got {}", args.opacity);
    }

    let flags = match &args.channels {
        Some(list) => {
            let indices = list
                .split(',')
                .map(|s| s.trim().parse::<usize>().with_context(|| format!("Not a channel index: '{s}'")))
                .collect::<Result<Vec<_>>>()?;
            if let Some(bad) = indices.iter().find(|&&i| i >= space.channel_count()) {
                bail!("{space} has no channel {bad}");
            }
            ChannelFlags::only(&indices)
        }
        None => ChannelFlags::ALL,
    };

    let row = w * space.pixel_size();
    let src = synthesize(&space, w, h, 0);
    let mut dst = synthesize(&space, w, h, 1);
    let mask: Option<Vec<u8>> = args
        .mask
        .then(|| (0..w * h).map(|i| ((i % w) * 255 / w) as u8).collect());

    let bands = match args.bands {
        0 => rayon::current_num_threads(),
        n => n,
    }
    .clamp(1, h);
    let band_rows = h.div_ceil(bands);
    debug!(bands, band_rows, op = op.id(), tier = op.tier(), "compositing");

    let start = Instant::now();
    dst.par_chunks_mut(band_rows * row)
        .enumerate()
        .for_each(|(b, band)| {
            let y0 = b * band_rows;
            let rows = band.len() / row;
            let mut params = CompositeParams::new(band, row, &src[y0 * row..], row, rows, w)
                .with_opacity(args.opacity)
                .with_channel_flags(flags);
            if let Some(m) = &mask {
                params = params.with_mask(&m[y0 * w..], w);
            }
            op.composite(params);
        });
    let elapsed = start.elapsed();

    let mpx = (w * h) as f64 / 1e6 / elapsed.as_secs_f64().max(1e-9);
    info!(elapsed_ms = elapsed.as_secs_f64() * 1e3, "composite done");
    println!(
        "{space} {} ({}) {w}x{h} in {bands} band(s): {:.2} ms, {mpx:.1} Mpx/s",
        op.id(),
        op.tier(),
        elapsed.as_secs_f64() * 1e3
    );
    println!("sha256 {}", checksum(&dst));
    Ok(())
}

fn parse_size(text: &str) -> Result<(usize, usize)> {
    let (w, h) = text
        .split_once(['x', 'X'])
        .with_context(|| format!("Expected WxH, got '{text}'"))?;
    let w: usize = w.trim().parse().with_context(|| format!("Bad width in '{text}'"))?;
    let h: usize = h.trim().parse().with_context(|| format!("Bad height in '{text}'"))?;
    if w == 0 || h == 0 {
        bail!("Size must be non-zero, got {w}x{h}");
    }
    Ok((w, h))
}

/// Deterministic gradient buffer; `seed` shifts the pattern.
fn synthesize(space: &ColorSpace, w: usize, h: usize, seed: usize) -> Vec<u8> {
    let alpha = space.layout().alpha_index();
    let mut values = vec![0f32; space.channel_count()];
    let mut buf = vec![0u8; w * h * space.pixel_size()];
    for (p, px) in buf.chunks_exact_mut(space.pixel_size()).enumerate() {
        let (x, y) = (p % w, p / w);
        for (i, v) in values.iter_mut().enumerate() {
            let level = if Some(i) == alpha {
                x + seed * 97
            } else {
                x * (i + 1) + y * 3 + seed * 41
            };
            *v = (level % 256) as f32 / 255.0;
        }
        space.from_normalized(&values, px);
    }
    buf
}

/// Hex SHA-256 of the composited bytes.
fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
