//! CLI command implementations

pub mod composite;
pub mod convert;
pub mod ops;
pub mod path;
pub mod spaces;
pub mod tiers;

use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tincture_core::{with_channel_type, ChannelValue, ColorSpace, ColorSpaceId};
use tincture_registry::Registry;

/// Looks up a color space written `MODEL/DEPTH[/PROFILE]`.
pub fn lookup(spec: &str) -> Result<Arc<ColorSpace>> {
    let id: ColorSpaceId = spec
        .parse()
        .with_context(|| format!("Expected MODEL/DEPTH[/PROFILE], got '{spec}'"))?;
    Registry::global()
        .lookup_id(&id)
        .with_context(|| format!("Failed to look up {spec}"))
}

/// Encodes native channel values (integers for integer depths, floats
/// otherwise) into one pixel of `space`.
pub fn encode_pixel(space: &ColorSpace, values: &[f64]) -> Result<Vec<u8>> {
    let layout = space.layout();
    if values.len() != layout.channel_count() {
        bail!(
            "{space} has {} channels ({}), got {} values",
            layout.channel_count(),
            layout,
            values.len()
        );
    }
    let mut pixel = vec![0u8; layout.pixel_size()];
    for (c, &v) in layout.channels().iter().zip(values) {
        let bytes = &mut pixel[c.offset..];
        match c.format.int_max() {
            Some(max) => {
                if v < 0.0 || v > max as f64 || v.fract() != 0.0 {
                    bail!("channel {} expects an integer in 0..={max}, got {v}", c.name);
                }
                with_channel_type!(c.format, T => T::from_int_raw(v as u64).write(bytes));
            }
            None => with_channel_type!(c.format, T => T::from_f64(v).write(bytes)),
        }
    }
    Ok(pixel)
}

/// Formats every channel of one pixel of `space` in native units.
pub fn decode_pixel(space: &ColorSpace, pixel: &[u8]) -> Vec<String> {
    space
        .layout()
        .channels()
        .iter()
        .map(|c| {
            let bytes = &pixel[c.offset..];
            if c.format.is_integer() {
                with_channel_type!(c.format, T => T::read(bytes).int_raw().to_string())
            } else {
                with_channel_type!(c.format, T => format!("{:.6}", T::read(bytes).to_f64()))
            }
        })
        .collect()
}

/// Parses a comma separated list of numbers.
pub fn parse_list(text: &str) -> Result<Vec<f64>> {
    text.split(',')
        .map(|s| {
            s.trim()
                .parse::<f64>()
                .with_context(|| format!("Not a number: '{s}'"))
        })
        .collect()
}
