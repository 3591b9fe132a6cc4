//! # tincture-composite
//!
//! Blend-mode implementations for the tincture pixel engine.
//!
//! Every op is bound to one color space layout and works on strided row
//! buffers with an optional coverage mask, a uniform opacity and a channel
//! write mask (see [`tincture_core::CompositeParams`]).
//!
//! - [`standard_ops`] builds the full op table for a layout, with the hot
//!   modes (`over`, `copy`, `alpha_darken`) instantiated for the active CPU
//!   tier
//! - [`mask_applicator`] builds the tier-optimized alpha mask applier
//! - [`BlendMode`] lists the supported ids
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tincture_composite::standard_ops;
//! use tincture_core::{model, CompositeParams, DataFormat};
//!
//! let layout = Arc::new(model::RGBA.layout(DataFormat::U8).unwrap());
//! let ops = standard_ops(&layout);
//! let over = ops.iter().find(|op| op.id() == "over").unwrap();
//!
//! let mut dst = [0u8, 0, 0, 255];
//! over.composite(CompositeParams::new(&mut dst, 4, &[255, 255, 255, 255], 4, 1, 1).with_opacity(0.5));
//! assert_eq!(dst, [128, 128, 128, 255]);
//! ```
//!
//! # Dependencies
//!
//! - `tincture-dispatch` - per-tier instantiation
//! - [`wide`] - float lane kernels
//! - [`tracing`] - op construction and per-call trace events

#![warn(missing_docs)]

pub mod arith;
pub mod generic;
pub mod mask;
pub mod modes;
pub mod optimized;
mod rows;

pub use generic::GenericOp;
pub use mask::{MaskApplicator, MaskApplicatorFactory};
pub use modes::BlendMode;
pub use optimized::{OptimizedMode, OptimizedOpFactory};

use std::sync::Arc;
use tincture_core::{with_channel_type, AlphaMaskApplicator, CompositeOp, PixelLayout};
use tincture_dispatch::{active_tier, create_optimized_for, CpuTier};
use tracing::{debug, warn};

/// Every op for `layout`, optimized kernels built for the active tier.
pub fn standard_ops(layout: &Arc<PixelLayout>) -> Vec<Arc<dyn CompositeOp>> {
    standard_ops_for(active_tier(), layout)
}

/// Every op for `layout`, optimized kernels built for `tier`.
///
/// Layouts mixing channel kinds get an empty table.
pub fn standard_ops_for(tier: CpuTier, layout: &Arc<PixelLayout>) -> Vec<Arc<dyn CompositeOp>> {
    let Some(format) = layout.uniform_format() else {
        warn!(layout = %layout, "mixed channel kinds: no composite ops");
        return Vec::new();
    };

    let mut ops: Vec<Arc<dyn CompositeOp>> = OptimizedMode::ALL
        .into_iter()
        .filter_map(|mode| create_optimized_for::<OptimizedOpFactory>(tier, (mode, layout.clone())))
        .collect();

    with_channel_type!(format, T => {
        ops.extend(
            BlendMode::ALL
                .iter()
                .filter(|m| !m.is_optimized())
                .map(|&m| Arc::new(GenericOp::<T>::new(m, layout.clone())) as Arc<dyn CompositeOp>),
        );
    });

    debug!(layout = %layout, %tier, ops = ops.len(), "composite op table built");
    ops
}

/// Alpha mask applier for `layout` at the active tier.
pub fn mask_applicator(layout: &Arc<PixelLayout>) -> Option<Arc<dyn AlphaMaskApplicator>> {
    create_optimized_for::<MaskApplicatorFactory>(active_tier(), layout.clone())
}

/// Alpha mask applier for `layout` at `tier`.
pub fn mask_applicator_for(
    tier: CpuTier,
    layout: &Arc<PixelLayout>,
) -> Option<Arc<dyn AlphaMaskApplicator>> {
    create_optimized_for::<MaskApplicatorFactory>(tier, layout.clone())
}
