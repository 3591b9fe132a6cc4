//! Composite op and alpha mask seams.
//!
//! Blend-mode implementations live in `tincture-composite`; this module fixes
//! the contract they honor.
//!
//! # Buffer contract
//!
//! `dst` and `src` start at the first pixel of the first row. Row strides are
//! byte distances between consecutive rows and may exceed the row width. A
//! source stride of `0` means the source is one pixel applied to every
//! position. The mask, when present, is one coverage byte per pixel with its
//! own stride. Violations panic via [`precondition!`](crate::precondition).

use crate::{precondition, ChannelFlags};
use std::fmt::Debug;

/// Arguments of one composite call.
#[derive(Debug)]
pub struct CompositeParams<'a> {
    /// Destination rows.
    pub dst: &'a mut [u8],
    /// Destination row stride in bytes.
    pub dst_row_stride: usize,
    /// Source rows, or a single pixel when `src_row_stride == 0`.
    pub src: &'a [u8],
    /// Source row stride in bytes.
    pub src_row_stride: usize,
    /// Optional coverage bytes, one per pixel.
    pub mask: Option<&'a [u8]>,
    /// Mask row stride in bytes.
    pub mask_row_stride: usize,
    /// Number of rows.
    pub rows: usize,
    /// Pixels per row.
    pub cols: usize,
    /// Uniform opacity in `[0, 1]`.
    pub opacity: f32,
    /// Channels the op may write.
    pub channel_flags: ChannelFlags,
}

impl<'a> CompositeParams<'a> {
    /// Full opacity, no mask, every channel.
    pub fn new(
        dst: &'a mut [u8],
        dst_row_stride: usize,
        src: &'a [u8],
        src_row_stride: usize,
        rows: usize,
        cols: usize,
    ) -> Self {
        Self {
            dst,
            dst_row_stride,
            src,
            src_row_stride,
            mask: None,
            mask_row_stride: 0,
            rows,
            cols,
            opacity: 1.0,
            channel_flags: ChannelFlags::ALL,
        }
    }

    /// Sets the coverage mask.
    pub fn with_mask(mut self, mask: &'a [u8], mask_row_stride: usize) -> Self {
        self.mask = Some(mask);
        self.mask_row_stride = mask_row_stride;
        self
    }

    /// Sets the opacity.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Sets opacity from an 8-bit value.
    pub fn with_opacity_u8(self, opacity: u8) -> Self {
        self.with_opacity(opacity as f32 / 255.0)
    }

    /// Sets the channel write mask.
    pub fn with_channel_flags(mut self, flags: ChannelFlags) -> Self {
        self.channel_flags = flags;
        self
    }

    /// Whether the source is a single repeated pixel.
    #[inline]
    pub fn single_source_pixel(&self) -> bool {
        self.src_row_stride == 0
    }

    /// Checks the buffer contract for pixels of `pixel_size` bytes.
    ///
    /// # Panics
    ///
    /// On any contract violation.
    pub fn validate(&self, pixel_size: usize) {
        precondition!(
            self.opacity.is_finite() && (0.0..=1.0).contains(&self.opacity),
            "opacity {} outside [0, 1]",
            self.opacity
        );
        if self.rows == 0 || self.cols == 0 {
            return;
        }
        let row_bytes = self.cols * pixel_size;
        if self.rows > 1 {
            precondition!(
                self.dst_row_stride >= row_bytes,
                "destination stride {} overlaps rows of {} bytes",
                self.dst_row_stride,
                row_bytes
            );
        }
        let dst_need = required_len(self.rows, self.dst_row_stride, row_bytes);
        precondition!(
            self.dst.len() >= dst_need,
            "destination holds {} bytes, {} rows x {} pixels need {}",
            self.dst.len(),
            self.rows,
            self.cols,
            dst_need
        );

        let src_need = if self.single_source_pixel() {
            pixel_size
        } else {
            required_len(self.rows, self.src_row_stride, row_bytes)
        };
        precondition!(
            self.src.len() >= src_need,
            "source holds {} bytes, need {}",
            self.src.len(),
            src_need
        );

        if let Some(mask) = self.mask {
            if self.rows > 1 {
                precondition!(
                    self.mask_row_stride >= self.cols,
                    "mask stride {} shorter than {} columns",
                    self.mask_row_stride,
                    self.cols
                );
            }
            let mask_need = required_len(self.rows, self.mask_row_stride, self.cols);
            precondition!(
                mask.len() >= mask_need,
                "mask holds {} bytes, need {}",
                mask.len(),
                mask_need
            );
        }
    }
}

/// Bytes spanned by `rows` rows of `row_bytes` at `stride`.
#[inline]
pub fn required_len(rows: usize, stride: usize, row_bytes: usize) -> usize {
    if rows == 0 {
        0
    } else {
        (rows - 1) * stride + row_bytes
    }
}

/// A blend mode bound to one color space.
///
/// Instances hold no mutable state and may be shared across threads.
pub trait CompositeOp: Send + Sync + Debug {
    /// Blend-mode id ("over", "multiply"...).
    fn id(&self) -> &str;

    /// Dispatch tier the op was built for, for diagnostics.
    fn tier(&self) -> &'static str {
        "generic"
    }

    /// Composites `params.src` onto `params.dst`.
    ///
    /// Rows are processed outer, columns inner. The full result pixel is
    /// computed, then only channels allowed by `params.channel_flags` are
    /// stored.
    ///
    /// # Panics
    ///
    /// If the buffer contract is violated.
    fn composite(&self, params: CompositeParams<'_>);
}

/// Per-pixel alpha operations driven by normalized float masks.
pub trait AlphaMaskApplicator: Send + Sync + Debug {
    /// Multiplies each pixel's alpha by `mask[i]`.
    fn apply_normed_float_mask(&self, pixels: &mut [u8], mask: &[f32]);

    /// Multiplies each pixel's alpha by `1 - mask[i]`.
    fn apply_inverse_normed_float_mask(&self, pixels: &mut [u8], mask: &[f32]);

    /// Writes `color` to every pixel, with alpha set to `1 - mask[i]`.
    fn fill_inverse_alpha_normed_float_mask_with_color(
        &self,
        pixels: &mut [u8],
        mask: &[f32],
        color: &[u8],
    );
}
