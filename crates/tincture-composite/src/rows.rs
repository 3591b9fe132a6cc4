//! Strided row traversal shared by every composite op.

use tincture_core::{ChannelValue, CompositeParams, PixelLayout};

/// Walks the region rows-outer, columns-inner.
///
/// For each pixel `f` receives the destination pixel (decoded, to be updated
/// in place), the source pixel and the mask byte. Afterwards only channels
/// allowed by the params' channel flags are stored back.
///
/// The layout must be uniform in `T`.
#[inline(always)]
pub(crate) fn composite_rows<T: ChannelValue>(
    layout: &PixelLayout,
    params: CompositeParams<'_>,
    mut f: impl FnMut(&mut [T], &[T], Option<u8>),
) {
    let n = layout.channel_count();
    let ps = layout.pixel_size();
    params.validate(ps);

    let CompositeParams {
        dst,
        dst_row_stride,
        src,
        src_row_stride,
        mask,
        mask_row_stride,
        rows,
        cols,
        channel_flags,
        ..
    } = params;
    if rows == 0 || cols == 0 {
        return;
    }

    let cs = size_of::<T>();
    let row_bytes = cols * ps;
    let write_all = channel_flags.covers_all(n);
    let single = src_row_stride == 0;

    let mut s_px = [T::ZERO; PixelLayout::MAX_CHANNELS];
    let mut d_px = [T::ZERO; PixelLayout::MAX_CHANNELS];
    if single {
        decode(src, &mut s_px[..n], cs);
    }

    for r in 0..rows {
        let d_row = &mut dst[r * dst_row_stride..][..row_bytes];
        let s_row = if single {
            &[][..]
        } else {
            &src[r * src_row_stride..][..row_bytes]
        };
        let m_row = mask.map(|m| &m[r * mask_row_stride..][..cols]);

        for c in 0..cols {
            let d_bytes = &mut d_row[c * ps..(c + 1) * ps];
            if !single {
                decode(&s_row[c * ps..], &mut s_px[..n], cs);
            }
            decode(d_bytes, &mut d_px[..n], cs);

            f(&mut d_px[..n], &s_px[..n], m_row.map(|m| m[c]));

            for (i, v) in d_px[..n].iter().enumerate() {
                if write_all || channel_flags.allows(i) {
                    v.write(&mut d_bytes[i * cs..]);
                }
            }
        }
    }
}

#[inline]
fn decode<T: ChannelValue>(bytes: &[u8], out: &mut [T], cs: usize) {
    for (i, v) in out.iter_mut().enumerate() {
        *v = T::read(&bytes[i * cs..]);
    }
}
