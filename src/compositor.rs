// Layer compositing in software.
// Frame recipe:
// 1) top image → off-screen buffer
// 2) xor a solid fill (coverage = 1 - mask) over it; only the fill's erase term is kept,
//    so the lens keeps the top image and everything else ends up empty
// 3) bottom image → output
// 4) off-screen buffer → output (source-over)
// Masking (2) and the overlay (1, 2, 4) can be switched off independently.

use crate::error::{Error, Result};
use crate::types::{pack_argb, unpack_argb, FrameBuffer, Mask, OPAQUE_BLACK, TRANSPARENT};

/// The two immutable layers.
#[derive(Clone, Copy)]
pub struct Layers<'a> {
    pub top: &'a FrameBuffer,
    pub bottom: &'a FrameBuffer,
}

/// Which parts of the recipe run this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Passes {
    pub mask: bool,
    pub overlay: bool,
}

impl Passes {
    /// Lens drawn at the mask.
    pub const REVEAL: Self = Self { mask: true, overlay: true };
    /// Whole top image over the bottom one.
    pub const UNMASKED: Self = Self { mask: false, overlay: true };
    /// Bottom image only.
    pub const BOTTOM_ONLY: Self = Self { mask: false, overlay: false };
}

/// Build one frame into `output`, using `scratch` as the off-screen buffer.
pub fn compose(
    layers: Layers<'_>,
    mask: &Mask,
    passes: Passes,
    scratch: &mut FrameBuffer,
    output: &mut FrameBuffer,
) -> Result<()> {
    if !scratch.same_size(output) {
        return Err(Error::DimensionMismatch(format!(
            "compose: off-screen {}x{} vs output {}x{}",
            scratch.width, scratch.height, output.width, output.height
        )));
    }
    if mask.width != output.width || mask.height != output.height {
        return Err(Error::DimensionMismatch("compose: mask vs output".into()));
    }

    if passes.overlay {
        scratch.fill(TRANSPARENT);
        draw_image(scratch, layers.top);
        if passes.mask {
            xor_fill(scratch, mask);
        }
    }

    output.fill(OPAQUE_BLACK);
    draw_image(output, layers.bottom);

    if passes.overlay {
        draw_image(output, scratch);
    }
    Ok(())
}

/// Source-over `src` onto `dst` at the origin, unscaled, clipped to `dst`.
pub fn draw_image(dst: &mut FrameBuffer, src: &FrameBuffer) {
    let w = dst.width.min(src.width);
    let h = dst.height.min(src.height);
    for y in 0..h {
        let d_row = y * dst.width;
        let s_row = y * src.width;
        for x in 0..w {
            let d = &mut dst.pixels[d_row + x];
            *d = source_over(*d, src.pixels[s_row + x]);
        }
    }
}

/// Xor a solid fill whose per-pixel coverage is `1 - mask` into `dst`.
/// The fill never contributes color: where the buffer is empty or translucent it stays
/// that way, so after this pass `dst` holds its old content only inside the mask.
pub fn xor_fill(dst: &mut FrameBuffer, mask: &Mask) {
    for (px, m) in dst.pixels.iter_mut().zip(&mask.alpha) {
        let coverage = 1.0 - m.clamp(0.0, 1.0);
        *px = xor_erase(*px, coverage);
    }
}

// Porter-Duff xor with the source term dropped: out_a = da * (1 - sa), color kept.
#[inline]
fn xor_erase(dst: u32, sa: f32) -> u32 {
    let (da, r, g, b) = unpack_argb(dst);
    let out_a = (da as f32 * (1.0 - sa)).round().clamp(0.0, 255.0) as u8;
    if out_a == 0 {
        return TRANSPARENT;
    }
    pack_argb(out_a, r, g, b)
}

/// Straight-alpha source-over of one pixel.
#[inline]
pub fn source_over(dst: u32, src: u32) -> u32 {
    let (sa8, sr, sg, sb) = unpack_argb(src);
    if sa8 == 255 {
        return src;
    }
    if sa8 == 0 {
        return dst;
    }
    let (da8, dr, dg, db) = unpack_argb(dst);
    let sa = sa8 as f32 / 255.0;
    let da = da8 as f32 / 255.0;

    let under = da * (1.0 - sa);
    let out_a = sa + under;
    let mix = |s: u8, d: u8| ((s as f32 * sa + d as f32 * under) / out_a).round().clamp(0.0, 255.0) as u8;
    pack_argb(
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
        mix(sr, dr),
        mix(sg, dg),
        mix(sb, db),
    )
}
