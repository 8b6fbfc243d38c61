// Loads the two layer images before the render loop may start.
// Both loads run concurrently; the caller gets both bitmaps, or an error naming the asset
// that failed or did not arrive in time.

use crate::error::{Error, Result};
use crate::types::{pack_argb, unpack_argb, FrameBuffer};
use crossbeam_channel::RecvTimeoutError;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Resolves an asset URL to a decoded bitmap.
pub trait AssetLoader: Send + Sync + 'static {
    fn load(&self, url: &str) -> Result<FrameBuffer>;
}

/// Reads images from disk. Accepts plain paths and `file://` URLs.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsLoader;

impl AssetLoader for FsLoader {
    fn load(&self, url: &str) -> Result<FrameBuffer> {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        let img = image::open(path).map_err(|e| Error::AssetLoad {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(to_framebuffer(&img.to_rgba8()))
    }
}

/// Pack an RGBA image as 0xAARRGGBB pixels.
pub fn to_framebuffer(rgba: &image::RgbaImage) -> FrameBuffer {
    let (w, h) = rgba.dimensions();
    let mut out = Vec::with_capacity((w as usize) * (h as usize));
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        out.push(pack_argb(a, r, g, b));
    }
    FrameBuffer { width: w as usize, height: h as usize, pixels: out }
}

/// Inverse of [`to_framebuffer`], used for snapshots.
pub fn to_rgba_image(fb: &FrameBuffer) -> Result<image::RgbaImage> {
    let mut raw = Vec::with_capacity(fb.pixels.len() * 4);
    for &px in &fb.pixels {
        let (a, r, g, b) = unpack_argb(px);
        raw.extend_from_slice(&[r, g, b, a]);
    }
    image::RgbaImage::from_raw(fb.width as u32, fb.height as u32, raw)
        .ok_or_else(|| Error::Snapshot("pixel buffer does not match its dimensions".into()))
}

/// Both layers, decoded. Holding one of these is what lets the render loop start.
#[derive(Clone, Debug)]
pub struct LoadedAssets {
    pub top: FrameBuffer,
    pub bottom: FrameBuffer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Top,
    Bottom,
}

/// Load `top` and `bottom` concurrently and wait for both, up to `timeout`.
pub fn load_pair(
    loader: Arc<dyn AssetLoader>,
    top: &str,
    bottom: &str,
    timeout: Duration,
) -> Result<LoadedAssets> {
    let deadline = Instant::now() + timeout;
    let (tx, rx) = crossbeam_channel::bounded::<(Slot, Result<FrameBuffer>)>(2);

    for (slot, url) in [(Slot::Top, top), (Slot::Bottom, bottom)] {
        let tx = tx.clone();
        let loader = Arc::clone(&loader);
        let owned = url.to_string();
        thread::Builder::new()
            .name(format!("load-{slot:?}").to_lowercase())
            .spawn(move || {
                let _ = tx.send((slot, loader.load(&owned)));
            })
            .map_err(|e| Error::AssetLoad { url: url.to_string(), reason: format!("spawn loader: {e}") })?;
    }
    drop(tx);

    let mut top_img = None;
    let mut bottom_img = None;
    while top_img.is_none() || bottom_img.is_none() {
        let pending = if top_img.is_none() { top } else { bottom };
        match rx.recv_deadline(deadline) {
            Ok((Slot::Top, res)) => top_img = Some(res?),
            Ok((Slot::Bottom, res)) => bottom_img = Some(res?),
            Err(RecvTimeoutError::Timeout) => {
                return Err(Error::AssetTimeout { url: pending.to_string() });
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(Error::AssetLoad {
                    url: pending.to_string(),
                    reason: "loader exited without a result".into(),
                });
            }
        }
    }

    let (Some(top), Some(bottom)) = (top_img, bottom_img) else {
        return Err(Error::AssetLoad { url: top.to_string(), reason: "incomplete layer pair".into() });
    };
    log::info!(
        "loaded layers: top {}x{}, bottom {}x{}",
        top.width, top.height, bottom.width, bottom.height
    );
    Ok(LoadedAssets { top, bottom })
}
