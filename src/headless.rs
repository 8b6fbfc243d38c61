// In-memory host: scripted input, a movable bounding rectangle, and the last presented frame.
// Used by `--snapshot` and by the tests.

use crate::assets::{to_rgba_image, LoadedAssets};
use crate::config::Options;
use crate::error::{Error, Result};
use crate::pointer::{InputEvent, Response};
use crate::render::{RenderLoop, Surface};
use crate::types::{FrameBuffer, Point, Rect};
use std::collections::VecDeque;
use std::path::Path;

pub struct HeadlessSurface {
    rect: Rect,
    script: VecDeque<Vec<InputEvent>>, // one batch per frame
    close_when_drained: bool,
    last: Option<FrameBuffer>,
    presented: u64,
    suppressed: usize,
}

impl HeadlessSurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            rect: Rect::new(0.0, 0.0, width as f32, height as f32),
            script: VecDeque::new(),
            close_when_drained: false,
            last: None,
            presented: 0,
            suppressed: 0,
        }
    }

    /// Place the surface at (x, y) in client space.
    pub fn with_origin(mut self, x: f32, y: f32) -> Self {
        self.rect.x = x;
        self.rect.y = y;
        self
    }

    /// Report closed once every scripted batch has been delivered.
    pub fn close_when_drained(mut self) -> Self {
        self.close_when_drained = true;
        self
    }

    /// Queue the events delivered before the next not-yet-scripted frame.
    pub fn push_frame(&mut self, events: Vec<InputEvent>) {
        self.script.push_back(events);
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.rect.x = x;
        self.rect.y = y;
    }

    pub fn last_frame(&self) -> Option<&FrameBuffer> {
        self.last.as_ref()
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// How many events asked for their default action to be suppressed.
    pub fn suppressed(&self) -> usize {
        self.suppressed
    }
}

impl Surface for HeadlessSurface {
    fn bounding_rect(&self) -> Rect {
        self.rect
    }

    fn poll_events(&mut self) -> Vec<InputEvent> {
        self.script.pop_front().unwrap_or_default()
    }

    fn present(&mut self, frame: &FrameBuffer) -> Result<()> {
        if frame.width as f32 != self.rect.width || frame.height as f32 != self.rect.height {
            return Err(Error::DimensionMismatch(format!(
                "present: frame {}x{} on a {}x{} surface",
                frame.width, frame.height, self.rect.width, self.rect.height
            )));
        }
        match &mut self.last {
            Some(buf) => buf.pixels.copy_from_slice(&frame.pixels),
            None => self.last = Some(frame.clone()),
        }
        self.presented += 1;
        Ok(())
    }

    fn is_open(&self) -> bool {
        !(self.close_when_drained && self.script.is_empty())
    }

    fn on_response(&mut self, _event: &InputEvent, response: Response) {
        if response.prevent_default {
            self.suppressed += 1;
        }
    }
}

/// Render one frame with the pointer at `pointer` (client space; None = no pointer)
/// and write it to `path` as PNG.
pub fn render_snapshot(
    options: Options,
    assets: LoadedAssets,
    pointer: Option<Point>,
    path: &Path,
) -> Result<FrameBuffer> {
    let mut surface = HeadlessSurface::new(options.width, options.height);
    if let Some(p) = pointer {
        surface.push_frame(vec![InputEvent::PointerMove { x: p.x, y: p.y }]);
    }

    let mut lp = RenderLoop::new().with_max_frames(1);
    lp.start(options, assets);
    lp.run(&mut surface)?;

    let frame = surface
        .last_frame()
        .cloned()
        .ok_or_else(|| Error::Snapshot("no frame was rendered".into()))?;
    to_rgba_image(&frame)?
        .save(path)
        .map_err(|e| Error::Snapshot(format!("write {}: {e}", path.display())))?;
    log::info!("snapshot written to {}", path.display());
    Ok(frame)
}
