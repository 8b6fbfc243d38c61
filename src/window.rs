// Desktop host: a minifb window shows the output and feeds mouse input back as pointer records.

use crate::error::{Error, Result};
use crate::pointer::InputEvent;
use crate::render::Surface;
use crate::types::{FrameBuffer, Rect};
use minifb::{Key, MouseMode, Window, WindowOptions};

pub struct WindowSurface {
    window: Window, // the on-screen window you see
    width: usize,
    height: usize,
    last_mouse: Option<(f32, f32)>, // None while the mouse is outside the client area
}

impl WindowSurface {
    /// Open a `width × height` window that refreshes at most `target_fps` times a second.
    pub fn new(title: &str, width: usize, height: usize, target_fps: usize) -> Result<Self> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(target_fps);
        Ok(Self { window, width, height, last_mouse: None })
    }
}

impl Surface for WindowSurface {
    // Window coordinates are already client-area relative.
    fn bounding_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }

    /// The window is polled, so moves and leaves are synthesized from position changes.
    fn poll_events(&mut self) -> Vec<InputEvent> {
        let now = self.window.get_mouse_pos(MouseMode::Discard);
        let events = mouse_transition(self.last_mouse, now);
        self.last_mouse = now;
        events
    }

    fn present(&mut self, frame: &FrameBuffer) -> Result<()> {
        self.window
            .update_with_buffer(&frame.pixels, frame.width, frame.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }

    fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }
}

fn mouse_transition(before: Option<(f32, f32)>, now: Option<(f32, f32)>) -> Vec<InputEvent> {
    match (before, now) {
        (_, Some((x, y))) if before != now => vec![InputEvent::PointerMove { x, y }],
        (Some(_), None) => vec![InputEvent::PointerLeave],
        _ => Vec::new(),
    }
}
