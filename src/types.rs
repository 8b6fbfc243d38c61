// Core types shared by the tracker, mask generator, compositor and loop driver.

/// A bitmap in straight (non-premultiplied) alpha.
/// Each entry is 0xAARRGGBB; the window ignores the top byte when presenting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl FrameBuffer {
    /// A `width × height` buffer filled with one color.
    pub fn filled(width: usize, height: usize, color: u32) -> Self {
        Self { width, height, pixels: vec![color; width * height] }
    }

    /// Fully transparent buffer (what an off-screen canvas starts as).
    pub fn transparent(width: usize, height: usize) -> Self {
        Self::filled(width, height, TRANSPARENT)
    }

    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    /// Pixel at (x, y), or None outside the bitmap.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    pub fn same_size(&self, other: &FrameBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }
}

/// Per-pixel opacity in [0,1]; 1 = reveal the top layer, 0 = keep the bottom layer.
#[derive(Clone, Debug)]
pub struct Mask {
    pub width: usize,
    pub height: usize,
    pub alpha: Vec<f32>, // length = width * height
}

impl Mask {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, alpha: vec![0.0; width * height] }
    }
}

/// A position in either client (event) space or surface-local space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// On-screen bounding rectangle of the output surface, in client coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Client-space point → surface-local point (`local = native - origin`).
    pub fn to_local(&self, native: Point) -> Point {
        Point::new(native.x - self.x, native.y - self.y)
    }
}

/* ---------- 0xAARRGGBB packing ---------- */

pub const TRANSPARENT: u32 = 0x00_00_00_00;
pub const OPAQUE_BLACK: u32 = 0xFF_00_00_00;

#[inline]
pub fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[inline]
pub fn unpack_argb(px: u32) -> (u8, u8, u8, u8) {
    (
        ((px >> 24) & 0xFF) as u8,
        ((px >> 16) & 0xFF) as u8,
        ((px >> 8) & 0xFF) as u8,
        (px & 0xFF) as u8,
    )
}
