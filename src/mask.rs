// Soft-edged circular reveal mask.
// Opaque out to 0.8·r, transparent from 1.2·r, linear ramp in between.
// Rebuilt every frame since the focal point moves continuously.

use crate::types::{Mask, Point};

pub const INNER_FACTOR: f32 = 0.8;
pub const OUTER_FACTOR: f32 = 1.2;

/// Opacity at `distance` from the focal point for a lens of nominal `radius`.
#[inline]
pub fn opacity_at(distance: f32, radius: f32) -> f32 {
    let inner = radius * INNER_FACTOR;
    let outer = radius * OUTER_FACTOR;
    if distance <= inner {
        1.0
    } else if distance >= outer {
        0.0
    } else {
        (outer - distance) / (outer - inner)
    }
}

/// A lens placed at a focal point in surface-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialMask {
    pub focal: Point,
    pub radius: f32,
}

impl RadialMask {
    pub fn new(focal: Point, radius: f32) -> Self {
        Self { focal, radius }
    }

    pub fn opacity(&self, p: Point) -> f32 {
        opacity_at(self.focal.distance(p), self.radius)
    }

    /// Write the mask into `mask`, sampling each pixel at its centre.
    pub fn render_into(&self, mask: &mut Mask) {
        let outer = self.radius * OUTER_FACTOR;
        let w = mask.width;

        for a in &mut mask.alpha {
            *a = 0.0;
        }

        // Only the lens' bounding box can be non-zero.
        let x0 = clamp_index(self.focal.x - outer - 1.0, w);
        let x1 = clamp_index(self.focal.x + outer + 1.0, w);
        let y0 = clamp_index(self.focal.y - outer - 1.0, mask.height);
        let y1 = clamp_index(self.focal.y + outer + 1.0, mask.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let centre = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                mask.alpha[y * w + x] = self.opacity(centre);
            }
        }
    }
}

fn clamp_index(v: f32, len: usize) -> usize {
    if v.is_nan() || v <= 0.0 {
        return 0;
    }
    (v.ceil() as usize).min(len)
}
