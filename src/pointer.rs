// Pointer tracking: turns mouse/touch records into the single active pointer that drives the lens.
// Only one contact drives the focal point at a time; extra touches are ignored until it lifts.

use crate::types::Point;

/// One touch contact as delivered by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchPoint {
    pub id: i64,
    pub x: f32,
    pub y: f32,
}

impl TouchPoint {
    pub const fn new(id: i64, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }
}

/// A touch record: `touches` is every contact still down, `changed` the ones this event is about.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TouchEvent {
    pub touches: Vec<TouchPoint>,
    pub changed: Vec<TouchPoint>,
}

impl TouchEvent {
    pub fn new(touches: Vec<TouchPoint>, changed: Vec<TouchPoint>) -> Self {
        Self { touches, changed }
    }

    /// Record whose changed list is the same as its active list (typical for start/move).
    pub fn with_touches(touches: Vec<TouchPoint>) -> Self {
        Self { changed: touches.clone(), touches }
    }

    fn find(&self, id: i64) -> Option<&TouchPoint> {
        self.touches.iter().find(|t| t.id == id)
    }
}

/// Input records in client coordinates, in the order the host delivered them.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    PointerMove { x: f32, y: f32 },
    PointerLeave,
    TouchStart(TouchEvent),
    TouchMove(TouchEvent),
    TouchEnd(TouchEvent),
    TouchCancel(TouchEvent),
}

/// Tells the host whether to suppress the event's default action (scroll, zoom, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Response {
    pub prevent_default: bool,
}

impl Response {
    const PASS: Self = Self { prevent_default: false };
    const SUPPRESS: Self = Self { prevent_default: true };
}

/// The active pointer. `position` is kept in client space; the render loop converts it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    pub active: bool,
    pub position: Point,
    pub tracked_touch: Option<i64>,
}

#[derive(Debug, Default)]
pub struct PointerTracker {
    state: PointerState,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PointerState {
        self.state
    }

    /// Route one record to its handler.
    pub fn handle(&mut self, event: &InputEvent) -> Response {
        match event {
            InputEvent::PointerMove { x, y } => self.pointer_move(*x, *y),
            InputEvent::PointerLeave => self.pointer_leave(),
            InputEvent::TouchStart(e) => self.touch_start(e),
            InputEvent::TouchMove(e) => self.touch_move(e),
            InputEvent::TouchEnd(e) | InputEvent::TouchCancel(e) => self.touch_end(e),
        }
    }

    // A mouse move is not gated by an active touch; it overwrites the position either way.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> Response {
        self.state.active = true;
        self.state.position = Point::new(x, y);
        Response::PASS
    }

    pub fn pointer_leave(&mut self) -> Response {
        self.state.active = false;
        Response::PASS
    }

    pub fn touch_start(&mut self, event: &TouchEvent) -> Response {
        if let Some(id) = self.state.tracked_touch {
            log::debug!("touch-start ignored, already tracking touch {id}");
            return Response::SUPPRESS;
        }
        let first = event.changed.first().or_else(|| event.touches.first());
        if let Some(t) = first {
            log::debug!("tracking touch {}", t.id);
            self.state.active = true;
            self.state.tracked_touch = Some(t.id);
            self.state.position = Point::new(t.x, t.y);
        }
        Response::SUPPRESS
    }

    pub fn touch_move(&mut self, event: &TouchEvent) -> Response {
        if let Some(t) = self.state.tracked_touch.and_then(|id| event.find(id)) {
            self.state.position = Point::new(t.x, t.y);
        }
        Response::SUPPRESS
    }

    /// Shared by touch-end and touch-cancel.
    pub fn touch_end(&mut self, event: &TouchEvent) -> Response {
        if let Some(id) = self.state.tracked_touch {
            if event.find(id).is_none() {
                log::debug!("touch {id} lifted");
                self.state.tracked_touch = None;
                self.state.active = false;
            }
        }
        Response::SUPPRESS
    }
}
