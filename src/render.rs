// Render loop driver.
// Each tick: drain input into the tracker, convert the pointer to surface-local space,
// rebuild the mask, compose, present. Presenting blocks until the next refresh slot.

use crate::assets::LoadedAssets;
use crate::compositor::{compose, Layers, Passes};
use crate::config::{InactivePolicy, Options};
use crate::error::Result;
use crate::mask::RadialMask;
use crate::pointer::{InputEvent, PointerState, PointerTracker, Response};
use crate::types::{FrameBuffer, Mask, Point, Rect};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The host the effect draws into and takes input from.
pub trait Surface {
    /// Current on-screen bounding rectangle of the output, in client coordinates.
    fn bounding_rect(&self) -> Rect;

    /// Input records received since the last call, in delivery order.
    fn poll_events(&mut self) -> Vec<InputEvent>;

    /// Show a finished frame. Blocks until the next display refresh.
    fn present(&mut self, frame: &FrameBuffer) -> Result<()>;

    /// False once the host is gone (window closed, quit key, script exhausted).
    fn is_open(&self) -> bool;

    /// Told how each event was handled, so the host can suppress default actions.
    fn on_response(&mut self, _event: &InputEvent, _response: Response) {}
}

/// Everything one running effect owns: options, pointer, layers and scratch buffers.
pub struct XrayContext {
    options: Options,
    tracker: PointerTracker,
    assets: LoadedAssets,
    mask: Mask,
    scratch: FrameBuffer, // off-screen buffer holding the masked top layer
    output: FrameBuffer,
}

impl XrayContext {
    pub fn new(options: Options, assets: LoadedAssets) -> Self {
        let (w, h) = (options.width, options.height);
        Self {
            options,
            tracker: PointerTracker::new(),
            assets,
            mask: Mask::new(w, h),
            scratch: FrameBuffer::transparent(w, h),
            output: FrameBuffer::transparent(w, h),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn pointer(&self) -> PointerState {
        self.tracker.state()
    }

    pub fn output(&self) -> &FrameBuffer {
        &self.output
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn dispatch(&mut self, event: &InputEvent) -> Response {
        self.tracker.handle(event)
    }

    /// What to draw for the current pointer state, and where the lens sits (local space).
    pub fn plan(&self, rect: Rect) -> (Passes, Option<Point>) {
        let state = self.tracker.state();
        let focal = rect.to_local(state.position);
        if state.active {
            return (Passes::REVEAL, Some(focal));
        }
        match self.options.inactive {
            InactivePolicy::Closed => (Passes::BOTTOM_ONLY, None),
            InactivePolicy::Open => (Passes::UNMASKED, None),
            InactivePolicy::Hold => (Passes::REVEAL, Some(focal)),
        }
    }

    /// Rebuild the output for the surface's current placement. Returns the focal point used.
    pub fn render(&mut self, rect: Rect) -> Result<Option<Point>> {
        let (passes, focal) = self.plan(rect);
        if let Some(f) = focal {
            RadialMask::new(f, self.options.window_radius).render_into(&mut self.mask);
        }
        let layers = Layers { top: &self.assets.top, bottom: &self.assets.bottom };
        compose(layers, &self.mask, passes, &mut self.scratch, &mut self.output)?;
        Ok(focal)
    }
}

/// Stops a running loop before its next tick. Cheap to clone, safe to use from any thread.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Waiting for both layers.
    Idle,
    Running,
    /// Cancelled or host closed. Terminal.
    Stopped,
}

pub struct RenderLoop {
    state: LoopState,
    ctx: Option<XrayContext>,
    cancel: CancelHandle,
    max_frames: Option<u64>,
    frames: u64,
    last_fps_time: Instant,
    frames_this_second: u32,
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Idle,
            ctx: None,
            cancel: CancelHandle::default(),
            max_frames: None,
            frames: 0,
            last_fps_time: Instant::now(),
            frames_this_second: 0,
        }
    }

    /// Stop by itself after `n` ticks.
    pub fn with_max_frames(mut self, n: u64) -> Self {
        self.max_frames = Some(n);
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn context(&self) -> Option<&XrayContext> {
        self.ctx.as_ref()
    }

    /// Idle → Running. Only possible once, and only with both layers in hand.
    pub fn start(&mut self, options: Options, assets: LoadedAssets) {
        if self.state != LoopState::Idle {
            log::warn!("render loop already {:?}; start ignored", self.state);
            return;
        }
        log::info!(
            "render loop running: {}x{}, window radius {}, inactive policy {:?}",
            options.width, options.height, options.window_radius, options.inactive
        );
        self.ctx = Some(XrayContext::new(options, assets));
        self.state = LoopState::Running;
    }

    pub fn stop(&mut self) {
        if self.state != LoopState::Stopped {
            log::info!("render loop stopped after {} frames", self.frames);
        }
        self.state = LoopState::Stopped;
    }

    /// One frame. Returns the focal point drawn, or None when no lens was drawn
    /// (or the loop is not running).
    pub fn tick<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<Option<Point>> {
        if self.state != LoopState::Running {
            return Ok(None);
        }
        let Some(ctx) = self.ctx.as_mut() else {
            return Ok(None);
        };

        for event in surface.poll_events() {
            let response = ctx.dispatch(&event);
            surface.on_response(&event, response);
        }

        let focal = ctx.render(surface.bounding_rect())?;
        surface.present(&ctx.output)?;

        self.frames += 1;
        self.count_fps();
        Ok(focal)
    }

    /// Tick until cancelled, the host closes, or the frame cap is reached.
    pub fn run<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<()> {
        while self.state == LoopState::Running {
            let capped = self.max_frames.is_some_and(|n| self.frames >= n);
            if self.cancel.is_cancelled() || !surface.is_open() || capped {
                self.stop();
                break;
            }
            if let Err(e) = self.tick(surface) {
                self.stop();
                return Err(e);
            }
        }
        Ok(())
    }

    fn count_fps(&mut self) {
        self.frames_this_second += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_fps_time);
        if elapsed >= Duration::from_secs(1) {
            let fps = self.frames_this_second as f32 / elapsed.as_secs_f32();
            log::debug!("FPS: {fps:.1}");
            self.frames_this_second = 0;
            self.last_fps_time = now;
        }
    }
}
