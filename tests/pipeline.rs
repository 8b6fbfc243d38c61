// End-to-end frames through the headless host.

use xray_lens::assets::LoadedAssets;
use xray_lens::headless::HeadlessSurface;
use xray_lens::pointer::{InputEvent, TouchEvent, TouchPoint};
use xray_lens::types::{FrameBuffer, Point};
use xray_lens::{InactivePolicy, LoopState, Options, RenderLoop};

const TOP: u32 = 0xFF_F0_C0_20;
const BOTTOM: u32 = 0xFF_20_40_80;

// Two 450x300 layers with a little texture so a shifted lens would show.
fn layers() -> LoadedAssets {
    let mut top = FrameBuffer::filled(450, 300, TOP);
    let mut bottom = FrameBuffer::filled(450, 300, BOTTOM);
    for i in (0..top.pixels.len()).step_by(97) {
        top.pixels[i] = 0xFF_FF_FF_FF;
        bottom.pixels[i] = 0xFF_00_00_00;
    }
    LoadedAssets { top, bottom }
}

fn running(options: Options) -> RenderLoop {
    let mut lp = RenderLoop::new();
    lp.start(options, layers());
    lp
}

fn touch(id: i64, x: f32, y: f32) -> TouchPoint {
    TouchPoint::new(id, x, y)
}

#[test]
fn inactive_pointer_shows_pure_bottom_by_default() {
    let mut lp = running(Options::default());
    let mut surface = HeadlessSurface::new(450, 300);
    assert_eq!(lp.tick(&mut surface).unwrap(), None);
    assert_eq!(surface.last_frame(), Some(&layers().bottom));
}

#[test]
fn inactive_pointer_shows_pure_top_with_open_policy() {
    let mut lp = running(Options { inactive: InactivePolicy::Open, ..Options::default() });
    let mut surface = HeadlessSurface::new(450, 300);
    lp.tick(&mut surface).unwrap();
    assert_eq!(surface.last_frame(), Some(&layers().top));
}

#[test]
fn mouse_lens_tracks_surface_placement() {
    let mut lp = running(Options::default());
    let mut surface = HeadlessSurface::new(450, 300).with_origin(50.0, 20.0);

    surface.push_frame(vec![InputEvent::PointerMove { x: 150.0, y: 120.0 }]);
    assert_eq!(lp.tick(&mut surface).unwrap(), Some(Point::new(100.0, 100.0)));
    let frame = surface.last_frame().unwrap();
    assert_eq!(frame.get(101, 101), Some(TOP));
    assert_eq!(frame.get(170, 100), Some(BOTTOM));

    // Page scrolled: same client position, different local focal point.
    surface.move_to(0.0, 0.0);
    assert_eq!(lp.tick(&mut surface).unwrap(), Some(Point::new(150.0, 120.0)));
    let frame = surface.last_frame().unwrap();
    assert_eq!(frame.get(151, 121), Some(TOP));
    assert_eq!(frame.get(60, 100), Some(BOTTOM));
}

#[test]
fn leaving_closes_the_lens() {
    let mut lp = running(Options::default());
    let mut surface = HeadlessSurface::new(450, 300);
    surface.push_frame(vec![InputEvent::PointerMove { x: 100.0, y: 100.0 }]);
    surface.push_frame(vec![InputEvent::PointerLeave]);

    lp.tick(&mut surface).unwrap();
    assert_eq!(surface.last_frame().unwrap().get(100, 100), Some(TOP));
    lp.tick(&mut surface).unwrap();
    assert_eq!(surface.last_frame(), Some(&layers().bottom));
}

#[test]
fn touch_session_drives_and_releases_the_lens() {
    let mut lp = running(Options::default());
    let mut surface = HeadlessSurface::new(450, 300).with_origin(10.0, 10.0);

    surface.push_frame(vec![InputEvent::TouchStart(TouchEvent::with_touches(vec![touch(7, 110.0, 110.0)]))]);
    surface.push_frame(vec![
        InputEvent::TouchStart(TouchEvent::new(
            vec![touch(7, 110.0, 110.0), touch(3, 300.0, 200.0)],
            vec![touch(3, 300.0, 200.0)],
        )),
        InputEvent::TouchMove(TouchEvent::with_touches(vec![touch(3, 310.0, 210.0), touch(7, 210.0, 160.0)])),
    ]);
    surface.push_frame(vec![InputEvent::TouchMove(TouchEvent::with_touches(vec![touch(3, 400.0, 250.0)]))]);
    surface.push_frame(vec![InputEvent::TouchEnd(TouchEvent::new(
        vec![touch(3, 400.0, 250.0)],
        vec![touch(7, 210.0, 160.0)],
    ))]);

    assert_eq!(lp.tick(&mut surface).unwrap(), Some(Point::new(100.0, 100.0)));
    assert_eq!(lp.tick(&mut surface).unwrap(), Some(Point::new(200.0, 150.0)));
    // Only the untracked contact moved.
    assert_eq!(lp.tick(&mut surface).unwrap(), Some(Point::new(200.0, 150.0)));
    assert_eq!(lp.tick(&mut surface).unwrap(), None);

    let ctx = lp.context().unwrap();
    assert!(!ctx.pointer().active);
    assert_eq!(ctx.pointer().tracked_touch, None);
    assert_eq!(surface.last_frame(), Some(&layers().bottom));
    // Every touch record asked for its default action to be suppressed.
    assert_eq!(surface.suppressed(), 5);
}

#[test]
fn loop_runs_until_host_closes() {
    let mut lp = running(Options::default());
    let mut surface = HeadlessSurface::new(450, 300).close_when_drained();
    for x in [10.0, 20.0, 30.0] {
        surface.push_frame(vec![InputEvent::PointerMove { x, y: 50.0 }]);
    }
    lp.run(&mut surface).unwrap();
    assert_eq!(lp.state(), LoopState::Stopped);
    assert_eq!(lp.frames(), 3);
    assert_eq!(lp.context().unwrap().pointer().position, Point::new(30.0, 50.0));
}

#[test]
fn size_mismatch_between_options_and_host_stops_the_loop() {
    let mut lp = running(Options::default());
    let mut surface = HeadlessSurface::new(200, 100);
    assert!(lp.run(&mut surface).is_err());
    assert_eq!(lp.state(), LoopState::Stopped);
}

#[test]
fn small_top_layer_never_darkens_the_bottom() {
    let assets = LoadedAssets {
        top: FrameBuffer::filled(100, 100, 0xFF_FF_00_00),
        bottom: FrameBuffer::filled(450, 300, 0xFF_20_40_80),
    };
    let mut lp = RenderLoop::new();
    lp.start(Options::default(), assets);
    let mut surface = HeadlessSurface::new(450, 300);
    surface.push_frame(vec![InputEvent::PointerMove { x: 50.0, y: 50.0 }]);
    lp.tick(&mut surface).unwrap();

    let frame = surface.last_frame().unwrap();
    assert_eq!(frame.get(50, 50), Some(0xFF_FF_00_00));
    assert_eq!(frame.get(300, 200), Some(0xFF_20_40_80));
    assert_eq!(frame.get(99, 99), Some(0xFF_20_40_80));
    assert_eq!(frame.get(150, 50), Some(0xFF_20_40_80));
}

#[test]
fn transparent_holes_in_top_layer_show_bottom_outside_lens() {
    let mut assets = layers();
    for px in assets.top.pixels.iter_mut().skip(1).step_by(2) {
        *px = 0x00_00_00_00;
    }
    let mut lp = RenderLoop::new();
    lp.start(Options::default(), assets.clone());
    let mut surface = HeadlessSurface::new(450, 300);
    surface.push_frame(vec![InputEvent::PointerMove { x: 100.0, y: 100.0 }]);
    lp.tick(&mut surface).unwrap();

    let frame = surface.last_frame().unwrap();
    for (x, y) in [(300, 200), (301, 200), (10, 10), (11, 10)] {
        assert_eq!(frame.get(x, y), assets.bottom.get(x, y), "pixel ({x},{y})");
    }
    // Inside the lens a hole shows the bottom, an opaque pixel the top.
    assert_eq!(frame.get(101, 100), assets.bottom.get(101, 100));
    assert_eq!(frame.get(100, 100), Some(TOP));
}
