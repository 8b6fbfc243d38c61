// What you SEE:
// • A window showing the bottom image.
// • Move the mouse over it: a soft-edged circle around the cursor shows the top image instead.
// • Leave the window: the circle closes (see --inactive for other choices).
// • ESC or closing the window quits; Ctrl-C in the terminal does too.

use clap::Parser;
use std::sync::Arc;
use xray_lens::assets::{load_pair, FsLoader};
use xray_lens::config::Cli;
use xray_lens::headless::render_snapshot;
use xray_lens::window::WindowSurface;
use xray_lens::{Error, Options, RenderLoop};

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let options = Options::resolve(&cli)?;
    log::info!(
        "layers: top={} bottom={} ({}x{}, radius {})",
        options.top, options.bottom, options.width, options.height, options.window_radius
    );

    /* --- Load both layers before anything is drawn ---
       A missing or slow image ends here with an error instead of a blank window. */
    let assets = load_pair(Arc::new(FsLoader), &options.top, &options.bottom, options.load_timeout)
        .inspect_err(|e| log::error!("{e}"))?;

    if let Some(path) = &cli.snapshot {
        render_snapshot(options, assets, cli.pointer, path)?;
        return Ok(());
    }

    let mut surface = WindowSurface::new(&options.title, options.width, options.height, options.target_fps)?;

    let mut render_loop = RenderLoop::new();
    let cancel = render_loop.cancel_handle();
    if let Err(e) = ctrlc::set_handler(move || cancel.cancel()) {
        log::warn!("Ctrl-C handler not installed: {e}");
    }

    render_loop.start(options, assets);
    render_loop.run(&mut surface)
}
