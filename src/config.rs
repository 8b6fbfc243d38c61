// Startup configuration: built-in defaults, then an optional TOML file, then CLI flags.
// Fixed once the effect starts; nothing here is reloaded at runtime.

use crate::error::{Error, Result};
use crate::types::Point;
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What the output shows while no pointer drives the reveal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InactivePolicy {
    /// Reveal fully closed: the output is the bottom image.
    #[default]
    Closed,
    /// Reveal fully open: the top image is composited unmasked.
    Open,
    /// Keep revealing around the last known pointer position.
    Hold,
}

/// Immutable effect options.
#[derive(Clone, Debug, PartialEq)]
pub struct Options {
    pub width: usize,
    pub height: usize,
    pub top: String,
    pub bottom: String,
    pub window_radius: f32,
    pub load_timeout: Duration,
    pub inactive: InactivePolicy,
    pub target_fps: usize,
    pub title: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            width: 450,
            height: 300,
            top: "layer1.png".into(),
            bottom: "layer2.png".into(),
            window_radius: 50.0,
            load_timeout: Duration::from_millis(10_000),
            inactive: InactivePolicy::Closed,
            target_fps: 60,
            title: "X-Ray Lens".into(),
        }
    }
}

/// Layout of the optional `--config` file. Every key may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileOptions {
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub top: Option<String>,
    pub bottom: Option<String>,
    pub window_radius: Option<f32>,
    pub load_timeout_ms: Option<u64>,
    pub inactive: Option<InactivePolicy>,
    pub target_fps: Option<usize>,
    pub title: Option<String>,
}

impl FileOptions {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("parse: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("read {}: {e}", path.display())))?;
        Self::from_toml(&text)
    }
}

/// Interactive x-ray lens: a circle around the pointer reveals the top image over the bottom one.
#[derive(Debug, Default, Parser)]
#[command(name = "xray-lens", version)]
pub struct Cli {
    /// TOML file with option overrides (flags still win)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Output width in pixels
    #[arg(long)]
    pub width: Option<usize>,
    /// Output height in pixels
    #[arg(long)]
    pub height: Option<usize>,
    /// Image revealed inside the lens (path or file:// URL)
    #[arg(long)]
    pub top: Option<String>,
    /// Image shown everywhere else (path or file:// URL)
    #[arg(long)]
    pub bottom: Option<String>,
    /// Nominal radius of the reveal circle in pixels
    #[arg(long)]
    pub window_radius: Option<f32>,
    /// Give up loading the images after this many milliseconds
    #[arg(long)]
    pub load_timeout_ms: Option<u64>,
    /// What to show while the pointer is outside the window
    #[arg(long, value_enum)]
    pub inactive: Option<InactivePolicy>,
    /// Refresh cadence of the render loop
    #[arg(long)]
    pub target_fps: Option<usize>,
    /// Render a single frame headlessly and write it to this PNG instead of opening a window
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
    /// Pointer position for --snapshot, as X,Y in client coordinates
    #[arg(long, value_parser = parse_point)]
    pub pointer: Option<Point>,
}

fn parse_point(s: &str) -> std::result::Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got `{s}`"))?;
    let x = x.trim().parse::<f32>().map_err(|e| format!("bad X `{x}`: {e}"))?;
    let y = y.trim().parse::<f32>().map_err(|e| format!("bad Y `{y}`: {e}"))?;
    Ok(Point::new(x, y))
}

impl Options {
    /// Merge defaults, the config file named by `cli.config` (if any), then flags.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileOptions::load(path)?,
            None => FileOptions::default(),
        };
        let mut opts = Self::default();
        opts.apply_file(file);
        opts.apply_cli(cli);
        opts.validate()?;
        Ok(opts)
    }

    pub fn apply_file(&mut self, f: FileOptions) {
        if let Some(v) = f.width { self.width = v; }
        if let Some(v) = f.height { self.height = v; }
        if let Some(v) = f.top { self.top = v; }
        if let Some(v) = f.bottom { self.bottom = v; }
        if let Some(v) = f.window_radius { self.window_radius = v; }
        if let Some(v) = f.load_timeout_ms { self.load_timeout = Duration::from_millis(v); }
        if let Some(v) = f.inactive { self.inactive = v; }
        if let Some(v) = f.target_fps { self.target_fps = v; }
        if let Some(v) = f.title { self.title = v; }
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(v) = cli.width { self.width = v; }
        if let Some(v) = cli.height { self.height = v; }
        if let Some(v) = &cli.top { self.top = v.clone(); }
        if let Some(v) = &cli.bottom { self.bottom = v.clone(); }
        if let Some(v) = cli.window_radius { self.window_radius = v; }
        if let Some(v) = cli.load_timeout_ms { self.load_timeout = Duration::from_millis(v); }
        if let Some(v) = cli.inactive { self.inactive = v; }
        if let Some(v) = cli.target_fps { self.target_fps = v; }
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Config(format!(
                "output size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.window_radius.is_finite() || self.window_radius <= 0.0 {
            return Err(Error::Config(format!(
                "window_radius must be a positive number, got {}",
                self.window_radius
            )));
        }
        if self.target_fps == 0 {
            return Err(Error::Config("target_fps must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_demo_layers() {
        let opts = Options::resolve(&Cli::default()).unwrap();
        assert_eq!(opts.width, 450);
        assert_eq!(opts.height, 300);
        assert_eq!(opts.window_radius, 50.0);
        assert_eq!(opts.top, "layer1.png");
        assert_eq!(opts.bottom, "layer2.png");
        assert_eq!(opts.inactive, InactivePolicy::Closed);
    }

    #[test]
    fn flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "width = 200\nwindow_radius = 20.0\ninactive = \"hold\"").unwrap();

        let cli = Cli::parse_from([
            "xray-lens",
            "--config",
            file.path().to_str().unwrap(),
            "--window-radius",
            "35",
        ]);
        let opts = Options::resolve(&cli).unwrap();
        assert_eq!(opts.width, 200);
        assert_eq!(opts.window_radius, 35.0);
        assert_eq!(opts.inactive, InactivePolicy::Hold);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            FileOptions::from_toml("radius = 3"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn non_positive_radius_is_rejected() {
        let cli = Cli::parse_from(["xray-lens", "--window-radius", "0"]);
        assert!(matches!(Options::resolve(&cli), Err(Error::Config(_))));
    }

    #[test]
    fn pointer_flag_parses_pairs() {
        let cli = Cli::parse_from(["xray-lens", "--pointer", "12.5, 40"]);
        assert_eq!(cli.pointer, Some(Point::new(12.5, 40.0)));
        assert!(parse_point("12").is_err());
    }
}
