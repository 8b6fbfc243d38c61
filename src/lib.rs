// X-ray lens: two stacked images, and a soft circle around the pointer that reveals the top one.
//
// Data flows one way each frame:
//   input records → pointer tracker → radial mask → layer compositor → surface
// The render loop ties that to the host's refresh cadence.

pub mod assets;
pub mod compositor;
pub mod config;
pub mod error;
pub mod headless;
pub mod mask;
pub mod pointer;
pub mod render;
pub mod types;
pub mod window;

pub use config::{InactivePolicy, Options};
pub use error::{Error, Result};
pub use render::{CancelHandle, LoopState, RenderLoop, Surface, XrayContext};
