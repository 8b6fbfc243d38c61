// Crate error type. Every variant states *where* things went wrong.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String), // Creating the window failed
    #[error("Window update error: {0}")]
    WindowUpdate(String), // Presenting a frame failed
    #[error("Asset load error for {url}: {reason}")]
    AssetLoad { url: String, reason: String },
    #[error("Asset load timed out for {url}")]
    AssetTimeout { url: String },
    #[error("Snapshot error: {0}")]
    Snapshot(String),
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),
    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
