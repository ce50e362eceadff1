use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type Result<T, E = GrabError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum GrabError {
    #[error("Invalid URL provided: {0:?}")]
    InvalidUrl(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Error navigating to page: {0}")]
    Navigation(String),

    #[error("Page navigation timed out")]
    NavigationTimeout,

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Timed out after {}s waiting for the videomanifest URL", .0.as_secs())]
    ManifestTimeout(Duration),

    #[error("Could not find '{marker}' in the captured manifest URL. Full URL was: {url}")]
    ManifestFormat { marker: &'static str, url: String },

    #[error("'{}' not found. Make sure yt-dlp is installed and on PATH, or pass --ytdlp", .0.display())]
    DownloaderNotFound(PathBuf),

    #[error("Failed to run yt-dlp: {0}")]
    DownloaderLaunch(#[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JoinError")]
    JoinError(#[from] tokio::task::JoinError),
}
