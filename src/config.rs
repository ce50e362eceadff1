use std::path::PathBuf;
use std::time::Duration;

use directories::BaseDirs;

/// Everything the session controller and the downloader need to know.
#[derive(Debug, Clone)]
pub struct Config {
    pub browser: BrowserOptions,
    pub playback: PlaybackOptions,
    pub downloader: DownloaderConfig,
    pub manifest_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub profile_dir: PathBuf,
    /// Explicit Chrome/Chromium binary; auto-detected when `None`.
    pub executable: Option<PathBuf>,
    pub args: Vec<String>,
    pub viewport: (u32, u32),
    pub navigation_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct PlaybackOptions {
    /// Tried in order, first hit wins.
    pub selectors: Vec<String>,
    pub selector_timeout: Duration,
    pub pre_click_delay: Duration,
    pub post_click_delay: Duration,
}

#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    pub executable: PathBuf,
    pub audio_format: String,
    pub audio_quality: String,
}

pub const DEFAULT_SELECTORS: &[&str] = &[
    "video",
    "[data-testid='media-play-button']",
    "button[aria-label='Play']",
    ".playbutton_playpause",
    "[class*='videoPlayer--play']",
];

/// `yt-dlp`, resolved through `PATH`.
pub fn default_ytdlp() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("yt-dlp.exe")
    } else {
        PathBuf::from("yt-dlp")
    }
}

/// `<local data dir>/streamgrab/browser-profile`, falling back to the working directory.
pub fn default_profile_dir() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
        .join("streamgrab")
        .join("browser-profile")
}

impl Default for BrowserOptions {
    fn default() -> Self {
        BrowserOptions {
            headless: false,
            profile_dir: default_profile_dir(),
            executable: None,
            args: vec!["--no-sandbox".to_string()],
            viewport: (1280, 800),
            navigation_timeout: Duration::from_secs(60),
        }
    }
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        PlaybackOptions {
            selectors: DEFAULT_SELECTORS.iter().map(|s| s.to_string()).collect(),
            selector_timeout: Duration::from_secs(20),
            pre_click_delay: Duration::from_secs(1),
            post_click_delay: Duration::from_secs(2),
        }
    }
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        DownloaderConfig {
            executable: default_ytdlp(),
            audio_format: "mp3".to_string(),
            audio_quality: "best".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            browser: BrowserOptions::default(),
            playback: PlaybackOptions::default(),
            downloader: DownloaderConfig::default(),
            manifest_timeout: Duration::from_secs(60),
        }
    }
}
