use std::fmt;
use std::path::Path;

use chrono::{DateTime, Local};
use url::Url;

use crate::error::{GrabError, Result};

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm", "mov", "m4v", "avi", "flv", "ts"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "aac", "wav", "flac", "ogg", "opus"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaKind {
    #[default]
    Video,
    Audio,
}

impl MediaKind {
    /// Extension appended when the user gives none.
    pub fn default_extension(self) -> &'static str {
        match self {
            MediaKind::Video => "mp4",
            MediaKind::Audio => "mp3",
        }
    }

    fn accepts_extension(self, ext: &str) -> bool {
        let known = match self {
            MediaKind::Video => VIDEO_EXTENSIONS,
            MediaKind::Audio => AUDIO_EXTENSIONS,
        };
        known.iter().any(|k| k.eq_ignore_ascii_case(ext))
    }

    /// Interactive answer: `A` selects audio, anything else (including empty) is video.
    pub fn from_choice(answer: &str) -> Self {
        if answer.trim().eq_ignore_ascii_case("a") {
            MediaKind::Audio
        } else {
            MediaKind::Video
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video => f.write_str("video"),
            MediaKind::Audio => f.write_str("audio"),
        }
    }
}

/// What to fetch and where to put it. Built once by the input resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub target_url: Url,
    pub kind: MediaKind,
    pub output: String,
}

impl DownloadRequest {
    pub fn new(target_url: Url, kind: MediaKind, output: String) -> Self {
        DownloadRequest {
            target_url,
            kind,
            output,
        }
    }
}

/// Output name after defaulting, plus whether its extension disagrees with the media kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputName {
    pub file_name: String,
    pub generated: bool,
    pub extension_mismatch: bool,
}

/// Parses an absolute URI. Relative references and garbage are rejected.
pub fn parse_target_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(GrabError::InvalidUrl(raw.to_string()));
    }
    Url::parse(trimmed).map_err(|_| GrabError::InvalidUrl(raw.to_string()))
}

pub fn resolve_output_name(raw: Option<&str>, kind: MediaKind, now: DateTime<Local>) -> OutputName {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return OutputName {
            file_name: format!(
                "downloaded_{}_{}.{}",
                kind,
                now.format("%Y%m%d%H%M%S"),
                kind.default_extension()
            ),
            generated: true,
            extension_mismatch: false,
        };
    }
    // Any dot in the file name means the user picked the extension, so `.mp4` stays `.mp4`.
    let file_part = Path::new(raw).file_name().and_then(|f| f.to_str()).unwrap_or(raw);
    match file_part.rsplit_once('.') {
        None => OutputName {
            file_name: format!("{}.{}", raw, kind.default_extension()),
            generated: false,
            extension_mismatch: false,
        },
        Some((_, ext)) => OutputName {
            file_name: raw.to_string(),
            generated: false,
            extension_mismatch: !ext.is_empty() && !kind.accepts_extension(ext),
        },
    }
}
