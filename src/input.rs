//! Turns flags or interactive answers into a [`DownloadRequest`].

use std::io::{BufRead, Write};

use chrono::{DateTime, Local};

use crate::cli::{self, Args};
use crate::error::{GrabError, Result};
use crate::request::{self, DownloadRequest, MediaKind};

/// Picks the flag path or the prompts. Request flags without `--url` print usage and
/// fall back to prompting; configuration-only flags go straight to the prompts.
pub fn resolve<R: BufRead, W: Write>(
    args: Option<&Args>,
    input: &mut R,
    out: &mut W,
    now: DateTime<Local>,
) -> Result<DownloadRequest> {
    if let Some(args) = args {
        if args.url.is_some() {
            return from_flags(args, out, now);
        }
        if args.has_request_flags() {
            writeln!(out, "--url is required when --audio or --output is given.")?;
            cli::write_help(out)?;
            writeln!(out, "Falling back to interactive mode.")?;
        }
    }
    prompt(input, out, now)
}

/// Builds the request from `--url`, `--audio` and `--output`. `--url` must be present.
pub fn from_flags<W: Write>(args: &Args, out: &mut W, now: DateTime<Local>) -> Result<DownloadRequest> {
    let raw_url = args
        .url
        .as_deref()
        .ok_or_else(|| GrabError::InvalidInput("--url is required when flags are used".to_string()))?;
    let target_url = request::parse_target_url(raw_url)?;
    let kind = if args.audio { MediaKind::Audio } else { MediaKind::Video };
    let output = finish_output_name(args.output.as_deref(), kind, out, now)?;
    Ok(DownloadRequest::new(target_url, kind, output))
}

/// Asks for URL, media kind and filename, in that order.
pub fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, now: DateTime<Local>) -> Result<DownloadRequest> {
    let raw_url = ask(input, out, "Enter the SharePoint/Stream video page URL: ")?;
    let target_url = request::parse_target_url(&raw_url)?;

    let answer = ask(input, out, "Download (V)ideo or (A)udio only? [V]: ")?;
    let kind = MediaKind::from_choice(&answer);
    let trimmed = answer.trim();
    if !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case("v") && !trimmed.eq_ignore_ascii_case("a") {
        writeln!(out, "Unrecognized choice '{}', downloading video.", trimmed)?;
    }

    let example = format!("my_{}.{}", kind, kind.default_extension());
    let raw_name = ask(
        input,
        out,
        &format!("Enter the desired output filename (e.g., {}): ", example),
    )?;
    let output = finish_output_name(Some(&raw_name), kind, out, now)?;
    Ok(DownloadRequest::new(target_url, kind, output))
}

fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> Result<String> {
    write!(out, "{}", question)?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn finish_output_name<W: Write>(
    raw: Option<&str>,
    kind: MediaKind,
    out: &mut W,
    now: DateTime<Local>,
) -> Result<String> {
    let name = request::resolve_output_name(raw, kind, now);
    if name.generated {
        writeln!(out, "No filename provided. Using default: {}", name.file_name)?;
    }
    if name.extension_mismatch {
        let note = match kind {
            MediaKind::Audio => "it will be saved as .mp3",
            MediaKind::Video => "yt-dlp may pick a different container",
        };
        writeln!(
            out,
            "Warning: '{}' does not look like a {} file; {}.",
            name.file_name, kind, note
        )?;
    }
    Ok(name.file_name)
}
