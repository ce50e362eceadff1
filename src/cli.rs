use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use crate::config::{BrowserOptions, Config, DownloaderConfig};

/// Download SharePoint/Stream videos by capturing their manifest and handing it to yt-dlp
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Video page URL (required when any flag is given)
    #[clap(short, long)]
    pub url: Option<String>,

    /// Extract audio only (saved as mp3)
    #[clap(short, long)]
    pub audio: bool,

    /// Output filename
    #[clap(short, long)]
    pub output: Option<String>,

    /// yt-dlp executable
    #[clap(long, env = "STREAMGRAB_YTDLP")]
    pub ytdlp: Option<PathBuf>,

    /// Chrome/Chromium executable, auto-detected when omitted
    #[clap(long, env = "STREAMGRAB_BROWSER")]
    pub browser: Option<PathBuf>,

    /// Browser profile directory, reused across runs to keep logins
    #[clap(long, env = "STREAMGRAB_PROFILE_DIR")]
    pub profile_dir: Option<PathBuf>,

    /// Run the browser without a window
    #[clap(long)]
    pub headless: bool,

    /// Seconds to wait for the manifest request
    #[clap(long, default_value_t = 60)]
    pub manifest_timeout: u64,

    /// Debug logging
    #[clap(short, long)]
    pub verbose: bool,
}

#[derive(Debug)]
pub enum Flags {
    /// No arguments at all.
    Interactive,
    /// `-h`, `--help`, `-?` or `/?`.
    Help,
    /// Anything clap wants to print and exit on, like `--version`.
    Exit(clap::Error),
    Parsed(Args),
    Invalid(clap::Error),
}

/// Sorts the command line into one of the [`Flags`] cases; never exits the process.
pub fn parse_flags<I, T>(argv: I) -> Flags
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
    if argv.len() <= 1 {
        return Flags::Interactive;
    }
    if argv.iter().skip(1).any(|a| a == "-?" || a == "/?") {
        return Flags::Help;
    }
    match Args::try_parse_from(argv) {
        Ok(args) => Flags::Parsed(args),
        Err(err) if err.kind() == ErrorKind::DisplayHelp => Flags::Help,
        Err(err) if err.kind() == ErrorKind::DisplayVersion => Flags::Exit(err),
        Err(err) => Flags::Invalid(err),
    }
}

/// Usage banner on stdout.
pub fn print_help() {
    let _ = Args::command().print_help();
    println!();
}

/// Usage banner into any writer.
pub fn write_help<W: Write>(out: &mut W) -> io::Result<()> {
    Args::command().write_help(out)?;
    writeln!(out)
}

impl Args {
    /// True when a flag that only makes sense together with `--url` was given.
    pub fn has_request_flags(&self) -> bool {
        self.url.is_some() || self.audio || self.output.is_some()
    }

    /// Defaults overridden by whichever flags were given.
    pub fn to_config(&self) -> Config {
        let defaults = Config::default();
        Config {
            browser: BrowserOptions {
                headless: self.headless,
                profile_dir: self.profile_dir.clone().unwrap_or(defaults.browser.profile_dir),
                executable: self.browser.clone(),
                ..defaults.browser
            },
            downloader: DownloaderConfig {
                executable: self.ytdlp.clone().unwrap_or(defaults.downloader.executable),
                ..defaults.downloader
            },
            manifest_timeout: Duration::from_secs(self.manifest_timeout),
            playback: defaults.playback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn no_arguments_means_interactive() {
        assert!(matches!(parse_flags(["streamgrab"]), Flags::Interactive));
    }

    #[test]
    fn help_aliases() {
        for flag in ["-h", "--help", "-?", "/?"] {
            assert!(matches!(parse_flags(["streamgrab", flag]), Flags::Help), "{}", flag);
        }
    }

    #[test]
    fn full_flag_set_parses() {
        let Flags::Parsed(args) = parse_flags(["streamgrab", "-u", "https://example.com/v", "-a", "-o", "talk"]) else {
            panic!("expected parsed flags");
        };
        assert_eq!(args.url.as_deref(), Some("https://example.com/v"));
        assert!(args.audio);
        assert_eq!(args.output.as_deref(), Some("talk"));
    }

    #[test]
    fn unknown_flag_or_missing_value_invalidates() {
        assert!(matches!(parse_flags(["streamgrab", "--bogus"]), Flags::Invalid(_)));
        assert!(matches!(parse_flags(["streamgrab", "--url"]), Flags::Invalid(_)));
    }

    #[test]
    fn config_overrides() {
        let Flags::Parsed(args) = parse_flags([
            "streamgrab",
            "--url",
            "https://example.com",
            "--ytdlp",
            "/opt/yt-dlp",
            "--headless",
            "--manifest-timeout",
            "5",
        ]) else {
            panic!("expected parsed flags");
        };
        let config = args.to_config();
        assert_eq!(config.downloader.executable, PathBuf::from("/opt/yt-dlp"));
        assert!(config.browser.headless);
        assert_eq!(config.manifest_timeout, Duration::from_secs(5));
        assert_eq!(config.playback.selectors.len(), 5);
    }
}
