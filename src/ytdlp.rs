//! Download invoker: runs yt-dlp on the canonical manifest URL and relays its output.

use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use crate::config::DownloaderConfig;
use crate::error::{GrabError, Result};
use crate::request::{DownloadRequest, MediaKind};
use crate::ui;

const TOOL: &str = "yt-dlp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// `-1` when the process was killed by a signal.
    pub exit_code: i32,
    pub succeeded: bool,
    /// File name handed to `-o`.
    pub output: String,
}

#[async_trait]
pub trait Downloader: Send + Sync {
    /// Fetches `url` into the request's output file and reports how the tool exited.
    async fn download(&self, url: &str, request: &DownloadRequest) -> Result<ProcessResult>;
}

/// Arguments for one yt-dlp run and the file it will write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub args: Vec<String>,
    pub output: String,
}

/// Argument list for a download. Audio output always gets the audio format's extension.
pub fn build_invocation(url: &str, request: &DownloadRequest, config: &DownloaderConfig) -> Invocation {
    match request.kind {
        MediaKind::Video => Invocation {
            args: vec![url.to_string(), "-o".to_string(), request.output.clone()],
            output: request.output.clone(),
        },
        MediaKind::Audio => {
            let output = Path::new(&request.output)
                .with_extension(&config.audio_format)
                .to_string_lossy()
                .into_owned();
            let args = vec![
                url.to_string(),
                "-x".to_string(),
                "--extract-audio".to_string(),
                "--audio-format".to_string(),
                config.audio_format.clone(),
                "--audio-quality".to_string(),
                config.audio_quality.clone(),
                "-o".to_string(),
                output.clone(),
            ];
            Invocation { args, output }
        }
    }
}

/// The external yt-dlp executable.
#[derive(Debug, Clone)]
pub struct YtDlp {
    config: DownloaderConfig,
}

impl YtDlp {
    pub fn new(config: DownloaderConfig) -> Self {
        YtDlp { config }
    }

    /// Spawns the tool, relays its stdout and stderr line by line, and waits for exit.
    pub async fn run(&self, invocation: &Invocation) -> Result<ProcessResult> {
        let executable = &self.config.executable;
        ui::status(format!("Executing: {} {}", executable.display(), shell_words(&invocation.args)));

        let spawned = Command::new(executable)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(GrabError::DownloaderNotFound(executable.clone()))
            }
            Err(err) => return Err(GrabError::DownloaderLaunch(err)),
        };
        tracing::debug!(pid = ?child.id(), "yt-dlp spawned");

        let stdout = child.stdout.take().map(|pipe| tokio::spawn(relay(pipe, false)));
        let stderr = child.stderr.take().map(|pipe| tokio::spawn(relay(pipe, true)));

        let status = child.wait().await?;
        if let Some(task) = stdout {
            task.await?;
        }
        if let Some(task) = stderr {
            task.await?;
        }

        let exit_code = status.code().unwrap_or(-1);
        let result = ProcessResult {
            exit_code,
            succeeded: status.success(),
            output: invocation.output.clone(),
        };
        if result.succeeded {
            ui::success(format!("yt-dlp finished successfully. Saved as '{}'", result.output));
        } else {
            ui::error(format!("yt-dlp exited with error code: {}", exit_code));
            ui::status("Check the [yt-dlp ERR] messages above for details.");
        }
        Ok(result)
    }
}

#[async_trait]
impl Downloader for YtDlp {
    async fn download(&self, url: &str, request: &DownloadRequest) -> Result<ProcessResult> {
        let invocation = build_invocation(url, request, &self.config);
        ui::status(format!(
            "Starting yt-dlp to download {} as '{}'...",
            request.kind, invocation.output
        ));
        self.run(&invocation).await
    }
}

/// Forwards lines as they arrive.
async fn relay<R: AsyncRead + Unpin>(pipe: R, is_stderr: bool) {
    let mut lines = BufReader::new(pipe).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if is_stderr => ui::tool_error(TOOL, &line),
            Ok(Some(line)) => ui::tool_output(TOOL, &line),
            Ok(None) => break,
            Err(err) => {
                tracing::debug!(%err, is_stderr, "stopped relaying yt-dlp output");
                break;
            }
        }
    }
}

/// Display form of the argument list, quoting anything with spaces.
fn shell_words(args: &[String]) -> String {
    args.iter()
        .map(|a| {
            if a.contains(char::is_whitespace) || a.contains('&') {
                format!("\"{}\"", a)
            } else {
                a.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
