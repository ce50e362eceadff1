use crate::browser::{BrowserLauncher, BrowserSession, PageDriver};
use crate::config::Config;
use crate::error::Result;
use crate::manifest;
use crate::playback;
use crate::request::DownloadRequest;
use crate::ui;
use crate::ytdlp::{Downloader, ProcessResult};

/// One capture-and-download run, wired to its two collaborators.
pub struct Grabber<L, D> {
    launcher: L,
    downloader: D,
    config: Config,
}

impl<L, D> Grabber<L, D>
where
    L: BrowserLauncher,
    D: Downloader,
{
    /// Wires the collaborators; nothing is launched until [`Grabber::run`].
    pub fn new(launcher: L, downloader: D, config: Config) -> Self {
        Grabber {
            launcher,
            downloader,
            config,
        }
    }

    /// Launches the browser, captures the manifest, downloads. The session is closed on
    /// every path once it has been launched.
    pub async fn run(&self, request: &DownloadRequest) -> Result<ProcessResult> {
        ui::status("Launching browser...");
        let mut session = self.launcher.launch(&self.config.browser).await?;

        let outcome = self.drive(session.page(), request).await;

        if let Err(err) = session.close().await {
            tracing::warn!(%err, "browser did not close cleanly");
        }
        outcome
    }

    /// Everything between launch and close: capture, canonicalize, download.
    async fn drive(
        &self,
        page: &<L::Session as BrowserSession>::Page,
        request: &DownloadRequest,
    ) -> Result<ProcessResult> {
        let manifest_url = self.capture_manifest(page, request).await?;

        ui::status("Processing manifest URL...");
        let url = manifest::canonicalize(&manifest_url)?;
        ui::status(format!("Shortened URL: {}", ui::preview(&url, 100)));

        self.downloader.download(&url, request).await
    }

    /// Subscribes to responses before navigating, triggers playback, then waits for the
    /// first manifest URL.
    async fn capture_manifest<P: PageDriver + ?Sized>(&self, page: &P, request: &DownloadRequest) -> Result<String> {
        ui::status("Setting up network listener...");
        let responses = page.response_urls().await?;
        let (signal, capture) = manifest::channel();
        // `signal` stays alive until the wait returns; dropping it would end the wait early.
        let _observer = manifest::observe(responses, signal.clone());

        playback::navigate(page, request.target_url.as_str()).await?;
        let outcome = playback::trigger(page, &self.config.playback).await;
        tracing::debug!(?outcome, "playback trigger finished");

        ui::status(format!(
            "Waiting for videomanifest URL (up to {} seconds)...",
            self.config.manifest_timeout.as_secs()
        ));
        match capture.wait(self.config.manifest_timeout).await {
            Ok(url) => {
                ui::success(format!("Successfully captured manifest URL: {}", ui::preview(&url, 100)));
                Ok(url)
            }
            Err(err) => {
                ui::warning(
                    "Possible reasons: Video didn't play, page structure changed, login required, or manifest URL pattern differs.",
                );
                Err(err)
            }
        }
    }
}
