#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::Mutex;
use streamgrab::browser::{BrowserLauncher, BrowserSession, PageDriver};
use streamgrab::config::{BrowserOptions, Config, DownloaderConfig, PlaybackOptions};
use streamgrab::error::{GrabError, Result};
use streamgrab::request::DownloadRequest;
use streamgrab::ytdlp::{build_invocation, Downloader, Invocation, ProcessResult};

pub const MANIFEST: &str =
    "https://eu-prod.asyncgw.teams.microsoft.com/v1/objects/0-neu-d1/views/videomanifest?provider=spo&docid=x&part=index&format=dash&useScf=True&pretranscode=0";
pub const CANONICAL: &str =
    "https://eu-prod.asyncgw.teams.microsoft.com/v1/objects/0-neu-d1/views/videomanifest?provider=spo&docid=x&part=index&format=dash";

#[derive(Default)]
pub struct Calls {
    pub launches: AtomicUsize,
    pub closed: AtomicBool,
    pub clicks: Mutex<Vec<String>>,
}

#[derive(Clone, Default)]
pub struct FakeBrowser {
    pub responses: Vec<String>,
    /// Delay before each response is emitted.
    pub response_delay: Duration,
    pub selectors_present: Vec<String>,
    pub fail_launch: bool,
    pub navigation_error: Option<String>,
    pub calls: Arc<Calls>,
}

pub struct FakeSession {
    page: FakePage,
    calls: Arc<Calls>,
}

pub struct FakePage {
    browser: FakeBrowser,
}

#[async_trait]
impl BrowserLauncher for FakeBrowser {
    type Session = FakeSession;

    async fn launch(&self, _options: &BrowserOptions) -> Result<FakeSession> {
        self.calls.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail_launch {
            return Err(GrabError::Launch("no chromium found".to_string()));
        }
        Ok(FakeSession {
            page: FakePage { browser: self.clone() },
            calls: self.calls.clone(),
        })
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    type Page = FakePage;

    fn page(&self) -> &FakePage {
        &self.page
    }

    async fn close(&mut self) -> Result<()> {
        self.calls.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn response_urls(&self) -> Result<BoxStream<'static, String>> {
        let delay = self.browser.response_delay;
        Ok(stream::iter(self.browser.responses.clone())
            .then(move |url| async move {
                tokio::time::sleep(delay).await;
                url
            })
            .boxed())
    }

    async fn navigate(&self, _url: &str) -> Result<()> {
        match &self.browser.navigation_error {
            Some(message) => Err(GrabError::Navigation(message.clone())),
            None => Ok(()),
        }
    }

    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<bool> {
        Ok(self.browser.selectors_present.iter().any(|s| s == selector))
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.browser.calls.clicks.lock().push(selector.to_string());
        Ok(())
    }
}

/// Records what would have been executed instead of spawning yt-dlp.
#[derive(Clone, Default)]
pub struct RecordingDownloader {
    pub calls: Arc<Mutex<Vec<(String, Invocation)>>>,
}

#[async_trait]
impl Downloader for RecordingDownloader {
    async fn download(&self, url: &str, request: &DownloadRequest) -> Result<ProcessResult> {
        let invocation = build_invocation(url, request, &DownloaderConfig::default());
        let output = invocation.output.clone();
        self.calls.lock().push((url.to_string(), invocation));
        Ok(ProcessResult {
            exit_code: 0,
            succeeded: true,
            output,
        })
    }
}

pub fn fast_config() -> Config {
    Config {
        playback: PlaybackOptions {
            selector_timeout: Duration::from_millis(1),
            pre_click_delay: Duration::ZERO,
            post_click_delay: Duration::ZERO,
            ..PlaybackOptions::default()
        },
        manifest_timeout: Duration::from_millis(300),
        ..Config::default()
    }
}
