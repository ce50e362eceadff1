//! Browser session controller.
//!
//! The pipeline only talks to the traits below; [`ChromeLauncher`] is the production
//! implementation on top of `chromiumoxide`. Tests plug in their own pages.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::EventResponseReceived;
use chromiumoxide::error::CdpError;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::config::BrowserOptions;
use crate::error::{GrabError, Result};
use crate::ui;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[async_trait]
pub trait PageDriver: Send + Sync {
    /// URLs of completed responses, in arrival order.
    async fn response_urls(&self) -> Result<BoxStream<'static, String>>;

    /// Loads `url`. A slow page yields [`GrabError::NavigationTimeout`].
    async fn navigate(&self, url: &str) -> Result<()>;

    /// `Ok(false)` when nothing matched `selector` before `timeout`.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<bool>;

    /// Clicks the first element matching `selector`.
    async fn click(&self, selector: &str) -> Result<()>;
}

#[async_trait]
pub trait BrowserSession: Send {
    type Page: PageDriver;

    /// The single page the run drives.
    fn page(&self) -> &Self::Page;

    /// Closes the page, then the browser. Called exactly once per session.
    async fn close(&mut self) -> Result<()>;
}

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Session: BrowserSession;

    /// Starts a browser with a persistent profile and opens one blank page.
    async fn launch(&self, options: &BrowserOptions) -> Result<Self::Session>;
}

/// Launches Chromium through the DevTools protocol.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeLauncher;

pub struct ChromeSession {
    browser: Browser,
    page: ChromePage,
    handler: Option<JoinHandle<()>>,
}

pub struct ChromePage(Page);

fn browser_err(err: CdpError) -> GrabError {
    GrabError::Browser(err.to_string())
}

fn launch_config(options: &BrowserOptions) -> Result<BrowserConfig> {
    let (width, height) = options.viewport;
    let mut builder = BrowserConfig::builder()
        .user_data_dir(&options.profile_dir)
        .window_size(width, height)
        .viewport(Viewport {
            width,
            height,
            ..Viewport::default()
        })
        .request_timeout(options.navigation_timeout)
        .args(options.args.clone());
    if !options.headless {
        builder = builder.with_head();
    }
    if let Some(executable) = &options.executable {
        builder = builder.chrome_executable(executable);
    }
    builder.build().map_err(GrabError::Launch)
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    type Session = ChromeSession;

    async fn launch(&self, options: &BrowserOptions) -> Result<ChromeSession> {
        tokio::fs::create_dir_all(&options.profile_dir)
            .await
            .map_err(|e| GrabError::Launch(format!("profile dir {}: {}", options.profile_dir.display(), e)))?;
        let config = launch_config(options)?;
        tracing::debug!(profile = %options.profile_dir.display(), headless = options.headless, "launching chromium");

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| GrabError::Launch(e.to_string()))?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    tracing::debug!(%err, "browser handler error");
                }
            }
        });

        match browser.new_page("about:blank").await {
            Ok(page) => Ok(ChromeSession {
                browser,
                page: ChromePage(page),
                handler: Some(handler),
            }),
            Err(err) => {
                let _ = browser.close().await;
                handler.abort();
                Err(GrabError::Launch(err.to_string()))
            }
        }
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    type Page = ChromePage;

    fn page(&self) -> &ChromePage {
        &self.page
    }

    /// Page close failures are only logged; the browser close result is returned.
    async fn close(&mut self) -> Result<()> {
        if let Err(err) = self.page.0.clone().close().await {
            tracing::debug!(%err, "page close failed");
        }
        ui::status("Closing browser...");
        let closed = self.browser.close().await.map(|_| ()).map_err(browser_err);
        if let Err(err) = self.browser.wait().await {
            tracing::debug!(%err, "waiting for browser exit failed");
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        closed
    }
}

#[async_trait]
impl PageDriver for ChromePage {
    async fn response_urls(&self) -> Result<BoxStream<'static, String>> {
        let events = self
            .0
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(browser_err)?;
        Ok(events.map(|event| event.response.url.clone()).boxed())
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        match self.0.goto(url).await {
            Ok(_) => Ok(()),
            Err(CdpError::Timeout) => Err(GrabError::NavigationTimeout),
            Err(err) => Err(GrabError::Navigation(err.to_string())),
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<bool> {
        let poll = async {
            loop {
                if self.0.find_element(selector).await.is_ok() {
                    return;
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        };
        Ok(tokio::time::timeout(timeout, poll).await.is_ok())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self.0.find_element(selector).await.map_err(browser_err)?;
        element.click().await.map_err(browser_err)?;
        Ok(())
    }
}
