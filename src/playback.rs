use crate::browser::PageDriver;
use crate::config::PlaybackOptions;
use crate::error::{GrabError, Result};
use crate::ui;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Clicked the element matched by this selector.
    Clicked(String),
    NotFound,
    Failed(String),
}

/// Loads the page. Only a timeout is survivable.
pub async fn navigate<P: PageDriver + ?Sized>(page: &P, url: &str) -> Result<()> {
    ui::status(format!("Navigating to: {}", url));
    match page.navigate(url).await {
        Ok(()) => Ok(()),
        Err(GrabError::NavigationTimeout) => {
            ui::warning("Warning: Page navigation timed out. Continuing, but page might not be fully loaded.");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Best effort: find something that looks like a play control and click it. Never fails.
pub async fn trigger<P: PageDriver + ?Sized>(page: &P, options: &PlaybackOptions) -> PlaybackOutcome {
    ui::status("Page loaded. Looking for video player and attempting to play...");
    let outcome = match click_first_match(page, options).await {
        Ok(Some(selector)) => PlaybackOutcome::Clicked(selector),
        Ok(None) => PlaybackOutcome::NotFound,
        Err(err) => PlaybackOutcome::Failed(err.to_string()),
    };
    match &outcome {
        PlaybackOutcome::Clicked(_) => {}
        PlaybackOutcome::NotFound => {
            ui::warning("Warning: Could not find a recognizable play button/video element to click automatically.");
            ui::warning("Playback might need to be started manually if the manifest isn't found.");
        }
        PlaybackOutcome::Failed(reason) => {
            ui::warning(format!("Warning: Error trying to find or click play button: {}", reason));
        }
    }
    outcome
}

/// Clicks the first selector that appears; `None` when none did.
async fn click_first_match<P: PageDriver + ?Sized>(page: &P, options: &PlaybackOptions) -> Result<Option<String>> {
    let mut found = None;
    for selector in &options.selectors {
        if page.wait_for_selector(selector, options.selector_timeout).await? {
            ui::status(format!("Found player/button with selector: {}", selector));
            found = Some(selector.clone());
            break;
        }
        ui::status(format!("Selector '{}' not found or timed out.", selector));
    }
    let Some(selector) = found else {
        return Ok(None);
    };

    tokio::time::sleep(options.pre_click_delay).await;
    ui::status("Clicking play element...");
    page.click(&selector).await?;
    tokio::time::sleep(options.post_click_delay).await;
    Ok(Some(selector))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::stream::{self, BoxStream, StreamExt};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[derive(Default)]
    struct ScriptedPage {
        present: Vec<&'static str>,
        navigate_error: Option<fn() -> GrabError>,
        fail_click: bool,
        checked: Mutex<Vec<String>>,
        clicked: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PageDriver for ScriptedPage {
        async fn response_urls(&self) -> Result<BoxStream<'static, String>> {
            Ok(stream::empty().boxed())
        }

        async fn navigate(&self, _url: &str) -> Result<()> {
            match self.navigate_error {
                Some(make) => Err(make()),
                None => Ok(()),
            }
        }

        async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<bool> {
            self.checked.lock().push(selector.to_string());
            Ok(self.present.iter().any(|s| *s == selector))
        }

        async fn click(&self, selector: &str) -> Result<()> {
            if self.fail_click {
                return Err(GrabError::Browser("element is not clickable".to_string()));
            }
            self.clicked.lock().push(selector.to_string());
            Ok(())
        }
    }

    fn quick() -> PlaybackOptions {
        PlaybackOptions {
            selector_timeout: Duration::from_millis(1),
            pre_click_delay: Duration::ZERO,
            post_click_delay: Duration::ZERO,
            ..PlaybackOptions::default()
        }
    }

    #[tokio::test]
    async fn stops_at_first_present_selector() {
        let page = ScriptedPage {
            present: vec!["button[aria-label='Play']", ".playbutton_playpause"],
            ..ScriptedPage::default()
        };
        let outcome = trigger(&page, &quick()).await;
        assert_eq!(outcome, PlaybackOutcome::Clicked("button[aria-label='Play']".to_string()));
        assert_eq!(
            *page.checked.lock(),
            vec!["video", "[data-testid='media-play-button']", "button[aria-label='Play']"]
        );
        assert_eq!(*page.clicked.lock(), vec!["button[aria-label='Play']"]);
    }

    #[tokio::test]
    async fn nothing_found_is_not_an_error() {
        let page = ScriptedPage::default();
        assert_eq!(trigger(&page, &quick()).await, PlaybackOutcome::NotFound);
        assert_eq!(page.checked.lock().len(), quick().selectors.len());
    }

    #[tokio::test]
    async fn click_failure_is_downgraded() {
        let page = ScriptedPage {
            present: vec!["video"],
            fail_click: true,
            ..ScriptedPage::default()
        };
        assert!(matches!(trigger(&page, &quick()).await, PlaybackOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn navigation_timeout_is_tolerated_but_other_errors_abort() {
        let slow = ScriptedPage {
            navigate_error: Some(|| GrabError::NavigationTimeout),
            ..ScriptedPage::default()
        };
        assert!(navigate(&slow, "https://example.com").await.is_ok());

        let broken = ScriptedPage {
            navigate_error: Some(|| GrabError::Navigation("net::ERR_NAME_NOT_RESOLVED".to_string())),
            ..ScriptedPage::default()
        };
        assert!(matches!(
            navigate(&broken, "https://example.invalid").await,
            Err(GrabError::Navigation(_))
        ));
    }
}
