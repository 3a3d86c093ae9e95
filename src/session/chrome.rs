//! Headless Chrome session over CDP.
//!
//! [`ChromeSession::launch`] starts a browser process with `chromiumoxide`,
//! spawns the CDP event handler on the tokio runtime and opens one blank
//! page that every navigation reuses.
//!
//! # Lifecycle
//!
//! The handler task must not outlive the browser. [`PageFetcher::close`]
//! asks the browser to quit and gives the process [`SHUTDOWN_GRACE`] to exit.
//! If the request fails or the grace period runs out, the process is killed.
//! The handler is aborted afterwards. If a session is dropped without being
//! closed, `Drop` aborts the handler and `chromiumoxide` kills the child
//! process.

use crate::error::ScrapeError;
use crate::session::PageFetcher;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info, instrument, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// How long a closed browser gets to exit before it is killed.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// How to start the browser.
#[derive(Debug, Clone)]
pub struct ChromeOptions {
    /// Browser executable; `chromiumoxide` searches the usual locations when `None`.
    pub executable: Option<PathBuf>,
    /// Show a window instead of running headless.
    pub headful: bool,
    /// Upper bound for each CDP request, navigation included.
    pub request_timeout: Duration,
}

impl Default for ChromeOptions {
    fn default() -> Self {
        Self {
            executable: None,
            headful: false,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// A live browser with a single page.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    closed: bool,
}

impl ChromeSession {
    /// Launch the browser and open a blank page.
    ///
    /// # Errors
    ///
    /// Every failure here is [`ScrapeError::Launch`]: without a session the
    /// run cannot proceed.
    #[instrument(level = "info")]
    pub async fn launch(options: &ChromeOptions) -> Result<Self, ScrapeError> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(options.request_timeout)
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions");
        if let Some(path) = &options.executable {
            builder = builder.chrome_executable(path);
        }
        if options.headful {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|e| ScrapeError::Launch(format!("invalid browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "CDP handler event error");
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(ScrapeError::Launch(format!("failed to open page: {e}")));
            }
        };

        info!("Browser session ready");
        Ok(Self {
            browser,
            page,
            handler,
            closed: false,
        })
    }
}

impl PageFetcher for ChromeSession {
    type Element = Element;

    #[instrument(level = "info", skip(self))]
    async fn visit(&mut self, url: &str) -> Result<(), ScrapeError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ScrapeError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        // Already-settled pages report an error here; the goto result is what counts.
        let _ = self.page.wait_for_navigation().await;
        Ok(())
    }

    async fn current_markup(&mut self) -> Result<String, ScrapeError> {
        Ok(self.page.content().await?)
    }

    #[instrument(level = "debug", skip(self))]
    async fn wait_for_selector(&mut self, css: &str, timeout: Duration) -> bool {
        let page = &self.page;
        let found = poll_until(timeout, || async move { page.find_element(css).await.is_ok() }).await;
        if !found {
            debug!("Element did not appear before timeout");
        }
        found
    }

    async fn find_by_tag(&mut self, tag: &str) -> Result<Vec<Element>, ScrapeError> {
        match self.page.find_elements(tag).await {
            Ok(elements) => Ok(elements),
            // CDP reports "no node found" as an error; the caller wants an empty list.
            Err(e) => {
                debug!(tag, error = %e, "No elements found");
                Ok(Vec::new())
            }
        }
    }

    async fn click(&mut self, element: &Element) -> Result<(), ScrapeError> {
        element.click().await?;
        Ok(())
    }

    async fn go_back(&mut self) -> Result<(), ScrapeError> {
        self.page.evaluate("history.back()").await?;
        let _ = self.page.wait_for_navigation().await;
        Ok(())
    }

    #[instrument(level = "info", skip(self))]
    async fn close(mut self) -> Result<(), ScrapeError> {
        self.closed = true;
        let result = shutdown(&mut self.browser, SHUTDOWN_GRACE).await;
        self.handler.abort();
        result?;
        info!("Browser session closed");
        Ok(())
    }
}

/// Run `probe` every [`POLL_INTERVAL`] until it reports `true` or `limit`
/// elapses. A probe still in flight at the deadline is abandoned.
async fn poll_until<F, Fut>(limit: Duration, mut probe: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + limit;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if let Ok(true) = timeout(remaining, probe()).await {
            return true;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return false;
        }
        sleep(POLL_INTERVAL.min(remaining)).await;
    }
}

/// The steps needed to stop a browser child process.
trait BrowserProcess {
    /// Ask the browser to quit over CDP.
    async fn request_close(&mut self) -> Result<(), ScrapeError>;
    /// Wait for the child process to exit.
    async fn wait_exit(&mut self) -> Result<(), ScrapeError>;
    async fn force_kill(&mut self);
}

impl BrowserProcess for Browser {
    async fn request_close(&mut self) -> Result<(), ScrapeError> {
        self.close().await?;
        Ok(())
    }

    async fn wait_exit(&mut self) -> Result<(), ScrapeError> {
        self.wait().await?;
        Ok(())
    }

    async fn force_kill(&mut self) {
        if let Some(Err(e)) = self.kill().await {
            warn!(error = %e, "Failed to kill browser process");
        }
    }
}

/// Stop the browser without ever blocking on a process that was not told
/// to quit.
///
/// A failed close request kills the process before waiting on it; a process
/// that outlives `grace` after a successful request is killed too. The
/// close request's own error is returned.
async fn shutdown<B: BrowserProcess>(browser: &mut B, grace: Duration) -> Result<(), ScrapeError> {
    let closed = browser.request_close().await;
    if let Err(e) = &closed {
        warn!(error = %e, "Browser did not accept close; killing process");
        browser.force_kill().await;
    }
    match timeout(grace, browser.wait_exit()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "Browser process did not exit cleanly"),
        Err(_) => {
            warn!(grace_ms = grace.as_millis() as u64, "Browser process still running; killing");
            browser.force_kill().await;
        }
    }
    closed
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.handler.abort();
        if !self.closed {
            warn!("ChromeSession dropped without close(); browser process will be killed");
        }
    }
}
