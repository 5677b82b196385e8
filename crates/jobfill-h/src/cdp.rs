//! Chromium process and tab lifecycle.

use chromiumoxide::cdp::browser_protocol::page::{
    EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::cdp::js_protocol::runtime::EventConsoleApiCalled;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use jobfill_engine::page::PageError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// Prefix the bridge puts on its own console messages.
const BRIDGE_LOG_PREFIX: &str = "jobfill:";

/// How to start the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Show a window. The trigger button needs one to be clicked.
    pub visible: bool,
    /// `CHROME_BIN`; chromiumoxide searches the usual locations otherwise.
    pub chrome_bin: Option<PathBuf>,
    /// `JOBFILL_USER_DATA_DIR`; keeps logins to the job boards between runs.
    pub profile_dir: Option<PathBuf>,
}

impl LaunchOptions {
    pub fn from_env(visible: bool) -> Self {
        Self::from_lookup(visible, |key| std::env::var_os(key))
    }

    fn from_lookup(visible: bool, lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let path = |key: &str| lookup(key).filter(|v| !v.is_empty()).map(PathBuf::from);
        Self {
            visible,
            chrome_bin: path("CHROME_BIN"),
            profile_dir: path("JOBFILL_USER_DATA_DIR"),
        }
    }
}

/// Chromium profile directory. A temporary one is removed on close.
enum Profile {
    Persistent(PathBuf),
    Temporary(TempDir),
}

impl Profile {
    fn prepare(dir: Option<&Path>) -> std::io::Result<Self> {
        match dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                Ok(Profile::Persistent(dir.to_path_buf()))
            }
            None => Ok(Profile::Temporary(
                tempfile::Builder::new()
                    .prefix("jobfill-chromium-profile-")
                    .tempdir()?,
            )),
        }
    }

    fn path(&self) -> &Path {
        match self {
            Profile::Persistent(dir) => dir,
            Profile::Temporary(dir) => dir.path(),
        }
    }

    fn release(self) {
        if let Profile::Temporary(dir) = self {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                tracing::debug!("Failed to remove profile {}: {}", path.display(), e);
            }
        }
    }
}

fn browser_error(context: &str, e: impl std::fmt::Display) -> PageError {
    PageError::Other(format!("{}: {}", context, e))
}

pub struct CdpClient {
    pub browser: Browser,
    pub handler_task: JoinHandle<()>,
    pub page: Page,
    profile: Profile,
}

impl CdpClient {
    pub async fn launch(options: &LaunchOptions) -> Result<Self, PageError> {
        let profile = Profile::prepare(options.profile_dir.as_deref())
            .map_err(|e| browser_error("Failed to prepare browser profile", e))?;
        tracing::info!(
            "Launching {} browser with profile {}",
            if options.visible { "visible" } else { "headless" },
            profile.path().display()
        );

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .user_data_dir(profile.path());
        if options.visible {
            builder = builder.with_head();
        }
        if let Some(bin) = &options.chrome_bin {
            builder = builder.chrome_executable(bin);
        }
        let config = builder
            .build()
            .map_err(|e| browser_error("Failed to build browser config", e))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| browser_error("Failed to launch browser", e))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler error: {}", e);
                }
            }
            tracing::info!("Browser handler task ended");
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| browser_error("Failed to open tab", e))?;

        forward_console(&page).await?;
        accept_dialogs(&page).await?;

        Ok(Self {
            browser,
            handler_task,
            page,
            profile,
        })
    }

    pub async fn close(mut self) -> Result<(), PageError> {
        self.browser
            .close()
            .await
            .map_err(|e| browser_error("Error closing browser", e))?;
        self.handler_task
            .await
            .map_err(|e| browser_error("Error awaiting browser handler", e))?;
        self.profile.release();
        Ok(())
    }
}

/// Bridge warnings surface at `warn`, everything else the page logs at `debug`.
async fn forward_console(page: &Page) -> Result<(), PageError> {
    let mut events = page
        .event_listener::<EventConsoleApiCalled>()
        .await
        .map_err(|e| browser_error("Failed to subscribe to console events", e))?;

    tokio::spawn(async move {
        while let Some(event) = events.next().await {
            let text = event
                .args
                .iter()
                .filter_map(|arg| {
                    arg.value
                        .as_ref()
                        .and_then(|v| v.as_str().map(String::from))
                        .or_else(|| arg.description.clone())
                })
                .collect::<Vec<_>>()
                .join(" ");
            match text.strip_prefix(BRIDGE_LOG_PREFIX) {
                Some(message) => tracing::warn!("{}", message.trim_start()),
                None => tracing::debug!("Page console [{:?}]: {}", event.r#type, text),
            }
        }
    });
    Ok(())
}

/// Application forms like to confirm() before leaving; never block on them.
async fn accept_dialogs(page: &Page) -> Result<(), PageError> {
    let mut events = page
        .event_listener::<EventJavascriptDialogOpening>()
        .await
        .map_err(|e| browser_error("Failed to subscribe to dialog events", e))?;

    let tab = page.clone();
    tokio::spawn(async move {
        while let Some(event) = events.next().await {
            tracing::info!("Accepting {:?} dialog: {}", event.r#type, event.message);
            if let Err(e) = tab.execute(HandleJavaScriptDialogParams::new(true)).await {
                tracing::error!("Failed to accept dialog: {}", e);
            }
        }
    });
    Ok(())
}
