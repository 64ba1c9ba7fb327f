//! Chromium sessions over the DevTools protocol (chromiumoxide).
//!
//! ## Why a data: URL?
//!
//! `Page.setDocumentContent` replaces the DOM without a navigation, so the
//! page never reports lifecycle events and there is nothing to wait on.
//! Navigating to a base64 `data:` URL keeps the markup in memory (no temp
//! file) and produces the normal `init` → `load` → `networkIdle` sequence.
//! Assets referenced by the markup must use absolute URLs.
//!
//! ## Why a handler task?
//!
//! chromiumoxide splits the connection into a `Browser` (commands) and a
//! `Handler` (the websocket event loop). Nothing progresses unless the handler
//! is polled, so each session owns a tokio task that drains it and aborts it
//! on close.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{EventLifecycleEvent, PrintToPdfParams};
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::{PdfOptions, RenderConfig};
use crate::error::SessionError;
use crate::pipeline::render::{BrowserLauncher, BrowserSession};

/// Launches one headless Chromium process per session.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    config: RenderConfig,
}

impl ChromiumLauncher {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Configured executable, else whatever `chrome-locate` finds. `None`
    /// leaves detection to chromiumoxide.
    fn executable(&self) -> Option<PathBuf> {
        self.config.chrome_executable.clone().or_else(|| {
            chrome_locate::find_chrome()
                .map_err(|e| debug!("chrome-locate: {}", e))
                .ok()
        })
    }

    fn browser_config(&self) -> Result<BrowserConfig, SessionError> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(self.config.load_timeout().max(self.config.export_timeout()));
        if self.config.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = self.executable() {
            debug!("Using browser executable {}", path.display());
            builder = builder.chrome_executable(path);
        }
        for arg in &self.config.extra_args {
            builder = builder.arg(arg.as_str());
        }
        builder.build().map_err(SessionError::Launch)
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, SessionError> {
        let config = self.browser_config()?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| SessionError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler: {}", e);
                }
            }
        });

        info!("Launched headless browser");
        Ok(Box::new(ChromiumSession {
            browser,
            handler_task,
            page: None,
        }))
    }
}

struct ChromiumSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: Option<Page>,
}

impl ChromiumSession {
    fn page(&self) -> Result<&Page, SessionError> {
        self.page
            .as_ref()
            .ok_or_else(|| SessionError::page("page", "no page open"))
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn open_page(&mut self) -> Result<(), SessionError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| SessionError::page("new_page", e))?;
        self.page = Some(page);
        Ok(())
    }

    async fn load(&mut self, markup: &str) -> Result<(), SessionError> {
        let page = self.page()?;
        // chromiumoxide enables lifecycle events when it attaches the target.
        let mut lifecycle = page
            .event_listener::<EventLifecycleEvent>()
            .await
            .map_err(|e| SessionError::page("load", e))?;

        page.goto(data_url(markup))
            .await
            .map_err(|e| SessionError::page("load", e))?;

        let mut watch = IdleWatch::default();
        while let Some(event) = lifecycle.next().await {
            if watch.observe(&event.name, event.loader_id.inner()) {
                debug!("Network idle");
                return Ok(());
            }
        }
        Err(SessionError::page(
            "load",
            "page closed before the network went idle",
        ))
    }

    async fn export_pdf(&mut self, options: &PdfOptions) -> Result<Vec<u8>, SessionError> {
        let page = self.page()?;
        page.pdf(print_params(options))
            .await
            .map_err(|e| SessionError::page("export", e))
    }

    async fn close(self: Box<Self>) -> Result<(), SessionError> {
        let mut this = self;
        if let Some(page) = this.page.take() {
            if let Err(e) = page.close().await {
                debug!("Page close: {}", e);
            }
        }
        let closed = this
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| SessionError::Close(e.to_string()));
        if let Err(e) = this.browser.wait().await {
            debug!("Browser wait: {}", e);
        }
        this.handler_task.abort();
        closed
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

fn data_url(markup: &str) -> String {
    format!("data:text/html;charset=utf-8;base64,{}", STANDARD.encode(markup))
}

fn print_params(options: &PdfOptions) -> PrintToPdfParams {
    PrintToPdfParams {
        print_background: Some(options.print_background),
        paper_width: Some(options.paper_width_in),
        paper_height: Some(options.paper_height_in),
        margin_top: Some(options.margin_in),
        margin_bottom: Some(options.margin_in),
        margin_left: Some(options.margin_in),
        margin_right: Some(options.margin_in),
        prefer_css_page_size: Some(false),
        ..Default::default()
    }
}

/// Tracks page lifecycle events until the navigation under way goes idle.
///
/// `networkIdle` only counts for the loader whose `init` was seen after the
/// listener was attached. The initial about:blank document has its own
/// loader and can still report `networkIdle` while the data: URL loads.
#[derive(Debug, Default)]
struct IdleWatch {
    loader: Option<String>,
}

impl IdleWatch {
    /// Feed one lifecycle event; `true` once the watched loader is idle.
    fn observe(&mut self, name: &str, loader_id: &str) -> bool {
        match name {
            "init" => {
                self.loader = Some(loader_id.to_string());
                false
            }
            "networkIdle" => self.loader.as_deref() == Some(loader_id),
            _ => false,
        }
    }
}
