//! PDF rendering: markup → PDF bytes through a headless browser session.
//!
//! ## Session lifecycle
//!
//! Every call to [`DocumentRenderer::render`] acquires its own session from a
//! [`BrowserLauncher`], drives it through open → load → export, and then
//! releases it. Release happens on every exit path, timeouts included, and
//! happens once: [`BrowserSession::close`] consumes the boxed session. A
//! failed release is logged and otherwise ignored so it never replaces the
//! outcome of the render itself.
//!
//! ## Error boundary
//!
//! Stages report [`SessionError`] with full browser detail. That detail is
//! logged here and the caller receives only [`PlanError::Render`].

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::config::{PdfOptions, RenderConfig};
use crate::error::{PlanError, SessionError};
use crate::pipeline::browser::ChromiumLauncher;

/// Starts independent browser sessions. One session per render.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, SessionError>;
}

/// One live browser process (or an isolated context within one).
#[async_trait]
pub trait BrowserSession: Send {
    /// Create the page that will hold the markup.
    async fn open_page(&mut self) -> Result<(), SessionError>;

    /// Load `markup` into the page and return once the network is idle, so
    /// every referenced stylesheet, font and image has resolved.
    async fn load(&mut self, markup: &str) -> Result<(), SessionError>;

    /// Print the loaded page to PDF.
    async fn export_pdf(&mut self, options: &PdfOptions) -> Result<Vec<u8>, SessionError>;

    /// Release the session.
    async fn close(self: Box<Self>) -> Result<(), SessionError>;
}

/// Converts markup into PDF bytes.
///
/// Cheap to clone; clones share the launcher, never a browser.
#[derive(Clone)]
pub struct DocumentRenderer {
    launcher: Arc<dyn BrowserLauncher>,
    config: RenderConfig,
}

impl std::fmt::Debug for DocumentRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentRenderer")
            .field("launcher", &"<dyn BrowserLauncher>")
            .field("config", &self.config)
            .finish()
    }
}

impl DocumentRenderer {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, config: RenderConfig) -> Self {
        Self { launcher, config }
    }

    /// Renderer backed by a locally installed Chromium.
    pub fn chromium(config: RenderConfig) -> Self {
        let launcher = Arc::new(ChromiumLauncher::new(config.clone()));
        Self::new(launcher, config)
    }

    /// Render `markup` to an A4 PDF.
    ///
    /// # Errors
    /// [`PlanError::Render`] for any failure in launch, page creation, load,
    /// or export (including timeouts). The cause is logged, not returned.
    pub async fn render(&self, markup: &str) -> Result<Vec<u8>, PlanError> {
        let start = Instant::now();
        debug!("Rendering {} bytes of markup", markup.len());

        let launched = timed(
            "launch",
            self.config.launch_timeout(),
            self.launcher.launch(),
        )
        .await;
        let mut session = match launched {
            Ok(session) => session,
            Err(e) => {
                error!("Error in PDF generation: {}", e);
                return Err(PlanError::Render);
            }
        };

        let outcome = self.drive(session.as_mut(), markup).await;

        info!("Closing browser session");
        match timed("close", self.config.launch_timeout(), session.close()).await {
            Ok(()) => {}
            Err(e) => warn!("Error closing browser session: {}", e),
        }

        match outcome {
            Ok(pdf) => {
                info!(
                    "Rendered PDF: {} bytes in {}ms",
                    pdf.len(),
                    start.elapsed().as_millis()
                );
                Ok(pdf)
            }
            Err(e) => {
                error!("Error in PDF generation: {}", e);
                Err(PlanError::Render)
            }
        }
    }

    async fn drive(
        &self,
        session: &mut dyn BrowserSession,
        markup: &str,
    ) -> Result<Vec<u8>, SessionError> {
        timed("open_page", self.config.load_timeout(), session.open_page()).await?;
        timed("load", self.config.load_timeout(), session.load(markup)).await?;
        let pdf = timed(
            "export",
            self.config.export_timeout(),
            session.export_pdf(&PdfOptions::a4_print()),
        )
        .await?;

        if !is_pdf(&pdf) {
            return Err(SessionError::page(
                "export",
                format!("output is not a PDF ({} bytes)", pdf.len()),
            ));
        }
        Ok(pdf)
    }
}

/// True when `bytes` starts with the `%PDF` file signature.
pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF")
}

/// Run one stage under a time limit; an expired limit is a stage failure.
async fn timed<T, F>(stage: &'static str, limit: Duration, fut: F) -> Result<T, SessionError>
where
    F: Future<Output = Result<T, SessionError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| SessionError::Timeout {
            stage,
            secs: limit.as_secs(),
        })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PDF: &[u8] = b"%PDF-1.7\n%fake\n";

    #[derive(Clone, Copy, PartialEq)]
    enum Stall {
        None,
        Load,
    }

    struct Fake {
        closes: Arc<AtomicUsize>,
        output: &'static [u8],
        stall: Stall,
    }

    #[async_trait]
    impl BrowserLauncher for Fake {
        async fn launch(&self) -> Result<Box<dyn BrowserSession>, SessionError> {
            Ok(Box::new(FakeSession {
                closes: Arc::clone(&self.closes),
                output: self.output,
                stall: self.stall,
            }))
        }
    }

    struct FakeSession {
        closes: Arc<AtomicUsize>,
        output: &'static [u8],
        stall: Stall,
    }

    #[async_trait]
    impl BrowserSession for FakeSession {
        async fn open_page(&mut self) -> Result<(), SessionError> {
            Ok(())
        }

        async fn load(&mut self, _markup: &str) -> Result<(), SessionError> {
            if self.stall == Stall::Load {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            Ok(())
        }

        async fn export_pdf(&mut self, options: &PdfOptions) -> Result<Vec<u8>, SessionError> {
            assert_eq!(*options, PdfOptions::a4_print());
            Ok(self.output.to_vec())
        }

        async fn close(self: Box<Self>) -> Result<(), SessionError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn renderer(output: &'static [u8], stall: Stall) -> (DocumentRenderer, Arc<AtomicUsize>) {
        let closes = Arc::new(AtomicUsize::new(0));
        let launcher = Fake {
            closes: Arc::clone(&closes),
            output,
            stall,
        };
        let config = RenderConfig::builder().load_timeout_secs(1).build().unwrap();
        (DocumentRenderer::new(Arc::new(launcher), config), closes)
    }

    #[test]
    fn success_returns_pdf_and_closes() {
        let (r, closes) = renderer(PDF, Stall::None);
        let pdf = tokio_test::block_on(r.render("<h1>Plan</h1>")).unwrap();
        assert!(is_pdf(&pdf));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn non_pdf_output_is_render_error() {
        let (r, closes) = renderer(b"", Stall::None);
        let err = tokio_test::block_on(r.render("<p/>")).unwrap_err();
        assert!(matches!(err, PlanError::Render));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn load_timeout_still_closes() {
        let (r, closes) = renderer(PDF, Stall::Load);
        let err = r.render("<img src='https://slow.example/x.png'>").await.unwrap_err();
        assert!(matches!(err, PlanError::Render));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn signature_check() {
        assert!(is_pdf(b"%PDF-1.4"));
        assert!(!is_pdf(b"<html>"));
        assert!(!is_pdf(b""));
    }
}
