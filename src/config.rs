//! Configuration types for PDF rendering.
//!
//! Browser and timeout knobs live in [`RenderConfig`], built via its
//! [`RenderConfigBuilder`]. Page geometry does not: [`PdfOptions`] is fixed so
//! every plan prints the same way regardless of who launched the renderer.

use crate::error::PlanError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the headless-browser renderer.
///
/// Built via [`RenderConfig::builder()`] or using [`RenderConfig::default()`].
///
/// # Example
/// ```rust
/// use cbp_plan::RenderConfig;
///
/// let config = RenderConfig::builder()
///     .load_timeout_secs(45)
///     .no_sandbox(false)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Browser executable. If None, `chrome_locate::find_chrome()` is tried,
    /// then chromiumoxide's own detection.
    pub chrome_executable: Option<PathBuf>,

    /// Pass `--no-sandbox`. Default: true.
    ///
    /// Containers commonly run as root without user namespaces, where
    /// Chromium refuses to start sandboxed.
    pub no_sandbox: bool,

    /// Extra command-line flags for the browser.
    pub extra_args: Vec<String>,

    /// Upper bound on browser start-up in seconds. Default: 30.
    pub launch_timeout_secs: u64,

    /// Upper bound on loading the markup until the network is idle. Default: 30.
    ///
    /// Stylesheets, fonts and images referenced by the markup must all have
    /// arrived before export, so this also bounds slow asset servers.
    pub load_timeout_secs: u64,

    /// Upper bound on the PDF export in seconds. Default: 30.
    pub export_timeout_secs: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            chrome_executable: None,
            no_sandbox: true,
            extra_args: Vec::new(),
            launch_timeout_secs: 30,
            load_timeout_secs: 30,
            export_timeout_secs: 30,
        }
    }
}

impl RenderConfig {
    /// Create a new builder for `RenderConfig`.
    pub fn builder() -> RenderConfigBuilder {
        RenderConfigBuilder {
            config: Self::default(),
        }
    }

    pub fn launch_timeout(&self) -> Duration {
        Duration::from_secs(self.launch_timeout_secs)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }

    pub fn export_timeout(&self) -> Duration {
        Duration::from_secs(self.export_timeout_secs)
    }
}

/// Builder for [`RenderConfig`].
#[derive(Debug)]
pub struct RenderConfigBuilder {
    config: RenderConfig,
}

impl RenderConfigBuilder {
    pub fn chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.chrome_executable = Some(path.into());
        self
    }

    pub fn no_sandbox(mut self, v: bool) -> Self {
        self.config.no_sandbox = v;
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.config.extra_args.push(arg.into());
        self
    }

    pub fn launch_timeout_secs(mut self, secs: u64) -> Self {
        self.config.launch_timeout_secs = secs;
        self
    }

    pub fn load_timeout_secs(mut self, secs: u64) -> Self {
        self.config.load_timeout_secs = secs;
        self
    }

    pub fn export_timeout_secs(mut self, secs: u64) -> Self {
        self.config.export_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RenderConfig, PlanError> {
        let c = &self.config;
        for (name, secs) in [
            ("launch", c.launch_timeout_secs),
            ("load", c.load_timeout_secs),
            ("export", c.export_timeout_secs),
        ] {
            if secs == 0 {
                return Err(PlanError::InvalidConfig(format!(
                    "{name} timeout must be ≥ 1s"
                )));
            }
        }
        if let Some(ref path) = c.chrome_executable {
            if path.as_os_str().is_empty() {
                return Err(PlanError::InvalidConfig(
                    "chrome executable path is empty".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

// ── Export geometry ──────────────────────────────────────────────────────

/// CSS pixels per inch, as used by the print pipeline.
const PX_PER_INCH: f64 = 96.0;

/// PDF export parameters. Only [`PdfOptions::a4_print`] is used for plans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfOptions {
    pub paper_width_in: f64,
    pub paper_height_in: f64,
    pub margin_in: f64,
    pub print_background: bool,
}

impl PdfOptions {
    /// A4, backgrounds printed, 20px margin on every side.
    pub const fn a4_print() -> Self {
        Self {
            paper_width_in: 8.27,
            paper_height_in: 11.69,
            margin_in: 20.0 / PX_PER_INCH,
            print_background: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build() {
        let c = RenderConfig::builder().build().unwrap();
        assert_eq!(c, RenderConfig::default());
        assert!(c.no_sandbox);
        assert_eq!(c.load_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = RenderConfig::builder().export_timeout_secs(0).build().unwrap_err();
        assert!(err.to_string().contains("export"), "got: {err}");
    }

    #[test]
    fn empty_executable_rejected() {
        assert!(RenderConfig::builder().chrome_executable("").build().is_err());
    }

    #[test]
    fn extra_args_accumulate() {
        let c = RenderConfig::builder()
            .arg("--disable-gpu")
            .arg("--font-render-hinting=none")
            .build()
            .unwrap();
        assert_eq!(c.extra_args.len(), 2);
    }

    #[test]
    fn a4_geometry() {
        let o = PdfOptions::a4_print();
        assert!(o.print_background);
        assert!((o.margin_in - 0.208_333).abs() < 1e-5);
        assert!(o.paper_height_in > o.paper_width_in);
    }
}
