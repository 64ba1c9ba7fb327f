//! Error types for the cbp-plan library.
//!
//! Two distinct error types reflect two distinct audiences:
//!
//! * [`PlanError`]: **Public**: everything a caller of this crate can see.
//!   Normalisation problems carry enough detail to point at the bad upstream
//!   record; rendering problems collapse into the single opaque
//!   [`PlanError::Render`] so callers never depend on browser internals.
//!
//! * [`SessionError`]: **Internal to rendering**: what actually went wrong
//!   inside the headless browser (launch, page, timeout, close). Launcher
//!   implementations return it; [`crate::pipeline::render::DocumentRenderer`]
//!   logs it in full and converts it before it reaches the caller.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the cbp-plan library.
#[derive(Debug, Error)]
pub enum PlanError {
    // ── Upstream data errors ──────────────────────────────────────────────
    /// A required structural field is absent (or not the expected shape)
    /// in a raw record. Indicates an upstream contract violation.
    #[error("Missing data in {record}: {field}")]
    MissingData { record: String, field: String },

    // ── Rendering errors ──────────────────────────────────────────────────
    /// The headless browser failed to produce a PDF. Detail is logged at the
    /// render boundary, never carried here.
    #[error("internal rendering failure")]
    Render,

    // ── Input / output errors ─────────────────────────────────────────────
    /// An input file could not be read or parsed.
    #[error("Invalid input '{path}': {detail}")]
    InvalidInput { path: PathBuf, detail: String },

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlanError {
    /// Shorthand for [`PlanError::MissingData`].
    pub fn missing(record: impl Into<String>, field: impl Into<String>) -> Self {
        PlanError::MissingData {
            record: record.into(),
            field: field.into(),
        }
    }

    /// HTTP-style status an API layer should report for this error.
    ///
    /// Bad upstream data is the client-facing 422; everything produced by
    /// rendering or the local environment is a generic 500.
    pub fn status_code(&self) -> u16 {
        match self {
            PlanError::MissingData { .. } => 422,
            PlanError::InvalidInput { .. } => 400,
            PlanError::Render
            | PlanError::OutputWriteFailed { .. }
            | PlanError::InvalidConfig(_)
            | PlanError::Internal(_) => 500,
        }
    }
}

/// A failure inside one headless-browser session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The browser process could not be started.
    #[error("browser launch failed: {0}")]
    Launch(String),

    /// Page creation, navigation, or export failed.
    #[error("page operation '{stage}' failed: {detail}")]
    Page { stage: &'static str, detail: String },

    /// A stage did not finish within its time budget.
    #[error("'{stage}' timed out after {secs}s")]
    Timeout { stage: &'static str, secs: u64 },

    /// Shutting the browser down failed.
    #[error("browser close failed: {0}")]
    Close(String),
}

impl SessionError {
    pub fn page(stage: &'static str, detail: impl std::fmt::Display) -> Self {
        SessionError::Page {
            stage,
            detail: detail.to_string(),
        }
    }
}
