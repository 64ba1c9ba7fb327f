//! # cbp-plan
//!
//! Build competency-based learning plans from role mappings and course
//! recommendations, and print them to PDF with headless Chromium.
//!
//! ## Why this crate?
//!
//! Upstream records are loosely shaped: course catalogues disagree on key
//! names (`course` vs `name`, `competencies` vs `competencies_v6`) and
//! competency types are free text ("Behavioural", "FUNCTIONAL", "Domain
//! Expertise"). This crate turns them into one canonical, template-ready
//! structure, then renders the finished markup with a real browser so CSS
//! print rules, web fonts and images come out exactly as designed.
//!
//! ## Pipeline Overview
//!
//! ```text
//! records
//!  │
//!  ├─ 1. Classify     competency type text → behavioral / functional / domain
//!  ├─ 2. Normalise    role mapping → Designation, course JSON → CourseCard
//!  ├─ 3. Assemble     selected cards in selection order → PlanDocument
//!  ├─ (template)      PlanDocument → HTML, outside this crate
//!  └─ 4. Render       HTML → A4 PDF via headless Chromium
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cbp_plan::{build_plan, render_pdf, PlanMetadata, RenderConfig, RoleMapping};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let role: RoleMapping = serde_json::from_str(&std::fs::read_to_string("role.json")?)?;
//!     let courses: Vec<serde_json::Value> =
//!         serde_json::from_str(&std::fs::read_to_string("courses.json")?)?;
//!     let selected = vec!["do_113".to_string(), "do_107".to_string()];
//!
//!     let plan = build_plan(&role, &courses, &selected, PlanMetadata::new(uuid::Uuid::new_v4(), role.id))?;
//!     let html = my_templates::render(&plan.to_value()?);
//!
//!     let pdf = render_pdf(&html, &RenderConfig::default()).await?;
//!     std::fs::write("plan.pdf", pdf)?;
//!     Ok(())
//! }
//! # mod my_templates { pub fn render(_: &serde_json::Value) -> String { String::new() } }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `cbp-plan` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! cbp-plan = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod fields;
pub mod model;
pub mod pipeline;
pub mod plan;
pub mod records;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PdfOptions, RenderConfig, RenderConfigBuilder};
pub use error::{PlanError, SessionError};
pub use model::{
    ClassifiedCompetency, CompetencyBucket, CompetencyGroups, CourseCard, Designation,
    PlanDocument, PlanMetadata,
};
pub use pipeline::assemble::{assemble, select_courses};
pub use pipeline::browser::ChromiumLauncher;
pub use pipeline::classify::{classify, classify_competency, classify_list};
pub use pipeline::course::{normalize_course, normalize_courses};
pub use pipeline::designation::normalize_designation;
pub use pipeline::render::{is_pdf, BrowserLauncher, BrowserSession, DocumentRenderer};
pub use plan::{build_plan, course_records, load_json, render_pdf, render_sync, render_to_file};
pub use records::{
    PlanSaveRequest, PlanSaveResponse, PlanUpdateRequest, RawCompetency, RecommendedCourses,
    RoleMapping,
};
