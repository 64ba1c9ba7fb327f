//! Top-level entry points: build a plan from raw records, render markup.
//!
//! Building is synchronous and pure; it fails fast on the first malformed
//! record so no plan is ever assembled around corrupted input. Rendering is
//! async and launches a fresh browser per call.

use crate::config::RenderConfig;
use crate::error::PlanError;
use crate::model::{PlanDocument, PlanMetadata};
use crate::pipeline::assemble::{assemble, select_courses};
use crate::pipeline::course::normalize_courses;
use crate::pipeline::designation::normalize_designation;
use crate::pipeline::render::DocumentRenderer;
use crate::records::{PlanSaveResponse, RoleMapping};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Build the render-ready plan.
///
/// # Arguments
/// * `role`: the role mapping the plan is for
/// * `courses`: raw recommended course records (candidate pool)
/// * `selected`: course identifiers chosen by the user, in display order
/// * `metadata`: plan identity and timestamps
///
/// # Errors
/// [`PlanError::MissingData`] from the first role mapping or course record
/// that lacks its competencies.
pub fn build_plan(
    role: &RoleMapping,
    courses: &[Value],
    selected: &[String],
    metadata: PlanMetadata,
) -> Result<PlanDocument, PlanError> {
    let start = Instant::now();
    info!(
        "Building plan {} for {:?}: {} candidates, {} selected",
        metadata.id,
        role.designation_name,
        courses.len(),
        selected.len()
    );

    let designation = normalize_designation(role)?;
    let cards = normalize_courses(courses)?;
    let document = assemble(designation, &cards, selected, metadata);

    info!(
        "Plan {} built: {} courses in {}µs",
        document.metadata.id,
        document.courses.len(),
        start.elapsed().as_micros()
    );
    Ok(document)
}

impl PlanSaveResponse {
    /// Response for a saved plan: the stored records of the selected
    /// courses, in selection order.
    pub fn from_selection(metadata: &PlanMetadata, courses: &[Value], selected: &[String]) -> Self {
        Self {
            id: metadata.id,
            user_id: metadata.user_id,
            created_at: metadata.created_at,
            updated_at: metadata.updated_at,
            selected_courses: select_courses(courses, selected),
        }
    }
}

/// Render markup to PDF with a locally installed Chromium.
pub async fn render_pdf(markup: &str, config: &RenderConfig) -> Result<Vec<u8>, PlanError> {
    DocumentRenderer::chromium(config.clone()).render(markup).await
}

/// Render markup and write the PDF to `output_path`.
///
/// Uses atomic write (temp file + rename) so a failed render never leaves a
/// truncated PDF behind. Returns the number of bytes written.
pub async fn render_to_file(
    markup: &str,
    output_path: impl AsRef<Path>,
    renderer: &DocumentRenderer,
) -> Result<usize, PlanError> {
    let pdf = renderer.render(markup).await?;
    let path = output_path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| PlanError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, &pdf)
        .await
        .map_err(|e| PlanError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        if let Err(cleanup) = tokio::fs::remove_file(&tmp_path).await {
            warn!("Could not remove {}: {}", tmp_path.display(), cleanup);
        }
        return Err(PlanError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        });
    }

    info!("Wrote {} ({} bytes)", path.display(), pdf.len());
    Ok(pdf.len())
}

/// Synchronous wrapper around [`render_pdf`].
///
/// Creates a temporary tokio runtime internally.
pub fn render_sync(markup: &str, config: &RenderConfig) -> Result<Vec<u8>, PlanError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PlanError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(render_pdf(markup, config))
}

/// Read and deserialise a JSON record file.
pub async fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, PlanError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| PlanError::InvalidInput {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
    serde_json::from_str(&text).map_err(|e| PlanError::InvalidInput {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Course records from either a bare JSON array or a stored
/// recommendation (its `filtered_courses`).
pub fn course_records(value: Value) -> Result<Vec<Value>, PlanError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("filtered_courses") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(PlanError::missing("course recommendations", "filtered_courses")),
        },
        _ => Err(PlanError::missing(
            "course recommendations",
            "expected a list or an object with filtered_courses",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn role() -> RoleMapping {
        RoleMapping {
            designation_name: "Desk Officer".into(),
            competencies: Some(json!([{ "theme": "RTI", "sub_theme": "Replies", "type": "Domain" }])),
            ..Default::default()
        }
    }

    #[test]
    fn build_plan_end_to_end() {
        let courses = vec![
            json!({ "identifier": "a", "course": "A", "competencies": [] }),
            json!({ "identifier": "b", "name": "B", "competencies_v6": [] }),
        ];
        let doc = build_plan(
            &role(),
            &courses,
            &["b".to_string(), "a".to_string()],
            PlanMetadata::new(Uuid::new_v4(), None),
        )
        .unwrap();
        assert_eq!(doc.designation.domain_competencies, vec!["RTI - Replies"]);
        let titles: Vec<_> = doc.courses.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A"]);
    }

    #[test]
    fn build_plan_fails_fast_on_bad_course() {
        let courses = vec![
            json!({ "identifier": "a", "competencies": [] }),
            json!({ "identifier": "b" }),
        ];
        let err = build_plan(
            &role(),
            &courses,
            &["a".to_string()],
            PlanMetadata::new(Uuid::new_v4(), None),
        )
        .unwrap_err();
        assert!(matches!(err, PlanError::MissingData { .. }));
    }

    #[test]
    fn save_response_selection_order() {
        let meta = PlanMetadata::new(Uuid::new_v4(), None);
        let courses = vec![json!({ "identifier": "a" }), json!({ "identifier": "b" })];
        let resp = PlanSaveResponse::from_selection(&meta, &courses, &["b".into(), "a".into()]);
        assert_eq!(resp.id, meta.id);
        assert_eq!(resp.selected_courses[0]["identifier"], json!("b"));
        assert_eq!(resp.selected_courses.len(), 2);
    }

    #[test]
    fn course_records_shapes() {
        assert_eq!(course_records(json!([{ "a": 1 }])).unwrap().len(), 1);
        assert_eq!(
            course_records(json!({ "filtered_courses": [{}, {}] })).unwrap().len(),
            2
        );
        assert!(course_records(json!({ "status": "done" })).is_err());
        assert!(course_records(json!("nope")).is_err());
    }
}
