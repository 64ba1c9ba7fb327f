//! Raw records as supplied by the persistence layer, plus the plan
//! save/update request and response shapes.
//!
//! Role mappings arrive with a fixed schema, so they get a typed struct.
//! Course recommendations do not: `filtered_courses` holds whatever the
//! upstream search returned, so courses stay as `serde_json::Value` until
//! [`crate::pipeline::course`] resolves them field by field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::fields;

/// One competency entry as found in either role mappings or course records.
///
/// Role mappings use `theme` / `sub_theme` / `type`; course records use
/// `competencyThemeName` / `competencySubThemeName` / `competencyAreaName`.
/// Items may carry both; each field resolves through the candidate lists in
/// [`crate::fields`], short names first. Missing or `null` text becomes an
/// empty string, which the classifier treats as unclassified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawCompetency {
    pub theme: String,

    pub sub_theme: String,

    /// Free-text type (role mappings) or competency area (courses).
    #[serde(rename = "type")]
    pub kind: String,
}

impl<'de> Deserialize<'de> for RawCompetency {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let item = Map::<String, Value>::deserialize(deserializer)?;
        let text = |candidates: &[&str]| fields::first_text(&item, candidates).unwrap_or_default();
        Ok(Self {
            theme: text(fields::COMPETENCY_THEME),
            sub_theme: text(fields::COMPETENCY_SUB_THEME),
            kind: text(fields::COMPETENCY_TYPE),
        })
    }
}

impl RawCompetency {
    pub fn new(theme: impl Into<String>, sub_theme: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
            sub_theme: sub_theme.into(),
            kind: kind.into(),
        }
    }

    /// Display label used in every competency bucket.
    pub fn label(&self) -> String {
        format!("{} - {}", self.theme, self.sub_theme)
    }
}

/// A designation's recorded responsibilities, activities and required
/// competencies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleMapping {
    #[serde(default)]
    pub id: Option<Uuid>,

    #[serde(default, deserialize_with = "nullable_string")]
    pub designation_name: String,

    #[serde(default, deserialize_with = "nullable_string")]
    pub wing_division_section: String,

    /// Opaque; handed to the template unchanged.
    #[serde(default)]
    pub role_responsibilities: Value,

    /// Opaque; handed to the template unchanged.
    #[serde(default)]
    pub activities: Value,

    /// Raw competency list, validated during normalisation. `None` when the
    /// upstream record has no `competencies` key or it is `null`.
    #[serde(default)]
    pub competencies: Option<Value>,
}

/// A stored set of course recommendations for one role mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedCourses {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role_mapping_id: Uuid,
    #[serde(default)]
    pub status: String,
    /// Raw course records, in recommendation order.
    #[serde(default)]
    pub filtered_courses: Vec<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to save a plan with the user's selected courses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSaveRequest {
    pub role_mapping_id: Uuid,
    pub recommended_course_id: Uuid,
    /// Selected course identifiers, in the user's chosen order.
    pub course_identifiers: Vec<String>,
}

/// Request to replace the course selection of an existing plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanUpdateRequest {
    pub course_identifiers: Vec<String>,
}

/// Response body after a plan is saved or updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSaveResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Raw records of the selected courses, in selection order.
    pub selected_courses: Vec<Value>,
}

/// Accept `null` wherever a string is expected.
fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
