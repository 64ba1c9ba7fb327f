//! Competency classification: free-text type/area → [`CompetencyBucket`].
//!
//! Upstream type strings are inconsistent ("Behavioural", "behavioral
//! competency", "FUNCTIONAL", "Domain Expertise"), so matching is a
//! case-insensitive substring test in a fixed priority order. The first
//! family with a hit wins.

use serde::Deserialize;
use serde_json::Value;

use crate::error::PlanError;
use crate::model::{ClassifiedCompetency, CompetencyBucket, CompetencyGroups};
use crate::records::RawCompetency;

/// Match terms per bucket, in priority order. `"behavior"` also covers
/// `"behavioral"`.
const RULES: &[(CompetencyBucket, &[&str])] = &[
    (CompetencyBucket::Behavioral, &["behavior", "behaviour"]),
    (CompetencyBucket::Functional, &["functional"]),
    (CompetencyBucket::Domain, &["domain"]),
];

/// Classify a competency type or area string. Never fails: empty or
/// unrecognised text is [`CompetencyBucket::Unclassified`].
pub fn classify(type_or_area: &str) -> CompetencyBucket {
    let text = type_or_area.to_lowercase();
    RULES
        .iter()
        .find(|(_, terms)| terms.iter().any(|t| text.contains(t)))
        .map(|(bucket, _)| *bucket)
        .unwrap_or(CompetencyBucket::Unclassified)
}

/// Classify one raw competency and build its display label.
///
/// Returns `None` for unclassified competencies; callers drop those.
pub fn classify_competency(raw: &RawCompetency) -> Option<ClassifiedCompetency> {
    match classify(&raw.kind) {
        CompetencyBucket::Unclassified => None,
        bucket => Some(ClassifiedCompetency {
            label: raw.label(),
            bucket,
        }),
    }
}

/// Classify a raw competency list into buckets, keeping input order.
///
/// `record` and `source` name the owning record and field in errors.
///
/// # Errors
/// [`PlanError::MissingData`] when `list` is not an array or an item is not
/// an object.
pub fn classify_list(
    record: &str,
    source: &str,
    list: &Value,
) -> Result<CompetencyGroups, PlanError> {
    let items = list
        .as_array()
        .ok_or_else(|| PlanError::missing(record, format!("'{source}' is not a list")))?;

    let raw = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            RawCompetency::deserialize(item)
                .map_err(|e| PlanError::missing(record, format!("{source}[{i}]: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(raw.iter().filter_map(classify_competency).collect())
}
