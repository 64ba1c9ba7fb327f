//! Course normalisation: one raw course record → [`CourseCard`].
//!
//! Every card field resolves independently through the candidate lists in
//! [`crate::fields`] and falls back to a default instead of failing. The one
//! exception is the competency list: a record with no competency field at all
//! means the upstream search contract was broken, and that must surface
//! rather than produce a card with silently empty buckets.

use serde_json::{Number, Value};
use tracing::debug;

use crate::error::PlanError;
use crate::fields;
use crate::model::CourseCard;
use crate::pipeline::classify::classify_list;

const RECORD: &str = "course record";

/// Normalise one raw course record.
///
/// # Errors
/// [`PlanError::MissingData`] when the record is not an object, when none of
/// the competency fields is present, when the competency field is not a
/// list, or when a competency item is not an object.
pub fn normalize_course(record: &Value) -> Result<CourseCard, PlanError> {
    let map = record
        .as_object()
        .ok_or_else(|| PlanError::missing(RECORD, "expected a JSON object"))?;

    let (source, competencies) = fields::first_present(map, fields::COMPETENCIES)
        .ok_or_else(|| PlanError::missing(RECORD, fields::COMPETENCIES.join(" or ")))?;
    let groups = classify_list(RECORD, source, competencies)?;

    let card = CourseCard {
        identifier: fields::first_text(map, fields::IDENTIFIER),
        title: fields::first_text(map, fields::TITLE).unwrap_or_default(),
        provider: fields::first_listed(map, fields::ORGANISATION)
            .or_else(|| fields::first_text(map, fields::PLATFORM))
            .unwrap_or_default(),
        relevancy: fields::first_number(map, fields::RELEVANCY).unwrap_or_else(|| Number::from(0)),
        is_public: fields::first_bool(map, fields::IS_PUBLIC).unwrap_or(false),
        functional: groups.functional,
        domain: groups.domain,
        behavioral: groups.behavioral,
    };

    debug!(
        "Normalised course {:?} ({} competencies from '{}', {} kept)",
        card.title,
        competencies.as_array().map_or(0, Vec::len),
        source,
        card.functional.len() + card.domain.len() + card.behavioral.len()
    );

    Ok(card)
}

/// Normalise a batch of course records, failing on the first bad one.
pub fn normalize_courses(records: &[Value]) -> Result<Vec<CourseCard>, PlanError> {
    records.iter().map(normalize_course).collect()
}
