//! Plan assembly: designation + candidate cards + selection → [`PlanDocument`].
//!
//! Display order is the user's selection order, not recommendation order.
//! Identifiers with no matching candidate are skipped: a selection may name
//! courses that have since been pruned from the candidate pool.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::debug;

use crate::fields;
use crate::model::{CourseCard, Designation, PlanDocument, PlanMetadata};

/// Compose the render-ready plan.
///
/// Repeated identifiers in `selected` keep their first position only. When
/// several candidates share an identifier, the first one in `cards` is used.
pub fn assemble(
    designation: Designation,
    cards: &[CourseCard],
    selected: &[String],
    metadata: PlanMetadata,
) -> PlanDocument {
    let mut by_id: HashMap<&str, &CourseCard> = HashMap::with_capacity(cards.len());
    for card in cards {
        if let Some(id) = card.identifier.as_deref() {
            by_id.entry(id).or_insert(card);
        }
    }

    let courses = in_selection_order(selected, |id| by_id.get(id).map(|c| (*c).clone()));

    debug!(
        "Assembled plan {}: {}/{} selected courses found",
        metadata.id,
        courses.len(),
        selected.len()
    );

    PlanDocument {
        metadata,
        designation,
        courses,
    }
}

/// Pick raw course records by identifier, in selection order.
///
/// Same ordering and skipping rules as [`assemble`]; used where the stored
/// records themselves are returned (plan save responses).
pub fn select_courses(records: &[Value], selected: &[String]) -> Vec<Value> {
    let mut by_id: HashMap<String, &Value> = HashMap::with_capacity(records.len());
    for record in records {
        if let Some(id) = record
            .as_object()
            .and_then(|m| fields::first_text(m, fields::IDENTIFIER))
        {
            by_id.entry(id).or_insert(record);
        }
    }

    in_selection_order(selected, |id| by_id.get(id).map(|v| (*v).clone()))
}

fn in_selection_order<T>(selected: &[String], mut find: impl FnMut(&str) -> Option<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(selected.len());
    selected
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .filter_map(|id| {
            let found = find(id);
            if found.is_none() {
                debug!("Selected course '{}' not among candidates; skipped", id);
            }
            found
        })
        .collect()
}
