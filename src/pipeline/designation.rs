//! Role-mapping normalisation: [`RoleMapping`] → [`Designation`].

use tracing::debug;

use crate::error::PlanError;
use crate::model::Designation;
use crate::pipeline::classify::classify_list;
use crate::records::RoleMapping;

const RECORD: &str = "role mapping";

/// Normalise one role mapping into the designation view.
///
/// Responsibilities and activities pass through unchanged. Competencies are
/// classified by their `type`; unclassified ones are dropped.
///
/// # Errors
/// [`PlanError::MissingData`] when the role mapping has no `competencies`,
/// when they are not a list, or when an item is not an object.
pub fn normalize_designation(role: &RoleMapping) -> Result<Designation, PlanError> {
    let competencies = role
        .competencies
        .as_ref()
        .ok_or_else(|| PlanError::missing(RECORD, "competencies"))?;
    let groups = classify_list(RECORD, "competencies", competencies)?;

    debug!(
        "Normalised designation {:?}: {} competencies, {} kept",
        role.designation_name,
        competencies.as_array().map_or(0, Vec::len),
        groups.behavioral.len() + groups.functional.len() + groups.domain.len()
    );

    Ok(Designation {
        designation: role.designation_name.clone(),
        wing: role.wing_division_section.clone(),
        roles_responsibilities: role.role_responsibilities.clone(),
        activities: role.activities.clone(),
        behavioral_competencies: groups.behavioral,
        functional_competencies: groups.functional,
        domain_competencies: groups.domain,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn comp(theme: &str, sub: &str, kind: &str) -> Value {
        json!({ "theme": theme, "sub_theme": sub, "type": kind })
    }

    fn role(competencies: Option<Value>) -> RoleMapping {
        RoleMapping {
            id: None,
            designation_name: "Assistant Section Officer".into(),
            wing_division_section: "Establishment".into(),
            role_responsibilities: json!(["Maintain service books", "Process leave"]),
            activities: json!([{ "activity": "Noting", "frequency": "daily" }]),
            competencies,
        }
    }

    #[test]
    fn buckets_and_passthrough() {
        let d = normalize_designation(&role(Some(json!([
            comp("Noting", "Drafting", "Functional"),
            comp("Team", "Collaboration", "Behavioral"),
            comp("Service Rules", "FR/SR", "Domain"),
            comp("Misc", "Other", "unknown"),
        ]))))
        .unwrap();

        assert_eq!(d.designation, "Assistant Section Officer");
        assert_eq!(d.wing, "Establishment");
        assert_eq!(d.roles_responsibilities, json!(["Maintain service books", "Process leave"]));
        assert_eq!(d.activities[0]["activity"], json!("Noting"));
        assert_eq!(d.functional_competencies, vec!["Noting - Drafting"]);
        assert_eq!(d.behavioral_competencies, vec!["Team - Collaboration"]);
        assert_eq!(d.domain_competencies, vec!["Service Rules - FR/SR"]);
    }

    #[test]
    fn unknown_type_is_dropped() {
        let d = normalize_designation(&role(Some(json!([
            comp("T1", "S1", "Domain Expertise"),
            comp("T2", "S2", "unknown"),
        ]))))
        .unwrap();
        assert_eq!(d.domain_competencies, vec!["T1 - S1"]);
        assert!(d.functional_competencies.is_empty());
        assert!(d.behavioral_competencies.is_empty());
    }

    #[test]
    fn empty_competencies_ok() {
        let d = normalize_designation(&role(Some(json!([])))).unwrap();
        assert!(d.domain_competencies.is_empty());
    }

    #[test]
    fn missing_competencies_is_an_error() {
        let err = normalize_designation(&role(None)).unwrap_err();
        assert!(matches!(err, PlanError::MissingData { .. }));
        assert_eq!(err.status_code(), 422);
    }

    #[test]
    fn non_list_competencies_is_missing_data() {
        let err = normalize_designation(&role(Some(json!("Functional")))).unwrap_err();
        assert!(matches!(err, PlanError::MissingData { .. }), "got {err:?}");
        assert_eq!(err.status_code(), 422);

        let err = normalize_designation(&role(Some(json!({ "theme": "T" })))).unwrap_err();
        assert_eq!(err.status_code(), 422);

        let err = normalize_designation(&role(Some(json!(["Functional"])))).unwrap_err();
        assert!(err.to_string().contains("competencies[0]"), "got {err}");
    }

    #[test]
    fn idempotent() {
        let r = role(Some(json!([comp("A", "B", "functional")])));
        assert_eq!(
            normalize_designation(&r).unwrap(),
            normalize_designation(&r).unwrap()
        );
    }
}
