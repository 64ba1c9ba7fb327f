//! Canonical, render-ready value types.
//!
//! Everything here is a transient, request-scoped value: built by the
//! normalisers, composed by the assembler, serialised for the template stage,
//! then dropped. Field names are chosen for Rust; `serde` attributes produce
//! the key names the templates expect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use uuid::Uuid;

use crate::error::PlanError;

/// Where a competency is displayed.
///
/// `Unclassified` is a real result, not an error: the caller filters it out,
/// which keeps the drop visible in code and in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompetencyBucket {
    Behavioral,
    Functional,
    Domain,
    Unclassified,
}

/// A display label placed in exactly one displayable bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedCompetency {
    pub label: String,
    pub bucket: CompetencyBucket,
}

/// Labels grouped by bucket, each in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompetencyGroups {
    pub behavioral: Vec<String>,
    pub functional: Vec<String>,
    pub domain: Vec<String>,
}

impl CompetencyGroups {
    pub fn push(&mut self, competency: ClassifiedCompetency) {
        match competency.bucket {
            CompetencyBucket::Behavioral => self.behavioral.push(competency.label),
            CompetencyBucket::Functional => self.functional.push(competency.label),
            CompetencyBucket::Domain => self.domain.push(competency.label),
            CompetencyBucket::Unclassified => {}
        }
    }
}

impl FromIterator<ClassifiedCompetency> for CompetencyGroups {
    fn from_iter<I: IntoIterator<Item = ClassifiedCompetency>>(iter: I) -> Self {
        let mut groups = Self::default();
        for c in iter {
            groups.push(c);
        }
        groups
    }
}

/// Canonical view of one role mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Designation {
    pub designation: String,
    pub wing: String,
    pub roles_responsibilities: Value,
    pub activities: Value,
    pub behavioral_competencies: Vec<String>,
    pub functional_competencies: Vec<String>,
    pub domain_competencies: Vec<String>,
}

/// Canonical view of one recommended course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseCard {
    /// Used to match the plan's selection; not part of the template shape.
    #[serde(skip)]
    pub identifier: Option<String>,
    pub title: String,
    pub provider: String,
    pub relevancy: Number,
    pub is_public: bool,
    pub functional: Vec<String>,
    pub domain: Vec<String>,
    pub behavioral: Vec<String>,
}

/// Identity and timestamps of a stored plan, carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanMetadata {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub role_mapping_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlanMetadata {
    /// Metadata for a plan created now, with a fresh id.
    pub fn new(user_id: Uuid, role_mapping_id: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            role_mapping_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The render-ready plan handed to the template stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    #[serde(flatten)]
    pub metadata: PlanMetadata,
    pub designation: Designation,
    /// Selected courses, in selection order.
    pub courses: Vec<CourseCard>,
}

impl PlanDocument {
    /// The plan as a plain nested JSON mapping (ids and timestamps as strings).
    pub fn to_value(&self) -> Result<Value, PlanError> {
        serde_json::to_value(self)
            .map_err(|e| PlanError::Internal(format!("plan serialisation: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn card() -> CourseCard {
        CourseCard {
            identifier: Some("do_1".into()),
            title: "Ethics".into(),
            provider: "Acme".into(),
            relevancy: Number::from(80),
            is_public: true,
            functional: vec!["A - B".into()],
            domain: vec![],
            behavioral: vec![],
        }
    }

    #[test]
    fn groups_drop_unclassified() {
        let groups: CompetencyGroups = vec![
            ClassifiedCompetency {
                label: "x".into(),
                bucket: CompetencyBucket::Unclassified,
            },
            ClassifiedCompetency {
                label: "y".into(),
                bucket: CompetencyBucket::Domain,
            },
        ]
        .into_iter()
        .collect();
        assert_eq!(groups.domain, vec!["y"]);
        assert!(groups.behavioral.is_empty() && groups.functional.is_empty());
    }

    #[test]
    fn card_template_keys() {
        let v = serde_json::to_value(card()).unwrap();
        assert_eq!(
            v,
            json!({
                "title": "Ethics",
                "provider": "Acme",
                "relevancy": 80,
                "is_public": true,
                "functional": ["A - B"],
                "domain": [],
                "behavioral": []
            })
        );
    }

    #[test]
    fn designation_template_keys() {
        let d = Designation {
            designation: "Under Secretary".into(),
            wing: "Admin".into(),
            roles_responsibilities: json!(["Approve files"]),
            activities: json!([]),
            behavioral_competencies: vec![],
            functional_competencies: vec![],
            domain_competencies: vec!["Law - Contracts".into()],
        };
        let v = serde_json::to_value(d).unwrap();
        let keys: Vec<&str> = v.as_object().unwrap().keys().map(String::as_str).collect();
        for k in [
            "designation",
            "wing",
            "rolesResponsibilities",
            "activities",
            "behavioralCompetencies",
            "functionalCompetencies",
            "domainCompetencies",
        ] {
            assert!(keys.contains(&k), "missing key {k}");
        }
    }

    #[test]
    fn document_flattens_metadata() {
        let meta = PlanMetadata::new(Uuid::new_v4(), None);
        let doc = PlanDocument {
            metadata: meta.clone(),
            designation: Designation {
                designation: String::new(),
                wing: String::new(),
                roles_responsibilities: Value::Null,
                activities: Value::Null,
                behavioral_competencies: vec![],
                functional_competencies: vec![],
                domain_competencies: vec![],
            },
            courses: vec![card()],
        };
        let v = doc.to_value().unwrap();
        assert_eq!(v["id"], json!(meta.id.to_string()));
        assert_eq!(v["user_id"], json!(meta.user_id.to_string()));
        assert!(v["created_at"].is_string());
        assert_eq!(v["courses"][0]["title"], json!("Ethics"));
        assert!(v["courses"][0].get("identifier").is_none());
    }
}
