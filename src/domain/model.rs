use crate::proto::v1::{
    self, check_permission_response::Permissionship, consistency::Requirement,
    relationship_update::Operation,
};
use crate::utils::error::{HarnessError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub object_type: String,
    pub object_id: String,
}

impl ObjectRef {
    pub fn new(object_type: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            object_id: object_id.into(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.object_type, self.object_id)
    }
}

impl From<&ObjectRef> for v1::ObjectReference {
    fn from(object: &ObjectRef) -> Self {
        v1::ObjectReference {
            object_type: object.object_type.clone(),
            object_id: object.object_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectRef {
    pub object: ObjectRef,
    pub relation: Option<String>,
}

impl fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.relation {
            Some(relation) => write!(f, "{}#{}", self.object, relation),
            None => write!(f, "{}", self.object),
        }
    }
}

impl From<&SubjectRef> for v1::SubjectReference {
    fn from(subject: &SubjectRef) -> Self {
        v1::SubjectReference {
            object: Some((&subject.object).into()),
            optional_relation: subject.relation.clone().unwrap_or_default(),
        }
    }
}

/// A relationship in bootstrap-file syntax:
/// `resource_type:resource_id#relation@subject_type:subject_id[#subject_relation]`.
///
/// The same shape doubles as a permission check, with the permission name in
/// the relation slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationshipTuple {
    pub resource: ObjectRef,
    pub relation: String,
    pub subject: SubjectRef,
}

impl RelationshipTuple {
    pub fn to_relationship(&self) -> v1::Relationship {
        v1::Relationship {
            resource: Some((&self.resource).into()),
            relation: self.relation.clone(),
            subject: Some((&self.subject).into()),
        }
    }

    pub fn update(&self, operation: Operation) -> v1::RelationshipUpdate {
        v1::RelationshipUpdate {
            operation: operation as i32,
            relationship: Some(self.to_relationship()),
        }
    }

    /// Filter matching exactly this relationship.
    pub fn exact_filter(&self) -> v1::RelationshipFilter {
        v1::RelationshipFilter {
            resource_type: self.resource.object_type.clone(),
            optional_resource_id: self.resource.object_id.clone(),
            optional_relation: self.relation.clone(),
            optional_subject_filter: Some(v1::SubjectFilter {
                subject_type: self.subject.object.object_type.clone(),
                optional_subject_id: self.subject.object.object_id.clone(),
                optional_relation: self
                    .subject
                    .relation
                    .as_ref()
                    .map(|relation| v1::RelationFilter {
                        relation: relation.clone(),
                    }),
            }),
        }
    }

    pub fn precondition(&self, operation: v1::precondition::Operation) -> v1::Precondition {
        v1::Precondition {
            operation: operation as i32,
            filter: Some(self.exact_filter()),
        }
    }

    /// Reads the relation slot as a permission name.
    pub fn check_request(&self, consistency: v1::Consistency) -> v1::CheckPermissionRequest {
        v1::CheckPermissionRequest {
            consistency: Some(consistency),
            resource: Some((&self.resource).into()),
            permission: self.relation.clone(),
            subject: Some((&self.subject).into()),
        }
    }

    fn parse_error(input: &str, reason: &str) -> HarnessError {
        HarnessError::RelationshipParseError {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    fn parse_object(input: &str, part: &str, which: &str) -> Result<ObjectRef> {
        let (object_type, object_id) = part
            .split_once(':')
            .ok_or_else(|| Self::parse_error(input, &format!("{} is missing ':'", which)))?;

        if object_type.is_empty() || object_id.is_empty() {
            return Err(Self::parse_error(
                input,
                &format!("{} type and id must be non-empty", which),
            ));
        }

        Ok(ObjectRef::new(object_type, object_id))
    }
}

impl FromStr for RelationshipTuple {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        let input = s.trim();
        if input.chars().any(char::is_whitespace) {
            return Err(Self::parse_error(input, "whitespace is not allowed"));
        }

        let (resource_part, subject_part) = input
            .split_once('@')
            .ok_or_else(|| Self::parse_error(input, "missing '@' before the subject"))?;

        let (resource_object, relation) = resource_part
            .split_once('#')
            .ok_or_else(|| Self::parse_error(input, "missing '#' before the relation"))?;

        if relation.is_empty() {
            return Err(Self::parse_error(input, "relation must be non-empty"));
        }

        let resource = Self::parse_object(input, resource_object, "resource")?;

        let (subject_object, subject_relation) = match subject_part.split_once('#') {
            Some((_, "")) => {
                return Err(Self::parse_error(input, "subject relation must be non-empty"))
            }
            Some((object, relation)) => (object, Some(relation.to_string())),
            None => (subject_part, None),
        };

        let subject = SubjectRef {
            object: Self::parse_object(input, subject_object, "subject")?,
            relation: subject_relation,
        };

        Ok(RelationshipTuple {
            resource,
            relation: relation.to_string(),
            subject,
        })
    }
}

impl fmt::Display for RelationshipTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}@{}", self.resource, self.relation, self.subject)
    }
}

pub fn fully_consistent() -> v1::Consistency {
    v1::Consistency {
        requirement: Some(Requirement::FullyConsistent(true)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub permissionship: Permissionship,
    pub checked_at: Option<String>,
}

impl From<v1::CheckPermissionResponse> for CheckOutcome {
    fn from(response: v1::CheckPermissionResponse) -> Self {
        CheckOutcome {
            permissionship: response.permissionship(),
            checked_at: response.checked_at.map(|token| token.token),
        }
    }
}

/// What a successful detailed-error assertion yields: the status plus its
/// leading `ErrorInfo` detail.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailedError {
    pub code: tonic::Code,
    pub message: String,
    pub reason: String,
    pub domain: String,
    pub metadata: HashMap<String, String>,
}

impl fmt::Display for DetailedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} reason={} domain={} message={}",
            self.code, self.reason, self.domain, self.message
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub name: String,
    pub passed: bool,
    pub duration_ms: u128,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub endpoint: String,
    pub started_at: DateTime<Utc>,
    pub scenarios: Vec<ScenarioReport>,
}

impl SuiteReport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            started_at: Utc::now(),
            scenarios: Vec::new(),
        }
    }

    pub fn all_passed(&self) -> bool {
        self.scenarios.iter().all(|s| s.passed)
    }

    pub fn failed(&self) -> Vec<&ScenarioReport> {
        self.scenarios.iter().filter(|s| !s.passed).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_relationship() {
        let tuple: RelationshipTuple = "access:blue#assigned@user:alice".parse().unwrap();
        assert_eq!(tuple.resource, ObjectRef::new("access", "blue"));
        assert_eq!(tuple.relation, "assigned");
        assert_eq!(tuple.subject.object, ObjectRef::new("user", "alice"));
        assert_eq!(tuple.subject.relation, None);
        assert_eq!(tuple.to_string(), "access:blue#assigned@user:alice");
    }

    #[test]
    fn test_parse_subject_relation() {
        let tuple: RelationshipTuple = "access:blue#assigned@group:eng#member".parse().unwrap();
        assert_eq!(tuple.subject.relation.as_deref(), Some("member"));
        assert_eq!(tuple.to_string(), "access:blue#assigned@group:eng#member");
    }

    #[test]
    fn test_parse_rejects_malformed_tuples() {
        for input in [
            "",
            "access:blue#assigned",
            "access:blue@user:alice",
            "accessblue#assigned@user:alice",
            "access:#assigned@user:alice",
            "access:blue#@user:alice",
            "access:blue#assigned@user",
            "access:blue#assigned@user:alice#",
            "access:blue #assigned@user:alice",
        ] {
            assert!(
                input.parse::<RelationshipTuple>().is_err(),
                "expected parse failure for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_exact_filter_matches_tuple() {
        let tuple: RelationshipTuple = "access:blue#assigned@user:alice".parse().unwrap();
        let filter = tuple.exact_filter();
        assert_eq!(filter.resource_type, "access");
        assert_eq!(filter.optional_resource_id, "blue");
        assert_eq!(filter.optional_relation, "assigned");
        let subject = filter.optional_subject_filter.unwrap();
        assert_eq!(subject.subject_type, "user");
        assert_eq!(subject.optional_subject_id, "alice");
        assert!(subject.optional_relation.is_none());
    }

    #[test]
    fn test_update_carries_operation() {
        let tuple: RelationshipTuple = "access:blue#assigned@user:alice".parse().unwrap();
        let update = tuple.update(Operation::Create);
        assert_eq!(update.operation(), Operation::Create);
        let relationship = update.relationship.unwrap();
        assert_eq!(relationship.relation, "assigned");
        assert_eq!(relationship.subject.unwrap().optional_relation, "");
    }

    #[test]
    fn test_check_request_uses_relation_as_permission() {
        let check: RelationshipTuple = "access:blue#granted@user:alice".parse().unwrap();
        let request = check.check_request(fully_consistent());
        assert_eq!(request.permission, "granted");
        assert_eq!(
            request.consistency.unwrap().requirement,
            Some(Requirement::FullyConsistent(true))
        );
    }

    #[test]
    fn test_suite_report_failures() {
        let mut report = SuiteReport::new("http://localhost:50051");
        report.scenarios.push(ScenarioReport {
            name: "a".to_string(),
            passed: true,
            duration_ms: 3,
            detail: String::new(),
        });
        report.scenarios.push(ScenarioReport {
            name: "b".to_string(),
            passed: false,
            duration_ms: 5,
            detail: "boom".to_string(),
        });
        assert!(!report.all_passed());
        assert_eq!(report.failed().len(), 1);
        assert_eq!(report.failed()[0].name, "b");

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["endpoint"], "http://localhost:50051");
        assert_eq!(json["scenarios"][1]["detail"], "boom");
    }
}
