use crate::core::assertions::{expect_detailed_error, expect_permissionship};
use crate::domain::model::{fully_consistent, CheckOutcome, DetailedError, RelationshipTuple};
use crate::domain::ports::PermissionsApi;
use crate::proto::v1::{
    check_permission_response::Permissionship, precondition, relationship_update::Operation,
    DeleteRelationshipsRequest, ReadRelationshipsRequest, WriteRelationshipsRequest,
};
use crate::utils::error::{HarnessError, Result};
use std::fmt;

/// Loaded by `spicedb_bootstrap.yaml`; every fresh token sees it.
pub const BOOTSTRAP_RELATIONSHIP: &str = "access:blue#assigned@user:alice";
pub const BOOTSTRAP_PERMISSION_CHECK: &str = "access:blue#granted@user:alice";
pub const MISSING_PERMISSION_CHECK: &str = "access:blue#granted@user:bob";
pub const SCRATCH_RELATIONSHIP: &str = "access:red#assigned@user:bob";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    CreateExistingWithoutPrecondition,
    CreateExistingWithPrecondition,
    CheckBootstrapPermission,
    CheckMissingPermission,
    TouchThenDeleteRelationship,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::CreateExistingWithoutPrecondition,
        Scenario::CreateExistingWithPrecondition,
        Scenario::CheckBootstrapPermission,
        Scenario::CheckMissingPermission,
        Scenario::TouchThenDeleteRelationship,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::CreateExistingWithoutPrecondition => {
                "create_existing_relationship_without_precondition"
            }
            Scenario::CreateExistingWithPrecondition => {
                "create_existing_relationship_with_precondition"
            }
            Scenario::CheckBootstrapPermission => "check_bootstrap_permission",
            Scenario::CheckMissingPermission => "check_missing_permission",
            Scenario::TouchThenDeleteRelationship => "touch_then_delete_relationship",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Runs the scenario; `Ok` carries a one-line description of what was observed.
    pub async fn run<C: PermissionsApi>(&self, client: &mut C) -> Result<String> {
        match self {
            Scenario::CreateExistingWithoutPrecondition => {
                create_existing_relationship_without_precondition(client)
                    .await
                    .map(|e| e.to_string())
            }
            Scenario::CreateExistingWithPrecondition => {
                create_existing_relationship_with_precondition(client)
                    .await
                    .map(|e| e.to_string())
            }
            Scenario::CheckBootstrapPermission => {
                let outcome = check_bootstrap_permission(client).await?;
                Ok(outcome.permissionship.as_str_name().to_string())
            }
            Scenario::CheckMissingPermission => {
                let outcome = check_missing_permission(client).await?;
                Ok(outcome.permissionship.as_str_name().to_string())
            }
            Scenario::TouchThenDeleteRelationship => {
                touch_then_delete_relationship(client).await?;
                Ok(format!("{} written, read back and deleted", SCRATCH_RELATIONSHIP))
            }
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// CREATE of a relationship that already exists must fail with an `ErrorInfo` detail.
pub async fn create_existing_relationship_without_precondition<C: PermissionsApi>(
    client: &mut C,
) -> Result<DetailedError> {
    let tuple: RelationshipTuple = BOOTSTRAP_RELATIONSHIP.parse()?;

    let result = client
        .write_relationships(WriteRelationshipsRequest {
            updates: vec![tuple.update(Operation::Create)],
            optional_preconditions: vec![],
        })
        .await;

    expect_detailed_error(result)
}

/// Same write guarded by a MUST_NOT_MATCH precondition on the same relationship.
pub async fn create_existing_relationship_with_precondition<C: PermissionsApi>(
    client: &mut C,
) -> Result<DetailedError> {
    let tuple: RelationshipTuple = BOOTSTRAP_RELATIONSHIP.parse()?;

    let result = client
        .write_relationships(WriteRelationshipsRequest {
            updates: vec![tuple.update(Operation::Create)],
            optional_preconditions: vec![tuple.precondition(precondition::Operation::MustNotMatch)],
        })
        .await;

    expect_detailed_error(result)
}

pub async fn check_permission<C: PermissionsApi>(
    client: &mut C,
    check: &str,
) -> Result<CheckOutcome> {
    let check: RelationshipTuple = check.parse()?;
    let response = client
        .check_permission(check.check_request(fully_consistent()))
        .await?;
    tracing::debug!("check {} -> {:?}", check, response.permissionship());
    Ok(response.into())
}

pub async fn check_bootstrap_permission<C: PermissionsApi>(client: &mut C) -> Result<CheckOutcome> {
    let outcome = check_permission(client, BOOTSTRAP_PERMISSION_CHECK).await?;
    expect_permissionship(&outcome, Permissionship::HasPermission)?;
    Ok(outcome)
}

pub async fn check_missing_permission<C: PermissionsApi>(client: &mut C) -> Result<CheckOutcome> {
    let outcome = check_permission(client, MISSING_PERMISSION_CHECK).await?;
    expect_permissionship(&outcome, Permissionship::NoPermission)?;
    Ok(outcome)
}

async fn count_matching<C: PermissionsApi>(
    client: &mut C,
    tuple: &RelationshipTuple,
) -> Result<usize> {
    let responses = client
        .read_relationships(ReadRelationshipsRequest {
            consistency: Some(fully_consistent()),
            relationship_filter: Some(tuple.exact_filter()),
        })
        .await?;

    let expected = tuple.to_relationship();
    Ok(responses
        .into_iter()
        .filter(|r| r.relationship.as_ref() == Some(&expected))
        .count())
}

pub async fn touch_then_delete_relationship<C: PermissionsApi>(client: &mut C) -> Result<()> {
    let tuple: RelationshipTuple = SCRATCH_RELATIONSHIP.parse()?;

    client
        .write_relationships(WriteRelationshipsRequest {
            updates: vec![tuple.update(Operation::Touch)],
            optional_preconditions: vec![],
        })
        .await?;

    let found = count_matching(client, &tuple).await?;
    if found != 1 {
        return Err(HarnessError::AssertionFailed {
            message: format!("expected {} to be readable after TOUCH, found {}", tuple, found),
        });
    }

    client
        .delete_relationships(DeleteRelationshipsRequest {
            relationship_filter: Some(tuple.exact_filter()),
            optional_preconditions: vec![tuple.precondition(precondition::Operation::MustMatch)],
        })
        .await?;

    let remaining = count_matching(client, &tuple).await?;
    if remaining != 0 {
        return Err(HarnessError::AssertionFailed {
            message: format!("expected {} to be gone after delete, found {}", tuple, remaining),
        });
    }

    Ok(())
}
