use anyhow::Result;
use async_trait::async_trait;
use spicedb_harness::core::scenarios::{self, Scenario, BOOTSTRAP_RELATIONSHIP};
use spicedb_harness::domain::ports::{ClientFactory, PermissionsApi};
use spicedb_harness::proto::v1::{
    check_permission_response::Permissionship, precondition, relationship_update::Operation,
    CheckPermissionRequest, CheckPermissionResponse, DeleteRelationshipsRequest,
    DeleteRelationshipsResponse, ReadRelationshipsRequest, ReadRelationshipsResponse,
    WriteRelationshipsRequest, WriteRelationshipsResponse, ZedToken,
};
use spicedb_harness::{
    run_suite, ConnectOptions, Harness, HarnessConfig, HarnessError, ReadinessSettings,
    RelationshipTuple, SuiteSettings, Target,
};
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::NamedTempFile;
use tonic::{Code, Status};
use tonic_types::{ErrorDetails, StatusExt};

/// Records requests and answers from a script.
#[derive(Clone, Default)]
struct RecordingApi {
    writes: Arc<Mutex<Vec<WriteRelationshipsRequest>>>,
    reads: Arc<Mutex<Vec<Vec<ReadRelationshipsResponse>>>>,
}

fn precondition_failure() -> Status {
    Status::with_error_details(
        Code::FailedPrecondition,
        "unable to satisfy write precondition",
        ErrorDetails::with_error_info(
            "ERROR_REASON_WRITE_OR_DELETE_PRECONDITION_FAILURE",
            "authzed.com",
            HashMap::new(),
        ),
    )
}

#[async_trait]
impl PermissionsApi for RecordingApi {
    async fn write_relationships(
        &mut self,
        request: WriteRelationshipsRequest,
    ) -> std::result::Result<WriteRelationshipsResponse, Status> {
        let is_create = request
            .updates
            .iter()
            .any(|u| u.operation() == Operation::Create);
        self.writes.lock().unwrap().push(request);
        if is_create {
            return Err(precondition_failure());
        }
        Ok(WriteRelationshipsResponse {
            written_at: Some(ZedToken {
                token: "GhUKEzE2OTk".to_string(),
            }),
        })
    }

    async fn delete_relationships(
        &mut self,
        _request: DeleteRelationshipsRequest,
    ) -> std::result::Result<DeleteRelationshipsResponse, Status> {
        Ok(DeleteRelationshipsResponse::default())
    }

    async fn check_permission(
        &mut self,
        request: CheckPermissionRequest,
    ) -> std::result::Result<CheckPermissionResponse, Status> {
        let subject_id = request
            .subject
            .and_then(|s| s.object)
            .map(|o| o.object_id)
            .unwrap_or_default();
        let permissionship = if subject_id == "alice" {
            Permissionship::HasPermission
        } else {
            Permissionship::NoPermission
        };
        Ok(CheckPermissionResponse {
            checked_at: None,
            permissionship: permissionship as i32,
        })
    }

    async fn read_relationships(
        &mut self,
        _request: ReadRelationshipsRequest,
    ) -> std::result::Result<Vec<ReadRelationshipsResponse>, Status> {
        let mut reads = self.reads.lock().unwrap();
        Ok(if reads.is_empty() {
            vec![]
        } else {
            reads.remove(0)
        })
    }
}

struct RecordingFactory(RecordingApi);

#[async_trait]
impl ClientFactory for RecordingFactory {
    type Client = RecordingApi;

    async fn connect(&self) -> spicedb_harness::Result<RecordingApi> {
        Ok(self.0.clone())
    }
}

#[tokio::test]
async fn test_precondition_scenario_sends_must_not_match_filter() -> Result<()> {
    let mut api = RecordingApi::default();

    let detailed = scenarios::create_existing_relationship_with_precondition(&mut api).await?;
    assert_eq!(
        detailed.reason,
        "ERROR_REASON_WRITE_OR_DELETE_PRECONDITION_FAILURE"
    );

    let writes = api.writes.lock().unwrap();
    assert_eq!(writes.len(), 1);
    let request = &writes[0];
    assert_eq!(request.updates.len(), 1);
    assert_eq!(request.updates[0].operation(), Operation::Create);

    assert_eq!(request.optional_preconditions.len(), 1);
    let guard = &request.optional_preconditions[0];
    assert_eq!(guard.operation(), precondition::Operation::MustNotMatch);
    let filter = guard.filter.as_ref().unwrap();
    assert_eq!(filter.resource_type, "access");
    assert_eq!(filter.optional_resource_id, "blue");
    assert_eq!(filter.optional_relation, "assigned");
    let subject = filter.optional_subject_filter.as_ref().unwrap();
    assert_eq!(subject.subject_type, "user");
    assert_eq!(subject.optional_subject_id, "alice");

    Ok(())
}

#[tokio::test]
async fn test_write_without_precondition_sends_bare_create() -> Result<()> {
    let mut api = RecordingApi::default();

    scenarios::create_existing_relationship_without_precondition(&mut api).await?;

    let writes = api.writes.lock().unwrap();
    let request = &writes[0];
    assert!(request.optional_preconditions.is_empty());
    let relationship = request.updates[0].relationship.as_ref().unwrap();
    let expected: RelationshipTuple = BOOTSTRAP_RELATIONSHIP.parse()?;
    assert_eq!(relationship, &expected.to_relationship());

    Ok(())
}

#[tokio::test]
async fn test_touch_then_delete_detects_missing_read() {
    let mut api = RecordingApi::default();

    let err = scenarios::touch_then_delete_relationship(&mut api)
        .await
        .unwrap_err();
    assert!(matches!(err, HarnessError::AssertionFailed { .. }));
    assert!(err.to_string().contains("readable after TOUCH"));
}

#[tokio::test]
async fn test_touch_then_delete_passes_when_reads_match() -> Result<()> {
    let scratch: RelationshipTuple = scenarios::SCRATCH_RELATIONSHIP.parse()?;
    let api = RecordingApi::default();
    api.reads.lock().unwrap().push(vec![ReadRelationshipsResponse {
        read_at: None,
        relationship: Some(scratch.to_relationship()),
    }]);
    api.reads.lock().unwrap().push(vec![]);

    let mut client = api.clone();
    scenarios::touch_then_delete_relationship(&mut client).await?;

    let writes = api.writes.lock().unwrap();
    assert_eq!(writes[0].updates[0].operation(), Operation::Touch);
    Ok(())
}

#[tokio::test]
async fn test_harness_reports_every_scenario() -> Result<()> {
    let factory = RecordingFactory(RecordingApi::default());
    let report = Harness::new(factory, "http://recording")
        .with_readiness(ReadinessSettings {
            timeout: Duration::from_secs(1),
            poll_interval: Duration::from_millis(10),
        })
        .run()
        .await?;

    assert_eq!(report.scenarios.len(), Scenario::ALL.len());
    let failed: Vec<&str> = report.failed().into_iter().map(|s| s.name.as_str()).collect();
    // the recording double never returns the scratch relationship on read
    assert_eq!(failed, vec!["touch_then_delete_relationship"]);
    assert_eq!(report.endpoint, "http://recording");

    let json = serde_json::to_value(&report)?;
    assert_eq!(json["scenarios"][0]["name"], "create_existing_relationship_without_precondition");
    assert_eq!(json["scenarios"][0]["passed"], true);

    Ok(())
}

#[tokio::test]
async fn test_unreachable_endpoint_times_out() {
    let settings = SuiteSettings {
        target: Target::Endpoint("http://127.0.0.1:1".to_string()),
        connect: ConnectOptions {
            connect_timeout: Duration::from_millis(100),
            request_timeout: Some(Duration::from_millis(100)),
        },
        readiness: ReadinessSettings {
            timeout: Duration::from_millis(300),
            poll_interval: Duration::from_millis(50),
        },
        ..Default::default()
    };

    match run_suite(&settings).await {
        Err(HarnessError::ReadinessTimeout { endpoint, .. }) => {
            assert_eq!(endpoint, "http://127.0.0.1:1");
        }
        other => panic!("expected readiness timeout, got {:?}", other.map(|r| r.scenarios)),
    }
}

#[test]
fn test_config_file_to_endpoint_settings() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(
        br#"
[connection]
endpoint = "http://localhost:50051"
token = "somerandomkeyhere"
ready_timeout_secs = 30

[scenarios]
only = ["check_bootstrap_permission"]
"#,
    )?;

    let settings = HarnessConfig::from_file(file.path())?.to_settings()?;
    assert!(matches!(settings.target, Target::Endpoint(ref e) if e == "http://localhost:50051"));
    assert_eq!(settings.readiness.timeout, Duration::from_secs(30));
    assert_eq!(settings.scenarios, vec![Scenario::CheckBootstrapPermission]);
    Ok(())
}
