use anyhow::Result;
use spicedb_harness::adapters::{ContainerSettings, GrpcClientFactory, SpiceDbContainer};
use spicedb_harness::core::assertions::expect_code;
use spicedb_harness::core::scenarios::{self, Scenario};
use spicedb_harness::domain::ports::ClientFactory;
use spicedb_harness::utils::logger;
use spicedb_harness::{ConnectOptions, Harness, ReadinessSettings};
use std::path::PathBuf;
use std::time::Duration;
use tonic::Code;

fn bootstrap_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("spicedb_bootstrap.yaml")
}

async fn start_spicedb() -> SpiceDbContainer {
    let settings = ContainerSettings {
        bootstrap_path: bootstrap_path(),
        ..Default::default()
    };

    SpiceDbContainer::start(&settings)
        .await
        .expect("Failed to start SpiceDB container")
}

/// One container for every case; cases run in order and the container is
/// removed even when a case fails.
#[tokio::test]
#[ignore = "requires Docker"]
async fn test_spicedb_scenarios_against_shared_container() -> Result<()> {
    logger::init_test_logger();

    let container = start_spicedb().await;
    let endpoint = container.endpoint().to_string();
    println!("SpiceDB started at: {}", endpoint);

    let factory = GrpcClientFactory::new(endpoint.clone(), None, ConnectOptions::default());
    let harness = Harness::new(factory.clone(), endpoint.clone()).with_readiness(ReadinessSettings {
        timeout: Duration::from_secs(90),
        poll_interval: Duration::from_millis(500),
    });

    let outcome = run_cases(&harness, &factory).await;
    container.purge().await?;
    outcome
}

async fn run_cases(harness: &Harness<GrpcClientFactory>, factory: &GrpcClientFactory) -> Result<()> {
    harness.wait_until_ready().await?;

    // create of an existing relationship without a precondition
    let mut client = factory.connect().await?;
    let detailed = scenarios::create_existing_relationship_without_precondition(&mut client).await?;
    println!("Got detailed info: {}", detailed);
    assert!(!detailed.reason.is_empty());

    // same write guarded by MUST_NOT_MATCH
    let mut client = factory.connect().await?;
    let detailed = scenarios::create_existing_relationship_with_precondition(&mut client).await?;
    println!("Got detailed info: {}", detailed);
    expect_code(&detailed, Code::FailedPrecondition)?;

    let mut client = factory.connect().await?;
    scenarios::check_bootstrap_permission(&mut client).await?;

    let mut client = factory.connect().await?;
    scenarios::check_missing_permission(&mut client).await?;

    let mut client = factory.connect().await?;
    scenarios::touch_then_delete_relationship(&mut client).await?;

    let report = harness.run_scenarios().await;
    assert_eq!(report.scenarios.len(), Scenario::ALL.len());
    assert!(report.all_passed(), "failed scenarios: {:?}", report.failed());

    Ok(())
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_run_suite_starts_and_removes_container() -> Result<()> {
    logger::init_test_logger();

    let settings = spicedb_harness::SuiteSettings {
        target: spicedb_harness::Target::Container(ContainerSettings {
            bootstrap_path: bootstrap_path(),
            ..Default::default()
        }),
        scenarios: vec![
            Scenario::CreateExistingWithoutPrecondition,
            Scenario::CreateExistingWithPrecondition,
        ],
        ..Default::default()
    };

    let report = spicedb_harness::run_suite(&settings).await?;
    assert!(report.all_passed(), "failed scenarios: {:?}", report.failed());
    assert!(report.endpoint.starts_with("http://"));

    Ok(())
}
