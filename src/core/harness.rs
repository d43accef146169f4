use crate::adapters::{BearerToken, ConnectOptions, ContainerSettings, GrpcClientFactory, SpiceDbContainer};
use crate::core::scenarios::{Scenario, BOOTSTRAP_PERMISSION_CHECK};
use crate::domain::model::{fully_consistent, RelationshipTuple, ScenarioReport, SuiteReport};
use crate::domain::ports::{ClientFactory, PermissionsApi};
use crate::utils::error::{ErrorCategory, HarnessError, Result};
use crate::utils::monitor::SuiteMonitor;
use std::time::{Duration, Instant};
use tonic::Code;

#[derive(Debug, Clone)]
pub struct ReadinessSettings {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ReadinessSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// Runs scenarios sequentially against one service, dialing a fresh client
/// for each.
pub struct Harness<F: ClientFactory> {
    factory: F,
    endpoint: String,
    scenarios: Vec<Scenario>,
    readiness: ReadinessSettings,
    monitor: SuiteMonitor,
}

impl<F: ClientFactory> Harness<F> {
    pub fn new(factory: F, endpoint: impl Into<String>) -> Self {
        Self {
            factory,
            endpoint: endpoint.into(),
            scenarios: Scenario::ALL.to_vec(),
            readiness: ReadinessSettings::default(),
            monitor: SuiteMonitor::default(),
        }
    }

    pub fn with_scenarios(mut self, scenarios: Vec<Scenario>) -> Self {
        self.scenarios = scenarios;
        self
    }

    pub fn with_readiness(mut self, readiness: ReadinessSettings) -> Self {
        self.readiness = readiness;
        self
    }

    /// Continues a monitor that already timed earlier phases.
    pub fn with_monitor(mut self, monitor: SuiteMonitor) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn monitor(&self) -> &SuiteMonitor {
        &self.monitor
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    async fn probe(&self) -> Result<()> {
        let mut client = self.factory.connect().await?;
        let check: RelationshipTuple = BOOTSTRAP_PERMISSION_CHECK.parse()?;

        match client
            .check_permission(check.check_request(fully_consistent()))
            .await
        {
            Ok(_) => Ok(()),
            // any application-level answer means the server is up
            Err(status)
                if !matches!(
                    status.code(),
                    Code::Unavailable | Code::Unknown | Code::DeadlineExceeded
                ) =>
            {
                Ok(())
            }
            Err(status) => Err(status.into()),
        }
    }

    /// Polls until the service answers a permission check or the timeout elapses.
    /// Only network errors are retried.
    pub async fn wait_until_ready(&self) -> Result<()> {
        let start = Instant::now();

        loop {
            let last_error = match self.probe().await {
                Ok(()) => {
                    tracing::info!("✅ {} is ready after {:?}", self.endpoint, start.elapsed());
                    return Ok(());
                }
                Err(e) if e.category() != ErrorCategory::Network => return Err(e),
                Err(e) => e.to_string(),
            };

            if start.elapsed() >= self.readiness.timeout {
                return Err(HarnessError::ReadinessTimeout {
                    endpoint: self.endpoint.clone(),
                    waited_ms: start.elapsed().as_millis(),
                    last_error,
                });
            }

            tracing::debug!("Waiting for {}: {}", self.endpoint, last_error);
            tokio::time::sleep(self.readiness.poll_interval).await;
        }
    }

    async fn run_one(&self, scenario: Scenario) -> Result<String> {
        let mut client = self.factory.connect().await?;
        scenario.run(&mut client).await
    }

    /// Every scenario runs even if an earlier one failed.
    pub async fn run_scenarios(&self) -> SuiteReport {
        let mut report = SuiteReport::new(self.endpoint.clone());

        for scenario in &self.scenarios {
            tracing::info!("▶ {}", scenario);
            let start = Instant::now();
            let outcome = self.run_one(*scenario).await;
            let duration_ms = start.elapsed().as_millis();
            self.monitor.log_phase(scenario.name());

            let scenario_report = match outcome {
                Ok(detail) => {
                    tracing::info!("✅ {} passed ({}ms): {}", scenario, duration_ms, detail);
                    ScenarioReport {
                        name: scenario.name().to_string(),
                        passed: true,
                        duration_ms,
                        detail,
                    }
                }
                Err(e) => {
                    tracing::error!("❌ {} failed ({}ms): {}", scenario, duration_ms, e);
                    ScenarioReport {
                        name: scenario.name().to_string(),
                        passed: false,
                        duration_ms,
                        detail: e.to_string(),
                    }
                }
            };
            report.scenarios.push(scenario_report);
        }

        report
    }

    pub async fn run(&self) -> Result<SuiteReport> {
        self.wait_until_ready().await?;
        self.monitor.log_phase("readiness");

        let report = self.run_scenarios().await;
        self.monitor.log_final_stats();

        Ok(report)
    }
}

/// Where the suite gets its service from.
#[derive(Debug, Clone)]
pub enum Target {
    /// Start a container for the duration of the suite.
    Container(ContainerSettings),
    /// Use an already running service.
    Endpoint(String),
}

#[derive(Debug, Clone)]
pub struct SuiteSettings {
    pub target: Target,
    pub token: Option<BearerToken>,
    pub connect: ConnectOptions,
    pub readiness: ReadinessSettings,
    pub scenarios: Vec<Scenario>,
    pub monitor: bool,
}

impl Default for SuiteSettings {
    fn default() -> Self {
        Self {
            target: Target::Container(ContainerSettings::default()),
            token: None,
            connect: ConnectOptions::default(),
            readiness: ReadinessSettings::default(),
            scenarios: Scenario::ALL.to_vec(),
            monitor: false,
        }
    }
}

async fn run_against(
    settings: &SuiteSettings,
    endpoint: &str,
    monitor: SuiteMonitor,
) -> Result<SuiteReport> {
    let factory = GrpcClientFactory::new(endpoint, settings.token.clone(), settings.connect.clone());
    Harness::new(factory, endpoint)
        .with_scenarios(settings.scenarios.clone())
        .with_readiness(settings.readiness.clone())
        .with_monitor(monitor)
        .run()
        .await
}

/// Starts the container once (when targeted), runs every scenario, then tears
/// the container down whether or not the run succeeded.
pub async fn run_suite(settings: &SuiteSettings) -> Result<SuiteReport> {
    let monitor = SuiteMonitor::new(settings.monitor);

    match &settings.target {
        Target::Endpoint(endpoint) => run_against(settings, endpoint, monitor).await,
        Target::Container(container_settings) => {
            let container = SpiceDbContainer::start(container_settings).await?;
            monitor.log_phase("container");
            let endpoint = container.endpoint().to_string();

            let result = run_against(settings, &endpoint, monitor).await;

            if let Err(e) = container.purge().await {
                tracing::warn!("Failed to remove container: {}", e);
            }
            result
        }
    }
}
