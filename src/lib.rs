pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod proto;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::toml_config::HarnessConfig;

pub use adapters::{BearerToken, ConnectOptions, ContainerSettings, SpiceDbClient, SpiceDbContainer};
pub use crate::core::assertions::expect_detailed_error;
pub use crate::core::harness::{run_suite, Harness, ReadinessSettings, SuiteSettings, Target};
pub use crate::core::scenarios::Scenario;
pub use domain::model::{RelationshipTuple, ScenarioReport, SuiteReport};
pub use utils::error::{HarnessError, Result};
