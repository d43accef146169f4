pub mod assertions;
pub mod harness;
pub mod scenarios;

pub use crate::domain::model::{DetailedError, ScenarioReport, SuiteReport};
pub use crate::domain::ports::{ClientFactory, PermissionsApi};
pub use crate::utils::error::Result;
