use super::toml_config::{HarnessConfig, MonitoringConfig};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "spicedb-harness")]
#[command(about = "Runs integration scenarios against a SpiceDB gRPC endpoint")]
pub struct CliConfig {
    #[arg(long, help = "TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Use a running service instead of starting a container")]
    pub endpoint: Option<String>,

    #[arg(long)]
    pub image: Option<String>,

    #[arg(long)]
    pub tag: Option<String>,

    #[arg(long, help = "Bootstrap YAML mounted into the container")]
    pub bootstrap: Option<String>,

    #[arg(long, help = "Pre-shared key; generated per connection when omitted")]
    pub token: Option<String>,

    #[arg(long)]
    pub ready_timeout_secs: Option<u64>,

    #[arg(long, value_delimiter = ',', help = "Only run these scenarios")]
    pub only: Vec<String>,

    #[arg(long, help = "Print the suite report as JSON")]
    pub json: bool,

    #[arg(long, help = "Log phase timings")]
    pub monitor: bool,

    #[arg(long, help = "Emit JSON log lines")]
    pub json_logs: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// Loads `--config` (if any) and lays command line flags over it.
    pub fn load(&self) -> Result<HarnessConfig> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::from_file(path)?,
            None => HarnessConfig::default(),
        };

        if let Some(endpoint) = &self.endpoint {
            config.connection.endpoint = Some(endpoint.clone());
        }
        if let Some(image) = &self.image {
            config.container.image = Some(image.clone());
        }
        if let Some(tag) = &self.tag {
            config.container.tag = Some(tag.clone());
        }
        if let Some(bootstrap) = &self.bootstrap {
            config.container.bootstrap_path = Some(bootstrap.clone());
        }
        if let Some(token) = &self.token {
            config.connection.token = Some(token.clone());
        }
        if let Some(secs) = self.ready_timeout_secs {
            config.connection.ready_timeout_secs = Some(secs);
        }
        if !self.only.is_empty() {
            config.scenarios.only = Some(self.only.clone());
        }
        if self.monitor {
            config.monitoring = Some(MonitoringConfig { enabled: true });
        }

        Ok(config)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        self.load()?.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::harness::Target;
    use crate::core::scenarios::Scenario;

    #[test]
    fn test_flags_override_defaults() {
        let cli = CliConfig::parse_from([
            "spicedb-harness",
            "--endpoint",
            "http://localhost:50051",
            "--token",
            "somerandomkeyhere",
            "--only",
            "check_bootstrap_permission,check_missing_permission",
        ]);

        let settings = cli.load().unwrap().to_settings().unwrap();
        assert!(matches!(settings.target, Target::Endpoint(_)));
        assert!(settings.token.is_some());
        assert_eq!(
            settings.scenarios,
            vec![
                Scenario::CheckBootstrapPermission,
                Scenario::CheckMissingPermission
            ]
        );
    }

    #[test]
    fn test_defaults_start_a_container() {
        let cli = CliConfig::parse_from(["spicedb-harness"]);
        assert!(cli.validate().is_ok());
        let settings = cli.load().unwrap().to_settings().unwrap();
        assert!(matches!(settings.target, Target::Container(_)));
    }

    #[test]
    fn test_invalid_flag_value_fails_validation() {
        let cli = CliConfig::parse_from(["spicedb-harness", "--endpoint", "not a url"]);
        assert!(cli.validate().is_err());
    }
}
