use crate::adapters::container::{DEFAULT_GRPC_PORT, DEFAULT_IMAGE, DEFAULT_TAG};
use crate::adapters::{BearerAuth, BearerToken, ConnectOptions, ContainerSettings};
use crate::core::harness::{ReadinessSettings, SuiteSettings, Target};
use crate::core::scenarios::Scenario;
use crate::utils::error::{HarnessError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    #[serde(default)]
    pub container: ContainerConfig,
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub scenarios: ScenarioSelection,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerConfig {
    pub image: Option<String>,
    pub tag: Option<String>,
    pub bootstrap_path: Option<String>,
    pub grpc_port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// When set, no container is started.
    pub endpoint: Option<String>,
    /// Pre-shared key; a fresh one is generated per connection when absent.
    pub token: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub ready_timeout_secs: Option<u64>,
    pub ready_poll_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioSelection {
    pub only: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

/// `${VAR}` left in place by substitution counts as unset, as does an empty string.
fn resolved(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.contains("${"))
}

impl HarnessConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(HarnessError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| HarnessError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SPICEDB_ENDPOINT})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| HarnessError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        match self.endpoint() {
            Some(endpoint) => validation::validate_url("connection.endpoint", endpoint)?,
            None => {
                validation::validate_non_empty_string("container.image", self.image())?;
                validation::validate_non_empty_string("container.tag", self.tag())?;
                let bootstrap = self.bootstrap_path();
                let bootstrap = bootstrap.to_string_lossy();
                validation::validate_path("container.bootstrap_path", &bootstrap)?;
                validation::validate_file_extension(
                    "container.bootstrap_path",
                    &bootstrap,
                    &["yaml", "yml"],
                )?;
                validation::validate_positive_number(
                    "container.grpc_port",
                    u64::from(self.grpc_port()),
                    1,
                )?;
            }
        }

        if let Some(token) = self.token() {
            if self.endpoint().is_none() {
                return Err(HarnessError::ConfigValidationError {
                    field: "connection.token".to_string(),
                    message: "a pre-shared token needs connection.endpoint; started containers get a fresh token per connection".to_string(),
                });
            }
            BearerAuth::new(&token)?;
        }

        validation::validate_range(
            "connection.connect_timeout_secs",
            self.connect_timeout().as_secs(),
            1,
            300,
        )?;
        validation::validate_range(
            "connection.ready_timeout_secs",
            self.ready_timeout().as_secs(),
            1,
            600,
        )?;
        validation::validate_range(
            "connection.ready_poll_interval_ms",
            self.ready_poll_interval().as_millis() as u64,
            10,
            60_000,
        )?;
        if let Some(secs) = self.connection.request_timeout_secs {
            validation::validate_positive_number("connection.request_timeout_secs", secs, 1)?;
        }

        self.selected_scenarios()?;

        Ok(())
    }

    pub fn endpoint(&self) -> Option<&str> {
        resolved(&self.connection.endpoint)
    }

    pub fn token(&self) -> Option<BearerToken> {
        resolved(&self.connection.token).map(BearerToken::new)
    }

    pub fn image(&self) -> &str {
        resolved(&self.container.image).unwrap_or(DEFAULT_IMAGE)
    }

    pub fn tag(&self) -> &str {
        resolved(&self.container.tag).unwrap_or(DEFAULT_TAG)
    }

    pub fn bootstrap_path(&self) -> PathBuf {
        resolved(&self.container.bootstrap_path)
            .map(PathBuf::from)
            .unwrap_or_else(|| ContainerSettings::default().bootstrap_path)
    }

    pub fn grpc_port(&self) -> u16 {
        self.container.grpc_port.unwrap_or(DEFAULT_GRPC_PORT)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connection.connect_timeout_secs.unwrap_or(10))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        Some(Duration::from_secs(
            self.connection.request_timeout_secs.unwrap_or(30),
        ))
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.connection.ready_timeout_secs.unwrap_or(60))
    }

    pub fn ready_poll_interval(&self) -> Duration {
        Duration::from_millis(self.connection.ready_poll_interval_ms.unwrap_or(500))
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    /// All scenarios unless `[scenarios] only` narrows them; unknown names are an error.
    pub fn selected_scenarios(&self) -> Result<Vec<Scenario>> {
        match &self.scenarios.only {
            None => Ok(Scenario::ALL.to_vec()),
            Some(names) if names.is_empty() => Err(HarnessError::InvalidConfigValueError {
                field: "scenarios.only".to_string(),
                value: "[]".to_string(),
                reason: "At least one scenario must be selected".to_string(),
            }),
            Some(names) => names
                .iter()
                .map(|name| {
                    Scenario::from_name(name).ok_or_else(|| {
                        HarnessError::InvalidConfigValueError {
                            field: "scenarios.only".to_string(),
                            value: name.clone(),
                            reason: format!(
                                "Unknown scenario. Known scenarios: {}",
                                Scenario::ALL
                                    .iter()
                                    .map(|s| s.name())
                                    .collect::<Vec<_>>()
                                    .join(", ")
                            ),
                        }
                    })
                })
                .collect(),
        }
    }

    pub fn to_settings(&self) -> Result<SuiteSettings> {
        self.validate_config()?;

        let target = match self.endpoint() {
            Some(endpoint) => Target::Endpoint(endpoint.to_string()),
            None => Target::Container(ContainerSettings {
                image: self.image().to_string(),
                tag: self.tag().to_string(),
                bootstrap_path: self.bootstrap_path(),
                grpc_port: self.grpc_port(),
            }),
        };

        Ok(SuiteSettings {
            target,
            token: self.token(),
            connect: ConnectOptions {
                connect_timeout: self.connect_timeout(),
                request_timeout: self.request_timeout(),
            },
            readiness: ReadinessSettings {
                timeout: self.ready_timeout(),
                poll_interval: self.ready_poll_interval(),
            },
            scenarios: self.selected_scenarios()?,
            monitor: self.monitoring_enabled(),
        })
    }
}

impl Validate for HarnessConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
