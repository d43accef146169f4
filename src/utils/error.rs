use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("gRPC call failed: {0}")]
    RpcError(#[from] tonic::Status),

    #[error("gRPC transport error: {0}")]
    TransportError(#[from] tonic::transport::Error),

    #[error("Container error: {0}")]
    ContainerError(#[from] testcontainers::TestcontainersError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid relationship '{input}': {reason}")]
    RelationshipParseError { input: String, reason: String },

    #[error("Service at {endpoint} was not ready after {waited_ms}ms: {last_error}")]
    ReadinessTimeout {
        endpoint: String,
        waited_ms: u128,
        last_error: String,
    },

    #[error("Expected the call to fail, but it succeeded")]
    ExpectedError,

    #[error("Unable to extract a gRPC status from error: {message}")]
    NoStatus { message: String },

    #[error("Status has no details: {status}")]
    NoErrorDetails { status: String },

    #[error("Detail elements present but the first is not ErrorInfo. Actual: {details}")]
    DetailNotErrorInfo { details: String },

    #[error("Expected error reason '{expected}', got '{actual}'")]
    UnexpectedReason { expected: String, actual: String },

    #[error("Expected status code {expected:?}, got {actual:?}")]
    UnexpectedCode {
        expected: tonic::Code,
        actual: tonic::Code,
    },

    #[error("Expected permissionship {expected}, got {actual}")]
    UnexpectedPermissionship { expected: String, actual: String },

    #[error("Assertion failed: {message}")]
    AssertionFailed { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Infrastructure,
    Network,
    Assertion,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl HarnessError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            HarnessError::ConfigError { .. }
            | HarnessError::ConfigValidationError { .. }
            | HarnessError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            HarnessError::ContainerError(_) | HarnessError::IoError(_) => {
                ErrorCategory::Infrastructure
            }
            HarnessError::RpcError(_)
            | HarnessError::TransportError(_)
            | HarnessError::ReadinessTimeout { .. } => ErrorCategory::Network,
            HarnessError::RelationshipParseError { .. }
            | HarnessError::SerializationError(_) => ErrorCategory::Data,
            HarnessError::ExpectedError
            | HarnessError::NoStatus { .. }
            | HarnessError::NoErrorDetails { .. }
            | HarnessError::DetailNotErrorInfo { .. }
            | HarnessError::UnexpectedReason { .. }
            | HarnessError::UnexpectedCode { .. }
            | HarnessError::UnexpectedPermissionship { .. }
            | HarnessError::AssertionFailed { .. } => ErrorCategory::Assertion,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Assertion | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Infrastructure => {
                ErrorSeverity::Critical
            }
        }
    }

    /// Assertion failures are test verdicts, not infrastructure problems.
    pub fn is_assertion_failure(&self) -> bool {
        self.category() == ErrorCategory::Assertion
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Infrastructure => format!("Could not manage the SpiceDB container: {}", self),
            ErrorCategory::Network => format!("Could not talk to SpiceDB: {}", self),
            ErrorCategory::Assertion => format!("Scenario assertion failed: {}", self),
            ErrorCategory::Data => format!("Invalid data: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            HarnessError::ContainerError(_) => {
                "Make sure Docker is running and the current user can reach the Docker socket"
            }
            HarnessError::IoError(_) => "Check that the bootstrap file exists and is readable",
            HarnessError::ReadinessTimeout { .. } => {
                "Increase ready_timeout_secs or check the container logs"
            }
            HarnessError::TransportError(_) | HarnessError::RpcError(_) => {
                "Check the endpoint address and that the service is serving gRPC on it"
            }
            HarnessError::ConfigError { .. }
            | HarnessError::ConfigValidationError { .. }
            | HarnessError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command line flags and retry"
            }
            HarnessError::RelationshipParseError { .. } => {
                "Use the form resource_type:id#relation@subject_type:id[#relation]"
            }
            HarnessError::SerializationError(_) => "Report this as a bug",
            _ => "Inspect the scenario output; the service response did not match expectations",
        }
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assertion_errors_are_high_severity() {
        let err = HarnessError::NoErrorDetails {
            status: "status: AlreadyExists".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Assertion);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.is_assertion_failure());
    }

    #[test]
    fn test_config_errors_are_critical() {
        let err = HarnessError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: "expected `=`".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().starts_with("Configuration problem"));
    }

    #[test]
    fn test_rpc_status_converts() {
        let err: HarnessError = tonic::Status::unavailable("connection refused").into();
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_severity_tracks_exit_code_classes() {
        let timeout = HarnessError::ReadinessTimeout {
            endpoint: "http://localhost:50051".to_string(),
            waited_ms: 60_000,
            last_error: "connection refused".to_string(),
        };
        assert_eq!(timeout.severity(), ErrorSeverity::Medium);

        let io: HarnessError = std::io::Error::new(std::io::ErrorKind::NotFound, "bootstrap").into();
        assert_eq!(io.severity(), ErrorSeverity::Critical);
        assert!(ErrorSeverity::Medium < ErrorSeverity::High);
        assert!(ErrorSeverity::High < ErrorSeverity::Critical);
    }
}
