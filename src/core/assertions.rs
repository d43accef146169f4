use crate::domain::model::{CheckOutcome, DetailedError};
use crate::proto::rpc;
use crate::proto::v1::check_permission_response::Permissionship;
use crate::utils::error::{HarnessError, Result};
use prost::Message;
use std::error::Error;
use tonic::{Code, Status};

fn describe_status(status: &Status) -> String {
    format!("code: {:?}, message: {:?}", status.code(), status.message())
}

/// Requires the call to have failed with a status whose first detail is
/// `google.rpc.ErrorInfo`.
pub fn expect_detailed_error<T>(result: std::result::Result<T, Status>) -> Result<DetailedError> {
    match result {
        Ok(_) => Err(HarnessError::ExpectedError),
        Err(status) => detailed_error_from_status(&status),
    }
}

pub fn detailed_error_from_status(status: &Status) -> Result<DetailedError> {
    let decoded = rpc::Status::decode(status.details()).map_err(|e| {
        HarnessError::DetailNotErrorInfo {
            details: format!("undecodable details ({}) on {}", e, describe_status(status)),
        }
    })?;

    let first = match decoded.details.first() {
        Some(first) => first,
        None => {
            return Err(HarnessError::NoErrorDetails {
                status: describe_status(status),
            })
        }
    };

    if first.type_url != rpc::ERROR_INFO_TYPE_URL {
        let type_urls: Vec<&str> = decoded.details.iter().map(|d| d.type_url.as_str()).collect();
        return Err(HarnessError::DetailNotErrorInfo {
            details: format!("[{}]", type_urls.join(", ")),
        });
    }

    let info = rpc::ErrorInfo::decode(first.value.as_slice()).map_err(|e| {
        HarnessError::DetailNotErrorInfo {
            details: format!("{} did not decode: {}", first.type_url, e),
        }
    })?;

    tracing::info!("Got detailed info: {:?}", info);
    Ok(DetailedError {
        code: status.code(),
        message: status.message().to_string(),
        reason: info.reason,
        domain: info.domain,
        metadata: info.metadata,
    })
}

/// Finds a gRPC status anywhere in an error's source chain.
pub fn find_status<'a>(err: &'a (dyn Error + 'static)) -> Option<&'a Status> {
    let mut current: Option<&(dyn Error + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(status) = e.downcast_ref::<Status>() {
            return Some(status);
        }
        if let Some(HarnessError::RpcError(status)) = e.downcast_ref::<HarnessError>() {
            return Some(status);
        }
        current = e.source();
    }
    None
}

/// Same check as [`expect_detailed_error`] for errors that may not be a status.
pub fn expect_detailed_error_from(err: &(dyn Error + 'static)) -> Result<DetailedError> {
    match find_status(err) {
        Some(status) => detailed_error_from_status(status),
        None => Err(HarnessError::NoStatus {
            message: err.to_string(),
        }),
    }
}

pub fn expect_error_reason<T>(
    result: std::result::Result<T, Status>,
    reason: &str,
) -> Result<DetailedError> {
    let detailed = expect_detailed_error(result)?;
    if detailed.reason != reason {
        return Err(HarnessError::UnexpectedReason {
            expected: reason.to_string(),
            actual: detailed.reason,
        });
    }
    Ok(detailed)
}

pub fn expect_code(detailed: &DetailedError, expected: Code) -> Result<()> {
    if detailed.code != expected {
        return Err(HarnessError::UnexpectedCode {
            expected,
            actual: detailed.code,
        });
    }
    Ok(())
}

pub fn expect_permissionship(outcome: &CheckOutcome, expected: Permissionship) -> Result<()> {
    if outcome.permissionship != expected {
        return Err(HarnessError::UnexpectedPermissionship {
            expected: expected.as_str_name().to_string(),
            actual: outcome.permissionship.as_str_name().to_string(),
        });
    }
    Ok(())
}
