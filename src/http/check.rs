//! Client side of the status endpoint, used by the `healthcheck` binary.

use std::time::Duration;
use thiserror::Error;

use crate::http::server::{StatusResponse, RUNNING_STATUS};
use crate::lifecycle::FAILURE_EXIT_CODE;

/// Why the status endpoint could not be read.
#[derive(Debug, Error)]
pub enum StatusCheckError {
    /// Connect, timeout or body decoding failure.
    #[error("Status request failed")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("Status endpoint returned {0}")]
    Status(reqwest::StatusCode),
}

/// Fetch and decode the status payload at `url`.
///
/// Proxy settings from the environment are ignored; the endpoint is local.
pub async fn check_status(url: &str, timeout: Duration) -> Result<StatusResponse, StatusCheckError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .no_proxy()
        .build()?;
    let res = client.get(url).send().await?;

    let status = res.status();
    if !status.is_success() {
        return Err(StatusCheckError::Status(status));
    }

    Ok(res.json().await?)
}

/// Exit code for a check: 0 only when the host reports it is running.
pub fn exit_code(result: &Result<StatusResponse, StatusCheckError>) -> i32 {
    match result {
        Ok(status) if status.status == RUNNING_STATUS => 0,
        _ => FAILURE_EXIT_CODE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_running_status_exits_zero() {
        let running = Ok(StatusResponse {
            status: RUNNING_STATUS.to_string(),
        });
        let starting = Ok(StatusResponse {
            status: "starting".to_string(),
        });
        let refused = Err(StatusCheckError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE));

        assert_eq!(exit_code(&running), 0);
        assert_eq!(exit_code(&starting), FAILURE_EXIT_CODE);
        assert_eq!(exit_code(&refused), FAILURE_EXIT_CODE);
    }
}
