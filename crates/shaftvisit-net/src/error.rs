use thiserror::Error;

/// Errors produced by remote writes.
///
/// Every variant is recoverable: the caller queues the record and retries
/// later, surfacing the underlying message to the user.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Transport-level failure (connection refused, DNS, timeout).
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("Server responded with status {status}")]
    Status { status: u16 },
}

impl GatewayError {
    /// Whether the failure was the bounded request timeout firing.
    pub fn is_timeout(&self) -> bool {
        matches!(self, GatewayError::Transport(e) if e.is_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_rejection_is_not_a_timeout() {
        let err = GatewayError::Status { status: 503 };
        assert!(!err.is_timeout());
        assert_eq!(err.to_string(), "Server responded with status 503");
    }
}
