//! Error types for ztna-client.

use thiserror::Error;

/// Main error type for ztna-client operations.
#[derive(Error, Debug)]
pub enum ZtnaClientError {
    /// Credential was empty or missing; no network call is made.
    #[error("invalid credential: empty or missing")]
    InvalidCredential,

    /// The policy engine denied the connection attempt.
    ///
    /// Terminal for the attempt; the reason and risk score are surfaced
    /// verbatim and no automatic retry happens.
    #[error("access denied by policy: {reason} (risk score {risk_score})")]
    PolicyDenied { reason: String, risk_score: u32 },

    /// The gateway answered with an unexpected status code.
    #[error("gateway error {status}: {message}")]
    Gateway { status: u16, message: String },

    /// Network, timeout, or protocol failure talking to the gateway.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error from durable storage or signal handling.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid state transition attempted.
    #[error("invalid state transition from {from:?} to {to:?}")]
    InvalidStateTransition {
        from: crate::session::SessionState,
        to: crate::session::SessionState,
    },

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,

    /// The teardown guard was armed a second time.
    #[error("unload guard already armed")]
    GuardAlreadyArmed,

    /// The scheduler command channel is gone.
    #[error("scheduler channel closed")]
    ChannelClosed,
}

/// Convenience Result type for ztna-client operations.
pub type Result<T> = std::result::Result<T, ZtnaClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_denied_display() {
        let err = ZtnaClientError::PolicyDenied {
            reason: "High risk score".into(),
            risk_score: 88,
        };
        assert!(err.to_string().contains("High risk score"));
        assert!(err.to_string().contains("88"));
    }

    #[test]
    fn test_gateway_display() {
        let err = ZtnaClientError::Gateway {
            status: 502,
            message: "bad gateway".into(),
        };
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("bad gateway"));
    }

    #[test]
    fn test_invalid_credential_display() {
        let err = ZtnaClientError::InvalidCredential;
        assert!(err.to_string().contains("credential"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ZtnaClientError = io_err.into();
        assert!(matches!(err, ZtnaClientError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = ZtnaClientError::InvalidStateTransition {
            from: crate::session::SessionState::Disconnected,
            to: crate::session::SessionState::Active,
        };
        assert!(err.to_string().contains("Disconnected"));
        assert!(err.to_string().contains("Active"));
    }
}
