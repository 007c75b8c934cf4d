//! Client interface to the external policy engine.
//!
//! Only the continuous-auth endpoint is spoken here; admission decisions
//! ride on the gateway's connect response and the engine's internals are
//! out of scope.

use std::time::Duration;

use serde::Deserialize;

use crate::context::ClientContext;
use crate::error::ZtnaClientError;
use crate::Result;

/// Verdict returned by a continuous-auth check.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthVerdict {
    /// Engine decision, e.g. "ALLOW", "MFA_REQUIRED", "DENY".
    pub decision: String,
    #[serde(default)]
    pub risk_score: u32,
}

/// Client for the policy engine's continuous-auth endpoint.
#[derive(Debug, Clone)]
pub struct PolicyClient {
    http: reqwest::Client,
    base_url: String,
}

impl PolicyClient {
    /// Build a client against `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Resubmit the current client context for re-evaluation.
    pub async fn continuous_auth(&self, context: &ClientContext) -> Result<AuthVerdict> {
        let response = self
            .http
            .post(format!("{}/api/policy/continuous-auth", self.base_url))
            .json(context)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status == 200 {
            Ok(response.json().await?)
        } else {
            Err(ZtnaClientError::Gateway {
                status,
                message: "continuous auth rejected".to_string(),
            })
        }
    }
}
