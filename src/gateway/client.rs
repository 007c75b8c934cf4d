//! HTTP client for the gateway control plane.

use std::time::Duration;

use super::types::{
    ConflictResponse, ConnectRequest, ConnectResponse, ConnectionsResponse, DenialResponse,
    DisconnectRequest, ErrorResponse, HealthResponse, RoutesResponse, StatusResponse,
};
use crate::error::ZtnaClientError;
use crate::Result;

/// Outcome of an establish request, with conflict resolved in favor of
/// the already-live session.
#[derive(Debug, Clone)]
pub enum ConnectOutcome {
    /// The gateway created a new session.
    Established(ConnectResponse),
    /// The gateway already tracked one; the client adopts it.
    Adopted(ConnectResponse),
    /// The policy engine refused admission.
    Denied { reason: String, risk_score: u32 },
}

/// Client for the gateway's JSON-over-HTTPS control plane.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    /// Build a client against `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send an establish request and classify the gateway's answer.
    ///
    /// 409 conflicts are not errors: the embedded existing connection is
    /// returned for adoption. 403 denials carry the policy verdict.
    pub async fn connect(&self, request: &ConnectRequest) -> Result<ConnectOutcome> {
        let response = self
            .http
            .post(self.url("/api/vpn/connect"))
            .json(request)
            .send()
            .await?;

        match response.status().as_u16() {
            200 => {
                let body: ConnectResponse = response.json().await?;
                Ok(ConnectOutcome::Established(body))
            }
            409 => {
                let body: ConflictResponse = response.json().await?;
                Ok(ConnectOutcome::Adopted(body.existing_connection))
            }
            403 => {
                let body: DenialResponse = response.json().await.unwrap_or(DenialResponse {
                    error: None,
                    reason: None,
                    risk_score: None,
                });
                Ok(ConnectOutcome::Denied {
                    reason: body
                        .reason
                        .or(body.error)
                        .unwrap_or_else(|| "access denied by policy".to_string()),
                    risk_score: body.risk_score.unwrap_or(0),
                })
            }
            status => Err(self.unexpected(status, response).await),
        }
    }

    /// Ask the gateway to release a session. Best effort: callers clear
    /// local state regardless of the result.
    pub async fn disconnect(&self, connection_id: &str) -> Result<()> {
        let request = DisconnectRequest {
            connection_id: connection_id.to_string(),
        };
        self.http
            .post(self.url("/api/vpn/disconnect"))
            .json(&request)
            .send()
            .await?;
        Ok(())
    }

    /// Poll the remote state of a known connection.
    ///
    /// Terminated sessions arrive as 403 with the same body shape, so
    /// both 200 and 403 decode into a [`StatusResponse`].
    pub async fn status(&self, connection_id: &str) -> Result<StatusResponse> {
        let response = self
            .http
            .get(self.url("/api/vpn/status"))
            .query(&[("connection_id", connection_id)])
            .send()
            .await?;

        match response.status().as_u16() {
            200 | 403 => Ok(response.json().await?),
            status => Err(self.unexpected(status, response).await),
        }
    }

    /// Fetch the routing table for a connection.
    pub async fn routes(&self, connection_id: &str) -> Result<RoutesResponse> {
        let response = self
            .http
            .get(self.url("/api/vpn/routes"))
            .query(&[("connection_id", connection_id)])
            .send()
            .await?;

        match response.status().as_u16() {
            200 => Ok(response.json().await?),
            status => Err(self.unexpected(status, response).await),
        }
    }

    /// List tracked connections, optionally filtered by user.
    pub async fn connections(&self, user: Option<&str>) -> Result<ConnectionsResponse> {
        let mut request = self.http.get(self.url("/api/vpn/connections"));
        if let Some(user) = user {
            request = request.query(&[("user", user)]);
        }
        let response = request.send().await?;

        match response.status().as_u16() {
            200 => Ok(response.json().await?),
            status => Err(self.unexpected(status, response).await),
        }
    }

    /// Gateway health check.
    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self.http.get(self.url("/health")).send().await?;
        match response.status().as_u16() {
            200 => Ok(response.json().await?),
            status => Err(self.unexpected(status, response).await),
        }
    }

    async fn unexpected(&self, status: u16, response: reqwest::Response) -> ZtnaClientError {
        let message = response
            .json::<ErrorResponse>()
            .await
            .ok()
            .and_then(|e| e.error)
            .unwrap_or_else(|| "unexpected gateway response".to_string());
        ZtnaClientError::Gateway { status, message }
    }
}
