//! Gateway control-plane request and response types.

use serde::{Deserialize, Serialize};

use crate::context::{DeviceInfo, LocationInfo};

/// Connection mode as reported by the gateway.
///
/// Fallback means the gateway accepted the session but could not use the
/// primary tunnel transport. The true mode is kept; display layers may
/// choose their own wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMode {
    Tunnel,
    Fallback,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionMode::Tunnel => write!(f, "tunnel"),
            ConnectionMode::Fallback => write!(f, "fallback"),
            ConnectionMode::Unknown => write!(f, "unknown"),
        }
    }
}

/// Request to establish a tunnel session.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectRequest {
    /// Access token produced by the login flow.
    pub credential: String,
    /// The client's network address as seen from outside.
    pub client_address: String,
    pub device: DeviceInfo,
    pub location: LocationInfo,
}

/// Successful establishment, and the shape of an adopted existing
/// connection inside a 409 conflict.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectResponse {
    pub connection_id: String,
    #[serde(default)]
    pub vpn_address: Option<String>,
    #[serde(default)]
    pub real_client_address: Option<String>,
    #[serde(default)]
    pub mode: Option<ConnectionMode>,
}

/// 409 body: the gateway already tracks a live session for this user.
#[derive(Debug, Clone, Deserialize)]
pub struct ConflictResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub existing_connection: ConnectResponse,
}

/// 403 body: the policy engine refused admission.
#[derive(Debug, Clone, Deserialize)]
pub struct DenialResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub risk_score: Option<u32>,
}

/// Generic error body for unexpected statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
}

/// Request to release a tracked session.
#[derive(Debug, Clone, Serialize)]
pub struct DisconnectRequest {
    pub connection_id: String,
}

/// Remote lifecycle state as the gateway reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteState {
    Active,
    Disconnected,
    Terminated,
    #[serde(other)]
    Unknown,
}

/// Status poll response; terminated sessions arrive with a 403 but the
/// same body shape.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub state: RemoteState,
    #[serde(default)]
    pub vpn_address: Option<String>,
    #[serde(default)]
    pub established_at: Option<String>,
    #[serde(default)]
    pub last_auth: Option<String>,
    #[serde(default)]
    pub last_risk_score: Option<u32>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub terminated_at: Option<String>,
    #[serde(default)]
    pub disconnected_at: Option<String>,
}

/// One entry of the session routing table.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteEntry {
    pub destination: String,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub interface: Option<String>,
}

/// Routing table for the active session.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutesResponse {
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
}

/// Summary of one tracked connection, as listed by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionSummary {
    pub connection_id: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub vpn_address: Option<String>,
    #[serde(default)]
    pub connected_at: Option<String>,
}

/// Response of the connection listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionsResponse {
    #[serde(default)]
    pub connections: Vec<ConnectionSummary>,
    #[serde(default)]
    pub count: u64,
}

/// Gateway health report.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub active_sessions: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}
