//! Gateway control-plane client.
//!
//! Wire types and the HTTP client for the gateway's session endpoints:
//! connect, disconnect, status, routes, connection listing, and health.

mod client;
mod types;

pub use client::{ConnectOutcome, GatewayClient};
pub use types::{
    ConflictResponse, ConnectRequest, ConnectResponse, ConnectionMode, ConnectionSummary,
    ConnectionsResponse, DenialResponse, DisconnectRequest, ErrorResponse, HealthResponse,
    RemoteState, RouteEntry, RoutesResponse, StatusResponse,
};
