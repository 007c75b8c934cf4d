//! Connection lifecycle controller.
//!
//! Single writer of the session state machine. Every transition the
//! session record ever makes goes through one of the four operations
//! here; other components read the store or enqueue requests through
//! the scheduler.

use std::sync::Arc;
use std::time::SystemTime;

use crate::activity::ActivityLog;
use crate::context::ClientContext;
use crate::error::ZtnaClientError;
use crate::gateway::{
    ConnectOutcome, ConnectRequest, ConnectResponse, GatewayClient, RemoteState, RouteEntry,
    StatusResponse,
};
use crate::session::{ConnectionIdStore, PolicyDenial, Session, SessionState, SessionStore};
use crate::Result;

/// Orchestrates connect / disconnect / status / routes against the
/// gateway and owns all session state transitions.
pub struct ConnectionController {
    store: Arc<SessionStore>,
    log: Arc<ActivityLog>,
    gateway: GatewayClient,
    persist: ConnectionIdStore,
}

impl ConnectionController {
    pub fn new(
        store: Arc<SessionStore>,
        log: Arc<ActivityLog>,
        gateway: GatewayClient,
        persist: ConnectionIdStore,
    ) -> Self {
        Self {
            store,
            log,
            gateway,
            persist,
        }
    }

    /// Establish a tunnel session.
    ///
    /// A 409 conflict is resolved by adopting the already-live session;
    /// a 403 denial leaves the session disconnected with the verdict
    /// recorded verbatim. Transport failures are retryable by the user;
    /// nothing here retries automatically.
    pub async fn connect(&self, credential: &str, context: &ClientContext) -> Result<Session> {
        if credential.trim().is_empty() {
            self.log.warn("connect rejected: credential is empty");
            return Err(ZtnaClientError::InvalidCredential);
        }

        let current = self.store.get()?;
        if current.state.holds_connection() {
            // Conflict resolution favors the live session locally too.
            self.log
                .info("connect requested but a session is already tracked");
            return Ok(current);
        }

        let request = ConnectRequest {
            credential: credential.to_string(),
            client_address: context.client_address.clone(),
            device: context.device.clone(),
            location: context.location.clone(),
        };

        match self.gateway.connect(&request).await {
            Ok(ConnectOutcome::Established(body)) => self.adopt(body, false),
            Ok(ConnectOutcome::Adopted(body)) => self.adopt(body, true),
            Ok(ConnectOutcome::Denied { reason, risk_score }) => {
                self.store.update(|s| {
                    s.denial = Some(PolicyDenial {
                        reason: reason.clone(),
                        risk_score,
                    });
                })?;
                self.log.warn(format!(
                    "connection denied by policy: {} (risk score {})",
                    reason, risk_score
                ));
                Err(ZtnaClientError::PolicyDenied { reason, risk_score })
            }
            Err(e) => {
                // Watchers see the failed attempt, then the settled state.
                self.store.update(|s| s.reset(SessionState::Error))?;
                self.store.update(|s| s.reset(SessionState::Disconnected))?;
                self.log.error(format!("connection attempt failed: {}", e));
                Err(e)
            }
        }
    }

    /// Take ownership of an established or adopted connection.
    fn adopt(&self, body: ConnectResponse, existing: bool) -> Result<Session> {
        let id = body.connection_id.clone();

        // The id lands together with Connecting so every published
        // snapshot keeps the id/state invariant.
        self.store.try_update(|s| {
            s.state.transition_to(SessionState::Connecting)?;
            s.connection_id = Some(id.clone());
            Ok(())
        })?;
        self.store.try_update(|s| {
            s.state.transition_to(SessionState::Active)?;
            s.vpn_address = body.vpn_address.clone();
            s.real_client_address = body.real_client_address.clone();
            s.mode = body.mode;
            s.established_at = Some(SystemTime::now());
            s.denial = None;
            Ok(())
        })?;
        self.persist.save(&id)?;

        if existing {
            self.log
                .info(format!("adopted existing connection {}", id));
        } else {
            let mode = body
                .mode
                .map(|m| m.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            self.log
                .info(format!("tunnel established: {} (mode {})", id, mode));
        }
        self.store.get()
    }

    /// Release the session.
    ///
    /// Idempotent: with no connection id known locally or in durable
    /// storage this is a no-op that logs one warning. The gateway
    /// release is best effort; local cleanup never waits on the server
    /// acknowledging.
    pub async fn disconnect(&self, reason: &str) -> Result<()> {
        let id = match self.store.connection_id()? {
            Some(id) => Some(id),
            None => self.persist.load()?,
        };
        let Some(id) = id else {
            self.log.warn(format!(
                "disconnect requested ({}) but no connection is tracked",
                reason
            ));
            return Ok(());
        };

        match self.gateway.disconnect(&id).await {
            Ok(()) => self.log.info(format!("disconnected {}: {}", id, reason)),
            Err(e) => self.log.warn(format!(
                "release of {} not acknowledged ({}); clearing local state",
                id, e
            )),
        }

        self.store.update(|s| s.reset(SessionState::Disconnected))?;
        self.persist.clear()?;
        Ok(())
    }

    /// Poll the gateway for the remote state of the known connection.
    ///
    /// Self-healing: a remotely terminated or disconnected session is
    /// cleared locally so the client never shows a session the server
    /// no longer recognizes. Returns `Ok(None)` when no connection id
    /// is known anywhere.
    pub async fn status(&self) -> Result<Option<StatusResponse>> {
        let id = match self.store.connection_id()? {
            Some(id) => id,
            None => match self.persist.load()? {
                Some(id) => {
                    // A session from before a restart; track it as
                    // connecting until the gateway confirms.
                    self.store.try_update(|s| {
                        s.state.transition_to(SessionState::Connecting)?;
                        s.connection_id = Some(id.clone());
                        Ok(())
                    })?;
                    self.log
                        .info(format!("rediscovered persisted connection {}", id));
                    id
                }
                None => return Ok(None),
            },
        };

        let status = match self.gateway.status(&id).await {
            Ok(status) => status,
            Err(e) => {
                // Leave local state alone; the next poll reconciles.
                self.log
                    .warn(format!("status poll for {} failed: {}", id, e));
                return Err(e);
            }
        };

        match status.state {
            RemoteState::Active => {
                self.store.try_update(|s| {
                    if s.state == SessionState::Connecting {
                        s.state.transition_to(SessionState::Active)?;
                        if s.established_at.is_none() {
                            s.established_at = Some(SystemTime::now());
                        }
                    }
                    if status.vpn_address.is_some() {
                        s.vpn_address = status.vpn_address.clone();
                    }
                    if let Some(score) = status.last_risk_score {
                        s.last_risk_score = Some(score);
                    }
                    if status.last_auth.is_some() {
                        s.last_auth_at = Some(SystemTime::now());
                    }
                    Ok(())
                })?;
            }
            RemoteState::Terminated => {
                let reason = status
                    .reason
                    .clone()
                    .unwrap_or_else(|| "terminated by gateway".to_string());
                self.log
                    .warn(format!("session {} terminated remotely: {}", id, reason));
                self.store.update(|s| s.reset(SessionState::Terminated))?;
                self.persist.clear()?;
            }
            RemoteState::Disconnected => {
                let reason = status
                    .reason
                    .clone()
                    .unwrap_or_else(|| "disconnected".to_string());
                self.log.info(format!(
                    "session {} no longer tracked by gateway: {}",
                    id, reason
                ));
                self.store.update(|s| s.reset(SessionState::Disconnected))?;
                self.persist.clear()?;
            }
            RemoteState::Unknown => {
                self.log
                    .warn(format!("gateway reported unrecognized state for {}", id));
            }
        }

        Ok(Some(status))
    }

    /// Fetch the routing table for the active session.
    ///
    /// Purely informational: never mutates session state, and an error
    /// is logged rather than surfaced.
    pub async fn routes(&self) -> Result<Vec<RouteEntry>> {
        let Some(id) = self.store.connection_id()? else {
            return Ok(Vec::new());
        };

        match self.gateway.routes(&id).await {
            Ok(body) => Ok(body.routes),
            Err(e) => {
                self.log
                    .warn(format!("route fetch for {} failed: {}", id, e));
                Ok(Vec::new())
            }
        }
    }
}
