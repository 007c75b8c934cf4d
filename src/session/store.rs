//! Session record and shared storage.

use std::sync::RwLock;
use std::time::SystemTime;

use tokio::sync::watch;

use super::SessionState;
use crate::error::ZtnaClientError;
use crate::gateway::ConnectionMode;
use crate::Result;

/// The last policy denial, kept verbatim for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDenial {
    pub reason: String,
    pub risk_score: u32,
}

/// The local view of one control-plane connection to the gateway.
///
/// There is exactly one of these per client context; it is created
/// disconnected at startup and mutated by the controller on every
/// network response.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Opaque identifier issued by the gateway; `None` when disconnected.
    pub connection_id: Option<String>,
    /// Address assigned inside the tunnel.
    pub vpn_address: Option<String>,
    /// The client's address as the gateway saw it.
    pub real_client_address: Option<String>,
    /// Connection mode as reported by the gateway, unnormalized.
    pub mode: Option<ConnectionMode>,
    /// When the session was established or adopted.
    pub established_at: Option<SystemTime>,
    /// Last successful continuous-auth check.
    pub last_auth_at: Option<SystemTime>,
    /// Risk score from the most recent auth or status poll.
    pub last_risk_score: Option<u32>,
    /// Last policy denial, if the previous attempt was refused.
    pub denial: Option<PolicyDenial>,
    /// Current lifecycle state.
    pub state: SessionState,
}

impl Session {
    /// A fresh, disconnected session record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the invariant between state and connection id holds.
    pub fn invariant_holds(&self) -> bool {
        self.connection_id.is_some() == self.state.holds_connection()
    }

    /// Drop all connection-scoped fields and force `state`.
    ///
    /// Used by the controller for reconciliation paths (local disconnect,
    /// remote termination, failed attempts) where the target state is the
    /// ground truth regardless of the previous one.
    pub fn reset(&mut self, state: SessionState) {
        debug_assert!(!state.holds_connection());
        self.connection_id = None;
        self.vpn_address = None;
        self.real_client_address = None;
        self.mode = None;
        self.established_at = None;
        self.state = state;
    }
}

/// Shared storage for the single session record.
///
/// Storage and change notification only; all state transitions are
/// driven by the controller.
pub struct SessionStore {
    session: RwLock<Session>,
    notify: watch::Sender<()>,
}

impl SessionStore {
    /// Create a store holding a disconnected session.
    pub fn new() -> Self {
        let (notify, _) = watch::channel(());
        Self {
            session: RwLock::new(Session::new()),
            notify,
        }
    }

    /// Get a clone of the current session.
    pub fn get(&self) -> Result<Session> {
        let session = self
            .session
            .read()
            .map_err(|_| ZtnaClientError::LockPoisoned)?;
        Ok(session.clone())
    }

    /// Current connection id, if any.
    pub fn connection_id(&self) -> Result<Option<String>> {
        let session = self
            .session
            .read()
            .map_err(|_| ZtnaClientError::LockPoisoned)?;
        Ok(session.connection_id.clone())
    }

    /// Update the session using a closure, then notify watchers.
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Session),
    {
        {
            let mut session = self
                .session
                .write()
                .map_err(|_| ZtnaClientError::LockPoisoned)?;
            f(&mut session);
        }
        let _ = self.notify.send(());
        Ok(())
    }

    /// Update the session using a fallible closure.
    ///
    /// The closure's error is propagated; watchers are notified only on
    /// success.
    pub fn try_update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Session) -> Result<()>,
    {
        {
            let mut session = self
                .session
                .write()
                .map_err(|_| ZtnaClientError::LockPoisoned)?;
            f(&mut session)?;
        }
        let _ = self.notify.send(());
        Ok(())
    }

    /// Reset the session to a disconnected record.
    pub fn clear(&self) -> Result<()> {
        self.update(|s| *s = Session::new())
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> watch::Receiver<()> {
        self.notify.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
