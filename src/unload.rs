//! Best-effort session teardown at process exit.
//!
//! When the process is going away there is no time to wait for the
//! gateway to acknowledge a release. The guard resolves the connection
//! id from memory or durable storage, clears the persisted id
//! optimistically, and dispatches the release as a detached task with
//! at most one retry. The attempt is guaranteed; confirmation is not.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::activity::ActivityLog;
use crate::error::ZtnaClientError;
use crate::gateway::GatewayClient;
use crate::session::{ConnectionIdStore, SessionStore};
use crate::Result;

/// One-shot teardown hook for process exit.
pub struct UnloadGuard {
    store: Arc<SessionStore>,
    persist: ConnectionIdStore,
    gateway: GatewayClient,
    log: Arc<ActivityLog>,
    armed: AtomicBool,
}

impl UnloadGuard {
    pub fn new(
        store: Arc<SessionStore>,
        persist: ConnectionIdStore,
        gateway: GatewayClient,
        log: Arc<ActivityLog>,
    ) -> Self {
        Self {
            store,
            persist,
            gateway,
            log,
            armed: AtomicBool::new(false),
        }
    }

    /// Register the hook. Exactly one registration is allowed.
    pub fn arm(&self) -> Result<()> {
        if self.armed.swap(true, Ordering::SeqCst) {
            return Err(ZtnaClientError::GuardAlreadyArmed);
        }
        self.log.info("teardown guard armed");
        Ok(())
    }

    /// Fire the teardown.
    ///
    /// Returns the handle of the detached release task, or `None` when
    /// no session was tracked. Callers exiting immediately may drop the
    /// handle; awaiting it briefly is the polite option.
    pub fn fire(&self) -> Option<JoinHandle<()>> {
        let id = self
            .store
            .get()
            .ok()
            .and_then(|s| s.connection_id)
            .or_else(|| self.persist.load().ok().flatten());

        let Some(id) = id else {
            self.log.info("shutdown: no active session to release");
            return None;
        };

        // Optimistic: the persisted id goes away even though the remote
        // release may not complete.
        if let Err(e) = self.persist.clear() {
            self.log
                .warn(format!("shutdown: persisted id not cleared: {}", e));
        }

        self.log.info(format!(
            "shutdown: dispatching best-effort release for {}",
            id
        ));

        let gateway = self.gateway.clone();
        Some(tokio::spawn(async move {
            if gateway.disconnect(&id).await.is_err() {
                // One retry, then give up silently
                let _ = gateway.disconnect(&id).await;
            }
        }))
    }
}
