//! Continuous authentication poller.
//!
//! Zero trust treats login as the beginning, not the end: while the
//! process lives, the current device, location, and network context are
//! periodically resubmitted to the policy engine. The poller records
//! verdicts; it never tears sessions down itself.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::activity::ActivityLog;
use crate::context::ContextProvider;
use crate::policy::PolicyClient;
use crate::session::SessionStore;

/// Periodically re-evaluates the client context against the policy
/// engine.
pub struct ContinuousAuthPoller {
    policy: PolicyClient,
    provider: Arc<ContextProvider>,
    store: Arc<SessionStore>,
    log: Arc<ActivityLog>,
    interval: Duration,
}

impl ContinuousAuthPoller {
    pub fn new(
        policy: PolicyClient,
        provider: Arc<ContextProvider>,
        store: Arc<SessionStore>,
        log: Arc<ActivityLog>,
        interval: Duration,
    ) -> Self {
        Self {
            policy,
            provider,
            store,
            log,
            interval,
        }
    }

    /// Run forever: once immediately, then on the fixed interval.
    ///
    /// Polling is not gated on an active session; the engine sees the
    /// context even between sessions.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            self.poll_once().await;
        }
    }

    /// One re-evaluation round. Failures are logged and swallowed; the
    /// next round proceeds on schedule with no backoff.
    pub async fn poll_once(&self) {
        let context = match self.provider.snapshot() {
            Ok(context) => context,
            Err(e) => {
                self.log
                    .error(format!("continuous auth skipped: {}", e));
                return;
            }
        };

        match self.policy.continuous_auth(&context).await {
            Ok(verdict) => {
                let _ = self.store.update(|s| {
                    s.last_auth_at = Some(SystemTime::now());
                    s.last_risk_score = Some(verdict.risk_score);
                });
                self.log.info(format!(
                    "continuous auth: {} (risk score {})",
                    verdict.decision, verdict.risk_score
                ));
            }
            Err(e) => {
                self.log
                    .warn(format!("continuous auth failed: {}", e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::Severity;
    use crate::context::ClientContext;

    fn poller() -> (ContinuousAuthPoller, Arc<SessionStore>, Arc<ActivityLog>) {
        let store = Arc::new(SessionStore::new());
        let log = Arc::new(ActivityLog::default());
        // Unreachable endpoint: poll_once must swallow the failure
        let policy =
            PolicyClient::new("http://127.0.0.1:9", Duration::from_millis(100)).unwrap();
        let provider = Arc::new(ContextProvider::new(ClientContext::default()));
        let poller = ContinuousAuthPoller::new(
            policy,
            provider,
            Arc::clone(&store),
            Arc::clone(&log),
            Duration::from_secs(120),
        );
        (poller, store, log)
    }

    #[tokio::test]
    async fn test_poll_failure_logs_and_continues() {
        let (poller, store, log) = poller();

        poller.poll_once().await;

        // Session untouched, one warning recorded
        let session = store.get().unwrap();
        assert!(session.last_auth_at.is_none());
        assert!(session.last_risk_score.is_none());

        let entries = log.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].severity, Severity::Warning);
        assert!(entries[0].message.contains("continuous auth failed"));
    }

    #[tokio::test]
    async fn test_poll_failure_does_not_disconnect() {
        let (poller, store, _) = poller();
        store
            .update(|s| {
                s.connection_id = Some("conn-1".to_string());
                s.state = crate::session::SessionState::Active;
            })
            .unwrap();

        poller.poll_once().await;

        let session = store.get().unwrap();
        assert_eq!(session.connection_id.as_deref(), Some("conn-1"));
        assert_eq!(session.state, crate::session::SessionState::Active);
    }
}
