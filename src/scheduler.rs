//! Serialized command scheduling for the controller.
//!
//! The monitor, the auth poller, and the UI all run on independent
//! timers. Instead of letting them call into the controller
//! concurrently, their requests are queued on one channel and processed
//! strictly in order, so two session mutations can never interleave.

use tokio::sync::{mpsc, oneshot};

use crate::context::ClientContext;
use crate::controller::ConnectionController;
use crate::error::ZtnaClientError;
use crate::gateway::{RouteEntry, StatusResponse};
use crate::session::Session;
use crate::Result;

/// Queue depth before senders start waiting.
const COMMAND_QUEUE_DEPTH: usize = 32;

/// A queued controller operation with its reply channel.
#[derive(Debug)]
pub enum Command {
    Connect {
        credential: String,
        context: ClientContext,
        reply: oneshot::Sender<Result<Session>>,
    },
    Disconnect {
        reason: String,
        reply: oneshot::Sender<Result<()>>,
    },
    Status {
        reply: oneshot::Sender<Result<Option<StatusResponse>>>,
    },
    Routes {
        reply: oneshot::Sender<Result<Vec<RouteEntry>>>,
    },
}

/// Cloneable handle for enqueueing controller operations.
#[derive(Debug, Clone)]
pub struct CommandBus {
    tx: mpsc::Sender<Command>,
}

impl CommandBus {
    pub(crate) fn new(tx: mpsc::Sender<Command>) -> Self {
        Self { tx }
    }

    async fn dispatch<T>(
        &self,
        command: Command,
        rx: oneshot::Receiver<Result<T>>,
    ) -> Result<T> {
        self.tx
            .send(command)
            .await
            .map_err(|_| ZtnaClientError::ChannelClosed)?;
        rx.await.map_err(|_| ZtnaClientError::ChannelClosed)?
    }

    /// Enqueue a connect and wait for the outcome.
    pub async fn connect(&self, credential: &str, context: ClientContext) -> Result<Session> {
        let (reply, rx) = oneshot::channel();
        self.dispatch(
            Command::Connect {
                credential: credential.to_string(),
                context,
                reply,
            },
            rx,
        )
        .await
    }

    /// Enqueue a disconnect and wait for local cleanup to finish.
    pub async fn disconnect(&self, reason: &str) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.dispatch(
            Command::Disconnect {
                reason: reason.to_string(),
                reply,
            },
            rx,
        )
        .await
    }

    /// Enqueue a status poll.
    pub async fn status(&self) -> Result<Option<StatusResponse>> {
        let (reply, rx) = oneshot::channel();
        self.dispatch(Command::Status { reply }, rx).await
    }

    /// Enqueue a routing-table fetch.
    pub async fn routes(&self) -> Result<Vec<RouteEntry>> {
        let (reply, rx) = oneshot::channel();
        self.dispatch(Command::Routes { reply }, rx).await
    }
}

/// Owns the controller and drains the command queue one at a time.
pub struct Scheduler {
    controller: ConnectionController,
    rx: mpsc::Receiver<Command>,
}

impl Scheduler {
    /// Create a scheduler around `controller` plus the bus feeding it.
    pub fn new(controller: ConnectionController) -> (Self, CommandBus) {
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        (Self { controller, rx }, CommandBus::new(tx))
    }

    /// Process commands until every bus handle is dropped.
    pub async fn run(mut self) {
        while let Some(command) = self.rx.recv().await {
            // Reply receivers may be gone (caller cancelled); that is
            // not this loop's problem.
            match command {
                Command::Connect {
                    credential,
                    context,
                    reply,
                } => {
                    let result = self.controller.connect(&credential, &context).await;
                    let _ = reply.send(result);
                }
                Command::Disconnect { reason, reply } => {
                    let result = self.controller.disconnect(&reason).await;
                    let _ = reply.send(result);
                }
                Command::Status { reply } => {
                    let result = self.controller.status().await;
                    let _ = reply.send(result);
                }
                Command::Routes { reply } => {
                    let result = self.controller.routes().await;
                    let _ = reply.send(result);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityLog;
    use crate::gateway::GatewayClient;
    use crate::session::{ConnectionIdStore, SessionState, SessionStore};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn scheduler(dir: &TempDir) -> (Scheduler, CommandBus, Arc<SessionStore>) {
        let store = Arc::new(SessionStore::new());
        let log = Arc::new(ActivityLog::default());
        let gateway =
            GatewayClient::new("http://127.0.0.1:9", Duration::from_millis(100)).unwrap();
        let persist = ConnectionIdStore::new(dir.path());
        let controller =
            ConnectionController::new(Arc::clone(&store), log, gateway, persist);
        let (scheduler, bus) = Scheduler::new(controller);
        (scheduler, bus, store)
    }

    #[tokio::test]
    async fn test_commands_processed_in_order() {
        let dir = TempDir::new().unwrap();
        let (scheduler, bus, store) = scheduler(&dir);
        let handle = tokio::spawn(scheduler.run());

        // Both are no-ops against an empty session, exercised through
        // the queue
        bus.disconnect("first").await.unwrap();
        let status = bus.status().await.unwrap();
        assert!(status.is_none());
        assert_eq!(store.get().unwrap().state, SessionState::Disconnected);

        drop(bus);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_bus_errors_after_scheduler_drop() {
        let dir = TempDir::new().unwrap();
        let (scheduler, bus, _) = scheduler(&dir);
        drop(scheduler);

        let result = bus.disconnect("too late").await;
        assert!(matches!(result, Err(ZtnaClientError::ChannelClosed)));
    }

    #[tokio::test]
    async fn test_invalid_credential_propagates_through_bus() {
        let dir = TempDir::new().unwrap();
        let (scheduler, bus, _) = scheduler(&dir);
        let handle = tokio::spawn(scheduler.run());

        let result = bus.connect("", ClientContext::default()).await;
        assert!(matches!(result, Err(ZtnaClientError::InvalidCredential)));

        drop(bus);
        handle.await.unwrap();
    }
}
