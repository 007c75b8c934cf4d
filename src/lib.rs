//! # ztna-client
//!
//! Client for a zero-trust network-access (ZTNA) gateway.
//!
//! This crate establishes, monitors, continuously re-authenticates, and
//! reliably tears down a logical secure-tunnel session against a remote
//! gateway service. It speaks the gateway's JSON control plane; the
//! tunnel data plane and the policy engine are external collaborators.
//!
//! ## Features
//!
//! - **Session lifecycle**: a validated state machine with a single
//!   writer, conflict resolution by adoption, and self-healing against
//!   remote termination
//! - **Connectivity monitoring**: platform events plus active probing,
//!   with forced teardown on loss
//! - **Continuous authentication**: periodic context re-evaluation
//!   against the policy engine
//! - **Reliable teardown**: best-effort release on shutdown that never
//!   waits on the gateway
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use ztna_client::{
//!     ActivityLog, ConnectionController, ConnectionIdStore, GatewayClient, Scheduler,
//!     SessionStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> ztna_client::Result<()> {
//!     // Initialize logging
//!     ztna_client::logging::try_init().ok();
//!
//!     let store = Arc::new(SessionStore::new());
//!     let log = Arc::new(ActivityLog::default());
//!     let gateway = GatewayClient::new("https://gw.corp.example", Duration::from_secs(15))?;
//!     let persist = ConnectionIdStore::new("/var/lib/ztna-client");
//!
//!     let controller = ConnectionController::new(store, log, gateway, persist);
//!     let (scheduler, bus) = Scheduler::new(controller);
//!     tokio::spawn(scheduler.run());
//!
//!     // Rediscover a session persisted before the last shutdown
//!     bus.status().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod activity;
pub mod authpoll;
pub mod cli;
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod monitor;
pub mod policy;
pub mod scheduler;
pub mod session;
pub mod unload;

// Re-export commonly used types
pub use activity::{ActivityLog, LogEntry, Severity};
pub use authpoll::ContinuousAuthPoller;
pub use config::Config;
pub use context::{ClientContext, ContextProvider, DeviceInfo, LocationInfo};
pub use controller::ConnectionController;
pub use error::{Result, ZtnaClientError};
pub use gateway::{ConnectOutcome, ConnectionMode, GatewayClient, RemoteState, RouteEntry};
pub use monitor::{ConnectivityMonitor, MonitorConfig, NetEvent};
pub use policy::{AuthVerdict, PolicyClient};
pub use scheduler::{Command, CommandBus, Scheduler};
pub use session::{
    ConnectionIdStore, PolicyDenial, Session, SessionState, SessionStore,
};
pub use unload::UnloadGuard;
