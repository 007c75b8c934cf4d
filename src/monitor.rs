//! Network connectivity monitor.
//!
//! Combines two detection paths: platform online/offline notifications
//! pushed into an event channel, and an active reachability probe on a
//! fixed interval. Loss of connectivity forces a disconnect through the
//! scheduler; restoration is logged but never auto-reconnects.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::activity::ActivityLog;
use crate::scheduler::CommandBus;
use crate::Result;

/// Platform-reported reachability change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetEvent {
    Online,
    Offline,
}

/// Monitor settings.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Endpoint probed for reachability.
    pub probe_url: String,
    /// Interval between active probes.
    pub probe_interval: Duration,
}

/// Watches connectivity and tears the session down when it is lost.
pub struct ConnectivityMonitor {
    bus: CommandBus,
    log: Arc<ActivityLog>,
    config: MonitorConfig,
    http: reqwest::Client,
    events: mpsc::Receiver<NetEvent>,
    online: bool,
}

impl ConnectivityMonitor {
    /// Create a monitor plus the sender that platform integration uses
    /// to push online/offline notifications.
    pub fn new(
        bus: CommandBus,
        log: Arc<ActivityLog>,
        config: MonitorConfig,
    ) -> Result<(Self, mpsc::Sender<NetEvent>)> {
        let (tx, events) = mpsc::channel(8);
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok((
            Self {
                bus,
                log,
                config,
                http,
                events,
                online: true,
            },
            tx,
        ))
    }

    /// Run until the event sender is dropped.
    ///
    /// Both paths feed the same edge detector, so a loss noticed by the
    /// event channel and the probe in the same tick still disconnects
    /// only once.
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.config.probe_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(NetEvent::Online) => self.note_online().await,
                    Some(NetEvent::Offline) => self.note_offline().await,
                    None => break,
                },
                _ = ticker.tick() => {
                    if self.probe().await {
                        self.note_online().await;
                    } else {
                        self.note_offline().await;
                    }
                }
            }
        }
    }

    /// Reachability probe: any response means the network path is up.
    async fn probe(&self) -> bool {
        self.http.get(&self.config.probe_url).send().await.is_ok()
    }

    async fn note_offline(&mut self) {
        if !self.online {
            return;
        }
        self.online = false;
        self.log
            .warn("connectivity lost; tearing down active session");
        if let Err(e) = self.bus.disconnect("connectivity lost").await {
            self.log
                .error(format!("forced disconnect failed: {}", e));
        }
    }

    async fn note_online(&mut self) {
        if self.online {
            return;
        }
        self.online = true;
        // No automatic reconnection: re-auth stays a user decision.
        self.log
            .info("connectivity restored; reconnect manually to resume");
    }
}
