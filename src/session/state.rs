//! Session state machine.

/// Represents the lifecycle state of the gateway session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No session; the client may initiate a connection.
    #[default]
    Disconnected,
    /// A connection id is known but establishment is not yet confirmed.
    Connecting,
    /// Tunnel session established and tracked by the gateway.
    Active,
    /// The gateway tore the session down on its side.
    Terminated,
    /// The last connection attempt failed in transport; retryable.
    Error,
}

impl SessionState {
    /// Check if transition to target state is valid.
    ///
    /// Valid transitions:
    /// - Disconnected -> Connecting
    /// - Connecting -> Active | Disconnected | Error | Terminated
    /// - Active -> Disconnected | Terminated
    /// - Error -> Connecting | Disconnected
    /// - Terminated -> Connecting | Disconnected
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (*self, target),
            (Disconnected, Connecting)
                | (Connecting, Active)
                | (Connecting, Disconnected)
                | (Connecting, Error)
                | (Connecting, Terminated)
                | (Active, Disconnected)
                | (Active, Terminated)
                | (Error, Connecting)
                | (Error, Disconnected)
                | (Terminated, Connecting)
                | (Terminated, Disconnected)
        )
    }

    /// Attempt to transition to a new state.
    ///
    /// Returns `Ok(())` if the transition is valid, or an error otherwise.
    pub fn transition_to(&mut self, target: SessionState) -> crate::Result<()> {
        if self.can_transition_to(target) {
            *self = target;
            Ok(())
        } else {
            Err(crate::error::ZtnaClientError::InvalidStateTransition {
                from: *self,
                to: target,
            })
        }
    }

    /// Whether a connection id must be present in this state.
    ///
    /// The session record keeps `connection_id` non-null exactly while
    /// this returns true.
    pub fn holds_connection(&self) -> bool {
        matches!(self, SessionState::Connecting | SessionState::Active)
    }
}
