use std::{fmt::Display, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    /// `reconnect_attempt` is `None` for an attempt started by the user.
    Connecting { reconnect_attempt: Option<u32> },
    Connected,
    /// Waiting for the reconnect delay, `retries` attempts already made.
    Reconnecting { retries: u32 },
    Failed,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    pub fn is_connecting(&self) -> bool {
        matches!(self, ConnectionState::Connecting { .. })
    }
}

impl Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting {
                reconnect_attempt: None,
            } => write!(f, "connecting"),
            ConnectionState::Connecting {
                reconnect_attempt: Some(attempt),
            } => write!(f, "connecting (attempt {attempt})"),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Reconnecting { retries } => {
                write!(f, "reconnecting ({retries} retries)")
            }
            ConnectionState::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateEvent {
    ConnectRequested,
    ConnectSucceeded,
    ConnectFailed,
    TransportClosed,
    ReconnectDue,
    HeartbeatDue,
    DisconnectRequested,
}

/// Side effects requested by a transition, applied in order by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    OpenTransport,
    AbortConnect,
    CloseTransport,
    StartHeartbeat,
    StopHeartbeat,
    SendHeartbeat,
    FlushQueue,
    ScheduleReconnect(Duration),
    CancelReconnect,
    ResolveConnect,
    RejectConnect,
    ReportConnectFailure,
    ReportExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_millis(3000),
        }
    }
}

/// Computes the next state and the effects to run. Events that do not apply
/// to the current state leave it unchanged with no effects.
pub fn transition(
    state: ConnectionState,
    event: StateEvent,
    policy: &ReconnectPolicy,
) -> (ConnectionState, Vec<Effect>) {
    use ConnectionState::*;

    match (state, event) {
        (_, StateEvent::DisconnectRequested) => (
            Disconnected,
            vec![
                Effect::CancelReconnect,
                Effect::StopHeartbeat,
                Effect::AbortConnect,
                Effect::CloseTransport,
            ],
        ),

        (Connecting { .. }, StateEvent::ConnectRequested) => (state, vec![Effect::RejectConnect]),
        (Connected, StateEvent::ConnectRequested) => (state, vec![Effect::ResolveConnect]),
        (Reconnecting { .. }, StateEvent::ConnectRequested) => (
            Connecting {
                reconnect_attempt: None,
            },
            vec![Effect::CancelReconnect, Effect::OpenTransport],
        ),
        (Disconnected | Failed, StateEvent::ConnectRequested) => (
            Connecting {
                reconnect_attempt: None,
            },
            vec![Effect::OpenTransport],
        ),

        (Connecting { .. }, StateEvent::ConnectSucceeded) => (
            Connected,
            vec![
                Effect::StartHeartbeat,
                Effect::FlushQueue,
                Effect::ResolveConnect,
            ],
        ),
        // Link established after the state moved on.
        (_, StateEvent::ConnectSucceeded) => (state, vec![Effect::CloseTransport]),

        (
            Connecting {
                reconnect_attempt: None,
            },
            StateEvent::ConnectFailed,
        ) => (Disconnected, vec![Effect::ReportConnectFailure]),
        (
            Connecting {
                reconnect_attempt: Some(attempt),
            },
            StateEvent::ConnectFailed,
        ) => retry_or_fail(attempt, policy),

        (Connected, StateEvent::TransportClosed) => {
            let (next, mut effects) = retry_or_fail(0, policy);
            effects.splice(0..0, [Effect::StopHeartbeat, Effect::CloseTransport]);
            (next, effects)
        }

        (Reconnecting { retries }, StateEvent::ReconnectDue) => (
            Connecting {
                reconnect_attempt: Some(retries + 1),
            },
            vec![Effect::OpenTransport],
        ),

        (Connected, StateEvent::HeartbeatDue) => (state, vec![Effect::SendHeartbeat]),

        _ => (state, vec![]),
    }
}

fn retry_or_fail(retries: u32, policy: &ReconnectPolicy) -> (ConnectionState, Vec<Effect>) {
    if retries < policy.max_attempts {
        (
            ConnectionState::Reconnecting { retries },
            vec![Effect::ScheduleReconnect(policy.delay)],
        )
    } else {
        (ConnectionState::Failed, vec![Effect::ReportExhausted])
    }
}
