use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, PoisonError};

/// Lifecycle phase of the store connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ConnectionPhase {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
    Disconnecting = 3,
}

impl ConnectionPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionPhase::Disconnected => "disconnected",
            ConnectionPhase::Connecting => "connecting",
            ConnectionPhase::Connected => "connected",
            ConnectionPhase::Disconnecting => "disconnecting",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => ConnectionPhase::Connecting,
            2 => ConnectionPhase::Connected,
            3 => ConnectionPhase::Disconnecting,
            _ => ConnectionPhase::Disconnected,
        }
    }
}

impl std::fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared view of the store connection's phase.
///
/// The service lifecycle and the driver's heartbeat observer write it;
/// stores, the readiness gate and health reporting only read it.
///
/// Heartbeats are kept per server: the store counts as reachable while any
/// known server's last heartbeat succeeded.
#[derive(Debug)]
pub struct ConnectionMonitor {
    phase: AtomicU8,
    servers: Mutex<HashMap<String, bool>>,
}

impl Default for ConnectionMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionMonitor {
    pub fn new() -> Self {
        Self {
            phase: AtomicU8::new(ConnectionPhase::Disconnected as u8),
            servers: Mutex::new(HashMap::new()),
        }
    }

    pub fn phase(&self) -> ConnectionPhase {
        ConnectionPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub fn is_connected(&self) -> bool {
        self.phase() == ConnectionPhase::Connected
    }

    /// Lifecycle transition (startup, first successful ping, shutdown).
    pub fn set(&self, phase: ConnectionPhase) {
        let previous = ConnectionPhase::from_u8(self.phase.swap(phase as u8, Ordering::AcqRel));
        if previous != phase {
            tracing::info!(from = %previous, to = %phase, "Store connection phase changed");
        }
    }

    /// First successful round trip after connecting.
    pub fn mark_reachable(&self) {
        self.transition(ConnectionPhase::Connected);
    }

    /// Heartbeat outcome for one server. Ignored once shutdown has begun or
    /// before the lifecycle has started connecting.
    pub fn observe_heartbeat(&self, server: &str, healthy: bool) {
        let mut servers = self.servers.lock().unwrap_or_else(PoisonError::into_inner);
        servers.insert(server.to_string(), healthy);
        self.transition(reachability(&servers));
    }

    /// The driver stopped monitoring `server` (removed from the topology).
    pub fn forget_server(&self, server: &str) {
        let mut servers = self.servers.lock().unwrap_or_else(PoisonError::into_inner);
        if servers.remove(server).is_some() && !servers.is_empty() {
            self.transition(reachability(&servers));
        }
    }

    fn transition(&self, next: ConnectionPhase) {
        let result = self
            .phase
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                match ConnectionPhase::from_u8(current) {
                    ConnectionPhase::Disconnecting | ConnectionPhase::Disconnected => None,
                    phase if phase == next => None,
                    _ => Some(next as u8),
                }
            });

        if let Ok(previous) = result {
            tracing::info!(
                from = %ConnectionPhase::from_u8(previous),
                to = %next,
                "Store connection phase changed"
            );
        }
    }
}

fn reachability(servers: &HashMap<String, bool>) -> ConnectionPhase {
    if servers.values().any(|healthy| *healthy) {
        ConnectionPhase::Connected
    } else {
        ConnectionPhase::Connecting
    }
}
