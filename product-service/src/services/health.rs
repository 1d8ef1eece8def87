use super::connection::{ConnectionMonitor, ConnectionPhase};
use crate::config::HealthMode;
use axum::http::StatusCode;
use std::sync::Arc;

/// Store health as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthState {
    pub phase: ConnectionPhase,
    pub ok: bool,
    pub status: StatusCode,
}

/// Reduces the live connection phase to `ok` + HTTP status under the mode
/// chosen at startup. Recomputed on every call.
#[derive(Debug, Clone)]
pub struct HealthAggregator {
    monitor: Arc<ConnectionMonitor>,
    mode: HealthMode,
}

impl HealthAggregator {
    pub fn new(monitor: Arc<ConnectionMonitor>, mode: HealthMode) -> Self {
        Self { monitor, mode }
    }

    pub fn mode(&self) -> HealthMode {
        self.mode
    }

    pub fn current_health(&self) -> HealthState {
        reduce(self.monitor.phase(), self.mode)
    }
}

fn reduce(phase: ConnectionPhase, mode: HealthMode) -> HealthState {
    let ok = match mode {
        HealthMode::Optimistic => true,
        HealthMode::Strict => phase == ConnectionPhase::Connected,
    };

    HealthState {
        phase,
        ok,
        status: if ok {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PHASES: [ConnectionPhase; 4] = [
        ConnectionPhase::Disconnected,
        ConnectionPhase::Connecting,
        ConnectionPhase::Connected,
        ConnectionPhase::Disconnecting,
    ];

    #[test]
    fn strict_is_ok_only_when_connected() {
        for phase in ALL_PHASES {
            let health = reduce(phase, HealthMode::Strict);
            let connected = phase == ConnectionPhase::Connected;
            assert_eq!(health.ok, connected, "phase {}", phase);
            assert_eq!(
                health.status,
                if connected {
                    StatusCode::OK
                } else {
                    StatusCode::SERVICE_UNAVAILABLE
                }
            );
        }
    }

    #[test]
    fn optimistic_is_always_ok() {
        for phase in ALL_PHASES {
            let health = reduce(phase, HealthMode::Optimistic);
            assert!(health.ok);
            assert_eq!(health.status, StatusCode::OK);
            assert_eq!(health.phase, phase);
        }
    }

    #[test]
    fn reads_the_live_phase() {
        let monitor = Arc::new(ConnectionMonitor::new());
        let health = HealthAggregator::new(monitor.clone(), HealthMode::Strict);

        monitor.set(ConnectionPhase::Connecting);
        assert!(!health.current_health().ok);

        monitor.set(ConnectionPhase::Connected);
        assert!(health.current_health().ok);
    }
}
