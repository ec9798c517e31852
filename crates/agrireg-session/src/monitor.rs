//! Idle-timeout monitor
//!
//! Polls the store once per [`POLL_INTERVAL`] and drives the
//! `ActiveFresh -> ActiveWarning -> NoSession` transitions.

use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::config::POLL_INTERVAL;
use crate::store::{LogoutReason, SessionStore};
use crate::timer::TimerGuard;

/// Result of a single poll
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// No session; the monitor should stop
    Stopped,
    /// Nothing crossed a threshold
    Unchanged,
    /// The warning flag was set by this poll
    WarningRaised,
    /// The hard threshold was crossed and the session ended
    LoggedOut,
}

impl MonitorOutcome {
    /// Whether polling should end after this outcome
    pub fn is_terminal(self) -> bool {
        matches!(self, MonitorOutcome::Stopped | MonitorOutcome::LoggedOut)
    }
}

/// Compares idle time against the warning and hard thresholds
#[derive(Clone, Debug)]
pub struct TimeoutMonitor {
    store: SessionStore,
}

impl TimeoutMonitor {
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// Run one poll
    pub fn check(&self) -> MonitorOutcome {
        let Some(idle) = self.store.idle_time() else {
            return MonitorOutcome::Stopped;
        };

        if idle >= self.store.config().hard_threshold() {
            // Someone else may have logged out between the read and here.
            return if self.store.logout(LogoutReason::IdleTimeout) {
                MonitorOutcome::LoggedOut
            } else {
                MonitorOutcome::Stopped
            };
        }

        if self.store.raise_warning() {
            debug!(idle_ms = idle.as_millis() as u64, "Session warning raised");
            return MonitorOutcome::WarningRaised;
        }

        MonitorOutcome::Unchanged
    }

    /// Poll on a one-second interval until the session ends
    pub fn spawn(self) -> TimerGuard {
        TimerGuard::spawn(async move {
            let mut ticker = interval(POLL_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let outcome = self.check();
                if outcome.is_terminal() {
                    debug!(?outcome, "Timeout monitor stopped");
                    break;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Credentials, LoginResponse, UserProfile};
    use crate::clock::ManualClock;
    use crate::config::SessionConfig;
    use crate::store::SessionPhase;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn logged_in() -> (SessionStore, ManualClock, Arc<AtomicUsize>) {
        let clock = ManualClock::new();
        let store = SessionStore::with_clock(SessionConfig::testing(), Arc::new(clock.clone())).unwrap();
        let logouts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&logouts);
        store.on_logout(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        store.login(Credentials::from(LoginResponse {
            access_token: "tok".into(),
            refresh_token: None,
            user: UserProfile {
                email: "officer@agri.example".into(),
                ..Default::default()
            },
        }));
        (store, clock, logouts)
    }

    #[test]
    fn test_no_session_stops() {
        let store = SessionStore::with_clock(SessionConfig::testing(), Arc::new(ManualClock::new())).unwrap();
        assert_eq!(TimeoutMonitor::new(store).check(), MonitorOutcome::Stopped);
    }

    #[test]
    fn test_fresh_session_unchanged() {
        let (store, clock, _) = logged_in();
        let monitor = TimeoutMonitor::new(store.clone());
        clock.advance(Duration::from_millis(1_900));
        assert_eq!(monitor.check(), MonitorOutcome::Unchanged);
        assert_eq!(store.phase(), SessionPhase::ActiveFresh);
    }

    #[test]
    fn test_warning_raised_once() {
        let (store, clock, logouts) = logged_in();
        let monitor = TimeoutMonitor::new(store.clone());

        clock.advance(Duration::from_millis(2_100));
        assert_eq!(monitor.check(), MonitorOutcome::WarningRaised);
        assert_eq!(monitor.check(), MonitorOutcome::Unchanged);
        assert_eq!(store.phase(), SessionPhase::ActiveWarning);
        assert_eq!(logouts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_hard_threshold_logs_out_exactly_once() {
        let (store, clock, logouts) = logged_in();
        let monitor = TimeoutMonitor::new(store.clone());

        clock.advance(Duration::from_secs(4));
        assert_eq!(monitor.check(), MonitorOutcome::LoggedOut);
        assert_eq!(monitor.check(), MonitorOutcome::Stopped);
        clock.advance(Duration::from_secs(10));
        assert_eq!(monitor.check(), MonitorOutcome::Stopped);

        assert_eq!(logouts.load(Ordering::SeqCst), 1);
        assert_eq!(store.phase(), SessionPhase::NoSession);
    }

    #[test]
    fn test_extend_returns_to_fresh() {
        let (store, clock, _) = logged_in();
        let monitor = TimeoutMonitor::new(store.clone());

        clock.advance(Duration::from_millis(2_500));
        monitor.check();
        store.extend_session();
        assert_eq!(monitor.check(), MonitorOutcome::Unchanged);
        assert!(!store.warning_active());

        clock.advance(Duration::from_secs(2));
        assert_eq!(monitor.check(), MonitorOutcome::WarningRaised);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_monitor_exits_after_logout() {
        let store = SessionStore::new(SessionConfig::testing()).unwrap();
        store.login(Credentials::from(LoginResponse {
            access_token: "tok".into(),
            refresh_token: None,
            user: UserProfile::default(),
        }));

        let guard = TimeoutMonitor::new(store.clone()).spawn();
        tokio::time::sleep(Duration::from_millis(4_100)).await;

        assert!(!store.is_active());
        assert!(guard.is_finished());
    }
}
