//! Countdown presenter for the "session expiring" modal

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::config::POLL_INTERVAL;
use crate::store::{LogoutReason, SessionStore};
use crate::timer::TimerGuard;

/// Render configuration for the countdown modal
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountdownModal {
    pub visible: bool,
    pub remaining_seconds: u64,
}

impl CountdownModal {
    pub fn hidden() -> Self {
        Self::default()
    }

    /// Remaining time as `m:ss`
    pub fn label(&self) -> String {
        format_remaining(self.remaining_seconds)
    }
}

/// User choices offered by the modal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownAction {
    /// "Stay logged in"
    Extend,
    /// "Logout now"
    LogoutNow,
}

/// Result of a countdown tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownTick {
    /// Warning no longer set; nothing to show
    Hidden,
    /// Still counting; seconds left
    Running(u64),
    /// Reached zero and the session was ended
    Expired,
}

/// Recomputes the visible countdown from the shared activity timestamp
#[derive(Clone, Debug)]
pub struct Countdown {
    store: SessionStore,
    modal: CountdownModal,
}

impl Countdown {
    pub fn new(store: SessionStore) -> Self {
        let mut countdown = Self {
            store,
            modal: CountdownModal::hidden(),
        };
        countdown.sync();
        countdown
    }

    /// Current modal configuration
    pub fn modal(&self) -> CountdownModal {
        self.modal
    }

    /// Refresh the modal from the store without side effects
    pub fn sync(&mut self) -> CountdownModal {
        self.modal = if self.store.warning_active() {
            CountdownModal {
                visible: true,
                remaining_seconds: self.store.remaining_seconds(),
            }
        } else {
            CountdownModal::hidden()
        };
        self.modal
    }

    /// Advance the countdown; at zero this forces logout
    pub fn tick(&mut self) -> CountdownTick {
        let modal = self.sync();
        if !modal.visible {
            return CountdownTick::Hidden;
        }
        // The display floors to whole seconds; only a fully elapsed hard
        // threshold ends the session.
        match self.store.remaining() {
            None => {
                self.modal = CountdownModal::hidden();
                return CountdownTick::Hidden;
            }
            Some(left) if left > Duration::ZERO => {
                return CountdownTick::Running(modal.remaining_seconds);
            }
            Some(_) => {}
        }

        // The monitor may already have logged out in the same tick.
        self.store.logout(LogoutReason::CountdownElapsed);
        self.modal = CountdownModal::hidden();
        CountdownTick::Expired
    }

    /// Handle a button press on the modal
    pub fn apply(&mut self, action: CountdownAction) -> CountdownModal {
        match action {
            CountdownAction::Extend => {
                self.store.extend_session();
            }
            CountdownAction::LogoutNow => {
                self.store.logout(LogoutReason::UserRequested);
            }
        }
        self.sync()
    }

    /// Tick once per second, publishing every modal update to `modal_tx`
    ///
    /// The first tick lands one interval after the spawn; the current value is
    /// published immediately.
    pub fn spawn(mut self, modal_tx: watch::Sender<CountdownModal>) -> TimerGuard {
        TimerGuard::spawn(async move {
            modal_tx.send_replace(self.sync());
            let mut ticker = interval_at(Instant::now() + POLL_INTERVAL, POLL_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let tick = self.tick();
                modal_tx.send_replace(self.modal);
                match tick {
                    CountdownTick::Running(_) => {}
                    CountdownTick::Hidden | CountdownTick::Expired => {
                        debug!(?tick, "Countdown stopped");
                        break;
                    }
                }
            }
        })
    }
}

/// Format seconds as `m:ss`
pub fn format_remaining(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Credentials, LoginResponse, UserProfile};
    use crate::clock::ManualClock;
    use crate::config::SessionConfig;
    use crate::monitor::TimeoutMonitor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn warning_shown() -> (SessionStore, ManualClock, Arc<AtomicUsize>) {
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
            user: UserProfile::default(),
        }));
        clock.advance(Duration::from_secs(2));
        assert!(store.raise_warning());
        (store, clock, logouts)
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(0), "0:00");
        assert_eq!(format_remaining(9), "0:09");
        assert_eq!(format_remaining(300), "5:00");
        assert_eq!(format_remaining(125), "2:05");
    }

    #[test]
    fn test_hidden_without_warning() {
        let clock = ManualClock::new();
        let store = SessionStore::with_clock(SessionConfig::testing(), Arc::new(clock)).unwrap();
        let mut countdown = Countdown::new(store);
        assert_eq!(countdown.modal(), CountdownModal::hidden());
        assert_eq!(countdown.tick(), CountdownTick::Hidden);
    }

    #[test]
    fn test_counts_down_one_per_second_then_logs_out() {
        let (store, clock, logouts) = warning_shown();
        let mut countdown = Countdown::new(store.clone());
        assert_eq!(
            countdown.modal(),
            CountdownModal {
                visible: true,
                remaining_seconds: 2
            }
        );

        clock.advance(Duration::from_secs(1));
        assert_eq!(countdown.tick(), CountdownTick::Running(1));

        clock.advance(Duration::from_secs(1));
        assert_eq!(countdown.tick(), CountdownTick::Expired);
        assert!(!countdown.modal().visible);
        assert!(!store.is_active());
        assert_eq!(logouts.load(Ordering::SeqCst), 1);

        assert_eq!(countdown.tick(), CountdownTick::Hidden);
    }

    #[test]
    fn test_zero_display_before_hard_threshold_keeps_session() {
        let (store, clock, logouts) = warning_shown();
        let mut countdown = Countdown::new(store.clone());

        clock.advance(Duration::from_millis(1_500));
        assert_eq!(countdown.tick(), CountdownTick::Running(0));
        assert!(countdown.modal().visible);
        assert!(store.is_active());
        assert_eq!(logouts.load(Ordering::SeqCst), 0);

        clock.advance(Duration::from_millis(500));
        assert_eq!(countdown.tick(), CountdownTick::Expired);
        assert_eq!(logouts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_monitor_and_countdown_racing_log_out_once() {
        let (store, clock, logouts) = warning_shown();
        let monitor = TimeoutMonitor::new(store.clone());
        let mut countdown = Countdown::new(store.clone());

        clock.advance(Duration::from_secs(2));
        monitor.check();
        countdown.tick();

        assert_eq!(logouts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_extend_hides_modal() {
        let (store, clock, _) = warning_shown();
        let mut countdown = Countdown::new(store.clone());
        clock.advance(Duration::from_millis(500));

        let modal = countdown.apply(CountdownAction::Extend);
        assert!(!modal.visible);
        assert!(store.is_active());
        assert_eq!(store.idle_time(), Some(Duration::ZERO));
    }

    #[test]
    fn test_logout_now_clears_session() {
        let (store, _, logouts) = warning_shown();
        let mut countdown = Countdown::new(store.clone());

        let modal = countdown.apply(CountdownAction::LogoutNow);
        assert!(!modal.visible);
        assert!(!store.is_active());
        assert_eq!(logouts.load(Ordering::SeqCst), 1);
    }
}
