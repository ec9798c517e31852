//! Session timeout supervisor
//!
//! Owns the monitor and countdown timers for one store and starts or cancels
//! them as the session phase changes:
//!
//! | Phase           | Monitor  | Countdown | Modal   |
//! |-----------------|----------|-----------|---------|
//! | `NoSession`     | stopped  | stopped   | hidden  |
//! | `ActiveFresh`   | running  | stopped   | hidden  |
//! | `ActiveWarning` | running  | running   | visible |
//!
//! Dropping the [`SessionTimeoutHandle`] aborts the supervisor, which drops
//! both timer guards with it.

use tokio::sync::watch;
use tracing::debug;

use crate::countdown::{Countdown, CountdownAction, CountdownModal};
use crate::monitor::TimeoutMonitor;
use crate::store::{LogoutReason, SessionPhase, SessionStore};
use crate::timer::TimerGuard;

/// Entry point for wiring the timeout subsystem to a store
pub struct SessionTimeout;

impl SessionTimeout {
    /// Start supervising `store` on the current tokio runtime
    pub fn spawn(store: SessionStore) -> SessionTimeoutHandle {
        let (modal_tx, modal_rx) = watch::channel(CountdownModal::hidden());
        let phase_rx = store.subscribe();
        let task = TimerGuard::spawn(supervise(store.clone(), phase_rx, modal_tx));

        SessionTimeoutHandle {
            store,
            modal_rx,
            _task: task,
        }
    }
}

async fn supervise(
    store: SessionStore,
    mut phase_rx: watch::Receiver<SessionPhase>,
    modal_tx: watch::Sender<CountdownModal>,
) {
    // Monitor guard tagged with the session generation it was started for
    let mut monitor: Option<(u64, TimerGuard)> = None;
    let mut countdown: Option<TimerGuard> = None;

    loop {
        let phase = *phase_rx.borrow_and_update();
        debug!(?phase, "Session phase changed");

        match phase {
            SessionPhase::NoSession => {
                monitor = None;
                countdown = None;
                modal_tx.send_replace(CountdownModal::hidden());
            }
            SessionPhase::ActiveFresh => {
                countdown = None;
                ensure_monitor(&mut monitor, &store);
                modal_tx.send_replace(CountdownModal::hidden());
            }
            SessionPhase::ActiveWarning => {
                ensure_monitor(&mut monitor, &store);
                if countdown.as_ref().map_or(true, TimerGuard::is_finished) {
                    countdown = Some(Countdown::new(store.clone()).spawn(modal_tx.clone()));
                }
            }
        }

        if phase_rx.changed().await.is_err() {
            break;
        }
    }
}

/// Start a monitor unless one is already polling the current session
///
/// A logout followed by a login can reach the supervisor as one
/// `ActiveFresh` change, so liveness alone is not enough.
fn ensure_monitor(monitor: &mut Option<(u64, TimerGuard)>, store: &SessionStore) {
    let generation = store.generation();
    let current = monitor
        .as_ref()
        .is_some_and(|(started_for, guard)| *started_for == generation && !guard.is_finished());
    if !current {
        debug!(generation, "Starting timeout monitor");
        *monitor = Some((generation, TimeoutMonitor::new(store.clone()).spawn()));
    }
}

/// Live timeout subsystem; cancels every timer when dropped
pub struct SessionTimeoutHandle {
    store: SessionStore,
    modal_rx: watch::Receiver<CountdownModal>,
    _task: TimerGuard,
}

impl SessionTimeoutHandle {
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Current modal configuration
    pub fn modal(&self) -> CountdownModal {
        let modal = *self.modal_rx.borrow();
        // A countdown tick may publish just after an extend cleared the flag.
        if modal.visible && !self.store.warning_active() {
            CountdownModal::hidden()
        } else {
            modal
        }
    }

    /// Receive every modal update
    pub fn subscribe_modal(&self) -> watch::Receiver<CountdownModal> {
        self.modal_rx.clone()
    }

    /// Dispatch a modal button press
    pub fn apply(&self, action: CountdownAction) {
        match action {
            CountdownAction::Extend => self.extend(),
            CountdownAction::LogoutNow => self.logout_now(),
        }
    }

    /// "Stay logged in"
    pub fn extend(&self) {
        self.store.extend_session();
    }

    /// "Logout now"
    pub fn logout_now(&self) {
        self.store.logout(LogoutReason::UserRequested);
    }
}
