//! Event plumbing for the TUI

use std::time::Duration;

use agrireg_session::{LogoutReason, SessionStore};
use tokio::sync::mpsc;

/// Redraw and housekeeping cadence
pub const TICK_RATE: Duration = Duration::from_millis(100);

/// Ticks per second at [`TICK_RATE`]
pub const TICKS_PER_SECOND: u64 = 10;

/// Events raised outside the key handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The session ended, possibly from a timer task
    SessionEnded(LogoutReason),
}

/// Route logouts from any task into the UI loop
pub fn session_events(store: &SessionStore) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    store.on_logout(move |reason| {
        // The receiver is gone once the UI has shut down.
        let _ = tx.send(AppEvent::SessionEnded(reason));
    });
    rx
}
