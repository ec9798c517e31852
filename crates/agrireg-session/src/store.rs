//! Session store with activity tracking
//!
//! The store is the single owner of the activity timestamp and the warning
//! flag. It is cheap to clone; every clone observes the same session. State
//! changes are broadcast as [`SessionPhase`] values on a watch channel so the
//! supervisor can start and cancel timers without polling.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::auth::{normalize_email, normalize_roles, Authenticator, Credentials};
use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::error::Result;
use crate::persist::PersistedSession;

/// Session state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No credentials held
    #[default]
    NoSession,
    /// Active and idle for less than the warning threshold
    ActiveFresh,
    /// Active with the countdown modal showing
    ActiveWarning,
}

impl SessionPhase {
    pub fn is_active(self) -> bool {
        self != SessionPhase::NoSession
    }
}

/// Why a session ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogoutReason {
    /// Explicit logout, including "logout now" on the modal
    UserRequested,
    /// Monitor saw the hard threshold crossed
    IdleTimeout,
    /// Countdown reached zero
    CountdownElapsed,
    /// Refresh token was rejected
    RefreshFailed,
}

impl LogoutReason {
    /// Whether the user was logged out without asking for it
    pub fn is_forced(self) -> bool {
        self != LogoutReason::UserRequested
    }
}

impl fmt::Display for LogoutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LogoutReason::UserRequested => "logged out",
            LogoutReason::IdleTimeout => "session expired after inactivity",
            LogoutReason::CountdownElapsed => "session expired after countdown",
            LogoutReason::RefreshFailed => "session could not be refreshed",
        };
        f.write_str(text)
    }
}

/// Callback run once after a session has been cleared
pub trait LogoutHook: Send + Sync {
    fn on_logout(&self, reason: LogoutReason);
}

impl<F> LogoutHook for F
where
    F: Fn(LogoutReason) + Send + Sync,
{
    fn on_logout(&self, reason: LogoutReason) {
        self(reason)
    }
}

struct SessionState {
    credentials: Option<Credentials>,
    last_activity: Instant,
    warning: bool,
    /// Bumped on every login
    generation: u64,
}

impl SessionState {
    fn phase(&self) -> SessionPhase {
        match (&self.credentials, self.warning) {
            (None, _) => SessionPhase::NoSession,
            (Some(_), false) => SessionPhase::ActiveFresh,
            (Some(_), true) => SessionPhase::ActiveWarning,
        }
    }
}

struct Inner {
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<SessionState>,
    phase: watch::Sender<SessionPhase>,
    hooks: Mutex<Vec<Arc<dyn LogoutHook>>>,
}

/// Shared session store
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("config", &self.inner.config)
            .field("phase", &self.phase())
            .finish()
    }
}

impl SessionStore {
    /// Create a store on the tokio clock
    ///
    /// Fails fast on misordered or zero thresholds.
    pub fn new(config: SessionConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a store reading time from `clock`
    pub fn with_clock(config: SessionConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let (phase, _) = watch::channel(SessionPhase::NoSession);
        let state = SessionState {
            credentials: None,
            last_activity: clock.now(),
            warning: false,
            generation: 0,
        };

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                clock,
                state: Mutex::new(state),
                phase,
                hooks: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    fn now(&self) -> Instant {
        self.inner.clock.now()
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, phase: SessionPhase) {
        self.inner.phase.send_if_modified(|current| {
            if *current == phase {
                false
            } else {
                *current = phase;
                true
            }
        });
    }

    /// Register a callback for logouts
    pub fn on_logout(&self, hook: impl LogoutHook + 'static) {
        self.inner
            .hooks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::new(hook));
    }

    /// Start a session, replacing any previous one
    pub fn login(&self, credentials: Credentials) {
        let now = self.now();
        info!(
            user = %credentials.user.email,
            role = credentials.role.as_deref().unwrap_or("-"),
            "Session started"
        );

        let phase = {
            let mut state = self.state();
            state.credentials = Some(credentials);
            state.last_activity = now;
            state.warning = false;
            state.generation += 1;
            state.phase()
        };
        self.publish(phase);
    }

    /// Authenticate against `authenticator` and start a session
    pub fn login_with(
        &self,
        authenticator: &dyn Authenticator,
        email: &str,
        password: &str,
    ) -> Result<()> {
        let email = normalize_email(email);
        let response = authenticator.login(&email, password).map_err(|e| {
            warn!(user = %email, "Login failed: {}", e);
            e
        })?;
        self.login(Credentials::from(response));
        Ok(())
    }

    /// Rehydrate a persisted session
    ///
    /// The activity clock restarts at the moment of restore.
    pub fn restore(&self, persisted: PersistedSession) {
        let roles = normalize_roles(&persisted.roles);
        let role = roles
            .first()
            .cloned()
            .or_else(|| persisted.role.map(|r| r.to_uppercase()));
        self.login(Credentials {
            access_token: persisted.token,
            refresh_token: persisted.refresh_token,
            user: persisted.user,
            roles,
            role,
        });
    }

    /// Mark "now" as the last user activity and clear the warning flag
    ///
    /// Returns `false` without touching anything when no session is active.
    pub fn record_activity(&self) -> bool {
        let now = self.now();
        let phase = {
            let mut state = self.state();
            if state.credentials.is_none() {
                return false;
            }
            state.last_activity = now;
            state.warning = false;
            state.phase()
        };
        self.publish(phase);
        true
    }

    /// "Stay logged in" from the countdown modal
    pub fn extend_session(&self) -> bool {
        let extended = self.record_activity();
        if extended {
            info!("Session extended by user");
        } else {
            debug!("Extend ignored: no active session");
        }
        extended
    }

    /// Set the warning flag if the session has been idle past the warning threshold
    ///
    /// Returns `true` only when the flag transitions from unset to set.
    pub fn raise_warning(&self) -> bool {
        let now = self.now();
        let warning = self.inner.config.warning_threshold();
        {
            let mut state = self.state();
            if state.credentials.is_none() || state.warning {
                return false;
            }
            if now.saturating_duration_since(state.last_activity) < warning {
                return false;
            }
            state.warning = true;
        }
        self.publish(SessionPhase::ActiveWarning);
        true
    }

    /// End the session
    ///
    /// Idempotent: returns `false` and runs no hooks when there is nothing to
    /// clear, so the monitor and the countdown may both call it in one tick.
    pub fn logout(&self, reason: LogoutReason) -> bool {
        let user = {
            let mut state = self.state();
            let Some(credentials) = state.credentials.take() else {
                return false;
            };
            state.warning = false;
            credentials.user.email
        };
        self.publish(SessionPhase::NoSession);

        if reason.is_forced() {
            warn!(user = %user, reason = %reason, "Forced logout");
        } else {
            info!(user = %user, "User logged out");
        }

        let hooks: Vec<Arc<dyn LogoutHook>> = self
            .inner
            .hooks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for hook in hooks {
            hook.on_logout(reason);
        }
        true
    }

    /// Swap the access token using the refresh token
    ///
    /// Returns `None` when there is no refresh token. A rejected refresh ends
    /// the session.
    pub fn refresh_access_token(&self, authenticator: &dyn Authenticator) -> Option<String> {
        let refresh_token = self
            .state()
            .credentials
            .as_ref()
            .and_then(|c| c.refresh_token.clone())?;

        match authenticator.refresh(&refresh_token) {
            Ok(token) => {
                let mut state = self.state();
                let credentials = state.credentials.as_mut()?;
                credentials.access_token = token.clone();
                debug!("Access token refreshed");
                Some(token)
            }
            Err(e) => {
                warn!("Token refresh failed: {}", e);
                self.logout(LogoutReason::RefreshFailed);
                None
            }
        }
    }

    /// Subscribe to phase changes
    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.inner.phase.subscribe()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state().phase()
    }

    pub fn is_active(&self) -> bool {
        self.state().credentials.is_some()
    }

    /// Counter identifying the current session; changes on every login
    pub fn generation(&self) -> u64 {
        self.state().generation
    }

    pub fn warning_active(&self) -> bool {
        let state = self.state();
        state.credentials.is_some() && state.warning
    }

    /// Time since the last activity, if a session is active
    pub fn idle_time(&self) -> Option<Duration> {
        let now = self.now();
        let state = self.state();
        state.credentials.as_ref()?;
        Some(now.saturating_duration_since(state.last_activity))
    }

    /// Time until forced logout, if a session is active
    pub fn remaining(&self) -> Option<Duration> {
        self.idle_time()
            .map(|idle| self.inner.config.hard_threshold().saturating_sub(idle))
    }

    /// Whole seconds until forced logout, zero without a session
    pub fn remaining_seconds(&self) -> u64 {
        self.remaining().map(|r| r.as_secs()).unwrap_or(0)
    }

    pub fn access_token(&self) -> Option<String> {
        self.state()
            .credentials
            .as_ref()
            .map(|c| c.access_token.clone())
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.state().credentials.clone()
    }

    /// The restartable part of the session
    pub fn snapshot(&self) -> Option<PersistedSession> {
        self.state().credentials.as_ref().map(PersistedSession::from)
    }
}
