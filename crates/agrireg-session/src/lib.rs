//! AgriReg session timeout
//!
//! This crate provides:
//! - A session store holding credentials and the last-activity timestamp
//! - An idle-timeout monitor with warning and hard-logout thresholds
//! - A countdown presenter backing the "session expiring" modal
//! - A supervisor that owns the one-second timers and cancels them on every exit path
//! - A request interceptor that attaches the bearer token and records activity
//! - Persistence of the restartable part of a session

pub mod auth;
pub mod clock;
pub mod config;
pub mod countdown;
pub mod error;
pub mod interceptor;
pub mod monitor;
pub mod persist;
pub mod store;
pub mod supervisor;
pub mod timer;

pub use auth::{
    normalize_email, normalize_roles, AuthError, Authenticator, Credentials, LoginResponse,
    UserProfile,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{SessionConfig, POLL_INTERVAL};
pub use countdown::{format_remaining, Countdown, CountdownAction, CountdownModal, CountdownTick};
pub use error::{Result, SessionError};
pub use interceptor::{OutgoingRequest, SessionInterceptor, AUTHORIZATION};
pub use monitor::{MonitorOutcome, TimeoutMonitor};
pub use persist::{PersistedSession, SessionFile};
pub use store::{LogoutHook, LogoutReason, SessionPhase, SessionStore};
pub use supervisor::{SessionTimeout, SessionTimeoutHandle};
pub use timer::TimerGuard;
