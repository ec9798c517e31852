//! AgriReg Console Library
//!
//! Terminal front end for registry operators. Hosts the login screen, the
//! dashboard and the session-timeout modal on top of `agrireg-session`.

pub mod app;
pub mod auth;
pub mod ui;

pub use app::App;
