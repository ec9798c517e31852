//! Screen modules for different views

pub mod dashboard;
pub mod help;
pub mod login;
