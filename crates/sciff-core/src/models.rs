//! Domain models for the SCIFF access core.

pub mod account;
pub mod film;
pub mod login_activity;
pub mod subscription;
pub mod viewing_log;
