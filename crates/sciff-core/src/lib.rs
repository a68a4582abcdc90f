//! SCIFF Core — domain models, error types, and repository trait
//! definitions shared by the persistence and access-control crates.

pub mod error;
pub mod models;
pub mod repository;
