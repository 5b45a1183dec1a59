//! Core types for the Drivegate upload gateway.
//!
//! This crate holds the error taxonomy, the wire models shared between the
//! gateway and its clients, and the environment-driven configuration. It has
//! no I/O of its own; the provider and api crates build on top of it.

pub mod config;
pub mod error;
pub mod models;

pub use config::{Config, GoogleCredentials, ServiceAccountKey};
pub use error::{AppError, ErrorMetadata, LogLevel};
