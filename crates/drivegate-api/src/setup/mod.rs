//! Application setup and initialization
//!
//! All initialization logic lives here rather than in main.rs, so the pieces
//! can be wired together in tests.

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use drivegate_core::Config;
use drivegate_provider::GoogleDrive;
use std::sync::Arc;

/// Initialize the entire application
pub fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.is_production())
        .context("Failed to initialize telemetry")?;

    tracing::info!(
        environment = %config.environment(),
        root_folder_id = %config.root_folder_id,
        validate_destination = config.validate_destination,
        "Configuration loaded and validated successfully"
    );

    let provider =
        GoogleDrive::new(config.credentials.clone()).context("Failed to create Drive client")?;

    let state = Arc::new(AppState::new(Arc::new(provider), config.clone()));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
