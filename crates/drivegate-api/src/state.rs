//! Application state shared across handlers.

use crate::broker::SessionBroker;
use drivegate_core::Config;
use drivegate_provider::DriveProvider;
use std::sync::Arc;

/// Main application state: provider client, session broker, and configuration.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn DriveProvider>,
    pub broker: SessionBroker,
    pub config: Config,
    pub is_production: bool,
}

impl AppState {
    pub fn new(provider: Arc<dyn DriveProvider>, config: Config) -> Self {
        let broker = SessionBroker::new(provider.clone(), config.clone());
        let is_production = config.is_production();
        Self {
            provider,
            broker,
            config,
            is_production,
        }
    }
}

const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AppState>();
};
