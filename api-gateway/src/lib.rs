pub mod config;
pub mod handlers;
pub mod services;
pub mod startup;

use config::UpstreamSettings;
use services::UpstreamClient;
use std::sync::Arc;

/// Shared application state: the upstream client and its settings.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
    pub settings: Arc<UpstreamSettings>,
}

impl AppState {
    pub fn new(upstream: Arc<UpstreamClient>, settings: UpstreamSettings) -> Self {
        Self {
            upstream,
            settings: Arc::new(settings),
        }
    }
}
