use std::sync::Arc;

use crate::config::Config;
use crate::services::upstream::UpstreamClient;

/// Handler state. Read-only: requests share the config and the upstream
/// client, nothing is written between requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub upstream: Arc<dyn UpstreamClient>,
}

impl AppState {
    pub fn new(config: Config, upstream: Arc<dyn UpstreamClient>) -> Self {
        Self {
            config: Arc::new(config),
            upstream,
        }
    }
}
