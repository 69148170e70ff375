use crate::config::Config;
use crate::session::SessionController;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Active sessions (session_id → controller)
    pub sessions: Arc<RwLock<HashMap<String, Arc<SessionController>>>>,

    /// Service configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config: Arc::new(config),
        }
    }
}
