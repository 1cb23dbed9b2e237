use crate::config::ServerConfig;
use conclave_core::config::AppConfig;
use conclave_core::questions::Question;
use conclave_core::storage::Store;
use std::sync::Arc;

/// Shared handler state: the store plus configuration loaded once at
/// startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Arc<AppConfig>,
    pub questions: Arc<Vec<Question>>,
    pub server: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        store: Store,
        config: AppConfig,
        questions: Vec<Question>,
        server: ServerConfig,
    ) -> Self {
        Self {
            store,
            config: Arc::new(config),
            questions: Arc::new(questions),
            server: Arc::new(server),
        }
    }
}
