use crate::config::Config;
use crate::models::Dataset;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub data: Arc<Dataset>,
}

impl AppState {
    pub fn new(config: Config, data: Dataset) -> Self {
        Self {
            config: Arc::new(config),
            data: Arc::new(data),
        }
    }
}
