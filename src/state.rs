use std::sync::Arc;

use crate::{config::ServerConfig, hasher::AdaptiveHasher};

pub struct State {
    pub hasher: Arc<AdaptiveHasher>,
    pub config: ServerConfig,
}

pub type AppState = Arc<State>;
