pub mod config;
pub mod constants;
pub mod error;
pub mod error_handlers;
pub mod hasher;
pub mod middleware;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod state;
pub mod types;
pub mod utils;

pub use config::{HasherConfig, ServerConfig};
pub use error::{ConfigError, DecodeError, HasherError};
pub use hasher::AdaptiveHasher;
