mod handlers;
mod requests;
mod responses;

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/hash", post(handlers::hash))
        .route("/verify", post(handlers::verify))
        .route("/needs-rehash", post(handlers::needs_rehash))
        .route("/cost", get(handlers::cost))
}
