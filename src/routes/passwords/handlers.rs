use super::{
    requests::{HashPayload, NeedsRehashPayload, VerifyPayload},
    responses::{CostResponse, HashResponse, NeedsRehashResponse, VerifyResponse},
};
use crate::{
    constants::BCRYPT_MAX_PASSWORD_BYTES,
    error::HasherError,
    error_handlers::error_response,
    hasher::{record, AdaptiveHasher},
    requests::Request,
    responses::{CommonError, Response},
    state::AppState,
    types::ResponseMeta,
};
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use std::collections::HashMap;
use tokio::task;
use tracing::{event, Level};
use validator::ValidateLength;

pub async fn hash(
    Extension(response_meta): Extension<ResponseMeta>,
    State(state): State<AppState>,
    payload: Result<Json<Request<HashPayload>>, JsonRejection>,
) -> response::Response<Body> {
    let Json(Request { data: payload }) = match payload {
        Ok(p) => p,
        Err(err) => {
            return CommonError::JsonRejection {
                err,
                meta: response_meta,
            }
            .into_response()
        }
    };

    if let Some(response) = password_error(&payload.password, &response_meta) {
        return response;
    }

    let result = blocking(&state, 1, &response_meta, move |hasher| {
        let hash = hasher.hash(&payload.password)?;
        let cost = record::cost_of(&hash)?;

        Ok(HashResponse { hash, cost })
    })
    .await;

    match result {
        Err(err) => err.into_response(),
        Ok(data) => (
            StatusCode::CREATED,
            Response::new(
                Some(data),
                None,
                Some(response_meta),
                Some(HashMap::from([("verify", "/passwords/verify")])),
            ),
        )
            .into_response(),
    }
}

/// Verifies a password. When it matches a hash weaker than the current cost, a replacement hash
/// is returned for the caller to store.
pub async fn verify(
    Extension(response_meta): Extension<ResponseMeta>,
    State(state): State<AppState>,
    payload: Result<Json<Request<VerifyPayload>>, JsonRejection>,
) -> response::Response<Body> {
    let Json(Request { data: payload }) = match payload {
        Ok(p) => p,
        Err(err) => {
            return CommonError::JsonRejection {
                err,
                meta: response_meta,
            }
            .into_response()
        }
    };

    if let Some(response) = password_error(&payload.password, &response_meta) {
        return response;
    }

    let result = blocking(&state, 2, &response_meta, move |hasher| {
        let valid = hasher.verify(&payload.password, &payload.hash)?;
        let needs_rehash = hasher.needs_rehash(&payload.hash)?;

        let rehash = if valid && needs_rehash {
            Some(hasher.hash(&payload.password)?)
        } else {
            None
        };

        Ok(VerifyResponse {
            valid,
            needs_rehash,
            rehash,
        })
    })
    .await;

    match result {
        Err(err) => err.into_response(),
        Ok(data) => Response::new(Some(data), None, Some(response_meta), None).into_response(),
    }
}

pub async fn needs_rehash(
    Extension(response_meta): Extension<ResponseMeta>,
    State(state): State<AppState>,
    payload: Result<Json<Request<NeedsRehashPayload>>, JsonRejection>,
) -> response::Response<Body> {
    let Json(Request { data: payload }) = match payload {
        Ok(p) => p,
        Err(err) => {
            return CommonError::JsonRejection {
                err,
                meta: response_meta,
            }
            .into_response()
        }
    };

    let result = state.hasher.needs_rehash(&payload.hash).and_then(|needs_rehash| {
        Ok(NeedsRehashResponse {
            needs_rehash,
            hash_cost: record::cost_of(&payload.hash)?,
            current_cost: state.hasher.current_cost(),
        })
    });

    match result {
        Err(err) => CommonError::Hasher {
            err,
            meta: response_meta,
        }
        .into_response(),
        Ok(data) => Response::new(Some(data), None, Some(response_meta), None).into_response(),
    }
}

pub async fn cost(
    Extension(response_meta): Extension<ResponseMeta>,
    State(state): State<AppState>,
) -> response::Response<Body> {
    let config = state.hasher.config();

    Response::new(
        Some(CostResponse {
            current_cost: state.hasher.current_cost(),
            min_cost: config.min_cost,
            min_hash_time_ms: config.min_hash_time.as_millis() as u64,
        }),
        None,
        Some(response_meta),
        None,
    )
    .into_response()
}

/// Runs `f` on the blocking pool. Hashing is deliberately slow and must stay off the runtime.
async fn blocking<T, F>(
    state: &AppState,
    internal_code: usize,
    response_meta: &ResponseMeta,
    f: F,
) -> Result<T, CommonError>
where
    T: Send + 'static,
    F: FnOnce(&AdaptiveHasher) -> Result<T, HasherError> + Send + 'static,
{
    let hasher = state.hasher.clone();

    match task::spawn_blocking(move || f(hasher.as_ref())).await {
        Err(e) => {
            event!(Level::ERROR, error = format!("{e}"));

            Err(CommonError::InternalServerError {
                internal_code,
                meta: response_meta.clone(),
            })
        }
        Ok(Err(err)) => Err(CommonError::Hasher {
            err,
            meta: response_meta.clone(),
        }),
        Ok(Ok(data)) => Ok(data),
    }
}

fn password_error(
    password: &str,
    response_meta: &ResponseMeta,
) -> Option<response::Response<Body>> {
    if !password.validate_length(Some(1), None, None) {
        return Some(
            error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Password Required",
                "The password must not be empty.",
                Some("body.data.password"),
                HashMap::new(),
                response_meta.clone(),
            )
            .into_response(),
        );
    }

    if password.len() > BCRYPT_MAX_PASSWORD_BYTES {
        return Some(
            error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Password Too Long",
                "The password must not be more than 72 bytes long.",
                Some("body.data.password"),
                HashMap::from([("length", json!(password.len()))]),
                response_meta.clone(),
            )
            .into_response(),
        );
    }

    None
}
