use std::collections::HashMap;

use axum::{extract, http::StatusCode, response::IntoResponse, Extension};
use serde_json::{json, Value};

use crate::{
    responses::{Error, Response},
    types::ResponseMeta,
};

pub async fn handler_404(
    Extension(response_meta): Extension<ResponseMeta>,
    request: extract::Request,
) -> impl IntoResponse {
    error_response(
        StatusCode::NOT_FOUND,
        "Not Found",
        "This route does not exist.",
        Some("path"),
        HashMap::from([("path", json!(request.uri().path()))]),
        response_meta,
    )
}

/// A response carrying a single error.
pub fn error_response(
    status: StatusCode,
    message: &str,
    detail: &str,
    location: Option<&str>,
    meta: HashMap<&str, Value>,
    response_meta: ResponseMeta,
) -> (StatusCode, Response<Value>) {
    (
        status,
        Response::new(
            None,
            Some(vec![Error::new(
                status.as_u16(),
                message,
                detail,
                location,
                meta,
            )]),
            Some(response_meta),
            None,
        ),
    )
}
