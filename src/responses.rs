use std::collections::HashMap;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{self, IntoResponse},
    Json,
};
use bcrypt::BcryptError;
use serde::Serialize;
use serde_json::Value;
use tracing::{event, Level};

use crate::{error::HasherError, types::ResponseMeta};

#[derive(Debug, Serialize)]
pub struct Response<T> {
    data: Option<T>,
    errors: Vec<Error>,
    meta: HashMap<String, String>,
    links: HashMap<String, String>,
}

impl<T> Response<T> {
    pub fn new(
        data: Option<T>,
        errors: Option<Vec<Error>>,
        meta: Option<HashMap<String, String>>,
        links: Option<HashMap<&str, &str>>,
    ) -> Self {
        Self {
            data,
            errors: errors.unwrap_or_default(),
            meta: meta.unwrap_or_default(),
            links: links
                .unwrap_or_default()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl<T: Serialize> IntoResponse for Response<T> {
    fn into_response(self) -> response::Response {
        Json(self).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct Error {
    pub code: u16,
    pub message: String,
    pub detail: String,
    pub location: String,
    pub meta: HashMap<String, Value>,
}

impl Error {
    pub fn new(
        code: u16,
        message: &str,
        detail: &str,
        location: Option<&str>,
        meta: HashMap<&str, Value>,
    ) -> Self {
        Self {
            code,
            message: message.to_string(),
            detail: detail.to_string(),
            location: location.unwrap_or_default().to_string(),
            meta: meta.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }
}

pub enum CommonError {
    JsonRejection {
        err: JsonRejection,
        meta: ResponseMeta,
    },
    Hasher {
        err: HasherError,
        meta: ResponseMeta,
    },
    InternalServerError {
        internal_code: usize,
        meta: ResponseMeta,
    },
}

impl CommonError {
    fn status_and_error(&self) -> (StatusCode, Error) {
        match self {
            Self::JsonRejection { err, .. } => {
                let (message, detail, location) = match err {
                    JsonRejection::MissingJsonContentType(_) => (
                        "Missing JSON Content-Type Header",
                        "The request must contain a Content-Type: application/json header.",
                        "headers.content_type",
                    ),
                    JsonRejection::JsonDataError(_) => (
                        "Invalid Request Body Schema",
                        "The request body doesn't follow the endpoint's schema.",
                        "body",
                    ),
                    JsonRejection::JsonSyntaxError(_) => (
                        "Invalid JSON Syntax",
                        "The request body contains invalid JSON.",
                        "body",
                    ),
                    JsonRejection::BytesRejection(_) => (
                        "Bytes Rejection",
                        "The request body's JSON could not be extracted.",
                        "body",
                    ),
                    _ => (
                        "Unknown JSON Error",
                        "An unknown error occurred parsing the request body's JSON.",
                        "body",
                    ),
                };

                let status = err.status();

                (
                    status,
                    Error::new(status.as_u16(), message, detail, Some(location), HashMap::new()),
                )
            }
            Self::Hasher {
                err: HasherError::Decode(decode),
                ..
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Error::new(
                    StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
                    "Unsupported Hash",
                    &decode.to_string(),
                    Some("body.data.hash"),
                    HashMap::new(),
                ),
            ),
            Self::Hasher {
                err:
                    HasherError::Primitive(
                        BcryptError::InvalidHash(_)
                        | BcryptError::InvalidBase64(_)
                        | BcryptError::CostNotAllowed(_)
                        | BcryptError::InvalidCost(_)
                        | BcryptError::InvalidPrefix(_),
                    ),
                ..
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Error::new(
                    StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
                    "Invalid Hash",
                    "The hash has a bcrypt header but bcrypt cannot use its cost, salt or digest.",
                    Some("body.data.hash"),
                    HashMap::new(),
                ),
            ),
            Self::Hasher { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Error::new(
                    StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                    "Hashing Failed",
                    "The password could not be hashed or verified.",
                    None,
                    HashMap::new(),
                ),
            ),
            Self::InternalServerError { internal_code, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Error::new(
                    StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                    "Internal Server Error",
                    "An unexpected error occurred.",
                    None,
                    HashMap::from([("internal_code", Value::from(*internal_code))]),
                ),
            ),
        }
    }
}

impl IntoResponse for CommonError {
    fn into_response(self) -> response::Response {
        let (status, error) = self.status_and_error();

        if status.is_server_error() {
            if let Self::Hasher { err, .. } = &self {
                event!(Level::ERROR, error = format!("{err}"));
            }
        }

        let meta = match self {
            Self::JsonRejection { meta, .. }
            | Self::Hasher { meta, .. }
            | Self::InternalServerError { meta, .. } => meta,
        };

        (
            status,
            Response::<Value>::new(None, Some(vec![error]), Some(meta), None),
        )
            .into_response()
    }
}
