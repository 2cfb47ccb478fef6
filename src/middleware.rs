use axum::{body::Body, extract::Request, http::Response, middleware::Next, Extension};
use chrono::Utc;

use crate::{
    types::{RequestID, ResponseMeta},
    utils::id::gen_id,
};

pub async fn request_id(mut req: Request, next: Next) -> Response<Body> {
    let id = gen_id("req", None);

    req.extensions_mut().insert(RequestID(id));

    next.run(req).await
}

pub async fn response_meta(
    Extension(RequestID(request_id)): Extension<RequestID>,
    mut req: Request,
    next: Next,
) -> Response<Body> {
    req.extensions_mut().insert(ResponseMeta::from([
        ("request_id".to_string(), request_id),
        (
            "timestamp".to_string(),
            Utc::now().timestamp_millis().to_string(),
        ),
    ]));

    next.run(req).await
}
