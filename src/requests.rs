use serde::Deserialize;

/// Request bodies are wrapped as `{"data": ...}`.
#[derive(Debug, Deserialize)]
pub struct Request<T> {
    pub data: T,
}
