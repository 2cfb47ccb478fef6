use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct HashPayload {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyPayload {
    pub password: String,
    pub hash: String,
}

#[derive(Debug, Deserialize)]
pub struct NeedsRehashPayload {
    pub hash: String,
}
