use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HashResponse {
    pub hash: String,
    pub cost: u32,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub needs_rehash: bool,
    /// Fresh hash at the current cost, present when the password matched an under-cost hash.
    pub rehash: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NeedsRehashResponse {
    pub needs_rehash: bool,
    pub hash_cost: u32,
    pub current_cost: u32,
}

#[derive(Debug, Serialize)]
pub struct CostResponse {
    pub current_cost: u32,
    pub min_cost: u32,
    pub min_hash_time_ms: u64,
}
