use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct RequestID(pub String);

/// `meta` object attached to every response.
pub type ResponseMeta = HashMap<String, String>;
