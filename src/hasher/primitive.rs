use std::sync::Arc;

use bcrypt::BcryptResult;

use super::record::{RecordHeader, Version};
use crate::error::DecodeError;

/// The one-way function being tuned. Implementations generate and embed their own salt.
pub trait Primitive: Send + Sync {
    /// Hashes `password` at `cost`, returning a self-describing record.
    fn hash(&self, password: &[u8], cost: u32) -> BcryptResult<String>;

    /// Constant-time check of `password` against `record`.
    fn verify(&self, password: &[u8], record: &str) -> BcryptResult<bool>;

    /// Whether `record` was produced with parameters other than the ones `hash` would use at `cost`.
    fn needs_rehash(&self, record: &str, cost: u32) -> Result<bool, DecodeError>;
}

/// [`Primitive`] backed by the `bcrypt` crate, which emits `$2b$` records.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bcrypt;

impl Bcrypt {
    pub const VERSION: Version = Version::TwoB;
}

impl Primitive for Bcrypt {
    fn hash(&self, password: &[u8], cost: u32) -> BcryptResult<String> {
        bcrypt::hash(password, cost)
    }

    fn verify(&self, password: &[u8], record: &str) -> BcryptResult<bool> {
        bcrypt::verify(password, record)
    }

    fn needs_rehash(&self, record: &str, cost: u32) -> Result<bool, DecodeError> {
        let header = RecordHeader::parse(record)?;

        Ok(header.version != Self::VERSION || header.cost != cost)
    }
}

impl<T: Primitive + ?Sized> Primitive for Arc<T> {
    fn hash(&self, password: &[u8], cost: u32) -> BcryptResult<String> {
        (**self).hash(password, cost)
    }

    fn verify(&self, password: &[u8], record: &str) -> BcryptResult<bool> {
        (**self).verify(password, record)
    }

    fn needs_rehash(&self, record: &str, cost: u32) -> Result<bool, DecodeError> {
        (**self).needs_rehash(record, cost)
    }
}
