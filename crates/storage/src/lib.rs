#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod local;
pub mod memory;
pub mod model;
pub mod rest;

#[cfg(test)]
mod tests;

pub use local::{Key, LocalStore, RETENTION_DAYS, WORKOUT_ID_PREFIX};
pub use memory::MemoryStore;
pub use rest::{Api, Method, RemoteSplit, ReqwestSendRequest, Request, Response, SendRequest};

/// Durable, asynchronous, string-keyed store holding JSON documents. Assumed
/// crash-safe per write; the platform supplies the implementation.
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
    async fn remove_many(&self, keys: &[String]) -> Result<(), StoreError>;
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

impl From<StoreError> for ferrum_domain::StorageError {
    fn from(value: StoreError) -> Self {
        ferrum_domain::StorageError::Other(Box::new(value))
    }
}
