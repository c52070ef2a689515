//! Storage boundary consumed by the worker.

use async_trait::async_trait;

use super::connection::CacheDb;
use crate::{Error, Request, Response};

/// Named stores mapping request identity to a stored response.
///
/// Stores are created lazily by `open` or the first write, and removed
/// whole by `delete_store`; entries are never expired individually.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    async fn open(&self, store: &str) -> Result<(), Error>;

    async fn get(&self, store: &str, request: &Request) -> Result<Option<Response>, Error>;

    async fn put(&self, store: &str, request: &Request, response: &Response) -> Result<(), Error>;

    /// Overwrite only while `store` exists; never creates it. Returns whether it was written.
    async fn replace(&self, store: &str, request: &Request, response: &Response) -> Result<bool, Error>;

    /// Write all pairs atomically.
    async fn put_all(&self, store: &str, pairs: &[(Request, Response)]) -> Result<(), Error>;

    async fn delete(&self, store: &str, request: &Request) -> Result<bool, Error>;

    async fn keys(&self, store: &str) -> Result<Vec<Request>, Error>;

    async fn store_names(&self) -> Result<Vec<String>, Error>;

    async fn delete_store(&self, store: &str) -> Result<bool, Error>;
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn open(&self, store: &str) -> Result<(), Error> {
        self.open_store(store).await
    }

    async fn get(&self, store: &str, request: &Request) -> Result<Option<Response>, Error> {
        self.get_entry(store, request).await
    }

    async fn put(&self, store: &str, request: &Request, response: &Response) -> Result<(), Error> {
        self.put_entry(store, request, response).await
    }

    async fn replace(&self, store: &str, request: &Request, response: &Response) -> Result<bool, Error> {
        self.replace_entry(store, request, response).await
    }

    async fn put_all(&self, store: &str, pairs: &[(Request, Response)]) -> Result<(), Error> {
        self.put_entries(store, pairs).await
    }

    async fn delete(&self, store: &str, request: &Request) -> Result<bool, Error> {
        self.delete_entry(store, request).await
    }

    async fn keys(&self, store: &str) -> Result<Vec<Request>, Error> {
        self.entry_keys(store).await
    }

    async fn store_names(&self) -> Result<Vec<String>, Error> {
        CacheDb::store_names(self).await
    }

    async fn delete_store(&self, store: &str) -> Result<bool, Error> {
        CacheDb::delete_store(self, store).await
    }
}
