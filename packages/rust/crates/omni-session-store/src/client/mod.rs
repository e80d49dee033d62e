//! Key-value client capability consumed by the session store.
//!
//! The store only ever talks to this trait. [`RedisClient`] speaks the Redis
//! protocol to Valkey or Redis; [`MemoryKeyValueClient`] keeps keys in
//! process with the same TTL and SCAN semantics.

mod memory;
mod valkey;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

pub use memory::MemoryKeyValueClient;
pub use valkey::RedisClient;

/// Relative TTL handed to the store after a SET.
///
/// Non-positive values are forwarded unchanged; the store deletes the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyExpiry {
    /// `EXPIRE key <seconds>`.
    Seconds(i64),
    /// `PEXPIRE key <milliseconds>`.
    Milliseconds(i64),
}

/// One page of a cursor scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Cursor for the next call; `0` once the iteration is complete.
    pub cursor: u64,
    /// Keys returned by this page. May repeat keys seen on earlier pages.
    /// Keys that are not valid UTF-8 are dropped by the client.
    pub keys: Vec<String>,
}

/// Capability surface of a remote key-value store.
///
/// Implementations surface their own errors verbatim; a missing key is
/// `Ok(None)` from [`KeyValueClient::get`], never an error.
#[async_trait]
pub trait KeyValueClient: Send + Sync {
    /// Backend identifier for logs.
    fn backend_name(&self) -> &'static str;

    /// `GET key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// `SET key value`. Clears any TTL the key had.
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// `EXPIRE`/`PEXPIRE key ttl`. A missing key is left missing.
    async fn expire(&self, key: &str, ttl: KeyExpiry) -> Result<()>;

    /// `DEL key`. Deleting a missing key succeeds.
    async fn del(&self, key: &str) -> Result<()>;

    /// `SCAN cursor MATCH pattern COUNT count`.
    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanPage>;

    /// SET followed by EXPIRE as one batch.
    ///
    /// Not atomic: the first error reply is returned, and a failure after the
    /// SET leaves the value stored without a TTL.
    async fn set_with_expiry(&self, key: &str, value: &[u8], ttl: KeyExpiry) -> Result<()> {
        self.set(key, value).await?;
        self.expire(key, ttl).await
    }
}

#[async_trait]
impl<T: KeyValueClient + ?Sized> KeyValueClient for Arc<T> {
    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value).await
    }

    async fn expire(&self, key: &str, ttl: KeyExpiry) -> Result<()> {
        (**self).expire(key, ttl).await
    }

    async fn del(&self, key: &str) -> Result<()> {
        (**self).del(key).await
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanPage> {
        (**self).scan(cursor, pattern, count).await
    }

    async fn set_with_expiry(&self, key: &str, value: &[u8], ttl: KeyExpiry) -> Result<()> {
        (**self).set_with_expiry(key, value, ttl).await
    }
}
