//! Valkey session store for pluggable session managers.
//!
//! Sessions are opaque byte payloads keyed by an opaque token. Each one lives
//! under `prefix + token` in a Valkey (or Redis) key space, and expiry is left
//! to the store's native TTL.
//!
//! - [`ValkeySessionStore`] implements [`CtxSessionStore`] and
//!   [`IterableCtxSessionStore`] over any [`KeyValueClient`].
//! - [`RedisClient`] wraps a caller-owned Redis-protocol connection;
//!   [`MemoryKeyValueClient`] keeps keys in process.
//! - The context-free [`SessionStore`] surface exists for compatibility and
//!   always fails with [`SessionStoreError::ContextRequired`].
//!
//! ```no_run
//! use chrono::{Duration, Utc};
//! use omni_session_store::{
//!     CtxSessionStore, RedisClient, SessionContext, ValkeySessionStore,
//! };
//!
//! # async fn demo() -> omni_session_store::Result<()> {
//! let client = RedisClient::open("redis://127.0.0.1:6379/0").await?;
//! let store = ValkeySessionStore::with_prefix(client, "myapp:session:");
//! let ctx = SessionContext::background().with_timeout(std::time::Duration::from_secs(2));
//!
//! store
//!     .commit_ctx(&ctx, "token-1", b"encoded", Utc::now() + Duration::minutes(30))
//!     .await?;
//! assert_eq!(store.find_ctx(&ctx, "token-1").await?.as_deref(), Some(&b"encoded"[..]));
//! # Ok(())
//! # }
//! ```

mod client;
mod context;
mod contract;
mod error;
mod keyspace;
pub mod observability;
mod settings;
mod store;

pub use client::{KeyExpiry, KeyValueClient, MemoryKeyValueClient, RedisClient, ScanPage};
pub use context::SessionContext;
pub use contract::{CtxSessionStore, IterableCtxSessionStore, SessionStore};
pub use error::{Result, SessionStoreError};
pub use settings::{
    DEFAULT_KEY_PREFIX, DEFAULT_SCAN_COUNT, ExpiryPrecision, KEY_PREFIX_ENV, SCAN_COUNT_ENV,
    SessionStoreConfig, SessionStoreSettings, VALKEY_URL_ENV, load_session_store_settings,
    load_session_store_settings_from_paths,
};
pub use store::ValkeySessionStore;
