//! Valkey-backed session store: session token → opaque payload with TTL.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::client::{KeyExpiry, KeyValueClient, RedisClient};
use crate::context::SessionContext;
use crate::contract::{CtxSessionStore, IterableCtxSessionStore, SessionStore};
use crate::error::{Result, SessionStoreError};
use crate::keyspace::Keyspace;
use crate::observability::SessionStoreEvent;
use crate::settings::{ExpiryPrecision, SessionStoreConfig};

/// Session store keeping each session under `prefix + token` in a key-value
/// store, with expiry delegated to the store's native TTL.
///
/// The client handle is injected and never opened or closed here. The prefix
/// is fixed at construction. Only the context-aware operations are
/// supported; the [`SessionStore`] variants always fail without I/O.
pub struct ValkeySessionStore<C = RedisClient> {
    client: C,
    keyspace: Keyspace,
    scan_count: usize,
    expiry_precision: ExpiryPrecision,
}

impl<C: KeyValueClient> ValkeySessionStore<C> {
    /// Store using [`crate::DEFAULT_KEY_PREFIX`].
    pub fn new(client: C) -> Self {
        Self::with_config(client, SessionStoreConfig::default())
    }

    /// Store using a custom prefix, taken verbatim.
    pub fn with_prefix(client: C, prefix: impl Into<String>) -> Self {
        Self::with_config(client, SessionStoreConfig::default().with_key_prefix(prefix))
    }

    /// Store using a fully resolved configuration.
    pub fn with_config(client: C, config: SessionStoreConfig) -> Self {
        let store = Self {
            client,
            keyspace: Keyspace::new(config.key_prefix),
            scan_count: config.scan_count.max(1),
            expiry_precision: config.expiry_precision,
        };
        tracing::debug!(
            event = SessionStoreEvent::StoreInitialized.as_str(),
            backend = store.client.backend_name(),
            key_prefix = %store.keyspace.prefix(),
            scan_count = store.scan_count,
            expiry_precision = ?store.expiry_precision,
            "session store initialized"
        );
        store
    }

    /// Namespace prepended to every token.
    pub fn prefix(&self) -> &str {
        self.keyspace.prefix()
    }

    /// Keys requested per `SCAN` round trip.
    pub fn scan_count(&self) -> usize {
        self.scan_count
    }

    /// TTL resolution used by commits.
    pub fn expiry_precision(&self) -> ExpiryPrecision {
        self.expiry_precision
    }

    /// Injected client handle.
    pub fn client(&self) -> &C {
        &self.client
    }

    fn ttl_until(&self, expiry: DateTime<Utc>) -> KeyExpiry {
        let remaining = expiry - Utc::now();
        match self.expiry_precision {
            ExpiryPrecision::Seconds => KeyExpiry::Seconds(remaining.num_seconds()),
            ExpiryPrecision::Milliseconds => KeyExpiry::Milliseconds(remaining.num_milliseconds()),
        }
    }

    async fn lookup(
        &self,
        ctx: &SessionContext,
        operation: &'static str,
        token: &str,
    ) -> Result<Option<Vec<u8>>> {
        let key = self.keyspace.key(token);
        ctx.run(operation, self.client.get(&key)).await
    }

    fn refuse(&self, operation: &'static str) -> SessionStoreError {
        tracing::warn!(
            event = SessionStoreEvent::LegacyCallRefused.as_str(),
            operation,
            key_prefix = %self.keyspace.prefix(),
            "session store call without context refused"
        );
        SessionStoreError::ContextRequired { operation }
    }
}

impl<C: KeyValueClient> fmt::Debug for ValkeySessionStore<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValkeySessionStore")
            .field("backend", &self.client.backend_name())
            .field("key_prefix", &self.keyspace.prefix())
            .field("scan_count", &self.scan_count)
            .field("expiry_precision", &self.expiry_precision)
            .finish_non_exhaustive()
    }
}

impl<C: KeyValueClient> SessionStore for ValkeySessionStore<C> {
    fn find(&self, _token: &str) -> Result<Option<Vec<u8>>> {
        Err(self.refuse("find"))
    }

    fn commit(&self, _token: &str, _payload: &[u8], _expiry: DateTime<Utc>) -> Result<()> {
        Err(self.refuse("commit"))
    }

    fn delete(&self, _token: &str) -> Result<()> {
        Err(self.refuse("delete"))
    }
}

#[async_trait]
impl<C: KeyValueClient> CtxSessionStore for ValkeySessionStore<C> {
    async fn find_ctx(&self, ctx: &SessionContext, token: &str) -> Result<Option<Vec<u8>>> {
        let payload = self.lookup(ctx, "find", token).await?;
        match &payload {
            Some(bytes) => tracing::debug!(
                event = SessionStoreEvent::SessionLoaded.as_str(),
                backend = self.client.backend_name(),
                payload_bytes = bytes.len(),
                "session payload loaded"
            ),
            None => tracing::debug!(
                event = SessionStoreEvent::SessionMissed.as_str(),
                backend = self.client.backend_name(),
                "session not found or expired"
            ),
        }
        Ok(payload)
    }

    /// Stores the payload, then sets its TTL to `expiry - now`.
    ///
    /// SET and EXPIRE go out as one pipelined batch, not a transaction: if the
    /// EXPIRE fails the value stays stored without a TTL. Either error is
    /// returned. An expiry already in the past makes the store drop the key.
    async fn commit_ctx(
        &self,
        ctx: &SessionContext,
        token: &str,
        payload: &[u8],
        expiry: DateTime<Utc>,
    ) -> Result<()> {
        let key = self.keyspace.key(token);
        let ttl = self.ttl_until(expiry);
        ctx.run("commit", self.client.set_with_expiry(&key, payload, ttl))
            .await?;
        tracing::debug!(
            event = SessionStoreEvent::SessionCommitted.as_str(),
            backend = self.client.backend_name(),
            payload_bytes = payload.len(),
            ttl = ?ttl,
            "session committed"
        );
        Ok(())
    }

    async fn delete_ctx(&self, ctx: &SessionContext, token: &str) -> Result<()> {
        let key = self.keyspace.key(token);
        ctx.run("delete", self.client.del(&key)).await?;
        tracing::debug!(
            event = SessionStoreEvent::SessionDeleted.as_str(),
            backend = self.client.backend_name(),
            "session deleted"
        );
        Ok(())
    }
}

#[async_trait]
impl<C: KeyValueClient> IterableCtxSessionStore for ValkeySessionStore<C> {
    /// Every live session under this prefix.
    ///
    /// Walks `SCAN prefix*` page by page until the cursor returns to zero, then
    /// reads each key with a separate GET. Not a snapshot: a session that
    /// expires or is deleted between its SCAN page and its GET is left out of
    /// the result without error, and sessions written during the walk may or
    /// may not appear.
    async fn all_ctx(&self, ctx: &SessionContext) -> Result<HashMap<String, Vec<u8>>> {
        let mut sessions = HashMap::new();
        let mut cursor = 0_u64;
        let mut pages = 0_usize;
        let mut omitted = 0_usize;
        loop {
            let page = ctx
                .run(
                    "all",
                    self.client
                        .scan(cursor, self.keyspace.scan_pattern(), self.scan_count),
                )
                .await?;
            pages += 1;
            tracing::debug!(
                event = SessionStoreEvent::ScanPageFetched.as_str(),
                backend = self.client.backend_name(),
                cursor,
                next_cursor = page.cursor,
                keys = page.keys.len(),
                "session scan page fetched"
            );
            for key in &page.keys {
                let Some(token) = self.keyspace.token(key) else {
                    continue;
                };
                if sessions.contains_key(token) {
                    continue;
                }
                match self.lookup(ctx, "all", token).await? {
                    Some(payload) => {
                        sessions.insert(token.to_string(), payload);
                    }
                    None => omitted += 1,
                }
            }
            cursor = page.cursor;
            if cursor == 0 {
                break;
            }
        }
        tracing::debug!(
            event = SessionStoreEvent::SessionsEnumerated.as_str(),
            backend = self.client.backend_name(),
            key_prefix = %self.keyspace.prefix(),
            sessions = sessions.len(),
            pages,
            omitted,
            "session enumeration completed"
        );
        Ok(sessions)
    }
}
