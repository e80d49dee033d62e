//! Pluggable session store capability contract.
//!
//! A session manager encodes session state into opaque bytes and hands it to
//! a store keyed by an opaque token. Three capability levels:
//! - [`SessionStore`]: legacy context-free surface.
//! - [`CtxSessionStore`]: the same operations carrying a [`SessionContext`].
//! - [`IterableCtxSessionStore`]: adds enumeration of every live session.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::context::SessionContext;
use crate::error::Result;

/// Context-free session store operations.
pub trait SessionStore: Send + Sync {
    /// Payload for `token`; `None` when missing or expired.
    fn find(&self, token: &str) -> Result<Option<Vec<u8>>>;

    /// Insert or replace `token` with `payload`, expiring at `expiry`.
    fn commit(&self, token: &str, payload: &[u8], expiry: DateTime<Utc>) -> Result<()>;

    /// Remove `token`. Removing a missing token succeeds.
    fn delete(&self, token: &str) -> Result<()>;
}

/// Session store operations bound to a caller context.
#[async_trait]
pub trait CtxSessionStore: SessionStore {
    /// Payload for `token`; `None` when missing or expired.
    async fn find_ctx(&self, ctx: &SessionContext, token: &str) -> Result<Option<Vec<u8>>>;

    /// Insert or replace `token` with `payload`, expiring at `expiry`.
    async fn commit_ctx(
        &self,
        ctx: &SessionContext,
        token: &str,
        payload: &[u8],
        expiry: DateTime<Utc>,
    ) -> Result<()>;

    /// Remove `token`. Removing a missing token succeeds.
    async fn delete_ctx(&self, ctx: &SessionContext, token: &str) -> Result<()>;
}

/// Context-bound store that can list every live session.
#[async_trait]
pub trait IterableCtxSessionStore: CtxSessionStore {
    /// Every live session as `token -> payload`.
    async fn all_ctx(&self, ctx: &SessionContext) -> Result<HashMap<String, Vec<u8>>>;
}
