#![allow(missing_docs)]

mod common;

use std::time::Duration as StdDuration;

use anyhow::Result;
use chrono::{Duration, Utc};
use common::ProbeClient;
use omni_session_store::{
    CtxSessionStore, IterableCtxSessionStore, SessionContext, SessionStore, SessionStoreError,
    ValkeySessionStore,
};
use tokio_util::sync::CancellationToken;

fn probe_store() -> ValkeySessionStore<ProbeClient> {
    common::init_tracing();
    ValkeySessionStore::new(ProbeClient::new())
}

#[tokio::test]
async fn legacy_variants_fail_without_touching_the_store() -> Result<()> {
    let store = probe_store();
    let ctx = SessionContext::background();
    let expiry = Utc::now() + Duration::minutes(1);
    store.commit_ctx(&ctx, "token", b"kept", expiry).await?;
    let calls_before = store.client().calls();

    let find = store.find("token");
    let commit = store.commit("token", b"overwrite", expiry);
    let delete = store.delete("token");

    assert!(matches!(
        find,
        Err(SessionStoreError::ContextRequired { operation: "find" })
    ));
    assert!(matches!(
        commit,
        Err(SessionStoreError::ContextRequired { operation: "commit" })
    ));
    assert!(matches!(
        delete,
        Err(SessionStoreError::ContextRequired { operation: "delete" })
    ));
    assert_eq!(store.client().calls(), calls_before);
    assert_eq!(
        store.find_ctx(&ctx, "token").await?.as_deref(),
        Some(&b"kept"[..])
    );
    Ok(())
}

#[test]
fn legacy_error_names_the_context_variant() {
    let store = probe_store();
    let Err(error) = store.delete("token") else {
        panic!("legacy delete must fail");
    };
    assert!(error.is_context_error());
    assert!(
        error.to_string().contains("delete_ctx"),
        "unexpected message: {error}"
    );
}

#[tokio::test]
async fn cancelled_context_fails_before_any_io() {
    let store = probe_store();
    let ctx = SessionContext::background();
    ctx.cancel();

    let find = store.find_ctx(&ctx, "token").await;
    let commit = store
        .commit_ctx(&ctx, "token", b"payload", Utc::now() + Duration::minutes(1))
        .await;
    let delete = store.delete_ctx(&ctx, "token").await;
    let all = store.all_ctx(&ctx).await;

    assert!(matches!(find, Err(SessionStoreError::Cancelled { operation: "find" })));
    assert!(matches!(commit, Err(SessionStoreError::Cancelled { operation: "commit" })));
    assert!(matches!(delete, Err(SessionStoreError::Cancelled { operation: "delete" })));
    assert!(matches!(all, Err(SessionStoreError::Cancelled { operation: "all" })));
    assert_eq!(store.client().calls(), 0);
}

#[tokio::test]
async fn expired_deadline_fails_before_any_io() {
    let store = probe_store();
    let ctx = SessionContext::background().with_timeout(StdDuration::ZERO);

    let find = store.find_ctx(&ctx, "token").await;

    assert!(matches!(
        find,
        Err(SessionStoreError::DeadlineExceeded { operation: "find" })
    ));
    assert_eq!(store.client().calls(), 0);
}

#[tokio::test]
async fn deadline_interrupts_slow_round_trip() {
    let store = probe_store();
    store.client().delay_gets(StdDuration::from_secs(5));
    let ctx = SessionContext::background().with_timeout(StdDuration::from_millis(50));

    let started = std::time::Instant::now();
    let find = store.find_ctx(&ctx, "token").await;

    assert!(matches!(
        find,
        Err(SessionStoreError::DeadlineExceeded { operation: "find" })
    ));
    assert!(started.elapsed() < StdDuration::from_secs(5));
}

#[tokio::test]
async fn cancelling_parent_token_interrupts_in_flight_call() {
    let store = probe_store();
    store.client().delay_gets(StdDuration::from_secs(5));
    let parent = CancellationToken::new();
    let ctx = SessionContext::with_cancellation(parent.clone()).child();

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(StdDuration::from_millis(20)).await;
        parent.cancel();
    });
    let find = store.find_ctx(&ctx, "token").await;
    let _ = canceller.await;

    assert!(matches!(find, Err(SessionStoreError::Cancelled { operation: "find" })));
}

#[test]
fn earlier_deadline_wins() {
    let now = tokio::time::Instant::now();
    let early = now + StdDuration::from_millis(10);
    let late = now + StdDuration::from_secs(10);

    let ctx = SessionContext::background()
        .with_deadline(early)
        .with_deadline(late);
    assert_eq!(ctx.deadline(), Some(early));

    let ctx = SessionContext::background()
        .with_deadline(late)
        .with_deadline(early);
    assert_eq!(ctx.deadline(), Some(early));
    assert_eq!(ctx.child().deadline(), Some(early));
}
