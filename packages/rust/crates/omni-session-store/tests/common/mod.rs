//! Shared test helpers for omni-session-store.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use omni_session_store::{
    KeyExpiry, KeyValueClient, MemoryKeyValueClient, Result, ScanPage, SessionStoreError,
};

/// Route store traces to the test writer; `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// In-process client that counts calls and can inject faults.
#[derive(Default)]
pub struct ProbeClient {
    pub inner: MemoryKeyValueClient,
    calls: AtomicUsize,
    scans: AtomicUsize,
    fail_on: Mutex<Option<&'static str>>,
    get_delay: Mutex<Option<Duration>>,
    extra_scan_keys: Mutex<Vec<String>>,
    delete_after_scan: Mutex<Vec<String>>,
}

impl ProbeClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total calls across every operation.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Calls to `scan`.
    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    /// Make every call to `operation` fail.
    pub fn fail_on(&self, operation: &'static str) {
        if let Ok(mut guard) = self.fail_on.lock() {
            *guard = Some(operation);
        }
    }

    /// Delay every `get` by `delay`.
    pub fn delay_gets(&self, delay: Duration) {
        if let Ok(mut guard) = self.get_delay.lock() {
            *guard = Some(delay);
        }
    }

    /// Append raw keys to the first scan page.
    pub fn inject_scan_keys(&self, keys: &[&str]) {
        if let Ok(mut guard) = self.extra_scan_keys.lock() {
            guard.extend(keys.iter().map(|key| (*key).to_string()));
        }
    }

    /// Delete `keys` right after the first scan page is produced.
    pub fn delete_after_scan(&self, keys: &[&str]) {
        if let Ok(mut guard) = self.delete_after_scan.lock() {
            guard.extend(keys.iter().map(|key| (*key).to_string()));
        }
    }

    fn enter(&self, operation: &'static str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failing = self.fail_on.lock().ok().and_then(|guard| *guard);
        if failing == Some(operation) {
            return Err(SessionStoreError::Backend(format!(
                "injected {operation} failure"
            )));
        }
        Ok(())
    }

    fn take(list: &Mutex<Vec<String>>) -> Vec<String> {
        list.lock()
            .map(|mut guard| std::mem::take(&mut *guard))
            .unwrap_or_default()
    }
}

#[async_trait]
impl KeyValueClient for ProbeClient {
    fn backend_name(&self) -> &'static str {
        "probe"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.enter("get")?;
        let delay = self.get_delay.lock().ok().and_then(|guard| *guard);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.enter("set")?;
        self.inner.set(key, value).await
    }

    async fn expire(&self, key: &str, ttl: KeyExpiry) -> Result<()> {
        self.enter("expire")?;
        self.inner.expire(key, ttl).await
    }

    async fn del(&self, key: &str) -> Result<()> {
        self.enter("del")?;
        self.inner.del(key).await
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanPage> {
        self.enter("scan")?;
        self.scans.fetch_add(1, Ordering::SeqCst);
        let mut page = self.inner.scan(cursor, pattern, count).await?;
        page.keys.extend(Self::take(&self.extra_scan_keys));
        for key in Self::take(&self.delete_after_scan) {
            self.inner.del(&key).await?;
        }
        Ok(page)
    }
}
