use async_trait::async_trait;
use redis::aio::{ConnectionLike, MultiplexedConnection};

use super::{KeyExpiry, KeyValueClient, ScanPage};
use crate::error::Result;
use crate::observability::SessionStoreEvent;

/// Redis-protocol client handle (Valkey or Redis).
///
/// Wraps a caller-owned connection. Multiplexed connections and connection
/// managers are cheap to clone, so every request runs on its own clone and
/// the handle can be shared across tasks without locking.
#[derive(Clone)]
pub struct RedisClient<C = MultiplexedConnection> {
    connection: C,
}

impl RedisClient<MultiplexedConnection> {
    /// Open a multiplexed connection to `url` (for example `redis://127.0.0.1:6379/0`).
    pub async fn open(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let connection = client.get_multiplexed_async_connection().await?;
        tracing::info!(
            event = SessionStoreEvent::ClientConnected.as_str(),
            backend = "valkey",
            "session store client connected to valkey"
        );
        Ok(Self::new(connection))
    }
}

impl<C> RedisClient<C> {
    /// Wrap an already-established connection.
    pub fn new(connection: C) -> Self {
        Self { connection }
    }

    /// Borrow the wrapped connection.
    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// Release the wrapped connection.
    pub fn into_inner(self) -> C {
        self.connection
    }
}

fn expire_command(ttl: KeyExpiry) -> (&'static str, i64) {
    match ttl {
        KeyExpiry::Seconds(seconds) => ("EXPIRE", seconds),
        KeyExpiry::Milliseconds(millis) => ("PEXPIRE", millis),
    }
}

#[async_trait]
impl<C> KeyValueClient for RedisClient<C>
where
    C: ConnectionLike + Clone + Send + Sync + 'static,
{
    fn backend_name(&self) -> &'static str {
        "valkey"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection.clone();
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);
        let value: Option<Vec<u8>> = cmd.query_async(&mut conn).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut conn = self.connection.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        let (): () = cmd.query_async(&mut conn).await?;
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: KeyExpiry) -> Result<()> {
        let mut conn = self.connection.clone();
        let (name, amount) = expire_command(ttl);
        let mut cmd = redis::cmd(name);
        cmd.arg(key).arg(amount);
        let (): () = cmd.query_async(&mut conn).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        let mut conn = self.connection.clone();
        let mut cmd = redis::cmd("DEL");
        cmd.arg(key);
        let (): () = cmd.query_async(&mut conn).await?;
        Ok(())
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanPage> {
        let mut conn = self.connection.clone();
        let mut cmd = redis::cmd("SCAN");
        cmd.arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(count.max(1));
        let (cursor, raw_keys): (u64, Vec<Vec<u8>>) = cmd.query_async(&mut conn).await?;
        let returned = raw_keys.len();
        // Keys written by other clients may be arbitrary bytes; tokens never are.
        let keys: Vec<String> = raw_keys
            .into_iter()
            .filter_map(|raw| String::from_utf8(raw).ok())
            .collect();
        if keys.len() < returned {
            tracing::debug!(
                event = SessionStoreEvent::ScanPageFetched.as_str(),
                backend = "valkey",
                skipped = returned - keys.len(),
                "skipped scanned keys that are not valid UTF-8"
            );
        }
        Ok(ScanPage { cursor, keys })
    }

    async fn set_with_expiry(&self, key: &str, value: &[u8], ttl: KeyExpiry) -> Result<()> {
        let mut conn = self.connection.clone();
        let (name, amount) = expire_command(ttl);
        // Pipelined, not MULTI: both replies are checked, no atomicity.
        let mut pipe = redis::pipe();
        pipe.cmd("SET").arg(key).arg(value).ignore();
        pipe.cmd(name).arg(key).arg(amount).ignore();
        let (): () = pipe.query_async(&mut conn).await?;
        Ok(())
    }
}
