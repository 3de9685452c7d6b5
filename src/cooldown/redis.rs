use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;

use super::{CooldownError, CooldownStore};

// ============================================================================
// Redis Cooldown Store
// ============================================================================
//
// `SET key 1 NX EX <ttl>` is the atomic insert-if-absent the guard needs:
// Redis either creates the key with its TTL or leaves the existing entry
// untouched, in one round trip.
//
// ============================================================================

#[derive(Clone)]
pub struct RedisCooldownStore {
    conn: MultiplexedConnection,
}

impl RedisCooldownStore {
    pub async fn connect(url: &str) -> Result<Self, CooldownError> {
        let client =
            redis::Client::open(url).map_err(|e| CooldownError::Unavailable(e.to_string()))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CooldownError::Unavailable(e.to_string()))?;

        tracing::info!(url = %url, "Connected to Redis cooldown store");
        Ok(Self { conn })
    }
}

#[async_trait]
impl CooldownStore for RedisCooldownStore {
    async fn insert_if_absent(&self, key: &str, ttl: Duration) -> Result<bool, CooldownError> {
        let mut conn = self.conn.clone();

        // EX takes whole seconds and rejects 0; sub-second lifetimes round up.
        let ttl_secs = ttl.as_secs().max(1);

        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg("1")
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs)
            .query_async(&mut conn)
            .await
            .map_err(|e| CooldownError::Unavailable(e.to_string()))?;

        // "OK" when we created the entry, nil when one was already live.
        Ok(reply.is_some())
    }

    async fn contains(&self, key: &str) -> Result<bool, CooldownError> {
        let mut conn = self.conn.clone();

        let exists: i64 = redis::cmd("EXISTS")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| CooldownError::Unavailable(e.to_string()))?;

        Ok(exists == 1)
    }
}
