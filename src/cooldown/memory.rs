use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{CooldownError, CooldownStore};

// ============================================================================
// In-Memory Cooldown Store
// ============================================================================
//
// Expiry instants keyed by cooldown key, behind one mutex. Holding the lock
// across the read-and-insert makes insert_if_absent atomic. Expired entries
// are pruned lazily on access.
//
// ============================================================================

#[derive(Clone, Default)]
pub struct InMemoryCooldownStore {
    entries: Arc<Mutex<HashMap<String, Instant>>>,
}

impl InMemoryCooldownStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CooldownStore for InMemoryCooldownStore {
    async fn insert_if_absent(&self, key: &str, ttl: Duration) -> Result<bool, CooldownError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, expires_at| *expires_at > now);

        if entries.contains_key(key) {
            return Ok(false);
        }

        entries.insert(key.to_string(), now + ttl);
        Ok(true)
    }

    async fn contains(&self, key: &str) -> Result<bool, CooldownError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, expires_at| *expires_at > now);
        Ok(entries.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let store = InMemoryCooldownStore::new();
        let ttl = Duration::from_millis(100);

        assert!(store.insert_if_absent("k", ttl).await.unwrap());
        assert!(store.contains("k").await.unwrap());

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(!store.contains("k").await.unwrap());
        assert!(store.insert_if_absent("k", ttl).await.unwrap());
    }

    #[tokio::test]
    async fn test_blocked_attempt_does_not_extend_window() {
        let store = InMemoryCooldownStore::new();
        let ttl = Duration::from_millis(100);

        assert!(store.insert_if_absent("k", ttl).await.unwrap());

        // Halfway through the window a second attempt is refused and must not
        // push the expiry out (fixed window, not sliding).
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!store.insert_if_absent("k", ttl).await.unwrap());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!store.contains("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_attempts_yield_one_winner() {
        let store = Arc::new(InMemoryCooldownStore::new());
        let ttl = Duration::from_secs(30);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.insert_if_absent("k", ttl).await.unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let store = InMemoryCooldownStore::new();
        let ttl = Duration::from_secs(30);

        assert!(store.insert_if_absent("a", ttl).await.unwrap());
        assert!(store.insert_if_absent("b", ttl).await.unwrap());
        assert!(!store.insert_if_absent("a", ttl).await.unwrap());
    }
}
