mod memory;
mod redis;

pub use self::memory::InMemoryCooldownStore;
pub use self::redis::RedisCooldownStore;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

// ============================================================================
// Cooldown Guard - Fixed-Window Rate Limiter
// ============================================================================
//
// One attempt per (order, store, client address) key per window. The window
// is consumed by the attempt itself, before validation, so a rejected
// transition still burns it. The storage primitive is a single atomic
// insert-if-absent with TTL; a separate check followed by a write would let
// two concurrent requests both slip through.
//
// ============================================================================

/// Cooldown key for one (order, store, client address) triple.
///
/// Components are length-prefixed so that a client address containing the
/// separator cannot collide with another triple.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CooldownKey(String);

const KEY_NAMESPACE: &str = "order_status_change";

impl CooldownKey {
    pub fn new(increment_id: u64, store_id: u32, client_addr: &str) -> Self {
        let id = increment_id.to_string();
        let store = store_id.to_string();
        Self(format!(
            "{}:{}.{}:{}.{}:{}.{}",
            KEY_NAMESPACE,
            id.len(),
            id,
            store.len(),
            store,
            client_addr.len(),
            client_addr
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CooldownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CooldownError {
    #[error("Cooldown storage unavailable: {0}")]
    Unavailable(String),
}

/// Storage for cooldown entries. Presence-only semantics: the value content is
/// irrelevant, entries expire passively via TTL.
#[async_trait]
pub trait CooldownStore: Send + Sync {
    /// Atomically create the entry when absent. Returns `true` when this call
    /// created it (the attempt may proceed), `false` when a live entry already
    /// existed. Never refreshes an existing entry's expiry.
    async fn insert_if_absent(&self, key: &str, ttl: Duration) -> Result<bool, CooldownError>;

    /// Read-only probe: is there a live entry for the key?
    async fn contains(&self, key: &str) -> Result<bool, CooldownError>;
}

#[derive(Clone)]
pub struct CooldownGuard {
    store: Arc<dyn CooldownStore>,
}

impl CooldownGuard {
    pub fn new(store: Arc<dyn CooldownStore>) -> Self {
        Self { store }
    }

    /// Consume the cooldown window for `key`, if it is free.
    ///
    /// Returns `true` when the attempt may proceed (the window is now marked),
    /// `false` when a prior attempt is still inside its fixed window. A zero
    /// lifetime disables the guard entirely. Storage failure propagates; the
    /// caller must treat it as a hard stop rather than skip rate limiting.
    pub async fn begin_attempt(
        &self,
        key: &CooldownKey,
        lifetime: Duration,
    ) -> Result<bool, CooldownError> {
        if lifetime.is_zero() {
            return Ok(true);
        }
        self.store.insert_if_absent(key.as_str(), lifetime).await
    }

    /// Whether a prior attempt is still within its window.
    pub async fn check(&self, key: &CooldownKey) -> Result<bool, CooldownError> {
        self.store.contains(key.as_str()).await
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_components_are_length_prefixed() {
        let key = CooldownKey::new(5, 1, "10.0.0.1");
        assert_eq!(key.as_str(), "order_status_change:1.5:1.1:8.10.0.0.1");
    }

    #[test]
    fn test_keys_differ_per_component() {
        let base = CooldownKey::new(5, 1, "10.0.0.1");
        assert_ne!(base, CooldownKey::new(6, 1, "10.0.0.1"));
        assert_ne!(base, CooldownKey::new(5, 2, "10.0.0.1"));
        assert_ne!(base, CooldownKey::new(5, 1, "10.0.0.2"));
    }

    #[test]
    fn test_separator_in_address_cannot_collide() {
        // A plain join would make (12, 3, "x") and (1, 23, "x") ambiguous;
        // length prefixes keep them apart.
        let a = CooldownKey::new(12, 3, "1.1");
        let b = CooldownKey::new(1, 23, "1.1");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_zero_lifetime_disables_guard() {
        let guard = CooldownGuard::new(Arc::new(InMemoryCooldownStore::new()));
        let key = CooldownKey::new(5, 1, "10.0.0.1");

        assert!(guard.begin_attempt(&key, Duration::ZERO).await.unwrap());
        assert!(guard.begin_attempt(&key, Duration::ZERO).await.unwrap());
        assert!(!guard.check(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_second_attempt_within_window_blocked() {
        let guard = CooldownGuard::new(Arc::new(InMemoryCooldownStore::new()));
        let key = CooldownKey::new(5, 1, "10.0.0.1");
        let lifetime = Duration::from_secs(30);

        assert!(guard.begin_attempt(&key, lifetime).await.unwrap());
        assert!(!guard.begin_attempt(&key, lifetime).await.unwrap());
        assert!(guard.check(&key).await.unwrap());
    }
}
