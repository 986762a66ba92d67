/*
[INPUT]:  Session keys and string values
[OUTPUT]: In-process session storage
[POS]:    Storage layer - in-memory backend
[UPDATE]: When the store trait changes
*/

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::SessionStore;
use crate::http::Result;

/// Thread-safe in-memory session store
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let guard = self.data.read().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        guard.remove(key);
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        for &(key, value) in entries {
            guard.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_is_empty() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert!(store.get("auth_token").unwrap().is_none());
    }

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        store.set("auth_token", "a.b.c").unwrap();
        assert_eq!(store.get("auth_token").unwrap(), Some("a.b.c".to_string()));

        store.set("auth_token", "d.e.f").unwrap();
        assert_eq!(store.get("auth_token").unwrap(), Some("d.e.f".to_string()));

        store.remove("auth_token").unwrap();
        store.remove("auth_token").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_many_overwrites_together() {
        let store = MemoryStore::new();
        store.set("auth_token", "old").unwrap();
        store
            .set_many(&[("auth_token", "a.b.c"), ("wallet_address", "0xabc")])
            .unwrap();
        assert_eq!(store.get("auth_token").unwrap(), Some("a.b.c".to_string()));
        assert_eq!(store.get("wallet_address").unwrap(), Some("0xabc".to_string()));
    }

    #[test]
    fn test_clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();
        other.set("wallet_address", "0xabc").unwrap();
        assert_eq!(store.get("wallet_address").unwrap(), Some("0xabc".to_string()));
    }
}
