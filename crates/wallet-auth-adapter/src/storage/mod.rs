/*
[INPUT]:  Session keys and string values
[OUTPUT]: Persisted token/address pairs
[POS]:    Storage layer - key-value session persistence
[UPDATE]: When adding storage backends or changing the persisted layout
*/

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use tracing::warn;

use crate::http::Result;

/// Key holding the session token
pub const TOKEN_KEY: &str = "auth_token";
/// Key holding the last authenticated wallet address
pub const ADDRESS_KEY: &str = "wallet_address";

/// Small key-value capability shared by the auth client and session guard
///
/// Last writer wins; implementations must read fresh on every `get`.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is a no-op
    fn remove(&self, key: &str) -> Result<()>;

    /// Write several entries as one unit
    ///
    /// On failure the entries written so far are restored to their previous
    /// values, so readers never observe a partial session. Backends that can
    /// write atomically should override this.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut previous = Vec::with_capacity(entries.len());
        for &(key, _) in entries {
            previous.push((key, self.get(key)?));
        }

        for (written, &(key, value)) in entries.iter().enumerate() {
            if let Err(e) = self.set(key, value) {
                for (key, old) in previous[..written].iter().rev() {
                    let restored = match old {
                        Some(old) => self.set(key, old),
                        None => self.remove(key),
                    };
                    if let Err(restore_err) = restored {
                        warn!(key, error = %restore_err, "failed to roll back session entry");
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::http::WalletAuthError;

    /// Delegates to a memory store but refuses writes to one key
    struct RefusingStore {
        inner: MemoryStore,
        refused: &'static str,
    }

    impl SessionStore for RefusingStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            if key == self.refused {
                return Err(WalletAuthError::Storage(format!("{key}: disk full")));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_set_many_rolls_back_on_failure() {
        let inner = MemoryStore::new();
        inner.set(TOKEN_KEY, "old.p.s").unwrap();
        let store = RefusingStore {
            inner: inner.clone(),
            refused: ADDRESS_KEY,
        };

        let err = store
            .set_many(&[(TOKEN_KEY, "new.p.s"), (ADDRESS_KEY, "0xabc")])
            .unwrap_err();
        assert!(matches!(err, WalletAuthError::Storage(_)));
        assert_eq!(inner.get(TOKEN_KEY).unwrap(), Some("old.p.s".to_string()));
        assert!(inner.get(ADDRESS_KEY).unwrap().is_none());

        inner.remove(TOKEN_KEY).unwrap();
        assert!(store.set_many(&[(TOKEN_KEY, "new.p.s"), (ADDRESS_KEY, "0xabc")]).is_err());
        assert!(inner.is_empty());
    }

    #[test]
    fn test_set_many_writes_all_entries() {
        let inner = MemoryStore::new();
        let store = RefusingStore {
            inner: inner.clone(),
            refused: "unused",
        };
        store
            .set_many(&[(TOKEN_KEY, "a.b.c"), (ADDRESS_KEY, "0xabc")])
            .unwrap();
        assert_eq!(inner.get(TOKEN_KEY).unwrap(), Some("a.b.c".to_string()));
        assert_eq!(inner.get(ADDRESS_KEY).unwrap(), Some("0xabc".to_string()));
    }
}
