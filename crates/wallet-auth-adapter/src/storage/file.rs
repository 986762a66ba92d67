/*
[INPUT]:  Session file path, session keys and string values
[OUTPUT]: Session values persisted as a JSON object on disk
[POS]:    Storage layer - file backend shared across processes
[UPDATE]: When the on-disk layout or file permissions change
*/

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::debug;
use uuid::Uuid;

use super::SessionStore;
use crate::http::{Result, WalletAuthError};

type Entries = BTreeMap<String, String>;

/// Session store persisted as a flat JSON object
///
/// Every read goes to disk so that a logout from another process is seen on
/// the next check.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Entries> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(storage_error(&self.path, e)),
        };

        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            WalletAuthError::Storage(format!(
                "Corrupt session file {}: {e}",
                self.path.display()
            ))
        })
    }

    fn save(&self, entries: &Entries) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| storage_error(parent, e))?;
            }
        }

        let tmp_path = self
            .path
            .with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        let encoded = serde_json::to_string_pretty(entries)?;

        fs::write(&tmp_path, encoded).map_err(|e| storage_error(&tmp_path, e))?;
        restrict_permissions(&tmp_path).map_err(|e| storage_error(&tmp_path, e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            storage_error(&self.path, e)
        })?;

        debug!(path = %self.path.display(), keys = entries.len(), "session file written");
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut Entries) -> bool) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        if apply(&mut entries) {
            self.save(&entries)?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

fn storage_error(path: &Path, err: io::Error) -> WalletAuthError {
    WalletAuthError::Storage(format!("{}: {err}", path.display()))
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|entries| entries.remove(key).is_some())
    }

    /// Single load and rename, so the file holds all entries or none of them
    fn set_many(&self, new_entries: &[(&str, &str)]) -> Result<()> {
        self.update(|entries| {
            for &(key, value) in new_entries {
                entries.insert(key.to_string(), value.to_string());
            }
            true
        })
    }
}
