//! Usage: Durable, file-backed `SessionStore` (a JSON key/value document in the data dir).

use crate::domain::session::{SessionStore, StoredEntries, TokenSet};
use crate::shared::error::AppResult;
use crate::shared::mutex_ext::MutexExt;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw entries currently on disk (empty when no session file exists).
    pub fn entries(&self) -> AppResult<StoredEntries> {
        read_entries(&self.path)
    }
}

fn read_entries(path: &Path) -> AppResult<StoredEntries> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(StoredEntries::new()),
        Err(err) => {
            return Err(format!(
                "STORE_READ: failed to read session file {}: {err}",
                path.display()
            )
            .into())
        }
    };
    if raw.trim().is_empty() {
        return Ok(StoredEntries::new());
    }
    serde_json::from_str::<StoredEntries>(&raw).map_err(|e| {
        format!(
            "STORE_CORRUPT: session file {} is not a string map: {e}",
            path.display()
        )
        .into()
    })
}

/// Write `bytes` to a file readable only by the current user (unix mode 0600).
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    // `mode` only applies on creation; a leftover temp file keeps its old bits otherwise.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(bytes)?;
    file.sync_all()
}

fn write_entries(path: &Path, entries: &StoredEntries) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            format!(
                "STORE_WRITE: failed to create session dir {}: {e}",
                parent.display()
            )
        })?;
    }

    let encoded = serde_json::to_vec_pretty(entries)
        .map_err(|e| format!("STORE_WRITE: failed to encode session entries: {e}"))?;

    let tmp_path = path.with_extension("json.tmp");
    write_private(&tmp_path, &encoded).map_err(|e| {
        format!(
            "STORE_WRITE: failed to write session file {}: {e}",
            tmp_path.display()
        )
    })?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        format!(
            "STORE_WRITE: failed to replace session file {}: {e}",
            path.display()
        )
        .into()
    })
}

impl SessionStore for FileSessionStore {
    fn save(&self, tokens: &TokenSet) -> AppResult<()> {
        let _guard = self.write_lock.lock_or_recover();
        write_entries(&self.path, &tokens.to_entries())
    }

    fn load(&self) -> AppResult<Option<TokenSet>> {
        let entries = read_entries(&self.path)?;
        Ok(TokenSet::from_entries(&entries))
    }

    fn clear(&self) -> AppResult<()> {
        let _guard = self.write_lock.lock_or_recover();
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(format!(
                "STORE_WRITE: failed to remove session file {}: {err}",
                self.path.display()
            )
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::{ACCESS_TOKEN_KEY, EXPIRES_AT_KEY, REFRESH_TOKEN_KEY};

    fn store_in(dir: &tempfile::TempDir) -> FileSessionStore {
        FileSessionStore::new(dir.path().join("nested").join("session.json"))
    }

    #[test]
    fn load_without_file_is_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        assert!(store.load().expect("load").is_none());
        assert!(store.entries().expect("entries").is_empty());
    }

    #[test]
    fn save_creates_parent_dir_and_persists_string_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let tokens =
            TokenSet::new("tok1", Some("ref1".to_string()), Some(1_700_000_000)).expect("tokens");
        store.save(&tokens).expect("save");

        let entries = store.entries().expect("entries");
        assert_eq!(entries.get(ACCESS_TOKEN_KEY).map(String::as_str), Some("tok1"));
        assert_eq!(entries.get(REFRESH_TOKEN_KEY).map(String::as_str), Some("ref1"));
        assert_eq!(
            entries.get(EXPIRES_AT_KEY).map(String::as_str),
            Some("1700000000")
        );

        let reopened = FileSessionStore::new(store.path().to_path_buf());
        assert_eq!(reopened.load().expect("load"), Some(tokens));
    }

    #[test]
    fn omitted_optionals_are_not_written() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store
            .save(&TokenSet::new("tok1", None, None).expect("tokens"))
            .expect("save");

        let raw = std::fs::read_to_string(store.path()).expect("read file");
        assert!(!raw.contains(REFRESH_TOKEN_KEY));
        assert!(!raw.contains(EXPIRES_AT_KEY));

        let loaded = store.load().expect("load").expect("session");
        assert_eq!(loaded.refresh_token(), None);
        assert_eq!(loaded.expires_at(), None);
    }

    #[test]
    fn clear_removes_session_and_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store
            .save(&TokenSet::new("tok1", None, Some(1)).expect("tokens"))
            .expect("save");
        store.clear().expect("clear");
        assert!(store.load().expect("load").is_none());
        assert!(!store.path().exists());
        store.clear().expect("clear again");
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_private_to_owner() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let leftover = store.path().with_extension("json.tmp");
        std::fs::create_dir_all(leftover.parent().expect("parent")).expect("mkdir");
        std::fs::write(&leftover, "stale").expect("write leftover");
        std::fs::set_permissions(&leftover, std::fs::Permissions::from_mode(0o644))
            .expect("chmod leftover");

        store
            .save(&TokenSet::new("tok1", Some("ref1".to_string()), None).expect("tokens"))
            .expect("save");

        let mode = std::fs::metadata(store.path())
            .expect("metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!leftover.exists());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().expect("parent")).expect("mkdir");
        std::fs::write(store.path(), "[1, 2, 3]").expect("write");
        let err = store.load().expect_err("corrupt");
        assert_eq!(err.code(), "STORE_CORRUPT");
    }
}
