//! File-backed credential store.
//!
//! Tokens live in a small JSON document inside a capability-scoped
//! directory. Keys are namespaced so the document can hold other client
//! state; entries this store does not own are preserved on every write.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
#[cfg(unix)]
use cap_std::fs::OpenOptionsExt;
use cap_std::fs::{Dir, OpenOptions};
use tracing::warn;

use crate::domain::ports::{CredentialStore, CredentialStoreError};
use crate::domain::{AccessToken, Credentials, RefreshToken};

/// File holding the credential document.
pub const CREDENTIALS_FILE_NAME: &str = "credentials.json";
/// Document key for the access token.
pub const ACCESS_TOKEN_KEY: &str = "chakula_poa_access_token";
/// Document key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "chakula_poa_refresh_token";

#[cfg(unix)]
const OWNER_ONLY_MODE: u32 = 0o600;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

type Document = BTreeMap<String, String>;

/// Durable credential store rooted at a directory.
#[derive(Debug)]
pub struct FileCredentialStore {
    dir: Dir,
    root: Utf8PathBuf,
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Open the store, creating `root` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialStoreError::Unavailable`] when the directory cannot
    /// be created or opened.
    pub fn open(root: &Utf8Path) -> Result<Self, CredentialStoreError> {
        Dir::create_ambient_dir_all(root, ambient_authority())
            .and_then(|()| Dir::open_ambient_dir(root, ambient_authority()))
            .map(|dir| Self {
                dir,
                root: root.to_path_buf(),
                write_lock: Mutex::new(()),
            })
            .map_err(|err| CredentialStoreError::unavailable(format!("{root}: {err}")))
    }

    /// Path of the credential document.
    pub fn path(&self) -> Utf8PathBuf {
        self.root.join(CREDENTIALS_FILE_NAME)
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, CredentialStoreError> {
        self.write_lock
            .lock()
            .map_err(|err| CredentialStoreError::unavailable(err.to_string()))
    }

    fn read_document(&self) -> Result<Document, CredentialStoreError> {
        match self.dir.read_to_string(CREDENTIALS_FILE_NAME) {
            Ok(text) => serde_json::from_str(&text).map_err(|err| {
                CredentialStoreError::corrupt(format!("{}: {err}", self.path()))
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Document::new()),
            Err(err) => Err(self.unavailable(&err)),
        }
    }

    /// Read the document for a rewrite; an unparseable document is replaced.
    fn read_document_or_empty(&self) -> Result<Document, CredentialStoreError> {
        match self.read_document() {
            Ok(document) => Ok(document),
            Err(CredentialStoreError::Corrupt { message }) => {
                warn!(%message, "replacing unreadable credential document");
                Ok(Document::new())
            }
            Err(err) => Err(err),
        }
    }

    fn write_document(&self, document: &Document) -> Result<(), CredentialStoreError> {
        if document.is_empty() {
            return match self.dir.remove_file(CREDENTIALS_FILE_NAME) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(self.unavailable(&err)),
            };
        }
        let text = serde_json::to_string_pretty(document)
            .map_err(|err| CredentialStoreError::unavailable(err.to_string()))?;
        self.replace_atomically(&text)
            .map_err(|err| self.unavailable(&err))
    }

    fn replace_atomically(&self, contents: &str) -> io::Result<()> {
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp_name = format!(
            ".{CREDENTIALS_FILE_NAME}.tmp.{}.{counter}",
            std::process::id()
        );
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(OWNER_ONLY_MODE);
        let written = self.dir.open_with(&tmp_name, &options).and_then(|mut file| {
            file.write_all(contents.as_bytes())
                .and_then(|()| file.sync_all())
        });
        let renamed =
            written.and_then(|()| replace_target(&self.dir, &tmp_name, CREDENTIALS_FILE_NAME));
        if renamed.is_err() {
            drop(self.dir.remove_file(&tmp_name));
        }
        renamed
    }

    fn unavailable(&self, err: &io::Error) -> CredentialStoreError {
        CredentialStoreError::unavailable(format!("{}: {err}", self.path()))
    }
}

#[cfg(windows)]
fn replace_target(dir: &Dir, tmp_name: &str, target: &str) -> io::Result<()> {
    match dir.remove_file(target) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(tmp_name, dir, target)
}

#[cfg(not(windows))]
fn replace_target(dir: &Dir, tmp_name: &str, target: &str) -> io::Result<()> {
    dir.rename(tmp_name, dir, target)
}

impl CredentialStore for FileCredentialStore {
    fn credentials(&self) -> Result<Credentials, CredentialStoreError> {
        let document = self.read_document()?;
        Ok(Credentials {
            access_token: document.get(ACCESS_TOKEN_KEY).map(AccessToken::new),
            refresh_token: document.get(REFRESH_TOKEN_KEY).map(RefreshToken::new),
        })
    }

    fn set_tokens(
        &self,
        access: &AccessToken,
        refresh: &RefreshToken,
    ) -> Result<(), CredentialStoreError> {
        let _guard = self.lock()?;
        let mut document = self.read_document_or_empty()?;
        document.insert(ACCESS_TOKEN_KEY.to_owned(), access.expose().to_owned());
        document.insert(REFRESH_TOKEN_KEY.to_owned(), refresh.expose().to_owned());
        self.write_document(&document)
    }

    fn clear_tokens(&self) -> Result<(), CredentialStoreError> {
        let _guard = self.lock()?;
        let mut document = self.read_document_or_empty()?;
        document.remove(ACCESS_TOKEN_KEY);
        document.remove(REFRESH_TOKEN_KEY);
        self.write_document(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct Harness {
        _temp: TempDir,
        root: Utf8PathBuf,
    }

    impl Harness {
        fn store(&self) -> FileCredentialStore {
            FileCredentialStore::open(&self.root).expect("open store")
        }

        fn read_raw(&self) -> Option<String> {
            std::fs::read_to_string(self.root.join(CREDENTIALS_FILE_NAME)).ok()
        }

        fn write_raw(&self, contents: &str) {
            std::fs::write(self.root.join(CREDENTIALS_FILE_NAME), contents).expect("write raw");
        }

        fn entries(&self) -> Vec<String> {
            std::fs::read_dir(&self.root)
                .expect("read dir")
                .map(|entry| {
                    entry
                        .expect("dir entry")
                        .file_name()
                        .to_string_lossy()
                        .into_owned()
                })
                .collect()
        }
    }

    #[fixture]
    fn harness() -> Harness {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(temp.path().join("nested").join("creds"))
            .expect("utf8 tempdir");
        Harness { _temp: temp, root }
    }

    fn tokens(store: &FileCredentialStore) -> (Option<String>, Option<String>) {
        let credentials = store.credentials().expect("read credentials");
        (
            credentials.access_token.map(|t| t.expose().to_owned()),
            credentials.refresh_token.map(|t| t.expose().to_owned()),
        )
    }

    #[rstest]
    fn missing_file_means_no_tokens(harness: Harness) {
        let store = harness.store();
        assert!(store.credentials().expect("read").is_empty());
        assert_eq!(store.path(), harness.root.join("credentials.json"));
    }

    #[rstest]
    fn tokens_survive_reopening(harness: Harness) {
        harness
            .store()
            .set_tokens(&AccessToken::new("a-1"), &RefreshToken::new("r-1"))
            .expect("set tokens");

        let reopened = harness.store();
        assert_eq!(
            tokens(&reopened),
            (Some("a-1".to_owned()), Some("r-1".to_owned()))
        );
        let raw: Document =
            serde_json::from_str(&harness.read_raw().expect("file written")).expect("json");
        assert_eq!(raw.get(ACCESS_TOKEN_KEY).map(String::as_str), Some("a-1"));
        assert_eq!(raw.get(REFRESH_TOKEN_KEY).map(String::as_str), Some("r-1"));
        assert_eq!(harness.entries(), vec!["credentials.json".to_owned()]);
    }

    #[rstest]
    fn set_tokens_overwrites_previous_pair(harness: Harness) {
        let store = harness.store();
        store
            .set_tokens(&AccessToken::new("a-1"), &RefreshToken::new("r-1"))
            .expect("first write");
        store
            .set_tokens(&AccessToken::new("a-2"), &RefreshToken::new("r-1"))
            .expect("second write");
        assert_eq!(
            tokens(&store),
            (Some("a-2".to_owned()), Some("r-1".to_owned()))
        );
    }

    #[rstest]
    fn clear_removes_tokens_and_is_idempotent(harness: Harness) {
        let store = harness.store();
        store
            .set_tokens(&AccessToken::new("a-1"), &RefreshToken::new("r-1"))
            .expect("set tokens");
        store.clear_tokens().expect("first clear");
        store.clear_tokens().expect("second clear");
        assert!(store.credentials().expect("read").is_empty());
        assert_eq!(harness.read_raw(), None);
    }

    #[rstest]
    fn foreign_keys_are_preserved(harness: Harness) {
        let store = harness.store();
        harness.write_raw(r#"{ "chakula_poa_theme": "dark" }"#);
        store
            .set_tokens(&AccessToken::new("a-1"), &RefreshToken::new("r-1"))
            .expect("set tokens");
        store.clear_tokens().expect("clear");

        let raw: Document =
            serde_json::from_str(&harness.read_raw().expect("file kept")).expect("json");
        assert_eq!(
            raw,
            Document::from([("chakula_poa_theme".to_owned(), "dark".to_owned())])
        );
    }

    #[rstest]
    fn corrupt_document_is_reported_and_cleared(harness: Harness) {
        let store = harness.store();
        harness.write_raw("{ not json");

        let error = store.credentials().expect_err("corrupt file");
        assert_eq!(error.kind(), "Corrupt");

        store.clear_tokens().expect("clear recovers");
        assert!(store.credentials().expect("read").is_empty());
    }

    #[rstest]
    fn set_tokens_replaces_corrupt_document(harness: Harness) {
        let store = harness.store();
        harness.write_raw("{ not json");

        store
            .set_tokens(&AccessToken::new("a-1"), &RefreshToken::new("r-1"))
            .expect("set tokens over corrupt file");
        assert_eq!(
            tokens(&store),
            (Some("a-1".to_owned()), Some("r-1".to_owned()))
        );
    }

    #[rstest]
    fn replacing_existing_document_leaves_no_temp_files(harness: Harness) {
        let store = harness.store();
        harness.write_raw(r#"{ "chakula_poa_access_token": "old" }"#);
        for round in 0..3 {
            store
                .set_tokens(
                    &AccessToken::new(format!("a-{round}")),
                    &RefreshToken::new("r-1"),
                )
                .expect("replace document");
        }
        assert_eq!(
            tokens(&store),
            (Some("a-2".to_owned()), Some("r-1".to_owned()))
        );
        assert_eq!(harness.entries(), vec!["credentials.json".to_owned()]);
    }

    #[cfg(unix)]
    #[rstest]
    fn credential_file_is_owner_only(harness: Harness) {
        use std::os::unix::fs::PermissionsExt;

        let store = harness.store();
        harness.write_raw("{}");
        store
            .set_tokens(&AccessToken::new("a-1"), &RefreshToken::new("r-1"))
            .expect("set tokens");

        let mode = std::fs::metadata(harness.root.join(CREDENTIALS_FILE_NAME))
            .expect("metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o077, 0, "mode {mode:o} grants group or other access");
    }

    #[test]
    fn open_fails_when_root_is_a_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("occupied");
        std::fs::write(&file, "x").expect("write file");
        let root = Utf8PathBuf::from_path_buf(file).expect("utf8 path");

        let error = FileCredentialStore::open(&root).expect_err("file is not a dir");
        assert_eq!(error.kind(), "Unavailable");
    }
}
