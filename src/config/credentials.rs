//! Secret storage for the completion API key.
//!
//! Credentials are kept behind the [`CredentialStore`] trait so hosts can
//! plug in their own keychain. The crate ships a TOML-file store and an
//! in-memory store.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;

/// Key under which the completion API key is stored.
pub const API_KEY_SECRET: &str = "openai-api-key";

/// Wrapper for sensitive strings that prevents accidental logging.
///
/// The inner value is never exposed via Debug or Display traits.
/// Use `expose()` to access the actual value when needed for API calls.
#[derive(Clone, PartialEq, Eq)]
pub struct SecureString(String);

impl SecureString {
    /// Create a new secure string.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Expose the inner value.
    ///
    /// Use sparingly and only when actually sending to APIs.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureString(••••••••)")
    }
}

impl std::fmt::Display for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "••••••••")
    }
}

/// Errors raised by credential stores.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Failed to access credential file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse credential file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize credentials: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Scoped, persisted secret storage keyed by a fixed identifier.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<SecureString>, CredentialError>;
    fn store(&self, key: &str, value: SecureString) -> Result<(), CredentialError>;
    fn delete(&self, key: &str) -> Result<(), CredentialError>;
}

/// Credentials kept in a TOML table on disk.
///
/// The file is rewritten on every change; on Unix it is created with
/// owner-only permissions.
pub struct FileCredentialStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// Credential file living next to the config file.
    pub fn default_path() -> PathBuf {
        crate::config::Config::config_dir().join("credentials.toml")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| CredentialError::Io {
            path: self.path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| CredentialError::Parse {
            path: self.path.clone(),
            source: e,
        })
    }

    fn write_all(&self, secrets: &BTreeMap<String, String>) -> Result<(), CredentialError> {
        let io_err = |e| CredentialError::Io {
            path: self.path.clone(),
            source: e,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = toml::to_string(secrets)?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path).map_err(io_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // `mode` only applies to newly created files.
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(io_err)?;
        }
        file.write_all(content.as_bytes()).map_err(io_err)?;

        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Result<Option<SecureString>, CredentialError> {
        let _guard = self.lock.lock();
        Ok(self.read_all()?.remove(key).map(SecureString::new))
    }

    fn store(&self, key: &str, value: SecureString) -> Result<(), CredentialError> {
        let _guard = self.lock.lock();
        let mut secrets = self.read_all()?;
        secrets.insert(key.to_string(), value.expose().to_string());
        self.write_all(&secrets)?;
        tracing::info!(key, path = %self.path.display(), "Credential stored");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CredentialError> {
        let _guard = self.lock.lock();
        let mut secrets = self.read_all()?;
        if secrets.remove(key).is_none() {
            return Ok(());
        }
        self.write_all(&secrets)?;
        tracing::info!(key, path = %self.path.display(), "Credential deleted");
        Ok(())
    }
}

/// In-process credential store.
#[derive(Default)]
pub struct MemoryCredentialStore {
    secrets: Mutex<BTreeMap<String, SecureString>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with an API key under [`API_KEY_SECRET`].
    pub fn with_api_key(key: &str) -> Self {
        let store = Self::new();
        store
            .secrets
            .lock()
            .insert(API_KEY_SECRET.to_string(), SecureString::new(key.to_string()));
        store
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Result<Option<SecureString>, CredentialError> {
        Ok(self.secrets.lock().get(key).cloned())
    }

    fn store(&self, key: &str, value: SecureString) -> Result<(), CredentialError> {
        self.secrets.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CredentialError> {
        self.secrets.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_secure_string_does_not_leak() {
        let secret = SecureString::new("my-secret-key".to_string());

        let debug_output = format!("{:?}", secret);
        assert!(!debug_output.contains("my-secret-key"));
        assert!(debug_output.contains("••••••••"));

        let display_output = format!("{}", secret);
        assert!(!display_output.contains("my-secret-key"));

        assert_eq!(secret.expose(), "my-secret-key");
    }

    #[test]
    fn test_file_store_roundtrip_and_delete() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested").join("credentials.toml"));

        assert!(store.get(API_KEY_SECRET).unwrap().is_none());

        store
            .store(API_KEY_SECRET, SecureString::new("sk-test".to_string()))
            .unwrap();
        assert_eq!(store.get(API_KEY_SECRET).unwrap().unwrap().expose(), "sk-test");

        store.delete(API_KEY_SECRET).unwrap();
        assert!(store.get(API_KEY_SECRET).unwrap().is_none());
        assert!(store.path().exists());
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.toml"));

        store.store("other", SecureString::new("1".to_string())).unwrap();
        store
            .store(API_KEY_SECRET, SecureString::new("2".to_string()))
            .unwrap();
        store.delete(API_KEY_SECRET).unwrap();

        assert_eq!(store.get("other").unwrap().unwrap().expose(), "1");
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.toml"));
        store
            .store(API_KEY_SECRET, SecureString::new("sk".to_string()))
            .unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_tightens_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.toml");
        fs::write(&path, "").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let store = FileCredentialStore::new(path.clone());
        store
            .store(API_KEY_SECRET, SecureString::new("sk".to_string()))
            .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.get(API_KEY_SECRET).unwrap().unwrap().expose(), "sk");
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.toml");
        fs::write(&path, "not = [valid").unwrap();

        let store = FileCredentialStore::new(path);
        assert!(matches!(
            store.get(API_KEY_SECRET),
            Err(CredentialError::Parse { .. })
        ));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryCredentialStore::with_api_key("abc");
        assert_eq!(store.get(API_KEY_SECRET).unwrap().unwrap().expose(), "abc");
        store.delete(API_KEY_SECRET).unwrap();
        assert!(store.get(API_KEY_SECRET).unwrap().is_none());
    }
}
