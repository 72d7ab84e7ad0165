use crate::{
    credentials::{
        traits::{CredentialStore, CREDENTIAL_KEY},
        Credential,
    },
    error::{IdeationError, Result},
};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Key/value JSON file holding the credential under [`CREDENTIAL_KEY`].
/// Unrelated keys in the same file are left untouched.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<Map<String, Value>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(IdeationError::StorageError(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(IdeationError::StorageError(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(IdeationError::StorageError(format!(
                "failed to parse {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn write_map(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| IdeationError::StorageError(e.to_string()))?;
            }
        }

        let content = serde_json::to_string_pretty(map)?;
        let tmp_path = self.path.with_extension("json.tmp");

        // A leftover temp file would keep its old mode, so start fresh.
        if let Err(e) = tokio::fs::remove_file(&tmp_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                return Err(IdeationError::StorageError(e.to_string()));
            }
        }

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&tmp_path)
            .await
            .map_err(|e| IdeationError::StorageError(e.to_string()))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| IdeationError::StorageError(e.to_string()))?;
        file.sync_all()
            .await
            .map_err(|e| IdeationError::StorageError(e.to_string()))?;
        drop(file);

        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| IdeationError::StorageError(e.to_string()))
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self) -> Result<Option<Credential>> {
        let map = self.read_map().await?;
        Ok(map
            .get(CREDENTIAL_KEY)
            .and_then(Value::as_str)
            .and_then(Credential::parse))
    }

    async fn set(&self, credential: &Credential) -> Result<()> {
        let mut map = self.read_map().await?;
        map.insert(
            CREDENTIAL_KEY.to_string(),
            Value::String(credential.expose().to_string()),
        );
        self.write_map(&map).await?;
        log::debug!("Credential stored in {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut map = self.read_map().await?;
        if map.remove(CREDENTIAL_KEY).is_some() {
            self.write_map(&map).await?;
            log::debug!("Credential removed from {}", self.path.display());
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_means_no_credential() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nope.json"));
        assert!(store.get().await.unwrap().is_none());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_roundtrip_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");
        let store = FileCredentialStore::new(&path);

        let key = Credential::parse("  AIza-test-key ").unwrap();
        store.set(&key).await.unwrap();
        assert!(path.exists());

        let reopened = FileCredentialStore::new(&path);
        assert_eq!(reopened.get().await.unwrap().unwrap().expose(), "AIza-test-key");

        reopened.clear().await.unwrap();
        assert!(reopened.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_other_keys_are_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let store = FileCredentialStore::new(&path);
        store.set(&Credential::parse("k").unwrap()).await.unwrap();
        store.clear().await.unwrap();

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert!(raw.get(CREDENTIAL_KEY).is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_written_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, "stale").unwrap();
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let store = FileCredentialStore::new(&path);
        store.set(&Credential::parse("secret").unwrap()).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!tmp_path.exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileCredentialStore::new(&path);
        assert!(matches!(
            store.get().await,
            Err(IdeationError::StorageError(_))
        ));
    }
}
