use std::{ffi::OsString, io::ErrorKind, path::PathBuf};

use async_trait::async_trait;

use crate::{error::StoreError, types::TokenRecord};

/// Persistence for the single token record of this installation.
///
/// Only [`crate::management::TokenManager`] talks to a store.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet.
    async fn load(&self) -> Result<Option<TokenRecord>, StoreError>;

    /// Replaces the stored record wholesale.
    async fn save(&self, record: &TokenRecord) -> Result<(), StoreError>;

    /// Removes the stored record. Removing nothing is not an error.
    async fn clear(&self) -> Result<(), StoreError>;

    /// Human readable location, for messages.
    fn location(&self) -> String;
}

/// JSON file store, `~/.spotify-mcp-tokens.json` by default.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("tokens.json"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<TokenRecord>, StoreError> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: TokenRecord = serde_json::from_str(&content)?;
        Ok(Some(record))
    }

    async fn save(&self, record: &TokenRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(record)?;
        let temp = self.temp_path();
        async_fs::write(&temp, json).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            async_fs::set_permissions(&temp, std::fs::Permissions::from_mode(0o600)).await?;
        }

        // same-directory rename replaces the file atomically
        if let Err(e) = async_fs::rename(&temp, &self.path).await {
            let _ = async_fs::remove_file(&temp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match async_fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
