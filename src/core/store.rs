use crate::error::StoreError;
use async_trait::async_trait;
use indexmap::IndexSet;
use std::path::{Path, PathBuf};

/// Identifiers of every task already announced.
///
/// Grows monotonically; iteration follows insertion order, which is also
/// the order written to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenIdSet {
    ids: IndexSet<String>,
}

impl SeenIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Returns `true` when `id` was not present before.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SeenIdSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Persistence for the seen-id cache.
///
/// `load` never fails: absent or unreadable state is an empty set.
#[async_trait]
pub trait SeenStore: Send + Sync {
    async fn load(&self) -> SeenIdSet;

    async fn save(&self, seen: &SeenIdSet) -> Result<(), StoreError>;
}

/// Seen-id cache stored as a JSON array of strings.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl SeenStore for JsonFileStore {
    async fn load(&self) -> SeenIdSet {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(error) => {
                tracing::info!(
                    path = %self.path.display(),
                    %error,
                    "No existing cache found, starting fresh"
                );
                return SeenIdSet::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(ids) => {
                let seen: SeenIdSet = ids.into_iter().collect();
                tracing::info!("Loaded {} tasks from cache", seen.len());
                seen
            }
            Err(error) => {
                tracing::warn!(
                    path = %self.path.display(),
                    %error,
                    "Cache file is not a JSON string array, starting fresh"
                );
                SeenIdSet::new()
            }
        }
    }

    async fn save(&self, seen: &SeenIdSet) -> Result<(), StoreError> {
        let ids: Vec<&str> = seen.iter().collect();
        let data = serde_json::to_vec(&ids)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.write_error(e))?;
        }

        // Write beside the target then rename, so a crash never leaves a torn file.
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, data)
            .await
            .map_err(|e| self.write_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.write_error(e))?;
        Ok(())
    }
}
