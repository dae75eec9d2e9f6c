//! Local filesystem storage backend
//!
//! Implements `StorageBackend` by writing below the policy's storage root.
//! Each write goes to a uniquely named sibling temp file that is renamed over
//! the target once complete, so a reader never sees a half-written asset.
//!
//! ## Layout
//!
//! ```text
//! <storage_root>/
//! └── images/
//!     ├── users/
//!     │   └── user-avatar_42_20240101_000000.png
//!     └── babies/
//!         └── baby-avatar_20240101_000000.jpg
//! ```

use std::path::{Path, PathBuf};

use stowage_domain::{
    ingestion::{AssetStream, IngestionError, StorageKey, StorageStage},
    policy::{local_public_url, Policy},
    ports::{ensure_declared_length, StorageBackend},
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Filesystem-based implementation of the StorageBackend port
///
/// Storage keys map one-to-one onto relative paths below `root`. URLs point at
/// `<public_base_url>/uploads/<key>`, which assumes the hosting HTTP server
/// serves `root` at `/uploads`.
#[derive(Debug, Clone)]
pub struct LocalFsStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalFsStorage {
    /// Create a new local storage rooted at `root`
    ///
    /// Nothing is created on disk until the first `put`.
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        let root = root.into();
        let public_base_url = public_base_url.into();
        info!(root = %root.display(), base_url = %public_base_url, "Initializing LocalFsStorage");
        Self {
            root,
            public_base_url,
        }
    }

    /// Create the local storage described by `policy`
    pub fn from_policy(policy: &Policy) -> Self {
        Self::new(policy.storage_root.clone(), policy.public_base_url.clone())
    }

    /// Get the storage root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the file holding `key`
    ///
    /// Keys with empty, `.` or `..` segments are refused so a key can never
    /// address anything outside the root.
    pub fn object_path(&self, key: &StorageKey) -> Result<PathBuf, IngestionError> {
        let mut path = self.root.clone();
        for segment in key.segments() {
            if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
                return Err(IngestionError::invalid_input(format!(
                    "Storage key '{}' is not a plain relative path",
                    key
                )));
            }
            path.push(segment);
        }
        Ok(path)
    }
}

impl StorageBackend for LocalFsStorage {
    #[instrument(skip(self, content), fields(key = %key, declared_length = content.declared_length()))]
    fn put(
        &self,
        key: &StorageKey,
        content: AssetStream,
    ) -> impl std::future::Future<Output = Result<(), IngestionError>> + Send {
        let target = self.object_path(key);
        let key = key.clone();

        async move {
            let target = target?;
            let declared = content.declared_length();
            // object_path always yields at least root/<segment>
            let dir = target.parent().map(Path::to_path_buf).unwrap_or_default();

            debug!(path = %target.display(), "Saving asset to local storage");

            create_dirs(&dir).await.map_err(|err| {
                error!(key = %key, dir = %dir.display(), error = ?err, "Failed to create asset directory");
                IngestionError::storage_io(StorageStage::CreateDir, err)
            })?;

            let mut partial = PartialFile::new(temp_path_for(&target));

            let mut file = create_file(partial.path()).await.map_err(|err| {
                error!(key = %key, error = ?err, "Failed to create asset file");
                IngestionError::storage_io(StorageStage::CreateFile, err)
            })?;

            // One byte past the declared length is enough to detect a longer stream.
            let mut reader = content.into_reader().take(declared.saturating_add(1));
            let written = copy_all(&mut reader, &mut file).await.map_err(|err| {
                error!(key = %key, error = ?err, "Failed to write asset content");
                IngestionError::storage_io(StorageStage::Copy, err)
            })?;
            drop(file);
            ensure_declared_length(StorageStage::Copy, written, declared)?;

            tokio::fs::rename(partial.path(), &target)
                .await
                .map_err(|err| {
                    error!(key = %key, error = ?err, "Failed to move asset into place");
                    IngestionError::storage_io(StorageStage::Commit, err)
                })?;
            partial.commit();

            info!(key = %key, size = written, "Successfully saved asset to local storage");
            Ok(())
        }
    }

    fn resolve_url(&self, key: &StorageKey) -> String {
        local_public_url(&self.public_base_url, key.as_str())
    }
}

async fn create_dirs(dir: &Path) -> std::io::Result<()> {
    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o755);
    builder.create(dir).await
}

async fn create_file(path: &Path) -> std::io::Result<tokio::fs::File> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o644);
    options.open(path).await
}

async fn copy_all<R>(reader: &mut R, file: &mut tokio::fs::File) -> std::io::Result<u64>
where
    R: tokio::io::AsyncRead + Unpin + ?Sized,
{
    let written = tokio::io::copy(reader, file).await?;
    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}

/// Hidden sibling of `target` unique to this write
fn temp_path_for(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{}.{}.tmp", name, Uuid::now_v7()))
}

/// Temp file removed on drop unless committed
struct PartialFile {
    path: PathBuf,
    committed: bool,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn commit(&mut self) {
        self.committed = true;
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        // Blocking removal; drop cannot await.
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed partial asset file"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                warn!(path = %self.path.display(), error = ?err, "Failed to remove partial asset file")
            }
        }
    }
}
