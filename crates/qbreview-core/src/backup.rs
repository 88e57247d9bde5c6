//! Backup and restore of the whole root.
//!
//! A backup is the output of [`RecordStore::dump`]: one compact JSON document.
//!
//! # Example
//!
//! ```ignore
//! let bytes = export_backup(&store, "qbreview-backup.json").await?;
//! import_backup(&store, "qbreview-backup.json").await?;
//! store.validate_version().await?;
//! ```

use std::path::Path;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::info;

use crate::error::QbResult;
use crate::store::RecordStore;

/// Write a dump to any async writer. Returns the number of bytes written.
pub async fn write_backup<W>(store: &RecordStore, mut writer: W) -> QbResult<usize>
where
    W: AsyncWrite + Unpin,
{
    let dump = store.dump().await?;
    writer.write_all(dump.as_bytes()).await?;
    writer.flush().await?;
    Ok(dump.len())
}

/// Read a dump from any async reader and load it.
///
/// A legacy root is loaded as-is; run `validate_version` afterwards.
pub async fn read_backup<R>(store: &RecordStore, mut reader: R) -> QbResult<()>
where
    R: AsyncRead + Unpin,
{
    let mut dump = String::new();
    reader.read_to_string(&mut dump).await?;
    store.load(&dump).await
}

/// Write a dump to a file, replacing it if it exists.
pub async fn export_backup(store: &RecordStore, path: impl AsRef<Path>) -> QbResult<usize> {
    let path = path.as_ref();
    let file = tokio::fs::File::create(path).await?;
    let bytes = write_backup(store, file).await?;
    info!(path = %path.display(), bytes, "Exported backup");
    Ok(bytes)
}

/// Load a dump from a file.
pub async fn import_backup(store: &RecordStore, path: impl AsRef<Path>) -> QbResult<()> {
    let path = path.as_ref();
    let file = tokio::fs::File::open(path).await?;
    read_backup(store, file).await?;
    info!(path = %path.display(), "Imported backup");
    Ok(())
}
