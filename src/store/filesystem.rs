use super::{check_size, new_record, parse_poster_id, PosterStore};
use crate::models::{EncodedPoster, GeneratedPoster, PosterRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Stores `{id}.{ext}` plus an `{id}.json` sidecar in one directory.
pub struct FilesystemStore {
    dir: PathBuf,
    max_file_size: u64,
}

impl FilesystemStore {
    pub fn new(dir: impl Into<PathBuf>, max_file_size: u64) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        info!("Poster store at {}", dir.display());
        Ok(Self { dir, max_file_size })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn sidecar_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    fn image_path(&self, poster: &GeneratedPoster) -> PathBuf {
        self.dir
            .join(format!("{}.{}", poster.poster_id, poster.format.extension()))
    }

    async fn read_record(&self, id: Uuid) -> Result<GeneratedPoster> {
        let bytes = match tokio::fs::read(self.sidecar_path(id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFound(format!("poster '{}'", id)))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Write through a temp file in the same directory, then rename into place.
fn write_atomic(dir: &Path, target: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(target).map_err(|e| Error::FileSystem(e.error))?;
    Ok(())
}

/// Image first, then the sidecar. A failed sidecar write takes the image
/// back out so no orphan is left behind.
fn write_poster(
    dir: &Path,
    image_path: &Path,
    image: &[u8],
    sidecar_path: &Path,
    sidecar: &[u8],
) -> Result<()> {
    write_atomic(dir, image_path, image)?;
    write_atomic(dir, sidecar_path, sidecar).inspect_err(|e| {
        warn!("Sidecar write failed ({}), removing {}", e, image_path.display());
        if let Err(e) = std::fs::remove_file(image_path) {
            warn!("Failed to remove orphaned image: {}", e);
        }
    })
}

#[async_trait]
impl PosterStore for FilesystemStore {
    async fn save(
        &self,
        poster: &EncodedPoster,
        request: &PosterRequest,
    ) -> Result<GeneratedPoster> {
        check_size(poster, self.max_file_size)?;

        let record = new_record(poster, request);
        let sidecar = serde_json::to_vec_pretty(&record)?;
        let dir = self.dir.clone();
        let image_path = self.image_path(&record);
        let sidecar_path = self.sidecar_path(record.poster_id);
        let bytes = poster.bytes.clone();

        tokio::task::spawn_blocking(move || {
            write_poster(&dir, &image_path, &bytes, &sidecar_path, &sidecar)
        })
        .await
        .map_err(|e| Error::Invariant(format!("Store task failed: {}", e)))??;

        debug!(
            "Stored poster {} ({} bytes)",
            record.poster_id, record.file_size
        );
        Ok(record)
    }

    async fn load(&self, poster_id: &str) -> Result<(Vec<u8>, GeneratedPoster)> {
        let id = parse_poster_id(poster_id)?;
        let record = self.read_record(id).await?;
        let bytes = match tokio::fs::read(self.image_path(&record)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFound(format!("poster '{}'", id)))
            }
            Err(e) => return Err(e.into()),
        };
        Ok((bytes, record))
    }

    async fn delete(&self, poster_id: &str) -> Result<()> {
        let id = parse_poster_id(poster_id)?;
        let record = self.read_record(id).await?;

        tokio::fs::remove_file(self.sidecar_path(id)).await?;
        match tokio::fs::remove_file(self.image_path(&record)).await {
            Err(e) if e.kind() != ErrorKind::NotFound => return Err(e.into()),
            _ => {}
        }
        info!("Deleted poster {}", id);
        Ok(())
    }
}
