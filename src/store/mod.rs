//! Poster persistence
//!
//! A store keeps the encoded image together with its metadata record and
//! hands them back by poster id. Ids are always UUIDs; anything else is
//! reported as not found.

pub mod filesystem;
pub mod mock;

pub use filesystem::FilesystemStore;
pub use mock::MockPosterStore;

use crate::models::{EncodedPoster, GeneratedPoster, PosterRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

#[async_trait]
pub trait PosterStore: Send + Sync {
    async fn save(&self, poster: &EncodedPoster, request: &PosterRequest)
        -> Result<GeneratedPoster>;
    async fn load(&self, poster_id: &str) -> Result<(Vec<u8>, GeneratedPoster)>;
    async fn delete(&self, poster_id: &str) -> Result<()>;
}

/// Parse a caller-supplied id. Non-UUID input never reaches the backend.
pub fn parse_poster_id(poster_id: &str) -> Result<Uuid> {
    Uuid::try_parse(poster_id.trim())
        .map_err(|_| Error::NotFound(format!("poster '{}'", poster_id)))
}

pub(crate) fn check_size(poster: &EncodedPoster, max: u64) -> Result<()> {
    let size = poster.bytes.len() as u64;
    if size > max {
        return Err(Error::FileTooLarge { size, max });
    }
    Ok(())
}

pub(crate) fn new_record(poster: &EncodedPoster, request: &PosterRequest) -> GeneratedPoster {
    let poster_id = Uuid::new_v4();
    GeneratedPoster {
        poster_id,
        filename: format!("{}.{}", poster_id, poster.format.extension()),
        format: poster.format,
        width: poster.width,
        height: poster.height,
        file_size: poster.bytes.len() as u64,
        created_at: Utc::now(),
        request: request.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poster_ids_must_be_uuids() {
        for bad in ["does-not-exist", "../etc/passwd", "", "..%2F..%2Fsecret", "poster_1"] {
            assert!(
                matches!(parse_poster_id(bad), Err(Error::NotFound(_))),
                "{} should be rejected",
                bad
            );
        }
        let id = Uuid::new_v4();
        assert_eq!(parse_poster_id(&id.to_string()).unwrap(), id);
    }
}
