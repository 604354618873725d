use super::{check_size, new_record, parse_poster_id, PosterStore};
use crate::models::{EncodedPoster, GeneratedPoster, PosterRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// In-memory store for tests.
#[derive(Clone)]
pub struct MockPosterStore {
    posters: Arc<Mutex<HashMap<Uuid, (Vec<u8>, GeneratedPoster)>>>,
    max_file_size: u64,
    save_count: Arc<Mutex<usize>>,
}

impl MockPosterStore {
    pub fn new() -> Self {
        Self {
            posters: Arc::new(Mutex::new(HashMap::new())),
            max_file_size: u64::MAX,
            save_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    pub fn get_save_count(&self) -> usize {
        *self.save_count.lock().unwrap()
    }

    pub fn len(&self) -> usize {
        self.posters.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MockPosterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PosterStore for MockPosterStore {
    async fn save(
        &self,
        poster: &EncodedPoster,
        request: &PosterRequest,
    ) -> Result<GeneratedPoster> {
        *self.save_count.lock().unwrap() += 1;
        check_size(poster, self.max_file_size)?;

        let record = new_record(poster, request);
        self.posters
            .lock()
            .unwrap()
            .insert(record.poster_id, (poster.bytes.clone(), record.clone()));
        Ok(record)
    }

    async fn load(&self, poster_id: &str) -> Result<(Vec<u8>, GeneratedPoster)> {
        let id = parse_poster_id(poster_id)?;
        self.posters
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("poster '{}'", id)))
    }

    async fn delete(&self, poster_id: &str) -> Result<()> {
        let id = parse_poster_id(poster_id)?;
        self.posters
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("poster '{}'", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OutputFormat;

    fn encoded(len: usize) -> EncodedPoster {
        EncodedPoster {
            bytes: vec![7; len],
            format: OutputFormat::Jpeg,
            width: 3,
            height: 4,
        }
    }

    #[tokio::test]
    async fn test_mock_store_round_trip() {
        let store = MockPosterStore::new();
        let saved = store
            .save(&encoded(12), &PosterRequest::new("t"))
            .await
            .unwrap();

        let (bytes, record) = store.load(&saved.poster_id.to_string()).await.unwrap();

        assert_eq!(bytes, vec![7; 12]);
        assert_eq!(record.filename, format!("{}.jpg", saved.poster_id));
        assert_eq!(store.get_save_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_store_enforces_size_limit() {
        let store = MockPosterStore::new().with_max_file_size(5);
        let result = store.save(&encoded(6), &PosterRequest::new("t")).await;

        assert!(matches!(result, Err(Error::FileTooLarge { .. })));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_mock_store_delete() {
        let store = MockPosterStore::new();
        let saved = store
            .save(&encoded(1), &PosterRequest::new("t"))
            .await
            .unwrap();
        let id = saved.poster_id.to_string();

        store.delete(&id).await.unwrap();

        assert!(matches!(store.delete(&id).await, Err(Error::NotFound(_))));
    }
}
