use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{entities::progress::ReadingProgress, repositories::store::StoreError};

#[derive(Debug, Error)]
pub enum ProgressRepositoryError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("corrupt slot payload: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Upsert keyed by (manga_id, chapter_id), last write wins.
    async fn save_progress(&self, progress: ReadingProgress)
    -> Result<(), ProgressRepositoryError>;
    async fn get_progress(
        &self,
        manga_id: &str,
        chapter_id: &str,
    ) -> Result<Option<ReadingProgress>, ProgressRepositoryError>;
    async fn get_all_progress(&self) -> Result<Vec<ReadingProgress>, ProgressRepositoryError>;
}
