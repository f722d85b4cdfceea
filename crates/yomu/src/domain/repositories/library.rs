use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    entities::{chapter::Chapter, manga::Manga},
    repositories::store::StoreError,
};

#[derive(Debug, Error)]
pub enum LibraryRepositoryError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("corrupt slot payload: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[async_trait]
pub trait LibraryRepository: Send + Sync {
    async fn get_library(&self) -> Result<Vec<Manga>, LibraryRepositoryError>;
    async fn get_manga_by_id(&self, id: &str) -> Result<Option<Manga>, LibraryRepositoryError>;
    /// Read-modify-write upsert matched by id. Returns the merged record as
    /// stored.
    async fn upsert_manga(&self, manga: Manga) -> Result<Manga, LibraryRepositoryError>;
    /// Removes by id and returns the remaining library.
    async fn remove_manga(&self, id: &str) -> Result<Vec<Manga>, LibraryRepositoryError>;
    async fn update_chapters(
        &self,
        manga_id: &str,
        chapters: &[Chapter],
    ) -> Result<(), LibraryRepositoryError>;
    /// Replaces the stored chapter and records its id as downloaded, exactly
    /// once.
    async fn mark_chapter_downloaded(
        &self,
        manga_id: &str,
        chapter: Chapter,
    ) -> Result<(), LibraryRepositoryError>;
}
