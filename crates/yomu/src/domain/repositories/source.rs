use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{chapter::Chapter, manga::Manga, page::PageContext};

#[derive(Debug, Error)]
pub enum SourceRepositoryError {
    #[error("error request catalog: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("catalog returned status {0}")]
    UnexpectedStatus(u16),
    #[error("catalog response missing expected fields")]
    MalformedResponse,
}

/// Read access to the remote catalog. Every operation is fallible here;
/// substituting fallback data is the catalogue service's job.
#[async_trait]
pub trait SourceRepository: Send + Sync {
    async fn search_manga(&self, query: &str) -> Result<Vec<Manga>, SourceRepositoryError>;
    async fn get_popular_manga(&self) -> Result<Vec<Manga>, SourceRepositoryError>;
    /// Ascending by chapter number, deduplicated so each number appears once.
    async fn get_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>, SourceRepositoryError>;
    async fn get_page_context(
        &self,
        chapter_id: &str,
    ) -> Result<PageContext, SourceRepositoryError>;
}
