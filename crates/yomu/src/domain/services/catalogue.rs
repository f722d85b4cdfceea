use crate::domain::{
    entities::{chapter::Chapter, manga::Manga},
    fallback::{self, FALLBACK_CHAPTER_COUNT},
    repositories::source::SourceRepository,
};

/// The fallback boundary around the remote catalog: callers always get data,
/// never an error. A failing or malformed remote response degrades to the
/// fixed fallback catalog.
pub struct CatalogueService<S>
where
    S: SourceRepository,
{
    repo: S,
}

impl<S> CatalogueService<S>
where
    S: SourceRepository,
{
    pub fn new(repo: S) -> Self {
        Self { repo }
    }

    /// An empty or whitespace query means "list popular", not an error.
    pub async fn search(&self, query: &str) -> Vec<Manga> {
        if query.trim().is_empty() {
            return self.popular().await;
        }

        match self.repo.search_manga(query).await {
            Ok(manga) => manga,
            Err(e) => {
                warn!("catalog search failed, serving fallback catalog: {e}");
                fallback::search(query)
            }
        }
    }

    pub async fn popular(&self) -> Vec<Manga> {
        match self.repo.get_popular_manga().await {
            Ok(manga) => manga,
            Err(e) => {
                warn!("popular listing failed, serving fallback catalog: {e}");
                fallback::catalogue()
            }
        }
    }

    pub async fn chapters(&self, manga_id: &str) -> Vec<Chapter> {
        match self.repo.get_chapters(manga_id).await {
            Ok(chapters) => chapters,
            Err(e) => {
                warn!("chapter feed failed for {manga_id}, synthesizing chapters: {e}");
                fallback::chapters(manga_id, FALLBACK_CHAPTER_COUNT)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use async_trait::async_trait;

    use super::*;
    use crate::domain::{
        entities::page::PageContext,
        repositories::source::SourceRepositoryError,
    };

    struct DownSource;

    #[async_trait]
    impl SourceRepository for DownSource {
        async fn search_manga(&self, _query: &str) -> Result<Vec<Manga>, SourceRepositoryError> {
            Err(SourceRepositoryError::UnexpectedStatus(503))
        }

        async fn get_popular_manga(&self) -> Result<Vec<Manga>, SourceRepositoryError> {
            Err(SourceRepositoryError::UnexpectedStatus(503))
        }

        async fn get_chapters(
            &self,
            _manga_id: &str,
        ) -> Result<Vec<Chapter>, SourceRepositoryError> {
            Err(SourceRepositoryError::MalformedResponse)
        }

        async fn get_page_context(
            &self,
            _chapter_id: &str,
        ) -> Result<PageContext, SourceRepositoryError> {
            Err(SourceRepositoryError::MalformedResponse)
        }
    }

    #[tokio::test]
    async fn test_search_falls_back_and_filters() {
        let svc = CatalogueService::new(DownSource);

        let found = svc.search("adventure").await;
        assert_eq!(found.len(), 2);

        let found = svc.search("harbor").await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Harbor Moon Drift");

        let found = svc.search("no such title").await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_blank_query_lists_popular() {
        let svc = CatalogueService::new(DownSource);

        let found = svc.search("   ").await;

        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_chapters_fall_back_to_synthesized_feed() {
        let svc = CatalogueService::new(DownSource);

        let chapters = svc.chapters("some-id").await;

        assert_eq!(chapters.len(), FALLBACK_CHAPTER_COUNT);
        assert!(chapters.iter().all(|c| c.manga_id == "some-id"));
    }
}
