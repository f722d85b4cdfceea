use thiserror::Error;
use tokio::time::{Duration, sleep};

use crate::domain::{
    entities::{
        chapter::Chapter,
        manga::Manga,
        page::synthesized_page,
        progress::ReadingProgress,
    },
    repositories::{
        image::ImageRepository,
        library::{LibraryRepository, LibraryRepositoryError},
        progress::{ProgressRepository, ProgressRepositoryError},
        source::SourceRepository,
    },
    services::{catalogue::CatalogueService, page::PageService},
};

const PAGE_DOWNLOAD_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("library repository error: {0}")]
    Repository(#[from] LibraryRepositoryError),
    #[error("progress repository error: {0}")]
    Progress(#[from] ProgressRepositoryError),
}

/// Owns the user's saved manga and all local mutations to them. The only
/// writer of the library slot; catalog and page lookups are composed in and
/// their degradations inherited, so reads always produce something to render.
pub struct LibraryService<L, P, S, I>
where
    L: LibraryRepository,
    P: ProgressRepository,
    S: SourceRepository,
    I: ImageRepository,
{
    library: L,
    progress: P,
    catalogue: CatalogueService<S>,
    pages: PageService<S, I>,
}

impl<L, P, S, I> LibraryService<L, P, S, I>
where
    L: LibraryRepository,
    P: ProgressRepository,
    S: SourceRepository,
    I: ImageRepository,
{
    pub fn new(
        library: L,
        progress: P,
        catalogue: CatalogueService<S>,
        pages: PageService<S, I>,
    ) -> Self {
        Self {
            library,
            progress,
            catalogue,
            pages,
        }
    }

    pub async fn search(&self, query: &str) -> Vec<Manga> {
        self.catalogue.search(query).await
    }

    pub async fn popular(&self) -> Vec<Manga> {
        self.catalogue.popular().await
    }

    pub async fn library(&self) -> Result<Vec<Manga>, LibraryError> {
        Ok(self.library.get_library().await?)
    }

    pub async fn add_to_library(&self, mut manga: Manga) -> Result<Manga, LibraryError> {
        manga.in_library = true;
        let merged = self.library.upsert_manga(manga).await?;
        info!("saved {} to library", merged.title);
        Ok(merged)
    }

    pub async fn remove_from_library(&self, id: &str) -> Result<Vec<Manga>, LibraryError> {
        Ok(self.library.remove_manga(id).await?)
    }

    /// Library copy by id. A manga saved before its chapters were known gets
    /// them attached here; persisting the attachment is best-effort.
    pub async fn manga_by_id(&self, id: &str) -> Result<Option<Manga>, LibraryError> {
        let Some(mut manga) = self.library.get_manga_by_id(id).await? else {
            return Ok(None);
        };

        if manga.chapters.is_empty() {
            manga.chapters = self.catalogue.chapters(id).await;
            if let Err(e) = self.library.update_chapters(id, &manga.chapters).await {
                warn!("could not persist chapters for {id}, continuing unsaved: {e}");
            }
        }

        Ok(Some(manga))
    }

    /// The chapter with its page list re-resolved. Stored pages are never
    /// trusted here; every read goes through the resolver again so stale
    /// placeholder pages get another chance at the real thing.
    pub async fn chapter_with_pages(
        &self,
        manga_id: &str,
        chapter_id: &str,
    ) -> Result<Option<Chapter>, LibraryError> {
        let Some(manga) = self.manga_by_id(manga_id).await? else {
            return Ok(None);
        };
        let Some(chapter) = manga.chapters.iter().find(|c| c.id == chapter_id).cloned() else {
            return Ok(None);
        };

        let pages = self
            .pages
            .resolve(chapter_id, &manga.title, &chapter.number)
            .await;

        Ok(Some(Chapter { pages, ..chapter }))
    }

    pub async fn record_progress(&self, progress: ReadingProgress) -> Result<(), LibraryError> {
        Ok(self.progress.save_progress(progress).await?)
    }

    pub async fn progress(
        &self,
        manga_id: &str,
        chapter_id: &str,
    ) -> Result<Option<ReadingProgress>, LibraryError> {
        Ok(self.progress.get_progress(manga_id, chapter_id).await?)
    }

    pub async fn all_progress(&self) -> Result<Vec<ReadingProgress>, LibraryError> {
        Ok(self.progress.get_all_progress().await?)
    }

    /// Stores an offline rendition of the chapter, one page at a time with an
    /// artificial delay so the UI can show motion. Idempotent: downloading a
    /// chapter twice leaves its id in the downloaded list once.
    pub async fn download_chapter(
        &self,
        manga: &Manga,
        chapter: &Chapter,
    ) -> Result<Chapter, LibraryError> {
        info!("downloading {} - chapter {}", manga.title, chapter.number);

        let total = chapter.pages.len();
        let mut downloaded_pages = Vec::with_capacity(total);
        for page in 1..=total {
            sleep(PAGE_DOWNLOAD_DELAY).await;
            downloaded_pages.push(synthesized_page(&manga.title, &chapter.number, page, total));
        }

        let mut updated = chapter.clone();
        updated.downloaded_pages = Some(downloaded_pages);
        updated.downloaded = true;

        self.library
            .mark_chapter_downloaded(&manga.id, updated.clone())
            .await?;
        info!("downloaded {} - chapter {}", manga.title, chapter.number);

        Ok(updated)
    }
}
