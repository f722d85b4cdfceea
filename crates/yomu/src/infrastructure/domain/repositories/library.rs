use async_trait::async_trait;

use crate::domain::{
    entities::{chapter::Chapter, manga::Manga},
    repositories::{
        library::{LibraryRepository, LibraryRepositoryError},
        store::{Slot, SlotStore, StoreError},
    },
};

#[derive(Debug, Clone)]
pub struct LibraryRepositoryImpl<S>
where
    S: SlotStore,
{
    store: S,
}

impl<S> LibraryRepositoryImpl<S>
where
    S: SlotStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn read_library(&self) -> Result<Vec<Manga>, LibraryRepositoryError> {
        match self.store.read(Slot::Library)? {
            Some(payload) => Ok(serde_json::from_str(&payload)?),
            None => Ok(Vec::new()),
        }
    }

    fn write_library(&self, library: &[Manga]) -> Result<(), LibraryRepositoryError> {
        let payload = serde_json::to_string(library)?;
        self.store.write(Slot::Library, &payload)?;

        Ok(())
    }
}

/// Scalars always take the incoming value; collections and markers only when
/// the incoming copy actually carries data, so re-adding a manga from a
/// search result does not wipe its loaded chapters or download history.
fn merge_manga(existing: &Manga, incoming: Manga) -> Manga {
    let mut merged = incoming;
    if merged.chapters.is_empty() {
        merged.chapters = existing.chapters.clone();
    }
    if merged.downloaded_chapters.is_empty() {
        merged.downloaded_chapters = existing.downloaded_chapters.clone();
    }
    if merged.last_read.is_none() {
        merged.last_read = existing.last_read.clone();
    }

    merged
}

#[async_trait]
impl<S> LibraryRepository for LibraryRepositoryImpl<S>
where
    S: SlotStore,
{
    async fn get_library(&self) -> Result<Vec<Manga>, LibraryRepositoryError> {
        self.read_library()
    }

    async fn get_manga_by_id(&self, id: &str) -> Result<Option<Manga>, LibraryRepositoryError> {
        Ok(self.read_library()?.into_iter().find(|m| m.id == id))
    }

    async fn upsert_manga(&self, manga: Manga) -> Result<Manga, LibraryRepositoryError> {
        let mut library = self.read_library()?;

        let merged = match library.iter_mut().find(|m| m.id == manga.id) {
            Some(existing) => {
                let merged = merge_manga(existing, manga);
                *existing = merged.clone();
                merged
            }
            None => {
                library.push(manga.clone());
                manga
            }
        };

        match self.write_library(&library) {
            Ok(()) => Ok(merged),
            Err(LibraryRepositoryError::Store(StoreError::QuotaExceeded { .. })) => {
                // destructive but deterministic: drop everything in the
                // medium and keep only the record being saved
                warn!("store quota exceeded, clearing and retrying with the newest entry only");
                self.store.clear()?;
                self.write_library(std::slice::from_ref(&merged))?;
                Ok(merged)
            }
            Err(e) => Err(e),
        }
    }

    async fn remove_manga(&self, id: &str) -> Result<Vec<Manga>, LibraryRepositoryError> {
        let library: Vec<Manga> = self
            .read_library()?
            .into_iter()
            .filter(|m| m.id != id)
            .collect();
        self.write_library(&library)?;

        Ok(library)
    }

    async fn update_chapters(
        &self,
        manga_id: &str,
        chapters: &[Chapter],
    ) -> Result<(), LibraryRepositoryError> {
        let mut library = self.read_library()?;
        let Some(manga) = library.iter_mut().find(|m| m.id == manga_id) else {
            return Ok(());
        };

        manga.chapters = chapters.to_vec();
        self.write_library(&library)
    }

    async fn mark_chapter_downloaded(
        &self,
        manga_id: &str,
        chapter: Chapter,
    ) -> Result<(), LibraryRepositoryError> {
        let mut library = self.read_library()?;
        let Some(manga) = library.iter_mut().find(|m| m.id == manga_id) else {
            return Ok(());
        };
        let Some(stored) = manga.chapters.iter_mut().find(|c| c.id == chapter.id) else {
            return Ok(());
        };

        let chapter_id = chapter.id.clone();
        *stored = chapter;
        if !manga.downloaded_chapters.contains(&chapter_id) {
            manga.downloaded_chapters.push(chapter_id);
        }

        self.write_library(&library)
    }
}
