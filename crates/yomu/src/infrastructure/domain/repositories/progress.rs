use async_trait::async_trait;

use crate::domain::{
    entities::progress::ReadingProgress,
    repositories::{
        progress::{ProgressRepository, ProgressRepositoryError},
        store::{Slot, SlotStore},
    },
};

#[derive(Debug, Clone)]
pub struct ProgressRepositoryImpl<S>
where
    S: SlotStore,
{
    store: S,
}

impl<S> ProgressRepositoryImpl<S>
where
    S: SlotStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn read_all(&self) -> Result<Vec<ReadingProgress>, ProgressRepositoryError> {
        match self.store.read(Slot::Progress)? {
            Some(payload) => Ok(serde_json::from_str(&payload)?),
            None => Ok(Vec::new()),
        }
    }

    fn write_all(&self, all: &[ReadingProgress]) -> Result<(), ProgressRepositoryError> {
        let payload = serde_json::to_string(all)?;
        self.store.write(Slot::Progress, &payload)?;

        Ok(())
    }
}

#[async_trait]
impl<S> ProgressRepository for ProgressRepositoryImpl<S>
where
    S: SlotStore,
{
    async fn save_progress(
        &self,
        progress: ReadingProgress,
    ) -> Result<(), ProgressRepositoryError> {
        let mut all = self.read_all()?;

        match all
            .iter_mut()
            .find(|p| p.manga_id == progress.manga_id && p.chapter_id == progress.chapter_id)
        {
            Some(existing) => *existing = progress,
            None => all.push(progress),
        }

        self.write_all(&all)
    }

    async fn get_progress(
        &self,
        manga_id: &str,
        chapter_id: &str,
    ) -> Result<Option<ReadingProgress>, ProgressRepositoryError> {
        Ok(self
            .read_all()?
            .into_iter()
            .find(|p| p.manga_id == manga_id && p.chapter_id == chapter_id))
    }

    async fn get_all_progress(&self) -> Result<Vec<ReadingProgress>, ProgressRepositoryError> {
        self.read_all()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::infrastructure::store::memory::MemoryStore;

    #[tokio::test]
    async fn test_save_twice_same_key_keeps_latest() {
        let repo = ProgressRepositoryImpl::new(MemoryStore::new());

        repo.save_progress(ReadingProgress::new("m1", "c1", 3))
            .await
            .unwrap();
        repo.save_progress(ReadingProgress::new("m1", "c1", 9))
            .await
            .unwrap();

        let all = repo.get_all_progress().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].page_index, 9);
    }

    #[tokio::test]
    async fn test_distinct_keys_keep_distinct_records() {
        let repo = ProgressRepositoryImpl::new(MemoryStore::new());

        repo.save_progress(ReadingProgress::new("m1", "c1", 1))
            .await
            .unwrap();
        repo.save_progress(ReadingProgress::new("m1", "c2", 2))
            .await
            .unwrap();

        assert_eq!(repo.get_all_progress().await.unwrap().len(), 2);
        assert_eq!(
            repo.get_progress("m1", "c2").await.unwrap().unwrap().page_index,
            2
        );
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let repo = ProgressRepositoryImpl::new(MemoryStore::new());

        assert!(repo.get_progress("m1", "c1").await.unwrap().is_none());
    }
}
