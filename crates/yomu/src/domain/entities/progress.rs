use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the user left off in a chapter. Keyed by (manga_id, chapter_id),
/// last write wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingProgress {
    pub manga_id: String,
    pub chapter_id: String,
    pub page_index: usize,
    pub timestamp: NaiveDateTime,
}

impl ReadingProgress {
    pub fn new(manga_id: impl Into<String>, chapter_id: impl Into<String>, page_index: usize) -> Self {
        Self {
            manga_id: manga_id.into(),
            chapter_id: chapter_id.into(),
            page_index,
            timestamp: Utc::now().naive_utc(),
        }
    }
}
