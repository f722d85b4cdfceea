use serde::{Deserialize, Serialize};

use crate::domain::entities::chapter::Chapter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MangaStatus {
    #[default]
    Ongoing,
    Completed,
    Hiatus,
}

impl From<&str> for MangaStatus {
    fn from(s: &str) -> Self {
        match s {
            "completed" => Self::Completed,
            "hiatus" => Self::Hiatus,
            _ => Self::Ongoing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manga {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub cover_url: String,
    pub status: MangaStatus,
    pub genres: Vec<String>,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    /// Chapter id the user last opened.
    #[serde(default)]
    pub last_read: Option<String>,
    #[serde(default)]
    pub in_library: bool,
    /// Ids of chapters stored for offline reading, a subset of `chapters`.
    #[serde(default)]
    pub downloaded_chapters: Vec<String>,
}

impl Default for Manga {
    fn default() -> Self {
        Self {
            id: "".to_string(),
            title: "".to_string(),
            author: "".to_string(),
            description: "".to_string(),
            cover_url: "".to_string(),
            status: MangaStatus::Ongoing,
            genres: vec![],
            chapters: vec![],
            last_read: None,
            in_library: false,
            downloaded_chapters: vec![],
        }
    }
}
