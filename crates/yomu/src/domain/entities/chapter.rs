use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    /// Numeric-as-string ordering key, e.g. "5" or "10.5".
    pub number: String,
    pub title: String,
    /// Remote URLs, data-URIs or opaque placeholder tokens.
    pub pages: Vec<String>,
    /// Populated only once the chapter has been downloaded; same length as
    /// `pages` from then on.
    #[serde(default)]
    pub downloaded_pages: Option<Vec<String>>,
    #[serde(default)]
    pub downloaded: bool,
    #[serde(default)]
    pub read_at: Option<NaiveDateTime>,
    pub manga_id: String,
}

impl Default for Chapter {
    fn default() -> Self {
        Self {
            id: "".to_string(),
            number: "".to_string(),
            title: "".to_string(),
            pages: vec![],
            downloaded_pages: None,
            downloaded: false,
            read_at: None,
            manga_id: "".to_string(),
        }
    }
}
