use std::collections::BTreeMap;

use async_trait::async_trait;
use itertools::Itertools;
use serde::Deserialize;

use crate::domain::{
    entities::{
        chapter::Chapter,
        manga::{Manga, MangaStatus},
        page::{PLACEHOLDER_PAGE_COUNT, PageContext, placeholder_tokens},
    },
    repositories::source::{SourceRepository, SourceRepositoryError},
};

const LIST_LIMIT: usize = 20;
const FEED_LIMIT: usize = 100;
const DESCRIPTION_LIMIT: usize = 200;
const GENRE_LIMIT: usize = 5;

const UNKNOWN_TITLE: &str = "Unknown Title";
const UNKNOWN_AUTHOR: &str = "Unknown Author";
const NO_DESCRIPTION: &str = "No description available.";
const NO_COVER_URL: &str = "https://via.placeholder.com/200x300/333/FFF?text=No+Cover";

/// Catalog client against a MangaDex-shaped JSON API. Payloads come back as
/// `{ "data": [...] }`; a missing `data` field is a malformed response, which
/// the catalogue service turns into fallback data.
#[derive(Debug, Clone)]
pub struct SourceRepositoryImpl {
    client: reqwest::Client,
    api_url: String,
    cover_url: String,
}

impl SourceRepositoryImpl {
    pub fn new(api_url: impl Into<String>, cover_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            cover_url: cover_url.into(),
        }
    }

    async fn fetch_manga_list(
        &self,
        query: &[(&str, &str)],
    ) -> Result<Vec<Manga>, SourceRepositoryError> {
        let response = self
            .client
            .get(format!("{}/manga", self.api_url))
            .query(query)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SourceRepositoryError::UnexpectedStatus(
                response.status().as_u16(),
            ));
        }

        let body: MangaListBody = response.json().await?;
        let data = body.data.ok_or(SourceRepositoryError::MalformedResponse)?;

        Ok(data
            .into_iter()
            .map(|manga| map_manga(manga, &self.cover_url))
            .collect())
    }
}

#[async_trait]
impl SourceRepository for SourceRepositoryImpl {
    async fn search_manga(&self, query: &str) -> Result<Vec<Manga>, SourceRepositoryError> {
        let limit = LIST_LIMIT.to_string();
        self.fetch_manga_list(&[
            ("title", query),
            ("limit", &limit),
            ("offset", "0"),
            ("includes[]", "cover_art"),
            ("includes[]", "author"),
            ("includes[]", "artist"),
            ("order[relevance]", "desc"),
        ])
        .await
    }

    async fn get_popular_manga(&self) -> Result<Vec<Manga>, SourceRepositoryError> {
        let limit = LIST_LIMIT.to_string();
        self.fetch_manga_list(&[
            ("limit", &limit),
            ("offset", "0"),
            ("includes[]", "cover_art"),
            ("includes[]", "author"),
            ("includes[]", "artist"),
            ("order[followedCount]", "desc"),
            ("hasAvailableChapters", "true"),
        ])
        .await
    }

    async fn get_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>, SourceRepositoryError> {
        let limit = FEED_LIMIT.to_string();
        let response = self
            .client
            .get(format!("{}/manga/{manga_id}/feed", self.api_url))
            .query(&[
                ("limit", limit.as_str()),
                ("offset", "0"),
                ("order[chapter]", "asc"),
                ("translatedLanguage[]", "en"),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SourceRepositoryError::UnexpectedStatus(
                response.status().as_u16(),
            ));
        }

        let body: ChapterFeedBody = response.json().await?;
        let data = body.data.ok_or(SourceRepositoryError::MalformedResponse)?;

        Ok(map_chapters(data, manga_id))
    }

    async fn get_page_context(
        &self,
        chapter_id: &str,
    ) -> Result<PageContext, SourceRepositoryError> {
        let response = self
            .client
            .get(format!("{}/at-home/server/{chapter_id}", self.api_url))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SourceRepositoryError::UnexpectedStatus(
                response.status().as_u16(),
            ));
        }

        let body: AtHomeBody = response.json().await?;

        map_page_context(body)
    }
}

#[derive(Debug, Deserialize)]
struct MangaListBody {
    data: Option<Vec<MangaData>>,
}

#[derive(Debug, Deserialize)]
struct MangaData {
    id: String,
    #[serde(default)]
    attributes: MangaAttributes,
    #[serde(default)]
    relationships: Vec<Relationship>,
}

// language-keyed maps are ordered so "any available language" stays
// deterministic
#[derive(Debug, Default, Deserialize)]
struct MangaAttributes {
    #[serde(default)]
    title: BTreeMap<String, String>,
    #[serde(default)]
    description: BTreeMap<String, String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    tags: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
struct Relationship {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    attributes: Option<RelationshipAttributes>,
}

#[derive(Debug, Default, Deserialize)]
struct RelationshipAttributes {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "fileName")]
    file_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Tag {
    #[serde(default)]
    attributes: TagAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct TagAttributes {
    #[serde(default)]
    group: Option<String>,
    #[serde(default)]
    name: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ChapterFeedBody {
    data: Option<Vec<ChapterData>>,
}

#[derive(Debug, Deserialize)]
struct ChapterData {
    id: String,
    #[serde(default)]
    attributes: ChapterAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct ChapterAttributes {
    #[serde(default)]
    chapter: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtHomeBody {
    #[serde(rename = "baseUrl")]
    base_url: Option<String>,
    chapter: Option<AtHomeChapter>,
}

#[derive(Debug, Default, Deserialize)]
struct AtHomeChapter {
    hash: Option<String>,
    data: Option<Vec<String>>,
    #[serde(default, rename = "dataSaver")]
    data_saver: Vec<String>,
}

fn map_manga(data: MangaData, cover_base: &str) -> Manga {
    let MangaData {
        id,
        attributes,
        relationships,
    } = data;

    // prefer English, then romanized Japanese, then Japanese, then whatever
    // language the catalog has
    let title = attributes
        .title
        .get("en")
        .or_else(|| attributes.title.get("ja-ro"))
        .or_else(|| attributes.title.get("ja"))
        .cloned()
        .or_else(|| attributes.title.values().next().cloned())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

    let description = attributes
        .description
        .get("en")
        .cloned()
        .or_else(|| attributes.description.values().next().cloned())
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());
    let description = truncate_description(&description);

    let author = relationships
        .iter()
        .find(|rel| rel.kind == "author")
        .and_then(|rel| rel.attributes.as_ref())
        .and_then(|attrs| attrs.name.clone())
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

    let cover_url = relationships
        .iter()
        .find(|rel| rel.kind == "cover_art")
        .and_then(|rel| rel.attributes.as_ref())
        .and_then(|attrs| attrs.file_name.clone())
        .map(|file_name| format!("{cover_base}/{id}/{file_name}.256.jpg"))
        .unwrap_or_else(|| NO_COVER_URL.to_string());

    let mut genres: Vec<String> = attributes
        .tags
        .iter()
        .filter(|tag| tag.attributes.group.as_deref() == Some("genre"))
        .filter_map(|tag| tag.attributes.name.get("en").cloned())
        .take(GENRE_LIMIT)
        .collect();
    if genres.is_empty() {
        genres.push("Unknown".to_string());
    }

    let status = attributes
        .status
        .as_deref()
        .map(MangaStatus::from)
        .unwrap_or_default();

    Manga {
        title,
        author,
        description,
        cover_url,
        status,
        genres,
        id,
        ..Default::default()
    }
}

fn truncate_description(description: &str) -> String {
    if description.chars().count() <= DESCRIPTION_LIMIT {
        return description.to_string();
    }

    let truncated: String = description.chars().take(DESCRIPTION_LIMIT).collect();
    format!("{truncated}...")
}

/// The feed repeats chapter numbers when several translations exist; the
/// first occurrence wins, entries without a number are dropped, and the
/// result is ordered ascending by the numeric value of the number.
fn map_chapters(data: Vec<ChapterData>, manga_id: &str) -> Vec<Chapter> {
    let mut chapters: Vec<Chapter> = data
        .into_iter()
        .filter_map(|chapter| {
            let number = chapter
                .attributes
                .chapter
                .clone()
                .filter(|number| !number.is_empty())?;

            Some(Chapter {
                id: chapter.id,
                title: chapter
                    .attributes
                    .title
                    .filter(|title| !title.is_empty())
                    .unwrap_or_else(|| format!("Chapter {number}")),
                pages: placeholder_tokens(manga_id, &number, PLACEHOLDER_PAGE_COUNT),
                number,
                manga_id: manga_id.to_string(),
                ..Default::default()
            })
        })
        .unique_by(|chapter| chapter.number.clone())
        .collect();

    chapters.sort_by(|a, b| chapter_order(&a.number).total_cmp(&chapter_order(&b.number)));

    chapters
}

fn chapter_order(number: &str) -> f64 {
    number.parse().unwrap_or(f64::MAX)
}

fn map_page_context(body: AtHomeBody) -> Result<PageContext, SourceRepositoryError> {
    let base_url = body
        .base_url
        .ok_or(SourceRepositoryError::MalformedResponse)?;
    let chapter = body
        .chapter
        .ok_or(SourceRepositoryError::MalformedResponse)?;
    let hash = chapter.hash.ok_or(SourceRepositoryError::MalformedResponse)?;
    let pages = chapter.data.ok_or(SourceRepositoryError::MalformedResponse)?;

    Ok(PageContext {
        base_url,
        hash,
        pages,
        data_saver: chapter.data_saver,
    })
}
