//! Fixed catalog served when the remote catalog is unreachable or returns a
//! malformed payload. Reading must keep working without a network, so the
//! degradation is silent and the data deliberately small.

use crate::domain::entities::{
    chapter::Chapter,
    manga::{Manga, MangaStatus},
    page::{PLACEHOLDER_PAGE_COUNT, placeholder_tokens},
};

pub const FALLBACK_CHAPTER_COUNT: usize = 20;

pub fn catalogue() -> Vec<Manga> {
    vec![
        Manga {
            id: "fallback-1".to_string(),
            title: "Harbor Moon Drift".to_string(),
            author: "Asako Tanabe".to_string(),
            description:
                "A runaway navigator charts a smuggler crew through the shattered island states. \
                 (Offline catalog entry, remote catalog unavailable)"
                    .to_string(),
            cover_url: "https://via.placeholder.com/200x300/FF6B6B/FFFFFF?text=Harbor+Moon+Drift"
                .to_string(),
            status: MangaStatus::Ongoing,
            genres: vec![
                "Adventure".to_string(),
                "Comedy".to_string(),
                "Drama".to_string(),
            ],
            chapters: chapters("fallback-1", FALLBACK_CHAPTER_COUNT),
            ..Default::default()
        },
        Manga {
            id: "fallback-2".to_string(),
            title: "Iron Bloom Academy".to_string(),
            author: "Kenji Morihara".to_string(),
            description:
                "A scholarship student fights her way through an academy for living weapons. \
                 (Offline catalog entry, remote catalog unavailable)"
                    .to_string(),
            cover_url: "https://via.placeholder.com/200x300/FFA500/FFFFFF?text=Iron+Bloom+Academy"
                .to_string(),
            status: MangaStatus::Completed,
            genres: vec![
                "Action".to_string(),
                "Adventure".to_string(),
                "Martial Arts".to_string(),
            ],
            chapters: chapters("fallback-2", FALLBACK_CHAPTER_COUNT),
            ..Default::default()
        },
    ]
}

/// Case-insensitive substring match over title, author and genres.
pub fn search(query: &str) -> Vec<Manga> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return catalogue();
    }

    catalogue()
        .into_iter()
        .filter(|manga| {
            manga.title.to_lowercase().contains(&query)
                || manga.author.to_lowercase().contains(&query)
                || manga
                    .genres
                    .iter()
                    .any(|genre| genre.to_lowercase().contains(&query))
        })
        .collect()
}

/// Synthesized chapter list for any entity id, pages as placeholder tokens
/// the page resolver turns into rendered placeholders on demand.
pub fn chapters(manga_id: &str, count: usize) -> Vec<Chapter> {
    (1..=count)
        .map(|n| Chapter {
            id: format!("{manga_id}-{n}"),
            number: n.to_string(),
            title: format!("Chapter {n}"),
            pages: placeholder_tokens(manga_id, &n.to_string(), PLACEHOLDER_PAGE_COUNT),
            manga_id: manga_id.to_string(),
            ..Default::default()
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_search_by_title() {
        let found = search("harbor");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "fallback-1");
    }

    #[test]
    fn test_search_by_author_case_insensitive() {
        let found = search("MORIHARA");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "fallback-2");
    }

    #[test]
    fn test_search_by_genre() {
        let found = search("adventure");

        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_search_no_match() {
        assert!(search("definitely not here").is_empty());
    }

    #[test]
    fn test_blank_query_returns_whole_catalogue() {
        assert_eq!(search("   ").len(), 2);
    }

    #[test]
    fn test_chapters_are_synthesized_for_any_id() {
        let chapters = chapters("some-remote-id", 5);

        assert_eq!(chapters.len(), 5);
        assert_eq!(chapters[0].id, "some-remote-id-1");
        assert_eq!(chapters[4].number, "5");
        assert_eq!(chapters[0].pages.len(), PLACEHOLDER_PAGE_COUNT);
        assert!(chapters.iter().all(|c| !c.downloaded));
    }
}
