use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::domain::{
    entities::page::{PLACEHOLDER_PAGE_COUNT, PageContext, synthesized_pages},
    repositories::{
        image::ImageRepository,
        source::{SourceRepository, SourceRepositoryError},
    },
};

/// Characters escaped when a URL rides inside a query component. Everything
/// but ASCII alphanumerics and `-_.!~*'()`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn encode_component(url: &str) -> String {
    utf8_percent_encode(url, COMPONENT).to_string()
}

/// One way of reaching the image host. Strategies are plain values so the
/// chain stays declarative: a name for the logs and a URL rewrite rule.
#[derive(Debug, Clone)]
pub struct PageStrategy {
    name: &'static str,
    kind: StrategyKind,
}

#[derive(Debug, Clone)]
enum StrategyKind {
    /// Our own pass-through relay.
    Relay { base_url: String },
    /// A public CORS relay that takes the target URL as a suffix.
    CorsProxy { base_url: String },
    Direct,
}

impl PageStrategy {
    pub fn relay(base_url: impl Into<String>) -> Self {
        Self {
            name: "local relay",
            kind: StrategyKind::Relay {
                base_url: base_url.into(),
            },
        }
    }

    pub fn cors_proxy(base_url: impl Into<String>) -> Self {
        Self {
            name: "cors proxy",
            kind: StrategyKind::CorsProxy {
                base_url: base_url.into(),
            },
        }
    }

    pub fn direct() -> Self {
        Self {
            name: "direct",
            kind: StrategyKind::Direct,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn rewrite(&self, url: &str) -> String {
        match &self.kind {
            StrategyKind::Relay { base_url } => format!(
                "{}/proxy?url={}",
                base_url.trim_end_matches('/'),
                encode_component(url)
            ),
            StrategyKind::CorsProxy { base_url } => {
                format!("{base_url}{}", encode_component(url))
            }
            StrategyKind::Direct => url.to_string(),
        }
    }
}

/// Resolves a chapter into directly renderable page sources: server lookup,
/// then a probe over the strategy chain, then a sequential bulk fetch, with a
/// lower-resolution retry and synthesized placeholders behind it. `resolve`
/// never fails.
pub struct PageService<S, I>
where
    S: SourceRepository,
    I: ImageRepository,
{
    source: S,
    images: I,
    strategies: Vec<PageStrategy>,
}

impl<S, I> PageService<S, I>
where
    S: SourceRepository,
    I: ImageRepository,
{
    pub fn new(source: S, images: I, strategies: Vec<PageStrategy>) -> Self {
        Self {
            source,
            images,
            strategies,
        }
    }

    pub async fn resolve(
        &self,
        chapter_id: &str,
        manga_title: &str,
        chapter_number: &str,
    ) -> Vec<String> {
        match self.resolve_remote(chapter_id).await {
            Ok(pages) if !pages.is_empty() => pages,
            Ok(_) => {
                info!("no retrieval strategy produced pages for chapter {chapter_id}, synthesizing placeholders");
                synthesized_pages(manga_title, chapter_number, PLACEHOLDER_PAGE_COUNT)
            }
            Err(e) => {
                warn!("page lookup failed for chapter {chapter_id}, synthesizing placeholders: {e}");
                synthesized_pages(manga_title, chapter_number, PLACEHOLDER_PAGE_COUNT)
            }
        }
    }

    async fn resolve_remote(&self, chapter_id: &str) -> Result<Vec<String>, SourceRepositoryError> {
        let ctx = self.source.get_page_context(chapter_id).await?;

        if let Some(strategy) = self.probe(&ctx).await {
            let pages = self.bulk_fetch(&ctx, strategy).await;
            if !pages.is_empty() {
                return Ok(pages);
            }
        }

        Ok(self.data_saver_retry(&ctx).await)
    }

    /// Tries the first page through each strategy in order; the first one
    /// answering with an `image/*` body wins.
    async fn probe(&self, ctx: &PageContext) -> Option<&PageStrategy> {
        let first = ctx.pages.first()?;
        let url = ctx.page_url(first);

        for strategy in &self.strategies {
            match self.images.fetch_image(&strategy.rewrite(&url)).await {
                Ok(image) if image.is_image() => {
                    debug!("strategy {} selected for {url}", strategy.name());
                    return Some(strategy);
                }
                Ok(image) => {
                    debug!(
                        "strategy {} answered with non-image content type {}",
                        strategy.name(),
                        image.content_type
                    );
                }
                Err(e) => {
                    debug!("strategy {} failed: {e}", strategy.name());
                }
            }
        }

        None
    }

    /// Sequential on purpose: the result on failure is the prefix of pages
    /// fetched so far, which is only well-defined if pages arrive in order.
    async fn bulk_fetch(&self, ctx: &PageContext, strategy: &PageStrategy) -> Vec<String> {
        let mut pages = Vec::with_capacity(ctx.pages.len());

        for filename in &ctx.pages {
            let url = strategy.rewrite(&ctx.page_url(filename));
            match self.images.fetch_image(&url).await {
                Ok(image) => pages.push(image.to_data_uri()),
                Err(e) => {
                    warn!(
                        "page fetch failed after {} pages, keeping the prefix: {e}",
                        pages.len()
                    );
                    break;
                }
            }
        }

        pages
    }

    /// Probes the lower-resolution set; on success the rewritten URLs are
    /// handed out as-is rather than re-encoded.
    async fn data_saver_retry(&self, ctx: &PageContext) -> Vec<String> {
        let Some(first) = ctx.data_saver.first() else {
            return Vec::new();
        };
        let url = ctx.data_saver_url(first);

        for strategy in &self.strategies {
            if self.images.fetch_image(&strategy.rewrite(&url)).await.is_ok() {
                info!("serving data saver pages via {}", strategy.name());
                return ctx
                    .data_saver
                    .iter()
                    .map(|filename| strategy.rewrite(&ctx.data_saver_url(filename)))
                    .collect();
            }
        }

        Vec::new()
    }
}

#[cfg(test)]
mod test {
    use async_trait::async_trait;
    use bytes::Bytes;

    use super::*;
    use crate::domain::{
        entities::{chapter::Chapter, image::Image, manga::Manga},
        repositories::image::ImageRepositoryError,
    };

    struct StubSource {
        context: Option<PageContext>,
    }

    #[async_trait]
    impl SourceRepository for StubSource {
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
            Err(SourceRepositoryError::UnexpectedStatus(503))
        }

        async fn get_page_context(
            &self,
            _chapter_id: &str,
        ) -> Result<PageContext, SourceRepositoryError> {
            self.context
                .clone()
                .ok_or(SourceRepositoryError::MalformedResponse)
        }
    }

    /// Fails any fetch whose URL contains one of the markers; everything else
    /// succeeds with the given content type.
    struct MarkedImages {
        fail_markers: Vec<&'static str>,
        content_type: &'static str,
    }

    #[async_trait]
    impl ImageRepository for MarkedImages {
        async fn fetch_image(&self, url: &str) -> Result<Image, ImageRepositoryError> {
            if self.fail_markers.iter().any(|marker| url.contains(marker)) {
                return Err(ImageRepositoryError::UnexpectedStatus(404));
            }

            Ok(Image {
                content_type: self.content_type.to_string(),
                data: Bytes::from_static(b"img"),
            })
        }
    }

    fn context(pages: &[&str], data_saver: &[&str]) -> PageContext {
        PageContext {
            base_url: "https://node.example.net".to_string(),
            hash: "h4sh".to_string(),
            pages: pages.iter().map(ToString::to_string).collect(),
            data_saver: data_saver.iter().map(ToString::to_string).collect(),
        }
    }

    fn strategies() -> Vec<PageStrategy> {
        vec![
            PageStrategy::relay("http://localhost:3001"),
            PageStrategy::cors_proxy("https://corsproxy.example/?"),
            PageStrategy::direct(),
        ]
    }

    #[test]
    fn test_strategy_rewrites() {
        let url = "https://node.example.net/data/h4sh/1.jpg";

        assert_eq!(
            PageStrategy::relay("http://localhost:3001/").rewrite(url),
            "http://localhost:3001/proxy?url=https%3A%2F%2Fnode.example.net%2Fdata%2Fh4sh%2F1.jpg"
        );
        assert_eq!(
            PageStrategy::cors_proxy("https://corsproxy.example/?").rewrite(url),
            "https://corsproxy.example/?https%3A%2F%2Fnode.example.net%2Fdata%2Fh4sh%2F1.jpg"
        );
        assert_eq!(PageStrategy::direct().rewrite(url), url);
    }

    #[tokio::test]
    async fn test_bulk_fetch_truncates_to_successful_prefix() {
        let svc = PageService::new(
            StubSource {
                context: Some(context(&["1.jpg", "2.jpg", "3.jpg", "4.jpg"], &[])),
            },
            MarkedImages {
                fail_markers: vec!["4.jpg"],
                content_type: "image/jpeg",
            },
            strategies(),
        );

        let pages = svc.resolve("chapter-1", "Some Manga", "1").await;

        assert_eq!(pages.len(), 3);
        assert!(pages.iter().all(|p| p.starts_with("data:image/jpeg;base64,")));
    }

    #[tokio::test]
    async fn test_probe_skips_non_image_strategy() {
        // every strategy answers, but only with text/html: no strategy is
        // selected and the chapter degrades to placeholders
        let svc = PageService::new(
            StubSource {
                context: Some(context(&["1.jpg"], &[])),
            },
            MarkedImages {
                fail_markers: vec![],
                content_type: "text/html",
            },
            strategies(),
        );

        let pages = svc.resolve("chapter-1", "Some Manga", "1").await;

        assert_eq!(pages.len(), PLACEHOLDER_PAGE_COUNT);
        assert!(pages.iter().all(|p| p.starts_with("data:image/svg+xml;base64,")));
    }

    #[tokio::test]
    async fn test_server_lookup_failure_synthesizes_placeholders() {
        let svc = PageService::new(
            StubSource { context: None },
            MarkedImages {
                fail_markers: vec![],
                content_type: "image/jpeg",
            },
            strategies(),
        );

        let pages = svc.resolve("chapter-1", "Some Manga", "3").await;

        assert_eq!(pages.len(), PLACEHOLDER_PAGE_COUNT);
    }

    #[tokio::test]
    async fn test_data_saver_retry_hands_out_rewritten_urls() {
        // full resolution pages are unreachable, the lower resolution set is
        // fine through the first strategy
        let svc = PageService::new(
            StubSource {
                context: Some(context(
                    &["1.jpg", "2.jpg"],
                    &["1.jpg.webp", "2.jpg.webp"],
                )),
            },
            MarkedImages {
                fail_markers: vec!["/data/"],
                content_type: "image/jpeg",
            },
            strategies(),
        );

        let pages = svc.resolve("chapter-1", "Some Manga", "1").await;

        assert_eq!(pages.len(), 2);
        assert!(pages[0].starts_with("http://localhost:3001/proxy?url="));
        assert!(pages[0].contains("data-saver"));
    }

    #[tokio::test]
    async fn test_empty_page_list_synthesizes_placeholders() {
        let svc = PageService::new(
            StubSource {
                context: Some(context(&[], &[])),
            },
            MarkedImages {
                fail_markers: vec![],
                content_type: "image/jpeg",
            },
            strategies(),
        );

        let pages = svc.resolve("chapter-1", "Some Manga", "1").await;

        assert_eq!(pages.len(), PLACEHOLDER_PAGE_COUNT);
    }
}
