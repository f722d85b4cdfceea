use base64::{Engine as _, engine::general_purpose::STANDARD};

/// How many pages a synthesized chapter carries.
pub const PLACEHOLDER_PAGE_COUNT: usize = 20;

pub const PLACEHOLDER_TOKEN_PREFIX: &str = "placeholder-";

/// Content-server coordinates for one chapter, as advertised by the remote
/// catalog: where the page files live and under which path hash.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContext {
    pub base_url: String,
    pub hash: String,
    /// Full resolution page filenames, in reading order.
    pub pages: Vec<String>,
    /// Lower resolution variant, possibly empty.
    pub data_saver: Vec<String>,
}

impl PageContext {
    pub fn page_url(&self, filename: &str) -> String {
        format!("{}/data/{}/{}", self.base_url, self.hash, filename)
    }

    pub fn data_saver_url(&self, filename: &str) -> String {
        format!("{}/data-saver/{}/{}", self.base_url, self.hash, filename)
    }
}

/// Opaque token standing in for a page that has not been resolved yet.
pub fn placeholder_token(manga_id: &str, number: &str, page: usize) -> String {
    format!("{PLACEHOLDER_TOKEN_PREFIX}{manga_id}-{number}-{page}")
}

pub fn placeholder_tokens(manga_id: &str, number: &str, count: usize) -> Vec<String> {
    (1..=count)
        .map(|page| placeholder_token(manga_id, number, page))
        .collect()
}

pub fn is_placeholder_token(page: &str) -> bool {
    page.starts_with(PLACEHOLDER_TOKEN_PREFIX)
}

/// Client-side rendition of a whole chapter when no retrieval strategy
/// produced real pages.
pub fn synthesized_pages(title: &str, number: &str, count: usize) -> Vec<String> {
    (1..=count)
        .map(|page| synthesized_page(title, number, page, count))
        .collect()
}

/// A single synthesized page: an SVG carrying the manga title, chapter number
/// and page position, encoded as a data-URI so it renders anywhere a real
/// page would.
pub fn synthesized_page(title: &str, number: &str, page: usize, total: usize) -> String {
    let title = escape_xml(title);
    let svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="800" height="1200" viewBox="0 0 800 1200">
<defs><linearGradient id="bg" x1="0" y1="0" x2="0" y2="1"><stop offset="0" stop-color="#f8f8f8"/><stop offset="1" stop-color="#e8e8e8"/></linearGradient></defs>
<rect width="800" height="1200" fill="url(#bg)"/>
<rect x="50" y="50" width="700" height="250" fill="#ffffff" stroke="#333333" stroke-width="3"/>
<rect x="50" y="320" width="340" height="200" fill="#ffffff" stroke="#333333" stroke-width="3"/>
<rect x="410" y="320" width="340" height="200" fill="#ffffff" stroke="#333333" stroke-width="3"/>
<rect x="50" y="540" width="700" height="500" fill="#ffffff" stroke="#333333" stroke-width="3"/>
<text x="400" y="150" font-family="sans-serif" font-size="28" font-weight="bold" fill="#333333" text-anchor="middle">{title}</text>
<text x="400" y="190" font-family="sans-serif" font-size="20" fill="#333333" text-anchor="middle">Chapter {number}</text>
<text x="400" y="800" font-family="sans-serif" font-size="18" fill="#333333" text-anchor="middle">Page {page} of {total}</text>
<text x="400" y="1140" font-family="sans-serif" font-size="12" fill="#333333" text-anchor="middle">Offline rendition, original pages unavailable</text>
</svg>"##
    );

    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod test {
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    use super::*;

    #[test]
    fn test_page_urls() {
        let ctx = PageContext {
            base_url: "https://node.example.net".to_string(),
            hash: "abc123".to_string(),
            pages: vec!["1.jpg".to_string()],
            data_saver: vec!["1.jpg.webp".to_string()],
        };

        assert_eq!(
            ctx.page_url("1.jpg"),
            "https://node.example.net/data/abc123/1.jpg"
        );
        assert_eq!(
            ctx.data_saver_url("1.jpg.webp"),
            "https://node.example.net/data-saver/abc123/1.jpg.webp"
        );
    }

    #[test]
    fn test_placeholder_tokens() {
        let tokens = placeholder_tokens("manga-1", "3", 3);

        assert_eq!(
            tokens,
            vec![
                "placeholder-manga-1-3-1",
                "placeholder-manga-1-3-2",
                "placeholder-manga-1-3-3"
            ]
        );
        assert!(tokens.iter().all(|t| is_placeholder_token(t)));
    }

    #[test]
    fn test_synthesized_page_is_svg_data_uri() {
        let page = synthesized_page("Iron Bloom Academy", "7", 2, 20);

        let encoded = page
            .strip_prefix("data:image/svg+xml;base64,")
            .expect("data uri prefix");
        let svg = String::from_utf8(STANDARD.decode(encoded).expect("valid base64"))
            .expect("utf8 svg");

        assert!(svg.contains("Iron Bloom Academy"));
        assert!(svg.contains("Chapter 7"));
        assert!(svg.contains("Page 2 of 20"));
    }

    #[test]
    fn test_synthesized_page_escapes_markup() {
        let page = synthesized_page("Cats & <Dogs>", "1", 1, 1);

        let encoded = page
            .strip_prefix("data:image/svg+xml;base64,")
            .expect("data uri prefix");
        let svg = String::from_utf8(STANDARD.decode(encoded).expect("valid base64"))
            .expect("utf8 svg");

        assert!(svg.contains("Cats &amp; &lt;Dogs&gt;"));
    }
}
