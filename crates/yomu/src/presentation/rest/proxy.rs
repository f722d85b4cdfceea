use axum::{
    body::Body,
    extract::{Extension, Query},
    http::{Response, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;

const USER_AGENT: &str = concat!("yomu/", env!("CARGO_PKG_VERSION"));

/// The image host only answers requests that look like they come from the
/// catalog's own reader.
const REFERER: &str = "https://mangadex.org/";

#[derive(Debug, Deserialize)]
pub struct Params {
    url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Relay {
    client: reqwest::Client,
}

impl Relay {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self { client })
    }
}

/// Pass-through fetch of `url`, forwarding the upstream body and
/// content-type. Upstream failure maps to the upstream status; a missing
/// `url` parameter is the caller's mistake.
pub async fn proxy(
    Query(params): Query<Params>,
    Extension(relay): Extension<Relay>,
) -> Result<impl IntoResponse, StatusCode> {
    let Some(url) = params.url.filter(|url| !url.is_empty()) else {
        return Err(StatusCode::BAD_REQUEST);
    };

    debug!("proxying request to {url}");

    let upstream = relay
        .client
        .get(&url)
        .header(reqwest::header::REFERER, REFERER)
        .send()
        .await
        .map_err(|e| {
            error!("failed to reach {url}: {e}");
            StatusCode::BAD_GATEWAY
        })?;

    let status = upstream.status();
    if !status.is_success() {
        error!("upstream answered {status} for {url}");
        return Err(StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY));
    }

    let content_type = upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("image/jpeg")
        .to_string();
    let data = upstream.bytes().await.map_err(|e| {
        error!("failed to read body from {url}: {e}");
        StatusCode::BAD_GATEWAY
    })?;

    Response::builder()
        .header("Content-Type", content_type)
        .header("Content-Length", data.len())
        .header("Cache-Control", "public, max-age=86400")
        .body(Body::from(data))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_missing_url_is_bad_request() {
        let relay = Relay::new().unwrap();

        let result = proxy(Query(Params { url: None }), Extension(relay)).await;

        assert!(matches!(result, Err(StatusCode::BAD_REQUEST)));
    }

    #[tokio::test]
    async fn test_empty_url_is_bad_request() {
        let relay = Relay::new().unwrap();

        let result = proxy(
            Query(Params {
                url: Some("".to_string()),
            }),
            Extension(relay),
        )
        .await;

        assert!(matches!(result, Err(StatusCode::BAD_REQUEST)));
    }
}
