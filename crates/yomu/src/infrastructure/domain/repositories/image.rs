use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use crate::domain::{
    entities::image::Image,
    repositories::image::{ImageRepository, ImageRepositoryError},
};

const USER_AGENT: &str = concat!("yomu/", env!("CARGO_PKG_VERSION"));

/// Fetches page images over HTTP. Each attempt is bounded by the configured
/// timeout so a dead relay cannot stall the strategy chain.
#[derive(Debug, Clone)]
pub struct ImageRepositoryImpl {
    client: reqwest::Client,
}

impl ImageRepositoryImpl {
    pub fn new(timeout: Duration) -> Result<Self, ImageRepositoryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ImageRepository for ImageRepositoryImpl {
    async fn fetch_image(&self, url: &str) -> Result<Image, ImageRepositoryError> {
        if url.is_empty() {
            return Err(ImageRepositoryError::Other(
                "url cannot be empty".to_string(),
            ));
        }

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ImageRepositoryError::UnexpectedStatus(
                response.status().as_u16(),
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = response.bytes().await?;

        debug!(
            "fetched image url={url}, content_type={content_type}, size={} bytes",
            data.len()
        );

        Ok(Image { content_type, data })
    }
}
