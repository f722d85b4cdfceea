use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::image::Image;

#[derive(Debug, Error)]
pub enum ImageRepositoryError {
    #[error("error request image: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("image host returned status {0}")]
    UnexpectedStatus(u16),
    #[error("other error: {0}")]
    Other(String),
}

#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn fetch_image(&self, url: &str) -> Result<Image, ImageRepositoryError>;
}
