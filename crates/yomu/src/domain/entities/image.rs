use base64::{Engine as _, engine::general_purpose::STANDARD};
use bytes::Bytes;

#[derive(Debug, Clone)]
pub struct Image {
    pub content_type: String,
    pub data: Bytes,
}

impl Image {
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// Re-encode the raw bytes as a directly embeddable data-URI.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            STANDARD.encode(&self.data)
        )
    }
}
