//! ImgBB image hosting.
//!
//! Uploads diagram images so they can be linked from documents and passed
//! to the vision model by URL.

use std::time::Duration;

use serde::Deserialize;

/// Upload endpoint.
const DEFAULT_ENDPOINT: &str = "https://api.imgbb.com/1/upload";

/// Upload timeout.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// ImgBB API client.
#[derive(Debug, Clone)]
pub struct ImgbbClient {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

/// Error types for ImgBB operations.
#[derive(Debug, thiserror::Error)]
pub enum ImgbbError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ImgBB API error: {message} (status: {status})")]
    Api { status: u16, message: String },

    #[error("ImgBB response did not include an image URL")]
    MissingUrl,

    #[error("Image data is empty")]
    EmptyImage,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    data: Option<UploadData>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    #[serde(default)]
    url: Option<String>,
}

impl ImgbbClient {
    /// Create a new ImgBB client.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Use a different upload endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Upload base64 image data (bare or as a `data:` URI) and return the
    /// hosted image URL.
    pub async fn upload(&self, image: &str) -> Result<String, ImgbbError> {
        let image = crate::pdf::strip_data_uri(image);
        if image.is_empty() {
            return Err(ImgbbError::EmptyImage);
        }

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(UPLOAD_TIMEOUT)
            .form(&[("key", self.api_key.as_str()), ("image", image)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ImgbbError::Api { status: status.as_u16(), message });
        }

        let body: UploadResponse = response.json().await?;
        let url = body.data.and_then(|d| d.url).ok_or(ImgbbError::MissingUrl)?;
        tracing::info!(%url, "Uploaded image to ImgBB");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_response_parsing() {
        let body: UploadResponse = serde_json::from_str(
            r#"{"data": {"url": "https://i.ibb.co/abc/diagram.png", "id": "abc"}, "success": true}"#,
        )
        .unwrap();
        assert_eq!(body.data.unwrap().url.as_deref(), Some("https://i.ibb.co/abc/diagram.png"));
    }

    #[tokio::test]
    async fn test_empty_image_is_rejected() {
        let client = ImgbbClient::new("key");
        let err = client.upload("data:image/png;base64,").await.unwrap_err();
        assert!(matches!(err, ImgbbError::EmptyImage));
    }
}
