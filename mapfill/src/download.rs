use std::io::Cursor;

use bytes::Bytes;
use image::{ImageFormat, ImageReader};
use reqwest::StatusCode;
use reqwest::header::USER_AGENT;

use crate::http::HttpOptions;
use crate::request::redact_key;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network request failed. Please ensure you have internet connectivity. ({0})")]
    Network(String),

    #[error("Request had an error: {0}")]
    Http(StatusCode),

    #[error("Couldn't parse response: {0}")]
    Decode(String),
}

/// Downloaded map image. It is meant to be used once, as a fill of a single layer, therefore
/// it cannot be cloned.
#[derive(Debug)]
pub struct TransientImage {
    bytes: Bytes,
    format: ImageFormat,
    width: u32,
    height: u32,
}

impl TransientImage {
    /// Make sure `bytes` hold an image of a known format and read its size.
    ///
    /// # Errors
    ///
    /// When the format is not recognized or the image header is broken.
    pub fn new(bytes: Bytes) -> Result<Self, FetchError> {
        let reader = ImageReader::new(Cursor::new(&bytes[..]))
            .with_guessed_format()
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        let format = reader
            .format()
            .ok_or_else(|| FetchError::Decode("unknown image format".to_owned()))?;

        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        Ok(Self {
            bytes,
            format,
            width,
            height,
        })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Size in pixels. Twice the requested dimensions, as maps are requested in 2x scale.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Give up the image, handing over its contents.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

/// Source of map images.
pub trait Fetch {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<TransientImage, FetchError>> + Send;
}

/// Fetches map images over HTTP.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    options: HttpOptions,
}

impl HttpFetcher {
    pub fn new(options: HttpOptions) -> Self {
        Self {
            // Keep it around to reuse connections between the layers.
            client: reqwest::Client::new(),
            options,
        }
    }

    pub fn options(&self) -> &HttpOptions {
        &self.options
    }

    async fn download(&self, url: &str) -> Result<Bytes, FetchError> {
        let mut request = self.client.get(url);
        if let Some(user_agent) = &self.options.user_agent {
            request = request.header(USER_AGENT, user_agent.clone());
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Network(e.without_url().to_string()))?;

        log::debug!("Downloaded {:?}.", response.status());

        if response.status() != StatusCode::OK {
            return Err(FetchError::Http(response.status()));
        }

        response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.without_url().to_string()))
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(HttpOptions::default())
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<TransientImage, FetchError> {
        log::debug!("Getting {}.", redact_key(url));
        let bytes = self.download(url).await?;
        TransientImage::new(bytes)
    }
}
