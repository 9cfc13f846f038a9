pub use reqwest::header::HeaderValue;

/// Address of the Google Static Maps API.
pub(crate) const STATIC_MAPS_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/staticmap";

/// Controls how [`crate::HttpFetcher`] talks to the static map service.
#[derive(Clone, Debug)]
pub struct HttpOptions {
    /// URL the query string is appended to. Only worth changing for testing or when the
    /// requests need to go through a proxy which mirrors the API.
    pub endpoint: String,

    /// User agent to be sent to the map service.
    pub user_agent: Option<HeaderValue>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        let user_agent = Some(HeaderValue::from_static(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION"),
        )));

        Self {
            endpoint: STATIC_MAPS_ENDPOINT.to_owned(),
            user_agent,
        }
    }
}
