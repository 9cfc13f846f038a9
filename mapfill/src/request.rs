use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::{ShapeDimensions, StyleParams};

/// Characters escaped in a single query component. Leaves out the same characters as
/// JavaScript's `encodeURIComponent`, which is what the Static Maps documentation assumes.
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

pub(crate) fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Base map imagery.
/// <https://developers.google.com/maps/documentation/maps-static/start#MapTypes>
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapType {
    #[default]
    Roadmap,
    Terrain,
    Satellite,
    Hybrid,
}

impl MapType {
    pub const ALL: [Self; 4] = [Self::Roadmap, Self::Terrain, Self::Satellite, Self::Hybrid];

    pub fn api_slug(&self) -> &'static str {
        match self {
            Self::Roadmap => "roadmap",
            Self::Terrain => "terrain",
            Self::Satellite => "satellite",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Roadmap => "Roadmap",
            Self::Terrain => "Terrain",
            Self::Satellite => "Satellite",
            Self::Hybrid => "Hybrid",
        };
        f.write_str(name)
    }
}

/// Everything the user typed into the dialog, captured when it was confirmed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRequestParams {
    /// Place name or address the map is centered on.
    pub location: String,

    /// Zoom level. The dialog keeps it within 1..=20, but any value is sent as is.
    pub zoom: i32,

    pub map_type: MapType,

    /// Put a red pin on `location`.
    pub include_marker: bool,

    /// JSON style array, possibly empty.
    #[serde(default)]
    pub style_spec: String,

    /// API key of the Static Maps service.
    pub credential: String,
}

impl Default for MapRequestParams {
    fn default() -> Self {
        Self {
            location: String::new(),
            zoom: 12,
            map_type: MapType::default(),
            include_marker: true,
            style_spec: String::new(),
            credential: String::new(),
        }
    }
}

/// One image request, i.e. [`MapRequestParams`] applied to a particular layer.
pub struct StaticMapRequest<'a> {
    pub params: &'a MapRequestParams,
    pub dimensions: ShapeDimensions,
    pub styles: &'a StyleParams,
}

impl StaticMapRequest<'_> {
    /// Always requests 2x pixel density.
    const SCALE: u8 = 2;

    /// Query string (without the leading `?`). Each interpolated value is escaped on its own.
    pub fn query(&self) -> String {
        let params = self.params;
        let location = encode_component(&params.location);

        let mut query = format!(
            "center={}&zoom={}&size={}x{}&scale={}&maptype={}",
            location,
            encode_component(&params.zoom.to_string()),
            encode_component(&self.dimensions.width.to_string()),
            encode_component(&self.dimensions.height.to_string()),
            Self::SCALE,
            encode_component(params.map_type.api_slug()),
        );

        if params.include_marker {
            query.push_str("&markers=color:red%7C");
            query.push_str(&location);
        }

        query.push_str(self.styles.as_str());
        query.push_str("&key=");
        query.push_str(&encode_component(&params.credential));
        query
    }

    /// Full URL against the given endpoint.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}?{}", endpoint, self.query())
    }
}

/// Hide the API key, so URLs can be logged.
pub(crate) fn redact_key(url: &str) -> String {
    match url.rfind("&key=") {
        Some(position) => format!("{}&key=***", &url[..position]),
        None => url.to_owned(),
    }
}
