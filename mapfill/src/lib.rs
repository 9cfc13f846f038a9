#![doc = include_str!("../README.md")]
#![deny(clippy::unwrap_used, rustdoc::broken_intra_doc_links)]

mod credentials;
mod download;
mod http;
mod plugin;
mod request;
mod shape;
mod storage;
mod style;

pub use credentials::{CredentialSource, KeyPool};
pub use download::{Fetch, FetchError, HttpFetcher, TransientImage};
pub use http::{HeaderValue, HttpOptions};
pub use plugin::{
    Dialog, DialogDefaults, DialogResponse, Error, FillOutcome, Layer, Notifier, Options, Plugin,
    RunOutcome, Summary, ValidationError,
};
pub use request::{MapRequestParams, MapType, StaticMapRequest};
pub use shape::{Shape, ShapeDimensions, UnsupportedShape};
pub use storage::{JsonFileStore, MemoryStore, SettingsStore, StorageError};
pub use style::{StyleParams, StyleParseError, StyleRule};
