//! Filling the selected layers with map images, from the dialog to the final summary.

use std::fmt;

use crate::storage::{API_KEY, STYLES};
use crate::{
    CredentialSource, Fetch, FetchError, HttpFetcher, HttpOptions, MapRequestParams, SettingsStore,
    Shape, StaticMapRequest, StorageError, StyleParams, StyleParseError, TransientImage,
    UnsupportedShape,
};

/// Selected object of the host application.
pub trait Layer {
    fn shape(&self) -> Shape;

    /// Use the image as the layer's fill, replacing whatever was there.
    fn apply_fill(&mut self, image: TransientImage);
}

/// What the dialog is pre-filled with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogDefaults {
    /// Key used last time.
    pub api_key: String,

    /// Style used last time.
    pub styles: String,

    /// Whether the user has to provide the key. Not the case when keys come from a pool.
    pub ask_for_key: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogResponse {
    Confirmed(MapRequestParams),
    /// User dismissed the dialog, or it could not be shown at all.
    Cancelled,
}

/// Modal dialog asking for the map parameters.
pub trait Dialog {
    /// Show the dialog and wait until the user confirms or dismisses it.
    fn show(&mut self, defaults: DialogDefaults) -> impl Future<Output = DialogResponse> + Send;
}

/// Where the user gets told about the outcome. Each call is a single message.
pub trait Notifier {
    fn alert(&mut self, title: &str, message: &str);
    fn error(&mut self, title: &str, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("You did not provide a place or address for your location.")]
    MissingLocation,

    #[error("Missing Google Static Maps API key.")]
    MissingCredential,
}

/// Reasons for a run to end early.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "Please select some layers. Supported layers are Rectangle, Polygon, Ellipse, Path and BooleanGroup."
    )]
    Selection,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Style(#[from] StyleParseError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl Error {
    /// Title of the message box presenting the error.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Selection => "Selection Error",
            _ => "Error",
        }
    }
}

/// What happened to a single layer.
#[derive(Debug, Clone, PartialEq)]
pub enum FillOutcome {
    Filled,
    Skipped(UnsupportedShape),
    Failed(String),
}

/// Per-layer record of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    /// Number of selected layers.
    pub total: usize,

    /// Outcomes of the layers which were attempted, in selection order.
    pub outcomes: Vec<FillOutcome>,
}

impl Summary {
    fn new(total: usize) -> Self {
        Self {
            total,
            outcomes: Vec::with_capacity(total),
        }
    }

    pub fn filled(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, FillOutcome::Filled))
            .count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = &UnsupportedShape> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            FillOutcome::Skipped(reason) => Some(reason),
            _ => None,
        })
    }

    /// Text of the end-of-run report.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for reason in self.skipped() {
            writeln!(f, "{reason}")?;
        }
        write!(
            f,
            "{} of {} selected objects were filled",
            self.filled(),
            self.total
        )
    }
}

#[derive(Debug)]
pub enum RunOutcome {
    /// Dialog was dismissed, nothing happened.
    Cancelled,

    /// Run stopped because of `error`. Layers after the failing one were not attempted.
    Failed { error: Error, summary: Summary },

    Completed(Summary),
}

#[derive(Debug, Clone, Default)]
pub struct Options {
    pub http: HttpOptions,
    pub credentials: CredentialSource,
}

/// Fills layers with maps. Keeps the collaborators which outlive a single run.
pub struct Plugin<S, N, F = HttpFetcher> {
    options: Options,
    settings: S,
    notifier: N,
    fetcher: F,
}

impl<S, N> Plugin<S, N>
where
    S: SettingsStore,
    N: Notifier,
{
    /// Plugin downloading maps over HTTP.
    pub fn new(options: Options, settings: S, notifier: N) -> Self {
        let fetcher = HttpFetcher::new(options.http.clone());
        Self::with_fetcher(options, settings, notifier, fetcher)
    }
}

impl<S, N, F> Plugin<S, N, F>
where
    S: SettingsStore,
    N: Notifier,
    F: Fetch,
{
    pub fn with_fetcher(options: Options, settings: S, notifier: N, fetcher: F) -> Self {
        Self {
            options,
            settings,
            notifier,
            fetcher,
        }
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Ask for the map parameters and fill every layer of `selection` with a map, one after
    /// another. Unsupported layers are skipped, while the first failing download stops the
    /// whole run.
    pub async fn generate_map<L, D>(&mut self, selection: &mut [L], dialog: &mut D) -> RunOutcome
    where
        L: Layer,
        D: Dialog,
    {
        let total = selection.len();
        if selection.is_empty() {
            return self.fail(Error::Selection, Summary::new(total));
        }

        let mut params = match dialog.show(self.dialog_defaults()).await {
            DialogResponse::Confirmed(params) => params,
            DialogResponse::Cancelled => {
                log::debug!("Dialog cancelled.");
                return RunOutcome::Cancelled;
            }
        };

        // Key typed in the dialog, which is what gets remembered.
        let entered_key = std::mem::take(&mut params.credential);
        params.credential = self.options.credentials.resolve(&entered_key);

        if let Err(error) = validate(&params) {
            return self.fail(error.into(), Summary::new(total));
        }

        let styles = match StyleParams::encode(&params.style_spec) {
            Ok(styles) => styles,
            Err(error) => return self.fail(error.into(), Summary::new(total)),
        };

        let mut summary = Summary::new(total);

        for layer in selection.iter_mut() {
            let dimensions = match layer.shape().dimensions() {
                Ok(dimensions) => dimensions,
                Err(reason) => {
                    log::info!("{reason}");
                    summary.outcomes.push(FillOutcome::Skipped(reason));
                    continue;
                }
            };

            if let Err(error) = self.remember(&entered_key, &params.style_spec) {
                summary.outcomes.push(FillOutcome::Failed(error.to_string()));
                return self.fail(error.into(), summary);
            }

            let url = StaticMapRequest {
                params: &params,
                dimensions,
                styles: &styles,
            }
            .url(&self.options.http.endpoint);

            match self.fetcher.fetch(&url).await {
                Ok(image) => {
                    layer.apply_fill(image);
                    summary.outcomes.push(FillOutcome::Filled);
                }
                Err(error) => {
                    summary.outcomes.push(FillOutcome::Failed(error.to_string()));
                    return self.fail(error.into(), summary);
                }
            }
        }

        log::info!("{} of {} layers filled.", summary.filled(), summary.total);
        self.notifier.alert("Done", &summary.message());
        RunOutcome::Completed(summary)
    }

    /// Last used settings. A broken store should not prevent the dialog from showing up.
    fn dialog_defaults(&mut self) -> DialogDefaults {
        let ask_for_key = self.options.credentials.is_user_entered();
        let mut read = |key: &str| {
            self.settings.get(key, "").unwrap_or_else(|e| {
                log::warn!("Failed to read '{key}' from settings: {e}.");
                String::new()
            })
        };

        DialogDefaults {
            api_key: if ask_for_key {
                read(API_KEY)
            } else {
                String::new()
            },
            styles: read(STYLES),
            ask_for_key,
        }
    }

    fn remember(&mut self, api_key: &str, styles: &str) -> Result<(), StorageError> {
        if self.options.credentials.is_user_entered() {
            self.settings.set(API_KEY, api_key)?;
        }
        self.settings.set(STYLES, styles)
    }

    fn fail(&mut self, error: Error, summary: Summary) -> RunOutcome {
        log::warn!("Map generation failed: {error}");
        self.notifier.error(error.title(), &error.to_string());
        RunOutcome::Failed { error, summary }
    }
}

fn validate(params: &MapRequestParams) -> Result<(), ValidationError> {
    if params.location.trim().is_empty() {
        return Err(ValidationError::MissingLocation);
    }
    if params.credential.trim().is_empty() {
        return Err(ValidationError::MissingCredential);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use bytes::Bytes;
    use reqwest::StatusCode;

    use super::*;
    use crate::download::tests::png;
    use crate::{KeyPool, MapType, MemoryStore};

    const ENDPOINT: &str = "http://maps.test/staticmap";

    /// Serves scripted responses and remembers what was asked for.
    #[derive(Default)]
    struct FakeFetcher {
        responses: Mutex<VecDeque<Result<TransientImage, FetchError>>>,
        urls: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn serving(responses: impl IntoIterator<Item = Result<TransientImage, FetchError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                urls: Mutex::default(),
            }
        }

        fn urls(&self) -> Vec<String> {
            self.urls.lock().unwrap().clone()
        }
    }

    impl Fetch for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<TransientImage, FetchError> {
            self.urls.lock().unwrap().push(url.to_owned());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(image()))
        }
    }

    fn image() -> TransientImage {
        TransientImage::new(Bytes::from(png(2, 2))).unwrap()
    }

    struct ScriptedDialog {
        response: DialogResponse,
        shown_with: Vec<DialogDefaults>,
    }

    impl ScriptedDialog {
        fn confirming(params: MapRequestParams) -> Self {
            Self {
                response: DialogResponse::Confirmed(params),
                shown_with: Vec::new(),
            }
        }
    }

    impl Dialog for ScriptedDialog {
        async fn show(&mut self, defaults: DialogDefaults) -> DialogResponse {
            self.shown_with.push(defaults);
            self.response.clone()
        }
    }

    #[derive(Debug, PartialEq, Eq)]
    enum Message {
        Alert(String, String),
        Error(String, String),
    }

    #[derive(Default)]
    struct RecordingNotifier(Vec<Message>);

    impl Notifier for RecordingNotifier {
        fn alert(&mut self, title: &str, message: &str) {
            self.0.push(Message::Alert(title.to_owned(), message.to_owned()));
        }

        fn error(&mut self, title: &str, message: &str) {
            self.0.push(Message::Error(title.to_owned(), message.to_owned()));
        }
    }

    struct TestLayer {
        shape: Shape,
        fill: Option<(u32, u32)>,
    }

    impl TestLayer {
        fn new(shape: Shape) -> Self {
            Self { shape, fill: None }
        }
    }

    impl Layer for TestLayer {
        fn shape(&self) -> Shape {
            self.shape.clone()
        }

        fn apply_fill(&mut self, image: TransientImage) {
            self.fill = Some(image.size());
        }
    }

    fn rectangle(width: f64, height: f64) -> TestLayer {
        TestLayer::new(Shape::Rectangle { width, height })
    }

    fn text() -> TestLayer {
        TestLayer::new(Shape::Other {
            kind: "Text".to_owned(),
        })
    }

    fn paris() -> MapRequestParams {
        MapRequestParams {
            location: "Paris".to_owned(),
            zoom: 10,
            map_type: MapType::Roadmap,
            include_marker: true,
            style_spec: String::new(),
            credential: "K".to_owned(),
        }
    }

    fn options() -> Options {
        Options {
            http: HttpOptions {
                endpoint: ENDPOINT.to_owned(),
                ..Default::default()
            },
            credentials: CredentialSource::UserEntered,
        }
    }

    fn plugin(
        settings: MemoryStore,
        fetcher: FakeFetcher,
    ) -> Plugin<MemoryStore, RecordingNotifier, FakeFetcher> {
        Plugin::with_fetcher(options(), settings, RecordingNotifier::default(), fetcher)
    }

    #[tokio::test]
    async fn empty_selection_is_an_error() {
        let mut plugin = plugin(MemoryStore::new(), FakeFetcher::default());
        let mut dialog = ScriptedDialog::confirming(paris());
        let mut selection: Vec<TestLayer> = Vec::new();

        let outcome = plugin.generate_map(&mut selection, &mut dialog).await;

        assert!(matches!(
            outcome,
            RunOutcome::Failed {
                error: Error::Selection,
                ..
            }
        ));
        assert!(dialog.shown_with.is_empty(), "dialog should not be shown");
        assert!(plugin.fetcher.urls().is_empty());
        assert!(matches!(
            &plugin.notifier().0[..],
            [Message::Error(title, _)] if title == "Selection Error"
        ));
    }

    #[tokio::test]
    async fn cancelled_dialog_does_nothing() {
        let mut plugin = plugin(MemoryStore::new(), FakeFetcher::default());
        let mut dialog = ScriptedDialog {
            response: DialogResponse::Cancelled,
            shown_with: Vec::new(),
        };
        let mut selection = vec![rectangle(10., 10.)];

        let outcome = plugin.generate_map(&mut selection, &mut dialog).await;

        assert!(matches!(outcome, RunOutcome::Cancelled));
        assert!(plugin.fetcher.urls().is_empty());
        assert!(plugin.notifier().0.is_empty());
        assert_eq!(selection[0].fill, None);
    }

    #[tokio::test]
    async fn single_rectangle_is_filled() {
        let mut plugin = plugin(MemoryStore::new(), FakeFetcher::default());
        let mut dialog = ScriptedDialog::confirming(paris());
        let mut selection = vec![rectangle(300., 300.)];

        let outcome = plugin.generate_map(&mut selection, &mut dialog).await;

        let RunOutcome::Completed(summary) = outcome else {
            panic!("run did not complete: {outcome:?}");
        };
        assert_eq!(summary.outcomes, vec![FillOutcome::Filled]);
        assert_eq!(selection[0].fill, Some((2, 2)));
        assert_eq!(
            plugin.fetcher.urls(),
            vec![format!(
                "{ENDPOINT}?center=Paris&zoom=10&size=300x300&scale=2&maptype=roadmap&markers=color:red%7CParis&key=K"
            )]
        );
        assert_eq!(
            plugin.notifier().0,
            vec![Message::Alert(
                "Done".to_owned(),
                "1 of 1 selected objects were filled".to_owned()
            )]
        );
    }

    #[tokio::test]
    async fn unsupported_layers_are_skipped() {
        let mut plugin = plugin(MemoryStore::new(), FakeFetcher::default());
        let mut dialog = ScriptedDialog::confirming(paris());
        let mut selection = vec![text(), rectangle(64., 32.)];

        let outcome = plugin.generate_map(&mut selection, &mut dialog).await;

        let RunOutcome::Completed(summary) = outcome else {
            panic!("run did not complete: {outcome:?}");
        };
        assert_eq!(plugin.fetcher.urls().len(), 1);
        assert!(plugin.fetcher.urls()[0].contains("&size=64x32&"));
        assert_eq!(summary.filled(), 1);
        assert_eq!(summary.total, 2);
        assert_eq!(
            summary.skipped().cloned().collect::<Vec<_>>(),
            vec![UnsupportedShape::Kind("Text".to_owned())]
        );
        assert_eq!(
            summary.message(),
            "Text is not supported and so was skipped.\n1 of 2 selected objects were filled"
        );
        assert_eq!(selection[0].fill, None);
        assert_eq!(selection[1].fill, Some((2, 2)));
    }

    #[tokio::test]
    async fn layers_get_their_own_sizes_in_order() {
        let mut plugin = plugin(MemoryStore::new(), FakeFetcher::default());
        let mut dialog = ScriptedDialog::confirming(paris());
        let mut selection = vec![
            TestLayer::new(Shape::Ellipse {
                radius_x: 40.,
                radius_y: 25.,
            }),
            TestLayer::new(Shape::Path),
            TestLayer::new(Shape::Polygon {
                width: 10.,
                height: 20.,
            }),
        ];

        plugin.generate_map(&mut selection, &mut dialog).await;

        let sizes: Vec<String> = plugin
            .fetcher
            .urls()
            .iter()
            .map(|url| url.split('&').find(|p| p.starts_with("size=")).unwrap().to_owned())
            .collect();
        assert_eq!(sizes, ["size=80x50", "size=500x500", "size=10x20"]);
        assert!(selection.iter().all(|layer| layer.fill.is_some()));
    }

    #[tokio::test]
    async fn first_download_failure_stops_the_run() {
        let fetcher = FakeFetcher::serving([Err(FetchError::Http(StatusCode::FORBIDDEN))]);
        let mut plugin = plugin(MemoryStore::new(), fetcher);
        let mut dialog = ScriptedDialog::confirming(paris());
        let mut selection = vec![rectangle(10., 10.), rectangle(20., 20.)];

        let outcome = plugin.generate_map(&mut selection, &mut dialog).await;

        let RunOutcome::Failed { error, summary } = outcome else {
            panic!("run should have failed: {outcome:?}");
        };
        assert!(matches!(
            error,
            Error::Fetch(FetchError::Http(StatusCode::FORBIDDEN))
        ));
        assert_eq!(summary.filled(), 0);
        assert!(matches!(&summary.outcomes[..], [FillOutcome::Failed(_)]));
        assert_eq!(plugin.fetcher.urls().len(), 1, "second layer was attempted");
        assert!(selection.iter().all(|layer| layer.fill.is_none()));
        assert_eq!(
            plugin.notifier().0,
            vec![Message::Error(
                "Error".to_owned(),
                "Request had an error: 403 Forbidden".to_owned()
            )]
        );
    }

    #[tokio::test]
    async fn failure_after_some_fills_keeps_them() {
        let fetcher = FakeFetcher::serving([
            Ok(image()),
            Err(FetchError::Network("connection refused".to_owned())),
        ]);
        let mut plugin = plugin(MemoryStore::new(), fetcher);
        let mut dialog = ScriptedDialog::confirming(paris());
        let mut selection = vec![rectangle(10., 10.), rectangle(20., 20.), rectangle(30., 30.)];

        let outcome = plugin.generate_map(&mut selection, &mut dialog).await;

        let RunOutcome::Failed { summary, .. } = outcome else {
            panic!("run should have failed: {outcome:?}");
        };
        assert_eq!(summary.filled(), 1);
        assert_eq!(plugin.fetcher.urls().len(), 2);
        assert!(selection[0].fill.is_some());
        assert!(selection[2].fill.is_none());
    }

    #[tokio::test]
    async fn missing_location_or_key_is_reported_before_any_download() {
        for (params, expected) in [
            (
                MapRequestParams {
                    location: " ".to_owned(),
                    ..paris()
                },
                ValidationError::MissingLocation,
            ),
            (
                MapRequestParams {
                    credential: String::new(),
                    ..paris()
                },
                ValidationError::MissingCredential,
            ),
        ] {
            let mut plugin = plugin(MemoryStore::new(), FakeFetcher::default());
            let mut dialog = ScriptedDialog::confirming(params);
            let mut selection = vec![rectangle(10., 10.)];

            let outcome = plugin.generate_map(&mut selection, &mut dialog).await;

            assert!(
                matches!(&outcome, RunOutcome::Failed { error: Error::Validation(e), .. } if *e == expected),
                "unexpected {outcome:?}"
            );
            assert!(plugin.fetcher.urls().is_empty());
        }
    }

    #[tokio::test]
    async fn broken_styles_stop_the_run() {
        let mut plugin = plugin(MemoryStore::new(), FakeFetcher::default());
        let mut dialog = ScriptedDialog::confirming(MapRequestParams {
            style_spec: "[{".to_owned(),
            ..paris()
        });
        let mut selection = vec![rectangle(10., 10.)];

        let outcome = plugin.generate_map(&mut selection, &mut dialog).await;

        assert!(matches!(
            outcome,
            RunOutcome::Failed {
                error: Error::Style(_),
                ..
            }
        ));
        assert!(plugin.fetcher.urls().is_empty());
    }

    #[tokio::test]
    async fn styles_are_sent_with_every_request() {
        let mut plugin = plugin(MemoryStore::new(), FakeFetcher::default());
        let mut dialog = ScriptedDialog::confirming(MapRequestParams {
            style_spec: r##"[{"featureType": "water", "stylers": [{"color": "#0000ff"}]}]"##
                .to_owned(),
            ..paris()
        });
        let mut selection = vec![rectangle(10., 10.), TestLayer::new(Shape::BooleanGroup)];

        plugin.generate_map(&mut selection, &mut dialog).await;

        for url in plugin.fetcher.urls() {
            assert!(
                url.ends_with(
                    "&style=feature%3Awater%7Celement%3Aall%7Ccolor%3A0x0000ff%7C&key=K"
                ),
                "{url}"
            );
        }
    }

    #[tokio::test]
    async fn settings_are_remembered_and_offered_next_time() {
        let settings = MemoryStore::new().with(API_KEY, "old key");
        let mut plugin = plugin(settings, FakeFetcher::default());
        let mut dialog = ScriptedDialog::confirming(MapRequestParams {
            style_spec: "[]".to_owned(),
            credential: "new key".to_owned(),
            ..paris()
        });

        plugin
            .generate_map(&mut [rectangle(10., 10.)], &mut dialog)
            .await;

        assert_eq!(
            dialog.shown_with,
            vec![DialogDefaults {
                api_key: "old key".to_owned(),
                styles: String::new(),
                ask_for_key: true,
            }]
        );
        assert_eq!(plugin.settings().value(API_KEY), Some("new key"));
        assert_eq!(plugin.settings().value(STYLES), Some("[]"));
    }

    #[tokio::test]
    async fn settings_which_cannot_be_saved_stop_the_run() {
        let mut plugin = plugin(MemoryStore::read_only(), FakeFetcher::default());
        let mut dialog = ScriptedDialog::confirming(paris());
        let mut selection = vec![text(), rectangle(10., 10.)];

        let outcome = plugin.generate_map(&mut selection, &mut dialog).await;

        let RunOutcome::Failed { error, summary } = outcome else {
            panic!("run should have failed: {outcome:?}");
        };
        assert!(matches!(error, Error::Storage(StorageError::Rejected)));
        assert_eq!(summary.outcomes.len(), 2);
        assert!(plugin.fetcher.urls().is_empty());
    }

    #[tokio::test]
    async fn pooled_keys_are_neither_asked_for_nor_remembered() {
        let options = Options {
            credentials: CredentialSource::Pool(KeyPool::new(["pooled"]).unwrap()),
            ..options()
        };
        let mut plugin = Plugin::with_fetcher(
            options,
            MemoryStore::new(),
            RecordingNotifier::default(),
            FakeFetcher::default(),
        );
        let mut dialog = ScriptedDialog::confirming(MapRequestParams {
            credential: String::new(),
            ..paris()
        });

        let outcome = plugin
            .generate_map(&mut [rectangle(10., 10.)], &mut dialog)
            .await;

        assert!(matches!(outcome, RunOutcome::Completed(_)));
        assert!(!dialog.shown_with[0].ask_for_key);
        assert!(plugin.fetcher.urls()[0].ends_with("&key=pooled"));
        assert_eq!(plugin.settings().value(API_KEY), None);
    }

    #[tokio::test]
    async fn maps_are_downloaded_over_http() {
        let _ = env_logger::try_init();

        let server = hypermocker::Server::bind().await;
        let mut first = server.anticipate("/staticmap").await;
        let mut second = server.anticipate("/staticmap").await;

        let options = Options {
            http: HttpOptions {
                endpoint: format!("http://127.0.0.1:{}/staticmap", server.port()),
                ..Default::default()
            },
            ..options()
        };
        let mut plugin = Plugin::new(options, MemoryStore::new(), RecordingNotifier::default());
        let mut dialog = ScriptedDialog::confirming(paris());
        let mut selection = vec![rectangle(100., 50.), text(), rectangle(20., 30.)];

        let (outcome, ()) = tokio::join!(plugin.generate_map(&mut selection, &mut dialog), async move {
            let request = first.expect().await;
            assert!(request.uri().query().unwrap().contains("size=100x50"));
            first.respond(png(200, 100));

            let request = second.expect().await;
            assert!(request.uri().query().unwrap().contains("size=20x30"));
            second.respond(png(40, 60));
        });

        let RunOutcome::Completed(summary) = outcome else {
            panic!("run did not complete: {outcome:?}");
        };
        assert_eq!(summary.filled(), 2);
        assert_eq!(selection[0].fill, Some((200, 100)));
        assert_eq!(selection[1].fill, None);
        assert_eq!(selection[2].fill, Some((40, 60)));
    }
}
