mod host;
mod runtime;
mod scene;
mod windows;

use std::collections::VecDeque;

use egui::{ColorImage, Context, TextureHandle};
use futures::channel::mpsc;
use mapfill::{
    CredentialSource, JsonFileStore, KeyPool, Options, Plugin, RunOutcome, TransientImage,
};

use crate::host::{ChannelDialog, ChannelNotifier, EventSender, HostEvent, Message, SceneLayer};
use crate::runtime::Runtime;
use crate::scene::SceneItem;
use crate::windows::DialogForm;

/// Pass a comma separated list of API keys at compile time to have them drawn for each run
/// instead of asking the user.
fn options() -> Options {
    let credentials = std::option_env!("MAPFILL_API_KEYS")
        .and_then(|keys| KeyPool::new(keys.split(',')))
        .map(CredentialSource::Pool)
        .unwrap_or_default();

    Options {
        credentials,
        ..Default::default()
    }
}

fn settings() -> JsonFileStore {
    JsonFileStore::in_config_dir().unwrap_or_else(|e| {
        let path = std::env::temp_dir().join("mapfill-storage.json");
        log::warn!("{e}, keeping settings in {} instead.", path.display());
        JsonFileStore::new(path)
    })
}

fn texture(image: TransientImage, ctx: &Context) -> Result<TextureHandle, image::ImageError> {
    let image = image::load_from_memory(&image.into_bytes())?.to_rgba8();
    let pixels = image.as_flat_samples();
    let image = ColorImage::from_rgba_unmultiplied(
        [image.width() as _, image.height() as _],
        pixels.as_slice(),
    );
    Ok(ctx.load_texture("map", image, Default::default()))
}

pub struct MapsApp {
    egui_ctx: Context,
    scene: Vec<SceneItem>,
    events: Option<mpsc::UnboundedReceiver<HostEvent>>,

    /// Must go before `runtime`, so that a pending run sees the dialog cancelled on exit.
    dialog: Option<DialogForm>,
    messages: VecDeque<Message>,
    running: bool,
    runtime: Option<Runtime>,
}

impl MapsApp {
    pub fn new(egui_ctx: Context) -> Self {
        Self {
            egui_ctx,
            scene: scene::scene(),
            events: None,
            dialog: None,
            messages: VecDeque::new(),
            running: false,
            runtime: None,
        }
    }

    fn generate(&mut self) {
        let (events, rx) = EventSender::new(self.egui_ctx.clone());

        let mut selection: Vec<SceneLayer> = self
            .scene
            .iter()
            .enumerate()
            .filter(|(_, item)| item.selected)
            .map(|(index, item)| SceneLayer {
                index,
                shape: item.shape.clone(),
                events: events.clone(),
            })
            .collect();

        let mut dialog = ChannelDialog {
            events: events.clone(),
        };
        let notifier = ChannelNotifier {
            events: events.clone(),
        };
        let mut plugin = Plugin::new(options(), settings(), notifier);

        // Previous runtime is idle by now, dropping it joins its thread.
        self.runtime = Some(Runtime::new(async move {
            match plugin.generate_map(&mut selection, &mut dialog).await {
                RunOutcome::Completed(summary) => log::info!("{summary}"),
                RunOutcome::Failed { error, summary } => {
                    log::info!("Run failed after {} filled: {error}", summary.filled());
                }
                RunOutcome::Cancelled => log::info!("Run cancelled."),
            }
            events.send(HostEvent::Finished);
        }));
        self.events = Some(rx);
        self.running = true;
    }

    fn handle_events(&mut self) {
        let Some(rx) = &mut self.events else {
            return;
        };

        while let Ok(Some(event)) = rx.try_next() {
            match event {
                HostEvent::ShowDialog { defaults, respond } => {
                    self.dialog = Some(DialogForm::new(defaults, respond));
                }
                HostEvent::Fill { layer, image } => match texture(image, &self.egui_ctx) {
                    Ok(texture) => {
                        if let Some(item) = self.scene.get_mut(layer) {
                            item.fill = Some(texture);
                        }
                    }
                    Err(e) => log::warn!("Could not show the map of layer {layer}: {e}."),
                },
                HostEvent::Message(message) => self.messages.push_back(message),
                HostEvent::Finished => self.running = false,
            }
        }
    }
}

impl eframe::App for MapsApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.handle_events();

        if windows::layers(ctx, &mut self.scene, self.running) {
            self.generate();
        }

        if let Some(form) = &mut self.dialog
            && windows::map_dialog(ctx, form)
        {
            self.dialog = None;
        }

        if let Some(message) = self.messages.front()
            && windows::message_box(ctx, message)
        {
            self.messages.pop_front();
        }
    }
}
