//! Collaborators through which a map generation run, living on the Tokio thread, talks to
//! the UI.

use egui::Context;
use futures::channel::{mpsc, oneshot};
use mapfill::{Dialog, DialogDefaults, DialogResponse, Layer, Notifier, Shape, TransientImage};

pub enum HostEvent {
    ShowDialog {
        defaults: DialogDefaults,
        respond: oneshot::Sender<DialogResponse>,
    },
    Fill {
        layer: usize,
        image: TransientImage,
    },
    Message(Message),
    Finished,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub title: String,
    pub text: String,
    pub error: bool,
}

/// Sends events to the UI and wakes it up.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<HostEvent>,
    egui_ctx: Context,
}

impl EventSender {
    pub fn new(egui_ctx: Context) -> (Self, mpsc::UnboundedReceiver<HostEvent>) {
        let (tx, rx) = mpsc::unbounded();
        (Self { tx, egui_ctx }, rx)
    }

    pub fn send(&self, event: HostEvent) {
        if self.tx.unbounded_send(event).is_err() {
            log::warn!("UI is gone, dropping event.");
        }
        self.egui_ctx.request_repaint();
    }
}

/// Layer of the scene, as seen by the run.
pub struct SceneLayer {
    pub index: usize,
    pub shape: Shape,
    pub events: EventSender,
}

impl Layer for SceneLayer {
    fn shape(&self) -> Shape {
        self.shape.clone()
    }

    fn apply_fill(&mut self, image: TransientImage) {
        self.events.send(HostEvent::Fill {
            layer: self.index,
            image,
        });
    }
}

pub struct ChannelDialog {
    pub events: EventSender,
}

impl Dialog for ChannelDialog {
    async fn show(&mut self, defaults: DialogDefaults) -> DialogResponse {
        let (respond, response) = oneshot::channel();
        self.events.send(HostEvent::ShowDialog { defaults, respond });

        // Window closed without an answer, e.g. the app is shutting down.
        response.await.unwrap_or(DialogResponse::Cancelled)
    }
}

pub struct ChannelNotifier {
    pub events: EventSender,
}

impl ChannelNotifier {
    fn message(&self, title: &str, text: &str, error: bool) {
        self.events.send(HostEvent::Message(Message {
            title: title.to_owned(),
            text: text.to_owned(),
            error,
        }));
    }
}

impl Notifier for ChannelNotifier {
    fn alert(&mut self, title: &str, message: &str) {
        self.message(title, message, false);
    }

    fn error(&mut self, title: &str, message: &str) {
        self.message(title, message, true);
    }
}
