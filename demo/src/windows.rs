use egui::{Align2, Color32, Context, Key, RichText, Slider, TextEdit, Vec2, Window};
use futures::channel::oneshot;
use mapfill::{DialogDefaults, DialogResponse, MapRequestParams, MapType};

use crate::host::Message;
use crate::scene::SceneItem;

/// Zoom levels offered as shortcuts, from the whole world down to single buildings.
const ZOOM_PRESETS: [(i32, &str); 6] = [
    (2, "World"),
    (5, "Continent"),
    (9, "Region"),
    (12, "City"),
    (15, "Streets"),
    (19, "Buildings"),
];

const STYLING_REFERENCE: &str =
    "https://developers.google.com/maps/documentation/javascript/style-reference";

/// State of the map parameters form, alive while the run waits for the answer.
pub struct DialogForm {
    params: MapRequestParams,
    ask_for_key: bool,
    respond: Option<oneshot::Sender<DialogResponse>>,
}

impl DialogForm {
    pub fn new(defaults: DialogDefaults, respond: oneshot::Sender<DialogResponse>) -> Self {
        Self {
            params: MapRequestParams {
                style_spec: defaults.styles,
                credential: defaults.api_key,
                ..Default::default()
            },
            ask_for_key: defaults.ask_for_key,
            respond: Some(respond),
        }
    }

    fn answer(&mut self, response: DialogResponse) {
        if let Some(respond) = self.respond.take() {
            // Run might have been dropped in the meantime.
            let _ = respond.send(response);
        }
    }
}

/// Show the form. Returns `true` once it was answered and can be closed.
pub fn map_dialog(ctx: &Context, form: &mut DialogForm) -> bool {
    let mut response = None;
    let mut open = true;

    Window::new("Maps Generator")
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, [0., 0.])
        .open(&mut open)
        .show(ctx, |ui| {
            let params = &mut form.params;

            ui.label("Location");
            ui.add(TextEdit::singleline(&mut params.location).hint_text("Enter a place or address"));

            ui.add(Slider::new(&mut params.zoom, 1..=20).text("Zoom Level"));
            ui.horizontal(|ui| {
                for (zoom, name) in ZOOM_PRESETS {
                    if ui.small_button(name).clicked() {
                        params.zoom = zoom;
                    }
                }
            });

            ui.horizontal(|ui| {
                for map_type in MapType::ALL {
                    ui.radio_value(&mut params.map_type, map_type, map_type.to_string());
                }
            });

            ui.checkbox(&mut params.include_marker, "Include Location Pin");

            ui.separator();
            ui.label("Enter JSON styles (optional)");
            ui.add(
                TextEdit::multiline(&mut params.style_spec)
                    .code_editor()
                    .desired_rows(4),
            );
            ui.hyperlink_to("Learn more about Styling", STYLING_REFERENCE);

            if form.ask_for_key {
                ui.separator();
                ui.label("Enter Your Google Static Maps API Key");
                ui.add(TextEdit::singleline(&mut params.credential).password(true));
                ui.small("NOTE: You must enable billing in your Google Cloud Platform project.");
            }

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    response = Some(DialogResponse::Cancelled);
                }
                if ui.button(RichText::new("Generate Map").strong()).clicked() {
                    response = Some(DialogResponse::Confirmed(params.clone()));
                }
            });

            if ui.input(|input| input.key_pressed(Key::Escape)) {
                response = Some(DialogResponse::Cancelled);
            }
        });

    if !open {
        response = Some(DialogResponse::Cancelled);
    }

    match response {
        Some(response) => {
            form.answer(response);
            true
        }
        None => false,
    }
}

/// Show the message. Returns `true` once it was dismissed.
pub fn message_box(ctx: &Context, message: &Message) -> bool {
    let mut dismissed = false;

    Window::new(message.title.as_str())
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, [0., 0.])
        .show(ctx, |ui| {
            if message.error {
                ui.colored_label(Color32::LIGHT_RED, message.text.as_str());
            } else {
                ui.label(message.text.as_str());
            }
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });

    dismissed
}

/// List of layers to pick from. Returns `true` if generation was requested.
pub fn layers(ctx: &Context, scene: &mut [SceneItem], running: bool) -> bool {
    let mut generate = false;

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("Layers");
        ui.label("Select the layers to fill with a map.");
        ui.separator();

        egui::ScrollArea::vertical().show(ui, |ui| {
            for item in scene.iter_mut() {
                ui.horizontal(|ui| {
                    ui.checkbox(&mut item.selected, item.name);
                    ui.weak(item.describe());
                    if let Some(texture) = &item.fill {
                        ui.image((texture.id(), preview_size(texture.size_vec2())));
                    }
                });
            }
        });

        ui.separator();
        ui.add_enabled_ui(!running, |ui| {
            if ui.button("Generate Map").clicked() {
                generate = true;
            }
        });
        if running {
            ui.spinner();
        }
    });

    generate
}

/// Maps are downloaded at 2x density, show them at their layer's size, but not too big.
fn preview_size(size: Vec2) -> Vec2 {
    let size = size / 2.;
    let max_side = size.x.max(size.y);
    if max_side > 160. {
        size * (160. / max_side)
    } else {
        size
    }
}
