use demo::MapsApp;

fn main() -> Result<(), eframe::Error> {
    env_logger::init();
    eframe::run_native(
        "Maps Generator",
        Default::default(),
        Box::new(|cc| Ok(Box::new(MapsApp::new(cc.egui_ctx.clone())))),
    )
}
