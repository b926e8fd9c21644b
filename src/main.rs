mod app;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Face Beauty"),
        ..Default::default()
    };

    eframe::run_native(
        "Face Beauty",
        options,
        Box::new(|cc| Ok(Box::new(app::BeautyApp::new(cc)))),
    )
}
