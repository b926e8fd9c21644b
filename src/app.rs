use eframe::egui;
use image::RgbaImage;
use std::path::PathBuf;

use face_beauty::beauty::{BeautyConfig, BlemishPoint, ShapeValues, SkinMode, SkinValues};
use face_beauty::face::Landmarks;
use face_beauty::image_io;
use face_beauty::liquify::WarpPoint;
use face_beauty::pipeline::{self, ProcessOptions};

pub struct BeautyApp {
    source_image: Option<RgbaImage>,
    source_path: Option<PathBuf>,
    result_image: Option<RgbaImage>,
    preview_texture: Option<egui::TextureHandle>,
    preview_width: usize,
    preview_height: usize,
    config: BeautyConfig,
    options: ProcessOptions,
    landmarks: Option<Landmarks>,
    warps: Vec<WarpPoint>,
    show_landmarks: bool,
    needs_process: bool,
    auto_process: bool,
    processing_time_ms: f64,
    status: String,
}

impl BeautyApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);
        Self {
            source_image: None,
            source_path: None,
            result_image: None,
            preview_texture: None,
            preview_width: 0,
            preview_height: 0,
            config: BeautyConfig::default(),
            options: ProcessOptions::default(),
            landmarks: None,
            warps: Vec::new(),
            show_landmarks: false,
            needs_process: false,
            auto_process: true,
            processing_time_ms: 0.0,
            status: String::new(),
        }
    }

    fn open_image(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "tiff", "tif", "bmp", "webp"])
            .pick_file()
        {
            match image_io::load_image(&path) {
                Ok(img) => {
                    self.source_image = Some(img);
                    self.source_path = Some(path);
                    self.config.blemish.manual_points.clear();
                    self.needs_process = true;
                }
                Err(e) => {
                    log::error!("Error loading image: {e}");
                    self.status = format!("Load failed: {e}");
                }
            }
        }
    }

    fn save_result(&mut self) {
        let Some(result) = &self.result_image else {
            return;
        };
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .add_filter("JPEG", &["jpg", "jpeg"])
            .add_filter("TIFF", &["tiff", "tif"])
            .save_file()
        {
            if let Err(e) = image_io::save_image(result, &path) {
                log::error!("Error saving image: {e}");
                self.status = format!("Save failed: {e}");
            }
        }
    }

    fn load_config(&mut self) {
        if let Some(path) = rfd::FileDialog::new().add_filter("JSON", &["json"]).pick_file() {
            match BeautyConfig::load(&path) {
                Ok(config) => {
                    self.config = config;
                    self.needs_process = true;
                }
                Err(e) => {
                    log::error!("Error loading config: {e}");
                    self.status = format!("Config load failed: {e}");
                }
            }
        }
    }

    fn save_config(&mut self) {
        if let Some(path) = rfd::FileDialog::new().add_filter("JSON", &["json"]).save_file() {
            let written = self
                .config
                .to_json()
                .and_then(|json| std::fs::write(&path, json).map_err(Into::into));
            if let Err(e) = written {
                log::error!("Error saving config: {e}");
                self.status = format!("Config save failed: {e}");
            }
        }
    }

    fn process_image(&mut self, ctx: &egui::Context) {
        let Some(source) = &self.source_image else {
            return;
        };
        let start = web_time::Instant::now();
        match pipeline::process(source, &self.config, &self.options) {
            Ok(output) => {
                self.processing_time_ms = start.elapsed().as_secs_f64() * 1000.0;
                let (w, h) = output.image.dimensions();
                self.preview_width = w as usize;
                self.preview_height = h as usize;

                let color_image = egui::ColorImage::from_rgba_unmultiplied(
                    [w as usize, h as usize],
                    output.image.as_raw(),
                );
                self.preview_texture = Some(ctx.load_texture(
                    "preview",
                    color_image,
                    egui::TextureOptions::LINEAR,
                ));
                self.status = match &output.landmarks {
                    Some(_) => String::new(),
                    None => "No face found, shape edits skipped".to_owned(),
                };
                self.landmarks = output.landmarks;
                self.warps = output.warps;
                self.result_image = Some(output.image);
            }
            Err(e) => {
                log::error!("Processing failed: {e}");
                self.status = format!("Processing failed: {e}");
            }
        }
    }
}

impl eframe::App for BeautyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Top panel: file operations and mode selection
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Open Image").clicked() {
                    self.open_image();
                }
                if ui.button("Save Result").clicked() {
                    self.save_result();
                }
                ui.separator();
                if ui.button("Load Config").clicked() {
                    self.load_config();
                }
                if ui.button("Save Config").clicked() {
                    self.save_config();
                }
                ui.separator();

                ui.label("Skin:");
                egui::ComboBox::from_id_salt("skin_mode")
                    .selected_text(self.config.skin_mode.name())
                    .show_ui(ui, |ui| {
                        for &mode in SkinMode::ALL {
                            if ui
                                .selectable_value(&mut self.config.skin_mode, mode, mode.name())
                                .clicked()
                            {
                                self.needs_process = true;
                            }
                        }
                    });

                ui.separator();
                ui.checkbox(&mut self.auto_process, "Auto");

                if ui.button("Process").clicked() {
                    self.needs_process = true;
                }
                if ui.button("Reset").clicked() {
                    self.config = BeautyConfig::default();
                    self.needs_process = true;
                }

                ui.separator();
                if self.source_path.is_some() {
                    ui.label(format!(
                        "{}x{} | {:.0}ms",
                        self.preview_width, self.preview_height, self.processing_time_ms
                    ));
                }
                if !self.status.is_empty() {
                    ui.separator();
                    ui.label(&self.status);
                }
            });
        });

        // Left panel: controls
        egui::SidePanel::left("controls")
            .default_width(300.0)
            .resizable(true)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let mut changed = false;
                    changed |= ui_skin(ui, &mut self.config.skin_values);
                    changed |= ui_blemish(ui, &mut self.config);
                    changed |= ui_shape(ui, &mut self.config.shape);
                    ui.separator();
                    ui.checkbox(&mut self.show_landmarks, "Show Landmarks");

                    if changed && self.auto_process {
                        self.needs_process = true;
                    }
                });
            });

        if self.needs_process && self.source_image.is_some() {
            self.process_image(ctx);
            self.needs_process = false;
        }

        // Central panel: preview; a click adds a manual heal point
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(tex) = &self.preview_texture {
                let mut clicked_at = None;
                egui::ScrollArea::both().show(ui, |ui| {
                    let available = ui.available_size();
                    let img_w = self.preview_width as f32;
                    let img_h = self.preview_height as f32;
                    let scale = f32::min(available.x / img_w, available.y / img_h).min(1.0);
                    let display_size = egui::vec2(img_w * scale, img_h * scale);
                    let response = ui.add(
                        egui::Image::new(egui::load::SizedTexture::new(tex.id(), display_size))
                            .sense(egui::Sense::click()),
                    );
                    let rect = response.rect;

                    if response.clicked() {
                        if let Some(pos) = response.interact_pointer_pos() {
                            let rel = (pos - rect.min) / rect.size();
                            clicked_at = Some(BlemishPoint::new(rel.x * 100.0, rel.y * 100.0));
                        }
                    }

                    let to_screen = |x: f32, y: f32| rect.min + egui::vec2(x * scale, y * scale);
                    let painter = ui.painter_at(rect);
                    for p in &self.config.blemish.manual_points {
                        let pos = rect.min + egui::vec2(p.x / 100.0 * rect.width(), p.y / 100.0 * rect.height());
                        painter.circle_stroke(pos, 4.0, egui::Stroke::new(1.5, egui::Color32::YELLOW));
                    }
                    if self.show_landmarks {
                        if let Some(lm) = &self.landmarks {
                            draw_landmarks(&painter, lm, &self.warps, to_screen, scale);
                        }
                    }
                });
                if let Some(point) = clicked_at {
                    self.config.blemish.manual_points.push(point);
                    self.needs_process = true;
                }
            } else {
                ui.centered_and_justified(|ui| {
                    ui.label("Open an image to begin");
                });
            }
        });
    }
}

fn draw_landmarks(
    painter: &egui::Painter,
    lm: &Landmarks,
    warps: &[WarpPoint],
    to_screen: impl Fn(f32, f32) -> egui::Pos2,
    scale: f32,
) {
    let stroke = egui::Stroke::new(1.0, egui::Color32::LIGHT_GREEN);
    let f = &lm.face;
    let corners = vec![
        to_screen(f.x, f.y),
        to_screen(f.x + f.w, f.y),
        to_screen(f.x + f.w, f.y + f.h),
        to_screen(f.x, f.y + f.h),
    ];
    painter.add(egui::Shape::closed_line(corners, stroke));

    for (_, p) in lm.points() {
        painter.circle_filled(to_screen(p.x, p.y), 3.0, egui::Color32::LIGHT_GREEN);
    }
    let warp_stroke = egui::Stroke::new(1.0, egui::Color32::from_rgb(255, 120, 60));
    for w in warps {
        let c = to_screen(w.center.x, w.center.y);
        painter.circle_stroke(c, w.radius * scale, warp_stroke);
        painter.line_segment([c, to_screen(w.center.x + w.dx, w.center.y + w.dy)], warp_stroke);
    }
}

// --- UI Section Builders ---

fn ui_skin(ui: &mut egui::Ui, values: &mut SkinValues) -> bool {
    let mut changed = false;
    egui::CollapsingHeader::new("Skin")
        .default_open(true)
        .show(ui, |ui| {
            changed |= ui.add(egui::Slider::new(&mut values.smooth, 0.0..=100.0).text("Smooth")).changed();
            changed |= ui.add(egui::Slider::new(&mut values.whiten, 0.0..=100.0).text("Whiten")).changed();
            changed |= ui.add(egui::Slider::new(&mut values.even, 0.0..=100.0).text("Even Tone")).changed();
            changed |= ui
                .add(egui::Slider::new(&mut values.dewy_glow, 0.0..=100.0).text("Dewy Glow"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut values.texture, 0.0..=100.0).text("Keep Texture"))
                .changed();
        });
    changed
}

fn ui_blemish(ui: &mut egui::Ui, config: &mut BeautyConfig) -> bool {
    let mut changed = false;
    egui::CollapsingHeader::new("Blemishes")
        .default_open(true)
        .show(ui, |ui| {
            changed |= ui.checkbox(&mut config.blemish.auto, "Auto Detect").changed();
            let points = &mut config.blemish.manual_points;
            ui.label(format!("Manual points: {} (click the image)", points.len()));
            ui.horizontal(|ui| {
                if ui.add_enabled(!points.is_empty(), egui::Button::new("Undo")).clicked() {
                    points.pop();
                    changed = true;
                }
                if ui.add_enabled(!points.is_empty(), egui::Button::new("Clear")).clicked() {
                    points.clear();
                    changed = true;
                }
            });
        });
    changed
}

fn ui_shape(ui: &mut egui::Ui, shape: &mut ShapeValues) -> bool {
    let mut changed = false;
    egui::CollapsingHeader::new("Face Shape")
        .default_open(false)
        .show(ui, |ui| {
            for (value, label) in [
                (&mut shape.slim, "Slim"),
                (&mut shape.v_line, "V-Line"),
                (&mut shape.chin_shrink, "Chin"),
                (&mut shape.forehead, "Forehead"),
                (&mut shape.jaw, "Jaw"),
                (&mut shape.nose_slim, "Nose Width"),
                (&mut shape.nose_bridge, "Nose Bridge"),
            ] {
                changed |= ui.add(egui::Slider::new(value, -100.0..=100.0).text(label)).changed();
            }
        });
    changed
}
