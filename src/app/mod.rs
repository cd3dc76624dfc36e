pub mod canvas;
pub mod loader;
pub mod processor;

use std::{
    collections::{HashMap, HashSet},
    path::PathBuf,
};

use anyhow::Result;
use eframe::{
    egui::{self, Color32},
    App, Frame,
};
use tracing::{debug, info, warn};

use crate::{
    error::{AcceptError, SessionError},
    fs_utils::SUPPORTED_EXTENSIONS,
    image_utils::{ProcessedImage, SourceFile},
    pipeline::{render_accept, PipelineConfig},
    session::ReviewSession,
    ui::{
        thumbnail_size, ImageMetrics, KeyboardState, CROP_SURFACE_HEIGHT, PENDING_THUMBNAIL_SIZE,
        THUMBNAIL_SIZE,
    },
};

use self::{canvas::Canvas, loader::BatchLoader, processor::Processor};

const DIALOG_TITLE: &str = "Crop and Size Photos";
const DIALOG_HINT: &str = "After making your changes on each image, press Save to move on to the next one. \
Once all images have been completed, the dialog closes.";

pub struct ImageBatchApp {
    pub session: ReviewSession,
    pub config: PipelineConfig,
    pub canvas: Canvas,
    pub loader: BatchLoader,
    pub processor: Processor,
    pub status: String,
    textures: HashMap<u64, egui::TextureHandle>,
    active_head: Option<u64>,
}

impl ImageBatchApp {
    pub fn new(config: PipelineConfig, initial: Vec<SourceFile>) -> Result<Self> {
        let mut app = Self {
            session: ReviewSession::new(),
            config,
            canvas: Canvas::new(),
            loader: BatchLoader::new(config),
            processor: Processor::new(),
            status: String::from("Ready"),
            textures: HashMap::new(),
            active_head: None,
        };
        if !initial.is_empty() {
            let count = initial.len();
            app.loader.submit(initial)?;
            app.status = format!("Loading {count} image(s)...");
        }
        Ok(app)
    }

    /// Hand a dropped batch to the decoder. Files that are clearly not images
    /// are skipped here, the same way the drop surface filters by `image/*`.
    pub fn submit_files(&mut self, files: Vec<SourceFile>) {
        let (accepted, skipped): (Vec<_>, Vec<_>) =
            files.into_iter().partition(SourceFile::looks_like_image);
        for file in &skipped {
            warn!(name = %file.name, mime = ?file.mime, "skipping non-image file");
        }
        if accepted.is_empty() {
            if !skipped.is_empty() {
                self.status = format!("Ignored {} non-image file(s)", skipped.len());
            }
            return;
        }
        let count = accepted.len();
        match self.loader.submit(accepted) {
            Ok(Some(batch_id)) => {
                info!(batch_id, files = count, "batch submitted");
                self.status = format!("Loading {count} image(s)...");
            }
            Ok(None) => {}
            Err(err) => self.status = format!("{err:#}"),
        }
    }

    /// Queue files chosen from disk, through the same filter as dropped files.
    pub fn submit_paths(&mut self, paths: Vec<PathBuf>) {
        let files: Vec<_> = paths.into_iter().map(SourceFile::from_path).collect();
        if !files.is_empty() {
            self.submit_files(files);
        }
    }

    fn pick_files(&mut self) {
        let picked = rfd::FileDialog::new()
            .set_title("Select images")
            .add_filter("Images", SUPPORTED_EXTENSIONS)
            .pick_files();
        match picked {
            Some(paths) => self.submit_paths(paths),
            None => debug!("file selection cancelled"),
        }
    }

    pub fn accept_current(&mut self) {
        let region = match self.canvas.crop_region() {
            Ok(region) => region,
            Err(err) => {
                self.status = format!("Could not crop: {err}");
                return;
            }
        };
        let job = match self.session.begin_accept(region) {
            Ok(job) => job,
            Err(SessionError::Busy) => {
                self.status = "Still processing the previous image".into();
                return;
            }
            Err(err) => {
                self.status = format!("{err}");
                return;
            }
        };

        let ticket = job.ticket;
        let name = job.name.clone();
        if let Err(err) = self.processor.queue(job.clone(), self.config.max_dimension) {
            warn!("{err:#}; processing on the UI thread");
            let result = render_accept(&job, self.config.max_dimension);
            self.settle_accept(ticket, result);
            return;
        }
        self.status = format!("Processing {name}...");
    }

    pub fn dismiss(&mut self) {
        match self.session.dismiss() {
            Ok(0) => {}
            Ok(discarded) => self.status = format!("Discarded {discarded} image(s)"),
            Err(err) => self.status = format!("Cannot close yet: {err}"),
        }
    }

    fn settle_accept(&mut self, ticket: u64, result: Result<ProcessedImage, AcceptError>) {
        let name = result.as_ref().map(|p| p.source_name.clone()).ok();
        match self.session.complete_accept(ticket, result) {
            Ok(true) => {
                let remaining = self.session.pending().len();
                self.status = match (remaining, name) {
                    (0, _) => "All images processed".into(),
                    (n, Some(name)) => format!("Saved {name}, {n} remaining"),
                    (n, None) => format!("{n} remaining"),
                };
            }
            Ok(false) => {}
            Err(err) => self.status = format!("Could not save crop: {err}"),
        }
    }

    fn poll_workers(&mut self) {
        for outcome in self.loader.check_completions() {
            match outcome.result {
                Ok(batch) => {
                    let added = self.session.install_batch(batch);
                    self.status = format!(
                        "Loaded {added} image(s), {} awaiting review",
                        self.session.pending().len()
                    );
                }
                Err(err) => {
                    warn!(batch_id = outcome.batch_id, files = outcome.file_count, "batch rejected: {err}");
                    self.status = format!("Could not load batch of {}: {err}", outcome.file_count);
                }
            }
        }
        for outcome in self.processor.check_completions() {
            self.settle_accept(outcome.ticket, outcome.result);
        }
    }

    /// Point the crop surface at the current head, if it changed.
    fn sync_canvas(&mut self) {
        let head = self.session.head().map(|head| (head.id, head.size()));
        match head {
            Some((id, size)) if self.active_head != Some(id) => {
                self.canvas.initialize(size);
                self.active_head = Some(id);
            }
            None if self.active_head.is_some() => {
                self.canvas.reset();
                self.active_head = None;
            }
            _ => {}
        }
    }

    fn sync_textures(&mut self, ctx: &egui::Context) {
        let pending = self.session.pending().iter().map(|item| (item.id, &item.color_image));
        let gallery = self.session.gallery().iter().map(|item| (item.id, &item.color_image));
        let mut live = HashSet::new();
        for (id, color_image) in pending.chain(gallery) {
            live.insert(id);
            self.textures.entry(id).or_insert_with(|| {
                ctx.load_texture(format!("image-{id}"), color_image.clone(), egui::TextureOptions::LINEAR)
            });
        }
        self.textures.retain(|id, _| live.contains(id));
    }

    fn collect_dropped(ctx: &egui::Context) -> Vec<SourceFile> {
        ctx.input(|input| input.raw.dropped_files.clone())
            .into_iter()
            .filter_map(|file| {
                let mime = Some(file.mime).filter(|m| !m.is_empty());
                if let Some(bytes) = file.bytes {
                    let name = if file.name.is_empty() { "dropped image".to_string() } else { file.name };
                    Some(SourceFile::from_bytes(name, mime, bytes))
                } else if let Some(path) = file.path {
                    let mut source = SourceFile::from_path(path);
                    if mime.is_some() {
                        source.mime = mime;
                    }
                    Some(source)
                } else {
                    warn!(name = %file.name, "dropped file has neither path nor contents");
                    None
                }
            })
            .collect()
    }

    /// Returns `true` when the drop zone was clicked.
    fn show_main_panel(&self, ctx: &egui::Context) -> bool {
        let mut pick_requested = false;
        let hovering = ctx.input(|input| !input.raw.hovered_files.is_empty());
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Image Crop, Resize, Compress");
            ui.add_space(8.0);

            let fill = if hovering {
                Color32::from_rgb(170, 200, 230)
            } else {
                Color32::from_gray(211)
            };
            let zone = egui::Frame::new()
                .fill(fill)
                .corner_radius(4.0)
                .inner_margin(egui::Margin::same(12))
                .show(ui, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.set_min_height(100.0);
                    ui.vertical_centered(|ui| {
                        ui.add_space(30.0);
                        ui.colored_label(Color32::BLACK, "You can upload or drop your images here");
                        if self.loader.is_busy() {
                            ui.add_space(6.0);
                            ui.horizontal(|ui| {
                                ui.spinner();
                                ui.colored_label(Color32::BLACK, "Decoding...");
                            });
                        }
                    });
                });
            let zone = zone
                .response
                .interact(egui::Sense::click())
                .on_hover_cursor(egui::CursorIcon::PointingHand)
                .on_hover_text("Click to choose images");
            pick_requested = zone.clicked();

            ui.add_space(6.0);
            ui.label(self.status.as_str());
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for item in self.session.gallery() {
                        let Some(texture) = self.textures.get(&item.id) else { continue };
                        let size = thumbnail_size(texture.size_vec2(), THUMBNAIL_SIZE);
                        ui.add(egui::Image::new(texture).fit_to_exact_size(size))
                            .on_hover_text(item.source_name.as_str());
                    }
                });
            });
        });
        pick_requested
    }

    /// Returns `(save_clicked, close_requested)`.
    fn show_review_dialog(&mut self, ctx: &egui::Context) -> (bool, bool) {
        let Some(head) = self.session.head() else {
            return (false, false);
        };
        let head_id = head.id;
        let head_size = head.size();
        let accepting = self.session.is_accepting();
        let mut open = true;
        let mut save_clicked = false;

        let pending = self.session.pending();
        let textures = &self.textures;
        let canvas = &mut self.canvas;

        egui::Window::new(DIALOG_TITLE)
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .default_width(640.0)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(DIALOG_HINT);
                ui.add_space(6.0);

                egui::ScrollArea::horizontal().id_salt("pending-strip").show(ui, |ui| {
                    ui.horizontal(|ui| {
                        for item in pending {
                            let Some(texture) = textures.get(&item.id) else { continue };
                            let size = thumbnail_size(item.size(), PENDING_THUMBNAIL_SIZE);
                            ui.add(egui::Image::new(texture).fit_to_exact_size(size))
                                .on_hover_text(item.name.as_str());
                        }
                    });
                });
                ui.add_space(6.0);

                let surface = egui::vec2(ui.available_width().max(480.0), CROP_SURFACE_HEIGHT);
                let (response, painter) = ui.allocate_painter(surface, egui::Sense::click_and_drag());
                painter.rect_filled(response.rect, 0.0, Color32::from_gray(30));
                if let Some(texture) = textures.get(&head_id) {
                    let metrics = ImageMetrics::new(response.rect, head_size);
                    painter.image(
                        texture.id(),
                        metrics.image_rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        Color32::WHITE,
                    );
                    if !accepting {
                        canvas.handle_pointer(&response, &metrics);
                    }
                    canvas.draw(&painter, &metrics);
                }

                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    if ui.add_enabled(!accepting, egui::Button::new("Save")).clicked() {
                        save_clicked = true;
                    }
                    if accepting {
                        ui.spinner();
                        ui.label("Processing...");
                    }
                    ui.label(format!("{} remaining", pending.len()));
                });
            });

        (save_clicked, !open)
    }
}

impl App for ImageBatchApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut Frame) {
        let _ = frame;

        self.poll_workers();

        let dropped = Self::collect_dropped(ctx);
        if !dropped.is_empty() {
            self.submit_files(dropped);
        }

        self.sync_textures(ctx);
        self.sync_canvas();

        let mut save = false;
        let mut close = false;
        if self.session.dialog_open() {
            let keys = KeyboardState::read(ctx);
            save |= keys.accept;
            close |= keys.dismiss;
            if !self.session.is_accepting() {
                self.canvas.handle_arrow_movement(&keys);
            }
        }

        if self.show_main_panel(ctx) {
            self.pick_files();
        }
        let (clicked, closed) = self.show_review_dialog(ctx);
        save |= clicked;
        close |= closed;

        if save {
            self.accept_current();
        } else if close {
            self.dismiss();
        }

        if self.loader.is_busy() || self.session.is_accepting() {
            ctx.request_repaint();
        }
    }
}
