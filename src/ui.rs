use eframe::egui::{self, Pos2, Rect, Vec2};

use crate::selection::Selection;

pub const ARROW_MOVE_STEP: f32 = 2.0;
pub const THUMBNAIL_SIZE: f32 = 150.0;
pub const PENDING_THUMBNAIL_SIZE: f32 = 64.0;
pub const CROP_SURFACE_HEIGHT: f32 = 400.0;

/// Placement of an image scaled to fit a canvas, centered.
pub struct ImageMetrics {
    pub image_rect: Rect,
    pub image_size: Vec2,
    pub scale: f32,
}

impl ImageMetrics {
    pub fn new(canvas: Rect, image_size: Vec2) -> Self {
        let (display, scale) = fit_within(image_size, canvas.size());
        let offset = (canvas.size() - display) * 0.5;
        let image_rect = Rect::from_min_size(canvas.min + offset, display);
        Self {
            image_rect,
            image_size,
            scale,
        }
    }

    pub fn screen_to_image(&self, pos: Pos2) -> Pos2 {
        let rel = pos - self.image_rect.min;
        egui::pos2(
            (rel.x / self.scale).clamp(0.0, self.image_size.x),
            (rel.y / self.scale).clamp(0.0, self.image_size.y),
        )
    }

    pub fn screen_delta_to_image(&self, delta: Vec2) -> Vec2 {
        delta / self.scale
    }

    pub fn selection_rect(&self, selection: &Selection) -> Rect {
        let min = egui::pos2(
            self.image_rect.min.x + selection.rect.min.x * self.scale,
            self.image_rect.min.y + selection.rect.min.y * self.scale,
        );
        let max = egui::pos2(
            self.image_rect.min.x + selection.rect.max.x * self.scale,
            self.image_rect.min.y + selection.rect.max.y * self.scale,
        );
        Rect::from_min_max(min, max)
    }
}

pub fn fit_within(image_size: Vec2, available: Vec2) -> (Vec2, f32) {
    let safe_size = egui::vec2(image_size.x.max(1.0), image_size.y.max(1.0));
    let scale = (available.x / safe_size.x)
        .min(available.y / safe_size.y)
        .max(0.01);
    (safe_size * scale, scale)
}

/// Display size of a thumbnail: fits in a `max` square and never enlarges.
pub fn thumbnail_size(image_size: Vec2, max: f32) -> Vec2 {
    let (display, scale) = fit_within(image_size, egui::vec2(max, max));
    if scale > 1.0 {
        image_size
    } else {
        display
    }
}

#[derive(Default)]
pub struct KeyboardState {
    pub accept: bool,
    pub dismiss: bool,
    pub move_up: bool,
    pub move_down: bool,
    pub move_left: bool,
    pub move_right: bool,
}

impl KeyboardState {
    pub fn read(ctx: &egui::Context) -> Self {
        ctx.input(|input| Self {
            accept: input.key_pressed(egui::Key::Enter),
            dismiss: input.key_pressed(egui::Key::Escape),
            move_up: input.key_down(egui::Key::ArrowUp),
            move_down: input.key_down(egui::Key::ArrowDown),
            move_left: input.key_down(egui::Key::ArrowLeft),
            move_right: input.key_down(egui::Key::ArrowRight),
        })
    }

    pub fn arrow_delta(&self) -> Vec2 {
        let mut delta = Vec2::ZERO;
        if self.move_up {
            delta.y -= ARROW_MOVE_STEP;
        }
        if self.move_down {
            delta.y += ARROW_MOVE_STEP;
        }
        if self.move_left {
            delta.x -= ARROW_MOVE_STEP;
        }
        if self.move_right {
            delta.x += ARROW_MOVE_STEP;
        }
        delta
    }
}
