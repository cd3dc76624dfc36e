use eframe::egui::{self, Color32};

use crate::{
    error::CropExtractionError,
    image_utils::CropRegion,
    selection::{Selection, SelectionHandle, CROP_OUTLINE, DEFAULT_CROP_FRACTION},
    ui::{ImageMetrics, KeyboardState},
};

#[derive(Clone, Debug)]
enum Drag {
    Draw { anchor: egui::Pos2 },
    Move { original: Selection, start_pos: egui::Pos2 },
    Resize { handle: SelectionHandle, original: Selection, start_pos: egui::Pos2 },
}

/// The crop surface for the image at the head of the review queue.
///
/// Holds one crop box in image coordinates. Until [`Canvas::initialize`] is
/// called for an image there is nothing to crop.
pub struct Canvas {
    pub selection: Option<Selection>,
    image_size: Option<egui::Vec2>,
    drag: Option<Drag>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    pub fn new() -> Self {
        Self {
            selection: None,
            image_size: None,
            drag: None,
        }
    }

    /// Attach the surface to a new image and place the default crop box.
    pub fn initialize(&mut self, image_size: egui::Vec2) {
        self.image_size = Some(image_size);
        self.selection = Some(Selection::centered(image_size, DEFAULT_CROP_FRACTION));
        self.drag = None;
    }

    pub fn reset(&mut self) {
        self.selection = None;
        self.image_size = None;
        self.drag = None;
    }

    pub fn is_initialized(&self) -> bool {
        self.image_size.is_some()
    }

    pub fn image_size(&self) -> Option<egui::Vec2> {
        self.image_size
    }

    pub fn crop_region(&self) -> Result<CropRegion, CropExtractionError> {
        let Some(bounds) = self.image_size else {
            return Err(CropExtractionError::NotInitialized);
        };
        self.selection
            .as_ref()
            .and_then(|selection| selection.to_crop_region(bounds))
            .ok_or(CropExtractionError::Empty)
    }

    pub fn handle_pointer(&mut self, response: &egui::Response, metrics: &ImageMetrics) {
        if response.drag_started() {
            if let Some(pointer) = response.interact_pointer_pos() {
                self.press(pointer, metrics);
            }
        } else if response.dragged() {
            if let Some(pointer) = response.interact_pointer_pos() {
                self.drag_to(pointer, metrics);
            }
        } else if response.drag_stopped() {
            self.release();
        }
    }

    /// Start a drag at `pointer` (screen space): a handle resizes, the inside
    /// of the box moves it, anywhere else draws a new box.
    pub fn press(&mut self, pointer: egui::Pos2, metrics: &ImageMetrics) {
        let Some(bounds) = self.image_size else { return };
        let image_pos = metrics.screen_to_image(pointer);

        if let Some(selection) = &self.selection {
            let screen_rect = metrics.selection_rect(selection);
            if let Some(handle) = SelectionHandle::hit(screen_rect, pointer) {
                self.drag = Some(Drag::Resize {
                    handle,
                    original: selection.clone(),
                    start_pos: pointer,
                });
                return;
            }
            if selection.contains(image_pos) {
                self.drag = Some(Drag::Move {
                    original: selection.clone(),
                    start_pos: pointer,
                });
                return;
            }
        }

        self.selection = Some(Selection::from_points(image_pos, image_pos, bounds));
        self.drag = Some(Drag::Draw { anchor: image_pos });
    }

    pub fn drag_to(&mut self, pointer: egui::Pos2, metrics: &ImageMetrics) {
        let (Some(bounds), Some(drag)) = (self.image_size, self.drag.as_ref()) else {
            return;
        };
        let updated = match drag {
            Drag::Draw { anchor } => {
                Selection::from_points(*anchor, metrics.screen_to_image(pointer), bounds)
            }
            Drag::Move { original, start_pos } => {
                let mut moved = original.clone();
                moved.translate(metrics.screen_delta_to_image(pointer - *start_pos), bounds);
                moved
            }
            Drag::Resize {
                handle,
                original,
                start_pos,
            } => original.clone().adjusted(
                *handle,
                metrics.screen_delta_to_image(pointer - *start_pos),
                bounds,
            ),
        };
        self.selection = Some(updated);
    }

    pub fn release(&mut self) {
        self.drag = None;
    }

    pub fn handle_arrow_movement(&mut self, keys: &KeyboardState) {
        let (Some(bounds), Some(selection)) = (self.image_size, self.selection.as_mut()) else {
            return;
        };
        let delta = keys.arrow_delta();
        if delta != egui::Vec2::ZERO {
            selection.translate(delta, bounds);
        }
    }

    pub fn draw(&self, painter: &egui::Painter, metrics: &ImageMetrics) {
        let Some(selection) = &self.selection else { return };
        let rect = metrics.selection_rect(selection);
        let outer = metrics.image_rect;
        let shade = Color32::from_black_alpha(140);

        // Darken everything outside the crop box.
        let bands = [
            egui::Rect::from_min_max(outer.min, egui::pos2(outer.max.x, rect.min.y)),
            egui::Rect::from_min_max(egui::pos2(outer.min.x, rect.max.y), outer.max),
            egui::Rect::from_min_max(
                egui::pos2(outer.min.x, rect.min.y),
                egui::pos2(rect.min.x, rect.max.y),
            ),
            egui::Rect::from_min_max(
                egui::pos2(rect.max.x, rect.min.y),
                egui::pos2(outer.max.x, rect.max.y),
            ),
        ];
        for band in bands {
            if band.is_positive() {
                painter.rect_filled(band, 0.0, shade);
            }
        }

        painter.rect_stroke(
            rect,
            0.0,
            egui::Stroke::new(2.0, CROP_OUTLINE),
            egui::StrokeKind::Outside,
        );
        let handle_color = Color32::from_rgba_unmultiplied(
            CROP_OUTLINE.r(),
            CROP_OUTLINE.g(),
            CROP_OUTLINE.b(),
            200,
        );
        for handle in SelectionHandle::ALL {
            painter.rect_filled(handle.handle_rect(rect), 2.0, handle_color);
        }
    }
}
