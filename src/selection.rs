use eframe::egui::{self, Color32, Rect, Vec2};

use crate::image_utils::CropRegion;

pub const HANDLE_THICKNESS: f32 = 10.0;
pub const MIN_HANDLE_LENGTH: f32 = 20.0;
pub const MAX_HANDLE_LENGTH: f32 = 100.0;

/// Share of each image dimension covered by a fresh crop box.
pub const DEFAULT_CROP_FRACTION: f32 = 0.8;

pub const CROP_OUTLINE: Color32 = Color32::from_rgb(57, 159, 255);

/// The crop box, in image pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub rect: Rect,
}

impl Selection {
    pub fn from_points(a: egui::Pos2, b: egui::Pos2, bounds: Vec2) -> Self {
        let min = egui::pos2(
            a.x.min(b.x).clamp(0.0, bounds.x),
            a.y.min(b.y).clamp(0.0, bounds.y),
        );
        let max = egui::pos2(
            a.x.max(b.x).clamp(0.0, bounds.x),
            a.y.max(b.y).clamp(0.0, bounds.y),
        );
        let mut selection = Self {
            rect: Rect::from_min_max(min, max),
        };
        selection.clamp_within(bounds);
        selection
    }

    /// Centered box covering `fraction` of the width and height of `bounds`.
    pub fn centered(bounds: Vec2, fraction: f32) -> Self {
        let fraction = fraction.clamp(0.0, 1.0);
        let size = bounds * fraction;
        let min = ((bounds - size) * 0.5).to_pos2();
        Self::from_points(min, min + size, bounds)
    }

    pub fn translate(&mut self, delta: Vec2, bounds: Vec2) {
        // Moving keeps the size; only the position is clamped.
        let size = self.rect.size();
        let mut min = self.rect.min + delta;
        min.x = min.x.clamp(0.0, (bounds.x - size.x).max(0.0));
        min.y = min.y.clamp(0.0, (bounds.y - size.y).max(0.0));
        self.rect = Rect::from_min_size(min, size);
        self.clamp_within(bounds);
    }

    pub fn contains(&self, pos: egui::Pos2) -> bool {
        self.rect.contains(pos)
    }

    /// Pixel region covered by the box. Both edges are rounded and the far
    /// edge is capped at `bounds`, so the region always fits the image.
    pub fn to_crop_region(&self, bounds: Vec2) -> Option<CropRegion> {
        let (x0, x1) = pixel_span(self.rect.min.x, self.rect.max.x, bounds.x);
        let (y0, y1) = pixel_span(self.rect.min.y, self.rect.max.y, bounds.y);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(CropRegion::new(x0, y0, x1 - x0, y1 - y0))
    }

    pub fn adjusted(mut self, handle: SelectionHandle, delta: Vec2, bounds: Vec2) -> Self {
        if handle.moves_top() {
            self.rect.min.y = (self.rect.min.y + delta.y).clamp(0.0, self.rect.max.y - 1.0);
        }
        if handle.moves_bottom() {
            self.rect.max.y = (self.rect.max.y + delta.y).clamp(self.rect.min.y + 1.0, bounds.y);
        }
        if handle.moves_left() {
            self.rect.min.x = (self.rect.min.x + delta.x).clamp(0.0, self.rect.max.x - 1.0);
        }
        if handle.moves_right() {
            self.rect.max.x = (self.rect.max.x + delta.x).clamp(self.rect.min.x + 1.0, bounds.x);
        }
        self.clamp_within(bounds);
        self
    }

    fn clamp_within(&mut self, bounds: Vec2) {
        let mut min = self.rect.min;
        let mut max = self.rect.max;
        min.x = min.x.clamp(0.0, bounds.x);
        max.x = max.x.clamp(0.0, bounds.x);
        min.y = min.y.clamp(0.0, bounds.y);
        max.y = max.y.clamp(0.0, bounds.y);
        if max.x <= min.x {
            max.x = (min.x + 1.0).min(bounds.x);
            min.x = (max.x - 1.0).max(0.0);
        }
        if max.y <= min.y {
            max.y = (min.y + 1.0).min(bounds.y);
            min.y = (max.y - 1.0).max(0.0);
        }
        self.rect = Rect::from_min_max(min, max);
    }
}

fn pixel_span(min: f32, max: f32, limit: f32) -> (u32, u32) {
    let limit = limit.max(0.0).floor();
    let start = min.round().clamp(0.0, limit);
    let end = max.round().clamp(0.0, limit);
    (start as u32, end as u32)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionHandle {
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl SelectionHandle {
    pub const ALL: [Self; 8] = [
        Self::Top, Self::Bottom, Self::Left, Self::Right,
        Self::TopLeft, Self::TopRight, Self::BottomLeft, Self::BottomRight,
    ];

    fn moves_top(self) -> bool {
        matches!(self, Self::Top | Self::TopLeft | Self::TopRight)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, Self::Bottom | Self::BottomLeft | Self::BottomRight)
    }

    fn moves_left(self) -> bool {
        matches!(self, Self::Left | Self::TopLeft | Self::BottomLeft)
    }

    fn moves_right(self) -> bool {
        matches!(self, Self::Right | Self::TopRight | Self::BottomRight)
    }

    /// Screen-space hit box of this handle on a selection drawn at `selection`.
    pub fn handle_rect(self, selection: Rect) -> Rect {
        let corner_size = egui::vec2(HANDLE_THICKNESS, HANDLE_THICKNESS);
        let horizontal = egui::vec2(
            selection.width().clamp(MIN_HANDLE_LENGTH, MAX_HANDLE_LENGTH),
            HANDLE_THICKNESS,
        );
        let vertical = egui::vec2(
            HANDLE_THICKNESS,
            selection.height().clamp(MIN_HANDLE_LENGTH, MAX_HANDLE_LENGTH),
        );
        match self {
            Self::Top => Rect::from_center_size(selection.center_top(), horizontal),
            Self::Bottom => Rect::from_center_size(selection.center_bottom(), horizontal),
            Self::Left => Rect::from_center_size(selection.left_center(), vertical),
            Self::Right => Rect::from_center_size(selection.right_center(), vertical),
            Self::TopLeft => Rect::from_center_size(selection.min, corner_size),
            Self::TopRight => Rect::from_center_size(selection.right_top(), corner_size),
            Self::BottomLeft => Rect::from_center_size(selection.left_bottom(), corner_size),
            Self::BottomRight => Rect::from_center_size(selection.max, corner_size),
        }
    }

    /// First handle whose hit box contains `pos`; corners win over edges.
    pub fn hit(selection: Rect, pos: egui::Pos2) -> Option<Self> {
        Self::ALL
            .iter()
            .rev()
            .copied()
            .find(|handle| handle.handle_rect(selection).contains(pos))
    }
}
