//! Overview map projection.

use crate::constants::*;
use crate::viewport::Viewport;
use eframe::egui;

/// Maps a world box onto a small fixed-size panel.
///
/// The box is the card bounds grown by [`MINIMAP_CONTENT_PADDING`] (or a
/// default square when there are no cards), scaled to fill
/// [`MINIMAP_FILL`] of the panel and centred in it. Panel coordinates are
/// relative to the panel's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapProjection {
    /// World box being shown
    pub world: egui::Rect,
    /// Panel pixels per world unit
    pub scale: f32,
    /// Panel position of `world.min`
    pub offset: egui::Vec2,
    /// Panel extent
    pub size: egui::Vec2,
}

impl MinimapProjection {
    /// Projection of `card_bounds` onto a panel of `size` pixels.
    pub fn new(card_bounds: Option<egui::Rect>, size: egui::Vec2) -> Self {
        let world = card_bounds
            .filter(|r| r.is_finite())
            .map(|r| r.expand(MINIMAP_CONTENT_PADDING))
            .unwrap_or_else(|| {
                egui::Rect::from_center_size(
                    egui::Pos2::ZERO,
                    egui::Vec2::splat(MINIMAP_EMPTY_EXTENT * 2.0),
                )
            });
        let scale = (size.x / world.width()).min(size.y / world.height()) * MINIMAP_FILL;
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        Self {
            world,
            scale,
            offset: (size - world.size() * scale) / 2.0,
            size,
        }
    }

    /// Default-sized panel.
    pub fn standard(card_bounds: Option<egui::Rect>) -> Self {
        Self::new(card_bounds, egui::vec2(MINIMAP_WIDTH, MINIMAP_HEIGHT))
    }

    /// World point to panel point.
    pub fn world_to_minimap(&self, world: egui::Pos2) -> egui::Pos2 {
        (self.offset + (world - self.world.min) * self.scale).to_pos2()
    }

    /// Panel point to world point.
    pub fn minimap_to_world(&self, panel: egui::Pos2) -> egui::Pos2 {
        self.world.min + (panel.to_vec2() - self.offset) / self.scale
    }

    /// World rect to panel rect.
    pub fn rect_to_minimap(&self, world: egui::Rect) -> egui::Rect {
        egui::Rect::from_min_max(self.world_to_minimap(world.min), self.world_to_minimap(world.max))
    }

    /// Panel rect showing what the main viewport currently sees.
    pub fn viewport_rect(&self, viewport: &Viewport, viewport_size: egui::Vec2) -> egui::Rect {
        self.rect_to_minimap(viewport.visible_world_rect(viewport_size))
    }
}
