//! Per-frame render snapshot.
//!
//! [`FrameSnapshot::capture`] samples the engine once. Every render layer
//! (grid, connections, elements, stroke preview, cards, minimap) draws from
//! the same snapshot, so they cannot disagree about the transform.

use crate::board::Board;
use crate::engine::{CanvasEngine, Selection};
use crate::grid::GridSpec;
use crate::minimap::MinimapProjection;
use crate::transform::ViewTransform;
use crate::types::Brush;
use eframe::egui;

/// Everything the renderer needs for one frame, read-only.
pub struct FrameSnapshot<'a> {
    /// World to absolute screen, origin at the canvas' top-left corner
    pub transform: ViewTransform,
    /// Screen rect of the canvas
    pub canvas_rect: egui::Rect,
    /// World rect visible in the canvas
    pub visible_world: egui::Rect,
    /// Grid layout derived from `transform`
    pub grid: GridSpec,
    /// Minimap projection of the current card bounds
    pub minimap: MinimapProjection,
    /// Panel rect of the main viewport inside the minimap
    pub minimap_viewport: egui::Rect,
    /// Entities to draw
    pub board: &'a Board,
    /// Current selection, for highlights
    pub selection: Selection,
    /// Stroke being drawn, world space
    pub stroke_preview: Option<(&'a [egui::Pos2], Brush)>,
    /// Line from the connection source to the pointer, world space
    pub connection_preview: Option<(egui::Pos2, egui::Pos2)>,
    /// Zoom percentage for display
    pub zoom_percent: i32,
}

impl<'a> FrameSnapshot<'a> {
    /// Samples `engine` for a canvas occupying `canvas_rect` on screen.
    pub fn capture(engine: &'a CanvasEngine, canvas_rect: egui::Rect) -> Self {
        let viewport = engine.viewport();
        let transform = viewport.transform().with_origin(canvas_rect.min);
        let minimap = MinimapProjection::standard(engine.board().card_bounds());
        Self {
            transform,
            canvas_rect,
            visible_world: transform.rect_to_world(canvas_rect),
            grid: GridSpec::compute(&transform),
            minimap,
            minimap_viewport: minimap.viewport_rect(viewport, canvas_rect.size()),
            board: engine.board(),
            selection: engine.selection(),
            stroke_preview: engine.stroke_preview(),
            connection_preview: engine.connection_preview(),
            zoom_percent: viewport.zoom_percent(),
        }
    }

    /// Whether a world rect intersects the visible area.
    pub fn is_visible(&self, world: egui::Rect) -> bool {
        self.visible_world.intersects(world)
    }

    /// Screen rect of a world rect.
    pub fn to_screen_rect(&self, world: egui::Rect) -> egui::Rect {
        self.transform.rect_to_screen(world)
    }
}
