//! The canvas engine: sole writer of viewport and board state.
//!
//! Input handlers ([`CanvasEngine::handle_pointer`], [`CanvasEngine::handle_wheel`],
//! [`CanvasEngine::handle_key`]) and the explicit navigation actions below are
//! the only paths that mutate the [`Viewport`] or the [`Board`]. Each call
//! finishes all derived updates before returning, so a frame never observes
//! half-applied state.

use crate::board::{Board, CardPatch};
use crate::constants::*;
use crate::drawing::{DrawingSurface, SketchSurface};
use crate::error::CanvasResult;
use crate::interaction::{Gesture, Interaction, NavKey, Tool, WheelEvent};
use crate::momentum::Momentum;
use crate::solver;
use crate::transform::ViewTransform;
use crate::types::*;
use crate::viewport::Viewport;
use eframe::egui;
use log::{debug, info};

/// What is currently selected on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// Nothing selected
    #[default]
    None,
    /// A card
    Card(CardId),
    /// A free-form element
    Element(ElementId),
    /// A connection
    Connection(ConnectionId),
}

/// Viewport, entities and the gesture machine driving them.
pub struct CanvasEngine {
    pub(crate) viewport: Viewport,
    pub(crate) board: Board,
    pub(crate) interaction: Interaction,
    pub(crate) momentum: Momentum,
    pub(crate) surface: Box<dyn DrawingSurface>,
    pub(crate) viewport_size: egui::Vec2,
    pub(crate) selection: Selection,
    pub(crate) tool: Tool,
    pub(crate) brush: Brush,
    pub(crate) connection_style: ConnectionStyle,
}

impl Default for CanvasEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasEngine {
    /// Empty board, default view and the built-in sketch surface.
    pub fn new() -> Self {
        Self::with_surface(Box::new(SketchSurface::new()))
    }

    /// Empty board drawing through `surface`.
    pub fn with_surface(surface: Box<dyn DrawingSurface>) -> Self {
        Self {
            viewport: Viewport::default(),
            board: Board::new(),
            interaction: Interaction::default(),
            momentum: Momentum::default(),
            surface,
            viewport_size: egui::vec2(800.0, 600.0),
            selection: Selection::None,
            tool: Tool::default(),
            brush: Brush::default(),
            connection_style: ConnectionStyle::default(),
        }
    }

    /// Replaces the board, dropping any gesture and selection tied to the old one.
    pub fn load_board(&mut self, board: Board) {
        self.cancel_gesture();
        self.selection = Selection::None;
        self.board = board;
        info!("loaded board with {} cards", self.board.cards().len());
    }

    // ---- read-only accessors ----

    /// Current viewport.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// All entities.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Gesture in progress.
    pub fn gesture(&self) -> &Gesture {
        self.interaction.gesture()
    }

    /// Whether pointer events must be forwarded from the whole window.
    pub fn has_pointer_capture(&self) -> bool {
        self.interaction.has_capture()
    }

    /// Whether post-pan momentum is still coasting.
    pub fn momentum_active(&self) -> bool {
        self.momentum.is_active()
    }

    /// Current selection.
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Active tool.
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Brush used for new strokes.
    pub fn brush(&self) -> Brush {
        self.brush
    }

    /// Style given to new connections.
    pub fn connection_style(&self) -> &ConnectionStyle {
        &self.connection_style
    }

    /// Size of the canvas area in screen pixels.
    pub fn viewport_size(&self) -> egui::Vec2 {
        self.viewport_size
    }

    /// Canvas-local transform snapshot.
    pub fn transform(&self) -> ViewTransform {
        self.viewport.transform()
    }

    /// Stroke being drawn, in world space, for live preview.
    pub fn stroke_preview(&self) -> Option<(&[egui::Pos2], Brush)> {
        if *self.interaction.gesture() != Gesture::DrawingStroke {
            return None;
        }
        self.surface.preview()
    }

    /// World-space line from the source anchor to the pointer while connecting.
    pub fn connection_preview(&self) -> Option<(egui::Pos2, egui::Pos2)> {
        match *self.interaction.gesture() {
            Gesture::ConnectingFrom { from, pointer, .. } => {
                self.board.card(from).map(|c| (c.right_middle(), pointer))
            }
            _ => None,
        }
    }

    fn viewport_center(&self) -> egui::Pos2 {
        (self.viewport_size / 2.0).to_pos2()
    }

    // ---- configuration ----

    /// Records the canvas size; non-finite or negative sizes are ignored.
    pub fn set_viewport_size(&mut self, size: egui::Vec2) {
        if size.x.is_finite() && size.y.is_finite() && size.x >= 0.0 && size.y >= 0.0 {
            self.viewport_size = size;
        }
    }

    /// Switches tool. A gesture in progress keeps running.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.tool != tool {
            debug!("tool: {} -> {}", self.tool.label(), tool.label());
            self.tool = tool;
        }
    }

    /// Sets the brush for new strokes.
    pub fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
    }

    /// Sets the style given to new connections.
    pub fn set_connection_style(&mut self, style: ConnectionStyle) {
        self.connection_style = style;
    }

    // ---- entity actions ----

    /// Adds a card centred in the current view, with a random colour and a
    /// small random offset so repeated adds do not stack exactly.
    pub fn add_card(&mut self) -> CardId {
        let centre = self.viewport.to_world(self.viewport_center());
        let jitter = egui::vec2(random_unit() - 0.5, random_unit() - 0.5) * 2.0 * CARD_PLACEMENT_JITTER;
        let color = CardColor::ALL[(random_unit() * CardColor::ALL.len() as f32) as usize % CardColor::ALL.len()];
        let position = centre - default_card_size() / 2.0 + jitter;
        let id = self.board.add_card(Card::new(position).with_color(color));
        self.selection = Selection::Card(id);
        info!("added card {id} at ({:.0}, {:.0})", position.x, position.y);
        id
    }

    /// Adds a default card with its top-left corner at `position`.
    pub fn add_card_at(&mut self, position: egui::Pos2) -> CardId {
        let id = self.board.add_card(Card::new(position));
        info!("added card {id}");
        id
    }

    /// Applies text or colour edits to a card.
    pub fn update_card(&mut self, id: CardId, patch: CardPatch) -> CanvasResult<()> {
        self.board.update_card(id, patch)
    }

    /// Deletes a card together with its connections.
    pub fn delete_card(&mut self, id: CardId) -> CanvasResult<()> {
        if self.interaction.gesture().involves_card(id) {
            self.cancel_gesture();
        }
        let (_, connections) = self.board.delete_card(id)?;
        let dropped_selection = match self.selection {
            Selection::Card(selected) => selected == id,
            Selection::Connection(selected) => connections.iter().any(|c| c.id == selected),
            _ => false,
        };
        if dropped_selection {
            self.selection = Selection::None;
        }
        info!("deleted card {id} and {} connections", connections.len());
        Ok(())
    }

    /// Deletes a free-form element.
    pub fn delete_element(&mut self, id: ElementId) -> CanvasResult<()> {
        if matches!(*self.interaction.gesture(), Gesture::DraggingElement { id: dragged, .. } if dragged == id) {
            self.cancel_gesture();
        }
        self.board.delete_element(id)?;
        if self.selection == Selection::Element(id) {
            self.selection = Selection::None;
        }
        info!("deleted element {id}");
        Ok(())
    }

    /// Replaces an element's payload.
    pub fn update_element(&mut self, id: ElementId, kind: ElementKind) -> CanvasResult<()> {
        self.board.update_element(id, kind)
    }

    /// Moves an element to another z-layer.
    pub fn set_element_layer(&mut self, id: ElementId, layer: i32) -> CanvasResult<()> {
        self.board.set_element_layer(id, layer)
    }

    /// Removes a connection.
    pub fn delete_connection(&mut self, id: ConnectionId) -> CanvasResult<()> {
        self.board.remove_connection(id)?;
        if self.selection == Selection::Connection(id) {
            self.selection = Selection::None;
        }
        info!("deleted connection {id}");
        Ok(())
    }

    /// Restyles an existing connection.
    pub fn restyle_connection(&mut self, id: ConnectionId, style: ConnectionStyle) -> CanvasResult<()> {
        self.board.set_connection_style(id, style)
    }

    /// Deletes whatever is selected. Returns whether anything was removed.
    pub fn delete_selected(&mut self) -> bool {
        let result = match self.selection {
            Selection::None => return false,
            Selection::Card(id) => self.delete_card(id),
            Selection::Element(id) => self.delete_element(id),
            Selection::Connection(id) => self.delete_connection(id),
        };
        match result {
            Ok(()) => true,
            Err(err) => {
                debug!("delete skipped: {err}");
                self.selection = Selection::None;
                false
            }
        }
    }

    /// Selects something directly, e.g. from a list view.
    pub fn select(&mut self, selection: Selection) {
        self.selection = selection;
    }

    // ---- navigation ----

    /// Zooms and centres so every card and element is visible.
    pub fn fit_all(&mut self) {
        self.momentum.cancel();
        let fit = solver::fit_to_content(
            self.board.content_bounds(),
            self.viewport_size,
            FIT_PADDING,
            MAX_FIT_ZOOM,
        );
        self.viewport.set_zoom(fit.zoom);
        self.viewport.set_pan(fit.pan);
        info!("fit all: zoom {:.3}", fit.zoom);
    }

    /// Centres the content at the current zoom; resets the view when empty.
    pub fn center_view(&mut self) {
        self.momentum.cancel();
        match self.board.content_bounds() {
            Some(bounds) => {
                let pan = solver::center_on(bounds.center(), self.viewport.zoom(), self.viewport_size);
                self.viewport.set_pan(pan);
            }
            None => self.viewport.reset(),
        }
    }

    /// Zoom 1 about the viewport centre.
    pub fn reset_zoom(&mut self) {
        self.momentum.cancel();
        self.viewport.set_zoom_at(self.viewport_center(), 1.0);
    }

    /// One zoom step in about the viewport centre.
    pub fn zoom_in(&mut self) {
        self.momentum.cancel();
        self.viewport.zoom_at(self.viewport_center(), BUTTON_ZOOM_STEP);
    }

    /// One zoom step out about the viewport centre.
    pub fn zoom_out(&mut self) {
        self.momentum.cancel();
        self.viewport.zoom_at(self.viewport_center(), 1.0 / BUTTON_ZOOM_STEP);
    }

    /// Pans so `world` sits at the viewport centre, keeping the zoom.
    pub fn center_on(&mut self, world: egui::Pos2) {
        self.momentum.cancel();
        let pan = solver::center_on(world, self.viewport.zoom(), self.viewport_size);
        self.viewport.set_pan(pan);
    }

    /// Mouse wheel: vertical scroll zooms about the cursor, horizontal scroll pans.
    pub fn handle_wheel(&mut self, event: WheelEvent) {
        self.momentum.cancel();
        if event.delta.y != 0.0 {
            let factor = if event.delta.y > 0.0 {
                WHEEL_ZOOM_IN
            } else {
                WHEEL_ZOOM_OUT
            };
            self.viewport.zoom_at(event.pos, factor);
        } else if event.delta.x != 0.0 {
            self.viewport.pan_by(egui::vec2(event.delta.x, 0.0));
        }
    }

    /// Keyboard navigation. Returns whether the key did anything.
    ///
    /// # Arguments
    ///
    /// * `key` - The navigation command
    /// * `modifiers` - Held modifiers; `command` selects the fine zoom step
    pub fn handle_key(&mut self, key: NavKey, modifiers: egui::Modifiers) -> bool {
        let zoom_step = if modifiers.command {
            KEY_ZOOM_STEP_FINE
        } else {
            KEY_ZOOM_STEP
        };
        match key {
            NavKey::Escape => {
                let active = self.interaction.is_active();
                self.cancel_gesture();
                active
            }
            NavKey::Delete => self.delete_selected(),
            NavKey::Left | NavKey::Right | NavKey::Up | NavKey::Down => {
                self.momentum.cancel();
                let delta = match key {
                    NavKey::Left => egui::vec2(KEY_PAN_STEP, 0.0),
                    NavKey::Right => egui::vec2(-KEY_PAN_STEP, 0.0),
                    NavKey::Up => egui::vec2(0.0, KEY_PAN_STEP),
                    _ => egui::vec2(0.0, -KEY_PAN_STEP),
                };
                self.viewport.pan_by(delta);
                true
            }
            NavKey::ZoomIn => {
                self.momentum.cancel();
                let zoom = self.viewport.zoom() + zoom_step;
                self.viewport.set_zoom_at(self.viewport_center(), zoom);
                true
            }
            NavKey::ZoomOut => {
                self.momentum.cancel();
                let zoom = (self.viewport.zoom() - zoom_step).max(MIN_ZOOM);
                self.viewport.set_zoom_at(self.viewport_center(), zoom);
                true
            }
            NavKey::ResetZoom => {
                self.reset_zoom();
                true
            }
        }
    }

    /// Advances momentum by one frame. Returns whether another frame is needed.
    pub fn tick(&mut self) -> bool {
        if let Some(delta) = self.momentum.step() {
            self.viewport.pan_by(delta);
        }
        self.momentum.is_active()
    }
}

/// Uniform value in `[0, 1)`, or `0.5` when the OS has no randomness to give.
fn random_unit() -> f32 {
    let mut bytes = [0u8; 4];
    match getrandom::fill(&mut bytes) {
        Ok(()) => (u32::from_le_bytes(bytes) >> 8) as f32 / (1u32 << 24) as f32,
        Err(err) => {
            debug!("no randomness available: {err}");
            0.5
        }
    }
}
