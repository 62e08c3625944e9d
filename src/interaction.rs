//! Pointer interaction state machine.
//!
//! Raw pointer events are resolved into exactly one active [`Gesture`]. A
//! gesture owns a [`PointerCapture`] from the press that starts it until
//! [`Interaction::end_gesture`], which is the only place the capture is
//! released. While the capture is held the host forwards pointer events from
//! anywhere in the window, so leaving the canvas mid-drag cannot strand the
//! machine in a non-idle state.

use crate::constants::*;
use crate::curves;
use crate::engine::{CanvasEngine, Selection};
use crate::types::*;
use eframe::egui;
use log::debug;

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    /// Button pressed
    Down,
    /// Pointer moved
    Move,
    /// Button released
    Up,
    /// Pointer left the window
    Leave,
}

/// Mouse button carried by a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    /// Left button or touch
    #[default]
    Primary,
    /// Wheel button
    Middle,
    /// Right button
    Secondary,
}

/// One pointer event in canvas-local screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Event phase
    pub kind: PointerKind,
    /// Position relative to the canvas' top-left corner
    pub pos: egui::Pos2,
    /// Button involved (ignored for moves)
    pub button: PointerButton,
    /// Modifier keys held
    pub modifiers: egui::Modifiers,
}

impl PointerEvent {
    /// Primary-button press at `pos`.
    pub fn down(pos: egui::Pos2) -> Self {
        Self::new(PointerKind::Down, pos)
    }

    /// Pointer motion to `pos`.
    pub fn moved(pos: egui::Pos2) -> Self {
        Self::new(PointerKind::Move, pos)
    }

    /// Primary-button release at `pos`.
    pub fn up(pos: egui::Pos2) -> Self {
        Self::new(PointerKind::Up, pos)
    }

    /// Pointer left the window; the last position is kept by the caller.
    pub fn leave(pos: egui::Pos2) -> Self {
        Self::new(PointerKind::Leave, pos)
    }

    fn new(kind: PointerKind, pos: egui::Pos2) -> Self {
        Self {
            kind,
            pos,
            button: PointerButton::Primary,
            modifiers: egui::Modifiers::NONE,
        }
    }

    /// Builder-style button override.
    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    /// Builder-style modifier override.
    pub fn with_modifiers(mut self, modifiers: egui::Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Scroll-wheel or trackpad scroll in screen pixels.
///
/// Follows egui's sign convention: positive `delta.y` scrolls up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    /// Scroll amount
    pub delta: egui::Vec2,
    /// Cursor position, canvas-local
    pub pos: egui::Pos2,
}

/// Keyboard navigation commands understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    /// Arrow left
    Left,
    /// Arrow right
    Right,
    /// Arrow up
    Up,
    /// Arrow down
    Down,
    /// `+` or `=`
    ZoomIn,
    /// `-`
    ZoomOut,
    /// Ctrl/Cmd + `0`
    ResetZoom,
    /// Delete or Backspace
    Delete,
    /// Escape
    Escape,
}

/// Active tool, deciding what a primary press on the canvas does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum Tool {
    /// Select, drag and resize
    #[default]
    Select,
    /// Drag pans the view
    Pan,
    /// Drag from card to card to connect them
    Connect,
    /// Freehand pen
    Draw,
    /// Freehand highlighter
    Highlighter,
    /// Click places a shape
    Shape(ShapeKind),
    /// Click places a text label
    Text,
    /// Click places a sticky note
    StickyNote,
}

impl Tool {
    /// Short label for toolbars.
    pub fn label(self) -> &'static str {
        match self {
            Tool::Select => "Select",
            Tool::Pan => "Pan",
            Tool::Connect => "Connect",
            Tool::Draw => "Pen",
            Tool::Highlighter => "Highlighter",
            Tool::Shape(_) => "Shape",
            Tool::Text => "Text",
            Tool::StickyNote => "Sticky",
        }
    }
}

/// The single gesture currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    /// No gesture
    #[default]
    Idle,
    /// Moving a card; `grab_offset` is pointer minus card origin, in world units
    DraggingCard {
        /// Card being dragged
        id: CardId,
        /// Offset from the card origin to the grab point
        grab_offset: egui::Vec2,
    },
    /// Resizing a card from one of its handles
    ResizingCard {
        /// Card being resized
        id: CardId,
        /// Handle that was grabbed
        handle: ResizeHandle,
        /// Card geometry when the gesture started
        start: CardGeometry,
        /// World pointer position when the gesture started
        start_pointer: egui::Pos2,
    },
    /// Dragging the view
    PanningViewport {
        /// Screen position of the previous move
        last: egui::Pos2,
        /// Last move delta, in pixels per event
        velocity: egui::Vec2,
    },
    /// Recording a freehand stroke on the drawing surface
    DrawingStroke,
    /// Linking from a card; `armed` means waiting for a click on the target
    ConnectingFrom {
        /// Source card
        from: CardId,
        /// Current pointer position in world space, for the preview line
        pointer: egui::Pos2,
        /// Released over the source; the next press picks the target
        armed: bool,
    },
    /// Moving a free-form element
    DraggingElement {
        /// Element being dragged
        id: ElementId,
        /// Offset from the element origin to the grab point
        grab_offset: egui::Vec2,
    },
}

impl Gesture {
    /// Name used in log output.
    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Idle => "idle",
            Gesture::DraggingCard { .. } => "dragging-card",
            Gesture::ResizingCard { .. } => "resizing-card",
            Gesture::PanningViewport { .. } => "panning",
            Gesture::DrawingStroke => "drawing",
            Gesture::ConnectingFrom { .. } => "connecting",
            Gesture::DraggingElement { .. } => "dragging-element",
        }
    }

    /// Whether this gesture refers to `card`.
    pub fn involves_card(&self, card: CardId) -> bool {
        match *self {
            Gesture::DraggingCard { id, .. } | Gesture::ResizingCard { id, .. } => id == card,
            Gesture::ConnectingFrom { from, .. } => from == card,
            _ => false,
        }
    }
}

/// Scoped ownership of the window-wide pointer stream for one gesture.
///
/// There is at most one live capture; it is dropped only by
/// [`Interaction::end_gesture`].
#[derive(Debug, PartialEq, Eq)]
pub struct PointerCapture {
    gesture: &'static str,
}

impl PointerCapture {
    fn acquire(gesture: &'static str) -> Self {
        debug!("pointer capture acquired for {gesture}");
        Self { gesture }
    }
}

impl Drop for PointerCapture {
    fn drop(&mut self) {
        debug!("pointer capture released from {}", self.gesture);
    }
}

/// Gesture slot plus the capture that goes with it.
#[derive(Debug, Default)]
pub struct Interaction {
    gesture: Gesture,
    capture: Option<PointerCapture>,
}

impl Interaction {
    /// The gesture in progress.
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Whether a gesture is in progress.
    pub fn is_active(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    /// Whether the pointer stream is captured.
    pub fn has_capture(&self) -> bool {
        self.capture.is_some()
    }

    /// Starts `gesture` and acquires the capture.
    ///
    /// Returns `false` without changing anything when another gesture is active.
    pub fn begin(&mut self, gesture: Gesture) -> bool {
        if self.is_active() || gesture == Gesture::Idle {
            return false;
        }
        debug!("gesture: idle -> {}", gesture.name());
        self.capture = Some(PointerCapture::acquire(gesture.name()));
        self.gesture = gesture;
        true
    }

    fn gesture_mut(&mut self) -> &mut Gesture {
        &mut self.gesture
    }

    /// Ends the current gesture, releasing the capture, and returns it.
    pub fn end_gesture(&mut self) -> Gesture {
        let ended = std::mem::take(&mut self.gesture);
        if ended != Gesture::Idle {
            debug!("gesture: {} -> idle", ended.name());
        }
        self.capture = None;
        ended
    }
}

/// How a gesture is being finished.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Finish {
    /// Button released at this canvas-local position
    Release(egui::Pos2),
    /// Pointer left the window
    Leave,
    /// Explicit cancellation (Escape, deleted target)
    Cancel,
}

impl CanvasEngine {
    /// Feeds one pointer event through the state machine.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event.kind {
            PointerKind::Down => self.pointer_down(event),
            PointerKind::Move => self.pointer_move(event.pos),
            PointerKind::Up => self.finish_gesture(Finish::Release(event.pos)),
            PointerKind::Leave => self.finish_gesture(Finish::Leave),
        }
    }

    /// Abandons the gesture in progress without completing it.
    pub fn cancel_gesture(&mut self) {
        self.finish_gesture(Finish::Cancel);
    }

    fn pointer_down(&mut self, event: PointerEvent) {
        let world = self.viewport.to_world(event.pos);

        let current = *self.interaction.gesture();
        if let Gesture::ConnectingFrom {
            from, armed: true, ..
        } = current
        {
            if event.button == PointerButton::Primary {
                if let Some(target) = self.board.card_at(world) {
                    self.connect(from, target);
                }
                self.interaction.end_gesture();
            }
            return;
        }

        if self.interaction.is_active() {
            debug!(
                "ignoring press during {}",
                self.interaction.gesture().name()
            );
            return;
        }

        self.momentum.cancel();

        let wants_pan = match event.button {
            PointerButton::Middle => true,
            PointerButton::Primary => self.tool == Tool::Pan || event.modifiers.command,
            PointerButton::Secondary => false,
        };
        if wants_pan {
            self.interaction.begin(Gesture::PanningViewport {
                last: event.pos,
                velocity: egui::Vec2::ZERO,
            });
            return;
        }
        if event.button != PointerButton::Primary {
            return;
        }

        match self.tool {
            Tool::Draw | Tool::Highlighter => {
                let mut brush = self.brush;
                if self.tool == Tool::Highlighter {
                    brush.kind = BrushKind::Highlighter;
                }
                self.surface.begin_stroke(world, brush);
                self.interaction.begin(Gesture::DrawingStroke);
            }
            Tool::Shape(kind) => {
                let rect = egui::Rect::from_center_size(
                    world,
                    egui::Vec2::splat(SHAPE_DEFAULT_SIZE),
                );
                let element = self.surface.add_shape(kind, rect);
                self.place_element(element);
            }
            Tool::Text => {
                let element = CanvasElement::new(
                    ElementKind::Text {
                        text: "Text".to_string(),
                        font_size: 18.0,
                    },
                    world,
                    Some(egui::vec2(160.0, 32.0)),
                );
                self.place_element(element);
            }
            Tool::StickyNote => {
                let size = egui::Vec2::splat(STICKY_NOTE_SIZE);
                let element = CanvasElement::new(
                    ElementKind::StickyNote {
                        text: String::new(),
                        color: egui::Color32::from_rgb(255, 235, 130),
                    },
                    world - size / 2.0,
                    Some(size),
                );
                self.place_element(element);
            }
            Tool::Connect => match self.board.card_at(world) {
                Some(from) => self.start_connecting(from, world),
                None => self.selection = Selection::None,
            },
            Tool::Select | Tool::Pan => self.select_press(world, event.modifiers),
        }
    }

    fn select_press(&mut self, world: egui::Pos2, modifiers: egui::Modifiers) {
        let zoom = self.viewport.zoom();
        let handles_on = match self.selection {
            Selection::Card(id) => Some(id),
            _ => None,
        };
        match self.board.hit_test_cards(world, HANDLE_HIT_SIZE / zoom, handles_on) {
            Some(crate::board::CardHit::Handle(id, handle)) => {
                let Some(start) = self.board.card(id).map(Card::geometry) else {
                    return;
                };
                self.selection = Selection::Card(id);
                self.interaction.begin(Gesture::ResizingCard {
                    id,
                    handle,
                    start,
                    start_pointer: world,
                });
            }
            Some(crate::board::CardHit::Body(id)) if modifiers.shift => {
                self.start_connecting(id, world);
            }
            Some(crate::board::CardHit::Body(id)) => {
                if let Err(err) = self.board.bring_card_to_front(id) {
                    debug!("{err}");
                    return;
                }
                let Some(card) = self.board.card(id) else {
                    return;
                };
                let grab_offset = world - card.position;
                self.selection = Selection::Card(id);
                self.interaction
                    .begin(Gesture::DraggingCard { id, grab_offset });
            }
            None => {
                if let Some(id) = self
                    .board
                    .element_at(world, ELEMENT_HIT_TOLERANCE / zoom)
                {
                    let Some(element) = self.board.element(id) else {
                        return;
                    };
                    let grab_offset = world - element.position;
                    self.selection = Selection::Element(id);
                    self.interaction
                        .begin(Gesture::DraggingElement { id, grab_offset });
                } else if let Some(id) = self.connection_at(world, CONNECTION_HIT_TOLERANCE / zoom) {
                    self.selection = Selection::Connection(id);
                } else {
                    self.selection = Selection::None;
                }
            }
        }
    }

    /// Connection whose drawn path passes within `tolerance` world units of `world`.
    pub fn connection_at(&self, world: egui::Pos2, tolerance: f32) -> Option<ConnectionId> {
        self.board
            .connections()
            .iter()
            .rev()
            .find(|c| {
                let path = curves::connection_path(c.from_position, c.to_position, c.style.curve);
                curves::distance_to_path(world, &path) <= tolerance
            })
            .map(|c| c.id)
    }

    fn start_connecting(&mut self, from: CardId, world: egui::Pos2) {
        self.selection = Selection::Card(from);
        self.interaction.begin(Gesture::ConnectingFrom {
            from,
            pointer: world,
            armed: false,
        });
    }

    fn place_element(&mut self, element: CanvasElement) {
        debug!("placed {} element", element.kind.label());
        let id = self.board.add_element(element);
        self.selection = Selection::Element(id);
    }

    fn connect(&mut self, from: CardId, to: CardId) {
        if from == to {
            debug!("connection back onto its source discarded");
            return;
        }
        match self
            .board
            .add_connection(from, to, self.connection_style.clone())
        {
            Ok(id) => {
                log::info!("connected {from} -> {to}");
                self.selection = Selection::Connection(id);
            }
            Err(err) => debug!("connection not created: {err}"),
        }
    }

    fn pointer_move(&mut self, pos: egui::Pos2) {
        let world = self.viewport.to_world(pos);
        let mut stale = false;
        match self.interaction.gesture_mut() {
            Gesture::Idle => {}
            Gesture::DraggingCard { id, grab_offset } => {
                stale = self.board.move_card(*id, world - *grab_offset).is_err();
            }
            Gesture::ResizingCard {
                id,
                handle,
                start,
                start_pointer,
            } => {
                let new_size = handle.resized(start.size, world - *start_pointer);
                stale = self.board.resize_card(*id, *handle, new_size).is_err();
            }
            Gesture::PanningViewport { last, velocity } => {
                // Incremental, so zooms and key pans made mid-gesture are kept
                self.viewport.pan_by(pos - *last);
                *velocity = pos - *last;
                *last = pos;
            }
            Gesture::DrawingStroke => self.surface.add_point(world),
            Gesture::ConnectingFrom { pointer, .. } => *pointer = world,
            Gesture::DraggingElement { id, grab_offset } => {
                stale = self.board.move_element(*id, world - *grab_offset).is_err();
            }
        }
        if stale {
            debug!("gesture target vanished");
            self.finish_gesture(Finish::Cancel);
        }
    }

    fn finish_gesture(&mut self, finish: Finish) {
        let current = *self.interaction.gesture();
        match current {
            Gesture::Idle => {}
            Gesture::ConnectingFrom { from, armed, .. } => {
                let Finish::Release(pos) = finish else {
                    self.interaction.end_gesture();
                    return;
                };
                if armed {
                    return;
                }
                let world = self.viewport.to_world(pos);
                match self.board.card_at(world) {
                    Some(target) if target == from => {
                        debug!("connection armed; click a target card");
                        if let Gesture::ConnectingFrom { armed, pointer, .. } =
                            self.interaction.gesture_mut()
                        {
                            *armed = true;
                            *pointer = world;
                        }
                    }
                    Some(target) => {
                        self.connect(from, target);
                        self.interaction.end_gesture();
                    }
                    None => {
                        self.interaction.end_gesture();
                    }
                }
            }
            Gesture::PanningViewport { velocity, .. } => {
                self.interaction.end_gesture();
                if matches!(finish, Finish::Release(_)) {
                    self.momentum.start(velocity);
                }
            }
            Gesture::DrawingStroke => {
                self.interaction.end_gesture();
                if finish == Finish::Cancel {
                    self.surface.dispose();
                } else if let Some(element) = self.surface.end_stroke() {
                    self.place_element(element);
                }
            }
            Gesture::DraggingCard { .. }
            | Gesture::ResizingCard { .. }
            | Gesture::DraggingElement { .. } => {
                self.interaction.end_gesture();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with_cards() -> (CanvasEngine, CardId, CardId) {
        let mut engine = CanvasEngine::new();
        engine.set_viewport_size(egui::vec2(1200.0, 800.0));
        let a = engine.add_card_at(egui::pos2(0.0, 0.0));
        let b = engine.add_card_at(egui::pos2(500.0, 100.0));
        (engine, a, b)
    }

    fn drag_to(engine: &mut CanvasEngine, to: egui::Pos2) {
        engine.handle_pointer(PointerEvent::moved(to));
        engine.handle_pointer(PointerEvent::up(to));
    }

    fn drag(engine: &mut CanvasEngine, from: egui::Pos2, to: egui::Pos2) {
        engine.handle_pointer(PointerEvent::down(from));
        engine.handle_pointer(PointerEvent::moved(to));
        engine.handle_pointer(PointerEvent::up(to));
    }

    #[test]
    fn capture_follows_gesture_lifecycle() {
        let mut interaction = Interaction::default();
        assert!(!interaction.has_capture());
        assert!(interaction.begin(Gesture::DrawingStroke));
        assert!(interaction.has_capture());
        assert!(!interaction.begin(Gesture::DrawingStroke));
        assert_eq!(interaction.end_gesture(), Gesture::DrawingStroke);
        assert!(!interaction.has_capture());
        assert!(!interaction.is_active());
        assert_eq!(interaction.end_gesture(), Gesture::Idle);
    }

    #[test]
    fn dragging_card_keeps_grab_offset() {
        let (mut engine, a, _) = engine_with_cards();
        engine.handle_pointer(PointerEvent::down(egui::pos2(100.0, 50.0)));
        assert!(matches!(engine.gesture(), Gesture::DraggingCard { id, .. } if *id == a));
        engine.handle_pointer(PointerEvent::moved(egui::pos2(150.0, 100.0)));
        assert_eq!(engine.board().card(a).unwrap().position, egui::pos2(50.0, 50.0));
        engine.handle_pointer(PointerEvent::up(egui::pos2(150.0, 100.0)));
        assert_eq!(*engine.gesture(), Gesture::Idle);
        assert_eq!(engine.selection(), Selection::Card(a));
    }

    #[test]
    fn drag_under_zoom_and_pan_uses_world_delta() {
        let (mut engine, a, _) = engine_with_cards();
        engine.viewport.set_zoom(2.0);
        engine.viewport.set_pan(egui::vec2(10.0, 20.0));
        // Card a spans screen (10,20)-(650,500) now
        drag(&mut engine, egui::pos2(110.0, 120.0), egui::pos2(210.0, 120.0));
        assert_eq!(engine.board().card(a).unwrap().position, egui::pos2(50.0, 0.0));
    }

    #[test]
    fn dragging_updates_connection_endpoints() {
        let (mut engine, a, b) = engine_with_cards();
        engine.board.add_connection(a, b, ConnectionStyle::default()).unwrap();
        drag(&mut engine, egui::pos2(10.0, 10.0), egui::pos2(60.0, 60.0));
        let conn = &engine.board().connections()[0];
        assert_eq!(conn.from_position, egui::pos2(370.0, 170.0));
        assert_eq!(conn.to_position, egui::pos2(500.0, 220.0));
    }

    #[test]
    fn resize_from_north_west_handle_keeps_south_east_corner() {
        let (mut engine, a, _) = engine_with_cards();
        engine.select(Selection::Card(a));
        engine.viewport.set_zoom(0.5);
        // NW handle of card a sits at screen (0, 0); move the pointer by (-20, -10) px
        engine.handle_pointer(PointerEvent::down(egui::pos2(0.0, 0.0)));
        assert!(matches!(engine.gesture(), Gesture::ResizingCard { .. }));
        engine.handle_pointer(PointerEvent::moved(egui::pos2(-10.0, -5.0)));
        engine.handle_pointer(PointerEvent::moved(egui::pos2(-20.0, -10.0)));
        engine.handle_pointer(PointerEvent::up(egui::pos2(-20.0, -10.0)));
        let card = engine.board().card(a).unwrap();
        assert_eq!(card.size, egui::vec2(360.0, 260.0));
        assert_eq!(card.rect().max, egui::pos2(320.0, 240.0));
    }

    #[test]
    fn second_press_is_ignored_while_gesture_active() {
        let (mut engine, a, b) = engine_with_cards();
        engine.handle_pointer(PointerEvent::down(egui::pos2(10.0, 10.0)));
        engine.handle_pointer(PointerEvent::down(egui::pos2(600.0, 200.0)));
        assert!(matches!(engine.gesture(), Gesture::DraggingCard { id, .. } if *id == a));
        engine.handle_pointer(PointerEvent::up(egui::pos2(10.0, 10.0)));
        assert_eq!(engine.board().card(b).unwrap().position, egui::pos2(500.0, 100.0));
    }

    #[test]
    fn leave_ends_any_gesture() {
        let (mut engine, _, _) = engine_with_cards();
        engine.handle_pointer(PointerEvent::down(egui::pos2(10.0, 10.0)));
        assert!(engine.has_pointer_capture());
        engine.handle_pointer(PointerEvent::leave(egui::pos2(-300.0, 10.0)));
        assert_eq!(*engine.gesture(), Gesture::Idle);
        assert!(!engine.has_pointer_capture());
    }

    #[test]
    fn middle_button_pans_and_starts_momentum() {
        let (mut engine, _, _) = engine_with_cards();
        let press = PointerEvent::down(egui::pos2(100.0, 100.0)).with_button(PointerButton::Middle);
        engine.handle_pointer(press);
        engine.handle_pointer(PointerEvent::moved(egui::pos2(120.0, 100.0)));
        engine.handle_pointer(PointerEvent::moved(egui::pos2(150.0, 110.0)));
        assert_eq!(engine.viewport().pan(), egui::vec2(50.0, 10.0));
        engine.handle_pointer(PointerEvent::up(egui::pos2(150.0, 110.0)).with_button(PointerButton::Middle));
        assert!(engine.momentum_active());
        assert!(engine.tick());
        assert!(engine.viewport().pan().x > 50.0);
    }

    #[test]
    fn wheel_zoom_during_pan_survives_the_next_move() {
        let (mut engine, _, _) = engine_with_cards();
        engine.set_tool(Tool::Pan);
        engine.handle_pointer(PointerEvent::down(egui::pos2(400.0, 300.0)));
        engine.handle_pointer(PointerEvent::moved(egui::pos2(410.0, 300.0)));
        engine.handle_wheel(WheelEvent {
            delta: egui::vec2(0.0, 1.0),
            pos: egui::pos2(410.0, 300.0),
        });
        let grabbed = engine.viewport().to_world(egui::pos2(410.0, 300.0));
        engine.handle_pointer(PointerEvent::moved(egui::pos2(411.0, 300.0)));

        let under_cursor = engine.viewport().to_world(egui::pos2(411.0, 300.0));
        assert!((under_cursor - grabbed).length() < 1e-3, "{under_cursor:?} vs {grabbed:?}");
        assert!((engine.viewport().zoom() - 1.1).abs() < 1e-5);
    }

    #[test]
    fn cards_stay_draggable_when_zoomed_far_out() {
        let (mut engine, a, _) = engine_with_cards();
        engine.viewport.set_zoom(0.05);
        // Card a spans screen (0,0)-(16,12); press its centre with and without selection
        for selected in [Selection::None, Selection::Card(a)] {
            engine.select(selected);
            let start = engine.board().card(a).unwrap().position;
            let centre = engine.viewport().to_screen(engine.board().card(a).unwrap().rect().center());
            engine.handle_pointer(PointerEvent::down(centre));
            assert!(matches!(engine.gesture(), Gesture::DraggingCard { id, .. } if *id == a));
            drag_to(&mut engine, centre + egui::vec2(50.0, 0.0));
            let card = engine.board().card(a).unwrap();
            assert_eq!(card.size, egui::vec2(320.0, 240.0));
            assert!((card.position - (start + egui::vec2(1000.0, 0.0))).length() < 1e-2);
        }
    }

    #[test]
    fn leaving_during_pan_does_not_coast() {
        let (mut engine, _, _) = engine_with_cards();
        engine.set_tool(Tool::Pan);
        engine.handle_pointer(PointerEvent::down(egui::pos2(700.0, 700.0)));
        engine.handle_pointer(PointerEvent::moved(egui::pos2(740.0, 700.0)));
        engine.handle_pointer(PointerEvent::leave(egui::pos2(740.0, 700.0)));
        assert!(!engine.momentum_active());
        assert_eq!(engine.viewport().pan(), egui::vec2(40.0, 0.0));
    }

    #[test]
    fn new_press_cancels_momentum() {
        let (mut engine, _, _) = engine_with_cards();
        engine.set_tool(Tool::Pan);
        drag(&mut engine, egui::pos2(700.0, 700.0), egui::pos2(760.0, 700.0));
        assert!(engine.momentum_active());
        engine.handle_pointer(PointerEvent::down(egui::pos2(700.0, 700.0)));
        assert!(!engine.momentum_active());
    }

    #[test]
    fn press_drag_release_connects_cards() {
        let (mut engine, a, b) = engine_with_cards();
        engine.set_tool(Tool::Connect);
        drag(&mut engine, egui::pos2(100.0, 100.0), egui::pos2(600.0, 200.0));
        let conn = &engine.board().connections()[0];
        assert_eq!((conn.from, conn.to), (a, b));
        assert_eq!(conn.from_position, egui::pos2(320.0, 120.0));
        assert_eq!(conn.to_position, egui::pos2(500.0, 220.0));
        assert_eq!(*engine.gesture(), Gesture::Idle);
    }

    #[test]
    fn click_click_connects_and_empty_click_cancels() {
        let (mut engine, a, b) = engine_with_cards();
        engine.set_tool(Tool::Connect);
        engine.handle_pointer(PointerEvent::down(egui::pos2(100.0, 100.0)));
        engine.handle_pointer(PointerEvent::up(egui::pos2(100.0, 100.0)));
        assert!(matches!(engine.gesture(), Gesture::ConnectingFrom { armed: true, .. }));
        assert!(engine.has_pointer_capture());
        engine.handle_pointer(PointerEvent::down(egui::pos2(600.0, 200.0)));
        assert_eq!(*engine.gesture(), Gesture::Idle);
        assert_eq!(engine.board().connections().len(), 1);
        assert!(engine.board().connections()[0].touches(a));
        assert!(engine.board().connections()[0].touches(b));

        engine.handle_pointer(PointerEvent::down(egui::pos2(100.0, 100.0)));
        engine.handle_pointer(PointerEvent::up(egui::pos2(100.0, 100.0)));
        engine.handle_pointer(PointerEvent::down(egui::pos2(1000.0, 700.0)));
        assert_eq!(*engine.gesture(), Gesture::Idle);
        assert_eq!(engine.board().connections().len(), 1);
    }

    #[test]
    fn armed_connection_onto_source_is_discarded() {
        let (mut engine, _, _) = engine_with_cards();
        engine.set_tool(Tool::Connect);
        engine.handle_pointer(PointerEvent::down(egui::pos2(100.0, 100.0)));
        engine.handle_pointer(PointerEvent::up(egui::pos2(100.0, 100.0)));
        engine.handle_pointer(PointerEvent::down(egui::pos2(50.0, 50.0)));
        assert!(engine.board().connections().is_empty());
        assert_eq!(*engine.gesture(), Gesture::Idle);
    }

    #[test]
    fn shift_press_on_card_connects_with_select_tool() {
        let (mut engine, a, b) = engine_with_cards();
        let press = PointerEvent::down(egui::pos2(100.0, 100.0)).with_modifiers(egui::Modifiers::SHIFT);
        engine.handle_pointer(press);
        assert!(matches!(engine.gesture(), Gesture::ConnectingFrom { from, .. } if *from == a));
        engine.handle_pointer(PointerEvent::moved(egui::pos2(600.0, 150.0)));
        engine.handle_pointer(PointerEvent::up(egui::pos2(600.0, 150.0)));
        assert_eq!(engine.board().connections()[0].to, b);
        assert_eq!(engine.board().card(a).unwrap().position, egui::Pos2::ZERO);
    }

    #[test]
    fn escape_cancels_armed_connection() {
        let (mut engine, _, _) = engine_with_cards();
        engine.set_tool(Tool::Connect);
        engine.handle_pointer(PointerEvent::down(egui::pos2(100.0, 100.0)));
        engine.handle_pointer(PointerEvent::up(egui::pos2(100.0, 100.0)));
        engine.handle_key(NavKey::Escape, egui::Modifiers::NONE);
        assert_eq!(*engine.gesture(), Gesture::Idle);
        assert!(!engine.has_pointer_capture());
    }

    #[test]
    fn tool_switch_does_not_interrupt_gesture() {
        let (mut engine, a, _) = engine_with_cards();
        engine.handle_pointer(PointerEvent::down(egui::pos2(10.0, 10.0)));
        engine.set_tool(Tool::Draw);
        engine.handle_pointer(PointerEvent::moved(egui::pos2(30.0, 10.0)));
        engine.handle_pointer(PointerEvent::up(egui::pos2(30.0, 10.0)));
        assert_eq!(engine.board().card(a).unwrap().position, egui::pos2(20.0, 0.0));
        assert!(engine.board().elements().is_empty());
    }

    #[test]
    fn draw_tool_stores_stroke_in_world_space() {
        let mut engine = CanvasEngine::new();
        engine.set_viewport_size(egui::vec2(800.0, 600.0));
        engine.viewport.set_zoom(2.0);
        engine.set_tool(Tool::Draw);
        engine.handle_pointer(PointerEvent::down(egui::pos2(100.0, 100.0)));
        engine.handle_pointer(PointerEvent::moved(egui::pos2(200.0, 100.0)));
        assert!(engine.stroke_preview().is_some());
        engine.handle_pointer(PointerEvent::moved(egui::pos2(200.0, 160.0)));
        engine.handle_pointer(PointerEvent::up(egui::pos2(200.0, 160.0)));
        let element = &engine.board().elements()[0];
        assert_eq!(element.position, egui::pos2(50.0, 50.0));
        assert_eq!(element.size, Some(egui::vec2(50.0, 30.0)));
        assert!(engine.stroke_preview().is_none());
    }

    #[test]
    fn escape_discards_stroke() {
        let mut engine = CanvasEngine::new();
        engine.set_tool(Tool::Highlighter);
        engine.handle_pointer(PointerEvent::down(egui::pos2(0.0, 0.0)));
        engine.handle_pointer(PointerEvent::moved(egui::pos2(40.0, 0.0)));
        assert_eq!(
            engine.stroke_preview().map(|(_, brush)| brush.kind),
            Some(BrushKind::Highlighter)
        );
        engine.cancel_gesture();
        assert!(engine.board().elements().is_empty());
        assert!(engine.stroke_preview().is_none());
    }

    #[test]
    fn placement_tools_act_on_press() {
        let mut engine = CanvasEngine::new();
        engine.set_tool(Tool::Shape(ShapeKind::Hexagon));
        engine.handle_pointer(PointerEvent::down(egui::pos2(200.0, 200.0)));
        assert_eq!(*engine.gesture(), Gesture::Idle);
        let element = &engine.board().elements()[0];
        assert_eq!(element.rect().center(), egui::pos2(200.0, 200.0));
        assert_eq!(engine.selection(), Selection::Element(element.id));

        engine.set_tool(Tool::StickyNote);
        engine.handle_pointer(PointerEvent::down(egui::pos2(500.0, 500.0)));
        assert_eq!(engine.board().elements().len(), 2);
    }

    #[test]
    fn elements_can_be_dragged_with_select_tool() {
        let mut engine = CanvasEngine::new();
        engine.set_tool(Tool::StickyNote);
        engine.handle_pointer(PointerEvent::down(egui::pos2(300.0, 300.0)));
        engine.handle_pointer(PointerEvent::up(egui::pos2(300.0, 300.0)));
        engine.set_tool(Tool::Select);
        drag(&mut engine, egui::pos2(300.0, 300.0), egui::pos2(350.0, 320.0));
        assert_eq!(engine.board().elements()[0].position, egui::pos2(250.0, 220.0));
    }

    #[test]
    fn clicking_a_connection_selects_it() {
        let (mut engine, a, b) = engine_with_cards();
        let id = engine.board.add_connection(a, b, ConnectionStyle::default()).unwrap();
        // Bezier from (320,120) to (500,220) crosses mid-x at (410,170)
        engine.handle_pointer(PointerEvent::down(egui::pos2(410.0, 171.0)));
        engine.handle_pointer(PointerEvent::up(egui::pos2(410.0, 171.0)));
        assert_eq!(engine.selection(), Selection::Connection(id));

        engine.handle_pointer(PointerEvent::down(egui::pos2(1100.0, 700.0)));
        assert_eq!(engine.selection(), Selection::None);
    }

    #[test]
    fn deleting_dragged_card_ends_the_gesture() {
        let (mut engine, a, _) = engine_with_cards();
        engine.handle_pointer(PointerEvent::down(egui::pos2(10.0, 10.0)));
        engine.delete_card(a).unwrap();
        assert_eq!(*engine.gesture(), Gesture::Idle);
        engine.handle_pointer(PointerEvent::moved(egui::pos2(40.0, 40.0)));
        engine.handle_pointer(PointerEvent::up(egui::pos2(40.0, 40.0)));
        assert_eq!(engine.board().cards().len(), 1);
    }
}
