//! Core data types for the card canvas.
//!
//! This module defines the entities that live in world space: knowledge cards,
//! the directional connections between them, and free-form canvas elements
//! (drawings, shapes, notes and media placeholders).

use crate::constants::*;
use eframe::egui;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for cards.
pub type CardId = Uuid;

/// Unique identifier for connections.
pub type ConnectionId = Uuid;

/// Unique identifier for free-form canvas elements.
pub type ElementId = Uuid;

/// Accent colour of a card.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CardColor {
    /// Purple accent
    #[default]
    Purple,
    /// Blue accent
    Blue,
    /// Green accent
    Green,
    /// Orange accent
    Orange,
}

impl CardColor {
    /// Every available accent, in palette order.
    pub const ALL: [CardColor; 4] = [
        CardColor::Purple,
        CardColor::Blue,
        CardColor::Green,
        CardColor::Orange,
    ];

    /// The accent as a paintable colour.
    pub fn color32(self) -> egui::Color32 {
        match self {
            CardColor::Purple => egui::Color32::from_rgb(147, 112, 219),
            CardColor::Blue => egui::Color32::from_rgb(80, 140, 230),
            CardColor::Green => egui::Color32::from_rgb(90, 180, 120),
            CardColor::Orange => egui::Color32::from_rgb(235, 150, 70),
        }
    }
}

/// A knowledge card placed on the canvas.
///
/// `position` is the world-space top-left corner and `size` the world-space extent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    /// Unique identifier for this card
    pub id: CardId,
    /// Card heading
    pub title: String,
    /// Free text body (edited by the host UI)
    pub content: String,
    /// User tags
    pub tags: Vec<String>,
    /// Accent colour
    pub color: CardColor,
    /// Top-left corner in world space
    pub position: egui::Pos2,
    /// Extent in world space
    pub size: egui::Vec2,
}

impl Card {
    /// Creates a card with default text and size at `position`.
    pub fn new(position: egui::Pos2) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: "New Idea".to_string(),
            content: "Click to edit this card and start writing your thoughts...".to_string(),
            tags: Vec::new(),
            color: CardColor::default(),
            position,
            size: default_card_size(),
        }
    }

    /// Builder-style colour override.
    pub fn with_color(mut self, color: CardColor) -> Self {
        self.color = color;
        self
    }

    /// Builder-style size override. The size is clamped to the card limits.
    pub fn with_size(mut self, size: egui::Vec2) -> Self {
        self.size = clamp_card_size(size);
        self
    }

    /// World-space rectangle covered by the card.
    pub fn rect(&self) -> egui::Rect {
        egui::Rect::from_min_size(self.position, self.size)
    }

    /// Anchor used for outgoing connections: middle of the right edge.
    pub fn right_middle(&self) -> egui::Pos2 {
        egui::pos2(
            self.position.x + self.size.x,
            self.position.y + self.size.y / 2.0,
        )
    }

    /// Anchor used for incoming connections: middle of the left edge.
    pub fn left_middle(&self) -> egui::Pos2 {
        egui::pos2(self.position.x, self.position.y + self.size.y / 2.0)
    }

    /// Position and size captured together.
    pub fn geometry(&self) -> CardGeometry {
        CardGeometry {
            position: self.position,
            size: self.size,
        }
    }

    /// World-space location of a resize handle.
    pub fn handle_position(&self, handle: ResizeHandle) -> egui::Pos2 {
        let r = self.rect();
        match handle {
            ResizeHandle::N => r.center_top(),
            ResizeHandle::S => r.center_bottom(),
            ResizeHandle::E => r.right_center(),
            ResizeHandle::W => r.left_center(),
            ResizeHandle::NE => r.right_top(),
            ResizeHandle::NW => r.left_top(),
            ResizeHandle::SE => r.right_bottom(),
            ResizeHandle::SW => r.left_bottom(),
        }
    }
}

/// Default card extent.
pub fn default_card_size() -> egui::Vec2 {
    egui::vec2(CARD_DEFAULT_WIDTH, CARD_DEFAULT_HEIGHT)
}

/// Clamps a card extent to the allowed minimum and maximum.
pub fn clamp_card_size(size: egui::Vec2) -> egui::Vec2 {
    let w = if size.x.is_finite() { size.x } else { CARD_DEFAULT_WIDTH };
    let h = if size.y.is_finite() { size.y } else { CARD_DEFAULT_HEIGHT };
    egui::vec2(
        w.clamp(CARD_MIN_WIDTH, CARD_MAX_WIDTH),
        h.clamp(CARD_MIN_HEIGHT, CARD_MAX_HEIGHT),
    )
}

/// Card position and size captured at a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardGeometry {
    /// Top-left corner in world space
    pub position: egui::Pos2,
    /// Extent in world space
    pub size: egui::Vec2,
}

/// One of the eight resize handles around a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeHandle {
    /// Top edge
    N,
    /// Bottom edge
    S,
    /// Right edge
    E,
    /// Left edge
    W,
    /// Top-right corner
    NE,
    /// Top-left corner
    NW,
    /// Bottom-right corner
    SE,
    /// Bottom-left corner
    SW,
}

impl ResizeHandle {
    /// Every handle, corners first so they win hit tests over edges.
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::NW,
        ResizeHandle::NE,
        ResizeHandle::SW,
        ResizeHandle::SE,
        ResizeHandle::N,
        ResizeHandle::S,
        ResizeHandle::E,
        ResizeHandle::W,
    ];

    /// Whether dragging this handle moves the card's left edge.
    pub fn moves_left_edge(self) -> bool {
        matches!(self, ResizeHandle::W | ResizeHandle::NW | ResizeHandle::SW)
    }

    /// Whether dragging this handle moves the card's top edge.
    pub fn moves_top_edge(self) -> bool {
        matches!(self, ResizeHandle::N | ResizeHandle::NE | ResizeHandle::NW)
    }

    fn moves_right_edge(self) -> bool {
        matches!(self, ResizeHandle::E | ResizeHandle::NE | ResizeHandle::SE)
    }

    fn moves_bottom_edge(self) -> bool {
        matches!(self, ResizeHandle::S | ResizeHandle::SE | ResizeHandle::SW)
    }

    /// Unclamped size produced by dragging this handle by `delta` world units
    /// from a card that had `start` size.
    pub fn resized(self, start: egui::Vec2, delta: egui::Vec2) -> egui::Vec2 {
        let mut size = start;
        if self.moves_right_edge() {
            size.x += delta.x;
        } else if self.moves_left_edge() {
            size.x -= delta.x;
        }
        if self.moves_bottom_edge() {
            size.y += delta.y;
        } else if self.moves_top_edge() {
            size.y -= delta.y;
        }
        size
    }
}

/// Curve used to draw a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CurveKind {
    /// Direct line
    Straight,
    /// Horizontal-tangent cubic curve
    #[default]
    Bezier,
    /// Right-angled elbow through the horizontal midpoint
    Orthogonal,
    /// Alternating saw-tooth line
    Zigzag,
}

/// Marker drawn at the ends of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ArrowKind {
    /// No marker
    None,
    /// Arrow head at the destination
    #[default]
    Arrow,
    /// Arrow heads at both ends
    Double,
    /// Diamond at the destination
    Diamond,
    /// Dot at the destination
    Circle,
}

/// Visual style of a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStyle {
    /// Curve shape
    pub curve: CurveKind,
    /// Stroke width in world units
    pub stroke_width: f32,
    /// Stroke colour
    pub color: egui::Color32,
    /// Optional dash pattern (dash, gap) in world units
    pub dash: Option<(f32, f32)>,
    /// End markers
    pub arrow: ArrowKind,
}

impl Default for ConnectionStyle {
    fn default() -> Self {
        Self {
            curve: CurveKind::Bezier,
            stroke_width: 2.0,
            color: egui::Color32::from_rgb(0x66, 0x66, 0x66),
            dash: None,
            arrow: ArrowKind::Arrow,
        }
    }
}

/// A directional link from one card to another.
///
/// `from_position` and `to_position` are derived from the referenced cards and
/// are recomputed by the store; they are never authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Unique identifier for this connection
    pub id: ConnectionId,
    /// Source card
    pub from: CardId,
    /// Destination card
    pub to: CardId,
    /// Right-middle of the source card, world space
    pub from_position: egui::Pos2,
    /// Left-middle of the destination card, world space
    pub to_position: egui::Pos2,
    /// Visual style
    pub style: ConnectionStyle,
}

impl Connection {
    /// Creates a connection whose endpoints are computed from the two cards.
    pub fn between(from: &Card, to: &Card, style: ConnectionStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            from: from.id,
            to: to.id,
            from_position: from.right_middle(),
            to_position: to.left_middle(),
            style,
        }
    }

    /// Whether either end refers to `card`.
    pub fn touches(&self, card: CardId) -> bool {
        self.from == card || self.to == card
    }
}

/// Kind of pen used for a freehand stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BrushKind {
    /// Thin opaque pen
    #[default]
    Pen,
    /// Wide translucent highlighter
    Highlighter,
    /// Medium opaque marker
    Marker,
}

/// Pen settings for freehand strokes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    /// Stroke width in world units
    pub size: f32,
    /// Stroke colour
    pub color: egui::Color32,
    /// Pen kind
    pub kind: BrushKind,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            size: 3.0,
            color: egui::Color32::from_rgb(40, 40, 40),
            kind: BrushKind::Pen,
        }
    }
}

/// Geometric shape kinds available to the shape tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ShapeKind {
    /// Ellipse inscribed in the rect
    Circle,
    /// Axis-aligned rectangle
    #[default]
    Rectangle,
    /// Isosceles triangle
    Triangle,
    /// Regular hexagon
    Hexagon,
    /// Five-pointed star
    Star,
    /// Right-pointing block arrow
    Arrow,
}

/// Type-specific payload of a free-form element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementKind {
    /// Freehand stroke; points are relative to the element position
    Drawing {
        /// Stroke points, relative to the element's position
        points: Vec<egui::Pos2>,
        /// Pen used
        brush: Brush,
    },
    /// Filled geometric shape
    Shape {
        /// Which shape
        shape: ShapeKind,
        /// Fill colour
        fill: egui::Color32,
        /// Outline colour
        stroke: egui::Color32,
        /// Outline width in world units
        stroke_width: f32,
        /// Overall opacity in `[0, 1]`
        opacity: f32,
    },
    /// Plain text label
    Text {
        /// Label text
        text: String,
        /// Font size in world units
        font_size: f32,
    },
    /// Sticky note
    StickyNote {
        /// Note text
        text: String,
        /// Paper colour
        color: egui::Color32,
    },
    /// Image placeholder
    Image {
        /// Source location
        src: String,
        /// Alternative text
        alt: String,
    },
    /// Video placeholder
    Video {
        /// Source location
        src: String,
    },
    /// PDF placeholder
    Pdf {
        /// Source location
        src: String,
        /// Document title
        title: String,
    },
    /// Web link preview
    Link {
        /// Target URL
        url: String,
        /// Link title
        title: String,
        /// Short description
        description: String,
    },
}

impl ElementKind {
    /// Short label used by the UI.
    pub fn label(&self) -> &'static str {
        match self {
            ElementKind::Drawing { .. } => "drawing",
            ElementKind::Shape { .. } => "shape",
            ElementKind::Text { .. } => "text",
            ElementKind::StickyNote { .. } => "sticky-note",
            ElementKind::Image { .. } => "image",
            ElementKind::Video { .. } => "video",
            ElementKind::Pdf { .. } => "pdf",
            ElementKind::Link { .. } => "link",
        }
    }
}

/// A free-form element on the canvas (drawing, shape, note or media).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasElement {
    /// Unique identifier for this element
    pub id: ElementId,
    /// Type-specific payload
    pub kind: ElementKind,
    /// Top-left corner in world space
    pub position: egui::Pos2,
    /// Extent in world space, if the element has one
    pub size: Option<egui::Vec2>,
    /// Z-order hint; higher layers draw later
    pub layer: i32,
}

impl CanvasElement {
    /// Creates an element on layer 0.
    pub fn new(kind: ElementKind, position: egui::Pos2, size: Option<egui::Vec2>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            position,
            size,
            layer: 0,
        }
    }

    /// World-space rectangle covered by the element; a point if it has no size.
    pub fn rect(&self) -> egui::Rect {
        egui::Rect::from_min_size(self.position, self.size.unwrap_or(egui::Vec2::ZERO))
    }
}
