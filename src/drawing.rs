//! Freehand drawing surface.
//!
//! The interaction core only talks to drawing through [`DrawingSurface`]; it
//! never inspects how strokes are recorded. [`SketchSurface`] is the built-in
//! implementation that turns strokes and shapes into [`CanvasElement`]s.

use crate::constants::*;
use crate::types::*;
use eframe::egui;

/// Command interface of a drawing surface. All points are in world space.
pub trait DrawingSurface {
    /// Starts a new stroke at `at`, discarding any unfinished one.
    fn begin_stroke(&mut self, at: egui::Pos2, brush: Brush);

    /// Extends the current stroke. Ignored when no stroke is in progress.
    fn add_point(&mut self, at: egui::Pos2);

    /// Finishes the current stroke, returning the element to store, if it has any extent.
    fn end_stroke(&mut self) -> Option<CanvasElement>;

    /// Produces a shape element filling `rect`.
    fn add_shape(&mut self, kind: ShapeKind, rect: egui::Rect) -> CanvasElement;

    /// Points and brush of the stroke in progress, for live preview.
    fn preview(&self) -> Option<(&[egui::Pos2], Brush)>;

    /// Drops any unfinished work.
    fn dispose(&mut self);
}

/// Default drawing surface recording strokes as point lists.
#[derive(Debug)]
pub struct SketchSurface {
    stroke: Option<(Vec<egui::Pos2>, Brush)>,
    /// Fill colour used for new shapes
    pub shape_fill: egui::Color32,
    /// Outline colour used for new shapes
    pub shape_stroke: egui::Color32,
}

impl Default for SketchSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl SketchSurface {
    /// Creates a surface with the default shape colours.
    pub fn new() -> Self {
        Self {
            stroke: None,
            shape_fill: egui::Color32::from_rgb(200, 220, 255),
            shape_stroke: egui::Color32::from_rgb(60, 90, 160),
        }
    }
}

/// Brush as it should be painted; highlighters are wide and translucent.
pub fn effective_brush(brush: Brush) -> Brush {
    match brush.kind {
        BrushKind::Highlighter => Brush {
            size: brush.size * 3.0,
            color: brush.color.gamma_multiply(0.4),
            ..brush
        },
        BrushKind::Marker => Brush {
            size: brush.size * 2.0,
            ..brush
        },
        BrushKind::Pen => brush,
    }
}

impl DrawingSurface for SketchSurface {
    fn begin_stroke(&mut self, at: egui::Pos2, brush: Brush) {
        self.stroke = Some((vec![at], brush));
    }

    fn add_point(&mut self, at: egui::Pos2) {
        let Some((points, _)) = &mut self.stroke else {
            return;
        };
        let far_enough = points
            .last()
            .map_or(true, |last| last.distance(at) >= STROKE_MIN_POINT_DISTANCE);
        if far_enough {
            points.push(at);
        }
    }

    fn end_stroke(&mut self) -> Option<CanvasElement> {
        let (points, brush) = self.stroke.take()?;
        if points.len() < 2 {
            return None;
        }
        let bounds = egui::Rect::from_points(&points);
        let relative = points
            .iter()
            .map(|p| egui::pos2(p.x - bounds.min.x, p.y - bounds.min.y))
            .collect();
        Some(CanvasElement::new(
            ElementKind::Drawing {
                points: relative,
                brush: effective_brush(brush),
            },
            bounds.min,
            Some(bounds.size()),
        ))
    }

    fn add_shape(&mut self, kind: ShapeKind, rect: egui::Rect) -> CanvasElement {
        CanvasElement::new(
            ElementKind::Shape {
                shape: kind,
                fill: self.shape_fill,
                stroke: self.shape_stroke,
                stroke_width: 2.0,
                opacity: 1.0,
            },
            rect.min,
            Some(rect.size()),
        )
    }

    fn preview(&self) -> Option<(&[egui::Pos2], Brush)> {
        self.stroke
            .as_ref()
            .map(|(points, brush)| (points.as_slice(), effective_brush(*brush)))
    }

    fn dispose(&mut self) {
        self.stroke = None;
    }
}

/// Outline of a shape inscribed in `rect`, as a closed polygon.
pub fn shape_outline(kind: ShapeKind, rect: egui::Rect) -> Vec<egui::Pos2> {
    let c = rect.center();
    let (hw, hh) = (rect.width() / 2.0, rect.height() / 2.0);
    let polar = |n: usize, offset: f32, radius: &dyn Fn(usize) -> f32| -> Vec<egui::Pos2> {
        (0..n)
            .map(|i| {
                let t = offset + i as f32 / n as f32 * std::f32::consts::TAU;
                let r = radius(i);
                egui::pos2(c.x + t.cos() * hw * r, c.y + t.sin() * hh * r)
            })
            .collect()
    };
    match kind {
        ShapeKind::Rectangle => vec![
            rect.left_top(),
            rect.right_top(),
            rect.right_bottom(),
            rect.left_bottom(),
        ],
        ShapeKind::Circle => polar(48, 0.0, &|_| 1.0),
        ShapeKind::Triangle => vec![rect.center_top(), rect.right_bottom(), rect.left_bottom()],
        ShapeKind::Hexagon => polar(6, 0.0, &|_| 1.0),
        ShapeKind::Star => polar(10, -std::f32::consts::FRAC_PI_2, &|i| {
            if i % 2 == 0 { 1.0 } else { 0.45 }
        }),
        ShapeKind::Arrow => {
            let shaft_top = c.y - hh * 0.35;
            let shaft_bottom = c.y + hh * 0.35;
            let neck = rect.min.x + rect.width() * 0.6;
            vec![
                egui::pos2(rect.min.x, shaft_top),
                egui::pos2(neck, shaft_top),
                egui::pos2(neck, rect.min.y),
                rect.right_center(),
                egui::pos2(neck, rect.max.y),
                egui::pos2(neck, shaft_bottom),
                egui::pos2(rect.min.x, shaft_bottom),
            ]
        }
    }
}
