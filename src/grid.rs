//! Zoom-adaptive background grid.
//!
//! Spacing starts at [`GRID_BASE_SPACING`] world units, is scaled by zoom, then
//! doubled or halved until it is readable. Offsets are `pan mod spacing`, so
//! lines stay on world-space grid points regardless of pan.

use crate::constants::*;
use crate::transform::ViewTransform;
use eframe::egui;

/// Screen-space layout of the grid for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    /// Distance between minor lines in screen pixels
    pub spacing: f32,
    /// Screen offset of the first minor line, per axis, in `[0, spacing)`
    pub offset: egui::Vec2,
    /// Distance between major lines in screen pixels
    pub major_spacing: f32,
    /// Screen offset of the first major line, per axis, in `[0, major_spacing)`
    pub major_offset: egui::Vec2,
    /// Opacity for minor lines
    pub minor_alpha: f32,
    /// Opacity for major lines
    pub major_alpha: f32,
    /// Whether the world origin marker should be drawn
    pub show_origin: bool,
}

impl GridSpec {
    /// Computes the grid layout for a transform.
    pub fn compute(transform: &ViewTransform) -> Self {
        let zoom = transform.zoom;
        let spacing = readable_spacing(GRID_BASE_SPACING * zoom);
        let major_spacing = spacing * GRID_MAJOR_EVERY;
        Self {
            spacing,
            offset: positive_offset(transform.pan, spacing),
            major_spacing,
            major_offset: positive_offset(transform.pan, major_spacing),
            minor_alpha: (zoom * 0.3).min(0.5),
            major_alpha: (zoom * 0.2).min(0.3),
            show_origin: zoom > GRID_ORIGIN_MIN_ZOOM,
        }
    }

    /// Canvas-local positions of minor lines along one axis of `extent` pixels.
    pub fn minor_lines(&self, offset: f32, extent: f32) -> impl Iterator<Item = f32> {
        lines(offset, self.spacing, extent)
    }

    /// Canvas-local positions of major lines along one axis of `extent` pixels.
    pub fn major_lines(&self, offset: f32, extent: f32) -> impl Iterator<Item = f32> {
        lines(offset, self.major_spacing, extent)
    }
}

fn readable_spacing(raw: f32) -> f32 {
    if !raw.is_finite() || raw <= 0.0 {
        return GRID_BASE_SPACING;
    }
    let mut spacing = raw;
    while spacing < GRID_MIN_SCREEN_SPACING {
        spacing *= 2.0;
    }
    while spacing > GRID_MAX_SCREEN_SPACING {
        spacing /= 2.0;
    }
    spacing
}

fn positive_offset(pan: egui::Vec2, spacing: f32) -> egui::Vec2 {
    egui::vec2(pan.x.rem_euclid(spacing), pan.y.rem_euclid(spacing))
}

fn lines(offset: f32, step: f32, extent: f32) -> impl Iterator<Item = f32> {
    let count = if step > 0.0 && extent > 0.0 {
        ((extent - offset) / step).ceil().max(0.0) as usize
    } else {
        0
    };
    (0..count).map(move |i| offset + i as f32 * step)
}
