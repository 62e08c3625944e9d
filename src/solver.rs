//! Fit-to-content and centring calculations.
//!
//! Pure functions from content bounds and viewport size to a zoom/pan pair.
//! Degenerate inputs fall back to the default view instead of producing NaN.

use crate::constants::*;
use eframe::egui;

/// A zoom/pan pair to apply to the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewFit {
    /// Zoom factor
    pub zoom: f32,
    /// Pan offset in screen pixels
    pub pan: egui::Vec2,
}

impl Default for ViewFit {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: egui::Vec2::ZERO,
        }
    }
}

fn usable(size: egui::Vec2) -> bool {
    size.x.is_finite() && size.y.is_finite() && size.x > 0.0 && size.y > 0.0
}

/// Zoom and pan that fit `bounds`, grown by `padding` world units on every side,
/// inside a viewport of `viewport_size` pixels, centred.
///
/// # Arguments
///
/// * `bounds` - World bounds of the content, `None` when there is nothing to fit
/// * `viewport_size` - Viewport extent in screen pixels
/// * `padding` - Margin added around the content, in world units
/// * `max_fit_zoom` - Upper limit so tiny content is not blown up
///
/// # Returns
///
/// The default view when there is no content or the viewport has no area.
pub fn fit_to_content(
    bounds: Option<egui::Rect>,
    viewport_size: egui::Vec2,
    padding: f32,
    max_fit_zoom: f32,
) -> ViewFit {
    let Some(bounds) = bounds else {
        return ViewFit::default();
    };
    if !usable(viewport_size) || !bounds.is_finite() {
        return ViewFit::default();
    }
    let padded = bounds.expand(padding.max(0.0));
    let axis_zoom = |view: f32, content: f32| {
        if content > f32::EPSILON {
            view / content
        } else {
            f32::INFINITY
        }
    };
    let zoom = axis_zoom(viewport_size.x, padded.width())
        .min(axis_zoom(viewport_size.y, padded.height()))
        .min(max_fit_zoom);
    if !zoom.is_finite() || zoom <= 0.0 {
        return ViewFit::default();
    }
    let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    ViewFit {
        zoom,
        pan: center_on(bounds.center(), zoom, viewport_size),
    }
}

/// Pan that puts `world` at the centre of the viewport at `zoom`.
pub fn center_on(world: egui::Pos2, zoom: f32, viewport_size: egui::Vec2) -> egui::Vec2 {
    viewport_size / 2.0 - world.to_vec2() * zoom
}
