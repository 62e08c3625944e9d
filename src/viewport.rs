//! Viewport transform model: zoom and pan with saturating bounds.
//!
//! The viewport is the only mutable source of the world/screen mapping. Every
//! consumer samples it through [`Viewport::transform`].

use crate::constants::*;
use crate::transform::ViewTransform;
use eframe::egui;

/// Current zoom factor and pan offset of the canvas.
///
/// Invariant: `screen = world * zoom + pan` in canvas-local pixels, with
/// `zoom` in `[MIN_ZOOM, MAX_ZOOM]` and the world point under the top-left
/// corner inside `±PAN_WORLD_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    zoom: f32,
    pan: egui::Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: egui::Vec2::ZERO,
        }
    }
}

impl Viewport {
    /// Creates a viewport, clamping both values into range.
    pub fn new(zoom: f32, pan: egui::Vec2) -> Self {
        let mut viewport = Self::default();
        viewport.set_zoom(zoom);
        viewport.set_pan(pan);
        viewport
    }

    /// Current zoom factor.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Current pan offset in screen pixels.
    pub fn pan(&self) -> egui::Vec2 {
        self.pan
    }

    /// Zoom as a whole percentage for display.
    pub fn zoom_percent(&self) -> i32 {
        (self.zoom * 100.0).round() as i32
    }

    /// Snapshot of the mapping, canvas-local.
    pub fn transform(&self) -> ViewTransform {
        ViewTransform::new(self.zoom, self.pan)
    }

    /// World point to canvas-local screen point.
    pub fn to_screen(&self, world: egui::Pos2) -> egui::Pos2 {
        self.transform().to_screen(world)
    }

    /// Canvas-local screen point to world point.
    pub fn to_world(&self, screen: egui::Pos2) -> egui::Pos2 {
        self.transform().to_world(screen)
    }

    /// World rect visible through a viewport of `size` pixels.
    pub fn visible_world_rect(&self, size: egui::Vec2) -> egui::Rect {
        self.transform()
            .rect_to_world(egui::Rect::from_min_size(egui::Pos2::ZERO, size))
    }

    /// Sets the zoom factor, clamped. Non-finite or non-positive values are ignored.
    ///
    /// Pan is re-clamped since its bounds depend on zoom.
    pub fn set_zoom(&mut self, zoom: f32) {
        if !zoom.is_finite() || zoom <= 0.0 {
            return;
        }
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = self.clamp_pan(self.pan);
    }

    /// Sets the pan offset, saturating at the virtual bounds.
    pub fn set_pan(&mut self, pan: egui::Vec2) {
        if !pan.x.is_finite() || !pan.y.is_finite() {
            return;
        }
        self.pan = self.clamp_pan(pan);
    }

    /// Adds `delta` screen pixels to the pan offset.
    pub fn pan_by(&mut self, delta: egui::Vec2) {
        self.set_pan(self.pan + delta);
    }

    /// Zooms by `zoom_delta` while keeping the world point under
    /// `screen_focal` fixed on screen.
    pub fn zoom_at(&mut self, screen_focal: egui::Pos2, zoom_delta: f32) {
        if !zoom_delta.is_finite() || zoom_delta <= 0.0 {
            return;
        }
        let world = self.to_world(screen_focal);
        self.zoom_to(screen_focal, world, self.zoom * zoom_delta);
    }

    /// Sets an absolute zoom while keeping the world point under `screen_focal` fixed.
    pub fn set_zoom_at(&mut self, screen_focal: egui::Pos2, zoom: f32) {
        if !zoom.is_finite() || zoom <= 0.0 {
            return;
        }
        let world = self.to_world(screen_focal);
        self.zoom_to(screen_focal, world, zoom);
    }

    fn zoom_to(&mut self, screen_focal: egui::Pos2, world: egui::Pos2, zoom: f32) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        let pan = screen_focal - world * self.zoom;
        self.pan = self.clamp_pan(pan);
    }

    /// Back to zoom 1 and no pan.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn clamp_pan(&self, pan: egui::Vec2) -> egui::Vec2 {
        let limit = PAN_WORLD_LIMIT * self.zoom;
        egui::vec2(pan.x.clamp(-limit, limit), pan.y.clamp(-limit, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: egui::Pos2, b: egui::Pos2, eps: f32) -> bool {
        (a - b).length() <= eps
    }

    #[test]
    fn zoom_at_matches_worked_example() {
        let mut vp = Viewport::default();
        vp.zoom_at(egui::pos2(400.0, 300.0), 1.1);
        assert!((vp.zoom() - 1.1).abs() < 1e-6);
        assert!((vp.pan().x - -40.0).abs() < 1e-3);
        assert!((vp.pan().y - -30.0).abs() < 1e-3);
    }

    #[test]
    fn zoom_at_keeps_world_point_under_cursor() {
        let focals = [
            egui::pos2(0.0, 0.0),
            egui::pos2(400.0, 300.0),
            egui::pos2(1199.0, 799.0),
            egui::pos2(37.5, 612.0),
        ];
        for start in [Viewport::new(1.0, egui::Vec2::ZERO), Viewport::new(2.3, egui::vec2(-150.0, 75.0))] {
            for focal in focals {
                for delta in [0.9, 1.1] {
                    let mut vp = start;
                    let before = vp.to_world(focal);
                    vp.zoom_at(focal, delta);
                    assert!(close(vp.to_screen(before), focal, 1e-2), "{focal:?} {delta}");
                }
            }
        }
    }

    #[test]
    fn zoom_is_clamped_and_never_zero() {
        let mut vp = Viewport::default();
        for _ in 0..200 {
            vp.zoom_at(egui::pos2(10.0, 10.0), 0.5);
        }
        assert_eq!(vp.zoom(), MIN_ZOOM);
        for _ in 0..200 {
            vp.zoom_at(egui::pos2(10.0, 10.0), 2.0);
        }
        assert_eq!(vp.zoom(), MAX_ZOOM);

        vp.set_zoom(0.0);
        vp.set_zoom(-3.0);
        vp.set_zoom(f32::NAN);
        vp.zoom_at(egui::pos2(0.0, 0.0), 0.0);
        assert_eq!(vp.zoom(), MAX_ZOOM);
    }

    #[test]
    fn constructor_goes_through_the_clamps() {
        let vp = Viewport::new(0.0, egui::vec2(1.0e9, 0.0));
        assert_eq!(vp.zoom(), 1.0);
        assert_eq!(vp.pan().x, PAN_WORLD_LIMIT);
        assert!(vp.to_world(egui::pos2(10.0, 10.0)).x.is_finite());
        assert_eq!(Viewport::new(500.0, egui::Vec2::ZERO).zoom(), MAX_ZOOM);
    }

    #[test]
    fn pan_saturates_at_virtual_bounds() {
        let mut vp = Viewport::default();
        vp.pan_by(egui::vec2(1.0e9, -1.0e9));
        assert_eq!(vp.pan(), egui::vec2(PAN_WORLD_LIMIT, -PAN_WORLD_LIMIT));
        vp.pan_by(egui::vec2(1.0e9, 0.0));
        assert_eq!(vp.pan().x, PAN_WORLD_LIMIT);
        vp.pan_by(egui::vec2(f32::INFINITY, 0.0));
        assert_eq!(vp.pan().x, PAN_WORLD_LIMIT);
    }

    #[test]
    fn zooming_out_reclamps_pan() {
        let mut vp = Viewport::new(1.0, egui::vec2(PAN_WORLD_LIMIT, 0.0));
        vp.set_zoom(0.5);
        assert_eq!(vp.pan().x, PAN_WORLD_LIMIT * 0.5);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut vp = Viewport::new(4.0, egui::vec2(12.0, -8.0));
        vp.reset();
        assert_eq!(vp.zoom(), 1.0);
        assert_eq!(vp.pan(), egui::Vec2::ZERO);
        assert_eq!(vp.zoom_percent(), 100);
    }

    #[test]
    fn visible_world_rect_follows_transform() {
        let vp = Viewport::new(2.0, egui::vec2(-100.0, -50.0));
        let r = vp.visible_world_rect(egui::vec2(800.0, 600.0));
        assert_eq!(r.min, egui::pos2(50.0, 25.0));
        assert_eq!(r.max, egui::pos2(450.0, 325.0));
    }
}
