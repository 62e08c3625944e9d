//! The single world/screen transform shared by every layer.
//!
//! All conversions go through [`ViewTransform`]: `screen = origin + world * zoom + pan`.
//! Render layers never rebuild this from raw zoom/pan values.

use eframe::egui;

/// An immutable snapshot of the world-to-screen mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Scale from world units to screen pixels; always positive
    pub zoom: f32,
    /// Translation in screen pixels, relative to the canvas origin
    pub pan: egui::Vec2,
    /// Screen position of the canvas' top-left corner
    pub origin: egui::Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    /// Zoom 1, no pan, canvas at the screen origin.
    pub const IDENTITY: ViewTransform = ViewTransform {
        zoom: 1.0,
        pan: egui::Vec2::ZERO,
        origin: egui::Vec2::ZERO,
    };

    /// Canvas-local transform (origin at zero).
    pub fn new(zoom: f32, pan: egui::Vec2) -> Self {
        Self {
            zoom,
            pan,
            origin: egui::Vec2::ZERO,
        }
    }

    /// Same mapping, shifted so that canvas-local `(0, 0)` lands on `origin`.
    pub fn with_origin(self, origin: egui::Pos2) -> Self {
        Self {
            origin: origin.to_vec2(),
            ..self
        }
    }

    /// World point to screen point.
    #[inline]
    pub fn to_screen(&self, world: egui::Pos2) -> egui::Pos2 {
        world * self.zoom + self.pan + self.origin
    }

    /// Screen point to world point.
    #[inline]
    pub fn to_world(&self, screen: egui::Pos2) -> egui::Pos2 {
        (screen - self.origin - self.pan) / self.zoom
    }

    /// World-space length to screen pixels.
    #[inline]
    pub fn scale(&self, world_len: f32) -> f32 {
        world_len * self.zoom
    }

    /// Screen-space vector (a delta, not a point) to world units.
    #[inline]
    pub fn delta_to_world(&self, screen_delta: egui::Vec2) -> egui::Vec2 {
        screen_delta / self.zoom
    }

    /// World rect to screen rect.
    pub fn rect_to_screen(&self, world: egui::Rect) -> egui::Rect {
        egui::Rect::from_min_max(self.to_screen(world.min), self.to_screen(world.max))
    }

    /// Screen rect to world rect.
    pub fn rect_to_world(&self, screen: egui::Rect) -> egui::Rect {
        egui::Rect::from_min_max(self.to_world(screen.min), self.to_world(screen.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: egui::Pos2, b: egui::Pos2) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn round_trip_holds_for_various_transforms() {
        let transforms = [
            ViewTransform::new(1.0, egui::Vec2::ZERO),
            ViewTransform::new(0.25, egui::vec2(-340.0, 90.0)),
            ViewTransform::new(3.5, egui::vec2(1200.0, -4500.0)),
            ViewTransform::new(0.01, egui::vec2(12.0, 7.0)).with_origin(egui::pos2(0.0, 40.0)),
        ];
        let points = [
            egui::pos2(0.0, 0.0),
            egui::pos2(123.5, -987.25),
            egui::pos2(-4000.0, 2500.0),
        ];
        for t in transforms {
            for p in points {
                assert!(approx(t.to_world(t.to_screen(p)), p), "{t:?} {p:?}");
            }
        }
    }

    #[test]
    fn origin_shifts_screen_space_only() {
        let local = ViewTransform::new(2.0, egui::vec2(10.0, 20.0));
        let shifted = local.with_origin(egui::pos2(100.0, 50.0));
        let w = egui::pos2(5.0, 5.0);
        assert_eq!(local.to_screen(w), egui::pos2(20.0, 30.0));
        assert_eq!(shifted.to_screen(w), egui::pos2(120.0, 80.0));
        assert_eq!(shifted.to_world(egui::pos2(120.0, 80.0)), w);
    }

    #[test]
    fn rect_conversion_scales_extent() {
        let t = ViewTransform::new(0.5, egui::vec2(10.0, 10.0));
        let r = t.rect_to_screen(egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(320.0, 240.0)));
        assert_eq!(r.min, egui::pos2(10.0, 10.0));
        assert_eq!(r.size(), egui::vec2(160.0, 120.0));
    }
}
