//! Canvas input translation.
//!
//! Raw egui events are converted into canvas-local engine events. Presses
//! only count inside the canvas; while the engine holds a pointer capture,
//! moves and releases are forwarded from anywhere in the window.

use super::state::CanvasApp;
use crate::constants::*;
use crate::frame::FrameSnapshot;
use crate::interaction::{NavKey, PointerButton, PointerEvent, WheelEvent};
use crate::minimap::MinimapProjection;
use eframe::egui;

/// Pixels scrolled per wheel "line".
const WHEEL_LINE_PIXELS: f32 = 40.0;

/// Screen rect of the minimap overlay inside `canvas_rect`.
pub fn minimap_rect(canvas_rect: egui::Rect) -> egui::Rect {
    let size = egui::vec2(MINIMAP_WIDTH, MINIMAP_HEIGHT);
    egui::Rect::from_min_size(canvas_rect.max - size - egui::vec2(12.0, 12.0), size)
}

fn engine_button(button: egui::PointerButton) -> Option<PointerButton> {
    match button {
        egui::PointerButton::Primary => Some(PointerButton::Primary),
        egui::PointerButton::Middle => Some(PointerButton::Middle),
        egui::PointerButton::Secondary => Some(PointerButton::Secondary),
        _ => None,
    }
}

fn nav_key(key: egui::Key, modifiers: egui::Modifiers) -> Option<NavKey> {
    match key {
        egui::Key::ArrowLeft => Some(NavKey::Left),
        egui::Key::ArrowRight => Some(NavKey::Right),
        egui::Key::ArrowUp => Some(NavKey::Up),
        egui::Key::ArrowDown => Some(NavKey::Down),
        egui::Key::Plus | egui::Key::Equals if modifiers.command => Some(NavKey::ZoomIn),
        egui::Key::Minus if modifiers.command => Some(NavKey::ZoomOut),
        egui::Key::Num0 if modifiers.command => Some(NavKey::ResetZoom),
        egui::Key::Delete | egui::Key::Backspace => Some(NavKey::Delete),
        egui::Key::Escape => Some(NavKey::Escape),
        _ => None,
    }
}

impl CanvasApp {
    /// Allocates the canvas, feeds this frame's input to the engine and paints it.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI to draw into
    pub fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let canvas_rect = response.rect;
        self.canvas_rect = canvas_rect;
        self.engine.set_viewport_size(canvas_rect.size());

        self.handle_pointer_input(ui, canvas_rect);
        self.handle_wheel_input(ui, canvas_rect);

        if self.engine.tick() {
            ui.ctx().request_repaint();
        }

        let frame = FrameSnapshot::capture(&self.engine, canvas_rect);
        self.render_frame(&painter, &frame);
        if self.settings.show_minimap {
            self.draw_minimap(&painter, &frame, minimap_rect(canvas_rect));
        }
    }

    fn to_local(canvas_rect: egui::Rect, pos: egui::Pos2) -> egui::Pos2 {
        pos - canvas_rect.min.to_vec2()
    }

    fn handle_pointer_input(&mut self, ui: &egui::Ui, canvas_rect: egui::Rect) {
        let events = ui.input(|i| i.events.clone());
        let minimap = self.settings.show_minimap.then(|| minimap_rect(canvas_rect));
        for event in events {
            match event {
                egui::Event::PointerMoved(pos) => {
                    if self.engine.has_pointer_capture() || canvas_rect.contains(pos) {
                        let local = Self::to_local(canvas_rect, pos);
                        self.last_pointer = Some(local);
                        self.engine.handle_pointer(PointerEvent::moved(local));
                    }
                }
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed,
                    modifiers,
                } => {
                    let Some(button) = engine_button(button) else {
                        continue;
                    };
                    let local = Self::to_local(canvas_rect, pos);
                    if pressed {
                        if let Some(panel) = minimap.filter(|r| r.contains(pos)) {
                            if button == PointerButton::Primary && !self.engine.has_pointer_capture() {
                                self.navigate_from_minimap(pos - panel.min.to_vec2());
                            }
                            continue;
                        }
                        if !canvas_rect.contains(pos) {
                            continue;
                        }
                        self.engine.handle_pointer(
                            PointerEvent::down(local)
                                .with_button(button)
                                .with_modifiers(modifiers),
                        );
                    } else if self.engine.has_pointer_capture() || canvas_rect.contains(pos) {
                        self.engine.handle_pointer(
                            PointerEvent::up(local)
                                .with_button(button)
                                .with_modifiers(modifiers),
                        );
                    }
                }
                egui::Event::PointerGone => {
                    if self.engine.has_pointer_capture() {
                        let last = self.last_pointer.unwrap_or_default();
                        self.engine.handle_pointer(PointerEvent::leave(last));
                    }
                }
                _ => {}
            }
        }
    }

    fn navigate_from_minimap(&mut self, panel_pos: egui::Pos2) {
        let projection = MinimapProjection::standard(self.engine.board().card_bounds());
        let world = projection.minimap_to_world(panel_pos);
        log::debug!("minimap jump to ({:.0}, {:.0})", world.x, world.y);
        self.engine.center_on(world);
    }

    fn handle_wheel_input(&mut self, ui: &egui::Ui, canvas_rect: egui::Rect) {
        let Some(hover) = ui.input(|i| i.pointer.hover_pos()) else {
            return;
        };
        if !canvas_rect.contains(hover) {
            return;
        }
        let local = Self::to_local(canvas_rect, hover);
        let events = ui.input(|i| i.events.clone());
        for event in events {
            match event {
                egui::Event::MouseWheel { unit, delta, .. } => {
                    let delta = match unit {
                        egui::MouseWheelUnit::Point => delta,
                        egui::MouseWheelUnit::Line => delta * WHEEL_LINE_PIXELS,
                        egui::MouseWheelUnit::Page => delta * canvas_rect.height(),
                    };
                    self.engine.handle_wheel(WheelEvent { delta, pos: local });
                }
                egui::Event::Zoom(factor) if factor != 1.0 => {
                    let direction = if factor > 1.0 { 1.0 } else { -1.0 };
                    self.engine.handle_wheel(WheelEvent {
                        delta: egui::vec2(0.0, direction),
                        pos: local,
                    });
                }
                _ => {}
            }
        }
    }

    /// Handles navigation shortcuts unless a text field has keyboard focus.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context for reading input
    pub fn handle_canvas_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let presses: Vec<(egui::Key, egui::Modifiers)> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|ev| match ev {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } => Some((*key, *modifiers)),
                    _ => None,
                })
                .collect()
        });
        for (key, modifiers) in presses {
            if let Some(nav) = nav_key(key, modifiers) {
                if self.engine.handle_key(nav, modifiers) {
                    ctx.request_repaint();
                }
            }
        }
    }
}
