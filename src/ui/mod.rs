//! User interface components for the card canvas.
//!
//! # Module Organization
//!
//! - `state` - Persisted settings and the main `CanvasApp` struct
//! - `canvas` - Input translation from egui events to engine events
//! - `rendering` - Drawing grid, elements, connections, cards and the minimap

mod canvas;
mod rendering;
mod state;


pub use state::{CanvasApp, Settings};

use self::state::SETTINGS_KEY;
use crate::board::CardPatch;
use crate::engine::Selection;
use crate::interaction::Tool;
use crate::types::*;
use eframe::egui;

impl eframe::App for CanvasApp {
    /// Persist UI preferences between restarts.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.settings.tool = self.engine.tool();
        self.settings.brush = self.engine.brush();
        match self.settings.to_json() {
            Ok(json) => {
                storage.set_string(SETTINGS_KEY, json);
            }
            Err(err) => {
                log::error!("Failed to serialize settings: {err}");
            }
        }
    }

    /// Main update function called by egui for each frame.
    ///
    /// Lays out the toolbar, the properties panel and the canvas, and routes
    /// keyboard shortcuts to the engine.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context
    /// * `_frame` - The eframe frame
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let visuals = if self.settings.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        self.handle_canvas_keys(ctx);

        egui::TopBottomPanel::top("top_toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        let viewport_width = ctx.input(|i| i.content_rect().width());
        let max_width = (viewport_width * 0.5).max(180.0);
        egui::SidePanel::right("properties_panel")
            .resizable(true)
            .default_width(self.settings.properties_panel_width.clamp(180.0, max_width))
            .show(ctx, |ui| {
                self.settings.properties_panel_width = ui.available_width().clamp(180.0, max_width);
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.draw_properties_panel(ui);
                    if self.settings.show_navigation {
                        ui.separator();
                        self.draw_navigation_panel(ui);
                    }
                });
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.draw_canvas(ui);
            });
    }
}

impl CanvasApp {
    /// Renders the toolbar: tools, card creation, zoom readout and view toggles.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI context
    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            let current = self.engine.tool();
            for tool in [
                Tool::Select,
                Tool::Pan,
                Tool::Connect,
                Tool::Draw,
                Tool::Highlighter,
                Tool::Text,
                Tool::StickyNote,
            ] {
                if ui.selectable_label(current == tool, tool.label()).clicked() {
                    self.engine.set_tool(tool);
                }
            }

            let shape = match current {
                Tool::Shape(kind) => Some(kind),
                _ => None,
            };
            egui::ComboBox::from_id_salt("shape_tool")
                .selected_text(shape.map_or("Shape".to_string(), |k| format!("{k:?}")))
                .show_ui(ui, |ui| {
                    for kind in [
                        ShapeKind::Rectangle,
                        ShapeKind::Circle,
                        ShapeKind::Triangle,
                        ShapeKind::Hexagon,
                        ShapeKind::Star,
                        ShapeKind::Arrow,
                    ] {
                        if ui.selectable_label(shape == Some(kind), format!("{kind:?}")).clicked() {
                            self.engine.set_tool(Tool::Shape(kind));
                        }
                    }
                });

            if matches!(current, Tool::Draw | Tool::Highlighter) {
                let mut brush = self.engine.brush();
                let before = brush;
                ui.add(egui::Slider::new(&mut brush.size, 1.0..=20.0).text("size"));
                ui.color_edit_button_srgba(&mut brush.color);
                if brush != before {
                    self.engine.set_brush(brush);
                }
            }

            ui.separator();

            if ui.button("Add Card").clicked() {
                self.engine.add_card();
            }

            ui.separator();

            if ui.button("−").on_hover_text("Zoom out").clicked() {
                self.engine.zoom_out();
            }
            ui.label(format!("{}%", self.engine.viewport().zoom_percent()));
            if ui.button("+").on_hover_text("Zoom in").clicked() {
                self.engine.zoom_in();
            }
            if ui.button("Fit").on_hover_text("Fit all content").clicked() {
                self.engine.fit_all();
            }
            if ui.button("Center").clicked() {
                self.engine.center_view();
            }
            if ui.button("100%").on_hover_text("Reset zoom").clicked() {
                self.engine.reset_zoom();
            }

            ui.separator();

            ui.checkbox(&mut self.settings.show_grid, "Grid");
            ui.checkbox(&mut self.settings.show_minimap, "Minimap");
            ui.checkbox(&mut self.settings.dark_mode, "Dark");
        });
    }

    /// Renders the property editor for whatever is selected.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI context
    fn draw_properties_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Properties");
        match self.engine.selection() {
            Selection::None => {
                ui.label("Nothing selected");
                ui.label(format!(
                    "{} cards, {} connections, {} elements",
                    self.engine.board().cards().len(),
                    self.engine.board().connections().len(),
                    self.engine.board().elements().len()
                ));
            }
            Selection::Card(id) => self.draw_card_properties(ui, id),
            Selection::Connection(id) => self.draw_connection_properties(ui, id),
            Selection::Element(id) => self.draw_element_properties(ui, id),
        }
    }

    fn draw_card_properties(&mut self, ui: &mut egui::Ui, id: CardId) {
        let Some(card) = self.engine.board().card(id).cloned() else {
            return;
        };
        let mut patch = CardPatch::default();

        ui.label("Title");
        let mut title = card.title.clone();
        if ui.text_edit_singleline(&mut title).changed() {
            patch.title = Some(title);
        }

        ui.label("Content");
        let mut content = card.content.clone();
        if ui
            .add(egui::TextEdit::multiline(&mut content).desired_rows(6))
            .changed()
        {
            patch.content = Some(content);
        }

        ui.label("Tags (comma separated)");
        if self.edit.tags_for != Some(id) {
            self.edit.tags_for = Some(id);
            self.edit.tags_text = card.tags.join(", ");
        }
        if ui.text_edit_singleline(&mut self.edit.tags_text).changed() {
            patch.tags = Some(
                self.edit
                    .tags_text
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect(),
            );
        }

        ui.horizontal(|ui| {
            for color in CardColor::ALL {
                let (rect, response) = ui.allocate_exact_size(egui::vec2(18.0, 18.0), egui::Sense::click());
                ui.painter().rect_filled(rect, 3.0, color.color32());
                if color == card.color {
                    ui.painter().rect_stroke(
                        rect.expand(2.0),
                        3.0,
                        egui::Stroke::new(2.0, ui.visuals().strong_text_color()),
                        egui::StrokeKind::Outside,
                    );
                }
                if response.on_hover_text(format!("{color:?}")).clicked() {
                    patch.color = Some(color);
                }
            }
        });

        ui.label(format!(
            "Position ({:.0}, {:.0})  Size {:.0} × {:.0}",
            card.position.x, card.position.y, card.size.x, card.size.y
        ));

        if patch != CardPatch::default() {
            if let Err(err) = self.engine.update_card(id, patch) {
                log::debug!("card edit dropped: {err}");
            }
        }
        if ui.button("Delete card").clicked() {
            self.engine.delete_selected();
        }
    }

    fn draw_connection_properties(&mut self, ui: &mut egui::Ui, id: ConnectionId) {
        let Some(connection) = self.engine.board().connection(id) else {
            return;
        };
        let original = connection.style.clone();
        let mut style = original.clone();

        egui::ComboBox::from_label("Curve")
            .selected_text(format!("{:?}", style.curve))
            .show_ui(ui, |ui| {
                for curve in [CurveKind::Straight, CurveKind::Bezier, CurveKind::Orthogonal, CurveKind::Zigzag] {
                    ui.selectable_value(&mut style.curve, curve, format!("{curve:?}"));
                }
            });
        egui::ComboBox::from_label("Arrow")
            .selected_text(format!("{:?}", style.arrow))
            .show_ui(ui, |ui| {
                for arrow in [ArrowKind::None, ArrowKind::Arrow, ArrowKind::Double, ArrowKind::Diamond, ArrowKind::Circle] {
                    ui.selectable_value(&mut style.arrow, arrow, format!("{arrow:?}"));
                }
            });
        ui.add(egui::Slider::new(&mut style.stroke_width, 1.0..=10.0).text("Width"));
        ui.horizontal(|ui| {
            ui.label("Color");
            ui.color_edit_button_srgba(&mut style.color);
        });
        let mut dashed = style.dash.is_some();
        if ui.checkbox(&mut dashed, "Dashed").changed() {
            style.dash = dashed.then_some((8.0, 4.0));
        }

        if style != original {
            if let Err(err) = self.engine.restyle_connection(id, style.clone()) {
                log::debug!("style edit dropped: {err}");
            }
            self.engine.set_connection_style(style);
        }
        if ui.button("Delete connection").clicked() {
            self.engine.delete_selected();
        }
    }

    fn draw_element_properties(&mut self, ui: &mut egui::Ui, id: ElementId) {
        let Some(element) = self.engine.board().element(id).cloned() else {
            return;
        };
        ui.label(format!("Element: {}", element.kind.label()));

        let mut kind = element.kind.clone();
        match &mut kind {
            ElementKind::Text { text, font_size } => {
                ui.text_edit_singleline(text);
                ui.add(egui::Slider::new(font_size, 8.0..=96.0).text("Font size"));
            }
            ElementKind::StickyNote { text, color } => {
                ui.add(egui::TextEdit::multiline(text).desired_rows(4));
                ui.color_edit_button_srgba(color);
            }
            ElementKind::Image { src, alt } => {
                ui.text_edit_singleline(src);
                ui.text_edit_singleline(alt);
            }
            ElementKind::Video { src } => {
                ui.text_edit_singleline(src);
            }
            ElementKind::Pdf { src, title } => {
                ui.text_edit_singleline(src);
                ui.text_edit_singleline(title);
            }
            ElementKind::Link { url, title, description } => {
                ui.text_edit_singleline(url);
                ui.text_edit_singleline(title);
                ui.text_edit_multiline(description);
            }
            ElementKind::Shape { fill, stroke, opacity, .. } => {
                ui.horizontal(|ui| {
                    ui.label("Fill");
                    ui.color_edit_button_srgba(fill);
                    ui.label("Outline");
                    ui.color_edit_button_srgba(stroke);
                });
                ui.add(egui::Slider::new(opacity, 0.1..=1.0).text("Opacity"));
            }
            ElementKind::Drawing { .. } => {}
        }
        if kind != element.kind {
            if let Err(err) = self.engine.update_element(id, kind) {
                log::debug!("element edit dropped: {err}");
            }
        }

        let mut layer = element.layer;
        if ui.add(egui::DragValue::new(&mut layer).prefix("Layer ")).changed() {
            if let Err(err) = self.engine.set_element_layer(id, layer) {
                log::debug!("layer change dropped: {err}");
            }
        }
        if ui.button("Delete element").clicked() {
            self.engine.delete_selected();
        }
    }

    /// Renders the navigation pad: arrow panning and zoom controls.
    fn draw_navigation_panel(&mut self, ui: &mut egui::Ui) {
        use crate::interaction::NavKey;
        ui.heading("Navigation");
        let none = egui::Modifiers::NONE;
        ui.horizontal(|ui| {
            ui.add_space(28.0);
            if ui.button("⏶").clicked() {
                self.engine.handle_key(NavKey::Up, none);
            }
        });
        ui.horizontal(|ui| {
            if ui.button("⏴").clicked() {
                self.engine.handle_key(NavKey::Left, none);
            }
            if ui.button("⌂").on_hover_text("Center view").clicked() {
                self.engine.center_view();
            }
            if ui.button("⏵").clicked() {
                self.engine.handle_key(NavKey::Right, none);
            }
        });
        ui.horizontal(|ui| {
            ui.add_space(28.0);
            if ui.button("⏷").clicked() {
                self.engine.handle_key(NavKey::Down, none);
            }
        });
        let vp = self.engine.viewport();
        ui.label(format!(
            "Zoom {}%  Pan ({:.0}, {:.0})",
            vp.zoom_percent(),
            vp.pan().x,
            vp.pan().y
        ));
    }
}
