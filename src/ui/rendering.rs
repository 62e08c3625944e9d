//! Canvas rendering: grid, elements, connections, cards, previews and minimap.
//!
//! Every routine reads the same [`FrameSnapshot`]; none of them derive their
//! own transform.

use super::state::CanvasApp;
use crate::constants::*;
use crate::curves::{self, Marker};
use crate::drawing::shape_outline;
use crate::engine::Selection;
use crate::frame::FrameSnapshot;
use crate::types::*;
use eframe::egui;
use egui::StrokeKind;

fn text_color(dark: bool) -> egui::Color32 {
    if dark {
        egui::Color32::from_gray(220)
    } else {
        egui::Color32::from_gray(40)
    }
}

fn highlight() -> egui::Color32 {
    egui::Color32::from_rgb(100, 150, 255)
}

impl CanvasApp {
    /// Paints every layer of the canvas for one frame.
    ///
    /// Layers are drawn back to front: grid, free-form elements, connections,
    /// stroke preview, cards, then the connection preview.
    ///
    /// # Arguments
    ///
    /// * `painter` - Painter clipped to the canvas
    /// * `frame` - The frame snapshot
    pub fn render_frame(&self, painter: &egui::Painter, frame: &FrameSnapshot<'_>) {
        let background = if self.settings.dark_mode {
            egui::Color32::from_gray(24)
        } else {
            egui::Color32::from_gray(248)
        };
        painter.rect_filled(frame.canvas_rect, 0.0, background);

        if self.settings.show_grid {
            self.draw_grid(painter, frame);
        }
        for element in frame.board.elements_by_layer() {
            if frame.is_visible(element.rect().expand(1.0)) {
                self.draw_element(painter, frame, element);
            }
        }
        for connection in frame.board.connections() {
            self.draw_connection(painter, frame, connection);
        }
        if let Some((points, brush)) = frame.stroke_preview {
            let screen: Vec<egui::Pos2> = points.iter().map(|p| frame.transform.to_screen(*p)).collect();
            painter.add(egui::Shape::line(
                screen,
                egui::Stroke::new(frame.transform.scale(brush.size), brush.color),
            ));
        }
        for card in frame.board.cards() {
            if frame.is_visible(card.rect()) {
                self.draw_card(painter, frame, card);
            }
        }
        if let Some((from, to)) = frame.connection_preview {
            let stroke = egui::Stroke::new(2.0, highlight());
            painter.extend(egui::Shape::dashed_line(
                &[frame.transform.to_screen(from), frame.transform.to_screen(to)],
                stroke,
                6.0,
                4.0,
            ));
        }
    }

    /// Draws the adaptive background grid and the origin cross.
    pub fn draw_grid(&self, painter: &egui::Painter, frame: &FrameSnapshot<'_>) {
        let rect = frame.canvas_rect;
        let grid = &frame.grid;
        let base = text_color(self.settings.dark_mode);
        let minor = egui::Stroke::new(1.0, base.gamma_multiply(grid.minor_alpha * 0.4));
        let major = egui::Stroke::new(1.0, base.gamma_multiply(grid.major_alpha));

        for x in grid.minor_lines(grid.offset.x, rect.width()) {
            painter.vline(rect.min.x + x, rect.y_range(), minor);
        }
        for y in grid.minor_lines(grid.offset.y, rect.height()) {
            painter.hline(rect.x_range(), rect.min.y + y, minor);
        }
        for x in grid.major_lines(grid.major_offset.x, rect.width()) {
            painter.vline(rect.min.x + x, rect.y_range(), major);
        }
        for y in grid.major_lines(grid.major_offset.y, rect.height()) {
            painter.hline(rect.x_range(), rect.min.y + y, major);
        }

        if grid.show_origin {
            let origin = frame.transform.to_screen(egui::Pos2::ZERO);
            if rect.contains(origin) {
                let stroke = egui::Stroke::new(1.5, egui::Color32::from_rgb(220, 80, 80));
                painter.hline(origin.x - 8.0..=origin.x + 8.0, origin.y, stroke);
                painter.vline(origin.x, origin.y - 8.0..=origin.y + 8.0, stroke);
            }
        }
    }

    fn draw_connection(&self, painter: &egui::Painter, frame: &FrameSnapshot<'_>, connection: &Connection) {
        let style = &connection.style;
        let path: Vec<egui::Pos2> = curves::connection_path(
            connection.from_position,
            connection.to_position,
            style.curve,
        )
        .into_iter()
        .map(|p| frame.transform.to_screen(p))
        .collect();

        let selected = frame.selection == Selection::Connection(connection.id);
        let color = if selected { highlight() } else { style.color };
        let stroke = egui::Stroke::new(frame.transform.scale(style.stroke_width).max(1.0), color);
        match style.dash {
            Some((dash, gap)) => painter.extend(egui::Shape::dashed_line(
                &path,
                stroke,
                frame.transform.scale(dash),
                frame.transform.scale(gap),
            )),
            None => {
                painter.add(egui::Shape::line(path.clone(), stroke));
            }
        }

        for marker in curves::markers(&path, style.arrow, frame.transform.scale(ARROW_LENGTH)) {
            match marker {
                Marker::Polygon(points) => {
                    painter.add(egui::Shape::convex_polygon(points, color, egui::Stroke::NONE));
                }
                Marker::Circle { center, radius } => {
                    painter.circle_filled(center, radius, color);
                }
            }
        }
    }

    fn draw_card(&self, painter: &egui::Painter, frame: &FrameSnapshot<'_>, card: &Card) {
        let rect = frame.to_screen_rect(card.rect());
        let zoom = frame.transform.zoom;
        let radius = CARD_CORNER_RADIUS * zoom.min(1.0);
        let dark = self.settings.dark_mode;
        let fill = if dark {
            egui::Color32::from_gray(40)
        } else {
            egui::Color32::WHITE
        };
        let selected = frame.selection == Selection::Card(card.id);
        let border = if selected {
            egui::Stroke::new(2.0, highlight())
        } else {
            egui::Stroke::new(1.0, card.color.color32())
        };

        painter.rect_filled(rect, radius, fill);
        let accent = egui::Rect::from_min_max(rect.min, egui::pos2(rect.max.x, rect.min.y + 4.0 * zoom.max(0.5)));
        painter.rect_filled(accent, radius, card.color.color32());
        painter.rect_stroke(rect, radius, border, StrokeKind::Inside);

        // Text becomes unreadable below a few pixels; skip it entirely
        let title_size = 16.0 * zoom;
        if title_size >= 4.0 {
            let inner = rect.shrink(12.0 * zoom);
            let clipped = painter.with_clip_rect(rect.intersect(frame.canvas_rect));
            let title = clipped.layout(
                card.title.clone(),
                egui::FontId::proportional(title_size),
                text_color(dark),
                inner.width(),
            );
            let title_height = title.size().y;
            clipped.galley(inner.min, title, text_color(dark));

            let body = clipped.layout(
                card.content.clone(),
                egui::FontId::proportional(13.0 * zoom),
                text_color(dark).gamma_multiply(0.8),
                inner.width(),
            );
            clipped.galley(
                inner.min + egui::vec2(0.0, title_height + 8.0 * zoom),
                body,
                text_color(dark),
            );

            if !card.tags.is_empty() {
                let tags = card
                    .tags
                    .iter()
                    .map(|t| format!("#{t}"))
                    .collect::<Vec<_>>()
                    .join("  ");
                clipped.text(
                    egui::pos2(inner.min.x, inner.max.y),
                    egui::Align2::LEFT_BOTTOM,
                    tags,
                    egui::FontId::proportional(11.0 * zoom),
                    card.color.color32(),
                );
            }
        }

        if selected {
            let half = HANDLE_HIT_SIZE * 0.35;
            for handle in ResizeHandle::ALL {
                let center = frame.transform.to_screen(card.handle_position(handle));
                let r = egui::Rect::from_center_size(center, egui::Vec2::splat(half * 2.0));
                painter.rect_filled(r, 1.0, fill);
                painter.rect_stroke(r, 1.0, egui::Stroke::new(1.0, highlight()), StrokeKind::Inside);
            }
        }
    }

    fn draw_element(&self, painter: &egui::Painter, frame: &FrameSnapshot<'_>, element: &CanvasElement) {
        let rect = frame.to_screen_rect(element.rect());
        let zoom = frame.transform.zoom;
        let dark = self.settings.dark_mode;
        match &element.kind {
            ElementKind::Drawing { points, brush } => {
                let screen = points
                    .iter()
                    .map(|p| frame.transform.to_screen(element.position + p.to_vec2()))
                    .collect();
                painter.add(egui::Shape::line(
                    screen,
                    egui::Stroke::new(frame.transform.scale(brush.size), brush.color),
                ));
            }
            ElementKind::Shape {
                shape,
                fill,
                stroke,
                stroke_width,
                opacity,
            } => {
                let outline = shape_outline(*shape, rect);
                let fill = fill.gamma_multiply(*opacity);
                let stroke = egui::Stroke::new(
                    frame.transform.scale(*stroke_width),
                    stroke.gamma_multiply(*opacity),
                );
                match shape {
                    ShapeKind::Star | ShapeKind::Arrow => {
                        let kernel = match shape {
                            ShapeKind::Arrow => egui::pos2(rect.min.x + rect.width() * 0.62, rect.center().y),
                            _ => rect.center(),
                        };
                        painter.add(fan_fill(&outline, kernel, fill));
                        painter.add(egui::Shape::closed_line(outline, stroke));
                    }
                    _ => {
                        painter.add(egui::Shape::convex_polygon(outline, fill, stroke));
                    }
                }
            }
            ElementKind::Text { text, font_size } => {
                painter.text(
                    rect.min,
                    egui::Align2::LEFT_TOP,
                    text,
                    egui::FontId::proportional(font_size * zoom),
                    text_color(dark),
                );
            }
            ElementKind::StickyNote { text, color } => {
                painter.rect_filled(rect, 2.0, *color);
                let galley = painter.layout(
                    text.clone(),
                    egui::FontId::proportional(14.0 * zoom),
                    egui::Color32::from_gray(40),
                    (rect.width() - 16.0 * zoom).max(1.0),
                );
                painter.galley(rect.min + egui::Vec2::splat(8.0 * zoom), galley, egui::Color32::from_gray(40));
            }
            ElementKind::Image { src, alt } => self.draw_placeholder(painter, rect, zoom, "Image", if alt.is_empty() { src } else { alt }),
            ElementKind::Video { src } => self.draw_placeholder(painter, rect, zoom, "Video", src),
            ElementKind::Pdf { src, title } => {
                self.draw_placeholder(painter, rect, zoom, "PDF", if title.is_empty() { src } else { title })
            }
            ElementKind::Link { url, title, .. } => {
                self.draw_placeholder(painter, rect, zoom, "Link", if title.is_empty() { url } else { title })
            }
        }

        if frame.selection == Selection::Element(element.id) {
            painter.rect_stroke(
                rect.expand(3.0),
                2.0,
                egui::Stroke::new(1.5, highlight()),
                StrokeKind::Outside,
            );
        }
    }

    fn draw_placeholder(&self, painter: &egui::Painter, rect: egui::Rect, zoom: f32, kind: &str, caption: &str) {
        let dark = self.settings.dark_mode;
        painter.rect_filled(rect, 4.0, text_color(!dark));
        painter.rect_stroke(rect, 4.0, egui::Stroke::new(1.0, text_color(dark)), StrokeKind::Inside);
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            format!("{kind}: {caption}"),
            egui::FontId::proportional(12.0 * zoom),
            text_color(dark),
        );
    }

    /// Draws the minimap overlay into `panel`.
    pub fn draw_minimap(&self, painter: &egui::Painter, frame: &FrameSnapshot<'_>, panel: egui::Rect) {
        let dark = self.settings.dark_mode;
        painter.rect_filled(panel, 4.0, text_color(!dark).gamma_multiply(0.9));
        painter.rect_stroke(panel, 4.0, egui::Stroke::new(1.0, text_color(dark).gamma_multiply(0.4)), StrokeKind::Inside);

        let to_panel = |r: egui::Rect| frame.minimap.rect_to_minimap(r).translate(panel.min.to_vec2());
        let clipped = painter.with_clip_rect(panel);
        for card in frame.board.cards() {
            clipped.rect_filled(to_panel(card.rect()), 1.0, card.color.color32());
        }
        clipped.rect_stroke(
            frame.minimap_viewport.translate(panel.min.to_vec2()),
            0.0,
            egui::Stroke::new(1.5, highlight()),
            StrokeKind::Inside,
        );
    }
}

/// Fills a star-shaped polygon as a triangle fan around `kernel`.
fn fan_fill(points: &[egui::Pos2], kernel: egui::Pos2, color: egui::Color32) -> egui::Shape {
    let mut mesh = egui::Mesh::default();
    mesh.colored_vertex(kernel, color);
    for p in points {
        mesh.colored_vertex(*p, color);
    }
    let n = points.len() as u32;
    for i in 0..n {
        mesh.add_triangle(0, 1 + i, 1 + (i + 1) % n);
    }
    egui::Shape::mesh(mesh)
}
