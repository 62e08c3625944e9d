//! Application state for the canvas UI.
//!
//! Holds the [`CanvasApp`] struct and the user preferences persisted between
//! sessions. Entity and viewport state live in the engine and are not
//! persisted.

use crate::engine::CanvasEngine;
use crate::interaction::Tool;
use crate::types::*;
use eframe::egui;
use serde::{Deserialize, Serialize};

/// Storage key for persisted settings.
pub const SETTINGS_KEY: &str = "canvas_settings";

/// User preferences kept across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether the background grid is drawn
    pub show_grid: bool,
    /// Whether the minimap overlay is drawn
    pub show_minimap: bool,
    /// Whether the navigation panel is shown
    pub show_navigation: bool,
    /// Whether dark mode visuals are enabled
    pub dark_mode: bool,
    /// Tool active at startup
    pub tool: Tool,
    /// Brush for new strokes
    pub brush: Brush,
    /// Remembered width of the properties panel
    pub properties_panel_width: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_minimap: true,
            show_navigation: true,
            dark_mode: false,
            tool: Tool::Select,
            brush: Brush::default(),
            properties_panel_width: 260.0,
        }
    }
}

impl Settings {
    /// Serializes the settings to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes settings from JSON.
    ///
    /// # Arguments
    ///
    /// * `json` - JSON string produced by [`Settings::to_json`]
    ///
    /// # Returns
    ///
    /// The settings, or an error if the text is not valid settings JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Text buffers for the properties panel, so edits are only applied on change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditBuffers {
    /// Card whose tags are being edited
    pub tags_for: Option<CardId>,
    /// Comma-separated tag text
    pub tags_text: String,
}

/// The main application structure: the engine plus presentation state.
///
/// This struct implements the `eframe::App` trait and forwards all input to
/// the [`CanvasEngine`].
pub struct CanvasApp {
    /// The canvas engine
    pub engine: CanvasEngine,
    /// Persisted preferences
    pub settings: Settings,
    /// Properties panel buffers
    pub edit: EditBuffers,
    /// Last pointer position seen inside the canvas, canvas-local
    pub last_pointer: Option<egui::Pos2>,
    /// Last screen rect occupied by the canvas
    pub canvas_rect: egui::Rect,
}

impl Default for CanvasApp {
    fn default() -> Self {
        Self::with_settings(Settings::default())
    }
}

impl CanvasApp {
    /// Creates the app, restoring settings saved by a previous session.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Ctrl/Cmd +/- belong to the canvas, not to egui's UI scale
        cc.egui_ctx.options_mut(|o| o.zoom_with_keyboard = false);
        let settings = cc
            .storage
            .and_then(|storage| storage.get_string(SETTINGS_KEY))
            .and_then(|json| match Settings::from_json(&json) {
                Ok(settings) => Some(settings),
                Err(err) => {
                    log::warn!("ignoring unreadable settings: {err}");
                    None
                }
            })
            .unwrap_or_default();
        Self::with_settings(settings)
    }

    /// Creates the app with explicit settings.
    pub fn with_settings(settings: Settings) -> Self {
        let mut engine = CanvasEngine::new();
        engine.set_tool(settings.tool);
        engine.set_brush(settings.brush);
        Self {
            engine,
            settings,
            edit: EditBuffers::default(),
            last_pointer: None,
            canvas_rect: egui::Rect::NOTHING,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_survive_json() {
        let settings = Settings {
            show_grid: false,
            tool: Tool::Shape(ShapeKind::Star),
            ..Settings::default()
        };
        let restored = Settings::from_json(&settings.to_json().unwrap()).unwrap();
        assert_eq!(restored, settings);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let restored = Settings::from_json(r#"{"dark_mode": true}"#).unwrap();
        assert!(restored.dark_mode);
        assert!(restored.show_grid);
        assert_eq!(restored.tool, Tool::Select);
    }

    #[test]
    fn settings_drive_the_engine() {
        let app = CanvasApp::with_settings(Settings {
            tool: Tool::Draw,
            ..Settings::default()
        });
        assert_eq!(app.engine.tool(), Tool::Draw);
    }
}
