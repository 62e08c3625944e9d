//! # Card Canvas
//!
//! An infinite canvas for knowledge cards. Cards sit on a pannable, zoomable
//! surface, are linked by directional connections and can be annotated with
//! freehand strokes, shapes, text, sticky notes and media placeholders.
//!
//! ## Layout
//! - [`Viewport`] and [`ViewTransform`]: the one world/screen mapping
//! - [`Board`]: cards, connections and free-form elements, with connection
//!   endpoints kept in sync with card geometry
//! - [`CanvasEngine`]: the gesture state machine and navigation actions, the
//!   only writer of viewport and board state
//! - [`FrameSnapshot`]: what every render layer reads for one frame
//! - `ui`: the eframe application

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod board;
pub mod constants;
pub mod curves;
pub mod drawing;
pub mod engine;
pub mod error;
pub mod frame;
pub mod grid;
pub mod interaction;
pub mod minimap;
pub mod momentum;
pub mod solver;
pub mod transform;
mod types;
pub mod viewport;
mod ui;

// Re-export public types and functions
pub use board::{Board, CardHit, CardPatch};
pub use drawing::{DrawingSurface, SketchSurface};
pub use engine::{CanvasEngine, Selection};
pub use error::{CanvasError, CanvasResult};
pub use frame::FrameSnapshot;
pub use interaction::{
    Gesture, NavKey, PointerButton, PointerCapture, PointerEvent, PointerKind, Tool, WheelEvent,
};
pub use transform::ViewTransform;
pub use types::*;
pub use ui::{CanvasApp, Settings};
pub use viewport::Viewport;

/// Runs the canvas application with default window options.
///
/// Previously saved UI settings are restored from eframe's storage.
///
/// # Returns
///
/// Returns `Ok(())` when the window closes normally, or an `eframe::Error` if
/// initialization fails.
///
/// # Example
///
/// ```no_run
/// use card_canvas::run_app;
///
/// fn main() -> Result<(), eframe::Error> {
///     run_app()
/// }
/// ```
pub fn run_app() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Card Canvas",
        options,
        Box::new(|cc| Ok(Box::new(CanvasApp::new(cc)))),
    )
}
