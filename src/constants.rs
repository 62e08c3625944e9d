//! Shared application-wide constants.
//! Centralizes tweakable values used by the canvas engine and the UI layers.

// Viewport
/// Smallest zoom factor the viewport accepts.
pub const MIN_ZOOM: f32 = 0.01;
/// Largest zoom factor the viewport accepts.
pub const MAX_ZOOM: f32 = 100.0;
/// Half-extent (in world units) of the virtual rectangle the viewport may show.
pub const PAN_WORLD_LIMIT: f32 = 50_000.0;
/// Multiplicative zoom applied per wheel notch when scrolling up.
pub const WHEEL_ZOOM_IN: f32 = 1.1;
/// Multiplicative zoom applied per wheel notch when scrolling down.
pub const WHEEL_ZOOM_OUT: f32 = 0.9;
/// Multiplicative step used by the zoom in/out buttons.
pub const BUTTON_ZOOM_STEP: f32 = 1.2;
/// Additive zoom step for `+`/`-` keys.
pub const KEY_ZOOM_STEP: f32 = 0.2;
/// Additive zoom step for `+`/`-` keys with Ctrl/Cmd held.
pub const KEY_ZOOM_STEP_FINE: f32 = 0.1;
/// Screen pixels panned per arrow key press.
pub const KEY_PAN_STEP: f32 = 50.0;

// Fit to content
/// Padding (in world units) added on every side of the content when fitting.
pub const FIT_PADDING: f32 = 50.0;
/// Fitting never zooms in beyond this factor.
pub const MAX_FIT_ZOOM: f32 = 3.0;

// Cards
/// Default card width in world units.
pub const CARD_DEFAULT_WIDTH: f32 = 320.0;
/// Default card height in world units.
pub const CARD_DEFAULT_HEIGHT: f32 = 240.0;
/// Minimum card width in world units.
pub const CARD_MIN_WIDTH: f32 = 200.0;
/// Minimum card height in world units.
pub const CARD_MIN_HEIGHT: f32 = 150.0;
/// Maximum card width in world units.
pub const CARD_MAX_WIDTH: f32 = 800.0;
/// Maximum card height in world units.
pub const CARD_MAX_HEIGHT: f32 = 600.0;
/// Maximum random offset (world units) applied to newly placed cards.
pub const CARD_PLACEMENT_JITTER: f32 = 40.0;
/// Side length of a resize handle's hit box, in screen pixels.
pub const HANDLE_HIT_SIZE: f32 = 12.0;
/// Corner radius used when painting cards (screen pixels at zoom 1).
pub const CARD_CORNER_RADIUS: f32 = 8.0;
/// Click distance (screen pixels) within which a connection is selected.
pub const CONNECTION_HIT_TOLERANCE: f32 = 6.0;
/// Extra hit margin (screen pixels) around free-form elements.
pub const ELEMENT_HIT_TOLERANCE: f32 = 4.0;

// Grid
/// Grid spacing in world units before readability adjustment.
pub const GRID_BASE_SPACING: f32 = 50.0;
/// Smallest on-screen spacing between grid lines, in pixels.
pub const GRID_MIN_SCREEN_SPACING: f32 = 10.0;
/// Largest on-screen spacing between grid lines, in pixels.
pub const GRID_MAX_SCREEN_SPACING: f32 = 100.0;
/// Number of minor cells between major grid lines.
pub const GRID_MAJOR_EVERY: f32 = 5.0;
/// Origin marker is only drawn above this zoom.
pub const GRID_ORIGIN_MIN_ZOOM: f32 = 0.1;

// Momentum
/// Per-frame velocity decay applied after a pan gesture is released.
pub const MOMENTUM_FRICTION: f32 = 0.92;
/// Momentum stops once the velocity magnitude drops below this (pixels/frame).
pub const MOMENTUM_STOP_THRESHOLD: f32 = 0.1;
/// Release velocity (pixels/frame, per axis) required to start momentum.
pub const MOMENTUM_START_THRESHOLD: f32 = 1.0;

// Connections
/// Length of arrow heads in world units.
pub const ARROW_LENGTH: f32 = 15.0;
/// Half opening angle of arrow heads.
pub const ARROW_HALF_ANGLE: f32 = std::f32::consts::PI / 6.0;
/// Number of segments in a zigzag connection.
pub const ZIGZAG_SEGMENTS: usize = 8;
/// Amplitude of zigzag connections in world units.
pub const ZIGZAG_AMPLITUDE: f32 = 10.0;
/// Samples used to flatten bezier connections.
pub const BEZIER_SAMPLES: usize = 24;

// Drawing
/// Minimum distance (world units) between consecutive recorded stroke points.
pub const STROKE_MIN_POINT_DISTANCE: f32 = 1.5;
/// Default size (world units) of a shape placed with a single click.
pub const SHAPE_DEFAULT_SIZE: f32 = 120.0;
/// Default size (world units) of sticky notes.
pub const STICKY_NOTE_SIZE: f32 = 200.0;

// Minimap
/// Minimap panel width in screen pixels.
pub const MINIMAP_WIDTH: f32 = 200.0;
/// Minimap panel height in screen pixels.
pub const MINIMAP_HEIGHT: f32 = 150.0;
/// Padding (world units) around content shown in the minimap.
pub const MINIMAP_CONTENT_PADDING: f32 = 200.0;
/// Half-extent of the world box shown by an empty minimap.
pub const MINIMAP_EMPTY_EXTENT: f32 = 500.0;
/// Fraction of the minimap filled by the content box.
pub const MINIMAP_FILL: f32 = 0.8;
