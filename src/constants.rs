//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Watermark compositing constants
pub mod watermark {
    /// Watermark font size as a fraction of the surface's larger dimension
    pub const FONT_SCALE: f32 = 0.05;

    /// Horizontal inset of corner anchors, in multiples of the font size
    pub const CORNER_INSET_X: f32 = 2.0;

    /// Vertical inset of corner and edge-center anchors, in multiples of the font size
    pub const CORNER_INSET_Y: f32 = 1.5;

    /// Default watermark text when the manifest omits it
    pub const DEFAULT_TEXT: &str = "\u{a9} Protected";

    /// Default watermark opacity
    pub const DEFAULT_OPACITY: f32 = 0.3;
}

/// Protection state machine constants
pub mod protection {
    /// Dwell time of the violation flash overlay before auto-dismissal
    pub const FLASH_DWELL_MS: u64 = 2000;

    /// Box blur radius applied to the obscured surface, in pixels
    pub const BLUR_RADIUS: usize = 10;

    /// Blur passes (repeated box blur approximates a gaussian)
    pub const BLUR_PASSES: usize = 2;
}

/// Viewer window geometry and timing
pub mod viewer {
    /// Initial window width in logical points
    pub const WINDOW_WIDTH: f32 = 1100.0;

    /// Initial window height in logical points
    pub const WINDOW_HEIGHT: f32 = 800.0;

    /// Minimum window width in logical points
    pub const WINDOW_MIN_WIDTH: f32 = 480.0;

    /// Minimum window height in logical points
    pub const WINDOW_MIN_HEIGHT: f32 = 360.0;

    /// Repaint interval while an overlay dwell or image load is pending
    pub const REPAINT_INTERVAL_MS: u64 = 100;

    /// Vertical padding between viewer sections in logical points
    pub const SECTION_SPACING: f32 = 8.0;
}

/// Image loading limits
pub mod net {
    /// Total timeout for a single image fetch
    pub const LOAD_TIMEOUT_SECS: u64 = 30;

    /// Upper bound on a decoded image dimension, in pixels
    pub const MAX_IMAGE_DIMENSION: u32 = 16384;
}

/// Manifest location constants
pub mod config {
    /// Directory under the user config dir holding viewer files
    pub const APP_DIR: &str = "shutterlock";

    /// Default gallery manifest filename
    pub const FILENAME: &str = "gallery.json";
}
