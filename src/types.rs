//! Shared types for the protection layer

/// Pixel dimensions of a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Larger of the two dimensions, as used for watermark font sizing
    pub fn max_side(&self) -> u32 {
        self.width.max(self.height)
    }
}

/// Visual state owned by the protection orchestrator.
/// Exactly one state is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    /// Surface shown as rendered
    #[default]
    Normal,
    /// Surface blurred because the viewing window is not in the foreground
    Obscured,
    /// Short-lived overlay after a detected screenshot attempt
    ViolationFlash,
}

/// Logical signal emitted by a detector, consumed by the orchestrator.
/// Ephemeral: carried on a channel, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    FocusLost,
    FocusGained,
    ScreenshotAttempt,
    ContextMenuAttempt,
    DragAttempt,
}

/// Key identity relevant to screenshot detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    PrintScreen,
    /// Printable key, normalized to lowercase
    Character(char),
}

/// A single key-press with the modifier state at press time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub code: KeyCode,
    pub shift: bool,
    pub meta: bool,
}

impl KeyPress {
    pub fn new(code: KeyCode, shift: bool, meta: bool) -> Self {
        Self { code, shift, meta }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, false, false)
    }
}

/// OS family the viewer is running on, derived from the build target.
/// Not user-configurable: screenshot key combinations are an OS property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    WindowsLike,
    MacLike,
    LinuxLike,
}

impl Platform {
    pub fn detect() -> Self {
        if cfg!(target_os = "windows") {
            Platform::WindowsLike
        } else if cfg!(target_os = "macos") {
            Platform::MacLike
        } else {
            Platform::LinuxLike
        }
    }
}
