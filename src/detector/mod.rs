//! Signal detectors feeding the protection orchestrator
//!
//! Each detector subscribes to the injected event source and translates raw
//! window events into [`crate::types::SignalEvent`]s sent over a channel.
//! A detector that is switched off in the gallery settings is simply never
//! attached — no dead branches run per event.

mod focus;
mod screenshot;

pub use focus::FocusDetector;
pub use screenshot::{is_screenshot_combo, ScreenshotDetector};
