//! Screenshot-intent detection from keyboard events
//!
//! Recognizes the platform's screenshot key combinations and suppresses
//! their default handling before signalling. Suppression is best-effort: by
//! the time the key event is observed the OS capture may already have
//! happened. That is an accepted limitation of the deterrence model.

use std::sync::mpsc::Sender;
use tracing::{debug, info};

use crate::events::{EventSource, Phase, Propagation, SubscriptionId, UiEvent};
use crate::types::{KeyCode, KeyPress, Platform, SignalEvent};

/// Whether a key-press matches a screenshot combination on this platform.
///
/// - Windows-like: `PrintScreen` (alone or with Meta), `Meta+Shift+S`
/// - Mac-like: `Meta+Shift+3/4/5`
/// - Linux-like: `PrintScreen`, `Shift+PrintScreen`
pub fn is_screenshot_combo(platform: Platform, key: &KeyPress) -> bool {
    match platform {
        Platform::WindowsLike => {
            matches!(key.code, KeyCode::PrintScreen)
                || (key.meta && key.shift && key.code == KeyCode::Character('s'))
        }
        Platform::MacLike => {
            key.meta
                && key.shift
                && matches!(
                    key.code,
                    KeyCode::Character('3') | KeyCode::Character('4') | KeyCode::Character('5')
                )
        }
        Platform::LinuxLike => matches!(key.code, KeyCode::PrintScreen),
    }
}

pub struct ScreenshotDetector;

impl ScreenshotDetector {
    /// Subscribe at the capture phase so suppression precedes default
    /// handling. Non-matching keys pass through untouched.
    pub fn attach(
        source: &mut dyn EventSource,
        platform: Platform,
        signals: Sender<SignalEvent>,
    ) -> SubscriptionId {
        info!(platform = ?platform, "Attaching screenshot detector");
        source.subscribe(
            Phase::Capture,
            Box::new(move |event| {
                let UiEvent::Key(key) = event else {
                    return Propagation::Continue;
                };
                if !is_screenshot_combo(platform, key) {
                    return Propagation::Continue;
                }
                debug!(key = ?key, "Screenshot combination detected");
                // Orchestrator may already be gone during teardown
                let _ = signals.send(SignalEvent::ScreenshotAttempt);
                Propagation::Stop
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::UiEventBus;
    use std::sync::mpsc;

    fn key(code: KeyCode, shift: bool, meta: bool) -> UiEvent {
        UiEvent::Key(KeyPress::new(code, shift, meta))
    }

    fn attach_bus(platform: Platform) -> (UiEventBus, mpsc::Receiver<SignalEvent>) {
        let mut bus = UiEventBus::new();
        let (tx, rx) = mpsc::channel();
        ScreenshotDetector::attach(&mut bus, platform, tx);
        (bus, rx)
    }

    #[test]
    fn windows_meta_shift_s_triggers_once_and_suppresses() {
        let (mut bus, rx) = attach_bus(Platform::WindowsLike);

        let verdict = bus.dispatch(&key(KeyCode::Character('s'), true, true));

        assert_eq!(verdict, Propagation::Stop);
        assert_eq!(rx.try_recv(), Ok(SignalEvent::ScreenshotAttempt));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn windows_print_screen_variants_trigger() {
        let (mut bus, rx) = attach_bus(Platform::WindowsLike);

        assert_eq!(
            bus.dispatch(&key(KeyCode::PrintScreen, false, false)),
            Propagation::Stop
        );
        assert_eq!(
            bus.dispatch(&key(KeyCode::PrintScreen, false, true)),
            Propagation::Stop
        );
        assert_eq!(rx.try_recv(), Ok(SignalEvent::ScreenshotAttempt));
        assert_eq!(rx.try_recv(), Ok(SignalEvent::ScreenshotAttempt));
    }

    #[test]
    fn mac_capture_combos_trigger() {
        let (mut bus, rx) = attach_bus(Platform::MacLike);

        for digit in ['3', '4', '5'] {
            assert_eq!(
                bus.dispatch(&key(KeyCode::Character(digit), true, true)),
                Propagation::Stop
            );
            assert_eq!(rx.try_recv(), Ok(SignalEvent::ScreenshotAttempt));
        }
    }

    #[test]
    fn mac_combo_does_not_trigger_on_windows() {
        let (mut bus, rx) = attach_bus(Platform::WindowsLike);

        let verdict = bus.dispatch(&key(KeyCode::Character('4'), true, true));

        assert_eq!(verdict, Propagation::Continue);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn linux_print_screen_with_and_without_shift() {
        let (mut bus, rx) = attach_bus(Platform::LinuxLike);

        assert_eq!(
            bus.dispatch(&key(KeyCode::PrintScreen, false, false)),
            Propagation::Stop
        );
        assert_eq!(
            bus.dispatch(&key(KeyCode::PrintScreen, true, false)),
            Propagation::Stop
        );
        assert_eq!(rx.try_recv(), Ok(SignalEvent::ScreenshotAttempt));
        assert_eq!(rx.try_recv(), Ok(SignalEvent::ScreenshotAttempt));
    }

    #[test]
    fn unrelated_keys_pass_through() {
        let (mut bus, rx) = attach_bus(Platform::MacLike);

        assert_eq!(
            bus.dispatch(&key(KeyCode::Character('a'), false, false)),
            Propagation::Continue
        );
        // Meta+Shift without a capture digit
        assert_eq!(
            bus.dispatch(&key(KeyCode::Character('s'), true, true)),
            Propagation::Continue
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn non_key_events_are_ignored() {
        let (mut bus, rx) = attach_bus(Platform::LinuxLike);
        assert_eq!(
            bus.dispatch(&UiEvent::WindowFocus(false)),
            Propagation::Continue
        );
        assert!(rx.try_recv().is_err());
    }
}
