//! Protection orchestrator
//!
//! Owns the visual protection state and composes every signal source:
//! the screenshot and focus detectors, plus direct interaction events
//! (context-menu, drag) it guards itself. Signals arrive over a channel and
//! are applied by `pump`, which also expires the violation-flash dwell.
//! Time is injected as `Instant` values, so there is no background timer
//! and no stale callback can fire after teardown.

use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::ProtectionSettings;
use crate::constants::protection::FLASH_DWELL_MS;
use crate::detector::{FocusDetector, ScreenshotDetector};
use crate::events::{EventSource, Phase, Propagation, SubscriptionId, UiEvent};
use crate::types::{Platform, SignalEvent, ViewState};

/// Host notification, invoked once per detected violation
pub type ViolationHook = Box<dyn FnMut()>;

/// Which protections are active for this gallery
#[derive(Debug, Clone, Copy)]
pub struct ProtectionToggles {
    pub print_screen: bool,
    pub right_click: bool,
    pub download: bool,
}

impl From<&ProtectionSettings> for ProtectionToggles {
    fn from(settings: &ProtectionSettings) -> Self {
        Self {
            print_screen: settings.print_screen_detection_enabled,
            right_click: settings.right_click_disabled,
            download: settings.download_disabled,
        }
    }
}

pub struct ProtectionController {
    state: ViewState,
    /// Live focus signal, tracked independently of `state` so the flash
    /// dwell can return to the correct resting state
    exposed: bool,
    flash_until: Option<Instant>,
    signals: Receiver<SignalEvent>,
    subscriptions: Vec<SubscriptionId>,
    on_violation: ViolationHook,
}

impl ProtectionController {
    /// Wire every enabled protection into the event source. Disabled
    /// protections get no observer at all. Subscriptions are collected
    /// incrementally so `detach` can always unwind whatever was attached.
    pub fn attach(
        source: &mut dyn EventSource,
        platform: Platform,
        toggles: ProtectionToggles,
        on_violation: ViolationHook,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut subscriptions = Vec::new();

        if toggles.print_screen {
            subscriptions.push(ScreenshotDetector::attach(source, platform, tx.clone()));
            subscriptions.push(FocusDetector::attach(source, tx.clone()));
        }

        if toggles.right_click {
            let guard_tx = tx.clone();
            subscriptions.push(source.subscribe(
                Phase::Capture,
                Box::new(move |event| {
                    if *event == UiEvent::ContextMenu {
                        let _ = guard_tx.send(SignalEvent::ContextMenuAttempt);
                        Propagation::Stop
                    } else {
                        Propagation::Continue
                    }
                }),
            ));
        }

        if toggles.download {
            let guard_tx = tx.clone();
            subscriptions.push(source.subscribe(
                Phase::Capture,
                Box::new(move |event| {
                    if *event == UiEvent::DragStart {
                        let _ = guard_tx.send(SignalEvent::DragAttempt);
                        Propagation::Stop
                    } else {
                        Propagation::Continue
                    }
                }),
            ));
        }

        info!(
            print_screen = toggles.print_screen,
            right_click = toggles.right_click,
            download = toggles.download,
            observers = subscriptions.len(),
            "Protection controller attached"
        );

        Self {
            state: ViewState::Normal,
            exposed: true,
            flash_until: None,
            signals: rx,
            subscriptions,
            on_violation,
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Apply all queued signals and expire the flash dwell. Call once per
    /// frame with the current time.
    pub fn pump(&mut self, now: Instant) {
        while let Ok(signal) = self.signals.try_recv() {
            self.apply(signal, now);
        }

        if self.state == ViewState::ViolationFlash
            && self.flash_until.is_some_and(|deadline| now >= deadline)
        {
            self.flash_until = None;
            // Re-check the live focus signal: a screenshot attempt can occur
            // while already unfocused, and the flash must not unhide the image
            self.state = if self.exposed {
                ViewState::Normal
            } else {
                ViewState::Obscured
            };
            debug!(state = ?self.state, "Violation flash dismissed");
        }
    }

    fn apply(&mut self, signal: SignalEvent, now: Instant) {
        debug!(signal = ?signal, state = ?self.state, "Applying protection signal");
        match signal {
            SignalEvent::FocusLost => {
                self.exposed = false;
                self.flash_until = None;
                self.state = ViewState::Obscured;
            }
            SignalEvent::FocusGained => {
                self.exposed = true;
                if self.state == ViewState::Obscured {
                    self.state = ViewState::Normal;
                }
            }
            SignalEvent::ScreenshotAttempt => {
                (self.on_violation)();
                self.state = ViewState::ViolationFlash;
                self.flash_until = Some(now + Duration::from_millis(FLASH_DWELL_MS));
            }
            SignalEvent::ContextMenuAttempt | SignalEvent::DragAttempt => {
                (self.on_violation)();
            }
        }
    }

    /// Reset to `Normal`, cancelling any pending flash. Called after every
    /// successful image load.
    pub fn reset(&mut self) {
        self.state = ViewState::Normal;
        self.flash_until = None;
    }

    /// Remove every observer from the event source. Mandatory on all exit
    /// paths; a leaked observer is a defect.
    pub fn detach(&mut self, source: &mut dyn EventSource) {
        for id in self.subscriptions.drain(..) {
            if !source.unsubscribe(id) {
                debug!(subscription = id, "Observer already removed");
            }
        }
        info!("Protection controller detached");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::UiEventBus;
    use crate::types::{KeyCode, KeyPress};
    use std::cell::Cell;
    use std::rc::Rc;

    const DWELL: Duration = Duration::from_millis(FLASH_DWELL_MS);

    struct Fixture {
        bus: UiEventBus,
        controller: ProtectionController,
        violations: Rc<Cell<u32>>,
    }

    fn fixture(toggles: ProtectionToggles) -> Fixture {
        let mut bus = UiEventBus::new();
        let violations = Rc::new(Cell::new(0));
        let counter = violations.clone();
        let controller = ProtectionController::attach(
            &mut bus,
            Platform::LinuxLike,
            toggles,
            Box::new(move || counter.set(counter.get() + 1)),
        );
        Fixture {
            bus,
            controller,
            violations,
        }
    }

    fn all_on() -> ProtectionToggles {
        ProtectionToggles {
            print_screen: true,
            right_click: true,
            download: true,
        }
    }

    fn print_screen_key() -> UiEvent {
        UiEvent::Key(KeyPress::plain(KeyCode::PrintScreen))
    }

    #[test]
    fn focus_lost_then_gained_returns_to_normal() {
        let mut f = fixture(all_on());
        let now = Instant::now();

        f.bus.dispatch(&UiEvent::WindowFocus(false));
        f.controller.pump(now);
        assert_eq!(f.controller.state(), ViewState::Obscured);

        f.bus.dispatch(&UiEvent::WindowFocus(true));
        f.controller.pump(now);
        assert_eq!(f.controller.state(), ViewState::Normal);
        assert_eq!(f.violations.get(), 0);
    }

    #[test]
    fn screenshot_flashes_then_auto_dismisses() {
        let mut f = fixture(all_on());
        let start = Instant::now();

        f.bus.dispatch(&print_screen_key());
        f.controller.pump(start);
        assert_eq!(f.controller.state(), ViewState::ViolationFlash);
        assert_eq!(f.violations.get(), 1);

        // Still flashing just before the dwell elapses
        f.controller.pump(start + DWELL - Duration::from_millis(1));
        assert_eq!(f.controller.state(), ViewState::ViolationFlash);

        f.controller.pump(start + DWELL);
        assert_eq!(f.controller.state(), ViewState::Normal);
    }

    #[test]
    fn flash_while_unfocused_returns_to_obscured() {
        let mut f = fixture(all_on());
        let start = Instant::now();

        f.bus.dispatch(&UiEvent::WindowFocus(false));
        f.bus.dispatch(&print_screen_key());
        f.controller.pump(start);
        assert_eq!(f.controller.state(), ViewState::ViolationFlash);

        f.controller.pump(start + DWELL);
        assert_eq!(f.controller.state(), ViewState::Obscured);
    }

    #[test]
    fn focus_regained_during_flash_dismisses_to_normal() {
        let mut f = fixture(all_on());
        let start = Instant::now();

        f.bus.dispatch(&UiEvent::WindowFocus(false));
        f.bus.dispatch(&print_screen_key());
        f.controller.pump(start);

        f.bus.dispatch(&UiEvent::WindowFocus(true));
        f.controller.pump(start + Duration::from_millis(100));
        assert_eq!(f.controller.state(), ViewState::ViolationFlash);

        f.controller.pump(start + DWELL);
        assert_eq!(f.controller.state(), ViewState::Normal);
    }

    #[test]
    fn focus_loss_cancels_pending_flash() {
        let mut f = fixture(all_on());
        let start = Instant::now();

        f.bus.dispatch(&print_screen_key());
        f.controller.pump(start);
        assert_eq!(f.controller.state(), ViewState::ViolationFlash);

        f.bus.dispatch(&UiEvent::WindowFocus(false));
        f.controller.pump(start + Duration::from_millis(10));
        assert_eq!(f.controller.state(), ViewState::Obscured);

        // Expired dwell must not resurrect the dismissed flash
        f.controller.pump(start + DWELL);
        assert_eq!(f.controller.state(), ViewState::Obscured);
    }

    #[test]
    fn context_menu_fires_callback_without_transition() {
        let mut f = fixture(all_on());

        let verdict = f.bus.dispatch(&UiEvent::ContextMenu);
        f.controller.pump(Instant::now());

        assert_eq!(verdict, Propagation::Stop);
        assert_eq!(f.violations.get(), 1);
        assert_eq!(f.controller.state(), ViewState::Normal);
    }

    #[test]
    fn disabled_right_click_passes_through_silently() {
        let mut f = fixture(ProtectionToggles {
            right_click: false,
            ..all_on()
        });

        let verdict = f.bus.dispatch(&UiEvent::ContextMenu);
        f.controller.pump(Instant::now());

        assert_eq!(verdict, Propagation::Continue);
        assert_eq!(f.violations.get(), 0);
    }

    #[test]
    fn drag_guard_suppresses_and_notifies() {
        let mut f = fixture(all_on());

        assert_eq!(f.bus.dispatch(&UiEvent::DragStart), Propagation::Stop);
        f.controller.pump(Instant::now());
        assert_eq!(f.violations.get(), 1);
        assert_eq!(f.controller.state(), ViewState::Normal);
    }

    #[test]
    fn disabled_toggles_attach_no_observers() {
        let f = fixture(ProtectionToggles {
            print_screen: false,
            right_click: false,
            download: false,
        });
        assert_eq!(f.bus.observer_count(), 0);
        drop(f);
    }

    #[test]
    fn detach_removes_every_observer() {
        let mut f = fixture(all_on());
        assert!(f.bus.observer_count() > 0);

        f.controller.detach(&mut f.bus);
        assert_eq!(f.bus.observer_count(), 0);

        // Detaching twice is harmless
        f.controller.detach(&mut f.bus);
    }

    #[test]
    fn reset_clears_state_and_pending_flash() {
        let mut f = fixture(all_on());
        let start = Instant::now();

        f.bus.dispatch(&print_screen_key());
        f.controller.pump(start);
        assert_eq!(f.controller.state(), ViewState::ViolationFlash);

        f.controller.reset();
        assert_eq!(f.controller.state(), ViewState::Normal);

        f.controller.pump(start + DWELL);
        assert_eq!(f.controller.state(), ViewState::Normal);
    }
}
