//! Injected UI event source
//!
//! Detectors never touch the windowing layer directly. They subscribe to an
//! [`EventSource`], and the viewer shell feeds raw window events into a
//! [`UiEventBus`] each frame. Tests drive a bus directly with synthetic
//! events instead of a real window.

use crate::types::KeyPress;

/// Raw event as reported by the hosting window system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    /// Key pressed while the viewer had keyboard focus
    Key(KeyPress),
    /// Window gained (`true`) or lost (`false`) input focus
    WindowFocus(bool),
    /// Viewing surface became visible (`true`) or hidden/minimized (`false`)
    SurfaceVisibility(bool),
    /// Secondary-click on the protected surface
    ContextMenu,
    /// Drag gesture started on the protected surface
    DragStart,
}

/// Observer verdict for a dispatched event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Event passes through to default handling
    Continue,
    /// Default handling must be suppressed
    Stop,
}

/// Dispatch phase. Capture observers run before bubble observers, so a
/// capture-phase `Stop` suppresses the default action before it can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Capture,
    Bubble,
}

pub type SubscriptionId = u64;

pub type Observer = Box<dyn FnMut(&UiEvent) -> Propagation>;

/// Observer registration surface the detectors depend on
pub trait EventSource {
    fn subscribe(&mut self, phase: Phase, observer: Observer) -> SubscriptionId;

    /// Returns `false` if the id was not registered (already removed)
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}

/// Single-threaded fan-out event bus. Observers run in subscription order
/// within each phase; a capture-phase `Stop` short-circuits the bubble phase.
#[derive(Default)]
pub struct UiEventBus {
    next_id: SubscriptionId,
    capture: Vec<(SubscriptionId, Observer)>,
    bubble: Vec<(SubscriptionId, Observer)>,
}

impl UiEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one event to all observers. Returns `Stop` if any observer
    /// asked for the default action to be suppressed.
    pub fn dispatch(&mut self, event: &UiEvent) -> Propagation {
        for (_, observer) in &mut self.capture {
            if observer(event) == Propagation::Stop {
                return Propagation::Stop;
            }
        }
        let mut verdict = Propagation::Continue;
        for (_, observer) in &mut self.bubble {
            if observer(event) == Propagation::Stop {
                verdict = Propagation::Stop;
            }
        }
        verdict
    }

    /// Number of live subscriptions across both phases
    pub fn observer_count(&self) -> usize {
        self.capture.len() + self.bubble.len()
    }
}

impl EventSource for UiEventBus {
    fn subscribe(&mut self, phase: Phase, observer: Observer) -> SubscriptionId {
        self.next_id += 1;
        let id = self.next_id;
        match phase {
            Phase::Capture => self.capture.push((id, observer)),
            Phase::Bubble => self.bubble.push((id, observer)),
        }
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observer_count();
        self.capture.retain(|(sub, _)| *sub != id);
        self.bubble.retain(|(sub, _)| *sub != id);
        self.observer_count() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn capture_stop_short_circuits_bubble() {
        let mut bus = UiEventBus::new();
        let bubble_ran = Rc::new(Cell::new(false));
        let flag = bubble_ran.clone();

        bus.subscribe(Phase::Capture, Box::new(|_| Propagation::Stop));
        bus.subscribe(
            Phase::Bubble,
            Box::new(move |_| {
                flag.set(true);
                Propagation::Continue
            }),
        );

        assert_eq!(bus.dispatch(&UiEvent::ContextMenu), Propagation::Stop);
        assert!(!bubble_ran.get());
    }

    #[test]
    fn unsubscribe_removes_observer() {
        let mut bus = UiEventBus::new();
        let hits = Rc::new(Cell::new(0u32));
        let counter = hits.clone();
        let id = bus.subscribe(
            Phase::Bubble,
            Box::new(move |_| {
                counter.set(counter.get() + 1);
                Propagation::Continue
            }),
        );

        bus.dispatch(&UiEvent::DragStart);
        assert!(bus.unsubscribe(id));
        bus.dispatch(&UiEvent::DragStart);

        assert_eq!(hits.get(), 1);
        assert_eq!(bus.observer_count(), 0);
        assert!(!bus.unsubscribe(id));
    }

    #[test]
    fn observers_run_in_subscription_order() {
        let mut bus = UiEventBus::new();
        let order = Rc::new(std::cell::RefCell::new(Vec::new()));
        for tag in ["first", "second"] {
            let log = order.clone();
            bus.subscribe(
                Phase::Capture,
                Box::new(move |_| {
                    log.borrow_mut().push(tag);
                    Propagation::Continue
                }),
            );
        }

        bus.dispatch(&UiEvent::WindowFocus(true));
        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }
}
