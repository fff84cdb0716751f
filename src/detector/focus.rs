//! Focus and visibility detection
//!
//! Window focus and surface visibility are two independent raw signals that
//! browsers and window managers fire inconsistently (alt-tab vs. minimize).
//! Both are coalesced into the same pair of logical events, one logical
//! event per raw transition, with no debouncing.

use std::sync::mpsc::Sender;
use tracing::info;

use crate::events::{EventSource, Phase, Propagation, SubscriptionId, UiEvent};
use crate::types::SignalEvent;

pub struct FocusDetector;

impl FocusDetector {
    pub fn attach(
        source: &mut dyn EventSource,
        signals: Sender<SignalEvent>,
    ) -> SubscriptionId {
        info!("Attaching focus detector");
        source.subscribe(
            Phase::Bubble,
            Box::new(move |event| {
                let exposed = match event {
                    UiEvent::WindowFocus(focused) => *focused,
                    UiEvent::SurfaceVisibility(visible) => *visible,
                    _ => return Propagation::Continue,
                };
                let signal = if exposed {
                    SignalEvent::FocusGained
                } else {
                    SignalEvent::FocusLost
                };
                let _ = signals.send(signal);
                Propagation::Continue
            }),
        )
    }
}
