//! Per-window tracker registry and event routing.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, info, trace};

use crate::config::TrackerConfig;
use crate::event::{InputEvent, WindowId};
use crate::tracker::InputTracker;

/// Owns one [`InputTracker`] per registered window.
///
/// Registration is idempotent: asking for an already-registered window
/// returns the existing tracker, never a second diverging one. A tracker
/// registered under [`WindowId::ANY`] receives events for every window.
pub struct InputManager {
    trackers: RwLock<HashMap<isize, Arc<InputTracker>>>,
    config: TrackerConfig,
}

impl InputManager {
    /// Create a manager with the default tracker configuration.
    pub fn new() -> Self {
        Self::with_config(TrackerConfig::default())
    }

    /// Create a manager whose trackers use `config`.
    pub fn with_config(config: TrackerConfig) -> Self {
        Self {
            trackers: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Register a window, returning its tracker.
    ///
    /// Returns the existing tracker when the window is already registered.
    pub fn register_window(&self, window: WindowId) -> Arc<InputTracker> {
        if let Some(tracker) = self.trackers.read().unwrap().get(&window.raw()) {
            return Arc::clone(tracker);
        }

        let mut trackers = self.trackers.write().unwrap();
        // A concurrent registration may have won the race for the write
        // lock; entry() keeps the first tracker either way.
        Arc::clone(trackers.entry(window.raw()).or_insert_with(|| {
            info!(window = window.raw(), "input tracker registered");
            Arc::new(InputTracker::with_config(window, self.config.clone()))
        }))
    }

    /// Drop a window's registration. Returns `false` if it was not
    /// registered. Outstanding `Arc` handles keep the tracker alive until
    /// released, but it no longer receives events.
    pub fn unregister_window(&self, window: WindowId) -> bool {
        let removed = self.trackers.write().unwrap().remove(&window.raw());
        if removed.is_some() {
            debug!(window = window.raw(), "input tracker unregistered");
        }
        removed.is_some()
    }

    /// Look up the tracker for a window without registering it.
    pub fn get(&self, window: WindowId) -> Option<Arc<InputTracker>> {
        self.trackers.read().unwrap().get(&window.raw()).cloned()
    }

    /// Number of registered trackers (wildcard included).
    pub fn tracker_count(&self) -> usize {
        self.trackers.read().unwrap().len()
    }

    /// Route one event to the trackers watching `window`.
    ///
    /// The event goes to the exact-match tracker and to the wildcard
    /// tracker when both exist; the suppress decisions are OR-ed. Events
    /// for windows nobody watches are never suppressed.
    pub fn dispatch(&self, window: WindowId, event: InputEvent) -> bool {
        let trackers = self.trackers.read().unwrap();

        let mut suppress = false;
        let mut handled = false;

        if let Some(tracker) = trackers.get(&window.raw()) {
            suppress |= tracker.ingest(event);
            handled = true;
        }
        if !window.is_any() {
            if let Some(tracker) = trackers.get(&WindowId::ANY.raw()) {
                suppress |= tracker.ingest(event);
                handled = true;
            }
        }

        if !handled {
            trace!(window = window.raw(), ?event, "event for unwatched window");
        }
        suppress
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::MouseButton;

    #[test]
    fn test_registration_is_idempotent() {
        let manager = InputManager::new();
        let first = manager.register_window(WindowId::new(7));
        let second = manager.register_window(WindowId::new(7));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(manager.tracker_count(), 1);
    }

    #[test]
    fn test_unregister() {
        let manager = InputManager::new();
        manager.register_window(WindowId::new(7));
        assert!(manager.unregister_window(WindowId::new(7)));
        assert!(!manager.unregister_window(WindowId::new(7)));
        assert!(manager.get(WindowId::new(7)).is_none());
        assert_eq!(manager.tracker_count(), 0);
    }

    #[test]
    fn test_dispatch_routes_to_exact_window() {
        let manager = InputManager::new();
        let watched = manager.register_window(WindowId::new(1));
        let other = manager.register_window(WindowId::new(2));

        manager.dispatch(WindowId::new(1), InputEvent::KeyDown { code: 0x41 });
        assert!(watched.is_key_down(0x41));
        assert!(!other.is_key_down(0x41));
    }

    #[test]
    fn test_dispatch_reaches_wildcard() {
        let manager = InputManager::new();
        let wildcard = manager.register_window(WindowId::ANY);
        let watched = manager.register_window(WindowId::new(1));

        manager.dispatch(
            WindowId::new(1),
            InputEvent::ButtonDown {
                button: MouseButton::Left,
            },
        );
        manager.dispatch(WindowId::new(99), InputEvent::KeyDown { code: 0x42 });

        // Both trackers saw the watched window's event; only the wildcard
        // saw the unregistered window's.
        assert!(watched.is_mouse_button_down(MouseButton::Left));
        assert!(wildcard.is_mouse_button_down(MouseButton::Left));
        assert!(!watched.is_key_down(0x42));
        assert!(wildcard.is_key_down(0x42));
    }

    #[test]
    fn test_dispatch_ors_suppression() {
        let manager = InputManager::new();
        let wildcard = manager.register_window(WindowId::ANY);
        manager.register_window(WindowId::new(1));

        // Only the wildcard tracker blocks, yet the decision must hold for
        // the routed event.
        wildcard.block_keyboard_input(true);
        assert!(manager.dispatch(WindowId::new(1), InputEvent::KeyDown { code: 0x41 }));
    }

    #[test]
    fn test_dispatch_unwatched_is_not_suppressed() {
        let manager = InputManager::new();
        assert!(!manager.dispatch(WindowId::new(5), InputEvent::KeyDown { code: 0x41 }));
    }

    #[test]
    fn test_config_applies_to_new_trackers() {
        let manager = InputManager::with_config(TrackerConfig { grace_period_ms: 0 });
        let tracker = manager.register_window(WindowId::new(1));

        tracker.block_mouse_input(true);
        tracker.block_mouse_input(false);
        // Zero grace: the block clears the moment the flag drops.
        assert!(!tracker.is_blocking_mouse_input());
    }
}
