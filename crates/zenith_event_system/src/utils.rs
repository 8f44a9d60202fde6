//! # Utility Functions
//!
//! Factory functions for the event manager.

use crate::system::EventManager;
use crate::time::Clock;
use std::sync::Arc;

/// Creates an event manager driven by the system clock.
///
/// The first manager created in a process also becomes reachable through
/// [`EventManager::instance`].
///
/// # Examples
///
/// ```rust
/// use zenith_event_system::create_event_manager;
///
/// let events = create_event_manager();
/// assert_eq!(events.pending_events(), 0);
/// ```
pub fn create_event_manager() -> Arc<EventManager> {
    EventManager::new()
}

/// Creates an event manager that reads time from `clock`, typically a
/// [`ManualClock`](crate::time::ManualClock) in tests and replays.
pub fn create_event_manager_with_clock(clock: Arc<dyn Clock>) -> Arc<EventManager> {
    EventManager::with_clock(clock)
}
