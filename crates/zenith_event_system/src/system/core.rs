//! Core EventManager implementation
use super::queue::EventQueue;
use super::registry::ListenerRegistry;
use super::stats::EventManagerStats;
use crate::time::{Clock, SystemClock};
use crate::types::Timestamp;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Weak reference to the process-wide manager, if one is installed.
static INSTANCE: Lazy<RwLock<Weak<EventManager>>> = Lazy::new(|| RwLock::new(Weak::new()));

/// The engine's event hub: listener registry, deferred queue and dispatcher
/// behind one API.
///
/// Subsystems should receive an `Arc<EventManager>` through their
/// constructors. For code that cannot be handed one (OS signal handlers,
/// deeply nested callbacks), the first manager created in the process is
/// also reachable through [`EventManager::instance`].
///
/// # Re-entrancy
///
/// No internal lock is held while a listener runs, so a listener may call
/// `connect`, `disconnect`, `queue`, `dequeue` and `dispatch` on the same
/// manager. Events queued from inside a drain are delivered by the next
/// `execute`, never by the one in progress.
///
/// # Examples
///
/// ```rust
/// use zenith_event_system::*;
///
/// let events = EventManager::new();
/// let quit = FnListener::new("quit", |_event: &EventRef| true);
/// events.connect(&quit, QuitEvent::TYPE);
///
/// events.queue(QuitEvent::new(0).into_ref());
/// assert!(events.execute(None));
/// ```
pub struct EventManager {
    pub(super) registry: Mutex<ListenerRegistry>,
    pub(super) queue: Mutex<EventQueue>,
    pub(super) stats: Mutex<EventManagerStats>,
    pub(super) clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventManager")
            .field("registry", &"[registry]")
            .field("queue", &"[queue]")
            .field("global", &self.is_global_instance())
            .finish()
    }
}

impl EventManager {
    /// Creates a manager driven by a [`SystemClock`].
    pub fn new() -> Arc<Self> {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    /// Creates a manager that reads time from `clock`.
    ///
    /// The manager becomes the process-wide instance unless a live one
    /// already exists, in which case a warning is logged and it stays
    /// private to its owners.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Arc<Self> {
        let manager = Arc::new(Self {
            registry: Mutex::new(ListenerRegistry::new()),
            queue: Mutex::new(EventQueue::new()),
            stats: Mutex::new(EventManagerStats::default()),
            clock,
        });
        manager.install();
        manager
    }

    fn install(self: &Arc<Self>) {
        let mut slot = INSTANCE.write();
        if slot.strong_count() > 0 {
            warn!("⚠️ An event manager instance already exists; the new manager will not be globally reachable");
            return;
        }
        *slot = Arc::downgrade(self);
        info!("📡 Event manager installed as process-wide instance");
    }

    /// The process-wide manager, if one is alive.
    pub fn instance() -> Option<Arc<EventManager>> {
        INSTANCE.read().upgrade()
    }

    pub fn is_global_instance(&self) -> bool {
        std::ptr::eq(INSTANCE.read().as_ptr(), self)
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Current engine time according to this manager's clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Timestamp `delay` from now, for scheduling deferred events.
    pub fn after(&self, delay: Duration) -> Timestamp {
        self.clock.now() + delay
    }

    /// Snapshot of the running counters.
    pub fn stats(&self) -> EventManagerStats {
        self.stats.lock().clone()
    }
}

impl Drop for EventManager {
    fn drop(&mut self) {
        let mut slot = INSTANCE.write();
        if std::ptr::eq(slot.as_ptr(), self) {
            *slot = Weak::new();
            debug!("Event manager removed as process-wide instance");
        }
    }
}
