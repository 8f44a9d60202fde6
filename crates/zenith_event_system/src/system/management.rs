//! Introspection and housekeeping methods
use super::core::EventManager;
use crate::types::EventTypeId;
use tracing::{debug, info};

/// Listener count above which [`EventManager::validate`] reports a type.
const EXCESSIVE_LISTENERS: usize = 100;

/// Queue length above which [`EventManager::validate`] reports a backlog.
const QUEUE_BACKLOG: usize = 10_000;

impl EventManager {
    /// Number of listeners registered for `event_type`, dropped ones included
    /// until a dispatch or [`prune_stale_listeners`](Self::prune_stale_listeners)
    /// removes them.
    pub fn listener_count(&self, event_type: EventTypeId) -> usize {
        self.registry.lock().listener_count(event_type)
    }

    pub fn has_listeners(&self, event_type: EventTypeId) -> bool {
        self.listener_count(event_type) > 0
    }

    /// Every type that has ever had a listener connected, in id order.
    pub fn registered_types(&self) -> Vec<EventTypeId> {
        self.registry.lock().registered_types()
    }

    pub fn total_listeners(&self) -> usize {
        self.registry.lock().total_listeners()
    }

    /// Removes every registration whose listener has been dropped.
    pub fn prune_stale_listeners(&self) -> usize {
        let removed = self.registry.lock().prune_all();
        if removed > 0 {
            self.stats.lock().stale_listeners_pruned += removed as u64;
            debug!("🧹 Pruned {} dropped listener(s)", removed);
        }
        removed
    }

    /// Forgets every registration of every type.
    pub fn clear_listeners(&self) {
        let mut registry = self.registry.lock();
        let count = registry.total_listeners();
        registry.clear();
        drop(registry);
        info!("🧹 Cleared {} listener registration(s)", count);
    }

    /// Events waiting for the next drain.
    pub fn pending_events(&self) -> usize {
        self.queue.lock().pending_len()
    }

    /// Events in the active buffer that have not been delivered yet.
    pub fn active_events(&self) -> usize {
        self.queue.lock().active_len()
    }

    pub fn is_draining(&self) -> bool {
        self.queue.lock().is_draining()
    }

    /// Whether a dispatch of `event_type` is on the call stack.
    pub fn is_dispatching(&self, event_type: EventTypeId) -> bool {
        self.registry.lock().is_dispatching(event_type)
    }

    /// Drops every queued event, pending and active. Returns how many.
    pub fn clear_queue(&self) -> usize {
        let dropped = self.queue.lock().clear();
        if dropped > 0 {
            info!("🧹 Dropped {} queued event(s)", dropped);
        }
        dropped
    }

    /// Reports conditions worth a look: empty or oversized listener lists,
    /// dropped listeners not yet pruned and a large queue backlog.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        {
            let registry = self.registry.lock();
            for event_type in registry.registered_types() {
                let Some(list) = registry.snapshot(event_type) else {
                    continue;
                };
                if list.is_empty() {
                    issues.push(format!("Event type {} has no listeners", event_type));
                }
                if list.len() > EXCESSIVE_LISTENERS {
                    issues.push(format!(
                        "Event type {} has excessive listeners: {}",
                        event_type,
                        list.len()
                    ));
                }
                let stale = list.iter().filter(|handle| !handle.is_alive()).count();
                if stale > 0 {
                    issues.push(format!(
                        "Event type {} holds {} dropped listener(s)",
                        event_type, stale
                    ));
                }
            }
        }

        let queued = self.queue.lock().len();
        if queued > QUEUE_BACKLOG {
            issues.push(format!("Event queue backlog: {} events", queued));
        }

        issues
    }
}
