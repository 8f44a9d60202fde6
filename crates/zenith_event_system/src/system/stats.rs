//! Event manager statistics

/// Running counters kept by an [`EventManager`](crate::EventManager).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventManagerStats {
    /// Listener registrations accepted
    pub connects: u64,
    /// Listener registrations removed
    pub disconnects: u64,
    /// Connect or disconnect requests refused
    pub registration_conflicts: u64,
    /// Events accepted by `queue`
    pub events_queued: u64,
    /// Pending events removed by `dequeue`
    pub events_dequeued: u64,
    /// Calls to `dispatch`, immediate or from a drain
    pub events_dispatched: u64,
    /// Dispatches that a listener consumed
    pub events_consumed: u64,
    /// Individual listener invocations
    pub listener_invocations: u64,
    /// Dropped listeners removed lazily during dispatch
    pub stale_listeners_pruned: u64,
    /// Listener lists changed mid-dispatch without the event being consumed
    pub dispatch_anomalies: u64,
    /// `execute` calls that emptied the active buffer
    pub drains_completed: u64,
    /// `execute` calls that left events behind
    pub drains_partial: u64,
}

impl EventManagerStats {
    pub fn total_drains(&self) -> u64 {
        self.drains_completed + self.drains_partial
    }
}
