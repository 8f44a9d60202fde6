//! Event delivery: immediate dispatch and the deferred queue drain
use super::core::EventManager;
use crate::events::EventRef;
use std::time::Duration;
use tracing::{debug, error, trace, warn};

/// Closes a dispatch frame when dropped, so a panicking listener does not
/// leave the registry believing the dispatch is still running.
struct FrameGuard<'a> {
    manager: &'a EventManager,
    frame: Option<u64>,
}

impl FrameGuard<'_> {
    fn close(mut self) -> bool {
        match self.frame.take() {
            Some(id) => self.manager.registry.lock().end_dispatch(id),
            None => false,
        }
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.frame.take() {
            self.manager.registry.lock().end_dispatch(id);
        }
    }
}

/// Clears the queue's draining flag when dropped.
struct DrainGuard<'a> {
    manager: &'a EventManager,
    armed: bool,
}

impl DrainGuard<'_> {
    fn finish(mut self) -> bool {
        self.armed = false;
        self.manager.queue.lock().finish_drain()
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.manager.queue.lock().finish_drain();
        }
    }
}

impl EventManager {
    /// Delivers `event` right now to every listener registered for its type,
    /// bypassing the queue.
    ///
    /// Listeners run in registration order until one reports the event as
    /// consumed. Returns `true` if a listener consumed it and `false` if none
    /// did, including when the type has no listeners at all.
    ///
    /// The listener list is snapshotted before the first callback. A listener
    /// disconnected by an earlier one in the same dispatch is skipped, and one
    /// connected during the dispatch is not invoked until the next one.
    pub fn dispatch(&self, event: &EventRef) -> bool {
        let event_type = event.event_type();

        let (snapshot, frame) = {
            let mut registry = self.registry.lock();
            let Some(snapshot) = registry.snapshot(event_type) else {
                drop(registry);
                self.stats.lock().events_dispatched += 1;
                trace!(%event_type, "no listeners registered");
                return false;
            };
            let frame = registry.begin_dispatch(event_type);
            (snapshot, frame)
        };
        let guard = FrameGuard {
            manager: self,
            frame: Some(frame),
        };

        let mut consumed = false;
        let mut invoked = 0u64;
        let mut pruned = 0u64;

        for handle in &snapshot {
            let Some(listener) = handle.upgrade() else {
                if self.registry.lock().prune(event_type, handle) {
                    pruned += 1;
                }
                continue;
            };
            if self.registry.lock().removed_during(frame, handle) {
                continue;
            }

            invoked += 1;
            if listener.handle_event(event) {
                trace!(listener = listener.listener_name(), %event_type, "event consumed");
                consumed = true;
                break;
            }
        }

        let mutated = guard.close();

        {
            let mut stats = self.stats.lock();
            stats.events_dispatched += 1;
            stats.listener_invocations += invoked;
            stats.stale_listeners_pruned += pruned;
            if consumed {
                stats.events_consumed += 1;
            }
            if mutated && !consumed {
                stats.dispatch_anomalies += 1;
            }
        }

        if mutated && !consumed {
            error!(
                "❌ Listeners for {} changed while {:?} was being dispatched and no listener consumed it",
                event_type, event
            );
        }
        if pruned > 0 {
            debug!("🧹 Pruned {} dropped listener(s) from {}", pruned, event_type);
        }

        consumed
    }

    /// Defers `event` until a later [`execute`](Self::execute).
    ///
    /// The event always lands in the pending buffer, including when called
    /// from a listener that is running inside a drain.
    pub fn queue(&self, event: EventRef) -> bool {
        trace!(event_type = %event.event_type(), priority = %event.priority(), "event queued");
        let queued = self.queue.lock().queue(event);
        if queued {
            self.stats.lock().events_queued += 1;
        }
        queued
    }

    /// Cancels pending events.
    ///
    /// With `all == false` the first pending entry that is the very same
    /// event is removed; with `all == true` every pending event of the same
    /// type is. Events already in the active buffer cannot be cancelled.
    /// Removal is best effort, so this always returns `true`.
    pub fn dequeue(&self, event: &EventRef, all: bool) -> bool {
        let removed = {
            let mut queue = self.queue.lock();
            if all {
                queue.dequeue_type(event.event_type())
            } else {
                usize::from(queue.dequeue(event))
            }
        };

        if removed > 0 {
            self.stats.lock().events_dequeued += removed as u64;
            trace!(event_type = %event.event_type(), removed, "events dequeued");
        }
        true
    }

    /// Delivers queued events that are due.
    ///
    /// If nothing is left over from an earlier call, the pending events are
    /// swapped into the active buffer and sorted by priority (highest first),
    /// then by timestamp. Otherwise only the leftovers are drained, and the
    /// pending events wait (still cancellable) for a later call. Events are dispatched from the front while the front
    /// event is due and, when `timeout` is set, while the time spent in this
    /// call has not exceeded it. A front event that is not yet due ends the
    /// drain even if due events sit behind it.
    ///
    /// Returns `true` when every active event was delivered. Returns `false`
    /// if events are left for a later call, or if a drain is already running
    /// on this manager.
    pub fn execute(&self, timeout: Option<Duration>) -> bool {
        if !self.queue.lock().begin_drain() {
            warn!("⚠️ execute() called while a drain is already running; ignoring nested call");
            return false;
        }
        let guard = DrainGuard {
            manager: self,
            armed: true,
        };

        let started = self.clock.now();
        let mut delivered = 0usize;

        loop {
            let now = self.clock.now();
            if let Some(budget) = timeout {
                if now.saturating_since(started) > budget {
                    debug!("⏱️ Drain budget of {:?} exhausted after {} event(s)", budget, delivered);
                    break;
                }
            }

            let next = self.queue.lock().pop_due(now);
            let Some(event) = next else {
                break;
            };

            self.dispatch(&event);
            delivered += 1;
        }

        let drained = guard.finish();

        let mut stats = self.stats.lock();
        if drained {
            stats.drains_completed += 1;
        } else {
            stats.drains_partial += 1;
        }
        drop(stats);

        if delivered > 0 {
            trace!(delivered, drained, "drain finished");
        }
        drained
    }
}
