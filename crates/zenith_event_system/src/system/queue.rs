//! Double-buffered storage for deferred events
use crate::events::{same_event, EventRef};
use crate::types::{EventTypeId, Timestamp};
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::mem;

/// Delivery order of queued events: higher priority first, and among equal
/// priorities the earlier timestamp first. Used with a stable sort, so
/// events equal on both keys keep their queueing order.
pub fn delivery_order(a: &EventRef, b: &EventRef) -> Ordering {
    b.priority()
        .cmp(&a.priority())
        .then_with(|| a.timestamp().cmp(&b.timestamp()))
}

/// Two event buffers that alternate roles.
///
/// New events always land in the *pending* (inactive) buffer. A drain that
/// starts with an empty *active* buffer swaps the two, sorts the new active
/// buffer, and pops from its front. A drain that starts with leftovers from
/// an earlier partial drain only works through those leftovers, and the
/// pending buffer keeps collecting (and can still be cancelled) until the
/// active buffer has been emptied. Nothing can be cancelled once it is active.
#[derive(Debug, Default)]
pub struct EventQueue {
    active: VecDeque<EventRef>,
    pending: VecDeque<EventRef>,
    draining: bool,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `event` to the pending buffer.
    pub fn queue(&mut self, event: EventRef) -> bool {
        self.pending.push_back(event);
        true
    }

    /// Removes the first pending entry that is the same event as `event`.
    pub fn dequeue(&mut self, event: &EventRef) -> bool {
        match self.pending.iter().position(|queued| same_event(queued, event)) {
            Some(index) => self.pending.remove(index).is_some(),
            None => false,
        }
    }

    /// Removes every pending event of `event_type`, returning how many.
    pub fn dequeue_type(&mut self, event_type: EventTypeId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|queued| queued.event_type() != event_type);
        before - self.pending.len()
    }

    /// Starts a drain, swapping the buffers if the active one is empty.
    /// Returns `false` if a drain is already running.
    pub(crate) fn begin_drain(&mut self) -> bool {
        if self.draining {
            return false;
        }
        self.draining = true;
        if self.active.is_empty() {
            mem::swap(&mut self.active, &mut self.pending);
            self.sort_active();
        }
        true
    }

    /// Pops the front of the active buffer if it is due at `now`.
    pub(crate) fn pop_due(&mut self, now: Timestamp) -> Option<EventRef> {
        let front = self.active.front()?;
        if !front.timestamp().is_due(now) {
            return None;
        }
        self.active.pop_front()
    }

    /// Ends the drain, returning whether the active buffer was emptied.
    pub(crate) fn finish_drain(&mut self) -> bool {
        self.draining = false;
        self.active.is_empty()
    }

    fn sort_active(&mut self) {
        self.active.make_contiguous().sort_by(delivery_order);
    }

    /// Front of the active buffer after the last sort.
    pub fn peek_active(&self) -> Option<&EventRef> {
        self.active.front()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn len(&self) -> usize {
        self.active.len() + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.pending.is_empty()
    }

    pub fn is_draining(&self) -> bool {
        self.draining
    }

    /// Drops every queued event, active and pending.
    pub fn clear(&mut self) -> usize {
        let dropped = self.len();
        self.active.clear();
        self.pending.clear();
        dropped
    }
}
