//! Listener registry: event type id to ordered listener handles
use crate::error::RegistrationError;
use crate::events::ListenerHandle;
use crate::types::EventTypeId;
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Bookkeeping for one in-flight dispatch.
#[derive(Debug)]
struct DispatchFrame {
    id: u64,
    event_type: EventTypeId,
    mutated: bool,
    /// Listener addresses disconnected from this type since the frame opened.
    removed: HashSet<usize>,
    /// Set when [`ListenerRegistry::clear`] dropped a non-empty list.
    cleared: bool,
}

/// Maps every event type to the listeners registered for it, in
/// registration order.
///
/// The registry also keeps a stack of in-flight dispatches so that a
/// connect or disconnect touching a type that is currently being
/// dispatched can be reported once that dispatch finishes.
///
/// A list is created on the first connect for a type and is kept even when
/// it becomes empty; only [`clear`](Self::clear) forgets a type.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: HashMap<EventTypeId, Vec<ListenerHandle>>,
    frames: Vec<DispatchFrame>,
    next_frame: u64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `handle` to the list of `event_type`.
    pub fn connect(
        &mut self,
        handle: ListenerHandle,
        event_type: EventTypeId,
    ) -> Result<(), RegistrationError> {
        if !handle.is_alive() {
            return Err(RegistrationError::DeadListener { event_type });
        }

        let list = self.listeners.entry(event_type).or_default();
        if list.iter().any(|existing| existing.ptr_eq(&handle)) {
            return Err(RegistrationError::AlreadyConnected {
                listener: handle.describe(),
                event_type,
            });
        }

        list.push(handle);
        self.mark_mutated(event_type);
        Ok(())
    }

    /// Removes every occurrence of `handle` from the list of `event_type`
    /// and returns how many were removed. Removing an absent listener is not
    /// an error; a type that never had a list is.
    pub fn disconnect(
        &mut self,
        handle: &ListenerHandle,
        event_type: EventTypeId,
    ) -> Result<usize, RegistrationError> {
        let Some(list) = self.listeners.get_mut(&event_type) else {
            return Err(RegistrationError::UnknownEventType { event_type });
        };

        let before = list.len();
        list.retain(|existing| !existing.ptr_eq(handle));
        let removed = before - list.len();

        if removed > 0 {
            let addr = handle.addr();
            for frame in self.frames_of(event_type) {
                frame.mutated = true;
                frame.removed.insert(addr);
            }
        }
        Ok(removed)
    }

    /// Copy of the handles registered for `event_type`, or `None` when the
    /// type has no list.
    pub fn snapshot(&self, event_type: EventTypeId) -> Option<Vec<ListenerHandle>> {
        self.listeners.get(&event_type).cloned()
    }

    pub fn contains(&self, event_type: EventTypeId, handle: &ListenerHandle) -> bool {
        self.listeners
            .get(&event_type)
            .is_some_and(|list| list.iter().any(|existing| existing.ptr_eq(handle)))
    }

    /// Drops `handle` from `event_type` if its listener is gone.
    ///
    /// Pruning is housekeeping and does not count as a mutation of the list.
    pub fn prune(&mut self, event_type: EventTypeId, handle: &ListenerHandle) -> bool {
        if handle.is_alive() {
            return false;
        }
        let Some(list) = self.listeners.get_mut(&event_type) else {
            return false;
        };
        let before = list.len();
        list.retain(|existing| !existing.ptr_eq(handle));
        before != list.len()
    }

    /// Drops every handle whose listener is gone. Returns the number removed.
    pub fn prune_all(&mut self) -> usize {
        let mut removed = 0;
        for list in self.listeners.values_mut() {
            let before = list.len();
            list.retain(ListenerHandle::is_alive);
            removed += before - list.len();
        }
        removed
    }

    pub fn listener_count(&self, event_type: EventTypeId) -> usize {
        self.listeners.get(&event_type).map_or(0, Vec::len)
    }

    pub fn total_listeners(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    /// Every type that has a list, in id order.
    pub fn registered_types(&self) -> Vec<EventTypeId> {
        let mut types: Vec<_> = self.listeners.keys().copied().collect();
        types.sort_unstable();
        types
    }

    /// Forgets every type. Only in-flight dispatches of a type that still
    /// had listeners count as mutated.
    pub fn clear(&mut self) {
        for frame in &mut self.frames {
            let had_listeners = self
                .listeners
                .get(&frame.event_type)
                .is_some_and(|list| !list.is_empty());
            if had_listeners {
                frame.mutated = true;
                frame.cleared = true;
            }
        }
        self.listeners.clear();
    }

    pub fn is_dispatching(&self, event_type: EventTypeId) -> bool {
        self.frames.iter().any(|frame| frame.event_type == event_type)
    }

    pub fn dispatch_depth(&self) -> usize {
        self.frames.len()
    }

    pub(crate) fn begin_dispatch(&mut self, event_type: EventTypeId) -> u64 {
        let id = self.next_frame;
        self.next_frame = self.next_frame.wrapping_add(1);
        self.frames.push(DispatchFrame {
            id,
            event_type,
            mutated: false,
            removed: HashSet::new(),
            cleared: false,
        });
        trace!(depth = self.frames.len(), %event_type, "dispatch frame opened");
        id
    }

    /// Closes the frame opened by [`begin_dispatch`](Self::begin_dispatch)
    /// and reports whether the list of its type changed meanwhile.
    pub(crate) fn end_dispatch(&mut self, frame_id: u64) -> bool {
        match self.frames.iter().rposition(|frame| frame.id == frame_id) {
            Some(index) => self.frames.remove(index).mutated,
            None => false,
        }
    }

    /// Whether `handle` was disconnected, or its list cleared, while the
    /// frame `frame_id` was open.
    pub(crate) fn removed_during(&self, frame_id: u64, handle: &ListenerHandle) -> bool {
        self.frames
            .iter()
            .rev()
            .find(|frame| frame.id == frame_id)
            .is_some_and(|frame| frame.cleared || frame.removed.contains(&handle.addr()))
    }

    fn frames_of(&mut self, event_type: EventTypeId) -> impl Iterator<Item = &mut DispatchFrame> {
        self.frames
            .iter_mut()
            .filter(move |frame| frame.event_type == event_type)
    }

    fn mark_mutated(&mut self, event_type: EventTypeId) {
        for frame in self.frames_of(event_type) {
            frame.mutated = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventRef, Listener};
    use std::sync::Arc;

    struct Nop;

    impl Listener for Nop {
        fn handle_event(&self, _event: &EventRef) -> bool {
            false
        }
    }

    const MOVE: EventTypeId = EventTypeId::from_name("Test::Move");
    const JUMP: EventTypeId = EventTypeId::from_name("Test::Jump");

    #[test]
    fn test_connect_preserves_insertion_order() {
        let (a, b, c) = (Arc::new(Nop), Arc::new(Nop), Arc::new(Nop));
        let mut registry = ListenerRegistry::new();
        registry.connect(ListenerHandle::new(&b), MOVE).unwrap();
        registry.connect(ListenerHandle::new(&a), MOVE).unwrap();
        registry.connect(ListenerHandle::new(&c), MOVE).unwrap();

        let snapshot = registry.snapshot(MOVE).unwrap();
        assert_eq!(snapshot[0], ListenerHandle::new(&b));
        assert_eq!(snapshot[1], ListenerHandle::new(&a));
        assert_eq!(snapshot[2], ListenerHandle::new(&c));
    }

    #[test]
    fn test_duplicate_connect_is_rejected() {
        let listener = Arc::new(Nop);
        let mut registry = ListenerRegistry::new();
        registry.connect(ListenerHandle::new(&listener), MOVE).unwrap();

        let err = registry
            .connect(ListenerHandle::new(&listener), MOVE)
            .unwrap_err();
        assert!(matches!(err, RegistrationError::AlreadyConnected { .. }));
        assert_eq!(registry.listener_count(MOVE), 1);

        // Same listener under another type is fine.
        registry.connect(ListenerHandle::new(&listener), JUMP).unwrap();
        assert_eq!(registry.total_listeners(), 2);
    }

    #[test]
    fn test_disconnect_unknown_type_fails() {
        let listener = Arc::new(Nop);
        let mut registry = ListenerRegistry::new();
        let err = registry
            .disconnect(&ListenerHandle::new(&listener), JUMP)
            .unwrap_err();
        assert_eq!(err, RegistrationError::UnknownEventType { event_type: JUMP });
        assert!(registry.registered_types().is_empty());
    }

    #[test]
    fn test_disconnect_is_idempotent_once_list_exists() {
        let listener = Arc::new(Nop);
        let handle = ListenerHandle::new(&listener);
        let mut registry = ListenerRegistry::new();
        registry.connect(handle.clone(), MOVE).unwrap();

        assert!(registry.contains(MOVE, &handle));
        assert_eq!(registry.disconnect(&handle, MOVE).unwrap(), 1);
        assert!(!registry.contains(MOVE, &handle));
        assert_eq!(registry.disconnect(&handle, MOVE).unwrap(), 0);
        assert_eq!(registry.listener_count(MOVE), 0);
        assert_eq!(registry.registered_types(), vec![MOVE]);
    }

    #[test]
    fn test_dead_listener_cannot_connect() {
        let listener = Arc::new(Nop);
        let handle = ListenerHandle::new(&listener);
        drop(listener);
        let mut registry = ListenerRegistry::new();
        assert!(matches!(
            registry.connect(handle, MOVE),
            Err(RegistrationError::DeadListener { .. })
        ));
    }

    #[test]
    fn test_prune_only_removes_dead_handles() {
        let alive = Arc::new(Nop);
        let dead = Arc::new(Nop);
        let dead_handle = ListenerHandle::new(&dead);
        let mut registry = ListenerRegistry::new();
        registry.connect(ListenerHandle::new(&alive), MOVE).unwrap();
        registry.connect(dead_handle.clone(), MOVE).unwrap();
        registry.connect(dead_handle.clone(), JUMP).unwrap();

        assert!(!registry.prune(MOVE, &ListenerHandle::new(&alive)));
        drop(dead);
        assert!(registry.prune(MOVE, &dead_handle));
        assert_eq!(registry.listener_count(MOVE), 1);
        assert_eq!(registry.prune_all(), 1);
        assert_eq!(registry.listener_count(JUMP), 0);
    }

    #[test]
    fn test_frames_track_mutation_of_their_type_only() {
        let listener = Arc::new(Nop);
        let mut registry = ListenerRegistry::new();

        let outer = registry.begin_dispatch(MOVE);
        let inner = registry.begin_dispatch(JUMP);
        assert!(registry.is_dispatching(MOVE));
        assert_eq!(registry.dispatch_depth(), 2);

        registry.connect(ListenerHandle::new(&listener), JUMP).unwrap();

        assert!(registry.end_dispatch(inner));
        assert!(!registry.end_dispatch(outer));
        assert_eq!(registry.dispatch_depth(), 0);
    }

    #[test]
    fn test_frames_record_listeners_removed_from_their_type() {
        let (a, b) = (Arc::new(Nop), Arc::new(Nop));
        let (handle_a, handle_b) = (ListenerHandle::new(&a), ListenerHandle::new(&b));
        let mut registry = ListenerRegistry::new();
        registry.connect(handle_a.clone(), MOVE).unwrap();
        registry.connect(handle_b.clone(), MOVE).unwrap();
        registry.connect(handle_a.clone(), JUMP).unwrap();

        let moving = registry.begin_dispatch(MOVE);
        let jumping = registry.begin_dispatch(JUMP);
        registry.disconnect(&handle_a, MOVE).unwrap();

        assert!(registry.removed_during(moving, &handle_a));
        assert!(!registry.removed_during(moving, &handle_b));
        assert!(!registry.removed_during(jumping, &handle_a));

        // Reconnecting does not make it eligible for the running dispatch.
        registry.connect(handle_a.clone(), MOVE).unwrap();
        assert!(registry.removed_during(moving, &handle_a));

        registry.end_dispatch(jumping);
        registry.end_dispatch(moving);
        assert!(!registry.removed_during(moving, &handle_a));
    }

    #[test]
    fn test_clear_marks_only_frames_of_populated_types() {
        let listener = Arc::new(Nop);
        let handle = ListenerHandle::new(&listener);
        let mut registry = ListenerRegistry::new();
        registry.connect(handle.clone(), MOVE).unwrap();
        registry.connect(handle.clone(), JUMP).unwrap();
        registry.disconnect(&handle, JUMP).unwrap();

        let moving = registry.begin_dispatch(MOVE);
        let jumping = registry.begin_dispatch(JUMP);
        registry.clear();

        assert!(registry.removed_during(moving, &handle));
        assert!(!registry.removed_during(jumping, &handle));
        assert!(!registry.end_dispatch(jumping));
        assert!(registry.end_dispatch(moving));
        assert!(registry.registered_types().is_empty());
    }

    #[test]
    fn test_pruning_does_not_mark_frames() {
        let listener = Arc::new(Nop);
        let handle = ListenerHandle::new(&listener);
        let mut registry = ListenerRegistry::new();
        registry.connect(handle.clone(), MOVE).unwrap();
        drop(listener);

        let frame = registry.begin_dispatch(MOVE);
        assert!(registry.prune(MOVE, &handle));
        assert!(!registry.end_dispatch(frame));
    }
}
