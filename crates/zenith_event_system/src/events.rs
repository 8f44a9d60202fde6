//! # Events and Listeners
//!
//! The two contracts the event core is built around:
//!
//! - [`Event`] - an immutable record with a type, a priority and a due time.
//!   Events are shared as [`EventRef`] (`Arc<dyn Event>`), so a producer can
//!   keep a handle to an event it queued and later [`dequeue`] it.
//! - [`Listener`] - an object that receives events and reports whether it
//!   consumed them. The registry only holds a weak [`ListenerHandle`]; a
//!   listener that is dropped simply stops receiving events.
//!
//! The concrete kinds the engine emits (quit, update, render and the input
//! family) are defined at the bottom of this module. Each exposes its type id
//! as `Kind::TYPE`.
//!
//! [`dequeue`]: crate::EventManager::dequeue

use crate::types::{EventTypeId, Priority, Timestamp};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

// ============================================================================
// Contracts
// ============================================================================

/// Trait implemented by every event kind.
pub trait Event: Send + Sync + Any + fmt::Debug {
    /// Category used to find the listeners of this event.
    fn event_type(&self) -> EventTypeId;

    /// Queue priority, higher first.
    fn priority(&self) -> Priority {
        Priority::LOWEST
    }

    /// When the event becomes due. [`Timestamp::NOW`] means immediately.
    fn timestamp(&self) -> Timestamp {
        Timestamp::NOW
    }

    fn as_any(&self) -> &dyn Any;
}

impl dyn Event {
    pub fn is<T: Event>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Event>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Shared handle to a queued or dispatched event.
pub type EventRef = Arc<dyn Event>;

/// Identity comparison of two event handles.
///
/// Only the data pointer is compared, vtable pointers of the same type may
/// differ between codegen units.
pub fn same_event(a: &EventRef, b: &EventRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Trait implemented by objects that receive events.
pub trait Listener: Send + Sync {
    /// Handles `event`. Returning `true` marks it consumed and stops delivery
    /// to the listeners registered after this one.
    fn handle_event(&self, event: &EventRef) -> bool;

    /// Name used in log output.
    fn listener_name(&self) -> &str {
        "listener"
    }
}

/// Non-owning reference to a registered [`Listener`].
///
/// Handles compare by the identity of the listener they point at, so the
/// same listener can be disconnected with any handle created from it.
#[derive(Clone)]
pub struct ListenerHandle(Weak<dyn Listener>);

impl ListenerHandle {
    pub fn new<L: Listener + 'static>(listener: &Arc<L>) -> Self {
        let weak: Weak<L> = Arc::downgrade(listener);
        Self(weak)
    }

    /// Builds a handle from a weak reference, typically the `Weak<Self>` a
    /// listener keeps so it can disconnect itself.
    pub fn from_weak<L: Listener + 'static>(weak: Weak<L>) -> Self {
        Self(weak)
    }

    pub fn upgrade(&self) -> Option<Arc<dyn Listener>> {
        self.0.upgrade()
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    pub fn ptr_eq(&self, other: &ListenerHandle) -> bool {
        std::ptr::addr_eq(self.0.as_ptr(), other.0.as_ptr())
    }

    /// Address of the listener allocation. Stable for as long as any handle
    /// to it exists.
    pub(crate) fn addr(&self) -> usize {
        self.0.as_ptr() as *const () as usize
    }

    /// Listener name for diagnostics, or `<dropped>`.
    pub fn describe(&self) -> String {
        match self.upgrade() {
            Some(listener) => listener.listener_name().to_string(),
            None => "<dropped>".to_string(),
        }
    }
}

impl PartialEq for ListenerHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ListenerHandle {}

impl fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("address", &(self.0.as_ptr() as *const ()))
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl<L: Listener + 'static> From<&Arc<L>> for ListenerHandle {
    fn from(listener: &Arc<L>) -> Self {
        Self::new(listener)
    }
}

impl From<&Arc<dyn Listener>> for ListenerHandle {
    fn from(listener: &Arc<dyn Listener>) -> Self {
        Self(Arc::downgrade(listener))
    }
}

impl From<&ListenerHandle> for ListenerHandle {
    fn from(handle: &ListenerHandle) -> Self {
        handle.clone()
    }
}

/// Adapts a closure into a [`Listener`].
///
/// # Examples
///
/// ```rust
/// use zenith_event_system::{EventRef, FnListener, Listener, QuitEvent};
///
/// let listener = FnListener::new("quit_logger", |event: &EventRef| {
///     println!("received {:?}", event);
///     false
/// });
/// assert!(!listener.handle_event(&QuitEvent::new(0).into_ref()));
/// ```
pub struct FnListener<F>
where
    F: Fn(&EventRef) -> bool + Send + Sync,
{
    name: String,
    handler: F,
}

impl<F> FnListener<F>
where
    F: Fn(&EventRef) -> bool + Send + Sync,
{
    pub fn new(name: impl Into<String>, handler: F) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            handler,
        })
    }
}

impl<F> Listener for FnListener<F>
where
    F: Fn(&EventRef) -> bool + Send + Sync,
{
    fn handle_event(&self, event: &EventRef) -> bool {
        (self.handler)(event)
    }

    fn listener_name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Engine Event Kinds
// ============================================================================

/// Implements [`Event`] plus the shared builder methods for a kind that
/// stores `priority` and `timestamp` fields.
macro_rules! event_kind {
    ($kind:ident, $name:literal) => {
        impl $kind {
            pub const TYPE_NAME: &'static str = $name;
            pub const TYPE: EventTypeId = EventTypeId::from_name($name);

            pub fn with_priority(mut self, priority: Priority) -> Self {
                self.priority = priority;
                self
            }

            pub fn scheduled_at(mut self, at: Timestamp) -> Self {
                self.timestamp = at;
                self
            }

            pub fn into_ref(self) -> EventRef {
                Arc::new(self)
            }
        }

        impl Event for $kind {
            fn event_type(&self) -> EventTypeId {
                Self::TYPE
            }

            fn priority(&self) -> Priority {
                self.priority
            }

            fn timestamp(&self) -> Timestamp {
                self.timestamp
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

/// Request to leave the main loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuitEvent {
    pub exit_code: i32,
    priority: Priority,
    timestamp: Timestamp,
}

impl QuitEvent {
    pub fn new(exit_code: i32) -> Self {
        Self {
            exit_code,
            priority: Priority::HIGHEST,
            timestamp: Timestamp::NOW,
        }
    }
}

event_kind!(QuitEvent, "Event::QuitEvent");

/// Per-tick simulation step, normally dispatched immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateEvent {
    pub tick: u64,
    pub delta: Duration,
    priority: Priority,
    timestamp: Timestamp,
}

impl UpdateEvent {
    pub fn new(tick: u64, delta: Duration) -> Self {
        Self {
            tick,
            delta,
            priority: Priority::LOWEST,
            timestamp: Timestamp::NOW,
        }
    }
}

event_kind!(UpdateEvent, "Event::UpdateEvent");

/// Per-frame render request, normally dispatched immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderEvent {
    pub frame: u64,
    priority: Priority,
    timestamp: Timestamp,
}

impl RenderEvent {
    pub fn new(frame: u64) -> Self {
        Self {
            frame,
            priority: Priority::LOWEST,
            timestamp: Timestamp::NOW,
        }
    }
}

event_kind!(RenderEvent, "Event::RenderEvent");

/// Source of a raw [`InputEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputDevice {
    Keyboard,
    Mouse,
    Touch,
    Joystick(u8),
    Sensor,
}

/// Raw input sample that has not been specialised into a keyboard,
/// joystick or sensor event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub device: InputDevice,
    pub code: u32,
    pub value: f32,
    priority: Priority,
    timestamp: Timestamp,
}

impl InputEvent {
    pub fn new(device: InputDevice, code: u32, value: f32) -> Self {
        Self {
            device,
            code,
            value,
            priority: Priority::MEDIUM,
            timestamp: Timestamp::NOW,
        }
    }
}

event_kind!(InputEvent, "Event::InputEvent");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyAction {
    Pressed,
    Released,
    Repeated,
}

/// Keyboard key state change. `key` is a platform-independent key code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardEvent {
    pub key: u32,
    pub action: KeyAction,
    priority: Priority,
    timestamp: Timestamp,
}

impl KeyboardEvent {
    pub fn new(key: u32, action: KeyAction) -> Self {
        Self {
            key,
            action,
            priority: Priority::MEDIUM,
            timestamp: Timestamp::NOW,
        }
    }

    pub fn is_pressed(&self) -> bool {
        matches!(self.action, KeyAction::Pressed | KeyAction::Repeated)
    }
}

event_kind!(KeyboardEvent, "Event::KeyboardEvent");

/// Joystick axis movement; `value` is normalised to `-1.0..=1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoystickAxisEvent {
    pub joystick: u8,
    pub axis: u8,
    pub value: f32,
    priority: Priority,
    timestamp: Timestamp,
}

impl JoystickAxisEvent {
    pub fn new(joystick: u8, axis: u8, value: f32) -> Self {
        Self {
            joystick,
            axis,
            value: value.clamp(-1.0, 1.0),
            priority: Priority::MEDIUM,
            timestamp: Timestamp::NOW,
        }
    }
}

event_kind!(JoystickAxisEvent, "Event::JoystickAxisEvent");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    Accelerometer,
    Gyroscope,
    Magnetometer,
    Orientation,
}

/// Three-axis reading from a device sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorEvent {
    pub sensor: SensorKind,
    pub values: [f32; 3],
    priority: Priority,
    timestamp: Timestamp,
}

impl SensorEvent {
    pub fn new(sensor: SensorKind, values: [f32; 3]) -> Self {
        Self {
            sensor,
            values,
            priority: Priority::LOW,
            timestamp: Timestamp::NOW,
        }
    }
}

event_kind!(SensorEvent, "Event::SensorEvent");

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter;

    impl Listener for Counter {
        fn handle_event(&self, _event: &EventRef) -> bool {
            false
        }
    }

    #[test]
    fn test_event_kinds_have_distinct_types() {
        let types = [
            QuitEvent::TYPE,
            UpdateEvent::TYPE,
            RenderEvent::TYPE,
            InputEvent::TYPE,
            KeyboardEvent::TYPE,
            JoystickAxisEvent::TYPE,
            SensorEvent::TYPE,
        ];
        for (i, a) in types.iter().enumerate() {
            for b in &types[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(QuitEvent::TYPE, EventTypeId::from_name("Event::QuitEvent"));
    }

    #[test]
    fn test_builders_override_defaults() {
        let quit = QuitEvent::new(3);
        assert_eq!(quit.priority(), Priority::HIGHEST);
        assert!(quit.timestamp().is_immediate());

        let key = KeyboardEvent::new(32, KeyAction::Pressed)
            .with_priority(Priority::new(9))
            .scheduled_at(Timestamp::from_millis(40));
        assert_eq!(key.priority().value(), 9);
        assert_eq!(key.timestamp(), Timestamp::from_millis(40));
        assert!(key.is_pressed());
    }

    #[test]
    fn test_joystick_axis_is_clamped() {
        assert_eq!(JoystickAxisEvent::new(0, 1, 3.5).value, 1.0);
        assert_eq!(JoystickAxisEvent::new(0, 1, -2.0).value, -1.0);
    }

    #[test]
    fn test_downcast_through_event_ref() {
        let event: EventRef = SensorEvent::new(SensorKind::Gyroscope, [0.0, 1.0, 0.5]).into_ref();
        assert!(event.is::<SensorEvent>());
        assert!(event.downcast_ref::<QuitEvent>().is_none());
        let sensor = event.downcast_ref::<SensorEvent>().unwrap();
        assert_eq!(sensor.values[1], 1.0);
    }

    #[test]
    fn test_same_event_is_identity_not_equality() {
        let a: EventRef = QuitEvent::new(0).into_ref();
        let b: EventRef = QuitEvent::new(0).into_ref();
        assert!(same_event(&a, &a.clone()));
        assert!(!same_event(&a, &b));
    }

    #[test]
    fn test_listener_handle_identity_and_liveness() {
        let listener = Arc::new(Counter);
        let other = Arc::new(Counter);
        let a = ListenerHandle::new(&listener);
        let b = ListenerHandle::from(&listener);
        let c = ListenerHandle::new(&other);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.is_alive());
        assert_eq!(a.describe(), "listener");

        drop(listener);
        assert!(!a.is_alive());
        assert!(a.upgrade().is_none());
        assert_eq!(b.describe(), "<dropped>");
        assert_eq!(a, b);
    }
}
