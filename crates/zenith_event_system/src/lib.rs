//! # Zenith Event System
//!
//! The event core of the Zenith 2D engine: a listener registry, a synchronous
//! dispatcher and a double-buffered, priority-ordered deferred queue, all
//! behind the [`EventManager`] facade.
//!
//! ## Core Features
//!
//! - **Immediate dispatch**: [`EventManager::dispatch`] delivers an event to
//!   its listeners in registration order and stops at the first listener
//!   that consumes it.
//! - **Deferred delivery**: [`EventManager::queue`] buffers events and
//!   [`EventManager::execute`] delivers the due ones once per tick, highest
//!   priority first.
//! - **Weak listeners**: the registry never keeps a listener alive. Dropped
//!   listeners are pruned the next time their type is dispatched.
//! - **Re-entrancy**: listeners may connect, disconnect, queue and dispatch
//!   from inside a callback.
//!
//! ## Quick Start Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use zenith_event_system::*;
//!
//! let events = create_event_manager();
//!
//! let running = Arc::new(AtomicBool::new(true));
//! let flag = running.clone();
//! let quit = FnListener::new("quit", move |_event: &EventRef| {
//!     flag.store(false, Ordering::SeqCst);
//!     true
//! });
//! events.connect(&quit, QuitEvent::TYPE);
//!
//! events.queue(QuitEvent::new(0).into_ref());
//! assert!(running.load(Ordering::SeqCst));
//!
//! events.execute(None);
//! assert!(!running.load(Ordering::SeqCst));
//! ```
//!
//! ## Event Types
//!
//! Every event kind carries an [`EventTypeId`], a hash of its type name.
//! Custom kinds implement [`Event`] and expose their id as a constant:
//!
//! ```rust
//! use std::any::Any;
//! use zenith_event_system::*;
//!
//! #[derive(Debug)]
//! struct ScoreEvent {
//!     points: u32,
//! }
//!
//! impl ScoreEvent {
//!     const TYPE: EventTypeId = EventTypeId::from_name("Game::ScoreEvent");
//! }
//!
//! impl Event for ScoreEvent {
//!     fn event_type(&self) -> EventTypeId {
//!         Self::TYPE
//!     }
//!
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//! ```

pub mod error;
pub mod events;
pub mod system;
pub mod time;
pub mod types;
pub mod utils;

pub use error::RegistrationError;
pub use events::{
    same_event, Event, EventRef, FnListener, InputDevice, InputEvent, JoystickAxisEvent,
    KeyAction, KeyboardEvent, Listener, ListenerHandle, QuitEvent, RenderEvent, SensorEvent,
    SensorKind, UpdateEvent,
};
pub use system::{EventManager, EventManagerStats, EventQueue, ListenerRegistry};
pub use time::{Clock, ManualClock, SystemClock};
pub use types::{one_at_a_time, EventTypeId, Priority, Timestamp, TYPE_ID_MASK};
pub use utils::{create_event_manager, create_event_manager_with_clock};
