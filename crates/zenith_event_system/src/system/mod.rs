/// Event manager module, split by concern
mod core;
mod dispatch;
mod handlers;
mod management;
pub mod queue;
pub mod registry;
mod stats;

pub use self::core::EventManager;
pub use queue::{delivery_order, EventQueue};
pub use registry::ListenerRegistry;
pub use stats::EventManagerStats;
