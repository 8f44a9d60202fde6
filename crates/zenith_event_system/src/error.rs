//! Error types surfaced by the listener registry.

use crate::types::EventTypeId;

/// Why a connect or disconnect request was refused.
///
/// These are never fatal. The boolean `connect`/`disconnect` entry points
/// log them at `warn` and report `false`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("listener '{listener}' is already connected to event type {event_type}")]
    AlreadyConnected {
        listener: String,
        event_type: EventTypeId,
    },
    #[error("no listener list exists for event type {event_type}")]
    UnknownEventType { event_type: EventTypeId },
    #[error("listener for event type {event_type} was dropped before it could be connected")]
    DeadListener { event_type: EventTypeId },
}
