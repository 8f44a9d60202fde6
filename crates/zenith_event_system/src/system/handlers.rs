//! Listener registration methods
use super::core::EventManager;
use crate::error::RegistrationError;
use crate::events::ListenerHandle;
use crate::types::EventTypeId;
use tracing::{debug, warn};

impl EventManager {
    /// Registers `listener` for events of `event_type`.
    ///
    /// Returns `false` (and logs a warning) if the listener is already
    /// registered for that type. Listeners are invoked in registration order.
    pub fn connect(&self, listener: impl Into<ListenerHandle>, event_type: EventTypeId) -> bool {
        match self.try_connect(listener, event_type) {
            Ok(()) => true,
            Err(e) => {
                warn!("⚠️ Connect refused: {}", e);
                false
            }
        }
    }

    /// Like [`connect`](Self::connect), reporting why a registration was
    /// refused.
    pub fn try_connect(
        &self,
        listener: impl Into<ListenerHandle>,
        event_type: EventTypeId,
    ) -> Result<(), RegistrationError> {
        let handle = listener.into();
        let result = self.registry.lock().connect(handle.clone(), event_type);

        let mut stats = self.stats.lock();
        match &result {
            Ok(()) => {
                stats.connects += 1;
                debug!("🔗 Connected '{}' to {}", handle.describe(), event_type);
            }
            Err(_) => stats.registration_conflicts += 1,
        }
        result
    }

    /// Removes `listener` from `event_type`.
    ///
    /// Returns `false` only when nothing was ever registered for the type.
    /// Removing a listener that is not in the list succeeds and does nothing.
    pub fn disconnect(&self, listener: impl Into<ListenerHandle>, event_type: EventTypeId) -> bool {
        match self.try_disconnect(listener, event_type) {
            Ok(_) => true,
            Err(e) => {
                warn!("⚠️ Disconnect refused: {}", e);
                false
            }
        }
    }

    /// Like [`disconnect`](Self::disconnect), returning the number of
    /// registrations removed.
    pub fn try_disconnect(
        &self,
        listener: impl Into<ListenerHandle>,
        event_type: EventTypeId,
    ) -> Result<usize, RegistrationError> {
        let handle = listener.into();
        let result = self.registry.lock().disconnect(&handle, event_type);

        let mut stats = self.stats.lock();
        match &result {
            Ok(removed) => {
                stats.disconnects += *removed as u64;
                if *removed > 0 {
                    debug!("✂️ Disconnected '{}' from {}", handle.describe(), event_type);
                }
            }
            Err(_) => stats.registration_conflicts += 1,
        }
        result
    }
}
