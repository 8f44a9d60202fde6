//! # Core Type Definitions
//!
//! The value types every other part of the event system is built from.
//!
//! ## Key Types
//!
//! - [`EventTypeId`] - Numeric category of an event, derived from a name
//! - [`Priority`] - Delivery priority of a queued event (0 to 10)
//! - [`Timestamp`] - Point in engine time at which an event becomes due
//!
//! Type ids are derived with Bob Jenkins' one-at-a-time hash. The hash is
//! only used for fast lookup inside one process; ids are never persisted,
//! and collisions between unrelated names are not detected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::time::Duration;

/// Mask applied to every hashed type id. The full 32 bits are kept.
pub const TYPE_ID_MASK: u32 = u32::MAX;

/// Jenkins one-at-a-time hash of `bytes`, masked with `mask`.
///
/// This is a `const fn` so event kinds can carry their type id as an
/// associated constant.
///
/// # Examples
///
/// ```rust
/// use zenith_event_system::{one_at_a_time, TYPE_ID_MASK};
///
/// assert_eq!(one_at_a_time(b"a", TYPE_ID_MASK), 0xca2e_9442);
/// assert_eq!(one_at_a_time(b"a", 0xff), 0x42);
/// ```
pub const fn one_at_a_time(bytes: &[u8], mask: u32) -> u32 {
    let mut hash: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        hash = hash.wrapping_add(bytes[i] as u32);
        hash = hash.wrapping_add(hash << 10);
        hash ^= hash >> 6;
        i += 1;
    }
    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 11;
    hash = hash.wrapping_add(hash << 15);
    hash & mask
}

/// Numeric identifier of an event category.
///
/// Two ids are equal iff their numeric values are equal. The ordering is
/// only there so ids can key sorted maps; it carries no meaning.
///
/// # Examples
///
/// ```rust
/// use zenith_event_system::EventTypeId;
///
/// const QUIT: EventTypeId = EventTypeId::from_name("Event::QuitEvent");
/// assert_eq!(QUIT, EventTypeId::from_name("Event::QuitEvent"));
/// assert_ne!(QUIT, EventTypeId::from_name("Event::RenderEvent"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventTypeId(u32);

impl EventTypeId {
    /// Hashes `name` into a type id.
    pub const fn from_name(name: &str) -> Self {
        Self(one_at_a_time(name.as_bytes(), TYPE_ID_MASK))
    }

    /// Wraps an already computed id.
    pub const fn from_raw(value: u32) -> Self {
        Self(value & TYPE_ID_MASK)
    }

    /// The numeric value of this id.
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl From<&str> for EventTypeId {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl fmt::Display for EventTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Delivery priority of an event. Higher values are delivered first.
///
/// Values above [`Priority::HIGHEST`] are clamped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8")]
pub struct Priority(u8);

impl Priority {
    /// The default priority.
    pub const LOWEST: Priority = Priority(0);
    pub const LOW: Priority = Priority(2);
    pub const MEDIUM: Priority = Priority(5);
    pub const HIGH: Priority = Priority(8);
    pub const HIGHEST: Priority = Priority(10);

    pub const fn new(value: u8) -> Self {
        if value > Self::HIGHEST.0 {
            Self::HIGHEST
        } else {
            Self(value)
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl From<u8> for Priority {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point in engine time, measured from the origin of a [`Clock`].
///
/// [`Timestamp::NOW`] (zero) marks an event as due immediately.
///
/// [`Clock`]: crate::time::Clock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(Duration);

impl Timestamp {
    /// Due immediately.
    pub const NOW: Timestamp = Timestamp(Duration::ZERO);

    pub const fn new(since_origin: Duration) -> Self {
        Self(since_origin)
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    pub fn from_secs_f64(secs: f64) -> Self {
        Self(Duration::from_secs_f64(secs.max(0.0)))
    }

    pub const fn as_duration(self) -> Duration {
        self.0
    }

    pub const fn as_millis(self) -> u128 {
        self.0.as_millis()
    }

    /// True when the event is immediately due regardless of clock.
    pub const fn is_immediate(self) -> bool {
        self.0.is_zero()
    }

    /// Whether an event scheduled at `self` is due at `now`.
    pub fn is_due(self, now: Timestamp) -> bool {
        self <= now
    }

    /// Time elapsed from `earlier` to `self`, zero if `earlier` is later.
    pub fn saturating_since(self, earlier: Timestamp) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Self::Output {
        Timestamp(self.0.saturating_add(rhs))
    }
}

impl From<Duration> for Timestamp {
    fn from(value: Duration) -> Self {
        Self(value)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_at_a_time_reference_vectors() {
        assert_eq!(one_at_a_time(b"", TYPE_ID_MASK), 0);
        assert_eq!(one_at_a_time(b"a", TYPE_ID_MASK), 0xca2e_9442);
        assert_eq!(
            one_at_a_time(b"The quick brown fox jumps over the lazy dog", TYPE_ID_MASK),
            0x519e_91f5
        );
    }

    #[test]
    fn test_type_id_is_deterministic() {
        let name = "Event::QuitEvent";
        let first = one_at_a_time(name.as_bytes(), TYPE_ID_MASK);
        for _ in 0..16 {
            assert_eq!(one_at_a_time(name.as_bytes(), TYPE_ID_MASK), first);
        }
        assert_eq!(EventTypeId::from_name(name).value(), first);
        assert_eq!(first, 0x0e8f_ac93);
    }

    #[test]
    fn test_distinct_names_produce_distinct_ids() {
        let quit = EventTypeId::from_name("Event::QuitEvent");
        let keyboard = EventTypeId::from_name("Event::KeyboardEvent");
        assert_ne!(quit, keyboard);
        assert_eq!(keyboard.value(), 0x820c_674f);
    }

    #[test]
    fn test_mask_is_applied() {
        assert_eq!(one_at_a_time(b"Event::KeyboardEvent", 0xffff), 0x674f);
        assert_eq!(EventTypeId::from_raw(0x1234).value(), 0x1234);
    }

    #[test]
    fn test_type_id_display() {
        assert_eq!(EventTypeId::from_raw(0xab).to_string(), "0x000000ab");
    }

    #[test]
    fn test_priority_clamps() {
        assert_eq!(Priority::new(42), Priority::HIGHEST);
        assert_eq!(Priority::from(7).value(), 7);
        assert_eq!(Priority::default(), Priority::LOWEST);
        assert!(Priority::HIGH > Priority::MEDIUM);
    }

    #[test]
    fn test_priority_deserialize_clamps() {
        let json = serde_json::to_string(&Priority::HIGH).unwrap();
        assert_eq!(json, "8");
        assert_eq!(serde_json::from_str::<Priority>(&json).unwrap(), Priority::HIGH);

        let clamped: Priority = serde_json::from_str("200").unwrap();
        assert_eq!(clamped, Priority::HIGHEST);
    }

    #[test]
    fn test_timestamp_due() {
        let now = Timestamp::from_millis(100);
        assert!(Timestamp::NOW.is_due(now));
        assert!(Timestamp::from_millis(100).is_due(now));
        assert!(!Timestamp::from_millis(101).is_due(now));
        assert!(Timestamp::NOW.is_immediate());
        assert_eq!(
            Timestamp::from_millis(150).saturating_since(now),
            Duration::from_millis(50)
        );
        assert_eq!(now.saturating_since(Timestamp::from_millis(150)), Duration::ZERO);
        assert_eq!(now + Duration::from_millis(5), Timestamp::from_millis(105));
    }
}
