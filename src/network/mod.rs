//! # Signal Network Interface
//!
//! Identifiers and the collaborator traits for the external pub/sub signal
//! network.
//!
//! The network's propagation and aggregation algorithm is out of scope: the
//! core only registers, updates and unregisters transmitter sources, and
//! queries how many members listen on a frequency. All identifiers here are
//! opaque to the core.

use serde::{Deserialize, Serialize};

/// A two-part opaque identifier addressing a logical network channel.
///
/// The two halves are item-identity strings. A pair is complete only when
/// both halves are non-empty; incomplete pairs never reach the network.
///
/// # Examples
///
/// ```
/// use padlink::network::FrequencyPair;
///
/// let pair = FrequencyPair::new("torch", "gear");
/// assert!(pair.is_complete());
/// assert!(!FrequencyPair::default().is_complete());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrequencyPair {
    /// First half of the channel identity.
    pub first: String,
    /// Second half of the channel identity.
    pub second: String,
}

impl FrequencyPair {
    /// Creates a frequency pair from its two halves.
    #[must_use]
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// A pair is complete iff both halves are non-empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.first.is_empty() && !self.second.is_empty()
    }
}

/// A position in the simulation world, used by the network for
/// proximity and addressing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Location {
    /// Creates a location from block coordinates.
    #[must_use]
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// Opaque identity of the user owning a signal source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Network-facing capability of a live signal source.
///
/// Both registry entry kinds expose themselves to the network through this
/// trait; the network never owns an entry, it only holds a registration.
pub trait TransmitterSource {
    /// The channel this source transmits on.
    fn frequency(&self) -> &FrequencyPair;

    /// Where the source currently sits in the world.
    fn location(&self) -> Location;

    /// Transmitted signal level, 0..15. Zero whenever the source is silenced.
    fn strength(&self) -> u8;

    /// The user owning this source.
    fn owner(&self) -> UserId;
}

/// The external signal network, reduced to the four operations the core
/// needs.
pub trait SignalNetwork {
    /// Registers a source with the network.
    fn add_entry(&mut self, source: &dyn TransmitterSource);

    /// Unregisters a source from the network.
    fn remove_entry(&mut self, source: &dyn TransmitterSource);

    /// Pushes a source's current level to the network.
    fn update_entry(&mut self, source: &dyn TransmitterSource);

    /// Number of members currently listening on a frequency.
    fn members_of(&self, frequency: &FrequencyPair) -> usize;
}

/// Receives the one-shot usage award fired the first time a source finds a
/// listening member on the network.
pub trait UsageListener {
    /// Awards a usage event to the owning user.
    fn award_usage(&mut self, user: UserId);
}

/// Usage listener that ignores every award.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopUsage;

impl UsageListener for NoopUsage {
    fn award_usage(&mut self, _user: UserId) {}
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::HashMap;

    /// Recording network for tests: counts calls and serves configured
    /// listener counts.
    #[derive(Debug, Default)]
    pub struct RecordingNetwork {
        pub added: Vec<(UserId, FrequencyPair)>,
        pub removed: Vec<(UserId, FrequencyPair)>,
        pub updated: Vec<(UserId, FrequencyPair, u8)>,
        pub listeners: HashMap<FrequencyPair, usize>,
    }

    impl RecordingNetwork {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_listeners(&mut self, frequency: FrequencyPair, count: usize) {
            self.listeners.insert(frequency, count);
        }
    }

    impl SignalNetwork for RecordingNetwork {
        fn add_entry(&mut self, source: &dyn TransmitterSource) {
            self.added.push((source.owner(), source.frequency().clone()));
        }

        fn remove_entry(&mut self, source: &dyn TransmitterSource) {
            self.removed.push((source.owner(), source.frequency().clone()));
        }

        fn update_entry(&mut self, source: &dyn TransmitterSource) {
            self.updated
                .push((source.owner(), source.frequency().clone(), source.strength()));
        }

        fn members_of(&self, frequency: &FrequencyPair) -> usize {
            self.listeners.get(frequency).copied().unwrap_or(0)
        }
    }

    /// Usage listener that records every award.
    #[derive(Debug, Default)]
    pub struct RecordingUsage {
        pub awards: Vec<UserId>,
    }

    impl UsageListener for RecordingUsage {
        fn award_usage(&mut self, user: UserId) {
            self.awards.push(user);
        }
    }
}
