//! # Transmitter Source Registry
//!
//! Authoritative bookkeeping of live signal sources per user.
//!
//! Every decoded input message refreshes or creates entries here; a periodic
//! decay pass ([`SourceRegistry::tick`]) expires entries whose owner went
//! silent. Receives are idempotent: a duplicate message refreshes the one
//! existing entry instead of registering a second source.
//!
//! Entries come in two kinds, keyed separately per `(user, frequency)`:
//! - **fixed** sources, driven by button state, always at full strength
//! - **variable** sources, driven by axis state, at the last reported level
//!
//! A released or zeroed input silences its entry the same tick (strength 0
//! pushed to the network immediately); the entry itself is dropped on the
//! next decay pass.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::network::{
    FrequencyPair, Location, SignalNetwork, TransmitterSource, UsageListener, UserId,
};

/// Decay passes an untouched entry survives before eviction.
///
/// An entry created at tick T is live through T+29 and gone at T+30.
pub const SOURCE_TIMEOUT_TICKS: i32 = 30;

/// Signal level of a fixed source, and the ceiling for variable ones.
pub const STRENGTH_MAX: u8 = 15;

/// The two source kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Button-driven, always at full strength while alive.
    Fixed,
    /// Axis-driven, at the last reported level.
    Variable { level: u8 },
}

/// One live source registration.
#[derive(Debug, Clone)]
pub struct SourceEntry {
    owner: UserId,
    frequency: FrequencyPair,
    location: Location,
    /// Remaining decay passes; at or below zero the source is silent and
    /// gets dropped on the next pass.
    countdown: i32,
    /// Whether the one-shot usage award already fired for this entry.
    awarded: bool,
    kind: SourceKind,
}

impl SourceEntry {
    fn new(owner: UserId, frequency: FrequencyPair, location: Location, kind: SourceKind) -> Self {
        Self {
            owner,
            frequency,
            location,
            countdown: SOURCE_TIMEOUT_TICKS,
            awarded: false,
            kind,
        }
    }

    /// The kind this entry was registered as.
    #[must_use]
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    fn refresh(&mut self, location: Location) {
        self.countdown = SOURCE_TIMEOUT_TICKS;
        self.location = location;
    }

    fn silence(&mut self) {
        self.countdown = 0;
    }
}

impl TransmitterSource for SourceEntry {
    fn frequency(&self) -> &FrequencyPair {
        &self.frequency
    }

    fn location(&self) -> Location {
        self.location
    }

    fn strength(&self) -> u8 {
        if self.countdown <= 0 {
            return 0;
        }
        match self.kind {
            SourceKind::Fixed => STRENGTH_MAX,
            SourceKind::Variable { level } => level,
        }
    }

    fn owner(&self) -> UserId {
        self.owner
    }
}

/// Live entries of one user, one slot per frequency and kind.
#[derive(Debug, Default)]
struct UserSources {
    fixed: HashMap<FrequencyPair, SourceEntry>,
    variable: HashMap<FrequencyPair, SourceEntry>,
}

impl UserSources {
    fn is_empty(&self) -> bool {
        self.fixed.is_empty() && self.variable.is_empty()
    }

    fn len(&self) -> usize {
        self.fixed.len() + self.variable.len()
    }
}

/// Registry of every live source, across users.
///
/// Owned by the authoritative tick loop; all operations are synchronous.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    users: HashMap<UserId, UserSources>,
}

impl SourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of live entries.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.users.values().map(UserSources::len).sum()
    }

    /// True when no user has any live entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Current strength of a user's fixed source on a frequency.
    #[must_use]
    pub fn fixed_strength(&self, user: UserId, frequency: &FrequencyPair) -> Option<u8> {
        self.users
            .get(&user)
            .and_then(|sources| sources.fixed.get(frequency))
            .map(TransmitterSource::strength)
    }

    /// Current strength of a user's variable source on a frequency.
    #[must_use]
    pub fn variable_strength(&self, user: UserId, frequency: &FrequencyPair) -> Option<u8> {
        self.users
            .get(&user)
            .and_then(|sources| sources.variable.get(frequency))
            .map(TransmitterSource::strength)
    }

    /// Applies one button-driven event for a frequency.
    ///
    /// A press refreshes the user's fixed entry on that frequency, creating
    /// and registering it on first contact. A release silences the entry the
    /// same tick; the next decay pass drops it. Incomplete frequencies are
    /// ignored.
    pub fn receive_button_event(
        &mut self,
        net: &mut dyn SignalNetwork,
        user: UserId,
        frequency: &FrequencyPair,
        location: Location,
        pressed: bool,
    ) {
        if !frequency.is_complete() {
            return;
        }
        let sources = self.users.entry(user).or_default();
        if pressed {
            match sources.fixed.get_mut(frequency) {
                Some(entry) => entry.refresh(location),
                None => {
                    let entry =
                        SourceEntry::new(user, frequency.clone(), location, SourceKind::Fixed);
                    net.add_entry(&entry);
                    debug!("fixed source up: user {:?} on {:?}", user, frequency);
                    sources.fixed.insert(frequency.clone(), entry);
                }
            }
        } else if let Some(entry) = sources.fixed.get_mut(frequency) {
            entry.silence();
            net.update_entry(entry);
            trace!("fixed source silenced: user {:?} on {:?}", user, frequency);
        }
    }

    /// Applies one axis-driven level for a frequency.
    ///
    /// A positive level refreshes the user's variable entry at that level,
    /// creating and registering it on first contact. Level zero silences the
    /// entry the same tick, like a button release.
    pub fn receive_axis_level(
        &mut self,
        net: &mut dyn SignalNetwork,
        user: UserId,
        frequency: &FrequencyPair,
        location: Location,
        level: u8,
    ) {
        if !frequency.is_complete() {
            return;
        }
        let sources = self.users.entry(user).or_default();
        if level == 0 {
            if let Some(entry) = sources.variable.get_mut(frequency) {
                entry.silence();
                net.update_entry(entry);
            }
            return;
        }
        let kind = SourceKind::Variable {
            level: level.min(STRENGTH_MAX),
        };
        match sources.variable.get_mut(frequency) {
            Some(entry) => {
                entry.refresh(location);
                entry.kind = kind;
            }
            None => {
                let entry = SourceEntry::new(user, frequency.clone(), location, kind);
                net.add_entry(&entry);
                debug!(
                    "variable source up: user {:?} on {:?} at {}",
                    user, frequency, level
                );
                sources.variable.insert(frequency.clone(), entry);
            }
        }
    }

    /// Runs one decay pass.
    ///
    /// Decrements every countdown, drops and unregisters expired entries,
    /// pushes the surviving variable levels to the network and fires the
    /// one-shot usage award for entries that found their first listener.
    pub fn tick(&mut self, net: &mut dyn SignalNetwork, usage: &mut dyn UsageListener) {
        self.users.retain(|user, sources| {
            sources
                .fixed
                .retain(|_, entry| decay_entry(entry, false, net, usage));
            sources
                .variable
                .retain(|_, entry| decay_entry(entry, true, net, usage));
            if sources.is_empty() {
                trace!("pruned user {:?}", user);
                false
            } else {
                true
            }
        });
    }
}

/// Ages one entry; returns whether it survives.
fn decay_entry(
    entry: &mut SourceEntry,
    push_level: bool,
    net: &mut dyn SignalNetwork,
    usage: &mut dyn UsageListener,
) -> bool {
    entry.countdown -= 1;
    if entry.countdown <= 0 {
        net.remove_entry(entry);
        debug!(
            "source expired: user {:?} on {:?}",
            entry.owner, entry.frequency
        );
        return false;
    }
    if push_level {
        net.update_entry(entry);
    }
    if !entry.awarded && net.members_of(&entry.frequency) > 0 {
        usage.award_usage(entry.owner);
        entry.awarded = true;
    }
    true
}
