//! Allow-list lookup.
//!
//! [`AccessPolicy`] maps a card identifier to a [`Decision`] by exact match
//! against a small fixed table. Anything not in the table is denied; there is
//! no prefix or fuzzy matching.
//!
//! The table is validated when the policy is built:
//!
//! - an identifier bound to two different decisions is rejected,
//! - an entry with decision `Denied` is rejected (unknown cards are denied
//!   anyway, so such an entry could only be a mistake),
//! - an exact duplicate entry is kept once.

use cardlock_core::{CardId, Decision, Error, Result};
use serde::{Deserialize, Serialize};

/// One allow-list binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AllowListEntry {
    /// Card identifier, written as `[0xNN, 0xNN, 0xNN, 0xNN]` in config files.
    pub card: CardId,
    /// Decision taken when this card is presented.
    pub decision: Decision,
}

impl AllowListEntry {
    #[must_use]
    pub const fn new(card: CardId, decision: Decision) -> Self {
        Self { card, decision }
    }
}

/// The allow-list compiled into the firmware.
pub const BUILTIN_ALLOW_LIST: [AllowListEntry; 3] = [
    AllowListEntry::new(CardId::new([0x93, 0x13, 0xF9, 0x02]), Decision::Granted),
    AllowListEntry::new(
        CardId::new([0x34, 0x83, 0xE9, 0x74]),
        Decision::SecretGranted,
    ),
    AllowListEntry::new(
        CardId::new([0x2C, 0x4E, 0xA8, 0x17]),
        Decision::ToggleLights,
    ),
];

/// Exact-match allow-list.
///
/// # Examples
///
/// ```
/// use cardlock_core::{CardId, Decision};
/// use cardlock_controller::AccessPolicy;
///
/// let policy = AccessPolicy::builtin();
///
/// assert_eq!(
///     policy.decide(CardId::new([0x34, 0x83, 0xE9, 0x74])),
///     Decision::SecretGranted
/// );
/// assert_eq!(policy.decide(CardId::new([0, 0, 0, 0])), Decision::Denied);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    entries: Vec<AllowListEntry>,
}

impl AccessPolicy {
    /// Build a policy from a list of entries.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConflictingEntry` if one card is bound to two
    /// decisions, or `Error::DeniedEntry` if an entry's decision is `Denied`.
    pub fn new(entries: impl IntoIterator<Item = AllowListEntry>) -> Result<Self> {
        let mut table: Vec<AllowListEntry> = Vec::new();

        for entry in entries {
            if entry.decision == Decision::Denied {
                return Err(Error::DeniedEntry {
                    card: entry.card.to_string(),
                });
            }

            match table.iter().find(|existing| existing.card == entry.card) {
                Some(existing) if existing.decision == entry.decision => continue,
                Some(existing) => {
                    return Err(Error::ConflictingEntry {
                        card: entry.card.to_string(),
                        first: existing.decision.to_string(),
                        second: entry.decision.to_string(),
                    });
                }
                None => table.push(entry),
            }
        }

        Ok(Self { entries: table })
    }

    /// The compiled-in allow-list.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_ALLOW_LIST.to_vec(),
        }
    }

    /// Look a card up.
    ///
    /// Every entry is compared, so the lookup takes the same time whether
    /// the card matches the first entry, the last one or none.
    #[must_use]
    pub fn decide(&self, card: CardId) -> Decision {
        let mut decision = Decision::Denied;
        for entry in &self.entries {
            if entry.card == card {
                decision = entry.decision;
            }
        }
        decision
    }

    /// The validated table.
    #[must_use]
    pub fn entries(&self) -> &[AllowListEntry] {
        &self.entries
    }

    /// Number of recognized cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no card is recognized (every card is denied).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::builtin()
    }
}
