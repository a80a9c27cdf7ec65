//! Debounce of a card held in front of the reader.
//!
//! The reader sees a card on every poll for as long as it stays in the field.
//! A card that is held continuously must trigger exactly one feedback
//! sequence; taking it away and presenting it again (even the same card)
//! triggers a new one.

use std::fmt;

use cardlock_core::{CardId, PollResult};

/// What the control loop should do with one poll result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Same card as the one already processed and still in the field.
    Ignore,
    /// New card: decide and run its feedback sequence.
    Process(CardId),
    /// Field is empty: forget the previous card.
    ClearPrevious,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Ignore => write!(f, "Ignore"),
            Action::Process(card) => write!(f, "Process({card})"),
            Action::ClearPrevious => write!(f, "ClearPrevious"),
        }
    }
}

/// Stateless debounce filter.
///
/// The state it filters against (`previous`) belongs to the control loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebounceGate;

impl DebounceGate {
    /// Classify a poll result against the previously processed card.
    ///
    /// # Examples
    ///
    /// ```
    /// use cardlock_core::{CardId, PollResult};
    /// use cardlock_controller::{Action, DebounceGate};
    ///
    /// let card = CardId::new([1, 2, 3, 4]);
    ///
    /// assert_eq!(DebounceGate::admit(PollResult::Card(card), None), Action::Process(card));
    /// assert_eq!(DebounceGate::admit(PollResult::Card(card), Some(card)), Action::Ignore);
    /// assert_eq!(DebounceGate::admit(PollResult::NoCard, Some(card)), Action::ClearPrevious);
    /// ```
    #[must_use]
    pub fn admit(current: PollResult, previous: Option<CardId>) -> Action {
        match current {
            PollResult::NoCard => Action::ClearPrevious,
            PollResult::Card(card) if previous == Some(card) => Action::Ignore,
            PollResult::Card(card) => Action::Process(card),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: CardId = CardId::new([0xAA, 0x00, 0x00, 0x01]);
    const B: CardId = CardId::new([0xBB, 0x00, 0x00, 0x02]);

    #[test]
    fn test_no_card_always_clears() {
        assert_eq!(
            DebounceGate::admit(PollResult::NoCard, None),
            Action::ClearPrevious
        );
        assert_eq!(
            DebounceGate::admit(PollResult::NoCard, Some(A)),
            Action::ClearPrevious
        );
    }

    #[test]
    fn test_different_card_is_processed() {
        assert_eq!(
            DebounceGate::admit(PollResult::Card(B), Some(A)),
            Action::Process(B)
        );
    }

    /// Replays polls through the gate the way the control loop does.
    fn replay(polls: &[PollResult]) -> Vec<Action> {
        let mut previous = None;
        polls
            .iter()
            .map(|poll| {
                let action = DebounceGate::admit(*poll, previous);
                match action {
                    Action::ClearPrevious => previous = None,
                    Action::Process(card) => previous = Some(card),
                    Action::Ignore => {}
                }
                action
            })
            .collect()
    }

    #[test]
    fn test_held_card_processed_once() {
        let actions = replay(&[PollResult::Card(A); 5]);

        assert_eq!(actions[0], Action::Process(A));
        assert!(actions[1..].iter().all(|a| *a == Action::Ignore));
    }

    #[test]
    fn test_representing_after_gap_reprocesses() {
        let actions = replay(&[
            PollResult::NoCard,
            PollResult::Card(A),
            PollResult::Card(A),
            PollResult::NoCard,
            PollResult::Card(A),
        ]);

        assert_eq!(
            actions,
            vec![
                Action::ClearPrevious,
                Action::Process(A),
                Action::Ignore,
                Action::ClearPrevious,
                Action::Process(A),
            ]
        );
    }

    #[test]
    fn test_swapping_cards_without_gap() {
        let actions = replay(&[
            PollResult::Card(A),
            PollResult::Card(B),
            PollResult::Card(A),
        ]);

        assert_eq!(
            actions,
            vec![Action::Process(A), Action::Process(B), Action::Process(A)]
        );
    }

    #[test]
    fn test_action_display() {
        assert_eq!(
            Action::Process(A).to_string(),
            "Process([0xAA, 0x00, 0x00, 0x01])"
        );
        assert_eq!(Action::Ignore.to_string(), "Ignore");
    }
}
