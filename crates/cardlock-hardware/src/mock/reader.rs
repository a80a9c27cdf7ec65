//! Mock card reader implementation for testing and development.
//!
//! This module provides a simulated proximity reader that can be controlled
//! programmatically without requiring physical hardware.
//!
//! The reader answers each poll from, in order of priority:
//!
//! 1. an injected fault (one-shot, surfaces as an error from `reset`),
//! 2. the next entry of the scripted queue,
//! 3. the card currently held in the field, if any.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cardlock_core::{CardId, PollResult};

use crate::error::{HardwareError, Result};
use crate::traits::CardReader;
use crate::types::ReaderInfo;

#[derive(Debug, Default)]
struct ReaderState {
    script: VecDeque<PollResult>,
    in_field: Option<CardId>,
    fault: Option<HardwareError>,
    answered: Option<CardId>,
    polls: usize,
}

fn lock(state: &Arc<Mutex<ReaderState>>) -> MutexGuard<'_, ReaderState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock card reader for testing and development.
///
/// # Examples
///
/// ```
/// use cardlock_core::{CardId, PollResult};
/// use cardlock_hardware::mock::MockCardReader;
/// use cardlock_hardware::traits::CardReader;
///
/// let (mut reader, handle) = MockCardReader::new();
/// let card = CardId::new([0x2C, 0x4E, 0xA8, 0x17]);
///
/// handle.script([PollResult::Card(card), PollResult::NoCard]);
///
/// assert_eq!(reader.poll(), PollResult::Card(card));
/// assert_eq!(reader.poll(), PollResult::NoCard);
/// assert_eq!(reader.poll(), PollResult::NoCard); // script exhausted
/// ```
#[derive(Debug)]
pub struct MockCardReader {
    state: Arc<Mutex<ReaderState>>,

    /// Device name
    name: String,
}

impl MockCardReader {
    /// Create a new mock reader with the default name.
    ///
    /// Returns a tuple of (MockCardReader, MockCardReaderHandle) where the
    /// handle can be used to simulate card presentations.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (Self, MockCardReaderHandle) {
        Self::with_name("Mock MFRC522".to_string())
    }

    /// Create a new mock reader with a custom name.
    pub fn with_name(name: String) -> (Self, MockCardReaderHandle) {
        let state = Arc::new(Mutex::new(ReaderState::default()));
        let handle = MockCardReaderHandle {
            state: state.clone(),
        };
        (Self { state, name }, handle)
    }
}

impl CardReader for MockCardReader {
    fn reset(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        state.polls += 1;
        state.answered = None;
        match state.fault.take() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    fn request(&mut self) -> Result<bool> {
        let mut state = lock(&self.state);
        let answer = match state.script.pop_front() {
            Some(scripted) => scripted.card(),
            None => state.in_field,
        };
        state.answered = answer;
        Ok(answer.is_some())
    }

    fn select(&mut self) -> Result<CardId> {
        lock(&self.state)
            .answered
            .take()
            .ok_or_else(|| HardwareError::card_read("no card answered the request"))
    }

    fn reader_info(&self) -> ReaderInfo {
        ReaderInfo::new(self.name.clone(), vec!["ISO14443A".to_string()])
            .with_firmware_version(0x92)
    }
}

/// Handle for controlling a mock card reader.
#[derive(Debug, Clone)]
pub struct MockCardReaderHandle {
    state: Arc<Mutex<ReaderState>>,
}

impl MockCardReaderHandle {
    /// Hold a card in the reader's field; every poll returns it until it is
    /// removed (scripted results still take priority).
    pub fn present(&self, card: CardId) {
        lock(&self.state).in_field = Some(card);
    }

    /// Take the held card out of the field.
    pub fn remove(&self) {
        lock(&self.state).in_field = None;
    }

    /// Card currently held in the field, if any.
    pub fn card_in_field(&self) -> Option<CardId> {
        lock(&self.state).in_field
    }

    /// Queue poll results, answered one per poll before the held card.
    pub fn script(&self, results: impl IntoIterator<Item = PollResult>) {
        lock(&self.state).script.extend(results);
    }

    /// Number of scripted results not yet consumed.
    pub fn pending(&self) -> usize {
        lock(&self.state).script.len()
    }

    /// Make the next poll fail with `error`.
    pub fn fail_next_poll(&self, error: HardwareError) {
        lock(&self.state).fault = Some(error);
    }

    /// Number of polls started so far.
    pub fn poll_count(&self) -> usize {
        lock(&self.state).polls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD_A: CardId = CardId::new([0x01, 0x02, 0x03, 0x04]);
    const CARD_B: CardId = CardId::new([0x05, 0x06, 0x07, 0x08]);

    #[test]
    fn test_empty_field_returns_no_card() {
        let (mut reader, handle) = MockCardReader::new();

        assert_eq!(reader.poll(), PollResult::NoCard);
        assert_eq!(handle.poll_count(), 1);
    }

    #[test]
    fn test_held_card_is_returned_on_every_poll() {
        let (mut reader, handle) = MockCardReader::new();
        handle.present(CARD_A);

        for _ in 0..3 {
            assert_eq!(reader.poll(), PollResult::Card(CARD_A));
        }

        handle.remove();
        assert_eq!(reader.poll(), PollResult::NoCard);
        assert_eq!(handle.card_in_field(), None);
    }

    #[test]
    fn test_script_takes_priority_over_held_card() {
        let (mut reader, handle) = MockCardReader::new();
        handle.present(CARD_A);
        handle.script([PollResult::Card(CARD_B), PollResult::NoCard]);

        assert_eq!(reader.poll(), PollResult::Card(CARD_B));
        assert_eq!(reader.poll(), PollResult::NoCard);
        assert_eq!(handle.pending(), 0);
        assert_eq!(reader.poll(), PollResult::Card(CARD_A));
    }

    #[test]
    fn test_injected_fault_collapses_to_no_card() {
        let (mut reader, handle) = MockCardReader::new();
        handle.present(CARD_A);
        handle.fail_next_poll(HardwareError::communication("SPI timeout"));

        assert_eq!(reader.poll(), PollResult::NoCard);
        assert_eq!(reader.poll(), PollResult::Card(CARD_A));
    }

    #[test]
    fn test_injected_fault_is_visible_through_try_poll() {
        let (mut reader, handle) = MockCardReader::new();
        handle.fail_next_poll(HardwareError::card_read("anti-collision failed"));

        let result = reader.try_poll();
        assert!(matches!(result, Err(HardwareError::CardReadError { .. })));
    }

    #[test]
    fn test_select_without_request_fails() {
        let (mut reader, _handle) = MockCardReader::new();
        assert!(matches!(
            reader.select(),
            Err(HardwareError::CardReadError { .. })
        ));
    }

    #[test]
    fn test_reader_info() {
        let (reader, _handle) = MockCardReader::with_name("Door Reader".to_string());
        let info = reader.reader_info();

        assert_eq!(info.name, "Door Reader");
        assert!(info.protocols.contains(&"ISO14443A".to_string()));
    }
}
