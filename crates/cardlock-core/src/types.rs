use crate::{Result, constants::UID_LENGTH, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Card unique identifier (4 bytes, as returned by the reader's select step).
///
/// The canonical text form is the bracketed hex list printed by the reader
/// firmware, e.g. `[0x93, 0x13, 0xF9, 0x02]`. Every byte is printed with two
/// hex digits, so two different identifiers never share a text form.
///
/// # Security
/// Equality uses constant-time comparison so that probing the allow-list with
/// forged identifiers leaks nothing through timing.
///
/// # Examples
///
/// ```
/// use cardlock_core::CardId;
///
/// let card = CardId::new([0x93, 0x13, 0xF9, 0x02]);
/// assert_eq!(card.to_string(), "[0x93, 0x13, 0xF9, 0x02]");
///
/// let parsed: CardId = "[0x93, 0x13, 0xF9, 0x02]".parse().unwrap();
/// assert_eq!(parsed, card);
/// ```
#[derive(Clone, Copy, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CardId([u8; UID_LENGTH]);

impl CardId {
    /// Create a card identifier from its raw bytes.
    #[must_use]
    pub const fn new(bytes: [u8; UID_LENGTH]) -> Self {
        CardId(bytes)
    }

    /// Create a card identifier from a byte slice.
    ///
    /// # Errors
    /// Returns `Error::InvalidCardId` if the slice is not exactly
    /// [`UID_LENGTH`] bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; UID_LENGTH] = bytes.try_into().map_err(|_| {
            Error::InvalidCardId(format!(
                "Card identifier must be {UID_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(CardId(raw))
    }

    /// Get the raw identifier bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; UID_LENGTH] {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "0x{byte:02X}")?;
        }
        write!(f, "]")
    }
}

impl fmt::Debug for CardId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("CardId")
            .field(&format_args!("{self}"))
            .finish()
    }
}

impl std::str::FromStr for CardId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidCardId(format!("Expected `[0xNN, ...]`, got '{s}'"));

        let inner = s
            .trim()
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(invalid)?;

        let bytes = inner
            .split(',')
            .map(|part| {
                let part = part.trim();
                let digits = part
                    .strip_prefix("0x")
                    .or_else(|| part.strip_prefix("0X"))
                    .ok_or_else(invalid)?;
                if digits.is_empty() || digits.len() > 2 {
                    return Err(invalid());
                }
                u8::from_str_radix(digits, 16).map_err(|_| invalid())
            })
            .collect::<Result<Vec<u8>>>()?;

        CardId::from_slice(&bytes)
    }
}

impl TryFrom<String> for CardId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<CardId> for String {
    fn from(card: CardId) -> Self {
        card.to_string()
    }
}

impl From<[u8; UID_LENGTH]> for CardId {
    fn from(bytes: [u8; UID_LENGTH]) -> Self {
        CardId(bytes)
    }
}

/// Constant-time comparison implementation for CardId
impl PartialEq for CardId {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl std::hash::Hash for CardId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// Outcome of looking a card up in the allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Regular access: the lock opens.
    Granted,
    /// Access with the extended celebration sequence.
    SecretGranted,
    /// Recognized card that flips the auxiliary lighting instead of opening.
    ToggleLights,
    /// Unknown card.
    Denied,
}

impl Decision {
    /// Returns `true` if this decision opens the lock.
    #[inline]
    #[must_use]
    pub fn opens_lock(self) -> bool {
        matches!(self, Decision::Granted | Decision::SecretGranted)
    }

    /// Returns `true` for every decision except `Denied`.
    #[inline]
    #[must_use]
    pub fn is_recognized(self) -> bool {
        !matches!(self, Decision::Denied)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Decision::Granted => write!(f, "Granted"),
            Decision::SecretGranted => write!(f, "SecretGranted"),
            Decision::ToggleLights => write!(f, "ToggleLights"),
            Decision::Denied => write!(f, "Denied"),
        }
    }
}

impl std::str::FromStr for Decision {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "granted" => Ok(Decision::Granted),
            "secret_granted" | "secretgranted" => Ok(Decision::SecretGranted),
            "toggle_lights" | "togglelights" => Ok(Decision::ToggleLights),
            "denied" => Ok(Decision::Denied),
            _ => Err(Error::InvalidDecision(s.to_string())),
        }
    }
}

/// RGB intensity triple for the LED strip.
///
/// The palette is deliberately dim (30/255): the strip sits right next to the
/// reader and full brightness is blinding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Idle and denied colour.
    pub const RED: Color = Color::new(30, 0, 0);
    /// Granted colour.
    pub const GREEN: Color = Color::new(0, 30, 0);
    /// Light-toggle colour.
    pub const BLUE: Color = Color::new(0, 0, 30);
    /// All channels off.
    pub const BLACK: Color = Color::new(0, 0, 0);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// Get the components as an `(r, g, b)` tuple.
    #[must_use]
    pub fn as_rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

/// Result of one reader poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollResult {
    /// No card answered, or the reader failed to select one.
    NoCard,
    /// A card was selected.
    Card(CardId),
}

impl PollResult {
    /// Get the selected card, if any.
    #[inline]
    #[must_use]
    pub fn card(self) -> Option<CardId> {
        match self {
            PollResult::Card(card) => Some(card),
            PollResult::NoCard => None,
        }
    }

    /// Returns `true` if a card was selected.
    #[inline]
    #[must_use]
    pub fn is_card(self) -> bool {
        matches!(self, PollResult::Card(_))
    }
}

impl From<Option<CardId>> for PollResult {
    fn from(card: Option<CardId>) -> Self {
        card.map_or(PollResult::NoCard, PollResult::Card)
    }
}

impl fmt::Display for PollResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PollResult::NoCard => write!(f, "no card"),
            PollResult::Card(card) => write!(f, "card {card}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case([0x93, 0x13, 0xF9, 0x02], "[0x93, 0x13, 0xF9, 0x02]")]
    #[case([0x34, 0x83, 0xE9, 0x74], "[0x34, 0x83, 0xE9, 0x74]")]
    #[case([0x00, 0x01, 0x0A, 0xFF], "[0x00, 0x01, 0x0A, 0xFF]")]
    fn test_card_id_display(#[case] bytes: [u8; 4], #[case] expected: &str) {
        assert_eq!(CardId::new(bytes).to_string(), expected);
    }

    #[rstest]
    #[case("[0x2C, 0x4E, 0xA8, 0x17]", [0x2C, 0x4E, 0xA8, 0x17])]
    #[case("[0x2c,0x4e,0xa8,0x17]", [0x2C, 0x4E, 0xA8, 0x17])]
    #[case("  [0X1, 0x02, 0x3, 0x04]  ", [0x01, 0x02, 0x03, 0x04])]
    fn test_card_id_parse_valid(#[case] input: &str, #[case] expected: [u8; 4]) {
        let card: CardId = input.parse().unwrap();
        assert_eq!(card.as_bytes(), &expected);
    }

    #[rstest]
    #[case("0x2C, 0x4E, 0xA8, 0x17")] // missing brackets
    #[case("[0x2C, 0x4E, 0xA8]")] // too short
    #[case("[0x2C, 0x4E, 0xA8, 0x17, 0x00]")] // too long
    #[case("[2C, 4E, A8, 17]")] // missing prefix
    #[case("[0x2C, 0x4E, 0xA8, 0x117]")] // three digits
    #[case("[0xZZ, 0x4E, 0xA8, 0x17]")] // not hex
    #[case("[]")]
    fn test_card_id_parse_invalid(#[case] input: &str) {
        let result: Result<CardId> = input.parse();
        assert!(matches!(result, Err(Error::InvalidCardId(_))));
    }

    #[rstest]
    #[case(&[])]
    #[case(&[0x01, 0x02, 0x03])]
    #[case(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07])]
    fn test_card_id_from_slice_wrong_length(#[case] bytes: &[u8]) {
        assert!(CardId::from_slice(bytes).is_err());
    }

    #[test]
    fn test_card_id_equality_is_bytewise() {
        let a = CardId::new([0x93, 0x13, 0xF9, 0x02]);
        let b = CardId::from_slice(&[0x93, 0x13, 0xF9, 0x02]).unwrap();
        let c = CardId::new([0x93, 0x13, 0xF9, 0x03]);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_card_id_debug_uses_hex_form() {
        let card = CardId::new([0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(format!("{card:?}"), "CardId([0xDE, 0xAD, 0xBE, 0xEF])");
    }

    #[test]
    fn test_card_id_serde_uses_text_form() {
        let card = CardId::new([0x34, 0x83, 0xE9, 0x74]);
        let json = serde_json::to_string(&card).unwrap();
        assert_eq!(json, "\"[0x34, 0x83, 0xE9, 0x74]\"");

        let back: CardId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, card);

        assert!(serde_json::from_str::<CardId>("\"[0x34]\"").is_err());
    }

    #[rstest]
    #[case("granted", Decision::Granted)]
    #[case("SecretGranted", Decision::SecretGranted)]
    #[case("toggle_lights", Decision::ToggleLights)]
    #[case(" DENIED ", Decision::Denied)]
    fn test_decision_parse(#[case] input: &str, #[case] expected: Decision) {
        assert_eq!(input.parse::<Decision>().unwrap(), expected);
    }

    #[test]
    fn test_decision_parse_invalid() {
        assert!("open".parse::<Decision>().is_err());
    }

    #[test]
    fn test_decision_flags() {
        assert!(Decision::Granted.opens_lock());
        assert!(Decision::SecretGranted.opens_lock());
        assert!(!Decision::ToggleLights.opens_lock());
        assert!(!Decision::Denied.opens_lock());

        assert!(Decision::ToggleLights.is_recognized());
        assert!(!Decision::Denied.is_recognized());
    }

    #[test]
    fn test_decision_serde_snake_case() {
        let json = serde_json::to_string(&Decision::SecretGranted).unwrap();
        assert_eq!(json, "\"secret_granted\"");
    }

    #[test]
    fn test_palette() {
        assert_eq!(Color::RED.as_rgb(), (30, 0, 0));
        assert_eq!(Color::GREEN.as_rgb(), (0, 30, 0));
        assert_eq!(Color::BLUE.as_rgb(), (0, 0, 30));
        assert_eq!(Color::BLACK.as_rgb(), (0, 0, 0));
        assert_eq!(Color::default(), Color::BLACK);
    }

    #[test]
    fn test_poll_result_conversions() {
        let card = CardId::new([1, 2, 3, 4]);

        assert_eq!(PollResult::from(Some(card)), PollResult::Card(card));
        assert_eq!(PollResult::from(None), PollResult::NoCard);
        assert_eq!(PollResult::Card(card).card(), Some(card));
        assert!(!PollResult::NoCard.is_card());
    }
}
