use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Card identifier errors
    #[error("Invalid card identifier: {0}")]
    InvalidCardId(String),

    // Allow-list errors
    #[error("Card {card} is bound to both {first} and {second}")]
    ConflictingEntry {
        card: String,
        first: String,
        second: String,
    },

    #[error("Card {card} cannot be listed with decision Denied")]
    DeniedEntry { card: String },

    #[error("Invalid decision: {0}")]
    InvalidDecision(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing configuration key: {0}")]
    MissingConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
