use thiserror::Error;

/// Contract error for misuse of the diff engine.
///
/// Unlike admission and extraction failures, which are contained and surfaced
/// as data, this error indicates a caller bug and is never folded into a
/// record ledger or parse-error list.
#[derive(Debug, Error)]
pub enum DiffError {
    /// An operand serialized to something other than a named-field record.
    #[error("diff operand is not a record (serialized to {got} instead of an object)")]
    NotARecord {
        /// What the operand serialized to instead.
        got: &'static str,
    },
    /// An operand could not be serialized at all.
    #[error("failed to serialize diff operand: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Raised by an extractor when the input is not the expected page type at all.
///
/// Recoverable per-field and per-record issues are reported as data instead;
/// this error is reserved for "there is no such page here". The snapshot
/// cache converts it into an empty tagged snapshot rather than propagating.
#[derive(Debug, Error)]
pub enum PageTypeError {
    /// No product listing markup and no page id were found in the input.
    #[error("product listing markup was not found in the input")]
    NotAProductPage,
    /// The location directory payload was not found or could not be decoded.
    #[error("location directory data was not found in the input ({0})")]
    NotALocationPage(String),
}
