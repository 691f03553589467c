use thiserror::Error;

/// Error type for share generation, mnemonic parsing and recovery.
///
/// Callers should match on the variant, not the message text.
#[derive(Debug, Error)]
pub enum Slip39Error {
    /// The requested split policy or one of its inputs is unusable.
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    /// A single mnemonic failed to parse, checksum or frame correctly.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// The supplied mnemonics do not form a recoverable share set.
    #[error("inconsistent share set: {0}")]
    InconsistentShareSet(String),

    /// The reconstructed digest share does not match the recovered secret,
    /// meaning at least one share is wrong or corrupted.
    #[error("share digest does not match the recovered secret")]
    DigestMismatch,
}
