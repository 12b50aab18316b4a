use alloc::string::String;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors returned by the encoder, the block codec and the decoder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The (compressed) payload has zero length, so there is nothing to slice.
    #[error("cannot encode empty payload")]
    EmptyPayload,
    /// A slice size of zero was requested.
    #[error("slice size must be positive")]
    ZeroSliceSize,
    /// The payload length or slice count does not fit in a 32-bit header word.
    #[error("payload too large: {size} bytes")]
    PayloadTooLarge { size: usize },
    /// The block header is structurally inconsistent.
    #[error("malformed block: {0}")]
    MalformedBlock(#[from] Malformed),
    /// The reconstructed payload does not match the transmitted checksum.
    #[error("integrity check failed: expected checksum {expected:#010x}, got {actual:#010x}")]
    IntegrityFailure { expected: u32, actual: u32 },
    /// A block disagrees with the transmission the decoder is assembling.
    #[error("block does not belong to this transmission")]
    InconsistentBlock,
    /// The compression transform failed or is unavailable.
    #[error("compression error: {0}")]
    Compression(String),
}

/// The ways a serialized block can be structurally invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Malformed {
    #[error("buffer too short: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("degree is zero")]
    ZeroDegree,
    #[error("duplicate index {0}")]
    DuplicateIndex(u32),
    #[error("index {index} out of range for {k} slices")]
    IndexOutOfRange { index: u32, k: u32 },
}
