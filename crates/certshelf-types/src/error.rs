/// Machine-distinguishable classification of a [`DecodeError`].
///
/// Callers match on the kind instead of the message text, which is meant for
/// display and may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeErrorKind {
    TruncatedInput,
    InvalidLengthEncoding,
    InvalidTagEncoding,
    DepthExceeded,
    TrailingData,
    InputTooLarge,
    InvalidOidEncoding,
    UnexpectedStructure,
    AttributeNotFound,
    InvalidTimeEncoding,
}

/// DER decoding and certificate extraction errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    // TLV layer
    #[error("truncated input at offset {offset}: need {need} bytes, {available} available")]
    TruncatedInput {
        offset: usize,
        need: usize,
        available: usize,
    },
    #[error("invalid length encoding at offset {offset}: {reason}")]
    InvalidLengthEncoding { offset: usize, reason: &'static str },
    #[error("invalid tag encoding at offset {offset}: {reason}")]
    InvalidTagEncoding { offset: usize, reason: &'static str },
    #[error("nesting depth exceeds limit of {limit}")]
    DepthExceeded { limit: usize },
    #[error("trailing data: {count} bytes after the top-level element")]
    TrailingData { count: usize },
    #[error("input of {size} bytes exceeds limit of {limit}")]
    InputTooLarge { size: usize, limit: usize },

    // Value layer
    #[error("invalid object identifier encoding: {reason}")]
    InvalidOidEncoding { reason: &'static str },
    #[error("invalid time encoding: {reason}")]
    InvalidTimeEncoding { reason: String },

    // Certificate schema
    #[error("unexpected structure in {step}: {detail}")]
    UnexpectedStructure { step: &'static str, detail: String },
    #[error("{attribute} not found in {name}")]
    AttributeNotFound {
        attribute: &'static str,
        name: &'static str,
    },
}

impl DecodeError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> DecodeErrorKind {
        match self {
            DecodeError::TruncatedInput { .. } => DecodeErrorKind::TruncatedInput,
            DecodeError::InvalidLengthEncoding { .. } => DecodeErrorKind::InvalidLengthEncoding,
            DecodeError::InvalidTagEncoding { .. } => DecodeErrorKind::InvalidTagEncoding,
            DecodeError::DepthExceeded { .. } => DecodeErrorKind::DepthExceeded,
            DecodeError::TrailingData { .. } => DecodeErrorKind::TrailingData,
            DecodeError::InputTooLarge { .. } => DecodeErrorKind::InputTooLarge,
            DecodeError::InvalidOidEncoding { .. } => DecodeErrorKind::InvalidOidEncoding,
            DecodeError::InvalidTimeEncoding { .. } => DecodeErrorKind::InvalidTimeEncoding,
            DecodeError::UnexpectedStructure { .. } => DecodeErrorKind::UnexpectedStructure,
            DecodeError::AttributeNotFound { .. } => DecodeErrorKind::AttributeNotFound,
        }
    }

    /// Shorthand for an [`DecodeError::UnexpectedStructure`] at `step`.
    pub fn unexpected(step: &'static str, detail: impl Into<String>) -> Self {
        DecodeError::UnexpectedStructure {
            step,
            detail: detail.into(),
        }
    }

    /// Shorthand for an [`DecodeError::InvalidTimeEncoding`].
    pub fn invalid_time(reason: impl Into<String>) -> Self {
        DecodeError::InvalidTimeEncoding {
            reason: reason.into(),
        }
    }
}

/// Certificate store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed store document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported store schema version {found} (supported up to {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("index {index} out of range for {len} stored certificates")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("invalid certificate: {0}")]
    Decode(#[from] DecodeError),
}

impl StoreError {
    /// Returns the decode error kind if this failure came from decoding.
    pub fn decode_kind(&self) -> Option<DecodeErrorKind> {
        match self {
            StoreError::Decode(e) => Some(e.kind()),
            _ => None,
        }
    }
}
