//! Error taxonomy for the order engine.
//!
//! Four kinds, translated to HTTP by the server layer:
//!
//! | variant        | HTTP | meaning                                            |
//! |----------------|------|----------------------------------------------------|
//! | `InvalidInput` | 400  | missing / malformed request fields                 |
//! | `NotFound`     | 404  | referenced order / menu item / set menu is absent  |
//! | `InvalidState` | 400  | operation not legal for the current status         |
//! | `Unexpected`   | 500  | persistence or internal failure                    |
//!
//! All four are detected synchronously during request handling; nothing is
//! retried and no partial success is ever reported. `Unexpected` messages are
//! logged server-side and never shown to callers verbatim.

// ---------------------------------------------------------------------------
// OrderError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    InvalidInput(String),
    NotFound(String),
    InvalidState(String),
    Unexpected(String),
}

impl OrderError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Wrap a lower-level failure (sqlx, pool, ...) as an internal error.
    pub fn unexpected(err: impl std::fmt::Display) -> Self {
        Self::Unexpected(err.to_string())
    }

    /// The caller-facing message carried by this error.
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput(m)
            | Self::NotFound(m)
            | Self::InvalidState(m)
            | Self::Unexpected(m) => m,
        }
    }
}

impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(m) => write!(f, "invalid input: {m}"),
            Self::NotFound(m) => write!(f, "not found: {m}"),
            Self::InvalidState(m) => write!(f, "invalid state: {m}"),
            Self::Unexpected(m) => write!(f, "unexpected: {m}"),
        }
    }
}

impl std::error::Error for OrderError {}
