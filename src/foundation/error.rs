/// Convenience result type used across the engine.
pub type TableResult<T> = Result<T, TableError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Lookups never produce errors (a missing rule is `None`); these variants cover rejected
/// mutations, persisted-data problems and file IO. The `Display` strings are stable so UIs and
/// remote callers can surface them verbatim.
#[derive(thiserror::Error, Debug)]
pub enum TableError {
    /// Invalid caller-provided data (empty names, empty transition, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// A canvas, scene pair or rule set that the operation requires does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A rule set with the requested name already exists.
    #[error("a rule set named '{0}' already exists")]
    NameCollision(String),

    /// The registry must keep at least one rule set.
    #[error("cannot delete '{0}': it is the only remaining rule set")]
    LastSet(String),

    /// An import/export is in progress and the request would interleave with it.
    #[error("busy: {0}")]
    Busy(String),

    /// Errors when serializing or deserializing persisted data.
    #[error("serialization error: {0}")]
    Serde(String),

    /// File IO failure during import/export.
    #[error("io error: {0}")]
    Io(String),

    /// Wrapped lower-level error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TableError {
    /// Build a [`TableError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TableError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`TableError::NameCollision`] value.
    pub fn name_collision(name: impl Into<String>) -> Self {
        Self::NameCollision(name.into())
    }

    /// Build a [`TableError::Busy`] value.
    pub fn busy(msg: impl Into<String>) -> Self {
        Self::Busy(msg.into())
    }

    /// Build a [`TableError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`TableError::Io`] value.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
