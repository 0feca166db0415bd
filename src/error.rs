//! Error handling types and utilities.

use std::fmt;

/// Boxed error kept as the source of a backend failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A specialized Result type for engine operations.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// External collaborator that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Search,
    Store,
    Cache,
    Assets,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Search => "search backend",
            Self::Store => "document store",
            Self::Cache => "cache store",
            Self::Assets => "asset catalog",
        })
    }
}

/// Errors surfaced by the search, resolution and caching engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Resolution found zero matches. Cacheable; renders as an empty state.
    #[error("{what} not found")]
    NotFound { what: String },

    /// A search, store, cache or asset call failed. The source is kept as-is.
    #[error("{backend} request failed: {source}")]
    Backend {
        backend: Backend,
        #[source]
        source: BoxError,
    },

    /// A required parameter was missing or unusable; no backend was called.
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

impl EngineError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn backend(backend: Backend, source: impl Into<BoxError>) -> Self {
        Self::Backend {
            backend,
            source: source.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput(message.into())
    }

    /// True for the cacheable "found nothing" outcome.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        Self::backend(Backend::Search, err)
    }
}

impl From<redis::RedisError> for EngineError {
    fn from(err: redis::RedisError) -> Self {
        Self::backend(Backend::Cache, err)
    }
}
