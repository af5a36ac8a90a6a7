//! Error types for dependency injection

use crate::Key;
use std::any::TypeId;
use std::sync::Arc;
use thiserror::Error;

/// Error raised by a user-supplied constructor or factory.
pub type StrategyError = Arc<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during registration, resolution or injection
#[derive(Error, Debug, Clone)]
pub enum DiError {
    /// No provider is registered for the requested key
    #[error("No provider registered for {type_name}")]
    NoProvider {
        type_name: &'static str,
        type_id: TypeId,
    },

    /// A key was requested again while it was still being resolved
    #[error("Cyclic dependency detected while resolving {type_name}: {chain}")]
    CyclicDependency {
        type_name: &'static str,
        chain: String,
    },

    /// A provider's constructor has a parameter the container cannot fill
    #[error("Cannot resolve undeclared parameter `{parameter}` of {provider}")]
    Unresolvable {
        parameter: String,
        provider: &'static str,
    },

    /// A non-injectable parameter was not supplied by the caller
    #[error("Missing argument `{parameter}`")]
    MissingArgument { parameter: String },

    /// A named argument does not match any parameter
    #[error("Unexpected argument `{parameter}`")]
    UnexpectedArgument { parameter: String },

    /// A parameter was supplied both by position and by name
    #[error("Argument `{parameter}` supplied more than once")]
    DuplicateArgument { parameter: String },

    /// More positional arguments than parameters
    #[error("Expected at most {expected} positional arguments, got {given}")]
    TooManyArguments { expected: usize, given: usize },

    /// A supplied or resolved argument has the wrong type
    #[error("Argument `{parameter}` is not a {expected}")]
    ArgumentType {
        parameter: String,
        expected: &'static str,
    },

    /// A provider produced a value that is not the registered key type
    #[error("Provider for {expected} produced a value of another type")]
    TypeMismatch { expected: &'static str },

    /// Error returned by a user-supplied strategy, passed through as-is
    #[error(transparent)]
    Strategy(StrategyError),
}

impl DiError {
    /// Create a NoProvider error for a key
    #[inline]
    pub fn no_provider(key: &Key) -> Self {
        Self::NoProvider {
            type_name: key.name(),
            type_id: key.id(),
        }
    }

    /// Create a NoProvider error for a type
    #[inline]
    pub fn not_found<T: ?Sized + 'static>() -> Self {
        Self::no_provider(&Key::of::<T>())
    }

    /// Create a CyclicDependency error from the chain of keys being resolved
    pub fn cyclic(key: &Key, chain: &[Key]) -> Self {
        let chain = chain
            .iter()
            .chain(std::iter::once(key))
            .map(Key::name)
            .collect::<Vec<_>>()
            .join(" -> ");
        Self::CyclicDependency {
            type_name: key.name(),
            chain,
        }
    }

    /// Wrap an error returned by a user-supplied strategy
    #[inline]
    pub fn strategy(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Strategy(Arc::from(error.into()))
    }

    /// Whether this is a missing-provider error
    #[inline]
    pub fn is_no_provider(&self) -> bool {
        matches!(self, Self::NoProvider { .. })
    }

    /// Whether this is a cycle error
    #[inline]
    pub fn is_cyclic(&self) -> bool {
        matches!(self, Self::CyclicDependency { .. })
    }
}

/// Result type alias for DI operations
pub type Result<T> = std::result::Result<T, DiError>;

#[cfg(test)]
mod tests {
    use super::*;

    struct Database;
    struct Cache;

    #[test]
    fn test_no_provider_message() {
        let err = DiError::not_found::<Database>();
        assert!(err.is_no_provider());
        assert!(err.to_string().starts_with("No provider registered for"));
        assert!(err.to_string().contains("Database"));
    }

    #[test]
    fn test_cyclic_chain() {
        let db = Key::of::<Database>();
        let cache = Key::of::<Cache>();
        let err = DiError::cyclic(&db, &[db, cache]);

        match &err {
            DiError::CyclicDependency { chain, .. } => {
                assert_eq!(chain.matches(" -> ").count(), 2);
                assert!(chain.ends_with(db.name()));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.is_cyclic());
    }

    #[test]
    fn test_strategy_is_transparent() {
        #[derive(Debug, thiserror::Error)]
        #[error("connection refused")]
        struct ConnectError;

        let err = DiError::strategy(ConnectError);
        assert_eq!(err.to_string(), "connection refused");

        let DiError::Strategy(inner) = &err else {
            panic!("expected strategy error");
        };
        assert!(inner.downcast_ref::<ConnectError>().is_some());
    }
}
