//! Caller-supplied arguments for injected callables

use crate::provider::{Injectable, Instance, erase};
use std::borrow::Cow;
use std::sync::Arc;

/// Arguments supplied by the caller of an injected callable.
///
/// Positional arguments fill parameters in declaration order; named
/// arguments match parameters by name. Anything supplied here takes
/// precedence over injection.
///
/// # Examples
///
/// ```rust
/// use yedi::Args;
///
/// let args = Args::new()
///     .arg(123i64)
///     .with("message", "Hello".to_string());
///
/// assert_eq!(args.len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct Args {
    positional: Vec<Instance>,
    named: Vec<(Cow<'static, str>, Instance)>,
}

impl Args {
    /// No arguments
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument
    #[inline]
    pub fn arg<T: Injectable>(self, value: T) -> Self {
        self.arg_shared(Arc::new(value))
    }

    /// Append a positional argument that is already shared
    #[inline]
    pub fn arg_shared<T: ?Sized + Injectable>(mut self, value: Arc<T>) -> Self {
        self.positional.push(erase(value));
        self
    }

    /// Add a named argument
    #[inline]
    pub fn with<T: Injectable>(self, name: impl Into<Cow<'static, str>>, value: T) -> Self {
        self.with_shared(name, Arc::new(value))
    }

    /// Add a named argument that is already shared
    #[inline]
    pub fn with_shared<T: ?Sized + Injectable>(
        mut self,
        name: impl Into<Cow<'static, str>>,
        value: Arc<T>,
    ) -> Self {
        self.named.push((name.into(), erase(value)));
        self
    }

    /// Total number of arguments
    #[inline]
    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    /// Whether nothing was supplied
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn into_parts(self) -> (Vec<Instance>, Vec<(Cow<'static, str>, Instance)>) {
        (self.positional, self.named)
    }
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("positional", &self.positional.len())
            .field(
                "named",
                &self.named.iter().map(|(n, _)| n.as_ref()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
