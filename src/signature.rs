//! Signature inspection
//!
//! Rust has no runtime reflection over parameter types, so a callable's
//! signature is derived from its parameter types at compile time: every
//! parameter type implements [`Param`], which declares the [`Key`] it can be
//! injected under, and a parameter list implements [`Dependencies`].
//!
//! | Parameter type      | Declared key | Absent and not injectable |
//! |---------------------|--------------|---------------------------|
//! | `Arc<T>`            | `T`          | error                     |
//! | `String`, integers… | the type     | error                     |
//! | `Option<P>`         | `P`'s key    | `None`                    |
//! | [`Untyped`]         | none         | error                     |
//!
//! # Example
//!
//! ```rust
//! use yedi::{CallableKind, Signature};
//! use std::sync::Arc;
//!
//! struct Database;
//!
//! let signature = Signature::function::<(Arc<Database>, String)>()
//!     .with_names(["db", "query"]);
//!
//! assert_eq!(signature.kind(), CallableKind::Function);
//! assert_eq!(signature.position("query"), Some(1));
//! assert!(signature.parameters()[0].declared().is_some());
//! ```

use crate::provider::{Injectable, Instance, Key, unerase};
use crate::{DiError, Result};
use std::borrow::Cow;
use std::sync::Arc;

/// The three callable shapes a signature can describe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallableKind {
    /// Free function or closure
    Function,
    /// Instance method; the receiver is bound separately
    Method,
    /// Type constructor; the output is the type itself
    Constructor,
}

/// One formal parameter of a callable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: Cow<'static, str>,
    declared: Option<Key>,
    optional: bool,
}

impl Parameter {
    pub(crate) fn new(
        name: impl Into<Cow<'static, str>>,
        declared: Option<Key>,
        optional: bool,
    ) -> Self {
        Self {
            name: name.into(),
            declared,
            optional,
        }
    }

    /// Describe a parameter of type `P`
    #[inline]
    pub fn of<P: Param>(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, P::declared(), P::OPTIONAL)
    }

    /// The parameter name used for named arguments
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type, or `None` for an undeclared parameter
    #[inline]
    pub fn declared(&self) -> Option<&Key> {
        self.declared.as_ref()
    }

    /// Whether an absent value is acceptable
    #[inline]
    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

/// Ordered parameter list of a callable, receiver excluded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    kind: CallableKind,
    parameters: Vec<Parameter>,
    receiver: Option<Key>,
    output: Option<Key>,
}

impl Signature {
    pub(crate) fn new(
        kind: CallableKind,
        parameters: Vec<Parameter>,
        receiver: Option<Key>,
        output: Option<Key>,
    ) -> Self {
        Self {
            kind,
            parameters,
            receiver,
            output,
        }
    }

    /// Signature of a free function taking `D`
    pub fn function<D: Dependencies>() -> Self {
        Self::new(CallableKind::Function, D::parameters(), None, None)
    }

    /// Signature of a factory taking `D` and producing `output`
    pub fn factory<D: Dependencies>(output: Key) -> Self {
        Self {
            output: Some(output),
            ..Self::function::<D>()
        }
    }

    /// Signature of a method on `R` taking `D` after the receiver
    pub fn method<R: ?Sized + 'static, D: Dependencies>() -> Self {
        Self::new(
            CallableKind::Method,
            D::parameters(),
            Some(Key::of::<R>()),
            None,
        )
    }

    /// Signature of `T`'s constructor, named after [`Service::PARAMETERS`]
    pub fn constructor<T: Service>() -> Self {
        Self::new(
            CallableKind::Constructor,
            <T::Dependencies as Dependencies>::parameters(),
            None,
            Some(Key::of::<T>()),
        )
        .with_names(T::PARAMETERS.iter().copied())
    }

    /// Parameterless signature producing `output`
    pub(crate) fn constant(output: Key) -> Self {
        Self::factory::<()>(output)
    }

    /// Rename parameters in order. Extra names are ignored; parameters
    /// without a name keep their positional default (`arg0`, `arg1`, ...).
    pub fn with_names<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Cow<'static, str>>,
    {
        for (parameter, name) in self.parameters.iter_mut().zip(names) {
            parameter.name = name.into();
        }
        self
    }

    /// The callable shape
    #[inline]
    pub fn kind(&self) -> CallableKind {
        self.kind
    }

    /// Parameters in declaration order
    #[inline]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Position of the parameter called `name`
    #[inline]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.parameters.iter().position(|p| p.name() == name)
    }

    /// Receiver type for methods
    #[inline]
    pub fn receiver(&self) -> Option<&Key> {
        self.receiver.as_ref()
    }

    /// Produced type for constructors and factories
    #[inline]
    pub fn output(&self) -> Option<&Key> {
        self.output.as_ref()
    }

    /// Number of parameters
    #[inline]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Whether the callable takes no parameters
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

// =============================================================================
// Param - a single parameter type
// =============================================================================

/// A type that can appear as a parameter of an injectable callable.
///
/// Implemented for `Arc<T>`, `Option<P>`, [`Untyped`] and common owned value
/// types. Use [`param_by_clone!`](crate::param_by_clone) to accept your own
/// `Clone` types by value.
pub trait Param: Sized + 'static {
    /// Whether an absent argument is acceptable
    const OPTIONAL: bool = false;

    /// The key this parameter is injected under, `None` if undeclared
    fn declared() -> Option<Key>;

    /// Convert a bound value
    fn from_instance(instance: Instance, parameter: &str) -> Result<Self>;

    /// Value to use when nothing was supplied or resolved
    fn absent(parameter: &str) -> Result<Self> {
        Err(DiError::MissingArgument {
            parameter: parameter.to_owned(),
        })
    }
}

impl<T: ?Sized + Injectable> Param for Arc<T> {
    #[inline]
    fn declared() -> Option<Key> {
        Some(Key::of::<T>())
    }

    #[inline]
    fn from_instance(instance: Instance, parameter: &str) -> Result<Self> {
        unerase::<T>(&instance).ok_or_else(|| DiError::ArgumentType {
            parameter: parameter.to_owned(),
            expected: std::any::type_name::<T>(),
        })
    }
}

impl<P: Param> Param for Option<P> {
    const OPTIONAL: bool = true;

    #[inline]
    fn declared() -> Option<Key> {
        P::declared()
    }

    #[inline]
    fn from_instance(instance: Instance, parameter: &str) -> Result<Self> {
        P::from_instance(instance, parameter).map(Some)
    }

    #[inline]
    fn absent(_parameter: &str) -> Result<Self> {
        Ok(None)
    }
}

/// A parameter without a declared type.
///
/// Never injected; the caller must always supply it.
#[derive(Clone)]
pub struct Untyped(Instance);

impl Untyped {
    /// Try to view the value as an `Arc<T>`
    #[inline]
    pub fn downcast<T: ?Sized + Injectable>(&self) -> Option<Arc<T>> {
        unerase::<T>(&self.0)
    }

    /// The raw erased value
    #[inline]
    pub fn into_inner(self) -> Instance {
        self.0
    }
}

impl std::fmt::Debug for Untyped {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Untyped(..)")
    }
}

impl Param for Untyped {
    #[inline]
    fn declared() -> Option<Key> {
        None
    }

    #[inline]
    fn from_instance(instance: Instance, _parameter: &str) -> Result<Self> {
        Ok(Untyped(instance))
    }
}

/// Accept `Clone` types by value as injectable parameters.
///
/// The parameter is declared under the type's own key; supplied or resolved
/// values are cloned out of their shared `Arc`.
///
/// ```rust
/// #[derive(Clone)]
/// struct Settings { verbose: bool }
///
/// yedi::param_by_clone!(Settings);
/// ```
#[macro_export]
macro_rules! param_by_clone {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Param for $ty {
                #[inline]
                fn declared() -> ::std::option::Option<$crate::Key> {
                    ::std::option::Option::Some($crate::Key::of::<$ty>())
                }

                #[inline]
                fn from_instance(
                    instance: $crate::Instance,
                    parameter: &str,
                ) -> $crate::Result<Self> {
                    $crate::unerase::<$ty>(&instance)
                        .map(|value| <$ty as ::std::clone::Clone>::clone(&value))
                        .ok_or_else(|| $crate::DiError::ArgumentType {
                            parameter: parameter.to_owned(),
                            expected: ::std::any::type_name::<$ty>(),
                        })
                }
            }
        )+
    };
}

param_by_clone!(
    String, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

// =============================================================================
// Dependencies - ordered parameter lists
// =============================================================================

/// An ordered parameter list, implemented for tuples of [`Param`] up to 12.
pub trait Dependencies: Sized + 'static {
    /// Describe the parameters with positional default names
    fn parameters() -> Vec<Parameter>;

    /// Convert bound arguments aligned to `signature`
    fn from_arguments(arguments: Vec<Option<Instance>>, signature: &Signature) -> Result<Self>;
}

#[inline]
fn bind<P: Param>(value: Option<Instance>, parameter: &str) -> Result<P> {
    match value {
        Some(instance) => P::from_instance(instance, parameter),
        None => P::absent(parameter),
    }
}

macro_rules! impl_dependencies {
    ($($P:ident),*) => {
        impl<$($P: Param),*> Dependencies for ($($P,)*) {
            #[allow(unused_mut)]
            fn parameters() -> Vec<Parameter> {
                let mut parameters = Vec::new();
                $(
                    let name = format!("arg{}", parameters.len());
                    parameters.push(Parameter::of::<$P>(name));
                )*
                parameters
            }

            #[allow(unused_mut, unused_variables)]
            fn from_arguments(
                arguments: Vec<Option<Instance>>,
                signature: &Signature,
            ) -> Result<Self> {
                let mut arguments = arguments.into_iter();
                let mut names = signature.parameters().iter().map(Parameter::name);
                Ok(($(
                    bind::<$P>(arguments.next().flatten(), names.next().unwrap_or("?"))?,
                )*))
            }
        }
    };
}

impl_dependencies!();
impl_dependencies!(A);
impl_dependencies!(A, B);
impl_dependencies!(A, B, C);
impl_dependencies!(A, B, C, D);
impl_dependencies!(A, B, C, D, E);
impl_dependencies!(A, B, C, D, E, F);
impl_dependencies!(A, B, C, D, E, F, G);
impl_dependencies!(A, B, C, D, E, F, G, H);
impl_dependencies!(A, B, C, D, E, F, G, H, I);
impl_dependencies!(A, B, C, D, E, F, G, H, I, J);
impl_dependencies!(A, B, C, D, E, F, G, H, I, J, K);
impl_dependencies!(A, B, C, D, E, F, G, H, I, J, K, L);

// =============================================================================
// Service - constructor shape
// =============================================================================

/// A type whose constructor declares its parameters.
///
/// Register it with [`Container::provide`](crate::Container::provide) or
/// wrap it with [`Container::inject_type`](crate::Container::inject_type).
/// `#[derive(Service)]` generates this from a struct's fields.
///
/// # Example
///
/// ```rust
/// use yedi::Service;
/// use std::sync::Arc;
///
/// struct Config;
///
/// struct Database {
///     config: Arc<Config>,
///     url: String,
/// }
///
/// impl Service for Database {
///     type Dependencies = (Arc<Config>, String);
///     const PARAMETERS: &'static [&'static str] = &["config", "url"];
///
///     fn create((config, url): Self::Dependencies) -> Self {
///         Database { config, url }
///     }
/// }
/// ```
pub trait Service: Injectable + Sized {
    /// Constructor parameters in order
    type Dependencies: Dependencies;

    /// Constructor parameter names, matched to `Dependencies` in order
    const PARAMETERS: &'static [&'static str] = &[];

    /// Construct from bound parameters
    fn create(dependencies: Self::Dependencies) -> Self;
}
