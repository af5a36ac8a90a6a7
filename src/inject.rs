//! Injection wrappers
//!
//! An injected callable keeps the target's calling convention: a sync
//! target returns its value, an async target returns its future. Every
//! dependency is resolved before the target is invoked, so the only
//! suspension points of an injected async call are the target's own.
//!
//! Caller-supplied [`Args`] always take precedence over injection.

use crate::args::Args;
use crate::callable::{Callable, Method, Receiver};
use crate::resolver::Resolver;
use crate::signature::{Dependencies, Service, Signature};
use crate::Result;
use std::borrow::Cow;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::trace;

/// Resolve and convert arguments for `signature`.
#[inline]
fn bind<D: Dependencies>(resolver: &Resolver, signature: &Signature, args: Args) -> Result<D> {
    #[cfg(feature = "logging")]
    trace!(
        target: "yedi",
        kind = ?signature.kind(),
        parameters = signature.len(),
        supplied = args.len(),
        "Binding injected call"
    );

    let arguments = resolver.bind(signature, args)?;
    D::from_arguments(arguments, signature)
}

/// A free function or closure with injectable parameters.
///
/// Created by [`Container::inject`](crate::Container::inject).
///
/// # Examples
///
/// ```rust
/// use yedi::{Args, Container, Scope};
/// use std::sync::Arc;
///
/// struct Greeting(&'static str);
///
/// fn greet(greeting: Arc<Greeting>, name: String) -> String {
///     format!("{} {name}", greeting.0)
/// }
///
/// let container = Container::new();
/// container.provide_fn(Scope::Singleton, || Greeting("hello"));
///
/// let greet = container.inject(greet).named(["greeting", "name"]);
/// let out = greet.call(Args::new().with("name", "world".to_string())).unwrap();
/// assert_eq!(out, "hello world");
/// ```
pub struct Injected<F, M> {
    resolver: Arc<Resolver>,
    target: F,
    signature: Signature,
    _marker: PhantomData<fn() -> M>,
}

impl<F, M> Injected<F, M>
where
    F: Callable<M>,
{
    pub(crate) fn new(resolver: Arc<Resolver>, target: F) -> Self {
        Self {
            resolver,
            target,
            signature: Signature::function::<F::Dependencies>(),
            _marker: PhantomData,
        }
    }

    /// Name the parameters in order, for use with named arguments.
    pub fn named<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Cow<'static, str>>,
    {
        self.signature = self.signature.with_names(names);
        self
    }

    /// The inspected signature of the target
    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Call the target with `args`, injecting everything else.
    ///
    /// For an async target the result holds the target's future.
    pub fn call(&self, args: Args) -> Result<F::Output> {
        let dependencies = bind::<F::Dependencies>(&self.resolver, &self.signature, args)?;
        Ok(self.target.invoke(dependencies))
    }

    /// Call an async target, resolving dependencies immediately.
    ///
    /// The returned future awaits only the target.
    pub fn call_async(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<<F::Output as Future>::Output>> + use<F, M>
    where
        F::Output: Future,
    {
        let future = self.call(args);
        async move { Ok(future?.await) }
    }
}

impl<F: Clone, M> Clone for Injected<F, M> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            target: self.target.clone(),
            signature: self.signature.clone(),
            _marker: PhantomData,
        }
    }
}

impl<F, M> std::fmt::Debug for Injected<F, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injected")
            .field("target", &std::any::type_name::<F>())
            .field("signature", &self.signature)
            .finish()
    }
}

/// A method with injectable parameters after its receiver.
///
/// Created by [`Container::inject_method`](crate::Container::inject_method).
/// The receiver is supplied on every call and is never injected.
pub struct InjectedMethod<R, F, M> {
    resolver: Arc<Resolver>,
    target: F,
    signature: Signature,
    _marker: PhantomData<fn(R) -> M>,
}

impl<R, F, M> InjectedMethod<R, F, M>
where
    R: Receiver,
    F: Method<R, M>,
{
    pub(crate) fn new(resolver: Arc<Resolver>, target: F) -> Self {
        Self {
            resolver,
            target,
            signature: Signature::method::<R::Target, F::Dependencies>(),
            _marker: PhantomData,
        }
    }

    /// Name the parameters after the receiver, in order.
    pub fn named<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Cow<'static, str>>,
    {
        self.signature = self.signature.with_names(names);
        self
    }

    /// The inspected signature, receiver excluded
    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Call the method on `receiver`
    pub fn call(&self, receiver: R, args: Args) -> Result<F::Output> {
        let dependencies = bind::<F::Dependencies>(&self.resolver, &self.signature, args)?;
        Ok(self.target.invoke(receiver, dependencies))
    }

    /// Call an async method on `receiver`, resolving dependencies
    /// immediately.
    pub fn call_async(
        &self,
        receiver: R,
        args: Args,
    ) -> impl Future<Output = Result<<F::Output as Future>::Output>> + use<R, F, M>
    where
        F::Output: Future,
    {
        let future = self.call(receiver, args);
        async move { Ok(future?.await) }
    }
}

impl<R, F: Clone, M> Clone for InjectedMethod<R, F, M> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            target: self.target.clone(),
            signature: self.signature.clone(),
            _marker: PhantomData,
        }
    }
}

impl<R, F, M> std::fmt::Debug for InjectedMethod<R, F, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectedMethod")
            .field("target", &std::any::type_name::<F>())
            .field("signature", &self.signature)
            .finish()
    }
}

/// A type whose constructor parameters are injected.
///
/// Created by [`Container::inject_type`](crate::Container::inject_type).
/// [`create`](Self::create) returns a plain `T`, exactly what calling the
/// constructor with the merged arguments would return.
pub struct InjectedType<T> {
    resolver: Arc<Resolver>,
    signature: Signature,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Service> InjectedType<T> {
    pub(crate) fn new(resolver: Arc<Resolver>) -> Self {
        Self {
            resolver,
            signature: Signature::constructor::<T>(),
            _marker: PhantomData,
        }
    }

    /// The constructor signature
    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Construct a `T`, injecting every parameter not in `args`.
    pub fn create(&self, args: Args) -> Result<T> {
        let dependencies = bind::<T::Dependencies>(&self.resolver, &self.signature, args)?;
        Ok(T::create(dependencies))
    }
}

impl<T> Clone for InjectedType<T> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            signature: self.signature.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for InjectedType<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectedType")
            .field("signature", &self.signature)
            .finish()
    }
}
