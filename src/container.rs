//! Container facade
//!
//! Owns one [`Resolver`] (registry plus scope cache) behind an `Arc`, so a
//! `Container` is cheap to clone and every clone sees the same providers.

use crate::callable::{Callable, Method, Receiver};
use crate::inject::{Injected, InjectedMethod, InjectedType};
use crate::provider::{
    Injectable, Key, Provider, Scope, Strategy, StrategyKind, erase, unerase,
};
use crate::resolver::Resolver;
use crate::signature::{Dependencies, Service, Signature};
use crate::{DiError, Result};
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::debug;

/// Type-directed dependency injection container.
///
/// Safe to share between threads: lookups never block each other, and
/// each singleton is constructed at most once even under concurrent first
/// access.
///
/// # Examples
///
/// ```rust
/// use yedi::{Container, Scope, Service};
/// use std::sync::Arc;
///
/// struct Config {
///     url: String,
/// }
///
/// struct Database {
///     config: Arc<Config>,
/// }
///
/// impl Service for Database {
///     type Dependencies = (Arc<Config>,);
///
///     fn create((config,): Self::Dependencies) -> Self {
///         Database { config }
///     }
/// }
///
/// let container = Container::new();
/// container
///     .provide_instance(Config { url: "postgres://localhost".into() })
///     .provide::<Database>(Scope::Singleton);
///
/// let db = container.get::<Database>().unwrap();
/// assert_eq!(db.config.url, "postgres://localhost");
/// ```
#[derive(Clone)]
pub struct Container {
    resolver: Arc<Resolver>,
}

impl Container {
    /// Create an empty container.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use yedi::Container;
    /// let container = Container::new();
    /// assert!(container.is_empty());
    /// ```
    #[inline]
    pub fn new() -> Self {
        #[cfg(feature = "logging")]
        debug!(target: "yedi", "Creating new DI container");

        Self {
            resolver: Arc::new(Resolver::new()),
        }
    }

    /// Create a container with pre-allocated capacity.
    ///
    /// Use this when you know approximately how many providers will be registered.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        #[cfg(feature = "logging")]
        debug!(target: "yedi", capacity, "Creating new DI container with capacity");

        Self {
            resolver: Arc::new(Resolver::with_capacity(capacity)),
        }
    }

    /// The resolver behind this container
    #[inline]
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    #[inline]
    fn register(&self, key: Key, strategy: Strategy, scope: Scope) -> &Self {
        self.resolver.register(Provider::new(key, strategy, scope));
        self
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register `T` under its own type, built through its constructor.
    ///
    /// Re-registering a type replaces the earlier provider.
    #[inline]
    pub fn provide<T: Service>(&self, scope: Scope) -> &Self {
        self.provide_as::<T, T>(scope, |service| service)
    }

    /// Register the implementation `T` under the key `K`.
    ///
    /// `cast` turns the constructed `Arc<T>` into the key type, typically an
    /// unsizing coercion to a trait object.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use yedi::{Container, Scope, Service};
    ///
    /// trait Storage: Send + Sync {
    ///     fn name(&self) -> &str;
    /// }
    ///
    /// struct MemoryStorage;
    ///
    /// impl Storage for MemoryStorage {
    ///     fn name(&self) -> &str {
    ///         "memory"
    ///     }
    /// }
    ///
    /// impl Service for MemoryStorage {
    ///     type Dependencies = ();
    ///     fn create(_: ()) -> Self {
    ///         MemoryStorage
    ///     }
    /// }
    ///
    /// let container = Container::new();
    /// container.provide_as::<dyn Storage, MemoryStorage>(Scope::Singleton, |s| s);
    ///
    /// assert_eq!(container.get::<dyn Storage>().unwrap().name(), "memory");
    /// ```
    pub fn provide_as<K, T>(&self, scope: Scope, cast: fn(Arc<T>) -> Arc<K>) -> &Self
    where
        K: ?Sized + Injectable,
        T: Service,
    {
        let strategy = Strategy::new(
            StrategyKind::Type(Key::of::<T>()),
            Signature::constructor::<T>(),
            move |signature, arguments| {
                let dependencies = T::Dependencies::from_arguments(arguments, signature)?;
                Ok(erase(cast(Arc::new(T::create(dependencies)))))
            },
        );
        self.register(Key::of::<K>(), strategy, scope)
    }

    /// Register a factory under the type it returns.
    ///
    /// The factory's parameters are resolved like constructor parameters.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use yedi::{Container, Scope};
    /// use std::sync::Arc;
    ///
    /// struct Config { pool: usize }
    /// struct Pool { size: usize }
    ///
    /// let container = Container::new();
    /// container
    ///     .provide_instance(Config { pool: 4 })
    ///     .provide_fn(Scope::Transient, |config: Arc<Config>| Pool { size: config.pool });
    ///
    /// assert_eq!(container.get::<Pool>().unwrap().size, 4);
    /// ```
    pub fn provide_fn<F, M>(&self, scope: Scope, factory: F) -> &Self
    where
        F: Callable<M>,
        F::Output: Injectable,
    {
        let key = Key::of::<F::Output>();
        let strategy = Strategy::new(
            StrategyKind::Factory,
            Signature::factory::<F::Dependencies>(key),
            move |signature, arguments| {
                let dependencies = F::Dependencies::from_arguments(arguments, signature)?;
                Ok(erase(Arc::new(factory.invoke(dependencies))))
            },
        );
        self.register(key, strategy, scope)
    }

    /// Register a factory returning `Arc<K>` under `K`.
    ///
    /// Use this to provide trait objects or values that are already shared.
    pub fn provide_fn_as<K, F, M>(&self, scope: Scope, factory: F) -> &Self
    where
        K: ?Sized + Injectable,
        F: Callable<M, Output = Arc<K>>,
    {
        let key = Key::of::<K>();
        let strategy = Strategy::new(
            StrategyKind::Factory,
            Signature::factory::<F::Dependencies>(key),
            move |signature, arguments| {
                let dependencies = F::Dependencies::from_arguments(arguments, signature)?;
                Ok(erase(factory.invoke(dependencies)))
            },
        );
        self.register(key, strategy, scope)
    }

    /// Register a fallible factory under the type it produces.
    ///
    /// The factory's error reaches the caller of [`get`](Self::get) as
    /// [`DiError::Strategy`], which displays and sources exactly like the
    /// original error. A failed singleton construction is not cached.
    pub fn provide_try_fn<F, M, T, E>(&self, scope: Scope, factory: F) -> &Self
    where
        F: Callable<M, Output = std::result::Result<T, E>>,
        T: Injectable,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let key = Key::of::<T>();
        let strategy = Strategy::new(
            StrategyKind::Factory,
            Signature::factory::<F::Dependencies>(key),
            move |signature, arguments| {
                let dependencies = F::Dependencies::from_arguments(arguments, signature)?;
                let value = factory.invoke(dependencies).map_err(DiError::strategy)?;
                Ok(erase(Arc::new(value)))
            },
        );
        self.register(key, strategy, scope)
    }

    /// Register a pre-built value as a singleton.
    #[inline]
    pub fn provide_instance<T: Injectable>(&self, value: T) -> &Self {
        self.provide_shared(Arc::new(value))
    }

    /// Register an already shared value as a singleton under `K`.
    ///
    /// Every `get::<K>()` returns this exact `Arc`.
    pub fn provide_shared<K: ?Sized + Injectable>(&self, value: Arc<K>) -> &Self {
        let key = Key::of::<K>();
        self.register(key, Strategy::instance(key, erase(value)), Scope::Singleton)
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolve an instance of `T`.
    ///
    /// # Errors
    ///
    /// - [`DiError::NoProvider`] if `T` or one of its dependencies is not
    ///   registered
    /// - [`DiError::CyclicDependency`] if `T` depends on itself
    /// - [`DiError::Strategy`] if a fallible factory failed
    pub fn get<T: ?Sized + Injectable>(&self) -> Result<Arc<T>> {
        let key = Key::of::<T>();
        let instance = self.resolver.resolve(&key)?;
        unerase::<T>(&instance).ok_or(DiError::TypeMismatch {
            expected: key.name(),
        })
    }

    /// Resolve `T`, returning `None` on any failure.
    #[inline]
    pub fn try_get<T: ?Sized + Injectable>(&self) -> Option<Arc<T>> {
        self.get::<T>().ok()
    }

    /// Check if a provider is registered for `T`
    #[inline]
    pub fn contains<T: ?Sized + Injectable>(&self) -> bool {
        self.resolver.registry().contains(&Key::of::<T>())
    }

    /// Number of registered providers
    #[inline]
    pub fn len(&self) -> usize {
        self.resolver.registry().len()
    }

    /// Check if no provider is registered
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.resolver.registry().is_empty()
    }

    /// Keys of all registered providers
    #[inline]
    pub fn registered_types(&self) -> Vec<Key> {
        self.resolver.registry().keys()
    }

    // =========================================================================
    // Injection
    // =========================================================================

    /// Wrap a function so its injectable parameters are resolved at call time.
    #[inline]
    pub fn inject<F, M>(&self, target: F) -> Injected<F, M>
    where
        F: Callable<M>,
    {
        Injected::new(Arc::clone(&self.resolver), target)
    }

    /// Wrap a method; the receiver is supplied by the caller on each call.
    #[inline]
    pub fn inject_method<R, F, M>(&self, target: F) -> InjectedMethod<R, F, M>
    where
        R: Receiver,
        F: Method<R, M>,
    {
        InjectedMethod::new(Arc::clone(&self.resolver), target)
    }

    /// Wrap `T`'s constructor.
    #[inline]
    pub fn inject_type<T: Service>(&self) -> InjectedType<T> {
        InjectedType::new(Arc::clone(&self.resolver))
    }

    /// Remove every provider and cached singleton.
    ///
    /// Later lookups of previously registered types fail until they are
    /// registered again.
    pub fn clear(&self) {
        let _count = self.resolver.registry().len();
        self.resolver.clear();

        #[cfg(feature = "logging")]
        debug!(
            target: "yedi",
            providers_removed = _count,
            "Container cleared - all providers and cached singletons removed"
        );
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("providers", &self.len())
            .field("singletons", &self.resolver.cache().len())
            .finish()
    }
}
