//! Dependency graph resolution
//!
//! The [`Resolver`] owns the provider registry and the scope cache. It walks
//! a provider's inspected signature depth-first, resolving every declared
//! dependency before invoking the strategy, and caches singleton results.
//!
//! Cycles are detected with a thread-local stack of the keys currently being
//! resolved. Resolution never crosses a suspension point, so the stack of the
//! current thread always describes the active resolution.
//!
//! First-time singleton construction is serialized by one re-entrant lock
//! per resolver. Only the thread holding it ever initializes a slot, so a
//! cycle through singletons is always built on a single thread, where its
//! stack sees the whole chain, and two threads can never wait on each
//! other's slots.

use crate::args::Args;
use crate::provider::{Instance, Key, Provider, Scope};
use crate::registry::{Registry, ScopeCache};
use crate::signature::{Parameter, Signature};
use crate::{DiError, Result};
use parking_lot::ReentrantMutex;
use std::cell::RefCell;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

thread_local! {
    /// Keys being resolved on this thread, tagged with the owning resolver
    static RESOLVING: RefCell<Vec<(usize, Key)>> = const { RefCell::new(Vec::new()) };
}

/// Marks a key as in-flight for the lifetime of the guard.
///
/// Popped on drop, so a panicking strategy does not leave a stale entry.
struct ResolutionGuard;

impl ResolutionGuard {
    fn enter(owner: usize, key: &Key) -> Result<Self> {
        RESOLVING.with_borrow_mut(|stack| {
            if let Some(start) = stack.iter().position(|(o, k)| *o == owner && k == key) {
                let chain: Vec<Key> = stack[start..]
                    .iter()
                    .filter(|(o, _)| *o == owner)
                    .map(|(_, k)| *k)
                    .collect();
                return Err(DiError::cyclic(key, &chain));
            }
            stack.push((owner, *key));
            Ok(ResolutionGuard)
        })
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        RESOLVING.with_borrow_mut(|stack| {
            stack.pop();
        });
    }
}

/// Produces instances for keys from a registry and a scope cache.
pub struct Resolver {
    registry: Registry,
    cache: ScopeCache,
    building: ReentrantMutex<()>,
}

impl Resolver {
    /// Create with empty registry and cache.
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create with pre-allocated capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            registry: Registry::with_capacity(capacity),
            cache: ScopeCache::with_capacity(capacity),
            building: ReentrantMutex::new(()),
        }
    }

    /// The provider registry
    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The singleton cache
    #[inline]
    pub fn cache(&self) -> &ScopeCache {
        &self.cache
    }

    /// Identity used to tag entries on the resolution stack
    #[inline]
    fn id(&self) -> usize {
        self as *const Self as usize
    }

    /// Store `provider`, replacing and un-caching any previous one.
    pub fn register(&self, provider: Provider) {
        let key = *provider.key();

        #[cfg(feature = "logging")]
        debug!(
            target: "yedi",
            service = key.name(),
            scope = %provider.scope(),
            strategy = ?provider.strategy().kind(),
            parameters = provider.strategy().signature().len(),
            "Registering provider"
        );

        let (generation, _replaced) = self.registry.register(provider);
        self.cache.evict(&key, generation);

        #[cfg(feature = "logging")]
        if _replaced.is_some() {
            debug!(
                target: "yedi",
                service = key.name(),
                "Replaced existing provider (last registration wins)"
            );
        }
    }

    /// Produce an instance for `key`.
    ///
    /// Fails with [`DiError::NoProvider`] when nothing is registered for
    /// `key` or for any of its required dependencies, and with
    /// [`DiError::CyclicDependency`] when `key` is already being resolved.
    pub fn resolve(&self, key: &Key) -> Result<Instance> {
        let Some(provider) = self.registry.lookup(key) else {
            #[cfg(feature = "logging")]
            debug!(
                target: "yedi",
                service = key.name(),
                "No provider registered"
            );
            return Err(DiError::no_provider(key));
        };

        match provider.scope() {
            Scope::Transient => {
                let _guard = self.enter(key)?;

                #[cfg(feature = "logging")]
                trace!(
                    target: "yedi",
                    service = key.name(),
                    "Creating new transient instance"
                );

                self.construct(&provider)
            }
            Scope::Singleton => {
                let slot = self.cache.slot(key, provider.generation());
                if let Some(instance) = slot.get() {
                    #[cfg(feature = "logging")]
                    trace!(
                        target: "yedi",
                        service = key.name(),
                        "Singleton resolved from scope cache"
                    );
                    return Ok(instance.clone());
                }

                let _building = self.building.lock();
                let _guard = self.enter(key)?;
                slot.get_or_try_init(|| {
                    #[cfg(feature = "logging")]
                    debug!(
                        target: "yedi",
                        service = key.name(),
                        "Singleton initializing on first access"
                    );

                    self.construct(&provider)
                })
                .cloned()
            }
        }
    }

    fn enter(&self, key: &Key) -> Result<ResolutionGuard> {
        let guard = ResolutionGuard::enter(self.id(), key);

        #[cfg(feature = "logging")]
        if let Err(err) = &guard {
            debug!(target: "yedi", service = key.name(), error = %err, "Cycle detected");
        }

        guard
    }

    /// Resolve the strategy's dependencies and invoke it.
    fn construct(&self, provider: &Provider) -> Result<Instance> {
        let strategy = provider.strategy();
        let arguments = strategy
            .signature()
            .parameters()
            .iter()
            .map(|parameter| self.dependency(provider, parameter))
            .collect::<Result<Vec<_>>>()?;

        strategy.invoke(arguments)
    }

    /// A provider's own dependency: every one must be resolvable.
    fn dependency(&self, provider: &Provider, parameter: &Parameter) -> Result<Option<Instance>> {
        match parameter.declared() {
            Some(key) if parameter.is_optional() && !self.registry.contains(key) => Ok(None),
            Some(key) => self.resolve(key).map(Some),
            None if parameter.is_optional() => Ok(None),
            None => Err(DiError::Unresolvable {
                parameter: parameter.name().to_owned(),
                provider: provider.key().name(),
            }),
        }
    }

    /// Merge caller-supplied arguments with injected ones.
    ///
    /// Positional arguments fill parameters in order, named arguments fill
    /// by name, and every parameter still empty whose declared type has a
    /// provider is resolved. The result is aligned to `signature`; slots
    /// left `None` are neither supplied nor injectable.
    pub fn bind(&self, signature: &Signature, args: Args) -> Result<Vec<Option<Instance>>> {
        let (positional, named) = args.into_parts();
        let parameters = signature.parameters();

        if positional.len() > parameters.len() {
            return Err(DiError::TooManyArguments {
                expected: parameters.len(),
                given: positional.len(),
            });
        }

        let mut arguments: Vec<Option<Instance>> = vec![None; parameters.len()];
        for (slot, value) in arguments.iter_mut().zip(positional) {
            *slot = Some(value);
        }

        for (name, value) in named {
            let index = signature
                .position(&name)
                .ok_or_else(|| DiError::UnexpectedArgument {
                    parameter: name.to_string(),
                })?;
            if arguments[index].is_some() {
                return Err(DiError::DuplicateArgument {
                    parameter: name.into_owned(),
                });
            }
            arguments[index] = Some(value);
        }

        for (slot, parameter) in arguments.iter_mut().zip(parameters) {
            if slot.is_some() {
                continue;
            }
            if let Some(key) = parameter.declared().filter(|k| self.registry.contains(k)) {
                #[cfg(feature = "logging")]
                trace!(
                    target: "yedi",
                    parameter = parameter.name(),
                    service = key.name(),
                    "Injecting parameter"
                );

                *slot = Some(self.resolve(key)?);
            }
        }

        Ok(arguments)
    }

    /// Empty registry, then cache.
    pub fn clear(&self) {
        self.registry.clear();
        self.cache.clear();
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("registry", &self.registry)
            .field("cache", &self.cache)
            .finish()
    }
}
