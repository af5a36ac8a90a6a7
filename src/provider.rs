//! Keys, scopes and providers
//!
//! A [`Provider`] pairs a construction [`Strategy`] with a [`Scope`] and is
//! stored in the registry under a [`Key`].

use crate::signature::Signature;
use crate::Result;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// Marker trait for types that can be registered and resolved.
///
/// This is automatically implemented for all types that are
/// `Send + Sync + 'static`, including trait objects such as `dyn Storage`
/// when the trait has `Send + Sync` supertraits.
///
/// # Examples
///
/// ```rust
/// // Any type that is Send + Sync + 'static works automatically
/// struct MyService {
///     name: String,
/// }
///
/// // No impl needed - it just works!
/// ```
pub trait Injectable: Send + Sync + 'static {
    /// Returns the key of this type
    #[inline]
    fn key_of() -> Key
    where
        Self: Sized,
    {
        Key::of::<Self>()
    }
}

// Blanket implementation - everything that's Send + Sync + 'static is Injectable
impl<T: ?Sized + Send + Sync + 'static> Injectable for T {}

/// Type identity used to register and look up providers.
///
/// Equality and hashing use the `TypeId` only; the type name is kept for
/// diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct Key {
    id: TypeId,
    name: &'static str,
}

impl Key {
    /// The key for type `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The `TypeId` behind this key.
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The type name behind this key.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for Key {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Lifetime policy for produced instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    /// One shared instance until the container is cleared
    Singleton,

    /// New instance on every resolution
    #[default]
    Transient,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Singleton => f.write_str("singleton"),
            Scope::Transient => f.write_str("transient"),
        }
    }
}

/// A type-erased value produced by a strategy or supplied by a caller.
///
/// Always wraps an `Arc<K>` for the key type `K`, so unsized keys and
/// pointer identity both survive the erasure.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Erase an `Arc<T>` into an [`Instance`].
#[inline]
pub fn erase<T: ?Sized + Injectable>(value: Arc<T>) -> Instance {
    Arc::new(value)
}

/// Recover the `Arc<T>` inside an [`Instance`], if it holds one.
#[inline]
pub fn unerase<T: ?Sized + Injectable>(instance: &Instance) -> Option<Arc<T>> {
    instance.downcast_ref::<Arc<T>>().cloned()
}

/// Type-erased strategy invocation: bound arguments in, instance out.
///
/// The arguments are aligned to the signature passed alongside them.
type InvokeFn =
    Arc<dyn Fn(&Signature, Vec<Option<Instance>>) -> Result<Instance> + Send + Sync>;

/// What a strategy constructs from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Instantiate an implementation type through its constructor
    Type(Key),
    /// Call a factory whose return type is the produced value
    Factory,
    /// Hand out a pre-built value
    Instance,
}

/// A construction strategy: the inspected signature plus the erased call
#[derive(Clone)]
pub struct Strategy {
    kind: StrategyKind,
    signature: Arc<Signature>,
    invoke: InvokeFn,
}

impl Strategy {
    pub(crate) fn new<F>(kind: StrategyKind, signature: Signature, invoke: F) -> Self
    where
        F: Fn(&Signature, Vec<Option<Instance>>) -> Result<Instance> + Send + Sync + 'static,
    {
        Self {
            kind,
            signature: Arc::new(signature),
            invoke: Arc::new(invoke),
        }
    }

    /// A strategy that always returns the same pre-built instance.
    pub(crate) fn instance(key: Key, instance: Instance) -> Self {
        Self::new(StrategyKind::Instance, Signature::constant(key), move |_, _| {
            Ok(Arc::clone(&instance))
        })
    }

    /// The strategy's shape
    #[inline]
    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    /// The inspected parameter list of the construction callable
    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Invoke with arguments aligned to [`Strategy::signature`]
    #[inline]
    pub(crate) fn invoke(&self, arguments: Vec<Option<Instance>>) -> Result<Instance> {
        (self.invoke)(&*self.signature, arguments)
    }
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy")
            .field("kind", &self.kind)
            .field("signature", &self.signature)
            .finish()
    }
}

/// A registered (strategy, scope) pair for a key
#[derive(Debug, Clone)]
pub struct Provider {
    key: Key,
    strategy: Strategy,
    scope: Scope,
    generation: u64,
}

impl Provider {
    /// Create a provider for `key`
    #[inline]
    pub fn new(key: Key, strategy: Strategy, scope: Scope) -> Self {
        Self {
            key,
            strategy,
            scope,
            generation: 0,
        }
    }

    /// Registration order of this provider, `0` until registered.
    ///
    /// A provider stored later under the same key always has a higher
    /// generation; the scope cache uses it to tell a replaced provider's
    /// singleton from the current one.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub(crate) fn stamp(&mut self, generation: u64) {
        self.generation = generation;
    }

    /// The key this provider is registered under
    #[inline]
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// The construction strategy
    #[inline]
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// The declared scope
    #[inline]
    pub fn scope(&self) -> Scope {
        self.scope
    }
}
