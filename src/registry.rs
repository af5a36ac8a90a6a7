//! Provider registry and scope cache
//!
//! Both use DashMap for lock-free concurrent reads. Registration and
//! `clear()` serialize per shard; first construction of a singleton is
//! serialized per key by its `OnceCell` slot.

use crate::provider::{Instance, Key, Provider};
use ahash::RandomState;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use once_cell::sync::OnceCell;
use std::any::TypeId;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of provider generations
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Pick a shard count for an expected number of registrations.
///
/// Default DashMap uses num_cpus * 4 shards which is overkill for
/// typical containers with <50 providers.
#[inline]
fn shard_amount(capacity: usize) -> usize {
    if capacity <= 16 {
        8
    } else if capacity <= 64 {
        16
    } else {
        32
    }
}

#[inline]
fn new_map<V>(capacity: usize) -> DashMap<TypeId, V, RandomState> {
    DashMap::with_capacity_and_hasher_and_shard_amount(
        capacity,
        RandomState::new(),
        shard_amount(capacity),
    )
}

/// Thread-safe map from key to provider.
///
/// At most one provider per key; registering again replaces it.
pub struct Registry {
    providers: DashMap<TypeId, Provider, RandomState>,
}

impl Registry {
    /// Create an empty registry.
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create with pre-allocated capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            providers: new_map(capacity),
        }
    }

    /// Store a provider under its key.
    ///
    /// Returns the generation the provider was stamped with and the provider
    /// it replaced. Stamping happens while the shard is locked, so
    /// generations per key follow registration order.
    pub fn register(&self, mut provider: Provider) -> (u64, Option<Provider>) {
        let entry = self.providers.entry(provider.key().id());
        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        provider.stamp(generation);

        let replaced = match entry {
            Entry::Occupied(mut entry) => Some(entry.insert(provider)),
            Entry::Vacant(entry) => {
                entry.insert(provider);
                None
            }
        };
        (generation, replaced)
    }

    /// Look up the provider for `key`.
    ///
    /// Returns a clone so no shard lock is held while the caller resolves
    /// dependencies (which may re-enter the registry).
    #[inline]
    pub fn lookup(&self, key: &Key) -> Option<Provider> {
        self.providers.get(&key.id()).map(|p| p.value().clone())
    }

    /// Check if a provider exists for `key`.
    #[inline]
    pub fn contains(&self, key: &Key) -> bool {
        self.providers.contains_key(&key.id())
    }

    /// Remove the provider for `key`.
    #[inline]
    pub fn remove(&self, key: &Key) -> Option<Provider> {
        self.providers.remove(&key.id()).map(|(_, p)| p)
    }

    /// Get number of registered providers
    #[inline]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Get all registered keys
    pub fn keys(&self) -> Vec<Key> {
        self.providers.iter().map(|r| *r.value().key()).collect()
    }

    /// Get the type names of all registered keys
    pub fn type_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|r| r.value().key().name()).collect()
    }

    /// Remove all providers
    #[inline]
    pub fn clear(&self) {
        self.providers.clear();
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("count", &self.len())
            .finish()
    }
}

/// A singleton slot: empty until its provider first succeeds.
pub type Slot = Arc<OnceCell<Instance>>;

/// A slot tagged with the generation of the provider that fills it
struct Stamped {
    generation: u64,
    slot: Slot,
}

/// Instances of singleton-scoped keys, one slot per key.
///
/// Each slot belongs to one provider generation, so a resolution that
/// raced with a re-registration can never cache the replaced provider's
/// instance for the new one.
pub struct ScopeCache {
    slots: DashMap<TypeId, Stamped, RandomState>,
}

impl ScopeCache {
    /// Create an empty cache.
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create with pre-allocated capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: new_map(capacity),
        }
    }

    /// Get or create the slot for the provider of `key` at `generation`.
    ///
    /// A slot held for an older generation is replaced. A caller still
    /// holding a provider older than the stored slot gets a detached slot,
    /// so its instance is never cached. The shard lock is released before
    /// the slot is initialized.
    pub fn slot(&self, key: &Key, generation: u64) -> Slot {
        if let Some(stamped) = self.slots.get(&key.id()) {
            if stamped.generation == generation {
                return Arc::clone(&stamped.slot);
            }
        }

        match self.slots.entry(key.id()) {
            Entry::Occupied(mut entry) => {
                let current = entry.get().generation;
                if current == generation {
                    Arc::clone(&entry.get().slot)
                } else if current > generation {
                    Slot::default()
                } else {
                    let slot = Slot::default();
                    entry.insert(Stamped {
                        generation,
                        slot: Arc::clone(&slot),
                    });
                    slot
                }
            }
            Entry::Vacant(entry) => {
                let slot = Slot::default();
                entry.insert(Stamped {
                    generation,
                    slot: Arc::clone(&slot),
                });
                slot
            }
        }
    }

    /// The cached instance for `key`, if constructed.
    #[inline]
    pub fn get(&self, key: &Key) -> Option<Instance> {
        self.slots
            .get(&key.id())
            .and_then(|stamped| stamped.slot.get().cloned())
    }

    /// Drop the slot for `key` if it belongs to a provider older than
    /// `generation`.
    ///
    /// A slot already filled by the provider at `generation` (or a newer
    /// one) is kept.
    #[inline]
    pub fn evict(&self, key: &Key, generation: u64) -> bool {
        self.slots
            .remove_if(&key.id(), |_, stamped| stamped.generation < generation)
            .is_some()
    }

    /// Number of constructed singletons
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|r| r.value().slot.get().is_some())
            .count()
    }

    /// Check if no singleton has been constructed
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every slot
    #[inline]
    pub fn clear(&self) {
        self.slots.clear();
    }
}

impl Default for ScopeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScopeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeCache")
            .field("count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Scope, Strategy, erase};

    struct TestService;

    fn provider(key: Key, value: u32, scope: Scope) -> Provider {
        Provider::new(key, Strategy::instance(key, erase(Arc::new(value))), scope)
    }

    #[test]
    fn test_registry_register_and_lookup() {
        let registry = Registry::new();
        let key = Key::of::<TestService>();

        assert!(registry.lookup(&key).is_none());
        let (generation, replaced) = registry.register(provider(key, 1, Scope::Transient));
        assert!(replaced.is_none());

        let found = registry.lookup(&key).unwrap();
        assert_eq!(found.key(), &key);
        assert_eq!(found.scope(), Scope::Transient);
        assert_eq!(found.generation(), generation);
        assert!(registry.contains(&key));
    }

    #[test]
    fn test_registry_last_registration_wins() {
        let registry = Registry::new();
        let key = Key::of::<TestService>();

        registry.register(provider(key, 1, Scope::Transient));
        let (_, replaced) = registry.register(provider(key, 2, Scope::Singleton));

        let replaced = replaced.unwrap();
        assert_eq!(replaced.scope(), Scope::Transient);
        assert!(registry.lookup(&key).unwrap().generation() > replaced.generation());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup(&key).unwrap().scope(), Scope::Singleton);
    }

    #[test]
    fn test_registry_clear_and_remove() {
        let registry = Registry::with_capacity(100);
        let a = Key::of::<TestService>();
        let b = Key::of::<u64>();

        registry.register(provider(a, 1, Scope::Transient));
        registry.register(provider(b, 2, Scope::Transient));
        assert_eq!(registry.keys().len(), 2);
        assert!(registry.type_names().contains(&"u64"));

        assert!(registry.remove(&a).is_some());
        assert!(!registry.contains(&a));

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_cache_slot_is_shared() {
        let cache = ScopeCache::new();
        let key = Key::of::<TestService>();

        let first = cache.slot(&key, 1);
        let second = cache.slot(&key, 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.is_empty());

        first.set(erase(Arc::new(5u32))).unwrap();
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key).is_some());
    }

    #[test]
    fn test_cache_failed_init_leaves_slot_empty() {
        let cache = ScopeCache::new();
        let key = Key::of::<TestService>();

        let slot = cache.slot(&key, 1);
        let result: Result<&Instance, &str> = slot.get_or_try_init(|| Err("boom"));
        assert!(result.is_err());
        assert!(cache.get(&key).is_none());

        let value = slot.get_or_try_init(|| Ok::<_, &str>(erase(Arc::new(1u8))));
        assert!(value.is_ok());
        assert!(cache.get(&key).is_some());
    }

    #[test]
    fn test_cache_slot_follows_generation() {
        let cache = ScopeCache::new();
        let key = Key::of::<TestService>();

        let old = cache.slot(&key, 1);
        old.set(erase(Arc::new(1u8))).unwrap();

        // A newer provider replaces the slot
        let new = cache.slot(&key, 2);
        assert!(!Arc::ptr_eq(&old, &new));
        assert!(cache.is_empty());

        // A stale provider gets a slot that is never stored
        let stale = cache.slot(&key, 1);
        stale.set(erase(Arc::new(9u8))).unwrap();
        assert!(cache.get(&key).is_none());
        assert!(Arc::ptr_eq(&new, &cache.slot(&key, 2)));
    }

    #[test]
    fn test_cache_evict_keeps_current_generation() {
        let cache = ScopeCache::new();
        let key = Key::of::<TestService>();

        // Filled by the provider at generation 2 before its registration
        // got around to evicting
        cache.slot(&key, 2).set(erase(Arc::new(2u8))).unwrap();
        assert!(!cache.evict(&key, 2));
        assert!(cache.get(&key).is_some());

        assert!(cache.evict(&key, 3));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_evict_and_clear() {
        let cache = ScopeCache::new();
        let key = Key::of::<TestService>();

        cache.slot(&key, 1).set(erase(Arc::new(1u8))).unwrap();
        assert!(cache.evict(&key, 2));
        assert!(cache.get(&key).is_none());

        cache.slot(&key, 2).set(erase(Arc::new(2u8))).unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
