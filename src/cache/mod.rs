//! Memoization for generation. Both caches are plain single-owner state:
//! callers sharing one across threads wrap it in their own lock.
use crate::context::operation::Drawing;
use crate::context::Generator;
use crate::errors::RoughResult;
use crate::geometry::shapes::{CanvasSize, ShapeDescriptor, SizeKey};
use crate::options::RenderOptions;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// Capacities for the two caches a [`crate::context::Context`] owns.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    pub generator_capacity: usize,
    pub drawing_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            generator_capacity: 8,
            drawing_capacity: 256,
        }
    }
}

impl CacheConfig {
    pub fn from_ron(text: &str) -> RoughResult<CacheConfig> {
        Ok(ron::from_str(text)?)
    }
}

/// Point-in-time counters for one cache.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    /// `hits / (hits + misses)`, or 0 before any lookup.
    pub hit_rate: f64,
}

impl CacheStats {
    fn new(entries: usize, hits: u64, misses: u64) -> CacheStats {
        let total = hits + misses;
        CacheStats {
            entries,
            hits,
            misses,
            hit_rate: if total == 0 {
                0.0
            } else {
                hits as f64 / total as f64
            },
        }
    }
}

/// Bounded map with least-recently-used eviction and hit/miss counting.
/// Recency is tracked in a queue: front is the next to go.
#[derive(Debug, Clone)]
pub struct LruCache<K, V> {
    name: &'static str,
    entries: HashMap<K, V>,
    lru: VecDeque<K>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl<K: Eq + Hash + Clone + Debug, V: Clone> LruCache<K, V> {
    /// Capacity is at least one.
    pub fn new(name: &'static str, capacity: usize) -> Self {
        LruCache {
            name,
            entries: HashMap::new(),
            lru: VecDeque::new(),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Counted lookup; a hit also refreshes the entry's recency.
    pub fn get(&mut self, key: &K) -> Option<V> {
        match self.entries.get(key).cloned() {
            Some(value) => {
                self.hits += 1;
                self.touch(key.clone());
                tracing::debug!(cache = self.name, ?key, "hit");
                Some(value)
            }
            None => {
                self.misses += 1;
                tracing::debug!(cache = self.name, ?key, "miss");
                None
            }
        }
    }

    /// Store `value`, evicting the least recently used entries past
    /// capacity. The entry just stored is the most recent, so it stays.
    pub fn set(&mut self, key: K, value: V) {
        self.entries.insert(key.clone(), value);
        self.touch(key);
        while self.lru.len() > self.capacity {
            if let Some(old) = self.lru.pop_front() {
                tracing::debug!(cache = self.name, key = ?old, "evict");
                self.entries.remove(&old);
            }
        }
    }

    /// The cached value for `key`, or the producer's result stored under it.
    /// The producer runs at most once per call, only on a miss; a producer
    /// that yields nothing leaves the cache untouched apart from the miss.
    pub fn get_or_generate<F>(&mut self, key: K, producer: F) -> Option<V>
    where
        F: FnOnce() -> Option<V>,
    {
        if let Some(value) = self.get(&key) {
            return Some(value);
        }
        let value = producer()?;
        self.set(key, value.clone());
        Some(value)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        if let Some(pos) = self.lru.iter().position(|k| k == key) {
            self.lru.remove(pos);
        }
        self.entries.remove(key)
    }

    /// Empty the cache and zero its counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats::new(self.entries.len(), self.hits, self.misses)
    }

    fn touch(&mut self, key: K) {
        if let Some(pos) = self.lru.iter().position(|k| *k == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key);
    }
}

/// Generators bound to a canvas size, keyed by the size in whole units.
#[derive(Debug, Clone)]
pub struct GeneratorCache {
    inner: LruCache<SizeKey, Generator>,
}

impl GeneratorCache {
    pub fn new(capacity: usize) -> GeneratorCache {
        GeneratorCache {
            inner: LruCache::new("generator", capacity),
        }
    }

    /// The generator for `size`, created on first use.
    pub fn generator_for(&mut self, size: CanvasSize) -> Generator {
        self.inner
            .get_or_generate(size.key(), || Some(Generator::new(size)))
            .unwrap_or_else(|| Generator::new(size))
    }

    pub fn get(&mut self, size: CanvasSize) -> Option<Generator> {
        self.inner.get(&size.key())
    }

    pub fn contains(&self, size: CanvasSize) -> bool {
        self.inner.contains(&size.key())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&mut self) {
        self.inner.clear()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }
}

/// Drawing cache key: shape identity and parameters, rounded size and the
/// options hash.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawingKey {
    pub shape: u64,
    pub size: SizeKey,
    pub options: u64,
}

impl DrawingKey {
    pub fn new(shape: &ShapeDescriptor, options: &RenderOptions, size: CanvasSize) -> DrawingKey {
        DrawingKey {
            shape: shape.cache_hash(),
            size: size.key(),
            options: options.cache_hash(),
        }
    }
}

/// Finished drawings, shared out by reference count.
#[derive(Debug, Clone)]
pub struct DrawingCache {
    inner: LruCache<DrawingKey, Arc<Drawing>>,
}

impl DrawingCache {
    pub fn new(capacity: usize) -> DrawingCache {
        DrawingCache {
            inner: LruCache::new("drawing", capacity),
        }
    }

    pub fn get_or_generate<F>(&mut self, key: DrawingKey, producer: F) -> Option<Arc<Drawing>>
    where
        F: FnOnce() -> Option<Drawing>,
    {
        self.inner
            .get_or_generate(key, || producer().map(Arc::new))
    }

    pub fn get(&mut self, key: &DrawingKey) -> Option<Arc<Drawing>> {
        self.inner.get(key)
    }

    pub fn set(&mut self, key: DrawingKey, drawing: Arc<Drawing>) {
        self.inner.set(key, drawing)
    }

    pub fn remove(&mut self, key: &DrawingKey) -> Option<Arc<Drawing>> {
        self.inner.remove(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&mut self) {
        self.inner.clear()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_producer_runs_once() {
        let mut cache: LruCache<u32, String> = LruCache::new("test", 4);
        let calls = Cell::new(0);
        let produce = || {
            calls.set(calls.get() + 1);
            Some("drawn".to_string())
        };
        assert_eq!(cache.get_or_generate(1, produce), Some("drawn".to_string()));
        assert_eq!(cache.get_or_generate(1, produce), Some("drawn".to_string()));
        assert_eq!(calls.get(), 1);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
        assert!((stats.hit_rate - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_lru_eviction_order() {
        let mut cache: LruCache<u32, u32> = LruCache::new("test", 2);
        cache.set(1, 10);
        cache.set(2, 20);
        assert_eq!(cache.get(&1), Some(10));
        cache.set(3, 30);
        assert!(cache.contains(&1));
        assert!(!cache.contains(&2));
        assert!(cache.contains(&3));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_empty_producer_is_not_stored() {
        let mut cache: LruCache<u32, u32> = LruCache::new("test", 2);
        assert_eq!(cache.get_or_generate(7, || None), None);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_clear_and_zero_capacity() {
        let mut cache: LruCache<u32, u32> = LruCache::new("test", 0);
        assert_eq!(cache.capacity(), 1);
        cache.set(1, 1);
        cache.set(2, 2);
        assert_eq!(cache.get(&2), Some(2));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert_eq!(cache.stats(), CacheStats::default());
        assert_eq!(cache.remove(&2), None);
    }

    #[test]
    fn test_generator_cache_bounded() {
        let mut cache = GeneratorCache::new(3);
        for w in 1..=5 {
            cache.generator_for(CanvasSize::new(w as f64 * 100.0, 100.0));
        }
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains(CanvasSize::new(100.0, 100.0)));
        assert!(!cache.contains(CanvasSize::new(200.0, 100.0)));
        assert!(cache.contains(CanvasSize::new(500.0, 100.0)));
        // Sizes that round together share a generator.
        cache.generator_for(CanvasSize::new(500.4, 99.6));
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_drawing_key_and_remove() {
        let shape = ShapeDescriptor::Circle {
            x: 10.0,
            y: 10.0,
            diameter: 5.0,
        };
        let options = RenderOptions::default();
        let key = DrawingKey::new(&shape, &options, CanvasSize::new(99.6, 100.2));
        assert_eq!(key, DrawingKey::new(&shape, &options, CanvasSize::new(100.0, 100.0)));
        let mut cache = DrawingCache::new(4);
        cache.set(key, Arc::new(Drawing::new("circle", vec![], options)));
        assert!(cache.get(&key).is_some());
        assert!(cache.remove(&key).is_some());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_config_from_ron() {
        let config = CacheConfig::from_ron("(drawing_capacity: 16)").expect("valid config");
        assert_eq!(config.drawing_capacity, 16);
        assert_eq!(config.generator_capacity, 8);
        assert!(CacheConfig::from_ron("(drawing_capacity: \"lots\")").is_err());
    }
}
