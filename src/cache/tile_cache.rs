use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    cache::fingerprint::Fingerprint,
    foundation::core::{Box2i, Format, Vec2i},
    foundation::error::WarpResult,
    image::source::{ImageSource, TileData},
};

const DEFAULT_CAPACITY: usize = 1024;

/// Hit/miss counters of a [`TileCache`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to compute the tile.
    pub misses: u64,
    /// Tiles dropped to stay within capacity.
    pub evictions: u64,
}

/// Least-recently-used tile store keyed by tile hash.
#[derive(Debug)]
pub struct TileCache {
    tiles: HashMap<Fingerprint, TileData>,
    lru: VecDeque<Fingerprint>,
    capacity: usize,
    stats: CacheStats,
}

impl Default for TileCache {
    fn default() -> Self {
        Self::from_env()
    }
}

impl TileCache {
    /// Cache holding at most `capacity` tiles (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            tiles: HashMap::new(),
            lru: VecDeque::new(),
            capacity: capacity.max(1),
            stats: CacheStats::default(),
        }
    }

    /// Capacity from `TILEWARP_TILE_CACHE_CAPACITY`, falling back to 1024.
    pub fn from_env() -> Self {
        let capacity = std::env::var("TILEWARP_TILE_CACHE_CAPACITY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_CAPACITY);
        Self::new(capacity)
    }

    /// Maximum number of resident tiles.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of resident tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Return `true` when no tile is resident.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Counters since construction or the last [`TileCache::clear`].
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Look a tile up, marking it most recently used.
    pub fn get(&mut self, key: Fingerprint) -> Option<TileData> {
        match self.tiles.get(&key).cloned() {
            Some(tile) => {
                self.stats.hits += 1;
                self.touch(key);
                Some(tile)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Store a tile, evicting the least recently used ones beyond capacity.
    pub fn insert(&mut self, key: Fingerprint, tile: TileData) {
        self.tiles.insert(key, tile);
        self.touch(key);
        while self.lru.len() > self.capacity {
            if let Some(old) = self.lru.pop_front() {
                self.tiles.remove(&old);
                self.stats.evictions += 1;
                tracing::trace!(key = ?old, "tile evicted");
            }
        }
    }

    /// Drop every tile and reset counters.
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.lru.clear();
        self.stats = CacheStats::default();
    }

    fn touch(&mut self, key: Fingerprint) {
        if let Some(pos) = self.lru.iter().position(|k| *k == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key);
    }
}

/// An [`ImageSource`] whose channel tiles are memoized by their hash.
///
/// Everything but [`ImageSource::channel_tile`] is forwarded. Two requests with equal tile
/// hashes return the same data, so a parameter change that alters the hash can never be served a
/// stale tile.
pub struct CachedImage<S> {
    inner: S,
    cache: Mutex<TileCache>,
}

impl<S: ImageSource> CachedImage<S> {
    /// Wrap `inner` with a cache sized from the environment.
    pub fn new(inner: S) -> Self {
        Self::with_cache(inner, TileCache::from_env())
    }

    /// Wrap `inner` with an explicit cache.
    pub fn with_cache(inner: S, cache: TileCache) -> Self {
        Self {
            inner,
            cache: Mutex::new(cache),
        }
    }

    /// The wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Current cache counters.
    pub fn stats(&self) -> CacheStats {
        self.cache.lock().stats()
    }
}

impl<S: ImageSource> ImageSource for CachedImage<S> {
    fn format(&self) -> WarpResult<Format> {
        self.inner.format()
    }

    fn data_window(&self) -> WarpResult<Box2i> {
        self.inner.data_window()
    }

    fn channel_names(&self) -> WarpResult<Arc<[String]>> {
        self.inner.channel_names()
    }

    fn channel_tile(&self, channel: &str, tile_origin: Vec2i) -> WarpResult<TileData> {
        self.channel_tile_with_hash(channel, tile_origin).map(|(_, tile)| tile)
    }

    fn hash_format(&self) -> WarpResult<Fingerprint> {
        self.inner.hash_format()
    }

    fn hash_data_window(&self) -> WarpResult<Fingerprint> {
        self.inner.hash_data_window()
    }

    fn hash_channel_names(&self) -> WarpResult<Fingerprint> {
        self.inner.hash_channel_names()
    }

    fn hash_channel_tile(&self, channel: &str, tile_origin: Vec2i) -> WarpResult<Fingerprint> {
        self.inner.hash_channel_tile(channel, tile_origin)
    }

    fn channel_tile_with_hash(
        &self,
        channel: &str,
        tile_origin: Vec2i,
    ) -> WarpResult<(Fingerprint, TileData)> {
        let key = self.inner.hash_channel_tile(channel, tile_origin)?;
        if let Some(tile) = self.cache.lock().get(key) {
            return Ok((key, tile));
        }
        // Computed outside the lock; concurrent misses on one key may both compute. The tile is
        // stored under the key of the snapshot it was computed from, which differs from `key`
        // when parameters changed in between.
        let (computed_key, tile) = self.inner.channel_tile_with_hash(channel, tile_origin)?;
        self.cache.lock().insert(computed_key, tile.clone());
        Ok((computed_key, tile))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/tile_cache.rs"]
mod tests;
