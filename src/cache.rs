use std::sync::Arc;

use failure::Error;
use log::trace;
use parking_lot::Mutex;

use crate::MinecraftVersion;
use crate::official::{self, MappingsLoader};
use crate::source_map::SourceMap;
use crate::utils::LruCache;

const MAXIMUM_CACHE_SIZE: usize = 32;

/// Keeps the most recently used official mappings in memory
pub struct OfficialMappingsCache<L: MappingsLoader> {
    loader: L,
    versions: Mutex<LruCache<MinecraftVersion, Arc<SourceMap>>>,
    lock: Mutex<()>
}
impl<L: MappingsLoader> OfficialMappingsCache<L> {
    #[inline]
    pub fn new(loader: L) -> OfficialMappingsCache<L> {
        OfficialMappingsCache::with_capacity(loader, MAXIMUM_CACHE_SIZE)
    }
    /// Keep at most `capacity` versions in memory (at least one is always kept)
    pub fn with_capacity(loader: L, capacity: usize) -> OfficialMappingsCache<L> {
        OfficialMappingsCache {
            loader,
            versions: Mutex::new(LruCache::new(capacity)),
            lock: Mutex::new(())
        }
    }
    #[inline]
    pub fn loader(&self) -> &L {
        &self.loader
    }
    #[inline]
    pub fn is_loaded(&self, version: MinecraftVersion) -> bool {
        self.versions.lock().contains_key(&version)
    }
    pub fn load_mappings(&self, version: MinecraftVersion) -> Result<Arc<SourceMap>, Error> {
        if let Some(loaded) = self.versions.lock().get_refresh(&version) {
            trace!("Using cached official mappings for {}", version);
            return Ok(loaded.clone());
        }
        self.load_mappings_fallback(version)
    }
    #[cold]
    fn load_mappings_fallback(&self, version: MinecraftVersion) -> Result<Arc<SourceMap>, Error> {
        // This lock guarantees that only one person will be loading mappings at a time
        let _guard = self.lock.lock();
        /*
         * Now that we have the lock,
         * let's check again if our version is present.
         * Someone else could've already loaded it while we were blocking
         */
        if let Some(loaded) = self.versions.lock().get(&version) {
            return Ok(loaded.clone());
        }
        let mappings = Arc::new(official::read(&self.loader, version)?);
        self.versions.lock().insert(version, mappings.clone());
        Ok(mappings)
    }
}
