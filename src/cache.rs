//! Explicit load-once cache for the sequenced dataset.
//!
//! Invalidation policy: the first `get_or_load` loads and every later call
//! returns the same catalog until `refresh` or `invalidate` is called. Query
//! functions never consult this cache themselves.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tracing::info;

use crate::catalog::CareerCatalog;
use crate::config::RankingConfig;
use crate::errors::CareerError;
use crate::ingest::load_catalog;
use crate::source::DatasetSource;

/// Process-lifetime cache of one source's catalog.
pub struct CatalogCache<S: DatasetSource> {
    source: S,
    ranking: RankingConfig,
    current: RwLock<Option<Arc<CareerCatalog>>>,
    loads: AtomicUsize,
}

impl<S: DatasetSource> CatalogCache<S> {
    /// Create an empty cache; nothing is loaded until first use.
    pub fn new(source: S, ranking: RankingConfig) -> Self {
        Self {
            source,
            ranking,
            current: RwLock::new(None),
            loads: AtomicUsize::new(0),
        }
    }

    /// Wrapped source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Return the cached catalog, loading it on first use.
    ///
    /// Concurrent first callers share a single load. Failed loads are not
    /// cached, so the next call retries.
    pub fn get_or_load(&self) -> Result<Arc<CareerCatalog>, CareerError> {
        if let Some(catalog) = self.read_current()? {
            return Ok(catalog);
        }
        let mut guard = self.current.write().map_err(|_| self.poisoned())?;
        if let Some(catalog) = guard.as_ref() {
            return Ok(catalog.clone());
        }
        let catalog = Arc::new(self.load()?);
        *guard = Some(catalog.clone());
        Ok(catalog)
    }

    /// Reload unconditionally, replacing the cached catalog on success.
    ///
    /// On failure the previous catalog (if any) stays cached.
    pub fn refresh(&self) -> Result<Arc<CareerCatalog>, CareerError> {
        let catalog = Arc::new(self.load()?);
        let mut guard = self.current.write().map_err(|_| self.poisoned())?;
        *guard = Some(catalog.clone());
        info!("[career:cache] source='{}' refreshed", self.source.id());
        Ok(catalog)
    }

    /// Drop the cached catalog; the next `get_or_load` reloads.
    pub fn invalidate(&self) -> Result<(), CareerError> {
        let mut guard = self.current.write().map_err(|_| self.poisoned())?;
        if guard.take().is_some() {
            info!("[career:cache] source='{}' invalidated", self.source.id());
        }
        Ok(())
    }

    /// Whether a catalog is currently cached.
    pub fn is_loaded(&self) -> bool {
        matches!(self.read_current(), Ok(Some(_)))
    }

    /// Number of successful loads performed so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    fn read_current(&self) -> Result<Option<Arc<CareerCatalog>>, CareerError> {
        let guard = self.current.read().map_err(|_| self.poisoned())?;
        Ok(guard.clone())
    }

    fn load(&self) -> Result<CareerCatalog, CareerError> {
        info!("[career:cache] loading source='{}'", self.source.id());
        let catalog = load_catalog(&self.source, self.ranking.clone())?;
        self.loads.fetch_add(1, Ordering::Relaxed);
        Ok(catalog)
    }

    fn poisoned(&self) -> CareerError {
        CareerError::SourceInconsistent {
            source_id: self.source.id().to_string(),
            details: "catalog cache lock poisoned".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::JobRecord;
    use crate::source::RawJobRow;
    use std::sync::atomic::AtomicBool;
    use std::thread;

    /// Source that counts fetches and can be switched offline.
    struct FlakySource {
        fetches: AtomicUsize,
        offline: AtomicBool,
    }

    impl FlakySource {
        fn new() -> Self {
            Self {
                fetches: AtomicUsize::new(0),
                offline: AtomicBool::new(false),
            }
        }
    }

    impl DatasetSource for FlakySource {
        fn id(&self) -> &str {
            "flaky"
        }

        fn load_rows(&self) -> Result<Vec<RawJobRow>, CareerError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.offline.load(Ordering::SeqCst) {
                return Err(CareerError::SourceUnavailable {
                    source_id: "flaky".into(),
                    reason: "offline".into(),
                });
            }
            Ok(vec![
                JobRecord::new("1", "Cook", "", "Q1 2019").into(),
                JobRecord::new("1", "Waiter", "", "Q2 2019").into(),
            ])
        }
    }

    #[test]
    fn loads_once_and_shares_the_catalog() {
        let cache = CatalogCache::new(FlakySource::new(), RankingConfig::default());
        assert!(!cache.is_loaded());
        let first = cache.get_or_load().unwrap();
        let second = cache.get_or_load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.load_count(), 1);
        assert_eq!(cache.source().fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_first_use_loads_once() {
        let cache = Arc::new(CatalogCache::new(FlakySource::new(), RankingConfig::default()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                thread::spawn(move || cache.get_or_load().map(|catalog| catalog.table().len()))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), 2);
        }
        assert_eq!(cache.load_count(), 1);
    }

    #[test]
    fn failed_refresh_keeps_previous_catalog() {
        let cache = CatalogCache::new(FlakySource::new(), RankingConfig::default());
        let first = cache.get_or_load().unwrap();
        cache.source().offline.store(true, Ordering::SeqCst);
        assert!(cache.refresh().is_err());
        let still = cache.get_or_load().unwrap();
        assert!(Arc::ptr_eq(&first, &still));
    }

    #[test]
    fn invalidate_forces_reload_and_failures_are_not_cached() {
        let cache = CatalogCache::new(FlakySource::new(), RankingConfig::default());
        cache.get_or_load().unwrap();
        cache.invalidate().unwrap();
        assert!(!cache.is_loaded());

        cache.source().offline.store(true, Ordering::SeqCst);
        assert!(cache.get_or_load().is_err());
        assert!(!cache.is_loaded());

        cache.source().offline.store(false, Ordering::SeqCst);
        cache.get_or_load().unwrap();
        assert_eq!(cache.load_count(), 2);
    }

    #[test]
    fn refresh_replaces_catalog() {
        let cache = CatalogCache::new(FlakySource::new(), RankingConfig::default());
        let first = cache.get_or_load().unwrap();
        let refreshed = cache.refresh().unwrap();
        assert!(!Arc::ptr_eq(&first, &refreshed));
        assert_eq!(cache.load_count(), 2);
    }
}
