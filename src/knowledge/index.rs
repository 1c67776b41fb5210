use super::KnowledgeBase;
use crate::error::ParserError;
use crate::model::{KnownIngredient, KnownModifier, KnownUnit};
use crate::modifiers::ModifierExtractor;
use crate::resolver::EntityIndex;
use crate::units::UnitMatcher;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

/// Immutable lookup tables built from one read of the knowledge base.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub ingredients: EntityIndex<KnownIngredient>,
    pub units: EntityIndex<KnownUnit>,
    pub modifiers: EntityIndex<KnownModifier>,
    pub unit_matcher: UnitMatcher,
    pub modifier_extractor: ModifierExtractor,
}

impl Snapshot {
    pub fn build(
        ingredients: Vec<KnownIngredient>,
        units: Vec<KnownUnit>,
        modifiers: Vec<KnownModifier>,
    ) -> Self {
        let unit_matcher = UnitMatcher::new(&units);
        let modifier_extractor = ModifierExtractor::new(&modifiers);

        Snapshot {
            ingredients: EntityIndex::new(ingredients),
            units: EntityIndex::new(units),
            modifiers: EntityIndex::new(modifiers),
            unit_matcher,
            modifier_extractor,
        }
    }
}

struct CachedSnapshot {
    snapshot: Arc<Snapshot>,
    built_at: Instant,
}

/// Caches a [`Snapshot`] of a [`KnowledgeBase`].
///
/// Readers get a shared `Arc` to an immutable snapshot. A rebuild swaps in a
/// new `Arc` under the write lock; a snapshot is never mutated once published.
pub struct KnowledgeIndex {
    source: Arc<dyn KnowledgeBase>,
    refresh_interval: Duration,
    cached: RwLock<Option<CachedSnapshot>>,
}

impl KnowledgeIndex {
    pub fn new(source: Arc<dyn KnowledgeBase>) -> Self {
        KnowledgeIndex {
            source,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            cached: RwLock::new(None),
        }
    }

    pub fn with_refresh_interval(mut self, refresh_interval: Duration) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }

    /// Drop the cached snapshot; the next reader rebuilds it.
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }

    /// Current snapshot, rebuilt first if missing or older than the refresh
    /// interval. A failed rebuild keeps serving the previous snapshot, or an
    /// empty one if there never was one, until the next interval elapses.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        {
            let cached = self.cached.read().await;
            if let Some(fresh) = cached.as_ref().filter(|c| self.is_fresh(c)) {
                return fresh.snapshot.clone();
            }
        }

        let mut cached = self.cached.write().await;
        // Another reader may have rebuilt while we waited for the lock
        if let Some(fresh) = cached.as_ref().filter(|c| self.is_fresh(c)) {
            return fresh.snapshot.clone();
        }

        match self.load().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                *cached = Some(CachedSnapshot {
                    snapshot: snapshot.clone(),
                    built_at: Instant::now(),
                });
                snapshot
            }
            Err(e) => {
                warn!("Failed to rebuild knowledge index: {}", e);
                let stale = cached
                    .as_ref()
                    .map(|stale| stale.snapshot.clone())
                    .unwrap_or_default();
                // Re-stamped so the next attempt waits a full refresh interval
                *cached = Some(CachedSnapshot {
                    snapshot: stale.clone(),
                    built_at: Instant::now(),
                });
                stale
            }
        }
    }

    fn is_fresh(&self, cached: &CachedSnapshot) -> bool {
        cached.built_at.elapsed() < self.refresh_interval
    }

    async fn load(&self) -> Result<Snapshot, ParserError> {
        let ingredients = self.source.list_ingredients().await?;
        let units = self.source.list_units().await?;
        let modifiers = self.source.list_modifiers().await?;

        debug!(
            "Rebuilt knowledge index: {} ingredients, {} units, {} modifiers",
            ingredients.len(),
            units.len(),
            modifiers.len()
        );

        Ok(Snapshot::build(ingredients, units, modifiers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::InMemoryKnowledgeBase;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct CountingKnowledgeBase {
        inner: InMemoryKnowledgeBase,
        loads: AtomicUsize,
        failing: AtomicBool,
    }

    impl CountingKnowledgeBase {
        fn new() -> Arc<Self> {
            Arc::new(CountingKnowledgeBase {
                inner: InMemoryKnowledgeBase::bundled().unwrap(),
                loads: AtomicUsize::new(0),
                failing: AtomicBool::new(false),
            })
        }
    }

    #[async_trait]
    impl KnowledgeBase for CountingKnowledgeBase {
        async fn list_ingredients(&self) -> Result<Vec<KnownIngredient>, ParserError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(ParserError::KnowledgeBase("store offline".to_string()));
            }
            self.inner.list_ingredients().await
        }

        async fn list_units(&self) -> Result<Vec<KnownUnit>, ParserError> {
            self.inner.list_units().await
        }

        async fn list_modifiers(&self) -> Result<Vec<KnownModifier>, ParserError> {
            self.inner.list_modifiers().await
        }
    }

    #[tokio::test]
    async fn test_snapshot_is_cached() {
        let source = CountingKnowledgeBase::new();
        let index = KnowledgeIndex::new(source.clone());

        let first = index.snapshot().await;
        let second = index.snapshot().await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.loads.load(Ordering::SeqCst), 1);
        assert!(!first.ingredients.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_forces_rebuild() {
        let source = CountingKnowledgeBase::new();
        let index = KnowledgeIndex::new(source.clone());

        let first = index.snapshot().await;
        index.invalidate().await;
        let second = index.snapshot().await;

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(source.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rebuilds_after_refresh_interval() {
        let source = CountingKnowledgeBase::new();
        let index =
            KnowledgeIndex::new(source.clone()).with_refresh_interval(Duration::from_secs(60));

        index.snapshot().await;
        tokio::time::advance(Duration::from_secs(30)).await;
        index.snapshot().await;
        assert_eq!(source.loads.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        index.snapshot().await;
        assert_eq!(source.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_rebuild_keeps_previous_snapshot() {
        let source = CountingKnowledgeBase::new();
        let index = KnowledgeIndex::new(source.clone());

        let good = index.snapshot().await;
        source.failing.store(true, Ordering::SeqCst);
        // Expire the cache without dropping it
        let index = index.with_refresh_interval(Duration::ZERO);
        let after_failure = index.snapshot().await;

        assert!(Arc::ptr_eq(&good, &after_failure));
    }

    #[tokio::test(start_paused = true)]
    async fn test_outage_reloads_once_per_interval() {
        let source = CountingKnowledgeBase::new();
        let index =
            KnowledgeIndex::new(source.clone()).with_refresh_interval(Duration::from_secs(300));

        let good = index.snapshot().await;
        tokio::time::advance(Duration::from_secs(301)).await;
        source.failing.store(true, Ordering::SeqCst);

        for _ in 0..5 {
            assert!(Arc::ptr_eq(&good, &index.snapshot().await));
        }
        assert_eq!(source.loads.load(Ordering::SeqCst), 2);

        tokio::time::advance(Duration::from_secs(301)).await;
        index.snapshot().await;
        index.snapshot().await;
        assert_eq!(source.loads.load(Ordering::SeqCst), 3);

        source.failing.store(false, Ordering::SeqCst);
        tokio::time::advance(Duration::from_secs(301)).await;
        let recovered = index.snapshot().await;
        assert!(!Arc::ptr_eq(&good, &recovered));
        assert_eq!(source.loads.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_first_load_waits_before_retrying() {
        let source = CountingKnowledgeBase::new();
        source.failing.store(true, Ordering::SeqCst);
        let index =
            KnowledgeIndex::new(source.clone()).with_refresh_interval(Duration::from_secs(60));

        for _ in 0..3 {
            assert!(index.snapshot().await.ingredients.is_empty());
        }
        assert_eq!(source.loads.load(Ordering::SeqCst), 1);

        source.failing.store(false, Ordering::SeqCst);
        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(!index.snapshot().await.ingredients.is_empty());
        assert_eq!(source.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_first_load_yields_empty_snapshot() {
        let source = CountingKnowledgeBase::new();
        source.failing.store(true, Ordering::SeqCst);
        let index = KnowledgeIndex::new(source);

        let snapshot = index.snapshot().await;
        assert!(snapshot.ingredients.is_empty());
        assert!(snapshot.units.is_empty());
    }
}
