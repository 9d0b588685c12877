//! In-memory caching using moka
//!
//! Programs change rarely and are read on every snapshot save, so they are
//! cached by id. Snapshot listings are cached per program and dropped
//! whenever a new snapshot for that program is saved.

use moka::future::Cache;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::queries;
use crate::models::Program;
use crate::pricing::models::SnapshotSummary;

/// Application cache holding programs and snapshot listings
#[derive(Clone)]
pub struct AppCache {
    /// Programs (id -> Program)
    pub programs: Cache<Uuid, Arc<Program>>,
    /// Snapshot listings (program id -> newest-first summaries)
    pub snapshot_listings: Cache<Uuid, Arc<Vec<SnapshotSummary>>>,
    /// Bumped on every listing invalidation
    snapshot_generation: Arc<AtomicU64>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // Programs: 500 entries, 30 min TTL, 10 min idle
            programs: Cache::builder()
                .max_capacity(500)
                .time_to_live(Duration::from_secs(30 * 60))
                .time_to_idle(Duration::from_secs(10 * 60))
                .build(),

            // Snapshot listings: 200 programs, 5 min TTL
            snapshot_listings: Cache::builder()
                .max_capacity(200)
                .time_to_live(Duration::from_secs(5 * 60))
                .build(),

            snapshot_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            programs_size: self.programs.entry_count(),
            snapshot_listings_size: self.snapshot_listings.entry_count(),
        }
    }

    /// Generation to read before loading a listing from the database
    pub fn snapshot_generation(&self) -> u64 {
        self.snapshot_generation.load(Ordering::SeqCst)
    }

    /// Drop the cached snapshot listing of a program
    pub async fn invalidate_snapshots(&self, program_id: Uuid) {
        self.snapshot_generation.fetch_add(1, Ordering::SeqCst);
        self.snapshot_listings.invalidate(&program_id).await;
        info!("Snapshot listing cache invalidated for program: {}", program_id);
    }

    /// Cache a listing loaded at `generation`.
    ///
    /// Nothing is kept if a listing was invalidated since `generation` was
    /// read. The second check covers an invalidation racing the insert.
    pub async fn cache_snapshot_listing(
        &self,
        program_id: Uuid,
        listing: Arc<Vec<SnapshotSummary>>,
        generation: u64,
    ) -> bool {
        if self.snapshot_generation() != generation {
            return false;
        }
        self.snapshot_listings.insert(program_id, listing).await;

        if self.snapshot_generation() != generation {
            self.snapshot_listings.invalidate(&program_id).await;
            return false;
        }
        true
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub programs_size: u64,
    pub snapshot_listings_size: u64,
}

/// Start background cache warmer
///
/// Warms the cache on startup and refreshes every `every`.
pub async fn start_cache_warmer(cache: AppCache, db: PgPool, every: Duration) {
    let mut interval = interval(every);
    loop {
        // First tick completes immediately
        interval.tick().await;
        warm_cache(&cache, &db).await;
    }
}

/// Warm the cache with the active programs
async fn warm_cache(cache: &AppCache, db: &PgPool) {
    info!("Starting cache warm-up...");

    match queries::get_active_programs(db).await {
        Ok(programs) => {
            let count = programs.len();
            for program in programs {
                cache.programs.insert(program.id, Arc::new(program)).await;
            }
            info!("Warmed {} active programs", count);
        }
        Err(e) => warn!("Failed to warm program cache: {}", e),
    }

    info!("Cache warm-up complete. Stats: {:?}", cache.stats());
}
