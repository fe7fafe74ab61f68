// src/app/prefetch.rs
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::app::cache::{decode_artwork, ArtworkCache};
use crate::app::fetch::Fetcher;
use crate::app::types::{Catalog, SharedCatalog, TileId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PrefetchReport {
    pub fetched: usize,
    pub already_cached: usize,
    pub failed: usize,
}

/// `priority` first (typically the on-screen cells), then every tile in catalog order.
pub fn prefetch_order(catalog: &Catalog, priority: &[TileId]) -> Vec<TileId> {
    let all = catalog
        .rows
        .iter()
        .enumerate()
        .flat_map(|(r, row)| (0..row.tiles.len()).map(move |c| TileId::new(r, c)));

    priority
        .iter()
        .copied()
        .filter(|id| catalog.tile(*id).is_some())
        .chain(all)
        .unique()
        .collect()
}

/// One pass over `order`. Per-tile failures are logged and skipped.
pub fn run_prefetch_pass<F>(
    catalog: &Catalog,
    order: &[TileId],
    cache: &ArtworkCache,
    fetcher: &F,
) -> PrefetchReport
where
    F: Fetcher + ?Sized,
{
    let mut report = PrefetchReport::default();

    for &id in order {
        let Some(tile) = catalog.tile(id) else {
            continue;
        };
        let url = tile.artwork_url.as_str();

        // lock only for the lookup; the fetch below runs unlocked
        if cache.contains(url) {
            report.already_cached += 1;
            continue;
        }

        let decoded = fetcher
            .fetch(url)
            .map_err(|e| e.to_string())
            .and_then(|bytes| decode_artwork(&bytes).map_err(|e| e.to_string()));

        match decoded {
            Ok(image) => {
                cache.insert(url, image);
                report.fetched += 1;
            }
            Err(e) => {
                debug!("artwork for `{}` unavailable: {e}", tile.name);
                report.failed += 1;
            }
        }
    }

    report
}

/// The single background pass that fills the artwork cache.
pub struct PrefetchWorker {
    handle: Option<JoinHandle<PrefetchReport>>,
}

impl PrefetchWorker {
    pub fn start(
        catalog: SharedCatalog,
        priority: &[TileId],
        cache: ArtworkCache,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        let order = prefetch_order(&catalog, priority);
        let total = order.len();

        let spawned = thread::Builder::new()
            .name("artwork-prefetch".into())
            .spawn(move || {
                let started = Instant::now();
                let report = run_prefetch_pass(&catalog, &order, &cache, fetcher.as_ref());
                info!(
                    "Artwork prefetch finished in {:.1}s: {} fetched, {} cached, {} failed (of {total})",
                    started.elapsed().as_secs_f32(),
                    report.fetched,
                    report.already_cached,
                    report.failed,
                );
                report
            });

        let handle = match spawned {
            Ok(h) => Some(h),
            Err(e) => {
                warn!("could not start artwork prefetch ({e}); tiles will stay on placeholders");
                None
            }
        };
        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the pass to end. Only called at shutdown.
    pub fn join(&mut self) -> Option<PrefetchReport> {
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(report) => Some(report),
            Err(_) => {
                warn!("artwork prefetch thread panicked");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::cache::tests::png_bytes;
    use crate::app::error::FetchError;
    use crate::app::types::{Tile, TileSet};
    use image::{DynamicImage, RgbImage};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeFetcher {
        bodies: HashMap<String, Vec<u8>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn new(bodies: impl IntoIterator<Item = (&'static str, Vec<u8>)>) -> Self {
            Self {
                bodies: bodies.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Fetcher for FakeFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.calls.lock().unwrap().push(url.to_string());
            self.bodies.get(url).cloned().ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn png() -> Vec<u8> {
        png_bytes(DynamicImage::ImageRgb8(RgbImage::new(4, 3)))
    }

    fn tile(url: &str) -> Tile {
        Tile {
            name: url.into(),
            artwork_url: url.into(),
            ..Tile::default()
        }
    }

    fn catalog(rows: Vec<Vec<&str>>) -> Catalog {
        Catalog::new(
            rows.into_iter()
                .map(|urls| TileSet {
                    name: "row".into(),
                    tiles: urls.into_iter().map(tile).collect(),
                })
                .collect(),
        )
    }

    #[test]
    fn order_puts_priority_first_without_duplicates() {
        let cat = catalog(vec![vec!["a", "b", "c"], vec!["d", "e"]]);
        let order = prefetch_order(&cat, &[TileId::new(1, 1), TileId::new(0, 2), TileId::new(9, 9)]);
        assert_eq!(
            order,
            vec![
                TileId::new(1, 1),
                TileId::new(0, 2),
                TileId::new(0, 0),
                TileId::new(0, 1),
                TileId::new(1, 0),
            ]
        );
    }

    #[test]
    fn failures_are_skipped_and_the_pass_continues() {
        let cat = catalog(vec![vec!["http://ok/1", "http://404", "http://garbage", "http://ok/2"]]);
        let fetcher = FakeFetcher::new([
            ("http://ok/1", png()),
            ("http://garbage", b"<html>".to_vec()),
            ("http://ok/2", png()),
        ]);
        let cache = ArtworkCache::new();
        let order = prefetch_order(&cat, &[]);

        let report = run_prefetch_pass(&cat, &order, &cache, &fetcher);
        assert_eq!(report, PrefetchReport { fetched: 2, already_cached: 0, failed: 2 });
        assert!(cache.contains("http://ok/1"));
        assert!(cache.contains("http://ok/2"));
        assert!(!cache.contains("http://404"));
        assert_eq!(cache.get("http://ok/2").unwrap().bits_per_pixel, 24);
    }

    #[test]
    fn shared_urls_are_fetched_once() {
        let cat = catalog(vec![vec!["http://same", "http://same"], vec!["http://same"]]);
        let fetcher = FakeFetcher::new([("http://same", png())]);
        let cache = ArtworkCache::new();
        let order = prefetch_order(&cat, &[]);

        let report = run_prefetch_pass(&cat, &order, &cache, &fetcher);
        assert_eq!(report.fetched, 1);
        assert_eq!(report.already_cached, 2);
        assert_eq!(fetcher.calls(), vec!["http://same".to_string()]);
        assert_eq!(cache.len(), 1);
    }

    /// Reads the cache it is filling, so a lock held across the fetch would deadlock.
    struct CacheReadingFetcher {
        cache: ArtworkCache,
        seen_len: Mutex<Vec<usize>>,
    }

    impl Fetcher for CacheReadingFetcher {
        fn fetch(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
            self.seen_len.lock().unwrap().push(self.cache.len());
            Ok(png())
        }
    }

    #[test]
    fn cache_stays_unlocked_while_fetching() {
        let cat = catalog(vec![vec!["http://a", "http://b"]]);
        let cache = ArtworkCache::new();
        let fetcher = CacheReadingFetcher {
            cache: cache.clone(),
            seen_len: Mutex::new(Vec::new()),
        };
        let order = prefetch_order(&cat, &[]);

        let report = run_prefetch_pass(&cat, &order, &cache, &fetcher);
        assert_eq!(report.fetched, 2);
        // the second fetch sees the first insert
        assert_eq!(*fetcher.seen_len.lock().unwrap(), vec![0, 1]);
    }

    #[test]
    fn worker_thread_fills_the_shared_cache_and_joins() {
        let cat = Arc::new(catalog(vec![vec!["http://a", "http://b"], vec!["http://c"]]));
        let fetcher: Arc<dyn Fetcher> = Arc::new(FakeFetcher::new([
            ("http://a", png()),
            ("http://b", png()),
            ("http://c", png()),
        ]));
        let cache = ArtworkCache::new();

        let mut worker = PrefetchWorker::start(cat, &[TileId::new(1, 0)], cache.clone(), fetcher);
        let report = worker.join().unwrap();
        assert!(worker.is_finished());
        assert_eq!(report.fetched, 3);
        assert_eq!(cache.len(), 3);
        // second join is a no-op
        assert_eq!(worker.join(), None);
    }
}
