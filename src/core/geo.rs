use crate::domain::geo::{Basemap, CountryShape};
use crate::domain::model::CanonicalRecord;
use crate::domain::ports::BasemapSource;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info};

pub const MIN_RADIUS: f64 = 3.0;
pub const MAX_RADIUS: f64 = 22.0;

/// Session-wide basemap, fetched at most once.
///
/// Every caller of [`BasemapCache::get`] awaits the same initialization: the
/// first one runs the fetch, concurrent ones wait on it, later ones read the
/// stored outcome. A failed fetch is stored as `None` and never retried, so
/// only the map view degrades for the rest of the session.
pub struct BasemapCache<B: BasemapSource> {
    source: B,
    cell: OnceCell<Option<Arc<Basemap>>>,
}

impl<B: BasemapSource> BasemapCache<B> {
    pub fn new(source: B) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> Option<Arc<Basemap>> {
        self.cell
            .get_or_init(|| async {
                match self.source.fetch_basemap().await {
                    Ok(basemap) => {
                        info!("🗺️ Basemap loaded with {} countries", basemap.countries.len());
                        Some(Arc::new(basemap))
                    }
                    Err(e) => {
                        error!("❌ World map load error: {}", e);
                        None
                    }
                }
            })
            .await
            .clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryPoint {
    pub name: String,
    pub count: usize,
    pub lon: f64,
    pub lat: f64,
    pub radius: f64,
}

/// Postings per trimmed country value.
pub fn country_counts(records: &[&CanonicalRecord]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for r in records {
        *counts.entry(r.country.trim().to_string()).or_insert(0) += 1;
    }
    counts
}

/// One point per basemap country that has postings, in basemap order.
pub fn country_points(records: &[&CanonicalRecord], basemap: &Basemap) -> Vec<CountryPoint> {
    let counts = country_counts(records);
    let mut points: Vec<CountryPoint> = basemap
        .countries
        .iter()
        .filter_map(|shape| {
            let count = *counts.get(&shape.name)?;
            let (lon, lat) = centroid(shape)?;
            Some(CountryPoint {
                name: shape.name.clone(),
                count,
                lon,
                lat,
                radius: 0.0,
            })
        })
        .collect();

    let max_count = points.iter().map(|p| p.count).max().unwrap_or(1);
    for p in &mut points {
        p.radius = sqrt_radius(p.count, max_count);
    }
    points
}

/// Square-root scale from `[1, max_count]` onto `[MIN_RADIUS, MAX_RADIUS]`.
pub fn sqrt_radius(count: usize, max_count: usize) -> f64 {
    let lo = 1f64;
    let hi = (max_count as f64).sqrt();
    let t = if hi == lo {
        0.5
    } else {
        ((count as f64).sqrt() - lo) / (hi - lo)
    };
    MIN_RADIUS + t * (MAX_RADIUS - MIN_RADIUS)
}

/// Area-weighted centroid over all outer rings; falls back to the vertex mean
/// when the rings are degenerate.
pub fn centroid(shape: &CountryShape) -> Option<(f64, f64)> {
    let (mut area_sum, mut cx, mut cy) = (0.0, 0.0, 0.0);
    for ring in &shape.rings {
        for w in ring.windows(2) {
            let ((x0, y0), (x1, y1)) = (w[0], w[1]);
            let cross = x0 * y1 - x1 * y0;
            area_sum += cross;
            cx += (x0 + x1) * cross;
            cy += (y0 + y1) * cross;
        }
        // 閉合最後一段
        if let (Some(&(x0, y0)), Some(&(x1, y1))) = (ring.last(), ring.first()) {
            let cross = x0 * y1 - x1 * y0;
            area_sum += cross;
            cx += (x0 + x1) * cross;
            cy += (y0 + y1) * cross;
        }
    }

    if area_sum.abs() > f64::EPSILON {
        return Some((cx / (3.0 * area_sum), cy / (3.0 * area_sum)));
    }

    let all: Vec<(f64, f64)> = shape.rings.iter().flatten().copied().collect();
    if all.is_empty() {
        return None;
    }
    let n = all.len() as f64;
    Some((
        all.iter().map(|p| p.0).sum::<f64>() / n,
        all.iter().map(|p| p.1).sum::<f64>() / n,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::{ObservatoryError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn square(name: &str, x: f64, y: f64, size: f64) -> CountryShape {
        CountryShape {
            name: name.to_string(),
            rings: vec![vec![
                (x, y),
                (x + size, y),
                (x + size, y + size),
                (x, y + size),
                (x, y),
            ]],
        }
    }

    struct CountingSource {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl BasemapSource for CountingSource {
        async fn fetch_basemap(&self) -> Result<Basemap> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            if self.fail {
                return Err(ObservatoryError::BasemapError {
                    message: "offline".to_string(),
                });
            }
            Ok(Basemap {
                countries: vec![square("France", 0.0, 0.0, 2.0)],
            })
        }
    }

    #[test]
    fn test_centroid_of_square() {
        let (lon, lat) = centroid(&square("A", 10.0, 20.0, 4.0)).unwrap();
        assert!((lon - 12.0).abs() < 1e-9);
        assert!((lat - 22.0).abs() < 1e-9);
    }

    #[test]
    fn test_centroid_of_degenerate_ring_uses_vertex_mean() {
        let shape = CountryShape {
            name: "Line".to_string(),
            rings: vec![vec![(0.0, 0.0), (2.0, 0.0), (4.0, 0.0)]],
        };
        assert_eq!(centroid(&shape), Some((2.0, 0.0)));
    }

    #[test]
    fn test_sqrt_radius_bounds() {
        assert_eq!(sqrt_radius(1, 100), MIN_RADIUS);
        assert_eq!(sqrt_radius(100, 100), MAX_RADIUS);
        assert!((sqrt_radius(25, 100) - (3.0 + 4.0 / 9.0 * 19.0)).abs() < 1e-9);
        assert_eq!(sqrt_radius(1, 1), 12.5);
    }

    #[tokio::test]
    async fn test_concurrent_requesters_share_one_fetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = BasemapCache::new(CountingSource {
            calls: calls.clone(),
            fail: false,
        });

        let (a, b, c) = tokio::join!(cache.get(), cache.get(), cache.get());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(a.is_some() && b.is_some() && c.is_some());
        assert!(Arc::ptr_eq(a.as_ref().unwrap(), b.as_ref().unwrap()));

        cache.get().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_cached_as_unavailable() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = BasemapCache::new(CountingSource {
            calls: calls.clone(),
            fail: true,
        });

        assert!(!cache.is_initialized());
        assert!(cache.get().await.is_none());
        assert!(cache.get().await.is_none());
        assert!(cache.is_initialized());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
