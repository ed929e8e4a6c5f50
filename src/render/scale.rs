//! Screen-space scales.

use chrono::{DateTime, Utc};

use crate::domain::price::PricePoint;

/// Lower padding applied to the minimum price when the Y domain is rebuilt.
pub const DOMAIN_FLOOR_PAD: f64 = 0.999;
/// Upper padding applied to the maximum price when the Y domain is rebuilt.
pub const DOMAIN_CEIL_PAD: f64 = 1.001;

/// Linear map from a numeric domain to a pixel range.
///
/// A degenerate (zero-width or non-finite) domain maps every value to the
/// middle of the range instead of dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span == 0.0 || !span.is_finite() || !value.is_finite() {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / span * (r1 - r0)
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }
}

/// Time scale over the extent of a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    inner: LinearScale,
}

impl TimeScale {
    pub fn new(extent: (DateTime<Utc>, DateTime<Utc>), range: (f64, f64)) -> Self {
        Self {
            inner: LinearScale::new(
                (
                    extent.0.timestamp_millis() as f64,
                    extent.1.timestamp_millis() as f64,
                ),
                range,
            ),
        }
    }

    /// Scale spanning the earliest to the latest point. `None` when empty.
    pub fn from_points(points: &[PricePoint], range: (f64, f64)) -> Option<Self> {
        time_extent(points).map(|extent| Self::new(extent, range))
    }

    pub fn map(&self, time: DateTime<Utc>) -> f64 {
        self.inner.map(time.timestamp_millis() as f64)
    }
}

/// Earliest and latest time. The window is in arrival order, so this scans
/// rather than reading the ends.
pub fn time_extent(points: &[PricePoint]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = points.first()?.time;
    Some(points.iter().fold((first, first), |(lo, hi), p| {
        (lo.min(p.time), hi.max(p.time))
    }))
}

/// Lowest and highest price. `None` when empty.
pub fn price_extent(points: &[PricePoint]) -> Option<(f64, f64)> {
    let first = points.first()?.price;
    Some(points.iter().fold((first, first), |(lo, hi), p| {
        (lo.min(p.price), hi.max(p.price))
    }))
}

/// Cached Y (price) domain with hysteresis.
///
/// The domain is rebuilt only when the latest price leaves it, so small moves
/// inside the band do not rescale the whole chart on every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct YDomain {
    lo: f64,
    hi: f64,
}

impl YDomain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bounds(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// Rebuild from `points` if their latest price is strictly outside the
    /// cached bounds. Returns whether the domain changed.
    pub fn update(&mut self, points: &[PricePoint]) -> bool {
        let Some(last) = points.last() else {
            return false;
        };
        if last.price <= self.hi && last.price >= self.lo {
            return false;
        }
        let Some((min, max)) = price_extent(points) else {
            return false;
        };
        self.lo = min * DOMAIN_FLOOR_PAD;
        self.hi = max * DOMAIN_CEIL_PAD;
        tracing::debug!("Y domain rebuilt: [{}, {}]", self.lo, self.hi);
        true
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.lo, self.hi)
    }

    /// Scale onto `[height, 0]`; screen Y grows downwards.
    pub fn scale(&self, height: f64) -> LinearScale {
        LinearScale::new((self.lo, self.hi), (height, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(price: f64, ms: i64) -> PricePoint {
        PricePoint::from_millis(price, ms).unwrap()
    }

    #[test]
    fn test_linear_scale_maps_endpoints() {
        let scale = LinearScale::new((0.0, 10.0), (0.0, 100.0));
        assert_eq!(scale.map(0.0), 0.0);
        assert_eq!(scale.map(5.0), 50.0);
        assert_eq!(scale.map(10.0), 100.0);
    }

    #[test]
    fn test_inverted_range() {
        let scale = LinearScale::new((100.0, 200.0), (400.0, 0.0));
        assert_eq!(scale.map(100.0), 400.0);
        assert_eq!(scale.map(200.0), 0.0);
    }

    #[test]
    fn test_degenerate_domain_maps_to_midpoint() {
        let scale = LinearScale::new((5.0, 5.0), (0.0, 80.0));
        assert_eq!(scale.map(5.0), 40.0);
        assert_eq!(scale.map(f64::NAN), 40.0);
    }

    #[test]
    fn test_time_extent_scans_unordered_points() {
        let points = vec![p(1.0, 3000), p(1.0, 1000), p(1.0, 2000)];
        let (lo, hi) = time_extent(&points).unwrap();
        assert_eq!(lo.timestamp_millis(), 1000);
        assert_eq!(hi.timestamp_millis(), 3000);
        assert!(time_extent(&[]).is_none());
    }

    #[test]
    fn test_time_scale() {
        let points = vec![p(1.0, 1000), p(1.0, 2000), p(1.0, 3000)];
        let scale = TimeScale::from_points(&points, (0.0, 200.0)).unwrap();
        assert_eq!(scale.map(points[0].time), 0.0);
        assert_eq!(scale.map(points[1].time), 100.0);
        assert_eq!(scale.map(points[2].time), 200.0);
    }

    #[test]
    fn test_y_domain_initial_build() {
        let mut domain = YDomain::new();
        assert_eq!(domain.bounds(), (0.0, 0.0));
        assert!(domain.update(&[p(100.0, 1), p(200.0, 2)]));
        let (lo, hi) = domain.bounds();
        assert!((lo - 99.9).abs() < 1e-9);
        assert!((hi - 200.2).abs() < 1e-9);
    }

    #[test]
    fn test_y_domain_hysteresis() {
        let mut domain = YDomain::with_bounds(98.9, 101.1);
        let mut points = vec![p(100.0, 0)];
        for (i, price) in [99.0, 101.0, 100.5, 99.2, 100.9].into_iter().enumerate() {
            points.push(p(price, i as i64 + 1));
            assert!(!domain.update(&points));
            assert_eq!(domain.bounds(), (98.9, 101.1));
        }
    }

    #[test]
    fn test_y_domain_rebuilds_when_latest_escapes() {
        let mut domain = YDomain::with_bounds(98.9, 101.1);
        let points = vec![p(100.0, 0), p(102.0, 1)];
        assert!(domain.update(&points));
        let (lo, hi) = domain.bounds();
        assert!((lo - 99.9).abs() < 1e-9);
        assert!((hi - 102.102).abs() < 1e-9);
    }

    #[test]
    fn test_y_domain_ignores_escaped_older_points() {
        // Only the latest point triggers a rebuild.
        let mut domain = YDomain::with_bounds(98.9, 101.1);
        assert!(!domain.update(&[p(150.0, 0), p(100.0, 1)]));
    }
}
