//! Chart renderer. Maps a window of points to screen-space geometry.
//!
//! [`ChartRenderer::render`] is called on every change to the window, the
//! viewport or the style. It returns a [`Scene`]: the target geometry plus the
//! transitions (scroll by one sample slot, marker glide, dot fade) that an
//! [`Animator`] evaluates frame by frame. [`svg::to_svg`] turns a frame into
//! markup.

pub mod curve;
pub mod scale;
pub mod scene;
pub mod svg;

use std::time::Duration;

use crate::domain::price::PricePoint;
use crate::shared::fmt::{format_number, FormatNumberOptions};

pub use scale::{LinearScale, TimeScale, YDomain};
pub use scene::{
    Animator, ChartStyle, Easing, Frame, Marker, MaskRect, Point, Scene, Transition, Viewport,
};

/// Fraction of the width reserved on the right for the marker label.
pub const END_MARGIN_RATIO: f64 = 0.2;
pub const MARKER_RADIUS: f64 = 8.0;
pub const DOT_RADIUS: f64 = 3.0;
/// Gap between the marker ring and its label.
pub const LABEL_GAP: f64 = 5.0;

/// Per-chart renderer state. Only the cached Y domain survives between passes.
#[derive(Debug, Clone, Default)]
pub struct ChartRenderer {
    y_domain: YDomain,
}

impl ChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn y_domain(&self) -> &YDomain {
        &self.y_domain
    }

    /// Forget the cached Y domain; the next pass rebuilds it.
    pub fn reset(&mut self) {
        self.y_domain = YDomain::new();
    }

    /// Build the scene for `points`. `None` when there is nothing to draw
    /// (no points, or a zero/non-finite viewport).
    pub fn render(
        &mut self,
        points: &[PricePoint],
        viewport: Viewport,
        style: &ChartStyle,
        duration: Duration,
    ) -> Option<Scene> {
        let last_point = points.last()?;
        if !viewport.is_drawable() {
            tracing::debug!(
                "Skipping render for viewport {}x{}",
                viewport.width,
                viewport.height
            );
            return None;
        }

        let drawable = viewport.width - viewport.width * END_MARGIN_RATIO;
        let x = TimeScale::from_points(points, (0.0, drawable))?;
        self.y_domain.update(points);
        let y = self.y_domain.scale(viewport.height);

        let line: Vec<Point> = points
            .iter()
            .map(|p| Point::new(x.map(p.time), y.map(p.price)))
            .collect();
        let path = curve::bump_x(&line);

        let len = line.len();
        let slot = drawable / len as f64;
        let last = line[len - 1];

        // A single point has nothing to scroll towards.
        let (scroll, mask, position) = match len.checked_sub(2).map(|i| line[i]) {
            Some(prev) => (
                Transition::new(0.0, -slot, Easing::Linear),
                Some(MaskRect {
                    x: prev.x,
                    width: viewport.width / len as f64,
                    height: viewport.height,
                }),
                Transition::new(prev, Point::new(last.x - slot, last.y), Easing::ExpInOut),
            ),
            None => (Transition::fixed(0.0), None, Transition::fixed(last)),
        };

        let label = format!(
            "${}",
            format_number(last_point.price, &FormatNumberOptions::price_label())
        );

        Some(Scene {
            viewport,
            style: style.clone(),
            clip_width: drawable,
            line,
            path,
            mask,
            scroll,
            marker: Marker {
                position,
                radius: MARKER_RADIUS,
                dot_radius: DOT_RADIUS,
                dot_opacity: Transition::new(0.0, 1.0, Easing::ExpInOut),
                label,
                label_offset: Point::new(MARKER_RADIUS + LABEL_GAP, MARKER_RADIUS / 2.0),
            },
            duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(price: f64, ms: i64) -> PricePoint {
        PricePoint::from_millis(price, ms).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn series() -> Vec<PricePoint> {
        vec![p(100.0, 0), p(101.0, 1000), p(102.0, 2000), p(103.0, 3000)]
    }

    const CADENCE: Duration = Duration::from_millis(1000);

    #[test]
    fn test_empty_window_renders_nothing() {
        let mut renderer = ChartRenderer::new();
        let scene = renderer.render(&[], Viewport::new(500.0, 100.0), &ChartStyle::default(), CADENCE);
        assert!(scene.is_none());
        assert_eq!(renderer.y_domain().bounds(), (0.0, 0.0));
    }

    #[test]
    fn test_invalid_viewport_renders_nothing() {
        let mut renderer = ChartRenderer::new();
        for viewport in [Viewport::new(0.0, 100.0), Viewport::new(500.0, f64::NAN)] {
            assert!(renderer
                .render(&series(), viewport, &ChartStyle::default(), CADENCE)
                .is_none());
        }
    }

    #[test]
    fn test_scene_geometry() {
        let mut renderer = ChartRenderer::new();
        let points = series();
        let scene = renderer
            .render(&points, Viewport::new(500.0, 100.0), &ChartStyle::default(), CADENCE)
            .unwrap();

        assert_eq!(scene.clip_width, 400.0);
        assert_eq!(scene.line.len(), 4);
        assert_eq!(scene.line[0].x, 0.0);
        assert!(approx(scene.line[3].x, 400.0));
        // Prices rise, so screen Y falls.
        assert!(scene.line.windows(2).all(|w| w[1].y < w[0].y));
        assert!(scene.path.starts_with("M0,"));

        // One slot is drawable / len.
        assert_eq!(scene.scroll.from, 0.0);
        assert!(approx(scene.scroll.to, -100.0));
        assert_eq!(scene.scroll.easing, Easing::Linear);

        let mask = scene.mask.unwrap();
        assert!(approx(mask.x, scene.line[2].x));
        assert_eq!(mask.width, 125.0);
        assert_eq!(mask.height, 100.0);

        assert_eq!(scene.marker.position.from, scene.line[2]);
        assert!(approx(scene.marker.position.to.x, 300.0));
        assert_eq!(scene.marker.position.to.y, scene.line[3].y);
        assert_eq!(scene.marker.position.easing, Easing::ExpInOut);
        assert_eq!(scene.marker.label, "$103");
        assert_eq!(scene.marker.label_offset, Point::new(13.0, 4.0));
        assert_eq!(scene.duration, CADENCE);
    }

    #[test]
    fn test_single_point_degrades_to_marker() {
        let mut renderer = ChartRenderer::new();
        let scene = renderer
            .render(&[p(50.0, 0)], Viewport::new(500.0, 100.0), &ChartStyle::default(), CADENCE)
            .unwrap();
        assert!(scene.mask.is_none());
        assert_eq!(scene.scroll, Transition::fixed(0.0));
        // Degenerate time extent maps to the middle of the plot.
        assert_eq!(scene.line[0].x, 200.0);
        assert_eq!(scene.marker.position.to, scene.line[0]);
        assert!(scene.path.ends_with('Z'));
    }

    #[test]
    fn test_flat_series_stays_finite() {
        let mut renderer = ChartRenderer::new();
        let points = vec![p(0.0, 0), p(0.0, 1000)];
        let scene = renderer
            .render(&points, Viewport::new(100.0, 40.0), &ChartStyle::default(), CADENCE)
            .unwrap();
        assert!(scene.line.iter().all(|pt| pt.x.is_finite() && pt.y.is_finite()));
        assert_eq!(scene.line[0].y, 20.0);
    }

    #[test]
    fn test_y_domain_cached_across_passes() {
        let mut renderer = ChartRenderer::new();
        let viewport = Viewport::new(500.0, 100.0);
        let style = ChartStyle::default();
        let mut points = vec![p(100.0, 0)];
        renderer.render(&points, viewport, &style, CADENCE);
        let initial = renderer.y_domain().bounds();

        points.push(p(100.05, 1000));
        renderer.render(&points, viewport, &style, CADENCE);
        assert_eq!(renderer.y_domain().bounds(), initial);

        points.push(p(120.0, 2000));
        renderer.render(&points, viewport, &style, CADENCE);
        assert_ne!(renderer.y_domain().bounds(), initial);

        renderer.reset();
        assert_eq!(renderer.y_domain().bounds(), (0.0, 0.0));
    }

    #[test]
    fn test_style_carried_into_scene() {
        let mut renderer = ChartRenderer::new();
        let style = ChartStyle {
            background: "#111".to_string(),
            color: "lime".to_string(),
        };
        let scene = renderer
            .render(&series(), Viewport::new(500.0, 100.0), &style, CADENCE)
            .unwrap();
        assert_eq!(scene.style, style);
    }
}
