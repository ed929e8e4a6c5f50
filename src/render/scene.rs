//! Scene geometry and the transitions that animate it.
//!
//! A [`Scene`] is the target geometry of one render pass plus the transitions
//! from the previous state. Evaluating it at an elapsed time gives a
//! [`Frame`]; every animated value is driven by the same clock and snaps to
//! its target once the cadence has elapsed.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// A screen-space position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Target drawing surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Colors, as CSS color strings.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub background: String,
    pub color: String,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            background: "#000".to_string(),
            color: "#fff".to_string(),
        }
    }
}

// ─── Easing / interpolation ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// Symmetric exponential ease-in-out.
    ExpInOut,
}

impl Easing {
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::ExpInOut => {
                // 2^(-10x) rescaled so both ends land exactly on 0 and 1.
                let tpmt = |x: f64| (2f64.powf(-10.0 * x) - 0.0009765625) * 1.0009775171065494;
                let t2 = t * 2.0;
                if t2 <= 1.0 {
                    tpmt(1.0 - t2) / 2.0
                } else {
                    (2.0 - tpmt(t2 - 1.0)) / 2.0
                }
            }
        }
    }
}

pub trait Lerp: Copy {
    fn lerp(from: Self, to: Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(from: Self, to: Self, t: f64) -> Self {
        from + (to - from) * t
    }
}

impl Lerp for Point {
    fn lerp(from: Self, to: Self, t: f64) -> Self {
        Point::new(f64::lerp(from.x, to.x, t), f64::lerp(from.y, to.y, t))
    }
}

/// A value moving from `from` to `to` under an easing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition<T> {
    pub from: T,
    pub to: T,
    pub easing: Easing,
}

impl<T: Lerp> Transition<T> {
    pub fn new(from: T, to: T, easing: Easing) -> Self {
        Self { from, to, easing }
    }

    /// A transition that stays put.
    pub fn fixed(value: T) -> Self {
        Self::new(value, value, Easing::Linear)
    }

    /// Value at raw progress `t` in `[0, 1]`.
    pub fn at(&self, t: f64) -> T {
        if t >= 1.0 {
            return self.to;
        }
        T::lerp(self.from, self.to, self.easing.apply(t))
    }
}

// ─── Scene ───────────────────────────────────────────────────────────────────

/// Background-colored rectangle covering the newest segment until the
/// scroll reveals it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskRect {
    pub x: f64,
    pub width: f64,
    pub height: f64,
}

/// The leading marker: ring, inner dot and price label.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: Transition<Point>,
    pub radius: f64,
    pub dot_radius: f64,
    /// Inner dot fill opacity (transparent → series color).
    pub dot_opacity: Transition<f64>,
    pub label: String,
    /// Label anchor relative to the marker center.
    pub label_offset: Point,
}

/// Target geometry for one render pass plus its transitions.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub viewport: Viewport,
    pub style: ChartStyle,
    /// Width of the plot area; the rest is reserved for the marker label.
    pub clip_width: f64,
    /// Screen positions of the window's points.
    pub line: Vec<Point>,
    /// SVG path data for `line`.
    pub path: String,
    pub mask: Option<MaskRect>,
    /// Horizontal offset applied to the path.
    pub scroll: Transition<f64>,
    pub marker: Marker,
    pub duration: Duration,
}

impl Scene {
    /// Evaluate every transition after `elapsed`.
    pub fn frame_at(&self, elapsed: Duration) -> Frame<'_> {
        let progress = if self.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
        };
        let marker = self.marker.position.at(progress);
        Frame {
            scene: self,
            progress,
            scroll_x: self.scroll.at(progress),
            marker,
            dot_opacity: self.marker.dot_opacity.at(progress),
            label: Point::new(
                marker.x + self.marker.label_offset.x,
                marker.y + self.marker.label_offset.y,
            ),
        }
    }

    /// The settled frame.
    pub fn final_frame(&self) -> Frame<'_> {
        self.frame_at(self.duration)
    }
}

/// A scene evaluated at one instant; what an immediate-mode target draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame<'a> {
    pub scene: &'a Scene,
    /// Raw (un-eased) progress in `[0, 1]`.
    pub progress: f64,
    pub scroll_x: f64,
    pub marker: Point,
    pub dot_opacity: f64,
    pub label: Point,
}

impl Frame<'_> {
    pub fn is_settled(&self) -> bool {
        self.progress >= 1.0
    }
}

// ─── Animator ────────────────────────────────────────────────────────────────

/// Holds the current scene and the instant its transitions started.
#[derive(Debug, Clone, Default)]
pub struct Animator {
    scene: Option<Scene>,
    started: Option<DateTime<Utc>>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start animating towards `scene` from `now`. `None` clears the target.
    pub fn start(&mut self, scene: Option<Scene>, now: DateTime<Utc>) {
        self.started = scene.as_ref().map(|_| now);
        self.scene = scene;
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// The frame at `now`.
    pub fn frame_at(&self, now: DateTime<Utc>) -> Option<Frame<'_>> {
        let scene = self.scene.as_ref()?;
        let started = self.started.unwrap_or(now);
        let elapsed = (now - started).to_std().unwrap_or(Duration::ZERO);
        Some(scene.frame_at(elapsed))
    }

    /// Whether the current animation has finished (or there is none).
    pub fn is_settled(&self, now: DateTime<Utc>) -> bool {
        self.frame_at(now).map(|f| f.is_settled()).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::ExpInOut] {
            assert!(approx(easing.apply(0.0), 0.0));
            assert!(approx(easing.apply(1.0), 1.0));
        }
        assert!(approx(Easing::ExpInOut.apply(0.5), 0.5));
        assert!(approx(Easing::Linear.apply(0.25), 0.25));
        // Slow start.
        assert!(Easing::ExpInOut.apply(0.1) < 0.1);
    }

    #[test]
    fn test_transition_snaps_at_completion() {
        let t = Transition::new(Point::new(0.0, 0.0), Point::new(10.0, 20.0), Easing::ExpInOut);
        assert_eq!(t.at(1.0), Point::new(10.0, 20.0));
        assert_eq!(t.at(2.0), Point::new(10.0, 20.0));
        assert_eq!(Transition::fixed(4.0).at(0.3), 4.0);
    }

    fn scene(duration: Duration) -> Scene {
        Scene {
            viewport: Viewport::new(100.0, 50.0),
            style: ChartStyle::default(),
            clip_width: 80.0,
            line: vec![Point::new(0.0, 50.0), Point::new(80.0, 0.0)],
            path: "M0,50C40,50,40,0,80,0".to_string(),
            mask: None,
            scroll: Transition::new(0.0, -40.0, Easing::Linear),
            marker: Marker {
                position: Transition::new(Point::new(40.0, 50.0), Point::new(40.0, 0.0), Easing::ExpInOut),
                radius: 8.0,
                dot_radius: 3.0,
                dot_opacity: Transition::new(0.0, 1.0, Easing::ExpInOut),
                label: "$1".to_string(),
                label_offset: Point::new(13.0, 4.0),
            },
            duration,
        }
    }

    #[test]
    fn test_frame_interpolates_on_shared_clock() {
        let scene = scene(Duration::from_millis(1000));
        let half = scene.frame_at(Duration::from_millis(500));
        assert!(approx(half.progress, 0.5));
        assert!(approx(half.scroll_x, -20.0));
        assert!(approx(half.marker.y, 25.0));
        assert!(approx(half.label.x, 53.0));

        let done = scene.frame_at(Duration::from_millis(1500));
        assert!(done.is_settled());
        assert_eq!(done.scroll_x, -40.0);
        assert_eq!(done.marker, Point::new(40.0, 0.0));
        assert_eq!(done.dot_opacity, 1.0);
    }

    #[test]
    fn test_zero_duration_is_settled_immediately() {
        let scene = scene(Duration::ZERO);
        assert!(scene.frame_at(Duration::ZERO).is_settled());
    }

    #[test]
    fn test_animator_uses_start_instant() {
        let start = Utc::now();
        let mut animator = Animator::new();
        assert!(animator.frame_at(start).is_none());
        assert!(animator.is_settled(start));

        animator.start(Some(scene(Duration::from_millis(200))), start);
        let frame = animator.frame_at(start + TimeDelta::milliseconds(100)).unwrap();
        assert!(approx(frame.scroll_x, -20.0));
        assert!(!animator.is_settled(start + TimeDelta::milliseconds(100)));
        assert!(animator.is_settled(start + TimeDelta::milliseconds(200)));
    }
}
