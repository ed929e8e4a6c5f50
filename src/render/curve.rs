//! Smoothed series path.

use super::scene::Point;

/// Format a coordinate with at most three decimals and no trailing zeros.
pub(crate) fn fmt_coord(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let s = format!("{:.3}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" || s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// SVG path data for a horizontal bump curve through `points`.
///
/// Each segment is a cubic Bézier whose control points sit at the
/// horizontal midpoint, level with the segment's ends, so the curve leaves
/// and enters every sample horizontally. A single point yields a closed
/// zero-length subpath; no points yield an empty string.
pub fn bump_x(points: &[Point]) -> String {
    let Some(first) = points.first() else {
        return String::new();
    };

    let mut d = format!("M{},{}", fmt_coord(first.x), fmt_coord(first.y));
    if points.len() == 1 {
        d.push('Z');
        return d;
    }

    for pair in points.windows(2) {
        let (p0, p1) = (pair[0], pair[1]);
        let mid = (p0.x + p1.x) / 2.0;
        d.push_str(&format!(
            "C{},{},{},{},{},{}",
            fmt_coord(mid),
            fmt_coord(p0.y),
            fmt_coord(mid),
            fmt_coord(p1.y),
            fmt_coord(p1.x),
            fmt_coord(p1.y)
        ));
    }
    d
}
