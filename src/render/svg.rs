//! SVG serialization of a [`Frame`].
//!
//! The output is a standalone `<svg>` document. Redraw it on every animation
//! tick; the scene graph is rebuilt from scratch each time.

use std::fmt::Write;

use super::curve::fmt_coord;
use super::scene::Frame;

const STROKE_WIDTH: f64 = 2.0;
const FONT_FAMILY: &str = "monospace";
const FONT_SIZE: u32 = 12;
const FONT_WEIGHT: u32 = 300;

/// Escape text and attribute values.
pub fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render one frame as an SVG document.
pub fn to_svg(frame: &Frame<'_>) -> String {
    let scene = frame.scene;
    let width = fmt_coord(scene.viewport.width);
    let height = fmt_coord(scene.viewport.height);
    let background = escape_xml(&scene.style.background);
    let color = escape_xml(&scene.style.color);
    let marker = &scene.marker;

    let mut svg = String::new();
    // Writing into a String cannot fail.
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" style="background-color: {bg}">"#,
        w = width,
        h = height,
        bg = background,
    );
    let _ = write!(
        svg,
        r#"<defs><clipPath id="clip"><rect width="{}" height="{}"/></clipPath></defs>"#,
        fmt_coord(scene.clip_width),
        height,
    );
    svg.push_str("<g>");
    let _ = write!(
        svg,
        r#"<g clip-path="url(#clip)"><path d="{}" fill="none" stroke="{}" stroke-width="{}" transform="translate({}, 0)"/></g>"#,
        scene.path,
        color,
        fmt_coord(STROKE_WIDTH),
        fmt_coord(frame.scroll_x),
    );
    if let Some(mask) = &scene.mask {
        let _ = write!(
            svg,
            r#"<rect x="{}" y="0" width="{}" height="{}" fill="{}"/>"#,
            fmt_coord(mask.x),
            fmt_coord(mask.width),
            fmt_coord(mask.height),
            background,
        );
    }
    let _ = write!(
        svg,
        r#"<circle cx="{}" cy="{}" r="{}" stroke="{}" stroke-width="{}" fill="{}"/>"#,
        fmt_coord(frame.marker.x),
        fmt_coord(frame.marker.y),
        fmt_coord(marker.radius),
        color,
        fmt_coord(STROKE_WIDTH),
        background,
    );
    let _ = write!(
        svg,
        r#"<circle cx="{}" cy="{}" r="{}" stroke-width="0" fill="{}" fill-opacity="{}"/>"#,
        fmt_coord(frame.marker.x),
        fmt_coord(frame.marker.y),
        fmt_coord(marker.dot_radius),
        color,
        fmt_coord(frame.dot_opacity),
    );
    let _ = write!(
        svg,
        r#"<text x="{}" y="{}" fill="{}" font-size="{}" font-weight="{}" font-family="{}">{}</text>"#,
        fmt_coord(frame.label.x),
        fmt_coord(frame.label.y),
        color,
        FONT_SIZE,
        FONT_WEIGHT,
        FONT_FAMILY,
        escape_xml(&marker.label),
    );
    svg.push_str("</g></svg>");
    svg
}
