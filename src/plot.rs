//! SVG rendering of a track set and its generated vias.

use crate::geometry::{Track, TrackSet};
use crate::math::Point2;

const PIXEL_SIZE: f64 = 800.0;

/// Axis-aligned extent of the drawn content.
#[derive(Debug, Clone, Copy)]
struct Bounds {
    min: Point2,
    max: Point2,
}

impl Bounds {
    fn of(points: impl IntoIterator<Item = Point2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self { min: first, max: first }, |b, p| Self {
            min: Point2::new(b.min.x.min(p.x), b.min.y.min(p.y)),
            max: Point2::new(b.max.x.max(p.x), b.max.y.max(p.y)),
        }))
    }

    /// Grows the box by `fraction` of its larger side, at least one unit.
    fn padded(self, fraction: f64) -> Self {
        let pad = (self.width().max(self.height()) * fraction).max(1.0);
        Self {
            min: Point2::new(self.min.x - pad, self.min.y - pad),
            max: Point2::new(self.max.x + pad, self.max.y + pad),
        }
    }

    fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

struct SvgBuilder {
    content: String,
    stroke: f64,
    marker: f64,
}

impl SvgBuilder {
    fn new(bounds: &Bounds) -> Self {
        let (x, y, w, h) = (bounds.min.x, bounds.min.y, bounds.width(), bounds.height());
        let scale = w.max(h);
        let stroke = scale * 0.003;
        let marker = scale * 0.008;
        let content = format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg width="{PIXEL_SIZE}" height="{PIXEL_SIZE}" viewBox="{x:.3} {y:.3} {w:.3} {h:.3}" xmlns="http://www.w3.org/2000/svg">
  <style>
    .track {{ fill: none; stroke: #b87333; stroke-width: {stroke:.3}; stroke-linejoin: round; }}
    .start {{ stroke: #008800; stroke-width: {stroke:.3}; }}
    .end {{ stroke: #cc0000; stroke-width: {stroke:.3}; }}
    .via {{ fill: #dddddd; stroke: #333333; stroke-width: {stroke:.3}; }}
  </style>
  <rect x="{x:.3}" y="{y:.3}" width="{w:.3}" height="{h:.3}" fill="#ffffff" />
"##
        );
        Self { content, stroke, marker }
    }

    fn polyline(&mut self, points: &[Point2]) {
        let coords: Vec<String> = points.iter().map(|p| format!("{:.3},{:.3}", p.x, p.y)).collect();
        self.content.push_str(&format!(
            "  <polyline class=\"track\" points=\"{}\" />\n",
            coords.join(" ")
        ));
    }

    fn segment(&mut self, class: &str, a: Point2, b: Point2) {
        self.content.push_str(&format!(
            "  <line class=\"{class}\" x1=\"{:.3}\" y1=\"{:.3}\" x2=\"{:.3}\" y2=\"{:.3}\" />\n",
            a.x, a.y, b.x, b.y
        ));
    }

    fn plus(&mut self, p: Point2) {
        let m = self.marker;
        self.segment("start", Point2::new(p.x - m, p.y), Point2::new(p.x + m, p.y));
        self.segment("start", Point2::new(p.x, p.y - m), Point2::new(p.x, p.y + m));
    }

    fn cross(&mut self, p: Point2) {
        let m = self.marker;
        self.segment("end", Point2::new(p.x - m, p.y - m), Point2::new(p.x + m, p.y + m));
        self.segment("end", Point2::new(p.x - m, p.y + m), Point2::new(p.x + m, p.y - m));
    }

    fn circle(&mut self, p: Point2) {
        self.content.push_str(&format!(
            "  <circle class=\"via\" cx=\"{:.3}\" cy=\"{:.3}\" r=\"{:.3}\" />\n",
            p.x,
            p.y,
            self.marker * 0.6 + self.stroke
        ));
    }

    fn finish(mut self) -> String {
        self.content.push_str("</svg>\n");
        self.content
    }
}

/// Draws the tracks as polylines, marking each start with `+` and each end with
/// `x`, and the vias as circles. The view box is fitted to the content.
#[must_use]
pub fn render_svg(tracks: &TrackSet, vias: &[Point2]) -> String {
    let polylines: Vec<Vec<Point2>> = tracks.tracks().iter().map(Track::to_points).collect();
    let all = polylines.iter().flatten().chain(vias).copied();
    let bounds = Bounds::of(all)
        .unwrap_or(Bounds {
            min: Point2::origin(),
            max: Point2::origin(),
        })
        .padded(0.05);

    let mut svg = SvgBuilder::new(&bounds);
    for line in &polylines {
        svg.polyline(line);
    }
    for line in &polylines {
        if let (Some(&first), Some(&last)) = (line.first(), line.last()) {
            svg.plus(first);
            svg.cross(last);
        }
    }
    for &via in vias {
        svg.circle(via);
    }
    svg.finish()
}
