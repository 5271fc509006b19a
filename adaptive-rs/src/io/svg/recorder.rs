use svg::Document;
use svg::node::element::{Circle, Group, Path};

use crate::engine::observer::{DebugLayer, DebugObserver};
use crate::geometry::primitives::{Point, Rect};
use crate::io::svg::svg_util::{self, SvgTheme};

enum Drawing {
    Path(Path),
    Circle(Circle),
}

/// [`DebugObserver`] collecting the drawings of a run into an SVG document
pub struct SvgRecorder {
    theme: SvgTheme,
    stroke_width: f64,
    drawings: Vec<(DebugLayer, Drawing)>,
    /// Points of every drawing since the last clear, used for the view box
    extent: Vec<Point>,
}

impl SvgRecorder {
    /// `stroke_width` in user units, multiplied by the theme's multiplier
    pub fn new(theme: SvgTheme, stroke_width: f64) -> Self {
        Self {
            theme,
            stroke_width: stroke_width * theme.stroke_width_multiplier,
            drawings: vec![],
            extent: vec![],
        }
    }

    pub fn n_drawings(&self) -> usize {
        self.drawings.len()
    }

    /// Renders everything drawn since the last clear, one group per layer
    pub fn document(&self) -> Document {
        let mut document = Document::new();
        if let Some(bbox) = Rect::bounding(self.extent.iter().copied()) {
            document = document.set("viewBox", svg_util::view_box(bbox, 0.05));
        }
        let layers = [
            DebugLayer::ToolBound,
            DebugLayer::Cleared,
            DebugLayer::Pass,
            DebugLayer::Link,
            DebugLayer::Finishing,
            DebugLayer::Entry,
            DebugLayer::EngagePoint,
        ];
        for layer in layers {
            let group = self
                .drawings
                .iter()
                .filter(|(l, _)| *l == layer)
                .fold(Group::new().set("id", format!("{layer:?}")), |group, (_, d)| {
                    match d {
                        Drawing::Path(p) => group.add(p.clone()),
                        Drawing::Circle(c) => group.add(c.clone()),
                    }
                });
            document = document.add(group);
        }
        document
    }

    fn style(&self, layer: DebugLayer) -> [(&'static str, String); 4] {
        [
            ("fill", "none".to_string()),
            ("stroke", self.theme.layer_stroke(layer).to_string()),
            ("stroke-width", self.stroke_width.to_string()),
            ("stroke-linejoin", "round".to_string()),
        ]
    }
}

impl DebugObserver for SvgRecorder {
    fn enabled(&self) -> bool {
        true
    }

    fn draw_circle(&mut self, center: Point, radius: f64, layer: DebugLayer) {
        let style = self.style(layer);
        let params = style.iter().map(|(k, v)| (*k, v.as_str())).collect::<Vec<_>>();
        self.extent.push(Point(center.0 - radius, center.1 - radius));
        self.extent.push(Point(center.0 + radius, center.1 + radius));
        self.drawings
            .push((layer, Drawing::Circle(svg_util::circle(center, radius, &params))));
    }

    fn draw_path(&mut self, path: &[Point], layer: DebugLayer) {
        let Some(data) = svg_util::path_data(path) else {
            return;
        };
        let style = self.style(layer);
        let params = style.iter().map(|(k, v)| (*k, v.as_str())).collect::<Vec<_>>();
        self.extent.extend_from_slice(path);
        self.drawings
            .push((layer, Drawing::Path(svg_util::data_to_path(data, &params))));
    }

    fn clear_screen(&mut self) {
        self.drawings.clear();
        self.extent.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_until_cleared() {
        let mut recorder = SvgRecorder::new(SvgTheme::default(), 0.1);
        recorder.draw_circle(Point(5.0, 5.0), 2.0, DebugLayer::Entry);
        recorder.draw_path(&[Point(0.0, 0.0), Point(10.0, 0.0)], DebugLayer::Pass);
        recorder.draw_path(&[], DebugLayer::Pass);
        assert_eq!(recorder.n_drawings(), 2);
        let rendered = recorder.document().to_string();
        assert!(rendered.contains("viewBox"));
        assert!(rendered.contains("circle"));
        recorder.clear_screen();
        assert_eq!(recorder.n_drawings(), 0);
    }
}
