use std::fmt::{Display, Formatter};

use anyhow::{Result, ensure};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use svg::node::element::path::Data;
use svg::node::element::{Circle, Path};

use crate::engine::observer::DebugLayer;
use crate::entities::MotionType;
use crate::geometry::primitives::{Point, Rect};

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize, Copy)]
pub struct SvgDrawOptions {
    ///The theme to use for the svg
    #[serde(default)]
    pub theme: SvgTheme,
    ///Draw the linking moves between passes
    #[serde(default)]
    pub links: bool,
    ///Draw the tool width around cutting moves
    #[serde(default)]
    pub tool_width: bool,
}

impl Default for SvgDrawOptions {
    fn default() -> Self {
        Self {
            theme: SvgTheme::default(),
            links: true,
            tool_width: false,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize, Copy)]
pub struct SvgTheme {
    pub stroke_width_multiplier: f64,
    pub stock_fill: Color,
    pub target_fill: Color,
    pub cutting_stroke: Color,
    pub link_clear_stroke: Color,
    pub link_prev_pass_stroke: Color,
    pub link_not_clear_stroke: Color,
    pub helix_stroke: Color,
    pub tool_width_opac: f64,
}

impl Default for SvgTheme {
    fn default() -> Self {
        SvgTheme::EARTH_TONES
    }
}

impl SvgTheme {
    pub const EARTH_TONES: SvgTheme = SvgTheme {
        stroke_width_multiplier: 2.0,
        stock_fill: Color(0xCC, 0x82, 0x4A),
        target_fill: Color(0x2D, 0x2D, 0x2D),
        cutting_stroke: Color(0xFF, 0xC8, 0x79),
        link_clear_stroke: Color(0x00, 0xFF, 0x00),        // LIME
        link_prev_pass_stroke: Color(0xFF, 0xA5, 0x00),    // LIGHT ORANGE
        link_not_clear_stroke: Color(0xFF, 0x00, 0x00),    // RED
        helix_stroke: Color(0x00, 0x00, 0xFF),
        tool_width_opac: 0.15,
    };

    pub const GRAY: SvgTheme = SvgTheme {
        stroke_width_multiplier: 2.5,
        stock_fill: Color(0xD3, 0xD3, 0xD3),
        target_fill: Color(0x7A, 0x7A, 0x7A),
        cutting_stroke: Color(0x2D, 0x2D, 0x2D),
        link_clear_stroke: Color(0x63, 0x63, 0x63),
        link_prev_pass_stroke: Color(0x63, 0x63, 0x63),
        link_not_clear_stroke: Color(0xD0, 0x00, 0x00),
        helix_stroke: Color(0x00, 0x00, 0x00),
        tool_width_opac: 0.3,
    };

    pub fn motion_stroke(&self, motion: MotionType) -> Color {
        match motion {
            MotionType::Cutting => self.cutting_stroke,
            MotionType::LinkClear => self.link_clear_stroke,
            MotionType::LinkClearAtPrevPass => self.link_prev_pass_stroke,
            MotionType::LinkNotClear => self.link_not_clear_stroke,
        }
    }

    pub fn layer_stroke(&self, layer: DebugLayer) -> Color {
        match layer {
            DebugLayer::ToolBound => change_brightness(self.stock_fill, 0.5),
            DebugLayer::Cleared => self.target_fill,
            DebugLayer::Entry => self.helix_stroke,
            DebugLayer::EngagePoint => self.link_prev_pass_stroke,
            DebugLayer::Pass => self.cutting_stroke,
            DebugLayer::Link => self.link_clear_stroke,
            DebugLayer::Finishing => change_brightness(self.cutting_stroke, 0.7),
        }
    }
}

pub fn change_brightness(color: Color, fraction: f64) -> Color {
    let Color(r, g, b) = color;

    let r = (r as f64 * fraction) as u8;
    let g = (g as f64 * fraction) as u8;
    let b = (b as f64 * fraction) as u8;
    Color(r, g, b)
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Color(pub u8, pub u8, pub u8);

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl TryFrom<&str> for Color {
    type Error = anyhow::Error;

    fn try_from(s: &str) -> Result<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        ensure!(hex.len() == 6 && hex.is_ascii(), "invalid color: {s}");
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
        Ok(Color(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Color::try_from(s.as_str()).map_err(serde::de::Error::custom)
    }
}

/// Polyline through the points of `path`, `None` for an empty path
pub fn path_data(path: &[Point]) -> Option<Data> {
    let (first, rest) = path.split_first()?;
    let data = rest
        .iter()
        .fold(Data::new().move_to(as_param(*first)), |data, p| {
            data.line_to(as_param(*p))
        });
    Some(data)
}

/// Closed rings of all `paths` in a single data attribute
pub fn rings_data(paths: &[Vec<Point>]) -> Data {
    paths
        .iter()
        .filter_map(|p| p.split_first())
        .fold(Data::new(), |data, (first, rest)| {
            rest.iter()
                .fold(data.move_to(as_param(*first)), |data, p| {
                    data.line_to(as_param(*p))
                })
                .close()
        })
}

fn as_param(Point(x, y): Point) -> (f32, f32) {
    (x as f32, y as f32)
}

pub fn data_to_path(data: Data, params: &[(&str, &str)]) -> Path {
    let mut path = Path::new();
    for param in params {
        path = path.set(param.0, param.1)
    }
    path.set("d", data)
}

pub fn circle(center: Point, radius: f64, params: &[(&str, &str)]) -> Circle {
    let mut circle = Circle::new()
        .set("cx", center.0 as f32)
        .set("cy", center.1 as f32)
        .set("r", radius as f32);
    for param in params {
        circle = circle.set(param.0, param.1)
    }
    circle
}

/// Bounding box of `rect` grown by `fraction` of its size on every side
pub fn view_box(rect: Rect, fraction: f64) -> (f32, f32, f32, f32) {
    let margin = fraction * f64::max(rect.width(), rect.height());
    (
        (rect.x_min - margin) as f32,
        (rect.y_min - margin) as f32,
        (rect.width() + 2.0 * margin) as f32,
        (rect.height() + 2.0 * margin) as f32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_parse_and_print() {
        let color = Color::try_from("#CC824A").unwrap();
        assert_eq!(color, Color(0xCC, 0x82, 0x4A));
        assert_eq!(color.to_string(), "#CC824A");
        assert!(Color::try_from("#12345").is_err());
        assert!(Color::try_from("zzzzzz").is_err());
    }
}
