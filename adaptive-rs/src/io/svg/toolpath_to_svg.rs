use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use svg::Document;
use svg::node::element::{Group, Text, Title};

use crate::entities::{AdaptiveOutput, MotionType};
use crate::geometry::primitives::{PathSet, Rect};
use crate::geometry::scaling::bounding_box;
use crate::io::svg::svg_util::{self, SvgDrawOptions};

/// Draws the stock, the target and the toolpaths of a run.
/// Links are colored by their motion type, helix centers are marked with a circle of the tool size.
pub fn toolpaths_to_svg(
    stock: &PathSet,
    target: &PathSet,
    outputs: &[AdaptiveOutput],
    tool_diameter: f64,
    options: SvgDrawOptions,
    title: &str,
) -> Document {
    let theme = &options.theme;
    let bbox = bounding_box(&[stock, target]).unwrap_or(Rect {
        x_min: 0.0,
        y_min: 0.0,
        x_max: 1.0,
        y_max: 1.0,
    });
    let stroke_width = f64::min(bbox.width(), bbox.height()) * 0.001 * theme.stroke_width_multiplier;
    let stroke_width_str = stroke_width.to_string();

    let label = {
        let n_points: usize = outputs.iter().map(|o| o.n_points()).sum();
        let font_size = f64::min(bbox.width(), bbox.height()) * 0.025;
        Text::new(format!(
            "regions: {} | points: {} | {}",
            outputs.len(),
            n_points,
            title
        ))
        .set("x", bbox.x_min as f32)
        .set("y", (bbox.y_min - 0.5 * font_size) as f32)
        .set("font-size", font_size as f32)
        .set("font-family", "monospace")
        .set("font-weight", "500")
    };

    let boundary = |paths: &PathSet, fill: String, id: &str| {
        let data = svg_util::rings_data(paths);
        Group::new().set("id", id).add(svg_util::data_to_path(
            data,
            &[("fill", &*fill), ("fill-rule", "evenodd"), ("stroke", "none")],
        ))
    };

    let mut toolpaths = Group::new().set("id", "toolpaths");
    for (i, output) in outputs.iter().enumerate() {
        let mut group = Group::new()
            .set("id", format!("region_{i}"))
            .add(Title::new(format!("region {i}, return: {:?}", output.return_motion)));
        group = group.add(svg_util::circle(
            output.helix_center,
            tool_diameter / 2.0,
            &[
                ("fill", "none"),
                ("stroke", &*theme.helix_stroke.to_string()),
                ("stroke-width", &*stroke_width_str),
            ],
        ));
        for segment in &output.segments {
            if segment.motion.is_link() && !options.links {
                continue;
            }
            let Some(data) = svg_util::path_data(&segment.path) else {
                continue;
            };
            if options.tool_width && segment.motion == MotionType::Cutting {
                group = group.add(svg_util::data_to_path(
                    data.clone(),
                    &[
                        ("fill", "none"),
                        ("stroke", &*theme.cutting_stroke.to_string()),
                        ("stroke-opacity", &*theme.tool_width_opac.to_string()),
                        ("stroke-width", &*tool_diameter.to_string()),
                        ("stroke-linecap", "round"),
                        ("stroke-linejoin", "round"),
                    ],
                ));
            }
            let dash = match segment.motion {
                MotionType::Cutting => "none".to_string(),
                _ => format!("{} {}", 4.0 * stroke_width, 2.0 * stroke_width),
            };
            group = group.add(svg_util::data_to_path(
                data,
                &[
                    ("fill", "none"),
                    ("stroke", &*theme.motion_stroke(segment.motion).to_string()),
                    ("stroke-width", &*stroke_width_str),
                    ("stroke-dasharray", &*dash),
                    ("stroke-linejoin", "round"),
                ],
            ));
        }
        toolpaths = toolpaths.add(group);
    }

    Document::new()
        .set("viewBox", svg_util::view_box(bbox, 0.1))
        .add(boundary(stock, theme.stock_fill.to_string(), "stock"))
        .add(boundary(target, theme.target_fill.to_string(), "target"))
        .add(toolpaths)
        .add(label)
}

pub fn write_svg(document: &Document, path: &Path) -> Result<()> {
    svg::save(path, document)
        .with_context(|| format!("could not write svg file: {}", path.display()))?;
    info!("svg written to {}", path.display());
    Ok(())
}
