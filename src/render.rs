use crate::config::RenderConfig;
use crate::layout::{Layout, Part, PlacedEntity, Rect, TextSpan};
use crate::style::AttrMap;
use anyhow::Result;
use serde_json::Value;
use std::convert::Infallible;
use std::fmt::Write as _;
use std::path::Path;

/// Drawing backend. Only `draw_layout` calls into it.
pub trait Painter {
    type Error;

    /// Opens the group holding one entity's parts.
    fn begin_entity(&mut self, _entity: &PlacedEntity) -> Result<(), Self::Error> {
        Ok(())
    }

    fn end_entity(&mut self, _entity: &PlacedEntity) -> Result<(), Self::Error> {
        Ok(())
    }

    fn paint_rect(&mut self, rect: &Rect, style: &AttrMap) -> Result<(), Self::Error>;

    fn paint_text(&mut self, span: &TextSpan, style: &AttrMap) -> Result<(), Self::Error>;
}

/// Paints every placed entity, frames first, in layout order. The first
/// backend error stops the walk and is returned as is.
pub fn draw_layout<P: Painter>(layout: &Layout, painter: &mut P) -> Result<(), P::Error> {
    for placed in layout.entities() {
        painter.begin_entity(placed)?;
        for part in placed.shape.placed_parts(placed.position) {
            match &part {
                Part::Rect { rect, role } => painter.paint_rect(rect, placed.style.boxed(*role))?,
                Part::Text(span) => painter.paint_text(span, placed.style.text(span.role))?,
            }
        }
        painter.end_entity(placed)?;
    }
    Ok(())
}

/// Builds an SVG document in memory.
pub struct SvgPainter {
    svg: String,
}

impl SvgPainter {
    pub fn new(width: f32, height: f32, background: &str) -> Self {
        let mut svg = String::new();
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
        );
        let _ = write!(
            svg,
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            escape_xml(background)
        );
        Self { svg }
    }

    pub fn finish(mut self) -> String {
        self.svg.push_str("</svg>");
        self.svg
    }
}

impl Painter for SvgPainter {
    type Error = Infallible;

    fn begin_entity(&mut self, entity: &PlacedEntity) -> Result<(), Self::Error> {
        let _ = write!(
            self.svg,
            "<g class=\"entity {}\"",
            escape_xml(entity.entity.kind.as_str())
        );
        if let Some(id) = &entity.entity.id {
            let _ = write!(self.svg, " data-id=\"{}\"", escape_xml(&id.to_string()));
        }
        self.svg.push('>');
        Ok(())
    }

    fn end_entity(&mut self, _entity: &PlacedEntity) -> Result<(), Self::Error> {
        self.svg.push_str("</g>");
        Ok(())
    }

    fn paint_rect(&mut self, rect: &Rect, style: &AttrMap) -> Result<(), Self::Error> {
        let _ = write!(
            self.svg,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\"{}/>",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            style_attrs(style)
        );
        Ok(())
    }

    fn paint_text(&mut self, span: &TextSpan, style: &AttrMap) -> Result<(), Self::Error> {
        let _ = write!(
            self.svg,
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"{}\" dominant-baseline=\"central\"{}>{}</text>",
            span.x,
            span.y,
            span.anchor.as_svg(),
            style_attrs(style),
            escape_xml(&span.text)
        );
        Ok(())
    }
}

pub fn render_svg(layout: &Layout, render_cfg: &RenderConfig) -> String {
    let mut painter = SvgPainter::new(layout.width, layout.height, &render_cfg.background);
    if let Err(never) = draw_layout(layout, &mut painter) {
        match never {}
    }
    painter.finish()
}

/// Style values become attributes; nested objects and nulls are skipped.
fn style_attrs(style: &AttrMap) -> String {
    let mut out = String::new();
    for (key, value) in style {
        let text = match value {
            Value::String(text) => text.clone(),
            Value::Number(num) => num.to_string(),
            Value::Bool(flag) => flag.to_string(),
            Value::Null | Value::Array(_) | Value::Object(_) => continue,
        };
        let _ = write!(out, " {}=\"{}\"", escape_xml(key), escape_xml(&text));
    }
    out
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    anyhow::bail!("PNG output requires the `png` feature")
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::compute_layout;
    use crate::model::{Entity, Id};
    use crate::style::{Presets, StyleSpec};
    use crate::theme::Theme;
    use serde_json::json;

    fn sample_layout() -> Layout {
        let entities = vec![
            Entity::new("list", Some(Id::Int(1)), json!([2])),
            Entity::new("frame", None, json!({"xs": 1})).with_name("__main__"),
            Entity::new("str", Some(Id::Int(2)), json!("a<b")),
        ];
        let config = LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        };
        compute_layout(&entities, &Theme::classic(), &Presets::builtin(), &config).unwrap()
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Painter for Recorder {
        type Error = Infallible;

        fn begin_entity(&mut self, entity: &PlacedEntity) -> Result<(), Self::Error> {
            self.calls.push(format!("begin {}", entity.entity.kind));
            Ok(())
        }

        fn paint_rect(&mut self, _rect: &Rect, _style: &AttrMap) -> Result<(), Self::Error> {
            self.calls.push("rect".to_string());
            Ok(())
        }

        fn paint_text(&mut self, span: &TextSpan, _style: &AttrMap) -> Result<(), Self::Error> {
            self.calls.push(format!("text {}", span.text));
            Ok(())
        }
    }

    struct Broken;

    impl Painter for Broken {
        type Error = String;

        fn paint_rect(&mut self, _rect: &Rect, _style: &AttrMap) -> Result<(), Self::Error> {
            Err("canvas closed".to_string())
        }

        fn paint_text(&mut self, _span: &TextSpan, _style: &AttrMap) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn frames_are_drawn_first() {
        let layout = sample_layout();
        let mut recorder = Recorder::default();
        draw_layout(&layout, &mut recorder).unwrap();
        let begins: Vec<&str> = recorder
            .calls
            .iter()
            .filter(|call| call.starts_with("begin"))
            .map(String::as_str)
            .collect();
        assert_eq!(begins, vec!["begin frame", "begin list", "begin str"]);
        assert!(recorder.calls.contains(&"text __main__".to_string()));
        assert!(recorder.calls.contains(&"text id2".to_string()));
    }

    #[test]
    fn backend_errors_propagate() {
        let layout = sample_layout();
        assert_eq!(
            draw_layout(&layout, &mut Broken),
            Err("canvas closed".to_string())
        );
    }

    #[test]
    fn render_svg_basic() {
        let layout = sample_layout();
        let svg = render_svg(&layout, &RenderConfig::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("data-id=\"1\""));
        assert!(svg.contains("&quot;a&lt;b&quot;"));
        assert!(!svg.contains("a<b"));
    }

    #[test]
    fn style_attributes_reach_the_svg() {
        let entities = vec![
            Entity::new("int", Some(Id::Int(7)), json!(3)).with_style(StyleSpec::Literal(
                json!({"box_container": {"fill": "#abcdef", "nested": {"x": 1}}})
                    .as_object()
                    .cloned()
                    .unwrap(),
            )),
        ];
        let config = LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        };
        let layout =
            compute_layout(&entities, &Theme::classic(), &Presets::builtin(), &config).unwrap();
        let render_cfg = RenderConfig {
            background: "white".to_string(),
            ..RenderConfig::default()
        };
        let svg = render_svg(&layout, &render_cfg);
        assert!(svg.contains("fill=\"white\""));
        assert!(svg.contains("fill=\"#abcdef\""));
        assert!(!svg.contains("nested"));
    }
}
