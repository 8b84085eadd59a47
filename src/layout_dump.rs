use crate::layout::{GridRow, Layout};
use crate::model::Entity;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// The placed batch in input format, with every `x`, `y`, `width` and `height`
/// filled in, so it can be fed back in as a pinned layout.
#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub entities: Vec<Entity>,
    pub rows: Vec<RowDump>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RowDump {
    pub index: usize,
    pub y: f32,
    pub height: f32,
    pub members: Vec<usize>,
}

impl From<&GridRow> for RowDump {
    fn from(row: &GridRow) -> Self {
        Self {
            index: row.index,
            y: row.y,
            height: row.height,
            members: row.members.clone(),
        }
    }
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        LayoutDump {
            width: layout.width,
            height: layout.height,
            entities: layout.entities().map(|placed| placed.to_entity()).collect(),
            rows: layout.rows.iter().map(RowDump::from).collect(),
            warnings: layout.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::compute_layout;
    use crate::model::{Id, parse_entities};
    use crate::style::Presets;
    use crate::theme::Theme;
    use serde_json::json;

    #[test]
    fn dump_round_trips_as_pinned_input() {
        let entities = vec![
            Entity::new("int", Some(Id::Int(1)), json!(3)),
            Entity::new("list", Some(Id::Int(2)), json!([1, 1])),
        ];
        let config = LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        };
        let layout =
            compute_layout(&entities, &Theme::classic(), &Presets::builtin(), &config).unwrap();
        let dump = LayoutDump::from_layout(&layout);
        let value = serde_json::to_value(&dump).unwrap();
        assert_eq!(value["entities"][0]["type"], "int");
        assert!(value["entities"][0]["x"].is_number());
        assert!(value["entities"][1]["width"].is_number());

        let again = parse_entities(&value["entities"].to_string()).unwrap();
        let relaid =
            compute_layout(&again, &Theme::classic(), &Presets::builtin(), &config).unwrap();
        for (before, after) in layout.entities().zip(relaid.entities()) {
            assert_eq!(before.position, after.position);
            assert_eq!(before.size(), after.size());
        }
    }
}
