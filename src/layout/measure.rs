//! Box geometry for every entity kind.
//!
//! `build_shape` is the only place sizes come from. The packer reads the
//! shape's size and the painter draws the shape's parts, so the footprint
//! committed during layout is the footprint that gets drawn.

use super::text::{FontHints, TextMeasure};
use super::types::{BoxShape, Part, Rect, TextAnchor, TextSpan};
use crate::config::BoxMetrics;
use crate::error::LayoutError;
use crate::model::{Entity, EntityKind, Id, Size};
use crate::style::{BoxRole, StyleRecord, TextRole};

/// Size of `entity`'s box, without drawing anything.
pub fn measure(
    entity: &Entity,
    style: &StyleRecord,
    text: &dyn TextMeasure,
    metrics: &BoxMetrics,
) -> Result<Size, LayoutError> {
    Ok(build_shape(entity, style, text, metrics)?.size())
}

pub fn build_shape(
    entity: &Entity,
    style: &StyleRecord,
    text: &dyn TextMeasure,
    metrics: &BoxMetrics,
) -> Result<BoxShape, LayoutError> {
    let immutable = entity.kind.is_immutable();
    let outline = if immutable {
        2.0 * metrics.double_rect_sep
    } else {
        0.0
    };
    let oracle = SizeOracle {
        text,
        metrics,
        style,
        floor: Size {
            width: entity.size.width.map_or(0.0, |w| w - outline),
            height: entity.size.height.map_or(0.0, |h| h - outline),
        },
    };

    let shape = match &entity.kind {
        EntityKind::List | EntityKind::Tuple => oracle.sequence(entity, false)?,
        EntityKind::Set | EntityKind::FrozenSet => oracle.sequence(entity, true)?,
        EntityKind::Dict => oracle.dict(entity)?,
        EntityKind::Class => oracle.class(entity)?,
        EntityKind::Frame => oracle.frame(entity)?,
        EntityKind::Primitive(_) => oracle.primitive(entity)?,
        EntityKind::Blank | EntityKind::BlankFrame => {
            return Ok(BoxShape {
                width: entity.size.width.unwrap_or(0.0),
                height: entity.size.height.unwrap_or(0.0),
                parts: Vec::new(),
            });
        }
    };

    Ok(if immutable {
        shape.double_boxed(metrics.double_rect_sep)
    } else {
        shape
    })
}

struct SizeOracle<'a> {
    text: &'a dyn TextMeasure,
    metrics: &'a BoxMetrics,
    style: &'a StyleRecord,
    /// Caller-requested minimum, already net of the immutable outline.
    floor: Size,
}

impl SizeOracle<'_> {
    fn width_of(&self, text: &str, role: TextRole) -> f32 {
        self.text
            .text_width(text, &FontHints::from_style(self.style.text(role)))
    }

    fn label_box_width(&self, label: &str, role: TextRole, min: f32) -> f32 {
        min.max(self.width_of(label, role) + self.metrics.item_text_padding)
    }

    fn header_width(&self, id: Option<&Id>, type_label: &str) -> f32 {
        let m = self.metrics;
        let id_width = id.map_or(0.0, |id| {
            self.label_box_width(&id.label(), TextRole::Id, m.prop_min_width)
        });
        id_width + self.label_box_width(type_label, TextRole::Type, m.prop_min_width)
    }

    fn push_header(&self, parts: &mut Vec<Part>, id: Option<&Id>, type_label: &str, width: f32) {
        let m = self.metrics;
        let mid = m.prop_min_height / 2.0;
        if let Some(id) = id {
            let label = id.label();
            let id_width = self.label_box_width(&label, TextRole::Id, m.prop_min_width);
            parts.push(Part::Rect {
                rect: Rect::new(0.0, 0.0, id_width, m.prop_min_height),
                role: BoxRole::Id,
            });
            parts.push(text(label, id_width / 2.0, mid, TextAnchor::Middle, TextRole::Id));
        }
        let type_width = self.label_box_width(type_label, TextRole::Type, m.prop_min_width);
        parts.push(Part::Rect {
            rect: Rect::new(width - type_width, 0.0, type_width, m.prop_min_height),
            role: BoxRole::Type,
        });
        parts.push(text(
            type_label.to_string(),
            width - type_width / 2.0,
            mid,
            TextAnchor::Middle,
            TextRole::Type,
        ));
    }

    /// A reference cell holding `id{n}`, or empty for `None`.
    fn push_item(&self, parts: &mut Vec<Part>, x: f32, y: f32, width: f32, label: &str) {
        let m = self.metrics;
        parts.push(Part::Rect {
            rect: Rect::new(x, y, width, m.item_min_height),
            role: BoxRole::Id,
        });
        if !label.is_empty() {
            parts.push(text(
                label.to_string(),
                x + width / 2.0,
                y + m.item_min_height / 2.0,
                TextAnchor::Middle,
                TextRole::Id,
            ));
        }
    }

    fn container(width: f32, height: f32) -> Vec<Part> {
        vec![Part::Rect {
            rect: Rect::new(0.0, 0.0, width, height),
            role: BoxRole::Container,
        }]
    }

    fn primitive(&self, entity: &Entity) -> Result<BoxShape, LayoutError> {
        let m = self.metrics;
        let value = entity.scalar_text()?;
        let type_label = entity.kind.as_str();
        let width = m
            .obj_min_width
            .max(self.width_of(&value, TextRole::Value) + m.obj_x_padding)
            .max(self.header_width(entity.id.as_ref(), type_label))
            .max(self.floor.width);
        let height = m.obj_min_height.max(self.floor.height);

        let mut parts = Self::container(width, height);
        self.push_header(&mut parts, entity.id.as_ref(), type_label, width);
        parts.push(text(
            value,
            width / 2.0,
            m.prop_min_height + (height - m.prop_min_height) / 2.0,
            TextAnchor::Middle,
            TextRole::Value,
        ));
        Ok(BoxShape {
            width,
            height,
            parts,
        })
    }

    /// Lists and tuples, and with `separated` sets and frozensets.
    fn sequence(&self, entity: &Entity, separated: bool) -> Result<BoxShape, LayoutError> {
        let m = self.metrics;
        let items = entity.items()?;
        let labels: Vec<String> = items
            .iter()
            .map(|id| id.as_ref().map(Id::label).unwrap_or_default())
            .collect();
        let widths: Vec<f32> = labels
            .iter()
            .map(|label| self.label_box_width(label, TextRole::Id, m.item_min_width))
            .collect();
        let separator = if separated { m.set_separator_width } else { 0.0 };
        let content =
            widths.iter().sum::<f32>() + items.len().saturating_sub(1) as f32 * separator;

        let type_label = entity.kind.as_str();
        let mut width = 2.0 * m.obj_x_padding + content;
        if items.is_empty() {
            width = width.max(m.obj_min_width);
        }
        let width = width
            .max(self.header_width(entity.id.as_ref(), type_label))
            .max(self.floor.width);
        let index_band = if entity.show_indexes {
            m.list_index_sep
        } else {
            0.0
        };
        let height = (m.obj_min_height + index_band).max(self.floor.height);

        let mut parts = Self::container(width, height);
        self.push_header(&mut parts, entity.id.as_ref(), type_label, width);

        let item_y = m.prop_min_height
            + index_band
            + (m.obj_min_height - m.prop_min_height - m.item_min_height).max(0.0) / 2.0;
        let item_mid = item_y + m.item_min_height / 2.0;
        let start_x = (width - content) / 2.0;
        let mut x = start_x;
        for (idx, (label, item_width)) in labels.iter().zip(&widths).enumerate() {
            self.push_item(&mut parts, x, item_y, *item_width, label);
            if entity.show_indexes {
                parts.push(text(
                    idx.to_string(),
                    x + item_width / 2.0,
                    item_y - m.list_index_sep / 2.0,
                    TextAnchor::Middle,
                    TextRole::Type,
                ));
            }
            x += item_width;
            if separated && idx + 1 < labels.len() {
                parts.push(text(
                    ",".to_string(),
                    x + separator / 2.0,
                    item_mid,
                    TextAnchor::Middle,
                    TextRole::Value,
                ));
                x += separator;
            }
        }
        if separated {
            let brace_offset = m.obj_x_padding / 2.0;
            parts.push(text(
                "{".to_string(),
                start_x - brace_offset,
                item_mid,
                TextAnchor::Middle,
                TextRole::Value,
            ));
            parts.push(text(
                "}".to_string(),
                x + brace_offset,
                item_mid,
                TextAnchor::Middle,
                TextRole::Value,
            ));
        }

        Ok(BoxShape {
            width,
            height,
            parts,
        })
    }

    fn dict(&self, entity: &Entity) -> Result<BoxShape, LayoutError> {
        let m = self.metrics;
        let label_of = |id: &Option<Id>| id.as_ref().map(Id::label).unwrap_or_default();
        let rows: Vec<(String, f32, String, f32)> = entity
            .entries()?
            .iter()
            .map(|(key, value)| {
                let key = label_of(key);
                let value = label_of(value);
                let key_width = self.label_box_width(&key, TextRole::Id, m.item_min_width);
                let value_width = self.label_box_width(&value, TextRole::Id, m.item_min_width);
                (key, key_width, value, value_width)
            })
            .collect();

        let widest_row = rows
            .iter()
            .map(|(_, key_width, _, value_width)| {
                2.0 * m.obj_x_padding + key_width + value_width + m.dict_key_spacing
            })
            .fold(0.0_f32, f32::max);
        let type_label = entity.kind.as_str();
        let width = m
            .obj_min_width
            .max(widest_row)
            .max(self.header_width(entity.id.as_ref(), type_label))
            .max(self.floor.width);
        let height = if rows.is_empty() {
            m.obj_min_height
        } else {
            let grown = m.prop_min_height
                + rows.len() as f32 * m.dict_entry_height
                + m.item_min_height / 2.0;
            grown.max(m.obj_min_height)
        }
        .max(self.floor.height);

        let mut parts = Self::container(width, height);
        self.push_header(&mut parts, entity.id.as_ref(), type_label, width);
        for (idx, (key, key_width, value, value_width)) in rows.iter().enumerate() {
            let y = m.prop_min_height
                + idx as f32 * m.dict_entry_height
                + (m.dict_entry_height - m.item_min_height) / 2.0;
            let key_x = m.obj_x_padding;
            self.push_item(&mut parts, key_x, y, *key_width, key);
            parts.push(text(
                ":".to_string(),
                key_x + key_width + m.dict_key_spacing / 2.0,
                y + m.item_min_height / 2.0,
                TextAnchor::Middle,
                TextRole::Value,
            ));
            let value_x = key_x + key_width + m.dict_key_spacing;
            self.push_item(&mut parts, value_x, y, *value_width, value);
        }

        Ok(BoxShape {
            width,
            height,
            parts,
        })
    }

    /// Width the attribute rows need, and the rows' measured value cells.
    fn attribute_rows(
        &self,
        attributes: &[(String, Option<Id>)],
    ) -> (f32, Vec<(String, String, f32)>) {
        let m = self.metrics;
        let mut longest_name = 0.0_f32;
        let mut widest_cell = 0.0_f32;
        let rows: Vec<(String, String, f32)> = attributes
            .iter()
            .map(|(name, id)| {
                let label = id.as_ref().map(Id::label).unwrap_or_default();
                let cell = self.label_box_width(&label, TextRole::Id, m.item_min_width);
                longest_name = longest_name.max(self.width_of(name, TextRole::Value));
                widest_cell = widest_cell.max(cell);
                (name.clone(), label, cell)
            })
            .collect();
        if rows.is_empty() {
            return (0.0, rows);
        }
        let spread = longest_name + 3.0 * m.item_min_width;
        let fit = 2.0 * m.obj_x_padding + longest_name + m.item_text_padding + widest_cell;
        (spread.max(fit), rows)
    }

    fn attributes_height(&self, count: usize) -> f32 {
        let m = self.metrics;
        if count == 0 {
            m.obj_min_height
        } else {
            m.prop_min_height + count as f32 * m.attribute_row_height + m.item_min_height / 2.0
        }
    }

    fn push_attributes(&self, parts: &mut Vec<Part>, rows: &[(String, String, f32)], width: f32) {
        let m = self.metrics;
        for (idx, (name, label, cell)) in rows.iter().enumerate() {
            let y = m.prop_min_height
                + idx as f32 * m.attribute_row_height
                + (m.attribute_row_height - m.item_min_height) / 2.0;
            let cell_x = width - m.obj_x_padding - cell;
            parts.push(text(
                name.clone(),
                cell_x - m.item_text_padding,
                y + m.item_min_height / 2.0,
                TextAnchor::End,
                TextRole::Value,
            ));
            self.push_item(parts, cell_x, y, *cell, label);
        }
    }

    fn class(&self, entity: &Entity) -> Result<BoxShape, LayoutError> {
        let m = self.metrics;
        let attributes = entity.attributes()?;
        let (rows_width, rows) = self.attribute_rows(&attributes);
        let name = entity.name.as_deref().unwrap_or(entity.kind.as_str());
        let width = m
            .obj_min_width
            .max(rows_width)
            .max(self.header_width(entity.id.as_ref(), name))
            .max(self.floor.width);
        let height = self
            .attributes_height(rows.len())
            .max(self.floor.height);

        let mut parts = Self::container(width, height);
        self.push_header(&mut parts, entity.id.as_ref(), name, width);
        self.push_attributes(&mut parts, &rows, width);
        Ok(BoxShape {
            width,
            height,
            parts,
        })
    }

    fn frame(&self, entity: &Entity) -> Result<BoxShape, LayoutError> {
        let m = self.metrics;
        let attributes = entity.attributes()?;
        let (rows_width, rows) = self.attribute_rows(&attributes);
        let name = entity.name.clone().unwrap_or_default();
        let width = m
            .obj_min_width
            .max(rows_width)
            .max(self.width_of(&name, TextRole::Type) + 2.0 * m.obj_x_padding)
            .max(self.floor.width);
        let height = self
            .attributes_height(rows.len())
            .max(self.floor.height);

        let mut parts = Self::container(width, height);
        if !name.is_empty() {
            parts.push(text(
                name,
                m.obj_x_padding,
                m.prop_min_height / 2.0,
                TextAnchor::Start,
                TextRole::Type,
            ));
        }
        self.push_attributes(&mut parts, &rows, width);
        Ok(BoxShape {
            width,
            height,
            parts,
        })
    }
}

fn text(text: String, x: f32, y: f32, anchor: TextAnchor, role: TextRole) -> Part {
    Part::Text(TextSpan {
        text,
        x,
        y,
        anchor,
        role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::text::TableMetrics;
    use crate::style::{Presets, StyleSpec, resolve_entity_style};
    use crate::theme::Theme;
    use serde_json::{Value, json};

    fn style_for(entity: &Entity) -> StyleRecord {
        resolve_entity_style(
            &entity.kind,
            entity.style.as_ref(),
            &Theme::classic(),
            &Presets::builtin(),
        )
        .unwrap()
    }

    fn size_of(entity: &Entity) -> Size {
        measure(entity, &style_for(entity), &TableMetrics, &BoxMetrics::default()).unwrap()
    }

    fn value_width(entity: &Entity, text: &str) -> f32 {
        let style = style_for(entity);
        TableMetrics.text_width(text, &FontHints::from_style(&style.text_value))
    }

    #[test]
    fn measuring_twice_gives_the_same_size() {
        let entity = Entity::new("dict", Some(Id::Int(3)), json!({"1": 2, "4": null}));
        let style = style_for(&entity);
        let metrics = BoxMetrics::default();
        let first = measure(&entity, &style, &TableMetrics, &metrics).unwrap();
        let second = measure(&entity, &style, &TableMetrics, &metrics).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn short_primitive_uses_minimum_box_plus_double_outline() {
        let m = BoxMetrics::default();
        let size = size_of(&Entity::new("int", Some(Id::Int(10)), json!(42)));
        assert_eq!(size.width, m.obj_min_width + 2.0 * m.double_rect_sep);
        assert_eq!(size.height, m.obj_min_height + 2.0 * m.double_rect_sep);
    }

    #[test]
    fn long_primitive_grows_with_its_text() {
        let m = BoxMetrics::default();
        let long = "a fairly long string value that will not fit";
        let entity = Entity::new("str", Some(Id::Int(1)), json!(long));
        let expected = value_width(&entity, &format!("\"{long}\"")) + m.obj_x_padding;
        assert!(expected > m.obj_min_width);
        let size = size_of(&entity);
        assert!((size.width - (expected + 2.0 * m.double_rect_sep)).abs() < 0.01);
    }

    #[test]
    fn mutable_primitive_has_no_outline() {
        let m = BoxMetrics::default();
        let size = size_of(&Entity::new("custom", Some(Id::Int(10)), json!(1)));
        assert_eq!(size.width, m.obj_min_width);
        assert_eq!(size.height, m.obj_min_height);
    }

    #[test]
    fn larger_font_makes_a_wider_box() {
        let long = "0123456789012345678901234567890";
        let plain = Entity::new("int", None, json!(long));
        let big = plain.clone().with_style(StyleSpec::Literal(
            json!({"text_value": {"font-size": 40}})
                .as_object()
                .cloned()
                .unwrap(),
        ));
        assert!(size_of(&big).width > size_of(&plain).width);
    }

    #[test]
    fn list_width_sums_item_cells() {
        let m = BoxMetrics::default();
        let entity = Entity::new("list", Some(Id::Int(1)), json!([null, null, null]));
        let size = size_of(&entity);
        let expected = (2.0 * m.obj_x_padding + 3.0 * m.item_min_width).max(
            // header: id box and type box
            2.0 * m.prop_min_width,
        );
        assert_eq!(size.width, expected);
        assert_eq!(size.height, m.obj_min_height);
    }

    #[test]
    fn shown_indexes_add_a_band() {
        let m = BoxMetrics::default();
        let mut entity = Entity::new("list", Some(Id::Int(1)), json!([2, 3]));
        let hidden = size_of(&entity);
        entity.show_indexes = true;
        let shown = size_of(&entity);
        assert_eq!(shown.height - hidden.height, m.list_index_sep);
        assert_eq!(shown.width, hidden.width);
    }

    #[test]
    fn set_is_wider_than_list_with_same_items() {
        let m = BoxMetrics::default();
        let items = json!([1, 2, 3, 4, 5]);
        let list = size_of(&Entity::new("list", Some(Id::Int(9)), items.clone()));
        let set = size_of(&Entity::new("set", Some(Id::Int(9)), items));
        assert_eq!(set.width - list.width, 4.0 * m.set_separator_width);
    }

    #[test]
    fn tuple_gets_the_double_outline() {
        let m = BoxMetrics::default();
        let items = json!([1, 2, 3, 4, 5]);
        let list = size_of(&Entity::new("list", Some(Id::Int(9)), items.clone()));
        let tuple = size_of(&Entity::new("tuple", Some(Id::Int(9)), items));
        assert_eq!(tuple.width - list.width, 2.0 * m.double_rect_sep);
    }

    #[test]
    fn empty_list_keeps_minimum_width() {
        let m = BoxMetrics::default();
        let size = size_of(&Entity::new("list", Some(Id::Int(1)), json!([])));
        assert_eq!(size.width, m.obj_min_width);
    }

    #[test]
    fn dict_height_grows_per_entry() {
        let m = BoxMetrics::default();
        let one = size_of(&Entity::new("dict", Some(Id::Int(1)), json!({"2": 3})));
        let three = size_of(&Entity::new(
            "dict",
            Some(Id::Int(1)),
            json!({"2": 3, "4": 5, "6": 7}),
        ));
        assert_eq!(three.height - one.height, 2.0 * m.dict_entry_height);
    }

    #[test]
    fn class_height_grows_per_attribute() {
        let m = BoxMetrics::default();
        let empty = size_of(&Entity::new("class", Some(Id::Int(1)), json!({})).with_name("Point"));
        assert_eq!(empty.height, m.obj_min_height);
        let two = size_of(
            &Entity::new("class", Some(Id::Int(1)), json!({"x": 2, "y": 3})).with_name("Point"),
        );
        assert_eq!(
            two.height,
            m.prop_min_height + 2.0 * m.attribute_row_height + m.item_min_height / 2.0
        );
    }

    #[test]
    fn long_attribute_names_widen_frames() {
        let m = BoxMetrics::default();
        let name = "an_exceptionally_long_local_variable_name";
        let entity = Entity::new(".frame", None, json!({name: 1})).with_name("main");
        let size = size_of(&entity);
        let longest = value_width(&entity, name);
        assert!(size.width >= longest + 3.0 * m.item_min_width);
    }

    #[test]
    fn long_frame_name_widens_the_frame() {
        let m = BoxMetrics::default();
        let name = "a_function_with_a_remarkably_long_descriptive_name";
        let entity = Entity::new("frame", None, Value::Null).with_name(name);
        let style = style_for(&entity);
        let name_width = TableMetrics.text_width(name, &FontHints::from_style(&style.text_type));
        assert_eq!(size_of(&entity).width, name_width + 2.0 * m.obj_x_padding);
    }

    #[test]
    fn blank_returns_supplied_size_verbatim() {
        let size = size_of(&Entity::blank(123.0, 45.0));
        assert_eq!(size, Size { width: 123.0, height: 45.0 });
    }

    #[test]
    fn explicit_size_is_a_minimum() {
        let mut entity = Entity::new("list", Some(Id::Int(1)), json!([2]));
        entity.size.width = Some(500.0);
        entity.size.height = Some(10.0);
        let size = size_of(&entity);
        assert_eq!(size.width, 500.0);
        assert_eq!(size.height, BoxMetrics::default().obj_min_height);

        let mut immutable = Entity::new("int", Some(Id::Int(2)), json!(1));
        immutable.size.width = Some(400.0);
        assert_eq!(size_of(&immutable).width, 400.0);
    }

    #[test]
    fn collection_payload_on_primitive_is_invalid() {
        let entity = Entity::new("int", Some(Id::Int(1)), json!({"a": 1}));
        let err = measure(&entity, &style_for(&entity), &TableMetrics, &BoxMetrics::default())
            .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidEntityType { kind, .. } if kind == "int"));
    }

    #[test]
    fn scalar_payload_on_list_is_invalid() {
        let entity = Entity::new("list", Some(Id::Int(1)), json!(5));
        assert!(
            measure(&entity, &style_for(&entity), &TableMetrics, &BoxMetrics::default()).is_err()
        );
    }

    #[test]
    fn parts_stay_inside_the_box() {
        let entity = Entity::new("set", Some(Id::Int(7)), json!([1, 22, 333]));
        let shape =
            build_shape(&entity, &style_for(&entity), &TableMetrics, &BoxMetrics::default())
                .unwrap();
        for part in &shape.parts {
            if let Part::Rect { rect, .. } = part {
                assert!(rect.x >= 0.0 && rect.right() <= shape.width + 0.001);
                assert!(rect.y >= 0.0 && rect.bottom() <= shape.height + 0.001);
            }
        }
    }
}
