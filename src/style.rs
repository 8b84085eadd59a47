//! Style specifications and their resolution into concrete style records.
//!
//! A style is written as a preset name, a list mixing preset names and literal
//! fragments, or a single literal fragment. Resolution folds the list left to
//! right with a deep merge, so later keys win while sibling keys survive.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::LayoutError;
use crate::model::EntityKind;
use crate::theme::Theme;

/// An open attribute map, e.g. `{"fill": "red", "font-size": 20}`.
pub type AttrMap = Map<String, Value>;

/// A partial style: any subset of the six groups, nested arbitrarily.
pub type StyleFragment = Map<String, Value>;

pub const TEXT_ID: &str = "text_id";
pub const TEXT_TYPE: &str = "text_type";
pub const TEXT_VALUE: &str = "text_value";
pub const BOX_ID: &str = "box_id";
pub const BOX_TYPE: &str = "box_type";
pub const BOX_CONTAINER: &str = "box_container";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleSpec {
    Preset(String),
    List(Vec<StyleSpec>),
    Literal(StyleFragment),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextRole {
    Id,
    Type,
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxRole {
    Id,
    Type,
    Container,
}

/// Fully resolved style of one entity. All six groups are always present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleRecord {
    pub text_id: AttrMap,
    pub text_type: AttrMap,
    pub text_value: AttrMap,
    pub box_id: AttrMap,
    pub box_type: AttrMap,
    pub box_container: AttrMap,
}

impl StyleRecord {
    pub fn from_fragment(fragment: &StyleFragment) -> Self {
        let group = |name: &str| {
            fragment
                .get(name)
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default()
        };
        Self {
            text_id: group(TEXT_ID),
            text_type: group(TEXT_TYPE),
            text_value: group(TEXT_VALUE),
            box_id: group(BOX_ID),
            box_type: group(BOX_TYPE),
            box_container: group(BOX_CONTAINER),
        }
    }

    pub fn text(&self, role: TextRole) -> &AttrMap {
        match role {
            TextRole::Id => &self.text_id,
            TextRole::Type => &self.text_type,
            TextRole::Value => &self.text_value,
        }
    }

    pub fn boxed(&self, role: BoxRole) -> &AttrMap {
        match role {
            BoxRole::Id => &self.box_id,
            BoxRole::Type => &self.box_type,
            BoxRole::Container => &self.box_container,
        }
    }
}

/// Structural merge: objects merge key by key, anything else is replaced.
pub fn deep_merge(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, incoming) in source {
        match (target.get_mut(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            _ => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}

/// Named style fragments that entities can refer to.
#[derive(Debug, Clone, PartialEq)]
pub struct Presets {
    table: BTreeMap<String, StyleFragment>,
}

impl Presets {
    pub fn empty() -> Self {
        Self {
            table: BTreeMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut presets = Self::empty();
        let highlight_text = json!({"font-weight": "bold", "fill": "#D0021B"});
        let highlight_box = json!({"stroke": "#D0021B", "stroke-width": 3});
        let hidden_text = json!({"fill-opacity": 0});
        let hidden_box = json!({"fill": "none", "stroke": "none"});
        let faded = json!({"opacity": 0.3});

        presets.insert_value(
            "highlight",
            json!({
                TEXT_VALUE: highlight_text.clone(),
                BOX_CONTAINER: highlight_box.clone(),
            }),
        );
        presets.insert_value(
            "highlight_id",
            json!({TEXT_ID: highlight_text.clone(), BOX_ID: highlight_box.clone()}),
        );
        presets.insert_value(
            "highlight_type",
            json!({TEXT_TYPE: highlight_text, BOX_TYPE: highlight_box}),
        );
        presets.insert_value(
            "hide",
            json!({
                TEXT_ID: hidden_text.clone(),
                TEXT_TYPE: hidden_text.clone(),
                TEXT_VALUE: hidden_text.clone(),
                BOX_ID: hidden_box.clone(),
                BOX_TYPE: hidden_box.clone(),
                BOX_CONTAINER: hidden_box.clone(),
            }),
        );
        presets.insert_value(
            "hide_id",
            json!({TEXT_ID: hidden_text.clone(), BOX_ID: hidden_box.clone()}),
        );
        presets.insert_value(
            "hide_type",
            json!({TEXT_TYPE: hidden_text, BOX_TYPE: hidden_box.clone()}),
        );
        presets.insert_value("hide_container", json!({BOX_CONTAINER: hidden_box}));
        presets.insert_value(
            "fade",
            json!({
                TEXT_ID: faded.clone(),
                TEXT_TYPE: faded.clone(),
                TEXT_VALUE: faded.clone(),
                BOX_ID: faded.clone(),
                BOX_TYPE: faded.clone(),
                BOX_CONTAINER: faded.clone(),
            }),
        );
        presets.insert_value("fade_id", json!({TEXT_ID: faded.clone(), BOX_ID: faded.clone()}));
        presets.insert_value("fade_type", json!({TEXT_TYPE: faded.clone(), BOX_TYPE: faded}));
        presets
    }

    fn insert_value(&mut self, name: &str, value: Value) {
        if let Value::Object(fragment) = value {
            self.table.insert(name.to_string(), fragment);
        }
    }

    /// Registers or replaces a preset.
    pub fn insert(&mut self, name: impl Into<String>, fragment: StyleFragment) {
        self.table.insert(name.into(), fragment);
    }

    pub fn get(&self, name: &str) -> Option<&StyleFragment> {
        self.table.get(name)
    }

    fn lookup(&self, name: &str) -> Result<&StyleFragment, LayoutError> {
        self.get(name).ok_or_else(|| LayoutError::UnknownPreset {
            name: name.to_string(),
        })
    }
}

impl Default for Presets {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Folds a style spec into a single fragment.
pub fn resolve_style(spec: &StyleSpec, presets: &Presets) -> Result<StyleFragment, LayoutError> {
    match spec {
        StyleSpec::Preset(name) => Ok(presets.lookup(name)?.clone()),
        StyleSpec::Literal(fragment) => Ok(fragment.clone()),
        StyleSpec::List(items) => {
            let mut merged = StyleFragment::new();
            for item in items {
                let fragment = resolve_style(item, presets)?;
                deep_merge(&mut merged, &fragment);
            }
            Ok(merged)
        }
    }
}

/// Theme-derived style every entity of `kind` starts from.
pub fn default_style(kind: &EntityKind, theme: &Theme) -> StyleFragment {
    let font = |fill: &str| {
        json!({
            "fill": fill,
            "font-family": theme.font_family,
            "font-size": theme.font_size,
        })
    };
    let outline = |fill: &str| {
        json!({
            "fill": fill,
            "stroke": theme.box_stroke,
            "stroke-width": theme.stroke_width,
        })
    };
    let container_fill = match kind {
        EntityKind::Frame | EntityKind::BlankFrame => theme.frame_fill.as_str(),
        _ => theme.container_fill.as_str(),
    };
    let value = json!({
        TEXT_ID: font(&theme.id_text_color),
        TEXT_TYPE: font(&theme.type_text_color),
        TEXT_VALUE: font(&theme.value_text_color),
        BOX_ID: outline(&theme.id_fill),
        BOX_TYPE: outline(&theme.type_fill),
        BOX_CONTAINER: outline(container_fill),
    });
    match value {
        Value::Object(fragment) => fragment,
        _ => StyleFragment::new(),
    }
}

/// `defaults(kind, theme)` overlaid with the entity's own style.
pub fn resolve_entity_style(
    kind: &EntityKind,
    spec: Option<&StyleSpec>,
    theme: &Theme,
    presets: &Presets,
) -> Result<StyleRecord, LayoutError> {
    let mut fragment = default_style(kind, theme);
    if let Some(spec) = spec {
        let user = resolve_style(spec, presets)?;
        deep_merge(&mut fragment, &user);
    }
    Ok(StyleRecord::from_fragment(&fragment))
}
