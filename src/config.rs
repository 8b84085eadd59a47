use crate::style::{Presets, StyleFragment};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Placement order of the object grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Tallest first; equal heights keep their input order.
    Height,
    /// Ascending id.
    Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

/// Fixed dimensions of the box drawings. Every size formula reads from here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxMetrics {
    pub obj_min_width: f32,
    pub obj_min_height: f32,
    pub obj_x_padding: f32,
    pub prop_min_width: f32,
    pub prop_min_height: f32,
    pub item_min_width: f32,
    pub item_min_height: f32,
    pub item_text_padding: f32,
    pub double_rect_sep: f32,
    pub list_index_sep: f32,
    pub set_separator_width: f32,
    pub dict_entry_height: f32,
    pub dict_key_spacing: f32,
    pub attribute_row_height: f32,
}

impl Default for BoxMetrics {
    fn default() -> Self {
        Self {
            obj_min_width: 200.0,
            obj_min_height: 130.0,
            obj_x_padding: 25.0,
            prop_min_width: 60.0,
            prop_min_height: 60.0,
            item_min_width: 50.0,
            item_min_height: 50.0,
            item_text_padding: 10.0,
            double_rect_sep: 5.0,
            list_index_sep: 20.0,
            set_separator_width: 10.0,
            dict_entry_height: 75.0,
            dict_key_spacing: 20.0,
            attribute_row_height: 75.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Requested canvas width. Raised (with a warning) when content needs more.
    pub width: Option<f32>,
    /// Canvas width used when none is requested.
    pub default_width: f32,
    /// Gap between grid items and between grid rows.
    pub padding: f32,
    pub top_margin: f32,
    pub left_margin: f32,
    pub bottom_margin: f32,
    pub right_margin: f32,
    pub sort_by: Option<SortKey>,
    /// Explicit x where the object grid starts, instead of right of the frames.
    pub grid_start_x: Option<f32>,
    /// Measure text with the built-in glyph table instead of system fonts.
    pub fast_text_metrics: bool,
    pub metrics: BoxMetrics,
}

impl LayoutConfig {
    pub fn margins(&self) -> Margins {
        Margins {
            top: self.top_margin,
            left: self.left_margin,
            bottom: self.bottom_margin,
            right: self.right_margin,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: None,
            default_width: 1300.0,
            padding: 25.0,
            top_margin: 20.0,
            left_margin: 20.0,
            bottom_margin: 20.0,
            right_margin: 20.0,
            sort_by: Some(SortKey::Height),
            grid_start_x: None,
            fast_text_metrics: false,
            metrics: BoxMetrics::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1300.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub presets: Presets,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
            presets: Presets::builtin(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<NumberOrString>,
    id_text_color: Option<String>,
    type_text_color: Option<String>,
    value_text_color: Option<String>,
    id_fill: Option<String>,
    type_fill: Option<String>,
    container_fill: Option<String>,
    frame_fill: Option<String>,
    box_stroke: Option<String>,
    stroke_width: Option<NumberOrString>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f32),
    String(String),
}

impl NumberOrString {
    fn as_f32(&self) -> Option<f32> {
        match self {
            NumberOrString::Number(val) => Some(*val),
            NumberOrString::String(val) => val.trim().trim_end_matches("px").parse::<f32>().ok(),
        }
    }
}

/// `sortBy` accepts `"height"`, `"id"`, and `"none"` or `null` for input order.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SortChoice {
    Height,
    Id,
    None,
}

impl SortChoice {
    fn key(&self) -> Option<SortKey> {
        match self {
            SortChoice::Height => Some(SortKey::Height),
            SortChoice::Id => Some(SortKey::Id),
            SortChoice::None => None,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    width: Option<f32>,
    default_width: Option<f32>,
    padding: Option<f32>,
    top_margin: Option<f32>,
    left_margin: Option<f32>,
    bottom_margin: Option<f32>,
    right_margin: Option<f32>,
    #[serde(default, deserialize_with = "deserialize_sort")]
    sort_by: Option<Option<SortChoice>>,
    grid_start_x: Option<f32>,
    fast_text_metrics: Option<bool>,
}

fn deserialize_sort<'de, D>(deserializer: D) -> Result<Option<Option<SortChoice>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Some(Option::<SortChoice>::deserialize(deserializer)?))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct BoxMetricsFile {
    obj_min_width: Option<f32>,
    obj_min_height: Option<f32>,
    obj_x_padding: Option<f32>,
    prop_min_width: Option<f32>,
    prop_min_height: Option<f32>,
    item_min_width: Option<f32>,
    item_min_height: Option<f32>,
    item_text_padding: Option<f32>,
    double_rect_sep: Option<f32>,
    list_index_sep: Option<f32>,
    set_separator_width: Option<f32>,
    dict_entry_height: Option<f32>,
    dict_key_spacing: Option<f32>,
    attribute_row_height: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    metrics: Option<BoxMetricsFile>,
    presets: Option<serde_json::Map<String, serde_json::Value>>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::by_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("unknown theme `{theme_name}`"))?;
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size.and_then(|v| v.as_f32()) {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.id_text_color {
            config.theme.id_text_color = v;
        }
        if let Some(v) = vars.type_text_color {
            config.theme.type_text_color = v;
        }
        if let Some(v) = vars.value_text_color {
            config.theme.value_text_color = v;
        }
        if let Some(v) = vars.id_fill {
            config.theme.id_fill = v;
        }
        if let Some(v) = vars.type_fill {
            config.theme.type_fill = v;
        }
        if let Some(v) = vars.container_fill {
            config.theme.container_fill = v;
        }
        if let Some(v) = vars.frame_fill {
            config.theme.frame_fill = v;
        }
        if let Some(v) = vars.box_stroke {
            config.theme.box_stroke = v;
        }
        if let Some(v) = vars.stroke_width.and_then(|v| v.as_f32()) {
            config.theme.stroke_width = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if layout.width.is_some() {
            config.layout.width = layout.width;
        }
        if let Some(v) = layout.default_width {
            config.layout.default_width = v;
        }
        if let Some(v) = layout.padding {
            config.layout.padding = v;
        }
        if let Some(v) = layout.top_margin {
            config.layout.top_margin = v;
        }
        if let Some(v) = layout.left_margin {
            config.layout.left_margin = v;
        }
        if let Some(v) = layout.bottom_margin {
            config.layout.bottom_margin = v;
        }
        if let Some(v) = layout.right_margin {
            config.layout.right_margin = v;
        }
        if let Some(choice) = layout.sort_by {
            config.layout.sort_by = choice.as_ref().and_then(SortChoice::key);
        }
        if layout.grid_start_x.is_some() {
            config.layout.grid_start_x = layout.grid_start_x;
        }
        if let Some(v) = layout.fast_text_metrics {
            config.layout.fast_text_metrics = v;
        }
    }

    if let Some(metrics) = parsed.metrics {
        let target = &mut config.layout.metrics;
        if let Some(v) = metrics.obj_min_width {
            target.obj_min_width = v;
        }
        if let Some(v) = metrics.obj_min_height {
            target.obj_min_height = v;
        }
        if let Some(v) = metrics.obj_x_padding {
            target.obj_x_padding = v;
        }
        if let Some(v) = metrics.prop_min_width {
            target.prop_min_width = v;
        }
        if let Some(v) = metrics.prop_min_height {
            target.prop_min_height = v;
        }
        if let Some(v) = metrics.item_min_width {
            target.item_min_width = v;
        }
        if let Some(v) = metrics.item_min_height {
            target.item_min_height = v;
        }
        if let Some(v) = metrics.item_text_padding {
            target.item_text_padding = v;
        }
        if let Some(v) = metrics.double_rect_sep {
            target.double_rect_sep = v;
        }
        if let Some(v) = metrics.list_index_sep {
            target.list_index_sep = v;
        }
        if let Some(v) = metrics.set_separator_width {
            target.set_separator_width = v;
        }
        if let Some(v) = metrics.dict_entry_height {
            target.dict_entry_height = v;
        }
        if let Some(v) = metrics.dict_key_spacing {
            target.dict_key_spacing = v;
        }
        if let Some(v) = metrics.attribute_row_height {
            target.attribute_row_height = v;
        }
    }

    if let Some(presets) = parsed.presets {
        for (name, value) in presets {
            let fragment: StyleFragment = match value {
                serde_json::Value::Object(fragment) => fragment,
                other => anyhow::bail!("preset `{name}` must be an object, got {other}"),
            };
            config.presets.insert(name, fragment);
        }
    }

    config.render.background = config.theme.background.clone();

    Ok(config)
}
