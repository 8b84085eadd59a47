use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub id_text_color: String,
    pub type_text_color: String,
    pub value_text_color: String,
    pub id_fill: String,
    pub type_fill: String,
    pub container_fill: String,
    pub frame_fill: String,
    pub box_stroke: String,
    pub stroke_width: f32,
    pub background: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "Consolas, \"Courier New\", monospace".to_string(),
            font_size: 20.0,
            id_text_color: "#2B6BA2".to_string(),
            type_text_color: "#29A61C".to_string(),
            value_text_color: "#000000".to_string(),
            id_fill: "#FFFFFF".to_string(),
            type_fill: "#FFFFFF".to_string(),
            container_fill: "#FFFFFF".to_string(),
            frame_fill: "#F6F6F6".to_string(),
            box_stroke: "#000000".to_string(),
            stroke_width: 1.5,
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 16.0,
            id_text_color: "#3B5BDB".to_string(),
            type_text_color: "#2B8A3E".to_string(),
            value_text_color: "#1C2430".to_string(),
            id_fill: "#F8FAFF".to_string(),
            type_fill: "#F8FAFF".to_string(),
            container_fill: "#FFFFFF".to_string(),
            frame_fill: "#EEF2F8".to_string(),
            box_stroke: "#7A8AA6".to_string(),
            stroke_width: 1.2,
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "classic" | "default" => Some(Self::classic()),
            "modern" => Some(Self::modern()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
