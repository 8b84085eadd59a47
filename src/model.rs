use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LayoutError;
use crate::style::StyleSpec;

/// Kinds that get the double outline.
const IMMUTABLE_KINDS: [&str; 11] = [
    "int", "str", "bool", "float", "date", "bytes", "range", "complex", "None", "tuple",
    "frozenset",
];

/// Object address as it appears in the input: `10` or `"a"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Int(i64),
    Str(String),
}

impl Id {
    /// Reads an id out of a JSON value. `null` means "no reference".
    pub fn from_json(value: &Value) -> Option<Option<Self>> {
        match value {
            Value::Null => Some(None),
            Value::Number(num) => Some(Some(match num.as_i64() {
                Some(int) => Id::Int(int),
                None => Id::Str(num.to_string()),
            })),
            Value::String(text) => Some(Some(Id::Str(text.clone()))),
            _ => None,
        }
    }

    /// Object keys are always strings in JSON; numeric keys become integer ids.
    /// Only object-form dict keys go through here.
    pub fn from_key(key: &str) -> Self {
        match key.trim().parse::<i64>() {
            Ok(int) => Id::Int(int),
            Err(_) => Id::Str(key.to_string()),
        }
    }

    pub fn label(&self) -> String {
        format!("id{self}")
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Int(int) => write!(f, "{int}"),
            Id::Str(text) => f.write_str(text),
        }
    }
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Id::Int(value)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Id::Str(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityKind {
    /// Any scalar type tag: `int`, `str`, `bool`, `date`, ...
    Primitive(String),
    List,
    Tuple,
    Set,
    FrozenSet,
    Dict,
    Class,
    Frame,
    Blank,
    BlankFrame,
}

impl EntityKind {
    pub fn parse(tag: &str) -> Self {
        match tag.trim().trim_start_matches('.') {
            "list" => Self::List,
            "tuple" => Self::Tuple,
            "set" => Self::Set,
            "frozenset" => Self::FrozenSet,
            "dict" => Self::Dict,
            "class" => Self::Class,
            "frame" | "stackframe" => Self::Frame,
            "blank" => Self::Blank,
            "blank-frame" => Self::BlankFrame,
            other => Self::Primitive(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Primitive(tag) => tag,
            Self::List => "list",
            Self::Tuple => "tuple",
            Self::Set => "set",
            Self::FrozenSet => "frozenset",
            Self::Dict => "dict",
            Self::Class => "class",
            Self::Frame => "frame",
            Self::Blank => "blank",
            Self::BlankFrame => "blank-frame",
        }
    }

    pub fn is_frame(&self) -> bool {
        matches!(self, Self::Frame | Self::BlankFrame)
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank | Self::BlankFrame)
    }

    pub fn is_immutable(&self) -> bool {
        IMMUTABLE_KINDS.contains(&self.as_str())
    }
}

impl From<String> for EntityKind {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<EntityKind> for String {
    fn from(value: EntityKind) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// A caller-supplied size. Either axis may be missing; blanks need both.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SizeHint {
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl SizeHint {
    pub fn complete(&self) -> Option<Size> {
        Some(Size {
            width: self.width?,
            height: self.height?,
        })
    }
}

/// One drawable unit of the memory model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawEntity", into = "RawEntity")]
pub struct Entity {
    pub kind: EntityKind,
    pub id: Option<Id>,
    pub value: Value,
    pub name: Option<String>,
    pub position: Option<Position>,
    pub size: SizeHint,
    pub style: Option<StyleSpec>,
    pub show_indexes: bool,
}

impl Entity {
    pub fn new(kind: &str, id: Option<Id>, value: Value) -> Self {
        Self {
            kind: EntityKind::parse(kind),
            id,
            value,
            name: None,
            position: None,
            size: SizeHint::default(),
            style: None,
            show_indexes: false,
        }
    }

    pub fn blank(width: f32, height: f32) -> Self {
        Self::new("blank", None, Value::Null).sized(width, height)
    }

    pub fn blank_frame(width: f32, height: f32) -> Self {
        let mut entity = Self::blank(width, height);
        entity.kind = EntityKind::BlankFrame;
        entity
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_style(mut self, style: StyleSpec) -> Self {
        self.style = Some(style);
        self
    }

    pub fn sized(mut self, width: f32, height: f32) -> Self {
        self.size = SizeHint {
            width: Some(width),
            height: Some(height),
        };
        self
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = Some(Position { x, y });
        self
    }

    /// Human-readable handle used in diagnostics.
    pub fn describe(&self) -> String {
        match (&self.id, &self.name) {
            (Some(id), _) => format!("{} {}", self.kind, id.label()),
            (None, Some(name)) => format!("{} `{name}`", self.kind),
            (None, None) => self.kind.to_string(),
        }
    }

    fn invalid(&self) -> LayoutError {
        LayoutError::InvalidEntityType {
            kind: self.kind.to_string(),
            value: self.value.to_string(),
        }
    }

    /// Rendered text of a primitive value.
    pub fn scalar_text(&self) -> Result<String, LayoutError> {
        match &self.value {
            Value::Null => Ok("None".to_string()),
            Value::Bool(true) => Ok("True".to_string()),
            Value::Bool(false) => Ok("False".to_string()),
            Value::Number(num) => Ok(num.to_string()),
            Value::String(text) if self.kind.as_str() == "str" => Ok(format!("\"{text}\"")),
            Value::String(text) => Ok(text.clone()),
            Value::Array(_) | Value::Object(_) => Err(self.invalid()),
        }
    }

    /// Element ids of a list, tuple, set or frozenset.
    pub fn items(&self) -> Result<Vec<Option<Id>>, LayoutError> {
        match &self.value {
            Value::Null => Ok(Vec::new()),
            Value::Array(values) => values
                .iter()
                .map(|value| Id::from_json(value).ok_or_else(|| self.invalid()))
                .collect(),
            _ => Err(self.invalid()),
        }
    }

    /// Key/value id pairs of a dict, from either an object or a list of pairs.
    pub fn entries(&self) -> Result<Vec<(Option<Id>, Option<Id>)>, LayoutError> {
        match &self.value {
            Value::Null => Ok(Vec::new()),
            Value::Object(map) => map
                .iter()
                .map(|(key, value)| {
                    let value = Id::from_json(value).ok_or_else(|| self.invalid())?;
                    Ok((Some(Id::from_key(key)), value))
                })
                .collect(),
            Value::Array(pairs) => pairs
                .iter()
                .map(|pair| match pair.as_array().map(Vec::as_slice) {
                    Some([key, value]) => {
                        let key = Id::from_json(key).ok_or_else(|| self.invalid())?;
                        let value = Id::from_json(value).ok_or_else(|| self.invalid())?;
                        Ok((key, value))
                    }
                    _ => Err(self.invalid()),
                })
                .collect(),
            _ => Err(self.invalid()),
        }
    }

    /// Attribute name to id pairs of a class or frame, in input order.
    pub fn attributes(&self) -> Result<Vec<(String, Option<Id>)>, LayoutError> {
        match &self.value {
            Value::Null => Ok(Vec::new()),
            Value::Object(map) => map
                .iter()
                .map(|(name, value)| {
                    let value = Id::from_json(value).ok_or_else(|| self.invalid())?;
                    Ok((name.clone(), value))
                })
                .collect(),
            _ => Err(self.invalid()),
        }
    }

    /// Every non-null id this entity points at. Malformed payloads yield nothing
    /// here; measurement reports them.
    pub fn references(&self) -> Vec<Id> {
        let ids: Vec<Option<Id>> = match &self.kind {
            EntityKind::List | EntityKind::Tuple | EntityKind::Set | EntityKind::FrozenSet => {
                self.items().unwrap_or_default()
            }
            EntityKind::Dict => self
                .entries()
                .unwrap_or_default()
                .into_iter()
                .flat_map(|(key, value)| [key, value])
                .collect(),
            EntityKind::Class | EntityKind::Frame => self
                .attributes()
                .unwrap_or_default()
                .into_iter()
                .map(|(_, value)| value)
                .collect(),
            _ => Vec::new(),
        };
        ids.into_iter().flatten().collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawEntity {
    #[serde(rename = "type")]
    kind: EntityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<Id>,
    #[serde(default)]
    value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    style: Option<StyleSpec>,
    #[serde(default, alias = "showIndexes", skip_serializing_if = "std::ops::Not::not")]
    show_indexes: bool,
}

impl From<RawEntity> for Entity {
    fn from(raw: RawEntity) -> Self {
        let position = match (raw.x, raw.y) {
            (Some(x), Some(y)) => Some(Position { x, y }),
            _ => None,
        };
        Self {
            kind: raw.kind,
            id: raw.id,
            value: raw.value,
            name: raw.name,
            position,
            size: SizeHint {
                width: raw.width,
                height: raw.height,
            },
            style: raw.style,
            show_indexes: raw.show_indexes,
        }
    }
}

impl From<Entity> for RawEntity {
    fn from(entity: Entity) -> Self {
        Self {
            kind: entity.kind,
            id: entity.id,
            value: entity.value,
            name: entity.name,
            x: entity.position.map(|pos| pos.x),
            y: entity.position.map(|pos| pos.y),
            width: entity.size.width,
            height: entity.size.height,
            style: entity.style,
            show_indexes: entity.show_indexes,
        }
    }
}

/// Parses an entity batch. Accepts strict JSON as well as JSON5.
pub fn parse_entities(input: &str) -> anyhow::Result<Vec<Entity>> {
    Ok(json5::from_str(input)?)
}
