use thiserror::Error;

use crate::model::Id;

/// Fatal problems that abort a layout before anything is drawn.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("unknown style preset `{name}`")]
    UnknownPreset { name: String },

    #[error("invalid entity type `{kind}` with value {value}")]
    InvalidEntityType { kind: String, value: String },
}

/// Recoverable diagnostics. The layout carries on and reports them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Warning {
    #[error("duplicate id {id} found in entities {first} and {second}")]
    DuplicateId { id: Id, first: usize, second: usize },

    #[error("entity {owner} references id {id}, which does not exist")]
    DanglingReference { owner: String, id: Id },

    #[error("{kind} entity at index {index} is missing a width or height and was skipped")]
    BlankMissingSize { kind: String, index: usize },

    #[error(
        "provided width ({requested}) is smaller than the required width ({required}); \
         the required width was used instead"
    )]
    WidthOverridden { requested: f32, required: f32 },
}

impl Warning {
    pub(crate) fn emit(self) -> Self {
        tracing::warn!("{self}");
        self
    }
}
