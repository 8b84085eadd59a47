use std::collections::{HashMap, HashSet};

use crate::error::Warning;
use crate::model::{Entity, Id};

/// An input entity tagged with its position in the batch.
#[derive(Debug, Clone, Copy)]
pub struct Slot<'a> {
    pub index: usize,
    pub entity: &'a Entity,
}

#[derive(Debug, Default)]
pub struct Partition<'a> {
    /// Frames and blank-frames, in input order.
    pub frames: Vec<Slot<'a>>,
    /// Everything the grid packer places.
    pub others: Vec<Slot<'a>>,
    /// Entities with an explicit position.
    pub pinned: Vec<Slot<'a>>,
    pub warnings: Vec<Warning>,
}

/// Splits a batch into the frame column, the object grid and pinned entities.
/// Blanks without both a width and a height are dropped with a warning.
pub fn partition(entities: &[Entity]) -> Partition<'_> {
    let mut out = Partition::default();
    for (index, entity) in entities.iter().enumerate() {
        if entity.kind.is_blank() && entity.size.complete().is_none() {
            out.warnings.push(Warning::BlankMissingSize {
                kind: entity.kind.to_string(),
                index,
            });
            continue;
        }
        let slot = Slot { index, entity };
        if entity.position.is_some() {
            out.pinned.push(slot);
        } else if entity.kind.is_frame() {
            out.frames.push(slot);
        } else {
            out.others.push(slot);
        }
    }
    out
}

/// Duplicate ids among non-frame entities, and references to ids that no
/// entity in the batch carries.
pub fn validate_ids(entities: &[Entity]) -> Vec<Warning> {
    let mut warnings = Vec::new();
    let mut first_seen: HashMap<&Id, usize> = HashMap::new();
    for (index, entity) in entities.iter().enumerate() {
        if entity.kind.is_frame() {
            continue;
        }
        let Some(id) = entity.id.as_ref() else {
            continue;
        };
        match first_seen.get(id) {
            Some(&first) => warnings.push(Warning::DuplicateId {
                id: id.clone(),
                first,
                second: index,
            }),
            None => {
                first_seen.insert(id, index);
            }
        }
    }

    let known: HashSet<&Id> = entities.iter().filter_map(|e| e.id.as_ref()).collect();
    for entity in entities {
        for id in entity.references() {
            if !known.contains(&id) {
                warnings.push(Warning::DanglingReference {
                    owner: entity.describe(),
                    id,
                });
            }
        }
    }
    warnings
}
