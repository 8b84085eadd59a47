mod frames;
mod grid;
mod measure;
mod partition;
pub(crate) mod text;
pub(crate) mod types;
pub use frames::{FrameColumn, layout_frames};
pub use grid::{GridLayout, GridOptions, pack_grid, required_width, sort_items};
pub use measure::{build_shape, measure};
pub use partition::{Partition, Slot, partition, validate_ids};
pub use text::{FontHints, SystemMetrics, TableMetrics, TextMeasure};
pub use types::*;

use crate::config::{BoxMetrics, LayoutConfig};
use crate::error::{LayoutError, Warning};
use crate::model::Entity;
use crate::style::{Presets, resolve_entity_style};
use crate::theme::Theme;

/// Lays out one batch: frames down the left column, everything else packed
/// into rows to its right, pinned entities where they asked to be.
pub fn compute_layout(
    entities: &[Entity],
    theme: &Theme,
    presets: &Presets,
    config: &LayoutConfig,
) -> Result<Layout, LayoutError> {
    if config.fast_text_metrics {
        compute_layout_with(entities, theme, presets, config, &TableMetrics)
    } else {
        compute_layout_with(entities, theme, presets, config, &SystemMetrics)
    }
}

pub fn compute_layout_with(
    entities: &[Entity],
    theme: &Theme,
    presets: &Presets,
    config: &LayoutConfig,
    text: &dyn TextMeasure,
) -> Result<Layout, LayoutError> {
    let margins = config.margins();
    let mut warnings = validate_ids(entities);
    let Partition {
        frames,
        others,
        pinned,
        warnings: dropped,
    } = partition(entities);
    warnings.extend(dropped);

    // Every style and shape is resolved up front so fatal errors surface
    // before anything is placed.
    let prepare_all = |slots: Vec<Slot<'_>>| -> Result<Vec<Measured>, LayoutError> {
        slots
            .into_iter()
            .map(|slot| prepare(slot, theme, presets, text, &config.metrics))
            .collect()
    };
    let frames = prepare_all(frames)?;
    let others = prepare_all(others)?;
    let pinned = prepare_all(pinned)?;

    let has_frames = !frames.is_empty();
    let column = layout_frames(frames, &margins);
    let start_x = match config.grid_start_x {
        Some(x) => x,
        None if has_frames => column.required_width + config.padding,
        None => margins.left,
    };

    let column_width = if has_frames {
        column.required_width + margins.right
    } else {
        0.0
    };
    // Items pack against the caller's width; oversized ones sit alone on a
    // row and only widen the canvas.
    let max_width = config.width.unwrap_or(config.default_width);
    let needed = column_width.max(required_width(&others, start_x, config.padding));
    if needed > max_width {
        match config.width {
            Some(requested) => warnings.push(Warning::WidthOverridden {
                requested,
                required: needed,
            }),
            None => tracing::debug!(
                default = config.default_width,
                required = needed,
                "canvas grows past the default width"
            ),
        }
    }

    let grid = pack_grid(
        others,
        &GridOptions {
            max_width,
            sort_by: config.sort_by,
            padding: config.padding,
            margins,
            start_x,
        },
    );

    let mut width = grid.width;
    let mut height = grid.height;
    if has_frames {
        width = width.max(column_width);
        height = height.max(column.required_height + margins.bottom);
    }

    let mut objects = grid.placed;
    for item in pinned {
        let Some(position) = item.entity.position else {
            continue;
        };
        let size = item.size();
        width = width.max(position.x + size.width + margins.right);
        height = height.max(position.y + size.height + margins.bottom);
        if !item.entity.kind.is_blank() {
            objects.push(item.place(position, None));
        }
    }
    objects.sort_by_key(|placed| placed.index);

    if config.width.is_some() {
        width = width.max(max_width);
    }
    if width <= 0.0 {
        width = margins.left + margins.right;
    }
    if height <= 0.0 {
        height = margins.top + margins.bottom;
    }

    Ok(Layout {
        width,
        height,
        max_width,
        frames: column.placed,
        objects,
        rows: grid.rows,
        warnings: warnings.into_iter().map(Warning::emit).collect(),
    })
}

fn prepare(
    slot: Slot<'_>,
    theme: &Theme,
    presets: &Presets,
    text: &dyn TextMeasure,
    metrics: &BoxMetrics,
) -> Result<Measured, LayoutError> {
    let entity = slot.entity;
    let style = resolve_entity_style(&entity.kind, entity.style.as_ref(), theme, presets)?;
    let shape = build_shape(entity, &style, text, metrics)?;
    Ok(Measured {
        index: slot.index,
        entity: entity.clone(),
        style,
        shape,
    })
}
