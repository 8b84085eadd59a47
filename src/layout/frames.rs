use super::types::{Measured, PlacedEntity};
use crate::config::Margins;
use crate::model::Position;

#[derive(Debug, Clone, Default)]
pub struct FrameColumn {
    pub placed: Vec<PlacedEntity>,
    /// Bottom edge of the last frame.
    pub required_height: f32,
    /// Right edge of the widest frame; the grid starts past it.
    pub required_width: f32,
}

/// Stacks frames top to bottom at the left margin. Blank frames take up
/// their space in the column but are not placed.
pub fn layout_frames(frames: Vec<Measured>, margins: &Margins) -> FrameColumn {
    let mut column = FrameColumn {
        placed: Vec::with_capacity(frames.len()),
        required_height: margins.top,
        required_width: 0.0,
    };
    let mut widest = 0.0_f32;
    for frame in frames {
        let size = frame.size();
        let position = Position {
            x: margins.left,
            y: column.required_height,
        };
        column.required_height += size.height;
        widest = widest.max(size.width);
        if !frame.entity.kind.is_blank() {
            column.placed.push(frame.place(position, None));
        }
    }
    if widest > 0.0 {
        column.required_width = widest + margins.left;
    }
    column
}
