use crate::error::Warning;
use crate::model::{Entity, Position, Size};
use crate::style::{BoxRole, StyleRecord, TextRole};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_svg(&self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// A label; `y` is the vertical centre of the text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub anchor: TextAnchor,
    pub role: TextRole,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Rect { rect: Rect, role: BoxRole },
    Text(TextSpan),
}

impl Part {
    fn translated(&self, dx: f32, dy: f32) -> Self {
        match self {
            Part::Rect { rect, role } => Part::Rect {
                rect: Rect::new(rect.x + dx, rect.y + dy, rect.width, rect.height),
                role: *role,
            },
            Part::Text(span) => Part::Text(TextSpan {
                x: span.x + dx,
                y: span.y + dy,
                ..span.clone()
            }),
        }
    }
}

/// Everything drawn for one entity, relative to its top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxShape {
    pub width: f32,
    pub height: f32,
    pub parts: Vec<Part>,
}

impl BoxShape {
    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    /// Wraps the shape in an outer outline `sep` away on every side.
    pub(crate) fn double_boxed(self, sep: f32) -> Self {
        let width = self.width + 2.0 * sep;
        let height = self.height + 2.0 * sep;
        let mut parts = Vec::with_capacity(self.parts.len() + 1);
        parts.push(Part::Rect {
            rect: Rect::new(0.0, 0.0, width, height),
            role: BoxRole::Container,
        });
        parts.extend(self.parts.iter().map(|part| part.translated(sep, sep)));
        Self {
            width,
            height,
            parts,
        }
    }

    /// Parts moved to absolute canvas coordinates.
    pub fn placed_parts(&self, at: Position) -> impl Iterator<Item = Part> + '_ {
        self.parts.iter().map(move |part| part.translated(at.x, at.y))
    }
}

/// An entity with its style resolved and its shape measured, not yet placed.
#[derive(Debug, Clone)]
pub struct Measured {
    /// Position of the entity in the input batch.
    pub index: usize,
    pub entity: Entity,
    pub style: StyleRecord,
    pub shape: BoxShape,
}

impl Measured {
    pub fn size(&self) -> Size {
        self.shape.size()
    }

    pub(crate) fn place(self, position: Position, row: Option<usize>) -> PlacedEntity {
        PlacedEntity {
            index: self.index,
            entity: self.entity,
            style: self.style,
            shape: self.shape,
            position,
            row,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlacedEntity {
    pub index: usize,
    pub entity: Entity,
    pub style: StyleRecord,
    pub shape: BoxShape,
    pub position: Position,
    /// Grid row, for entities placed by the packer.
    pub row: Option<usize>,
}

impl PlacedEntity {
    pub fn size(&self) -> Size {
        self.shape.size()
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.shape.width,
            self.shape.height,
        )
    }

    /// The input entity with its final position and size filled in.
    pub fn to_entity(&self) -> Entity {
        let mut entity = self.entity.clone();
        entity.position = Some(self.position);
        entity.size.width = Some(self.shape.width);
        entity.size.height = Some(self.shape.height);
        entity
    }
}

/// One row of the object grid. The first member is the row-breaker.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub index: usize,
    pub y: f32,
    /// Tallest member; the next row starts `height + padding` below `y`.
    pub height: f32,
    /// Input indexes of the members, spacer blanks included.
    pub members: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    /// Width the grid was packed against.
    pub max_width: f32,
    pub frames: Vec<PlacedEntity>,
    /// Grid and pinned entities, in input order.
    pub objects: Vec<PlacedEntity>,
    pub rows: Vec<GridRow>,
    pub warnings: Vec<Warning>,
}

impl Layout {
    /// Draw order: the frame column top to bottom, then everything else.
    pub fn entities(&self) -> impl Iterator<Item = &PlacedEntity> {
        self.frames.iter().chain(self.objects.iter())
    }

    pub fn find(&self, id: &crate::model::Id) -> Option<&PlacedEntity> {
        self.entities()
            .find(|placed| placed.entity.id.as_ref() == Some(id))
    }
}
