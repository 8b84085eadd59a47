use std::cmp::Ordering;

use super::types::{GridRow, Measured, PlacedEntity};
use crate::config::{Margins, SortKey};
use crate::model::{Id, Position};

#[derive(Debug, Clone, Copy)]
pub struct GridOptions {
    /// Rows wrap before an item would reach this x.
    pub max_width: f32,
    pub sort_by: Option<SortKey>,
    pub padding: f32,
    pub margins: Margins,
    /// Left edge of every row.
    pub start_x: f32,
}

#[derive(Debug, Clone, Default)]
pub struct GridLayout {
    /// Placed items in packing order. Spacer blanks are left out.
    pub placed: Vec<PlacedEntity>,
    pub rows: Vec<GridRow>,
    /// Right edge of the content plus the right margin, or 0 when empty.
    pub width: f32,
    /// Bottom edge of the content plus the bottom margin, or 0 when empty.
    pub height: f32,
}

/// Width a canvas needs so that every item fits on some row.
pub fn required_width(items: &[Measured], start_x: f32, padding: f32) -> f32 {
    let widest = items
        .iter()
        .map(|item| item.size().width)
        .fold(0.0_f32, f32::max);
    if widest > 0.0 {
        start_x + widest + padding
    } else {
        0.0
    }
}

pub fn sort_items(items: &mut [Measured], sort_by: Option<SortKey>) {
    match sort_by {
        Some(SortKey::Height) => items.sort_by(|a, b| b.size().height.total_cmp(&a.size().height)),
        Some(SortKey::Id) => items.sort_by(|a, b| compare_ids(a.entity.id.as_ref(), b.entity.id.as_ref())),
        None => {}
    }
}

/// Integers before strings, and anything before a missing id.
fn compare_ids(a: Option<&Id>, b: Option<&Id>) -> Ordering {
    match (a, b) {
        (Some(Id::Int(a)), Some(Id::Int(b))) => a.cmp(b),
        (Some(Id::Str(a)), Some(Id::Str(b))) => a.cmp(b),
        (Some(Id::Int(_)), Some(Id::Str(_))) => Ordering::Less,
        (Some(Id::Str(_)), Some(Id::Int(_))) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Greedy left-to-right row packing. An item joins the current row when its
/// right edge plus padding stays below `max_width`, or when the row is empty.
pub fn pack_grid(mut items: Vec<Measured>, options: &GridOptions) -> GridLayout {
    sort_items(&mut items, options.sort_by);

    let mut grid = GridLayout::default();
    let mut row = GridRow {
        index: 0,
        y: options.margins.top,
        height: 0.0,
        members: Vec::new(),
    };
    let mut x = options.start_x;
    let mut right = 0.0_f32;
    let mut bottom = 0.0_f32;

    for item in items {
        let size = item.size();
        let reach = x + size.width + options.padding;
        if !row.members.is_empty() && reach >= options.max_width {
            let next = GridRow {
                index: row.index + 1,
                y: row.y + row.height + options.padding,
                height: 0.0,
                members: Vec::new(),
            };
            tracing::debug!(
                row = next.index,
                y = next.y,
                breaker = item.index,
                "starting new grid row"
            );
            grid.rows.push(std::mem::replace(&mut row, next));
            x = options.start_x;
        }

        let position = Position { x, y: row.y };
        x += size.width + options.padding;
        row.height = row.height.max(size.height);
        row.members.push(item.index);
        right = right.max(position.x + size.width);
        bottom = bottom.max(position.y + size.height);
        if !item.entity.kind.is_blank() {
            grid.placed.push(item.place(position, Some(row.index)));
        }
    }

    if !row.members.is_empty() {
        grid.rows.push(row);
        grid.width = right + options.margins.right;
        grid.height = bottom + options.margins.bottom;
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::BoxShape;
    use crate::model::Entity;
    use crate::style::StyleRecord;
    use serde_json::json;

    fn item(index: usize, entity: Entity, width: f32, height: f32) -> Measured {
        Measured {
            index,
            entity,
            style: StyleRecord::default(),
            shape: BoxShape {
                width,
                height,
                parts: Vec::new(),
            },
        }
    }

    fn int(index: usize, id: i64, width: f32, height: f32) -> Measured {
        item(index, Entity::new("int", Some(Id::Int(id)), json!(id)), width, height)
    }

    fn options(max_width: f32, sort_by: Option<SortKey>) -> GridOptions {
        GridOptions {
            max_width,
            sort_by,
            padding: 25.0,
            margins: Margins {
                top: 20.0,
                left: 20.0,
                bottom: 20.0,
                right: 20.0,
            },
            start_x: 20.0,
        }
    }

    #[test]
    fn blank_reserves_space_without_being_placed() {
        let items = vec![
            int(0, 10, 210.0, 140.0),
            item(1, Entity::blank(100.0, 200.0), 100.0, 200.0),
            item(2, Entity::new("str", Some(Id::Int(20)), json!("a")), 210.0, 140.0),
        ];
        let grid = pack_grid(items, &options(400.0, None));
        assert_eq!(grid.placed.len(), 2);
        assert_eq!(grid.placed[0].position, Position { x: 20.0, y: 20.0 });
        assert_eq!(grid.placed[1].position, Position { x: 20.0, y: 245.0 });
        assert_eq!(grid.rows.len(), 2);
        assert_eq!(grid.rows[0].members, vec![0, 1]);
        assert_eq!(grid.rows[0].height, 200.0);
        assert_eq!(grid.rows[1].members, vec![2]);
        assert_eq!(grid.placed[1].row, Some(1));
        assert_eq!(grid.height, 245.0 + 140.0 + 20.0);
    }

    #[test]
    fn height_sort_is_stable() {
        let items = vec![
            int(0, 1, 100.0, 50.0),
            int(1, 2, 100.0, 80.0),
            int(2, 3, 100.0, 50.0),
            int(3, 4, 100.0, 80.0),
        ];
        let grid = pack_grid(items, &options(10_000.0, Some(SortKey::Height)));
        let order: Vec<usize> = grid.placed.iter().map(|placed| placed.index).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn id_sort_orders_numerically() {
        let items = vec![int(0, 10, 50.0, 50.0), int(1, 9, 50.0, 50.0), int(2, 100, 50.0, 50.0)];
        let grid = pack_grid(items, &options(10_000.0, Some(SortKey::Id)));
        let order: Vec<usize> = grid.placed.iter().map(|placed| placed.index).collect();
        assert_eq!(order, vec![1, 0, 2]);
    }

    #[test]
    fn mixed_ids_sort_without_panicking() {
        let items = vec![
            item(0, Entity::new("str", Some(Id::from("b")), json!("b")), 50.0, 50.0),
            int(1, 3, 50.0, 50.0),
            item(2, Entity::new("int", None, json!(1)), 50.0, 50.0),
            item(3, Entity::new("str", Some(Id::from("a")), json!("a")), 50.0, 50.0),
        ];
        let grid = pack_grid(items, &options(10_000.0, Some(SortKey::Id)));
        assert_eq!(grid.placed.len(), 4);
    }

    #[test]
    fn rows_stay_within_max_width() {
        let items: Vec<Measured> = (0..12)
            .map(|i| int(i, i as i64, 90.0 + (i as f32 * 37.0) % 120.0, 60.0))
            .collect();
        let max_width = 600.0;
        let grid = pack_grid(items, &options(max_width, None));
        for placed in &grid.placed {
            assert!(placed.bounds().right() + 25.0 < max_width);
        }
        assert!(grid.rows.len() > 1);
    }

    #[test]
    fn oversized_item_sits_alone() {
        let items = vec![
            int(0, 1, 100.0, 50.0),
            int(1, 2, 900.0, 50.0),
            int(2, 3, 100.0, 50.0),
        ];
        let grid = pack_grid(items, &options(500.0, None));
        assert_eq!(grid.rows.len(), 3);
        assert_eq!(grid.rows[1].members, vec![1]);
        assert_eq!(grid.width, 20.0 + 900.0 + 20.0);
    }

    #[test]
    fn appending_never_shrinks_the_height() {
        let mut items: Vec<Measured> = Vec::new();
        let mut last = 0.0;
        for i in 0..15 {
            items.push(int(i, i as i64, 150.0, 200.0 - i as f32 * 5.0));
            let grid = pack_grid(items.clone(), &options(700.0, Some(SortKey::Height)));
            assert!(grid.height >= last);
            last = grid.height;
        }
    }

    #[test]
    fn empty_grid_has_no_extent() {
        let grid = pack_grid(Vec::new(), &options(500.0, None));
        assert!(grid.placed.is_empty());
        assert!(grid.rows.is_empty());
        assert_eq!((grid.width, grid.height), (0.0, 0.0));
    }

    #[test]
    fn required_width_covers_the_widest_item() {
        let items = vec![int(0, 1, 100.0, 50.0), int(1, 2, 420.0, 50.0)];
        assert_eq!(required_width(&items, 20.0, 25.0), 465.0);
        assert_eq!(required_width(&[], 20.0, 25.0), 0.0);
    }
}
