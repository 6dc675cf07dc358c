//! Row-major grid placement of table boxes on the diagram canvas.

use serde::{Deserialize, Serialize};

use crate::models::structs::Position;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutDimensions {
    pub table_width: f32,
    pub table_height: f32,
    pub padding: f32,
}

impl Default for LayoutDimensions {
    fn default() -> Self {
        Self {
            table_width: 180.0,
            table_height: 120.0,
            padding: 40.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TablePosition {
    pub table: String,
    pub row: usize,
    pub col: usize,
    pub pos: Position,
}

/// Table name → position, in table-list order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TableLayout {
    pub columns_per_row: usize,
    pub positions: Vec<TablePosition>,
}

impl TableLayout {
    pub fn get(&self, table: &str) -> Option<Position> {
        self.positions.iter().find(|p| p.table == table).map(|p| p.pos)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Lower-right corner of the occupied area, padding included.
    pub fn extent(&self, dims: &LayoutDimensions) -> (f32, f32) {
        self.positions.iter().fold((0.0, 0.0), |(w, h), p| {
            (
                w.max(p.pos.x + dims.table_width + dims.padding),
                h.max(p.pos.y + dims.table_height + dims.padding),
            )
        })
    }
}

pub fn columns_per_row(canvas_width: f32, dims: &LayoutDimensions) -> usize {
    let cell = dims.table_width + dims.padding;
    if !(canvas_width.is_finite() && cell > 0.0) {
        return 1;
    }
    ((canvas_width / cell).floor() as usize).max(1)
}

pub fn compute_layout(
    tables: &[String],
    canvas_width: f32,
    dims: &LayoutDimensions,
) -> TableLayout {
    let per_row = columns_per_row(canvas_width, dims);
    let positions = tables
        .iter()
        .enumerate()
        .map(|(i, table)| {
            let col = i % per_row;
            let row = i / per_row;
            TablePosition {
                table: table.clone(),
                row,
                col,
                pos: Position {
                    x: dims.padding + col as f32 * (dims.table_width + dims.padding),
                    y: dims.padding + row as f32 * (dims.table_height + dims.padding),
                },
            }
        })
        .collect();
    TableLayout {
        columns_per_row: per_row,
        positions,
    }
}
