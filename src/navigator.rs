//! Shortest-step planning on the circular band/channel grid.
//!
//! The selector is a two-axis stepper on a torus: both the band (column)
//! and channel (row) axes wrap around. Changing band mechanically re-homes
//! the channel axis to the first channel, so whenever the column changes
//! the row distance is measured from row 0, not from the current row.
//!
//! Planning is pure: same inputs, same sequence, no I/O.

use crate::grid::Cell;

/// Step axis on the selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Band axis (columns)
    Column,
    /// Channel axis (rows)
    Row,
}

/// Step direction along an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// One discrete step instruction for the selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub axis: Axis,
    pub direction: Direction,
}

impl Command {
    pub const fn new(axis: Axis, direction: Direction) -> Self {
        Command { axis, direction }
    }

    /// Physical effect of this step on a selector position.
    ///
    /// A column step lands on row 0 of the neighbouring column because the
    /// hardware re-homes the channel axis when the band changes; a row step
    /// wraps within the current column.
    pub fn apply(self, cell: Cell, rows: usize, columns: usize) -> Cell {
        match (self.axis, self.direction) {
            (Axis::Column, Direction::Forward) => Cell {
                row: 0,
                col: (cell.col + 1) % columns,
            },
            (Axis::Column, Direction::Backward) => Cell {
                row: 0,
                col: (cell.col + columns - 1) % columns,
            },
            (Axis::Row, Direction::Forward) => Cell {
                row: (cell.row + 1) % rows,
                col: cell.col,
            },
            (Axis::Row, Direction::Backward) => Cell {
                row: (cell.row + rows - 1) % rows,
                col: cell.col,
            },
        }
    }
}

/// Shortest wrap-around distance from `from` to `to` on an axis of `len`
/// positions, with the direction that achieves it. Ties prefer forward.
fn shortest(from: usize, to: usize, len: usize) -> (usize, Direction) {
    let forward = (to + len - from) % len;
    if forward == 0 {
        return (0, Direction::Forward);
    }
    let backward = len - forward;
    if backward < forward {
        (backward, Direction::Backward)
    } else {
        (forward, Direction::Forward)
    }
}

/// Compute the step sequence moving the selector from `current` to `target`.
///
/// Column steps are emitted first (the device must sit on the target band
/// before channel stepping), then row steps from the effective starting
/// row: 0 if the column changed, the current row otherwise. Inputs are
/// assumed in range; validation happens at the API boundary.
pub fn plan(current: Cell, target: Cell, rows: usize, columns: usize) -> Vec<Command> {
    let (col_steps, col_dir) = shortest(current.col, target.col, columns);
    let start_row = if current.col == target.col {
        current.row
    } else {
        0
    };
    let (row_steps, row_dir) = shortest(start_row, target.row, rows);

    let mut commands = Vec::with_capacity(col_steps + row_steps);
    commands.extend(std::iter::repeat(Command::new(Axis::Column, col_dir)).take(col_steps));
    commands.extend(std::iter::repeat(Command::new(Axis::Row, row_dir)).take(row_steps));
    commands
}
