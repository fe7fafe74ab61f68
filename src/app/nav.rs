// src/app/nav.rs
// Scroll/selection state over the tile matrix.
//
// The screen shows a 5×4 window (plus a trailing half column). The selection
// moves inside that window; pushing past an edge scrolls the selected row
// (horizontally) or the whole grid (vertically) by one instead.

use crate::app::types::{Direction, SharedCatalog, Tile, TileId};

pub const VISIBLE_ROWS: usize = 4;
pub const VISIBLE_COLUMNS: usize = 5;
/// Full columns plus the trailing half column.
pub const DRAWN_COLUMNS: usize = VISIBLE_COLUMNS + 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridPosition {
    /// Topmost visible row.
    pub row_offset: usize,
    /// Row within the visible window.
    pub selection_row: usize,
    /// Column within the visible window.
    pub selection_column: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionChanged {
    pub previous: TileId,
    pub current: TileId,
}

/// One on-screen slot and the tile it shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibleCell {
    pub screen_row: usize,
    pub screen_column: usize,
    pub tile: TileId,
    pub selected: bool,
}

pub struct GridNavigator {
    catalog: SharedCatalog,
    column_offsets: Vec<usize>,
    pos: GridPosition,
}

impl GridNavigator {
    pub fn new(catalog: SharedCatalog) -> Self {
        let column_offsets = vec![0; catalog.row_count()];
        Self {
            catalog,
            column_offsets,
            pos: GridPosition::default(),
        }
    }

    pub fn catalog(&self) -> &SharedCatalog {
        &self.catalog
    }

    pub const fn position(&self) -> GridPosition {
        self.pos
    }

    pub fn column_offset(&self, row: usize) -> usize {
        self.column_offsets.get(row).copied().unwrap_or(0)
    }

    /// Absolute id of the selected tile.
    pub fn selected(&self) -> TileId {
        let row = self.pos.row_offset + self.pos.selection_row;
        TileId::new(row, self.pos.selection_column + self.column_offset(row))
    }

    pub fn selected_tile(&self) -> Option<&Tile> {
        self.catalog.tile(self.selected())
    }

    /// Apply one press (or repeat) and report whether the selected tile changed.
    pub fn handle_direction(&mut self, direction: Direction) -> Option<SelectionChanged> {
        if self.catalog.row_count() == 0 {
            return None;
        }
        let previous = self.selected();

        match direction {
            Direction::Right => {
                let row = previous.row;
                if self.pos.selection_column < self.max_selection_column(row) {
                    self.pos.selection_column += 1;
                } else if self.pos.selection_column == VISIBLE_COLUMNS - 1 {
                    let max = self.max_column_offset(row);
                    let off = &mut self.column_offsets[row];
                    *off = (*off + 1).min(max);
                }
            }
            Direction::Left => {
                let row = previous.row;
                if self.pos.selection_column > 0 {
                    self.pos.selection_column -= 1;
                } else {
                    let off = &mut self.column_offsets[row];
                    *off = off.saturating_sub(1);
                }
            }
            Direction::Down => {
                if self.pos.selection_row < self.max_selection_row() {
                    self.pos.selection_row += 1;
                } else if self.pos.selection_row == VISIBLE_ROWS - 1 {
                    self.pos.row_offset = (self.pos.row_offset + 1).min(self.max_row_offset());
                }
                self.clamp_column_to_row();
            }
            Direction::Up => {
                if self.pos.selection_row > 0 {
                    self.pos.selection_row -= 1;
                } else {
                    self.pos.row_offset = self.pos.row_offset.saturating_sub(1);
                }
                self.clamp_column_to_row();
            }
        }

        let current = self.selected();
        (current != previous).then_some(SelectionChanged { previous, current })
    }

    /// Every drawn slot, top-left first, including the trailing half column where a tile exists.
    pub fn visible_cells(&self) -> Vec<VisibleCell> {
        let selected = self.selected();
        let rows = self.catalog.row_count().min(VISIBLE_ROWS);
        let mut out = Vec::with_capacity(rows * DRAWN_COLUMNS);
        for screen_row in 0..rows {
            let row = self.pos.row_offset + screen_row;
            let offset = self.column_offset(row);
            let len = self.catalog.row_len(row);
            for screen_column in 0..DRAWN_COLUMNS {
                let column = offset + screen_column;
                if column >= len {
                    break;
                }
                let tile = TileId::new(row, column);
                out.push(VisibleCell {
                    screen_row,
                    screen_column,
                    tile,
                    selected: tile == selected,
                });
            }
        }
        out
    }

    /// Absolute indices of the rows currently on screen.
    pub fn visible_rows(&self) -> std::ops::Range<usize> {
        let start = self.pos.row_offset;
        start..(start + VISIBLE_ROWS).min(self.catalog.row_count())
    }

    // ---- clamps ----
    fn max_row_offset(&self) -> usize {
        self.catalog.row_count().saturating_sub(VISIBLE_ROWS)
    }

    fn max_column_offset(&self, row: usize) -> usize {
        self.catalog.row_len(row).saturating_sub(VISIBLE_COLUMNS)
    }

    fn max_selection_row(&self) -> usize {
        self.catalog.row_count().min(VISIBLE_ROWS).saturating_sub(1)
    }

    fn max_selection_column(&self, row: usize) -> usize {
        self.catalog
            .row_len(row)
            .min(VISIBLE_COLUMNS)
            .saturating_sub(1)
    }

    /// A vertical move may land on a row shorter than the current column.
    fn clamp_column_to_row(&mut self) {
        let row = self.pos.row_offset + self.pos.selection_row;
        self.pos.selection_column = self.pos.selection_column.min(self.max_selection_column(row));
    }
}
