use std::{collections::HashSet, iter};

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};
use tetrablast_engine::{Grid, Piece};

use crate::ui::widgets::CellDisplay;

/// The grid with the falling piece and its landing position drawn over it.
#[derive(Debug)]
pub struct GridDisplay<'a> {
    grid: &'a Grid,
    ghost: Option<Piece>,
    falling_piece: Option<Piece>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> GridDisplay<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Self {
            grid,
            ghost: None,
            falling_piece: None,
            block: None,
        }
    }

    pub fn ghost(self, piece: Option<Piece>) -> Self {
        Self {
            ghost: piece,
            ..self
        }
    }

    pub fn falling_piece(self, piece: Option<Piece>) -> Self {
        Self {
            falling_piece: piece,
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        cells_len(self.grid.cols()) * CellDisplay::width()
            + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        cells_len(self.grid.rows()) * CellDisplay::height()
            + super::block_vertical_margin(self.block.as_ref())
    }
}

fn cells_len(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

impl Widget for GridDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &GridDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let grid = match &self.falling_piece {
            Some(piece) => self.grid.placed(piece),
            None => self.grid.clone(),
        };
        let ghost_cells: HashSet<(i32, i32)> = self
            .ghost
            .iter()
            .flat_map(Piece::occupied_positions)
            .collect();

        let col_constraints =
            (0..grid.cols()).map(|_| Constraint::Length(CellDisplay::width()));
        let row_constraints =
            (0..grid.rows()).map(|_| Constraint::Length(CellDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let row_areas = vertical.split(area);
        for ((y, row_area), row) in iter::zip(row_areas.iter().enumerate(), grid.iter_rows()) {
            let cell_areas = horizontal.split(*row_area);
            for ((x, cell_area), cell) in iter::zip(cell_areas.iter().enumerate(), row) {
                let is_ghost = cell.is_empty()
                    && i32::try_from(x)
                        .ok()
                        .zip(i32::try_from(y).ok())
                        .is_some_and(|pos| ghost_cells.contains(&pos));
                let display = if is_ghost {
                    CellDisplay::ghost()
                } else {
                    CellDisplay::from_cell(*cell)
                };
                display.render(*cell_area, buf);
            }
        }
    }
}
