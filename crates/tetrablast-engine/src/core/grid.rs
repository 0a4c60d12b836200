use std::fmt;

use serde::{Deserialize, Serialize};

use super::piece::Piece;

/// Color of an occupied cell. One tag per piece kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorTag {
    Cyan,
    Yellow,
    Purple,
    Green,
    Red,
    Blue,
    Orange,
}

impl ColorTag {
    pub const ALL: [Self; 7] = [
        ColorTag::Cyan,
        ColorTag::Yellow,
        ColorTag::Purple,
        ColorTag::Green,
        ColorTag::Red,
        ColorTag::Blue,
        ColorTag::Orange,
    ];

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            ColorTag::Cyan => 'c',
            ColorTag::Yellow => 'y',
            ColorTag::Purple => 'p',
            ColorTag::Green => 'g',
            ColorTag::Red => 'r',
            ColorTag::Blue => 'b',
            ColorTag::Orange => 'o',
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'c' => Some(ColorTag::Cyan),
            'y' => Some(ColorTag::Yellow),
            'p' => Some(ColorTag::Purple),
            'g' => Some(ColorTag::Green),
            'r' => Some(ColorTag::Red),
            'b' => Some(ColorTag::Blue),
            'o' => Some(ColorTag::Orange),
            _ => None,
        }
    }
}

/// A single grid cell.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_more::IsVariant,
)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(ColorTag),
}

impl Cell {
    #[must_use]
    pub const fn color(self) -> Option<ColorTag> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(color) => Some(color),
        }
    }

    /// Character used by [`Grid`]'s text form: `.` for empty, the color letter
    /// otherwise.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Occupied(color) => color.as_char(),
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        if c == '.' {
            return Some(Cell::Empty);
        }
        match ColorTag::from_char(c) {
            Some(color) => Some(Cell::Occupied(color)),
            None => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseGridError {
    #[display("grid has no rows")]
    NoRows,
    #[display("grid row {row} is empty")]
    EmptyRow { row: usize },
    #[display("grid row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[display("invalid cell {ch:?} at row {row}, column {col}")]
    InvalidCell { row: usize, col: usize, ch: char },
}

/// The play field: a `rows × cols` matrix of [`Cell`]s.
///
/// Coordinates are `(x, y)` with `x` the column (left to right) and `y` the
/// row (top to bottom). Dimensions are fixed at creation; every operator
/// below returns a new grid of the same size.
///
/// # Example
///
/// ```
/// use tetrablast_engine::{Cell, ColorTag, Grid};
///
/// let grid = Grid::from_rows(&[
///     "...",
///     "c.c",
///     "ccc",
/// ])?;
/// assert_eq!(grid.rows(), 3);
/// assert_eq!(grid.cell(0, 2), Cell::Occupied(ColorTag::Cyan));
///
/// let (cleared, count) = grid.cleared_rows();
/// assert_eq!(count, 1);
/// assert_eq!(cleared.to_string(), "...\n...\nc.c");
/// # Ok::<(), tetrablast_engine::ParseGridError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates an empty grid.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "grid must be at least 1x1");
        Self {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
        }
    }

    /// Parses the text form: one string per row, `.` for empty and a color
    /// letter (`c y p g r b o`) for occupied cells.
    pub fn from_rows<S>(rows: &[S]) -> Result<Self, ParseGridError>
    where
        S: AsRef<str>,
    {
        let Some(first) = rows.first() else {
            return Err(ParseGridError::NoRows);
        };
        let cols = first.as_ref().chars().count();
        if cols == 0 {
            return Err(ParseGridError::EmptyRow { row: 0 });
        }

        let mut cells = Vec::with_capacity(rows.len() * cols);
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != cols {
                return Err(ParseGridError::RaggedRow {
                    row: y,
                    expected: cols,
                    found,
                });
            }
            for (x, ch) in row.chars().enumerate() {
                let cell =
                    Cell::from_char(ch).ok_or(ParseGridError::InvalidCell { row: y, col: x, ch })?;
                cells.push(cell);
            }
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            cells,
        })
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.cols && y < self.rows).then(|| y * self.cols + x)
    }

    /// Signed lookup; `None` outside the grid.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        self.index(x, y).map(|i| self.cells[i])
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        let i = self
            .index(x, y)
            .unwrap_or_else(|| self.out_of_bounds(x, y));
        self.cells[i]
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid.
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        let i = self
            .index(x, y)
            .unwrap_or_else(|| self.out_of_bounds(x, y));
        self.cells[i] = cell;
    }

    /// Builder form of [`Self::set`].
    #[must_use]
    pub fn with_cell(mut self, x: usize, y: usize, cell: Cell) -> Self {
        self.set(x, y, cell);
        self
    }

    fn out_of_bounds(&self, x: usize, y: usize) -> ! {
        panic!(
            "cell ({x}, {y}) out of bounds for {}x{} grid",
            self.cols, self.rows
        )
    }

    /// # Panics
    ///
    /// Panics if `y` is outside the grid.
    #[must_use]
    pub fn row(&self, y: usize) -> &[Cell] {
        assert!(y < self.rows, "row {y} out of bounds for {} rows", self.rows);
        &self.cells[y * self.cols..][..self.cols]
    }

    pub fn iter_rows(&self) -> impl ExactSizeIterator<Item = &[Cell]> {
        self.cells.chunks_exact(self.cols)
    }

    #[must_use]
    pub fn is_row_full(&self, y: usize) -> bool {
        self.row(y).iter().all(|c| c.is_occupied())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_occupied()).count()
    }

    /// Returns `true` if `piece` would leave `[0, cols)` horizontally, fall
    /// past the bottom row, or overlap an occupied cell.
    ///
    /// Cells above the top (`y < 0`) are only checked horizontally, so a
    /// piece may sit partially above the field.
    #[must_use]
    pub fn is_colliding(&self, piece: &Piece) -> bool {
        piece.occupied_positions().any(|(x, y)| {
            let Ok(ux) = usize::try_from(x) else {
                return true;
            };
            if ux >= self.cols {
                return true;
            }
            let Ok(uy) = usize::try_from(y) else {
                return false;
            };
            uy >= self.rows || self.cell(ux, uy).is_occupied()
        })
    }

    /// Merges `piece` into a copy of the grid with the piece's color.
    ///
    /// Cells above the top row are dropped. No collision check is performed.
    #[must_use]
    pub fn placed(&self, piece: &Piece) -> Self {
        let mut grid = self.clone();
        let cell = Cell::Occupied(piece.color());
        for (x, y) in piece.occupied_positions() {
            if let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y))
                && let Some(i) = grid.index(x, y)
            {
                grid.cells[i] = cell;
            }
        }
        grid
    }

    /// Removes every full row, shifts the rest down and refills the top with
    /// empty rows. Returns the new grid and the number of removed rows.
    #[must_use]
    pub fn cleared_rows(&self) -> (Self, usize) {
        let kept = self
            .iter_rows()
            .filter(|row| !row.iter().all(|c| c.is_occupied()))
            .collect::<Vec<_>>();
        let cleared = self.rows - kept.len();

        let mut cells = vec![Cell::Empty; cleared * self.cols];
        for row in kept {
            cells.extend_from_slice(row);
        }

        let grid = Self {
            rows: self.rows,
            cols: self.cols,
            cells,
        };
        (grid, cleared)
    }

    /// Text form of each row, top to bottom.
    pub fn row_strings(&self) -> impl Iterator<Item = String> + '_ {
        self.iter_rows()
            .map(|row| row.iter().map(|c| c.as_char()).collect())
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.row_strings().enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            f.write_str(&row)?;
        }
        Ok(())
    }
}

impl TryFrom<Vec<String>> for Grid {
    type Error = ParseGridError;

    fn try_from(rows: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_rows(&rows)
    }
}

impl From<Grid> for Vec<String> {
    fn from(grid: Grid) -> Self {
        grid.row_strings().collect()
    }
}
