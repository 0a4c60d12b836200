use super::grid::{Cell, Grid};

/// Drops every occupied cell to the bottom of its column.
///
/// Columns are handled independently and keep the relative order of their
/// cells; only vertical positions change.
///
/// ```
/// use tetrablast_engine::{Grid, settle};
///
/// let grid = Grid::from_rows(&["c.", "..", "r.", ".g"])?;
/// assert_eq!(settle(&grid).to_string(), "..\n..\nc.\nrg");
/// # Ok::<(), tetrablast_engine::ParseGridError>(())
/// ```
#[must_use]
pub fn settle(grid: &Grid) -> Grid {
    let mut settled = Grid::new(grid.rows(), grid.cols());
    for x in 0..grid.cols() {
        let mut y_dst = grid.rows();
        for y in (0..grid.rows()).rev() {
            let cell = grid.cell(x, y);
            if cell != Cell::Empty {
                y_dst -= 1;
                settled.set(x, y_dst, cell);
            }
        }
    }
    settled
}
