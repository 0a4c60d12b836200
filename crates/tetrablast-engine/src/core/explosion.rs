use arrayvec::ArrayVec;

use super::grid::{Cell, ColorTag, Grid};

/// Minimum size of a connected same-color group that explodes.
pub const EXPLOSION_THRESHOLD: usize = 3;

/// A 4-connected set of cells sharing one color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplosionGroup {
    color: ColorTag,
    cells: Vec<(usize, usize)>,
}

impl ExplosionGroup {
    #[must_use]
    pub const fn color(&self) -> ColorTag {
        self.color
    }

    /// Member cells as `(x, y)`, in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[(usize, usize)] {
        &self.cells
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

fn neighbors(grid: &Grid, x: usize, y: usize) -> ArrayVec<(usize, usize), 4> {
    let mut out = ArrayVec::new();
    if y > 0 {
        out.push((x, y - 1));
    }
    if y + 1 < grid.rows() {
        out.push((x, y + 1));
    }
    if x > 0 {
        out.push((x - 1, y));
    }
    if x + 1 < grid.cols() {
        out.push((x + 1, y));
    }
    out
}

/// Finds every explodable group in `grid`.
///
/// Cells are scanned row-major; each unvisited occupied cell seeds a
/// 4-directional flood fill over cells of the same color. Connected sets of
/// at least [`EXPLOSION_THRESHOLD`] cells are returned in the order their
/// seed cell was reached. The groups are pairwise disjoint.
///
/// # Example
///
/// ```
/// use tetrablast_engine::{Grid, find_explosions};
///
/// let grid = Grid::from_rows(&["ccc", "..r", "..r"])?;
/// let groups = find_explosions(&grid);
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].cells(), &[(0, 0), (1, 0), (2, 0)]);
/// # Ok::<(), tetrablast_engine::ParseGridError>(())
/// ```
#[must_use]
pub fn find_explosions(grid: &Grid) -> Vec<ExplosionGroup> {
    let cols = grid.cols();
    let mut visited = vec![false; grid.rows() * cols];
    let mut groups = vec![];
    let mut stack = vec![];

    for y in 0..grid.rows() {
        for x in 0..cols {
            if visited[y * cols + x] {
                continue;
            }
            let Cell::Occupied(color) = grid.cell(x, y) else {
                continue;
            };

            let mut component = vec![];
            visited[y * cols + x] = true;
            stack.push((x, y));
            while let Some((cx, cy)) = stack.pop() {
                component.push((cx, cy));
                for (nx, ny) in neighbors(grid, cx, cy) {
                    if !visited[ny * cols + nx] && grid.cell(nx, ny) == Cell::Occupied(color) {
                        visited[ny * cols + nx] = true;
                        stack.push((nx, ny));
                    }
                }
            }

            if component.len() >= EXPLOSION_THRESHOLD {
                component.sort_unstable_by_key(|&(x, y)| (y, x));
                groups.push(ExplosionGroup {
                    color,
                    cells: component,
                });
            }
        }
    }

    groups
}

/// Returns a copy of `grid` with every cell of every group emptied.
#[must_use]
pub fn apply_explosion(grid: &Grid, groups: &[ExplosionGroup]) -> Grid {
    let mut grid = grid.clone();
    for &(x, y) in groups.iter().flat_map(|g| &g.cells) {
        grid.set(x, y, Cell::Empty);
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> Grid {
        Grid::from_rows(rows).unwrap()
    }

    #[test]
    fn test_three_in_a_row_explodes() {
        let g = grid(&["ccc.", "....", "...."]);
        let groups = find_explosions(&g);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].color(), ColorTag::Cyan);
        assert_eq!(groups[0].len(), 3);
        assert!(apply_explosion(&g, &groups).is_empty());
    }

    #[test]
    fn test_pairs_do_not_explode() {
        let g = grid(&["cc.r", "...r", "gg.."]);
        assert!(find_explosions(&g).is_empty());
    }

    #[test]
    fn test_diagonals_are_not_connected() {
        let g = grid(&["c...", ".c..", "..c."]);
        assert!(find_explosions(&g).is_empty());
    }

    #[test]
    fn test_different_colors_are_not_connected() {
        let g = grid(&["ccr", "rr.", "..."]);
        assert!(find_explosions(&g).is_empty());
    }

    #[test]
    fn test_l_shaped_group_and_scan_order() {
        let g = grid(&[
            "....y", //
            "b...y", //
            "bb..y", //
            "rrrgg",
        ]);
        let groups = find_explosions(&g);
        let summary: Vec<_> = groups.iter().map(|g| (g.color(), g.len())).collect();
        assert_eq!(
            summary,
            vec![
                (ColorTag::Yellow, 3),
                (ColorTag::Blue, 3),
                (ColorTag::Red, 3)
            ]
        );
        assert_eq!(groups[1].cells(), &[(0, 1), (0, 2), (1, 2)]);

        let after = apply_explosion(&g, &groups);
        assert_eq!(after.to_string(), ".....\n.....\n.....\n...gg");
    }

    #[test]
    fn test_large_snake_is_one_group() {
        let g = grid(&["ooooo", "....o", "ooooo", "o....", "ooooo"]);
        let groups = find_explosions(&g);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 17);
    }

    #[test]
    fn test_empty_grid_has_no_groups() {
        assert!(find_explosions(&Grid::new(20, 10)).is_empty());
    }
}
