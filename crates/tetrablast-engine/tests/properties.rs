//! Property tests for the grid operators, the explosion engine, and the game
//! state machine.

use std::collections::HashSet;

use proptest::prelude::*;
use tetrablast_engine::{
    Cell, ChainTrigger, ColorTag, Direction, EXPLOSION_THRESHOLD, GameState, Grid, Piece,
    PieceKind, PiecePosition, PieceSeed, apply_explosion, find_explosions, run_chain, settle,
};

fn arb_grid(max_rows: usize, max_cols: usize, fill: f64) -> impl Strategy<Value = Grid> {
    (1..=max_rows, 1..=max_cols).prop_flat_map(move |(rows, cols)| {
        prop::collection::vec(prop::option::weighted(fill, 0..ColorTag::ALL.len()), rows * cols)
            .prop_map(move |cells| {
                let mut grid = Grid::new(rows, cols);
                for (i, color) in cells.into_iter().enumerate() {
                    if let Some(color) = color {
                        grid.set(i % cols, i / cols, Cell::Occupied(ColorTag::ALL[color]));
                    }
                }
                grid
            })
    })
}

fn arb_kind() -> impl Strategy<Value = PieceKind> {
    prop::sample::select(PieceKind::ALL.to_vec())
}

fn arb_piece() -> impl Strategy<Value = Piece> {
    (arb_kind(), 0..4usize, -6..16i32, -6..16i32).prop_map(|(kind, rotation, x, y)| {
        Piece::new(kind, PiecePosition::new(x, y)).with_rotation(rotation)
    })
}

fn column(grid: &Grid, x: usize) -> Vec<Cell> {
    (0..grid.rows()).map(|y| grid.cell(x, y)).collect()
}

fn is_connected(cells: &[(usize, usize)]) -> bool {
    let set: HashSet<_> = cells.iter().copied().collect();
    let mut seen = HashSet::new();
    let mut stack = vec![cells[0]];
    seen.insert(cells[0]);
    while let Some((x, y)) = stack.pop() {
        let neighbors = [
            (x.wrapping_sub(1), y),
            (x + 1, y),
            (x, y.wrapping_sub(1)),
            (x, y + 1),
        ];
        for n in neighbors {
            if set.contains(&n) && seen.insert(n) {
                stack.push(n);
            }
        }
    }
    seen.len() == set.len()
}

proptest! {
    #[test]
    fn out_of_bounds_pieces_always_collide(grid in arb_grid(12, 10, 0.3), piece in arb_piece()) {
        let cols = i32::try_from(grid.cols()).unwrap();
        let rows = i32::try_from(grid.rows()).unwrap();
        let outside = piece
            .occupied_positions()
            .any(|(x, y)| x < 0 || x >= cols || y >= rows);
        if outside {
            prop_assert!(grid.is_colliding(&piece));
            prop_assert!(Grid::new(grid.rows(), grid.cols()).is_colliding(&piece));
        }
    }

    #[test]
    fn placement_only_adds_piece_cells(grid in arb_grid(12, 10, 0.3), piece in arb_piece()) {
        let placed = grid.placed(&piece);
        let piece_cells: HashSet<_> = piece.occupied_positions().collect();
        prop_assert_eq!(placed.rows(), grid.rows());
        prop_assert_eq!(placed.cols(), grid.cols());
        for y in 0..grid.rows() {
            for x in 0..grid.cols() {
                let pos = (i32::try_from(x).unwrap(), i32::try_from(y).unwrap());
                if piece_cells.contains(&pos) {
                    prop_assert_eq!(placed.cell(x, y), Cell::Occupied(piece.color()));
                } else {
                    prop_assert_eq!(placed.cell(x, y), grid.cell(x, y));
                }
            }
        }
    }

    #[test]
    fn row_clear_keeps_row_count(grid in arb_grid(12, 6, 0.8)) {
        let full = (0..grid.rows()).filter(|&y| grid.is_row_full(y)).count();
        let (cleared, count) = grid.cleared_rows();
        prop_assert_eq!(cleared.rows(), grid.rows());
        prop_assert_eq!(count, full);
        prop_assert!((0..cleared.rows()).all(|y| !cleared.is_row_full(y)));
        prop_assert!((0..count).all(|y| cleared.row(y).iter().all(|c| c.is_empty())));
        prop_assert_eq!(
            cleared.occupied_count(),
            grid.occupied_count() - count * grid.cols()
        );
    }

    #[test]
    fn explosion_groups_partition(grid in arb_grid(10, 8, 0.7)) {
        let groups = find_explosions(&grid);
        let mut seen = HashSet::new();
        for group in &groups {
            prop_assert!(group.len() >= EXPLOSION_THRESHOLD);
            prop_assert!(is_connected(group.cells()));
            for &(x, y) in group.cells() {
                prop_assert_eq!(grid.cell(x, y), Cell::Occupied(group.color()));
                prop_assert!(seen.insert((x, y)), "cell ({}, {}) in two groups", x, y);
            }
        }

        // Groups are whole components: removing them leaves nothing explodable.
        let exploded = apply_explosion(&grid, &groups);
        prop_assert!(find_explosions(&exploded).is_empty());
        prop_assert_eq!(exploded.occupied_count(), grid.occupied_count() - seen.len());
    }

    #[test]
    fn gravity_conserves_column_contents(grid in arb_grid(12, 8, 0.4)) {
        let settled = settle(&grid);
        prop_assert_eq!(settled.rows(), grid.rows());
        for x in 0..grid.cols() {
            let before: Vec<_> = column(&grid, x).into_iter().filter(|c| c.is_occupied()).collect();
            let after = column(&settled, x);
            let gap = grid.rows() - before.len();
            prop_assert!(after[..gap].iter().all(|c| c.is_empty()));
            prop_assert_eq!(&after[gap..], &before[..]);
        }
    }

    #[test]
    fn chain_terminates_without_groups(grid in arb_grid(12, 8, 0.7)) {
        let outcome = run_chain(&grid);
        prop_assert!(find_explosions(outcome.grid()).is_empty());
        prop_assert_eq!(
            outcome.grid().occupied_count(),
            grid.occupied_count() - outcome.exploded_cells()
        );
        for (i, pass) in outcome.passes().iter().enumerate() {
            prop_assert_eq!(pass.combo(), i + 1);
            prop_assert!(pass.exploded_cells() >= EXPLOSION_THRESHOLD);
            prop_assert_eq!(pass.score(), pass.exploded_cells() * 50 * (i + 1));
        }
        if !outcome.is_empty() {
            prop_assert_eq!(&settle(outcome.grid()), outcome.grid());
        }
    }

    #[test]
    fn game_keeps_invariants_under_random_input(
        seed in any::<[u8; 16]>(),
        every_lock in any::<bool>(),
        commands in prop::collection::vec(0..6u8, 1..300),
    ) {
        let trigger = if every_lock { ChainTrigger::EveryLock } else { ChainTrigger::RowClear };
        let mut state = GameState::with_seed(12, 6, PieceSeed::from_bytes(seed))
            .with_chain_trigger(trigger);
        let mut last_score = 0;
        for command in commands {
            if state.is_game_over() {
                prop_assert!(state.active_piece().is_none());
                break;
            }
            match command {
                0 => { _ = state.try_move(Direction::Left); }
                1 => { _ = state.try_move(Direction::Right); }
                2 => { _ = state.try_move(Direction::Down); }
                3 => { _ = state.try_rotate(); }
                4 => { _ = state.hard_drop(); }
                _ => { _ = state.advance(); }
            }
            prop_assert!(state.score() >= last_score);
            last_score = state.score();
            prop_assert_eq!(state.grid().rows(), 12);
            prop_assert_eq!(state.grid().cols(), 6);
            if let Some(piece) = state.active_piece() {
                prop_assert!(!state.grid().is_colliding(piece));
                prop_assert!(state.phase().is_falling());
            }
        }
    }
}
