use rand::Rng;
use std::time::Duration;

use crate::config::Difficulty;

/// Picks the next cell to light: uniform over the grid, re-drawing while the
/// draw equals `previous` so the same cell never lights twice in a row.
/// Degenerate grids (one cell or fewer) always yield index 0.
pub fn next_lit_cell(rng: &mut impl Rng, previous: Option<usize>, cell_count: usize) -> usize {
    if cell_count <= 1 {
        return 0;
    }
    loop {
        let candidate = rng.gen_range(0..cell_count);
        if Some(candidate) != previous {
            return candidate;
        }
    }
}

/// How long the freshly lit cell stays lit before the scheduler rotates it.
pub fn relight_delay(rng: &mut impl Rng, difficulty: Difficulty) -> Duration {
    let (min, max) = difficulty.light_interval_ms();
    Duration::from_millis(rng.gen_range(min..max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    #[test]
    fn never_repeats_previous_cell() {
        let mut rng = rand::thread_rng();
        for d in Difficulty::ALL {
            let count = d.cell_count();
            let mut prev = None;
            let draws: Vec<usize> = (0..1000)
                .map(|_| {
                    let cell = next_lit_cell(&mut rng, prev, count);
                    prev = Some(cell);
                    cell
                })
                .collect();
            assert!(draws.iter().all(|&c| c < count));
            assert!(draws.iter().tuple_windows().all(|(a, b)| a != b));
        }
    }

    #[test]
    fn two_cell_grid_alternates() {
        let mut rng = rand::thread_rng();
        let mut prev = Some(0);
        for _ in 0..50 {
            let cell = next_lit_cell(&mut rng, prev, 2);
            assert_ne!(Some(cell), prev);
            prev = Some(cell);
        }
    }

    #[test]
    fn degenerate_grid_always_zero() {
        let mut rng = rand::thread_rng();
        assert_eq!(next_lit_cell(&mut rng, None, 0), 0);
        assert_eq!(next_lit_cell(&mut rng, Some(0), 1), 0);
    }

    #[test]
    fn relight_delay_within_difficulty_range() {
        let mut rng = rand::thread_rng();
        for d in Difficulty::ALL {
            let (min, max) = d.light_interval_ms();
            for _ in 0..200 {
                let delay = relight_delay(&mut rng, d);
                assert!(delay >= Duration::from_millis(min));
                assert!(delay < Duration::from_millis(max));
            }
        }
    }
}
