use crate::config::GameConfig;

/// Points awarded for tapping the lit cell. `combo_before` is the streak
/// length *before* this hit, so the first hit of a fresh combo earns no
/// streak bonus and each consecutive hit adds one more `combo_bonus`.
pub fn hit_points(cfg: &GameConfig, grid_size: usize, combo_before: u32) -> u32 {
    let difficulty_bonus = (grid_size.saturating_sub(2) as u32) * 2;
    cfg.points_per_tap + difficulty_bonus + cfg.combo_bonus * combo_before
}

/// Score after a missed tap. Never goes below zero.
pub fn apply_miss(cfg: &GameConfig, score: u32) -> u32 {
    score.saturating_sub(cfg.miss_penalty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_points_scale_with_grid_size() {
        let cfg = GameConfig::default();
        assert_eq!(hit_points(&cfg, 3, 0), 12);
        assert_eq!(hit_points(&cfg, 4, 0), 14);
        assert_eq!(hit_points(&cfg, 5, 0), 16);
        assert_eq!(hit_points(&cfg, 6, 0), 18);
    }

    #[test]
    fn combo_bonus_grows_per_consecutive_hit() {
        let cfg = GameConfig::default();
        // 4x4: base 10 + difficulty 4, then +2 per pre-hit combo step
        assert_eq!(hit_points(&cfg, 4, 0), 14);
        assert_eq!(hit_points(&cfg, 4, 1), 16);
        assert_eq!(hit_points(&cfg, 4, 2), 18);
        assert_eq!(hit_points(&cfg, 4, 3), 20);
    }

    #[test]
    fn miss_clamps_at_zero() {
        let cfg = GameConfig::default();
        assert_eq!(apply_miss(&cfg, 0), 0);
        assert_eq!(apply_miss(&cfg, 3), 0);
        assert_eq!(apply_miss(&cfg, 5), 0);
        assert_eq!(apply_miss(&cfg, 14), 9);
    }
}
