use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Grid difficulty. The grid is always square; the variant fixes the side
/// length and how quickly the lit cell rotates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    Insane,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Insane,
    ];

    /// Side length of the square grid.
    pub fn grid_size(self) -> usize {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Normal => 4,
            Difficulty::Hard => 5,
            Difficulty::Insane => 6,
        }
    }

    pub fn cell_count(self) -> usize {
        self.grid_size() * self.grid_size()
    }

    /// Half-open `[min, max)` range in milliseconds a cell stays lit before
    /// the scheduler rotates it.
    pub fn light_interval_ms(self) -> (u64, u64) {
        match self {
            Difficulty::Easy => (1000, 1800),
            Difficulty::Normal => (800, 1500),
            Difficulty::Hard => (700, 1300),
            Difficulty::Insane => (600, 1100),
        }
    }

    pub fn from_grid_size(size: usize) -> Option<Self> {
        Difficulty::ALL.into_iter().find(|d| d.grid_size() == size)
    }

    /// Cycle for the title-screen selector; saturates at the ends.
    pub fn easier(self) -> Self {
        match self {
            Difficulty::Easy | Difficulty::Normal => Difficulty::Easy,
            Difficulty::Hard => Difficulty::Normal,
            Difficulty::Insane => Difficulty::Hard,
        }
    }

    pub fn harder(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Normal,
            Difficulty::Normal => Difficulty::Hard,
            Difficulty::Hard | Difficulty::Insane => Difficulty::Insane,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy (3x3)",
            Difficulty::Normal => "Normal (4x4)",
            Difficulty::Hard => "Hard (5x5)",
            Difficulty::Insane => "Insane (6x6)",
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Normal
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fixed gameplay parameters. Difficulty-independent; the per-difficulty
/// light interval lives on `Difficulty`.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub game_secs: u64,
    pub countdown_secs: u64,
    pub points_per_tap: u32,
    pub miss_penalty: u32,
    pub combo_bonus: u32,
    pub max_ranking_entries: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            game_secs: 30,
            countdown_secs: 3,
            points_per_tap: 10,
            miss_penalty: 5,
            combo_bonus: 2,
            max_ranking_entries: 5,
        }
    }
}

/// User settings persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub difficulty: Difficulty,
    pub player_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            player_name: String::new(),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "blikk") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("blikk_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn grid_sizes_cover_supported_values() {
        let sizes: Vec<usize> = Difficulty::ALL.iter().map(|d| d.grid_size()).collect();
        assert_eq!(sizes, vec![3, 4, 5, 6]);
    }

    #[test]
    fn light_intervals_tighten_with_difficulty() {
        assert_eq!(Difficulty::Easy.light_interval_ms(), (1000, 1800));
        assert_eq!(Difficulty::Normal.light_interval_ms(), (800, 1500));
        assert_eq!(Difficulty::Hard.light_interval_ms(), (700, 1300));
        assert_eq!(Difficulty::Insane.light_interval_ms(), (600, 1100));
    }

    #[test]
    fn from_grid_size_roundtrips() {
        for d in Difficulty::ALL {
            assert_eq!(Difficulty::from_grid_size(d.grid_size()), Some(d));
        }
        assert_eq!(Difficulty::from_grid_size(2), None);
        assert_eq!(Difficulty::from_grid_size(7), None);
    }

    #[test]
    fn selector_saturates_at_ends() {
        assert_eq!(Difficulty::Easy.easier(), Difficulty::Easy);
        assert_eq!(Difficulty::Insane.harder(), Difficulty::Insane);
        assert_eq!(Difficulty::Normal.harder(), Difficulty::Hard);
        assert_eq!(Difficulty::Hard.easier(), Difficulty::Normal);
    }

    #[test]
    fn game_config_defaults() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.game_secs, 30);
        assert_eq!(cfg.countdown_secs, 3);
        assert_eq!(cfg.points_per_tap, 10);
        assert_eq!(cfg.miss_penalty, 5);
        assert_eq!(cfg.combo_bonus, 2);
        assert_eq!(cfg.max_ranking_entries, 5);
    }

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            difficulty: Difficulty::Insane,
            player_name: "ada".into(),
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_config_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nope.json"));
        assert_eq!(store.load(), Config::default());
    }
}
