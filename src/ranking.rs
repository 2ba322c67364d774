use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Result};
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::config::Difficulty;

/// Fallback display name for blank submissions.
pub const GUEST_NAME: &str = "Guest";

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq)]
pub struct RankEntry {
    pub name: String,
    pub score: u32,
    pub recorded_at: DateTime<Local>,
}

/// Per-difficulty leaderboards persisted in sqlite. Each difficulty's list
/// is kept sorted by score descending (insertion order breaks ties) and
/// truncated on every insert; `load` never fails the caller over missing or
/// unreadable rows.
#[derive(Debug)]
pub struct RankingDb {
    conn: Connection,
}

impl RankingDb {
    /// Open the on-disk ranking database, creating it if needed.
    pub fn open() -> Result<Self> {
        let db_path =
            AppDirs::ranking_db_path().unwrap_or_else(|| PathBuf::from("blikk_ranking.db"));

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        Self::from_connection(Connection::open(db_path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Result<Self> {
        Self::from_connection(Connection::open(p)?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS ranking (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                difficulty INTEGER NOT NULL,
                name TEXT NOT NULL,
                score INTEGER NOT NULL,
                recorded_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_ranking_difficulty ON ranking(difficulty)",
            [],
        )?;

        Ok(RankingDb { conn })
    }

    /// The stored sequence for `difficulty`, best first. Rows that fail to
    /// parse are skipped rather than surfaced as errors.
    pub fn load(&self, difficulty: Difficulty) -> Result<Vec<RankEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT name, score, recorded_at
            FROM ranking
            WHERE difficulty = ?1
            ORDER BY score DESC, id ASC
            "#,
        )?;

        let rows = stmt.query_map([difficulty.grid_size() as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (name, score, recorded_at) = row?;
            if let Ok(ts) = DateTime::parse_from_rfc3339(&recorded_at) {
                entries.push(RankEntry {
                    name,
                    score: score.max(0) as u32,
                    recorded_at: ts.with_timezone(&Local),
                });
            }
        }

        Ok(entries)
    }

    /// Persists `entries` as the full sequence for `difficulty`, replacing
    /// whatever was stored before.
    pub fn save(&mut self, difficulty: Difficulty, entries: &[RankEntry]) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "DELETE FROM ranking WHERE difficulty = ?1",
            [difficulty.grid_size() as i64],
        )?;

        for entry in entries {
            tx.execute(
                r#"
                INSERT INTO ranking (difficulty, name, score, recorded_at)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![
                    difficulty.grid_size() as i64,
                    entry.name,
                    entry.score as i64,
                    entry.recorded_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Appends a new entry, re-sorts, truncates to `max_entries`, saves, and
    /// returns the 0-based rank the entry landed at — `None` when it was
    /// truncated away. Blank names become [`GUEST_NAME`].
    pub fn insert(
        &mut self,
        difficulty: Difficulty,
        score: u32,
        name: &str,
        max_entries: usize,
    ) -> Result<Option<usize>> {
        let name = name.trim();
        let entry = RankEntry {
            name: if name.is_empty() {
                GUEST_NAME.to_string()
            } else {
                name.to_string()
            },
            score,
            recorded_at: Local::now(),
        };

        let mut entries = self.load(difficulty)?;
        entries.push(entry.clone());
        // stable sort: equal scores keep insertion order, so the new entry
        // lands after any existing ties
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(max_entries);
        self.save(difficulty, &entries)?;

        Ok(entries
            .iter()
            .position(|e| e.score == entry.score && e.recorded_at == entry.recorded_at))
    }

    /// Whether `score` would earn a spot on the board: the list still has
    /// room, or the score beats the current last place. Ties at last place
    /// do not qualify, and a score of zero never does.
    pub fn qualifies(&self, difficulty: Difficulty, score: u32, max_entries: usize) -> Result<bool> {
        if score == 0 {
            return Ok(false);
        }
        let entries = self.load(difficulty)?;
        Ok(entries.len() < max_entries || entries.last().is_some_and(|e| score > e.score))
    }

    /// Clears the stored sequence for one difficulty.
    pub fn reset(&mut self, difficulty: Difficulty) -> Result<()> {
        self.conn.execute(
            "DELETE FROM ranking WHERE difficulty = ?1",
            [difficulty.grid_size() as i64],
        )?;
        Ok(())
    }

    /// Clears every supported difficulty.
    pub fn reset_all(&mut self) -> Result<()> {
        for difficulty in Difficulty::ALL {
            self.reset(difficulty)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, score: u32) -> RankEntry {
        RankEntry {
            name: name.to_string(),
            score,
            recorded_at: Local::now(),
        }
    }

    #[test]
    fn load_of_untouched_difficulty_is_empty() {
        let db = RankingDb::open_in_memory().unwrap();
        assert!(db.load(Difficulty::Normal).unwrap().is_empty());
    }

    #[test]
    fn save_then_load_roundtrips_in_order() {
        let mut db = RankingDb::open_in_memory().unwrap();
        let entries = vec![entry("a", 30), entry("b", 20), entry("c", 10)];
        db.save(Difficulty::Normal, &entries).unwrap();

        let loaded = db.load(Difficulty::Normal).unwrap();
        let names: Vec<&str> = loaded.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        let scores: Vec<u32> = loaded.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![30, 20, 10]);
    }

    #[test]
    fn insert_sorts_descending_and_reports_rank() {
        let mut db = RankingDb::open_in_memory().unwrap();
        assert_eq!(db.insert(Difficulty::Normal, 10, "ten", 5).unwrap(), Some(0));
        assert_eq!(
            db.insert(Difficulty::Normal, 30, "thirty", 5).unwrap(),
            Some(0)
        );
        assert_eq!(
            db.insert(Difficulty::Normal, 20, "twenty", 5).unwrap(),
            Some(1)
        );

        let loaded = db.load(Difficulty::Normal).unwrap();
        let scores: Vec<u32> = loaded.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![30, 20, 10]);
    }

    #[test]
    fn tied_score_lands_after_existing_entries() {
        let mut db = RankingDb::open_in_memory().unwrap();
        db.insert(Difficulty::Normal, 20, "first", 5).unwrap();
        let rank = db.insert(Difficulty::Normal, 20, "second", 5).unwrap();
        assert_eq!(rank, Some(1));

        let loaded = db.load(Difficulty::Normal).unwrap();
        assert_eq!(loaded[0].name, "first");
        assert_eq!(loaded[1].name, "second");
    }

    #[test]
    fn insert_beyond_cap_truncates_lowest() {
        let mut db = RankingDb::open_in_memory().unwrap();
        for score in [50, 40, 30, 20, 10] {
            db.insert(Difficulty::Hard, score, "p", 5).unwrap();
        }

        // beats last place: enters at rank 4, the 10 falls off
        assert_eq!(db.insert(Difficulty::Hard, 15, "p", 5).unwrap(), Some(4));
        let loaded = db.load(Difficulty::Hard).unwrap();
        assert_eq!(loaded.len(), 5);
        let scores: Vec<u32> = loaded.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![50, 40, 30, 20, 15]);

        // does not beat last place: truncated straight away
        assert_eq!(db.insert(Difficulty::Hard, 1, "p", 5).unwrap(), None);
        assert_eq!(db.load(Difficulty::Hard).unwrap().len(), 5);
    }

    #[test]
    fn blank_names_become_guest() {
        let mut db = RankingDb::open_in_memory().unwrap();
        db.insert(Difficulty::Easy, 12, "", 5).unwrap();
        db.insert(Difficulty::Easy, 14, "   ", 5).unwrap();

        let loaded = db.load(Difficulty::Easy).unwrap();
        assert!(loaded.iter().all(|e| e.name == GUEST_NAME));
    }

    #[test]
    fn qualifies_requires_positive_score() {
        let db = RankingDb::open_in_memory().unwrap();
        // empty board: score 0 never qualifies, score 1 does
        assert!(!db.qualifies(Difficulty::Normal, 0, 5).unwrap());
        assert!(db.qualifies(Difficulty::Normal, 1, 5).unwrap());
    }

    #[test]
    fn qualifies_tie_at_last_place_is_rejected() {
        let mut db = RankingDb::open_in_memory().unwrap();
        for score in [50, 40, 30, 20, 10] {
            db.insert(Difficulty::Normal, score, "p", 5).unwrap();
        }
        assert!(!db.qualifies(Difficulty::Normal, 10, 5).unwrap());
        assert!(db.qualifies(Difficulty::Normal, 11, 5).unwrap());
    }

    #[test]
    fn qualifies_while_board_has_room() {
        let mut db = RankingDb::open_in_memory().unwrap();
        db.insert(Difficulty::Normal, 100, "p", 5).unwrap();
        // worse than the only entry, but the board is not full
        assert!(db.qualifies(Difficulty::Normal, 1, 5).unwrap());
    }

    #[test]
    fn reset_leaves_other_difficulties_alone() {
        let mut db = RankingDb::open_in_memory().unwrap();
        db.insert(Difficulty::Easy, 10, "a", 5).unwrap();
        db.insert(Difficulty::Normal, 20, "b", 5).unwrap();

        db.reset(Difficulty::Easy).unwrap();
        assert!(db.load(Difficulty::Easy).unwrap().is_empty());
        assert_eq!(db.load(Difficulty::Normal).unwrap().len(), 1);
    }

    #[test]
    fn reset_all_clears_every_difficulty() {
        let mut db = RankingDb::open_in_memory().unwrap();
        for d in Difficulty::ALL {
            db.insert(d, 10, "a", 5).unwrap();
        }
        db.reset_all().unwrap();
        for d in Difficulty::ALL {
            assert!(db.load(d).unwrap().is_empty());
        }
    }

    #[test]
    fn on_disk_db_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranking.db");
        {
            let mut db = RankingDb::with_path(&path).unwrap();
            db.insert(Difficulty::Normal, 42, "keeper", 5).unwrap();
        }
        let db = RankingDb::with_path(&path).unwrap();
        let loaded = db.load(Difficulty::Normal).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "keeper");
        assert_eq!(loaded[0].score, 42);
    }
}
