use chrono::Local;
use directories::ProjectDirs;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use crate::config::{Difficulty, GameConfig};
use crate::light;
use crate::ranking::{RankEntry, RankingDb};
use crate::scoring;
use crate::timer::{TimerLine, Timers};

const SECOND: Duration = Duration::from_secs(1);

/// Where the session currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Title,
    Countdown,
    Playing,
    Ended,
}

/// Which leaderboards a reset applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetScope {
    Current,
    All,
}

/// One game session end to end: the phase machine, score/time/combo state,
/// the timer lines, and the ranking handle. All mutation funnels through the
/// `on_*` commands; the view only reads. Every command takes `now` from the
/// caller so tests can drive time explicitly.
#[derive(Debug)]
pub struct Game {
    cfg: GameConfig,
    difficulty: Difficulty,
    phase: Phase,
    score: u32,
    time_left: u64,
    countdown_left: u64,
    combo: u32,
    best_combo: u32,
    hits: u32,
    misses: u32,
    active_cell: Option<usize>,
    last_rank: Option<usize>,
    awaiting_name: bool,
    timers: Timers,
    ranking: Option<RankingDb>,
    ranking_rows: Vec<RankEntry>,
}

impl Game {
    pub fn new(cfg: GameConfig, difficulty: Difficulty) -> Self {
        Self::with_ranking(cfg, difficulty, RankingDb::open().ok())
    }

    /// Construct with an explicit ranking handle (or none). Headless tests
    /// pass an in-memory database here.
    pub fn with_ranking(
        cfg: GameConfig,
        difficulty: Difficulty,
        ranking: Option<RankingDb>,
    ) -> Self {
        let mut game = Self {
            time_left: cfg.game_secs,
            countdown_left: cfg.countdown_secs,
            cfg,
            difficulty,
            phase: Phase::Title,
            score: 0,
            combo: 0,
            best_combo: 0,
            hits: 0,
            misses: 0,
            active_cell: None,
            last_rank: None,
            awaiting_name: false,
            timers: Timers::new(),
            ranking,
            ranking_rows: Vec::new(),
        };
        game.refresh_ranking_rows();
        game
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn time_left(&self) -> u64 {
        self.time_left
    }

    pub fn countdown(&self) -> u64 {
        self.countdown_left
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn best_combo(&self) -> u32 {
        self.best_combo
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn active_cell(&self) -> Option<usize> {
        self.active_cell
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn cfg(&self) -> &GameConfig {
        &self.cfg
    }

    /// True while Ended is gated behind name entry for a new record.
    pub fn name_required(&self) -> bool {
        self.awaiting_name
    }

    /// Rank the just-submitted score landed at, for highlighting.
    pub fn last_rank(&self) -> Option<usize> {
        self.last_rank
    }

    /// Ranking rows for the active difficulty, best first.
    pub fn ranking_rows(&self) -> &[RankEntry] {
        &self.ranking_rows
    }

    /// Title → Countdown.
    pub fn on_start(&mut self, now: Instant) -> bool {
        if self.phase != Phase::Title {
            return false;
        }
        self.begin_session(now);
        true
    }

    /// Ended → Countdown. Refused while a new record still needs a name.
    pub fn on_restart(&mut self, now: Instant) -> bool {
        if self.phase != Phase::Ended || self.awaiting_name {
            return false;
        }
        self.begin_session(now);
        true
    }

    /// Ended → Title. Refused while a new record still needs a name.
    pub fn on_return_to_title(&mut self) -> bool {
        if self.phase != Phase::Ended || self.awaiting_name {
            return false;
        }
        self.timers.cancel_all();
        self.active_cell = None;
        self.phase = Phase::Title;
        true
    }

    /// Accepted only on the title screen; a running session keeps its grid.
    pub fn on_difficulty_change(&mut self, difficulty: Difficulty) -> bool {
        if self.phase != Phase::Title {
            return false;
        }
        self.difficulty = difficulty;
        self.last_rank = None;
        self.refresh_ranking_rows();
        true
    }

    /// A tap on cell `index`. Hitting the lit cell scores and relights
    /// immediately; anything else (wrong cell, stale index, out of range)
    /// is a miss.
    pub fn on_cell_tap(&mut self, index: usize, now: Instant) {
        if self.phase != Phase::Playing {
            return;
        }
        if self.active_cell == Some(index) {
            self.score += scoring::hit_points(&self.cfg, self.difficulty.grid_size(), self.combo);
            self.combo += 1;
            self.best_combo = self.best_combo.max(self.combo);
            self.hits += 1;
            self.timers.cancel(TimerLine::Light);
            self.light_next(now);
        } else {
            self.score = scoring::apply_miss(&self.cfg, self.score);
            self.combo = 0;
            self.misses += 1;
        }
    }

    /// Advances every timer line that has come due. The runtime calls this
    /// on each poll tick; tests call it with synthetic instants.
    pub fn on_tick(&mut self, now: Instant) {
        for (line, deadline) in self.timers.fire_due(now) {
            match line {
                TimerLine::Countdown => {
                    self.countdown_left = self.countdown_left.saturating_sub(1);
                    if self.countdown_left == 0 {
                        // hand the fired deadline on so the game tick keeps
                        // the one-second cadence
                        self.enter_playing(deadline);
                    } else {
                        self.timers.arm(TimerLine::Countdown, deadline + SECOND);
                    }
                }
                TimerLine::Game => {
                    self.time_left = self.time_left.saturating_sub(1);
                    if self.time_left == 0 {
                        self.end_session();
                    } else {
                        self.timers.arm(TimerLine::Game, deadline + SECOND);
                    }
                }
                TimerLine::Light => {
                    self.active_cell = None;
                    if self.phase == Phase::Playing {
                        self.light_next(now);
                    }
                }
            }
        }
    }

    /// Records the pending new-record entry under `name` (blank becomes the
    /// guest label) and releases the restart/title gate.
    pub fn on_submit_name(&mut self, name: &str) -> bool {
        if self.phase != Phase::Ended || !self.awaiting_name {
            return false;
        }
        if let Some(db) = self.ranking.as_mut() {
            self.last_rank = db
                .insert(
                    self.difficulty,
                    self.score,
                    name,
                    self.cfg.max_ranking_entries,
                )
                .unwrap_or(None);
        }
        self.awaiting_name = false;
        self.refresh_ranking_rows();
        true
    }

    pub fn on_reset_ranking(&mut self, scope: ResetScope) {
        if let Some(db) = self.ranking.as_mut() {
            let _ = match scope {
                ResetScope::Current => db.reset(self.difficulty),
                ResetScope::All => db.reset_all(),
            };
        }
        self.last_rank = None;
        self.refresh_ranking_rows();
    }

    fn begin_session(&mut self, now: Instant) {
        self.timers.cancel_all();
        self.phase = Phase::Countdown;
        self.score = 0;
        self.time_left = self.cfg.game_secs;
        self.combo = 0;
        self.best_combo = 0;
        self.hits = 0;
        self.misses = 0;
        self.active_cell = None;
        self.last_rank = None;
        self.awaiting_name = false;
        self.countdown_left = self.cfg.countdown_secs;
        if self.countdown_left == 0 {
            self.enter_playing(now);
        } else {
            self.timers.arm(TimerLine::Countdown, now + SECOND);
        }
    }

    fn enter_playing(&mut self, origin: Instant) {
        self.timers.cancel(TimerLine::Countdown);
        self.phase = Phase::Playing;
        self.timers.arm(TimerLine::Game, origin + SECOND);
        self.light_next(origin);
    }

    fn light_next(&mut self, now: Instant) {
        let mut rng = rand::thread_rng();
        let cell = light::next_lit_cell(&mut rng, self.active_cell, self.difficulty.cell_count());
        self.active_cell = Some(cell);
        self.timers
            .arm(TimerLine::Light, now + light::relight_delay(&mut rng, self.difficulty));
    }

    fn end_session(&mut self) {
        self.timers.cancel_all();
        self.active_cell = None;
        self.phase = Phase::Ended;
        self.combo = 0;
        self.awaiting_name = match &self.ranking {
            Some(db) => db
                .qualifies(self.difficulty, self.score, self.cfg.max_ranking_entries)
                .unwrap_or(false),
            None => false,
        };
        self.refresh_ranking_rows();
        let _ = self.append_results_log();
    }

    fn refresh_ranking_rows(&mut self) {
        self.ranking_rows = match &self.ranking {
            Some(db) => db.load(self.difficulty).unwrap_or_default(),
            None => Vec::new(),
        };
    }

    fn append_results_log(&self) -> io::Result<()> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "blikk") {
            let config_dir = proj_dirs.config_dir();
            let log_path = config_dir.join("log.csv");

            std::fs::create_dir_all(config_dir)?;

            // If the log file doesn't exist, we need to emit a header
            let needs_header = !log_path.exists();

            let mut log_file = OpenOptions::new()
                .append(true)
                .create(true)
                .open(log_path)?;

            if needs_header {
                writeln!(log_file, "date,difficulty,score,best_combo,hits,misses")?;
            }

            writeln!(
                log_file,
                "{},{},{},{},{},{}",
                Local::now().format("%c"),
                self.difficulty.grid_size(),
                self.score,
                self.best_combo,
                self.hits,
                self.misses,
            )?;
        }

        Ok(())
    }
}
