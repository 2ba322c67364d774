pub mod app_dirs;
pub mod config;
pub mod game;
pub mod light;
pub mod ranking;
pub mod runtime;
pub mod scoring;
pub mod timer;
pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::{Duration, Instant},
};

use crate::config::{Config, ConfigStore, Difficulty, FileConfigStore, GameConfig};
use crate::game::{Game, Phase, ResetScope};
use crate::ranking::RankingDb;
use crate::runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner};

const TICK_RATE_MS: u64 = 50;

/// Keyboard labels for grid cells, row by row. 6x6 is the largest grid, so
/// 36 labels cover every difficulty.
pub const CELL_KEYS: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

/// sleek reaction-tap tui with timed rounds and local rankings
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A sleek reaction-tap TUI: one cell lights up at a time, tap it before it moves on. Difficulty scales the grid and the pace, combos stack bonus points, and the best runs go on a local per-difficulty ranking."
)]
pub struct Cli {
    /// difficulty to start on (sets grid size and pace)
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<DifficultyArg>,

    /// seconds per round
    #[clap(short = 's', long)]
    seconds: Option<u64>,

    /// countdown seconds before each round
    #[clap(long)]
    countdown: Option<u64>,

    /// player name preset for new-record entries
    #[clap(short = 'n', long)]
    name: Option<String>,

    /// clear the stored ranking and exit
    #[clap(long, value_enum)]
    reset_ranking: Option<ResetScopeArg>,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
pub enum DifficultyArg {
    Easy,
    Normal,
    Hard,
    Insane,
}

impl DifficultyArg {
    fn as_difficulty(&self) -> Difficulty {
        match self {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Normal => Difficulty::Normal,
            DifficultyArg::Hard => Difficulty::Hard,
            DifficultyArg::Insane => Difficulty::Insane,
        }
    }
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
pub enum ResetScopeArg {
    Current,
    All,
}

/// Cell index for a pressed key. Out-of-grid labels still map to an index;
/// the session treats those taps as misses.
pub fn cell_index_for(c: char) -> Option<usize> {
    CELL_KEYS.find(c.to_ascii_lowercase())
}

#[derive(Debug)]
pub struct App {
    pub game: Game,
    pub name_input: String,
    pub player_name: String,
}

impl App {
    pub fn new(cli: &Cli, stored: &Config) -> Self {
        let difficulty = cli
            .difficulty
            .map(|d| d.as_difficulty())
            .unwrap_or(stored.difficulty);
        let cfg = GameConfig {
            game_secs: cli.seconds.unwrap_or(GameConfig::default().game_secs),
            countdown_secs: cli
                .countdown
                .unwrap_or(GameConfig::default().countdown_secs),
            ..GameConfig::default()
        };
        let player_name = cli.name.clone().unwrap_or_else(|| stored.player_name.clone());

        Self {
            game: Game::new(cfg, difficulty),
            name_input: player_name.clone(),
            player_name,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let store = FileConfigStore::new();
    let stored = store.load();

    if let Some(scope) = cli.reset_ranking {
        let mut db = RankingDb::open()?;
        match scope {
            ResetScopeArg::Current => {
                let difficulty = cli
                    .difficulty
                    .map(|d| d.as_difficulty())
                    .unwrap_or(stored.difficulty);
                db.reset(difficulty)?;
                println!("cleared ranking for {}", difficulty);
            }
            ResetScopeArg::All => {
                db.reset_all()?;
                println!("cleared rankings for all difficulties");
            }
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&cli, &stored);
    let run_result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    run_result?;

    let _ = store.save(&Config {
        difficulty: app.game.difficulty(),
        player_name: app.player_name.clone(),
    });

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let events = CrosstermEventSource::new();
    let ticker = FixedTicker::new(Duration::from_millis(TICK_RATE_MS));
    let runner = Runner::new(events, ticker);

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        match runner.step() {
            AppEvent::Tick => {
                app.game.on_tick(Instant::now());
                // the title screen is static; everything else moves on ticks
                if app.game.phase() != Phase::Title {
                    terminal.draw(|f| f.render_widget(&*app, f.area()))?;
                }
            }
            AppEvent::Resize => {
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
            AppEvent::Key(key) => {
                if handle_key(app, key) {
                    break;
                }
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
        }
    }

    Ok(())
}

/// Routes a key press into the session command interface.
/// Returns true when the app should quit.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }
    if key.code == KeyCode::Esc {
        return true;
    }

    let now = Instant::now();
    match app.game.phase() {
        Phase::Title => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                app.game.on_start(now);
            }
            KeyCode::Left => {
                let easier = app.game.difficulty().easier();
                app.game.on_difficulty_change(easier);
            }
            KeyCode::Right => {
                let harder = app.game.difficulty().harder();
                app.game.on_difficulty_change(harder);
            }
            KeyCode::Char('c') => app.game.on_reset_ranking(ResetScope::Current),
            KeyCode::Char('C') => app.game.on_reset_ranking(ResetScope::All),
            _ => {}
        },
        Phase::Countdown => {}
        Phase::Playing => {
            if let KeyCode::Char(c) = key.code {
                if let Some(index) = cell_index_for(c) {
                    app.game.on_cell_tap(index, now);
                }
            }
        }
        Phase::Ended => {
            if app.game.name_required() {
                match key.code {
                    KeyCode::Enter => {
                        let name = app.name_input.clone();
                        app.game.on_submit_name(&name);
                        if !name.trim().is_empty() {
                            app.player_name = name.trim().to_string();
                        }
                        app.name_input = app.player_name.clone();
                    }
                    KeyCode::Backspace => {
                        app.name_input.pop();
                    }
                    KeyCode::Char(c) => {
                        if app.name_input.chars().count() < 16 {
                            app.name_input.push(c);
                        }
                    }
                    _ => {}
                }
            } else {
                match key.code {
                    KeyCode::Char('r') => {
                        app.game.on_restart(now);
                    }
                    KeyCode::Char('t') => {
                        app.game.on_return_to_title();
                    }
                    _ => {}
                }
            }
        }
    }
    false
}
