use std::{fs::File, path::{Path, PathBuf}, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::terminal;
use rand::{rngs::StdRng, SeedableRng};

use gridsnake::config::{CollisionRule, GameConfig, DEFAULT_EAT_PAUSE_MS, DEFAULT_GRID_SIZE, DEFAULT_TICK_MS};
use gridsnake::game::SnakeGame;
use gridsnake::term::grid_fitting;

#[derive(Parser)]
#[command(name = "gridsnake")]
#[command(version, about = "Classic snake on a fixed grid, played in the terminal")]
struct Cli {
    /// Grid width in cells [default: what fits the terminal, at most 50]
    #[arg(long)]
    width: Option<i32>,

    /// Grid height in cells [default: what fits the terminal, at most 50]
    #[arg(long)]
    height: Option<i32>,

    /// Milliseconds between moves
    #[arg(long, default_value_t = DEFAULT_TICK_MS)]
    tick_ms: u64,

    /// Extra milliseconds to wait after eating
    #[arg(long, default_value_t = DEFAULT_EAT_PAUSE_MS)]
    eat_pause_ms: u64,

    /// Let the head move onto the cell the tail is leaving
    #[arg(long)]
    follow_tail: bool,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file (RUST_LOG sets the level, default info)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let (fit_w, fit_h) = if self.width.is_some() && self.height.is_some() {
            (DEFAULT_GRID_SIZE, DEFAULT_GRID_SIZE)
        } else {
            grid_fitting(terminal::size().context("Error reading terminal size")?)
        };

        let width = self.width.unwrap_or_else(|| fit_w.min(DEFAULT_GRID_SIZE));
        let height = self.height.unwrap_or_else(|| fit_h.min(DEFAULT_GRID_SIZE));

        let mut config = GameConfig::new(width, height);
        config.tick_period = Duration::from_millis(self.tick_ms);
        config.eat_pause = Duration::from_millis(self.eat_pause_ms);
        if self.follow_tail {
            config.collision_rule = CollisionRule::ExcludeVacatingTail;
        }
        config.fit_initial_snake();
        config.validate()?;

        Ok(config)
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Cannot create log file {}", path.display()))?;

    // The game owns the terminal, so logs never go to stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = cli.game_config()?;
    log::info!("starting with {:?}", config);

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut game = SnakeGame::new(config, rng)?;
    game.run()
}
