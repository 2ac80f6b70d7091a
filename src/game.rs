use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{debug, info};
use rand::{rngs::StdRng, Rng};

use crate::clock::Ticker;
use crate::config::GameConfig;
use crate::engine::{Engine, RunState, Snapshot, Step};
use crate::input::Command;
use crate::term::TermManager;

const INTRO_LINES: &[&str] = &[
    "Arrow keys or WASD to move",
    "P or Esc to pause",
    "Q or CTRL+C to quit",
    "",
    "Press any key to begin"
];

/// Anything that can show a frame of the game.
pub trait Renderer {
    fn render(&mut self, snapshot: &Snapshot) -> Result<()>;
}

/// What the loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Restart,
    Quit,
}

/// The engine plus its timer. Owned by a single loop: input handling and
/// ticks both go through `&mut self`, so a tick never sees a half-applied input.
pub struct Session<R> {
    engine: Engine<R>,
    ticker: Ticker,
    eat_pause: Duration,
}

impl<R: Rng> Session<R> {
    pub fn new(engine: Engine<R>, now: Instant) -> Self {
        let ticker = Ticker::new(engine.config().tick_period, now);
        let eat_pause = engine.config().eat_pause;
        Session { engine, ticker, eat_pause }
    }

    pub fn handle(&mut self, command: Command) -> Flow {
        match (self.engine.state(), command) {
            (_, Command::Quit) => Flow::Quit,
            (RunState::Over, Command::Confirm) => Flow::Restart,
            (RunState::Over, Command::Decline) => Flow::Quit,
            (RunState::Over, _) => Flow::Continue,
            (_, Command::Turn(direction)) => {
                self.engine.set_direction(direction);
                Flow::Continue
            }
            (_, Command::Pause) => {
                self.engine.toggle_pause();
                Flow::Continue
            }
            (_, Command::Confirm) | (_, Command::Decline) => Flow::Continue,
        }
    }

    /// Ticks the engine if its deadline has passed.
    pub fn update(&mut self, now: Instant) -> Option<Step> {
        if !self.ticker.is_due(now) {
            return None;
        }

        let step = self.engine.tick();
        self.schedule(step, now);
        Some(step)
    }

    pub fn restart(&mut self, now: Instant) {
        self.engine.reset();
        self.ticker.start(now);
    }

    pub fn wait_time(&self, now: Instant) -> Duration {
        self.ticker.remaining(now)
    }

    pub fn stop(&mut self) {
        self.ticker.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.ticker.is_stopped()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.engine.snapshot()
    }

    pub fn present<T: Renderer + ?Sized>(&self, renderer: &mut T) -> Result<()> {
        renderer.render(&self.engine.snapshot())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn schedule(&mut self, step: Step, now: Instant) {
        self.ticker.advance(now);

        match step {
            // Give the player a moment to spot the new food
            Step::Ate => self.ticker.delay(self.eat_pause),
            Step::Ended(ending) => debug!("run ended by {:?}", ending),
            Step::Idle | Step::Moved => {}
        }
    }
}

/// Terminal driver: owns the screen and runs the single-threaded game loop.
pub struct SnakeGame {
    term: TermManager,
    session: Session<StdRng>,
}

impl SnakeGame {
    pub fn new(config: GameConfig, rng: StdRng) -> Result<Self> {
        let mut term = TermManager::new()?;
        term.set_board(config.width, config.height)?;

        let engine = Engine::with_rng(config, rng).context("Invalid game configuration")?;
        let session = Session::new(engine, Instant::now());

        Ok(SnakeGame { term, session })
    }

    /// Plays until the player quits. The terminal is restored even if the loop fails.
    pub fn run(&mut self) -> Result<()> {
        self.term.setup()?;
        let result = self.play();
        let restored = self.term.restore();
        result.and(restored)
    }

    ///////////////////////////////////////////////////////////////////////////

    fn play(&mut self) -> Result<()> {
        if !self.show_intro()? {
            return Ok(());
        }

        self.start_round()?;

        while !self.session.is_stopped() {
            let keys = self.term.wait_for_keys(self.session.wait_time(Instant::now()))?;

            for key in keys {
                let flow = match Command::from_key_event(key) {
                    Some(command) => self.session.handle(command),
                    None => Flow::Continue,
                };

                match flow {
                    Flow::Continue => {}
                    Flow::Restart => self.start_round()?,
                    Flow::Quit => {
                        info!("player quit");
                        self.session.stop();
                        break;
                    }
                }
            }

            if self.session.is_stopped() {
                break;
            }

            self.session.update(Instant::now());
            self.session.present(&mut self.term)?;
        }

        Ok(())
    }

    /// Returns false if the player chose to quit instead of starting.
    fn show_intro(&mut self) -> Result<bool> {
        self.term.show_message(INTRO_LINES)?;

        let key = self.term.read_key_blocking()?;
        if Command::from_key_event(key) == Some(Command::Quit) {
            return Ok(false);
        }

        self.term.hide_message()?;
        Ok(true)
    }

    fn start_round(&mut self) -> Result<()> {
        self.session.restart(Instant::now());
        self.term.draw_board()?;
        self.session.present(&mut self.term)
    }
}
