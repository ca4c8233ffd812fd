//! Headless game runner implementation.
//!
//! A synchronous read-eval-print loop: one JSON command per input line, one
//! or more JSON responses per command. The runner owns its clock; actions are
//! stamped with the simulated elapsed time so a session replays identically.

use std::io::{self, BufRead, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use panix_core::game::Game;
use panix_core::save::SaveData;

use crate::protocol::{Command, Response};

/// Headless runner configuration.
#[derive(Debug, Clone, Default)]
pub struct HeadlessConfig {
    /// Output state after every tick (vs only on query).
    pub auto_state_output: bool,
}

/// Headless runner for scripted or AI-controlled play.
#[derive(Debug)]
pub struct HeadlessRunner {
    config: HeadlessConfig,
    game: Game,
}

impl HeadlessRunner {
    /// Create a runner over the built-in content.
    #[must_use]
    pub fn new() -> Self {
        Self::with_game(Game::default(), HeadlessConfig::default())
    }

    /// Create a runner with a prepared game and custom configuration.
    #[must_use]
    pub const fn with_game(game: Game, config: HeadlessConfig) -> Self {
        Self { config, game }
    }

    /// The game being driven.
    #[must_use]
    pub const fn game(&self) -> &Game {
        &self.game
    }

    /// Run the loop on stdin/stdout until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout cannot be written.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), stdout.lock())
    }

    /// Run the loop over arbitrary line input and output.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub fn run_with<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        send(&mut output, &Response::ready(self.game.tick_count()))?;

        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let cmd = match Command::from_json(line) {
                Ok(cmd) => cmd,
                Err(e) => {
                    warn!("Unparseable command: {e}");
                    send(&mut output, &Response::error(format!("Parse error: {e}"), None))?;
                    continue;
                }
            };

            let quit = matches!(cmd, Command::Quit);
            for response in self.handle(&cmd) {
                send(&mut output, &response)?;
            }
            if quit {
                break;
            }
        }

        info!(ticks = self.game.tick_count(), "Headless session finished");
        send(
            &mut output,
            &Response::Bye {
                tick: self.game.tick_count(),
                hash: self.game.state_hash(),
            },
        )
    }

    /// Execute one command and collect its responses.
    ///
    /// Events raised by the command come first, the ack, error or state last.
    pub fn handle(&mut self, cmd: &Command) -> Vec<Response> {
        debug!(cmd = cmd.name(), "Handling command");
        let result = self.execute(cmd);

        let mut responses: Vec<Response> = self
            .game
            .drain_events()
            .into_iter()
            .map(|event| Response::Event { event })
            .collect();
        responses.push(result.unwrap_or_else(|message| Response::error(message, Some(cmd.name()))));
        responses
    }

    fn execute(&mut self, cmd: &Command) -> Result<Response, String> {
        if let Some(action) = cmd.to_action() {
            let now = self.now_ms();
            self.game.apply(&action, now).map_err(|e| e.to_string())?;
            return Ok(Response::ack(cmd.name()));
        }

        match cmd {
            Command::Tick { ms, count } => {
                let ms = ms.unwrap_or_else(|| self.game.config().balance.frame_ms());
                if !(ms.is_finite() && ms >= 0.0) {
                    return Err(format!("Tick length must be a non-negative number, got {ms}"));
                }
                for _ in 0..*count {
                    self.game.tick(ms);
                }
                if self.config.auto_state_output {
                    Ok(Response::state(&self.game))
                } else {
                    Ok(Response::ack(cmd.name()))
                }
            }
            Command::Query => Ok(Response::state(&self.game)),
            Command::Save { path } => {
                self.save(Path::new(path)).map_err(|e| e.to_string())?;
                Ok(Response::ack(cmd.name()))
            }
            Command::Load { path } => {
                self.load(Path::new(path)).map_err(|e| e.to_string())?;
                Ok(Response::state(&self.game))
            }
            Command::Reset => {
                let now = self.now_ms();
                self.game.reset(now);
                Ok(Response::ack(cmd.name()))
            }
            Command::Quit => Ok(Response::ack(cmd.name())),
            // Plain actions were handled above.
            _ => Err(format!("Unsupported command: {}", cmd.name())),
        }
    }

    fn save(&mut self, path: &Path) -> panix_core::error::Result<()> {
        let now = self.now_ms();
        SaveData::capture(&self.game, now).save_to_path(path)?;
        self.game.mark_saved(now);
        Ok(())
    }

    fn load(&mut self, path: &Path) -> panix_core::error::Result<()> {
        SaveData::load_from_path(path)?.restore(&mut self.game)
    }

    /// Simulated clock used to stamp actions and saves.
    fn now_ms(&self) -> u64 {
        self.game.elapsed_ms() as u64
    }
}

impl Default for HeadlessRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn send<W: Write>(output: &mut W, response: &Response) -> io::Result<()> {
    output.write_all(response.to_json_line().as_bytes())?;
    output.flush()
}
