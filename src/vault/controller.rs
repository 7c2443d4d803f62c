//! Top-level vault state machine
//!
//! `Locked -> Input`, then `Input -> (Opening -> Open | Resetting) -> Input`
//! forever. Every method applies its transition synchronously, so a click
//! that arrives while an animation is awaited already sees the new state.

use rand::Rng;
use rand_pcg::Pcg32;
use thiserror::Error;

use super::combination::{CombinationEngine, CombinationRules, Direction, StepResult};
use super::state::{GameState, RoundOutcome, StepOutcome};

/// Transition requested from the wrong state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("vault setup already completed")]
    AlreadyStarted,
    #[error("cannot move from {from} to {to}")]
    InvalidTransition { from: GameState, to: GameState },
}

/// Owns the game state and routes clicks to the combination engine
#[derive(Debug, Clone)]
pub struct GameController<R = Pcg32> {
    state: GameState,
    engine: CombinationEngine<R>,
    /// Current round (1-based)
    round: u32,
}

impl GameController<Pcg32> {
    pub fn seeded(rules: CombinationRules, seed: u64) -> Self {
        Self::new(CombinationEngine::seeded(rules, seed))
    }
}

impl<R: Rng> GameController<R> {
    /// Start `Locked`; call `finish_setup` once the scene is ready
    pub fn new(engine: CombinationEngine<R>) -> Self {
        Self {
            state: GameState::Locked,
            engine,
            round: 1,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn engine(&self) -> &CombinationEngine<R> {
        &self.engine
    }

    /// `Locked -> Input`. Fires once.
    pub fn finish_setup(&mut self) -> Result<(), ControllerError> {
        if self.state != GameState::Locked {
            return Err(ControllerError::AlreadyStarted);
        }
        self.state = GameState::Input;
        log::info!("Vault ready (round {})", self.round);
        Ok(())
    }

    /// Route one click. Anything outside `Input` is dropped silently.
    pub fn on_step(&mut self, direction: Direction) -> StepOutcome {
        if !self.state.accepts_input() {
            log::debug!("Ignoring {} click while {}", direction, self.state);
            return StepOutcome::Ignored;
        }

        match self.engine.process_step(direction) {
            StepResult::Continue => StepOutcome::Accepted,
            StepResult::Success => {
                self.state = GameState::Opening;
                StepOutcome::Opened
            }
            StepResult::Fail => {
                self.state = GameState::Resetting;
                StepOutcome::Failed
            }
        }
    }

    /// `Opening -> Open` once the door has finished swinging
    pub fn door_opened(&mut self) -> Result<(), ControllerError> {
        self.transition(GameState::Opening, GameState::Open)
    }

    /// First half of a round reset: enter `Resetting`.
    ///
    /// Valid after either sequence (`Open` or `Resetting`) has played out.
    pub fn begin_reset(&mut self, outcome: RoundOutcome) -> Result<(), ControllerError> {
        if !matches!(self.state, GameState::Open | GameState::Opening | GameState::Resetting) {
            return Err(ControllerError::InvalidTransition {
                from: self.state,
                to: GameState::Resetting,
            });
        }
        match outcome {
            RoundOutcome::Opened => log::info!("Vault opened - resetting (round {})", self.round),
            RoundOutcome::Failed => {
                log::info!("Wrong combination - resetting (round {})", self.round)
            }
        }
        self.state = GameState::Resetting;
        Ok(())
    }

    /// Second half of a round reset: redraw the secret, then `Resetting -> Input`
    pub fn resume_input(&mut self) -> Result<(), ControllerError> {
        self.transition(GameState::Resetting, GameState::Input)?;
        self.engine.reset();
        self.round += 1;
        Ok(())
    }

    fn transition(&mut self, from: GameState, to: GameState) -> Result<(), ControllerError> {
        if self.state != from {
            return Err(ControllerError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }
}
