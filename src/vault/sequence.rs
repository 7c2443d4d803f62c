//! Drives presentation sequences between controller transitions
//!
//! The controller is only borrowed for the synchronous part of each step;
//! no borrow is held across an `.await`, so clicks that land mid-animation
//! reach `GameController::on_step` and are dropped there.

use std::cell::{Ref, RefCell};

use futures::channel::mpsc;
use futures::{FutureExt, StreamExt, pin_mut, select_biased};
use rand::Rng;
use rand_pcg::Pcg32;

use super::combination::Direction;
use super::controller::{ControllerError, GameController};
use super::state::{GameState, RoundOutcome, StepOutcome};

/// Visual side of the vault. Animations resolve when they finish playing.
pub trait Presentation {
    /// Swing the door open
    fn play_open_sequence(&self) -> impl Future<Output = ()>;
    /// Reveal/blink once the door is open
    fn play_reveal(&self) -> impl Future<Output = ()>;
    /// Failure feedback: spin the handle
    fn play_fail_spin(&self) -> impl Future<Output = ()>;
    /// Close the door and return the handle to idle
    fn reset_visuals(&self) -> impl Future<Output = ()>;

    fn start_timer(&self);
    fn stop_timer(&self);
    fn reset_timer(&self);
}

/// A controller paired with the presentation it drives
pub struct Vault<P, R = Pcg32> {
    controller: RefCell<GameController<R>>,
    presentation: P,
}

impl<P: Presentation, R: Rng> Vault<P, R> {
    pub fn new(controller: GameController<R>, presentation: P) -> Self {
        Self {
            controller: RefCell::new(controller),
            presentation,
        }
    }

    pub fn state(&self) -> GameState {
        self.controller.borrow().state()
    }

    pub fn controller(&self) -> Ref<'_, GameController<R>> {
        self.controller.borrow()
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    /// Scene is ready: open for input and start the clock
    pub fn start(&self) -> Result<(), ControllerError> {
        self.controller.borrow_mut().finish_setup()?;
        self.presentation.reset_timer();
        self.presentation.start_timer();
        Ok(())
    }

    /// Handle one click, playing out any sequence it triggers.
    ///
    /// Resolves once the vault is back in `Input` (or immediately when the
    /// click was accepted or ignored).
    pub async fn on_step(&self, direction: Direction) -> Result<StepOutcome, ControllerError> {
        let outcome = self.controller.borrow_mut().on_step(direction);
        self.play_sequence(outcome).await?;
        Ok(outcome)
    }

    /// Play whatever `outcome` calls for, ending in a round reset
    async fn play_sequence(&self, outcome: StepOutcome) -> Result<(), ControllerError> {
        match outcome {
            StepOutcome::Ignored | StepOutcome::Accepted => {}
            StepOutcome::Opened => {
                self.presentation.stop_timer();
                self.presentation.play_open_sequence().await;
                self.controller.borrow_mut().door_opened()?;
                self.presentation.play_reveal().await;
                self.reset_round(RoundOutcome::Opened).await?;
            }
            StepOutcome::Failed => {
                self.presentation.stop_timer();
                self.presentation.play_fail_spin().await;
                self.reset_round(RoundOutcome::Failed).await?;
            }
        }
        Ok(())
    }

    async fn reset_round(&self, outcome: RoundOutcome) -> Result<(), ControllerError> {
        self.controller.borrow_mut().begin_reset(outcome)?;
        self.presentation.reset_visuals().await;
        self.presentation.reset_timer();
        self.presentation.start_timer();
        self.controller.borrow_mut().resume_input()
    }

    /// Consume clicks in order until the sender side closes.
    ///
    /// The receiver keeps being read while a sequence plays, so every click
    /// meets the state current at the moment it is taken off the channel:
    /// clicks taken mid-sequence are dropped by the controller, the rest are
    /// routed as usual.
    pub async fn run(
        &self,
        mut steps: mpsc::UnboundedReceiver<Direction>,
    ) -> Result<(), ControllerError> {
        while let Some(direction) = steps.next().await {
            let outcome = self.controller.borrow_mut().on_step(direction);
            if !outcome.ends_round() {
                continue;
            }

            let sequence = self.play_sequence(outcome).fuse();
            pin_mut!(sequence);
            loop {
                // Finished sequences win over pending clicks
                select_biased! {
                    result = sequence => {
                        result?;
                        break;
                    }
                    next = steps.next() => match next {
                        Some(direction) => {
                            self.controller.borrow_mut().on_step(direction);
                        }
                        None => {
                            sequence.as_mut().await?;
                            return Ok(());
                        }
                    },
                }
            }
        }
        Ok(())
    }
}
