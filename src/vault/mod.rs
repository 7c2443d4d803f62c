//! Deterministic vault core
//!
//! All decision logic lives here. This module must stay free of rendering and
//! platform code:
//! - Seeded RNG only (injected, never a global call)
//! - Synchronous state transitions; animations are awaited through `Presentation`
//! - Input outside `GameState::Input` is dropped, never queued

pub mod combination;
pub mod controller;
pub mod sequence;
pub mod state;

pub use combination::{
    CombinationEngine, CombinationError, CombinationRules, CombinationStep, Direction,
    PlayerProgress, Secret, StepResult,
};
pub use controller::{ControllerError, GameController};
pub use sequence::{Presentation, Vault};
pub use state::{GameState, RoundOutcome, StepOutcome};
