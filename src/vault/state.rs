//! Game states and transition results

use serde::{Deserialize, Serialize};

/// Current phase of the vault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// Scene still being set up, nothing accepted yet
    Locked,
    /// Waiting for handle clicks
    Input,
    /// Door swinging open
    Opening,
    /// Door open, reveal playing
    Open,
    /// Failure spin and/or round reset in progress
    Resetting,
}

impl GameState {
    /// Only `Input` routes clicks into the combination engine
    pub fn accepts_input(self) -> bool {
        self == GameState::Input
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameState::Locked => "Locked",
            GameState::Input => "Input",
            GameState::Opening => "Opening",
            GameState::Open => "Open",
            GameState::Resetting => "Resetting",
        }
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    Opened,
    Failed,
}

/// What the controller did with a click, and what the view must play next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    /// Click arrived outside `Input` and was dropped
    Ignored,
    /// Click was correct, round continues
    Accepted,
    /// Combination complete: play the open sequence
    Opened,
    /// Wrong direction: play the failure spin
    Failed,
}

impl StepOutcome {
    /// Outcomes that start an animated sequence ending in a round reset
    pub fn ends_round(self) -> bool {
        matches!(self, StepOutcome::Opened | StepOutcome::Failed)
    }
}
