//! Vault Lock - a browser vault-lock puzzle
//!
//! Core modules:
//! - `vault`: Deterministic core (secret combination, state machine, sequence driver)
//! - `settings`: Persisted preferences and combination rules

pub mod settings;
pub mod vault;

pub use settings::{Settings, SettingsError};
pub use vault::{
    CombinationEngine, CombinationRules, Direction, GameController, GameState, Presentation,
    StepOutcome, StepResult, Vault,
};

/// Game configuration constants
pub mod consts {
    /// Number of pairs in a secret (3 pairs => up to 9 clicks)
    pub const COMBINATION_LEN: usize = 3;
    /// Clicks a single pair may require (inclusive range)
    pub const MIN_CLICKS: u32 = 1;
    pub const MAX_CLICKS: u32 = 3;

    /// Handle rotation per click (60 degrees)
    pub const STEP_ANGLE: f32 = std::f32::consts::PI / 3.0;
    /// Duration of one click rotation
    pub const HANDLE_STEP_SECS: f32 = 0.25;

    /// Full turns of the failure spin (6π)
    pub const FAIL_SPIN_TURNS: u32 = 3;
    pub const FAIL_SPIN_SECS: f32 = 1.0;

    /// Door swing duration
    pub const DOOR_OPEN_SECS: f32 = 1.0;
    /// Pause between the door settling and the reveal blink
    pub const REVEAL_DELAY_SECS: f32 = 0.3;
    /// Reveal blink duration
    pub const BLINK_SECS: f32 = 1.2;
}
