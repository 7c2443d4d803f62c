//! Secret combination and per-click matching
//!
//! The engine owns the secret and the player's progress toward it. Every click
//! is classified as `Continue`, `Fail` or `Success`; a terminal result must be
//! followed by `reset` before the engine accepts another click.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{COMBINATION_LEN, MAX_CLICKS, MIN_CLICKS};

/// Errors raised while building directions, rules or fixed secrets
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombinationError {
    #[error("direction must be +1 or -1, got {0}")]
    InvalidDirection(i8),
    #[error("invalid combination rules: length {length}, clicks {min_clicks}..={max_clicks}")]
    InvalidRules {
        length: usize,
        min_clicks: u32,
        max_clicks: u32,
    },
    #[error("secret must have {expected} pairs, got {found}")]
    SecretLength { expected: usize, found: usize },
    #[error("pair {index} requires {clicks} clicks, allowed range is {min}..={max}")]
    ClicksOutOfRange {
        index: usize,
        clicks: u32,
        min: u32,
        max: u32,
    },
}

/// Handle turn direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    /// Signed form (+1 clockwise, -1 counter-clockwise)
    pub fn sign(self) -> i8 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Clockwise => "clockwise",
            Direction::CounterClockwise => "counterclockwise",
        }
    }

    /// Parse a player-typed direction (`cw`, `ccw`, `+`, `-`, or the full word)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cw" | "clockwise" | "+" => Some(Direction::Clockwise),
            "ccw" | "counterclockwise" | "-" => Some(Direction::CounterClockwise),
            _ => None,
        }
    }
}

impl From<Direction> for i8 {
    fn from(direction: Direction) -> Self {
        direction.sign()
    }
}

impl TryFrom<i8> for Direction {
    type Error = CombinationError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Direction::Clockwise),
            -1 => Ok(Direction::CounterClockwise),
            other => Err(CombinationError::InvalidDirection(other)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pair of the secret: `required_clicks` consecutive clicks in `direction`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinationStep {
    pub required_clicks: u32,
    pub direction: Direction,
}

impl CombinationStep {
    pub fn new(required_clicks: u32, direction: Direction) -> Self {
        Self {
            required_clicks,
            direction,
        }
    }
}

impl fmt::Display for CombinationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.required_clicks, self.direction)
    }
}

/// Shape of every secret an engine generates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinationRules {
    length: usize,
    min_clicks: u32,
    max_clicks: u32,
}

impl Default for CombinationRules {
    fn default() -> Self {
        Self {
            length: COMBINATION_LEN,
            min_clicks: MIN_CLICKS,
            max_clicks: MAX_CLICKS,
        }
    }
}

impl CombinationRules {
    /// Rules for `length` pairs of `min_clicks..=max_clicks` clicks each
    pub fn new(length: usize, min_clicks: u32, max_clicks: u32) -> Result<Self, CombinationError> {
        if length == 0 || min_clicks == 0 || min_clicks > max_clicks {
            return Err(CombinationError::InvalidRules {
                length,
                min_clicks,
                max_clicks,
            });
        }
        Ok(Self {
            length,
            min_clicks,
            max_clicks,
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn min_clicks(&self) -> u32 {
        self.min_clicks
    }

    pub fn max_clicks(&self) -> u32 {
        self.max_clicks
    }
}

/// The full ordered list of pairs the player must reproduce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secret {
    steps: Vec<CombinationStep>,
}

impl Secret {
    /// Draw a fresh secret. Built in one go, so no partial secret is ever observable.
    pub fn generate<R: Rng>(rules: &CombinationRules, rng: &mut R) -> Self {
        let steps = (0..rules.length)
            .map(|_| {
                let required_clicks = rng.random_range(rules.min_clicks..=rules.max_clicks);
                let direction = if rng.random_bool(0.5) {
                    Direction::Clockwise
                } else {
                    Direction::CounterClockwise
                };
                CombinationStep::new(required_clicks, direction)
            })
            .collect();
        Self { steps }
    }

    /// Build a fixed secret, checked against `rules`
    pub fn from_steps(
        rules: &CombinationRules,
        steps: Vec<CombinationStep>,
    ) -> Result<Self, CombinationError> {
        if steps.len() != rules.length {
            return Err(CombinationError::SecretLength {
                expected: rules.length,
                found: steps.len(),
            });
        }
        if let Some((index, step)) = steps.iter().enumerate().find(|(_, s)| {
            s.required_clicks < rules.min_clicks || s.required_clicks > rules.max_clicks
        }) {
            return Err(CombinationError::ClicksOutOfRange {
                index,
                clicks: step.required_clicks,
                min: rules.min_clicks,
                max: rules.max_clicks,
            });
        }
        Ok(Self { steps })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[CombinationStep] {
        &self.steps
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// Classification of a single click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepResult {
    /// Correct so far, keep turning
    Continue,
    /// Wrong direction, the attempt is over
    Fail,
    /// Last pair completed, the vault opens
    Success,
}

impl StepResult {
    /// Terminal results end the attempt; the engine needs a reset afterwards
    pub fn is_terminal(self) -> bool {
        !matches!(self, StepResult::Continue)
    }
}

/// Player progress toward the current secret
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerProgress {
    matched_pairs: Vec<CombinationStep>,
    current_run: u32,
}

impl PlayerProgress {
    /// Pairs completed so far, in order
    pub fn matched_pairs(&self) -> &[CombinationStep] {
        &self.matched_pairs
    }

    /// Consecutive correct clicks toward the pair at `matched_pairs().len()`
    pub fn current_run(&self) -> u32 {
        self.current_run
    }

    fn clear(&mut self) {
        self.matched_pairs.clear();
        self.current_run = 0;
    }
}

/// Owns the secret and classifies every click against it
#[derive(Debug, Clone)]
pub struct CombinationEngine<R = Pcg32> {
    rules: CombinationRules,
    rng: R,
    secret: Secret,
    progress: PlayerProgress,
    /// Set once a terminal result has been returned
    finished: Option<StepResult>,
}

impl CombinationEngine<Pcg32> {
    /// Engine driven by a PCG stream seeded with `seed`
    pub fn seeded(rules: CombinationRules, seed: u64) -> Self {
        Self::new(rules, Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> CombinationEngine<R> {
    /// Create an engine and draw its first secret immediately
    pub fn new(rules: CombinationRules, mut rng: R) -> Self {
        let secret = Secret::generate(&rules, &mut rng);
        let engine = Self {
            rules,
            rng,
            secret,
            progress: PlayerProgress::default(),
            finished: None,
        };
        engine.log_secret();
        engine
    }

    /// Create an engine with a fixed first secret; later resets draw from `rng`
    pub fn with_secret(
        rules: CombinationRules,
        rng: R,
        secret: Secret,
    ) -> Result<Self, CombinationError> {
        let secret = Secret::from_steps(&rules, secret.steps)?;
        let engine = Self {
            rules,
            rng,
            secret,
            progress: PlayerProgress::default(),
            finished: None,
        };
        engine.log_secret();
        Ok(engine)
    }

    /// Replace the secret with a fresh draw and clear all progress
    pub fn generate_secret(&mut self) {
        self.secret = Secret::generate(&self.rules, &mut self.rng);
        self.progress.clear();
        self.finished = None;
        self.log_secret();
    }

    /// Classify one click.
    ///
    /// A direction mismatch at the current pair fails the whole attempt, no
    /// matter how far the current run had got. Progress is left untouched on
    /// failure; the caller resets before the next attempt.
    ///
    /// # Panics
    ///
    /// Panics if a previous click already returned `Fail` or `Success` and the
    /// engine has not been reset since.
    pub fn process_step(&mut self, direction: Direction) -> StepResult {
        if let Some(result) = self.finished {
            panic!("process_step called after {result:?} without a reset");
        }

        let expected = self.secret.steps[self.progress.matched_pairs.len()];

        let result = if direction != expected.direction {
            StepResult::Fail
        } else {
            self.progress.current_run += 1;
            if self.progress.current_run < expected.required_clicks {
                StepResult::Continue
            } else {
                self.progress
                    .matched_pairs
                    .push(CombinationStep::new(self.progress.current_run, direction));
                self.progress.current_run = 0;
                if self.progress.matched_pairs.len() == self.secret.len() {
                    StepResult::Success
                } else {
                    StepResult::Continue
                }
            }
        };

        if result.is_terminal() {
            self.finished = Some(result);
        }
        result
    }

    /// Clear progress and draw a new secret
    pub fn reset(&mut self) {
        self.progress.clear();
        self.generate_secret();
    }

    pub fn rules(&self) -> &CombinationRules {
        &self.rules
    }

    pub fn progress(&self) -> &PlayerProgress {
        &self.progress
    }

    /// Whether a terminal result is waiting for a reset
    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }

    /// Not exposed outside the crate; the secret must never reach the view
    pub(crate) fn secret(&self) -> &Secret {
        &self.secret
    }

    fn log_secret(&self) {
        log::debug!("Secret: {}", self.secret);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use Direction::{Clockwise as Cw, CounterClockwise as Ccw};

    fn engine_with(steps: &[(u32, Direction)]) -> CombinationEngine {
        let rules = CombinationRules::new(steps.len(), 1, 3).unwrap();
        let steps = steps
            .iter()
            .map(|&(clicks, dir)| CombinationStep::new(clicks, dir))
            .collect();
        let secret = Secret::from_steps(&rules, steps).unwrap();
        CombinationEngine::with_secret(rules, Pcg32::seed_from_u64(7), secret).unwrap()
    }

    /// Clicks that reproduce the secret exactly
    fn solution(secret: &Secret) -> Vec<Direction> {
        secret
            .steps()
            .iter()
            .flat_map(|s| std::iter::repeat_n(s.direction, s.required_clicks as usize))
            .collect()
    }

    #[test]
    fn test_default_secret_shape() {
        let engine = CombinationEngine::seeded(CombinationRules::default(), 12345);
        assert_eq!(engine.secret().len(), COMBINATION_LEN);
        for step in engine.secret().steps() {
            assert!((1..=3).contains(&step.required_clicks));
        }
        assert!(engine.progress().matched_pairs().is_empty());
        assert_eq!(engine.progress().current_run(), 0);
    }

    #[test]
    fn test_known_secret_opens() {
        let mut engine = engine_with(&[(2, Cw), (1, Ccw), (3, Cw)]);
        let results: Vec<_> = [Cw, Cw, Ccw, Cw, Cw, Cw]
            .into_iter()
            .map(|d| engine.process_step(d))
            .collect();
        assert_eq!(
            results,
            vec![
                StepResult::Continue,
                StepResult::Continue,
                StepResult::Continue,
                StepResult::Continue,
                StepResult::Continue,
                StepResult::Success,
            ]
        );
        assert_eq!(
            engine.progress().matched_pairs(),
            &[
                CombinationStep::new(2, Cw),
                CombinationStep::new(1, Ccw),
                CombinationStep::new(3, Cw)
            ]
        );
        assert!(engine.is_finished());
    }

    #[test]
    fn test_wrong_direction_fails() {
        let mut engine = engine_with(&[(1, Cw)]);
        assert_eq!(engine.process_step(Ccw), StepResult::Fail);
        assert!(engine.is_finished());
    }

    #[test]
    fn test_mismatch_mid_run_fails_whole_attempt() {
        let mut engine = engine_with(&[(1, Cw), (3, Ccw)]);
        assert_eq!(engine.process_step(Cw), StepResult::Continue);
        assert_eq!(engine.process_step(Ccw), StepResult::Continue);
        assert_eq!(engine.process_step(Cw), StepResult::Fail);
        // Progress is left as-is on failure
        assert_eq!(engine.progress().matched_pairs().len(), 1);
        assert_eq!(engine.progress().current_run(), 1);
    }

    #[test]
    fn test_overshooting_a_pair_fails() {
        // Third clockwise click lands on the counter-clockwise pair
        let mut engine = engine_with(&[(2, Cw), (1, Ccw)]);
        assert_eq!(engine.process_step(Cw), StepResult::Continue);
        assert_eq!(engine.process_step(Cw), StepResult::Continue);
        assert_eq!(engine.process_step(Cw), StepResult::Fail);
    }

    #[test]
    #[should_panic(expected = "without a reset")]
    fn test_step_after_fail_panics() {
        let mut engine = engine_with(&[(1, Cw)]);
        engine.process_step(Ccw);
        engine.process_step(Cw);
    }

    #[test]
    #[should_panic(expected = "without a reset")]
    fn test_step_after_success_panics() {
        let mut engine = engine_with(&[(1, Cw)]);
        engine.process_step(Cw);
        engine.process_step(Cw);
    }

    #[test]
    fn test_reset_clears_progress() {
        let mut engine = engine_with(&[(2, Cw), (2, Cw)]);
        engine.process_step(Cw);
        engine.process_step(Cw);
        engine.process_step(Cw);
        assert_eq!(engine.progress().matched_pairs().len(), 1);
        assert_eq!(engine.progress().current_run(), 1);

        engine.reset();
        assert!(engine.progress().matched_pairs().is_empty());
        assert_eq!(engine.progress().current_run(), 0);
        assert_eq!(engine.secret().len(), 2);
        assert!(!engine.is_finished());
    }

    #[test]
    fn test_same_seed_same_secrets() {
        let mut a = CombinationEngine::seeded(CombinationRules::default(), 99999);
        let mut b = CombinationEngine::seeded(CombinationRules::default(), 99999);
        assert_eq!(a.secret(), b.secret());
        a.reset();
        b.reset();
        assert_eq!(a.secret(), b.secret());
    }

    #[test]
    fn test_rules_validation() {
        assert!(CombinationRules::new(3, 1, 3).is_ok());
        assert!(CombinationRules::new(1, 2, 2).is_ok());
        assert!(matches!(
            CombinationRules::new(0, 1, 3),
            Err(CombinationError::InvalidRules { length: 0, .. })
        ));
        assert!(CombinationRules::new(3, 0, 3).is_err());
        assert!(CombinationRules::new(3, 3, 2).is_err());
    }

    #[test]
    fn test_malformed_secret_rejected() {
        let rules = CombinationRules::default();
        let short = Secret::from_steps(&rules, vec![CombinationStep::new(1, Cw)]);
        assert_eq!(
            short,
            Err(CombinationError::SecretLength {
                expected: 3,
                found: 1
            })
        );

        let zero = Secret::from_steps(
            &rules,
            vec![
                CombinationStep::new(1, Cw),
                CombinationStep::new(0, Ccw),
                CombinationStep::new(2, Cw),
            ],
        );
        assert!(matches!(
            zero,
            Err(CombinationError::ClicksOutOfRange { index: 1, clicks: 0, .. })
        ));
    }

    #[test]
    fn test_with_secret_checks_rules() {
        let three = CombinationRules::default();
        let secret = Secret::from_steps(
            &three,
            vec![CombinationStep::new(1, Cw); 3],
        )
        .unwrap();
        let two = CombinationRules::new(2, 1, 3).unwrap();
        let result = CombinationEngine::with_secret(two, Pcg32::seed_from_u64(1), secret);
        assert!(matches!(
            result,
            Err(CombinationError::SecretLength {
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn test_direction_signed_form() {
        assert_eq!(i8::from(Cw), 1);
        assert_eq!(i8::from(Ccw), -1);
        assert_eq!(Direction::try_from(-1), Ok(Ccw));
        assert_eq!(
            Direction::try_from(0),
            Err(CombinationError::InvalidDirection(0))
        );
        assert_eq!(Cw.opposite(), Ccw);

        assert_eq!(serde_json::to_string(&Ccw).unwrap(), "-1");
        assert_eq!(serde_json::from_str::<Direction>("1").unwrap(), Cw);
        assert!(serde_json::from_str::<Direction>("2").is_err());
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::parse("CW"), Some(Cw));
        assert_eq!(Direction::parse(" ccw "), Some(Ccw));
        assert_eq!(Direction::parse("+"), Some(Cw));
        assert_eq!(Direction::parse("counterclockwise"), Some(Ccw));
        assert_eq!(Direction::parse("up"), None);
        assert_eq!(Direction::parse("r"), None);
        assert_eq!(Direction::parse("l"), None);
    }

    #[test]
    fn test_secret_display() {
        let engine = engine_with(&[(2, Cw), (1, Ccw), (3, Cw)]);
        assert_eq!(
            engine.secret().to_string(),
            "2 clockwise, 1 counterclockwise, 3 clockwise"
        );
    }

    fn rules_strategy() -> impl Strategy<Value = CombinationRules> {
        (1usize..6, 1u32..4, 0u32..3)
            .prop_map(|(len, min, extra)| CombinationRules::new(len, min, min + extra).unwrap())
    }

    proptest! {
        #[test]
        fn test_generated_secret_respects_rules(rules in rules_strategy(), seed in any::<u64>()) {
            let mut engine = CombinationEngine::seeded(rules, seed);
            for _ in 0..3 {
                prop_assert_eq!(engine.secret().len(), rules.length());
                for step in engine.secret().steps() {
                    prop_assert!(step.required_clicks >= rules.min_clicks());
                    prop_assert!(step.required_clicks <= rules.max_clicks());
                }
                engine.reset();
            }
        }

        #[test]
        fn test_replaying_secret_succeeds(rules in rules_strategy(), seed in any::<u64>()) {
            let mut engine = CombinationEngine::seeded(rules, seed);
            let clicks = solution(engine.secret());
            let (last, rest) = clicks.split_last().unwrap();
            for &dir in rest {
                prop_assert_eq!(engine.process_step(dir), StepResult::Continue);
            }
            prop_assert_eq!(engine.process_step(*last), StepResult::Success);
        }

        #[test]
        fn test_wrong_first_click_fails(rules in rules_strategy(), seed in any::<u64>()) {
            let mut engine = CombinationEngine::seeded(rules, seed);
            let first = engine.secret().steps()[0].direction;
            prop_assert_eq!(engine.process_step(first.opposite()), StepResult::Fail);
        }

        #[test]
        fn test_reset_behaves_like_fresh(seed in any::<u64>(), played in 0usize..4) {
            let mut engine = CombinationEngine::seeded(CombinationRules::default(), seed);
            for dir in solution(engine.secret()).into_iter().take(played) {
                engine.process_step(dir);
            }
            engine.reset();
            prop_assert!(engine.progress().matched_pairs().is_empty());
            prop_assert_eq!(engine.progress().current_run(), 0);

            let clicks = solution(engine.secret());
            let results: Vec<_> = clicks.iter().map(|&d| engine.process_step(d)).collect();
            prop_assert_eq!(results.last(), Some(&StepResult::Success));
        }
    }
}
