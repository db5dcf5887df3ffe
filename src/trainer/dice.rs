//! Injectable randomness used by permission rolls and reward tie-breaks.
use bevy::prelude::Resource;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Source of uniform draws.
pub trait RandomSource: Send + Sync {
    /// Uniform draw in `[0, 1)`.
    fn roll(&mut self) -> f64;

    /// Uniform index in `0..len`. Callers never pass zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// `RandomSource` backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngDice<R> {
    rng: R,
}

impl<R: Rng> RngDice<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngDice<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    #[allow(dead_code)]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send + Sync> RandomSource for RngDice<R> {
    fn roll(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len.max(1))
    }
}

/// Resource handing the shared random source to trainer systems.
#[derive(Resource)]
pub struct TrainerDice {
    source: Box<dyn RandomSource>,
}

impl TrainerDice {
    pub fn new(source: Box<dyn RandomSource>) -> Self {
        Self { source }
    }

    pub fn source_mut(&mut self) -> &mut dyn RandomSource {
        self.source.as_mut()
    }
}

impl Default for TrainerDice {
    fn default() -> Self {
        Self::new(Box::new(RngDice::from_entropy()))
    }
}

/// Replays fixed rolls and picks; repeats the last value once exhausted.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    rolls: std::collections::VecDeque<f64>,
    picks: std::collections::VecDeque<usize>,
    last_roll: f64,
    last_pick: usize,
    pub rolls_taken: usize,
}

#[cfg(test)]
impl ScriptedDice {
    pub fn new(rolls: &[f64], picks: &[usize]) -> Self {
        Self {
            rolls: rolls.iter().copied().collect(),
            picks: picks.iter().copied().collect(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
impl RandomSource for ScriptedDice {
    fn roll(&mut self) -> f64 {
        self.rolls_taken += 1;
        if let Some(roll) = self.rolls.pop_front() {
            self.last_roll = roll;
        }
        self.last_roll
    }

    fn pick(&mut self, len: usize) -> usize {
        if let Some(pick) = self.picks.pop_front() {
            self.last_pick = pick;
        }
        self.last_pick.min(len.saturating_sub(1))
    }
}
