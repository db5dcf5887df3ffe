//! Trainer component and its mood state machine.
use std::{fmt, time::Duration};

use bevy::prelude::*;

use crate::catalog::{
    records::{Punishment, RecordKind, Reward},
    store::Catalog,
};

use super::{
    dice::RandomSource,
    errors::TrainerError,
    policy::{reward_candidates, PermissionPolicy, RewardMatchPolicy},
    schedule::{ScenarioCadence, ScenarioSchedule, StepSink},
};

pub const DEFAULT_MIN_MOOD: f64 = -100.0;
pub const DEFAULT_MAX_MOOD: f64 = 100.0;

/// Stable identifier of a trainer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrainerId(String);

impl TrainerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[allow(dead_code)]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity fields shared by every trainer.
#[derive(Debug, Clone)]
pub struct TrainerProfile {
    pub id: TrainerId,
    pub name: String,
    pub description: String,
}

impl TrainerProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: TrainerId::new(id),
            name: name.into(),
            description: String::new(),
        }
    }
}

/// Inclusive range mood is kept in. Always finite with `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoodBounds {
    min: f64,
    max: f64,
}

impl MoodBounds {
    /// Builds bounds from any pair of ends. Non-finite ends fall back to the
    /// defaults and an inverted pair is swapped.
    pub fn new(min: f64, max: f64) -> Self {
        let min = if min.is_finite() { min } else { DEFAULT_MIN_MOOD };
        let max = if max.is_finite() { max } else { DEFAULT_MAX_MOOD };
        let low = min.min(max);
        Self {
            min: low,
            max: min.max(max).max(low + f64::EPSILON),
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    #[allow(dead_code)]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for MoodBounds {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_MOOD, DEFAULT_MAX_MOOD)
    }
}

/// Mood before and after an operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoodShift {
    pub before: f64,
    pub after: f64,
}

impl MoodShift {
    pub fn is_change(&self) -> bool {
        self.after != self.before
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrainerPolicies {
    pub permission: PermissionPolicy,
    pub reward_match: RewardMatchPolicy,
}

/// A coach holding a bounded mood and allow-lists of records it may act on.
#[derive(Component, Debug, Clone)]
pub struct Trainer {
    pub profile: TrainerProfile,
    pub active: bool,
    pub reward_multiplier: f64,
    pub punishment_multiplier: f64,
    pub scenario_rate_secs: u64,
    pub scenarios: Vec<String>,
    pub rewards: Vec<String>,
    pub punishments: Vec<String>,
    pub permissions: Vec<String>,
    pub confessions: Vec<String>,
    pub policies: TrainerPolicies,
    bounds: MoodBounds,
    mood: f64,
}

impl Trainer {
    pub fn new(profile: TrainerProfile, bounds: MoodBounds) -> Self {
        Self {
            profile,
            active: false,
            reward_multiplier: 1.0,
            punishment_multiplier: 1.0,
            scenario_rate_secs: 60,
            scenarios: Vec::new(),
            rewards: Vec::new(),
            punishments: Vec::new(),
            permissions: Vec::new(),
            confessions: Vec::new(),
            policies: TrainerPolicies::default(),
            bounds,
            mood: bounds.clamp(0.0),
        }
    }

    /// Sets the starting mood, clamped into bounds.
    pub fn with_mood(mut self, mood: f64) -> Self {
        if !mood.is_nan() {
            self.mood = self.bounds.clamp(mood);
        }
        self
    }

    pub fn id(&self) -> &TrainerId {
        &self.profile.id
    }

    pub fn mood(&self) -> f64 {
        self.mood
    }

    pub fn bounds(&self) -> MoodBounds {
        self.bounds
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Activates the trainer and returns the schedule driving its scenario trigger.
    pub fn init(&mut self, cadence: ScenarioCadence) -> ScenarioSchedule {
        self.active = true;
        ScenarioSchedule::new(cadence, Duration::from_secs(self.scenario_rate_secs))
    }

    #[allow(dead_code)]
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn confess_to(
        &mut self,
        confession_id: &str,
        catalog: &dyn Catalog,
    ) -> Result<(), TrainerError> {
        if !self.confessions.iter().any(|id| id == confession_id) {
            return Err(TrainerError::not_found(RecordKind::Confession, confession_id));
        }

        let confession = catalog.confession(confession_id)?;
        self.modify_mood(confession.value);
        Ok(())
    }

    pub fn ask_permission(
        &self,
        permission_id: &str,
        catalog: &dyn Catalog,
        dice: &mut dyn RandomSource,
    ) -> Result<bool, TrainerError> {
        if !self.permissions.iter().any(|id| id == permission_id) {
            return Err(TrainerError::not_found(RecordKind::Permission, permission_id));
        }

        let permission = catalog.permission(permission_id)?;
        Ok(self.policies.permission.decide(self.mood, &permission, dice))
    }

    /// Returns the first allow-listed punishment. `val` does not influence selection.
    pub fn get_punished(&self, _val: f64, catalog: &dyn Catalog) -> Result<Punishment, TrainerError> {
        let Some(first) = self.punishments.first() else {
            return Err(TrainerError::NoPunishmentsAvailable);
        };

        Ok(catalog.punishment(first)?)
    }

    /// Picks the reward whose value is closest to `val`, applies it, and returns it.
    pub fn reward(
        &mut self,
        val: f64,
        catalog: &dyn Catalog,
        dice: &mut dyn RandomSource,
    ) -> Result<Reward, TrainerError> {
        if self.rewards.is_empty() {
            return Err(TrainerError::NoRewardsAvailable);
        }

        let rewards = self
            .rewards
            .iter()
            .map(|id| catalog.reward(id))
            .collect::<Result<Vec<_>, _>>()?;

        let candidates = reward_candidates(
            &rewards,
            val,
            self.bounds.span(),
            self.policies.reward_match,
        );
        if candidates.is_empty() {
            return Err(TrainerError::NoMatchingReward { target: val });
        }

        let index = dice.pick(candidates.len()).min(candidates.len() - 1);
        let chosen = candidates[index].clone();
        self.modify_mood(chosen.value);
        Ok(chosen)
    }

    /// Runs the first allow-listed scenario: steps go to `sink`, then its reward applies.
    pub fn trigger_scenario(
        &mut self,
        catalog: &dyn Catalog,
        sink: &mut dyn StepSink,
    ) -> Result<(), TrainerError> {
        let Some(first) = self.scenarios.first() else {
            return Err(TrainerError::NoScenariosAvailable);
        };

        let scenario = catalog.scenario(first)?;
        for (index, step) in scenario.steps.iter().enumerate() {
            sink.display_step(&scenario, index, step);
        }

        self.modify_mood(scenario.reward);
        Ok(())
    }

    fn modify_mood(&mut self, val: f64) {
        let multiplier = if val > 0.0 {
            self.reward_multiplier
        } else {
            self.punishment_multiplier
        };

        let next = self.mood + val * multiplier;
        if next.is_nan() {
            return;
        }
        self.mood = self.bounds.clamp(next);
    }
}
