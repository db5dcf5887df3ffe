//! Trainer settings loaded from `config/trainer.toml`.
use std::{env, fs, path::PathBuf};

use bevy::prelude::*;
use serde::Deserialize;

use super::{
    policy::{PermissionPolicy, RewardMatchPolicy},
    schedule::ScenarioCadence,
    state::{
        MoodBounds, Trainer, TrainerPolicies, TrainerProfile, DEFAULT_MAX_MOOD, DEFAULT_MIN_MOOD,
    },
};

const CONFIG_PATH: &str = "config/trainer.toml";
const CONFIG_PATH_ENV: &str = "TRAINER_CONFIG_PATH";
const DEFAULT_JOURNAL_PATH: &str = "logs/trainer_history.jsonl";
const DEFAULT_JOURNAL_CAPACITY: usize = 64;
const MIN_SCENARIO_RATE_SECS: u64 = 1;

#[derive(Debug, Clone, Deserialize)]
struct RawTrainerSettings {
    #[serde(default)]
    mood: RawMoodSection,
    #[serde(default)]
    policy: RawPolicySection,
    #[serde(default)]
    journal: RawJournalSection,
    #[serde(default = "default_trainers")]
    trainers: Vec<RawTrainerDefinition>,
}

impl Default for RawTrainerSettings {
    fn default() -> Self {
        Self {
            mood: RawMoodSection::default(),
            policy: RawPolicySection::default(),
            journal: RawJournalSection::default(),
            trainers: default_trainers(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawMoodSection {
    min: f64,
    max: f64,
    start: f64,
}

impl Default for RawMoodSection {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_MOOD,
            max: DEFAULT_MAX_MOOD,
            start: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawPolicySection {
    permission: PermissionPolicy,
    reward_match: RewardMatchPolicy,
    scenario_cadence: ScenarioCadence,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawJournalSection {
    path: String,
    capacity: usize,
}

impl Default for RawJournalSection {
    fn default() -> Self {
        Self {
            path: DEFAULT_JOURNAL_PATH.to_string(),
            capacity: DEFAULT_JOURNAL_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawTrainerDefinition {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_multiplier")]
    reward_multiplier: f64,
    #[serde(default = "default_multiplier")]
    punishment_multiplier: f64,
    #[serde(default = "default_scenario_rate")]
    scenario_rate_secs: u64,
    #[serde(default)]
    scenarios: Vec<String>,
    #[serde(default)]
    rewards: Vec<String>,
    #[serde(default)]
    punishments: Vec<String>,
    #[serde(default)]
    permissions: Vec<String>,
    #[serde(default)]
    confessions: Vec<String>,
}

fn default_multiplier() -> f64 {
    1.0
}

fn default_scenario_rate() -> u64 {
    600
}

fn default_trainers() -> Vec<RawTrainerDefinition> {
    vec![RawTrainerDefinition {
        id: "coach".to_string(),
        name: "Coach".to_string(),
        description: "Keeps you honest about your training.".to_string(),
        reward_multiplier: 1.0,
        punishment_multiplier: 1.5,
        scenario_rate_secs: default_scenario_rate(),
        scenarios: vec!["morning_routine".to_string()],
        rewards: vec!["rest_day".to_string(), "praise".to_string()],
        punishments: vec!["burpees".to_string()],
        permissions: vec!["cheat_meal".to_string()],
        confessions: vec!["skipped_workout".to_string(), "extra_set".to_string()],
    }]
}

/// Runtime configuration derived from `config/trainer.toml`.
#[derive(Resource, Debug, Clone)]
pub struct TrainerSettings {
    pub bounds: MoodBounds,
    pub start_mood: f64,
    pub policies: TrainerPolicies,
    pub scenario_cadence: ScenarioCadence,
    pub journal: JournalSettings,
    pub trainers: Vec<TrainerDefinition>,
}

#[derive(Debug, Clone)]
pub struct JournalSettings {
    pub path: PathBuf,
    pub capacity: usize,
}

/// A configured trainer, ready to be turned into a `Trainer` component.
#[derive(Debug, Clone)]
pub struct TrainerDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub reward_multiplier: f64,
    pub punishment_multiplier: f64,
    pub scenario_rate_secs: u64,
    pub scenarios: Vec<String>,
    pub rewards: Vec<String>,
    pub punishments: Vec<String>,
    pub permissions: Vec<String>,
    pub confessions: Vec<String>,
}

impl TrainerSettings {
    pub fn load_or_default() -> Self {
        let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| CONFIG_PATH.to_string());
        match fs::read_to_string(&path) {
            Ok(raw) => Self::from_toml_or_default(&raw, &path),
            Err(err) => {
                warn!(
                    "Failed to read {} ({}). Falling back to defaults.",
                    path, err
                );
                RawTrainerSettings::default().into()
            }
        }
    }

    fn from_toml_or_default(raw: &str, source: &str) -> Self {
        match toml::from_str::<RawTrainerSettings>(raw) {
            Ok(parsed) => parsed.into(),
            Err(err) => {
                warn!(
                    "Failed to parse {} ({}). Falling back to defaults.",
                    source, err
                );
                RawTrainerSettings::default().into()
            }
        }
    }

    /// Builds the trainer component for a definition, with mood at the configured start.
    pub fn build_trainer(&self, definition: &TrainerDefinition) -> Trainer {
        let mut profile = TrainerProfile::new(definition.id.clone(), definition.name.clone());
        profile.description = definition.description.clone();

        let mut trainer = Trainer::new(profile, self.bounds).with_mood(self.start_mood);
        trainer.reward_multiplier = definition.reward_multiplier;
        trainer.punishment_multiplier = definition.punishment_multiplier;
        trainer.scenario_rate_secs = definition.scenario_rate_secs;
        trainer.scenarios = definition.scenarios.clone();
        trainer.rewards = definition.rewards.clone();
        trainer.punishments = definition.punishments.clone();
        trainer.permissions = definition.permissions.clone();
        trainer.confessions = definition.confessions.clone();
        trainer.policies = self.policies;
        trainer
    }
}

impl From<RawTrainerSettings> for TrainerSettings {
    fn from(value: RawTrainerSettings) -> Self {
        if !value.mood.min.is_finite() || !value.mood.max.is_finite() {
            warn!(
                "Mood bounds [{}, {}] are not finite; using defaults for those ends",
                value.mood.min, value.mood.max
            );
        }
        let bounds = MoodBounds::new(value.mood.min, value.mood.max);
        let start_mood = if value.mood.start.is_finite() {
            bounds.clamp(value.mood.start)
        } else {
            bounds.clamp(0.0)
        };

        let journal = JournalSettings {
            path: PathBuf::from(value.journal.path.trim()),
            capacity: value.journal.capacity.max(1),
        };

        let trainers = value
            .trainers
            .into_iter()
            .filter_map(|raw| {
                let id = raw.id.trim().to_string();
                if id.is_empty() {
                    warn!("Skipping trainer definition with an empty id");
                    return None;
                }
                let name = if raw.name.trim().is_empty() {
                    id.clone()
                } else {
                    raw.name.trim().to_string()
                };
                Some(TrainerDefinition {
                    id,
                    name,
                    description: raw.description,
                    reward_multiplier: raw.reward_multiplier.max(0.0),
                    punishment_multiplier: raw.punishment_multiplier.max(0.0),
                    scenario_rate_secs: raw.scenario_rate_secs.max(MIN_SCENARIO_RATE_SECS),
                    scenarios: normalise_ids(&raw.scenarios),
                    rewards: normalise_ids(&raw.rewards),
                    punishments: normalise_ids(&raw.punishments),
                    permissions: normalise_ids(&raw.permissions),
                    confessions: normalise_ids(&raw.confessions),
                })
            })
            .collect();

        Self {
            bounds,
            start_mood,
            policies: TrainerPolicies {
                permission: value.policy.permission,
                reward_match: value.policy.reward_match,
            },
            scenario_cadence: value.policy.scenario_cadence,
            journal,
            trainers,
        }
    }
}

fn normalise_ids(ids: &[String]) -> Vec<String> {
    ids.iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}
