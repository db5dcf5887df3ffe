//! Catalog lookups and the TOML-backed in-memory store.
use std::{collections::HashMap, env, fmt, fs, path::Path};

use bevy::{log::warn, prelude::Resource};
use serde::Deserialize;

use super::records::{
    Confession, Permission, Punishment, RecordKind, Reward, Scenario, ScenarioStep,
};

const CATALOG_CONFIG_PATH: &str = "config/catalog.toml";
const CATALOG_PATH_ENV: &str = "TRAINER_CATALOG_PATH";

/// Lookup failure reported by a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    Missing { kind: RecordKind, id: String },
}

impl CatalogError {
    pub fn missing(kind: RecordKind, id: impl Into<String>) -> Self {
        Self::Missing {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { kind, id } => write!(f, "no {} record with id '{}'", kind, id),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Read-only store of trainer records keyed by identifier.
pub trait Catalog: Send + Sync + 'static {
    fn confession(&self, id: &str) -> Result<Confession, CatalogError>;

    fn permission(&self, id: &str) -> Result<Permission, CatalogError>;

    fn punishment(&self, id: &str) -> Result<Punishment, CatalogError>;

    fn reward(&self, id: &str) -> Result<Reward, CatalogError>;

    fn scenario(&self, id: &str) -> Result<Scenario, CatalogError>;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub confessions: Vec<Confession>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub punishments: Vec<Punishment>,
    #[serde(default)]
    pub rewards: Vec<Reward>,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    confessions: HashMap<String, Confession>,
    permissions: HashMap<String, Permission>,
    punishments: HashMap<String, Punishment>,
    rewards: HashMap<String, Reward>,
    scenarios: HashMap<String, Scenario>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads from `TRAINER_CATALOG_PATH` (or `config/catalog.toml`), falling back
    /// to the built-in data set when the file is unreadable or invalid.
    pub fn load_or_fallback() -> Self {
        let path = env::var(CATALOG_PATH_ENV).unwrap_or_else(|_| CATALOG_CONFIG_PATH.to_string());
        match Self::load_from_file(&path) {
            Ok(catalog) => catalog,
            Err(error) => {
                warn!(
                    "Failed to load catalog from {}: {error}. Falling back to defaults.",
                    path
                );
                Self::fallback()
            }
        }
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data =
            fs::read_to_string(&path).map_err(|err| format!("unable to read file: {err}"))?;
        let config: CatalogConfig =
            toml::from_str(&data).map_err(|err| format!("invalid catalog config: {err}"))?;
        Self::from_config(config)
    }

    pub fn from_config(config: CatalogConfig) -> Result<Self, String> {
        Ok(Self {
            confessions: index_records(RecordKind::Confession, config.confessions, |r| &mut r.id)?,
            permissions: index_records(RecordKind::Permission, config.permissions, |r| &mut r.id)?,
            punishments: index_records(RecordKind::Punishment, config.punishments, |r| &mut r.id)?,
            rewards: index_records(RecordKind::Reward, config.rewards, |r| &mut r.id)?,
            scenarios: index_records(RecordKind::Scenario, config.scenarios, |r| &mut r.id)?,
        })
    }

    pub fn fallback() -> Self {
        let fallback_config = CatalogConfig {
            confessions: vec![
                Confession {
                    id: "skipped_workout".to_string(),
                    name: "Skipped a workout".to_string(),
                    description: "Stayed on the couch instead of training.".to_string(),
                    value: -10.0,
                },
                Confession {
                    id: "extra_set".to_string(),
                    name: "Did an extra set".to_string(),
                    description: "Went beyond the plan.".to_string(),
                    value: 5.0,
                },
            ],
            permissions: vec![Permission {
                id: "cheat_meal".to_string(),
                name: "Cheat meal".to_string(),
                description: "One meal off the plan.".to_string(),
                min_mood: 0.0,
                certain_mood: 50.0,
            }],
            punishments: vec![Punishment {
                id: "burpees".to_string(),
                name: "Fifty burpees".to_string(),
                description: "No breaks longer than ten seconds.".to_string(),
            }],
            rewards: vec![
                Reward {
                    id: "rest_day".to_string(),
                    name: "Rest day".to_string(),
                    description: "A full day off.".to_string(),
                    value: 10.0,
                },
                Reward {
                    id: "praise".to_string(),
                    name: "Praise".to_string(),
                    description: "A few kind words.".to_string(),
                    value: 2.0,
                },
            ],
            scenarios: vec![Scenario {
                id: "morning_routine".to_string(),
                name: "Morning routine".to_string(),
                description: "Start the day moving.".to_string(),
                steps: vec![
                    ScenarioStep::new("Wake up", "Out of bed before the second alarm."),
                    ScenarioStep::new("Stretch", "Ten minutes of mobility work."),
                ],
                reward: 3.0,
            }],
        };

        Self::from_config(fallback_config).expect("fallback catalog should be valid")
    }

    #[allow(dead_code)]
    pub fn with_confession(mut self, confession: Confession) -> Self {
        self.confessions.insert(confession.id.clone(), confession);
        self
    }

    #[allow(dead_code)]
    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.insert(permission.id.clone(), permission);
        self
    }

    #[allow(dead_code)]
    pub fn with_punishment(mut self, punishment: Punishment) -> Self {
        self.punishments.insert(punishment.id.clone(), punishment);
        self
    }

    #[allow(dead_code)]
    pub fn with_reward(mut self, reward: Reward) -> Self {
        self.rewards.insert(reward.id.clone(), reward);
        self
    }

    #[allow(dead_code)]
    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenarios.insert(scenario.id.clone(), scenario);
        self
    }

    /// Total number of records across all kinds.
    pub fn len(&self) -> usize {
        self.confessions.len()
            + self.permissions.len()
            + self.punishments.len()
            + self.rewards.len()
            + self.scenarios.len()
    }
}

fn index_records<T>(
    kind: RecordKind,
    records: Vec<T>,
    id_of: impl Fn(&mut T) -> &mut String,
) -> Result<HashMap<String, T>, String> {
    let mut indexed = HashMap::with_capacity(records.len());
    for mut record in records {
        let record_id = id_of(&mut record);
        *record_id = record_id.trim().to_string();
        let id = record_id.clone();
        if id.is_empty() {
            return Err(format!("{kind} id cannot be empty"));
        }
        if indexed.contains_key(&id) {
            return Err(format!("duplicate {kind} id '{id}'"));
        }
        indexed.insert(id, record);
    }
    Ok(indexed)
}

fn lookup<T: Clone>(
    records: &HashMap<String, T>,
    kind: RecordKind,
    id: &str,
) -> Result<T, CatalogError> {
    records
        .get(id)
        .cloned()
        .ok_or_else(|| CatalogError::missing(kind, id))
}

impl Catalog for InMemoryCatalog {
    fn confession(&self, id: &str) -> Result<Confession, CatalogError> {
        lookup(&self.confessions, RecordKind::Confession, id)
    }

    fn permission(&self, id: &str) -> Result<Permission, CatalogError> {
        lookup(&self.permissions, RecordKind::Permission, id)
    }

    fn punishment(&self, id: &str) -> Result<Punishment, CatalogError> {
        lookup(&self.punishments, RecordKind::Punishment, id)
    }

    fn reward(&self, id: &str) -> Result<Reward, CatalogError> {
        lookup(&self.rewards, RecordKind::Reward, id)
    }

    fn scenario(&self, id: &str) -> Result<Scenario, CatalogError> {
        lookup(&self.scenarios, RecordKind::Scenario, id)
    }
}

/// Resource holding the catalog every trainer resolves against.
#[derive(Resource)]
pub struct ActiveCatalog {
    catalog: Box<dyn Catalog>,
}

impl ActiveCatalog {
    pub fn new(catalog: Box<dyn Catalog>) -> Self {
        Self { catalog }
    }

    pub fn get(&self) -> &dyn Catalog {
        self.catalog.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_catalog_resolves_every_kind() {
        let catalog = InMemoryCatalog::fallback();
        assert!(catalog.confession("skipped_workout").is_ok());
        assert!(catalog.permission("cheat_meal").is_ok());
        assert!(catalog.punishment("burpees").is_ok());
        assert!(catalog.reward("rest_day").is_ok());
        let scenario = catalog
            .scenario("morning_routine")
            .expect("fallback scenario should exist");
        assert_eq!(scenario.steps.len(), 2);
    }

    #[test]
    fn missing_record_names_kind_and_id() {
        let catalog = InMemoryCatalog::new();
        let error = catalog.reward("gold_star").unwrap_err();
        assert_eq!(error, CatalogError::missing(RecordKind::Reward, "gold_star"));
        assert_eq!(error.to_string(), "no reward record with id 'gold_star'");
    }

    #[test]
    fn parses_toml_with_nested_steps() {
        let raw = r#"
            [[rewards]]
            id = "nap"
            value = 4.0

            [[scenarios]]
            id = "evening"
            reward = -1.5

            [[scenarios.steps]]
            title = "Tidy up"
            description = "Put the weights back."

            [[scenarios.steps]]
            title = "Log the session"
        "#;
        let config: CatalogConfig = toml::from_str(raw).expect("catalog toml should parse");
        let catalog = InMemoryCatalog::from_config(config).expect("catalog should validate");

        assert_eq!(catalog.reward("nap").unwrap().value, 4.0);
        let scenario = catalog.scenario("evening").unwrap();
        assert_eq!(scenario.reward, -1.5);
        assert_eq!(scenario.steps[0].title, "Tidy up");
        assert_eq!(scenario.steps[1].description, "");
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn padded_ids_are_stored_trimmed() {
        let raw = r#"
            [[rewards]]
            id = " nap "
            value = 4.0
        "#;
        let config: CatalogConfig = toml::from_str(raw).expect("catalog toml should parse");
        let catalog = InMemoryCatalog::from_config(config).expect("catalog should validate");

        assert_eq!(catalog.reward("nap").unwrap().id, "nap");
        assert!(catalog.reward(" nap ").is_err());
    }

    #[test]
    fn rejects_duplicate_and_empty_ids() {
        let duplicate = CatalogConfig {
            punishments: vec![
                Punishment {
                    id: "laps".to_string(),
                    name: String::new(),
                    description: String::new(),
                },
                Punishment {
                    id: "laps".to_string(),
                    name: String::new(),
                    description: String::new(),
                },
            ],
            ..Default::default()
        };
        let error = InMemoryCatalog::from_config(duplicate).unwrap_err();
        assert!(error.contains("duplicate punishment id 'laps'"));

        let empty = CatalogConfig {
            rewards: vec![Reward {
                id: "  ".to_string(),
                name: String::new(),
                description: String::new(),
                value: 1.0,
            }],
            ..Default::default()
        };
        assert!(InMemoryCatalog::from_config(empty).is_err());
    }

    #[test]
    fn active_catalog_delegates_to_boxed_store() {
        let active = ActiveCatalog::new(Box::new(InMemoryCatalog::fallback()));
        assert_eq!(
            active.get().punishment("burpees").unwrap().name,
            "Fifty burpees"
        );
    }
}
