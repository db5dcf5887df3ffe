//! Read-only records served by the catalog.
use std::fmt;

use serde::Deserialize;

/// The five record families a catalog serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Confession,
    Permission,
    Punishment,
    Reward,
    Scenario,
}

impl RecordKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Confession => "confession",
            Self::Permission => "permission",
            Self::Punishment => "punishment",
            Self::Reward => "reward",
            Self::Scenario => "scenario",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Something confessed to a trainer; `value` is its effect on mood.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Confession {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub value: f64,
}

/// Something a trainer may allow, gated by mood thresholds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Permission {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub min_mood: f64,
    pub certain_mood: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Punishment {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A treat handed out by a trainer; `value` is its intrinsic mood effect.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Reward {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub value: f64,
}

/// Presentation-only unit of a scenario.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioStep {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl ScenarioStep {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Ordered steps plus the mood effect applied once they have all run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scenario {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
    #[serde(default)]
    pub reward: f64,
}
