//! Error types surfaced by trainer operations.
use std::fmt;

use crate::catalog::{records::RecordKind, store::CatalogError};

/// Failures returned by `Trainer` operations. Mood arithmetic itself never fails.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainerError {
    /// The identifier is not on the trainer's own allow-list.
    NotFound { kind: RecordKind, id: String },
    /// An allow-listed identifier could not be resolved by the catalog.
    Lookup(CatalogError),
    NoRewardsAvailable,
    NoPunishmentsAvailable,
    NoScenariosAvailable,
    /// Reward selection produced an empty candidate set for this target.
    NoMatchingReward { target: f64 },
}

impl TrainerError {
    pub fn not_found(kind: RecordKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Short machine-friendly label, used by the journal.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Lookup(_) => "lookup",
            Self::NoRewardsAvailable => "no_rewards_available",
            Self::NoPunishmentsAvailable => "no_punishments_available",
            Self::NoScenariosAvailable => "no_scenarios_available",
            Self::NoMatchingReward { .. } => "no_matching_reward",
        }
    }
}

impl fmt::Display for TrainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "trainer doesn't know {} '{}'", kind, id),
            Self::Lookup(err) => write!(f, "error getting record: {}", err),
            Self::NoRewardsAvailable => write!(f, "trainer has no rewards"),
            Self::NoPunishmentsAvailable => write!(f, "trainer has no punishments"),
            Self::NoScenariosAvailable => write!(f, "trainer has no scenarios"),
            Self::NoMatchingReward { target } => {
                write!(f, "no reward matches target value {:.2}", target)
            }
        }
    }
}

impl std::error::Error for TrainerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Lookup(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CatalogError> for TrainerError {
    fn from(value: CatalogError) -> Self {
        Self::Lookup(value)
    }
}
