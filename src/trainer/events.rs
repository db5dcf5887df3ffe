//! Trainer messages broadcast between systems.
use std::fmt;

use bevy::prelude::{Entity, Event, Message};

use crate::catalog::records::{Punishment, Reward, ScenarioStep};

use super::{
    errors::TrainerError,
    state::{MoodShift, TrainerId},
};

/// Something asked of a trainer.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub enum TrainerRequest {
    Confess { confession_id: String },
    AskPermission { permission_id: String },
    Reward { value: f64 },
    Punish { value: f64 },
}

#[derive(Event, Message, Debug, Clone)]
pub struct TrainerRequestEvent {
    pub trainer: Entity,
    pub request: TrainerRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrainerReply {
    Confessed,
    Permission { granted: bool },
    Rewarded(Reward),
    Punished(Punishment),
}

/// Answer to a `TrainerRequestEvent`.
#[derive(Event, Message, Debug, Clone)]
pub struct TrainerResponseEvent {
    pub trainer: Entity,
    pub trainer_id: TrainerId,
    pub outcome: Result<TrainerReply, TrainerError>,
}

/// Fired for every step of a triggered scenario, in order.
#[derive(Event, Message, Debug, Clone)]
pub struct ScenarioStepEvent {
    pub trainer_id: TrainerId,
    pub scenario_id: String,
    pub index: usize,
    pub step: ScenarioStep,
}

/// What moved a trainer's mood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoodCause {
    Confession(String),
    Reward(String),
    Scenario(String),
}

impl MoodCause {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Confession(_) => "confession",
            Self::Reward(_) => "reward",
            Self::Scenario(_) => "scenario",
        }
    }

    pub fn record_id(&self) -> &str {
        match self {
            Self::Confession(id) | Self::Reward(id) | Self::Scenario(id) => id,
        }
    }
}

impl fmt::Display for MoodCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.label(), self.record_id())
    }
}

#[derive(Event, Message, Debug, Clone)]
pub struct MoodChangedEvent {
    pub trainer_id: TrainerId,
    pub cause: MoodCause,
    pub shift: MoodShift,
}

/// A background scenario trigger that failed.
#[derive(Event, Message, Debug, Clone)]
pub struct TrainerFailureEvent {
    pub trainer_id: TrainerId,
    pub error: TrainerError,
}
