//! Background scenario trigger and the step output capability.
use std::time::Duration;

use bevy::prelude::*;
use serde::Deserialize;

use crate::catalog::records::{Scenario, ScenarioStep};

/// Whether the scenario trigger fires once per `init` or keeps nagging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioCadence {
    #[default]
    SingleShot,
    Periodic,
}

impl ScenarioCadence {
    pub fn label(self) -> &'static str {
        match self {
            Self::SingleShot => "single_shot",
            Self::Periodic => "periodic",
        }
    }
}

#[derive(Debug, Clone)]
enum SchedulePhase {
    Armed,
    Resting(Timer),
    Stopped,
}

/// Drives a trainer's scenario trigger: fire immediately, then rest for the
/// scenario rate. Single-shot schedules stop after the rest.
#[derive(Component, Debug, Clone)]
pub struct ScenarioSchedule {
    cadence: ScenarioCadence,
    interval: Duration,
    phase: SchedulePhase,
}

impl ScenarioSchedule {
    pub fn new(cadence: ScenarioCadence, interval: Duration) -> Self {
        Self {
            cadence,
            interval,
            phase: SchedulePhase::Armed,
        }
    }

    pub fn cadence(&self) -> ScenarioCadence {
        self.cadence
    }

    #[allow(dead_code)]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self.phase, SchedulePhase::Stopped)
    }

    pub fn cancel(&mut self) {
        self.phase = SchedulePhase::Stopped;
    }

    /// Advances the schedule; returns true when a scenario should fire now.
    pub fn tick(&mut self, delta: Duration) -> bool {
        if matches!(self.phase, SchedulePhase::Armed) {
            self.phase = SchedulePhase::Resting(Timer::new(self.interval, TimerMode::Once));
            return true;
        }

        let cadence = self.cadence;
        let SchedulePhase::Resting(timer) = &mut self.phase else {
            return false;
        };
        if !timer.tick(delta).just_finished() {
            return false;
        }

        match cadence {
            ScenarioCadence::SingleShot => {
                self.phase = SchedulePhase::Stopped;
                false
            }
            ScenarioCadence::Periodic => {
                timer.reset();
                true
            }
        }
    }
}

/// Presentation channel that receives scenario steps in order.
pub trait StepSink {
    fn display_step(&mut self, scenario: &Scenario, index: usize, step: &ScenarioStep);
}

impl StepSink for Vec<ScenarioStep> {
    fn display_step(&mut self, _scenario: &Scenario, _index: usize, step: &ScenarioStep) {
        self.push(step.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn single_shot_fires_once() {
        let mut schedule = ScenarioSchedule::new(ScenarioCadence::SingleShot, SECOND * 5);
        assert!(schedule.tick(Duration::ZERO));
        assert!(!schedule.tick(SECOND * 3));
        assert!(!schedule.tick(SECOND * 3));
        assert!(schedule.is_stopped());
        assert!(!schedule.tick(SECOND * 60));
    }

    #[test]
    fn periodic_fires_after_each_rest() {
        let mut schedule = ScenarioSchedule::new(ScenarioCadence::Periodic, SECOND * 2);
        let fired: Vec<bool> = [0, 1, 1, 1, 1]
            .into_iter()
            .map(|seconds| schedule.tick(SECOND * seconds))
            .collect();
        assert_eq!(fired, vec![true, false, true, false, true]);
        assert!(!schedule.is_stopped());
    }

    #[test]
    fn cancelled_schedule_never_fires() {
        let mut schedule = ScenarioSchedule::new(ScenarioCadence::Periodic, SECOND);
        schedule.cancel();
        assert!(!schedule.tick(Duration::ZERO));
        assert!(!schedule.tick(SECOND * 10));
    }
}
