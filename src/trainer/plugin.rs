//! Trainer plugin wiring settings, messages and systems.
use bevy::prelude::*;

use super::{
    config::TrainerSettings,
    dice::TrainerDice,
    events::{
        MoodChangedEvent, ScenarioStepEvent, TrainerFailureEvent, TrainerRequestEvent,
        TrainerResponseEvent,
    },
    journal::{flush_trainer_journal_log, record_trainer_journal, TrainerJournal, TrainerJournalLog},
    systems::{
        announce_scenario_steps, handle_trainer_requests, run_scenario_schedules,
        spawn_configured_trainers,
    },
};

pub struct TrainerPlugin;

impl Plugin for TrainerPlugin {
    fn build(&self, app: &mut App) {
        let settings = TrainerSettings::load_or_default();
        app.insert_resource(TrainerJournal::new(settings.journal.capacity))
            .insert_resource(TrainerJournalLog::new(settings.journal.path.clone()))
            .insert_resource(settings)
            .init_resource::<TrainerDice>();
        register_trainer_systems(app);
    }
}

/// Messages and systems shared by the plugin and headless tests; resources are left to the caller.
pub fn register_trainer_systems(app: &mut App) {
    app.add_message::<TrainerRequestEvent>()
        .add_message::<TrainerResponseEvent>()
        .add_message::<ScenarioStepEvent>()
        .add_message::<MoodChangedEvent>()
        .add_message::<TrainerFailureEvent>()
        .add_systems(Startup, (log_trainer_policies, spawn_configured_trainers))
        .add_systems(
            Update,
            (
                run_scenario_schedules,
                handle_trainer_requests,
                announce_scenario_steps,
                record_trainer_journal,
                flush_trainer_journal_log,
            )
                .chain(),
        );
}

fn log_trainer_policies(settings: Res<TrainerSettings>) {
    info!(
        "TrainerPlugin initialised: mood [{:.1}, {:.1}], permission={}, reward_match={}, cadence={}",
        settings.bounds.min(),
        settings.bounds.max(),
        settings.policies.permission.label(),
        settings.policies.reward_match.label(),
        settings.scenario_cadence.label()
    );
}
