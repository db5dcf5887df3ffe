//! Systems spawning trainers, driving scenario schedules and answering requests.
use bevy::prelude::*;

use crate::catalog::{
    records::{Scenario, ScenarioStep},
    store::ActiveCatalog,
};

use super::{
    config::TrainerSettings,
    dice::TrainerDice,
    events::{
        MoodCause, MoodChangedEvent, ScenarioStepEvent, TrainerFailureEvent, TrainerReply,
        TrainerRequest, TrainerRequestEvent, TrainerResponseEvent,
    },
    schedule::{ScenarioSchedule, StepSink},
    state::{MoodShift, Trainer, TrainerId},
};

/// Spawns every configured trainer and starts its scenario schedule.
pub fn spawn_configured_trainers(mut commands: Commands, settings: Res<TrainerSettings>) {
    for definition in &settings.trainers {
        let mut trainer = settings.build_trainer(definition);
        let schedule = trainer.init(settings.scenario_cadence);
        info!(
            "Trainer {} ({}) active with mood {:.1}, scenario every {}s ({})",
            trainer.profile.name,
            trainer.id(),
            trainer.mood(),
            trainer.scenario_rate_secs,
            schedule.cadence().label()
        );
        let name = Name::new(format!("Trainer {}", trainer.id()));
        commands.spawn((trainer, schedule, name));
    }
}

/// Collects steps of one scenario run so they can be written as messages.
struct CollectedSteps {
    scenario_id: Option<String>,
    steps: Vec<ScenarioStep>,
}

impl StepSink for CollectedSteps {
    fn display_step(&mut self, scenario: &Scenario, index: usize, step: &ScenarioStep) {
        self.scenario_id.get_or_insert_with(|| scenario.id.clone());
        self.steps.display_step(scenario, index, step);
    }
}

pub fn run_scenario_schedules(
    time: Res<Time>,
    catalog: Res<ActiveCatalog>,
    mut query: Query<(&mut Trainer, &mut ScenarioSchedule)>,
    mut steps: MessageWriter<ScenarioStepEvent>,
    mut shifts: MessageWriter<MoodChangedEvent>,
    mut failures: MessageWriter<TrainerFailureEvent>,
) {
    for (mut trainer, mut schedule) in query.iter_mut() {
        if !trainer.is_active() {
            if !schedule.is_stopped() {
                debug!("Trainer {} inactive; cancelling scenario schedule", trainer.id());
                schedule.cancel();
            }
            continue;
        }

        if !schedule.tick(time.delta()) {
            continue;
        }

        let before = trainer.mood();
        let mut collected = CollectedSteps {
            scenario_id: None,
            steps: Vec::new(),
        };
        match trainer.trigger_scenario(catalog.get(), &mut collected) {
            Ok(()) => {
                let trainer_id = trainer.id().clone();
                let scenario_id = collected
                    .scenario_id
                    .or_else(|| trainer.scenarios.first().cloned())
                    .unwrap_or_default();
                for (index, step) in collected.steps.into_iter().enumerate() {
                    steps.write(ScenarioStepEvent {
                        trainer_id: trainer_id.clone(),
                        scenario_id: scenario_id.clone(),
                        index,
                        step,
                    });
                }
                write_mood_change(
                    &mut shifts,
                    trainer_id,
                    MoodCause::Scenario(scenario_id),
                    before,
                    trainer.mood(),
                );
            }
            Err(error) => {
                warn!("Trainer {} failed to run scenario: {}", trainer.id(), error);
                failures.write(TrainerFailureEvent {
                    trainer_id: trainer.id().clone(),
                    error,
                });
            }
        }
    }
}

pub fn handle_trainer_requests(
    mut requests: MessageReader<TrainerRequestEvent>,
    catalog: Res<ActiveCatalog>,
    mut dice: ResMut<TrainerDice>,
    mut query: Query<&mut Trainer>,
    mut responses: MessageWriter<TrainerResponseEvent>,
    mut shifts: MessageWriter<MoodChangedEvent>,
) {
    for event in requests.read() {
        let Ok(mut trainer) = query.get_mut(event.trainer) else {
            warn!(
                "Dropping {:?} addressed to {:?}, which is not a trainer",
                event.request, event.trainer
            );
            continue;
        };

        let catalog = catalog.get();
        let before = trainer.mood();
        let outcome = match &event.request {
            TrainerRequest::Confess { confession_id } => trainer
                .confess_to(confession_id, catalog)
                .map(|()| TrainerReply::Confessed),
            TrainerRequest::AskPermission { permission_id } => trainer
                .ask_permission(permission_id, catalog, dice.source_mut())
                .map(|granted| TrainerReply::Permission { granted }),
            TrainerRequest::Reward { value } => trainer
                .reward(*value, catalog, dice.source_mut())
                .map(TrainerReply::Rewarded),
            TrainerRequest::Punish { value } => trainer
                .get_punished(*value, catalog)
                .map(TrainerReply::Punished),
        };

        let trainer_id = trainer.id().clone();
        match &outcome {
            Ok(TrainerReply::Confessed) => {
                if let TrainerRequest::Confess { confession_id } = &event.request {
                    write_mood_change(
                        &mut shifts,
                        trainer_id.clone(),
                        MoodCause::Confession(confession_id.clone()),
                        before,
                        trainer.mood(),
                    );
                }
            }
            Ok(TrainerReply::Rewarded(reward)) => {
                write_mood_change(
                    &mut shifts,
                    trainer_id.clone(),
                    MoodCause::Reward(reward.id.clone()),
                    before,
                    trainer.mood(),
                );
            }
            Ok(_) => {}
            Err(error) => {
                warn!("Trainer {} rejected {:?}: {}", trainer_id, event.request, error);
            }
        }

        responses.write(TrainerResponseEvent {
            trainer: event.trainer,
            trainer_id,
            outcome,
        });
    }
}

fn write_mood_change(
    writer: &mut MessageWriter<MoodChangedEvent>,
    trainer_id: TrainerId,
    cause: MoodCause,
    before: f64,
    after: f64,
) {
    let shift = MoodShift { before, after };
    if !shift.is_change() {
        return;
    }

    debug!(
        "Trainer {} mood {:.1} -> {:.1} after {}",
        trainer_id, shift.before, shift.after, cause
    );
    writer.write(MoodChangedEvent {
        trainer_id,
        cause,
        shift,
    });
}

/// Presents scenario steps on the log channel.
pub fn announce_scenario_steps(mut steps: MessageReader<ScenarioStepEvent>) {
    for event in steps.read() {
        info!(
            target: "scenario",
            "[{} / {} #{}] {}",
            event.trainer_id,
            event.scenario_id,
            event.index + 1,
            event.step.title
        );
        if !event.step.description.is_empty() {
            info!(target: "scenario", "{}", event.step.description);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs, path::PathBuf, time::SystemTime};

    use bevy::ecs::message::{Message, Messages};

    use super::*;
    use crate::{
        catalog::{records::RecordKind, store::InMemoryCatalog},
        trainer::{
            config::{JournalSettings, TrainerDefinition},
            dice::ScriptedDice,
            errors::TrainerError,
            journal::{TrainerJournal, TrainerJournalLog},
            plugin::register_trainer_systems,
            schedule::ScenarioCadence,
            state::{MoodBounds, TrainerPolicies},
        },
    };

    fn journal_path() -> PathBuf {
        let unique_suffix = SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        env::temp_dir().join(format!("trainer_systems_test_{}.jsonl", unique_suffix))
    }

    fn coach_settings(path: &PathBuf) -> TrainerSettings {
        TrainerSettings {
            bounds: MoodBounds::default(),
            start_mood: 0.0,
            policies: TrainerPolicies::default(),
            scenario_cadence: ScenarioCadence::SingleShot,
            journal: JournalSettings {
                path: path.clone(),
                capacity: 16,
            },
            trainers: vec![TrainerDefinition {
                id: "coach".to_string(),
                name: "Coach".to_string(),
                description: String::new(),
                reward_multiplier: 1.0,
                punishment_multiplier: 1.5,
                scenario_rate_secs: 600,
                scenarios: vec!["morning_routine".to_string()],
                rewards: vec!["rest_day".to_string(), "praise".to_string()],
                punishments: vec!["burpees".to_string()],
                permissions: vec!["cheat_meal".to_string()],
                confessions: vec!["skipped_workout".to_string()],
            }],
        }
    }

    fn test_app(path: &PathBuf) -> App {
        let settings = coach_settings(path);
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(TrainerJournal::new(settings.journal.capacity))
            .insert_resource(TrainerJournalLog::new(settings.journal.path.clone()))
            .insert_resource(settings)
            .insert_resource(ActiveCatalog::new(Box::new(InMemoryCatalog::fallback())))
            .insert_resource(TrainerDice::new(Box::new(ScriptedDice::new(&[0.99], &[0]))));
        register_trainer_systems(&mut app);
        app
    }

    fn coach(app: &mut App) -> (Entity, Trainer) {
        let mut query = app.world_mut().query::<(Entity, &Trainer)>();
        let (entity, trainer) = query
            .iter(app.world())
            .next()
            .expect("configured trainer should spawn");
        (entity, trainer.clone())
    }

    fn drain<M: Message + Clone>(app: &App) -> Vec<M> {
        let messages = app.world().resource::<Messages<M>>();
        let mut cursor = messages.get_cursor();
        cursor.read(messages).cloned().collect()
    }

    fn send(app: &mut App, trainer: Entity, request: TrainerRequest) {
        app.world_mut()
            .resource_mut::<Messages<TrainerRequestEvent>>()
            .write(TrainerRequestEvent { trainer, request });
    }

    #[test]
    fn first_update_runs_the_scenario_once() {
        let path = journal_path();
        let mut app = test_app(&path);
        app.update();

        let (_, trainer) = coach(&mut app);
        assert!(trainer.is_active());
        assert_eq!(trainer.mood(), 3.0);

        let steps = drain::<ScenarioStepEvent>(&app);
        let titles: Vec<_> = steps.iter().map(|event| event.step.title.as_str()).collect();
        assert_eq!(titles, vec!["Wake up", "Stretch"]);
        assert!(steps.iter().all(|event| event.scenario_id == "morning_routine"));

        app.update();
        let (_, trainer) = coach(&mut app);
        assert_eq!(trainer.mood(), 3.0);

        let journal = app.world().resource::<TrainerJournal>();
        assert_eq!(journal.len(), 1);
        assert!(path.exists());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn requests_are_answered_in_order() {
        let path = journal_path();
        let mut app = test_app(&path);
        app.update();
        let (entity, _) = coach(&mut app);

        send(
            &mut app,
            entity,
            TrainerRequest::Confess {
                confession_id: "skipped_workout".to_string(),
            },
        );
        send(
            &mut app,
            entity,
            TrainerRequest::AskPermission {
                permission_id: "cheat_meal".to_string(),
            },
        );
        send(&mut app, entity, TrainerRequest::Reward { value: 0.0 });
        send(&mut app, entity, TrainerRequest::Punish { value: 99.0 });
        send(
            &mut app,
            entity,
            TrainerRequest::Confess {
                confession_id: "extra_set".to_string(),
            },
        );
        send(
            &mut app,
            Entity::PLACEHOLDER,
            TrainerRequest::Reward { value: 1.0 },
        );
        app.update();

        let outcomes: Vec<_> = drain::<TrainerResponseEvent>(&app)
            .into_iter()
            .map(|event| event.outcome)
            .collect();
        assert_eq!(outcomes.len(), 5);
        assert_eq!(outcomes[0], Ok(TrainerReply::Confessed));
        assert_eq!(outcomes[1], Ok(TrainerReply::Permission { granted: false }));
        assert!(matches!(&outcomes[2], Ok(TrainerReply::Rewarded(reward)) if reward.id == "praise"));
        assert!(matches!(&outcomes[3], Ok(TrainerReply::Punished(punishment)) if punishment.id == "burpees"));
        assert_eq!(
            outcomes[4],
            Err(TrainerError::not_found(RecordKind::Confession, "extra_set"))
        );

        // 3 from the scenario, -15 from the confession, +2 from praise
        let (_, trainer) = coach(&mut app);
        assert_eq!(trainer.mood(), -10.0);

        let causes: Vec<_> = drain::<MoodChangedEvent>(&app)
            .into_iter()
            .map(|event| event.cause)
            .collect();
        assert!(causes.contains(&MoodCause::Confession("skipped_workout".to_string())));
        assert!(causes.contains(&MoodCause::Reward("praise".to_string())));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn deactivated_trainer_cancels_its_schedule() {
        let path = journal_path();
        let mut app = test_app(&path);
        app.update();
        let (entity, _) = coach(&mut app);

        app.world_mut()
            .get_mut::<Trainer>(entity)
            .expect("trainer component")
            .deactivate();
        app.update();

        let schedule = app
            .world()
            .get::<ScenarioSchedule>(entity)
            .expect("schedule component");
        assert!(schedule.is_stopped());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_scenario_is_reported_as_failure() {
        let path = journal_path();
        let mut app = test_app(&path);
        app.world_mut().resource_mut::<TrainerSettings>().trainers[0].scenarios =
            vec!["ghost".to_string()];
        app.update();

        let failures = drain::<TrainerFailureEvent>(&app);
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0].error, TrainerError::Lookup(_)));
        let (_, trainer) = coach(&mut app);
        assert_eq!(trainer.mood(), 0.0);
        let _ = fs::remove_file(&path);
    }
}
