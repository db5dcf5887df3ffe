use std::{path::Path, time::Duration};

use bevy::{app::ScheduleRunnerPlugin, log::LogPlugin, prelude::*};

mod catalog;
mod trainer;

use crate::{catalog::CatalogPlugin, trainer::TrainerPlugin};

const TICK_RATE_HZ: f64 = 20.0;

fn main() {
    load_env_overrides();

    App::new()
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / TICK_RATE_HZ,
            ))),
            LogPlugin::default(),
            CatalogPlugin,
            TrainerPlugin, // After CatalogPlugin so trainers resolve against the loaded catalog
        ))
        .run();
}

fn load_env_overrides() {
    const ENV_FILE: &str = "trainer.env";

    let path = Path::new(ENV_FILE);
    if !path.exists() {
        return;
    }

    if let Err(err) = dotenvy::from_filename(path) {
        eprintln!("Failed to load {}: {}", ENV_FILE, err);
    }
}
