//! Trainer module: the mood state machine and its Bevy host.
pub mod config;
pub mod dice;
pub mod errors;
pub mod events;
pub mod journal;
pub mod plugin;
pub mod policy;
pub mod schedule;
pub mod state;
pub mod systems;

pub use plugin::TrainerPlugin;
