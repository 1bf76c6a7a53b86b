#![warn(clippy::pedantic)]

pub mod log;
mod ongoing_workout_session;
mod service;
mod settings;

pub use ongoing_workout_session::{
    OngoingWorkoutSession, OngoingWorkoutSessionRepository, OngoingWorkoutSessionService,
    StoredExercise, StoredMuscleGroup,
};
pub use service::Service;
pub use settings::{Settings, SettingsRepository, SettingsService, Theme};
