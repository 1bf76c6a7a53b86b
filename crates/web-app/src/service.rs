use std::collections::VecDeque;

use crate::{
    OngoingWorkoutSession, OngoingWorkoutSessionRepository, OngoingWorkoutSessionService,
    Settings, SettingsRepository, SettingsService, log,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

impl<R: log::Repository> log::Service for Service<R> {
    fn get_log_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        self.repository.read_entries()
    }

    fn add_log_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        self.repository.write_entry(entry)
    }
}

impl<R: SettingsRepository> SettingsService for Service<R> {
    async fn get_settings(&self) -> Result<Settings, String> {
        self.repository.read_settings().await
    }

    async fn set_settings(&self, settings: Settings) -> Result<(), String> {
        self.repository.write_settings(settings).await
    }
}

impl<R: OngoingWorkoutSessionRepository> OngoingWorkoutSessionService for Service<R> {
    async fn get_ongoing_workout_session(&self) -> Result<Option<OngoingWorkoutSession>, String> {
        self.repository.read_ongoing_workout_session().await
    }

    async fn set_ongoing_workout_session(
        &self,
        ongoing_workout_session: Option<OngoingWorkoutSession>,
    ) -> Result<(), String> {
        self.repository
            .write_ongoing_workout_session(ongoing_workout_session)
            .await
    }
}
