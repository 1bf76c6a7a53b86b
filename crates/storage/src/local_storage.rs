use std::collections::VecDeque;

use forma_web_app::{
    OngoingWorkoutSession, OngoingWorkoutSessionRepository, Settings, SettingsRepository, log,
};
use gloo_storage::{Storage as _, errors::StorageError};
use serde::de::DeserializeOwned;

const KEY_SETTINGS: &str = "settings";
const KEY_ONGOING_WORKOUT_SESSION: &str = "ongoing workout session";
const KEY_LOG: &str = "log";

pub struct LocalStorage;

impl SettingsRepository for LocalStorage {
    async fn read_settings(&self) -> Result<Settings, String> {
        get_or_default(KEY_SETTINGS).map_err(|err| err.to_string())
    }

    async fn write_settings(&self, settings: Settings) -> Result<(), String> {
        gloo_storage::LocalStorage::set(KEY_SETTINGS, settings).map_err(|err| err.to_string())
    }
}

impl OngoingWorkoutSessionRepository for LocalStorage {
    async fn read_ongoing_workout_session(&self) -> Result<Option<OngoingWorkoutSession>, String> {
        get_or_default(KEY_ONGOING_WORKOUT_SESSION).map_err(|err| err.to_string())
    }

    async fn write_ongoing_workout_session(
        &self,
        ongoing_workout_session: Option<OngoingWorkoutSession>,
    ) -> Result<(), String> {
        match ongoing_workout_session {
            Some(session) => gloo_storage::LocalStorage::set(KEY_ONGOING_WORKOUT_SESSION, session)
                .map_err(|err| err.to_string()),
            None => {
                gloo_storage::LocalStorage::delete(KEY_ONGOING_WORKOUT_SESSION);
                Ok(())
            }
        }
    }
}

pub struct Log;

impl log::Repository for Log {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        get_or_default(KEY_LOG).map_err(|err| log::Error::Unknown(err.to_string()))
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        let mut entries = self.read_entries()?;
        log::prepend(&mut entries, entry);
        gloo_storage::LocalStorage::set(KEY_LOG, entries)
            .map_err(|err| log::Error::Unknown(err.to_string()))
    }
}

fn get_or_default<T: DeserializeOwned + Default>(key: &str) -> Result<T, StorageError> {
    match gloo_storage::LocalStorage::get(key) {
        Ok(value) => Ok(value),
        Err(StorageError::KeyNotFound(_)) => Ok(T::default()),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    mod wasm {
        use chrono::DateTime;
        use forma_domain::SelectionState;
        use forma_web_app::{Theme, log::Repository as _};
        use pretty_assertions::assert_eq;
        use wasm_bindgen_test::wasm_bindgen_test;

        use super::*;

        #[wasm_bindgen_test]
        async fn test_settings() {
            gloo_storage::LocalStorage::clear();

            assert_eq!(LocalStorage.read_settings().await, Ok(Settings::default()));

            let settings = Settings {
                theme: Theme::Dark,
                ..Settings::default()
            };
            assert_eq!(LocalStorage.write_settings(settings).await, Ok(()));
            assert_eq!(LocalStorage.read_settings().await, Ok(settings));
        }

        #[wasm_bindgen_test]
        async fn test_ongoing_workout_session() {
            gloo_storage::LocalStorage::clear();
            let session =
                OngoingWorkoutSession::start(&SelectionState::default(), DateTime::UNIX_EPOCH);

            assert_eq!(LocalStorage.read_ongoing_workout_session().await, Ok(None));
            assert_eq!(
                LocalStorage
                    .write_ongoing_workout_session(Some(session.clone()))
                    .await,
                Ok(())
            );
            assert_eq!(
                LocalStorage.read_ongoing_workout_session().await,
                Ok(Some(session))
            );
            assert_eq!(
                LocalStorage.write_ongoing_workout_session(None).await,
                Ok(())
            );
            assert_eq!(LocalStorage.read_ongoing_workout_session().await, Ok(None));
        }

        #[wasm_bindgen_test]
        fn test_log() {
            gloo_storage::LocalStorage::clear();
            let entry = |message: &str| log::Entry {
                time: "Jan 02 03:04:05".to_string(),
                level: ::log::Level::Info,
                message: message.to_string(),
            };

            assert_eq!(Log.write_entry(entry("a")), Ok(()));
            assert_eq!(Log.write_entry(entry("b")), Ok(()));
            assert_eq!(
                Log.read_entries(),
                Ok(VecDeque::from([entry("b"), entry("a")]))
            );
        }
    }
}
