use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use log::{debug, error};

use crate::{
    AuthorizationError, CreateError, DeleteError, Equipment, Exercise, ExerciseID,
    ExerciseRepository, ExerciseService, Muscle, MuscleGroup, Name, NavigationError, QuickSearch,
    ReadError, SessionRepository, SessionService, Step, Stepper, StorageError, Template,
    TemplateChanges, TemplateExerciseEntry, TemplateID, TemplateRepository, TemplateService,
    UpdateError, User, UserID,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: SessionRepository> SessionService for Service<R> {
    async fn get_session(&self) -> Result<User, ReadError> {
        log_on_error!(
            self.repository.initialize_session(),
            ReadError,
            "initialize",
            "session"
        )
    }
}

impl<R: SessionRepository> Service<R> {
    /// Resolve the owner of a template operation from the current session.
    async fn authorize(&self) -> Result<UserID, AuthorizationError> {
        match self.repository.initialize_session().await {
            Ok(user) => Ok(user.id),
            Err(err) => {
                let err = AuthorizationError::from(err);
                match err {
                    AuthorizationError::Unauthorized
                    | AuthorizationError::Storage(StorageError::NoConnection) => {
                        debug!("failed to authorize: {err}");
                    }
                    _ => {
                        error!("failed to authorize: {err}");
                    }
                }
                Err(err)
            }
        }
    }
}

impl<R: ExerciseRepository> ExerciseService for Service<R> {
    async fn get_exercises_by_muscle(
        &self,
        equipment: &BTreeSet<Equipment>,
        muscles: &BTreeSet<Muscle>,
    ) -> Result<Vec<MuscleGroup>, ReadError> {
        log_on_error!(
            self.repository.read_exercises_by_muscle(equipment, muscles),
            ReadError,
            "get",
            "exercises"
        )
    }

    async fn search_exercises(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Exercise>, ReadError> {
        log_on_error!(
            self.repository.search_exercises(query, limit),
            ReadError,
            "search",
            "exercises"
        )
    }
}

impl<R: ExerciseRepository> Service<R> {
    /// Advance the builder by one step.
    ///
    /// Entering the exercise step with an empty selection fetches the exercises matching the
    /// chosen filters. If the fetch fails, the builder stays on the exercise step and the fetch
    /// can be retried with [`Service::fetch_exercises`].
    pub async fn next_step(&self, stepper: &mut Stepper) -> Result<Step, NavigationError> {
        let step = stepper.next_step()?;
        if stepper.needs_fetch() {
            self.fetch_exercises(stepper).await?;
        }
        Ok(step)
    }

    /// Returns `false` if the result was discarded because exercises were added in the meantime.
    pub async fn fetch_exercises(&self, stepper: &mut Stepper) -> Result<bool, ReadError> {
        let selection = stepper.selection();
        let groups = self
            .get_exercises_by_muscle(&selection.equipment, &selection.muscles)
            .await?;
        Ok(stepper.selection_mut().apply_fetched(groups))
    }

    /// Replace an exercise by the next alternative for the same muscle that is not yet selected.
    ///
    /// The alternatives are cycled through in a stable order. Returns `false` if no alternative
    /// is left or the exercise is not selected.
    pub async fn shuffle_exercise(
        &self,
        stepper: &mut Stepper,
        id: &ExerciseID,
    ) -> Result<bool, ReadError> {
        let selection = stepper.selection();
        let Some(muscle) = selection.muscle_of(id) else {
            return Ok(false);
        };
        let candidates = self
            .get_exercises_by_muscle(&selection.equipment, &BTreeSet::from([muscle]))
            .await?
            .into_iter()
            .filter(|group| group.muscle == muscle)
            .flat_map(|group| group.exercises)
            .collect::<Vec<_>>();

        let start = candidates
            .iter()
            .position(|e| e.id == *id)
            .map_or(0, |position| position + 1);
        let replacement = candidates
            .iter()
            .cycle()
            .skip(start)
            .take(candidates.len())
            .find(|e| !selection.contains(&e.id))
            .cloned();

        Ok(match replacement {
            Some(replacement) => stepper.selection_mut().replace_exercise(id, replacement),
            None => {
                debug!("no alternative for exercise {id}");
                false
            }
        })
    }

    /// Send the pending quick search request, if any, and apply its response.
    ///
    /// Returns `true` if new results were applied.
    pub async fn poll_search(
        &self,
        search: &mut QuickSearch,
        now: DateTime<Utc>,
    ) -> Result<bool, ReadError> {
        let Some(request) = search.poll(now) else {
            return Ok(false);
        };
        match self
            .search_exercises(&request.query, request.limit)
            .await
        {
            Ok(exercises) => Ok(search.complete(&request, exercises)),
            Err(err) => {
                search.fail(&request);
                Err(err)
            }
        }
    }
}

impl<R: SessionRepository + TemplateRepository> TemplateService for Service<R> {
    async fn get_templates(&self) -> Result<Vec<Template>, ReadError> {
        let owner = match self.authorize().await {
            Ok(owner) => owner,
            Err(AuthorizationError::Unauthorized) => return Ok(vec![]),
            Err(err) => return Err(err.into()),
        };
        log_on_error!(
            self.repository.read_templates(owner),
            ReadError,
            "get",
            "templates"
        )
    }

    async fn create_template(
        &self,
        name: Name,
        equipment: BTreeSet<Equipment>,
        muscles: BTreeSet<Muscle>,
        exercises: Vec<TemplateExerciseEntry>,
    ) -> Result<Template, CreateError> {
        let owner = self.authorize().await?;
        log_on_error!(
            self.repository
                .create_template(owner, name, equipment, muscles, exercises),
            CreateError,
            "create",
            "template"
        )
    }

    async fn modify_template(
        &self,
        id: TemplateID,
        changes: TemplateChanges,
    ) -> Result<Template, UpdateError> {
        let owner = self.authorize().await?;
        log_on_error!(
            self.repository.modify_template(owner, id, changes),
            UpdateError,
            "modify",
            "template"
        )
    }

    async fn delete_template(&self, id: TemplateID) -> Result<TemplateID, DeleteError> {
        let owner = self.authorize().await?;
        log_on_error!(
            self.repository.delete_template(owner, id),
            DeleteError,
            "delete",
            "template"
        )
    }
}
