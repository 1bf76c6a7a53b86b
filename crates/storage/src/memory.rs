//! Memory
//!
//! In-process store holding an exercise catalog and the templates of all users. Used when no
//! server is available and as reference behaviour for the repository contracts.

use std::{cell::RefCell, collections::BTreeSet};

use chrono::Utc;
use forma_domain::{self as domain, Property};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct Memory {
    exercises: Vec<domain::Exercise>,
    state: RefCell<State>,
}

#[derive(Debug, Default)]
struct State {
    session: Option<domain::User>,
    templates: Vec<StoredTemplate>,
    revision: u64,
}

#[derive(Debug, Clone)]
struct StoredTemplate {
    template: domain::Template,
    revision: u64,
}

impl Memory {
    #[must_use]
    pub fn new(exercises: Vec<domain::Exercise>) -> Self {
        Self {
            exercises,
            state: RefCell::new(State::default()),
        }
    }

    pub fn sign_in(&self, user: domain::User) {
        self.state.borrow_mut().session = Some(user);
    }

    pub fn sign_out(&self) {
        self.state.borrow_mut().session = None;
    }

    fn resolve(
        &self,
        entries: Vec<domain::TemplateExerciseEntry>,
    ) -> Result<Vec<domain::TemplateExercise>, domain::ExerciseID> {
        let mut exercises = entries
            .into_iter()
            .map(|entry| {
                self.exercises
                    .iter()
                    .find(|e| e.id == entry.exercise_id)
                    .map(|exercise| domain::TemplateExercise {
                        exercise: exercise.clone(),
                        order: entry.order,
                    })
                    .ok_or(entry.exercise_id)
            })
            .collect::<Result<Vec<_>, _>>()?;
        exercises.sort_by_key(|e| e.order);
        Ok(exercises)
    }

    fn sorted_by_name<'a>(
        exercises: impl Iterator<Item = &'a domain::Exercise>,
    ) -> Vec<domain::Exercise> {
        let mut exercises = exercises.cloned().collect::<Vec<_>>();
        exercises.sort_by(|a, b| a.display_name().cmp(b.display_name()));
        exercises
    }
}

impl State {
    fn next_revision(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    fn position(&self, owner: domain::UserID, id: domain::TemplateID) -> Option<usize> {
        self.templates
            .iter()
            .position(|t| t.template.id == id && t.template.owner == owner)
    }
}

impl domain::SessionRepository for Memory {
    async fn initialize_session(&self) -> Result<domain::User, domain::ReadError> {
        self.state
            .borrow()
            .session
            .clone()
            .ok_or(domain::ReadError::Storage(domain::StorageError::NoSession))
    }
}

impl domain::ExerciseRepository for Memory {
    async fn read_exercises_by_muscle(
        &self,
        equipment: &BTreeSet<domain::Equipment>,
        muscles: &BTreeSet<domain::Muscle>,
    ) -> Result<Vec<domain::MuscleGroup>, domain::ReadError> {
        Ok(domain::Muscle::iter()
            .filter(|muscle| muscles.is_empty() || muscles.contains(muscle))
            .map(|muscle| domain::MuscleGroup {
                muscle: *muscle,
                exercises: Self::sorted_by_name(self.exercises.iter().filter(|e| {
                    e.muscle_or_default() == *muscle && e.is_usable_with(equipment)
                })),
            })
            .filter(|group| !group.exercises.is_empty())
            .collect())
    }

    async fn search_exercises(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        let mut exercises =
            Self::sorted_by_name(self.exercises.iter().filter(|e| e.matches(query)));
        exercises.truncate(limit);
        Ok(exercises)
    }
}

impl domain::TemplateRepository for Memory {
    async fn read_templates(
        &self,
        owner: domain::UserID,
    ) -> Result<Vec<domain::Template>, domain::ReadError> {
        let mut templates = self
            .state
            .borrow()
            .templates
            .iter()
            .filter(|t| t.template.owner == owner)
            .cloned()
            .collect::<Vec<_>>();
        templates.sort_by(|a, b| {
            (b.template.updated_at, b.revision).cmp(&(a.template.updated_at, a.revision))
        });
        Ok(templates.into_iter().map(|t| t.template).collect())
    }

    async fn create_template(
        &self,
        owner: domain::UserID,
        name: domain::Name,
        equipment: BTreeSet<domain::Equipment>,
        muscles: BTreeSet<domain::Muscle>,
        exercises: Vec<domain::TemplateExerciseEntry>,
    ) -> Result<domain::Template, domain::CreateError> {
        let exercises = self
            .resolve(exercises)
            .map_err(domain::CreateError::UnknownExercise)?;
        let template = domain::Template {
            id: Uuid::new_v4().into(),
            owner,
            name,
            equipment,
            muscles,
            exercises,
            updated_at: Utc::now(),
        };
        let mut state = self.state.borrow_mut();
        let revision = state.next_revision();
        state.templates.push(StoredTemplate {
            template: template.clone(),
            revision,
        });
        Ok(template)
    }

    async fn modify_template(
        &self,
        owner: domain::UserID,
        id: domain::TemplateID,
        changes: domain::TemplateChanges,
    ) -> Result<domain::Template, domain::UpdateError> {
        let mut state = self.state.borrow_mut();
        let index = state
            .position(owner, id)
            .ok_or(domain::UpdateError::NotFound)?;
        let exercises = changes
            .exercises
            .map(|entries| self.resolve(entries))
            .transpose()
            .map_err(domain::UpdateError::UnknownExercise)?;

        let revision = state.next_revision();
        let stored = &mut state.templates[index];
        let template = &mut stored.template;
        if let Some(name) = changes.name {
            template.name = name;
        }
        if let Some(equipment) = changes.equipment {
            template.equipment = equipment;
        }
        if let Some(muscles) = changes.muscles {
            template.muscles = muscles;
        }
        if let Some(exercises) = exercises {
            template.exercises = exercises;
        }
        template.updated_at = Utc::now();
        stored.revision = revision;

        Ok(stored.template.clone())
    }

    async fn delete_template(
        &self,
        owner: domain::UserID,
        id: domain::TemplateID,
    ) -> Result<domain::TemplateID, domain::DeleteError> {
        let mut state = self.state.borrow_mut();
        let index = state
            .position(owner, id)
            .ok_or(domain::DeleteError::NotFound)?;
        state.templates.remove(index);
        Ok(id)
    }
}
