use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use derive_more::{Deref, Display};
use uuid::Uuid;

use crate::{
    CreateError, DeleteError, Equipment, Exercise, ExerciseID, Muscle, MuscleGroup, Name,
    ReadError, SelectionState, Stepper, UpdateError, UserID, WorkoutPlan,
};

#[allow(async_fn_in_trait)]
pub trait TemplateService {
    /// All templates of the signed-in user, most recently updated first.
    ///
    /// Returns an empty list if nobody is signed in.
    async fn get_templates(&self) -> Result<Vec<Template>, ReadError>;
    async fn create_template(
        &self,
        name: Name,
        equipment: BTreeSet<Equipment>,
        muscles: BTreeSet<Muscle>,
        exercises: Vec<TemplateExerciseEntry>,
    ) -> Result<Template, CreateError>;
    async fn modify_template(
        &self,
        id: TemplateID,
        changes: TemplateChanges,
    ) -> Result<Template, UpdateError>;
    async fn delete_template(&self, id: TemplateID) -> Result<TemplateID, DeleteError>;

    /// Persist the current builder selection.
    ///
    /// Overwrites the template being edited, if any, and creates a new template otherwise.
    async fn save_template(
        &self,
        stepper: &mut Stepper,
        name: Name,
    ) -> Result<Template, UpdateError> {
        let selection = stepper.selection();
        let equipment = selection.equipment.clone();
        let muscles = selection.muscles.clone();
        let exercises = stepper.template_exercises();

        let template = if let Some(editing) = stepper.editing() {
            self.modify_template(
                editing.id,
                TemplateChanges {
                    name: Some(name),
                    equipment: Some(equipment),
                    muscles: Some(muscles),
                    exercises: Some(exercises),
                },
            )
            .await?
        } else {
            self.create_template(name, equipment, muscles, exercises)
                .await?
        };

        stepper.stop_editing();

        Ok(template)
    }
}

/// Persistence of templates.
///
/// All operations are scoped to `owner`. A template of another owner is indistinguishable from a
/// missing template.
#[allow(async_fn_in_trait)]
pub trait TemplateRepository {
    async fn read_templates(&self, owner: UserID) -> Result<Vec<Template>, ReadError>;
    async fn create_template(
        &self,
        owner: UserID,
        name: Name,
        equipment: BTreeSet<Equipment>,
        muscles: BTreeSet<Muscle>,
        exercises: Vec<TemplateExerciseEntry>,
    ) -> Result<Template, CreateError>;
    /// Apply the given changes. A given exercise list replaces the stored one as a whole.
    async fn modify_template(
        &self,
        owner: UserID,
        id: TemplateID,
        changes: TemplateChanges,
    ) -> Result<Template, UpdateError>;
    async fn delete_template(&self, owner: UserID, id: TemplateID)
    -> Result<TemplateID, DeleteError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub id: TemplateID,
    pub owner: UserID,
    pub name: Name,
    pub equipment: BTreeSet<Equipment>,
    pub muscles: BTreeSet<Muscle>,
    pub exercises: Vec<TemplateExercise>,
    pub updated_at: DateTime<Utc>,
}

impl Template {
    /// The exercises sorted by their stored order.
    pub fn exercises(&self) -> impl Iterator<Item = &Exercise> {
        let mut exercises = self.exercises.iter().collect::<Vec<_>>();
        exercises.sort_by_key(|e| e.order);
        exercises.into_iter().map(|e| &e.exercise)
    }

    /// The template as builder selection, grouped by the primary muscle of each exercise.
    ///
    /// Exercises without a primary muscle are filed under [`Muscle::Chest`].
    #[must_use]
    pub fn selection(&self) -> SelectionState {
        let mut groups: Vec<MuscleGroup> = vec![];
        for exercise in self.exercises() {
            let muscle = exercise.muscle_or_default();
            if let Some(group) = groups.iter_mut().find(|g| g.muscle == muscle) {
                group.exercises.push(exercise.clone());
            } else {
                groups.push(MuscleGroup {
                    muscle,
                    exercises: vec![exercise.clone()],
                });
            }
        }
        let order = self
            .exercises()
            .map(|e| e.id.clone())
            .collect::<Vec<_>>();
        SelectionState::from_groups(
            self.equipment.clone(),
            self.muscles.clone(),
            groups,
            &order,
        )
    }

    #[must_use]
    pub fn workout_plan(&self) -> WorkoutPlan {
        WorkoutPlan {
            exercises: self.exercises().cloned().collect(),
            equipment: self.equipment.clone(),
            muscles: self.muscles.clone(),
        }
    }
}

#[derive(Deref, Display, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TemplateID(Uuid);

impl TemplateID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for TemplateID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for TemplateID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateExercise {
    pub exercise: Exercise,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateExerciseEntry {
    pub exercise_id: ExerciseID,
    pub order: u32,
}

impl TemplateExerciseEntry {
    #[must_use]
    pub fn from_selection(selection: &SelectionState) -> Vec<Self> {
        selection
            .exercises()
            .zip(0..)
            .map(|(exercise, order)| Self {
                exercise_id: exercise.id.clone(),
                order,
            })
            .collect()
    }
}

/// Partial update of a template. Fields set to `None` stay unchanged.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TemplateChanges {
    pub name: Option<Name>,
    pub equipment: Option<BTreeSet<Equipment>>,
    pub muscles: Option<BTreeSet<Muscle>>,
    pub exercises: Option<Vec<TemplateExerciseEntry>>,
}

impl TemplateChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.equipment.is_none()
            && self.muscles.is_none()
            && self.exercises.is_none()
    }
}
