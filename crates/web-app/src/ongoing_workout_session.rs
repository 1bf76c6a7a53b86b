use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use forma_domain::{
    Exercise, ExerciseAttribute, ExerciseID, MuscleGroup, SelectionState, StepError, Stepper,
    WorkoutPlan,
};
use log::warn;
use serde::{Deserialize, Serialize};

#[allow(async_fn_in_trait)]
pub trait OngoingWorkoutSessionService {
    async fn get_ongoing_workout_session(&self) -> Result<Option<OngoingWorkoutSession>, String>;
    async fn set_ongoing_workout_session(
        &self,
        ongoing_workout_session: Option<OngoingWorkoutSession>,
    ) -> Result<(), String>;
}

#[allow(async_fn_in_trait)]
pub trait OngoingWorkoutSessionRepository {
    async fn read_ongoing_workout_session(&self) -> Result<Option<OngoingWorkoutSession>, String>;
    async fn write_ongoing_workout_session(
        &self,
        ongoing_workout_session: Option<OngoingWorkoutSession>,
    ) -> Result<(), String>;
}

/// A started workout, persisted so that it survives a reload of the app.
///
/// The builder selection is stored as muscle groups plus a separate exercise order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OngoingWorkoutSession {
    pub equipment: Vec<String>,
    pub muscles: Vec<String>,
    pub groups: Vec<StoredMuscleGroup>,
    pub order: Vec<String>,
    pub start_time: DateTime<Utc>,
    pub exercise_idx: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StoredMuscleGroup {
    pub muscle: String,
    pub exercises: Vec<StoredExercise>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StoredExercise {
    pub id: String,
    pub name: String,
    pub name_en: String,
    pub full_video_url: Option<String>,
    pub full_video_image_url: Option<String>,
    pub attributes: Vec<(String, String)>,
}

impl OngoingWorkoutSession {
    /// Start a workout with the exercises selected in the builder.
    pub fn new(stepper: &Stepper) -> Result<Self, StepError> {
        stepper.workout_plan()?;
        Ok(Self::start(stepper.selection(), Utc::now()))
    }

    #[must_use]
    pub fn start(selection: &SelectionState, start_time: DateTime<Utc>) -> Self {
        Self {
            equipment: selection
                .equipment
                .iter()
                .map(|e| <&'static str>::from(*e).to_string())
                .collect(),
            muscles: selection
                .muscles
                .iter()
                .map(|m| <&'static str>::from(*m).to_string())
                .collect(),
            groups: selection
                .groups()
                .into_iter()
                .map(StoredMuscleGroup::from)
                .collect(),
            order: selection.order().iter().map(ToString::to_string).collect(),
            start_time,
            exercise_idx: 0,
        }
    }

    /// The stored selection, e.g. for resuming the builder with [`Stepper::load`].
    #[must_use]
    pub fn selection(&self) -> SelectionState {
        let groups = self
            .groups
            .iter()
            .filter_map(|group| match group.muscle.parse() {
                Ok(muscle) => Some(MuscleGroup {
                    muscle,
                    exercises: group.exercises.iter().map(Exercise::from).collect(),
                }),
                Err(_) => {
                    warn!("ignoring exercises of unknown muscle {}", group.muscle);
                    None
                }
            })
            .collect();
        let order = self
            .order
            .iter()
            .map(|id| ExerciseID::from(id.as_str()))
            .collect::<Vec<_>>();
        SelectionState::from_groups(
            parse_all(&self.equipment),
            parse_all(&self.muscles),
            groups,
            &order,
        )
    }

    #[must_use]
    pub fn workout_plan(&self) -> WorkoutPlan {
        let selection = self.selection();
        WorkoutPlan {
            exercises: selection.exercises().cloned().collect(),
            equipment: selection.equipment,
            muscles: selection.muscles,
        }
    }

    #[must_use]
    pub fn current_exercise(&self) -> Option<Exercise> {
        self.workout_plan()
            .exercises
            .into_iter()
            .nth(self.exercise_idx)
    }

    /// Move on to the next exercise. Returns `false` if the current exercise is the last one.
    pub fn next_exercise(&mut self) -> bool {
        if self.exercise_idx + 1 >= self.workout_plan().exercises.len() {
            return false;
        }
        self.exercise_idx += 1;
        true
    }

    pub fn previous_exercise(&mut self) -> bool {
        if self.exercise_idx == 0 {
            return false;
        }
        self.exercise_idx -= 1;
        true
    }
}

impl From<MuscleGroup> for StoredMuscleGroup {
    fn from(value: MuscleGroup) -> Self {
        StoredMuscleGroup {
            muscle: <&'static str>::from(value.muscle).to_string(),
            exercises: value.exercises.iter().map(StoredExercise::from).collect(),
        }
    }
}

impl From<&Exercise> for StoredExercise {
    fn from(value: &Exercise) -> Self {
        StoredExercise {
            id: value.id.to_string(),
            name: value.name.clone(),
            name_en: value.name_en.clone(),
            full_video_url: value.full_video_url.clone(),
            full_video_image_url: value.full_video_image_url.clone(),
            attributes: value
                .attributes
                .iter()
                .map(|a| (a.name().to_string(), a.value().to_string()))
                .collect(),
        }
    }
}

impl From<&StoredExercise> for Exercise {
    fn from(value: &StoredExercise) -> Self {
        Exercise {
            id: value.id.as_str().into(),
            name: value.name.clone(),
            name_en: value.name_en.clone(),
            full_video_url: value.full_video_url.clone(),
            full_video_image_url: value.full_video_image_url.clone(),
            attributes: value
                .attributes
                .iter()
                .filter_map(|(name, value)| {
                    ExerciseAttribute::parse(name, value)
                        .inspect_err(|err| warn!("ignoring stored attribute: {err}"))
                        .ok()
                })
                .collect(),
        }
    }
}

fn parse_all<T>(values: &[String]) -> BTreeSet<T>
where
    T: std::str::FromStr + Ord,
{
    values
        .iter()
        .filter_map(|value| {
            let parsed = value.parse().ok();
            if parsed.is_none() {
                warn!("ignoring unknown stored value {value}");
            }
            parsed
        })
        .collect()
}
