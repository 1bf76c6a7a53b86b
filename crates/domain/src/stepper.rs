use crate::{
    Exercise, Name, QuickSearch, SelectionState, Template, TemplateExerciseEntry, TemplateID,
    WorkoutPlan,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    #[default]
    Equipment = 1,
    Muscles = 2,
    Exercises = 3,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::Equipment, Step::Muscles, Step::Exercises];

    #[must_use]
    pub fn number(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn next(self) -> Option<Step> {
        match self {
            Step::Equipment => Some(Step::Muscles),
            Step::Muscles => Some(Step::Exercises),
            Step::Exercises => None,
        }
    }

    #[must_use]
    pub fn previous(self) -> Option<Step> {
        match self {
            Step::Equipment => None,
            Step::Muscles => Some(Step::Equipment),
            Step::Exercises => Some(Step::Muscles),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Active,
    Pending,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepError {
    #[error("Select at least one piece of equipment")]
    NoEquipment,
    #[error("Select at least one muscle")]
    NoMuscles,
    #[error("Select at least one exercise")]
    NoExercises,
    #[error("Already at the last step")]
    LastStep,
    #[error("Step {} has not been reached yet", .0.number())]
    NotReached(Step),
}

/// Template whose exercises are currently being edited in the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editing {
    pub id: TemplateID,
    pub name: Name,
}

/// The three step workout builder: equipment, muscles, exercises.
///
/// Forward navigation is gated by the selection, backward navigation is always possible.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stepper {
    step: Step,
    selection: SelectionState,
    editing: Option<Editing>,
}

impl Stepper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn step(&self) -> Step {
        self.step
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    #[must_use]
    pub fn status(&self, step: Step) -> StepStatus {
        match step.cmp(&self.step) {
            std::cmp::Ordering::Less => StepStatus::Completed,
            std::cmp::Ordering::Equal => StepStatus::Active,
            std::cmp::Ordering::Greater => StepStatus::Pending,
        }
    }

    fn check(&self) -> Result<(), StepError> {
        match self.step {
            Step::Equipment if self.selection.equipment.is_empty() => Err(StepError::NoEquipment),
            Step::Muscles if self.selection.muscles.is_empty() => Err(StepError::NoMuscles),
            Step::Exercises if self.selection.is_empty() => Err(StepError::NoExercises),
            _ => Ok(()),
        }
    }

    #[must_use]
    pub fn can_continue(&self) -> bool {
        self.check().is_ok()
    }

    pub fn next_step(&mut self) -> Result<Step, StepError> {
        let next = self.step.next().ok_or(StepError::LastStep)?;
        self.check()?;
        self.step = next;
        Ok(next)
    }

    pub fn previous_step(&mut self) -> Step {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    /// Navigate back to an already completed step.
    pub fn go_to_step(&mut self, step: Step) -> Result<Step, StepError> {
        if step > self.step {
            return Err(StepError::NotReached(step));
        }
        self.step = step;
        Ok(step)
    }

    /// Whether the exercises of the current step still have to be fetched.
    #[must_use]
    pub fn needs_fetch(&self) -> bool {
        self.step == Step::Exercises && self.selection.is_empty()
    }

    /// Show the exercise list right away, e.g. after an exercise was added by the quick search.
    pub fn jump_to_exercises(&mut self) {
        self.step = Step::Exercises;
    }

    /// Add an exercise picked from the quick search results and show the exercise list.
    ///
    /// Returns `false` if the exercise was already selected.
    pub fn add_from_search(&mut self, search: &mut QuickSearch, exercise: Exercise) -> bool {
        let added = self.selection.quick_add(exercise);
        self.jump_to_exercises();
        search.clear();
        added
    }

    /// Resume a previously built selection, bypassing all step guards.
    ///
    /// Ends the editing of a template, if any.
    pub fn load(&mut self, selection: SelectionState) {
        self.selection = selection;
        self.step = Step::Exercises;
        self.editing = None;
    }

    pub fn edit_template(&mut self, template: &Template) {
        self.load(template.selection());
        self.editing = Some(Editing {
            id: template.id,
            name: template.name.clone(),
        });
    }

    #[must_use]
    pub fn editing(&self) -> Option<&Editing> {
        self.editing.as_ref()
    }

    pub fn stop_editing(&mut self) {
        self.editing = None;
    }

    /// Start over with an empty selection.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn workout_plan(&self) -> Result<WorkoutPlan, StepError> {
        if self.selection.is_empty() {
            return Err(StepError::NoExercises);
        }
        Ok(WorkoutPlan {
            exercises: self.selection.exercises().cloned().collect(),
            equipment: self.selection.equipment.clone(),
            muscles: self.selection.muscles.clone(),
        })
    }

    #[must_use]
    pub fn template_exercises(&self) -> Vec<TemplateExerciseEntry> {
        TemplateExerciseEntry::from_selection(&self.selection)
    }
}
