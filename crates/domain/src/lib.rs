#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod error;
mod exercise;
mod name;
mod search;
mod selection;
mod service;
mod session;
mod stepper;
mod template;
mod user;

pub use error::{
    AuthorizationError, CreateError, DeleteError, NavigationError, ReadError, StorageError,
    UpdateError,
};
pub use exercise::{
    AttributeError, Equipment, Exercise, ExerciseAttribute, ExerciseID, ExerciseRepository,
    ExerciseService, ExerciseType, Mechanics, Muscle, MuscleGroup, Property,
};
pub use name::{MAX_NAME_LENGTH, Name, NameError};
pub use search::{
    DEFAULT_SEARCH_DELAY_MS, MODAL_SEARCH_LIMIT, QUICK_SEARCH_LIMIT, QuickSearch, SearchRequest,
};
pub use selection::SelectionState;
pub use service::Service;
pub use session::{SessionRepository, SessionService, WorkoutPlan};
pub use stepper::{Editing, Step, StepError, StepStatus, Stepper};
pub use template::{
    Template, TemplateChanges, TemplateExercise, TemplateExerciseEntry, TemplateID,
    TemplateRepository, TemplateService,
};
pub use user::{User, UserID};
