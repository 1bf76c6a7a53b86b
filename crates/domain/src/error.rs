use crate::{ExerciseID, StepError};

#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum CreateError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("unknown exercise {0}")]
    UnknownExercise(ExerciseID),
    #[error("conflict")]
    Conflict,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum UpdateError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("unknown exercise {0}")]
    UnknownExercise(ExerciseID),
    #[error("conflict")]
    Conflict,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

impl From<CreateError> for UpdateError {
    fn from(value: CreateError) -> Self {
        match value {
            CreateError::Unauthorized => UpdateError::Unauthorized,
            CreateError::UnknownExercise(id) => UpdateError::UnknownExercise(id),
            CreateError::Conflict => UpdateError::Conflict,
            CreateError::Storage(storage) => UpdateError::Storage(storage),
            CreateError::Other(other) => UpdateError::Other(other),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DeleteError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("no connection")]
    NoConnection,
    #[error("no session")]
    NoSession,
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

/// Failure of a step transition that may involve fetching exercises.
#[derive(thiserror::Error, Debug)]
pub enum NavigationError {
    #[error(transparent)]
    Step(#[from] StepError),
    #[error("failed to fetch exercises: {0}")]
    Fetch(#[from] ReadError),
}

/// Outcome of resolving the authenticated owner of a template operation.
#[derive(thiserror::Error, Debug)]
pub enum AuthorizationError {
    #[error("unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Storage(StorageError),
    #[error(transparent)]
    Other(Box<dyn std::error::Error>),
}

impl From<ReadError> for AuthorizationError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::NotFound | ReadError::Storage(StorageError::NoSession) => {
                AuthorizationError::Unauthorized
            }
            ReadError::Storage(storage) => AuthorizationError::Storage(storage),
            ReadError::Other(other) => AuthorizationError::Other(other),
        }
    }
}

impl From<AuthorizationError> for ReadError {
    fn from(value: AuthorizationError) -> Self {
        match value {
            AuthorizationError::Unauthorized => ReadError::Storage(StorageError::NoSession),
            AuthorizationError::Storage(storage) => ReadError::Storage(storage),
            AuthorizationError::Other(other) => ReadError::Other(other),
        }
    }
}

impl From<AuthorizationError> for CreateError {
    fn from(value: AuthorizationError) -> Self {
        match value {
            AuthorizationError::Unauthorized => CreateError::Unauthorized,
            AuthorizationError::Storage(storage) => CreateError::Storage(storage),
            AuthorizationError::Other(other) => CreateError::Other(other),
        }
    }
}

impl From<AuthorizationError> for UpdateError {
    fn from(value: AuthorizationError) -> Self {
        match value {
            AuthorizationError::Unauthorized => UpdateError::Unauthorized,
            AuthorizationError::Storage(storage) => UpdateError::Storage(storage),
            AuthorizationError::Other(other) => UpdateError::Other(other),
        }
    }
}

impl From<AuthorizationError> for DeleteError {
    fn from(value: AuthorizationError) -> Self {
        match value {
            AuthorizationError::Unauthorized => DeleteError::Unauthorized,
            AuthorizationError::Storage(storage) => DeleteError::Storage(storage),
            AuthorizationError::Other(other) => DeleteError::Other(other),
        }
    }
}
