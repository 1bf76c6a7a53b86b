use std::collections::BTreeSet;

use crate::{Equipment, Exercise, Muscle, ReadError, User};

#[allow(async_fn_in_trait)]
pub trait SessionService {
    async fn get_session(&self) -> Result<User, ReadError>;
}

/// Source of the authenticated identity.
///
/// Fails with `StorageError::NoSession` if nobody is signed in.
#[allow(async_fn_in_trait)]
pub trait SessionRepository {
    async fn initialize_session(&self) -> Result<User, ReadError>;
}

/// Everything the workout session needs to start: the exercises in their final order and the
/// filters they were chosen with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutPlan {
    pub exercises: Vec<Exercise>,
    pub equipment: BTreeSet<Equipment>,
    pub muscles: BTreeSet<Muscle>,
}
