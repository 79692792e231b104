use chrono::{DateTime, Utc};
use derive_more::{Deref, Display, Into};
use uuid::Uuid;

use crate::{
    BackendID, CreateError, DeleteError, ExerciseID, ReadError, SplitID, UpdateError,
};

#[allow(async_fn_in_trait)]
pub trait WorkoutRepository {
    async fn read_active_workout(&self) -> Result<Option<WorkoutSession>, ReadError>;
    async fn write_active_workout(&self, session: &WorkoutSession) -> Result<(), UpdateError>;
    async fn clear_active_workout(&self) -> Result<(), DeleteError>;
    /// Verify the active session, stamp `completed_at`, append it to the
    /// pending queue and the history, and clear the active slot, in that
    /// order. Process death mid-sequence leaves the session either still
    /// active or queued; the history append deduplicates by id.
    async fn complete_workout(
        &self,
        id: WorkoutID,
        completed_at: DateTime<Utc>,
    ) -> Result<WorkoutSession, UpdateError>;
    /// Append an already-completed session to the pending queue and the
    /// history without touching the active slot.
    async fn record_completed_workout(&self, session: &WorkoutSession) -> Result<(), CreateError>;
    async fn read_pending_workouts(&self) -> Result<Vec<WorkoutSession>, ReadError>;
    async fn mark_workout_synced(&self, id: WorkoutID) -> Result<(), UpdateError>;
    async fn read_workout_history(&self) -> Result<Vec<WorkoutSession>, ReadError>;
    async fn remove_workout_from_history(&self, id: WorkoutID) -> Result<(), DeleteError>;
    async fn read_backend_id(&self, id: WorkoutID) -> Result<Option<BackendID>, ReadError>;
    async fn write_backend_id(
        &self,
        id: WorkoutID,
        backend_id: BackendID,
    ) -> Result<(), UpdateError>;
}

/// One concrete attempt at working through a split day.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSession {
    pub id: WorkoutID,
    pub split_id: SplitID,
    pub day_index: u32,
    pub kind: SessionKind,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub exercises: Vec<WorkoutExercise>,
    pub pending_sync: bool,
}

impl WorkoutSession {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.completed_at.is_none()
    }

    #[must_use]
    pub fn exercise(&self, exercise_id: ExerciseID) -> Option<&WorkoutExercise> {
        self.exercises.iter().find(|e| e.exercise_id == exercise_id)
    }

    pub fn exercise_mut(&mut self, exercise_id: ExerciseID) -> Option<&mut WorkoutExercise> {
        self.exercises
            .iter_mut()
            .find(|e| e.exercise_id == exercise_id)
    }

    #[must_use]
    pub fn total_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }

    #[must_use]
    pub fn completed_sets(&self) -> usize {
        self.exercises
            .iter()
            .flat_map(|e| e.sets.iter())
            .filter(|s| s.completed)
            .count()
    }
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkoutID(Uuid);

impl WorkoutID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for WorkoutID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for WorkoutID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

/// Rest-day records flow through the same pending queue as workouts but are
/// delivered out-of-band and never uploaded directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Workout,
    Rest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutExercise {
    pub exercise_id: ExerciseID,
    pub sets: Vec<WorkoutSet>,
}

impl WorkoutExercise {
    pub fn set_mut(&mut self, set_index: u32) -> Option<&mut WorkoutSet> {
        self.sets.iter_mut().find(|s| s.set_index == set_index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutSet {
    pub set_index: u32,
    pub reps: Reps,
    pub weight: Weight,
    pub completed: bool,
}

impl WorkoutSet {
    pub fn apply(&mut self, patch: &SetPatch) {
        if let Some(reps) = patch.reps {
            self.reps = reps;
        }
        if let Some(weight) = patch.weight {
            self.weight = weight;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }
}

/// Partial update of a single set. Unset fields keep their stored value.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SetPatch {
    pub reps: Option<Reps>,
    pub weight: Option<Weight>,
    pub completed: Option<bool>,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reps(u32);

impl Reps {
    pub fn new(value: u32) -> Result<Self, RepsError> {
        if !(0..1000).contains(&value) {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be in the range 0 to 999")]
    OutOfRange,
    #[error("Reps must be an integer")]
    ParseError,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Weight(f32);

impl Weight {
    pub fn new(value: f32) -> Result<Self, WeightError> {
        if !(0.0..1000.0).contains(&value) {
            return Err(WeightError::OutOfRange);
        }

        if (value * 10.0 % 1.0).abs() > f32::EPSILON {
            return Err(WeightError::InvalidResolution);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Weight {
    type Error = WeightError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<f32>() {
            Ok(parsed_value) => Weight::new(parsed_value),
            Err(_) => Err(WeightError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WeightError {
    #[error("Weight must be in the range 0.0 to 999.9 kg")]
    OutOfRange,
    #[error("Weight must be a multiple of 0.1 kg")]
    InvalidResolution,
    #[error("Weight must be a decimal")]
    ParseError,
}
