#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod action;
pub mod catalog;
pub mod error;
pub mod exercise;
pub mod name;
pub mod progression;
pub mod service;
pub mod split;
pub mod sync;
pub mod workout;

use derive_more::{Deref, Display};
use uuid::Uuid;

pub use action::{
    ActionDispatcher, ActionError, ActionID, ActionQueueRepository, MAX_ATTEMPTS, QueuedAction,
    ReplayOutcome,
};
pub use error::{CreateError, DeleteError, ReadError, StorageError, SyncError, UpdateError};
pub use exercise::{
    Category, CustomExercise, Difficulty, Equipment, Exercise, ExerciseID, ExerciseIDError,
    ExerciseRepository, Muscle, merge_custom_exercises,
};
pub use name::{Name, NameError};
pub use progression::{
    ActivityDay, Evaluation, Progression, ProgressionRepository, evaluate, streak,
};
pub use service::{DayPreview, PreviewExercise, Service, StartError, UpdateSetError};
pub use split::{
    DEFAULT_TARGET_REPS, DEFAULT_TARGET_SETS, Split, SplitDay, SplitExercise, SplitID,
    SplitRepository, validate_and_repair,
};
pub use sync::{
    ApiError, ConnectivityProbe, SessionUpload, SyncFailure, SyncOutcome, SyncService, SyncStatus,
    UploadExercise, UploadSet, WorkoutApi,
};
pub use workout::{
    Reps, RepsError, SessionKind, SetPatch, Weight, WeightError, WorkoutExercise, WorkoutID,
    WorkoutRepository, WorkoutSession, WorkoutSet,
};

/// Identifier of a row owned by the remote backend.
#[derive(Deref, Display, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct BackendID(u64);

impl From<u64> for BackendID {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

#[derive(Deref, Display, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct UserID(Uuid);

impl UserID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for UserID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for UserID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}
