use std::collections::BTreeMap;
use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use chrono::{DateTime, Utc};
use log::{debug, error, warn};

use crate::{
    BackendID, DeleteError, ExerciseID, ExerciseRepository, SessionKind, SplitID, SplitRepository,
    SyncError, UserID, WorkoutID, WorkoutRepository,
};

#[allow(async_fn_in_trait)]
pub trait WorkoutApi {
    async fn create_workout_session(&self, upload: &SessionUpload) -> Result<BackendID, ApiError>;
    async fn delete_workout_session(&self, id: BackendID) -> Result<(), ApiError>;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("no connection")]
    NoConnection,
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    /// Server-side faults and failures without a distinguishable status are
    /// worth another attempt on the next pass; everything else is final.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::NoConnection | ApiError::Deserialization(_) => true,
            ApiError::Status(status) => (500..=599).contains(status),
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status(status) => Some(*status),
            ApiError::NoConnection | ApiError::Deserialization(_) => None,
        }
    }
}

pub trait ConnectivityProbe {
    fn is_online(&self) -> bool;
}

impl<F: Fn() -> bool> ConnectivityProbe for F {
    fn is_online(&self) -> bool {
        self()
    }
}

/// Wire form of a completed session, enriched with display names so the
/// backend row is self-contained.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionUpload {
    pub user_id: UserID,
    pub split_id: SplitID,
    pub day_name: String,
    pub day_number: u32,
    pub completed_at: DateTime<Utc>,
    pub exercises: Vec<UploadExercise>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadExercise {
    pub name: String,
    pub sets: Vec<UploadSet>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UploadSet {
    pub set_number: u32,
    pub weight: f32,
    pub reps: u32,
    pub completed: bool,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SyncOutcome {
    pub synced: usize,
    pub failed: usize,
    pub errors: Vec<SyncFailure>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncFailure {
    pub session_id: WorkoutID,
    pub status: Option<u16>,
    pub message: String,
}

#[derive(Debug, Default, Clone)]
pub struct SyncStatus {
    pub runs: u32,
    pub last_outcome: Option<SyncOutcome>,
    pub last_error: Option<String>,
}

/// Drains the pending queue against the remote API. Reads the queue and
/// mutates queue membership only; the active session slot is never touched,
/// so sync may run concurrently with an ongoing workout.
pub struct SyncService<R, A, P> {
    repository: R,
    api: A,
    probe: P,
    in_flight: AtomicBool,
    status: Mutex<SyncStatus>,
}

struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<R, A, P> SyncService<R, A, P>
where
    R: WorkoutRepository + ExerciseRepository + SplitRepository,
    A: WorkoutApi,
    P: ConnectivityProbe,
{
    pub fn new(repository: R, api: A, probe: P) -> Self {
        Self {
            repository,
            api,
            probe,
            in_flight: AtomicBool::new(false),
            status: Mutex::new(SyncStatus::default()),
        }
    }

    /// One reconciliation pass. Returns zero counts without touching the
    /// network if no user is signed in, connectivity is missing, or another
    /// pass is still running.
    pub async fn sync_pending_workouts(
        &self,
        user_id: Option<UserID>,
    ) -> Result<SyncOutcome, SyncError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            debug!("sync already in flight");
            return Ok(SyncOutcome::default());
        }
        let _guard = FlightGuard(&self.in_flight);

        let Some(user_id) = user_id else {
            debug!("no signed-in user, skipping sync");
            return Ok(SyncOutcome::default());
        };
        if !self.probe.is_online() {
            debug!("offline, skipping sync");
            return Ok(SyncOutcome::default());
        }

        let pending = self.repository.read_pending_workouts().await?;
        if pending.is_empty() {
            return Ok(SyncOutcome::default());
        }

        let names = self.exercise_names().await?;
        let split = self.repository.read_split().await?;
        let mut outcome = SyncOutcome::default();

        for session in pending {
            if session.kind == SessionKind::Rest {
                self.repository.mark_workout_synced(session.id).await?;
                outcome.synced += 1;
                continue;
            }

            let exercises = session
                .exercises
                .iter()
                .filter(|e| !e.sets.is_empty())
                .map(|e| UploadExercise {
                    name: names
                        .get(&e.exercise_id)
                        .cloned()
                        .unwrap_or_else(|| e.exercise_id.to_string()),
                    sets: e
                        .sets
                        .iter()
                        .map(|s| UploadSet {
                            set_number: s.set_index + 1,
                            weight: s.weight.into(),
                            reps: s.reps.into(),
                            completed: s.completed,
                        })
                        .collect(),
                })
                .filter(|e| !e.name.is_empty())
                .collect::<Vec<UploadExercise>>();

            if exercises.is_empty() {
                warn!(
                    "workout session {} has no uploadable exercises",
                    *session.id
                );
                self.repository.mark_workout_synced(session.id).await?;
                outcome.failed += 1;
                outcome.errors.push(SyncFailure {
                    session_id: session.id,
                    status: None,
                    message: "no uploadable exercises".to_string(),
                });
                continue;
            }

            let day = split.as_ref().and_then(|s| s.day(session.day_index));
            let upload = SessionUpload {
                user_id,
                split_id: session.split_id,
                day_name: day.map_or_else(
                    || format!("Day {}", session.day_index + 1),
                    |d| d.name.clone(),
                ),
                day_number: session.day_index + 1,
                completed_at: session.completed_at.unwrap_or(session.started_at),
                exercises,
            };

            match self.api.create_workout_session(&upload).await {
                Ok(backend_id) => {
                    self.repository
                        .write_backend_id(session.id, backend_id)
                        .await?;
                    self.repository.mark_workout_synced(session.id).await?;
                    outcome.synced += 1;
                }
                Err(err) if err.is_retryable() => {
                    debug!(
                        "upload of workout session {} failed, will retry: {err}",
                        *session.id
                    );
                    outcome.failed += 1;
                }
                Err(err) => {
                    error!(
                        "upload of workout session {} failed permanently: {err}",
                        *session.id
                    );
                    self.repository.mark_workout_synced(session.id).await?;
                    outcome.failed += 1;
                    outcome.errors.push(SyncFailure {
                        session_id: session.id,
                        status: err.status(),
                        message: err.to_string(),
                    });
                }
            }
        }

        Ok(outcome)
    }

    /// Fire-and-forget variant for timers and foreground transitions. Never
    /// fails; outcomes and errors are captured into the observable status.
    pub async fn background_sync(&self, user_id: Option<UserID>) {
        let result = self.sync_pending_workouts(user_id).await;
        let mut status = self.status.lock().unwrap();
        status.runs += 1;
        match result {
            Ok(outcome) => status.last_outcome = Some(outcome),
            Err(err) => {
                error!("background sync failed: {err}");
                status.last_error = Some(err.to_string());
            }
        }
    }

    #[must_use]
    pub fn status(&self) -> SyncStatus {
        self.status.lock().unwrap().clone()
    }

    /// Inverse of completing a workout: drop the history entry and delete
    /// the matching backend row if the session was already uploaded. The
    /// remote delete is best-effort.
    pub async fn uncomplete_workout(&self, id: WorkoutID) -> Result<(), DeleteError> {
        self.repository.remove_workout_from_history(id).await?;
        if let Some(backend_id) = self.repository.read_backend_id(id).await? {
            if let Err(err) = self.api.delete_workout_session(backend_id).await {
                warn!("failed to delete backend workout session {backend_id}: {err}");
            }
        }
        Ok(())
    }

    async fn exercise_names(&self) -> Result<BTreeMap<ExerciseID, String>, SyncError> {
        let mut names = BTreeMap::new();
        for exercise in self.repository.read_exercises().await? {
            names.insert(exercise.id, exercise.name.to_string());
        }
        for exercise in self.repository.read_custom_exercises().await? {
            names.insert(exercise.id, exercise.name.to_string());
        }
        Ok(names)
    }
}
