use chrono::{Local, NaiveDate, Utc};
use log::{debug, error, warn};
use uuid::Uuid;

use crate::{
    ActivityDay, DeleteError, Evaluation, ExerciseID, ExerciseRepository, ProgressionRepository,
    ReadError, Reps, SessionKind, SetPatch, SplitID, SplitRepository, StorageError, UpdateError,
    Weight, WorkoutExercise, WorkoutID, WorkoutRepository, WorkoutSession, WorkoutSet, evaluate,
    progression, split::validate_and_repair,
};

/// UI-facing façade over the repositories: the workout session state machine
/// (`NONE -> ACTIVE -> COMPLETED | CANCELLED`), the day pointer, and derived
/// read models. All mutations persist before returning, so process death
/// leaves durable state at some prior valid point.
pub struct Service<R> {
    repository: R,
}

impl<R> Service<R>
where
    R: SplitRepository + WorkoutRepository + ExerciseRepository + ProgressionRepository,
{
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Start working through a split day. If a session is already active it
    /// is returned unchanged, so a restarted app resumes instead of forking
    /// a second session.
    pub async fn start_workout(
        &self,
        split_id: SplitID,
        day_index: u32,
    ) -> Result<WorkoutSession, StartError> {
        let Some(split) = self.repository.read_split().await? else {
            return Err(StartError::NoActiveSplit);
        };
        if split.id != split_id {
            return Err(StartError::SplitMismatch);
        }

        if let Some(active) = self.repository.read_active_workout().await? {
            debug!("resuming active workout session {}", *active.id);
            return Ok(active);
        }

        let (split, repaired) = validate_and_repair(split);
        if repaired {
            warn!("stored split was malformed, persisting repaired form");
            self.repository.write_split(&split).await?;
        }

        let Some(day) = split.day(day_index) else {
            return Err(StartError::InvalidDay(day_index));
        };
        if day.is_rest {
            return Err(StartError::InvalidDay(day_index));
        }

        let exercises = day
            .exercises
            .iter()
            .map(|e| WorkoutExercise {
                exercise_id: e.exercise_id,
                sets: (0..e.target_sets)
                    .map(|set_index| WorkoutSet {
                        set_index,
                        reps: Reps::new(e.target_reps).unwrap_or_default(),
                        weight: Weight::default(),
                        completed: false,
                    })
                    .collect(),
            })
            .filter(|e| !e.sets.is_empty())
            .collect::<Vec<WorkoutExercise>>();
        if exercises.is_empty() {
            return Err(StartError::EmptyWorkout);
        }

        let session = WorkoutSession {
            id: WorkoutID::from(Uuid::new_v4()),
            split_id,
            day_index,
            kind: SessionKind::Workout,
            started_at: Utc::now(),
            completed_at: None,
            exercises,
            pending_sync: false,
        };
        self.repository.write_active_workout(&session).await?;
        Ok(session)
    }

    /// Record a rest day. The record goes through the completion pipeline
    /// (pending queue and history) without ever becoming the active session.
    pub async fn start_rest_day(
        &self,
        split_id: SplitID,
        day_index: u32,
    ) -> Result<WorkoutSession, StartError> {
        let Some(split) = self.repository.read_split().await? else {
            return Err(StartError::NoActiveSplit);
        };
        if split.id != split_id {
            return Err(StartError::SplitMismatch);
        }
        if !split.day(day_index).is_some_and(|day| day.is_rest) {
            return Err(StartError::InvalidDay(day_index));
        }

        let now = Utc::now();
        let session = WorkoutSession {
            id: WorkoutID::from(Uuid::new_v4()),
            split_id,
            day_index,
            kind: SessionKind::Rest,
            started_at: now,
            completed_at: Some(now),
            exercises: vec![],
            pending_sync: true,
        };
        self.repository.record_completed_workout(&session).await?;
        self.record_completion(session.id).await?;
        Ok(session)
    }

    /// Patch a single set of the active session and persist immediately.
    /// Sessions may be abandoned at any set, so durability wins over
    /// batching.
    pub async fn update_workout_set(
        &self,
        session_id: WorkoutID,
        exercise_id: ExerciseID,
        set_index: u32,
        patch: SetPatch,
    ) -> Result<WorkoutSession, UpdateSetError> {
        let Some(mut session) = self.repository.read_active_workout().await? else {
            return Err(UpdateSetError::NoActiveWorkout);
        };
        if session.id != session_id {
            return Err(UpdateSetError::SessionMismatch);
        }

        let Some(exercise) = session.exercise_mut(exercise_id) else {
            error!("active workout session has no exercise {exercise_id}");
            return Err(UpdateSetError::ExerciseNotFound);
        };
        let Some(set) = exercise.set_mut(set_index) else {
            error!("exercise {exercise_id} has no set {set_index}");
            return Err(UpdateSetError::SetNotFound);
        };
        set.apply(&patch);

        self.repository.write_active_workout(&session).await?;
        Ok(session)
    }

    /// Move the active session into the pending queue and the history, and
    /// mark today's split day as completed.
    pub async fn complete_workout(
        &self,
        session_id: WorkoutID,
    ) -> Result<WorkoutSession, UpdateError> {
        let session = self
            .repository
            .complete_workout(session_id, Utc::now())
            .await?;
        self.record_completion(session_id).await?;
        Ok(session)
    }

    /// Discard the active session. A no-op if the id does not match, since
    /// the caller may race with an already-cleared session.
    pub async fn cancel_workout(&self, session_id: WorkoutID) -> Result<(), DeleteError> {
        match self.repository.read_active_workout().await? {
            Some(active) if active.id == session_id => {
                self.repository.clear_active_workout().await
            }
            Some(_) | None => {
                debug!("no active workout session {}, nothing to cancel", *session_id);
                Ok(())
            }
        }
    }

    /// Pure projection of the current split day for display. Exercise names
    /// resolve against the catalog and the custom collection, falling back
    /// to the raw id.
    pub async fn todays_workout(&self) -> Result<DayPreview, ReadError> {
        let Some(split) = self.repository.read_split().await? else {
            return Err(ReadError::NotFound);
        };
        if split.days.is_empty() {
            return Err(ReadError::NotFound);
        }
        let progression = self.repository.read_progression().await?;
        let total_days = u32::try_from(split.days.len()).unwrap_or(1);
        let day_index = progression.current_day_index % total_days;
        let day = split.day(day_index).ok_or(ReadError::NotFound)?;

        let mut names = std::collections::BTreeMap::new();
        for exercise in self.repository.read_exercises().await? {
            names.insert(exercise.id, exercise.name.to_string());
        }
        for exercise in self.repository.read_custom_exercises().await? {
            names.insert(exercise.id, exercise.name.to_string());
        }

        Ok(DayPreview {
            week: progression.current_week,
            day_index,
            name: day.name.clone(),
            is_rest: day.is_rest,
            exercises: day
                .exercises
                .iter()
                .map(|e| PreviewExercise {
                    exercise_id: e.exercise_id,
                    name: names
                        .get(&e.exercise_id)
                        .cloned()
                        .unwrap_or_else(|| e.exercise_id.to_string()),
                    target_sets: e.target_sets,
                    target_reps: e.target_reps,
                    rest_seconds: e.rest_seconds,
                })
                .collect(),
        })
    }

    /// Evaluate the day pointer against the calendar and persist the result
    /// when it moved. Called on app foreground and on a fixed interval.
    pub async fn check_day_progression(
        &self,
        today: NaiveDate,
    ) -> Result<Evaluation, UpdateError> {
        let state = self.repository.read_progression().await?;
        let Some(split) = self.repository.read_split().await? else {
            return Ok(Evaluation {
                state,
                advanced: false,
                corrected: false,
                changed: false,
            });
        };
        let evaluation = evaluate(&state, &split, today);
        if evaluation.changed {
            self.repository.write_progression(&evaluation.state).await?;
        }
        Ok(evaluation)
    }

    /// Streak derived from the local history alone, so it works fully
    /// offline.
    pub async fn streak_from_local(&self, today: NaiveDate) -> Result<u32, ReadError> {
        let history = self.repository.read_workout_history().await?;
        let days = history
            .iter()
            .filter_map(|session| {
                session.completed_at.map(|completed_at| ActivityDay {
                    date: completed_at.with_timezone(&Local).date_naive(),
                    kind: session.kind,
                })
            })
            .collect::<Vec<ActivityDay>>();
        Ok(progression::streak(&days, today))
    }

    async fn record_completion(&self, session_id: WorkoutID) -> Result<(), UpdateError> {
        let mut progression = self.repository.read_progression().await?;
        progression.last_completion_date = Some(Local::now().date_naive());
        progression.completed_session_id = Some(session_id);
        self.repository.write_progression(&progression).await
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StartError {
    #[error("no active split")]
    NoActiveSplit,
    #[error("split mismatch")]
    SplitMismatch,
    #[error("invalid day {0}")]
    InvalidDay(u32),
    #[error("workout day has no exercises")]
    EmptyWorkout,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(Box<dyn std::error::Error>),
}

impl From<ReadError> for StartError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::NotFound => StartError::NoActiveSplit,
            ReadError::Storage(storage) => StartError::Storage(storage),
            ReadError::Other(other) => StartError::Other(other),
        }
    }
}

impl From<UpdateError> for StartError {
    fn from(value: UpdateError) -> Self {
        match value {
            UpdateError::Conflict => StartError::Other("conflict".into()),
            UpdateError::NotFound => StartError::Other("not found".into()),
            UpdateError::Storage(storage) => StartError::Storage(storage),
            UpdateError::Other(other) => StartError::Other(other),
        }
    }
}

impl From<crate::CreateError> for StartError {
    fn from(value: crate::CreateError) -> Self {
        match value {
            crate::CreateError::Conflict => StartError::Other("conflict".into()),
            crate::CreateError::Storage(storage) => StartError::Storage(storage),
            crate::CreateError::Other(other) => StartError::Other(other),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum UpdateSetError {
    #[error("no active workout session")]
    NoActiveWorkout,
    #[error("session mismatch")]
    SessionMismatch,
    #[error("exercise not found")]
    ExerciseNotFound,
    #[error("set not found")]
    SetNotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(Box<dyn std::error::Error>),
}

impl From<ReadError> for UpdateSetError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::NotFound => UpdateSetError::NoActiveWorkout,
            ReadError::Storage(storage) => UpdateSetError::Storage(storage),
            ReadError::Other(other) => UpdateSetError::Other(other),
        }
    }
}

impl From<UpdateError> for UpdateSetError {
    fn from(value: UpdateError) -> Self {
        match value {
            UpdateError::Conflict => UpdateSetError::Other("conflict".into()),
            UpdateError::NotFound => UpdateSetError::Other("not found".into()),
            UpdateError::Storage(storage) => UpdateSetError::Storage(storage),
            UpdateError::Other(other) => UpdateSetError::Other(other),
        }
    }
}

/// Display form of "today's workout".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayPreview {
    pub week: u32,
    pub day_index: u32,
    pub name: String,
    pub is_rest: bool,
    pub exercises: Vec<PreviewExercise>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewExercise {
    pub exercise_id: ExerciseID,
    pub name: String,
    pub target_sets: u32,
    pub target_reps: u32,
    pub rest_seconds: u32,
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    use chrono::DateTime;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::{
        BackendID, CreateError, CustomExercise, Exercise, Name, Progression, Split, SplitDay,
        SplitExercise, catalog,
    };

    #[derive(Default)]
    struct FakeRepository {
        split: RefCell<Option<Split>>,
        active: RefCell<Option<WorkoutSession>>,
        pending: RefCell<Vec<WorkoutSession>>,
        history: RefCell<Vec<WorkoutSession>>,
        custom: RefCell<Vec<CustomExercise>>,
        progression: RefCell<Progression>,
        backend_ids: RefCell<BTreeMap<WorkoutID, BackendID>>,
    }

    impl SplitRepository for FakeRepository {
        async fn read_split(&self) -> Result<Option<Split>, ReadError> {
            Ok(self.split.borrow().clone())
        }

        async fn write_split(&self, split: &Split) -> Result<(), UpdateError> {
            *self.split.borrow_mut() = Some(split.clone());
            Ok(())
        }
    }

    impl WorkoutRepository for FakeRepository {
        async fn read_active_workout(&self) -> Result<Option<WorkoutSession>, ReadError> {
            Ok(self.active.borrow().clone())
        }

        async fn write_active_workout(&self, session: &WorkoutSession) -> Result<(), UpdateError> {
            *self.active.borrow_mut() = Some(session.clone());
            Ok(())
        }

        async fn clear_active_workout(&self) -> Result<(), DeleteError> {
            *self.active.borrow_mut() = None;
            Ok(())
        }

        async fn complete_workout(
            &self,
            id: WorkoutID,
            completed_at: DateTime<Utc>,
        ) -> Result<WorkoutSession, UpdateError> {
            let mut session = match &*self.active.borrow() {
                Some(active) if active.id == id => active.clone(),
                _ => return Err(UpdateError::NotFound),
            };
            session.completed_at = Some(completed_at);
            session.pending_sync = true;
            self.pending.borrow_mut().push(session.clone());
            let mut history = self.history.borrow_mut();
            if !history.iter().any(|s| s.id == session.id) {
                history.push(session.clone());
            }
            drop(history);
            *self.active.borrow_mut() = None;
            Ok(session)
        }

        async fn record_completed_workout(
            &self,
            session: &WorkoutSession,
        ) -> Result<(), CreateError> {
            self.pending.borrow_mut().push(session.clone());
            let mut history = self.history.borrow_mut();
            if !history.iter().any(|s| s.id == session.id) {
                history.push(session.clone());
            }
            Ok(())
        }

        async fn read_pending_workouts(&self) -> Result<Vec<WorkoutSession>, ReadError> {
            Ok(self.pending.borrow().clone())
        }

        async fn mark_workout_synced(&self, id: WorkoutID) -> Result<(), UpdateError> {
            self.pending.borrow_mut().retain(|s| s.id != id);
            Ok(())
        }

        async fn read_workout_history(&self) -> Result<Vec<WorkoutSession>, ReadError> {
            Ok(self.history.borrow().clone())
        }

        async fn remove_workout_from_history(&self, id: WorkoutID) -> Result<(), DeleteError> {
            self.history.borrow_mut().retain(|s| s.id != id);
            Ok(())
        }

        async fn read_backend_id(&self, id: WorkoutID) -> Result<Option<BackendID>, ReadError> {
            Ok(self.backend_ids.borrow().get(&id).copied())
        }

        async fn write_backend_id(
            &self,
            id: WorkoutID,
            backend_id: BackendID,
        ) -> Result<(), UpdateError> {
            self.backend_ids.borrow_mut().insert(id, backend_id);
            Ok(())
        }
    }

    impl ExerciseRepository for FakeRepository {
        async fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
            Ok(catalog::exercises())
        }

        async fn read_custom_exercises(&self) -> Result<Vec<CustomExercise>, ReadError> {
            Ok(self.custom.borrow().clone())
        }

        async fn create_custom_exercise(
            &self,
            exercise: CustomExercise,
        ) -> Result<CustomExercise, CreateError> {
            self.custom.borrow_mut().push(exercise.clone());
            Ok(exercise)
        }

        async fn replace_custom_exercise(
            &self,
            exercise: CustomExercise,
        ) -> Result<CustomExercise, UpdateError> {
            Ok(exercise)
        }

        async fn delete_custom_exercise(
            &self,
            id: ExerciseID,
        ) -> Result<ExerciseID, DeleteError> {
            Ok(id)
        }

        async fn replace_custom_exercises(
            &self,
            server: Vec<CustomExercise>,
        ) -> Result<Vec<CustomExercise>, UpdateError> {
            *self.custom.borrow_mut() = server.clone();
            Ok(server)
        }
    }

    impl ProgressionRepository for FakeRepository {
        async fn read_progression(&self) -> Result<Progression, ReadError> {
            Ok(self.progression.borrow().clone())
        }

        async fn write_progression(&self, progression: &Progression) -> Result<(), UpdateError> {
            *self.progression.borrow_mut() = progression.clone();
            Ok(())
        }
    }

    fn split() -> Split {
        Split {
            id: 1.into(),
            name: Name::new("Push/Pull/Legs").unwrap(),
            total_days: 3,
            days: vec![
                SplitDay {
                    day_index: 0,
                    name: "Push".to_string(),
                    is_rest: false,
                    exercises: vec![
                        SplitExercise {
                            exercise_id: 2.into(),
                            target_sets: 3,
                            target_reps: 10,
                            rest_seconds: 120,
                        },
                        SplitExercise {
                            exercise_id: 4.into(),
                            target_sets: 2,
                            target_reps: 8,
                            rest_seconds: 90,
                        },
                    ],
                },
                SplitDay {
                    day_index: 1,
                    name: "Rest".to_string(),
                    is_rest: true,
                    exercises: vec![],
                },
                SplitDay {
                    day_index: 2,
                    name: "Legs".to_string(),
                    is_rest: false,
                    exercises: vec![],
                },
            ],
        }
    }

    fn service_with_split() -> Service<FakeRepository> {
        let repository = FakeRepository::default();
        *repository.split.borrow_mut() = Some(split());
        Service::new(repository)
    }

    #[tokio::test]
    async fn test_start_workout_without_split() {
        let service = Service::new(FakeRepository::default());
        assert!(matches!(
            service.start_workout(1.into(), 0).await,
            Err(StartError::NoActiveSplit)
        ));
    }

    #[tokio::test]
    async fn test_start_workout_split_mismatch() {
        let service = service_with_split();
        assert!(matches!(
            service.start_workout(2.into(), 0).await,
            Err(StartError::SplitMismatch)
        ));
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[tokio::test]
    async fn test_start_workout_invalid_day(#[case] day_index: u32) {
        let service = service_with_split();
        assert!(matches!(
            service.start_workout(1.into(), day_index).await,
            Err(StartError::InvalidDay(index)) if index == day_index
        ));
    }

    #[tokio::test]
    async fn test_start_workout_empty_day() {
        let service = service_with_split();
        assert!(matches!(
            service.start_workout(1.into(), 2).await,
            Err(StartError::EmptyWorkout)
        ));
        assert!(service.repository.active.borrow().is_none());
    }

    #[tokio::test]
    async fn test_start_workout_builds_sets_from_targets() {
        let service = service_with_split();
        let session = service.start_workout(1.into(), 0).await.unwrap();

        assert!(session.is_active());
        assert_eq!(session.kind, SessionKind::Workout);
        assert_eq!(session.exercises.len(), 2);
        assert_eq!(session.exercises[0].sets.len(), 3);
        assert_eq!(session.exercises[1].sets.len(), 2);
        assert_eq!(
            session.exercises[0]
                .sets
                .iter()
                .map(|s| s.set_index)
                .collect::<Vec<u32>>(),
            vec![0, 1, 2]
        );
        assert_eq!(session.exercises[0].sets[0].reps, Reps::new(10).unwrap());
        assert!(!session.exercises[0].sets[0].completed);
        assert_eq!(*service.repository.active.borrow(), Some(session));
    }

    #[tokio::test]
    async fn test_start_workout_is_idempotent_while_active() {
        let service = service_with_split();
        let first = service.start_workout(1.into(), 0).await.unwrap();
        let second = service.start_workout(1.into(), 0).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_start_workout_repairs_malformed_split() {
        let repository = FakeRepository::default();
        let mut malformed = split();
        malformed.days[0].exercises[0].target_sets = 0;
        malformed.days[0].exercises[0].target_reps = 0;
        *repository.split.borrow_mut() = Some(malformed);
        let service = Service::new(repository);

        let session = service.start_workout(1.into(), 0).await.unwrap();

        assert_eq!(session.exercises[0].sets.len(), 3);
        assert_eq!(session.exercises[0].sets[0].reps, Reps::new(10).unwrap());
        let stored = service.repository.split.borrow().clone().unwrap();
        assert_eq!(stored.days[0].exercises[0].target_sets, 3);
        assert_eq!(stored.days[0].exercises[0].target_reps, 10);
    }

    #[tokio::test]
    async fn test_update_workout_set_persists_patch() {
        let service = service_with_split();
        let session = service.start_workout(1.into(), 0).await.unwrap();

        let updated = service
            .update_workout_set(
                session.id,
                2.into(),
                1,
                SetPatch {
                    reps: Some(Reps::new(8).unwrap()),
                    weight: Some(Weight::new(62.5).unwrap()),
                    completed: Some(true),
                },
            )
            .await
            .unwrap();

        let set = updated.exercises[0].sets[1];
        assert_eq!(set.reps, Reps::new(8).unwrap());
        assert_eq!(set.weight, Weight::new(62.5).unwrap());
        assert!(set.completed);
        assert_eq!(*service.repository.active.borrow(), Some(updated));
    }

    #[tokio::test]
    async fn test_update_workout_set_errors() {
        let service = service_with_split();

        assert!(matches!(
            service
                .update_workout_set(1.into(), 2.into(), 0, SetPatch::default())
                .await,
            Err(UpdateSetError::NoActiveWorkout)
        ));

        let session = service.start_workout(1.into(), 0).await.unwrap();

        assert!(matches!(
            service
                .update_workout_set(99.into(), 2.into(), 0, SetPatch::default())
                .await,
            Err(UpdateSetError::SessionMismatch)
        ));
        assert!(matches!(
            service
                .update_workout_set(session.id, 99.into(), 0, SetPatch::default())
                .await,
            Err(UpdateSetError::ExerciseNotFound)
        ));
        assert!(matches!(
            service
                .update_workout_set(session.id, 2.into(), 7, SetPatch::default())
                .await,
            Err(UpdateSetError::SetNotFound)
        ));
    }

    #[tokio::test]
    async fn test_complete_workout_moves_session_through_pipeline() {
        let service = service_with_split();
        let session = service.start_workout(1.into(), 0).await.unwrap();

        let completed = service.complete_workout(session.id).await.unwrap();

        assert!(!completed.is_active());
        assert!(completed.pending_sync);
        assert!(service.repository.active.borrow().is_none());
        assert_eq!(service.repository.pending.borrow().len(), 1);
        assert_eq!(service.repository.history.borrow().len(), 1);

        let progression = service.repository.progression.borrow();
        assert_eq!(progression.completed_session_id, Some(session.id));
        assert_eq!(
            progression.last_completion_date,
            Some(Local::now().date_naive())
        );
    }

    #[tokio::test]
    async fn test_complete_workout_twice_fails_without_active_session() {
        let service = service_with_split();
        let session = service.start_workout(1.into(), 0).await.unwrap();
        service.complete_workout(session.id).await.unwrap();

        assert!(matches!(
            service.complete_workout(session.id).await,
            Err(UpdateError::NotFound)
        ));
        assert_eq!(service.repository.history.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_at_most_one_session_is_active() {
        let service = service_with_split();
        let first = service.start_workout(1.into(), 0).await.unwrap();
        service.complete_workout(first.id).await.unwrap();
        let second = service.start_workout(1.into(), 0).await.unwrap();

        assert_ne!(first.id, second.id);
        let active = service
            .repository
            .history
            .borrow()
            .iter()
            .chain(service.repository.active.borrow().iter())
            .filter(|s| s.is_active())
            .count();
        assert_eq!(active, 1);
    }

    #[tokio::test]
    async fn test_cancel_workout_discards_active_session() {
        let service = service_with_split();
        let session = service.start_workout(1.into(), 0).await.unwrap();

        service.cancel_workout(session.id).await.unwrap();

        assert!(service.repository.active.borrow().is_none());
        assert!(service.repository.history.borrow().is_empty());
        assert!(service.repository.pending.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_workout_with_mismatched_id_is_a_no_op() {
        let service = service_with_split();
        let session = service.start_workout(1.into(), 0).await.unwrap();

        service.cancel_workout(99.into()).await.unwrap();

        assert_eq!(service.repository.active.borrow().clone(), Some(session));
    }

    #[tokio::test]
    async fn test_start_rest_day_records_completed_session() {
        let service = service_with_split();

        let session = service.start_rest_day(1.into(), 1).await.unwrap();

        assert_eq!(session.kind, SessionKind::Rest);
        assert!(!session.is_active());
        assert!(service.repository.active.borrow().is_none());
        assert_eq!(service.repository.pending.borrow().len(), 1);
        assert_eq!(service.repository.history.borrow().len(), 1);
        assert_eq!(
            service.repository.progression.borrow().completed_session_id,
            Some(session.id)
        );
    }

    #[tokio::test]
    async fn test_start_rest_day_on_workout_day_fails() {
        let service = service_with_split();
        assert!(matches!(
            service.start_rest_day(1.into(), 0).await,
            Err(StartError::InvalidDay(0))
        ));
    }

    #[tokio::test]
    async fn test_todays_workout_resolves_names() {
        let service = service_with_split();

        let preview = service.todays_workout().await.unwrap();

        assert_eq!(preview.week, 1);
        assert_eq!(preview.day_index, 0);
        assert_eq!(preview.name, "Push");
        assert!(!preview.is_rest);
        assert_eq!(preview.exercises.len(), 2);
        assert_eq!(preview.exercises[0].name, "Barbell Bench Press");
        assert_eq!(preview.exercises[1].name, "Overhead Press");
        assert_eq!(preview.exercises[0].target_sets, 3);
    }

    #[tokio::test]
    async fn test_todays_workout_marks_rest_day() {
        let service = service_with_split();
        service.repository.progression.borrow_mut().current_day_index = 1;

        let preview = service.todays_workout().await.unwrap();

        assert!(preview.is_rest);
        assert!(preview.exercises.is_empty());
    }

    #[tokio::test]
    async fn test_todays_workout_without_split() {
        let service = Service::new(FakeRepository::default());
        assert!(matches!(
            service.todays_workout().await,
            Err(ReadError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_check_day_progression_persists_movement() {
        let service = service_with_split();
        let yesterday = Local::now().date_naive() - chrono::Duration::days(1);
        {
            let mut progression = service.repository.progression.borrow_mut();
            progression.current_day_index = 1;
            progression.last_check_date = Some(yesterday);
        }

        let evaluation = service
            .check_day_progression(Local::now().date_naive())
            .await
            .unwrap();

        assert!(evaluation.advanced);
        assert_eq!(
            service.repository.progression.borrow().current_day_index,
            2
        );
    }

    #[tokio::test]
    async fn test_check_day_progression_without_split_is_a_no_op() {
        let service = Service::new(FakeRepository::default());
        let evaluation = service
            .check_day_progression(Local::now().date_naive())
            .await
            .unwrap();
        assert!(!evaluation.changed);
    }

    #[tokio::test]
    async fn test_streak_from_local() {
        let service = service_with_split();
        let session = service.start_workout(1.into(), 0).await.unwrap();
        service.complete_workout(session.id).await.unwrap();

        let streak = service
            .streak_from_local(Local::now().date_naive())
            .await
            .unwrap();

        assert_eq!(streak, 1);
    }
}
