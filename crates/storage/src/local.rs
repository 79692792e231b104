use chrono::{DateTime, Duration, NaiveDate, Utc};
use ferrum_domain as domain;
use ferrum_domain::catalog;
use ferrum_domain::{ExerciseRepository as _, WorkoutRepository as _};
use log::warn;
use serde::{Serialize, de::DeserializeOwned};
use strum::AsRefStr;
use uuid::Uuid;

use crate::{KeyValueStore, model};

/// Entries of the completed history are dropped this many days after
/// completion.
pub const RETENTION_DAYS: i64 = 90;

/// Prefix of the per-session mapping from local workout id to backend row id.
pub const WORKOUT_ID_PREFIX: &str = "ferrum.workout_id.";

#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    #[strum(serialize = "ferrum.split")]
    Split,
    #[strum(serialize = "ferrum.active_workout")]
    ActiveWorkout,
    #[strum(serialize = "ferrum.pending_workouts")]
    PendingWorkouts,
    #[strum(serialize = "ferrum.workout_history")]
    WorkoutHistory,
    #[strum(serialize = "ferrum.exercises")]
    Exercises,
    #[strum(serialize = "ferrum.custom_exercises")]
    CustomExercises,
    #[strum(serialize = "ferrum.current_week")]
    CurrentWeek,
    #[strum(serialize = "ferrum.current_day_index")]
    CurrentDayIndex,
    #[strum(serialize = "ferrum.last_completion_date")]
    LastCompletionDate,
    #[strum(serialize = "ferrum.last_check_date")]
    LastCheckDate,
    #[strum(serialize = "ferrum.completed_session_id")]
    CompletedSessionId,
    #[strum(serialize = "ferrum.action_queue")]
    ActionQueue,
}

/// Typed façade over the durable key-value store. "Not found" is never an
/// error; failures surface only for serialization problems or faults in the
/// underlying store.
pub struct LocalStore<S> {
    store: S,
}

impl<S: KeyValueStore> LocalStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, domain::StorageError> {
        match self.store.get(key).await? {
            Some(text) => Ok(Some(serde_json::from_str(&text).map_err(|err| {
                domain::StorageError::Serialization(format!("{key}: {err}"))
            })?)),
            None => Ok(None),
        }
    }

    async fn write_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), domain::StorageError> {
        let text = serde_json::to_string(value)
            .map_err(|err| domain::StorageError::Serialization(format!("{key}: {err}")))?;
        Ok(self.store.set(key, text).await?)
    }

    async fn read_pending_records(
        &self,
    ) -> Result<Vec<model::WorkoutSession>, domain::StorageError> {
        Ok(self
            .read_json(Key::PendingWorkouts.as_ref())
            .await?
            .unwrap_or_default())
    }

    /// Dedup by id, then sweep entries past the retention window. Runs on
    /// every history write.
    async fn append_history(
        &self,
        session: &domain::WorkoutSession,
    ) -> Result<(), domain::StorageError> {
        let mut history: Vec<model::WorkoutSession> = self
            .read_json(Key::WorkoutHistory.as_ref())
            .await?
            .unwrap_or_default();
        if history.iter().any(|s| s.id == *session.id) {
            warn!(
                "workout session {} already recorded in history",
                *session.id
            );
        } else {
            history.push(model::WorkoutSession::from(session));
        }
        let cutoff = Utc::now() - Duration::days(RETENTION_DAYS);
        history.retain(|s| s.completed_at.map_or(true, |completed_at| completed_at >= cutoff));
        self.write_json(Key::WorkoutHistory.as_ref(), &history).await
    }
}

impl<S: KeyValueStore> domain::SplitRepository for LocalStore<S> {
    async fn read_split(&self) -> Result<Option<domain::Split>, domain::ReadError> {
        let Some(record) = self.read_json::<model::Split>(Key::Split.as_ref()).await? else {
            return Ok(None);
        };
        let split = domain::Split::try_from(record)
            .map_err(|err| domain::StorageError::Serialization(err.to_string()))?;
        let (split, repaired) = domain::validate_and_repair(split);
        if repaired {
            warn!("stored split was malformed, persisting repaired form");
            self.write_json(Key::Split.as_ref(), &model::Split::from(&split))
                .await?;
        }
        Ok(Some(split))
    }

    async fn write_split(&self, split: &domain::Split) -> Result<(), domain::UpdateError> {
        Ok(self
            .write_json(Key::Split.as_ref(), &model::Split::from(split))
            .await?)
    }
}

impl<S: KeyValueStore> domain::WorkoutRepository for LocalStore<S> {
    async fn read_active_workout(
        &self,
    ) -> Result<Option<domain::WorkoutSession>, domain::ReadError> {
        Ok(self
            .read_json::<model::WorkoutSession>(Key::ActiveWorkout.as_ref())
            .await?
            .map(Into::into))
    }

    async fn write_active_workout(
        &self,
        session: &domain::WorkoutSession,
    ) -> Result<(), domain::UpdateError> {
        Ok(self
            .write_json(
                Key::ActiveWorkout.as_ref(),
                &model::WorkoutSession::from(session),
            )
            .await?)
    }

    async fn clear_active_workout(&self) -> Result<(), domain::DeleteError> {
        Ok(self
            .store
            .remove(Key::ActiveWorkout.as_ref())
            .await
            .map_err(domain::StorageError::from)?)
    }

    async fn complete_workout(
        &self,
        id: domain::WorkoutID,
        completed_at: DateTime<Utc>,
    ) -> Result<domain::WorkoutSession, domain::UpdateError> {
        let Some(mut session) = self.read_active_workout().await? else {
            return Err(domain::UpdateError::NotFound);
        };
        if session.id != id {
            warn!("active workout session is not {}", *id);
            return Err(domain::UpdateError::NotFound);
        }

        session.completed_at = Some(completed_at);
        session.pending_sync = true;

        let mut pending = self.read_pending_records().await?;
        pending.push(model::WorkoutSession::from(&session));
        self.write_json(Key::PendingWorkouts.as_ref(), &pending)
            .await?;
        self.append_history(&session).await?;
        self.store
            .remove(Key::ActiveWorkout.as_ref())
            .await
            .map_err(domain::StorageError::from)?;

        Ok(session)
    }

    async fn record_completed_workout(
        &self,
        session: &domain::WorkoutSession,
    ) -> Result<(), domain::CreateError> {
        let mut pending = self.read_pending_records().await?;
        pending.push(model::WorkoutSession::from(session));
        self.write_json(Key::PendingWorkouts.as_ref(), &pending)
            .await?;
        Ok(self.append_history(session).await?)
    }

    async fn read_pending_workouts(
        &self,
    ) -> Result<Vec<domain::WorkoutSession>, domain::ReadError> {
        Ok(self
            .read_pending_records()
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn mark_workout_synced(&self, id: domain::WorkoutID) -> Result<(), domain::UpdateError> {
        let mut pending = self.read_pending_records().await?;
        pending.retain(|s| s.id != *id);
        Ok(self
            .write_json(Key::PendingWorkouts.as_ref(), &pending)
            .await?)
    }

    async fn read_workout_history(
        &self,
    ) -> Result<Vec<domain::WorkoutSession>, domain::ReadError> {
        Ok(self
            .read_json::<Vec<model::WorkoutSession>>(Key::WorkoutHistory.as_ref())
            .await?
            .unwrap_or_default()
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn remove_workout_from_history(
        &self,
        id: domain::WorkoutID,
    ) -> Result<(), domain::DeleteError> {
        let mut history: Vec<model::WorkoutSession> = self
            .read_json(Key::WorkoutHistory.as_ref())
            .await?
            .unwrap_or_default();
        history.retain(|s| s.id != *id);
        Ok(self
            .write_json(Key::WorkoutHistory.as_ref(), &history)
            .await?)
    }

    async fn read_backend_id(
        &self,
        id: domain::WorkoutID,
    ) -> Result<Option<domain::BackendID>, domain::ReadError> {
        Ok(self
            .read_json::<u64>(&format!("{WORKOUT_ID_PREFIX}{}", *id))
            .await?
            .map(domain::BackendID::from))
    }

    async fn write_backend_id(
        &self,
        id: domain::WorkoutID,
        backend_id: domain::BackendID,
    ) -> Result<(), domain::UpdateError> {
        Ok(self
            .write_json(&format!("{WORKOUT_ID_PREFIX}{}", *id), &*backend_id)
            .await?)
    }
}

impl<S: KeyValueStore> domain::ExerciseRepository for LocalStore<S> {
    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        if let Some(records) = self
            .read_json::<Vec<model::Exercise>>(Key::Exercises.as_ref())
            .await?
        {
            return Ok(records
                .into_iter()
                .filter_map(|record| match domain::Exercise::try_from(record) {
                    Ok(exercise) => Some(exercise),
                    Err(err) => {
                        warn!("dropping unreadable exercise record: {err}");
                        None
                    }
                })
                .collect());
        }

        let exercises = catalog::exercises();
        let records = exercises
            .iter()
            .map(model::Exercise::from)
            .collect::<Vec<model::Exercise>>();
        self.write_json(Key::Exercises.as_ref(), &records).await?;
        Ok(exercises)
    }

    async fn read_custom_exercises(
        &self,
    ) -> Result<Vec<domain::CustomExercise>, domain::ReadError> {
        Ok(self
            .read_json::<Vec<model::CustomExercise>>(Key::CustomExercises.as_ref())
            .await?
            .unwrap_or_default()
            .into_iter()
            .filter_map(|record| match domain::CustomExercise::try_from(record) {
                Ok(exercise) => Some(exercise),
                Err(err) => {
                    warn!("dropping unreadable custom exercise record: {err}");
                    None
                }
            })
            .collect())
    }

    async fn create_custom_exercise(
        &self,
        exercise: domain::CustomExercise,
    ) -> Result<domain::CustomExercise, domain::CreateError> {
        let mut records: Vec<model::CustomExercise> = self
            .read_json(Key::CustomExercises.as_ref())
            .await?
            .unwrap_or_default();
        if records.iter().any(|e| e.id == exercise.id) {
            return Err(domain::CreateError::Conflict);
        }
        records.push(model::CustomExercise::from(&exercise));
        self.write_json(Key::CustomExercises.as_ref(), &records)
            .await?;
        Ok(exercise)
    }

    async fn replace_custom_exercise(
        &self,
        exercise: domain::CustomExercise,
    ) -> Result<domain::CustomExercise, domain::UpdateError> {
        let mut records: Vec<model::CustomExercise> = self
            .read_json(Key::CustomExercises.as_ref())
            .await?
            .unwrap_or_default();
        let Some(record) = records.iter_mut().find(|e| e.id == exercise.id) else {
            return Err(domain::UpdateError::NotFound);
        };
        *record = model::CustomExercise::from(&exercise);
        self.write_json(Key::CustomExercises.as_ref(), &records)
            .await?;
        Ok(exercise)
    }

    async fn delete_custom_exercise(
        &self,
        id: domain::ExerciseID,
    ) -> Result<domain::ExerciseID, domain::DeleteError> {
        let mut records: Vec<model::CustomExercise> = self
            .read_json(Key::CustomExercises.as_ref())
            .await?
            .unwrap_or_default();
        records.retain(|e| e.id != id);
        self.write_json(Key::CustomExercises.as_ref(), &records)
            .await?;
        Ok(id)
    }

    async fn replace_custom_exercises(
        &self,
        server: Vec<domain::CustomExercise>,
    ) -> Result<Vec<domain::CustomExercise>, domain::UpdateError> {
        let local = self.read_custom_exercises().await?;
        let merged = domain::merge_custom_exercises(server, local);
        let records = merged
            .iter()
            .map(model::CustomExercise::from)
            .collect::<Vec<model::CustomExercise>>();
        self.write_json(Key::CustomExercises.as_ref(), &records)
            .await?;
        Ok(merged)
    }
}

impl<S: KeyValueStore> domain::ProgressionRepository for LocalStore<S> {
    async fn read_progression(&self) -> Result<domain::Progression, domain::ReadError> {
        let defaults = domain::Progression::default();
        Ok(domain::Progression {
            current_week: self
                .read_json::<u32>(Key::CurrentWeek.as_ref())
                .await?
                .unwrap_or(defaults.current_week),
            current_day_index: self
                .read_json::<u32>(Key::CurrentDayIndex.as_ref())
                .await?
                .unwrap_or(defaults.current_day_index),
            last_completion_date: self
                .read_json::<NaiveDate>(Key::LastCompletionDate.as_ref())
                .await?,
            last_check_date: self
                .read_json::<NaiveDate>(Key::LastCheckDate.as_ref())
                .await?,
            completed_session_id: self
                .read_json::<Uuid>(Key::CompletedSessionId.as_ref())
                .await?
                .map(Into::into),
        })
    }

    async fn write_progression(
        &self,
        progression: &domain::Progression,
    ) -> Result<(), domain::UpdateError> {
        self.write_json(Key::CurrentWeek.as_ref(), &progression.current_week)
            .await?;
        self.write_json(
            Key::CurrentDayIndex.as_ref(),
            &progression.current_day_index,
        )
        .await?;
        self.write_optional(Key::LastCompletionDate, progression.last_completion_date.as_ref())
            .await?;
        self.write_optional(Key::LastCheckDate, progression.last_check_date.as_ref())
            .await?;
        self.write_optional(
            Key::CompletedSessionId,
            progression.completed_session_id.map(|id| *id).as_ref(),
        )
        .await?;
        Ok(())
    }
}

impl<S: KeyValueStore> LocalStore<S> {
    async fn write_optional<T: Serialize>(
        &self,
        key: Key,
        value: Option<&T>,
    ) -> Result<(), domain::StorageError> {
        match value {
            Some(value) => self.write_json(key.as_ref(), value).await,
            None => Ok(self
                .store
                .remove(key.as_ref())
                .await
                .map_err(domain::StorageError::from)?),
        }
    }
}

impl<S: KeyValueStore> domain::ActionQueueRepository for LocalStore<S> {
    async fn enqueue_action(
        &self,
        action: &domain::QueuedAction,
    ) -> Result<(), domain::CreateError> {
        let mut records: Vec<model::QueuedAction> = self
            .read_json(Key::ActionQueue.as_ref())
            .await?
            .unwrap_or_default();
        records.push(model::QueuedAction::from(action));
        Ok(self
            .write_json(Key::ActionQueue.as_ref(), &records)
            .await?)
    }

    async fn read_actions(&self) -> Result<Vec<domain::QueuedAction>, domain::ReadError> {
        Ok(self
            .read_json::<Vec<model::QueuedAction>>(Key::ActionQueue.as_ref())
            .await?
            .unwrap_or_default()
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn replace_actions(
        &self,
        actions: &[domain::QueuedAction],
    ) -> Result<(), domain::UpdateError> {
        let records = actions
            .iter()
            .map(model::QueuedAction::from)
            .collect::<Vec<model::QueuedAction>>();
        Ok(self
            .write_json(Key::ActionQueue.as_ref(), &records)
            .await?)
    }
}
