use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use derive_more::Deref;
use futures_util::future::LocalBoxFuture;
use log::warn;
use uuid::Uuid;

use crate::{CreateError, ReadError, SyncError, UpdateError, UserID};

/// Attempts per action before it is dropped as poison.
pub const MAX_ATTEMPTS: u32 = 3;

#[allow(async_fn_in_trait)]
pub trait ActionQueueRepository {
    async fn enqueue_action(&self, action: &QueuedAction) -> Result<(), CreateError>;
    async fn read_actions(&self) -> Result<Vec<QueuedAction>, ReadError>;
    async fn replace_actions(&self, actions: &[QueuedAction]) -> Result<(), UpdateError>;
}

/// A user action captured while offline, replayed through its kind's handler
/// once connectivity returns. The payload is an opaque JSON document owned by
/// the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedAction {
    pub id: ActionID,
    pub kind: String,
    pub payload: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<UserID>,
    pub retry_count: u32,
}

impl QueuedAction {
    #[must_use]
    pub fn new(kind: &str, payload: String, user_id: Option<UserID>) -> Self {
        Self {
            id: Uuid::new_v4().into(),
            kind: kind.to_string(),
            payload,
            timestamp: Utc::now(),
            user_id,
            retry_count: 0,
        }
    }
}

#[derive(Deref, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ActionID(Uuid);

impl From<Uuid> for ActionID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for ActionID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ActionError {
    #[error("handler failed: {0}")]
    Failed(String),
    #[error("no handler registered for action kind {0}")]
    UnknownKind(String),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub handled: usize,
    pub retried: usize,
    pub dropped: usize,
}

type Handler = Box<dyn Fn(QueuedAction) -> LocalBoxFuture<'static, Result<(), ActionError>>>;

/// Replays queued actions in FIFO order through per-kind handlers. The queue
/// is persisted after every action so a crash mid-replay neither re-runs
/// succeeded actions nor loses retry counts.
#[derive(Default)]
pub struct ActionDispatcher {
    handlers: BTreeMap<String, Handler>,
}

impl ActionDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, kind: &str, handler: F)
    where
        F: Fn(QueuedAction) -> LocalBoxFuture<'static, Result<(), ActionError>> + 'static,
    {
        self.handlers.insert(kind.to_string(), Box::new(handler));
    }

    pub async fn replay<R: ActionQueueRepository>(
        &self,
        repository: &R,
    ) -> Result<ReplayOutcome, SyncError> {
        let mut outcome = ReplayOutcome::default();
        let mut pending: VecDeque<QueuedAction> = repository.read_actions().await?.into();
        let mut retained: Vec<QueuedAction> = Vec::new();

        while let Some(mut action) = pending.pop_front() {
            let result = match self.handlers.get(&action.kind) {
                Some(handler) => handler(action.clone()).await,
                None => Err(ActionError::UnknownKind(action.kind.clone())),
            };

            match result {
                Ok(()) => outcome.handled += 1,
                Err(err) => {
                    action.retry_count += 1;
                    if action.retry_count >= MAX_ATTEMPTS {
                        warn!("dropping action {} ({}): {err}", *action.id, action.kind);
                        outcome.dropped += 1;
                    } else {
                        outcome.retried += 1;
                        retained.push(action);
                    }
                }
            }

            let state = retained
                .iter()
                .chain(pending.iter())
                .cloned()
                .collect::<Vec<QueuedAction>>();
            repository.replace_actions(&state).await?;
        }

        Ok(outcome)
    }
}
