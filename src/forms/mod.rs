//! Entity form controllers.
//!
//! A form owns a transient draft of one entity. Phases:
//!
//! ```text
//! Empty --edit--> Editing --submit--> Submitting --200/204--> Closed
//!                    ^                     |
//!                    +------400/409/other--+
//! ```
//!
//! The draft only changes through edits and postal-code lookups; submitting never
//! alters it, so a rejected submission leaves the operator's input intact.

mod customer;
mod delete;
mod router;

pub use customer::*;
pub use delete::*;
pub use router::*;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::Mutex;

use crate::api::{ApiResult, RemoteResources};
use crate::config::LookupPolicy;
use crate::errors::{describe_failure, AppError};
use crate::models::ResourceKind;
use crate::notify::EventBus;

/// Where a form is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    /// Create flow, nothing typed yet.
    Empty,
    Editing,
    /// Request in flight; edits are refused.
    Submitting,
    /// Saved (or dismissed); the draft has been discarded.
    Closed,
}

/// The editable working copy of one entity kind.
#[async_trait]
pub trait Draft: Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    type Record: Clone + PartialEq + Send + Sync;
    type Field: Copy + fmt::Debug + Send;

    const KIND: ResourceKind;

    fn from_record(record: &Self::Record) -> Self;

    fn record_id(record: &Self::Record) -> i64;

    /// A copy of this draft with one field replaced; every other field is kept.
    fn with_field(&self, field: Self::Field, raw: &str) -> Result<Self, AppError>;

    /// Presence/format checks; the message is shown inline.
    fn validate(&self, target: Option<i64>) -> Result<(), String>;

    /// Canonicalize and send: create when `target` is `None`, update otherwise.
    async fn persist(&self, api: &dyn RemoteResources, target: Option<i64>) -> ApiResult<()>;
}

/// Result of [`FormController::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 200/204: form closed, lists asked to re-fetch.
    Saved,
    /// Client-side validation failed; nothing was sent.
    Invalid(String),
    /// 400/409 with the server message.
    Rejected { status: StatusCode, message: String },
    /// Any other status, or no response at all.
    Failed(String),
}

impl SubmitOutcome {
    /// Message to show inline, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            SubmitOutcome::Saved => None,
            SubmitOutcome::Invalid(message)
            | SubmitOutcome::Rejected { message, .. }
            | SubmitOutcome::Failed(message) => Some(message),
        }
    }
}

/// What a view renders for an open form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSnapshot<D> {
    pub phase: FormPhase,
    pub draft: D,
    /// Record being updated; `None` for the create flow.
    pub target: Option<i64>,
    /// Inline error from the last failed submission.
    pub error: Option<String>,
}

struct FormState<D: Draft> {
    phase: FormPhase,
    draft: D,
    target: Option<i64>,
    /// Record the draft was seeded from, for rebinding.
    source: Option<D::Record>,
    error: Option<String>,
    /// Bumped on every postal-code edit.
    lookup_seq: u64,
}

impl<D: Draft> FormState<D> {
    fn closed() -> Self {
        Self {
            phase: FormPhase::Closed,
            draft: D::default(),
            target: None,
            source: None,
            error: None,
            lookup_seq: 0,
        }
    }

    fn ensure_editable(&self) -> Result<(), AppError> {
        match self.phase {
            FormPhase::Submitting => Err(AppError::InvalidState(format!(
                "The {} form is being submitted",
                D::KIND
            ))),
            FormPhase::Closed => Err(AppError::InvalidState(format!(
                "The {} form is closed",
                D::KIND
            ))),
            FormPhase::Empty | FormPhase::Editing => Ok(()),
        }
    }

    fn discard(&mut self) {
        self.phase = FormPhase::Closed;
        self.draft = D::default();
        self.target = None;
        self.source = None;
        self.error = None;
        self.lookup_seq += 1;
    }
}

/// Create/update form for one entity kind.
///
/// Clones share the same form. The client is injected so tests can substitute a double.
pub struct FormController<D: Draft> {
    api: Arc<dyn RemoteResources>,
    events: EventBus,
    state: Arc<Mutex<FormState<D>>>,
    lookup_policy: LookupPolicy,
}

impl<D: Draft> Clone for FormController<D> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            events: self.events.clone(),
            state: Arc::clone(&self.state),
            lookup_policy: self.lookup_policy,
        }
    }
}

impl<D: Draft> FormController<D> {
    /// A closed form; call [`seed`](Self::seed) to open it.
    pub fn new(api: Arc<dyn RemoteResources>, events: EventBus) -> Self {
        Self {
            api,
            events,
            state: Arc::new(Mutex::new(FormState::closed())),
            lookup_policy: LookupPolicy::default(),
        }
    }

    pub fn with_lookup_policy(mut self, policy: LookupPolicy) -> Self {
        self.lookup_policy = policy;
        self
    }

    /// Open the form: from `record` for an update, from the empty template for a create.
    pub async fn seed(&self, record: Option<&D::Record>) {
        let mut state = self.state.lock().await;
        match record {
            Some(record) => {
                state.phase = FormPhase::Editing;
                state.draft = D::from_record(record);
                state.target = Some(D::record_id(record));
                state.source = Some(record.clone());
            }
            None => {
                state.phase = FormPhase::Empty;
                state.draft = D::default();
                state.target = None;
                state.source = None;
            }
        }
        state.error = None;
        // Lookups started for the previous draft are stale now
        state.lookup_seq += 1;
        tracing::debug!("Seeded {} form (target: {:?})", D::KIND, state.target);
    }

    /// Re-seed when the bound record changed. Returns whether the draft was replaced.
    pub async fn rebind(&self, record: &D::Record) -> bool {
        let unchanged = {
            let state = self.state.lock().await;
            state.phase != FormPhase::Closed && state.source.as_ref() == Some(record)
        };
        if unchanged {
            return false;
        }
        self.seed(Some(record)).await;
        true
    }

    /// Merge one edited field into the draft.
    pub async fn apply_field_edit(&self, field: D::Field, raw: &str) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        state.ensure_editable()?;
        state.draft = state.draft.with_field(field, raw)?;
        state.phase = FormPhase::Editing;
        Ok(())
    }

    /// Validate, canonicalize and persist the draft.
    ///
    /// Returns `Err` only when the form is not open for submission.
    pub async fn submit(&self) -> Result<SubmitOutcome, AppError> {
        let (draft, target) = {
            let mut state = self.state.lock().await;
            state.ensure_editable()?;
            if let Err(message) = state.draft.validate(state.target) {
                state.phase = FormPhase::Editing;
                state.error = Some(message.clone());
                return Ok(SubmitOutcome::Invalid(message));
            }
            state.phase = FormPhase::Submitting;
            state.error = None;
            (state.draft.clone(), state.target)
        };

        let reply = draft.persist(self.api.as_ref(), target).await;

        // The form may have been dismissed meanwhile; the response still applies.
        let mut state = self.state.lock().await;
        let outcome = match reply {
            Some(reply) if reply.is_ok() => {
                state.discard();
                self.events.info(saved_message(D::KIND, target));
                self.events.refetch(D::KIND);
                return Ok(SubmitOutcome::Saved);
            }
            Some(reply) if matches!(reply.status, StatusCode::BAD_REQUEST | StatusCode::CONFLICT) => {
                let message = reply
                    .message()
                    .map(str::to_string)
                    .unwrap_or_else(|| retry_message(D::KIND, target));
                SubmitOutcome::Rejected {
                    status: reply.status,
                    message,
                }
            }
            Some(reply) => {
                tracing::warn!(
                    "Unexpected status {} saving {}: {}",
                    reply.status,
                    D::KIND,
                    describe_failure(reply.status, reply.error_body())
                );
                SubmitOutcome::Failed(retry_message(D::KIND, target))
            }
            None => SubmitOutcome::Failed(retry_message(D::KIND, target)),
        };

        state.phase = FormPhase::Editing;
        state.error = outcome.message().map(str::to_string);
        Ok(outcome)
    }

    /// Dismiss the form without saving.
    pub async fn close(&self) {
        self.state.lock().await.discard();
    }

    pub async fn snapshot(&self) -> FormSnapshot<D> {
        let state = self.state.lock().await;
        FormSnapshot {
            phase: state.phase,
            draft: state.draft.clone(),
            target: state.target,
            error: state.error.clone(),
        }
    }
}

fn saved_message(kind: ResourceKind, target: Option<i64>) -> String {
    let verb = if target.is_some() { "updated" } else { "created" };
    format!("{} {} successfully.", kind.title(), verb)
}

fn retry_message(kind: ResourceKind, target: Option<i64>) -> String {
    let verb = if target.is_some() { "update" } else { "create" };
    format!("Could not {} {}. Please try again.", verb, kind)
}
