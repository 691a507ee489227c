//! Delete confirmation flow, shared by customers and routers.

use std::sync::Arc;

use reqwest::StatusCode;

use crate::api::RemoteResources;
use crate::errors::describe_failure;
use crate::models::ResourceKind;
use crate::notify::EventBus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// 204: lists asked to re-fetch.
    Deleted,
    /// 400/409 with the server message.
    Rejected { status: StatusCode, message: String },
    Failed(String),
}

pub struct DeleteController {
    api: Arc<dyn RemoteResources>,
    events: EventBus,
}

impl DeleteController {
    pub fn new(api: Arc<dyn RemoteResources>, events: EventBus) -> Self {
        Self { api, events }
    }

    /// Delete `id` of `kind` after the operator confirmed.
    pub async fn confirm(&self, kind: ResourceKind, id: i64) -> DeleteOutcome {
        let reply = match kind {
            ResourceKind::Customer => self.api.delete_customer(id).await,
            ResourceKind::Router => self.api.delete_router(id).await,
        };
        let retry = format!("Could not delete {}. Please try again.", kind);

        match reply {
            Some(reply) if reply.is_ok() => {
                self.events
                    .info(format!("{} deleted successfully.", kind.title()));
                self.events.refetch(kind);
                DeleteOutcome::Deleted
            }
            Some(reply) if matches!(reply.status, StatusCode::BAD_REQUEST | StatusCode::CONFLICT) => {
                DeleteOutcome::Rejected {
                    status: reply.status,
                    message: reply.message().map(str::to_string).unwrap_or(retry),
                }
            }
            Some(reply) => {
                tracing::warn!(
                    "Unexpected status {} deleting {} {}: {}",
                    reply.status,
                    kind,
                    id,
                    describe_failure(reply.status, reply.error_body())
                );
                DeleteOutcome::Failed(retry)
            }
            None => DeleteOutcome::Failed(retry),
        }
    }
}
