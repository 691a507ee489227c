//! List and detail views.
//!
//! A list view owns the collection it fetched. Forms never touch it; they emit a
//! re-fetch signal and the view reloads from the server.

mod detail;

pub use detail::*;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::api::{ApiResult, RemoteResources};
use crate::errors::AppError;
use crate::models::{Customer, ResourceKind, Router};
use crate::notify::AdminEvent;

/// A record kind that can be listed and searched.
#[async_trait]
pub trait Listed: Clone + Send + Sync + 'static {
    const KIND: ResourceKind;

    async fn fetch(api: &dyn RemoteResources) -> ApiResult<Vec<Self>>;

    fn id(&self) -> i64;

    /// Case-insensitive search on the listed name column.
    fn matches(&self, needle: &str) -> bool;
}

#[async_trait]
impl Listed for Customer {
    const KIND: ResourceKind = ResourceKind::Customer;

    async fn fetch(api: &dyn RemoteResources) -> ApiResult<Vec<Self>> {
        api.list_customers().await
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn matches(&self, needle: &str) -> bool {
        self.full_name.to_lowercase().contains(needle)
    }
}

#[async_trait]
impl Listed for Router {
    const KIND: ResourceKind = ResourceKind::Router;

    async fn fetch(api: &dyn RemoteResources) -> ApiResult<Vec<Self>> {
        api.list_routers().await
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn matches(&self, needle: &str) -> bool {
        self.brand.to_lowercase().contains(needle)
    }
}

/// Collection of one kind, as last fetched.
pub struct ListView<R: Listed> {
    api: Arc<dyn RemoteResources>,
    items: Vec<R>,
}

impl<R: Listed> ListView<R> {
    pub fn new(api: Arc<dyn RemoteResources>) -> Self {
        Self {
            api,
            items: Vec::new(),
        }
    }

    /// Re-fetch from the server. On failure the previous items are kept.
    pub async fn refresh(&mut self) -> Result<(), AppError> {
        match R::fetch(self.api.as_ref()).await {
            Some(reply) if reply.status == StatusCode::OK => {
                self.items = reply.into_data().unwrap_or_default();
                tracing::debug!("Fetched {} {}s", self.items.len(), R::KIND);
                Ok(())
            }
            Some(reply) => {
                tracing::error!("Failed to fetch {}s: status {}", R::KIND, reply.status);
                Err(AppError::Internal(format!(
                    "Failed to fetch {}s (status {})",
                    R::KIND,
                    reply.status.as_u16()
                )))
            }
            None => Err(AppError::Transport(format!("Failed to fetch {}s", R::KIND))),
        }
    }

    /// React to a bus event; returns whether the list was reloaded.
    pub async fn handle(&mut self, event: &AdminEvent) -> bool {
        match event {
            AdminEvent::Refetch(kind) if *kind == R::KIND => self.refresh().await.is_ok(),
            _ => false,
        }
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    /// Items matching the search box; an empty search matches everything.
    pub fn filtered(&self, search: &str) -> Vec<&R> {
        let needle = search.trim().to_lowercase();
        self.items.iter().filter(|r| r.matches(&needle)).collect()
    }

    pub fn find(&self, id: i64) -> Result<&R, AppError> {
        self.items
            .iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", R::KIND.title(), id)))
    }
}
