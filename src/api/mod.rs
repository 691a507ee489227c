//! Remote resource client.
//!
//! One capability set (list, create, update, delete) per resource kind plus the postal-code
//! lookup. Every call is a fresh round-trip: no retries, no timeout policy, no caching.

#[cfg(test)]
pub mod fake;
mod http;

pub use http::*;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::errors::ErrorBody;
use crate::models::{
    CreateRouterPayload, Customer, CustomerPayload, PostalAddress, Router, UpdateRouterPayload,
};

/// Body of a reply that carried an HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody<T> {
    /// 2xx with a decoded body.
    Data(T),
    /// 2xx without a body (204, or an empty 200).
    Empty,
    /// Non-2xx; the server error body, returned as-is.
    Failure(ErrorBody),
}

/// Status + body pair; callers branch on `status`.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T> {
    pub status: StatusCode,
    pub body: ReplyBody<T>,
}

/// `None` means no response: the failure was already reported to the operator.
pub type ApiResult<T> = Option<Reply<T>>;

impl<T> Reply<T> {
    pub fn data(status: StatusCode, data: T) -> Self {
        Self {
            status,
            body: ReplyBody::Data(data),
        }
    }

    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            body: ReplyBody::Empty,
        }
    }

    pub fn failure(status: StatusCode, body: ErrorBody) -> Self {
        Self {
            status,
            body: ReplyBody::Failure(body),
        }
    }

    /// 200 or 204, the only statuses callers treat as success.
    pub fn is_ok(&self) -> bool {
        matches!(self.status, StatusCode::OK | StatusCode::NO_CONTENT)
    }

    /// Server-supplied message of a failure body.
    pub fn message(&self) -> Option<&str> {
        match &self.body {
            ReplyBody::Failure(body) => body.message.as_deref(),
            _ => None,
        }
    }

    pub fn error_body(&self) -> Option<&ErrorBody> {
        match &self.body {
            ReplyBody::Failure(body) => Some(body),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self.body {
            ReplyBody::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        let body = match self.body {
            ReplyBody::Data(data) => ReplyBody::Data(f(data)),
            ReplyBody::Empty => ReplyBody::Empty,
            ReplyBody::Failure(body) => ReplyBody::Failure(body),
        };
        Reply {
            status: self.status,
            body,
        }
    }
}

/// Access to the customers/routers backend and the postal-code service.
///
/// Views and forms take this as `Arc<dyn RemoteResources>` so tests can swap in a double.
#[async_trait]
pub trait RemoteResources: Send + Sync {
    /// GET /customers
    async fn list_customers(&self) -> ApiResult<Vec<Customer>>;
    /// POST /customers
    async fn create_customer(&self, payload: &CustomerPayload) -> ApiResult<Customer>;
    /// PUT /customers/{id}
    async fn update_customer(&self, id: i64, payload: &CustomerPayload) -> ApiResult<Customer>;
    /// DELETE /customers/{id}
    async fn delete_customer(&self, id: i64) -> ApiResult<()>;

    /// GET /routers
    async fn list_routers(&self) -> ApiResult<Vec<Router>>;
    /// POST /routers
    async fn create_router(&self, payload: &CreateRouterPayload) -> ApiResult<Router>;
    /// PUT /routers/{id}; the backend usually answers 204.
    async fn update_router(&self, id: i64, payload: &UpdateRouterPayload) -> ApiResult<Router>;
    /// DELETE /routers/{id}
    async fn delete_router(&self, id: i64) -> ApiResult<()>;

    /// GET {postal}/{code}/json/. Failures are logged, never shown to the operator.
    async fn lookup_postal_code(&self, code: &str) -> ApiResult<PostalAddress>;
}
