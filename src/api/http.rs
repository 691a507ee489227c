//! reqwest-backed implementation of [`RemoteResources`].

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use super::{ApiResult, RemoteResources, Reply};
use crate::config::Config;
use crate::errors::{AppError, ErrorBody, RETRY_MESSAGE};
use crate::models::{
    CreateRouterPayload, Customer, CustomerPayload, PostalAddress, ResourceKind, Router,
    UpdateRouterPayload,
};
use crate::notify::EventBus;

/// Where a failure without a response ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reporting {
    /// Operator notice on the event bus.
    Notify,
    /// Log only (postal lookups).
    Quiet,
}

/// How a 2xx body that does not decode is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SuccessBody {
    /// The caller needs the data (lists, lookups).
    Required,
    /// Writes: the status decides the outcome, the echoed record is optional.
    Optional,
}

/// HTTP client for the backend and the postal-code service.
#[derive(Debug, Clone)]
pub struct HttpResourceClient {
    http: Client,
    api_url: Url,
    postal_url: Url,
    events: EventBus,
}

impl HttpResourceClient {
    pub fn new(api_url: Url, postal_url: Url, events: EventBus) -> Self {
        Self {
            http: Client::new(),
            api_url,
            postal_url,
            events,
        }
    }

    pub fn from_config(config: &Config, events: EventBus) -> Self {
        Self::new(config.api_url.clone(), config.postal_url.clone(), events)
    }

    /// `{api}/customers` or `{api}/routers`, keeping any base path.
    fn collection_url(&self, kind: ResourceKind) -> Result<Url, AppError> {
        extend(&self.api_url, &[kind.segment()])
    }

    fn record_url(&self, kind: ResourceKind, id: i64) -> Result<Url, AppError> {
        extend(&self.api_url, &[kind.segment(), &id.to_string()])
    }

    /// `{postal}/{code}/json/`, with the code escaped as a single segment.
    fn postal_url(&self, code: &str) -> Result<Url, AppError> {
        extend(&self.postal_url, &[code, "json", ""])
    }

    async fn list<T: DeserializeOwned>(&self, kind: ResourceKind) -> ApiResult<Vec<T>> {
        let what = format!("list {}s", kind);
        let url = self.resolve(self.collection_url(kind), &what, Reporting::Notify)?;
        self.execute(self.http.get(url), &what, Reporting::Notify, SuccessBody::Required)
            .await
    }

    async fn create<P, T>(&self, kind: ResourceKind, payload: &P) -> ApiResult<T>
    where
        P: serde::Serialize + Sync,
        T: DeserializeOwned,
    {
        let what = format!("create {}", kind);
        let url = self.resolve(self.collection_url(kind), &what, Reporting::Notify)?;
        self.execute(
            self.http.post(url).json(payload),
            &what,
            Reporting::Notify,
            SuccessBody::Optional,
        )
        .await
    }

    async fn update<P, T>(&self, kind: ResourceKind, id: i64, payload: &P) -> ApiResult<T>
    where
        P: serde::Serialize + Sync,
        T: DeserializeOwned,
    {
        let what = format!("update {} {}", kind, id);
        let url = self.resolve(self.record_url(kind, id), &what, Reporting::Notify)?;
        self.execute(
            self.http.put(url).json(payload),
            &what,
            Reporting::Notify,
            SuccessBody::Optional,
        )
        .await
    }

    async fn delete(&self, kind: ResourceKind, id: i64) -> ApiResult<()> {
        let what = format!("delete {} {}", kind, id);
        let url = self.resolve(self.record_url(kind, id), &what, Reporting::Notify)?;
        self.execute::<serde_json::Value>(
            self.http.delete(url),
            &what,
            Reporting::Notify,
            SuccessBody::Optional,
        )
        .await
            .map(|reply| reply.map(|_| ()))
    }

    fn resolve(&self, url: Result<Url, AppError>, what: &str, reporting: Reporting) -> Option<Url> {
        url.map_err(|err| self.report(what, &err, reporting)).ok()
    }

    /// Send a request and normalize the outcome.
    ///
    /// Any HTTP response becomes a [`Reply`]. A missing response, or an undecodable
    /// success body the caller requires, is reported and turned into `None`; an
    /// optional one degrades to [`Reply::empty`].
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
        reporting: Reporting,
        success_body: SuccessBody,
    ) -> ApiResult<T> {
        tracing::debug!("Sending request to {}", what);

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                self.report(what, &AppError::from(err), reporting);
                return None;
            }
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                self.report(what, &AppError::from(err), reporting);
                return None;
            }
        };

        if !status.is_success() {
            tracing::debug!("{} answered {}", what, status);
            return Some(Reply::failure(status, ErrorBody::from_bytes(&bytes)));
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Some(Reply::empty(status));
        }

        match serde_json::from_slice::<T>(&bytes) {
            Ok(data) => Some(Reply::data(status, data)),
            Err(err) if success_body == SuccessBody::Optional => {
                tracing::warn!("Ignoring undecodable reply to {}: {}", what, err);
                Some(Reply::empty(status))
            }
            Err(err) => {
                self.report(what, &AppError::from(err), reporting);
                None
            }
        }
    }

    fn report(&self, what: &str, err: &AppError, reporting: Reporting) {
        match reporting {
            // The bus logs the notice
            Reporting::Notify => self
                .events
                .error(format!("Could not {}: {} {}", what, err.message(), RETRY_MESSAGE)),
            Reporting::Quiet => tracing::warn!("Could not {}: {}", what, err),
        }
    }
}

/// Append path segments to `base`, dropping a trailing empty segment first.
fn extend(base: &Url, segments: &[&str]) -> Result<Url, AppError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| AppError::Config(format!("{} cannot be used as a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[async_trait]
impl RemoteResources for HttpResourceClient {
    async fn list_customers(&self) -> ApiResult<Vec<Customer>> {
        self.list(ResourceKind::Customer).await
    }

    async fn create_customer(&self, payload: &CustomerPayload) -> ApiResult<Customer> {
        self.create(ResourceKind::Customer, payload).await
    }

    async fn update_customer(&self, id: i64, payload: &CustomerPayload) -> ApiResult<Customer> {
        self.update(ResourceKind::Customer, id, payload).await
    }

    async fn delete_customer(&self, id: i64) -> ApiResult<()> {
        self.delete(ResourceKind::Customer, id).await
    }

    async fn list_routers(&self) -> ApiResult<Vec<Router>> {
        self.list(ResourceKind::Router).await
    }

    async fn create_router(&self, payload: &CreateRouterPayload) -> ApiResult<Router> {
        self.create(ResourceKind::Router, payload).await
    }

    async fn update_router(&self, id: i64, payload: &UpdateRouterPayload) -> ApiResult<Router> {
        self.update(ResourceKind::Router, id, payload).await
    }

    async fn delete_router(&self, id: i64) -> ApiResult<()> {
        self.delete(ResourceKind::Router, id).await
    }

    async fn lookup_postal_code(&self, code: &str) -> ApiResult<PostalAddress> {
        let what = format!("look up postal code {}", code);
        let url = self.resolve(self.postal_url(code), &what, Reporting::Quiet)?;
        self.execute(self.http.get(url), &what, Reporting::Quiet, SuccessBody::Required)
            .await
    }
}
