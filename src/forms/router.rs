//! Router draft and the customer multi-select.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use super::{Draft, FormController, FormPhase};
use crate::api::{ApiResult, RemoteResources};
use crate::errors::AppError;
use crate::models::{CreateRouterPayload, Customer, ResourceKind, Router, UpdateRouterPayload};

/// Editable scalar router fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterField {
    AddressIp,
    AddressIpv6,
    Brand,
    Model,
    Inactive,
}

impl FromStr for RouterField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "addressIp" => Ok(RouterField::AddressIp),
            "addressIpv6" => Ok(RouterField::AddressIpv6),
            "brand" => Ok(RouterField::Brand),
            "model" => Ok(RouterField::Model),
            "inactive" => Ok(RouterField::Inactive),
            other => Err(AppError::Validation(format!(
                "Unknown router field '{}'",
                other
            ))),
        }
    }
}

/// One entry of the customer multi-select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: i64,
    pub label: String,
}

impl From<&Customer> for SelectOption {
    fn from(customer: &Customer) -> Self {
        Self {
            value: customer.id,
            label: customer.full_name.clone(),
        }
    }
}

/// Working copy of a router. `selected` is display-only and reduced to ids on submit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouterDraft {
    pub address_ip: String,
    pub address_ipv6: String,
    pub brand: String,
    pub model: String,
    pub inactive: bool,
    pub selected: Vec<SelectOption>,
}

impl RouterDraft {
    pub fn with_selection(&self, selection: Vec<SelectOption>) -> Self {
        let mut selected: Vec<SelectOption> = Vec::with_capacity(selection.len());
        for option in selection {
            if !selected.iter().any(|s| s.value == option.value) {
                selected.push(option);
            }
        }
        Self {
            selected,
            ..self.clone()
        }
    }

    fn customer_ids(&self) -> Vec<String> {
        self.selected.iter().map(|o| o.value.to_string()).collect()
    }

    pub fn to_create_payload(&self) -> CreateRouterPayload {
        CreateRouterPayload {
            address_ip: self.address_ip.trim().to_string(),
            address_ipv6: self.address_ipv6.trim().to_string(),
            brand: self.brand.clone(),
            model: self.model.clone(),
            customer_ids: self.customer_ids(),
        }
    }

    /// Full replacement: `customer_ids` is the whole current selection.
    pub fn to_update_payload(&self) -> UpdateRouterPayload {
        UpdateRouterPayload {
            address_ip: self.address_ip.trim().to_string(),
            address_ipv6: self.address_ipv6.trim().to_string(),
            brand: self.brand.clone(),
            model: self.model.clone(),
            inactive: self.inactive,
            customer_ids: self.customer_ids(),
        }
    }
}

#[async_trait]
impl Draft for RouterDraft {
    type Record = Router;
    type Field = RouterField;

    const KIND: ResourceKind = ResourceKind::Router;

    fn from_record(router: &Router) -> Self {
        Self {
            address_ip: router.address_ip.clone(),
            address_ipv6: router.address_ipv6.clone(),
            brand: router.brand.clone(),
            model: router.model.clone(),
            inactive: router.inactive,
            selected: router
                .customers
                .iter()
                .map(|c| SelectOption {
                    value: c.id,
                    label: c.full_name.clone(),
                })
                .collect(),
        }
    }

    fn record_id(router: &Router) -> i64 {
        router.id
    }

    fn with_field(&self, field: RouterField, raw: &str) -> Result<Self, AppError> {
        let mut next = self.clone();
        match field {
            RouterField::AddressIp => next.address_ip = raw.to_string(),
            RouterField::AddressIpv6 => next.address_ipv6 = raw.to_string(),
            RouterField::Brand => next.brand = raw.to_string(),
            RouterField::Model => next.model = raw.to_string(),
            RouterField::Inactive => {
                next.inactive = raw.trim().parse().map_err(|_| {
                    AppError::Validation(format!("Expected true or false, got '{}'", raw))
                })?
            }
        }
        Ok(next)
    }

    fn validate(&self, _target: Option<i64>) -> Result<(), String> {
        let required = [
            ("IPv4 address", &self.address_ip),
            ("IPv6 address", &self.address_ipv6),
            ("Brand", &self.brand),
            ("Model", &self.model),
        ];
        for (label, value) in required {
            if value.trim().is_empty() {
                return Err(format!("{} is required.", label));
            }
        }
        Ok(())
    }

    async fn persist(&self, api: &dyn RemoteResources, target: Option<i64>) -> ApiResult<()> {
        let reply = match target {
            Some(id) => api.update_router(id, &self.to_update_payload()).await,
            None => api.create_router(&self.to_create_payload()).await,
        };
        reply.map(|reply| reply.map(|_| ()))
    }
}

impl FormController<RouterDraft> {
    /// Replace the associated-customer selection.
    pub async fn select_customers(&self, selection: Vec<SelectOption>) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        state.ensure_editable()?;
        state.draft = state.draft.with_selection(selection);
        state.phase = FormPhase::Editing;
        Ok(())
    }
}

/// Options for the customer multi-select. A failed fetch yields no options.
pub async fn customer_options(api: &Arc<dyn RemoteResources>) -> Vec<SelectOption> {
    match api.list_customers().await {
        Some(reply) if reply.status == reqwest::StatusCode::OK => reply
            .into_data()
            .unwrap_or_default()
            .iter()
            .map(SelectOption::from)
            .collect(),
        Some(reply) => {
            tracing::error!("Failed to fetch customers: status {}", reply.status);
            Vec::new()
        }
        None => Vec::new(),
    }
}
