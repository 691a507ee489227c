//! Router model matching the backend router contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Customer reference embedded in a router listing (id + display name only).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RouterCustomer {
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub full_name: String,
}

/// A network device, associated with zero or more customers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Router {
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub address_ip: String,
    #[serde(deserialize_with = "null_as_default")]
    pub address_ipv6: String,
    #[serde(deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub inactive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// The backend names the association `customer` even though it is a list
    #[serde(default, rename = "customer", alias = "customers")]
    pub customers: Vec<RouterCustomer>,
}

/// Body of `POST /routers`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateRouterPayload {
    pub address_ip: String,
    pub address_ipv6: String,
    pub brand: String,
    pub model: String,
    pub customer_ids: Vec<String>,
}

/// Body of `PUT /routers/{id}`.
///
/// `customer_ids` is the full association set; the backend replaces all links.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRouterPayload {
    pub address_ip: String,
    pub address_ipv6: String,
    pub brand: String,
    pub model: String,
    pub inactive: bool,
    pub customer_ids: Vec<String>,
}
