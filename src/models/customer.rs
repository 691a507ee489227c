//! Customer model matching the backend customer contract.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::null_as_default;
use crate::errors::AppError;

/// Account kind of a customer. Decides which tax identifier is sent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AccountKind {
    /// Individual account, identified by an 11-digit CPF.
    #[default]
    #[serde(rename = "PF")]
    Individual,
    /// Organization account, identified by a 14-digit CNPJ.
    #[serde(rename = "PJ")]
    Organization,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Individual => "PF",
            AccountKind::Organization => "PJ",
        }
    }
}

impl FromStr for AccountKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pf" | "individual" => Ok(AccountKind::Individual),
            "pj" | "organization" => Ok(AccountKind::Organization),
            other => Err(AppError::Validation(format!(
                "Unknown account type '{}' (expected PF or PJ)",
                other
            ))),
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKind::Individual => f.write_str("Individual (PF)"),
            AccountKind::Organization => f.write_str("Organization (PJ)"),
        }
    }
}

/// Router attached to a customer, as embedded in customer listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouterSummary {
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
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A billing/service subscriber.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub account_type: AccountKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cnpj: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub street: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub number: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub complement: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub district: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cep: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub inactive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router: Option<RouterSummary>,
}

impl Customer {
    /// The identifier matching the account kind, in canonical form.
    pub fn identifier(&self) -> Option<&str> {
        match self.account_type {
            AccountKind::Individual => self.cpf.as_deref(),
            AccountKind::Organization => self.cnpj.as_deref(),
        }
    }

    /// Birth date, whether the backend sent a plain date or a full timestamp.
    pub fn birth_date(&self) -> Option<NaiveDate> {
        self.birth.as_deref().and_then(parse_birth)
    }
}

/// Parse a birth date given as `YYYY-MM-DD` or as an RFC 3339 timestamp.
pub fn parse_birth(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

/// Body of `POST /customers` and `PUT /customers/{id}`.
///
/// Exactly one of `cpf`/`cnpj` is set; the other key is left out of the JSON.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    pub full_name: String,
    pub account_type: AccountKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cnpj: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth: Option<String>,
    pub street: String,
    pub number: String,
    pub complement: String,
    pub cep: String,
    pub district: String,
    pub city: String,
    /// Only sent on update; the create form has no such field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive: Option<bool>,
}
