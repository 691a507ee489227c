//! Data models for the customer/router admin console.
//!
//! These models match the backend JSON contract exactly (camelCase keys, CPF/CNPJ/CEP
//! field names as the backend spells them).

mod customer;
mod postal;
mod router;

pub use customer::*;
pub use postal::*;
pub use router::*;

use std::fmt;

use serde::{Deserialize, Deserializer};

/// The remote collections the console manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Customer,
    Router,
}

impl ResourceKind {
    /// Collection path segment on the backend (`/customers`, `/routers`).
    pub fn segment(&self) -> &'static str {
        match self {
            ResourceKind::Customer => "customers",
            ResourceKind::Router => "routers",
        }
    }

    /// Operator-facing noun.
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Customer => "customer",
            ResourceKind::Router => "router",
        }
    }

    /// Capitalized noun, for the start of a message.
    pub fn title(&self) -> &'static str {
        match self {
            ResourceKind::Customer => "Customer",
            ResourceKind::Router => "Router",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Read a JSON `null` as the type's default; the backend sends `null` for unset columns.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
