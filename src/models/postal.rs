//! Postal-code (CEP) lookup response, ViaCEP shape.

use serde::{Deserialize, Serialize};

/// Address resolved from a postal code.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PostalAddress {
    #[serde(default)]
    pub cep: Option<String>,
    /// Street
    #[serde(default)]
    pub logradouro: Option<String>,
    #[serde(default)]
    pub complemento: Option<String>,
    /// District
    #[serde(default)]
    pub bairro: Option<String>,
    /// City
    #[serde(default)]
    pub localidade: Option<String>,
    #[serde(default)]
    pub uf: Option<String>,
    /// Set by ViaCEP (with a 200 status) when the code does not exist.
    /// Sent as `true` or `"true"` depending on the API version.
    #[serde(default)]
    pub erro: Option<serde_json::Value>,
}

impl PostalAddress {
    pub fn is_not_found(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(flag)) => flag == "true",
            _ => false,
        }
    }
}
