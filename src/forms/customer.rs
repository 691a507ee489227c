//! Customer draft and the postal-code autofill flow.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::task::JoinHandle;

use super::{Draft, FormController, FormPhase};
use crate::api::{ApiResult, RemoteResources};
use crate::config::LookupPolicy;
use crate::errors::AppError;
use crate::format::{
    format_individual_identifier, format_organization_identifier, unformat_identifier, CNPJ_LEN,
    CPF_LEN,
};
use crate::models::{parse_birth, AccountKind, Customer, CustomerPayload, PostalAddress, ResourceKind};

/// Editable customer fields, named as the backend names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerField {
    FullName,
    AccountType,
    Cpf,
    Cnpj,
    Birth,
    Street,
    Number,
    Complement,
    Cep,
    District,
    City,
    Inactive,
}

impl FromStr for CustomerField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fullName" => Ok(CustomerField::FullName),
            "accountType" => Ok(CustomerField::AccountType),
            "cpf" => Ok(CustomerField::Cpf),
            "cnpj" => Ok(CustomerField::Cnpj),
            "birth" => Ok(CustomerField::Birth),
            "street" => Ok(CustomerField::Street),
            "number" => Ok(CustomerField::Number),
            "complement" => Ok(CustomerField::Complement),
            "cep" => Ok(CustomerField::Cep),
            "district" => Ok(CustomerField::District),
            "city" => Ok(CustomerField::City),
            "inactive" => Ok(CustomerField::Inactive),
            other => Err(AppError::Validation(format!(
                "Unknown customer field '{}'",
                other
            ))),
        }
    }
}

/// Working copy of a customer.
///
/// Identifiers are held in display form. Both may be filled at once; only the one
/// matching `account_type` is sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerDraft {
    pub full_name: String,
    pub account_type: AccountKind,
    pub cpf: String,
    pub cnpj: String,
    /// `YYYY-MM-DD`
    pub birth: String,
    pub street: String,
    pub number: String,
    pub complement: String,
    pub cep: String,
    pub district: String,
    pub city: String,
    pub inactive: bool,
}

impl CustomerDraft {
    /// Overwrite street, district and city from a lookup result.
    pub fn with_postal_address(&self, address: &PostalAddress) -> Self {
        Self {
            street: address.logradouro.clone().unwrap_or_default(),
            district: address.bairro.clone().unwrap_or_default(),
            city: address.localidade.clone().unwrap_or_default(),
            ..self.clone()
        }
    }

    /// Canonical payload: the matching identifier unformatted, the other one left out.
    pub fn to_payload(&self, target: Option<i64>) -> CustomerPayload {
        let (cpf, cnpj) = match self.account_type {
            AccountKind::Individual => (Some(unformat_identifier(&self.cpf)), None),
            AccountKind::Organization => (None, Some(unformat_identifier(&self.cnpj))),
        };
        let birth = Some(self.birth.trim())
            .filter(|b| !b.is_empty())
            .map(str::to_string);

        CustomerPayload {
            full_name: self.full_name.trim().to_string(),
            account_type: self.account_type,
            cpf,
            cnpj,
            birth,
            street: self.street.clone(),
            number: self.number.clone(),
            complement: self.complement.clone(),
            cep: self.cep.clone(),
            district: self.district.clone(),
            city: self.city.clone(),
            inactive: target.map(|_| self.inactive),
        }
    }
}

#[async_trait]
impl Draft for CustomerDraft {
    type Record = Customer;
    type Field = CustomerField;

    const KIND: ResourceKind = ResourceKind::Customer;

    fn from_record(customer: &Customer) -> Self {
        let birth = customer
            .birth_date()
            .map(|date| date.format("%Y-%m-%d").to_string())
            .or_else(|| customer.birth.clone())
            .unwrap_or_default();

        Self {
            full_name: customer.full_name.clone(),
            account_type: customer.account_type,
            cpf: format_individual_identifier(customer.cpf.as_deref()).unwrap_or_default(),
            cnpj: format_organization_identifier(customer.cnpj.as_deref()).unwrap_or_default(),
            birth,
            street: customer.street.clone(),
            number: customer.number.clone(),
            complement: customer.complement.clone(),
            cep: customer.cep.clone(),
            district: customer.district.clone(),
            city: customer.city.clone(),
            inactive: customer.inactive,
        }
    }

    fn record_id(customer: &Customer) -> i64 {
        customer.id
    }

    fn with_field(&self, field: CustomerField, raw: &str) -> Result<Self, AppError> {
        let mut next = self.clone();
        match field {
            CustomerField::FullName => next.full_name = raw.to_string(),
            // The identifier of the other kind is kept until submit
            CustomerField::AccountType => next.account_type = raw.parse()?,
            CustomerField::Cpf => {
                next.cpf = format_individual_identifier(Some(raw)).unwrap_or_default()
            }
            CustomerField::Cnpj => {
                next.cnpj = format_organization_identifier(Some(raw)).unwrap_or_default()
            }
            CustomerField::Birth => next.birth = raw.to_string(),
            CustomerField::Street => next.street = raw.to_string(),
            CustomerField::Number => next.number = raw.to_string(),
            CustomerField::Complement => next.complement = raw.to_string(),
            CustomerField::Cep => next.cep = raw.to_string(),
            CustomerField::District => next.district = raw.to_string(),
            CustomerField::City => next.city = raw.to_string(),
            CustomerField::Inactive => next.inactive = parse_flag(raw)?,
        }
        Ok(next)
    }

    fn validate(&self, _target: Option<i64>) -> Result<(), String> {
        if self.full_name.trim().is_empty() {
            return Err("Full name is required.".to_string());
        }

        match self.account_type {
            AccountKind::Individual => {
                if unformat_identifier(&self.cpf).len() != CPF_LEN {
                    return Err(format!("CPF must have {} digits.", CPF_LEN));
                }
                if self.birth.trim().is_empty() {
                    return Err("Birth date is required.".to_string());
                }
            }
            AccountKind::Organization => {
                if unformat_identifier(&self.cnpj).len() != CNPJ_LEN {
                    return Err(format!("CNPJ must have {} digits.", CNPJ_LEN));
                }
            }
        }

        if !self.birth.trim().is_empty() && parse_birth(&self.birth).is_none() {
            return Err("Birth date must be a valid date (YYYY-MM-DD).".to_string());
        }

        let required = [
            ("Postal code", &self.cep),
            ("Street", &self.street),
            ("Number", &self.number),
            ("District", &self.district),
            ("City", &self.city),
        ];
        for (label, value) in required {
            if value.trim().is_empty() {
                return Err(format!("{} is required.", label));
            }
        }

        Ok(())
    }

    async fn persist(&self, api: &dyn RemoteResources, target: Option<i64>) -> ApiResult<()> {
        let payload = self.to_payload(target);
        let reply = match target {
            Some(id) => api.update_customer(id, &payload).await,
            None => api.create_customer(&payload).await,
        };
        reply.map(|reply| reply.map(|_| ()))
    }
}

fn parse_flag(raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        other => Err(AppError::Validation(format!(
            "Expected true or false, got '{}'",
            other
        ))),
    }
}

impl FormController<CustomerDraft> {
    /// Merge the raw postal code now, then look it up in the background.
    ///
    /// A successful lookup overwrites street, district and city. Failed or unknown codes
    /// leave the draft alone. Lookups are neither debounced nor cancelled; with
    /// [`LookupPolicy::LastResponseWins`] whichever response lands last wins.
    pub async fn apply_postal_code_edit(&self, raw: &str) -> Result<JoinHandle<()>, AppError> {
        let seq = {
            let mut state = self.state.lock().await;
            state.ensure_editable()?;
            state.draft = state.draft.with_field(CustomerField::Cep, raw)?;
            state.phase = FormPhase::Editing;
            state.lookup_seq += 1;
            state.lookup_seq
        };

        let api = Arc::clone(&self.api);
        let state = Arc::clone(&self.state);
        let policy = self.lookup_policy;
        let code = raw.to_string();

        Ok(tokio::spawn(async move {
            let address = match api.lookup_postal_code(&code).await {
                Some(reply) if reply.status == StatusCode::OK => match reply.into_data() {
                    Some(address) if !address.is_not_found() => address,
                    _ => {
                        tracing::debug!("Postal code {} not found", code);
                        return;
                    }
                },
                Some(reply) => {
                    tracing::debug!("Postal code {} lookup answered {}", code, reply.status);
                    return;
                }
                None => return,
            };

            let mut state = state.lock().await;
            if policy == LookupPolicy::LatestRequestOnly && state.lookup_seq != seq {
                tracing::debug!("Discarding stale lookup for postal code {}", code);
                return;
            }
            state.draft = state.draft.with_postal_address(&address);
        }))
    }
}
