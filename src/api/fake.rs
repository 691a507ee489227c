//! In-memory [`RemoteResources`] double for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::oneshot;

use super::{ApiResult, RemoteResources, Reply};
use crate::errors::ErrorBody;
use crate::models::{
    CreateRouterPayload, Customer, CustomerPayload, PostalAddress, Router, RouterCustomer,
    UpdateRouterPayload,
};

/// One recorded write call: operation name, target id and the JSON body sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub op: &'static str,
    pub id: Option<i64>,
    pub body: serde_json::Value,
}

/// Scripted answer for the next write call. `None` simulates a missing response.
pub type Scripted = Option<(StatusCode, Option<String>)>;

struct PostalScript {
    address: Option<PostalAddress>,
    gate: Option<oneshot::Receiver<()>>,
}

#[derive(Default)]
pub struct FakeApi {
    pub customers: Mutex<Vec<Customer>>,
    pub routers: Mutex<Vec<Router>>,
    calls: Mutex<Vec<Call>>,
    scripted: Mutex<VecDeque<Scripted>>,
    postal: Mutex<HashMap<String, PostalScript>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_customers(customers: Vec<Customer>) -> Self {
        let api = Self::new();
        *api.customers.lock().unwrap() = customers;
        api
    }

    /// Answer the next create/update/delete with this instead of the default success.
    pub fn script(&self, reply: Scripted) {
        self.scripted.lock().unwrap().push_back(reply);
    }

    /// Resolve lookups for `code` immediately.
    pub fn postal(&self, code: &str, address: Option<PostalAddress>) {
        self.postal.lock().unwrap().insert(
            code.to_string(),
            PostalScript {
                address,
                gate: None,
            },
        );
    }

    /// Hold lookups for `code` until the returned sender fires.
    pub fn gated_postal(&self, code: &str, address: PostalAddress) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.postal.lock().unwrap().insert(
            code.to_string(),
            PostalScript {
                address: Some(address),
                gate: Some(rx),
            },
        );
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str, id: Option<i64>, body: impl serde::Serialize) {
        let body = serde_json::to_value(body).unwrap();
        self.calls.lock().unwrap().push(Call { op, id, body });
    }

    /// Pop the scripted answer, or build the default one with `ok`.
    fn answer<T>(&self, ok: impl FnOnce() -> Reply<T>) -> ApiResult<T> {
        match self.scripted.lock().unwrap().pop_front() {
            None => Some(ok()),
            Some(None) => None,
            Some(Some((status, message))) => Some(Reply::failure(
                status,
                ErrorBody {
                    message,
                    ..Default::default()
                },
            )),
        }
    }
}

pub fn customer_from_payload(id: i64, payload: &CustomerPayload) -> Customer {
    Customer {
        id,
        full_name: payload.full_name.clone(),
        account_type: payload.account_type,
        cpf: payload.cpf.clone(),
        cnpj: payload.cnpj.clone(),
        birth: payload.birth.clone(),
        street: payload.street.clone(),
        number: payload.number.clone(),
        complement: payload.complement.clone(),
        district: payload.district.clone(),
        city: payload.city.clone(),
        cep: payload.cep.clone(),
        inactive: payload.inactive.unwrap_or(false),
        created_at: None,
        updated_at: None,
        router_id: None,
        router: None,
    }
}

#[async_trait]
impl RemoteResources for FakeApi {
    async fn list_customers(&self) -> ApiResult<Vec<Customer>> {
        Some(Reply::data(StatusCode::OK, self.customers.lock().unwrap().clone()))
    }

    async fn create_customer(&self, payload: &CustomerPayload) -> ApiResult<Customer> {
        self.record("create_customer", None, payload);
        self.answer(|| {
            let mut customers = self.customers.lock().unwrap();
            let customer = customer_from_payload(customers.len() as i64 + 1, payload);
            customers.push(customer.clone());
            Reply::data(StatusCode::OK, customer)
        })
    }

    async fn update_customer(&self, id: i64, payload: &CustomerPayload) -> ApiResult<Customer> {
        self.record("update_customer", Some(id), payload);
        self.answer(|| Reply::data(StatusCode::OK, customer_from_payload(id, payload)))
    }

    async fn delete_customer(&self, id: i64) -> ApiResult<()> {
        self.record("delete_customer", Some(id), serde_json::Value::Null);
        self.answer(|| {
            self.customers.lock().unwrap().retain(|c| c.id != id);
            Reply::empty(StatusCode::NO_CONTENT)
        })
    }

    async fn list_routers(&self) -> ApiResult<Vec<Router>> {
        Some(Reply::data(StatusCode::OK, self.routers.lock().unwrap().clone()))
    }

    async fn create_router(&self, payload: &CreateRouterPayload) -> ApiResult<Router> {
        self.record("create_router", None, payload);
        self.answer(|| {
            let mut routers = self.routers.lock().unwrap();
            let router = Router {
                id: routers.len() as i64 + 1,
                address_ip: payload.address_ip.clone(),
                address_ipv6: payload.address_ipv6.clone(),
                brand: payload.brand.clone(),
                model: payload.model.clone(),
                inactive: false,
                created_at: None,
                updated_at: None,
                customers: payload
                    .customer_ids
                    .iter()
                    .filter_map(|id| id.parse().ok())
                    .map(|id| RouterCustomer {
                        id,
                        full_name: String::new(),
                    })
                    .collect(),
            };
            routers.push(router.clone());
            Reply::data(StatusCode::OK, router)
        })
    }

    async fn update_router(&self, id: i64, payload: &UpdateRouterPayload) -> ApiResult<Router> {
        self.record("update_router", Some(id), payload);
        self.answer(|| Reply::empty(StatusCode::NO_CONTENT))
    }

    async fn delete_router(&self, id: i64) -> ApiResult<()> {
        self.record("delete_router", Some(id), serde_json::Value::Null);
        self.answer(|| {
            self.routers.lock().unwrap().retain(|r| r.id != id);
            Reply::empty(StatusCode::NO_CONTENT)
        })
    }

    async fn lookup_postal_code(&self, code: &str) -> ApiResult<PostalAddress> {
        let script = self.postal.lock().unwrap().remove(code);
        let Some(script) = script else {
            return Some(Reply::failure(StatusCode::BAD_REQUEST, ErrorBody::default()));
        };
        if let Some(gate) = script.gate {
            let _ = gate.await;
        }
        script
            .address
            .map(|address| Reply::data(StatusCode::OK, address))
    }
}
