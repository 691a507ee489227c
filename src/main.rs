//! ISP Admin Console
//!
//! Manages customers and routers against the REST backend, with CPF/CNPJ formatting and
//! CEP address autofill.

mod api;
mod config;
mod errors;
mod format;
mod forms;
mod models;
mod notify;
mod views;

use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use api::{HttpResourceClient, RemoteResources};
use config::{Config, LogFormat};
use errors::AppError;
use forms::{
    customer_options, CustomerDraft, CustomerField, DeleteController, DeleteOutcome,
    FormController, RouterDraft, RouterField, SelectOption, SubmitOutcome,
};
use models::{Customer, ResourceKind, Router};
use notify::{AdminEvent, EventBus, Level};
use views::{customer_row, router_row, CustomerDetail, ListView, RouterDetail};

#[derive(Debug, Parser)]
#[command(name = "isp-admin", version, about = "Manage ISP customers and routers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Customer records
    Customers {
        #[command(subcommand)]
        action: CustomerAction,
    },
    /// Router records
    Routers {
        #[command(subcommand)]
        action: RouterAction,
    },
}

#[derive(Debug, Subcommand)]
enum CustomerAction {
    List(SearchArgs),
    Show { id: i64 },
    Add(FieldArgs),
    Edit {
        id: i64,
        #[command(flatten)]
        fields: FieldArgs,
    },
    Delete { id: i64 },
}

#[derive(Debug, Subcommand)]
enum RouterAction {
    List(SearchArgs),
    Show { id: i64 },
    Add {
        #[command(flatten)]
        fields: FieldArgs,
        #[command(flatten)]
        customers: CustomerSelection,
    },
    Edit {
        id: i64,
        #[command(flatten)]
        fields: FieldArgs,
        #[command(flatten)]
        customers: CustomerSelection,
    },
    Delete { id: i64 },
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Case-insensitive filter (customer name / router brand)
    #[arg(long, default_value = "")]
    search: String,
}

#[derive(Debug, Args)]
struct FieldArgs {
    /// Field assignment, e.g. --set fullName="Maria Silva"
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    set: Vec<(String, String)>,
}

#[derive(Debug, Args)]
struct CustomerSelection {
    /// Associated customer id (repeatable); replaces the current set
    #[arg(long = "customer", value_name = "ID")]
    ids: Vec<i64>,
    /// Remove every associated customer
    #[arg(long, conflicts_with = "ids")]
    clear_customers: bool,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(field, value)| (field.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", raw))
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }

    tracing::debug!("Backend: {}", config.api_url);
    tracing::debug!("Postal service: {}", config.postal_url);

    let events = EventBus::new();
    let mut rx = events.subscribe();
    let api: Arc<dyn RemoteResources> =
        Arc::new(HttpResourceClient::from_config(&config, events.clone()));

    let console = Console {
        api,
        events,
        config,
    };

    let result = match cli.command {
        Command::Customers { action } => console.customers(action, &mut rx).await,
        Command::Routers { action } => console.routers(action, &mut rx).await,
    };

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            flush_notices(&mut rx);
            eprintln!("error: {}", err.message());
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Stands in for the pages and modals: one flow per command.
struct Console {
    api: Arc<dyn RemoteResources>,
    events: EventBus,
    config: Config,
}

impl Console {
    async fn customers(
        &self,
        action: CustomerAction,
        rx: &mut broadcast::Receiver<AdminEvent>,
    ) -> Result<(), AppError> {
        let mut list = ListView::<Customer>::new(Arc::clone(&self.api));

        match action {
            CustomerAction::List(args) => {
                list.refresh().await?;
                print_customers(&list, &args.search);
            }
            CustomerAction::Show { id } => {
                list.refresh().await?;
                print!("{}", CustomerDetail(list.find(id)?));
            }
            CustomerAction::Add(fields) => {
                let form = self.customer_form();
                form.seed(None).await;
                apply_customer_fields(&form, &fields).await?;
                check_submit(form.submit().await?)?;
            }
            CustomerAction::Edit { id, fields } => {
                list.refresh().await?;
                let form = self.customer_form();
                form.seed(Some(list.find(id)?)).await;
                apply_customer_fields(&form, &fields).await?;
                check_submit(form.submit().await?)?;
            }
            CustomerAction::Delete { id } => {
                let controller = DeleteController::new(Arc::clone(&self.api), self.events.clone());
                check_delete(controller.confirm(ResourceKind::Customer, id).await)?;
            }
        }

        if dispatch(rx, &mut list).await {
            print_customers(&list, "");
        }
        Ok(())
    }

    async fn routers(
        &self,
        action: RouterAction,
        rx: &mut broadcast::Receiver<AdminEvent>,
    ) -> Result<(), AppError> {
        let mut list = ListView::<Router>::new(Arc::clone(&self.api));

        match action {
            RouterAction::List(args) => {
                list.refresh().await?;
                print_routers(&list, &args.search);
            }
            RouterAction::Show { id } => {
                list.refresh().await?;
                print!("{}", RouterDetail(list.find(id)?));
            }
            RouterAction::Add { fields, customers } => {
                let form = self.router_form();
                form.seed(None).await;
                apply_router_fields(&form, &fields).await?;
                self.apply_selection(&form, &customers).await?;
                check_submit(form.submit().await?)?;
            }
            RouterAction::Edit {
                id,
                fields,
                customers,
            } => {
                list.refresh().await?;
                let form = self.router_form();
                form.seed(Some(list.find(id)?)).await;
                apply_router_fields(&form, &fields).await?;
                self.apply_selection(&form, &customers).await?;
                check_submit(form.submit().await?)?;
            }
            RouterAction::Delete { id } => {
                let controller = DeleteController::new(Arc::clone(&self.api), self.events.clone());
                check_delete(controller.confirm(ResourceKind::Router, id).await)?;
            }
        }

        if dispatch(rx, &mut list).await {
            print_routers(&list, "");
        }
        Ok(())
    }

    fn customer_form(&self) -> FormController<CustomerDraft> {
        FormController::new(Arc::clone(&self.api), self.events.clone())
            .with_lookup_policy(self.config.lookup_policy)
    }

    fn router_form(&self) -> FormController<RouterDraft> {
        FormController::new(Arc::clone(&self.api), self.events.clone())
    }

    async fn apply_selection(
        &self,
        form: &FormController<RouterDraft>,
        selection: &CustomerSelection,
    ) -> Result<(), AppError> {
        if selection.clear_customers {
            return form.select_customers(Vec::new()).await;
        }
        if selection.ids.is_empty() {
            return Ok(());
        }

        let options = customer_options(&self.api).await;
        let chosen = selection
            .ids
            .iter()
            .map(|id| {
                options
                    .iter()
                    .find(|o| o.value == *id)
                    .cloned()
                    .ok_or_else(|| AppError::NotFound(format!("Customer {} not found", id)))
            })
            .collect::<Result<Vec<SelectOption>, AppError>>()?;
        form.select_customers(chosen).await
    }
}

async fn apply_customer_fields(
    form: &FormController<CustomerDraft>,
    fields: &FieldArgs,
) -> Result<(), AppError> {
    for (name, value) in &fields.set {
        match CustomerField::from_str(name)? {
            // Wait for the autofill so later --set street=... still wins
            CustomerField::Cep => {
                let lookup = form.apply_postal_code_edit(value).await?;
                if let Err(err) = lookup.await {
                    tracing::warn!("Postal code lookup task failed: {}", err);
                }
            }
            field => form.apply_field_edit(field, value).await?,
        }
    }
    Ok(())
}

async fn apply_router_fields(
    form: &FormController<RouterDraft>,
    fields: &FieldArgs,
) -> Result<(), AppError> {
    for (name, value) in &fields.set {
        form.apply_field_edit(RouterField::from_str(name)?, value)
            .await?;
    }
    Ok(())
}

fn check_submit(outcome: SubmitOutcome) -> Result<(), AppError> {
    match outcome {
        SubmitOutcome::Saved => Ok(()),
        SubmitOutcome::Invalid(message) => Err(AppError::Validation(message)),
        SubmitOutcome::Rejected { message, .. } => Err(AppError::Validation(message)),
        SubmitOutcome::Failed(message) => Err(AppError::Transport(message)),
    }
}

fn check_delete(outcome: DeleteOutcome) -> Result<(), AppError> {
    match outcome {
        DeleteOutcome::Deleted => Ok(()),
        DeleteOutcome::Rejected { message, .. } => Err(AppError::Validation(message)),
        DeleteOutcome::Failed(message) => Err(AppError::Transport(message)),
    }
}

/// Print queued notices and let `list` handle re-fetch signals.
///
/// Returns whether the list was reloaded.
async fn dispatch<R: views::Listed>(
    rx: &mut broadcast::Receiver<AdminEvent>,
    list: &mut ListView<R>,
) -> bool {
    let mut reloaded = false;
    for event in notify::drain(rx) {
        match &event {
            AdminEvent::Notice { level, message } => print_notice(*level, message),
            AdminEvent::Refetch(_) => reloaded |= list.handle(&event).await,
        }
    }
    reloaded
}

fn flush_notices(rx: &mut broadcast::Receiver<AdminEvent>) {
    for event in notify::drain(rx) {
        if let AdminEvent::Notice { level, message } = event {
            print_notice(level, &message);
        }
    }
}

fn print_notice(level: Level, message: &str) {
    match level {
        Level::Info => println!("{}", message),
        Level::Error => eprintln!("{}", message),
    }
}

fn print_customers(list: &ListView<Customer>, search: &str) {
    for customer in list.filtered(search) {
        println!("{}", customer_row(customer));
    }
}

fn print_routers(list: &ListView<Router>, search: &str) {
    for router in list.filtered(search) {
        println!("{}", router_row(router));
    }
}
