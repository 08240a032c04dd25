//! Command parsing and execution.
//!
//! Every command activates the store(s) it touches first, so mutations
//! always start from the cached or freshly fetched collection.

use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;

use propdesk_core::api::ResourceClient;
use propdesk_core::store::{ActivateOutcome, DataSource, StoreError};
use propdesk_core::{
    AgencyStores, CollectionStore, DeleteConfirmation, HttpResourceClient, Resource, ResourceKind,
    ValidationError,
};

pub const USAGE: &str = "\
Usage: propdesk [--no-cache] <command>

Commands:
  status                                   Load every collection and show counts
  list <kind> [--search TERM] [--public]   List records (newest first; testimonials oldest first)
  add <kind> field=value...                Create a record
  edit <kind> <id> field=value...          Change fields of a record
  toggle <kind> <id>                       Show/hide a record on the public site
  delete <kind> <id> --confirm NAME        Delete a record (NAME must match its title or name)
  help                                     Show this message

Kinds: events, webinars, newsletters, testimonials";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    List {
        kind: ResourceKind,
        search: Option<String>,
        public_only: bool,
    },
    Add {
        kind: ResourceKind,
        fields: Vec<(String, String)>,
    },
    Edit {
        kind: ResourceKind,
        id: String,
        fields: Vec<(String, String)>,
    },
    Toggle {
        kind: ResourceKind,
        id: String,
    },
    Delete {
        kind: ResourceKind,
        id: String,
        confirm: Option<String>,
    },
    Help,
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            return Ok(Command::Help);
        };

        match name.as_str() {
            "help" | "--help" | "-h" => Ok(Command::Help),
            "status" => Ok(Command::Status),
            "list" => {
                let (kind, rest) = parse_kind(rest)?;
                let mut search = None;
                let mut public_only = false;
                let mut iter = rest.iter();
                while let Some(arg) = iter.next() {
                    match arg.as_str() {
                        "--search" => {
                            let term = iter.next().ok_or_else(|| anyhow!("--search needs a term"))?;
                            search = Some(term.clone());
                        }
                        "--public" => public_only = true,
                        other => bail!("Unexpected argument: {}", other),
                    }
                }
                Ok(Command::List {
                    kind,
                    search,
                    public_only,
                })
            }
            "add" => {
                let (kind, rest) = parse_kind(rest)?;
                Ok(Command::Add {
                    kind,
                    fields: parse_fields(rest)?,
                })
            }
            "edit" => {
                let (kind, rest) = parse_kind(rest)?;
                let (id, rest) = parse_id(rest)?;
                let fields = parse_fields(rest)?;
                if fields.is_empty() {
                    bail!("Nothing to change: pass field=value pairs");
                }
                Ok(Command::Edit { kind, id, fields })
            }
            "toggle" => {
                let (kind, rest) = parse_kind(rest)?;
                let (id, rest) = parse_id(rest)?;
                if let Some(extra) = rest.first() {
                    bail!("Unexpected argument: {}", extra);
                }
                Ok(Command::Toggle { kind, id })
            }
            "delete" => {
                let (kind, rest) = parse_kind(rest)?;
                let (id, rest) = parse_id(rest)?;
                let confirm = match rest {
                    [] => None,
                    [flag, text] if flag == "--confirm" => Some(text.clone()),
                    _ => bail!("Usage: delete <kind> <id> --confirm NAME"),
                };
                Ok(Command::Delete { kind, id, confirm })
            }
            other => bail!("Unknown command: {}", other),
        }
    }
}

fn parse_kind(args: &[String]) -> Result<(ResourceKind, &[String])> {
    let (kind, rest) = args
        .split_first()
        .ok_or_else(|| anyhow!("Missing collection (events, webinars, newsletters, testimonials)"))?;
    let kind = kind.parse::<ResourceKind>().map_err(|e| anyhow!(e))?;
    Ok((kind, rest))
}

fn parse_id(args: &[String]) -> Result<(String, &[String])> {
    let (id, rest) = args.split_first().ok_or_else(|| anyhow!("Missing record id"))?;
    Ok((id.clone(), rest))
}

fn parse_fields(args: &[String]) -> Result<Vec<(String, String)>> {
    args.iter()
        .map(|arg| {
            let (key, value) = arg
                .split_once('=')
                .ok_or_else(|| anyhow!("Expected field=value, got: {}", arg))?;
            if key.trim().is_empty() {
                bail!("Empty field name in: {}", arg);
            }
            Ok((key.trim().to_string(), value.to_string()))
        })
        .collect()
}

/// Set fields on a record by their wire names.
fn apply_fields<R: Resource>(record: R, fields: &[(String, String)]) -> Result<R> {
    let mut value = serde_json::to_value(&record).context("Failed to serialize record")?;
    let object = value
        .as_object_mut()
        .ok_or_else(|| anyhow!("Record is not a JSON object"))?;

    for (key, raw) in fields {
        if matches!(key.as_str(), "_id" | "id" | "createdAt" | "updatedAt") {
            bail!("{} is assigned by the server and cannot be set", key);
        }
        let new_value = match object.get(key) {
            None => bail!("Unknown {} field: {}", R::KIND, key),
            Some(Value::Bool(_)) => Value::Bool(parse_bool(raw)?),
            Some(_) => Value::String(raw.clone()),
        };
        object.insert(key.clone(), new_value);
    }

    serde_json::from_value(value).context("Failed to apply fields")
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        other => bail!("Expected true or false, got: {}", other),
    }
}

/// Map a store failure to the message shown to the admin
fn describe(action: &str, kind: ResourceKind, err: StoreError) -> anyhow::Error {
    match err {
        StoreError::Validation(ValidationError::Blank(field)) => {
            anyhow!("Please fill all fields: {} is required", field)
        }
        StoreError::Validation(ValidationError::Invalid { field, reason }) => {
            anyhow!("Invalid {}: {}", field, reason)
        }
        StoreError::Busy => anyhow!("Another {} operation is still running", kind),
        other => anyhow!("Error {} {}: {}", action, kind, other),
    }
}

// ============================================================================
// Execution
// ============================================================================

macro_rules! with_store {
    ($stores:expr, $kind:expr, $store:ident => $body:expr) => {
        match $kind {
            ResourceKind::Event => {
                let $store = &$stores.events;
                $body
            }
            ResourceKind::Webinar => {
                let $store = &$stores.webinars;
                $body
            }
            ResourceKind::Newsletter => {
                let $store = &$stores.newsletters;
                $body
            }
            ResourceKind::Testimonial => {
                let $store = &$stores.testimonials;
                $body
            }
        }
    };
}

pub async fn run(command: Command, stores: &AgencyStores<HttpResourceClient>) -> Result<()> {
    match command {
        Command::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        Command::Status => status(stores).await,
        Command::List {
            kind,
            search,
            public_only,
        } => with_store!(stores, kind, store => list(store, search.as_deref(), public_only).await),
        Command::Add { kind, fields } => with_store!(stores, kind, store => add(store, &fields).await),
        Command::Edit { kind, id, fields } => {
            with_store!(stores, kind, store => edit(store, &id, &fields).await)
        }
        Command::Toggle { kind, id } => with_store!(stores, kind, store => toggle(store, &id).await),
        Command::Delete { kind, id, confirm } => {
            with_store!(stores, kind, store => delete(store, &id, confirm.as_deref()).await)
        }
    }
}

async fn status(stores: &AgencyStores<HttpResourceClient>) -> Result<()> {
    let (events, webinars, newsletters, testimonials) = futures::join!(
        stores.events.activate(),
        stores.webinars.activate(),
        stores.newsletters.activate(),
        stores.testimonials.activate(),
    );

    print_status(&stores.events, events);
    print_status(&stores.webinars, webinars);
    print_status(&stores.newsletters, newsletters);
    print_status(&stores.testimonials, testimonials);
    Ok(())
}

fn print_status<R, C>(store: &CollectionStore<R, C>, result: Result<ActivateOutcome, StoreError>)
where
    R: Resource,
    C: ResourceClient<R>,
{
    let name = R::KIND.plural();
    match result {
        Ok(outcome) => {
            let source = match outcome.source {
                DataSource::Cache => "cache",
                DataSource::Network => "network",
            };
            let age = store.cache_age().unwrap_or_else(|| "never".to_string());
            let public = store.included_records().len();
            println!(
                "{:<13} {:>4} records ({} public)  from {:<7}  cached {}",
                name, outcome.count, public, source, age
            );
        }
        Err(e) => println!("{:<13} unavailable: {}", name, e),
    }
}

async fn activate<R, C>(store: &CollectionStore<R, C>) -> Result<()>
where
    R: Resource,
    C: ResourceClient<R>,
{
    store
        .activate()
        .await
        .map(|_| ())
        .map_err(|e| describe("loading", R::KIND, e))
}

async fn list<R, C>(store: &CollectionStore<R, C>, search: Option<&str>, public_only: bool) -> Result<()>
where
    R: Resource,
    C: ResourceClient<R>,
{
    activate(store).await?;

    let mut records = match search {
        Some(term) => store.search(term),
        None => store.records(),
    };
    if public_only {
        records.retain(|r| r.included());
    }

    if records.is_empty() {
        println!("No {} found.", R::KIND.plural());
        return Ok(());
    }
    for record in &records {
        print_record(record);
    }
    Ok(())
}

fn print_record<R: Resource>(record: &R) {
    let shown = if record.included() { "[x]" } else { "[ ]" };
    println!(
        "{} {:<26} {}",
        shown,
        record.id().unwrap_or("-"),
        record.display_name()
    );
}

async fn add<R, C>(store: &CollectionStore<R, C>, fields: &[(String, String)]) -> Result<()>
where
    R: Resource,
    C: ResourceClient<R>,
{
    let input = apply_fields(R::default(), fields)?;
    activate(store).await?;

    let created = store
        .create(input)
        .await
        .map_err(|e| describe("adding", R::KIND, e))?;
    println!("{} added successfully!", capitalize(&R::KIND.to_string()));
    print_record(&created);
    Ok(())
}

async fn edit<R, C>(store: &CollectionStore<R, C>, id: &str, fields: &[(String, String)]) -> Result<()>
where
    R: Resource,
    C: ResourceClient<R>,
{
    activate(store).await?;
    let record = store
        .find(id)
        .ok_or_else(|| anyhow!("No {} with id {}", R::KIND, id))?;
    let edited = apply_fields(record, fields)?;

    let updated = store
        .update(edited)
        .await
        .map_err(|e| describe("updating", R::KIND, e))?;
    println!("{} updated successfully!", capitalize(&R::KIND.to_string()));
    print_record(&updated);
    Ok(())
}

async fn toggle<R, C>(store: &CollectionStore<R, C>, id: &str) -> Result<()>
where
    R: Resource,
    C: ResourceClient<R>,
{
    activate(store).await?;
    let updated = store
        .toggle_included(id)
        .await
        .map_err(|e| describe("updating", R::KIND, e))?;
    let visibility = if updated.included() { "shown on" } else { "hidden from" };
    println!("\"{}\" is now {} the public site", updated.display_name(), visibility);
    Ok(())
}

async fn delete<R, C>(store: &CollectionStore<R, C>, id: &str, confirm: Option<&str>) -> Result<()>
where
    R: Resource,
    C: ResourceClient<R>,
{
    activate(store).await?;
    let record = store
        .find(id)
        .ok_or_else(|| anyhow!("No {} with id {}", R::KIND, id))?;
    let guard = DeleteConfirmation::for_record(&record)
        .ok_or_else(|| anyhow!("Record has no id"))?;

    match confirm {
        Some(typed) if guard.matches(typed) => {}
        _ => bail!(
            "To delete, re-run with: --confirm \"{}\"",
            guard.expected()
        ),
    }

    store
        .delete(guard.id())
        .await
        .map_err(|e| describe("deleting", R::KIND, e))?;
    println!("{} deleted successfully!", capitalize(&R::KIND.to_string()));
    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
