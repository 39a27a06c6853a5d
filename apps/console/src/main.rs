mod render;

use std::{path::PathBuf, str::FromStr};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    config::{load_settings_from, DEFAULT_CONFIG_FILE},
    store::EntityState,
    view::{
        AlbumField, CommentField, EmployeeFilter, EmployeeSort, ListFields, ListQuery, PhotoField,
        PostField, TodoField,
    },
    AdminConsole, Effects, Request, Resource, Settlement,
};
use shared::{
    domain::{EmployeeId, Identifiable},
    error::ValidationError,
    form::{
        compose_email, is_valid_email, sanitize_phone_part, EmployeeDraft, PhonePart, MOBILE_PREFIX,
    },
    protocol::{ConditionField, EmployeePatch},
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "admin-console", about = "Employee admin console")]
struct Cli {
    /// Settings file; missing files fall back to defaults.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(subcommand)]
    Employees(EmployeeCommand),
    #[command(subcommand)]
    Posts(DemoCommand),
    #[command(subcommand)]
    Comments(DemoCommand),
    #[command(subcommand)]
    Albums(DemoCommand),
    #[command(subcommand)]
    Photos(DemoCommand),
    #[command(subcommand)]
    Todos(DemoCommand),
    /// Loads every demo collection and prints a per-entity summary.
    Overview,
}

#[derive(Args, Debug, Clone)]
struct ListArgs {
    /// Case- and accent-insensitive text matched against `--field`.
    #[arg(long, default_value = "")]
    query: String,
    #[arg(long)]
    field: Option<String>,
    /// Column to sort by. Repeating a column flips its direction.
    #[arg(long = "sort")]
    sort: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum DemoCommand {
    List(ListArgs),
}

#[derive(Subcommand, Debug)]
enum EmployeeCommand {
    List(ListArgs),
    /// Server-side search by name, employeeId or department.
    Search {
        #[arg(long, default_value = "name")]
        condition: String,
        value: String,
    },
    Get {
        id: i64,
    },
    Create(DraftArgs),
    Update {
        id: i64,
        #[command(flatten)]
        patch: PatchArgs,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug, Clone)]
struct DraftArgs {
    #[arg(long)]
    employee_id: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    email_local: Option<String>,
    #[arg(long)]
    email_domain: Option<String>,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    gender: Option<String>,
    #[arg(long)]
    birth_date: Option<String>,
    #[arg(long)]
    phone_prefix: Option<String>,
    #[arg(long)]
    phone_middle: Option<String>,
    #[arg(long)]
    phone_last: Option<String>,
    #[arg(long)]
    zip_code: Option<String>,
    #[arg(long)]
    address1: Option<String>,
    #[arg(long)]
    address2: Option<String>,
    #[arg(long)]
    position: Option<String>,
}

impl DraftArgs {
    fn into_draft(self) -> EmployeeDraft {
        let mut draft = EmployeeDraft {
            employee_id: self.employee_id,
            name: self.name,
            email_local: self.email_local.unwrap_or_default(),
            department: self.department.unwrap_or_default(),
            gender: self.gender.unwrap_or_default(),
            birth_date: self.birth_date.unwrap_or_default(),
            zip_code: self.zip_code.unwrap_or_default(),
            address1: self.address1.unwrap_or_default(),
            address2: self.address2.unwrap_or_default(),
            position: self.position.unwrap_or_default(),
            ..EmployeeDraft::default()
        };
        if let Some(domain) = self.email_domain {
            draft.email_domain = domain;
        }
        if let Some(prefix) = self.phone_prefix {
            draft.set_phone_prefix(prefix);
        }
        if let Some(middle) = self.phone_middle {
            draft.set_phone_part(PhonePart::Middle, &middle);
        }
        if let Some(last) = self.phone_last {
            draft.set_phone_part(PhonePart::Last, &last);
        }
        draft
    }
}

#[derive(Args, Debug, Clone, Default)]
struct PatchArgs {
    #[arg(long)]
    employee_id: Option<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    email_local: Option<String>,
    #[arg(long)]
    email_domain: Option<String>,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    gender: Option<String>,
    #[arg(long)]
    birth_date: Option<String>,
    #[arg(long)]
    phone_prefix: Option<String>,
    #[arg(long)]
    phone_middle: Option<String>,
    #[arg(long)]
    phone_last: Option<String>,
    #[arg(long)]
    position: Option<String>,
    #[arg(long)]
    zip_code: Option<String>,
    #[arg(long)]
    address1: Option<String>,
    #[arg(long)]
    address2: Option<String>,
}

impl PatchArgs {
    fn into_patch(self) -> Result<EmployeePatch> {
        // Both halves given: the composed address replaces any `--email`.
        let email = match (&self.email_local, &self.email_domain) {
            (Some(local), Some(domain)) => Some(compose_email(local, domain)),
            _ => self.email,
        };
        if let Some(email) = &email {
            if !is_valid_email(email) {
                return Err(ValidationError::InvalidEmail(email.clone()).into());
            }
        }

        let prefix = self.phone_prefix.as_deref().unwrap_or(MOBILE_PREFIX);
        let phone = |part: PhonePart, raw: Option<String>| {
            raw.map(|raw| sanitize_phone_part(prefix, part, &raw))
                .filter(|digits| !digits.is_empty())
        };
        let phone_middle = phone(PhonePart::Middle, self.phone_middle);
        let phone_last = phone(PhonePart::Last, self.phone_last);

        let patch = EmployeePatch {
            employee_id: self.employee_id,
            name: self.name,
            email_local: self.email_local,
            email_domain: self.email_domain,
            email,
            department: self.department,
            gender: self.gender,
            birth_date: self.birth_date,
            phone_prefix: self.phone_prefix,
            phone_middle,
            phone_last,
            zip_code: self.zip_code,
            address1: self.address1,
            address2: self.address2,
            position: self.position,
        };
        if patch.is_empty() {
            bail!("nothing to update; pass at least one field flag");
        }
        Ok(patch)
    }
}

fn parse_tag<T: FromStr<Err = ValidationError>>(raw: &str) -> Result<T> {
    Ok(raw.parse::<T>()?)
}

/// Applies `--field` and each `--sort` in order on top of `base`.
fn build_query<F, S>(args: &ListArgs, base: ListQuery<F, S>) -> Result<ListQuery<F, S>>
where
    F: Copy + Eq + FromStr<Err = ValidationError>,
    S: Copy + Eq + FromStr<Err = ValidationError>,
{
    let mut query = base;
    query.query = args.query.clone();
    if let Some(field) = &args.field {
        query.filter = parse_tag(field)?;
    }
    for column in &args.sort {
        query.select_sort(parse_tag(column)?);
    }
    Ok(query)
}

/// A slice error is shown as the banner and fails the command.
fn ensure_ok<T>(state: &EntityState<T>) -> Result<()> {
    match &state.error {
        Some(message) => bail!("{message}"),
        None => Ok(()),
    }
}

async fn run<R: Resource>(effects: &Effects<R>, request: Request<R>) -> Result<EntityState<R::Record>> {
    let settlement = effects.dispatch(request).await.settled().await;
    debug!(entity = R::NAME, ?settlement, "request settled");
    let state = effects.slice().snapshot().await;
    if settlement == Settlement::Applied {
        ensure_ok(&state)?;
    }
    Ok(state)
}

async fn list_collection<R>(
    effects: &Effects<R>,
    args: &ListArgs,
    base: ListQuery<<R::Record as ListFields>::Filter, <R::Record as ListFields>::Sort>,
    columns: &[<R::Record as ListFields>::Filter],
) -> Result<()>
where
    R: Resource,
    R::Record: ListFields,
    <R::Record as ListFields>::Filter: FromStr<Err = ValidationError> + std::fmt::Display,
    <R::Record as ListFields>::Sort: FromStr<Err = ValidationError>,
{
    let query = build_query(args, base)?;
    let state = run(effects, Request::FetchAll).await?;
    let rows = query.project(&state.items);
    println!("{}", render::table(&rows, columns));
    println!("{}", render::footer(rows.len(), state.items.len()));
    Ok(())
}

async fn employees(console: &AdminConsole, command: EmployeeCommand) -> Result<()> {
    let effects = &console.employees;
    match command {
        EmployeeCommand::List(args) => {
            list_collection(effects, &args, ListQuery::default(), EmployeeFilter::ALL).await?;
        }
        EmployeeCommand::Search { condition, value } => {
            let field: ConditionField = condition.parse()?;
            let settlement = console.search_employees(field, &value).await?.settled().await;
            debug!(?settlement, "search settled");
            let state = effects.slice().snapshot().await;
            ensure_ok(&state)?;
            let rows: Vec<_> = state.items.iter().collect();
            println!("{}", render::table(&rows, EmployeeFilter::ALL));
            println!("{}", render::footer(rows.len(), rows.len()));
        }
        EmployeeCommand::Get { id } => {
            let id = EmployeeId(id);
            let state = run(effects, Request::FetchOne(id)).await?;
            let employee = state
                .items
                .iter()
                .find(|employee| employee.id() == id)
                .with_context(|| format!("employee {id} missing after fetch"))?;
            println!("{}", serde_json::to_string_pretty(employee)?);
            println!("email:   {}", employee.full_email());
            println!("phone:   {}", employee.full_phone());
            println!("address: {}", employee.full_address());
        }
        EmployeeCommand::Create(args) => {
            let input = args.into_draft().into_input()?;
            let state = run(effects, Request::Create(input)).await?;
            if let Some(created) = state.items.last() {
                info!(id = %created.id, "employee created");
                println!("created employee {} ({})", created.id, created.name);
            }
        }
        EmployeeCommand::Update { id, patch } => {
            let id = EmployeeId(id);
            let patch = patch.into_patch()?;
            run(effects, Request::Update { id, patch }).await?;
            println!("updated employee {id}");
        }
        EmployeeCommand::Delete { id } => {
            let id = EmployeeId(id);
            run(effects, Request::Delete(id)).await?;
            println!("deleted employee {id}");
        }
    }
    Ok(())
}

async fn overview(console: &AdminConsole) -> Result<()> {
    console.load_demo_collections().await;
    for summary in console.store().summaries().await {
        let status = match (&summary.error, summary.loading) {
            (Some(message), _) => format!("error: {message}"),
            (None, true) => "loading".to_string(),
            (None, false) => "ok".to_string(),
        };
        println!("{:<10} {:>6}  {status}", summary.entity, summary.items);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let settings = load_settings_from(&cli.config, |key| std::env::var(key).ok())
        .with_context(|| format!("loading settings from {}", cli.config.display()))?;
    let console = AdminConsole::new(&settings);

    match cli.command {
        Command::Employees(command) => employees(&console, command).await?,
        Command::Posts(DemoCommand::List(args)) => {
            let base = ListQuery::new(PostField::Title).sorted_by(PostField::Id);
            list_collection(&console.posts, &args, base, PostField::ALL).await?;
        }
        Command::Comments(DemoCommand::List(args)) => {
            let base = ListQuery::new(CommentField::Name).sorted_by(CommentField::Id);
            list_collection(&console.comments, &args, base, CommentField::ALL).await?;
        }
        Command::Albums(DemoCommand::List(args)) => {
            let base = ListQuery::new(AlbumField::Title).sorted_by(AlbumField::Id);
            list_collection(&console.albums, &args, base, AlbumField::ALL).await?;
        }
        Command::Photos(DemoCommand::List(args)) => {
            let base = ListQuery::new(PhotoField::Title).sorted_by(PhotoField::Id);
            list_collection(&console.photos, &args, base, PhotoField::ALL).await?;
        }
        Command::Todos(DemoCommand::List(args)) => {
            let base = ListQuery::new(TodoField::Title).sorted_by(TodoField::Id);
            list_collection(&console.todos, &args, base, TodoField::ALL).await?;
        }
        Command::Overview => overview(&console).await?,
    }

    Ok(())
}
