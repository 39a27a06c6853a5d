//! Entity store: one slice per resource, each holding `{ items, loading, error }`
//! and mutated only by [`reduce`] in response to dispatched actions.

use std::{fmt, sync::Arc};

use serde::{de::DeserializeOwned, Serialize, Serializer};
use shared::{
    domain::{Album, Comment, Employee, Identifiable, Photo, Post, Todo},
    protocol::{EmployeeInput, EmployeePatch, SearchCondition},
};
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::scheduler::Generations;

const STORE_EVENT_CAPACITY: usize = 256;

pub type RecordId<R> = <<R as Resource>::Record as Identifiable>::Id;

/// Payload type for operations a resource does not offer. It has no values, so
/// requests carrying it cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unsupported {}

impl Serialize for Unsupported {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        match *self {}
    }
}

/// Describes one entity collection: its record shape, request payloads and naming.
pub trait Resource: Clone + fmt::Debug + Send + Sync + 'static {
    /// Plural name, also the store key and the collection path segment.
    const NAME: &'static str;
    const SINGULAR: &'static str;
    const READ_ONLY: bool = false;

    type Record: Identifiable + Clone + fmt::Debug + PartialEq + DeserializeOwned + Send + Sync + 'static;
    type Input: Clone + fmt::Debug + Serialize + Send + Sync + 'static;
    type Patch: Clone + fmt::Debug + Serialize + Send + Sync + 'static;
    type Condition: Clone + fmt::Debug + Serialize + Send + Sync + 'static;

    fn fallback_message(operation: Operation) -> String {
        match operation {
            Operation::FetchAll | Operation::FetchByCondition => {
                format!("Failed to load {}", Self::NAME)
            }
            Operation::FetchOne => format!("Failed to load {}", Self::SINGULAR),
            Operation::Create => format!("Failed to create {}", Self::SINGULAR),
            Operation::Update => format!("Failed to update {}", Self::SINGULAR),
            Operation::Delete => format!("Failed to delete {}", Self::SINGULAR),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchAll,
    FetchOne,
    FetchByCondition,
    Create,
    Update,
    Delete,
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Self::FetchAll,
        Self::FetchOne,
        Self::FetchByCondition,
        Self::Create,
        Self::Update,
        Self::Delete,
    ];

    /// Action-type label, e.g. `fetchEmployeesByCondition` or `deleteEmployee`.
    pub fn label<R: Resource>(self) -> String {
        let plural = capitalize(R::NAME);
        let singular = capitalize(R::SINGULAR);
        match self {
            Self::FetchAll => format!("fetch{plural}"),
            Self::FetchOne => format!("fetch{singular}"),
            Self::FetchByCondition => format!("fetch{plural}ByCondition"),
            Self::Create => format!("create{singular}"),
            Self::Update => format!("update{singular}"),
            Self::Delete => format!("delete{singular}"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Request<R: Resource> {
    FetchAll,
    FetchOne(RecordId<R>),
    FetchByCondition(R::Condition),
    Create(R::Input),
    Update { id: RecordId<R>, patch: R::Patch },
    Delete(RecordId<R>),
}

impl<R: Resource> Request<R> {
    pub fn operation(&self) -> Operation {
        match self {
            Self::FetchAll => Operation::FetchAll,
            Self::FetchOne(_) => Operation::FetchOne,
            Self::FetchByCondition(_) => Operation::FetchByCondition,
            Self::Create(_) => Operation::Create,
            Self::Update { .. } => Operation::Update,
            Self::Delete(_) => Operation::Delete,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Outcome<R: Resource> {
    Fetched(Vec<R::Record>),
    Searched(Vec<R::Record>),
    FetchedOne(R::Record),
    Created(R::Record),
    Updated(R::Record),
    Deleted(RecordId<R>),
}

impl<R: Resource> Outcome<R> {
    pub fn operation(&self) -> Operation {
        match self {
            Self::Fetched(_) => Operation::FetchAll,
            Self::Searched(_) => Operation::FetchByCondition,
            Self::FetchedOne(_) => Operation::FetchOne,
            Self::Created(_) => Operation::Create,
            Self::Updated(_) => Operation::Update,
            Self::Deleted(_) => Operation::Delete,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action<R: Resource> {
    Request(Request<R>),
    Success(Outcome<R>),
    Failure { operation: Operation, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Request,
    Success,
    Failure,
}

impl<R: Resource> Action<R> {
    pub fn phase(&self) -> Phase {
        match self {
            Self::Request(_) => Phase::Request,
            Self::Success(_) => Phase::Success,
            Self::Failure { .. } => Phase::Failure,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for EntityState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

/// Applies one action to a slice state. Every terminal action clears `loading`.
pub fn reduce<R: Resource>(state: &mut EntityState<R::Record>, action: &Action<R>) {
    match action {
        Action::Request(_) => {
            state.loading = true;
            state.error = None;
        }
        Action::Success(outcome) => {
            state.loading = false;
            match outcome {
                Outcome::Fetched(records) | Outcome::Searched(records) => {
                    state.items = records.clone()
                }
                Outcome::FetchedOne(record) => {
                    match state.items.iter_mut().find(|item| item.id() == record.id()) {
                        Some(existing) => *existing = record.clone(),
                        None => state.items.push(record.clone()),
                    }
                }
                Outcome::Created(record) => state.items.push(record.clone()),
                Outcome::Updated(record) => {
                    for item in state.items.iter_mut().filter(|item| item.id() == record.id()) {
                        *item = record.clone();
                    }
                }
                Outcome::Deleted(id) => state.items.retain(|item| item.id() != *id),
            }
        }
        Action::Failure { message, .. } => {
            state.loading = false;
            state.error = Some(message.clone());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    pub entity: &'static str,
    pub operation: Operation,
    pub phase: Phase,
}

pub(crate) struct SliceInner<R: Resource> {
    pub(crate) state: EntityState<R::Record>,
    pub(crate) generations: Generations,
}

/// Single-writer state for one resource.
pub struct Slice<R: Resource> {
    pub(crate) inner: RwLock<SliceInner<R>>,
    events: broadcast::Sender<StoreEvent>,
}

impl<R: Resource> Slice<R> {
    pub fn new(events: broadcast::Sender<StoreEvent>) -> Self {
        Self {
            inner: RwLock::new(SliceInner {
                state: EntityState::default(),
                generations: Generations::default(),
            }),
            events,
        }
    }

    pub fn name(&self) -> &'static str {
        R::NAME
    }

    pub async fn snapshot(&self) -> EntityState<R::Record> {
        self.inner.read().await.state.clone()
    }

    /// Reduces an action straight into the slice, bypassing the effect workers.
    pub async fn dispatch(&self, action: Action<R>) {
        let mut guard = self.inner.write().await;
        self.apply_locked(&mut guard.state, &action);
    }

    pub(crate) fn apply_locked(&self, state: &mut EntityState<R::Record>, action: &Action<R>) {
        reduce(state, action);
        let operation = match action {
            Action::Request(request) => request.operation(),
            Action::Success(outcome) => outcome.operation(),
            Action::Failure { operation, .. } => *operation,
        };
        debug!(
            entity = R::NAME,
            operation = ?operation,
            phase = ?action.phase(),
            items = state.items.len(),
            "reduced action"
        );
        let _ = self.events.send(StoreEvent {
            entity: R::NAME,
            operation,
            phase: action.phase(),
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Employees;

impl Resource for Employees {
    const NAME: &'static str = "employees";
    const SINGULAR: &'static str = "employee";

    type Record = Employee;
    type Input = EmployeeInput;
    type Patch = EmployeePatch;
    type Condition = SearchCondition;
}

macro_rules! read_only_resource {
    ($marker:ident, $record:ty, $name:literal, $singular:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $marker;

        impl Resource for $marker {
            const NAME: &'static str = $name;
            const SINGULAR: &'static str = $singular;
            const READ_ONLY: bool = true;

            type Record = $record;
            type Input = Unsupported;
            type Patch = Unsupported;
            type Condition = Unsupported;
        }
    };
}

read_only_resource!(Posts, Post, "posts", "post");
read_only_resource!(Comments, Comment, "comments", "comment");
read_only_resource!(Albums, Album, "albums", "album");
read_only_resource!(Photos, Photo, "photos", "photo");
read_only_resource!(Todos, Todo, "todos", "todo");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySummary {
    pub entity: &'static str,
    pub items: usize,
    pub loading: bool,
    pub error: Option<String>,
}

impl EntitySummary {
    async fn of<R: Resource>(slice: &Slice<R>) -> Self {
        let guard = slice.inner.read().await;
        Self {
            entity: R::NAME,
            items: guard.state.items.len(),
            loading: guard.state.loading,
            error: guard.state.error.clone(),
        }
    }
}

/// Explicitly constructed application store; owned by the composition root.
pub struct Store {
    pub employees: Arc<Slice<Employees>>,
    pub posts: Arc<Slice<Posts>>,
    pub comments: Arc<Slice<Comments>>,
    pub albums: Arc<Slice<Albums>>,
    pub photos: Arc<Slice<Photos>>,
    pub todos: Arc<Slice<Todos>>,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(STORE_EVENT_CAPACITY);
        Self {
            employees: Arc::new(Slice::new(events.clone())),
            posts: Arc::new(Slice::new(events.clone())),
            comments: Arc::new(Slice::new(events.clone())),
            albums: Arc::new(Slice::new(events.clone())),
            photos: Arc::new(Slice::new(events.clone())),
            todos: Arc::new(Slice::new(events.clone())),
            events,
        }
    }

    pub fn entity_names() -> [&'static str; 6] {
        [
            Employees::NAME,
            Posts::NAME,
            Comments::NAME,
            Albums::NAME,
            Photos::NAME,
            Todos::NAME,
        ]
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub async fn summaries(&self) -> Vec<EntitySummary> {
        vec![
            EntitySummary::of(&self.employees).await,
            EntitySummary::of(&self.posts).await,
            EntitySummary::of(&self.comments).await,
            EntitySummary::of(&self.albums).await,
            EntitySummary::of(&self.photos).await,
            EntitySummary::of(&self.todos).await,
        ]
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
