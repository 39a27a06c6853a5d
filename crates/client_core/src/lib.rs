//! Request-lifecycle core of the employee admin console: entity store,
//! latest-wins effect workers, REST resource clients and list projections.

use std::sync::Arc;

use futures::future::join_all;
use reqwest::Client;
use shared::{
    form::validate_search_query,
    protocol::{ConditionField, SearchCondition},
};
use tracing::info;

pub mod address;
pub mod api;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod store;
pub mod view;

pub use api::{HttpResource, ResourceApi};
pub use config::{load_settings, Settings};
pub use error::ClientError;
pub use scheduler::{Effects, Settlement, Ticket, WorkerHandle};
pub use store::{
    Action, Albums, Comments, Employees, EntityState, EntitySummary, Operation, Outcome, Photos,
    Posts, Request, Resource, Slice, Store, StoreEvent, Todos,
};

/// One API handle per entity.
pub struct ConsoleApis {
    pub employees: Arc<dyn ResourceApi<Employees>>,
    pub posts: Arc<dyn ResourceApi<Posts>>,
    pub comments: Arc<dyn ResourceApi<Comments>>,
    pub albums: Arc<dyn ResourceApi<Albums>>,
    pub photos: Arc<dyn ResourceApi<Photos>>,
    pub todos: Arc<dyn ResourceApi<Todos>>,
}

impl ConsoleApis {
    pub fn http(http: &Client, settings: &Settings) -> Self {
        Self {
            employees: Arc::new(HttpResource::new(http.clone(), &settings.employee_api_url)),
            posts: Arc::new(HttpResource::under(http.clone(), &settings.demo_api_url)),
            comments: Arc::new(HttpResource::under(http.clone(), &settings.demo_api_url)),
            albums: Arc::new(HttpResource::under(http.clone(), &settings.demo_api_url)),
            photos: Arc::new(HttpResource::under(http.clone(), &settings.demo_api_url)),
            todos: Arc::new(HttpResource::under(http.clone(), &settings.demo_api_url)),
        }
    }
}

/// Composition root: owns the store and binds every slice to its workers.
pub struct AdminConsole {
    store: Arc<Store>,
    pub employees: Effects<Employees>,
    pub posts: Effects<Posts>,
    pub comments: Effects<Comments>,
    pub albums: Effects<Albums>,
    pub photos: Effects<Photos>,
    pub todos: Effects<Todos>,
}

impl AdminConsole {
    pub fn new(settings: &Settings) -> Self {
        info!(
            employee_api = %settings.employee_api_url,
            demo_api = %settings.demo_api_url,
            "starting admin console"
        );
        Self::from_parts(Store::new(), ConsoleApis::http(&Client::new(), settings))
    }

    pub fn from_parts(store: Store, apis: ConsoleApis) -> Self {
        let store = Arc::new(store);
        Self {
            employees: Effects::new(store.employees.clone(), apis.employees),
            posts: Effects::new(store.posts.clone(), apis.posts),
            comments: Effects::new(store.comments.clone(), apis.comments),
            albums: Effects::new(store.albums.clone(), apis.albums),
            photos: Effects::new(store.photos.clone(), apis.photos),
            todos: Effects::new(store.todos.clone(), apis.todos),
            store,
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Validates the query locally; a blank query is rejected before anything is dispatched.
    pub async fn search_employees(
        &self,
        field: ConditionField,
        raw_query: &str,
    ) -> Result<WorkerHandle, ClientError> {
        let value = validate_search_query(raw_query)?;
        Ok(self
            .employees
            .dispatch(Request::FetchByCondition(SearchCondition::new(field, value)))
            .await)
    }

    /// Fetches every read-only demo collection concurrently.
    pub async fn load_demo_collections(&self) -> Vec<Settlement> {
        let handles = vec![
            self.posts.dispatch(Request::FetchAll).await,
            self.comments.dispatch(Request::FetchAll).await,
            self.albums.dispatch(Request::FetchAll).await,
            self.photos.dispatch(Request::FetchAll).await,
            self.todos.dispatch(Request::FetchAll).await,
        ];
        join_all(handles.into_iter().map(WorkerHandle::settled)).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
