use super::*;

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use shared::{
    domain::{Employee, EmployeeId},
    protocol::{ConditionField, EmployeeInput, EmployeePatch, SearchCondition},
};
use tokio::sync::{broadcast, oneshot};

use crate::store::Employees;

fn employee(id: i64, name: &str) -> Employee {
    Employee::new(EmployeeId(id), format!("EMP-{id:03}"), name)
}

/// Fake backend. Conditional searches block until the test releases the gate
/// registered under the search value.
#[derive(Default)]
struct FakeApi {
    listing: Mutex<Option<Result<Vec<Employee>, ClientError>>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<Vec<Employee>>>>,
}

impl FakeApi {
    fn listing(result: Result<Vec<Employee>, ClientError>) -> Self {
        Self {
            listing: Mutex::new(Some(result)),
            ..Self::default()
        }
    }

    fn gate(&self, value: &str) -> oneshot::Sender<Vec<Employee>> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .expect("gates lock")
            .insert(value.to_string(), rx);
        tx
    }
}

#[async_trait]
impl ResourceApi<Employees> for FakeApi {
    async fn fetch_all(&self) -> Result<Vec<Employee>, ClientError> {
        self.listing
            .lock()
            .expect("listing lock")
            .clone()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_one(&self, id: EmployeeId) -> Result<Employee, ClientError> {
        Err(ClientError::status(404, format!("Employee {id} not found")))
    }

    async fn fetch_by_condition(
        &self,
        condition: SearchCondition,
    ) -> Result<Vec<Employee>, ClientError> {
        let gate = self
            .gates
            .lock()
            .expect("gates lock")
            .remove(&condition.value)
            .expect("gate registered for search value");
        gate.await
            .map_err(|_| ClientError::Transport("gate dropped".into()))
    }

    async fn create(&self, input: EmployeeInput) -> Result<Employee, ClientError> {
        Ok(Employee::new(EmployeeId(3), input.employee_id, input.name))
    }

    async fn update(&self, id: EmployeeId, patch: EmployeePatch) -> Result<Employee, ClientError> {
        let mut updated = employee(id.0, patch.name.as_deref().unwrap_or("unchanged"));
        updated.department = patch.department;
        Ok(updated)
    }

    async fn delete(&self, _id: EmployeeId) -> Result<(), ClientError> {
        Ok(())
    }
}

fn effects(api: Arc<FakeApi>) -> Effects<Employees> {
    let (events, _) = broadcast::channel(16);
    Effects::new(Arc::new(Slice::new(events)), api)
}

fn search(value: &str) -> Request<Employees> {
    Request::FetchByCondition(SearchCondition::new(ConditionField::Name, value))
}

#[test]
fn generations_are_tracked_per_operation() {
    let mut generations = Generations::default();
    let first = generations.issue(Operation::FetchAll);
    let other = generations.issue(Operation::Create);
    assert!(generations.is_current(first));
    assert!(generations.is_current(other));

    let second = generations.issue(Operation::FetchAll);
    assert!(!generations.is_current(first));
    assert!(generations.is_current(second));
    assert!(generations.is_current(other));
    assert_eq!(second.generation, first.generation + 1);
}

#[tokio::test]
async fn newer_search_supersedes_older_one_resolving_late() {
    let api = Arc::new(FakeApi::default());
    let release_first = api.gate("kim");
    let release_second = api.gate("lee");
    let effects = effects(api.clone());

    let first = effects.dispatch(search("kim")).await;
    let second = effects.dispatch(search("lee")).await;
    assert!(effects.slice().snapshot().await.loading);

    release_second
        .send(vec![employee(2, "Lee")])
        .expect("second worker waiting");
    assert_eq!(second.settled().await, Settlement::Applied);

    release_first
        .send(vec![employee(1, "Kim")])
        .expect("first worker waiting");
    assert_eq!(first.settled().await, Settlement::Discarded);

    let state = effects.slice().snapshot().await;
    assert_eq!(state.items, vec![employee(2, "Lee")]);
    assert!(!state.loading);
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn older_result_landing_first_is_still_dropped() {
    let api = Arc::new(FakeApi::default());
    let release_first = api.gate("kim");
    let release_second = api.gate("lee");
    let effects = effects(api.clone());

    let first = effects.dispatch(search("kim")).await;
    let second = effects.dispatch(search("lee")).await;

    release_first
        .send(vec![employee(1, "Kim")])
        .expect("first worker waiting");
    assert_eq!(first.settled().await, Settlement::Discarded);
    assert!(effects.slice().snapshot().await.items.is_empty());

    release_second
        .send(vec![employee(2, "Lee")])
        .expect("second worker waiting");
    assert_eq!(second.settled().await, Settlement::Applied);
    assert_eq!(
        effects.slice().snapshot().await.items,
        vec![employee(2, "Lee")]
    );
}

#[tokio::test]
async fn sequential_requests_each_apply() {
    let api = Arc::new(FakeApi::listing(Ok(vec![employee(1, "Kim")])));
    let effects = effects(api);

    let first = effects.dispatch(Request::FetchAll).await;
    assert_eq!(first.settled().await, Settlement::Applied);
    let second = effects.dispatch(Request::FetchAll).await;
    assert_eq!(second.ticket().generation, 2);
    assert_eq!(second.settled().await, Settlement::Applied);
}

#[tokio::test]
async fn different_operations_do_not_cancel_each_other() {
    let api = Arc::new(FakeApi::listing(Ok(vec![employee(1, "Kim")])));
    let release = api.gate("park");
    let effects = effects(api.clone());

    let searching = effects.dispatch(search("park")).await;
    let creating = effects
        .dispatch(Request::Create(EmployeeInput {
            employee_id: "EMP-003".into(),
            name: "Park".into(),
            ..EmployeeInput::default()
        }))
        .await;
    assert_eq!(creating.settled().await, Settlement::Applied);

    release
        .send(vec![employee(3, "Park")])
        .expect("search worker waiting");
    assert_eq!(searching.settled().await, Settlement::Applied);
}

#[tokio::test]
async fn transport_failure_is_recorded_on_the_slice() {
    let api = Arc::new(FakeApi::listing(Err(ClientError::Transport(
        "Network Error".into(),
    ))));
    let effects = effects(api);

    let handle = effects.dispatch(Request::FetchAll).await;
    assert_eq!(handle.settled().await, Settlement::Applied);

    let state = effects.slice().snapshot().await;
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("Network Error"));
    assert!(state.items.is_empty());
}

#[tokio::test]
async fn blank_failure_falls_back_to_operation_message() {
    let api = Arc::new(FakeApi::listing(Err(ClientError::status(500, ""))));
    let effects = effects(api);

    effects.dispatch(Request::FetchAll).await.settled().await;
    assert_eq!(
        effects.slice().snapshot().await.error.as_deref(),
        Some("Failed to load employees")
    );
}

#[tokio::test]
async fn create_appends_server_record() {
    let effects = effects(Arc::new(FakeApi::default()));
    effects
        .slice()
        .dispatch(Action::Success(Outcome::Fetched(vec![
            employee(1, "Kim"),
            employee(2, "Lee"),
        ])))
        .await;

    let handle = effects
        .dispatch(Request::Create(EmployeeInput {
            employee_id: "EMP-003".into(),
            name: "Park".into(),
            ..EmployeeInput::default()
        }))
        .await;
    assert_eq!(handle.ticket().operation, Operation::Create);
    assert_eq!(handle.settled().await, Settlement::Applied);

    let state = effects.slice().snapshot().await;
    assert_eq!(state.items.len(), 3);
    assert_eq!(state.items[2].id, EmployeeId(3));
    assert_eq!(state.items[2].name, "Park");
}

#[tokio::test]
async fn update_and_delete_flow_through_workers() {
    let effects = effects(Arc::new(FakeApi::default()));
    effects
        .slice()
        .dispatch(Action::Success(Outcome::Fetched(vec![
            employee(1, "Kim"),
            employee(2, "Lee"),
        ])))
        .await;

    effects
        .dispatch(Request::Update {
            id: EmployeeId(2),
            patch: EmployeePatch {
                name: Some("Lee".into()),
                department: Some("Finance".into()),
                ..EmployeePatch::default()
            },
        })
        .await
        .settled()
        .await;
    effects
        .dispatch(Request::Delete(EmployeeId(1)))
        .await
        .settled()
        .await;

    let state = effects.slice().snapshot().await;
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.items[0].id, EmployeeId(2));
    assert_eq!(state.items[0].department.as_deref(), Some("Finance"));
}

#[tokio::test]
async fn not_found_message_comes_from_the_server() {
    let effects = effects(Arc::new(FakeApi::default()));
    effects
        .dispatch(Request::FetchOne(EmployeeId(9)))
        .await
        .settled()
        .await;
    assert_eq!(
        effects.slice().snapshot().await.error.as_deref(),
        Some("Employee 9 not found")
    );
}
