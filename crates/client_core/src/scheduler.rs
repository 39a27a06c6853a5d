//! Effect scheduling with latest-wins semantics.
//!
//! Every dispatched request is stamped with a generation number for its
//! operation. A worker's outcome is applied only while its generation is still
//! the newest one issued for that operation; superseded outcomes are dropped
//! without touching the store. Issuing and checking happen under the slice
//! lock, so a stale result can never land after a newer request was reduced.

use std::{collections::HashMap, sync::Arc};

use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::{
    api::ResourceApi,
    error::ClientError,
    store::{Action, Outcome, Operation, Request, Resource, Slice},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub operation: Operation,
    pub generation: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Generations {
    latest: HashMap<Operation, u64>,
}

impl Generations {
    pub(crate) fn issue(&mut self, operation: Operation) -> Ticket {
        let generation = self.latest.entry(operation).or_insert(0);
        *generation += 1;
        Ticket {
            operation,
            generation: *generation,
        }
    }

    pub(crate) fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.get(&ticket.operation).copied() == Some(ticket.generation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Applied,
    /// A newer request of the same operation was issued before this one resolved.
    Discarded,
}

impl<R: Resource> Slice<R> {
    /// Reduces the request action and issues its ticket atomically.
    pub async fn begin(&self, request: &Request<R>) -> Ticket {
        let mut guard = self.inner.write().await;
        let ticket = guard.generations.issue(request.operation());
        self.apply_locked(&mut guard.state, &Action::Request(request.clone()));
        ticket
    }

    /// Applies a worker result if `ticket` is still the latest for its operation.
    pub async fn settle(
        &self,
        ticket: Ticket,
        result: Result<Outcome<R>, ClientError>,
    ) -> Settlement {
        let mut guard = self.inner.write().await;
        if !guard.generations.is_current(ticket) {
            debug!(
                entity = R::NAME,
                operation = %ticket.operation.label::<R>(),
                generation = ticket.generation,
                "discarding superseded worker result"
            );
            return Settlement::Discarded;
        }

        let action = match result {
            Ok(outcome) => Action::Success(outcome),
            Err(err) => {
                let message = err.failure_message(&R::fallback_message(ticket.operation));
                warn!(
                    entity = R::NAME,
                    operation = %ticket.operation.label::<R>(),
                    error = %message,
                    "request failed"
                );
                Action::Failure {
                    operation: ticket.operation,
                    message,
                }
            }
        };
        self.apply_locked(&mut guard.state, &action);
        Settlement::Applied
    }
}

/// Performs the network call for one request. Never retries.
async fn run_worker<R: Resource>(
    api: &dyn ResourceApi<R>,
    request: Request<R>,
) -> Result<Outcome<R>, ClientError> {
    match request {
        Request::FetchAll => api.fetch_all().await.map(Outcome::Fetched),
        Request::FetchOne(id) => api.fetch_one(id).await.map(Outcome::FetchedOne),
        Request::FetchByCondition(condition) => api
            .fetch_by_condition(condition)
            .await
            .map(Outcome::Searched),
        Request::Create(input) => api.create(input).await.map(Outcome::Created),
        Request::Update { id, patch } => api.update(id, patch).await.map(Outcome::Updated),
        Request::Delete(id) => {
            api.delete(id).await?;
            Ok(Outcome::Deleted(id))
        }
    }
}

pub struct WorkerHandle {
    ticket: Ticket,
    handle: JoinHandle<Settlement>,
}

impl WorkerHandle {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Waits for the worker to finish and reports whether its outcome reached the store.
    pub async fn settled(self) -> Settlement {
        match self.handle.await {
            Ok(settlement) => settlement,
            Err(err) => {
                error!(
                    operation = ?self.ticket.operation,
                    generation = self.ticket.generation,
                    "worker task aborted: {err}"
                );
                Settlement::Discarded
            }
        }
    }
}

/// Binds one slice to the API that serves it.
pub struct Effects<R: Resource> {
    slice: Arc<Slice<R>>,
    api: Arc<dyn ResourceApi<R>>,
}

impl<R: Resource> Clone for Effects<R> {
    fn clone(&self) -> Self {
        Self {
            slice: self.slice.clone(),
            api: self.api.clone(),
        }
    }
}

impl<R: Resource> Effects<R> {
    pub fn new(slice: Arc<Slice<R>>, api: Arc<dyn ResourceApi<R>>) -> Self {
        Self { slice, api }
    }

    pub fn slice(&self) -> &Arc<Slice<R>> {
        &self.slice
    }

    /// Reduces the request, then runs its worker on the runtime.
    pub async fn dispatch(&self, request: Request<R>) -> WorkerHandle {
        let ticket = self.slice.begin(&request).await;
        debug!(
            entity = R::NAME,
            operation = %ticket.operation.label::<R>(),
            generation = ticket.generation,
            "dispatched request"
        );

        let slice = self.slice.clone();
        let api = self.api.clone();
        let handle = tokio::spawn(async move {
            let result = run_worker(api.as_ref(), request).await;
            slice.settle(ticket, result).await
        });

        WorkerHandle { ticket, handle }
    }
}

#[cfg(test)]
#[path = "tests/scheduler_tests.rs"]
mod tests;
