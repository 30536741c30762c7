//! # Mock Framework
//!
//! Utilities for testing actors against collaborators without spawning the real ones.
//!
//! ## Patterns
//!
//! 1. **Fluent expectations** ([`MockClient`]): queue the requests you expect and the
//!    responses to give. The mock answers in order and [`MockClient::verify`] fails the
//!    test if anything was left over or arrived out of order.
//! 2. **Raw receiver** ([`create_mock_client`]): take the receiving end of the mailbox
//!    yourself and answer each request by hand with [`expect_get`] / [`expect_action`] /
//!    [`expect_tell`]. Useful when the test needs to hold a reply back.
//!
//! ```ignore
//! let mut users = MockClient::<User>::new();
//! users.expect_get(author_id).return_ok(Some(author));
//! users.expect_tell(author_id);
//!
//! let client = UserClient::new(users.client());
//! // drive the actor under test...
//! users.verify_within(Duration::from_secs(1)).await;
//! ```

use crate::framework::{ActorEntity, FrameworkError, ResourceClient, ResourceRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

enum Expectation<T: ActorEntity> {
    Get {
        id: T::Id,
        response: Result<Option<T>, FrameworkError>,
    },
    Create {
        response: Result<T::Id, FrameworkError>,
    },
    Action {
        id: T::Id,
        response: Result<T::ActionResult, FrameworkError>,
    },
    Tell {
        id: T::Id,
    },
    List {
        response: Result<Vec<T>, FrameworkError>,
    },
    Count {
        response: Result<usize, FrameworkError>,
    },
}

struct MockState<T: ActorEntity> {
    expectations: VecDeque<Expectation<T>>,
    received_tells: Vec<(T::Id, T::Action)>,
    failures: Vec<String>,
}

type Shared<T> = Arc<Mutex<MockState<T>>>;

// A panicking test thread poisons the lock; the state is still readable.
fn lock<T: ActorEntity>(state: &Shared<T>) -> MutexGuard<'_, MockState<T>> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A mock client with expectation tracking for fluent testing.
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    state: Shared<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let state: Shared<T> = Arc::new(Mutex::new(MockState {
            expectations: VecDeque::new(),
            received_tells: Vec::new(),
            failures: Vec::new(),
        }));
        let task_state = state.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let mut guard = lock(&task_state);
                let expectation = guard.expectations.pop_front();

                // Dropping a `respond_to` without answering surfaces as ActorDropped in the caller.
                match (request, expectation) {
                    (ResourceRequest::Get { id, respond_to }, Some(Expectation::Get { id: want, response })) => {
                        if id != want {
                            guard.failures.push(format!("get: expected id {want}, got {id}"));
                            continue;
                        }
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::Create { respond_to, .. }, Some(Expectation::Create { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Action { id, respond_to, .. },
                        Some(Expectation::Action { id: want, response }),
                    ) => {
                        if id != want {
                            guard.failures.push(format!("action: expected id {want}, got {id}"));
                            continue;
                        }
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::Tell { id, action }, Some(Expectation::Tell { id: want })) => {
                        if id != want {
                            guard.failures.push(format!("tell: expected id {want}, got {id}"));
                        }
                        guard.received_tells.push((id, action));
                    }
                    (ResourceRequest::List { respond_to }, Some(Expectation::List { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::Count { respond_to }, Some(Expectation::Count { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (request, _) => {
                        guard
                            .failures
                            .push(format!("unexpected request: {}", describe(&request)));
                    }
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            state,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    /// Expects a `get` operation.
    pub fn expect_get(&mut self, id: T::Id) -> GetExpectationBuilder<T> {
        GetExpectationBuilder {
            id,
            state: self.state.clone(),
        }
    }

    /// Expects a `create` operation.
    pub fn expect_create(&mut self) -> CreateExpectationBuilder<T> {
        CreateExpectationBuilder {
            state: self.state.clone(),
        }
    }

    /// Expects an `action` operation.
    pub fn expect_action(&mut self, id: T::Id) -> ActionExpectationBuilder<T> {
        ActionExpectationBuilder {
            id,
            state: self.state.clone(),
        }
    }

    /// Expects a `list` operation answered with `items`.
    pub fn expect_list(&mut self, items: Vec<T>) {
        lock(&self.state).expectations.push_back(Expectation::List {
            response: Ok(items),
        });
    }

    /// Expects a `count` operation answered with `count`.
    pub fn expect_count(&mut self, count: usize) {
        lock(&self.state).expectations.push_back(Expectation::Count {
            response: Ok(count),
        });
    }

    /// Expects a fire-and-forget action. The action is recorded; see [`MockClient::tells`].
    pub fn expect_tell(&mut self, id: T::Id) {
        lock(&self.state)
            .expectations
            .push_back(Expectation::Tell { id });
    }

    /// Takes the fire-and-forget actions received so far.
    pub fn tells(&self) -> Vec<(T::Id, T::Action)> {
        std::mem::take(&mut lock(&self.state).received_tells)
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let guard = lock(&self.state);
        if !guard.failures.is_empty() {
            panic!("Mock received bad requests: {:?}", guard.failures);
        }
        if !guard.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                guard.expectations.len()
            );
        }
    }

    /// Like [`MockClient::verify`], but gives fire-and-forget messages time to arrive.
    pub async fn verify_within(&self, within: Duration) {
        let deadline = tokio::time::Instant::now() + within;
        while tokio::time::Instant::now() < deadline {
            if lock(&self.state).expectations.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.verify();
    }
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn describe<T: ActorEntity>(request: &ResourceRequest<T>) -> String {
    match request {
        ResourceRequest::Create { params, .. } => format!("create {params:?}"),
        ResourceRequest::Get { id, .. } => format!("get {id}"),
        ResourceRequest::Update { id, update, .. } => format!("update {id} {update:?}"),
        ResourceRequest::Delete { id, .. } => format!("delete {id}"),
        ResourceRequest::Action { id, action, .. } => format!("action {id} {action:?}"),
        ResourceRequest::Tell { id, action } => format!("tell {id} {action:?}"),
        ResourceRequest::List { .. } => "list".to_string(),
        ResourceRequest::Count { .. } => "count".to_string(),
    }
}

/// Builder for `get` expectations.
pub struct GetExpectationBuilder<T: ActorEntity> {
    id: T::Id,
    state: Shared<T>,
}

impl<T: ActorEntity> GetExpectationBuilder<T> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: Option<T>) {
        lock(&self.state).expectations.push_back(Expectation::Get {
            id: self.id,
            response: Ok(value),
        });
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: FrameworkError) {
        lock(&self.state).expectations.push_back(Expectation::Get {
            id: self.id,
            response: Err(error),
        });
    }
}

/// Builder for `create` expectations.
pub struct CreateExpectationBuilder<T: ActorEntity> {
    state: Shared<T>,
}

impl<T: ActorEntity> CreateExpectationBuilder<T> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, id: T::Id) {
        lock(&self.state)
            .expectations
            .push_back(Expectation::Create { response: Ok(id) });
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: FrameworkError) {
        lock(&self.state)
            .expectations
            .push_back(Expectation::Create {
                response: Err(error),
            });
    }
}

/// Builder for `action` expectations.
pub struct ActionExpectationBuilder<T: ActorEntity> {
    id: T::Id,
    state: Shared<T>,
}

impl<T: ActorEntity> ActionExpectationBuilder<T> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, result: T::ActionResult) {
        lock(&self.state).expectations.push_back(Expectation::Action {
            id: self.id,
            response: Ok(result),
        });
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: FrameworkError) {
        lock(&self.state).expectations.push_back(Expectation::Action {
            id: self.id,
            response: Err(error),
        });
    }
}

// =============================================================================
// RAW RECEIVER HELPERS
// =============================================================================

/// Creates a client together with the receiving end of its mailbox.
///
/// Nothing answers requests on its own: the test pulls them off `receiver` and replies,
/// which makes delays and dropped replies easy to simulate.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, oneshot::Sender<Result<Option<T>, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    T::Id,
    T::Action,
    oneshot::Sender<Result<T::ActionResult, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a fire-and-forget Tell
pub async fn expect_tell<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action)> {
    match receiver.recv().await {
        Some(ResourceRequest::Tell { id, action }) => Some((id, action)),
        _ => None,
    }
}
