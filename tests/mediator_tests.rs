use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use workforce::app::result::{AppResult, Failure};
use workforce::app::validation::{Validator, Violation};
use workforce::app::{Handler, Mediator, Registration, Request};

#[derive(Debug)]
struct Greet {
    name: String,
}

impl Request for Greet {
    type Response = String;
}

#[derive(Debug)]
struct Unregistered;

impl Request for Unregistered {
    type Response = ();
}

#[derive(Clone, Default)]
struct GreetHandler {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Handler<Greet> for GreetHandler {
    async fn handle(&self, request: Greet) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("Hello, {}", request.name))
    }
}

struct NameRequired;

#[async_trait]
impl Validator<Greet> for NameRequired {
    async fn validate(&self, request: &Greet) -> AppResult<Vec<Violation>> {
        if request.name.is_empty() {
            Ok(vec![Violation::new("name", "Name is required.")])
        } else {
            Ok(vec![])
        }
    }
}

struct NotAdmin;

#[async_trait]
impl Validator<Greet> for NotAdmin {
    async fn validate(&self, request: &Greet) -> AppResult<Vec<Violation>> {
        if request.name.is_empty() || request.name == "admin" {
            Ok(vec![Violation::new("name", "Name must not be admin.")])
        } else {
            Ok(vec![])
        }
    }
}

struct Broken;

#[async_trait]
impl Validator<Greet> for Broken {
    async fn validate(&self, _request: &Greet) -> AppResult<Vec<Violation>> {
        Err(Failure::Unexpected("store offline".to_string()))
    }
}

fn greet(name: &str) -> Greet {
    Greet {
        name: name.to_string(),
    }
}

#[tokio::test]
async fn dispatches_to_registered_handler() {
    let handler = GreetHandler::default();
    let mut mediator = Mediator::new();
    mediator.register(Registration::<Greet>::new(handler.clone()).validate(NameRequired));

    assert!(mediator.is_registered::<Greet>());
    let reply = mediator.send(greet("Lan")).await.unwrap();
    assert_eq!(reply, "Hello, Lan");
    assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unregistered_request_is_unexpected() {
    let mediator = Mediator::new();

    assert!(!mediator.is_registered::<Unregistered>());
    let err = mediator.send(Unregistered).await.unwrap_err();
    assert!(matches!(err, Failure::Unexpected(msg) if msg.contains("No handler registered")));
}

#[tokio::test]
async fn violations_from_every_validator_are_joined_in_order() {
    let handler = GreetHandler::default();
    let mut mediator = Mediator::new();
    mediator.register(
        Registration::<Greet>::new(handler.clone())
            .validate(NameRequired)
            .validate(NotAdmin),
    );

    let err = mediator.send(greet("")).await.unwrap_err();
    let Failure::Validation(violations) = &err else {
        panic!("expected a validation failure, got {err:?}");
    };
    assert_eq!(violations.len(), 2);
    assert_eq!(err.to_string(), "Name is required.; Name must not be admin.");
    assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn handler_not_called_when_validation_fails() {
    let handler = GreetHandler::default();
    let mut mediator = Mediator::new();
    mediator.register(Registration::<Greet>::new(handler.clone()).validate(NotAdmin));

    let err = mediator.send(greet("admin")).await.unwrap_err();
    assert_eq!(err.to_string(), "Name must not be admin.");
    assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn validator_errors_propagate_unchanged() {
    let handler = GreetHandler::default();
    let mut mediator = Mediator::new();
    mediator.register(Registration::<Greet>::new(handler.clone()).validate(Broken));

    let err = mediator.send(greet("Lan")).await.unwrap_err();
    assert_eq!(err, Failure::Unexpected("store offline".to_string()));
    assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn registering_again_replaces_pipeline() {
    let first = GreetHandler::default();
    let second = GreetHandler::default();
    let mut mediator = Mediator::new();
    mediator.register(Registration::<Greet>::new(first.clone()).validate(NotAdmin));
    mediator.register(Registration::<Greet>::new(second.clone()));

    // The replacement has no validators.
    mediator.send(greet("admin")).await.unwrap();
    assert_eq!(first.calls.load(Ordering::SeqCst), 0);
    assert_eq!(second.calls.load(Ordering::SeqCst), 1);
}
