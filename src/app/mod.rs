pub mod pagination;
pub mod result;
pub mod validation;

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use result::{AppResult, Failure};
use validation::Validator;

/// A command or query. Each request type is dispatched to exactly one handler.
pub trait Request: Send + Sync + 'static {
    type Response: Send + 'static;
}

#[async_trait]
pub trait Handler<R: Request>: Send + Sync {
    async fn handle(&self, request: R) -> AppResult<R::Response>;
}

/// The handler and validators registered for one request type.
pub struct Registration<R: Request> {
    handler: Arc<dyn Handler<R>>,
    validators: Vec<Arc<dyn Validator<R>>>,
}

impl<R: Request> Registration<R> {
    pub fn new(handler: impl Handler<R> + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
            validators: Vec::new(),
        }
    }

    /// Validators run in the order they are added.
    pub fn validate(mut self, validator: impl Validator<R> + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }
}

#[derive(Default)]
pub struct Mediator {
    registrations: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Mediator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the pipeline for `R`, replacing any previous registration.
    pub fn register<R: Request>(&mut self, registration: Registration<R>) {
        self.registrations
            .insert(TypeId::of::<R>(), Box::new(registration));
    }

    pub fn is_registered<R: Request>(&self) -> bool {
        self.registrations.contains_key(&TypeId::of::<R>())
    }

    /// Validation stage, then the handler.
    pub async fn send<R: Request>(&self, request: R) -> AppResult<R::Response> {
        let Some(registration) = self
            .registrations
            .get(&TypeId::of::<R>())
            .and_then(|r| r.downcast_ref::<Registration<R>>())
        else {
            return Err(Failure::Unexpected(format!(
                "No handler registered for {}",
                type_name::<R>()
            )));
        };

        tracing::debug!(request = type_name::<R>(), "Dispatching request");
        validation::run(&registration.validators, &request).await?;
        registration.handler.handle(request).await
    }
}
