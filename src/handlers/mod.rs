//! Commands, queries, validators and handlers, one module per resource.
//!
//! Every module exposes a `register` function wiring its requests into the
//! mediator; `register_all` is what the application calls at startup.

pub mod attendances;
pub mod auth;
pub mod contracts;
pub mod departments;
pub mod employees;
pub mod positions;
pub mod roles;
pub mod salary_histories;
pub mod skills;
pub mod users;

use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::app::Mediator;
use crate::config::JwtConfig;
use crate::db::ReadStore;

pub fn register_all(
    mediator: &mut Mediator,
    pool: &PgPool,
    store: Arc<dyn ReadStore>,
    jwt: &JwtConfig,
) {
    departments::register(mediator, pool, &store);
    positions::register(mediator, pool, &store);
    employees::register(mediator, pool, &store);
    contracts::register(mediator, pool, &store);
    attendances::register(mediator, pool, &store);
    salary_histories::register(mediator, pool, &store);
    skills::register(mediator, pool, &store);
    users::register(mediator, pool, &store);
    roles::register(mediator, pool, &store);
    auth::register(mediator, pool, &store, jwt);
}

/// Money is stored as numeric(18, 2); keep the same scale in responses.
pub(crate) fn money(mut value: Decimal) -> Decimal {
    value.rescale(2);
    value
}
