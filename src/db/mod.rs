pub mod entity;
pub mod repository;
pub mod store;
pub mod uow;

pub mod attendances;
pub mod contracts;
pub mod departments;
pub mod employees;
pub mod positions;
pub mod roles;
pub mod salary_histories;
pub mod skills;
pub mod user_tokens;
pub mod users;

pub use entity::Entity;
pub use repository::Repository;
pub use store::{PgReadStore, ReadStore, Reference, Unique};
pub use uow::UnitOfWork;
