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

use axum::Router;
use axum::routing::{get, post};

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))
        // Departments
        .route(
            "/api/v1/departments",
            get(departments::list).post(departments::create),
        )
        .route(
            "/api/v1/departments/{id}",
            get(departments::get)
                .put(departments::update)
                .delete(departments::delete),
        )
        // Positions
        .route("/api/v1/positions", get(positions::list).post(positions::create))
        .route(
            "/api/v1/positions/{id}",
            get(positions::get)
                .put(positions::update)
                .delete(positions::delete),
        )
        // Employees
        .route("/api/v1/employees", get(employees::list).post(employees::create))
        .route(
            "/api/v1/employees/{id}",
            get(employees::get)
                .put(employees::update)
                .delete(employees::delete),
        )
        // Contracts
        .route("/api/v1/contracts", get(contracts::list).post(contracts::create))
        .route(
            "/api/v1/contracts/{id}",
            get(contracts::get)
                .put(contracts::update)
                .delete(contracts::delete),
        )
        // Attendances
        .route("/api/v1/attendances", get(attendances::list))
        .route("/api/v1/attendances/check-in", post(attendances::check_in))
        .route(
            "/api/v1/attendances/{id}",
            get(attendances::get)
                .put(attendances::update)
                .delete(attendances::delete),
        )
        .route("/api/v1/attendances/{id}/check-out", post(attendances::check_out))
        .route("/api/v1/attendances/{id}/work-hours", get(attendances::work_hours))
        // Salary histories
        .route(
            "/api/v1/salary-histories",
            get(salary_histories::list).post(salary_histories::create),
        )
        .route(
            "/api/v1/salary-histories/{id}",
            get(salary_histories::get)
                .put(salary_histories::update)
                .delete(salary_histories::delete),
        )
        // Skills
        .route("/api/v1/skills", get(skills::list).post(skills::create))
        .route(
            "/api/v1/skills/{id}",
            get(skills::get).put(skills::update).delete(skills::delete),
        )
        // Users
        .route("/api/v1/users", get(users::list).post(users::create))
        .route(
            "/api/v1/users/{id}",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route("/api/v1/users/{id}/reset-password", post(users::reset_password))
        .route(
            "/api/v1/users/{id}/roles/{role_id}",
            post(users::assign_role).delete(users::remove_role),
        )
        // Roles
        .route("/api/v1/roles", get(roles::list).post(roles::create))
        .route(
            "/api/v1/roles/{id}",
            get(roles::get).put(roles::update).delete(roles::delete),
        )
}
