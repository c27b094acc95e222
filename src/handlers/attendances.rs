use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::app::pagination::{PageRequest, Paged};
use crate::app::result::{AppResult, Failure};
use crate::app::validation::{PageValidator, Paginated, Rules, Validator, Violation};
use crate::app::{Handler, Mediator, Registration, Request};
use crate::db::{self, ReadStore, Reference, Unique, UnitOfWork};
use crate::models::{ATTENDANCE_STATUSES, Attendance, WorkHours};

const OPEN_ATTENDANCE: &str = "Employee already has an attendance record without check-out.";

fn present() -> String {
    "Present".to_string()
}

/// Opens an attendance record. `check_in` defaults to now.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckIn {
    pub employee_id: Uuid,
    pub check_in: Option<DateTime<Utc>>,
    #[serde(default = "present")]
    pub status: String,
    pub notes: Option<String>,
}

impl Request for CheckIn {
    type Response = Attendance;
}

/// Closes an open attendance record. `check_out` defaults to now.
#[derive(Debug, Clone)]
pub struct CheckOut {
    pub id: Uuid,
    pub check_out: Option<DateTime<Utc>>,
}

impl Request for CheckOut {
    type Response = Attendance;
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceInput {
    pub employee_id: Uuid,
    pub check_in: DateTime<Utc>,
    pub check_out: Option<DateTime<Utc>>,
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateAttendance {
    pub id: Uuid,
    pub input: AttendanceInput,
}

impl Request for UpdateAttendance {
    type Response = Attendance;
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteAttendance {
    pub id: Uuid,
}

impl Request for DeleteAttendance {
    type Response = ();
}

#[derive(Debug, Clone, Copy)]
pub struct GetAttendance {
    pub id: Uuid,
}

impl Request for GetAttendance {
    type Response = Attendance;
}

#[derive(Debug, Clone, Default)]
pub struct ListAttendances {
    pub filter: db::attendances::ListFilter,
    pub page: PageRequest,
}

impl Request for ListAttendances {
    type Response = Paged<Attendance>;
}

impl Paginated for ListAttendances {
    fn page(&self) -> &PageRequest {
        &self.page
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetWorkHours {
    pub id: Uuid,
}

impl Request for GetWorkHours {
    type Response = WorkHours;
}

pub struct CheckInValidator {
    store: Arc<dyn ReadStore>,
}

impl CheckInValidator {
    pub fn new(store: Arc<dyn ReadStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Validator<CheckIn> for CheckInValidator {
    async fn validate(&self, request: &CheckIn) -> AppResult<Vec<Violation>> {
        let mut rules = Rules::new();

        if rules.check(
            self.store.exists(Reference::Employee, request.employee_id).await?,
            "employee_id",
            "Employee does not exist.",
        ) {
            let open = Unique::OpenAttendance {
                employee_id: request.employee_id,
            };
            rules.check(
                !self.store.is_taken(&open, None).await?,
                "employee_id",
                OPEN_ATTENDANCE,
            );
        }
        rules.one_of("status", &request.status, ATTENDANCE_STATUSES, "Status");
        rules.optional_text("notes", request.notes.as_deref(), 500, "Notes");

        Ok(rules.into_violations())
    }
}

pub struct UpdateAttendanceValidator {
    store: Arc<dyn ReadStore>,
}

impl UpdateAttendanceValidator {
    pub fn new(store: Arc<dyn ReadStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Validator<UpdateAttendance> for UpdateAttendanceValidator {
    async fn validate(&self, request: &UpdateAttendance) -> AppResult<Vec<Violation>> {
        let input = &request.input;
        let mut rules = Rules::new();

        if rules.check(
            self.store.exists(Reference::Employee, input.employee_id).await?,
            "employee_id",
            "Employee does not exist.",
        ) && input.check_out.is_none()
        {
            let open = Unique::OpenAttendance {
                employee_id: input.employee_id,
            };
            rules.check(
                !self.store.is_taken(&open, Some(request.id)).await?,
                "check_out",
                OPEN_ATTENDANCE,
            );
        }
        if let Some(check_out) = input.check_out {
            rules.check(
                check_out >= input.check_in,
                "check_out",
                "Check-out must not be before check-in.",
            );
        }
        rules.one_of("status", &input.status, ATTENDANCE_STATUSES, "Status");
        rules.optional_text("notes", input.notes.as_deref(), 500, "Notes");

        Ok(rules.into_violations())
    }
}

pub struct ListAttendancesValidator;

#[async_trait]
impl Validator<ListAttendances> for ListAttendancesValidator {
    async fn validate(&self, request: &ListAttendances) -> AppResult<Vec<Violation>> {
        let mut rules = Rules::new();
        if let (Some(from), Some(to)) = (request.filter.from, request.filter.to) {
            rules.check(from <= to, "from", "The start of the range must not be after its end.");
        }
        Ok(rules.into_violations())
    }
}

#[derive(Clone)]
pub struct AttendanceHandlers {
    pool: PgPool,
}

impl AttendanceHandlers {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Handler<CheckIn> for AttendanceHandlers {
    async fn handle(&self, request: CheckIn) -> AppResult<Attendance> {
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let now = Utc::now();
                let attendance = Attendance {
                    id: Uuid::now_v7(),
                    employee_id: request.employee_id,
                    check_in: request.check_in.unwrap_or(now),
                    check_out: None,
                    status: request.status,
                    notes: request.notes,
                    created_at: now,
                    updated_at: now,
                };
                uow.repository::<Attendance>().add(attendance.clone());
                Ok(attendance)
            })
            .await
    }
}

#[async_trait]
impl Handler<CheckOut> for AttendanceHandlers {
    async fn handle(&self, request: CheckOut) -> AppResult<Attendance> {
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let attendances = uow.repository::<Attendance>();
                let mut attendance = attendances
                    .find(request.id)
                    .await?
                    .ok_or_else(|| Failure::not_found("Attendance"))?;

                if attendance.check_out.is_some() {
                    return Err(Failure::invalid("check_out", "Attendance is already checked out."));
                }

                let now = Utc::now();
                let check_out = request.check_out.unwrap_or(now);
                if check_out < attendance.check_in {
                    return Err(Failure::invalid(
                        "check_out",
                        "Check-out must not be before check-in.",
                    ));
                }

                attendance.check_out = Some(check_out);
                attendance.updated_at = now;
                attendances.update(attendance.clone());
                Ok(attendance)
            })
            .await
    }
}

#[async_trait]
impl Handler<UpdateAttendance> for AttendanceHandlers {
    async fn handle(&self, request: UpdateAttendance) -> AppResult<Attendance> {
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let attendances = uow.repository::<Attendance>();
                let mut attendance = attendances
                    .find(request.id)
                    .await?
                    .ok_or_else(|| Failure::not_found("Attendance"))?;

                let input = request.input;
                attendance.employee_id = input.employee_id;
                attendance.check_in = input.check_in;
                attendance.check_out = input.check_out;
                attendance.status = input.status;
                attendance.notes = input.notes;
                attendance.updated_at = Utc::now();

                attendances.update(attendance.clone());
                Ok(attendance)
            })
            .await
    }
}

#[async_trait]
impl Handler<DeleteAttendance> for AttendanceHandlers {
    async fn handle(&self, request: DeleteAttendance) -> AppResult<()> {
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let attendances = uow.repository::<Attendance>();
                let attendance = attendances
                    .find(request.id)
                    .await?
                    .ok_or_else(|| Failure::not_found("Attendance"))?;
                attendances.delete(&attendance);
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl Handler<GetAttendance> for AttendanceHandlers {
    async fn handle(&self, request: GetAttendance) -> AppResult<Attendance> {
        UnitOfWork::new(self.pool.clone())
            .repository::<Attendance>()
            .find(request.id)
            .await?
            .ok_or_else(|| Failure::not_found("Attendance"))
    }
}

#[async_trait]
impl Handler<ListAttendances> for AttendanceHandlers {
    async fn handle(&self, request: ListAttendances) -> AppResult<Paged<Attendance>> {
        let (items, total) =
            db::attendances::list(&self.pool, &request.filter, &request.page).await?;
        Ok(Paged::new(items, total, &request.page))
    }
}

#[async_trait]
impl Handler<GetWorkHours> for AttendanceHandlers {
    async fn handle(&self, request: GetWorkHours) -> AppResult<WorkHours> {
        let attendance = UnitOfWork::new(self.pool.clone())
            .repository::<Attendance>()
            .find(request.id)
            .await?
            .ok_or_else(|| Failure::not_found("Attendance"))?;

        let hours = attendance.work_hours().ok_or_else(|| {
            Failure::invalid(
                "check_out",
                "Work hours cannot be computed before check-out.",
            )
        })?;

        Ok(WorkHours {
            attendance_id: attendance.id,
            hours,
        })
    }
}

pub fn register(mediator: &mut Mediator, pool: &PgPool, store: &Arc<dyn ReadStore>) {
    let handlers = AttendanceHandlers::new(pool.clone());

    mediator.register(
        Registration::<CheckIn>::new(handlers.clone()).validate(CheckInValidator::new(store.clone())),
    );
    mediator.register(Registration::<CheckOut>::new(handlers.clone()));
    mediator.register(
        Registration::<UpdateAttendance>::new(handlers.clone())
            .validate(UpdateAttendanceValidator::new(store.clone())),
    );
    mediator.register(Registration::<DeleteAttendance>::new(handlers.clone()));
    mediator.register(Registration::<GetAttendance>::new(handlers.clone()));
    mediator.register(Registration::<GetWorkHours>::new(handlers.clone()));
    mediator.register(
        Registration::<ListAttendances>::new(handlers)
            .validate(PageValidator::new())
            .validate(ListAttendancesValidator),
    );
}
