use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;
use workforce::app::pagination::{MAX_PAGE, PageRequest};
use workforce::app::result::{AppResult, Failure};
use workforce::app::validation::{self, PageValidator, Rules, Validator, Violation, max_money};
use workforce::db::{ReadStore, Reference, Unique};
use workforce::handlers::attendances::{CheckIn, CheckInValidator};
use workforce::handlers::departments::{
    CreateDepartment, DepartmentInput, DepartmentValidator, ListDepartments, UpdateDepartment,
};
use workforce::handlers::employees::{CreateEmployee, EmployeeInput, EmployeeValidator};
use workforce::handlers::skills::{CreateSkill, SkillInput, SkillValidator};

/// In-memory stand-in for the database read side.
#[derive(Default)]
struct FakeStore {
    existing: HashSet<(Reference, Uuid)>,
    /// Held values, with the id of the row holding them.
    taken: Vec<(Unique, Uuid)>,
}

impl FakeStore {
    fn with(mut self, reference: Reference, id: Uuid) -> Self {
        self.existing.insert((reference, id));
        self
    }

    fn holding(mut self, unique: Unique, owner: Uuid) -> Self {
        self.taken.push((unique, owner));
        self
    }

    fn shared(self) -> Arc<dyn ReadStore> {
        Arc::new(self)
    }
}

#[async_trait]
impl ReadStore for FakeStore {
    async fn exists(&self, reference: Reference, id: Uuid) -> AppResult<bool> {
        Ok(self.existing.contains(&(reference, id)))
    }

    async fn is_taken(&self, unique: &Unique, excluding: Option<Uuid>) -> AppResult<bool> {
        Ok(self
            .taken
            .iter()
            .any(|(held, owner)| held == unique && Some(*owner) != excluding))
    }
}

fn fields(violations: &[Violation]) -> Vec<&str> {
    violations.iter().map(|v| v.field.as_str()).collect()
}

fn department_input(name: &str) -> DepartmentInput {
    DepartmentInput {
        department_name: name.to_string(),
        location: None,
        manager_id: None,
    }
}

// ── Rules ───────────────────────────────────────────────────────

#[test]
fn text_requires_non_blank_and_bounded() {
    let mut rules = Rules::new();
    assert!(!rules.text("name", "   ", 10, "Name"));
    assert!(!rules.text("name", "abcdefghijk", 10, "Name"));
    assert!(rules.text("name", "abc", 10, "Name"));

    let violations = rules.into_violations();
    assert_eq!(violations[0].message, "Name is required.");
    assert_eq!(violations[1].message, "Name must not exceed 10 characters.");
    assert_eq!(violations.len(), 2);
}

#[test]
fn text_length_is_measured_after_trimming() {
    let mut rules = Rules::new();
    assert!(rules.text("name", "  abcdefghij  ", 10, "Name"));
    assert!(rules.email("email", " an.nguyen@example.com "));
    assert!(rules.is_empty());
}

#[test]
fn money_stays_within_column_range() {
    let mut rules = Rules::new();
    assert!(rules.money("salary", Decimal::ZERO, "Salary"));
    assert!(rules.money("salary", max_money(), "Salary"));
    assert!(!rules.money("salary", Decimal::new(-1, 2), "Salary"));
    assert!(!rules.money("salary", Decimal::new(100_000_000_000_000_000, 0), "Salary"));
    // Rounds up to 10^16 when stored.
    let rounds_over = Decimal::from_i128_with_scale(9_999_999_999_999_999_995, 3);
    assert!(!rules.money("salary", rounds_over, "Salary"));

    let messages: Vec<String> = rules.into_violations().into_iter().map(|v| v.message).collect();
    assert_eq!(messages[0], "Salary must not be negative.");
    assert_eq!(messages[1], "Salary must not exceed 9999999999999999.99.");
    assert_eq!(messages.len(), 3);
}

#[test]
fn optional_text_skips_missing_values() {
    let mut rules = Rules::new();
    assert!(rules.optional_text("notes", None, 5, "Notes"));
    assert!(!rules.optional_text("notes", Some("too long"), 5, "Notes"));
    assert_eq!(fields(&rules.into_violations()), vec!["notes"]);
}

#[test]
fn email_shape_is_checked() {
    let mut rules = Rules::new();
    assert!(rules.email("email", "an.nguyen@example.com"));
    assert!(!rules.email("email", "not-an-email"));
    assert!(!rules.email("email", "two@@example.com"));
    assert!(!rules.email("email", ""));
    assert_eq!(rules.into_violations().len(), 3);
}

#[test]
fn one_of_lists_allowed_values() {
    let mut rules = Rules::new();
    assert!(!rules.one_of("status", "Unknown", &["Active", "Expired"], "Status"));
    let violations = rules.into_violations();
    assert_eq!(violations[0].message, "Status must be one of: Active, Expired.");
}

#[test]
fn join_uses_report_order() {
    let violations = vec![
        Violation::new("a", "First."),
        Violation::new("b", "Second."),
    ];
    assert_eq!(validation::join(&violations), "First.; Second.");
    assert_eq!(Failure::Validation(violations).to_string(), "First.; Second.");
}

// ── Pagination ──────────────────────────────────────────────────

#[tokio::test]
async fn page_validator_enforces_bounds() {
    let validator = PageValidator::<ListDepartments>::new();

    let ok = ListDepartments {
        search: None,
        page: PageRequest::new(1, 100),
    };
    assert!(validator.validate(&ok).await.unwrap().is_empty());

    let too_big = ListDepartments {
        search: None,
        page: PageRequest::new(1, 101),
    };
    assert_eq!(fields(&validator.validate(&too_big).await.unwrap()), vec!["page_size"]);

    let both = ListDepartments {
        search: None,
        page: PageRequest::new(0, 0),
    };
    assert_eq!(
        fields(&validator.validate(&both).await.unwrap()),
        vec!["page", "page_size"]
    );

    let beyond = ListDepartments {
        search: None,
        page: PageRequest::new(i64::MAX, 100),
    };
    assert_eq!(fields(&validator.validate(&beyond).await.unwrap()), vec!["page"]);

    let last = ListDepartments {
        search: None,
        page: PageRequest::new(MAX_PAGE, 100),
    };
    assert!(validator.validate(&last).await.unwrap().is_empty());
    assert!(last.page.offset() > 0);
}

// ── Departments ─────────────────────────────────────────────────

#[tokio::test]
async fn department_name_must_be_unique() {
    let existing = Uuid::now_v7();
    let store = FakeStore::default()
        .holding(Unique::DepartmentName("HR".to_string()), existing)
        .shared();
    let validator = DepartmentValidator::new(store);

    let violations = validator
        .validate(&CreateDepartment(department_input("HR")))
        .await
        .unwrap();
    assert_eq!(violations, vec![Violation::new("department_name", "Department name already exists.")]);

    // Renaming a department to its own name is fine.
    let same = UpdateDepartment {
        id: existing,
        input: department_input("HR"),
    };
    assert!(validator.validate(&same).await.unwrap().is_empty());
}

#[tokio::test]
async fn department_manager_must_exist() {
    let manager = Uuid::now_v7();
    let store = FakeStore::default().with(Reference::Employee, manager).shared();
    let validator = DepartmentValidator::new(store);

    let mut input = department_input("Ops");
    input.manager_id = Some(manager);
    assert!(validator.validate(&CreateDepartment(input.clone())).await.unwrap().is_empty());

    input.manager_id = Some(Uuid::now_v7());
    let violations = validator.validate(&CreateDepartment(input)).await.unwrap();
    assert_eq!(violations[0].message, "Manager does not exist.");
}

// ── Employees ───────────────────────────────────────────────────

fn employee_input() -> EmployeeInput {
    EmployeeInput {
        first_name: "An".to_string(),
        last_name: "Nguyen".to_string(),
        email: "an.nguyen@example.com".to_string(),
        phone: None,
        date_of_birth: None,
        hire_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        department_id: None,
        position_id: None,
        is_active: true,
    }
}

#[tokio::test]
async fn employee_references_and_dates_are_checked() {
    let validator = EmployeeValidator::new(FakeStore::default().shared());

    let mut input = employee_input();
    input.date_of_birth = NaiveDate::from_ymd_opt(2030, 1, 1);
    input.department_id = Some(Uuid::now_v7());
    let request = CreateEmployee {
        input,
        starting_salary: Some(Decimal::new(-1, 0)),
    };

    let violations = validator.validate(&request).await.unwrap();
    assert_eq!(
        fields(&violations),
        vec!["date_of_birth", "department_id", "starting_salary"]
    );
}

#[tokio::test]
async fn employee_email_taken_elsewhere() {
    let store = FakeStore::default()
        .holding(
            Unique::EmployeeEmail("an.nguyen@example.com".to_string()),
            Uuid::now_v7(),
        )
        .shared();
    let validator = EmployeeValidator::new(store);

    let request = CreateEmployee {
        input: employee_input(),
        starting_salary: None,
    };
    let violations = validator.validate(&request).await.unwrap();
    assert_eq!(violations, vec![Violation::new("email", "Email is already in use.")]);
}

// ── Skills ──────────────────────────────────────────────────────

#[tokio::test]
async fn skill_is_unique_per_employee() {
    let employee = Uuid::now_v7();
    let colleague = Uuid::now_v7();
    let store = FakeStore::default()
        .with(Reference::Employee, employee)
        .with(Reference::Employee, colleague)
        .holding(
            Unique::EmployeeSkill {
                employee_id: employee,
                skill_name: "SQL".to_string(),
            },
            Uuid::now_v7(),
        )
        .shared();
    let validator = SkillValidator::new(store);

    let skill = |employee_id: Uuid, level: i16| {
        CreateSkill(SkillInput {
            employee_id,
            skill_name: "SQL".to_string(),
            proficiency_level: level,
            description: None,
        })
    };

    let violations = validator.validate(&skill(employee, 3)).await.unwrap();
    assert_eq!(violations[0].message, "Employee already has this skill.");

    assert!(validator.validate(&skill(colleague, 3)).await.unwrap().is_empty());

    let violations = validator.validate(&skill(colleague, 0)).await.unwrap();
    assert_eq!(fields(&violations), vec!["proficiency_level"]);
}

// ── Attendances ─────────────────────────────────────────────────

#[tokio::test]
async fn check_in_rejects_open_record_and_unknown_status() {
    let employee = Uuid::now_v7();
    let store = FakeStore::default()
        .with(Reference::Employee, employee)
        .holding(Unique::OpenAttendance { employee_id: employee }, Uuid::now_v7())
        .shared();
    let validator = CheckInValidator::new(store);

    let request = CheckIn {
        employee_id: employee,
        check_in: None,
        status: "Sleeping".to_string(),
        notes: None,
    };
    let err = validation::run(&[Arc::new(validator) as Arc<dyn Validator<CheckIn>>], &request)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Employee already has an attendance record without check-out.; \
         Status must be one of: Present, Late, Absent, Leave."
    );
}

#[tokio::test]
async fn check_in_for_unknown_employee() {
    let validator = CheckInValidator::new(FakeStore::default().shared());

    let request = CheckIn {
        employee_id: Uuid::now_v7(),
        check_in: None,
        status: "Present".to_string(),
        notes: None,
    };
    let violations = validator.validate(&request).await.unwrap();
    assert_eq!(violations, vec![Violation::new("employee_id", "Employee does not exist.")]);
}
