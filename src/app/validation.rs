use std::marker::PhantomData;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::app::pagination::{MAX_PAGE, MAX_PAGE_SIZE, PageRequest};
use crate::app::result::{AppResult, Failure};

/// Largest amount a numeric(18, 2) column holds.
pub fn max_money() -> Decimal {
    Decimal::new(999_999_999_999_999_999, 2)
}

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Violation messages joined with "; ", in the order they were reported.
pub fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Accumulates synchronous field rules.
#[derive(Debug, Default)]
pub struct Rules {
    violations: Vec<Violation>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.violations.push(Violation::new(field, message));
    }

    /// Records `message` unless `ok` holds. Returns `ok`.
    pub fn check(&mut self, ok: bool, field: &str, message: impl Into<String>) -> bool {
        if !ok {
            self.push(field, message);
        }
        ok
    }

    pub fn required(&mut self, field: &str, value: &str, label: &str) -> bool {
        self.check(!value.trim().is_empty(), field, format!("{label} is required."))
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize, label: &str) -> bool {
        self.check(
            value.chars().count() <= max,
            field,
            format!("{label} must not exceed {max} characters."),
        )
    }

    /// Required, and at most `max` characters once trimmed.
    pub fn text(&mut self, field: &str, value: &str, max: usize, label: &str) -> bool {
        self.required(field, value, label) && self.max_len(field, value.trim(), max, label)
    }

    pub fn optional_text(&mut self, field: &str, value: Option<&str>, max: usize, label: &str) -> bool {
        value.is_none_or(|v| self.max_len(field, v, max, label))
    }

    pub fn email(&mut self, field: &str, value: &str) -> bool {
        self.required(field, value, "Email")
            && self.max_len(field, value.trim(), 255, "Email")
            && self.check(EMAIL_RE.is_match(value.trim()), field, "Email is not a valid address.")
    }

    pub fn one_of(&mut self, field: &str, value: &str, allowed: &[&str], label: &str) -> bool {
        self.check(
            allowed.contains(&value),
            field,
            format!("{label} must be one of: {}.", allowed.join(", ")),
        )
    }

    /// Non-negative and within numeric(18, 2) once rounded to cents.
    pub fn money(&mut self, field: &str, value: Decimal, label: &str) -> bool {
        self.check(value >= Decimal::ZERO, field, format!("{label} must not be negative."))
            && self.check(
                value.round_dp(2) <= max_money(),
                field,
                format!("{label} must not exceed {}.", max_money()),
            )
    }

    pub fn page(&mut self, page: &PageRequest) {
        if self.check(page.page >= 1, "page", "Page number must be greater than 0.") {
            self.check(
                page.page <= MAX_PAGE,
                "page",
                format!("Page number must not exceed {MAX_PAGE}."),
            );
        }
        self.check(
            (1..=MAX_PAGE_SIZE).contains(&page.page_size),
            "page_size",
            format!("Page size must be between 1 and {MAX_PAGE_SIZE}."),
        );
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

/// A rule set for one request type. Validators only read.
#[async_trait]
pub trait Validator<R>: Send + Sync {
    async fn validate(&self, request: &R) -> AppResult<Vec<Violation>>;
}

/// Runs every validator and collects all violations before deciding.
pub async fn run<R: Sync>(validators: &[Arc<dyn Validator<R>>], request: &R) -> AppResult<()> {
    let mut violations = Vec::new();
    for validator in validators {
        violations.extend(validator.validate(request).await?);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        tracing::debug!(count = violations.len(), "Request rejected by validation");
        Err(Failure::Validation(violations))
    }
}

/// Queries that list rows page by page.
pub trait Paginated {
    fn page(&self) -> &PageRequest;
}

/// Checks page bounds of any paginated query.
pub struct PageValidator<R>(PhantomData<fn(&R)>);

impl<R> PageValidator<R> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<R> Default for PageValidator<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Paginated + Sync> Validator<R> for PageValidator<R> {
    async fn validate(&self, request: &R) -> AppResult<Vec<Violation>> {
        let mut rules = Rules::new();
        rules.page(request.page());
        Ok(rules.into_violations())
    }
}
