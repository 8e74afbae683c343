use serde::Serialize;
use serde_json::Value;
use sqlx::PgExecutor;

use crate::error::AppError;

/// Currency assumed when a salary is present without one.
pub const DEFAULT_CURRENCY: &str = "RUB";

/// A vacancy flattened from the API record, ready for insertion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewVacancy {
    pub title: Option<String>,
    pub salary_from: Option<i32>,
    pub salary_to: Option<i32>,
    pub currency: Option<String>,
    pub city: Option<String>,
    pub url: Option<String>,
    pub employer_name: Option<String>,
    pub employer_id: Option<i32>,
    pub requirements: Option<String>,
    pub responsibilities: Option<String>,
}

/// Vacancy joined with its employer name, as listed by the query layer.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct VacancyListing {
    pub employer_name: String,
    pub title: Option<String>,
    pub salary_from: Option<i32>,
    pub salary_to: Option<i32>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct VacancySummary {
    pub title: Option<String>,
    pub salary_from: Option<i32>,
    pub salary_to: Option<i32>,
    pub url: Option<String>,
}

/// Flatten a raw vacancy record from the search endpoint.
///
/// Missing nested objects behave like empty ones. Within `salary`, an absent
/// key takes its default (0 for the bounds, RUB for the currency) while an
/// explicit `null` stays null.
pub fn normalize(raw: &Value) -> NewVacancy {
    let salary = nested(raw, "salary");
    let area = nested(raw, "area");
    let employer = nested(raw, "employer");
    let snippet = nested(raw, "snippet");

    NewVacancy {
        title: string_field(Some(raw), "name"),
        salary_from: salary_bound(salary, "from"),
        salary_to: salary_bound(salary, "to"),
        currency: match salary.and_then(|s| s.get("currency")) {
            None => Some(DEFAULT_CURRENCY.to_string()),
            Some(v) => v.as_str().map(String::from),
        },
        city: string_field(area, "name"),
        url: string_field(Some(raw), "alternate_url"),
        employer_name: string_field(employer, "name"),
        employer_id: employer.and_then(|e| e.get("id")).and_then(id_value),
        requirements: string_field(snippet, "requirement"),
        responsibilities: string_field(snippet, "responsibility"),
    }
}

impl NewVacancy {
    /// Insert the vacancy, skipping it when it conflicts with an existing row.
    /// Returns true if a row was written.
    pub async fn insert<'e, E: PgExecutor<'e>>(&self, executor: E) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT INTO vacancies (title, salary_from, salary_to, currency, city, url, requirements, responsibilities, employer_id) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) ON CONFLICT DO NOTHING",
        )
        .bind(&self.title)
        .bind(self.salary_from)
        .bind(self.salary_to)
        .bind(&self.currency)
        .bind(&self.city)
        .bind(&self.url)
        .bind(&self.requirements)
        .bind(&self.responsibilities)
        .bind(self.employer_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// A nested object by key; absent, null and non-object values all read as missing.
fn nested<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| v.is_object())
}

fn string_field(object: Option<&Value>, key: &str) -> Option<String> {
    object
        .and_then(|o| o.get(key))
        .and_then(|v| v.as_str())
        .map(String::from)
}

fn salary_bound(salary: Option<&Value>, key: &str) -> Option<i32> {
    match salary.and_then(|s| s.get(key)) {
        None => Some(0),
        Some(v) => v
            .as_i64()
            .or_else(|| v.as_f64().map(|f| f as i64))
            .and_then(|n| i32::try_from(n).ok()),
    }
}

/// hh.ru sends ids as strings; numbers are accepted too.
pub(crate) fn id_value(value: &Value) -> Option<i32> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        _ => None,
    }
}
