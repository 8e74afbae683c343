use serde_json::Value;
use sqlx::PgExecutor;

use crate::error::AppError;
use crate::models::vacancy::id_value;

/// Profile URL stored when the API body carries none.
pub const MISSING_URL: &str = "N/A";

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Employer {
    pub id: i32,
    pub name: String,
    pub url: String,
    pub open_vacancies: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CompanyVacancyCount {
    pub name: String,
    pub vacancies_count: i64,
}

impl Employer {
    /// Build an employer from the employer-detail body.
    /// Returns None when the body lacks an id or a name, e.g. after a failed fetch.
    pub fn from_api(body: &Value) -> Option<Employer> {
        let id = body.get("id").and_then(id_value)?;
        let name = body.get("name").and_then(|v| v.as_str())?.to_string();
        let url = body
            .get("alternate_url")
            .and_then(|v| v.as_str())
            .unwrap_or(MISSING_URL)
            .to_string();
        let open_vacancies = body
            .get("open_vacancies")
            .and_then(|v| v.as_i64())
            .and_then(|n| i32::try_from(n).ok())
            .unwrap_or(0);

        Some(Employer {
            id,
            name,
            url,
            open_vacancies: Some(open_vacancies),
        })
    }

    /// Insert the employer unless its id is already stored; an existing row is
    /// left untouched. Returns true if a row was written.
    pub async fn insert<'e, E: PgExecutor<'e>>(&self, executor: E) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT INTO employers (id, name, url, open_vacancies) VALUES ($1, $2, $3, $4) ON CONFLICT (id) DO NOTHING",
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.url)
        .bind(self.open_vacancies)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
