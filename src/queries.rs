//! Read-only aggregate queries over the loaded vacancies.

use sqlx::PgPool;

use crate::error::AppError;
use crate::models::employer::CompanyVacancyCount;
use crate::models::vacancy::{VacancyListing, VacancySummary};

#[derive(Clone)]
pub struct VacancyQueries {
    pool: PgPool,
}

impl VacancyQueries {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Every employer with the number of vacancies stored for it.
    pub async fn get_companies_and_vacancies_count(
        &self,
    ) -> Result<Vec<CompanyVacancyCount>, AppError> {
        let rows = sqlx::query_as::<_, CompanyVacancyCount>(
            "SELECT e.name, COUNT(v.id) AS vacancies_count FROM employers e LEFT JOIN vacancies v ON v.employer_id = e.id GROUP BY e.name ORDER BY e.name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_all_vacancies(&self) -> Result<Vec<VacancyListing>, AppError> {
        let rows = sqlx::query_as::<_, VacancyListing>(
            "SELECT e.name AS employer_name, v.title, v.salary_from, v.salary_to, v.url FROM vacancies v JOIN employers e ON e.id = v.employer_id ORDER BY v.id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Mean of each row's salary midpoint, over rows with both bounds set.
    /// Bounds are widened to bigint so large salaries cannot overflow the sum.
    /// None when no such row exists.
    pub async fn get_avg_salary(&self) -> Result<Option<f64>, AppError> {
        let row: (Option<f64>,) = sqlx::query_as(
            "SELECT AVG((salary_from::bigint + salary_to) / 2.0)::float8 FROM vacancies WHERE salary_from IS NOT NULL AND salary_to IS NOT NULL",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    /// Vacancies whose midpoint, with a null bound read as 0, exceeds the average salary.
    pub async fn get_vacancies_with_higher_salary(
        &self,
    ) -> Result<Vec<VacancySummary>, AppError> {
        let rows = sqlx::query_as::<_, VacancySummary>(
            "SELECT title, salary_from, salary_to, url FROM vacancies
             WHERE (COALESCE(salary_from, 0)::bigint + COALESCE(salary_to, 0)) / 2.0 > (
                 SELECT AVG((salary_from::bigint + salary_to) / 2.0) FROM vacancies
                 WHERE salary_from IS NOT NULL AND salary_to IS NOT NULL
             )
             ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Case-insensitive substring search on the title; the keyword is matched literally.
    pub async fn get_vacancies_with_keyword(
        &self,
        keyword: &str,
    ) -> Result<Vec<VacancySummary>, AppError> {
        let rows = sqlx::query_as::<_, VacancySummary>(
            "SELECT title, salary_from, salary_to, url FROM vacancies WHERE title ILIKE '%' || $1 || '%' ESCAPE '\\' ORDER BY id",
        )
        .bind(escape_like(keyword))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

/// Escape LIKE wildcards so the pattern matches the text as written.
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
