// Vacancy sources: the trait the loader depends on and its hh.ru implementation.

pub mod headhunter;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;
use crate::models::vacancy::{NewVacancy, normalize};

pub use headhunter::HeadHunterClient;

/// A normalized vacancy with the detail body of its employer attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VacancyWithEmployer {
    #[serde(flatten)]
    pub vacancy: NewVacancy,
    /// Employer detail body; `{}` when the vacancy names no employer or the fetch failed.
    pub employer_info: Value,
}

/// A remote job board that serves vacancy and employer records.
///
/// Transport failures and non-success statuses are logged and read as "no
/// data"; only a body that cannot be parsed surfaces as an error.
#[async_trait]
pub trait VacancySource: Send + Sync {
    /// Human-readable name used in log lines.
    fn name(&self) -> &str;

    /// Free-text search over pages `0..page_count`, items concatenated in page order.
    async fn search_vacancies(
        &self,
        keyword: &str,
        page_count: u32,
        per_page: u32,
    ) -> Result<Vec<Value>, AppError>;

    /// Employer detail body, or an empty object when the request failed.
    async fn fetch_employer(&self, employer_id: i32) -> Result<Value, AppError>;

    /// Same pagination as `search_vacancies`, filtered by employer.
    async fn search_vacancies_by_employer(
        &self,
        employer_id: i32,
        page_count: u32,
        per_page: u32,
    ) -> Result<Vec<Value>, AppError>;

    /// Keyword search with every record normalized.
    async fn search_normalized(
        &self,
        keyword: &str,
        page_count: u32,
        per_page: u32,
    ) -> Result<Vec<NewVacancy>, AppError> {
        let raw = self.search_vacancies(keyword, page_count, per_page).await?;
        Ok(raw.iter().map(normalize).collect())
    }

    /// Keyword search with each vacancy's employer attached. Every distinct
    /// employer is fetched once, in order of first appearance.
    async fn search_with_employers(
        &self,
        keyword: &str,
        page_count: u32,
        per_page: u32,
    ) -> Result<Vec<VacancyWithEmployer>, AppError> {
        let vacancies = self.search_normalized(keyword, page_count, per_page).await?;

        let mut employers: HashMap<i32, Value> = HashMap::new();
        for employer_id in vacancies.iter().filter_map(|v| v.employer_id) {
            if !employers.contains_key(&employer_id) {
                let body = self.fetch_employer(employer_id).await?;
                employers.insert(employer_id, body);
            }
        }

        Ok(vacancies
            .into_iter()
            .map(|vacancy| {
                let employer_info = vacancy
                    .employer_id
                    .and_then(|id| employers.get(&id).cloned())
                    .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
                VacancyWithEmployer {
                    vacancy,
                    employer_info,
                }
            })
            .collect())
    }
}
