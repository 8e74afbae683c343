use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;

use crate::config::SourceConfig;
use crate::error::AppError;
use crate::sources::VacancySource;

/// hh.ru rejects requests without a User-Agent.
const USER_AGENT: &str = concat!("hh-vacancies/", env!("CARGO_PKG_VERSION"));

/// Client for the hh.ru vacancy-search and employer-detail endpoints.
#[derive(Clone)]
pub struct HeadHunterClient {
    client: Client,
    vacancies_url: Url,
    employers_url: Url,
}

impl HeadHunterClient {
    pub fn new(config: &SourceConfig) -> Result<Self, AppError> {
        Self::with_urls(&config.vacancies_url, &config.employers_url)
    }

    pub fn with_urls(vacancies_url: &str, employers_url: &str) -> Result<Self, AppError> {
        let vacancies_url = Url::parse(vacancies_url)
            .map_err(|_| AppError::InvalidUrl(vacancies_url.to_string()))?;
        let employers_url = Url::parse(employers_url)
            .map_err(|_| AppError::InvalidUrl(employers_url.to_string()))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Client(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            vacancies_url,
            employers_url,
        })
    }

    fn employer_url(&self, employer_id: i32) -> Result<Url, AppError> {
        let base = self.employers_url.as_str().trim_end_matches('/');
        let url = format!("{base}/{employer_id}");
        Url::parse(&url).map_err(|_| AppError::InvalidUrl(url))
    }

    /// GET a JSON body. Transport failures and non-success statuses are logged
    /// and return None; an unparseable body is an error.
    async fn get_json(&self, url: Url, query: &[(&str, String)]) -> Result<Option<Value>, AppError> {
        let resp = match self.client.get(url.clone()).query(query).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!("Request to {url} failed: {e}");
                return Ok(None);
            }
        };

        let status = resp.status();
        if !status.is_success() {
            tracing::error!("Request to {url} returned {status}");
            return Ok(None);
        }

        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Failed to read body from {url}: {e}");
                return Ok(None);
            }
        };

        let data = serde_json::from_str(&body)
            .map_err(|e| AppError::MalformedResponse(format!("{url}: {e}")))?;
        Ok(Some(data))
    }

    /// Request pages `0..page_count` one after another and concatenate their items.
    /// A failed page contributes nothing; later pages are still requested.
    async fn fetch_pages(
        &self,
        filter: (&str, String),
        page_count: u32,
        per_page: u32,
    ) -> Result<Vec<Value>, AppError> {
        let mut all = Vec::new();

        for page in 0..page_count {
            let query = [
                (filter.0, filter.1.clone()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ];
            let Some(data) = self.get_json(self.vacancies_url.clone(), &query).await? else {
                continue;
            };

            let items = page_items(&data);
            tracing::debug!("Page {page} ({}={}): {} items", filter.0, filter.1, items.len());
            all.extend(items);
        }

        Ok(all)
    }
}

#[async_trait]
impl VacancySource for HeadHunterClient {
    fn name(&self) -> &str {
        "hh.ru"
    }

    async fn search_vacancies(
        &self,
        keyword: &str,
        page_count: u32,
        per_page: u32,
    ) -> Result<Vec<Value>, AppError> {
        self.fetch_pages(("text", keyword.to_string()), page_count, per_page)
            .await
    }

    async fn fetch_employer(&self, employer_id: i32) -> Result<Value, AppError> {
        let url = self.employer_url(employer_id)?;
        let data = self.get_json(url, &[]).await?;
        Ok(data.unwrap_or_else(|| Value::Object(serde_json::Map::new())))
    }

    async fn search_vacancies_by_employer(
        &self,
        employer_id: i32,
        page_count: u32,
        per_page: u32,
    ) -> Result<Vec<Value>, AppError> {
        self.fetch_pages(
            ("employer_id", employer_id.to_string()),
            page_count,
            per_page,
        )
        .await
    }
}

/// The `items` array of a search page; missing or non-array reads as empty.
fn page_items(data: &Value) -> Vec<Value> {
    data.get("items")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default()
}
