//! Test utilities: a mock hh.ru server, an in-memory vacancy source and
//! isolated PostgreSQL containers.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use hh_vacancies::error::AppError;
use hh_vacancies::models::employer::Employer;
use hh_vacancies::models::vacancy::NewVacancy;
use hh_vacancies::sources::VacancySource;
use serde_json::{Value, json};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });
    format!("http://{addr}")
}

/// Starts a PostgreSQL container and returns a pool with the schema created.
///
/// Keep the container alive for the test duration; it is removed on drop.
pub async fn setup_test_db(unique_vacancy_urls: bool) -> (PgPool, ContainerAsync<GenericImage>) {
    let container = GenericImage::new("postgres", "16-alpine")
        .with_exposed_port(ContainerPort::Tcp(5432))
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_PASSWORD", "postgres")
        .with_env_var("POSTGRES_DB", "postgres")
        .start()
        .await
        .expect("Failed to start PostgreSQL container");

    let host = container.get_host().await.expect("Failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get port");

    let connection_string = format!("postgresql://postgres:postgres@{host}:{port}/postgres");

    // The server restarts once after init; retry until it accepts connections
    const MAX_RETRIES: u32 = 50;
    let mut retries = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(1)
            .connect(&connection_string)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retries += 1;
                if retries >= MAX_RETRIES {
                    panic!("Failed to connect to database after {MAX_RETRIES} retries: {e}");
                }
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            }
        }
    };

    hh_vacancies::db::create_tables(&pool, unique_vacancy_urls)
        .await
        .expect("Failed to create tables");

    (pool, container)
}

pub async fn list_employers(pool: &PgPool) -> Result<Vec<Employer>, sqlx::Error> {
    sqlx::query_as::<_, Employer>("SELECT * FROM employers ORDER BY id")
        .fetch_all(pool)
        .await
}

pub fn sample_employer(id: i32, name: &str) -> Employer {
    Employer {
        id,
        name: name.to_string(),
        url: format!("https://hh.ru/employer/{id}"),
        open_vacancies: Some(10),
    }
}

pub fn sample_vacancy(
    employer_id: i32,
    title: &str,
    salary_from: Option<i32>,
    salary_to: Option<i32>,
) -> NewVacancy {
    NewVacancy {
        title: Some(title.to_string()),
        salary_from,
        salary_to,
        currency: Some("RUR".to_string()),
        city: Some("Москва".to_string()),
        url: Some(format!(
            "https://hh.ru/vacancy/{}",
            title.to_lowercase().replace(' ', "-")
        )),
        employer_name: None,
        employer_id: Some(employer_id),
        requirements: None,
        responsibilities: None,
    }
}

/// Raw search record in the shape hh.ru returns.
pub fn raw_vacancy(id: &str, name: &str, employer_id: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "salary": {"from": 100000, "to": 150000, "currency": "RUR"},
        "area": {"name": "Москва"},
        "alternate_url": format!("https://hh.ru/vacancy/{id}"),
        "employer": {"id": employer_id, "name": "Ignored"},
        "snippet": {"requirement": "Rust", "responsibility": "Build things"}
    })
}

/// In-memory source: employer bodies and vacancy lists keyed by employer id.
/// Unknown employers read as an empty body, like a failed fetch.
#[derive(Default)]
pub struct MockSource {
    pub employers: HashMap<i32, Value>,
    pub vacancies: HashMap<i32, Vec<Value>>,
    /// Employers whose vacancy search answers with an unparseable body.
    pub malformed: HashSet<i32>,
    pub search_results: Vec<Value>,
    pub calls: Mutex<Vec<String>>,
}

impl MockSource {
    pub fn with_employer(mut self, id: i32, body: Value, vacancies: Vec<Value>) -> Self {
        self.employers.insert(id, body);
        self.vacancies.insert(id, vacancies);
        self
    }

    pub fn with_malformed_vacancies(mut self, employer_id: i32) -> Self {
        self.malformed.insert(employer_id);
        self
    }

    pub fn with_search_results(mut self, results: Vec<Value>) -> Self {
        self.search_results = results;
        self
    }
}

#[async_trait]
impl VacancySource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search_vacancies(
        &self,
        keyword: &str,
        _page_count: u32,
        _per_page: u32,
    ) -> Result<Vec<Value>, AppError> {
        self.calls.lock().unwrap().push(format!("search:{keyword}"));
        Ok(self.search_results.clone())
    }

    async fn fetch_employer(&self, employer_id: i32) -> Result<Value, AppError> {
        self.calls.lock().unwrap().push(format!("employer:{employer_id}"));
        Ok(self
            .employers
            .get(&employer_id)
            .cloned()
            .unwrap_or_else(|| json!({})))
    }

    async fn search_vacancies_by_employer(
        &self,
        employer_id: i32,
        _page_count: u32,
        _per_page: u32,
    ) -> Result<Vec<Value>, AppError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("vacancies:{employer_id}"));
        if self.malformed.contains(&employer_id) {
            return Err(AppError::MalformedResponse(format!(
                "vacancies for employer {employer_id}"
            )));
        }
        Ok(self
            .vacancies
            .get(&employer_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Shared request log for the mock HTTP server.
pub type RequestLog = Arc<Mutex<Vec<HashMap<String, String>>>>;
