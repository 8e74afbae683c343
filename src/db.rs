//! Schema bootstrap for the `employers` and `vacancies` tables.

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Connection, PgConnection, PgPool};

use crate::config::DbConfig;
use crate::error::AppError;

const CREATE_EMPLOYERS: &str = "CREATE TABLE IF NOT EXISTS employers (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    url TEXT NOT NULL,
    open_vacancies INTEGER DEFAULT 0
)";

const CREATE_VACANCIES: &str = "CREATE TABLE IF NOT EXISTS vacancies (
    id SERIAL PRIMARY KEY,
    title TEXT,
    salary_from INTEGER,
    salary_to INTEGER,
    currency TEXT,
    city TEXT,
    url TEXT,
    requirements TEXT,
    responsibilities TEXT,
    employer_id INTEGER REFERENCES employers(id)
)";

const CREATE_VACANCY_URL_INDEX: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS vacancies_url_key ON vacancies (url)";

/// Open the single shared connection used for a load run or a query session.
pub async fn create_pool(options: PgConnectOptions) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Create the configured database through the maintenance database if it is absent.
/// Returns true when the database was created.
pub async fn create_database(config: &DbConfig) -> Result<bool, AppError> {
    let mut conn = PgConnection::connect_with(&config.maintenance_options()).await?;

    let exists: Option<(i32,)> =
        sqlx::query_as("SELECT 1 FROM pg_catalog.pg_database WHERE datname = $1")
            .bind(&config.name)
            .fetch_optional(&mut conn)
            .await?;

    let created = if exists.is_none() {
        // CREATE DATABASE takes no bind parameters
        let statement = format!("CREATE DATABASE {}", quote_ident(&config.name));
        sqlx::query(&statement).execute(&mut conn).await?;
        tracing::info!("Database '{}' created", config.name);
        true
    } else {
        tracing::info!("Database '{}' already exists", config.name);
        false
    };

    conn.close().await?;
    Ok(created)
}

/// Create both tables if they do not exist. With `unique_vacancy_urls` a unique
/// index on `vacancies.url` is added, which lets repeated loads skip known vacancies.
pub async fn create_tables(pool: &PgPool, unique_vacancy_urls: bool) -> Result<(), AppError> {
    sqlx::query(CREATE_EMPLOYERS).execute(pool).await?;
    sqlx::query(CREATE_VACANCIES).execute(pool).await?;
    if unique_vacancy_urls {
        sqlx::query(CREATE_VACANCY_URL_INDEX).execute(pool).await?;
    }
    tracing::info!("Tables ready");
    Ok(())
}

/// Delete every row and restart the vacancy id sequence.
pub async fn truncate_tables(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query("TRUNCATE TABLE employers, vacancies RESTART IDENTITY CASCADE")
        .execute(pool)
        .await?;
    tracing::info!("Tables truncated");
    Ok(())
}

pub async fn drop_tables(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query("DROP TABLE IF EXISTS employers, vacancies CASCADE")
        .execute(pool)
        .await?;
    tracing::info!("Tables dropped");
    Ok(())
}

/// Quote an SQL identifier, doubling embedded quotes.
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
