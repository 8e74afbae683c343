use std::io::Write;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hh_vacancies::config::{Command, Config};
use hh_vacancies::queries::VacancyQueries;
use hh_vacancies::sources::{HeadHunterClient, VacancySource};
use hh_vacancies::{db, loader, menu};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hh_vacancies=info")),
        )
        .init();

    let config = Config::parse();

    match config.resolved_command() {
        Command::Run => {
            db::create_database(&config.db).await?;
            let pool = db::create_pool(config.db.connect_options()).await?;
            db::create_tables(&pool, config.unique_vacancy_urls).await?;
            load(&config, &pool).await?;
            run_menu(pool).await?;
        }
        Command::Init => {
            db::create_database(&config.db).await?;
            let pool = db::create_pool(config.db.connect_options()).await?;
            db::create_tables(&pool, config.unique_vacancy_urls).await?;
        }
        Command::Load => {
            let pool = db::create_pool(config.db.connect_options()).await?;
            load(&config, &pool).await?;
        }
        Command::Menu => {
            let pool = db::create_pool(config.db.connect_options()).await?;
            run_menu(pool).await?;
        }
        Command::Refresh => {
            let pool = db::create_pool(config.db.connect_options()).await?;
            db::truncate_tables(&pool).await?;
        }
        Command::Drop => {
            let pool = db::create_pool(config.db.connect_options()).await?;
            db::drop_tables(&pool).await?;
        }
        Command::Search {
            keyword,
            with_employers,
        } => {
            let client = HeadHunterClient::new(&config.source)?;
            let (pages, per_page) = (config.source.pages, config.source.per_page);
            if with_employers {
                let vacancies = client
                    .search_with_employers(&keyword, pages, per_page)
                    .await?;
                tracing::info!("Found {} vacancies for '{keyword}'", vacancies.len());
                write_json_lines(&mut std::io::stdout().lock(), &vacancies)?;
            } else {
                let vacancies = client.search_normalized(&keyword, pages, per_page).await?;
                tracing::info!("Found {} vacancies for '{keyword}'", vacancies.len());
                write_json_lines(&mut std::io::stdout().lock(), &vacancies)?;
            }
        }
    }

    Ok(())
}

fn write_json_lines<W: Write, T: serde::Serialize>(out: &mut W, rows: &[T]) -> anyhow::Result<()> {
    for row in rows {
        serde_json::to_writer(&mut *out, row)?;
        writeln!(out)?;
    }
    Ok(())
}

async fn load(config: &Config, pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let client = HeadHunterClient::new(&config.source)?;
    loader::load_employers(
        pool,
        &client,
        &config.employer_ids,
        config.source.pages,
        config.source.per_page,
    )
    .await?;
    Ok(())
}

async fn run_menu(pool: sqlx::PgPool) -> anyhow::Result<()> {
    let queries = VacancyQueries::new(pool);
    let stdin = std::io::stdin();
    menu::run(&queries, stdin.lock(), std::io::stdout()).await?;
    Ok(())
}
