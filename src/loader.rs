use sqlx::PgPool;

use crate::error::AppError;
use crate::models::employer::Employer;
use crate::models::vacancy::normalize;
use crate::sources::VacancySource;

/// Counters for one load run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub employers_loaded: usize,
    pub employers_skipped: usize,
    pub vacancies_fetched: usize,
    pub vacancies_inserted: usize,
}

/// Fetch each employer and its vacancies and store them, one transaction per employer.
///
/// Employers are processed strictly in order. An employer whose detail request
/// fails is skipped; a database error aborts the run, leaving earlier employers
/// committed.
pub async fn load_employers(
    pool: &PgPool,
    source: &dyn VacancySource,
    employer_ids: &[i32],
    page_count: u32,
    per_page: u32,
) -> Result<LoadSummary, AppError> {
    let mut summary = LoadSummary::default();

    for &employer_id in employer_ids {
        tracing::info!("Processing employer {employer_id} from {}", source.name());

        let body = source.fetch_employer(employer_id).await?;
        let Some(employer) = Employer::from_api(&body) else {
            tracing::warn!("No usable data for employer {employer_id}, skipping");
            summary.employers_skipped += 1;
            continue;
        };

        let raw_vacancies = source
            .search_vacancies_by_employer(employer_id, page_count, per_page)
            .await?;
        summary.vacancies_fetched += raw_vacancies.len();

        let mut tx = pool.begin().await?;
        employer.insert(&mut *tx).await?;

        let mut inserted = 0;
        for raw in &raw_vacancies {
            let mut vacancy = normalize(raw);
            vacancy.employer_id = Some(employer.id);
            if vacancy.insert(&mut *tx).await? {
                inserted += 1;
            }
        }

        tx.commit().await?;
        summary.employers_loaded += 1;
        summary.vacancies_inserted += inserted;
        tracing::info!(
            "Loaded {} vacancies ({inserted} new) for employer {employer_id} ({})",
            raw_vacancies.len(),
            employer.name
        );
    }

    tracing::info!(
        "Load finished: {} employers loaded, {} skipped, {} vacancies stored",
        summary.employers_loaded,
        summary.employers_skipped,
        summary.vacancies_inserted
    );
    Ok(summary)
}
