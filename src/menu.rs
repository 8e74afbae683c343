use std::io::{BufRead, Write};

use crate::error::AppError;
use crate::models::employer::CompanyVacancyCount;
use crate::models::vacancy::{VacancyListing, VacancySummary};
use crate::queries::VacancyQueries;

const MENU: &str = "
Choose an action:
1 - Companies and vacancy counts
2 - All vacancies
3 - Average salary
4 - Vacancies with salary above average
5 - Search vacancies by keyword
0 - Exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Companies,
    AllVacancies,
    AverageSalary,
    HigherSalary,
    KeywordSearch,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<MenuChoice> {
        match input.trim() {
            "1" => Some(MenuChoice::Companies),
            "2" => Some(MenuChoice::AllVacancies),
            "3" => Some(MenuChoice::AverageSalary),
            "4" => Some(MenuChoice::HigherSalary),
            "5" => Some(MenuChoice::KeywordSearch),
            "0" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// Interactive loop over the query layer. Ends on "0" or end of input.
pub async fn run<R: BufRead, W: Write>(
    queries: &VacancyQueries,
    mut input: R,
    mut output: W,
) -> Result<(), AppError> {
    loop {
        writeln!(output, "{MENU}")?;
        let Some(line) = prompt(&mut input, &mut output, "Enter action number: ")? else {
            break;
        };

        match MenuChoice::parse(&line) {
            Some(MenuChoice::Companies) => {
                let rows = queries.get_companies_and_vacancies_count().await?;
                write_companies(&mut output, &rows)?;
            }
            Some(MenuChoice::AllVacancies) => {
                let rows = queries.get_all_vacancies().await?;
                write_listings(&mut output, &rows)?;
            }
            Some(MenuChoice::AverageSalary) => {
                let avg = queries.get_avg_salary().await?;
                write_average(&mut output, avg)?;
            }
            Some(MenuChoice::HigherSalary) => {
                let rows = queries.get_vacancies_with_higher_salary().await?;
                write_summaries(&mut output, &rows)?;
            }
            Some(MenuChoice::KeywordSearch) => {
                let Some(keyword) = prompt(&mut input, &mut output, "Enter keyword: ")? else {
                    break;
                };
                let rows = queries.get_vacancies_with_keyword(keyword.trim()).await?;
                write_summaries(&mut output, &rows)?;
            }
            Some(MenuChoice::Exit) => {
                writeln!(output, "Bye.")?;
                break;
            }
            None => writeln!(output, "Invalid choice, try again.")?,
        }
    }
    Ok(())
}

/// Print a prompt and read one line; None at end of input.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    text: &str,
) -> Result<Option<String>, AppError> {
    write!(output, "{text}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Human-readable salary range; zero and null bounds both count as unspecified.
pub fn format_salary(from: Option<i32>, to: Option<i32>) -> String {
    let from = from.filter(|v| *v != 0);
    let to = to.filter(|v| *v != 0);
    match (from, to) {
        (Some(from), Some(to)) => format!("from {from} to {to} RUB"),
        (Some(from), None) => format!("from {from} RUB"),
        (None, Some(to)) => format!("up to {to} RUB"),
        (None, None) => "salary not specified".to_string(),
    }
}

fn write_companies<W: Write>(out: &mut W, rows: &[CompanyVacancyCount]) -> std::io::Result<()> {
    for row in rows {
        writeln!(out, "{}: {} open vacancies", row.name, row.vacancies_count)?;
    }
    Ok(())
}

fn write_listings<W: Write>(out: &mut W, rows: &[VacancyListing]) -> std::io::Result<()> {
    for row in rows {
        writeln!(
            out,
            "Company: {}, Vacancy: {}, {}, Link: {}",
            row.employer_name,
            row.title.as_deref().unwrap_or("-"),
            format_salary(row.salary_from, row.salary_to),
            row.url.as_deref().unwrap_or("-")
        )?;
    }
    Ok(())
}

fn write_summaries<W: Write>(out: &mut W, rows: &[VacancySummary]) -> std::io::Result<()> {
    if rows.is_empty() {
        writeln!(out, "No vacancies found.")?;
    }
    for row in rows {
        writeln!(
            out,
            "Vacancy: {}, {}, Link: {}",
            row.title.as_deref().unwrap_or("-"),
            format_salary(row.salary_from, row.salary_to),
            row.url.as_deref().unwrap_or("-")
        )?;
    }
    Ok(())
}

fn write_average<W: Write>(out: &mut W, avg: Option<f64>) -> std::io::Result<()> {
    match avg {
        Some(avg) => writeln!(out, "Average salary: {avg:.2} RUB"),
        None => writeln!(out, "Average salary: no vacancies with a full salary range"),
    }
}
