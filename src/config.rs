use clap::Parser;
use sqlx::postgres::PgConnectOptions;

/// Maintenance database used to create the target database.
pub const MAINTENANCE_DATABASE: &str = "postgres";

#[derive(Parser, Debug, Clone)]
#[command(name = "hh-vacancies", about = "Load hh.ru vacancies into PostgreSQL and query them")]
pub struct Config {
    #[command(flatten)]
    pub db: DbConfig,

    #[command(flatten)]
    pub source: SourceConfig,

    /// Employer identifiers to load
    #[arg(
        long,
        env = "EMPLOYER_IDS",
        value_delimiter = ',',
        default_values_t = [1740, 3529, 78638, 15478, 2180, 87021, 4181, 3776, 39305, 64174]
    )]
    pub employer_ids: Vec<i32>,

    /// Add a unique index on vacancies.url so repeated loads skip known vacancies
    #[arg(long, env = "UNIQUE_VACANCY_URLS", default_value = "false")]
    pub unique_vacancy_urls: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct DbConfig {
    /// Database name
    #[arg(long = "db-name", env = "DB_NAME", default_value = "hh_vacancies")]
    pub name: String,

    /// Database user
    #[arg(long = "db-user", env = "DB_USER", default_value = "postgres")]
    pub user: String,

    /// Database password
    #[arg(long = "db-password", env = "DB_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,

    /// Database host
    #[arg(long = "db-host", env = "DB_HOST", default_value = "localhost")]
    pub host: String,

    /// Database port
    #[arg(long = "db-port", env = "DB_PORT", default_value = "5432")]
    pub port: u16,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SourceConfig {
    /// Vacancy search endpoint
    #[arg(long, env = "HH_VACANCIES_URL", default_value = "https://api.hh.ru/vacancies")]
    pub vacancies_url: String,

    /// Employer detail endpoint; the employer id is appended as a path segment
    #[arg(long, env = "HH_EMPLOYERS_URL", default_value = "https://api.hh.ru/employers")]
    pub employers_url: String,

    /// Number of result pages to request per search
    #[arg(long, env = "PAGES", default_value = "1")]
    pub pages: u32,

    /// Results per page
    #[arg(long, env = "PER_PAGE", default_value = "20")]
    pub per_page: u32,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the database and tables, load all employers, then open the menu (default)
    Run,
    /// Create the database and tables if they do not exist
    Init,
    /// Fetch the configured employers and their vacancies into the database
    Load,
    /// Open the interactive query menu
    Menu,
    /// Remove all rows and restart the vacancy id sequence
    Refresh,
    /// Drop both tables
    Drop,
    /// Search vacancies through the API and print normalized records as JSON lines
    Search {
        /// Free-text search keyword
        keyword: String,

        /// Attach each vacancy's employer details, fetching every employer once
        #[arg(long)]
        with_employers: bool,
    },
}

impl Config {
    /// Resolve the command, defaulting to Run if none specified.
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}

impl DbConfig {
    /// Connection options for the configured target database.
    pub fn connect_options(&self) -> PgConnectOptions {
        self.connect_options_for(&self.name)
    }

    /// Connection options for the maintenance database on the same server.
    pub fn maintenance_options(&self) -> PgConnectOptions {
        self.connect_options_for(MAINTENANCE_DATABASE)
    }

    fn connect_options_for(&self, database: &str) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(database)
    }
}
