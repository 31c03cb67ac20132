use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;

use covid_outcomes::algorithm::survival::{
    EndEventPriority, admission_survival_inputs, create_survival_records, expand_to_monthly,
};
use covid_outcomes::config::{DEFAULT_CONFIG_FILE, StudyConfig, database_path, load_config};
use covid_outcomes::database::{self, PopulateSummary};
use covid_outcomes::utils::io::{load_dataset_async, write_dataset, write_views};
use covid_outcomes::{CovidViews, Death, Patient};

#[global_allocator]
static ALLOC: snmalloc_rs::SnMalloc = snmalloc_rs::SnMalloc;

#[derive(Debug, Parser)]
#[clap(name = "covid-outcomes", version, about = "COVID-19 admission and death outcomes")]
struct Cli {
    /// Configuration file; the database lives next to it
    #[clap(long, short = 'c', default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand, PartialEq)]
enum Command {
    /// Create the database and load a synthetic cohort
    Init {
        #[clap(long)]
        overwrite: bool,
    },
    /// Evaluate both views in SQL and in memory and compare
    Views,
    /// Write tables and views to Parquet files
    Export {
        #[clap(long, short = 'o')]
        dir: PathBuf,
    },
    /// Load tables from Parquet files into a fresh database
    Import {
        #[clap(long, short = 'i')]
        dir: PathBuf,
    },
    /// Monthly person-time until first COVID admission
    Survival {
        #[clap(long, value_enum, default_value = "first")]
        priority: Priority,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Priority {
    First,
    Primary,
    Competing,
}

impl From<Priority> for EndEventPriority {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::First => Self::First,
            Priority::Primary => Self::Primary,
            Priority::Competing => Self::Competing,
        }
    }
}

fn resolve_config(path: &Path) -> anyhow::Result<StudyConfig> {
    if path.exists() {
        load_config(path).with_context(|| format!("loading {}", path.display()))
    } else {
        log::warn!("No config file at {}, using defaults", path.display());
        Ok(StudyConfig::default())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = resolve_config(&cli.config)?;
    let db_path = database_path(&cli.config, &config);
    let start = Instant::now();

    match cli.command {
        Command::Init { overwrite } => {
            config.database.overwrite |= overwrite;
            info!("{config}");
            let summary = database::initialise_database(&config, &db_path)?;
            info!("Loaded {summary}");
        }
        Command::Views => {
            let conn = database::open_existing(&db_path)?;
            let sql_admissions = database::query_covid_admissions(&conn)?;
            let sql_deaths = database::query_covid_deaths(&conn)?;

            let dataset = database::load_dataset(&conn)?;
            let views = CovidViews::evaluate(&dataset);

            info!(
                "covid_admissions: {} rows (SQL), {} rows (in memory)",
                sql_admissions.len(),
                views.admissions.len()
            );
            info!(
                "covid_deaths: {} rows (SQL), {} rows (in memory)",
                sql_deaths.len(),
                views.deaths.len()
            );
            if !views.agrees_with(&sql_admissions, &sql_deaths) {
                anyhow::bail!("SQL and in-memory views disagree");
            }
            info!("SQL and in-memory views agree");
        }
        Command::Export { dir } => {
            let conn = database::open_existing(&db_path)?;
            let dataset = database::load_dataset(&conn)?;
            let views = CovidViews::evaluate(&dataset);

            let rows = write_dataset(&dir, &dataset)?
                + write_views(&dir, &views.admissions, &views.deaths)?;
            info!("Exported {rows} rows to {}", dir.display());
        }
        Command::Import { dir } => {
            let dataset = load_dataset_async(&dir)
                .await
                .with_context(|| format!("reading parquet files from {}", dir.display()))?;

            let mut conn = database::create_database(&db_path, true)?;
            let summary: PopulateSummary = database::populate(&mut conn, &dataset)?;
            info!("Imported {summary}");
        }
        Command::Survival { priority } => {
            let conn = database::open_existing(&db_path)?;
            let patients: Vec<Patient> = database::read_relation(&conn)?;
            let admissions = database::query_covid_admissions(&conn)?;
            let deaths: Vec<Death> = database::read_relation(&conn)?;

            let inputs = admission_survival_inputs(&patients, &admissions, &deaths);
            let records = create_survival_records(&inputs, priority.into())?;
            let checksum: i64 = records.iter().map(|r| r.time_at_risk + 1).sum();
            let monthly = expand_to_monthly(&records, Some(checksum))?;

            let events = records
                .iter()
                .filter(|r| r.primary_event_date == Some(r.end_date))
                .count();
            info!(
                "{} patients, {events} first COVID admissions, {checksum} person-days over {} person-months",
                records.len(),
                monthly.len()
            );
        }
    }

    info!("Finished in {:?}", start.elapsed());
    Ok(())
}
