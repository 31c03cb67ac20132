//! SQLite study database.
//!
//! Holds the six input relations and the two derived views. Views are
//! virtual: every query recomputes them from the current table contents.

pub mod populate;
pub mod queries;
pub mod relation;
pub mod schema;

use std::path::Path;

use rusqlite::Connection;

use crate::config::StudyConfig;
use crate::dummy::DummyDataGenerator;
use crate::error::{Result, StudyError};
use crate::utils::logging::{Action, Operation, create_spinner, finish_progress_bar};

pub use populate::{PopulateSummary, populate};
pub use queries::{
    count_rows, ensure_read_only, hospitalisations_within_days_of_infection, load_dataset,
    query_covid_admissions, query_covid_deaths, read_relation, therapeutic_infection_gaps,
};
pub use relation::{Insertable, Relation};
pub use schema::{COVID_ADMISSIONS, COVID_DEATHS, TABLES, VIEWS, ViewDefinition};

/// Create tables and (re)create the views on an open connection
pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(schema::CREATE_TABLES)?;
    create_views(conn)
}

/// Replace both derived views
pub fn create_views(conn: &Connection) -> Result<()> {
    for view in VIEWS {
        conn.execute_batch(&view.drop_sql())?;
        conn.execute_batch(&view.create_sql())?;
    }
    Ok(())
}

/// Drop views and tables
pub fn drop_schema(conn: &Connection) -> Result<()> {
    for view in VIEWS {
        conn.execute_batch(&view.drop_sql())?;
    }
    for table in TABLES.iter().rev() {
        conn.execute_batch(&format!("DROP TABLE IF EXISTS {table};"))?;
    }
    Ok(())
}

/// Open (creating if needed) a database file and ensure the schema exists
pub fn create_database(path: &Path, overwrite: bool) -> Result<Connection> {
    log::info!("Opening database at {}", path.display());
    let conn = Connection::open(path)?;
    if overwrite {
        log::info!("Dropping existing tables");
        drop_schema(&conn)?;
    }
    create_schema(&conn)?;
    Ok(conn)
}

/// Open a database that must already exist
pub fn open_existing(path: &Path) -> Result<Connection> {
    if !path.exists() {
        return Err(StudyError::DatabaseNotFound(path.to_path_buf()));
    }
    Ok(Connection::open(path)?)
}

/// In-memory database with the full schema
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Create the database, generate a dummy cohort and load it
pub fn initialise_database(config: &StudyConfig, path: &Path) -> Result<PopulateSummary> {
    config.validate()?;
    let operation = Operation::start(Action::InitialiseDatabase, path);

    let mut conn = create_database(path, config.database.overwrite)?;
    let dataset = DummyDataGenerator::new(config.dummy_data.clone()).generate();

    let spinner = create_spinner(Some("Populating database"));
    let summary = populate(&mut conn, &dataset);
    finish_progress_bar(&spinner, Some("Database populated"));
    let summary = summary?;

    operation.finish(summary.total());
    Ok(summary)
}
