//! Read-only queries against the study database

use chrono::NaiveDate;
use rusqlite::{Connection, Params, Row};

use crate::database::relation::Relation;
use crate::database::schema::is_relation;
use crate::error::{Result, StudyError};
use crate::models::{CovidAdmission, CovidDeath, Dataset, EventTime, PatientId};

static PROHIBITED_STATEMENTS: [&str; 3] = ["INSERT", "UPDATE", "DELETE"];

/// Reject SQL containing `INSERT`, `UPDATE` or `DELETE` keywords.
///
/// Matching is on whole words, case-insensitive, so identifiers such as
/// `LAST_UPDATED` pass.
pub fn ensure_read_only(sql: &str) -> Result<()> {
    let offending = sql
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .find_map(|word| {
            PROHIBITED_STATEMENTS
                .iter()
                .find(|keyword| word.eq_ignore_ascii_case(keyword))
        });

    match offending {
        Some(keyword) => Err(StudyError::ProhibitedStatement((*keyword).to_string())),
        None => Ok(()),
    }
}

/// Run a read-only query and map each row
pub fn query_rows<T, P, F>(conn: &Connection, sql: &str, params: P, map: F) -> Result<Vec<T>>
where
    P: Params,
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    ensure_read_only(sql)?;

    let mut statement = conn.prepare(sql)?;
    let rows = statement
        .query_map(params, map)?
        .collect::<rusqlite::Result<Vec<T>>>()?;
    Ok(rows)
}

/// Read every row of a table or view
pub fn read_relation<R: Relation>(conn: &Connection) -> Result<Vec<R>> {
    query_rows(conn, &R::select_sql(), [], R::from_row)
}

/// Row count of a study table or view, looked up by name
pub fn count_rows(conn: &Connection, relation: &str) -> Result<usize> {
    if !is_relation(relation) {
        return Err(StudyError::UnknownRelation(relation.to_string()));
    }
    let sql = format!("SELECT COUNT(*) FROM {relation}");
    let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(usize::try_from(count).unwrap_or_default())
}

/// Read all six input tables
pub fn load_dataset(conn: &Connection) -> Result<Dataset> {
    Ok(Dataset {
        patients: read_relation(conn)?,
        demographics: read_relation(conn)?,
        infections: read_relation(conn)?,
        therapeutics: read_relation(conn)?,
        hospitalisations: read_relation(conn)?,
        deaths: read_relation(conn)?,
    })
}

/// Rows of the `covid_admissions` view, ordered by patient and admission date
pub fn query_covid_admissions(conn: &Connection) -> Result<Vec<CovidAdmission>> {
    read_relation(conn)
}

/// Rows of the `covid_deaths` view, ordered by patient and date of death
pub fn query_covid_deaths(conn: &Connection) -> Result<Vec<CovidDeath>> {
    read_relation(conn)
}

/// First therapeutic per patient against their earliest positive specimen
#[derive(Debug, Clone, PartialEq)]
pub struct TherapeuticGap {
    pub newnhsno: PatientId,
    pub first_therapeutic: NaiveDate,
    pub earliest_infection: Option<EventTime>,
    pub days_between: Option<f64>,
}

pub fn therapeutic_infection_gaps(conn: &Connection) -> Result<Vec<TherapeuticGap>> {
    let sql = r"
        SELECT
            t.NEWNHSNO,
            MIN(t.RECEIVED) AS FIRST_THERAPEUTIC,
            MIN(i.SPECIMEN_DATE) AS EARLIEST_INFECTION,
            CASE
                WHEN MIN(i.SPECIMEN_DATE) IS NULL THEN NULL
                ELSE julianday(MIN(t.RECEIVED)) - julianday(MIN(i.SPECIMEN_DATE))
            END AS DAYS_BETWEEN
        FROM therapeutics AS t
        LEFT JOIN infections AS i ON t.NEWNHSNO = i.NEWNHSNO
        GROUP BY t.NEWNHSNO
        HAVING FIRST_THERAPEUTIC IS NOT NULL
        ORDER BY t.NEWNHSNO
    ";

    query_rows(conn, sql, [], |row| {
        Ok(TherapeuticGap {
            newnhsno: row.get("NEWNHSNO")?,
            first_therapeutic: row.get("FIRST_THERAPEUTIC")?,
            earliest_infection: row.get("EARLIEST_INFECTION")?,
            days_between: row.get("DAYS_BETWEEN")?,
        })
    })
}

/// A positive test paired with an admission that followed it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfectionAdmission {
    pub newnhsno: PatientId,
    pub specimen_date: EventTime,
    pub episode_num: i64,
    pub infection_num: i64,
    pub admidate_dv: EventTime,
    pub episode_count: i64,
    pub admi_len: Option<i64>,
}

/// Admissions falling on or up to `days` days after any positive specimen
pub fn hospitalisations_within_days_of_infection(
    conn: &Connection,
    days: u32,
) -> Result<Vec<InfectionAdmission>> {
    let sql = r"
        SELECT
            i.NEWNHSNO,
            i.SPECIMEN_DATE,
            i.EPISODE_NUM,
            i.INFECTION_NUM,
            h.ADMIDATE_DV,
            h.EPISODE_COUNT,
            h.ADMI_LEN
        FROM infections AS i
        JOIN hospitalisations AS h ON i.NEWNHSNO = h.NEWNHSNO
        WHERE julianday(h.ADMIDATE_DV) - julianday(i.SPECIMEN_DATE) BETWEEN 0 AND ?1
        ORDER BY i.NEWNHSNO, julianday(i.SPECIMEN_DATE), julianday(h.ADMIDATE_DV)
    ";

    query_rows(conn, sql, [f64::from(days)], |row| {
        Ok(InfectionAdmission {
            newnhsno: row.get("NEWNHSNO")?,
            specimen_date: row.get("SPECIMEN_DATE")?,
            episode_num: row.get("EPISODE_NUM")?,
            infection_num: row.get("INFECTION_NUM")?,
            admidate_dv: row.get("ADMIDATE_DV")?,
            episode_count: row.get("EPISODE_COUNT")?,
            admi_len: row.get("ADMI_LEN")?,
        })
    })
}
