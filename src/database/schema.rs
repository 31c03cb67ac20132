//! Table and view definitions for the study database

use crate::algorithm::correlation::ClinicalWindow;

/// Input relations, in dependency order
pub const TABLES: [&str; 6] = [
    "patients",
    "demographics",
    "infections",
    "therapeutics",
    "hospitalisations",
    "deaths",
];

pub(crate) const CREATE_TABLES: &str = r"
CREATE TABLE IF NOT EXISTS patients (
    NEWNHSNO INTEGER PRIMARY KEY,
    ABDATE DATE NOT NULL,
    ABDATE_6M DATE NOT NULL,
    COHORT TEXT NOT NULL,
    AB_STATUS BOOLEAN NOT NULL
);

CREATE TABLE IF NOT EXISTS demographics (
    NEWNHSNO INTEGER PRIMARY KEY REFERENCES patients (NEWNHSNO),
    DOB DATE NOT NULL,
    SEX TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS infections (
    NEWNHSNO INTEGER NOT NULL REFERENCES patients (NEWNHSNO),
    SPECIMEN_DATE DATE NOT NULL,
    EPISODE_NUM INTEGER NOT NULL,
    INFECTION_NUM INTEGER NOT NULL,
    DAYS_SINCE_EPISODE_START INTEGER NOT NULL,
    UNIQUE (NEWNHSNO, EPISODE_NUM, INFECTION_NUM)
);
CREATE INDEX IF NOT EXISTS idx_infections_patient
    ON infections (NEWNHSNO, INFECTION_NUM, SPECIMEN_DATE);

CREATE TABLE IF NOT EXISTS therapeutics (
    NEWNHSNO INTEGER NOT NULL REFERENCES patients (NEWNHSNO),
    THERAPEUTIC_NUM INTEGER NOT NULL,
    RECEIVED DATE NOT NULL,
    INTERVENTION TEXT NOT NULL,
    UNIQUE (NEWNHSNO, RECEIVED, INTERVENTION)
);

CREATE TABLE IF NOT EXISTS hospitalisations (
    NEWNHSNO INTEGER NOT NULL REFERENCES patients (NEWNHSNO),
    ADMIDATE_DV DATE NOT NULL,
    EPISODE_COUNT INTEGER NOT NULL,
    ADMI_LEN INTEGER,
    DIAG_CODE_MATCH BOOLEAN NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS deaths (
    NEWNHSNO INTEGER NOT NULL UNIQUE REFERENCES patients (NEWNHSNO),
    DOD DATE NOT NULL,
    ICDU_GROUP TEXT,
    ICD10 TEXT,
    CODE_MENTIONED BOOLEAN NOT NULL DEFAULT 0,
    CODE_UNDERLYING BOOLEAN NOT NULL DEFAULT 0
);
";

/// One derived view: which events it correlates and how
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewDefinition {
    pub name: &'static str,
    pub event_table: &'static str,
    pub event_date_column: &'static str,
    /// Upstream boolean that includes a row regardless of dates
    pub flag_column: &'static str,
    /// Derived day-gap column
    pub gap_column: &'static str,
    pub window: ClinicalWindow,
}

pub const COVID_ADMISSIONS: ViewDefinition = ViewDefinition {
    name: "covid_admissions",
    event_table: "hospitalisations",
    event_date_column: "ADMIDATE_DV",
    flag_column: "DIAG_CODE_MATCH",
    gap_column: "INFECTION_TO_ADMISSION_DAYS",
    window: ClinicalWindow::ADMISSION,
};

pub const COVID_DEATHS: ViewDefinition = ViewDefinition {
    name: "covid_deaths",
    event_table: "deaths",
    event_date_column: "DOD",
    flag_column: "CODE_UNDERLYING",
    gap_column: "INFECTION_TO_DEATH_DAYS",
    window: ClinicalWindow::DEATH,
};

pub const VIEWS: [ViewDefinition; 2] = [COVID_ADMISSIONS, COVID_DEATHS];

/// `name` is one of [`TABLES`] or [`VIEWS`]
#[must_use]
pub fn is_relation(name: &str) -> bool {
    TABLES.contains(&name) || VIEWS.iter().any(|view| view.name == name)
}

pub const CLOSEST_DATE_COLUMN: &str = "CLOSEST_PRIOR_EPISODE_START_DATE";

impl ViewDefinition {
    /// Boolean column marking a gap inside the window
    #[must_use]
    pub fn window_flag_column(&self) -> String {
        format!("INFECTION_WITHIN_{}_DAYS_PRIOR", self.window.days())
    }

    /// `CREATE VIEW` statement.
    ///
    /// Dates are compared and subtracted through `julianday()` so fractional
    /// time-of-day components survive into the gap.
    #[must_use]
    pub fn create_sql(&self) -> String {
        let Self {
            name,
            event_table,
            event_date_column: event_date,
            flag_column,
            gap_column: gap,
            window,
        } = self;
        let days = window.days();
        let window_flag = self.window_flag_column();

        format!(
            r"
CREATE VIEW IF NOT EXISTS {name} AS
WITH correlated AS (
    SELECT
        e.*,
        (
            SELECT i.SPECIMEN_DATE
            FROM infections AS i
            WHERE i.NEWNHSNO = e.NEWNHSNO
              AND i.INFECTION_NUM = 1
              AND julianday(i.SPECIMEN_DATE) <= julianday(e.{event_date})
            ORDER BY julianday(i.SPECIMEN_DATE) DESC
            LIMIT 1
        ) AS {CLOSEST_DATE_COLUMN}
    FROM {event_table} AS e
),
measured AS (
    SELECT
        c.*,
        julianday(c.{event_date}) - julianday(c.{CLOSEST_DATE_COLUMN}) AS {gap}
    FROM correlated AS c
)
SELECT
    m.*,
    (m.{gap} IS NOT NULL AND m.{gap} <= {days}) AS {window_flag}
FROM measured AS m
WHERE (m.{gap} IS NOT NULL AND m.{gap} <= {days})
   OR m.{flag_column} = 1;
"
        )
    }

    #[must_use]
    pub fn drop_sql(&self) -> String {
        format!("DROP VIEW IF EXISTS {};", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_sql_names_window_columns() {
        let sql = COVID_ADMISSIONS.create_sql();
        assert!(sql.contains("CREATE VIEW IF NOT EXISTS covid_admissions"));
        assert!(sql.contains("AS INFECTION_WITHIN_14_DAYS_PRIOR"));
        assert!(sql.contains("m.DIAG_CODE_MATCH = 1"));

        let sql = COVID_DEATHS.create_sql();
        assert!(sql.contains("AS INFECTION_WITHIN_28_DAYS_PRIOR"));
        assert!(sql.contains("julianday(e.DOD)"));
    }
}
