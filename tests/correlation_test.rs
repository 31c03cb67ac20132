mod utils;

use covid_outcomes::database::{self, load_dataset, query_covid_admissions, query_covid_deaths};
use covid_outcomes::{CovidAdmission, CovidDeath, CovidViews, Dataset, EventTime};
use utils::{dataset_for, date, date_time, death, hospitalisation, infection};

/// Evaluate both views in memory and through SQLite views
fn evaluate_both(dataset: &Dataset) -> (CovidViews, Vec<CovidAdmission>, Vec<CovidDeath>) {
    let mut conn = database::open_in_memory().unwrap();
    database::populate(&mut conn, dataset).unwrap();

    let admissions = query_covid_admissions(&conn).unwrap();
    let deaths = query_covid_deaths(&conn).unwrap();
    (CovidViews::evaluate(dataset), admissions, deaths)
}

#[test]
fn admission_nine_days_after_infection_is_included() {
    let dataset = dataset_for(
        &[1],
        vec![infection(1, date(2021, 1, 1), 1, 1)],
        vec![hospitalisation(1, date(2021, 1, 10), false)],
        vec![],
    );

    let (views, sql, _) = evaluate_both(&dataset);
    for admissions in [&views.admissions, &sql] {
        assert_eq!(admissions.len(), 1);
        let row = &admissions[0];
        assert_eq!(row.hospitalisation(), dataset.hospitalisations[0]);
        assert_eq!(
            row.closest_prior_episode_start_date,
            Some(EventTime::from(date(2021, 1, 1)))
        );
        assert_eq!(row.infection_to_admission_days, Some(9.0));
        assert!(row.infection_within_14_days_prior);
    }
}

#[test]
fn admission_thirty_one_days_after_infection_is_excluded() {
    let dataset = dataset_for(
        &[1],
        vec![infection(1, date(2021, 1, 1), 1, 1)],
        vec![hospitalisation(1, date(2021, 2, 1), false)],
        vec![],
    );

    let (views, sql, _) = evaluate_both(&dataset);
    assert!(views.admissions.is_empty());
    assert!(sql.is_empty());
}

#[test]
fn evaluation_is_idempotent() {
    let dataset = dataset_for(
        &[1, 2],
        vec![
            infection(1, date(2021, 1, 1), 1, 1),
            infection(2, date(2021, 3, 1), 1, 1),
        ],
        vec![
            hospitalisation(1, date(2021, 1, 5), false),
            hospitalisation(2, date(2021, 5, 1), true),
        ],
        vec![death(2, date(2021, 3, 20), false)],
    );

    assert_eq!(CovidViews::evaluate(&dataset), CovidViews::evaluate(&dataset));

    let mut conn = database::open_in_memory().unwrap();
    database::populate(&mut conn, &dataset).unwrap();
    assert_eq!(
        query_covid_admissions(&conn).unwrap(),
        query_covid_admissions(&conn).unwrap()
    );
    assert_eq!(
        query_covid_deaths(&conn).unwrap(),
        query_covid_deaths(&conn).unwrap()
    );
}

#[test]
fn single_episode_is_always_the_closest_match() {
    let infection_date = date(2021, 2, 1);
    let events = [0_u64, 1, 13, 40, 120]
        .into_iter()
        .map(|offset| hospitalisation(1, infection_date + chrono::Days::new(offset), true))
        .collect();
    let dataset = dataset_for(&[1], vec![infection(1, infection_date, 1, 1)], events, vec![]);

    let (views, sql, _) = evaluate_both(&dataset);
    assert_eq!(views.admissions.len(), 5);
    assert_eq!(sql.len(), 5);
    for row in views.admissions.iter().chain(&sql) {
        assert_eq!(row.closest_prior_episode_start_date, Some(EventTime::from(infection_date)));
    }
}

#[test]
fn admission_window_boundary() {
    let dataset = dataset_for(
        &[1, 2],
        vec![
            infection(1, date(2021, 1, 1), 1, 1),
            infection(2, date(2021, 1, 1), 1, 1),
        ],
        vec![
            hospitalisation(1, date(2021, 1, 15), false),
            hospitalisation(2, date(2021, 1, 16), false),
        ],
        vec![],
    );

    let (views, sql, _) = evaluate_both(&dataset);
    for admissions in [&views.admissions, &sql] {
        assert_eq!(admissions.len(), 1);
        assert_eq!(admissions[0].newnhsno, 1);
        assert_eq!(admissions[0].infection_to_admission_days, Some(14.0));
        assert!(admissions[0].infection_within_14_days_prior);
    }
}

#[test]
fn death_window_boundary() {
    let dataset = dataset_for(
        &[1, 2],
        vec![
            infection(1, date(2021, 1, 1), 1, 1),
            infection(2, date(2021, 1, 1), 1, 1),
        ],
        vec![],
        vec![
            death(1, date(2021, 1, 29), false),
            death(2, date(2021, 1, 30), false),
        ],
    );

    let (views, _, sql) = evaluate_both(&dataset);
    for deaths in [&views.deaths, &sql] {
        assert_eq!(deaths.len(), 1);
        assert_eq!(deaths[0].death(), dataset.deaths[0]);
        assert_eq!(deaths[0].infection_to_death_days, Some(28.0));
        assert!(deaths[0].infection_within_28_days_prior);
    }
}

#[test]
fn independent_flag_includes_events_without_infection() {
    let dataset = dataset_for(
        &[1],
        vec![],
        vec![hospitalisation(1, date(2021, 3, 1), true)],
        vec![death(1, date(2021, 3, 10), true)],
    );

    let (views, sql_admissions, sql_deaths) = evaluate_both(&dataset);
    for admissions in [&views.admissions, &sql_admissions] {
        assert_eq!(admissions.len(), 1);
        assert_eq!(admissions[0].closest_prior_episode_start_date, None);
        assert_eq!(admissions[0].infection_to_admission_days, None);
        assert!(!admissions[0].infection_within_14_days_prior);
    }
    for deaths in [&views.deaths, &sql_deaths] {
        assert_eq!(deaths.len(), 1);
        assert_eq!(deaths[0].closest_prior_episode_start_date, None);
        assert_eq!(deaths[0].infection_to_death_days, None);
        assert!(!deaths[0].infection_within_28_days_prior);
    }
}

#[test]
fn events_without_infection_or_flag_are_excluded() {
    let dataset = dataset_for(
        &[1],
        vec![infection(1, date(2021, 6, 1), 1, 1)],
        vec![hospitalisation(1, date(2021, 3, 1), false)],
        vec![death(1, date(2021, 3, 10), false)],
    );

    let (views, sql_admissions, sql_deaths) = evaluate_both(&dataset);
    assert!(views.admissions.is_empty());
    assert!(views.deaths.is_empty());
    assert!(sql_admissions.is_empty());
    assert!(sql_deaths.is_empty());
}

#[test]
fn follow_up_tests_are_not_matched() {
    let dataset = dataset_for(
        &[1],
        vec![
            infection(1, date(2021, 1, 1), 1, 1),
            infection(1, date(2021, 1, 20), 1, 2),
        ],
        vec![hospitalisation(1, date(2021, 1, 22), false)],
        vec![],
    );

    let (views, sql, _) = evaluate_both(&dataset);
    assert!(views.admissions.is_empty());
    assert!(sql.is_empty());
}

#[test]
fn later_episode_replaces_earlier_one() {
    let dataset = dataset_for(
        &[1],
        vec![
            infection(1, date(2021, 1, 1), 1, 1),
            infection(1, date(2021, 5, 1), 2, 1),
        ],
        vec![hospitalisation(1, date(2021, 5, 10), false)],
        vec![],
    );

    let (views, sql, _) = evaluate_both(&dataset);
    for admissions in [&views.admissions, &sql] {
        assert_eq!(admissions.len(), 1);
        assert_eq!(
            admissions[0].closest_prior_episode_start_date,
            Some(EventTime::from(date(2021, 5, 1)))
        );
        assert_eq!(admissions[0].infection_to_admission_days, Some(9.0));
    }
}

#[test]
fn flagged_event_keeps_out_of_window_correlation() {
    let dataset = dataset_for(
        &[1],
        vec![infection(1, date(2021, 1, 1), 1, 1)],
        vec![],
        vec![death(1, date(2021, 3, 1), true)],
    );

    let (views, _, sql) = evaluate_both(&dataset);
    for deaths in [&views.deaths, &sql] {
        assert_eq!(deaths.len(), 1);
        assert_eq!(
            deaths[0].closest_prior_episode_start_date,
            Some(EventTime::from(date(2021, 1, 1)))
        );
        assert_eq!(deaths[0].infection_to_death_days, Some(59.0));
        assert!(!deaths[0].infection_within_28_days_prior);
    }
}

#[test]
fn time_of_day_decides_the_admission_window() {
    let mut conn = database::open_in_memory().unwrap();
    let dataset = dataset_for(&[1], vec![infection(1, date(2021, 1, 1), 1, 1)], vec![], vec![]);
    database::populate(&mut conn, &dataset).unwrap();
    for admitted in ["2021-01-15 06:00:00", "2021-01-14 18:00:00"] {
        conn.execute(
            "INSERT INTO hospitalisations \
             (NEWNHSNO, ADMIDATE_DV, EPISODE_COUNT, ADMI_LEN, DIAG_CODE_MATCH) \
             VALUES (1, ?1, 1, 2, 0)",
            [admitted],
        )
        .unwrap();
    }

    let sql = query_covid_admissions(&conn).unwrap();
    assert_eq!(sql.len(), 1);
    assert_eq!(sql[0].admidate_dv, EventTime::from(date_time(2021, 1, 14, 18, 0)));
    assert_eq!(sql[0].infection_to_admission_days, Some(13.75));
    assert!(sql[0].infection_within_14_days_prior);

    let loaded = load_dataset(&conn).unwrap();
    assert_eq!(loaded.hospitalisations.len(), 2);
    assert!(loaded.hospitalisations.iter().all(|h| !h.admidate_dv.is_date_only()));

    let views = CovidViews::evaluate(&loaded);
    assert_eq!(views.admissions, sql);
    assert!(views.agrees_with(&sql, &[]));
}

#[test]
fn date_time_events_round_trip_through_sqlite() {
    let dataset = dataset_for(
        &[1, 2],
        vec![
            infection(1, date_time(2021, 1, 1, 12, 0), 1, 1),
            infection(2, date(2021, 1, 1), 1, 1),
        ],
        vec![],
        vec![
            death(1, date_time(2021, 1, 29, 6, 0), false),
            death(2, date_time(2021, 1, 29, 18, 0), false),
        ],
    );

    let (views, sql_admissions, sql_deaths) = evaluate_both(&dataset);
    assert!(views.agrees_with(&sql_admissions, &sql_deaths));
    for deaths in [&views.deaths, &sql_deaths] {
        assert_eq!(deaths.len(), 1);
        assert_eq!(deaths[0].death(), dataset.deaths[0]);
        assert_eq!(
            deaths[0].closest_prior_episode_start_date,
            Some(EventTime::from(date_time(2021, 1, 1, 12, 0)))
        );
        assert_eq!(deaths[0].infection_to_death_days, Some(27.75));
    }
}
