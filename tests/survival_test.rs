mod utils;

use covid_outcomes::StudyError;
use covid_outcomes::algorithm::survival::{
    EndEventPriority, SurvivalInput, admission_survival_inputs, create_survival_records,
    expand_to_monthly,
};
use covid_outcomes::covid_admissions;
use utils::{date, death, hospitalisation, infection, patient};

fn input(
    primary: Option<chrono::NaiveDate>,
    competing: Option<chrono::NaiveDate>,
) -> SurvivalInput {
    SurvivalInput {
        patient_id: 1,
        start_date: date(2021, 1, 15),
        primary_event_date: primary,
        competing_event_date: competing,
        censor_date: Some(date(2021, 7, 14)),
    }
}

#[test]
fn end_date_follows_priority() {
    let inputs = [input(Some(date(2021, 3, 1)), Some(date(2021, 2, 1)))];

    let first = create_survival_records(&inputs, EndEventPriority::First).unwrap();
    assert_eq!(first[0].end_date, date(2021, 2, 1));

    let primary = create_survival_records(&inputs, EndEventPriority::Primary).unwrap();
    assert_eq!(primary[0].end_date, date(2021, 3, 1));
    assert_eq!(primary[0].time_at_risk, 45);

    let competing = create_survival_records(&inputs, EndEventPriority::Competing).unwrap();
    assert_eq!(competing[0].end_date, date(2021, 2, 1));
}

#[test]
fn censoring_ends_follow_up_without_events() {
    let records = create_survival_records(&[input(None, None)], EndEventPriority::First).unwrap();
    assert_eq!(records[0].end_date, date(2021, 7, 14));
    assert_eq!(records[0].time_at_risk, 180);
}

#[test]
fn end_before_start_is_rejected() {
    let bad = input(Some(date(2021, 1, 1)), None);
    assert!(matches!(
        create_survival_records(&[bad], EndEventPriority::First),
        Err(StudyError::InvalidSurvivalData { patient_id: 1, .. })
    ));
}

#[test]
fn monthly_expansion_splits_partial_months() {
    let records =
        create_survival_records(&[input(Some(date(2021, 3, 10)), None)], EndEventPriority::First)
            .unwrap();
    let checksum = records[0].time_at_risk + 1;
    let monthly = expand_to_monthly(&records, Some(checksum)).unwrap();

    let labels: Vec<_> = monthly.iter().map(|m| m.month.as_str()).collect();
    assert_eq!(labels, ["Jan-21", "Feb-21", "Mar-21"]);
    let days: Vec<_> = monthly.iter().map(|m| m.time).collect();
    assert_eq!(days, [17, 28, 10]);
}

#[test]
fn wrong_checksum_fails() {
    let records = create_survival_records(&[input(None, None)], EndEventPriority::First).unwrap();
    assert!(matches!(
        expand_to_monthly(&records, Some(1)),
        Err(StudyError::ExpansionCheck(_))
    ));
}

#[test]
fn admission_inputs_use_first_covid_admission() {
    let patients = vec![patient(1, date(2021, 1, 1)), patient(2, date(2021, 1, 1))];
    let admissions = covid_admissions(
        &[
            hospitalisation(1, date(2021, 2, 20), false),
            hospitalisation(1, date(2021, 2, 10), false),
            hospitalisation(2, date(2021, 2, 10), false),
        ],
        &[infection(1, date(2021, 2, 5), 1, 1)],
    );
    let deaths = [death(1, date(2021, 3, 1), false)];

    let inputs = admission_survival_inputs(&patients, &admissions, &deaths);
    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs[0].primary_event_date, Some(date(2021, 2, 10)));
    assert_eq!(inputs[0].competing_event_date, Some(date(2021, 3, 1)));
    assert_eq!(inputs[1].primary_event_date, None);
    assert_eq!(inputs[1].censor_date, Some(date(2021, 6, 30)));
}
