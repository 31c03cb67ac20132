mod utils;

use covid_outcomes::config::DummyDataConfig;
use covid_outcomes::models::{ArrowSchema, CovidAdmission, CovidDeath};
use covid_outcomes::utils::io::{
    load_dataset_async, read_dataset, read_records, relation_path, write_dataset, write_records,
    write_views,
};
use covid_outcomes::{CovidViews, Hospitalisation, StudyError, generate_dataset};
use tempfile::TempDir;
use utils::{dataset_for, date, date_time, death, hospitalisation, infection};

fn sample_views() -> CovidViews {
    let dataset = dataset_for(
        &[1, 2],
        vec![infection(1, date(2021, 1, 1), 1, 1)],
        vec![
            hospitalisation(1, date(2021, 1, 10), false),
            hospitalisation(2, date(2021, 1, 10), true),
        ],
        vec![death(1, date(2021, 1, 20), false)],
    );
    CovidViews::evaluate(&dataset)
}

#[test]
fn views_survive_parquet_export() {
    let dir = TempDir::new().unwrap();
    let views = sample_views();
    assert_eq!(views.admissions.len(), 2);

    let written = write_views(dir.path(), &views.admissions, &views.deaths).unwrap();
    assert_eq!(written, 3);

    let admissions: Vec<CovidAdmission> =
        read_records(&relation_path::<CovidAdmission>(dir.path())).unwrap();
    let deaths: Vec<CovidDeath> = read_records(&relation_path::<CovidDeath>(dir.path())).unwrap();

    assert_eq!(admissions, views.admissions);
    assert_eq!(deaths, views.deaths);
    assert_eq!(admissions[1].closest_prior_episode_start_date, None);
}

#[test]
fn time_of_day_survives_parquet_export() {
    let dir = TempDir::new().unwrap();
    let dataset = dataset_for(
        &[1],
        vec![infection(1, date_time(2021, 1, 1, 6, 0), 1, 1)],
        vec![hospitalisation(1, date_time(2021, 1, 14, 18, 0), false)],
        vec![],
    );
    write_dataset(dir.path(), &dataset).unwrap();

    let restored = read_dataset(dir.path()).unwrap();
    assert_eq!(restored, dataset);
    assert!(!restored.hospitalisations[0].admidate_dv.is_date_only());

    let views = CovidViews::evaluate(&restored);
    assert_eq!(views.admissions.len(), 1);
    assert_eq!(views.admissions[0].infection_to_admission_days, Some(13.5));
}

#[test]
fn view_batches_use_timestamp_columns() {
    let batch = CovidAdmission::to_record_batch(&sample_views().admissions).unwrap();
    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.schema(), CovidAdmission::schema_ref());
}

#[test]
fn missing_columns_are_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hospitalisations.parquet");
    write_records(&path, &[hospitalisation(1, date(2021, 1, 1), false)]).unwrap();

    let err = read_records::<CovidAdmission>(&path).unwrap_err();
    assert!(matches!(err, StudyError::ColumnNotFound { .. }));

    let rows: Vec<Hospitalisation> = read_records(&path).unwrap();
    assert_eq!(rows.len(), 1);
}

#[test]
fn dataset_directory_round_trip() {
    let dir = TempDir::new().unwrap();
    let dataset = generate_dataset(&DummyDataConfig {
        n_patients: 100,
        ..DummyDataConfig::default()
    });

    let written = write_dataset(dir.path(), &dataset).unwrap();
    assert_eq!(written, dataset.total_rows());
    assert_eq!(read_dataset(dir.path()).unwrap(), dataset);
}

#[tokio::test]
async fn async_load_matches_sync_read() {
    let dir = TempDir::new().unwrap();
    let dataset = generate_dataset(&DummyDataConfig {
        n_patients: 50,
        seed: 2,
        ..DummyDataConfig::default()
    });
    write_dataset(dir.path(), &dataset).unwrap();

    let loaded = load_dataset_async(dir.path()).await.unwrap();
    assert_eq!(loaded, read_dataset(dir.path()).unwrap());
}

#[test]
fn reading_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    assert!(read_dataset(&dir.path().join("absent")).is_err());
}
