//! One Parquet file per relation, named after its table or view

use std::path::{Path, PathBuf};

use crate::database::Relation;
use crate::error::{Result, StudyError};
use crate::models::{
    ArrowSchema, CovidAdmission, CovidDeath, Dataset, Death, Demographics, Hospitalisation,
    Infection, Patient, Therapeutic,
};
use crate::utils::io::parquet::{read_records, read_records_async, write_records};
use crate::utils::logging::{Action, Operation};

/// `<dir>/<relation name>.parquet`
#[must_use]
pub fn relation_path<R: Relation>(dir: &Path) -> PathBuf {
    dir.join(format!("{}.parquet", R::NAME))
}

fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(StudyError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Directory does not exist: {}", dir.display()),
        )))
    }
}

fn export<R: Relation + ArrowSchema>(dir: &Path, rows: &[R]) -> Result<usize> {
    write_records(&relation_path::<R>(dir), rows)
}

/// Write all six relations into `dir`, creating it if needed
pub fn write_dataset(dir: &Path, dataset: &Dataset) -> Result<usize> {
    std::fs::create_dir_all(dir)?;
    let operation = Operation::start(Action::ExportDataset, dir);

    let written = export(dir, &dataset.patients)?
        + export(dir, &dataset.demographics)?
        + export(dir, &dataset.infections)?
        + export(dir, &dataset.therapeutics)?
        + export(dir, &dataset.hospitalisations)?
        + export(dir, &dataset.deaths)?;

    operation.finish(written);
    Ok(written)
}

/// Write both derived views into `dir`
pub fn write_views(dir: &Path, admissions: &[CovidAdmission], deaths: &[CovidDeath]) -> Result<usize> {
    std::fs::create_dir_all(dir)?;
    Ok(export(dir, admissions)? + export(dir, deaths)?)
}

/// Read a directory written by [`write_dataset`]
pub fn read_dataset(dir: &Path) -> Result<Dataset> {
    ensure_directory(dir)?;
    Ok(Dataset {
        patients: read_records(&relation_path::<Patient>(dir))?,
        demographics: read_records(&relation_path::<Demographics>(dir))?,
        infections: read_records(&relation_path::<Infection>(dir))?,
        therapeutics: read_records(&relation_path::<Therapeutic>(dir))?,
        hospitalisations: read_records(&relation_path::<Hospitalisation>(dir))?,
        deaths: read_records(&relation_path::<Death>(dir))?,
    })
}

/// Read all six relations concurrently
pub async fn load_dataset_async(dir: &Path) -> Result<Dataset> {
    ensure_directory(dir)?;
    let operation = Operation::start(Action::LoadDataset, dir);

    let patients_path = relation_path::<Patient>(dir);
    let demographics_path = relation_path::<Demographics>(dir);
    let infections_path = relation_path::<Infection>(dir);
    let therapeutics_path = relation_path::<Therapeutic>(dir);
    let hospitalisations_path = relation_path::<Hospitalisation>(dir);
    let deaths_path = relation_path::<Death>(dir);

    let (patients, demographics, infections, therapeutics, hospitalisations, deaths) = futures::try_join!(
        read_records_async::<Patient>(&patients_path),
        read_records_async::<Demographics>(&demographics_path),
        read_records_async::<Infection>(&infections_path),
        read_records_async::<Therapeutic>(&therapeutics_path),
        read_records_async::<Hospitalisation>(&hospitalisations_path),
        read_records_async::<Death>(&deaths_path),
    )?;

    let dataset = Dataset {
        patients,
        demographics,
        infections,
        therapeutics,
        hospitalisations,
        deaths,
    };
    operation.finish(dataset.total_rows());
    Ok(dataset)
}
