//! Parquet file operations
//!
//! Typed models are written with their explicit Arrow schema and read back
//! through a projection onto that schema, so extra columns in a file are
//! ignored and missing ones are reported.

use std::fs::File;
use std::path::Path;

use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use itertools::Itertools;
use parquet::arrow::ArrowWriter;
use parquet::arrow::ProjectionMask;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::async_reader::ParquetRecordBatchStreamBuilder;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use parquet::schema::types::SchemaDescriptor;
use rayon::prelude::*;

use crate::error::{Result, StudyError};
use crate::models::ArrowSchema;
use crate::utils::logging::{Action, Operation};

/// Default batch size for Parquet reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Helper function to get batch size from environment
#[must_use]
pub fn get_batch_size() -> Option<usize> {
    std::env::var("PARQUET_BATCH_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
}

/// Projection mask selecting every field of `schema` from a file.
///
/// # Errors
/// Returns [`StudyError::ColumnNotFound`] for the first field the file lacks
pub fn create_projection(
    schema: &Schema,
    file_schema: &Schema,
    parquet_schema: &SchemaDescriptor,
) -> Result<ProjectionMask> {
    let projection = schema
        .fields()
        .iter()
        .map(|field| {
            file_schema
                .index_of(field.name())
                .map_err(|_| StudyError::ColumnNotFound {
                    column: field.name().clone(),
                })
        })
        .collect::<Result<Vec<usize>>>()?;

    Ok(ProjectionMask::leaves(parquet_schema, projection))
}

/// Write models to a single Parquet file, replacing any existing file
pub fn write_records<T: ArrowSchema>(path: &Path, records: &[T]) -> Result<usize> {
    let operation = Operation::start(Action::WriteParquet, path);

    let batch = T::to_record_batch(records)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, T::schema_ref(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    operation.finish(records.len());
    Ok(records.len())
}

/// Read a Parquet file into Arrow record batches
///
/// # Arguments
/// * `path` - Path to the Parquet file
/// * `schema` - Optional schema to project onto
pub fn read_parquet(path: &Path, schema: Option<&Schema>) -> Result<Vec<RecordBatch>> {
    let operation = Operation::start(Action::ReadParquet, path);

    let file = File::open(path)?;
    let mut builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    if let Some(schema) = schema {
        let mask = create_projection(schema, builder.schema(), builder.parquet_schema())?;
        builder = builder.with_projection(mask);
    }

    let batch_size = get_batch_size().unwrap_or(DEFAULT_BATCH_SIZE);
    let batches = builder
        .with_batch_size(batch_size)
        .build()?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    operation.finish(batches.iter().map(RecordBatch::num_rows).sum());
    Ok(batches)
}

/// Read a Parquet file asynchronously into Arrow record batches
pub async fn read_parquet_async(
    path: &Path,
    schema: Option<&Schema>,
    batch_size: Option<usize>,
) -> Result<Vec<RecordBatch>> {
    let operation = Operation::start(Action::ReadParquet, path);

    let file = tokio::fs::File::open(path).await?;
    let mut builder = ParquetRecordBatchStreamBuilder::new(file).await?;

    if let Some(schema) = schema {
        let mask = create_projection(schema, builder.schema(), builder.parquet_schema())?;
        builder = builder.with_projection(mask);
    }

    let batch_size = batch_size
        .or_else(get_batch_size)
        .unwrap_or(DEFAULT_BATCH_SIZE);

    let batches = builder
        .with_batch_size(batch_size)
        .build()?
        .try_collect::<Vec<_>>()
        .await?;

    operation.finish(batches.iter().map(RecordBatch::num_rows).sum());
    Ok(batches)
}

/// Convert batches to models, one batch per rayon task
pub fn batches_to_records<T: ArrowSchema + Send>(batches: &[RecordBatch]) -> Result<Vec<T>> {
    let converted = batches
        .par_iter()
        .map(T::from_record_batch)
        .collect::<Result<Vec<Vec<T>>>>()?;
    Ok(converted.into_iter().flatten().collect_vec())
}

/// Read a file written by [`write_records`] back into models
pub fn read_records<T: ArrowSchema + Send>(path: &Path) -> Result<Vec<T>> {
    let batches = read_parquet(path, Some(&T::schema()))?;
    batches_to_records(&batches)
}

/// Async variant of [`read_records`]
pub async fn read_records_async<T: ArrowSchema + Send>(path: &Path) -> Result<Vec<T>> {
    let batches = read_parquet_async(path, Some(&T::schema()), None).await?;
    batches_to_records(&batches)
}
