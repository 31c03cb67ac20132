//! Core traits shared by relation and view models

use std::sync::Arc;

use arrow::datatypes::{FieldRef, Schema};
use arrow::record_batch::RecordBatch;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Models with a fixed Arrow schema that convert to and from record batches.
///
/// The explicit schema keeps dates as `Date32` rather than the strings
/// `serde_arrow` would trace from samples.
pub trait ArrowSchema: Sized + Serialize + DeserializeOwned {
    /// Get the Arrow schema for this model
    fn schema() -> Schema;

    /// Get the schema as `Arc<Schema>`
    fn schema_ref() -> Arc<Schema> {
        Arc::new(Self::schema())
    }

    /// Convert a `RecordBatch` to a vector of this model
    fn from_record_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        Ok(serde_arrow::from_record_batch(batch)?)
    }

    /// Convert a slice of this model to a `RecordBatch`
    fn to_record_batch(models: &[Self]) -> Result<RecordBatch> {
        let fields: Vec<FieldRef> = Self::schema().fields().iter().cloned().collect();
        Ok(serde_arrow::to_record_batch(&fields, &models)?)
    }
}

/// Stable patient key shared by every relation
pub type PatientId = i64;
