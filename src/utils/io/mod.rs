//! Parquet import and export of study relations

pub mod dataset;
pub mod parquet;

pub use dataset::{load_dataset_async, read_dataset, relation_path, write_dataset, write_views};
pub use parquet::{read_parquet, read_parquet_async, read_records, write_records};
