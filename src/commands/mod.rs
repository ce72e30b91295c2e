pub mod analyze;
pub mod init;
pub mod list;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::Path;

use crate::data::{demo::demo_dataset, InMemoryDataSource};

/// Load the dataset named on the command line, or the demo accounts.
pub fn load_data_source(data: Option<&Path>, as_of: DateTime<Utc>) -> Result<InMemoryDataSource> {
    match data {
        Some(path) => InMemoryDataSource::from_json_file(path)
            .with_context(|| format!("Failed to load dataset from {}", path.display())),
        None => {
            log::info!("No --data given, using the built-in demo dataset");
            Ok(InMemoryDataSource::from_dataset(demo_dataset(as_of))?)
        }
    }
}
