use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

use super::load_data_source;
use crate::config::load_rules;
use crate::engine::IntelligenceEngine;
use crate::io::output::{create_writer, OutputFormat};
use crate::trend::{load_snapshot, save_snapshot, InMemoryTrendStore};

pub struct AnalyzeConfig {
    pub customer_id: String,
    pub data: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub format: OutputFormat,
    pub trend_file: Option<PathBuf>,
    pub as_of: Option<DateTime<Utc>>,
}

/// Run one analysis and print it.
///
/// Engine errors are returned unchanged inside the `anyhow::Error` so the
/// binary can tell recoverable outcomes apart from failures.
pub fn handle_analyze(config: AnalyzeConfig) -> Result<()> {
    let as_of = config.as_of.unwrap_or_else(Utc::now);
    let rules = load_rules(config.config.as_deref())?;
    let source = load_data_source(config.data.as_deref(), as_of)?;

    let store = match &config.trend_file {
        Some(path) => {
            let snapshot = load_snapshot(path)
                .with_context(|| format!("Failed to read trend history {}", path.display()))?;
            InMemoryTrendStore::from_snapshot(snapshot, &rules.trend)
        }
        None => InMemoryTrendStore::from_rules(&rules.trend),
    };
    let store = Arc::new(store);

    let engine = IntelligenceEngine::new(Arc::new(source), store.clone(), rules);
    let report = engine.analyze_customer_at(&config.customer_id, as_of)?;

    if let Some(path) = &config.trend_file {
        save_snapshot(path, &store.snapshot())
            .with_context(|| format!("Failed to write trend history {}", path.display()))?;
    }

    let stdout = std::io::stdout();
    create_writer(config.format, stdout.lock()).write_intelligence(&report)
}
