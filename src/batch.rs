// src/batch.rs
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::DatasetCatalog;
use crate::io::{read_scenes, write_chart, ChartDocument};
use crate::processing::engine::computable_indices;
use crate::processing::normalize::Normalization;
use crate::processing::parallel::SeriesProcessor;
use crate::raster::MapPoint;
use crate::request::ChartRequest;
use crate::series::Reducer;

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Scene collection shared by every request.
    pub scenes: PathBuf,
    #[serde(default)]
    pub global: GlobalParams,
    pub requests: Vec<RequestSpec>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GlobalParams {
    #[serde(default)]
    pub reducer: Reducer,
    #[serde(default)]
    pub normalization: Normalization,
    pub threads: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RequestSpec {
    pub dataset: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub x: f64,
    pub y: f64,
    pub output: PathBuf,
    pub reducer: Option<Reducer>,
    pub normalization: Option<Normalization>,
}

pub fn process_batch(config_path: &Path) -> Result<()> {
    let config_content = fs::read_to_string(config_path)
        .with_context(|| format!("reading batch config {}", config_path.display()))?;
    let config: BatchConfig = serde_json::from_str(&config_content)
        .with_context(|| format!("parsing batch config {}", config_path.display()))?;

    let scenes = read_scenes(&config.scenes)?;
    let catalog = DatasetCatalog::builtin();
    let processor = SeriesProcessor::new(config.global.threads);

    println!(
        "Starting batch processing with {} request(s)...",
        config.requests.len()
    );

    for (i, spec) in config.requests.iter().enumerate() {
        println!(
            "[{}/{}] {} at ({}, {}) -> {}",
            i + 1,
            config.requests.len(),
            spec.dataset,
            spec.x,
            spec.y,
            spec.output.display()
        );

        let reducer = spec.reducer.unwrap_or(config.global.reducer);
        let normalization = spec.normalization.unwrap_or(config.global.normalization);

        let descriptor = catalog.lookup(&spec.dataset)?;
        let request = ChartRequest::new(
            spec.dataset.clone(),
            spec.start,
            spec.end,
            MapPoint::new(spec.x, spec.y),
        );

        let series = processor.process(&scenes, descriptor, &request, reducer, normalization);
        let document = ChartDocument {
            dataset: &request.dataset,
            point: request.point,
            start: request.start,
            end: request.end,
            indices: computable_indices(&descriptor.bands),
            series: &series,
        };
        write_chart(Some(&spec.output), &document)?;
    }

    println!("Batch processing complete!");
    Ok(())
}
