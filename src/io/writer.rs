// src/io/writer.rs
use std::fs;
use std::io::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use crate::raster::MapPoint;
use crate::series::IndexSeriesPoint;

/// Chart-ready output document: request metadata plus the ordered series.
/// Gaps are absent keys in a point's `values` map and must be rendered as
/// gaps, not zeros.
#[derive(Debug, Serialize)]
pub struct ChartDocument<'a> {
    pub dataset: &'a str,
    pub point: MapPoint,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub indices: Vec<String>,
    pub series: &'a [IndexSeriesPoint],
}

/// Serialize a chart document to a file, or stdout when no path is given.
pub fn write_chart(path: Option<&Path>, document: &ChartDocument) -> Result<()> {
    let json = serde_json::to_string_pretty(document).context("serializing chart document")?;

    match path {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("writing chart document {}", path.display()))?,
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(json.as_bytes())
                .and_then(|_| handle.write_all(b"\n"))
                .context("writing chart document to stdout")?;
        }
    }

    Ok(())
}
