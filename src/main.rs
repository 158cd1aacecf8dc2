// src/main.rs
use anyhow::Result;
use clap::Parser;

use raster_series::batch::process_batch;
use raster_series::catalog::DatasetCatalog;
use raster_series::cli::{Cli, Commands};
use raster_series::io::{read_scenes, write_chart, ChartDocument};
use raster_series::processing::engine::computable_indices;
use raster_series::processing::normalize::Normalization;
use raster_series::processing::parallel::SeriesProcessor;
use raster_series::raster::MapPoint;
use raster_series::request::ChartRequest;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Chart {
            scenes,
            dataset,
            start,
            end,
            x,
            y,
            reducer,
            extrema_normalize,
            threads,
        } => {
            let scenes = read_scenes(scenes)?;
            let catalog = DatasetCatalog::builtin();
            let descriptor = catalog.lookup(dataset)?;
            let request = ChartRequest::new(dataset.clone(), *start, *end, MapPoint::new(*x, *y));
            let normalization = if *extrema_normalize {
                Normalization::WindowExtrema
            } else {
                Normalization::FixedBounds
            };

            let processor = SeriesProcessor::new(*threads);
            let series = processor.process(&scenes, descriptor, &request, *reducer, normalization);

            let document = ChartDocument {
                dataset: &request.dataset,
                point: request.point,
                start: request.start,
                end: request.end,
                indices: computable_indices(&descriptor.bands),
                series: &series,
            };
            write_chart(cli.output.as_deref(), &document)?;

            eprintln!("Processing complete: {} series point(s)", series.len());
        }
        Commands::Batch { config } => {
            process_batch(config)?;
        }
        Commands::ListDatasets => {
            let catalog = DatasetCatalog::builtin();
            for descriptor in catalog.descriptors() {
                println!(
                    "{:<12} {} (scale {} m, quality band {})",
                    descriptor.name,
                    descriptor.collection,
                    descriptor.scale,
                    descriptor.mask.quality_band()
                );
            }
        }
    }

    Ok(())
}
