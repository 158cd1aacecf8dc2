// src/processing/parallel.rs
use itertools::Itertools;
use parking_lot::Mutex;
use rayon::prelude::*;

use crate::catalog::DatasetDescriptor;
use crate::processing::normalize::Normalization;
use crate::raster::Scene;
use crate::request::ChartRequest;
use crate::series::{evaluate_scene, IndexSeriesPoint, Reducer};

#[derive(Debug, Default)]
struct RunStats {
    scenes: usize,
    empty_points: usize,
}

/// Parallel series builder: scenes fan out across a worker pool, per-scene
/// results stream through a channel, and the collected series is sorted by
/// acquisition timestamp. Output is identical to the sequential path; there
/// is no ordering dependency between scenes.
pub struct SeriesProcessor {
    workers: usize,
}

impl SeriesProcessor {
    pub fn new(workers: Option<usize>) -> Self {
        let workers = workers.unwrap_or_else(num_cpus::get).max(1);
        Self { workers }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn process(
        &self,
        scenes: &[Scene],
        descriptor: &DatasetDescriptor,
        request: &ChartRequest,
        reducer: Reducer,
        normalization: Normalization,
    ) -> Vec<IndexSeriesPoint> {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
        {
            Ok(pool) => pool.install(|| self.run(scenes, descriptor, request, reducer, normalization)),
            Err(err) => {
                log::warn!("falling back to the global thread pool: {err}");
                self.run(scenes, descriptor, request, reducer, normalization)
            }
        }
    }

    fn run(
        &self,
        scenes: &[Scene],
        descriptor: &DatasetDescriptor,
        request: &ChartRequest,
        reducer: Reducer,
        normalization: Normalization,
    ) -> Vec<IndexSeriesPoint> {
        let eligible: Vec<&Scene> = scenes
            .iter()
            .filter(|s| request.covers(s.timestamp()) && s.contains(request.point))
            .collect();

        let stats = Mutex::new(RunStats::default());
        let (tx, rx) = flume::unbounded();

        eligible.par_iter().for_each_with(tx, |tx, scene| {
            let point = evaluate_scene(scene, descriptor, request, reducer, normalization);
            {
                let mut stats = stats.lock();
                stats.scenes += 1;
                if point.values.is_empty() {
                    stats.empty_points += 1;
                }
            }
            // Receiver outlives all senders; a send failure means the run
            // was abandoned and the point can be dropped.
            let _ = tx.send(point);
        });

        let series: Vec<IndexSeriesPoint> = rx
            .into_iter()
            .sorted_by_key(|point| point.timestamp)
            .collect();

        let stats = stats.into_inner();
        log::info!(
            "{}: reduced {} scene(s), {} without valid samples",
            descriptor.name,
            stats.scenes,
            stats.empty_points
        );

        series
    }
}
