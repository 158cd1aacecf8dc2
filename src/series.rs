// src/series.rs
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::DatasetDescriptor;
use crate::processing::engine::{compute_indices, computable_indices};
use crate::processing::normalize::{window_extrema, Normalization};
use crate::raster::Scene;
use crate::request::ChartRequest;

/// Spatial aggregation applied to the valid samples of a window.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Reducer {
    #[default]
    Mean,
    Min,
    Max,
}

impl Reducer {
    /// Reduce finite samples to a scalar; `None` when there are no samples.
    pub fn reduce(&self, samples: impl IntoIterator<Item = f32>) -> Option<f32> {
        match self {
            Reducer::Mean => {
                let (sum, count) = samples
                    .into_iter()
                    .fold((0.0f64, 0usize), |(s, n), v| (s + v as f64, n + 1));
                (count > 0).then(|| (sum / count as f64) as f32)
            }
            Reducer::Min => samples
                .into_iter()
                .fold(None, |acc: Option<f32>, v| Some(acc.map_or(v, |a| a.min(v)))),
            Reducer::Max => samples
                .into_iter()
                .fold(None, |acc: Option<f32>, v| Some(acc.map_or(v, |a| a.max(v)))),
        }
    }
}

/// One chart sample: normalized index values at one acquisition timestamp.
///
/// An index with no valid samples at this timestamp has no entry in
/// `values`: a gap in the chart, never a zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub values: BTreeMap<String, f32>,
}

/// Run the full per-scene pipeline: mask, compute indices, reduce the
/// scale-sized window around the request point.
pub fn evaluate_scene(
    scene: &Scene,
    descriptor: &DatasetDescriptor,
    request: &ChartRequest,
    reducer: Reducer,
    normalization: Normalization,
) -> IndexSeriesPoint {
    let mut masked = scene.clone();
    masked.apply_validity(&descriptor.mask.validity(scene));

    let computed = compute_indices(&masked, &descriptor.bands, normalization);

    let mut values = BTreeMap::new();
    if let Some(window) = computed.window_around(request.point, descriptor.scale) {
        let width = computed.shape().0;
        for name in computable_indices(&descriptor.bands) {
            let Some(band) = computed.band(&name) else {
                continue;
            };
            let data = band.data();
            let samples = window.indices(width).map(|i| data[i]).filter(|v| v.is_finite());

            let reduced = match normalization {
                Normalization::FixedBounds => reducer.reduce(samples),
                Normalization::WindowExtrema => window_extrema(band, &window)
                    .and_then(|rescale| reducer.reduce(samples.map(|v| rescale.apply(v)))),
            };

            if let Some(value) = reduced {
                values.insert(name, value);
            }
        }
    }

    if values.is_empty() {
        log::debug!(
            "scene {} contributed no valid samples at ({}, {})",
            scene.timestamp(),
            request.point.x,
            request.point.y
        );
    }

    IndexSeriesPoint {
        timestamp: scene.timestamp(),
        values,
    }
}

/// Lazy, chronological series over a scene collection. Each `next()` runs
/// the pipeline for exactly one scene; nothing is cached between requests.
pub struct SeriesIter<'a> {
    scenes: std::vec::IntoIter<&'a Scene>,
    descriptor: &'a DatasetDescriptor,
    request: &'a ChartRequest,
    reducer: Reducer,
    normalization: Normalization,
}

impl<'a> SeriesIter<'a> {
    pub fn new(
        scenes: &'a [Scene],
        descriptor: &'a DatasetDescriptor,
        request: &'a ChartRequest,
        reducer: Reducer,
        normalization: Normalization,
    ) -> Self {
        let mut eligible: Vec<&Scene> = scenes
            .iter()
            .filter(|s| request.covers(s.timestamp()) && s.contains(request.point))
            .collect();
        eligible.sort_by_key(|s| s.timestamp());

        Self {
            scenes: eligible.into_iter(),
            descriptor,
            request,
            reducer,
            normalization,
        }
    }
}

impl Iterator for SeriesIter<'_> {
    type Item = IndexSeriesPoint;

    fn next(&mut self) -> Option<Self::Item> {
        self.scenes.next().map(|scene| {
            evaluate_scene(
                scene,
                self.descriptor,
                self.request,
                self.reducer,
                self.normalization,
            )
        })
    }
}

/// Collected form of [`SeriesIter`].
pub fn build_series(
    scenes: &[Scene],
    descriptor: &DatasetDescriptor,
    request: &ChartRequest,
    reducer: Reducer,
    normalization: Normalization,
) -> Vec<IndexSeriesPoint> {
    SeriesIter::new(scenes, descriptor, request, reducer, normalization).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_reducer() {
        let mean = Reducer::Mean.reduce([0.2, 0.4, 0.6]).unwrap();
        assert!((mean - 0.4).abs() < 1e-6);
        assert_eq!(Reducer::Mean.reduce([]), None);
    }

    #[test]
    fn min_max_reducers() {
        assert_eq!(Reducer::Min.reduce([0.5, 0.1, 0.9]), Some(0.1));
        assert_eq!(Reducer::Max.reduce([0.5, 0.1, 0.9]), Some(0.9));
        assert_eq!(Reducer::Min.reduce([]), None);
    }
}
