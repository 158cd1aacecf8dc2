// src/processing/indices/dvi.rs
use rayon::prelude::*;

use crate::catalog::BandRole;
use crate::processing::engine::IndexCalculator;
use crate::processing::normalize::Rescale;
use crate::raster::BandBuffer;

/// Difference Vegetation Index (DVI) calculator: NIR - RED.
///
/// Unlike the ratio indices this one is unbounded; normalization uses the
/// reflectance-difference bounds (±10000).
pub struct DVI {
    name: String,
}

impl DVI {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name: name.unwrap_or_else(|| "DVI".to_string()),
        }
    }
}

impl IndexCalculator for DVI {
    fn calculate(&self, inputs: &[&BandBuffer], valid: &[bool]) -> BandBuffer {
        let nir_band = inputs[0].data();
        let red_band = inputs[1].data();
        let shape = inputs[0].shape();

        let mut result_data = vec![f32::NAN; shape.0 * shape.1];

        result_data.par_iter_mut().enumerate().for_each(|(i, result)| {
            if !valid[i] {
                return;
            }
            let nir = nir_band[i];
            let red = red_band[i];
            if nir.is_finite() && red.is_finite() {
                *result = nir - red;
            }
        });

        BandBuffer::new(shape, result_data)
    }

    fn required_roles(&self) -> &[BandRole] {
        &[BandRole::Nir, BandRole::Red]
    }

    fn rescale(&self) -> Rescale {
        Rescale::DIFFERENCE
    }

    fn name(&self) -> &str {
        &self.name
    }
}
