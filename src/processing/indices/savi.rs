// src/processing/indices/savi.rs
use rayon::prelude::*;

use crate::catalog::BandRole;
use crate::processing::engine::IndexCalculator;
use crate::processing::normalize::Rescale;
use crate::raster::BandBuffer;

/// Soil Adjusted Vegetation Index (SAVI) calculator.
///
/// SAVI = ((NIR - RED) / (NIR + RED + L)) * (1 + L), L defaulting to 0.5.
pub struct SAVI {
    soil_factor: f32,
    name: String,
}

impl SAVI {
    pub fn new(soil_factor: f32, name: Option<String>) -> Self {
        Self {
            soil_factor,
            name: name.unwrap_or_else(|| "SAVI".to_string()),
        }
    }
}

impl Default for SAVI {
    fn default() -> Self {
        Self::new(0.5, None)
    }
}

impl IndexCalculator for SAVI {
    fn calculate(&self, inputs: &[&BandBuffer], valid: &[bool]) -> BandBuffer {
        let nir_band = inputs[0].data();
        let red_band = inputs[1].data();
        let shape = inputs[0].shape();

        let mut result_data = vec![f32::NAN; shape.0 * shape.1];
        let l = self.soil_factor;

        result_data.par_iter_mut().enumerate().for_each(|(i, result)| {
            if !valid[i] {
                return;
            }
            let nir = nir_band[i];
            let red = red_band[i];
            if !nir.is_finite() || !red.is_finite() {
                return;
            }

            let denominator = nir + red + l;
            if denominator.abs() > 1e-6 {
                *result = ((nir - red) / denominator) * (1.0 + l);
            }
        });

        BandBuffer::new(shape, result_data)
    }

    fn required_roles(&self) -> &[BandRole] {
        &[BandRole::Nir, BandRole::Red]
    }

    fn rescale(&self) -> Rescale {
        Rescale::RATIO
    }

    fn name(&self) -> &str {
        &self.name
    }
}
