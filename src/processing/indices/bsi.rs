// src/processing/indices/bsi.rs
use rayon::prelude::*;

use crate::catalog::BandRole;
use crate::processing::engine::IndexCalculator;
use crate::processing::normalize::Rescale;
use crate::raster::BandBuffer;

/// Bare Soil Index (BSI) calculator.
/// BSI = ((SWIR1 + RED) - (NIR + BLUE)) / ((SWIR1 + RED) + (NIR + BLUE))
pub struct BSI {
    name: String,
}

impl BSI {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name: name.unwrap_or_else(|| "BSI".to_string()),
        }
    }
}

impl IndexCalculator for BSI {
    fn calculate(&self, inputs: &[&BandBuffer], valid: &[bool]) -> BandBuffer {
        let swir_band = inputs[0].data();
        let red_band = inputs[1].data();
        let nir_band = inputs[2].data();
        let blue_band = inputs[3].data();
        let shape = inputs[0].shape();

        let mut result_data = vec![f32::NAN; shape.0 * shape.1];

        result_data.par_iter_mut().enumerate().for_each(|(i, result)| {
            if !valid[i] {
                return;
            }
            let swir = swir_band[i];
            let red = red_band[i];
            let nir = nir_band[i];
            let blue = blue_band[i];
            if !swir.is_finite() || !red.is_finite() || !nir.is_finite() || !blue.is_finite() {
                return;
            }

            let numerator = (swir + red) - (nir + blue);
            let denominator = (swir + red) + (nir + blue);
            if denominator.abs() > 1e-6 {
                *result = numerator / denominator;
            }
        });

        BandBuffer::new(shape, result_data)
    }

    fn required_roles(&self) -> &[BandRole] {
        &[
            BandRole::Swir1,
            BandRole::Red,
            BandRole::Nir,
            BandRole::Blue,
        ]
    }

    fn rescale(&self) -> Rescale {
        Rescale::RATIO
    }

    fn name(&self) -> &str {
        &self.name
    }
}
