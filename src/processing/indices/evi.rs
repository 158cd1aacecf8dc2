// src/processing/indices/evi.rs
use rayon::prelude::*;

use crate::catalog::BandRole;
use crate::processing::engine::IndexCalculator;
use crate::processing::normalize::Rescale;
use crate::raster::BandBuffer;

/// Enhanced Vegetation Index (EVI) calculator.
pub struct EVI {
    name: String,
}

impl EVI {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name: name.unwrap_or_else(|| "EVI".to_string()),
        }
    }
}

impl IndexCalculator for EVI {
    fn calculate(&self, inputs: &[&BandBuffer], valid: &[bool]) -> BandBuffer {
        let nir_band = inputs[0].data();
        let red_band = inputs[1].data();
        let blue_band = inputs[2].data();
        let shape = inputs[0].shape();

        let mut result_data = vec![f32::NAN; shape.0 * shape.1];

        // EVI coefficients from the MODIS documentation
        const G: f32 = 2.5; // Gain factor
        const L: f32 = 1.0; // Canopy background adjustment
        const C1: f32 = 6.0; // Aerosol resistance (red)
        const C2: f32 = 7.5; // Aerosol resistance (blue)

        result_data.par_iter_mut().enumerate().for_each(|(i, result)| {
            if !valid[i] {
                return;
            }
            let nir = nir_band[i];
            let red = red_band[i];
            let blue = blue_band[i];
            if !nir.is_finite() || !red.is_finite() || !blue.is_finite() {
                return;
            }

            let denominator = nir + C1 * red - C2 * blue + L;
            if denominator.abs() > 1e-6 {
                *result = G * (nir - red) / denominator;
            }
        });

        BandBuffer::new(shape, result_data)
    }

    fn required_roles(&self) -> &[BandRole] {
        &[BandRole::Nir, BandRole::Red, BandRole::Blue]
    }

    fn rescale(&self) -> Rescale {
        Rescale::RATIO
    }

    fn name(&self) -> &str {
        &self.name
    }
}
