// src/processing/indices/ndi.rs
use rayon::prelude::*;

use crate::catalog::BandRole;
use crate::processing::engine::IndexCalculator;
use crate::processing::normalize::Rescale;
use crate::raster::BandBuffer;

/// Normalized Difference Index calculator: (A - B) / (A + B).
///
/// Instantiated with different role pairs for NDVI (NIR/RED), NDWI
/// (NIR/SWIR1) and GNDVI (NIR/GREEN).
pub struct NDI {
    roles: [BandRole; 2],
    name: String,
}

impl NDI {
    pub fn new(plus: BandRole, minus: BandRole, name: Option<String>) -> Self {
        Self {
            roles: [plus, minus],
            name: name.unwrap_or_else(|| "NDI".to_string()),
        }
    }
}

impl IndexCalculator for NDI {
    fn calculate(&self, inputs: &[&BandBuffer], valid: &[bool]) -> BandBuffer {
        let a_band = inputs[0].data();
        let b_band = inputs[1].data();
        let shape = inputs[0].shape();

        let mut result_data = vec![f32::NAN; shape.0 * shape.1];

        result_data.par_iter_mut().enumerate().for_each(|(i, result)| {
            if !valid[i] {
                return;
            }
            let a = a_band[i];
            let b = b_band[i];
            if !a.is_finite() || !b.is_finite() {
                return;
            }

            let denominator = a + b;
            if denominator.abs() > 1e-6 {
                *result = (a - b) / denominator;
            }
        });

        BandBuffer::new(shape, result_data)
    }

    fn required_roles(&self) -> &[BandRole] {
        &self.roles
    }

    fn rescale(&self) -> Rescale {
        Rescale::RATIO
    }

    fn name(&self) -> &str {
        &self.name
    }
}
