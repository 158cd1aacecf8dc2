// src/processing/normalize.rs
use serde::{Deserialize, Serialize};

use crate::raster::{BandBuffer, PixelWindow};

/// Linear rescale from `[lo, hi]` onto `[0, 1]`, clamped after rescaling.
///
/// The clamp saturates values outside the assumed bounds at 0 or 1 instead of
/// letting them leave the unit range. Non-finite input stays NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rescale {
    pub lo: f32,
    pub hi: f32,
}

impl Rescale {
    /// Bounds for ratio-type indices (theoretical range [-1, 1]).
    pub const RATIO: Rescale = Rescale { lo: -1.0, hi: 1.0 };
    /// Bounds for the reflectance-difference index (source data roughly ±10000).
    pub const DIFFERENCE: Rescale = Rescale {
        lo: -10000.0,
        hi: 10000.0,
    };

    pub fn apply(&self, value: f32) -> f32 {
        if !value.is_finite() {
            return f32::NAN;
        }
        ((value - self.lo) / (self.hi - self.lo)).clamp(0.0, 1.0)
    }

    /// Inverse of the linear rescale, without the clamp.
    pub fn invert(&self, unit: f32) -> f32 {
        self.lo + unit * (self.hi - self.lo)
    }

    pub fn apply_band(&self, band: &mut BandBuffer) {
        for value in band.data_mut() {
            *value = self.apply(*value);
        }
    }
}

/// Normalization strategy for computed index bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Fixed theoretical bounds per index.
    #[default]
    FixedBounds,
    /// Actual finite min/max of the reduction window, per index band.
    WindowExtrema,
}

/// Rescale derived from the actual extrema of the window samples.
///
/// `None` when the window holds no finite samples or a degenerate range
/// (min == max), in which case the index has no meaningful normalized value.
pub fn window_extrema(band: &BandBuffer, window: &PixelWindow) -> Option<Rescale> {
    let width = band.shape().0;
    let data = band.data();
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for i in window.indices(width) {
        let v = data[i];
        if v.is_finite() {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    (lo < hi).then_some(Rescale { lo, hi })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_rescale_centers_zero() {
        assert_eq!(Rescale::RATIO.apply(0.0), 0.5);
        assert_eq!(Rescale::RATIO.apply(-1.0), 0.0);
        assert_eq!(Rescale::RATIO.apply(1.0), 1.0);
    }

    #[test]
    fn clamp_saturates_out_of_range() {
        assert_eq!(Rescale::RATIO.apply(3.0), 1.0);
        assert_eq!(Rescale::RATIO.apply(-2.5), 0.0);
    }

    #[test]
    fn nan_propagates() {
        assert!(Rescale::RATIO.apply(f32::NAN).is_nan());
    }

    #[test]
    fn roundtrip_inside_bounds() {
        for raw in [-0.99, -0.25, 0.0, 0.333, 0.875] {
            let unit = Rescale::RATIO.apply(raw);
            assert!((Rescale::RATIO.invert(unit) - raw).abs() < 1e-6);
        }
    }

    #[test]
    fn window_extrema_skips_nan_and_degenerate() {
        let band = BandBuffer::new((2, 2), vec![0.2, f32::NAN, 0.8, 0.4]);
        let window = PixelWindow {
            x0: 0,
            y0: 0,
            x1: 2,
            y1: 2,
        };
        let rescale = window_extrema(&band, &window).unwrap();
        assert_eq!(rescale.lo, 0.2);
        assert_eq!(rescale.hi, 0.8);

        let flat = BandBuffer::filled((2, 2), 0.5);
        assert!(window_extrema(&flat, &window).is_none());
    }
}
