// src/raster.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SeriesError};

/// Row-major single-band pixel grid, `shape` = (width, height).
#[derive(Debug, Clone, PartialEq)]
pub struct BandBuffer {
    shape: (usize, usize),
    data: Vec<f32>,
}

impl BandBuffer {
    pub fn new(shape: (usize, usize), data: Vec<f32>) -> Self {
        assert_eq!(
            shape.0 * shape.1,
            data.len(),
            "buffer data length must match shape"
        );
        Self { shape, data }
    }

    pub fn filled(shape: (usize, usize), value: f32) -> Self {
        Self {
            shape,
            data: vec![value; shape.0 * shape.1],
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }
}

/// North-up affine transform between map coordinates and pixel coordinates.
///
/// Map units are meters (`pixel_height` is negative for north-up rasters).
/// Scenes and request points share one map coordinate space; reprojection is
/// the acquisition layer's concern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        }
    }

    /// Map coordinates to fractional pixel coordinates (col, row).
    pub fn map_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.origin_x) / self.pixel_width,
            (y - self.origin_y) / self.pixel_height,
        )
    }

    /// Map coordinates of a pixel center.
    pub fn pixel_to_map(&self, col: usize, row: usize) -> (f64, f64) {
        (
            self.origin_x + (col as f64 + 0.5) * self.pixel_width,
            self.origin_y + (row as f64 + 0.5) * self.pixel_height,
        )
    }

    /// Ground sampling distance in map units.
    pub fn cell_size(&self) -> f64 {
        self.pixel_width.abs()
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}

/// A location in the scenes' shared map coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
}

impl MapPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl PixelWindow {
    /// Linear indices of the window pixels within a raster of the given width.
    pub fn indices(&self, raster_width: usize) -> impl Iterator<Item = usize> + '_ {
        let (x0, x1) = (self.x0, self.x1);
        (self.y0..self.y1).flat_map(move |y| (x0..x1).map(move |x| y * raster_width + x))
    }

    pub fn pixel_count(&self) -> usize {
        (self.x1 - self.x0) * (self.y1 - self.y0)
    }
}

/// A timestamped multi-band raster with a shared per-pixel validity mask.
///
/// Bands are looked up by name; appended bands must match the scene shape.
/// Computed index bands additionally carry `f32::NAN` for per-pixel no-data
/// (masked inputs, zero denominators).
#[derive(Debug, Clone)]
pub struct Scene {
    timestamp: DateTime<Utc>,
    transform: GeoTransform,
    shape: (usize, usize),
    bands: Vec<(String, BandBuffer)>,
    valid: Vec<bool>,
}

impl Scene {
    pub fn new(timestamp: DateTime<Utc>, transform: GeoTransform, shape: (usize, usize)) -> Self {
        Self {
            timestamp,
            transform,
            shape,
            bands: Vec::new(),
            valid: vec![true; shape.0 * shape.1],
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn add_band(&mut self, name: impl Into<String>, buffer: BandBuffer) -> Result<()> {
        if buffer.shape() != self.shape {
            return Err(SeriesError::ShapeMismatch {
                expected: self.shape,
                actual: buffer.shape(),
            });
        }
        self.bands.push((name.into(), buffer));
        Ok(())
    }

    pub fn band(&self, name: &str) -> Option<&BandBuffer> {
        self.bands
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, b)| b)
    }

    /// Like [`Scene::band`] but with a typed error for direct callers.
    pub fn require_band(&self, name: &str) -> Result<&BandBuffer> {
        self.band(name)
            .ok_or_else(|| SeriesError::MissingBand(name.to_string()))
    }

    pub fn band_names(&self) -> impl Iterator<Item = &str> {
        self.bands.iter().map(|(n, _)| n.as_str())
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    pub fn valid(&self) -> &[bool] {
        &self.valid
    }

    /// AND a validity mask into the scene mask. Masked pixels are no-data for
    /// every downstream stage.
    pub fn apply_validity(&mut self, mask: &[bool]) {
        debug_assert_eq!(mask.len(), self.valid.len());
        for (v, &m) in self.valid.iter_mut().zip(mask) {
            *v &= m;
        }
    }

    /// Mark every pixel invalid.
    pub fn mask_all(&mut self) {
        self.valid.fill(false);
    }

    pub fn contains(&self, point: MapPoint) -> bool {
        let (col, row) = self.transform.map_to_pixel(point.x, point.y);
        col >= 0.0 && row >= 0.0 && col < self.shape.0 as f64 && row < self.shape.1 as f64
    }

    /// The square window of side `scale` map units centered on `point`,
    /// clipped to the raster and never smaller than one pixel. `None` when
    /// the window misses the raster entirely.
    pub fn window_around(&self, point: MapPoint, scale: f64) -> Option<PixelWindow> {
        let (col, row) = self.transform.map_to_pixel(point.x, point.y);
        if !col.is_finite() || !row.is_finite() {
            return None;
        }

        let half = (scale / self.transform.cell_size()).max(1.0) / 2.0;
        let x0 = (col - half).floor() as i64;
        let x1 = (col + half).ceil() as i64;
        let y0 = (row - half).floor() as i64;
        let y1 = (row + half).ceil() as i64;

        let (w, h) = (self.shape.0 as i64, self.shape.1 as i64);
        if x1 <= 0 || y1 <= 0 || x0 >= w || y0 >= h {
            return None;
        }

        Some(PixelWindow {
            x0: x0.max(0) as usize,
            y0: y0.max(0) as usize,
            x1: x1.min(w) as usize,
            y1: y1.min(h) as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn scene(shape: (usize, usize), pixel: f64) -> Scene {
        Scene::new(
            Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap(),
            GeoTransform::new(0.0, shape.1 as f64 * pixel, pixel, -pixel),
            shape,
        )
    }

    #[test]
    fn map_pixel_roundtrip() {
        let gt = GeoTransform::new(100.0, 200.0, 10.0, -10.0);
        let (x, y) = gt.pixel_to_map(5, 10);
        let (col, row) = gt.map_to_pixel(x, y);
        assert!((col - 5.5).abs() < 1e-10);
        assert!((row - 10.5).abs() < 1e-10);
    }

    #[test]
    fn add_band_rejects_wrong_shape() {
        let mut s = scene((4, 4), 10.0);
        let err = s.add_band("B8", BandBuffer::filled((3, 3), 0.0));
        assert!(err.is_err());
        assert!(s.add_band("B8", BandBuffer::filled((4, 4), 0.0)).is_ok());
    }

    #[test]
    fn window_clips_to_raster() {
        let s = scene((10, 10), 10.0);
        // Point near the top-left corner, 60 m window.
        let w = s.window_around(MapPoint::new(5.0, 95.0), 60.0).unwrap();
        assert_eq!((w.x0, w.y0), (0, 0));
        assert!(w.x1 <= 10 && w.y1 <= 10);
        assert!(w.pixel_count() >= 1);
    }

    #[test]
    fn window_misses_raster() {
        let s = scene((10, 10), 10.0);
        assert!(s.window_around(MapPoint::new(-500.0, -500.0), 30.0).is_none());
    }

    #[test]
    fn window_is_at_least_one_pixel() {
        let s = scene((10, 10), 10.0);
        // Reduction scale smaller than a pixel still samples the containing pixel.
        let w = s.window_around(MapPoint::new(55.0, 55.0), 1.0).unwrap();
        assert!(w.pixel_count() >= 1);
    }

    #[test]
    fn validity_mask_is_monotonic() {
        let mut s = scene((2, 2), 10.0);
        s.apply_validity(&[true, false, true, true]);
        s.apply_validity(&[true, true, false, true]);
        assert_eq!(s.valid(), &[true, false, false, true]);
    }
}
