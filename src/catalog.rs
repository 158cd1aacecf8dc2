// src/catalog.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeriesError};
use crate::raster::Scene;

/// Semantic band slot, mapped per dataset to a physical band name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BandRole {
    Nir,
    Red,
    Blue,
    Green,
    Swir1,
}

/// Role-to-band assignment for one dataset.
///
/// NIR and RED are always present; the remaining roles are optional and any
/// index requiring an absent role is skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandRoleMap {
    pub nir: String,
    pub red: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub green: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swir1: Option<String>,
}

impl BandRoleMap {
    pub fn new(nir: impl Into<String>, red: impl Into<String>) -> Self {
        Self {
            nir: nir.into(),
            red: red.into(),
            blue: None,
            green: None,
            swir1: None,
        }
    }

    pub fn with_blue(mut self, band: impl Into<String>) -> Self {
        self.blue = Some(band.into());
        self
    }

    pub fn with_green(mut self, band: impl Into<String>) -> Self {
        self.green = Some(band.into());
        self
    }

    pub fn with_swir1(mut self, band: impl Into<String>) -> Self {
        self.swir1 = Some(band.into());
        self
    }

    /// Physical band name for a role, if assigned.
    pub fn get(&self, role: BandRole) -> Option<&str> {
        match role {
            BandRole::Nir => Some(self.nir.as_str()),
            BandRole::Red => Some(self.red.as_str()),
            BandRole::Blue => self.blue.as_deref(),
            BandRole::Green => self.green.as_deref(),
            BandRole::Swir1 => self.swir1.as_deref(),
        }
    }
}

/// Per-pixel quality rule. A data variant rather than a closure so the
/// catalog stays serializable and inspectable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum MaskRule {
    /// Pixel valid when every listed bit of the quality band is clear.
    BitsClear { quality_band: String, bits: Vec<u8> },
}

impl MaskRule {
    pub fn quality_band(&self) -> &str {
        match self {
            MaskRule::BitsClear { quality_band, .. } => quality_band,
        }
    }

    /// Per-pixel validity from the scene's quality band.
    ///
    /// A scene without the quality band has no usable quality information:
    /// every pixel is reported invalid.
    pub fn validity(&self, scene: &Scene) -> Vec<bool> {
        let MaskRule::BitsClear { quality_band, bits } = self;

        let Some(qa) = scene.band(quality_band) else {
            log::warn!(
                "scene {} has no quality band '{}', masking all pixels",
                scene.timestamp(),
                quality_band
            );
            return vec![false; scene.shape().0 * scene.shape().1];
        };

        let reject: u32 = bits.iter().fold(0, |acc, &b| acc | (1u32 << b));
        qa.data()
            .iter()
            .map(|&q| q.is_finite() && (q as u32) & reject == 0)
            .collect()
    }
}

/// One dataset entry: identifier, source collection, band roles, native
/// reduction scale in meters, and quality mask rule. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub name: String,
    pub collection: String,
    pub bands: BandRoleMap,
    pub scale: f64,
    pub mask: MaskRule,
}

/// Fixed name-to-descriptor registry, populated at construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetCatalog {
    datasets: BTreeMap<String, DatasetDescriptor>,
}

impl DatasetCatalog {
    /// The three built-in datasets.
    pub fn builtin() -> Self {
        Self::from_descriptors([
            DatasetDescriptor {
                name: "Sentinel-2".to_string(),
                collection: "COPERNICUS/S2_SR_HARMONIZED".to_string(),
                bands: BandRoleMap::new("B8", "B4")
                    .with_blue("B2")
                    .with_green("B3")
                    .with_swir1("B11"),
                scale: 100.0,
                mask: MaskRule::BitsClear {
                    quality_band: "QA60".to_string(),
                    bits: vec![10, 11],
                },
            },
            DatasetDescriptor {
                name: "Landsat 9".to_string(),
                collection: "LANDSAT/LC09/C02/T1_L2".to_string(),
                bands: BandRoleMap::new("SR_B5", "SR_B4")
                    .with_blue("SR_B2")
                    .with_green("SR_B3")
                    .with_swir1("SR_B6"),
                scale: 100.0,
                mask: MaskRule::BitsClear {
                    quality_band: "QA_PIXEL".to_string(),
                    bits: vec![5],
                },
            },
            DatasetDescriptor {
                name: "MODIS".to_string(),
                collection: "MODIS/006/MOD09GA".to_string(),
                bands: BandRoleMap::new("sur_refl_b02", "sur_refl_b01")
                    .with_blue("sur_refl_b03")
                    .with_green("sur_refl_b04")
                    .with_swir1("sur_refl_b06"),
                scale: 500.0,
                mask: MaskRule::BitsClear {
                    quality_band: "QC_500m".to_string(),
                    bits: vec![0],
                },
            },
        ])
    }

    pub fn from_descriptors(descriptors: impl IntoIterator<Item = DatasetDescriptor>) -> Self {
        Self {
            datasets: descriptors
                .into_iter()
                .map(|d| (d.name.clone(), d))
                .collect(),
        }
    }

    pub fn lookup(&self, name: &str) -> Result<&DatasetDescriptor> {
        self.datasets
            .get(name)
            .ok_or_else(|| SeriesError::UnknownDataset(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &DatasetDescriptor> {
        self.datasets.values()
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{BandBuffer, GeoTransform};
    use chrono::{TimeZone, Utc};

    fn qa_scene(band: &str, values: Vec<f32>) -> Scene {
        let mut s = Scene::new(
            Utc.with_ymd_and_hms(2023, 1, 15, 10, 0, 0).unwrap(),
            GeoTransform::default(),
            (2, 2),
        );
        s.add_band(band, BandBuffer::new((2, 2), values)).unwrap();
        s
    }

    #[test]
    fn builtin_catalog_lookup() {
        let catalog = DatasetCatalog::builtin();
        assert_eq!(catalog.len(), 3);
        let s2 = catalog.lookup("Sentinel-2").unwrap();
        assert_eq!(s2.bands.nir, "B8");
        assert_eq!(s2.scale, 100.0);
        let modis = catalog.lookup("MODIS").unwrap();
        assert_eq!(modis.scale, 500.0);
    }

    #[test]
    fn unknown_dataset_is_an_error() {
        let catalog = DatasetCatalog::builtin();
        let err = catalog.lookup("Sentinel-3").unwrap_err();
        assert!(matches!(err, SeriesError::UnknownDataset(ref n) if n == "Sentinel-3"));
    }

    #[test]
    fn bits_clear_rejects_flagged_pixels() {
        // Sentinel-2 rule: bits 10 (cloud) and 11 (cirrus) of QA60.
        let rule = MaskRule::BitsClear {
            quality_band: "QA60".to_string(),
            bits: vec![10, 11],
        };
        let scene = qa_scene("QA60", vec![0.0, 1024.0, 2048.0, 3.0]);
        assert_eq!(rule.validity(&scene), vec![true, false, false, true]);
    }

    #[test]
    fn missing_quality_band_masks_everything() {
        let rule = MaskRule::BitsClear {
            quality_band: "QA60".to_string(),
            bits: vec![10],
        };
        let scene = qa_scene("B8", vec![0.0; 4]);
        assert_eq!(rule.validity(&scene), vec![false; 4]);
    }

    #[test]
    fn role_map_optional_roles() {
        let map = BandRoleMap::new("B8", "B4").with_blue("B2");
        assert_eq!(map.get(BandRole::Nir), Some("B8"));
        assert_eq!(map.get(BandRole::Blue), Some("B2"));
        assert_eq!(map.get(BandRole::Swir1), None);
    }

    #[test]
    fn catalog_roundtrips_through_json() {
        let catalog = DatasetCatalog::builtin();
        let json = serde_json::to_string(&catalog).unwrap();
        let back: DatasetCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(
            back.lookup("Landsat 9").unwrap(),
            catalog.lookup("Landsat 9").unwrap()
        );
    }
}
