// src/processing/engine.rs
use crate::catalog::{BandRole, BandRoleMap};
use crate::processing::indices::{BSI, DVI, EVI, NDI, SAVI};
use crate::processing::normalize::{Normalization, Rescale};
use crate::raster::{BandBuffer, Scene};

/// Trait for spectral index calculators.
pub trait IndexCalculator: Send + Sync {
    /// Calculate the index from input bands ordered as [`required_roles`].
    ///
    /// The output buffer carries `f32::NAN` where a pixel is masked, an
    /// input is non-finite, or the formula's denominator is (near) zero.
    ///
    /// [`required_roles`]: IndexCalculator::required_roles
    fn calculate(&self, inputs: &[&BandBuffer], valid: &[bool]) -> BandBuffer;

    /// Semantic roles this index consumes, in input order.
    fn required_roles(&self) -> &[BandRole];

    /// Fixed theoretical bounds used to normalize the raw index to [0, 1].
    fn rescale(&self) -> Rescale;

    /// Name of the index, also the appended band name.
    fn name(&self) -> &str;
}

/// The standard index set, table-driven: one entry per index, the
/// normalized-difference family sharing the generic NDI kernel.
pub fn standard_indices() -> Vec<Box<dyn IndexCalculator>> {
    vec![
        Box::new(NDI::new(BandRole::Nir, BandRole::Red, Some("NDVI".to_string()))),
        Box::new(EVI::new(None)),
        Box::new(SAVI::default()),
        Box::new(DVI::new(None)),
        Box::new(NDI::new(
            BandRole::Nir,
            BandRole::Swir1,
            Some("NDWI".to_string()),
        )),
        Box::new(NDI::new(
            BandRole::Nir,
            BandRole::Green,
            Some("GNDVI".to_string()),
        )),
        Box::new(BSI::new(None)),
    ]
}

/// Index names computable under a role map (every required role assigned).
///
/// This is a property of the dataset configuration alone; whether a given
/// scene actually carries the mapped bands is resolved per scene.
pub fn computable_indices(bands: &BandRoleMap) -> Vec<String> {
    standard_indices()
        .iter()
        .filter(|calc| calc.required_roles().iter().all(|&r| bands.get(r).is_some()))
        .map(|calc| calc.name().to_string())
        .collect()
}

/// Append one index band per computable index to a copy of the scene.
///
/// Indices whose roles are unassigned in the map, or whose mapped bands are
/// absent from the scene, are skipped. With [`Normalization::FixedBounds`]
/// the appended bands are normalized to [0, 1]; with
/// [`Normalization::WindowExtrema`] they carry raw index values and are
/// rescaled later, against the reduction window. The input scene is never
/// mutated.
pub fn compute_indices(scene: &Scene, bands: &BandRoleMap, normalization: Normalization) -> Scene {
    let mut output = scene.clone();

    for calc in standard_indices() {
        let Some(inputs) = resolve_inputs(scene, bands, calc.required_roles()) else {
            log::debug!(
                "skipping {} for scene {}: unavailable input band",
                calc.name(),
                scene.timestamp()
            );
            continue;
        };

        let mut band = calc.calculate(&inputs, scene.valid());
        if normalization == Normalization::FixedBounds {
            calc.rescale().apply_band(&mut band);
        }
        output
            .add_band(calc.name(), band)
            .expect("index band shape matches the input scene");
    }

    output
}

fn resolve_inputs<'a>(
    scene: &'a Scene,
    bands: &BandRoleMap,
    roles: &[BandRole],
) -> Option<Vec<&'a BandBuffer>> {
    roles
        .iter()
        .map(|&role| scene.band(bands.get(role)?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::GeoTransform;
    use chrono::{TimeZone, Utc};

    fn reflectance_scene(nir: f32, red: f32, blue: f32) -> Scene {
        let mut scene = Scene::new(
            Utc.with_ymd_and_hms(2023, 7, 1, 10, 30, 0).unwrap(),
            GeoTransform::default(),
            (2, 2),
        );
        scene.add_band("B8", BandBuffer::filled((2, 2), nir)).unwrap();
        scene.add_band("B4", BandBuffer::filled((2, 2), red)).unwrap();
        scene.add_band("B2", BandBuffer::filled((2, 2), blue)).unwrap();
        scene
    }

    fn three_roles() -> BandRoleMap {
        BandRoleMap::new("B8", "B4").with_blue("B2")
    }

    #[test]
    fn three_roles_yield_four_indices() {
        let scene = reflectance_scene(0.5, 0.1, 0.1);
        let out = compute_indices(&scene, &three_roles(), Normalization::FixedBounds);
        assert_eq!(out.band_count(), scene.band_count() + 4);
        for name in ["NDVI", "EVI", "SAVI", "DVI"] {
            assert!(out.band(name).is_some(), "missing {name}");
        }
        assert!(out.band("NDWI").is_none());
        assert!(out.band("GNDVI").is_none());
        assert!(out.band("BSI").is_none());
    }

    #[test]
    fn five_roles_yield_seven_indices() {
        let mut scene = reflectance_scene(0.5, 0.1, 0.1);
        scene.add_band("B3", BandBuffer::filled((2, 2), 0.2)).unwrap();
        scene.add_band("B11", BandBuffer::filled((2, 2), 0.3)).unwrap();
        let bands = three_roles().with_green("B3").with_swir1("B11");
        let out = compute_indices(&scene, &bands, Normalization::FixedBounds);
        assert_eq!(out.band_count(), scene.band_count() + 7);
    }

    #[test]
    fn computable_indices_follow_the_role_map() {
        assert_eq!(
            computable_indices(&three_roles()),
            vec!["NDVI", "EVI", "SAVI", "DVI"]
        );
        let all = three_roles().with_green("B3").with_swir1("B11");
        assert_eq!(computable_indices(&all).len(), 7);
    }

    #[test]
    fn worked_reflectance_scenario() {
        // NIR=0.5, RED=0.1, BLUE=0.1:
        //   NDVI raw 0.666.. -> 0.8333..; EVI raw 0.7407.. -> 0.8703..
        let scene = reflectance_scene(0.5, 0.1, 0.1);
        let out = compute_indices(&scene, &three_roles(), Normalization::FixedBounds);
        let ndvi = out.band("NDVI").unwrap().data()[0];
        let evi = out.band("EVI").unwrap().data()[0];
        assert!((ndvi - 0.8333333).abs() < 1e-5, "NDVI {ndvi}");
        assert!((evi - 0.8703704).abs() < 1e-5, "EVI {evi}");
    }

    #[test]
    fn masked_pixels_stay_nodata() {
        let mut scene = reflectance_scene(0.5, 0.1, 0.1);
        scene.apply_validity(&[false, true, true, true]);
        let out = compute_indices(&scene, &three_roles(), Normalization::FixedBounds);
        let ndvi = out.band("NDVI").unwrap().data();
        assert!(ndvi[0].is_nan());
        assert!(ndvi[1].is_finite());
    }

    #[test]
    fn input_scene_is_not_mutated() {
        let scene = reflectance_scene(0.5, 0.1, 0.1);
        let before = scene.band_count();
        let _ = compute_indices(&scene, &three_roles(), Normalization::FixedBounds);
        assert_eq!(scene.band_count(), before);
    }

    #[test]
    fn zero_denominators_per_formula() {
        // NDVI: NIR + RED = 0. EVI: NIR + 6*RED - 7.5*BLUE + 1 = 0.
        // SAVI: NIR + RED + 0.5 = 0.
        let zeros = reflectance_scene(0.0, 0.0, 0.0);
        let out = compute_indices(&zeros, &three_roles(), Normalization::FixedBounds);
        assert!(out.band("NDVI").unwrap().data()[0].is_nan());
        // EVI denominator is 1.0 here; raw 0 normalizes to 0.5.
        assert_eq!(out.band("EVI").unwrap().data()[0], 0.5);

        let evi_zero = reflectance_scene(0.5, 0.25, 0.4);
        let out = compute_indices(&evi_zero, &three_roles(), Normalization::FixedBounds);
        assert!(out.band("EVI").unwrap().data()[0].is_nan());

        let savi_zero = reflectance_scene(-0.3, -0.2, 0.0);
        let out = compute_indices(&savi_zero, &three_roles(), Normalization::FixedBounds);
        assert!(out.band("SAVI").unwrap().data()[0].is_nan());
    }
}
