// src/io/reader.rs
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SeriesError;
use crate::raster::{BandBuffer, GeoTransform, Scene};

/// On-disk form of a scene collection.
#[derive(Debug, Serialize, Deserialize)]
pub struct SceneCollectionDoc {
    pub scenes: Vec<SceneDoc>,
}

/// On-disk form of one scene: flat row-major band arrays keyed by band name.
#[derive(Debug, Serialize, Deserialize)]
pub struct SceneDoc {
    pub timestamp: DateTime<Utc>,
    pub transform: GeoTransform,
    pub width: usize,
    pub height: usize,
    pub bands: BTreeMap<String, Vec<f32>>,
}

impl SceneDoc {
    pub fn into_scene(self) -> std::result::Result<Scene, SeriesError> {
        let shape = (self.width, self.height);
        let mut scene = Scene::new(self.timestamp, self.transform, shape);
        for (name, data) in self.bands {
            if data.len() != self.width * self.height {
                return Err(SeriesError::BandLength {
                    band: name,
                    expected: self.width * self.height,
                    actual: data.len(),
                });
            }
            scene.add_band(name, BandBuffer::new(shape, data))?;
        }
        Ok(scene)
    }
}

/// Load a scene collection from a JSON document.
pub fn read_scenes(path: &Path) -> Result<Vec<Scene>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading scene collection {}", path.display()))?;
    let doc: SceneCollectionDoc = serde_json::from_str(&content)
        .with_context(|| format!("parsing scene collection {}", path.display()))?;

    if doc.scenes.is_empty() {
        return Err(SeriesError::EmptyCollection.into());
    }

    let scenes = doc
        .scenes
        .into_iter()
        .map(SceneDoc::into_scene)
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("building scenes from collection document")?;

    log::info!("loaded {} scene(s) from {}", scenes.len(), path.display());
    Ok(scenes)
}
