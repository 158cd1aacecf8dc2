// src/io/mod.rs
pub mod reader;
pub mod writer;

pub use reader::{read_scenes, SceneCollectionDoc, SceneDoc};
pub use writer::{write_chart, ChartDocument};
