// src/error.rs
pub type Result<T> = std::result::Result<T, SeriesError>;

#[derive(thiserror::Error, Debug)]
pub enum SeriesError {
    #[error("unknown dataset '{0}'")]
    UnknownDataset(String),
    #[error("scene has no band named '{0}'")]
    MissingBand(String),
    #[error("band shape {actual:?} does not match scene shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("band '{band}' has {actual} samples, scene expects {expected}")]
    BandLength {
        band: String,
        expected: usize,
        actual: usize,
    },
    #[error("scene collection is empty")]
    EmptyCollection,
}
