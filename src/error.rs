use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// crate specific Error enum
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Configuration(String),
    #[error("The point cloud contains no points")]
    InsufficientPoints,
    #[error("{0}")]
    InsufficientData(String),
    #[error("Not enough memory (elevation grid of {width}x{height} cells)")]
    GridAllocationFailed { width: usize, height: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Could not read point cloud: {0}")]
    Ply(String),
    #[error(transparent)]
    LasError(#[from] las::Error),
    #[error(transparent)]
    TiffError(#[from] tiff::TiffError),
    #[error("Could not insert point into triangulation: {0:?}")]
    Triangulation(spade::InsertionError),
}

impl From<spade::InsertionError> for Error {
    fn from(value: spade::InsertionError) -> Self {
        Error::Triangulation(value)
    }
}
