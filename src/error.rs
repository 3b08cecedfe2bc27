use thiserror::Error;

/// Top-level error type for the geodis mesh kernel.
#[derive(Debug, Error)]
pub enum GeodisError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    GraphDist(#[from] GraphDistError),

    #[error(transparent)]
    Io(#[from] IoError),
}

/// Errors related to topology store mutations.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("invalid reference: vertex {vertex} does not exist")]
    InvalidReference { vertex: u32 },
}

/// Errors related to graph-distance computation.
#[derive(Debug, Error)]
pub enum GraphDistError {
    #[error("invalid source index: {id} (field has {count} elements)")]
    InvalidSourceIndex { id: u32, count: usize },
}

/// Errors related to mesh file io.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("unknown file format: \"{0}\"")]
    UnknownFormat(String),

    #[error("line {line}: {message}")]
    InvalidContent { line: usize, message: String },

    #[error("cannot write both vertex and face {0} attributes")]
    ConflictingOptions(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for results using [`GeodisError`].
pub type Result<T> = std::result::Result<T, GeodisError>;
