//! Errors for the fallible outer surfaces (configuration, path data, shape
//! parameters). Geometry generation itself never fails: malformed input
//! produces no drawing, degenerate geometry produces no operations.

/// Convenience result type for the parsing surfaces.
pub type RoughResult<T> = Result<T, RoughError>;

#[derive(thiserror::Error, Debug)]
pub enum RoughError {
    /// RON configuration could not be read into the requested type.
    #[error("configuration error: {0}")]
    Config(String),

    /// SVG path data was empty or could not be parsed.
    #[error("path data error: {0}")]
    PathData(String),

    /// Not enough (or non-finite) parameters for the requested shape.
    #[error("shape parameter error: {0}")]
    ShapeParams(String),
}

impl RoughError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn path_data(msg: impl Into<String>) -> Self {
        Self::PathData(msg.into())
    }

    pub fn shape_params(msg: impl Into<String>) -> Self {
        Self::ShapeParams(msg.into())
    }
}

impl From<ron::error::SpannedError> for RoughError {
    fn from(err: ron::error::SpannedError) -> Self {
        RoughError::Config(err.to_string())
    }
}
