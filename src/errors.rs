//! Errors
//!
//! Custom error types used throughout the `desdrift` crate.
use thiserror::Error;

/// Errors that can occur in the index, the ensemble or their collaborators.
#[derive(Debug, Error)]
pub enum DesDriftError {
    /// An operation that needs stored points was called before any point exists.
    #[error("Not initialized: {0}")]
    NotInitialized(String),
    /// Removal requested for a point without a matching active node.
    #[error("Point not found in the index. Is there any missing data in the stream?")]
    NotFound,
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid configuration value passed for {0}, expected {1} but {2} provided.")]
    InvalidConfiguration(String, String, String),
    /// Point or query with a feature count different from the index dimensionality.
    #[error("Expected {0} features, but {1} were provided.")]
    DimensionMismatch(usize, usize),
    /// Feature at the given position is NaN or infinite.
    #[error("Feature {0} is not a finite number.")]
    NonFiniteFeature(usize),
    /// Class label not below the configured number of classes.
    #[error("Class label {0} is out of range for {1} classes.")]
    LabelOutOfRange(usize, usize),
    /// Invalid value parsing.
    #[error("Invalid value {0} passed for {1}, expected one of {2}.")]
    ParseString(String, String, String),
    /// Unable to write configuration.
    #[error("Unable to write to file: {0}")]
    UnableToWrite(String),
    /// Unable to read configuration.
    #[error("Unable to read from file: {0}")]
    UnableToRead(String),
    /// A collaborator failed, pipeline state can no longer be trusted.
    #[error("Fatal error: {0}")]
    Fatal(String),
}
