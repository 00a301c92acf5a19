//! Error types for Despensa operations.
//!
//! Provides rich error context for library consumers.

use std::fmt;

/// Main error type for Despensa operations.
///
/// Covers embedding-build failures (mismatched training data, too few
/// cuisines), planning failures (exhausted recipe pool), and the ambient
/// I/O and serialization errors of corpus and model persistence.
///
/// # Examples
///
/// ```
/// use despensa::error::DespensaError;
///
/// let err = DespensaError::DataMismatch { features: 120, labels: 118 };
/// assert!(err.to_string().contains("120"));
/// ```
#[derive(Debug)]
pub enum DespensaError {
    /// Training feature rows and label count disagree.
    DataMismatch {
        /// Number of feature vectors provided
        features: usize,
        /// Number of labels provided
        labels: usize,
    },

    /// Fewer than two distinct cuisines in the training labels.
    ///
    /// Diversity-based planning needs at least two cuisines to have a
    /// meaningful distance between anything.
    InsufficientCuisines {
        /// Distinct cuisines found
        found: usize,
    },

    /// Average distance requested against an empty reference set.
    EmptyReferenceSet,

    /// No unused recipe remains in the pool.
    ///
    /// Terminal for the planning session. `selected` reports how many
    /// meals were planned before exhaustion so partial plans can be
    /// reported rather than discarded.
    PoolExhausted {
        /// Meals successfully selected before the pool ran out
        selected: usize,
    },

    /// A cuisine label not present in the distance matrix.
    UnknownCuisine {
        /// The offending label
        label: String,
    },

    /// Vector/matrix dimensions don't match for the operation.
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// I/O error (file not found, permission denied, etc.).
    Io(std::io::Error),

    /// Serialization/deserialization error.
    Serialization(String),

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for DespensaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DespensaError::DataMismatch { features, labels } => {
                write!(
                    f,
                    "Training data mismatch: {features} feature vectors but {labels} labels"
                )
            }
            DespensaError::InsufficientCuisines { found } => {
                write!(
                    f,
                    "Insufficient cuisines: found {found}, need at least 2 for diversity planning"
                )
            }
            DespensaError::EmptyReferenceSet => {
                write!(
                    f,
                    "Cannot compute average distance against an empty reference set"
                )
            }
            DespensaError::PoolExhausted { selected } => {
                write!(
                    f,
                    "Recipe pool exhausted after {selected} meal(s): no unused recipe remains"
                )
            }
            DespensaError::UnknownCuisine { label } => {
                write!(f, "Unknown cuisine: {label:?} is not in the distance matrix")
            }
            DespensaError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {expected}, got {actual}")
            }
            DespensaError::Io(e) => write!(f, "I/O error: {e}"),
            DespensaError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            DespensaError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for DespensaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DespensaError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DespensaError {
    fn from(err: std::io::Error) -> Self {
        DespensaError::Io(err)
    }
}

impl From<serde_json::Error> for DespensaError {
    fn from(err: serde_json::Error) -> Self {
        DespensaError::Serialization(err.to_string())
    }
}

impl From<&str> for DespensaError {
    fn from(msg: &str) -> Self {
        DespensaError::Other(msg.to_string())
    }
}

impl From<String> for DespensaError {
    fn from(msg: String) -> Self {
        DespensaError::Other(msg)
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, DespensaError>;
