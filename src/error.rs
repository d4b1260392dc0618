//! Error taxonomy for map loading, matrix construction and search setup.
//!
//! "No complete route" is deliberately absent: it is a normal outcome reported
//! through [`crate::solution::RouteStatus::Incomplete`].

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum RouteError {
    #[error("graph contains no sectors")]
    EmptyGraph,
    #[error("graph has {count} sectors, at most {max} are supported")]
    TooManySectors { count: usize, max: usize },
    #[error("duplicate sector '{0}'")]
    DuplicateSector(String),
    #[error("unknown sector '{0}'")]
    UnknownSector(String),
    #[error("no distance between '{from}' and '{to}' in the distance matrix")]
    MissingDistance { from: String, to: String },
    #[error("invalid constraint: {0}")]
    InvalidConstraint(String),
    #[error("invalid seed: {0}")]
    InvalidSeed(String),
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, RouteError>;

impl RouteError {
    pub fn invalid_constraint(message: impl Into<String>) -> Self {
        Self::InvalidConstraint(message.into())
    }

    pub fn invalid_seed(message: impl Into<String>) -> Self {
        Self::InvalidSeed(message.into())
    }

    pub fn missing_distance(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::MissingDistance {
            from: from.into(),
            to: to.into(),
        }
    }
}
