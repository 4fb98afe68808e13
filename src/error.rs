use thiserror::Error;

/// Faults raised by the prediction core.
///
/// Unseen categories and missing gain-table entries are not represented here:
/// they degrade to sentinel/default values instead of failing a request.
#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("feature row has {got} values, model expects {expected}")]
    FeatureCount { expected: usize, got: usize },

    #[error("class index {index} has no label ({classes} known classes)")]
    UnknownClass { index: usize, classes: usize },

    #[error("tree {tree} is malformed: {reason}")]
    InvalidTree { tree: usize, reason: String },

    #[error("ensemble contains no trees")]
    EmptyForest,

    #[error("classifier lists {got} classes but its leaves carry {expected}")]
    ClassCount { expected: usize, got: usize },

    #[error("encoder set has no field '{0}'")]
    MissingEncoder(String),
}

pub type Result<T> = std::result::Result<T, AdvisorError>;
