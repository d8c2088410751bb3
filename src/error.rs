/// Errors raised while generating or constraining keys.
///
/// Evaluation never fails; shape mismatches there are programmer errors and panic.
#[derive(Debug, thiserror::Error)]
pub enum CprfError {
    #[error("secure random source failed: {0}")]
    RandomnessFailure(#[from] rand::Error),
    #[error("vector length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("invalid parameters: {0}")]
    InvalidParameters(&'static str),
}
