//! Errors raised by the effective-medium and propagation calculations.

use thiserror::Error;

/// Errors that can occur while evaluating a mixing rule or a latency.
///
/// Input validation variants are raised before any computation starts.
/// [`EmtError::ConvergenceFailure`] and [`EmtError::Divergence`] are the only
/// failures that can happen after the Bruggeman solve has begun.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EmtError {
    #[error("Solid fraction {0} is outside [0, 1]")]
    InvalidFraction(f64),

    #[error("Refractive index {value} for {role} must be finite and >= 1.0")]
    InvalidIndex { role: &'static str, value: f64 },

    #[error("Path length {0} m must be finite and non-negative")]
    InvalidLength(f64),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Bruggeman solve failed to converge after {max_iter} iterations (last step: {last_step:.2e})")]
    ConvergenceFailure { max_iter: usize, last_step: f64 },

    #[error("Bruggeman solve diverged: permittivity {epsilon} outside [{lower}, {upper}]")]
    Divergence { epsilon: f64, lower: f64, upper: f64 },
}

/// Convenience alias for results carrying an [`EmtError`].
pub type EmtResult<T> = Result<T, EmtError>;

/// Reject a solid fraction outside `[0, 1]` (or NaN).
pub(crate) fn check_fraction(fraction: f64) -> EmtResult<()> {
    if !(0.0..=1.0).contains(&fraction) {
        return Err(EmtError::InvalidFraction(fraction));
    }
    Ok(())
}

/// Reject a refractive index below 1.0 (or non-finite).
pub(crate) fn check_index(role: &'static str, value: f64) -> EmtResult<()> {
    if !value.is_finite() || value < 1.0 {
        return Err(EmtError::InvalidIndex { role, value });
    }
    Ok(())
}

/// Reject a negative or non-finite path length.
pub(crate) fn check_length(length_m: f64) -> EmtResult<()> {
    if !length_m.is_finite() || length_m < 0.0 {
        return Err(EmtError::InvalidLength(length_m));
    }
    Ok(())
}
