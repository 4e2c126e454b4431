//! Material property provider trait.
//!
//! All material data sources implement [`MaterialProvider`], which returns
//! the wavelength-dependent complex dielectric function. Refractive and group
//! indices are derived from it.

use num_complex::Complex64;
use thiserror::Error;

/// Errors from material providers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MaterialError {
    #[error("Wavelength {wavelength_nm} nm is outside the valid range [{min}, {max}] nm")]
    OutOfRange {
        wavelength_nm: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid material coefficients: {0}")]
    InvalidCoefficients(String),
}

/// Relative step used for the numerical derivative in [`MaterialProvider::group_index`].
const GROUP_INDEX_REL_STEP: f64 = 1e-4;

/// Provides wavelength-dependent material properties.
pub trait MaterialProvider: Send + Sync {
    /// Human-readable name of this material.
    fn name(&self) -> &str;

    /// Wavelength range over which the model is valid (nm).
    fn wavelength_range(&self) -> (f64, f64);

    /// Complex dielectric function $\epsilon(\lambda)$ at a given wavelength.
    fn dielectric_function(&self, wavelength_nm: f64) -> Result<Complex64, MaterialError>;

    /// Complex refractive index $\tilde{n} = n + ik$ at a given wavelength.
    ///
    /// Default implementation derives from $\epsilon = \tilde{n}^2$.
    fn refractive_index(&self, wavelength_nm: f64) -> Result<Complex64, MaterialError> {
        let eps = self.dielectric_function(wavelength_nm)?;
        Ok(eps.sqrt())
    }

    /// Group index $n_g = n - \lambda \, dn/d\lambda$ (real part only).
    ///
    /// Uses a central difference, shrunk to a one-sided difference at the
    /// edges of the valid range.
    fn group_index(&self, wavelength_nm: f64) -> Result<f64, MaterialError> {
        let (lo, hi) = self.wavelength_range();
        let n = self.refractive_index(wavelength_nm)?.re;

        let h = wavelength_nm * GROUP_INDEX_REL_STEP;
        let left = (wavelength_nm - h).max(lo);
        let right = (wavelength_nm + h).min(hi);
        if right <= left {
            return Ok(n);
        }
        let n_left = self.refractive_index(left)?.re;
        let n_right = self.refractive_index(right)?.re;
        let dn_dlambda = (n_right - n_left) / (right - left);

        Ok(n - wavelength_nm * dn_dlambda)
    }
}

/// Reject a wavelength outside `range`.
pub(crate) fn check_range(wavelength_nm: f64, range: (f64, f64)) -> Result<(), MaterialError> {
    let (min, max) = range;
    if !(min..=max).contains(&wavelength_nm) {
        return Err(MaterialError::OutOfRange { wavelength_nm, min, max });
    }
    Ok(())
}
