//! Non-dispersive materials with a fixed refractive index.

use num_complex::Complex64;

use crate::provider::{check_range, MaterialError, MaterialProvider};

/// A lossless material whose index does not vary with wavelength.
#[derive(Debug, Clone)]
pub struct ConstantMaterial {
    name: String,
    n: f64,
}

impl ConstantMaterial {
    pub fn new(name: impl Into<String>, n: f64) -> Result<Self, MaterialError> {
        if !n.is_finite() || n < 1.0 {
            return Err(MaterialError::InvalidCoefficients(format!(
                "constant index must be finite and >= 1.0, got {n}"
            )));
        }
        Ok(Self { name: name.into(), n })
    }
}

impl MaterialProvider for ConstantMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn wavelength_range(&self) -> (f64, f64) {
        (1.0, 1.0e6)
    }

    fn dielectric_function(&self, wavelength_nm: f64) -> Result<Complex64, MaterialError> {
        check_range(wavelength_nm, self.wavelength_range())?;
        Ok(Complex64::new(self.n * self.n, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_index_equals_phase_index_without_dispersion() {
        let glass = ConstantMaterial::new("flat", 1.45).unwrap();
        let n = glass.refractive_index(1310.0).unwrap().re;
        let ng = glass.group_index(1310.0).unwrap();
        assert!((n - 1.45).abs() < 1e-12);
        assert!((ng - n).abs() < 1e-9);
    }

    #[test]
    fn test_sub_vacuum_index_is_rejected() {
        assert!(ConstantMaterial::new("bad", 0.7).is_err());
    }
}
