//! Sellmeier dispersion models for transparent dielectrics.
//!
//! $$n^2(\lambda) = 1 + \sum_{j=1}^{3} \frac{B_j \lambda^2}{\lambda^2 - C_j}$$
//!
//! with $\lambda$ in micrometres and $C_j$ in µm². The materials are treated
//! as lossless inside their fitted range, so $\epsilon$ is purely real.
//!
//! ## Available materials
//!
//! | Identifier | Constructor | Range |
//! |-----------|-------------|-------|
//! | `SiO2_Malitson` | [`SellmeierMaterial::fused_silica()`] | 210–3710 nm |

use num_complex::Complex64;

use crate::provider::{check_range, MaterialError, MaterialProvider};

/// Three-term Sellmeier material.
#[derive(Debug, Clone)]
pub struct SellmeierMaterial {
    name: String,
    b: [f64; 3],
    /// Resonance terms $C_j$ (µm²).
    c: [f64; 3],
    range_nm: (f64, f64),
}

impl SellmeierMaterial {
    /// Fused silica, I. H. Malitson, *J. Opt. Soc. Am.* **55**, 1205 (1965).
    ///
    /// n ≈ 1.4585 at the sodium d-line and ≈ 1.4440 at 1550 nm.
    pub fn fused_silica() -> Self {
        Self {
            name: "SiO₂ (Malitson)".into(),
            b: [0.696_166_3, 0.407_942_6, 0.897_479_4],
            c: [0.068_404_3_f64.powi(2), 0.116_241_4_f64.powi(2), 9.896_161_f64.powi(2)],
            range_nm: (210.0, 3710.0),
        }
    }
}

impl MaterialProvider for SellmeierMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn wavelength_range(&self) -> (f64, f64) {
        self.range_nm
    }

    fn dielectric_function(&self, wavelength_nm: f64) -> Result<Complex64, MaterialError> {
        check_range(wavelength_nm, self.range_nm)?;
        let lam2 = (wavelength_nm * 1e-3).powi(2);
        let eps: f64 = 1.0
            + self
                .b
                .iter()
                .zip(self.c.iter())
                .map(|(b, c)| b * lam2 / (lam2 - c))
                .sum::<f64>();
        Ok(Complex64::new(eps, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_fused_silica_reference_indices() {
        let silica = SellmeierMaterial::fused_silica();
        assert_abs_diff_eq!(silica.refractive_index(1550.0).unwrap().re, 1.444_024, epsilon = 1e-5);
        assert_abs_diff_eq!(silica.refractive_index(587.6).unwrap().re, 1.458_462, epsilon = 1e-5);
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let silica = SellmeierMaterial::fused_silica();
        let err = silica.dielectric_function(5000.0).unwrap_err();
        assert_eq!(
            err,
            MaterialError::OutOfRange { wavelength_nm: 5000.0, min: 210.0, max: 3710.0 }
        );
    }
}
