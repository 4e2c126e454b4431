//! Effective index as a function of void fraction.
//!
//! Grid points are independent, so they are evaluated in parallel with
//! rayon and collected back in grid order. The Maxwell-Garnett dilute-limit
//! advisory is logged once per sweep rather than once per grid point.

use log::warn;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{check_index, EmtError, EmtResult};
use crate::types::{CompositeSpec, MAXWELL_GARNETT_DILUTE_LIMIT};

use super::maxwell_garnett::maxwell_garnett_eps;
use super::{Bruggeman, MixingRule, VolumeAverage};

/// One row of a void-fraction sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    pub void_fraction: f64,
    pub n_volume_average: f64,
    pub n_maxwell_garnett: f64,
    pub n_bruggeman: f64,
}

/// Evaluate all three rules on `points` evenly spaced void fractions in `[0, 1]`.
///
/// # Errors
/// Fewer than two points, invalid indices, or a Bruggeman failure at any
/// grid point (the whole sweep fails).
pub fn sweep_void_fraction(n_solid: f64, n_void: f64, points: usize) -> EmtResult<Vec<SweepRow>> {
    if points < 2 {
        return Err(EmtError::InvalidParameter(format!(
            "a sweep needs at least 2 points, got {points}"
        )));
    }
    check_index("n_solid", n_solid)?;
    check_index("n_void", n_void)?;

    let solver = Bruggeman::default();
    let last = (points - 1) as f64;

    let rows = (0..points)
        .into_par_iter()
        .map(|i| {
            let void_fraction = i as f64 / last;
            let spec = CompositeSpec::new(1.0 - void_fraction, n_solid, n_void)?;
            Ok(SweepRow {
                void_fraction,
                n_volume_average: VolumeAverage.effective_index(&spec)?.n_eff,
                n_maxwell_garnett: maxwell_garnett_eps(&spec).sqrt(),
                n_bruggeman: solver.effective_index(&spec)?.n_eff,
            })
        })
        .collect::<EmtResult<Vec<_>>>()?;

    if rows.iter().any(|r| 1.0 - r.void_fraction > MAXWELL_GARNETT_DILUTE_LIMIT) {
        warn!(
            "Maxwell-Garnett values above {:.0} % solid are outside the dilute limit; treat as indicative only",
            MAXWELL_GARNETT_DILUTE_LIMIT * 100.0
        );
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rows_are_in_grid_order_with_pure_phase_endpoints() {
        let rows = sweep_void_fraction(1.45, 1.0, 11).unwrap();
        assert_eq!(rows.len(), 11);
        assert!(rows.windows(2).all(|w| w[0].void_fraction < w[1].void_fraction));

        let first = rows.first().unwrap();
        assert_eq!(first.void_fraction, 0.0);
        assert_relative_eq!(first.n_bruggeman, 1.45, epsilon = 1e-12);

        let last = rows.last().unwrap();
        assert_eq!(last.void_fraction, 1.0);
        assert_relative_eq!(last.n_maxwell_garnett, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_maxwell_garnett_column_matches_rule() {
        for row in sweep_void_fraction(1.45, 1.0, 21).unwrap() {
            let est = crate::mixing::maxwell_garnett::maxwell_garnett(1.0 - row.void_fraction, 1.45, 1.0).unwrap();
            assert_relative_eq!(row.n_maxwell_garnett, est.n_eff, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_single_point_sweep_is_rejected() {
        assert!(matches!(
            sweep_void_fraction(1.45, 1.0, 1),
            Err(EmtError::InvalidParameter(_))
        ));
    }
}
