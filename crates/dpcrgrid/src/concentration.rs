//! Poisson concentration estimate from positive/negative partition counts.
//!
//! With `p` the fraction of positive partitions, the mean number of target
//! copies per partition is `λ = -ln(1 - p)` and the concentration is
//! `λ / V` for a partition volume `V`. The 95% interval applies the normal
//! approximation to the binomial proportion before the transform.

use crate::error::EstimateError;

/// Two-sided 95% z-score.
const Z_95: f64 = 1.96;

/// Poisson concentration estimate with its 95% confidence interval.
///
/// Concentrations are in copies per unit of the well volume (copies/µL for
/// volumes in µL).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConcentrationEstimate {
    /// Fraction of positive partitions.
    pub p_hat: f64,
    pub n_positive: f64,
    pub n_negative: f64,
    pub n_partitions: f64,
    /// Point estimate.
    pub c_estimate: f64,
    /// Lower 95% bound.
    pub c_lower: f64,
    /// Upper 95% bound.
    pub c_upper: f64,
}

/// Mean copies per partition for positive fraction `p` (`p < 1`).
#[inline]
fn copies_per_partition(p: f64) -> f64 {
    -(-p).ln_1p()
}

/// Estimate concentration from partition counts and the well volume.
///
/// Counts are floats so callers can pass pre-scaled tallies. Callers swap the
/// two counts themselves when the label marks empty wells.
///
/// A positive fraction of 0 yields an all-zero estimate. A fraction (or upper
/// bound) of 1 or more is rejected, since `-ln(1 - p)` is undefined there. A
/// lower bound below 0 is transformed as is and gives a negative `c_lower`.
pub fn estimate_concentration(
    n_positive: f64,
    n_negative: f64,
    well_volume: f64,
) -> Result<ConcentrationEstimate, EstimateError> {
    if !n_positive.is_finite() || !n_negative.is_finite() || n_positive < 0.0 || n_negative < 0.0
    {
        return Err(EstimateError::InvalidCounts {
            n_positive,
            n_negative,
        });
    }
    if !well_volume.is_finite() || well_volume <= 0.0 {
        return Err(EstimateError::InvalidWellVolume(well_volume));
    }
    let n_partitions = n_positive + n_negative;
    if n_partitions <= 0.0 {
        return Err(EstimateError::NoPartitions);
    }

    let p_hat = n_positive / n_partitions;
    let p_dev = Z_95 * (p_hat * (1.0 - p_hat) / n_partitions).sqrt();
    let p_low = p_hat - p_dev;
    let p_upp = p_hat + p_dev;
    if p_hat >= 1.0 || p_upp >= 1.0 {
        return Err(EstimateError::InvalidProportion {
            p_hat,
            p_upper: p_upp,
        });
    }

    Ok(ConcentrationEstimate {
        p_hat,
        n_positive,
        n_negative,
        n_partitions,
        c_estimate: copies_per_partition(p_hat) / well_volume,
        c_lower: copies_per_partition(p_low) / well_volume,
        c_upper: copies_per_partition(p_upp) / well_volume,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const VOL_UL: f64 = 1.257e-5;

    #[test]
    fn thirty_of_hundred_matches_closed_form() {
        let est = estimate_concentration(30.0, 70.0, VOL_UL).expect("estimate");
        assert_relative_eq!(est.p_hat, 0.3, max_relative = 1e-12);
        assert_eq!(est.n_partitions, 100.0);
        assert_relative_eq!(est.c_estimate, -(0.7f64).ln() / VOL_UL, max_relative = 1e-12);
        assert_relative_eq!(est.c_estimate, 28375.09, max_relative = 1e-4);
        assert_relative_eq!(est.c_lower, 18771.05, max_relative = 1e-4);
        assert_relative_eq!(est.c_upper, 39299.82, max_relative = 1e-4);
        assert!(est.c_lower < est.c_estimate && est.c_estimate < est.c_upper);
    }

    #[test]
    fn recovers_lambda_over_volume() {
        for lambda in [0.01f64, 0.1, 0.5, 1.0, 2.0] {
            let p = 1.0 - (-lambda).exp();
            let n = 1.0e6;
            let est = estimate_concentration(p * n, (1.0 - p) * n, 2.5).expect("estimate");
            assert_relative_eq!(est.c_estimate, lambda / 2.5, max_relative = 1e-9);
        }
    }

    #[test]
    fn estimate_is_monotone_in_positives() {
        let mut last = -1.0;
        for n_pos in 0..200 {
            let est = estimate_concentration(n_pos as f64, 800.0, VOL_UL).expect("estimate");
            assert!(est.c_estimate >= last);
            last = est.c_estimate;
        }
    }

    #[test]
    fn all_positive_is_invalid_proportion() {
        let err = estimate_concentration(100.0, 0.0, VOL_UL).expect_err("expected error");
        assert!(matches!(err, EstimateError::InvalidProportion { .. }));
    }

    #[test]
    fn upper_bound_reaching_one_is_invalid() {
        // p_hat = 0.9 with only 10 partitions: upper bound ~1.086.
        let err = estimate_concentration(9.0, 1.0, VOL_UL).expect_err("expected error");
        match err {
            EstimateError::InvalidProportion { p_hat, p_upper } => {
                assert_relative_eq!(p_hat, 0.9);
                assert!(p_upper >= 1.0);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn no_positives_is_zero() {
        let est = estimate_concentration(0.0, 500.0, VOL_UL).expect("estimate");
        assert_eq!(est.p_hat, 0.0);
        assert_eq!(est.c_estimate, 0.0);
        assert_eq!(est.c_lower, 0.0);
        assert_eq!(est.c_upper, 0.0);
    }

    #[test]
    fn negative_lower_bound_is_not_clamped() {
        // p_hat = 0.01 with 100 partitions: p_hat - 1.96 * se < 0.
        let est = estimate_concentration(1.0, 99.0, 1.0).expect("estimate");
        let p_low = 0.01 - 1.96 * (0.01f64 * 0.99 / 100.0).sqrt();
        assert!(p_low < 0.0);
        assert_relative_eq!(est.c_lower, -(1.0 - p_low).ln(), max_relative = 1e-12);
        assert_relative_eq!(est.c_lower, -0.009457, max_relative = 1e-3);
        assert!(est.c_lower < 0.0 && est.c_estimate > 0.0);
    }

    #[test]
    fn rejects_bad_inputs() {
        assert_eq!(
            estimate_concentration(0.0, 0.0, VOL_UL),
            Err(EstimateError::NoPartitions)
        );
        assert!(matches!(
            estimate_concentration(-1.0, 5.0, VOL_UL),
            Err(EstimateError::InvalidCounts { .. })
        ));
        assert_eq!(
            estimate_concentration(1.0, 5.0, 0.0),
            Err(EstimateError::InvalidWellVolume(0.0))
        );
    }
}
