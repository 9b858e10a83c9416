//! Tail-risk statistics for revenue series

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, OrderStatistics, Statistics};

fn check_inputs(values: &[f64], alpha: f64) -> Result<()> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Risk measures need at least one value".to_string(),
        ));
    }

    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(MathError::InvalidInput(format!(
            "Alpha must be between 0 and 1, got {}",
            alpha
        )));
    }

    if values.iter().any(|v| !v.is_finite()) {
        return Err(MathError::CalculationError(
            "Risk measures are undefined for non-finite values".to_string(),
        ));
    }

    Ok(())
}

/// Lower `alpha`-quantile of the values (the revenue level that is only
/// undershot with probability `alpha`)
pub fn value_at_risk(values: &[f64], alpha: f64) -> Result<f64> {
    check_inputs(values, alpha)?;
    let mut data = Data::new(values.to_vec());
    Ok(data.quantile(alpha))
}

/// Mean of all values at or below the `alpha` value-at-risk
pub fn conditional_value_at_risk(values: &[f64], alpha: f64) -> Result<f64> {
    let var = value_at_risk(values, alpha)?;
    let tail: Vec<f64> = values.iter().copied().filter(|&v| v <= var).collect();

    // The quantile interpolates between order statistics, so the tail always
    // holds at least the minimum.
    if tail.is_empty() {
        return Err(MathError::CalculationError(
            "Empty tail below value-at-risk".to_string(),
        ));
    }

    Ok(tail.mean())
}

/// Distribution summary of a revenue series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    /// Sum of all values
    pub total: f64,
    /// Arithmetic mean
    pub mean: f64,
    /// Tail probability used for VaR / CVaR
    pub alpha: f64,
    /// Value at risk at `alpha`
    pub value_at_risk: f64,
    /// Conditional value at risk at `alpha`
    pub conditional_value_at_risk: f64,
}

impl RiskSummary {
    /// Summarize a series of values
    pub fn from_values(values: &[f64], alpha: f64) -> Result<Self> {
        check_inputs(values, alpha)?;

        Ok(Self {
            total: values.iter().sum(),
            mean: values.mean(),
            alpha,
            value_at_risk: value_at_risk(values, alpha)?,
            conditional_value_at_risk: conditional_value_at_risk(values, alpha)?,
        })
    }
}

impl std::fmt::Display for RiskSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Revenue Risk Summary:")?;
        writeln!(f, "  Total:   {:.2}", self.total)?;
        writeln!(f, "  Mean:    {:.2}", self.mean)?;
        writeln!(f, "  VaR({:.0}%):  {:.2}", self.alpha * 100.0, self.value_at_risk)?;
        writeln!(
            f,
            "  CVaR({:.0}%): {:.2}",
            self.alpha * 100.0,
            self.conditional_value_at_risk
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_small_alpha_hits_minimum() {
        let values: Vec<f64> = (0..10).map(|i| i as f64 * 10.0 - 20.0).collect();

        assert_relative_eq!(value_at_risk(&values, 0.05).unwrap(), -20.0);
        assert_relative_eq!(conditional_value_at_risk(&values, 0.05).unwrap(), -20.0);
    }

    #[test]
    fn test_cvar_not_above_var_or_mean() {
        let values = [12.0, -4.0, 7.5, 30.0, -15.0, 2.0, 9.0, 11.0, -1.0, 5.0, 3.5, 8.0];
        let summary = RiskSummary::from_values(&values, 0.25).unwrap();

        assert!(summary.conditional_value_at_risk <= summary.value_at_risk);
        assert!(summary.value_at_risk <= summary.mean);
        assert_relative_eq!(summary.total, values.iter().sum::<f64>());
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            value_at_risk(&[], 0.05),
            Err(MathError::InsufficientData(_))
        ));
        assert!(matches!(
            value_at_risk(&[1.0], 1.5),
            Err(MathError::InvalidInput(_))
        ));
        assert!(matches!(
            value_at_risk(&[1.0, f64::NAN], 0.05),
            Err(MathError::CalculationError(_))
        ));
    }
}
