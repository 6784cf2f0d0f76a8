//! Biological-age trajectory projection
//!
//! Projects a sustained composite score into signed "years of age impact"
//! over a set of horizons. Positive impact means the projected biological age
//! runs older than chronological age; negative means younger. Pure function,
//! recomputed on every view, never persisted.

use serde::Serialize;

/// ---------------------------------------------------------------------------
/// Constants
/// ---------------------------------------------------------------------------

/// Reference score an optimal routine is modeled to sustain. Deliberately
/// above the 0-100 assessment ceiling.
pub const OPTIMAL_REFERENCE_SCORE: f64 = 135.0;

/// Horizons surfaced by default
pub const DEFAULT_HORIZONS: [u32; 4] = [5, 10, 15, 20];

/// ---------------------------------------------------------------------------
/// Base Impact Table
/// ---------------------------------------------------------------------------

/// One score band mapping linearly onto an impact range in years
struct ImpactBand {
  score_lo: f64,
  score_hi: f64,
  impact_lo: f64,
  impact_hi: f64,
}

// Eight bands over [60, 140]. Scores below the table clamp to the worst
// impact, above it to the best. The 90-110 stretch is flat around zero so a
// merely-average score neither ages nor rejuvenates.
static IMPACT_BANDS: [ImpactBand; 8] = [
  ImpactBand { score_lo: 60.0, score_hi: 70.0, impact_lo: 2.5, impact_hi: 1.5 },
  ImpactBand { score_lo: 70.0, score_hi: 80.0, impact_lo: 1.5, impact_hi: 0.8 },
  ImpactBand { score_lo: 80.0, score_hi: 90.0, impact_lo: 0.8, impact_hi: 0.2 },
  ImpactBand { score_lo: 90.0, score_hi: 100.0, impact_lo: 0.2, impact_hi: 0.0 },
  ImpactBand { score_lo: 100.0, score_hi: 110.0, impact_lo: 0.0, impact_hi: -0.2 },
  ImpactBand { score_lo: 110.0, score_hi: 120.0, impact_lo: -0.2, impact_hi: -1.0 },
  ImpactBand { score_lo: 120.0, score_hi: 130.0, impact_lo: -1.0, impact_hi: -1.8 },
  ImpactBand { score_lo: 130.0, score_hi: 140.0, impact_lo: -1.8, impact_hi: -2.5 },
];

/// Base 5-year impact for a sustained score, interpolated linearly within
/// its band and clamped at the table's extremes.
pub fn base_five_year_impact(score: f64) -> f64 {
  let first = &IMPACT_BANDS[0];
  let last = &IMPACT_BANDS[IMPACT_BANDS.len() - 1];

  if score < first.score_lo {
    return first.impact_lo;
  }
  if score > last.score_hi {
    return last.impact_hi;
  }

  for band in &IMPACT_BANDS {
    if score >= band.score_lo && score <= band.score_hi {
      let position = (score - band.score_lo) / (band.score_hi - band.score_lo);
      return band.impact_lo + position * (band.impact_hi - band.impact_lo);
    }
  }

  // Unreachable: the bands are contiguous over [60, 140]
  0.0
}

/// Scale a base 5-year impact to another horizon.
///
/// Sub-linear on purpose: multiplying the horizon by four only doubles the
/// factor, modeling diminishing marginal effect of sustained habits.
fn horizon_factor(horizon_years: u32) -> f64 {
  (horizon_years as f64 / 5.0).sqrt()
}

/// ---------------------------------------------------------------------------
/// Projection
/// ---------------------------------------------------------------------------

/// Impact at one horizon, for the user's trajectory and the optimal reference
#[derive(Debug, Clone, Serialize)]
pub struct BiologicalAgeProjection {
  pub horizon_years: u32,
  pub current_impact_years: f64,
  pub optimal_impact_years: f64,
  pub gap_years: f64,
}

/// Project a sustained score over the given horizons against an optimal
/// reference score.
pub fn project(
  sustained_score: f64,
  horizons: &[u32],
  optimal_score: f64,
) -> Vec<BiologicalAgeProjection> {
  let current_base = base_five_year_impact(sustained_score);
  let optimal_base = base_five_year_impact(optimal_score);

  horizons
    .iter()
    .map(|&horizon| {
      let factor = horizon_factor(horizon);
      let current_impact_years = current_base * factor;
      let optimal_impact_years = optimal_base * factor;
      BiologicalAgeProjection {
        horizon_years: horizon,
        current_impact_years,
        optimal_impact_years,
        gap_years: current_impact_years - optimal_impact_years,
      }
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_approx_eq;

  #[test]
  fn test_low_scores_clamp_to_worst_impact() {
    // 42 is below the lowest band, so it clamps to +2.5.
    assert_eq!(base_five_year_impact(42.0), 2.5);
    assert_eq!(base_five_year_impact(0.0), 2.5);
    assert_eq!(base_five_year_impact(59.9), 2.5);
  }

  #[test]
  fn test_high_scores_clamp_to_best_impact() {
    assert_eq!(base_five_year_impact(140.0), -2.5);
    assert_eq!(base_five_year_impact(150.0), -2.5);
  }

  #[test]
  fn test_neutral_band_is_near_zero() {
    for score in [90.0, 95.0, 100.0, 105.0, 110.0] {
      let impact = base_five_year_impact(score);
      assert!(
        impact.abs() <= 0.2,
        "score {} gave impact {}, expected within ±0.2",
        score,
        impact
      );
    }
  }

  #[test]
  fn test_interpolation_within_band() {
    // Midpoint of the 60-70 band: halfway between 2.5 and 1.5.
    assert_approx_eq!(base_five_year_impact(65.0), 2.0, 1e-9);
    // Optimal reference at 135: halfway into the 130-140 band.
    assert_approx_eq!(base_five_year_impact(135.0), -2.15, 1e-9);
  }

  #[test]
  fn test_continuity_at_band_boundaries() {
    // Stepping across every boundary must not jump more than the local
    // interpolation slope allows.
    let eps = 1e-6;
    for boundary in [60.0, 70.0, 80.0, 90.0, 100.0, 110.0, 120.0, 130.0, 140.0] {
      let below = base_five_year_impact(boundary - eps);
      let at = base_five_year_impact(boundary);
      let above = base_five_year_impact(boundary + eps);
      assert!(
        (below - at).abs() < 1e-3,
        "discontinuity below {}: {} vs {}",
        boundary,
        below,
        at
      );
      assert!(
        (above - at).abs() < 1e-3,
        "discontinuity above {}: {} vs {}",
        boundary,
        above,
        at
      );
    }
  }

  #[test]
  fn test_twenty_year_impact_is_exactly_double_five_year() {
    for score in [42.0, 65.0, 85.0, 120.0, 135.0] {
      let projections = project(score, &[5, 20], OPTIMAL_REFERENCE_SCORE);
      let five = projections[0].current_impact_years;
      let twenty = projections[1].current_impact_years;
      if five != 0.0 {
        assert_approx_eq!(twenty / five, 2.0, 1e-12);
      }
    }
  }

  #[test]
  fn test_spec_example_score_42() {
    let projections = project(42.0, &[5, 20], OPTIMAL_REFERENCE_SCORE);
    assert_approx_eq!(projections[0].current_impact_years, 2.5, 1e-12);
    assert_approx_eq!(projections[1].current_impact_years, 5.0, 1e-12);
  }

  #[test]
  fn test_sign_convention_preserved() {
    // A poor sustained score ages; the optimal reference rejuvenates; the
    // gap between them is positive.
    let projections = project(50.0, &DEFAULT_HORIZONS, OPTIMAL_REFERENCE_SCORE);
    for p in &projections {
      assert!(p.current_impact_years > 0.0);
      assert!(p.optimal_impact_years < 0.0);
      assert!(p.gap_years > 0.0);
      assert_approx_eq!(
        p.gap_years,
        p.current_impact_years - p.optimal_impact_years,
        1e-12
      );
    }
  }

  #[test]
  fn test_default_horizons_shape() {
    let projections = project(95.0, &DEFAULT_HORIZONS, OPTIMAL_REFERENCE_SCORE);
    let horizons: Vec<u32> = projections.iter().map(|p| p.horizon_years).collect();
    assert_eq!(horizons, vec![5, 10, 15, 20]);
  }
}
