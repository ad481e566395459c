//! Run metrics — pure functions over a capital trajectory and outcome list.
//!
//! These complement the core `SummaryStatistics` with path-dependent
//! measures: drawdown and streaks. No dependencies on config or export.

use serde::{Deserialize, Serialize};
use tradesim_core::domain::Outcome;
use tradesim_core::engine::round_dp;

/// Path-dependent metrics for a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub total_return_percent: f64,
    pub max_drawdown_percent: f64,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
    pub avg_losing_streak: f64,
}

impl RunMetrics {
    /// Compute all metrics, rounding the percentages to `decimal_places`.
    pub fn compute(trajectory: &[f64], outcomes: &[Outcome], decimal_places: u32) -> Self {
        Self {
            total_return_percent: round_dp(total_return(trajectory) * 100.0, decimal_places),
            max_drawdown_percent: round_dp(max_drawdown(trajectory) * 100.0, decimal_places),
            max_consecutive_wins: max_consecutive(outcomes, Outcome::Win),
            max_consecutive_losses: max_consecutive(outcomes, Outcome::Loss),
            avg_losing_streak: round_dp(avg_losing_streak(outcomes), decimal_places),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(trajectory: &[f64]) -> f64 {
    match (trajectory.first(), trajectory.last()) {
        (Some(&initial), Some(&last)) if trajectory.len() >= 2 && initial > 0.0 => {
            (last - initial) / initial
        }
        _ => 0.0,
    }
}

/// Maximum drawdown as a negative fraction (e.g., -0.15 = 15% drawdown).
///
/// Returns 0.0 if capital never falls below a previous peak.
pub fn max_drawdown(trajectory: &[f64]) -> f64 {
    let Some(&first) = trajectory.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &capital in trajectory {
        if capital > peak {
            peak = capital;
        }
        if peak > 0.0 {
            let dd = (capital - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Longest run of `target` outcomes.
pub fn max_consecutive(outcomes: &[Outcome], target: Outcome) -> usize {
    let mut max_streak = 0;
    let mut current = 0;

    for &o in outcomes {
        if o == target {
            current += 1;
            max_streak = max_streak.max(current);
        } else {
            current = 0;
        }
    }
    max_streak
}

/// Average length of losing streaks.
pub fn avg_losing_streak(outcomes: &[Outcome]) -> f64 {
    let mut streaks: Vec<usize> = Vec::new();
    let mut current = 0;

    for o in outcomes {
        if o.is_loss() {
            current += 1;
        } else {
            if current > 0 {
                streaks.push(current);
            }
            current = 0;
        }
    }
    if current > 0 {
        streaks.push(current);
    }

    if streaks.is_empty() {
        return 0.0;
    }
    streaks.iter().sum::<usize>() as f64 / streaks.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use Outcome::{Loss, Win};

    // ── Total return ──

    #[test]
    fn total_return_positive() {
        let eq = vec![10_000.0, 10_500.0, 11_000.0];
        assert!((total_return(&eq) - 0.1).abs() < 1e-10);
    }

    #[test]
    fn total_return_negative() {
        let eq = vec![10_000.0, 9_500.0, 9_000.0];
        assert!((total_return(&eq) - (-0.1)).abs() < 1e-10);
    }

    #[test]
    fn total_return_single_point() {
        assert_eq!(total_return(&[10_000.0]), 0.0);
        assert_eq!(total_return(&[]), 0.0);
    }

    // ── Max drawdown ──

    #[test]
    fn max_drawdown_known() {
        let eq = vec![100_000.0, 110_000.0, 90_000.0, 95_000.0];
        let expected = (90_000.0 - 110_000.0) / 110_000.0;
        assert!((max_drawdown(&eq) - expected).abs() < 1e-10);
    }

    #[test]
    fn max_drawdown_monotonic_increase() {
        let eq: Vec<f64> = (0..100).map(|i| 1_000.0 * 1.01_f64.powi(i)).collect();
        assert_eq!(max_drawdown(&eq), 0.0);
    }

    #[test]
    fn max_drawdown_empty() {
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    // ── Streaks ──

    #[test]
    fn consecutive_wins_and_losses() {
        let seq = [Win, Win, Win, Loss, Win, Loss, Loss];
        assert_eq!(max_consecutive(&seq, Win), 3);
        assert_eq!(max_consecutive(&seq, Loss), 2);
    }

    #[test]
    fn consecutive_empty() {
        assert_eq!(max_consecutive(&[], Win), 0);
        assert_eq!(max_consecutive(&[], Loss), 0);
    }

    #[test]
    fn avg_losing_streak_mixed() {
        // Two streaks: [2, 1], avg = 1.5
        let seq = [Loss, Loss, Win, Loss, Win];
        assert!((avg_losing_streak(&seq) - 1.5).abs() < 1e-10);
    }

    #[test]
    fn avg_losing_streak_trailing() {
        let seq = [Win, Loss, Loss, Loss];
        assert!((avg_losing_streak(&seq) - 3.0).abs() < 1e-10);
    }

    #[test]
    fn avg_losing_streak_no_losses() {
        assert_eq!(avg_losing_streak(&[Win, Win]), 0.0);
    }

    // ── Aggregate ──

    #[test]
    fn compute_worked_example() {
        let trajectory = [10_000.0, 10_200.0, 10_098.0, 10_299.96];
        let m = RunMetrics::compute(&trajectory, &[Win, Loss, Win], 2);
        assert_eq!(m.total_return_percent, 3.0);
        assert_eq!(m.max_drawdown_percent, -1.0);
        assert_eq!(m.max_consecutive_wins, 1);
        assert_eq!(m.max_consecutive_losses, 1);
        assert_eq!(m.avg_losing_streak, 1.0);
    }
}
