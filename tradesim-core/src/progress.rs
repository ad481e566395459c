//! Progress observer for the capital evolution loop.

/// Progress callback for a simulation run.
///
/// `on_milestone` fires once per completed decile of the run.
pub trait ProgressObserver {
    /// Called before the first trade.
    fn on_start(&mut self, _total: usize) {}

    /// Called when `completed` trades cross a new 10% boundary.
    fn on_milestone(&mut self, completed: usize, total: usize, percent: u32);

    /// Called after the last trade.
    fn on_finish(&mut self, _total: usize) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_milestone(&mut self, _completed: usize, _total: usize, _percent: u32) {}
}

/// Decile reached after `completed` of `total` trades, or `None` if the
/// trade did not cross a new 10% boundary.
pub fn milestone(completed: usize, total: usize) -> Option<u32> {
    if total == 0 || completed == 0 || completed > total {
        return None;
    }
    let decile = |n: usize| (n as u128 * 10 / total as u128) as u32;
    let now = decile(completed);
    if now > decile(completed - 1) {
        Some(now * 10)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tenth_for_round_totals() {
        let hits: Vec<(usize, u32)> = (1..=100)
            .filter_map(|i| milestone(i, 100).map(|p| (i, p)))
            .collect();
        assert_eq!(hits.len(), 10);
        assert_eq!(hits[0], (10, 10));
        assert_eq!(hits[9], (100, 100));
    }

    #[test]
    fn small_totals_do_not_divide_by_zero() {
        let hits: Vec<u32> = (1..=3).filter_map(|i| milestone(i, 3)).collect();
        // 1/3 → 30%, 2/3 → 60%, 3/3 → 100%
        assert_eq!(hits, vec![30, 60, 100]);
    }

    #[test]
    fn final_trade_always_reports_completion() {
        for total in [1, 7, 13, 999, 100_000] {
            assert_eq!(milestone(total, total), Some(100));
        }
    }

    #[test]
    fn out_of_range_is_none() {
        assert_eq!(milestone(0, 10), None);
        assert_eq!(milestone(11, 10), None);
        assert_eq!(milestone(1, 0), None);
    }
}
