//! TradeSim Core — trial generator, capital evolution engine, summary statistics.
//!
//! This crate contains the heart of the simulator:
//! - Domain types (parameters, outcomes, trade records)
//! - Seedable random streams and a hash-derived seed hierarchy for batches
//! - Bernoulli trial generator
//! - Sequential capital evolution with a progress observer
//! - Summary statistics (realized win rate, profit factor, expectancy)
//!
//! No file I/O happens here; configuration files and exports live in
//! `tradesim-runner`.

pub mod domain;
pub mod engine;
pub mod progress;
pub mod rng;
pub mod simulation;
pub mod stats;
pub mod trials;

pub use domain::{Outcome, ParamError, SimulationParameters, TradeRecord};
pub use engine::{evolve, evolve_observed, round_dp, CapitalOutOfRange, Evolution};
pub use progress::{NoProgress, ProgressObserver};
pub use rng::RngHierarchy;
pub use simulation::{
    simulate, simulate_observed, simulate_with_rng, SimulationError, SimulationOutcome,
};
pub use stats::{summarize, SummaryStatistics};
pub use trials::{generate, generate_with};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: public data types are Send + Sync so batch
    /// runners can move them across rayon workers.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<SimulationParameters>();
        require_sync::<SimulationParameters>();
        require_send::<Outcome>();
        require_sync::<Outcome>();
        require_send::<TradeRecord>();
        require_sync::<TradeRecord>();
        require_send::<Evolution>();
        require_sync::<Evolution>();
        require_send::<SummaryStatistics>();
        require_sync::<SummaryStatistics>();
        require_send::<SimulationOutcome>();
        require_sync::<SimulationOutcome>();
        require_send::<RngHierarchy>();
        require_sync::<RngHierarchy>();
        require_send::<ParamError>();
        require_sync::<ParamError>();
        require_send::<SimulationError>();
        require_sync::<SimulationError>();
    }

    /// The progress observer is the only hook into the engine loop, and it
    /// receives counts only, never capital values.
    #[test]
    fn progress_observer_sees_no_capital() {
        fn _check_trait_object_builds(obs: &mut dyn ProgressObserver) {
            obs.on_start(10);
            obs.on_milestone(1, 10, 10);
            obs.on_finish(10);
        }
        _check_trait_object_builds(&mut NoProgress);
    }
}
