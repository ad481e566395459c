//! Domain types for TradeSim.

pub mod outcome;
pub mod params;
pub mod trade;

pub use outcome::{count_wins, Outcome};
pub use params::{
    default_decimal_places, ParamError, SimulationParameters, MAX_DECIMAL_PLACES, MIN_FRACTION,
};
pub use trade::TradeRecord;
