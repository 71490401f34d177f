pub mod atr;
pub mod rsi;
pub mod sma;

pub use atr::{true_range, VolatilityEstimator, DEFAULT_ATR_WINDOW};
pub use rsi::RsiIndicator;
pub use sma::sma;
