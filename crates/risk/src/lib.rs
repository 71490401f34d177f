pub mod config;
pub mod gate;
pub mod position;

pub use config::RiskConfig;
pub use gate::{GateOutcome, RiskGate};
pub use position::{trailing_stop, PositionManager, Transition};
