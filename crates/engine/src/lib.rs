pub mod config;
pub mod orchestrator;
pub mod pipeline;
pub mod report;

pub use config::BatchConfig;
pub use orchestrator::{BatchOrchestrator, BatchReport, SkippedInstrument};
pub use pipeline::{Collaborators, InstrumentPipeline};
pub use report::render_table;
