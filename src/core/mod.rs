pub mod orchestrator;
pub mod scratch;
pub mod types;
