//! Integration tests for the mcsim simulation engine
//!
//! Tests are organized by topic:
//! - `sampling` - Distribution families and their value ranges
//! - `models` - Model construction and formula validation
//! - `simulation_runs` - Engine runs, seeding and batching
//! - `inverse_queries` - Goal evaluator and point estimator
//! - `builder_dsl` - Builder DSL and model configs end to end

mod inverse_queries;
mod models;
mod simulation_runs;
