//! mcsim: command-line front end for `mcsim_core`
//!
//! Reads a YAML model file, runs the simulation, and prints a summary
//! report with optional goal and estimate queries.

pub mod cli;
pub mod logging;
pub mod model_file;
pub mod report;
pub mod util;

pub use logging::init_logging;
