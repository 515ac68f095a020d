mod distribution;
mod registry;
mod results;
mod simulation_model;
mod variable;

pub use distribution::{Distribution, DistributionKind, Sampler};
pub use registry::VariableSet;
pub use results::{GoalProbability, Outlook, PointEstimate, Results, Statistics};
pub use simulation_model::Model;
pub use variable::Variable;
