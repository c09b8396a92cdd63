//! Simulation core: houses, policies, engine, and reporting.

pub mod engine;
pub mod house;
pub mod policy;
pub mod report;
pub mod strategies;
pub mod types;

pub use engine::Simulator;
pub use house::House;
pub use policy::{ControlPhase, ControlPolicy, PolicyContext};
pub use report::RunReport;
pub use strategies::{GreedyHousehold, Uncontrolled};
pub use types::SimConfig;
