//! Neighborhood energy-flexibility simulator.

pub mod assets;
pub mod config;
pub mod error;
pub mod io;
pub mod scenario;
pub mod sim;
