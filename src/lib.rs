//! Cup Nooble library crate: every domain module, exposed for integration
//! testing.
//!
//! The binary crate (`main.rs`) is the actual game entry point. `tests/`
//! drives the simulation headlessly through `frame::SimulationPlugins`,
//! without a window or GPU.

pub mod animals;
pub mod bootstrap;
pub mod calendar;
pub mod config;
pub mod error;
pub mod frame;
pub mod input;
pub mod player;
pub mod shared;
pub mod timers;
pub mod trees;
pub mod ui;
pub mod world;
