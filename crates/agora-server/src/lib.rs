//! # Agora Server Library
//!
//! Wiring for the like engine host process: dependency injection, logging
//! setup and the engine lifecycle (start, scheduled sync, shutdown drain).

pub mod app;
pub mod di;
pub mod logging;
pub mod startup;
