//! Layered configuration for the swarm-defense simulation.
//!
//! This module exports the resolver and its supporting pieces for the
//! binary and for integration tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
