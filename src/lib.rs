//! `freight-kpi` library crate.
//!
//! The binary (`kpi`) is a thin wrapper around this library so that:
//!
//! - the projection merge is testable without spawning processes
//! - modules are reusable (e.g., a dashboard backend, notebooks, etc.)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod projection;
pub mod report;
pub mod tui;
