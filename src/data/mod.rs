//! Built-in actual-series sources (no CSV required).

pub mod sample;

pub use sample::*;
