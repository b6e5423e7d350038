//! Battery snapshot providers

pub mod log;

pub use log::LogProvider;
