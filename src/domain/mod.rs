//! Core domain types and logic.

pub mod ohlcv;
pub mod window;
pub mod indicator;
pub mod resample;
pub mod synthetic;
pub mod simulator;
pub mod config;
pub mod config_validation;
pub mod error;
