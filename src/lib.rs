//! vtrade: visual replay backtester for manual trading strategies.
//!
//! Hexagonal architecture: indicator math and the replay state machine in
//! [`domain`], port traits in [`ports`], concrete implementations in
//! [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
