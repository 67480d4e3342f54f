#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by main.rs binary
use dotenvy as _;

pub mod error;
pub mod parser;
pub mod runner;

// Re-export primary types for convenient access
pub use error::CliError;
pub use parser::Cli;
pub use runner::{init_tracing, run};
