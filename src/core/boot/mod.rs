//! Parâmetros de boot.

pub mod cmdline;

pub use cmdline::CommandLine;
