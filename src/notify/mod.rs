//! Reporting of scan results.

pub mod console;

pub use console::ConsoleOutput;
