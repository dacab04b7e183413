//! CLI module for coursekb
//!
//! Handles command-line argument parsing for the build and search commands.

pub mod args;

pub use args::{Args, Commands};
