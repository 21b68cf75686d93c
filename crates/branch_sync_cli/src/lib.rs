//! branch-sync CLI library.
//!
//! Exposes the command implementations so they can be driven without the binary.

pub mod commands;
pub mod config;
pub mod errors;

#[cfg(test)]
mod test_support;
