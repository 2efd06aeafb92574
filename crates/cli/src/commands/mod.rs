//! Subcommand implementations.

pub mod convert;
pub mod fetch;
pub mod register;
pub mod translate;
