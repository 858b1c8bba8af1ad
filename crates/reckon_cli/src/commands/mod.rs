//! CLI subcommand implementations.

pub mod send_debug;
pub mod serve;
pub mod track;
