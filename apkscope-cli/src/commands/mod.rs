//! Command handlers -- one module per subcommand

pub mod analyze;
pub mod cat;
pub mod config;
pub mod files;
pub mod findings;
pub mod projects;
pub mod wipe;
