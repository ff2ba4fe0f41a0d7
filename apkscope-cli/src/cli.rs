//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// apkscope -- decompile Android packages and extract API endpoints and keys.
///
/// Use `apkscope <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "apkscope", version, about, long_about = None)]
pub struct Cli {
    /// Path to the apkscope.toml configuration file (missing file means defaults).
    #[arg(short, long, global = true, default_value = "apkscope.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON (events as JSON lines).
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decompile one or more packages and scan the output.
    Analyze(AnalyzeArgs),

    /// List analysis projects.
    Projects,

    /// Show findings recorded for a project.
    Findings(FindingsArgs),

    /// List decompiled output files.
    Files,

    /// Print one decompiled output file.
    Cat(CatArgs),

    /// Remove every decompiled output folder.
    Wipe,

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- analyze ----

/// Stage each file, run one job per file concurrently, and stream progress events.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Package files to analyze (.apk, .dex, .jar, ...).
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Analyzer to run (repeatable). Defaults to the configured analyzers.
    #[arg(short, long = "analyzer", value_name = "NAME")]
    pub analyzers: Vec<String>,

    /// Only print the final summary, not live events.
    #[arg(short, long)]
    pub quiet: bool,
}

// ---- findings ----

/// Show endpoints and keys for one project.
#[derive(Args, Debug)]
pub struct FindingsArgs {
    /// Project identifier (see `apkscope projects`).
    pub project_id: i64,

    /// Which findings to show.
    #[arg(long, default_value = "all")]
    pub kind: FindingsKind,
}

/// Finding categories selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FindingsKind {
    Endpoints,
    Keys,
    All,
}

// ---- cat ----

/// Print an output file by its path relative to the output root.
#[derive(Args, Debug)]
pub struct CatArgs {
    /// Relative path as listed by `apkscope files`.
    pub path: String,
}

// ---- config ----

/// Manage apkscope configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, decompiler, storage, artifacts, scan, events).
        #[arg(long)]
        section: Option<String>,
    },
}
